use serde::{Deserialize, Serialize};

/// Configuration handed to the vendor's `initializeApp`.
///
/// Field names serialize to the camelCase keys of the Firebase web config object. Absent fields
/// are omitted from the serialized form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_sender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<String>,
}

impl FirebaseOptions {
    /// Returns the camelCase names of required fields that are absent or blank.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        [
            ("apiKey", &self.api_key),
            ("projectId", &self.project_id),
            ("appId", &self.app_id),
        ]
        .into_iter()
        .filter(|(_, value)| !is_present(value))
        .map(|(name, _)| name)
        .collect()
    }

    pub fn has_required_fields(&self) -> bool {
        self.missing_required_fields().is_empty()
    }

    /// Drops blank values so that `Some("")` never reaches the vendor.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.api_key,
            &mut self.auth_domain,
            &mut self.project_id,
            &mut self.storage_bucket,
            &mut self.messaging_sender_id,
            &mut self.app_id,
            &mut self.measurement_id,
        ] {
            if !is_present(field) {
                *field = None;
            }
        }
        self
    }

    /// Fills every absent field of `self` from `fallback`.
    pub fn or(self, fallback: FirebaseOptions) -> Self {
        Self {
            api_key: self.api_key.or(fallback.api_key),
            auth_domain: self.auth_domain.or(fallback.auth_domain),
            project_id: self.project_id.or(fallback.project_id),
            storage_bucket: self.storage_bucket.or(fallback.storage_bucket),
            messaging_sender_id: self.messaging_sender_id.or(fallback.messaging_sender_id),
            app_id: self.app_id.or(fallback.app_id),
            measurement_id: self.measurement_id.or(fallback.measurement_id),
        }
    }
}

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}
