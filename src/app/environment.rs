//! Loaders that assemble [`FirebaseOptions`] from the host environment.

use std::env;

use serde_json::{Map, Value};

use super::FirebaseOptions;

pub const ENV_API_KEY: &str = "FIREBASE_API_KEY";
pub const ENV_AUTH_DOMAIN: &str = "FIREBASE_AUTH_DOMAIN";
pub const ENV_PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
pub const ENV_STORAGE_BUCKET: &str = "FIREBASE_STORAGE_BUCKET";
pub const ENV_MESSAGING_SENDER_ID: &str = "FIREBASE_MESSAGING_SENDER_ID";
pub const ENV_APP_ID: &str = "FIREBASE_APP_ID";
pub const ENV_MEASUREMENT_ID: &str = "FIREBASE_MEASUREMENT_ID";
/// Whole web config as a JSON object, a path to a JSON file, or `key=value` pairs.
pub const ENV_FIREBASE_CONFIG: &str = "FIREBASE_CONFIG";

impl FirebaseOptions {
    /// Options baked in at compile time through `option_env!`, which is how wasm bundles receive
    /// their configuration. Unset variables stay `None`.
    pub fn from_build_env() -> Self {
        FirebaseOptions {
            api_key: option_env!("FIREBASE_API_KEY").map(str::to_owned),
            auth_domain: option_env!("FIREBASE_AUTH_DOMAIN").map(str::to_owned),
            project_id: option_env!("FIREBASE_PROJECT_ID").map(str::to_owned),
            storage_bucket: option_env!("FIREBASE_STORAGE_BUCKET").map(str::to_owned),
            messaging_sender_id: option_env!("FIREBASE_MESSAGING_SENDER_ID").map(str::to_owned),
            app_id: option_env!("FIREBASE_APP_ID").map(str::to_owned),
            measurement_id: option_env!("FIREBASE_MEASUREMENT_ID").map(str::to_owned),
        }
        .normalized()
    }

    /// Options read from the process environment at run time.
    pub fn from_env() -> Self {
        options_from_lookup(|key| env::var(key).ok())
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        options_from_json_str(raw)
    }
}

pub fn options_from_json_str(raw: &str) -> Result<FirebaseOptions, serde_json::Error> {
    serde_json::from_str::<FirebaseOptions>(raw).map(FirebaseOptions::normalized)
}

/// Builds options from an arbitrary variable source. Individual `FIREBASE_*` variables take
/// precedence over the fields of `FIREBASE_CONFIG`.
pub fn options_from_lookup<F>(lookup: F) -> FirebaseOptions
where
    F: Fn(&str) -> Option<String>,
{
    let individual = FirebaseOptions {
        api_key: lookup(ENV_API_KEY),
        auth_domain: lookup(ENV_AUTH_DOMAIN),
        project_id: lookup(ENV_PROJECT_ID),
        storage_bucket: lookup(ENV_STORAGE_BUCKET),
        messaging_sender_id: lookup(ENV_MESSAGING_SENDER_ID),
        app_id: lookup(ENV_APP_ID),
        measurement_id: lookup(ENV_MEASUREMENT_ID),
    }
    .normalized();

    let base = lookup(ENV_FIREBASE_CONFIG)
        .and_then(|raw| parse_config_source(&raw))
        .and_then(|value| serde_json::from_value::<FirebaseOptions>(value).ok())
        .map(FirebaseOptions::normalized)
        .unwrap_or_default();

    individual.or(base)
}

fn parse_config_source(raw: &str) -> Option<Value> {
    if let Ok(json) = serde_json::from_str::<Value>(raw) {
        return json.is_object().then_some(json);
    }

    if let Some(contents) = read_config_file(raw) {
        if let Ok(json) = serde_json::from_str::<Value>(&contents) {
            if json.is_object() {
                return Some(json);
            }
        }
    }

    parse_key_value_config(raw)
}

#[cfg(not(target_arch = "wasm32"))]
fn read_config_file(raw: &str) -> Option<String> {
    if raw.contains('=') {
        return None;
    }
    std::fs::read_to_string(raw.trim()).ok()
}

#[cfg(target_arch = "wasm32")]
fn read_config_file(_raw: &str) -> Option<String> {
    None
}

fn parse_key_value_config(raw: &str) -> Option<Value> {
    let mut map = Map::new();
    for entry in raw.split(',') {
        let Some((key, value)) = entry.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    (!map.is_empty()).then_some(Value::Object(map))
}
