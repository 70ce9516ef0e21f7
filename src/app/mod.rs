//! Firebase app configuration consumed by the analytics bridge.

mod environment;
mod types;

pub use environment::{
    options_from_json_str, options_from_lookup, ENV_API_KEY, ENV_APP_ID, ENV_AUTH_DOMAIN,
    ENV_FIREBASE_CONFIG, ENV_MEASUREMENT_ID, ENV_MESSAGING_SENDER_ID, ENV_PROJECT_ID,
    ENV_STORAGE_BUCKET,
};
pub use types::FirebaseOptions;
