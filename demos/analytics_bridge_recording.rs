//! Drives the shared analytics bridge with the in-memory SDK and prints what would have been
//! sent to Firebase. Set `FIREBASE_API_KEY`, `FIREBASE_PROJECT_ID` and `FIREBASE_APP_ID` (or
//! `FIREBASE_CONFIG`) to use your own configuration; placeholders are used otherwise.

use std::rc::Rc;

use firebase_analytics_bridge::analytics::{self, tracker, RecordingSdk};
use firebase_analytics_bridge::app::FirebaseOptions;
use firebase_analytics_bridge::logger::{set_log_level, LogLevel};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    set_log_level(LogLevel::Debug);

    let options = FirebaseOptions::from_env().or(FirebaseOptions {
        api_key: Some("demo-api-key".into()),
        project_id: Some("demo-project".into()),
        app_id: Some("1:1234567890:web:demo".into()),
        measurement_id: Some("G-DEMO".into()),
        ..Default::default()
    });

    let sdk = RecordingSdk::new();
    analytics::install_sdk(Rc::new(sdk.clone()))?;
    analytics::try_init_firebase(&options)?;

    analytics::set_user_property("preferred_language", "rust");
    analytics::set_current_screen("home");
    tracker::track_page_view("/", "Home");
    tracker::track_post_view("post-1", "Hello, world", Some("announcements"));
    tracker::track_custom_event("tutorial_begin", json!({"tutorial_name": "first_steps"}));

    for event in sdk.recorded_events() {
        println!("Recorded event: {} {}", event.name, serde_json::Value::Object(event.params));
    }
    for properties in sdk.user_properties() {
        println!("User properties: {}", serde_json::Value::Object(properties));
    }
    println!("Screens: {:?}", sdk.screens());

    Ok(())
}
