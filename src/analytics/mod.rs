//! Best-effort Firebase Analytics bridge.
//!
//! # Usage
//!
//! Initialize once when the app starts, then track from anywhere on the same thread:
//!
//! ```
//! use firebase_analytics_bridge::analytics::{self, tracker};
//!
//! if !analytics::initialize() {
//!     // Without a loaded vendor SDK every call below is a no-op.
//! }
//! tracker::track_page_view("/blog", "Blog");
//! tracker::track_post_view("post-123", "My Post", Some("tech"));
//! ```

mod bridge;
mod constants;
pub mod engagement;
pub mod error;
#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
pub mod listeners;
mod recording;
mod sdk;
pub mod tracker;
#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
mod wasm;

pub use bridge::{
    init_firebase, initialize, install_sdk, is_analytics_available, is_available,
    log_analytics_event, log_page_view, set_current_screen, set_user_property, try_init_firebase,
    with_shared_bridge, AnalyticsBridge,
};
pub use engagement::{is_outbound_link, now_millis, PageTimer, ScrollDepthTracker, Throttle};
pub use error::{AnalyticsError, AnalyticsErrorCode, AnalyticsResult};
pub use recording::{AnalyticsEvent, RecordingSdk};
pub use sdk::{
    default_sdk, AnalyticsClient, EventParams, FirebaseAppHandle, FirebaseSdk, UnavailableSdk,
};
pub use tracker::Tracker;
#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
pub use wasm::JsFirebaseSdk;
