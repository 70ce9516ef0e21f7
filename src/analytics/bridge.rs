//! The analytics bridge: a one-way `uninitialized -> initialized` switch in front of the vendor
//! SDK, plus a per-thread shared instance behind free functions.
//!
//! Only initialization reports failure. Every logging call after that is best effort: if the
//! bridge is not initialized the call is dropped with a warning, and vendor failures are logged
//! and swallowed so telemetry can never take the host down.

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::analytics::constants::{LOGGER_NAME, PAGE_VIEW_EVENT};
use crate::analytics::error::{
    already_initialized, invalid_argument, missing_configuration, sdk_not_loaded, AnalyticsResult,
};
use crate::analytics::sdk::{default_sdk, AnalyticsClient, EventParams, FirebaseAppHandle, FirebaseSdk};
use crate::app::FirebaseOptions;
use crate::logger::{log_arg, LogLevel, Logger};

pub struct AnalyticsBridge {
    sdk: RefCell<Rc<dyn FirebaseSdk>>,
    firebase_app: OnceCell<FirebaseAppHandle>,
    analytics: OnceCell<Rc<dyn AnalyticsClient>>,
    logger: Logger,
}

impl fmt::Debug for AnalyticsBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyticsBridge")
            .field("app", &self.firebase_app.get())
            .field("analytics_available", &self.is_analytics_available())
            .finish()
    }
}

impl Default for AnalyticsBridge {
    fn default() -> Self {
        Self::new(default_sdk())
    }
}

impl AnalyticsBridge {
    pub fn new(sdk: Rc<dyn FirebaseSdk>) -> Self {
        Self {
            sdk: RefCell::new(sdk),
            firebase_app: OnceCell::new(),
            analytics: OnceCell::new(),
            logger: Logger::new(LOGGER_NAME),
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Swaps the vendor SDK. Only allowed before the bridge has been initialized.
    pub fn replace_sdk(&self, sdk: Rc<dyn FirebaseSdk>) -> AnalyticsResult<()> {
        if self.firebase_app.get().is_some() {
            return Err(already_initialized(
                "the Firebase SDK cannot be replaced after initialization",
            ));
        }
        *self.sdk.borrow_mut() = sdk;
        Ok(())
    }

    pub fn app(&self) -> Option<&FirebaseAppHandle> {
        self.firebase_app.get()
    }

    /// Initializes the vendor app and its analytics client, returning whether the bridge is
    /// usable. Calling it again after a success returns `true` without touching the vendor.
    pub fn init_firebase(&self, options: &FirebaseOptions) -> bool {
        match self.try_init_firebase(options) {
            Ok(()) => true,
            Err(err) => {
                self.logger.log_with(
                    LogLevel::Error,
                    [log_arg("Error initializing Firebase:"), log_arg(err.to_string())],
                );
                false
            }
        }
    }

    pub fn try_init_firebase(&self, options: &FirebaseOptions) -> AnalyticsResult<()> {
        if self.firebase_app.get().is_some() {
            self.logger.info("Firebase already initialized");
            return Ok(());
        }

        let missing = options.missing_required_fields();
        if !missing.is_empty() {
            return Err(missing_configuration(format!(
                "Missing required Firebase configuration: {}",
                missing.join(", ")
            )));
        }

        // Cloned out so the vendor may call back into the bridge without a borrow conflict.
        let sdk = Rc::clone(&self.sdk.borrow());
        if !sdk.is_loaded() {
            return Err(sdk_not_loaded(
                "Firebase SDK not loaded. Make sure the firebase scripts are included in index.html",
            ));
        }

        let options = options.clone().normalized();
        let app = sdk.initialize_app(&options)?;
        let analytics = sdk.analytics(&app)?;

        if self.firebase_app.set(app).is_ok() {
            let _ = self.analytics.set(analytics);
            self.logger.info("Firebase Analytics initialized successfully");
        }
        Ok(())
    }

    pub fn is_analytics_available(&self) -> bool {
        self.analytics.get().is_some()
    }

    pub fn log_analytics_event(&self, event_name: &str, params: &EventParams) {
        self.with_client("logging event", |client| {
            validate_event_name(event_name)?;
            client.log_event(event_name, params)
        });
    }

    pub fn log_page_view(&self, page_path: &str, page_title: &str) {
        let mut params = EventParams::new();
        params.insert("page_path".into(), Value::from(page_path));
        params.insert("page_title".into(), Value::from(page_title));
        self.with_client("logging page view", |client| {
            client.log_event(PAGE_VIEW_EVENT, &params)
        });
    }

    pub fn set_user_property(&self, name: &str, value: &str) {
        self.with_client("setting user property", |client| {
            if name.trim().is_empty() {
                return Err(invalid_argument("User property name must not be empty"));
            }
            let mut properties = EventParams::new();
            properties.insert(name.to_string(), Value::from(value));
            client.set_user_properties(&properties)
        });
    }

    pub fn set_current_screen(&self, screen_name: &str) {
        self.with_client("setting current screen", |client| {
            client.set_current_screen(screen_name)
        });
    }

    fn with_client<F>(&self, action: &str, op: F)
    where
        F: FnOnce(&dyn AnalyticsClient) -> AnalyticsResult<()>,
    {
        let Some(client) = self.analytics.get() else {
            self.logger.warn("Analytics not initialized");
            return;
        };
        if let Err(err) = op(client.as_ref()) {
            self.logger.log_with(
                LogLevel::Error,
                [log_arg(format!("Error {action}:")), log_arg(err.to_string())],
            );
        }
    }
}

fn validate_event_name(name: &str) -> AnalyticsResult<()> {
    if name.trim().is_empty() {
        return Err(invalid_argument("Event name must not be empty"));
    }
    Ok(())
}

thread_local! {
    static SHARED: AnalyticsBridge = AnalyticsBridge::default();
}

/// Runs `f` against the calling thread's shared bridge.
pub fn with_shared_bridge<R>(f: impl FnOnce(&AnalyticsBridge) -> R) -> R {
    SHARED.with(f)
}

/// Installs the vendor SDK used by the shared bridge. Fails once the bridge is initialized.
pub fn install_sdk(sdk: Rc<dyn FirebaseSdk>) -> AnalyticsResult<()> {
    with_shared_bridge(|bridge| bridge.replace_sdk(sdk))
}

pub fn init_firebase(options: &FirebaseOptions) -> bool {
    with_shared_bridge(|bridge| bridge.init_firebase(options))
}

pub fn try_init_firebase(options: &FirebaseOptions) -> AnalyticsResult<()> {
    with_shared_bridge(|bridge| bridge.try_init_firebase(options))
}

pub fn is_analytics_available() -> bool {
    with_shared_bridge(AnalyticsBridge::is_analytics_available)
}

pub fn log_analytics_event(event_name: &str, params: &EventParams) {
    with_shared_bridge(|bridge| bridge.log_analytics_event(event_name, params));
}

pub fn log_page_view(page_path: &str, page_title: &str) {
    with_shared_bridge(|bridge| bridge.log_page_view(page_path, page_title));
}

pub fn set_user_property(name: &str, value: &str) {
    with_shared_bridge(|bridge| bridge.set_user_property(name, value));
}

pub fn set_current_screen(screen_name: &str) {
    with_shared_bridge(|bridge| bridge.set_current_screen(screen_name));
}

/// Initializes the shared bridge from the configuration compiled into the binary.
///
/// # Example
/// ```
/// if !firebase_analytics_bridge::analytics::initialize() {
///     // analytics stays disabled; every tracking call becomes a no-op
/// }
/// ```
pub fn initialize() -> bool {
    let success = init_firebase(&FirebaseOptions::from_build_env());
    if success {
        log::info!("Firebase Analytics enabled");
    } else {
        log::warn!("Firebase Analytics initialization failed - check configuration");
    }
    success
}

pub fn is_available() -> bool {
    is_analytics_available()
}
