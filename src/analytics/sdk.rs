//! Seam between the bridge and the vendor SDK that does the real work.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::analytics::error::{sdk_not_loaded, AnalyticsResult};
use crate::app::FirebaseOptions;

/// Parameters attached to an analytics event or a user property update.
pub type EventParams = Map<String, Value>;

/// Entry points of the vendor SDK used during initialization.
pub trait FirebaseSdk {
    /// Whether the vendor SDK is present in the host (for the browser SDK, whether the
    /// `firebase` global is defined).
    fn is_loaded(&self) -> bool;

    fn initialize_app(&self, options: &FirebaseOptions) -> AnalyticsResult<FirebaseAppHandle>;

    fn analytics(&self, app: &FirebaseAppHandle) -> AnalyticsResult<Rc<dyn AnalyticsClient>>;
}

/// Analytics client handed out by the vendor once the app is initialized.
pub trait AnalyticsClient {
    fn log_event(&self, name: &str, params: &EventParams) -> AnalyticsResult<()>;

    fn set_user_properties(&self, properties: &EventParams) -> AnalyticsResult<()>;

    fn set_current_screen(&self, screen_name: &str) -> AnalyticsResult<()>;
}

/// Opaque handle to an initialized vendor app.
#[derive(Clone)]
pub struct FirebaseAppHandle {
    name: String,
    options: FirebaseOptions,
    raw: Rc<dyn Any>,
}

impl FirebaseAppHandle {
    pub fn new(name: impl Into<String>, options: FirebaseOptions, raw: Rc<dyn Any>) -> Self {
        Self {
            name: name.into(),
            options,
            raw,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &FirebaseOptions {
        &self.options
    }

    /// The vendor object behind the handle, if it is a `T`.
    pub fn raw<T: 'static>(&self) -> Option<&T> {
        self.raw.downcast_ref::<T>()
    }
}

impl fmt::Debug for FirebaseAppHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseAppHandle")
            .field("name", &self.name)
            .field("project_id", &self.options.project_id)
            .finish()
    }
}

/// Stand-in used when no vendor SDK exists in the host. Initialization through it always fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableSdk;

impl FirebaseSdk for UnavailableSdk {
    fn is_loaded(&self) -> bool {
        false
    }

    fn initialize_app(&self, _options: &FirebaseOptions) -> AnalyticsResult<FirebaseAppHandle> {
        Err(sdk_not_loaded("no Firebase SDK is available on this target"))
    }

    fn analytics(&self, _app: &FirebaseAppHandle) -> AnalyticsResult<Rc<dyn AnalyticsClient>> {
        Err(sdk_not_loaded("no Firebase SDK is available on this target"))
    }
}

/// The SDK the shared bridge starts with: the browser's global `firebase` on `wasm32` with the
/// `wasm-web` feature, [`UnavailableSdk`] everywhere else.
pub fn default_sdk() -> Rc<dyn FirebaseSdk> {
    #[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
    {
        Rc::new(crate::analytics::wasm::JsFirebaseSdk::new())
    }

    #[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
    {
        Rc::new(UnavailableSdk)
    }
}
