//! Binding to the Firebase JS SDK (compat flavour) loaded as the global `firebase`.
//!
//! Every vendor call goes through `js_sys::Reflect` so a missing script or method surfaces as a
//! [`vendor`](crate::analytics::error::AnalyticsErrorCode::Vendor) error instead of a panic.

use std::rc::Rc;

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};

use crate::analytics::constants::DEFAULT_APP_NAME;
use crate::analytics::error::{internal_error, sdk_not_loaded, vendor_error, AnalyticsResult};
use crate::analytics::sdk::{AnalyticsClient, EventParams, FirebaseAppHandle, FirebaseSdk};
use crate::app::FirebaseOptions;

const DEFAULT_GLOBAL: &str = "firebase";

#[derive(Clone, Debug)]
pub struct JsFirebaseSdk {
    global_name: String,
}

impl Default for JsFirebaseSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl JsFirebaseSdk {
    pub fn new() -> Self {
        Self::with_global(DEFAULT_GLOBAL)
    }

    /// Uses a differently named global namespace object, e.g. when the page aliases the SDK.
    pub fn with_global(global_name: impl Into<String>) -> Self {
        Self {
            global_name: global_name.into(),
        }
    }

    fn namespace(&self) -> AnalyticsResult<JsValue> {
        let value = Reflect::get(&js_sys::global(), &JsValue::from_str(&self.global_name))
            .map_err(|err| vendor_error(stringify_js_error(err)))?;
        if value.is_undefined() || value.is_null() {
            return Err(sdk_not_loaded(format!(
                "global `{}` is not defined",
                self.global_name
            )));
        }
        Ok(value)
    }
}

impl FirebaseSdk for JsFirebaseSdk {
    fn is_loaded(&self) -> bool {
        self.namespace().is_ok()
    }

    fn initialize_app(&self, options: &FirebaseOptions) -> AnalyticsResult<FirebaseAppHandle> {
        let namespace = self.namespace()?;
        // A default app left behind by an earlier attempt would make `initializeApp` throw
        // `app/duplicate-app`, so it is picked up instead.
        let app = match existing_default_app(&namespace)? {
            Some(app) => app,
            None => call_method(&namespace, "initializeApp", &Array::of1(&to_js(options)?))?,
        };
        let name = Reflect::get(&app, &JsValue::from_str("name"))
            .ok()
            .and_then(|value| value.as_string())
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
        Ok(FirebaseAppHandle::new(name, options.clone(), Rc::new(app)))
    }

    fn analytics(&self, app: &FirebaseAppHandle) -> AnalyticsResult<Rc<dyn AnalyticsClient>> {
        let namespace = self.namespace()?;
        let app = app
            .raw::<JsValue>()
            .ok_or_else(|| internal_error("app handle was not created by the JS SDK"))?;
        let analytics = call_method(&namespace, "analytics", &Array::of1(app))?;
        Ok(Rc::new(JsAnalyticsClient { inner: analytics }))
    }
}

fn existing_default_app(namespace: &JsValue) -> AnalyticsResult<Option<JsValue>> {
    let apps = Reflect::get(namespace, &JsValue::from_str("apps"))
        .map_err(|err| vendor_error(stringify_js_error(err)))?;
    if !Array::is_array(&apps) || Array::from(&apps).length() == 0 {
        return Ok(None);
    }
    call_method(namespace, "app", &Array::new()).map(Some)
}

struct JsAnalyticsClient {
    inner: JsValue,
}

impl AnalyticsClient for JsAnalyticsClient {
    fn log_event(&self, name: &str, params: &EventParams) -> AnalyticsResult<()> {
        let params = to_js(params)?;
        call_method(
            &self.inner,
            "logEvent",
            &Array::of2(&JsValue::from_str(name), &params),
        )
        .map(drop)
    }

    fn set_user_properties(&self, properties: &EventParams) -> AnalyticsResult<()> {
        let properties = to_js(properties)?;
        call_method(&self.inner, "setUserProperties", &Array::of1(&properties)).map(drop)
    }

    fn set_current_screen(&self, screen_name: &str) -> AnalyticsResult<()> {
        call_method(
            &self.inner,
            "setCurrentScreen",
            &Array::of1(&JsValue::from_str(screen_name)),
        )
        .map(drop)
    }
}

fn call_method(target: &JsValue, method: &str, args: &Array) -> AnalyticsResult<JsValue> {
    let function = Reflect::get(target, &JsValue::from_str(method))
        .map_err(|err| vendor_error(format!("failed to read `{method}`: {}", stringify_js_error(err))))?
        .dyn_into::<Function>()
        .map_err(|_| vendor_error(format!("`{method}` is not a function")))?;
    function
        .apply(target, args)
        .map_err(|err| vendor_error(format!("`{method}` threw: {}", stringify_js_error(err))))
}

/// Plain objects only: the vendor rejects ES `Map`s, which is what maps serialize to by default.
fn to_js<T: Serialize + ?Sized>(value: &T) -> AnalyticsResult<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| internal_error(format!("failed to convert parameters: {err}")))
}

fn stringify_js_error(err: JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    if let Some(text) = err.as_string() {
        return text;
    }
    js_sys::JSON::stringify(&err)
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}
