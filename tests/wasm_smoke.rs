#![cfg(all(target_arch = "wasm32", feature = "wasm-web"))]

use firebase_analytics_bridge::analytics::{
    AnalyticsBridge, EventParams, FirebaseSdk, JsFirebaseSdk,
};
use firebase_analytics_bridge::app::FirebaseOptions;
use js_sys::Reflect;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn options() -> FirebaseOptions {
    FirebaseOptions {
        api_key: Some("wasm-test-key".into()),
        project_id: Some("wasm-test-project".into()),
        app_id: Some("1:1:web:wasm".into()),
        ..Default::default()
    }
}

#[wasm_bindgen_test]
fn missing_global_means_sdk_not_loaded() {
    let sdk = JsFirebaseSdk::with_global("__missingFirebaseForTests");
    assert!(!sdk.is_loaded());

    let bridge = AnalyticsBridge::new(Rc::new(sdk));
    assert!(!bridge.init_firebase(&options()));
    bridge.log_analytics_event("noop", &EventParams::new());
    assert!(!bridge.is_analytics_available());
}

#[wasm_bindgen_test]
fn drives_a_global_namespace_object() {
    let script = r#"
        (function () {
            const calls = [];
            globalThis.__fakeFirebase = {
                calls,
                initializeApp(config) {
                    calls.push(["initializeApp", config.projectId]);
                    return { name: "[DEFAULT]" };
                },
                analytics(app) {
                    return {
                        logEvent(name, params) { calls.push(["logEvent", name, params.page_path]); },
                        setUserProperties(props) { calls.push(["setUserProperties", props.plan]); },
                        setCurrentScreen() { throw new Error("removed in v9"); },
                    };
                },
            };
        })();
    "#;
    js_sys::eval(script).unwrap();

    let bridge = AnalyticsBridge::new(Rc::new(JsFirebaseSdk::with_global("__fakeFirebase")));
    assert!(bridge.init_firebase(&options()));
    assert!(bridge.init_firebase(&options()));
    bridge.log_page_view("/wasm", "Wasm");
    bridge.set_user_property("plan", "pro");
    bridge.set_current_screen("home");

    let namespace = Reflect::get(&js_sys::global(), &JsValue::from_str("__fakeFirebase")).unwrap();
    let calls = Reflect::get(&namespace, &JsValue::from_str("calls")).unwrap();
    let calls = js_sys::JSON::stringify(&calls).unwrap().as_string().unwrap();
    assert_eq!(
        calls,
        r#"[["initializeApp","wasm-test-project"],["logEvent","page_view","/wasm"],["setUserProperties","pro"]]"#
    );
}

#[wasm_bindgen_test]
fn retry_after_analytics_failure_reuses_default_app() {
    let script = r#"
        (function () {
            const calls = [];
            let analyticsAttempts = 0;
            const ns = {
                calls,
                apps: [],
                initializeApp(config) {
                    if (ns.apps.length > 0) { throw new Error("app/duplicate-app"); }
                    calls.push(["initializeApp", config.projectId]);
                    const app = { name: "[DEFAULT]" };
                    ns.apps.push(app);
                    return app;
                },
                app() {
                    calls.push(["app"]);
                    return ns.apps[0];
                },
                analytics(app) {
                    analyticsAttempts += 1;
                    if (analyticsAttempts === 1) { throw new Error("analytics blocked"); }
                    return { logEvent(name) { calls.push(["logEvent", name]); } };
                },
            };
            globalThis.__retryFirebase = ns;
        })();
    "#;
    js_sys::eval(script).unwrap();

    let bridge = AnalyticsBridge::new(Rc::new(JsFirebaseSdk::with_global("__retryFirebase")));
    assert!(!bridge.init_firebase(&options()));
    assert!(bridge.app().is_none());
    assert!(!bridge.is_analytics_available());

    assert!(bridge.init_firebase(&options()));
    bridge.log_analytics_event("retry_ok", &EventParams::new());

    let namespace = Reflect::get(&js_sys::global(), &JsValue::from_str("__retryFirebase")).unwrap();
    let calls = Reflect::get(&namespace, &JsValue::from_str("calls")).unwrap();
    let calls = js_sys::JSON::stringify(&calls).unwrap().as_string().unwrap();
    assert_eq!(
        calls,
        r#"[["initializeApp","wasm-test-project"],["app"],["logEvent","retry_ok"]]"#
    );
}
