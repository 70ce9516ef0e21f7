use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, LazyLock, Mutex};

use firebase_analytics_bridge::analytics::error::vendor_error;
use firebase_analytics_bridge::analytics::{
    self, tracker, AnalyticsBridge, AnalyticsClient, AnalyticsResult, EventParams,
    FirebaseAppHandle, FirebaseSdk, RecordingSdk, ScrollDepthTracker, Tracker,
};
use firebase_analytics_bridge::app::FirebaseOptions;
use firebase_analytics_bridge::logger::{set_user_log_handler, set_user_log_handler_fn, LogLevel};

static LOG_GUARD: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

fn options() -> FirebaseOptions {
    FirebaseOptions::from_json_str(
        r#"{
            "apiKey": "integration-key",
            "authDomain": "demo.firebaseapp.com",
            "projectId": "demo",
            "appId": "1:42:web:abc",
            "measurementId": "G-INTEGRATION"
        }"#,
    )
    .unwrap()
}

/// Vendor stand-in whose analytics client starts failing after `fail_after` calls.
struct FlakySdk {
    fail_after: usize,
    calls: Rc<Cell<usize>>,
    accepted: Rc<RefCell<Vec<String>>>,
}

struct FlakyClient {
    fail_after: usize,
    calls: Rc<Cell<usize>>,
    accepted: Rc<RefCell<Vec<String>>>,
}

impl FirebaseSdk for FlakySdk {
    fn is_loaded(&self) -> bool {
        true
    }

    fn initialize_app(&self, options: &FirebaseOptions) -> AnalyticsResult<FirebaseAppHandle> {
        Ok(FirebaseAppHandle::new("flaky", options.clone(), Rc::new(())))
    }

    fn analytics(&self, _app: &FirebaseAppHandle) -> AnalyticsResult<Rc<dyn AnalyticsClient>> {
        Ok(Rc::new(FlakyClient {
            fail_after: self.fail_after,
            calls: Rc::clone(&self.calls),
            accepted: Rc::clone(&self.accepted),
        }))
    }
}

impl FlakyClient {
    fn record(&self, entry: String) -> AnalyticsResult<()> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        if call > self.fail_after {
            return Err(vendor_error("quota exceeded"));
        }
        self.accepted.borrow_mut().push(entry);
        Ok(())
    }
}

impl AnalyticsClient for FlakyClient {
    fn log_event(&self, name: &str, _params: &EventParams) -> AnalyticsResult<()> {
        self.record(format!("event:{name}"))
    }

    fn set_user_properties(&self, properties: &EventParams) -> AnalyticsResult<()> {
        let keys: Vec<_> = properties.keys().cloned().collect();
        self.record(format!("properties:{}", keys.join(",")))
    }

    fn set_current_screen(&self, screen_name: &str) -> AnalyticsResult<()> {
        self.record(format!("screen:{screen_name}"))
    }
}

#[test]
fn vendor_failures_never_reach_the_host() {
    let calls = Rc::new(Cell::new(0));
    let accepted = Rc::new(RefCell::new(Vec::new()));
    let bridge = AnalyticsBridge::new(Rc::new(FlakySdk {
        fail_after: 2,
        calls: Rc::clone(&calls),
        accepted: Rc::clone(&accepted),
    }));
    bridge.logger().set_log_handler(|_, _, _| {});

    assert!(bridge.init_firebase(&options()));
    assert_eq!(bridge.app().map(|app| app.name()), Some("flaky"));

    bridge.set_current_screen("home");
    bridge.set_user_property("tier", "gold");
    bridge.log_page_view("/", "Home");
    bridge.log_analytics_event("late", &EventParams::new());

    assert_eq!(calls.get(), 4);
    assert_eq!(*accepted.borrow(), ["screen:home", "properties:tier"]);
}

#[test]
fn shared_bridge_lifecycle_on_one_thread() {
    std::thread::spawn(|| {
        // Before any SDK is installed nothing is recorded and nothing panics.
        tracker::track_search("rust", 10);
        assert!(!analytics::is_analytics_available());

        let sdk = RecordingSdk::new();
        analytics::install_sdk(Rc::new(sdk.clone())).unwrap();
        assert!(!analytics::init_firebase(&FirebaseOptions::default()));
        assert!(analytics::init_firebase(&options()));
        assert!(analytics::init_firebase(&options()));
        assert_eq!(sdk.initialize_calls(), 1);

        tracker::track_page_view("/blog", "Blog");
        tracker::track_share("post-1", "Hello", "mastodon");
        analytics::set_user_property("theme", "dark");
        analytics::set_current_screen("blog");

        let names: Vec<_> = sdk.recorded_events().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["page_view", "engagement_share"]);
        assert_eq!(sdk.screens(), ["blog"]);
        analytics::with_shared_bridge(|bridge| {
            assert_eq!(
                bridge.app().and_then(|app| app.options().measurement_id.clone()),
                Some("G-INTEGRATION".to_string())
            );
        });
    })
    .join()
    .unwrap();
}

#[test]
fn shared_bridge_is_per_thread() {
    std::thread::spawn(|| {
        analytics::install_sdk(Rc::new(RecordingSdk::new())).unwrap();
        assert!(analytics::init_firebase(&options()));
    })
    .join()
    .unwrap();

    std::thread::spawn(|| assert!(!analytics::is_available()))
        .join()
        .unwrap();
}

#[test]
fn uninitialized_warnings_reach_user_log_handler() {
    let _guard = LOG_GUARD.lock().unwrap();
    let bridge = AnalyticsBridge::new(Rc::new(RecordingSdk::new()));
    bridge.logger().set_log_handler(|_, _, _| {});

    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    set_user_log_handler_fn(
        Some(move |params: firebase_analytics_bridge::logger::LogCallbackParams| {
            if params.logger_type == "@firebase/analytics-bridge" {
                sink.lock().unwrap().push((params.level, params.message));
            }
        }),
        None,
    );

    bridge.log_page_view("/", "Home");
    set_user_log_handler(None, None);

    let captured = captured.lock().unwrap();
    assert!(captured.contains(&(LogLevel::Warn, "Analytics not initialized".to_string())));
}

#[test]
fn handler_installed_before_first_shared_call_sees_diagnostics() {
    let _guard = LOG_GUARD.lock().unwrap();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    set_user_log_handler_fn(
        Some(move |params: firebase_analytics_bridge::logger::LogCallbackParams| {
            if params.logger_type == "@firebase/analytics-bridge" {
                sink.lock().unwrap().push((params.level, params.message));
            }
        }),
        None,
    );

    std::thread::spawn(|| {
        analytics::log_page_view("/", "Home");
        assert!(!analytics::init_firebase(&FirebaseOptions::default()));
    })
    .join()
    .unwrap();
    set_user_log_handler(None, None);

    let captured = captured.lock().unwrap();
    assert!(captured.contains(&(LogLevel::Warn, "Analytics not initialized".to_string())));
    assert!(captured.iter().any(|(level, message)| *level == LogLevel::Error
        && message.starts_with("Error initializing Firebase:")));
}

#[test]
fn scroll_tracking_end_to_end() {
    let sdk = RecordingSdk::new();
    let bridge = AnalyticsBridge::new(Rc::new(sdk.clone()));
    assert!(bridge.init_firebase(&options()));
    let tracker = Tracker::new(&bridge);

    let mut depth = ScrollDepthTracker::new();
    for scroll_top in [0.0, 250.0, 500.0, 750.0, 1_000.0] {
        depth.observe_and_track(&tracker, "/long-read", scroll_top, 500.0, 1_500.0);
    }

    let depths: Vec<_> = sdk
        .recorded_events()
        .into_iter()
        .map(|event| event.params["depth_percentage"].as_u64().unwrap())
        .collect();
    assert_eq!(depths, [25, 50, 75, 100]);
}
