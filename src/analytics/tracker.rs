//! Typed tracking helpers for the events the host application emits.
//!
//! Every helper is a no-op while analytics is unavailable, so callers never need to check
//! initialization themselves.

use serde_json::{json, Value};

use crate::analytics::bridge::{with_shared_bridge, AnalyticsBridge};
use crate::analytics::sdk::EventParams;

/// Emits typed events through a bridge.
#[derive(Clone, Copy, Debug)]
pub struct Tracker<'a> {
    bridge: &'a AnalyticsBridge,
}

impl<'a> Tracker<'a> {
    pub fn new(bridge: &'a AnalyticsBridge) -> Self {
        Self { bridge }
    }

    pub fn track_page_view(&self, route: &str, title: &str) {
        if self.bridge.is_analytics_available() {
            self.bridge.log_page_view(route, title);
            log::debug!("Analytics: Page view - {} ({})", title, route);
        }
    }

    pub fn track_post_view(&self, post_id: &str, post_title: &str, category: Option<&str>) {
        let mut params = json!({
            "post_id": post_id,
            "post_title": post_title,
        });
        if let Some(category) = category {
            params["category"] = json!(category);
        }
        if self.emit("post_view", params) {
            log::debug!("Analytics: Post view - {} ({})", post_title, post_id);
        }
    }

    pub fn track_time_on_page(&self, route: &str, duration_seconds: f64) {
        let params = json!({
            "page": route,
            "duration_seconds": duration_seconds,
            "duration_minutes": (duration_seconds / 60.0).round(),
        });
        if self.emit("time_on_page", params) {
            log::debug!("Analytics: Time on page - {} ({:.1}s)", route, duration_seconds);
        }
    }

    pub fn track_scroll_depth(&self, route: &str, depth_percentage: u8) {
        let params = json!({
            "page": route,
            "depth_percentage": depth_percentage,
        });
        if self.emit("scroll_depth", params) {
            log::debug!("Analytics: Scroll depth - {} ({}%)", route, depth_percentage);
        }
    }

    pub fn track_like(&self, post_id: &str, post_title: &str, liked: bool) {
        let action = if liked { "liked" } else { "unliked" };
        let params = json!({
            "post_id": post_id,
            "post_title": post_title,
            "action": action,
        });
        if self.emit("engagement_like", params) {
            log::debug!("Analytics: Like - {} ({})", action, post_id);
        }
    }

    pub fn track_share(&self, post_id: &str, post_title: &str, platform: &str) {
        let params = json!({
            "post_id": post_id,
            "post_title": post_title,
            "platform": platform,
        });
        if self.emit("engagement_share", params) {
            log::debug!("Analytics: Share - {} on {}", post_id, platform);
        }
    }

    pub fn track_comment(&self, post_id: &str, post_title: &str, action: &str) {
        let params = json!({
            "post_id": post_id,
            "post_title": post_title,
            "action": action,
        });
        if self.emit("engagement_comment", params) {
            log::debug!("Analytics: Comment {} - {}", action, post_id);
        }
    }

    pub fn track_category_click(&self, category: &str, source: &str) {
        let params = json!({ "category": category, "source": source });
        if self.emit("navigation_category", params) {
            log::debug!("Analytics: Category click - {} from {}", category, source);
        }
    }

    pub fn track_tag_click(&self, tag: &str, source: &str) {
        let params = json!({ "tag": tag, "source": source });
        if self.emit("navigation_tag", params) {
            log::debug!("Analytics: Tag click - {} from {}", tag, source);
        }
    }

    pub fn track_navigation(&self, destination: &str, source: &str) {
        let params = json!({ "destination": destination, "source": source });
        if self.emit("navigation_click", params) {
            log::debug!("Analytics: Navigation - {} from {}", destination, source);
        }
    }

    pub fn track_outbound_link(&self, url: &str, referer: &str, post_id: Option<&str>) {
        let mut params = json!({ "url": url, "referer": referer });
        if let Some(post_id) = post_id {
            params["post_id"] = json!(post_id);
        }
        if self.emit("outbound_link", params) {
            log::debug!("Analytics: Outbound link - {} from {}", url, referer);
        }
    }

    pub fn track_search(&self, query: &str, results_count: usize) {
        let params = json!({
            "search_query": query,
            "results_count": results_count,
        });
        if self.emit("search", params) {
            log::debug!("Analytics: Search - '{}' ({} results)", query, results_count);
        }
    }

    /// Logs an arbitrary event. Parameters that are not a JSON object are sent as `{"value": ..}`
    /// and `null` as no parameters at all.
    pub fn track_custom_event(&self, event_name: &str, params: Value) {
        if self.emit(event_name, params) && !event_name.trim().is_empty() {
            log::debug!("Analytics: Custom event - {}", event_name);
        }
    }

    fn emit(&self, event_name: &str, params: Value) -> bool {
        if !self.bridge.is_analytics_available() {
            return false;
        }
        self.bridge.log_analytics_event(event_name, &into_event_params(params));
        true
    }
}

fn into_event_params(params: Value) -> EventParams {
    match params {
        Value::Object(map) => map,
        Value::Null => EventParams::new(),
        other => {
            let mut map = EventParams::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

pub fn track_page_view(route: &str, title: &str) {
    with_shared_bridge(|bridge| Tracker::new(bridge).track_page_view(route, title));
}

pub fn track_post_view(post_id: &str, post_title: &str, category: Option<&str>) {
    with_shared_bridge(|bridge| Tracker::new(bridge).track_post_view(post_id, post_title, category));
}

pub fn track_time_on_page(route: &str, duration_seconds: f64) {
    with_shared_bridge(|bridge| Tracker::new(bridge).track_time_on_page(route, duration_seconds));
}

pub fn track_scroll_depth(route: &str, depth_percentage: u8) {
    with_shared_bridge(|bridge| Tracker::new(bridge).track_scroll_depth(route, depth_percentage));
}

pub fn track_like(post_id: &str, post_title: &str, liked: bool) {
    with_shared_bridge(|bridge| Tracker::new(bridge).track_like(post_id, post_title, liked));
}

pub fn track_share(post_id: &str, post_title: &str, platform: &str) {
    with_shared_bridge(|bridge| Tracker::new(bridge).track_share(post_id, post_title, platform));
}

pub fn track_comment(post_id: &str, post_title: &str, action: &str) {
    with_shared_bridge(|bridge| Tracker::new(bridge).track_comment(post_id, post_title, action));
}

pub fn track_category_click(category: &str, source: &str) {
    with_shared_bridge(|bridge| Tracker::new(bridge).track_category_click(category, source));
}

pub fn track_tag_click(tag: &str, source: &str) {
    with_shared_bridge(|bridge| Tracker::new(bridge).track_tag_click(tag, source));
}

pub fn track_navigation(destination: &str, source: &str) {
    with_shared_bridge(|bridge| Tracker::new(bridge).track_navigation(destination, source));
}

pub fn track_outbound_link(url: &str, referer: &str, post_id: Option<&str>) {
    with_shared_bridge(|bridge| Tracker::new(bridge).track_outbound_link(url, referer, post_id));
}

pub fn track_search(query: &str, results_count: usize) {
    with_shared_bridge(|bridge| Tracker::new(bridge).track_search(query, results_count));
}

pub fn track_custom_event(event_name: &str, params: Value) {
    with_shared_bridge(|bridge| Tracker::new(bridge).track_custom_event(event_name, params));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::recording::RecordingSdk;
    use crate::app::FirebaseOptions;
    use std::rc::Rc;

    fn initialized_bridge() -> (AnalyticsBridge, RecordingSdk) {
        let sdk = RecordingSdk::new();
        let bridge = AnalyticsBridge::new(Rc::new(sdk.clone()));
        let options = FirebaseOptions {
            api_key: Some("key".into()),
            project_id: Some("blog".into()),
            app_id: Some("1:1:web:1".into()),
            ..Default::default()
        };
        assert!(bridge.init_firebase(&options));
        (bridge, sdk)
    }

    #[test]
    fn helpers_are_silent_without_initialization() {
        let sdk = RecordingSdk::new();
        let bridge = AnalyticsBridge::new(Rc::new(sdk.clone()));
        let tracker = Tracker::new(&bridge);

        tracker.track_page_view("/", "Home");
        tracker.track_like("post-1", "Hello", true);
        tracker.track_custom_event("anything", json!({"a": 1}));

        assert!(sdk.recorded_events().is_empty());
    }

    #[test]
    fn post_view_includes_optional_category() {
        let (bridge, sdk) = initialized_bridge();
        let tracker = Tracker::new(&bridge);

        tracker.track_post_view("post-123", "My Post", Some("tech"));
        tracker.track_post_view("post-456", "Other", None);

        let events = sdk.recorded_events();
        assert_eq!(events[0].name, "post_view");
        assert_eq!(
            Value::Object(events[0].params.clone()),
            json!({"post_id": "post-123", "post_title": "My Post", "category": "tech"})
        );
        assert!(!events[1].params.contains_key("category"));
    }

    #[test]
    fn time_on_page_reports_rounded_minutes() {
        let (bridge, sdk) = initialized_bridge();
        Tracker::new(&bridge).track_time_on_page("/blog/post", 95.0);

        let event = &sdk.recorded_events()[0];
        assert_eq!(event.name, "time_on_page");
        assert_eq!(event.params["page"], "/blog/post");
        assert_eq!(event.params["duration_seconds"], 95.0);
        assert_eq!(event.params["duration_minutes"], 2.0);
    }

    #[test]
    fn engagement_events_use_their_own_names() {
        let (bridge, sdk) = initialized_bridge();
        let tracker = Tracker::new(&bridge);

        tracker.track_like("p", "T", false);
        tracker.track_share("p", "T", "twitter");
        tracker.track_comment("p", "T", "submitted");
        tracker.track_category_click("rust", "sidebar");
        tracker.track_tag_click("wasm", "post_footer");
        tracker.track_navigation("/about", "navbar");
        tracker.track_scroll_depth("/", 75);
        tracker.track_search("tokio", 3);

        let names: Vec<_> = sdk.recorded_events().into_iter().map(|e| e.name).collect();
        assert_eq!(
            names,
            [
                "engagement_like",
                "engagement_share",
                "engagement_comment",
                "navigation_category",
                "navigation_tag",
                "navigation_click",
                "scroll_depth",
                "search",
            ]
        );
        let events = sdk.recorded_events();
        assert_eq!(events[0].params["action"], "unliked");
        assert_eq!(events[6].params["depth_percentage"], 75);
        assert_eq!(events[7].params["results_count"], 3);
    }

    #[test]
    fn outbound_link_carries_post_context() {
        let (bridge, sdk) = initialized_bridge();
        Tracker::new(&bridge).track_outbound_link(
            "https://docs.rs",
            "https://blog.example.com/posts/1",
            Some("post-1"),
        );

        let event = &sdk.recorded_events()[0];
        assert_eq!(event.params["url"], "https://docs.rs");
        assert_eq!(event.params["post_id"], "post-1");
    }

    #[test]
    fn custom_event_wraps_scalar_params() {
        let (bridge, sdk) = initialized_bridge();
        let tracker = Tracker::new(&bridge);

        tracker.track_custom_event("newsletter_signup", json!("footer"));
        tracker.track_custom_event("app_open", Value::Null);

        let events = sdk.recorded_events();
        assert_eq!(events[0].params["value"], "footer");
        assert!(events[1].params.is_empty());
    }

    struct BreadcrumbLog;

    static BREADCRUMBS: std::sync::Mutex<Vec<String>> = std::sync::Mutex::new(Vec::new());

    impl log::Log for BreadcrumbLog {
        fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            BREADCRUMBS.lock().unwrap().push(record.args().to_string());
        }

        fn flush(&self) {}
    }

    #[test]
    fn blank_custom_event_leaves_no_breadcrumb() {
        static INSTALL: std::sync::Once = std::sync::Once::new();
        INSTALL.call_once(|| {
            log::set_logger(&BreadcrumbLog).unwrap();
            log::set_max_level(log::LevelFilter::Debug);
        });

        let (bridge, sdk) = initialized_bridge();
        bridge.logger().set_log_handler(|_, _, _| {});
        let tracker = Tracker::new(&bridge);

        tracker.track_custom_event("\t", json!({"a": 1}));
        tracker.track_custom_event("newsletter_open", Value::Null);

        let breadcrumbs = BREADCRUMBS.lock().unwrap();
        assert!(!breadcrumbs.iter().any(|line| line == "Analytics: Custom event - \t"));
        assert!(breadcrumbs
            .iter()
            .any(|line| line == "Analytics: Custom event - newsletter_open"));
        let names: Vec<_> = sdk.recorded_events().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["newsletter_open"]);
    }

    #[test]
    fn page_view_goes_through_bridge_page_view() {
        let (bridge, sdk) = initialized_bridge();
        Tracker::new(&bridge).track_page_view("/tags/rust", "Rust");

        let event = &sdk.recorded_events()[0];
        assert_eq!(event.name, "page_view");
        assert_eq!(event.params["page_path"], "/tags/rust");
    }
}
