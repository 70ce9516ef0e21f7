//! Engagement measurements feeding the tracker: scroll depth milestones, time on page and
//! outbound link detection.
//!
//! Timestamps are milliseconds since the Unix epoch as `f64`, which is what `Date.now()` yields
//! in the browser. [`now_millis`] returns the current one on every target.

use url::Url;

use crate::analytics::tracker::Tracker;

/// Scroll depths reported once each, in percent.
pub const SCROLL_MILESTONES: [u8; 4] = [25, 50, 75, 100];

/// Interval applied to scroll listeners.
pub const DEFAULT_THROTTLE_MS: f64 = 500.0;

/// Remembers which scroll milestones were already reported for a page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScrollDepthTracker {
    reached: [bool; SCROLL_MILESTONES.len()],
}

impl ScrollDepthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the current scroll position and returns the milestones crossed for the first time.
    pub fn observe(&mut self, scroll_top: f64, viewport_height: f64, document_height: f64) -> Vec<u8> {
        if document_height <= 0.0 {
            return Vec::new();
        }
        let percentage = ((scroll_top + viewport_height) / document_height * 100.0).clamp(0.0, 100.0);

        let mut crossed = Vec::new();
        for (reached, milestone) in self.reached.iter_mut().zip(SCROLL_MILESTONES) {
            if !*reached && percentage >= f64::from(milestone) {
                *reached = true;
                crossed.push(milestone);
            }
        }
        crossed
    }

    /// Like [`observe`](Self::observe) but reports each new milestone through `tracker`.
    pub fn observe_and_track(
        &mut self,
        tracker: &Tracker<'_>,
        route: &str,
        scroll_top: f64,
        viewport_height: f64,
        document_height: f64,
    ) -> Vec<u8> {
        let crossed = self.observe(scroll_top, viewport_height, document_height);
        for milestone in &crossed {
            tracker.track_scroll_depth(route, *milestone);
        }
        crossed
    }

    pub fn reached(&self) -> Vec<u8> {
        SCROLL_MILESTONES
            .into_iter()
            .zip(self.reached)
            .filter_map(|(milestone, reached)| reached.then_some(milestone))
            .collect()
    }
}

/// Lets a call through only if `interval_ms` passed since the last one it let through.
#[derive(Clone, Debug, PartialEq)]
pub struct Throttle {
    interval_ms: f64,
    last_call: Option<f64>,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_MS)
    }
}

impl Throttle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_call: None,
        }
    }

    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_call {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_call = Some(now_ms);
                true
            }
        }
    }
}

/// Measures how long a page stayed open.
#[derive(Clone, Debug, PartialEq)]
pub struct PageTimer {
    route: String,
    started_at_ms: f64,
}

impl PageTimer {
    pub fn start(route: impl Into<String>, now_ms: f64) -> Self {
        Self {
            route: route.into(),
            started_at_ms: now_ms,
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn elapsed_seconds(&self, now_ms: f64) -> f64 {
        ((now_ms - self.started_at_ms) / 1000.0).max(0.0)
    }

    /// Emits `time_on_page` and returns the measured duration.
    pub fn finish(self, tracker: &Tracker<'_>, now_ms: f64) -> f64 {
        let seconds = self.elapsed_seconds(now_ms);
        tracker.track_time_on_page(&self.route, seconds);
        seconds
    }
}

/// Whether `href` leaves the site served from `current_origin`.
///
/// Relative links, non-HTTP schemes and unparsable values are never outbound.
pub fn is_outbound_link(href: &str, current_origin: &str) -> bool {
    let Ok(target) = Url::parse(href) else {
        return false;
    };
    if !matches!(target.scheme(), "http" | "https") {
        return false;
    }
    match Url::parse(current_origin) {
        Ok(current) => target.origin() != current.origin(),
        Err(_) => true,
    }
}

pub fn now_millis() -> f64 {
    #[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
    {
        js_sys::Date::now()
    }

    #[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
    {
        chrono::Utc::now().timestamp_millis() as f64
    }
}
