//! In-memory vendor SDK for native hosts and tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::analytics::constants::DEFAULT_APP_NAME;
use crate::analytics::error::AnalyticsResult;
use crate::analytics::sdk::{AnalyticsClient, EventParams, FirebaseAppHandle, FirebaseSdk};
use crate::app::FirebaseOptions;

#[derive(Clone, Debug, PartialEq)]
pub struct AnalyticsEvent {
    pub name: String,
    pub params: EventParams,
}

#[derive(Debug, Default)]
struct RecordingState {
    initialize_calls: usize,
    analytics_calls: usize,
    events: Vec<AnalyticsEvent>,
    user_properties: Vec<EventParams>,
    screens: Vec<String>,
}

/// Records every call the bridge makes instead of sending anything.
///
/// Clones share the same recording, so a test can hand one clone to the bridge and inspect the
/// other.
#[derive(Clone, Debug, Default)]
pub struct RecordingSdk {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the vendor's `initializeApp` equivalent was invoked.
    pub fn initialize_calls(&self) -> usize {
        self.state.borrow().initialize_calls
    }

    pub fn analytics_calls(&self) -> usize {
        self.state.borrow().analytics_calls
    }

    pub fn recorded_events(&self) -> Vec<AnalyticsEvent> {
        self.state.borrow().events.clone()
    }

    pub fn user_properties(&self) -> Vec<EventParams> {
        self.state.borrow().user_properties.clone()
    }

    pub fn screens(&self) -> Vec<String> {
        self.state.borrow().screens.clone()
    }
}

impl FirebaseSdk for RecordingSdk {
    fn is_loaded(&self) -> bool {
        true
    }

    fn initialize_app(&self, options: &FirebaseOptions) -> AnalyticsResult<FirebaseAppHandle> {
        self.state.borrow_mut().initialize_calls += 1;
        Ok(FirebaseAppHandle::new(
            DEFAULT_APP_NAME,
            options.clone(),
            Rc::new(()),
        ))
    }

    fn analytics(&self, _app: &FirebaseAppHandle) -> AnalyticsResult<Rc<dyn AnalyticsClient>> {
        self.state.borrow_mut().analytics_calls += 1;
        Ok(Rc::new(RecordingClient {
            state: Rc::clone(&self.state),
        }))
    }
}

struct RecordingClient {
    state: Rc<RefCell<RecordingState>>,
}

impl AnalyticsClient for RecordingClient {
    fn log_event(&self, name: &str, params: &EventParams) -> AnalyticsResult<()> {
        self.state.borrow_mut().events.push(AnalyticsEvent {
            name: name.to_string(),
            params: params.clone(),
        });
        Ok(())
    }

    fn set_user_properties(&self, properties: &EventParams) -> AnalyticsResult<()> {
        self.state
            .borrow_mut()
            .user_properties
            .push(properties.clone());
        Ok(())
    }

    fn set_current_screen(&self, screen_name: &str) -> AnalyticsResult<()> {
        self.state.borrow_mut().screens.push(screen_name.to_string());
        Ok(())
    }
}
