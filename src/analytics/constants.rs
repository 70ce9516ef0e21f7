pub(crate) const LOGGER_NAME: &str = "@firebase/analytics-bridge";
pub(crate) const DEFAULT_APP_NAME: &str = "[DEFAULT]";
pub(crate) const PAGE_VIEW_EVENT: &str = "page_view";
