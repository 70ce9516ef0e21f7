//! Best-effort analytics for Rust and WebAssembly hosts, delegating every call to the Firebase
//! Analytics SDK.
//!
//! The crate never reports telemetry failures to the host beyond the boolean result of
//! initialization: calls made before initialization, or rejected by the vendor SDK, are logged
//! and dropped.
//!
//! * [`app`]: the Firebase web configuration and its loaders.
//! * [`analytics`]: the bridge, the vendor SDK seam, typed tracking helpers and engagement
//!   measurements.
//! * [`logger`]: the leveled logger behind every diagnostic.
//!
//! Enable the `wasm-web` feature on `wasm32` to drive the browser's global `firebase` object.
//! Elsewhere the shared bridge starts without a vendor SDK; install one with
//! [`analytics::install_sdk`] (for example [`analytics::RecordingSdk`]).

pub mod analytics;
pub mod app;
pub mod logger;
