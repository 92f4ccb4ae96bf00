//! Asset fetching, background decoding and runtime configuration.
//!
//! A splat load is a single suspension point: the viewer hands a URL or file to
//! [`pending::PendingLoad`], which fetches and decodes off the frame loop and
//! resolves exactly once. The viewer polls the slot every frame and attaches
//! the mesh when it fills.

/// Viewer configuration asset and the loading-state transition it gates.
///
/// Reads optional overrides from JSON and moves the app into `Running`.
pub mod config_loader;

/// Platform byte fetching: browser `fetch` on wasm, `reqwest` or local files on native.
pub mod fetch;

/// One-shot background load slot polled by viewers.
pub mod pending;
