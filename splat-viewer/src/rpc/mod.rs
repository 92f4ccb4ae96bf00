//! JSON-RPC 2.0 bridge to a host page.
//!
//! When the viewer runs inside an iframe, the parent page drives it over
//! `postMessage`. Requests carry an `id` and get a response; messages without
//! an `id` are treated as notifications and acted on silently.
//!
//! ```text
//! Host page (parent)      <──postMessage──>   Viewer (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Queue ShellCommand
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! ## Methods
//!
//! - `set_viewer { viewer }`: switch to `"splat"` or `"turntable"`
//! - `load_url { url }`: load an asset from a URL
//! - `load_sample`: load the configured sample asset
//! - `set_speed { speed }`: set the movement speed
//! - `reset_camera`: return to the framing of the last load
//! - `get_status`: active viewer, loading flag and speed
//! - `get_fps`: smoothed frame rate
//!
//! ## Notifications
//!
//! - `splat_loaded { name, splat_count }`
//! - `notice { level, message }`: the same messages the controls show the user
//! - `fps_update { fps }`: every half second
//!
//! ## Error codes
//!
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error

/// Request handling, notification queueing and the wasm message listener.
pub mod web_rpc;
