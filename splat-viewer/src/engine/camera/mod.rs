//! Camera navigation for the splat viewers.
//!
//! The camera is modelled as a position/target pair that keyboard, gamepad and
//! mouse input move each frame; the viewer writes the resulting look-at transform
//! onto its camera entity.

/// Keyboard, mouse and gamepad state consumed once per frame.
pub mod input;
/// Keyboard and gamepad translation, dolly and orbit mapping.
pub mod movement;
/// Damped mouse orbit, pan and zoom.
pub mod orbit_controls;
/// Camera position and look-at target with translate/dolly/orbit operations.
pub mod rig;
