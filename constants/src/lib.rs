//! Calibration constants shared across the splat viewer workspace.

/// Camera projection and default framing.
pub mod camera;

/// Keyboard, gamepad and orbit-controls tuning.
pub mod controls;

/// Orientation correction applied to every decoded splat asset.
pub mod coordinate_system;

/// Asset locations and decoding constants.
pub mod splat;
