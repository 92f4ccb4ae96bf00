/// Analog magnitudes below this are treated as zero.
pub const GAMEPAD_DEADZONE: f32 = 0.1;

/// Dolly-in never brings the camera closer than this to its target.
pub const MIN_DOLLY_DISTANCE: f32 = 0.5;

/// Movement speed in world units per second.
pub const DEFAULT_MOVEMENT_SPEED: f32 = 2.0;
pub const MIN_MOVEMENT_SPEED: f32 = 0.1;
pub const MAX_MOVEMENT_SPEED: f32 = 10.0;
pub const MOVEMENT_SPEED_STEP: f32 = 0.1;

/// Right-stick orbit rate in radians per second at full deflection and speed 1.0.
pub const DEFAULT_ORBIT_SPEED: f32 = 1.5;

/// Fraction of the camera-to-target distance removed per second by a fully pressed trigger.
pub const TRIGGER_DOLLY_RATE: f32 = 0.8;

/// Fraction of the camera-to-target distance changed per second by a held shoulder button.
pub const SHOULDER_DOLLY_RATE: f32 = 0.5;

/// Pitch is refused once the view direction gets this close (radians) to straight up or down.
pub const POLAR_MARGIN: f32 = 0.01;

/// Share of pending orbit-controls motion that is consumed each frame.
pub const DEFAULT_DAMPING_FACTOR: f32 = 0.05;

/// Mouse orbit sensitivity in radians per pixel of drag.
pub const MOUSE_ROTATE_SPEED: f32 = 0.005;

/// Mouse pan sensitivity as a fraction of the camera distance per pixel of drag.
pub const MOUSE_PAN_SPEED: f32 = 0.002;

/// Per-line wheel zoom step.
pub const MOUSE_ZOOM_STEP: f32 = 0.95;
