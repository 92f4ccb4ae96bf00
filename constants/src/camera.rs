use bevy::math::Vec3;

/// Vertical field of view of the perspective camera, in degrees.
pub const DEFAULT_FOV_DEGREES: f32 = 75.0;

pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;

/// Camera offset from the origin used once an asset signals readiness.
/// Symmetric diagonal, so the asset is framed from above and to the side.
pub const DEFAULT_FRAMING_OFFSET: Vec3 = Vec3::splat(3.0);

/// Look-at target of the default framing.
pub const DEFAULT_FRAMING_TARGET: Vec3 = Vec3::ZERO;

/// Turntable camera height above the target, as a fraction of the orbit radius.
pub const TURNTABLE_HEIGHT_RATIO: f32 = 0.5;

/// Turntable angular velocity at movement speed 1.0, in radians per second.
pub const TURNTABLE_RATE: f32 = 0.35;
