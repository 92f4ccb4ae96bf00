use bevy::math::Quat;

/// Rotation applied to every decoded splat asset so it stands upright in this viewer.
/// Fixed calibration: 180° about X.
pub const SPLAT_CORRECTION: Quat = Quat::from_xyzw(1.0, 0.0, 0.0, 0.0);

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;

    #[test]
    fn correction_flips_y_and_z() {
        let mapped = SPLAT_CORRECTION * Vec3::new(1.0, 2.0, 3.0);
        assert!((mapped - Vec3::new(1.0, -2.0, -3.0)).length() < 1e-6);
    }

    #[test]
    fn correction_is_normalised() {
        assert!(SPLAT_CORRECTION.is_normalized());
    }
}
