use bevy::prelude::*;
use constants::controls::{SHOULDER_DOLLY_RATE, TRIGGER_DOLLY_RATE};

use super::input::GamepadSnapshot;
use super::rig::CameraRig;

/// Apply keyboard axes `(strafe, vertical, forward)` as a translation of `speed * dt` units.
pub fn apply_keyboard(rig: &mut CameraRig, axes: Vec3, speed: f32, dt: f32) {
    if axes == Vec3::ZERO {
        return;
    }
    let (forward, right) = rig.planar_basis();
    let direction = right * axes.x + Vec3::Y * axes.y + forward * axes.z;
    rig.translate(direction * speed * dt);
}

/// Apply one frame of gamepad input to `rig`.
///
/// Sticks translate and orbit proportionally to their deflection; triggers and
/// shoulder buttons dolly by scaling the camera-to-target offset.
pub fn apply_gamepad(
    rig: &mut CameraRig,
    pad: &GamepadSnapshot,
    speed: f32,
    orbit_speed: f32,
    dt: f32,
) {
    let vertical = pad.raise as i32 as f32 - pad.lower as i32 as f32;
    let (forward, right) = rig.planar_basis();
    let direction = right * pad.left_stick.x + forward * pad.left_stick.y + Vec3::Y * vertical;
    if direction != Vec3::ZERO {
        rig.translate(direction * speed * dt);
    }

    // Right trigger dollies in, left trigger out.
    let trigger = pad.left_trigger - pad.right_trigger;
    if trigger != 0.0 {
        rig.dolly(1.0 + trigger * TRIGGER_DOLLY_RATE * dt);
    }

    // Left shoulder pulls back, right shoulder pushes in.
    let shoulder = pad.left_shoulder as i32 as f32 - pad.right_shoulder as i32 as f32;
    if shoulder != 0.0 {
        rig.dolly(1.0 + shoulder * SHOULDER_DOLLY_RATE * dt);
    }

    if pad.right_stick != Vec2::ZERO {
        let rate = orbit_speed * speed * dt;
        rig.orbit(-pad.right_stick.x * rate, -pad.right_stick.y * rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::camera::input::apply_deadzone;
    use constants::controls::{GAMEPAD_DEADZONE, MIN_DOLLY_DISTANCE};

    #[test]
    fn keyboard_forward_stays_on_the_ground_plane() {
        let mut rig = CameraRig::default_framing();
        let start = rig;
        apply_keyboard(&mut rig, Vec3::new(0.0, 0.0, 1.0), 2.0, 0.5);

        let moved = rig.position - start.position;
        assert!(moved.y.abs() < 1e-6);
        assert!((moved.length() - 1.0).abs() < 1e-5);
        assert!(rig.offset().abs_diff_eq(start.offset(), 1e-5));
    }

    #[test]
    fn keyboard_vertical_moves_straight_up() {
        let mut rig = CameraRig::default_framing();
        apply_keyboard(&mut rig, Vec3::Y, 4.0, 0.25);
        assert!(rig.target.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn stick_inside_deadzone_produces_no_movement() {
        let mut rig = CameraRig::default_framing();
        let raw = GAMEPAD_DEADZONE * 0.5;
        let pad = GamepadSnapshot {
            left_stick: Vec2::new(apply_deadzone(raw), apply_deadzone(-raw)),
            right_stick: Vec2::new(apply_deadzone(raw), 0.0),
            left_trigger: apply_deadzone(raw),
            ..default()
        };
        assert!(pad.is_idle());

        apply_gamepad(&mut rig, &pad, 3.0, 1.5, 1.0);
        assert_eq!(rig, CameraRig::default_framing());
    }

    #[test]
    fn stick_movement_scales_with_axis_and_speed() {
        let distance_for = |axis: f32, speed: f32| {
            let mut rig = CameraRig::default_framing();
            let pad = GamepadSnapshot {
                left_stick: Vec2::new(apply_deadzone(axis), 0.0),
                ..default()
            };
            apply_gamepad(&mut rig, &pad, speed, 1.0, 0.1);
            (rig.position - CameraRig::default_framing().position).length()
        };

        let base = distance_for(0.5, 1.0);
        assert!(base > 0.0);
        assert!((distance_for(1.0, 1.0) - 2.0 * base).abs() < 1e-5);
        assert!((distance_for(0.5, 3.0) - 3.0 * base).abs() < 1e-5);
    }

    #[test]
    fn triggers_never_dolly_past_minimum() {
        let mut rig = CameraRig::default_framing();
        let pad = GamepadSnapshot {
            right_trigger: 1.0,
            right_shoulder: true,
            ..default()
        };
        for _ in 0..500 {
            apply_gamepad(&mut rig, &pad, 2.0, 1.5, 0.1);
            assert!(rig.distance() >= MIN_DOLLY_DISTANCE - 1e-4);
        }
        assert!((rig.distance() - MIN_DOLLY_DISTANCE).abs() < 1e-3);
    }

    #[test]
    fn left_shoulder_pulls_back() {
        let mut rig = CameraRig::default_framing();
        let distance = rig.distance();
        let pad = GamepadSnapshot {
            left_shoulder: true,
            ..default()
        };
        apply_gamepad(&mut rig, &pad, 2.0, 1.5, 0.5);
        assert!(rig.distance() > distance);
    }

    #[test]
    fn right_stick_orbits_around_target() {
        let mut rig = CameraRig::default_framing();
        let distance = rig.distance();
        let pad = GamepadSnapshot {
            right_stick: Vec2::new(0.8, 0.3),
            ..default()
        };
        apply_gamepad(&mut rig, &pad, 1.0, 1.5, 0.1);

        assert_eq!(rig.target, Vec3::ZERO);
        assert!((rig.distance() - distance).abs() < 1e-4);
        assert_ne!(rig.position, CameraRig::default_framing().position);
    }

    #[test]
    fn face_buttons_move_camera_and_target_vertically() {
        let start = CameraRig::default_framing();
        let mut rig = start;
        let raise = GamepadSnapshot {
            raise: true,
            ..default()
        };
        apply_gamepad(&mut rig, &raise, 2.0, 1.5, 0.25);
        assert!((rig.position - start.position).abs_diff_eq(Vec3::Y * 0.5, 1e-6));
        assert!((rig.target - start.target).abs_diff_eq(Vec3::Y * 0.5, 1e-6));

        let lower = GamepadSnapshot {
            lower: true,
            ..default()
        };
        apply_gamepad(&mut rig, &lower, 2.0, 1.5, 0.25);
        assert!(rig.approx_eq(&start, 1e-6));

        // Both held cancel out.
        let both = GamepadSnapshot {
            raise: true,
            lower: true,
            ..default()
        };
        apply_gamepad(&mut rig, &both, 2.0, 1.5, 0.25);
        assert!(rig.approx_eq(&start, 1e-6));
    }

    #[test]
    fn right_stick_pitch_keeps_heading_and_scales_with_speed() {
        let azimuth = |rig: &CameraRig| rig.offset().x.atan2(rig.offset().z);
        let elevation = |rig: &CameraRig| (rig.offset().y / rig.distance()).asin();
        let start = CameraRig::default_framing();
        let pitched = |speed: f32| {
            let mut rig = start;
            let pad = GamepadSnapshot {
                right_stick: Vec2::new(0.0, 0.5),
                ..default()
            };
            apply_gamepad(&mut rig, &pad, speed, 1.0, 0.1);
            rig
        };

        let slow = pitched(1.0);
        let fast = pitched(2.0);
        for rig in [&slow, &fast] {
            assert!((azimuth(rig) - azimuth(&start)).abs() < 1e-5);
            assert!((rig.distance() - start.distance()).abs() < 1e-4);
            assert_eq!(rig.target, start.target);
        }

        // rate = orbit_speed * speed * dt, applied to a half-deflected stick.
        let slow_delta = elevation(&slow) - elevation(&start);
        let fast_delta = elevation(&fast) - elevation(&start);
        assert!((slow_delta.abs() - 0.05).abs() < 1e-4);
        assert!((fast_delta - 2.0 * slow_delta).abs() < 1e-4);
    }
}
