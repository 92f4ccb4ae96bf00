use std::collections::HashMap;

use bevy::input::gamepad::{Gamepad, GamepadAxis, GamepadButton};
use bevy::prelude::*;
use constants::controls::GAMEPAD_DEADZONE;

/// Analog values below the deadzone are zero; everything else passes through unchanged.
pub fn apply_deadzone(value: f32) -> f32 {
    if value.abs() < GAMEPAD_DEADZONE {
        0.0
    } else {
        value
    }
}

/// Input collected from window events between two viewer updates.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pub(super) held: HashMap<KeyCode, bool>,
    pub(super) pressed_this_frame: Vec<KeyCode>,
    pub(super) mouse_held: HashMap<MouseButton, bool>,
    /// Connected gamepad the viewer polls, if any.
    pub gamepad: Option<Entity>,
    /// Mouse motion while the rotate button was held.
    pub rotate_drag: Vec2,
    /// Mouse motion while a pan button was held.
    pub pan_drag: Vec2,
    /// Wheel lines, positive away from the user.
    pub scroll: f32,
}

impl InputState {
    pub fn key_down(&mut self, key: KeyCode) {
        if !self.is_held(key) {
            self.pressed_this_frame.push(key);
        }
        self.held.insert(key, true);
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.held.insert(key, false);
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.get(&key).copied().unwrap_or(false)
    }

    pub fn any_held(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|key| self.is_held(*key))
    }

    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.pressed_this_frame.contains(&key)
    }

    pub fn mouse_button(&mut self, button: MouseButton, pressed: bool) {
        self.mouse_held.insert(button, pressed);
    }

    pub fn mouse_motion(&mut self, delta: Vec2) {
        let held = |button| self.mouse_held.get(&button).copied().unwrap_or(false);
        if held(MouseButton::Left) {
            self.rotate_drag += delta;
        } else if held(MouseButton::Right) || held(MouseButton::Middle) {
            self.pan_drag += delta;
        }
    }

    pub fn mouse_scroll(&mut self, lines: f32) {
        self.scroll += lines;
    }

    /// Drop per-frame edges and accumulated mouse motion; held keys persist.
    pub fn end_frame(&mut self) {
        self.pressed_this_frame.clear();
        self.rotate_drag = Vec2::ZERO;
        self.pan_drag = Vec2::ZERO;
        self.scroll = 0.0;
    }

    /// Forget everything, including the gamepad.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Keyboard movement as `(strafe, vertical, forward)`, each in `-1..=1`.
    pub fn keyboard_axes(&self) -> Vec3 {
        let axis = |negative: &[KeyCode], positive: &[KeyCode]| {
            self.any_held(positive) as i32 as f32 - self.any_held(negative) as i32 as f32
        };
        Vec3::new(
            axis(
                &[KeyCode::KeyA, KeyCode::ArrowLeft],
                &[KeyCode::KeyD, KeyCode::ArrowRight],
            ),
            axis(
                &[KeyCode::KeyQ, KeyCode::PageDown],
                &[KeyCode::KeyE, KeyCode::PageUp],
            ),
            axis(
                &[KeyCode::KeyS, KeyCode::ArrowDown],
                &[KeyCode::KeyW, KeyCode::ArrowUp],
            ),
        )
    }

    pub fn reset_requested(&self) -> bool {
        self.just_pressed(KeyCode::KeyR)
    }
}

/// Gamepad state sampled once per frame, with the deadzone already applied.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct GamepadSnapshot {
    pub left_stick: Vec2,
    pub right_stick: Vec2,
    /// Raise (north face button) and lower (south face button).
    pub raise: bool,
    pub lower: bool,
    /// Analog triggers: left dollies out, right dollies in.
    pub left_trigger: f32,
    pub right_trigger: f32,
    /// Shoulder buttons: left pulls back, right pushes in.
    pub left_shoulder: bool,
    pub right_shoulder: bool,
    pub reset: bool,
}

impl GamepadSnapshot {
    pub fn from_gamepad(gamepad: &Gamepad) -> Self {
        let axis = |axis: GamepadAxis| apply_deadzone(gamepad.get(axis).unwrap_or(0.0));
        let analog = |button: GamepadButton| apply_deadzone(gamepad.get(button).unwrap_or(0.0));

        Self {
            left_stick: Vec2::new(axis(GamepadAxis::LeftStickX), axis(GamepadAxis::LeftStickY)),
            right_stick: Vec2::new(
                axis(GamepadAxis::RightStickX),
                axis(GamepadAxis::RightStickY),
            ),
            raise: gamepad.pressed(GamepadButton::North),
            lower: gamepad.pressed(GamepadButton::South),
            left_trigger: analog(GamepadButton::LeftTrigger2),
            right_trigger: analog(GamepadButton::RightTrigger2),
            left_shoulder: gamepad.pressed(GamepadButton::LeftTrigger),
            right_shoulder: gamepad.pressed(GamepadButton::RightTrigger),
            reset: gamepad.just_pressed(GamepadButton::Select),
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadzone_zeroes_small_values_only() {
        assert_eq!(apply_deadzone(0.0), 0.0);
        assert_eq!(apply_deadzone(GAMEPAD_DEADZONE * 0.99), 0.0);
        assert_eq!(apply_deadzone(-GAMEPAD_DEADZONE * 0.99), 0.0);
        assert_eq!(apply_deadzone(GAMEPAD_DEADZONE), GAMEPAD_DEADZONE);
        assert_eq!(apply_deadzone(-0.75), -0.75);
    }

    #[test]
    fn key_edges_last_one_frame() {
        let mut input = InputState::default();
        input.key_down(KeyCode::KeyR);
        assert!(input.reset_requested());

        // Key repeat does not produce a second edge.
        input.end_frame();
        input.key_down(KeyCode::KeyR);
        assert!(!input.reset_requested());
        assert!(input.is_held(KeyCode::KeyR));

        input.key_up(KeyCode::KeyR);
        input.key_down(KeyCode::KeyR);
        assert!(input.reset_requested());
    }

    #[test]
    fn keyboard_axes_cancel_opposites() {
        let mut input = InputState::default();
        input.key_down(KeyCode::KeyW);
        input.key_down(KeyCode::KeyD);
        input.key_down(KeyCode::KeyE);
        assert_eq!(input.keyboard_axes(), Vec3::new(1.0, 1.0, 1.0));

        input.key_down(KeyCode::ArrowDown);
        input.key_down(KeyCode::KeyQ);
        assert_eq!(input.keyboard_axes(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn mouse_motion_is_routed_by_button() {
        let mut input = InputState::default();
        input.mouse_motion(Vec2::new(5.0, 5.0));
        assert_eq!(input.rotate_drag, Vec2::ZERO);

        input.mouse_button(MouseButton::Left, true);
        input.mouse_motion(Vec2::new(3.0, -1.0));
        input.mouse_button(MouseButton::Left, false);
        input.mouse_button(MouseButton::Right, true);
        input.mouse_motion(Vec2::new(2.0, 2.0));

        assert_eq!(input.rotate_drag, Vec2::new(3.0, -1.0));
        assert_eq!(input.pan_drag, Vec2::new(2.0, 2.0));

        input.end_frame();
        assert_eq!(input.pan_drag, Vec2::ZERO);
    }

    #[test]
    fn clear_forgets_gamepad_and_keys() {
        let mut input = InputState {
            gamepad: Some(Entity::PLACEHOLDER),
            ..default()
        };
        input.key_down(KeyCode::KeyW);
        input.clear();
        assert!(input.gamepad.is_none());
        assert!(!input.is_held(KeyCode::KeyW));
    }
}
