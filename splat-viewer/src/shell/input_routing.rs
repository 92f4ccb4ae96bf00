use bevy::input::{
    ButtonState,
    gamepad::GamepadConnectionEvent,
    keyboard::KeyboardInput,
    mouse::{MouseButtonInput, MouseMotion, MouseScrollUnit, MouseWheel},
};
use bevy::prelude::*;

use super::ViewerShell;

/// Pixel-unit wheel deltas per line.
const PIXELS_PER_LINE: f32 = 100.0;

/// Forward this frame's window input to the active viewer. Events are consumed
/// even when the viewer takes no input, so nothing leaks into a later viewer.
pub fn route_viewer_input(
    mut shell: Option<ResMut<ViewerShell>>,
    mut keyboard: EventReader<KeyboardInput>,
    mut mouse_buttons: EventReader<MouseButtonInput>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut mouse_wheel: EventReader<MouseWheel>,
    mut gamepad_connections: EventReader<GamepadConnectionEvent>,
) {
    let Some(input) = shell.as_mut().and_then(|shell| shell.input_mut()) else {
        keyboard.clear();
        mouse_buttons.clear();
        mouse_motion.clear();
        mouse_wheel.clear();
        gamepad_connections.clear();
        return;
    };

    for event in keyboard.read() {
        match event.state {
            ButtonState::Pressed => input.key_down(event.key_code),
            ButtonState::Released => input.key_up(event.key_code),
        }
    }
    for event in mouse_buttons.read() {
        input.mouse_button(event.button, event.state.is_pressed());
    }
    for event in mouse_motion.read() {
        input.mouse_motion(event.delta);
    }
    for event in mouse_wheel.read() {
        let lines = match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / PIXELS_PER_LINE,
        };
        input.mouse_scroll(lines);
    }
    for event in gamepad_connections.read() {
        if event.connected() && input.gamepad.is_none() {
            info!("Gamepad {} connected", event.gamepad);
            input.gamepad = Some(event.gamepad);
        } else if event.disconnected() && input.gamepad == Some(event.gamepad) {
            info!("Gamepad {} disconnected", event.gamepad);
            input.gamepad = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::frame_loop::FrameScheduler;
    use crate::viewer::{ViewerKind, settings::ViewerSettings};

    fn routing_app(kind: ViewerKind) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<ViewerSettings>()
            .init_resource::<FrameScheduler>()
            .add_event::<KeyboardInput>()
            .add_event::<MouseButtonInput>()
            .add_event::<MouseMotion>()
            .add_event::<MouseWheel>()
            .add_event::<GamepadConnectionEvent>()
            .init_resource::<ViewerShell>()
            .add_systems(Update, route_viewer_input);
        let world = app.world_mut();
        world.resource_scope(|world, mut shell: Mut<ViewerShell>| {
            shell.switch_viewer(world, kind).unwrap();
        });
        app
    }

    fn key(app: &mut App, key_code: KeyCode, state: ButtonState) {
        app.world_mut().send_event(KeyboardInput {
            key_code,
            logical_key: bevy::input::keyboard::Key::Character("w".into()),
            state,
            text: None,
            repeat: false,
            window: Entity::PLACEHOLDER,
        });
    }

    #[test]
    fn keys_reach_the_active_viewer() {
        let mut app = routing_app(ViewerKind::Splat);
        key(&mut app, KeyCode::KeyW, ButtonState::Pressed);
        app.update();

        let mut shell = app.world_mut().resource_mut::<ViewerShell>();
        assert!(shell.input_mut().unwrap().is_held(KeyCode::KeyW));
    }

    #[test]
    fn replaced_viewer_starts_with_clean_input() {
        let mut app = routing_app(ViewerKind::Splat);
        key(&mut app, KeyCode::KeyW, ButtonState::Pressed);
        app.update();

        app.world_mut()
            .resource_scope(|world, mut shell: Mut<ViewerShell>| {
                shell.switch_viewer(world, ViewerKind::Turntable).unwrap();
                shell.switch_viewer(world, ViewerKind::Splat).unwrap();
            });
        let mut shell = app.world_mut().resource_mut::<ViewerShell>();
        assert!(!shell.input_mut().unwrap().is_held(KeyCode::KeyW));
    }

    #[test]
    fn wheel_pixels_are_converted_to_lines() {
        let mut app = routing_app(ViewerKind::Splat);
        app.world_mut().send_event(MouseWheel {
            unit: MouseScrollUnit::Pixel,
            x: 0.0,
            y: 250.0,
            window: Entity::PLACEHOLDER,
        });
        app.update();

        let mut shell = app.world_mut().resource_mut::<ViewerShell>();
        assert_eq!(shell.input_mut().unwrap().scroll, 2.5);
    }
}
