use bevy::prelude::*;
use bevy::window::FileDragAndDrop;

use crate::shell::ViewerShell;
use crate::shell::commands::{NoticeLevel, ShellCommand, ShellNotice};
use crate::viewer::{SplatFile, ViewerKind};

use super::{format_speed, step_speed};

/// Slider steps moved by one press of a speed button or shortcut.
const SPEED_BUTTON_STEPS: i32 = 5;

const BUTTON_IDLE: Color = Color::srgb(0.22, 0.24, 0.28);
const BUTTON_HOVERED: Color = Color::srgb(0.26, 0.28, 0.32);
const BUTTON_PRESSED: Color = Color::srgb(0.32, 0.36, 0.42);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    LoadSample,
    ToggleViewer,
    SlowDown,
    SpeedUp,
    ResetCamera,
}

#[derive(Component)]
pub(crate) struct SpeedLabel;

#[derive(Component)]
pub(crate) struct ViewerLabel;

#[derive(Component)]
pub(crate) struct StatusText;

/// The viewer kind the toggle button switches to.
pub fn next_kind(current: Option<ViewerKind>) -> ViewerKind {
    match current {
        Some(ViewerKind::Splat) => ViewerKind::Turntable,
        Some(ViewerKind::Turntable) | None => ViewerKind::Splat,
    }
}

/// Command triggered by a panel button, given the shell's current state.
pub fn action_command(
    action: PanelAction,
    active: Option<ViewerKind>,
    speed: f32,
) -> ShellCommand {
    match action {
        PanelAction::LoadSample => ShellCommand::LoadSample,
        PanelAction::ToggleViewer => ShellCommand::SwitchViewer(next_kind(active)),
        PanelAction::SlowDown => ShellCommand::SetSpeed(step_speed(speed, -SPEED_BUTTON_STEPS)),
        PanelAction::SpeedUp => ShellCommand::SetSpeed(step_speed(speed, SPEED_BUTTON_STEPS)),
        PanelAction::ResetCamera => ShellCommand::ResetCamera,
    }
}

fn spawn_button(parent: &mut ChildSpawnerCommands, action: PanelAction, label: &str, width: f32) {
    parent
        .spawn((
            action,
            Button,
            Name::new(format!("{action:?}Button")),
            BackgroundColor(BUTTON_IDLE),
            BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
            Node {
                width: Val::Px(width),
                height: Val::Px(30.0),
                display: Display::Flex,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
        ))
        .with_children(|button| {
            let mut text = button.spawn((
                Text::new(label),
                TextFont {
                    font_size: 15.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            if action == PanelAction::ToggleViewer {
                text.insert(ViewerLabel);
            }
        });
}

pub fn spawn_control_panel(mut commands: Commands) {
    commands
        .spawn((
            Name::new("ControlPanel"),
            BackgroundColor(Color::srgba(0.10, 0.11, 0.13, 0.85)),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(12.0),
                top: Val::Px(12.0),
                padding: UiRect::all(Val::Px(10.0)),
                row_gap: Val::Px(8.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                ..default()
            },
        ))
        .with_children(|panel| {
            spawn_button(panel, PanelAction::LoadSample, "Load sample", 180.0);
            spawn_button(
                panel,
                PanelAction::ToggleViewer,
                ViewerKind::Splat.label(),
                180.0,
            );
            spawn_button(panel, PanelAction::ResetCamera, "Reset camera", 180.0);

            panel
                .spawn(Node {
                    display: Display::Flex,
                    align_items: AlignItems::Center,
                    column_gap: Val::Px(8.0),
                    ..default()
                })
                .with_children(|row| {
                    spawn_button(row, PanelAction::SlowDown, "-", 30.0);
                    row.spawn((
                        SpeedLabel,
                        Text::new("Speed"),
                        TextFont {
                            font_size: 15.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                        Node {
                            width: Val::Px(104.0),
                            justify_content: JustifyContent::Center,
                            ..default()
                        },
                    ));
                    spawn_button(row, PanelAction::SpeedUp, "+", 30.0);
                });

            panel.spawn((
                StatusText,
                Text::new("Drop a .ply or .splat file, or press L for the sample"),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.8)),
                Node {
                    max_width: Val::Px(320.0),
                    ..default()
                },
            ));
        });
}

pub fn panel_button_interaction(
    mut buttons: Query<
        (&Interaction, &PanelAction, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>),
    >,
    shell: Option<Res<ViewerShell>>,
    mut shell_commands: EventWriter<ShellCommand>,
) {
    for (interaction, action, mut background) in &mut buttons {
        match *interaction {
            Interaction::Pressed => {
                *background = BackgroundColor(BUTTON_PRESSED);
                let (active, speed) = shell
                    .as_ref()
                    .map_or((None, 0.0), |shell| (shell.active_kind(), shell.speed()));
                shell_commands.write(action_command(*action, active, speed));
            }
            Interaction::Hovered => *background = BackgroundColor(BUTTON_HOVERED),
            Interaction::None => *background = BackgroundColor(BUTTON_IDLE),
        }
    }
}

pub fn handle_control_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    shell: Option<Res<ViewerShell>>,
    mut shell_commands: EventWriter<ShellCommand>,
) {
    let speed = shell.as_ref().map_or(0.0, |shell| shell.speed());

    if keyboard.just_pressed(KeyCode::KeyL) {
        shell_commands.write(ShellCommand::LoadSample);
    }
    if keyboard.just_pressed(KeyCode::Digit1) {
        shell_commands.write(ShellCommand::SwitchViewer(ViewerKind::Splat));
    }
    if keyboard.just_pressed(KeyCode::Digit2) {
        shell_commands.write(ShellCommand::SwitchViewer(ViewerKind::Turntable));
    }
    if keyboard.just_pressed(KeyCode::Minus) {
        shell_commands.write(ShellCommand::SetSpeed(step_speed(
            speed,
            -SPEED_BUTTON_STEPS,
        )));
    }
    if keyboard.just_pressed(KeyCode::Equal) {
        shell_commands.write(ShellCommand::SetSpeed(step_speed(
            speed,
            SPEED_BUTTON_STEPS,
        )));
    }
}

pub fn handle_dropped_files(
    mut drops: EventReader<FileDragAndDrop>,
    mut shell_commands: EventWriter<ShellCommand>,
) {
    for event in drops.read() {
        if let FileDragAndDrop::DroppedFile { path_buf, .. } = event {
            info!("File dropped: {}", path_buf.display());
            shell_commands.write(ShellCommand::LoadFile(SplatFile::from_path(
                path_buf.clone(),
            )));
        }
    }
}

pub fn update_status_text(
    mut notices: EventReader<ShellNotice>,
    mut status: Query<(&mut Text, &mut TextColor), With<StatusText>>,
) {
    let Some(notice) = notices.read().last() else {
        return;
    };
    for (mut text, mut color) in &mut status {
        text.0 = notice.message.clone();
        color.0 = match notice.level {
            NoticeLevel::Info => Color::srgb(0.8, 0.8, 0.8),
            NoticeLevel::Error => Color::srgb(1.0, 0.35, 0.3),
        };
    }
}

pub fn update_panel_labels(
    shell: Option<Res<ViewerShell>>,
    mut speed_labels: Query<&mut Text, (With<SpeedLabel>, Without<ViewerLabel>)>,
    mut viewer_labels: Query<&mut Text, (With<ViewerLabel>, Without<SpeedLabel>)>,
) {
    let Some(shell) = shell else {
        return;
    };
    if !shell.is_changed() {
        return;
    }
    for mut text in &mut speed_labels {
        text.0 = format!("Speed {}", format_speed(shell.speed()));
    }
    let viewer = shell
        .active_kind()
        .map_or("No viewer", |kind| kind.label());
    for mut text in &mut viewer_labels {
        text.0 = viewer.to_string();
    }
}
