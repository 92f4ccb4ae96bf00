use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use constants::controls::MOVEMENT_SPEED_STEP;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, Event, HtmlElement, HtmlInputElement, HtmlSelectElement, window,
};

use crate::shell::ViewerShell;
use crate::shell::commands::{NoticeLevel, ShellCommand, ShellNotice};
use crate::viewer::{SplatFile, ViewerKind, settings::ViewerSettings};

use super::{format_speed, parse_speed};

const VIEWER_SELECT_ID: &str = "viewer-type";
const LOAD_BUTTON_ID: &str = "load-button";
const FILE_INPUT_ID: &str = "file-input";
const LOAD_SAMPLE_ID: &str = "load-sample";
const SPEED_SLIDER_ID: &str = "speed-slider";
const SPEED_VALUE_ID: &str = "speed-value";

type CommandQueue = Arc<Mutex<Vec<ShellCommand>>>;

/// Commands pushed by DOM listeners, drained once per frame.
#[derive(Resource)]
pub struct DomCommandQueue(CommandQueue);

fn push(queue: &CommandQueue, command: ShellCommand) {
    if let Ok(mut queue) = queue.lock() {
        queue.push(command);
    }
}

fn element<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    let element = document.get_element_by_id(id);
    if element.is_none() {
        error!("Control #{} is missing from the page", id);
    }
    element?.dyn_into::<T>().ok()
}

fn listen(target: &web_sys::EventTarget, event: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    if let Err(err) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
    {
        error!("Failed to register '{}' listener: {:?}", event, err);
        return;
    }
    // Listeners live as long as the page.
    closure.forget();
}

pub fn setup_dom_controls(mut commands: Commands, settings: Res<ViewerSettings>) {
    let Some(document) = window().and_then(|window| window.document()) else {
        error!("Document not available; DOM controls disabled");
        return;
    };
    let queue: CommandQueue = Arc::new(Mutex::new(Vec::new()));

    if let Some(select) = element::<HtmlSelectElement>(&document, VIEWER_SELECT_ID) {
        select.set_value(settings.default_viewer.as_str());
        let source = select.clone();
        let queue = queue.clone();
        listen(&select, "change", move |_| {
            match ViewerKind::from_string(&source.value()) {
                Some(kind) => push(&queue, ShellCommand::SwitchViewer(kind)),
                None => warn!("Unknown viewer type '{}'", source.value()),
            }
        });
    }

    if let Some(file_input) = element::<HtmlInputElement>(&document, FILE_INPUT_ID) {
        if let Some(button) = element::<HtmlElement>(&document, LOAD_BUTTON_ID) {
            let picker = file_input.clone();
            listen(&button, "click", move |_| picker.click());
        }

        let source = file_input.clone();
        let queue = queue.clone();
        listen(&file_input, "change", move |_| {
            let Some(file) = source.files().and_then(|files| files.get(0)) else {
                return;
            };
            // Allow picking the same file again.
            source.set_value("");
            let queue = queue.clone();
            spawn_local(async move {
                let name = file.name();
                match JsFuture::from(file.array_buffer()).await {
                    Ok(buffer) => {
                        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
                        push(&queue, ShellCommand::LoadFile(SplatFile::from_bytes(name, bytes)));
                    }
                    Err(err) => {
                        let message = format!("Failed to read {name}: {err:?}");
                        error!("{}", message);
                        alert(&message);
                    }
                }
            });
        });
    }

    if let Some(button) = element::<HtmlElement>(&document, LOAD_SAMPLE_ID) {
        let queue = queue.clone();
        listen(&button, "click", move |_| push(&queue, ShellCommand::LoadSample));
    }

    if let Some(slider) = element::<HtmlInputElement>(&document, SPEED_SLIDER_ID) {
        let range = ViewerSettings::speed_range();
        slider.set_min(&range.start().to_string());
        slider.set_max(&range.end().to_string());
        slider.set_step(&MOVEMENT_SPEED_STEP.to_string());
        slider.set_value(&settings.movement_speed.to_string());

        let label = element::<HtmlElement>(&document, SPEED_VALUE_ID);
        if let Some(label) = &label {
            label.set_text_content(Some(&format_speed(settings.movement_speed)));
        }

        let source = slider.clone();
        let queue = queue.clone();
        listen(&slider, "input", move |_| {
            let Some(speed) = parse_speed(&source.value()) else {
                return;
            };
            if let Some(label) = &label {
                label.set_text_content(Some(&format_speed(speed)));
            }
            push(&queue, ShellCommand::SetSpeed(speed));
        });
    }

    info!("DOM controls attached");
    commands.insert_resource(DomCommandQueue(queue));
}

pub fn drain_dom_commands(
    queue: Option<Res<DomCommandQueue>>,
    mut shell_commands: EventWriter<ShellCommand>,
) {
    let Some(queue) = queue else {
        return;
    };
    let commands = if let Ok(mut queue) = queue.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };
    shell_commands.write_batch(commands);
}

fn alert(message: &str) {
    if let Some(window) = window() {
        if let Err(err) = window.alert_with_message(message) {
            error!("Failed to show alert: {:?}", err);
        }
    }
}

/// Errors block the page with an alert; info notices only go to the log.
pub fn show_dom_notices(mut notices: EventReader<ShellNotice>) {
    for notice in notices.read() {
        match notice.level {
            NoticeLevel::Error => alert(&notice.message),
            NoticeLevel::Info => debug!("{}", notice.message),
        }
    }
}

/// Mirror speed changes made elsewhere (RPC, config) onto the slider and label.
pub fn sync_speed_controls(shell: Option<Res<ViewerShell>>, mut shown: Local<Option<f32>>) {
    let Some(speed) = shell.map(|shell| shell.speed()) else {
        return;
    };
    if *shown == Some(speed) {
        return;
    }
    *shown = Some(speed);

    let Some(document) = window().and_then(|window| window.document()) else {
        return;
    };
    if let Some(slider) = document
        .get_element_by_id(SPEED_SLIDER_ID)
        .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
    {
        slider.set_value(&speed.to_string());
    }
    if let Some(label) = document.get_element_by_id(SPEED_VALUE_ID) {
        label.set_text_content(Some(&format_speed(speed)));
    }
}
