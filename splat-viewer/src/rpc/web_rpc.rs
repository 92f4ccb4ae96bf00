use bevy::diagnostic::DiagnosticsStore;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::systems::fps_tracking::current_fps;
use crate::shell::ViewerShell;
use crate::shell::commands::{ShellCommand, ShellNotice, SplatLoaded};
use crate::viewer::{ViewerKind, settings::ViewerSettings};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource queueing outgoing notifications and responses for the host page.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Shell state visible to RPC handlers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewerStatus {
    pub viewer: Option<ViewerKind>,
    pub loading: bool,
    pub speed: f32,
}

impl ViewerStatus {
    fn from_shell(shell: Option<&ViewerShell>) -> Self {
        shell.map_or_else(Self::default, |shell| Self {
            viewer: shell.active_kind(),
            loading: shell.is_loading(),
            speed: shell.speed(),
        })
    }
}

/// Plugin establishing the postMessage RPC layer for iframe embedding.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    forward_shell_events,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::{Arc, Mutex};

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    let Some(window) = window() else {
        error!("Window object not available; RPC disabled");
        return;
    };
    if let Err(err) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to register message listener: {:?}", err);
        return;
    }

    // Ownership passes to JS for the lifetime of the page.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Message queue filled by the wasm `message` listener.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Res<DiagnosticsStore>,
    shell: Option<Res<ViewerShell>>,
    settings: Res<ViewerSettings>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut shell_commands: EventWriter<ShellCommand>,
) {
    let context = RpcContext {
        fps: current_fps(&diagnostics).unwrap_or(0.0) as f32,
        status: ViewerStatus::from_shell(shell.as_deref()),
        sample_url: settings.sample_url.clone(),
    };

    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("RPC request: {}", request.method);
                let mut commands = Vec::new();
                if let Some(response) = handle_rpc_request(&request, &context, &mut commands) {
                    rpc_interface.queue_response(response);
                }
                shell_commands.write_batch(commands);
            }
            Err(parse_error) => {
                warn!("Ignoring malformed RPC message: {}", parse_error);
            }
        }
    }
}

/// Read-only state a request is answered from.
pub struct RpcContext {
    pub fps: f32,
    pub status: ViewerStatus,
    pub sample_url: String,
}

/// Handle one request. Commands it triggers are pushed to `commands`; the
/// returned response is `None` for notifications (requests without an id).
pub fn handle_rpc_request(
    request: &RpcRequest,
    context: &RpcContext,
    commands: &mut Vec<ShellCommand>,
) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "set_viewer" => handle_set_viewer(&request.params, commands),
        "load_url" => handle_load_url(&request.params, commands),
        "load_sample" => {
            commands.push(ShellCommand::LoadSample);
            Ok(serde_json::json!({ "success": true, "url": context.sample_url }))
        }
        "set_speed" => handle_set_speed(&request.params, commands),
        "reset_camera" => {
            commands.push(ShellCommand::ResetCamera);
            Ok(serde_json::json!({ "success": true }))
        }
        "get_status" => serde_json::to_value(&context.status)
            .map_err(|err| RpcError::internal_error(&err.to_string())),
        "get_fps" => Ok(serde_json::json!({ "fps": context.fps })),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            let id = request.id.clone()?;
            return Some(create_error_response(
                id,
                -32601,
                "Method not found",
                Some(serde_json::json!({"method": request.method})),
            ));
        }
    };

    // Notifications get no response.
    let id = request.id.clone()?;
    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

fn handle_set_viewer(
    params: &serde_json::Value,
    commands: &mut Vec<ShellCommand>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SetViewerParams {
        viewer: String,
    }

    let parsed = serde_json::from_value::<SetViewerParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'viewer' parameter"))?;
    let kind = ViewerKind::from_string(&parsed.viewer)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown viewer: {}", parsed.viewer)))?;

    commands.push(ShellCommand::SwitchViewer(kind));
    info!("Viewer switch requested over RPC: {}", kind);
    Ok(serde_json::json!({ "success": true, "viewer": kind }))
}

fn handle_load_url(
    params: &serde_json::Value,
    commands: &mut Vec<ShellCommand>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct LoadUrlParams {
        url: String,
    }

    let parsed = serde_json::from_value::<LoadUrlParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'url' parameter"))?;
    if parsed.url.trim().is_empty() {
        return Err(RpcError::invalid_params("'url' must not be empty"));
    }

    commands.push(ShellCommand::LoadUrl(parsed.url.clone()));
    Ok(serde_json::json!({ "success": true, "url": parsed.url }))
}

fn handle_set_speed(
    params: &serde_json::Value,
    commands: &mut Vec<ShellCommand>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SetSpeedParams {
        speed: f32,
    }

    let parsed = serde_json::from_value::<SetSpeedParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected numeric 'speed' parameter"))?;

    commands.push(ShellCommand::SetSpeed(parsed.speed));
    Ok(serde_json::json!({ "success": true, "speed": parsed.speed }))
}

/// Relay shell notices and load completions to the host page.
fn forward_shell_events(
    mut loaded: EventReader<SplatLoaded>,
    mut notices: EventReader<ShellNotice>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in loaded.read() {
        rpc_interface.send_notification(
            "splat_loaded",
            serde_json::json!({
                "name": event.name,
                "splat_count": event.splat_count,
            }),
        );
    }
    for notice in notices.read() {
        rpc_interface.send_notification(
            "notice",
            serde_json::json!({
                "level": notice.level,
                "message": notice.message,
            }),
        );
    }
}

fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Post a serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}
