use bevy::app::AppExit;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::engine::loading::anatomy::AnatomyLoader;
use crate::engine::scene::registry::{SceneCategory, SceneRegistry};
use crate::engine::session::{SessionEvent, SessionMode};
use crate::engine::systems::shutdown::ShutdownSet;
use crate::engine::timeline::prediction::{PredictionParseError, PredictionPoint, parse_predictions};
use crate::engine::timeline::systems::{PredictionsReady, SetPredictions};
use crate::engine::volume::dataset::VolumePayload;
use crate::engine::volume::systems::{SetVolume, VolumeOrigin, VolumeReady};

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
    pub params: Value,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn parse_error(message: &str) -> Self {
        Self {
            code: -32700,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn invalid_request(message: &str) -> Self {
        Self {
            code: -32600,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Parameters that cannot be turned into a scene command.
#[derive(Debug, Error)]
pub enum RpcParamError {
    #[error(transparent)]
    Predictions(#[from] PredictionParseError),
}

impl From<RpcParamError> for RpcError {
    fn from(error: RpcParamError) -> Self {
        RpcError::invalid_params(&error.to_string())
    }
}

/// Scene change requested by a host call.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcCommand {
    SetVolume(Option<VolumePayload>),
    SetPredictions(Vec<PredictionPoint>),
    Session(SessionEvent),
    Shutdown,
}

/// How a request is answered.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcReply {
    Now(Result<Value, RpcError>),
    /// Answered with the shape actually built once the volume is attached.
    AfterVolumeBuild,
}

/// Read-only view of the scene used to answer queries.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    pub session: SessionMode,
    pub attached: Vec<SceneCategory>,
    pub anatomy_loading: bool,
    pub fps: f32,
}

/// Map one request to its scene command and reply. Pure; the systems below
/// apply the command and transmit the reply.
pub fn dispatch(request: &RpcRequest, snapshot: &SceneSnapshot) -> (Option<RpcCommand>, RpcReply) {
    let params = &request.params;
    match request.method.as_str() {
        "set_volume" => match VolumePayload::from_json(params.clone()) {
            Some(payload) => (
                Some(RpcCommand::SetVolume(Some(payload))),
                RpcReply::AfterVolumeBuild,
            ),
            None => (
                Some(RpcCommand::SetVolume(None)),
                RpcReply::Now(Ok(json!({
                    "success": true,
                    "shape": Value::Null,
                    "fallback": false
                }))),
            ),
        },
        "set_predictions" => match parse_predictions(params).map_err(RpcParamError::from) {
            Ok(points) => {
                let count = points.len();
                (
                    Some(RpcCommand::SetPredictions(points)),
                    RpcReply::Now(Ok(json!({ "success": true, "count": count }))),
                )
            }
            Err(error) => (None, RpcReply::Now(Err(error.into()))),
        },
        "session_start" => session_command(SessionEvent::Start),
        "session_end" => session_command(SessionEvent::End),
        "get_scene_state" => (
            None,
            RpcReply::Now(Ok(json!({
                "session": snapshot.session.as_str(),
                "attached": snapshot
                    .attached
                    .iter()
                    .map(SceneCategory::as_str)
                    .collect::<Vec<_>>(),
                "anatomy_loading": snapshot.anatomy_loading
            }))),
        ),
        "get_fps" => (None, RpcReply::Now(Ok(json!({ "fps": snapshot.fps })))),
        "shutdown" => (
            Some(RpcCommand::Shutdown),
            RpcReply::Now(Ok(json!({ "success": true }))),
        ),
        method => (None, RpcReply::Now(Err(RpcError::method_not_found(method)))),
    }
}

fn session_command(event: SessionEvent) -> (Option<RpcCommand>, RpcReply) {
    (
        Some(RpcCommand::Session(event)),
        RpcReply::Now(Ok(json!({ "success": true }))),
    )
}

/// Resource managing bidirectional RPC communication with the host page.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
    /// Request ids waiting on a volume build, with the ticket of their request.
    awaiting_volume: Vec<(u64, Value)>,
    /// Ticket handed to the next host volume request.
    next_volume_ticket: u64,
}

impl WebRpcInterface {
    /// Send notification to the host without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, id: Value, result: Result<Value, RpcError>) {
        let (result, error) = match result {
            Ok(value) => (Some(value), None),
            Err(error) => (None, Some(error)),
        };
        self.outgoing_responses.push(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result,
            error,
            id: Some(id),
        });
    }

    fn issue_volume_ticket(&mut self) -> u64 {
        self.next_volume_ticket += 1;
        self.next_volume_ticket
    }

    /// Settle every reply whose request was built, or superseded, by `ticket`.
    fn answer_awaiting_volume(&mut self, ticket: u64, result: Value) {
        let (settled, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.awaiting_volume)
            .into_iter()
            .partition(|(awaited, _)| *awaited <= ticket);
        self.awaiting_volume = waiting;
        for (_, id) in settled {
            self.queue_response(id, Ok(result.clone()));
        }
    }
}

/// Host message handling. Local scene inputs run before it so that host data
/// written in the same frame is the last word.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RpcSet;

/// Plugin establishing the host bridge for iframe-based deployment.
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
                    forward_scene_notifications,
                    send_outgoing_messages,
                )
                    .chain()
                    .in_set(RpcSet),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener).add_systems(
            Last,
            detach_message_listener.in_set(ShutdownSet::DetachListeners),
        );
    }
}

#[cfg(target_arch = "wasm32")]
struct MessageListener(Closure<dyn FnMut(MessageEvent)>);

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(world: &mut World) {
    use std::sync::Arc;
    use std::sync::Mutex;

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

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", e);
            return;
        }
    }

    // The closure stays owned here so shutdown can unregister it.
    world.insert_non_send_resource(MessageListener(closure));
    world.insert_resource(MessageQueue(message_queue));
}

#[cfg(target_arch = "wasm32")]
fn detach_message_listener(world: &mut World) {
    if !world.resource::<Events<AppExit>>().is_empty() {
        if let Some(MessageListener(closure)) = world.remove_non_send_resource::<MessageListener>()
        {
            if let Some(window) = window() {
                let _ = window.remove_event_listener_with_callback(
                    "message",
                    closure.as_ref().unchecked_ref(),
                );
            }
            info!("Host message listener removed");
        }
        world.remove_resource::<MessageQueue>();
    }
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing an incoming RPC message from the host page.
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

/// Scene state needed to answer queries.
#[derive(SystemParam)]
pub struct SceneQueries<'w> {
    session: Res<'w, State<SessionMode>>,
    registry: Res<'w, SceneRegistry>,
    anatomy: Res<'w, AnatomyLoader>,
    diagnostics: Res<'w, DiagnosticsStore>,
}

impl SceneQueries<'_> {
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            session: *self.session.get(),
            attached: self.registry.attached().collect(),
            anatomy_loading: self.anatomy.is_loading(),
            fps: smoothed_fps(&self.diagnostics),
        }
    }
}

/// Event writers through which host commands reach the scene.
#[derive(SystemParam)]
pub struct RpcCommandWriters<'w> {
    volume: EventWriter<'w, SetVolume>,
    predictions: EventWriter<'w, SetPredictions>,
    session: EventWriter<'w, SessionEvent>,
    exit: EventWriter<'w, AppExit>,
}

impl RpcCommandWriters<'_> {
    fn apply(&mut self, command: RpcCommand, ticket: u64) {
        match command {
            RpcCommand::SetVolume(payload) => {
                self.volume.write(SetVolume {
                    payload,
                    origin: VolumeOrigin::Host(ticket),
                });
            }
            RpcCommand::SetPredictions(points) => {
                self.predictions.write(SetPredictions(points));
            }
            RpcCommand::Session(event) => {
                self.session.write(event);
            }
            RpcCommand::Shutdown => {
                info!("Shutdown requested by host");
                self.exit.write(AppExit::Success);
            }
        }
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    scene: SceneQueries,
    mut writers: RpcCommandWriters,
) {
    for event in events.read() {
        let request = match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => request,
            Err(parse_error) => {
                warn!("Unparseable RPC message: {parse_error}");
                rpc_interface.queue_response(
                    Value::Null,
                    Err(RpcError::parse_error(&parse_error.to_string())),
                );
                continue;
            }
        };

        if request.jsonrpc != "2.0" {
            if let Some(id) = request.id {
                rpc_interface.queue_response(
                    id,
                    Err(RpcError::invalid_request("Expected jsonrpc \"2.0\"")),
                );
            }
            continue;
        }

        debug!("Processing RPC method: {}", request.method);
        let (command, reply) = dispatch(&request, &scene.snapshot());
        let ticket = rpc_interface.issue_volume_ticket();

        // A removal settles any reply still waiting on an earlier build.
        if let Some(RpcCommand::SetVolume(None)) = &command {
            rpc_interface.answer_awaiting_volume(
                ticket,
                json!({
                    "success": true,
                    "shape": Value::Null,
                    "fallback": false
                }),
            );
        }
        if let Some(command) = command {
            writers.apply(command, ticket);
        }

        // Requests without an id are notifications and get no response.
        let Some(id) = request.id else {
            continue;
        };
        match reply {
            RpcReply::Now(result) => {
                if let Err(error) = &result {
                    warn!("RPC {} failed: {}", request.method, error.message);
                }
                rpc_interface.queue_response(id, result);
            }
            RpcReply::AfterVolumeBuild => rpc_interface.awaiting_volume.push((ticket, id)),
        }
    }
}

/// Push scene changes to the host and settle deferred volume replies. Only
/// a build of a host request settles replies; local builds just notify.
fn forward_scene_notifications(
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut volumes: EventReader<VolumeReady>,
    mut predictions: EventReader<PredictionsReady>,
    mut sessions: EventReader<StateTransitionEvent<SessionMode>>,
) {
    for ready in volumes.read() {
        let params = json!({
            "shape": ready.shape,
            "fallback": ready.fallback
        });
        rpc_interface.send_notification("volume_ready", params.clone());

        if let VolumeOrigin::Host(ticket) = ready.origin {
            let mut result = params;
            result["success"] = json!(true);
            rpc_interface.answer_awaiting_volume(ticket, result);
        }
    }

    if let Some(ready) = predictions.read().last() {
        rpc_interface.send_notification("predictions_ready", json!({ "count": ready.count }));
    }

    for transition in sessions.read() {
        if let (Some(exited), Some(entered)) = (transition.exited, transition.entered) {
            if exited != entered {
                rpc_interface.send_notification(
                    "session_mode_changed",
                    json!({ "mode": entered.as_str() }),
                );
            }
        }
    }
}

pub fn smoothed_fps(diagnostics: &DiagnosticsStore) -> f32 {
    diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
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
