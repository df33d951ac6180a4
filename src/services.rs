//! Client-side editor services.
//!
//! Each service performs one kind of round trip to the language server:
//! load, save, revert, validation, content assist and incremental update.
//! Services are constructed once per editor context with the server URL and
//! resource id, and receive the context plus the effective options on every
//! call.

mod content_assist;
mod load;
mod revert;
mod save;
mod update;
mod validation;

pub use content_assist::ContentAssistService;
pub use load::LoadResourceService;
pub use revert::RevertResourceService;
pub use save::SaveResourceService;
pub use update::UpdateService;
pub use validation::ValidationService;

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::config::ServiceOptions;
use crate::editor::{EditorContext, RequestState};
use crate::error::{ServiceError, ServiceFailure};
use crate::text::compute_delta;
use crate::transport::{Deferred, Method, Request, RequestSettings, Response, Transport};

/// Result of a completed round trip
pub type Outcome = Result<Value, ServiceFailure>;

/// The kinds of service an editor context can carry.
///
/// `Update` is driven by model changes and is never dispatched by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Load,
    Save,
    Revert,
    Validation,
    ContentAssist,
    Update,
}

impl ServiceKind {
    /// Kinds that can be invoked through the dispatcher
    pub const DISPATCHABLE: [ServiceKind; 5] = [
        ServiceKind::Load,
        ServiceKind::Save,
        ServiceKind::Revert,
        ServiceKind::Validation,
        ServiceKind::ContentAssist,
    ];

    /// Name used to invoke the service
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Load => "load",
            ServiceKind::Save => "save",
            ServiceKind::Revert => "revert",
            ServiceKind::Validation => "validation",
            ServiceKind::ContentAssist => "content-assist",
            ServiceKind::Update => "update",
        }
    }

    /// Path segment appended to the server URL
    pub fn path(&self) -> &'static str {
        match self {
            ServiceKind::Load => "load",
            ServiceKind::Save => "save",
            ServiceKind::Revert => "revert",
            ServiceKind::Validation => "validate",
            ServiceKind::ContentAssist => "assist",
            ServiceKind::Update => "update",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = ServiceError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ServiceKind::DISPATCHABLE
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| ServiceError::not_available(name))
    }
}

/// What a dispatched invocation hands back to the caller.
pub enum Invocation {
    /// Settled when the transport answers
    Deferred(Deferred<Outcome>),
    /// Known without a round trip
    Ready(Outcome),
}

impl Invocation {
    /// The completion hook, if the outcome is still to come
    pub fn completion(&self) -> Option<&Deferred<Outcome>> {
        match self {
            Invocation::Deferred(deferred) => Some(deferred),
            Invocation::Ready(_) => None,
        }
    }
}

/// Address and transport shared by every service implementation.
pub(crate) struct ServiceEndpoint {
    kind: ServiceKind,
    request_url: String,
    resource_id: Option<String>,
    transport: Rc<dyn Transport>,
}

impl ServiceEndpoint {
    pub(crate) fn new(
        kind: ServiceKind,
        server_url: &str,
        resource_id: Option<&str>,
        transport: Rc<dyn Transport>,
    ) -> Self {
        Self {
            kind,
            request_url: format!("{}/{}", server_url.trim_end_matches('/'), kind.path()),
            resource_id: resource_id.map(str::to_string),
            transport,
        }
    }

    pub(crate) fn request_url(&self) -> &str {
        &self.request_url
    }

    /// Parameters every request of this service carries.
    pub(crate) fn request_data(&self, options: &ServiceOptions) -> Map<String, Value> {
        let mut data = options.extra.clone();
        if let Some(resource_id) = &self.resource_id {
            data.insert("resource".to_string(), Value::from(resource_id.as_str()));
        }
        if let Some(content_type) = &options.content_type {
            data.insert("contentType".to_string(), Value::from(content_type.as_str()));
        }
        data
    }

    /// Send a request and route its outcome.
    ///
    /// `on_success` may reject a payload it cannot use; the failure is then
    /// handled like a transport error. Success and error listeners on the
    /// context run after the service-specific handler.
    pub(crate) fn send<S, F>(
        &self,
        context: &EditorContext,
        method: Method,
        data: Map<String, Value>,
        on_success: S,
        on_failure: F,
    ) where
        S: FnOnce(&EditorContext, &Value) -> Result<(), ServiceFailure> + 'static,
        F: FnOnce(&EditorContext, &ServiceFailure) + 'static,
    {
        let kind = self.kind;
        context.set_client_service_state(kind, RequestState::Started);

        let request = Request {
            url: self.request_url().to_string(),
            settings: RequestSettings {
                method,
                data,
                service: kind,
            },
        };

        let context = context.downgrade();
        self.transport.send(
            request,
            Box::new(move |response| {
                let Some(context) = context.upgrade() else {
                    log::debug!(
                        target: "xtext_web_client::services",
                        "Dropping {} response for a closed editor",
                        kind
                    );
                    return;
                };
                context.set_client_service_state(kind, RequestState::Finished);

                let outcome = match response {
                    Response::Success(payload) => match conflict_of(&payload) {
                        Some(conflict) => {
                            if conflict == "invalidStateId" {
                                context.forget_server_state();
                            }
                            Err(ServiceFailure::Conflict { kind: conflict })
                        }
                        None => on_success(&context, &payload).map(|()| payload),
                    },
                    Response::Error { error_thrown, xhr } => Err(ServiceFailure::Http {
                        error_thrown,
                        status: xhr.status,
                        response_text: xhr.response_text,
                    }),
                };

                match outcome {
                    Ok(payload) => context.notify_service_success(kind, &payload),
                    Err(failure) => {
                        log::warn!(
                            target: "xtext_web_client::services",
                            "{} request failed: {}",
                            kind,
                            failure
                        );
                        context.notify_service_error(kind, &failure);
                        on_failure(&context, &failure);
                    }
                }
            }),
        );
    }
}

fn conflict_of(payload: &Value) -> Option<String> {
    payload
        .get("conflict")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Parse a success payload into the shape a service expects.
pub(crate) fn parse_payload<T: serde::de::DeserializeOwned>(
    kind: ServiceKind,
    payload: &Value,
) -> Result<T, ServiceFailure> {
    serde_json::from_value(payload.clone()).map_err(|e| ServiceFailure::InvalidResponse {
        message: format!("unexpected {} response: {}", kind, e),
    })
}

/// Describe the document state a request relies on.
///
/// Full text is sent when the options ask for it or no server state is
/// known; otherwise the known state id is required. Services linked to the
/// update service also carry the pending delta. Returns the text the server
/// holds once the request succeeds, when that text is known.
pub(crate) fn attach_document_state(
    context: &EditorContext,
    data: &mut Map<String, Value>,
    options: &ServiceOptions,
    with_delta: bool,
) -> Option<String> {
    let text = context.text();
    let server_state = context.server_state();

    match server_state.state_id {
        Some(state_id) if !options.send_full_text => {
            data.insert("requiredStateId".to_string(), Value::from(state_id));
            let known_text = server_state.text?;
            if !with_delta {
                return Some(known_text);
            }
            match compute_delta(&known_text, &text) {
                Some(delta) => {
                    insert_delta(data, &delta);
                    Some(text)
                }
                None => Some(known_text),
            }
        }
        _ => {
            data.insert("fullText".to_string(), Value::from(text.as_str()));
            Some(text)
        }
    }
}

pub(crate) fn insert_delta(data: &mut Map<String, Value>, delta: &crate::text::TextDelta) {
    data.insert("deltaText".to_string(), Value::from(delta.text.as_str()));
    data.insert("deltaOffset".to_string(), Value::from(delta.offset));
    data.insert(
        "deltaReplaceLength".to_string(),
        Value::from(delta.replace_length),
    );
}

/// Record a `stateId` from an object payload as the new server state.
pub(crate) fn record_state_id(context: &EditorContext, payload: &Value, sent_text: Option<String>) {
    let state_id = payload.get("stateId").and_then(Value::as_str);
    if let (Some(state_id), Some(text)) = (state_id, sent_text) {
        context.update_server_state(text, state_id.to_string());
    }
}
