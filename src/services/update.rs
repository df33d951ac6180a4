use std::cell::Cell;
use std::rc::Rc;

use serde_json::Value;

use super::{ServiceEndpoint, ServiceKind, insert_delta};
use crate::config::ServiceOptions;
use crate::editor::EditorContext;
use crate::error::ServiceFailure;
use crate::text::compute_delta;
use crate::transport::{Method, Transport};

/// Keeps the server's copy of the document in sync with the editor.
///
/// Sends the minimal delta against the last acknowledged server state, or
/// the full text when no state is known. At most one update is in flight;
/// changes made meanwhile are coalesced into a single follow-up sent once
/// the in-flight update completes.
pub struct UpdateService {
    endpoint: ServiceEndpoint,
    in_flight: Cell<bool>,
    follow_up: Cell<bool>,
}

impl UpdateService {
    pub fn new(server_url: &str, resource_id: Option<&str>, transport: Rc<dyn Transport>) -> Self {
        Self {
            endpoint: ServiceEndpoint::new(ServiceKind::Update, server_url, resource_id, transport),
            in_flight: Cell::new(false),
            follow_up: Cell::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    /// Push the current text to the server.
    ///
    /// On success the new state is recorded and server-state listeners are
    /// notified. An `invalidStateId` conflict resends the full text.
    pub fn update(self: &Rc<Self>, context: &EditorContext, options: &ServiceOptions) {
        if self.in_flight.get() {
            log::debug!(
                target: "xtext_web_client::services",
                "Update in flight, scheduling follow-up"
            );
            self.follow_up.set(true);
            return;
        }

        let text = context.text();
        let server_state = context.server_state();
        let mut data = self.endpoint.request_data(options);
        match (server_state.state_id, server_state.text) {
            (Some(state_id), Some(known_text)) if !options.send_full_text => {
                let Some(delta) = compute_delta(&known_text, &text) else {
                    log::trace!(
                        target: "xtext_web_client::services",
                        "Server already holds the current text"
                    );
                    return;
                };
                data.insert("requiredStateId".to_string(), Value::from(state_id));
                insert_delta(&mut data, &delta);
            }
            _ => {
                data.insert("fullText".to_string(), Value::from(text.as_str()));
            }
        }

        self.in_flight.set(true);

        let service = Rc::downgrade(self);
        let success_options = options.clone();
        let on_success = move |context: &EditorContext,
                               payload: &Value|
              -> Result<(), ServiceFailure> {
            let service = service.upgrade();
            if let Some(service) = &service {
                service.in_flight.set(false);
            }
            let state_id = payload
                .get("stateId")
                .and_then(Value::as_str)
                .ok_or_else(|| ServiceFailure::InvalidResponse {
                    message: "update response without stateId".to_string(),
                })?;
            context.update_server_state(text, state_id.to_string());
            context.notify_server_state_changed();
            if let Some(service) = service {
                if service.follow_up.replace(false) {
                    service.update(context, &success_options);
                }
            }
            Ok(())
        };

        let service = Rc::downgrade(self);
        let failure_options = options.clone();
        let on_failure = move |context: &EditorContext, failure: &ServiceFailure| {
            let Some(service) = service.upgrade() else {
                return;
            };
            service.in_flight.set(false);
            let resync =
                matches!(failure, ServiceFailure::Conflict { kind } if kind == "invalidStateId");
            if service.follow_up.replace(false) || resync {
                service.update(context, &failure_options);
            }
        };

        self.endpoint
            .send(context, Method::Post, data, on_success, on_failure);
    }
}
