use std::rc::Rc;

use serde::Deserialize;

use super::{ServiceEndpoint, ServiceKind, attach_document_state, parse_payload};
use crate::config::ServiceOptions;
use crate::editor::{EditorContext, Problem, RequestState};
use crate::transport::{Method, Transport};

#[derive(Debug, Deserialize)]
struct ValidationPayload {
    #[serde(default)]
    issues: Vec<Problem>,
}

/// Asks the server for the problems of the current document.
pub struct ValidationService {
    endpoint: ServiceEndpoint,
}

impl ValidationService {
    pub fn new(server_url: &str, resource_id: Option<&str>, transport: Rc<dyn Transport>) -> Self {
        Self {
            endpoint: ServiceEndpoint::new(ServiceKind::Validation, server_url, resource_id, transport),
        }
    }

    /// Request validation, unless one is already in flight.
    ///
    /// Clearing the context's client service state allows a new request
    /// while the previous one is still pending.
    pub fn compute_problems(&self, context: &EditorContext, options: &ServiceOptions) {
        if context.client_service_state(ServiceKind::Validation) == Some(RequestState::Started) {
            log::debug!(
                target: "xtext_web_client::services",
                "Validation already in progress, skipping"
            );
            return;
        }

        let mut data = self.endpoint.request_data(options);
        attach_document_state(context, &mut data, options, false);

        self.endpoint.send(
            context,
            Method::Post,
            data,
            |context, payload| {
                let result: ValidationPayload = parse_payload(ServiceKind::Validation, payload)?;
                log::debug!(
                    target: "xtext_web_client::services",
                    "Validation reported {} issue(s)",
                    result.issues.len()
                );
                context.set_problems(result.issues);
                Ok(())
            },
            |_, _| {},
        );
    }
}
