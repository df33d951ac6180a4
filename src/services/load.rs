use std::rc::Rc;

use serde::Deserialize;

use super::{ServiceEndpoint, ServiceKind, parse_payload};
use crate::config::ServiceOptions;
use crate::editor::EditorContext;
use crate::transport::{Method, Transport};

/// Payload of a successful load or revert.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DocumentPayload {
    pub full_text: String,
    #[serde(default)]
    pub dirty: bool,
    pub state_id: Option<String>,
}

impl DocumentPayload {
    /// Replace the editor content with the server's copy.
    pub(crate) fn apply(self, context: &EditorContext) {
        context.set_text(&self.full_text, None);
        context.mark_clean(!self.dirty);
        if let Some(state_id) = self.state_id {
            context.update_server_state(self.full_text, state_id);
        }
    }
}

/// Loads the resource content from the server into the editor.
pub struct LoadResourceService {
    endpoint: ServiceEndpoint,
}

impl LoadResourceService {
    pub fn new(server_url: &str, resource_id: &str, transport: Rc<dyn Transport>) -> Self {
        Self {
            endpoint: ServiceEndpoint::new(
                ServiceKind::Load,
                server_url,
                Some(resource_id),
                transport,
            ),
        }
    }

    pub fn load_resource(&self, context: &EditorContext, options: &ServiceOptions) {
        let data = self.endpoint.request_data(options);
        self.endpoint.send(
            context,
            Method::Get,
            data,
            |context, payload| {
                let document: DocumentPayload = parse_payload(ServiceKind::Load, payload)?;
                log::debug!(
                    target: "xtext_web_client::services",
                    "Loaded {} bytes (dirty: {})",
                    document.full_text.len(),
                    document.dirty
                );
                document.apply(context);
                Ok(())
            },
            |_, _| {},
        );
    }
}
