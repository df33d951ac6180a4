use std::rc::Rc;

use super::load::DocumentPayload;
use super::{ServiceEndpoint, ServiceKind, parse_payload};
use crate::config::ServiceOptions;
use crate::editor::EditorContext;
use crate::transport::{Method, Transport};

/// Discards local changes by reloading the last saved server copy.
pub struct RevertResourceService {
    endpoint: ServiceEndpoint,
}

impl RevertResourceService {
    pub fn new(server_url: &str, resource_id: &str, transport: Rc<dyn Transport>) -> Self {
        Self {
            endpoint: ServiceEndpoint::new(
                ServiceKind::Revert,
                server_url,
                Some(resource_id),
                transport,
            ),
        }
    }

    pub fn revert_resource(&self, context: &EditorContext, options: &ServiceOptions) {
        let data = self.endpoint.request_data(options);
        self.endpoint.send(
            context,
            Method::Post,
            data,
            |context, payload| {
                let document: DocumentPayload = parse_payload(ServiceKind::Revert, payload)?;
                document.apply(context);
                Ok(())
            },
            |_, _| {},
        );
    }
}
