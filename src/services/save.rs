use std::cell::RefCell;
use std::rc::Rc;

use super::{ServiceEndpoint, ServiceKind, UpdateService, attach_document_state, record_state_id};
use crate::config::ServiceOptions;
use crate::editor::EditorContext;
use crate::transport::{Method, Transport};

/// Persists the document on the server.
///
/// When linked to the update service, the save carries the pending delta
/// against the known server state instead of the full text.
pub struct SaveResourceService {
    endpoint: ServiceEndpoint,
    update_service: RefCell<Option<Rc<UpdateService>>>,
}

impl SaveResourceService {
    pub fn new(server_url: &str, resource_id: &str, transport: Rc<dyn Transport>) -> Self {
        Self {
            endpoint: ServiceEndpoint::new(
                ServiceKind::Save,
                server_url,
                Some(resource_id),
                transport,
            ),
            update_service: RefCell::new(None),
        }
    }

    pub fn set_update_service(&self, update_service: Rc<UpdateService>) {
        *self.update_service.borrow_mut() = Some(update_service);
    }

    pub fn has_update_service(&self) -> bool {
        self.update_service.borrow().is_some()
    }

    pub fn save_resource(&self, context: &EditorContext, options: &ServiceOptions) {
        let mut data = self.endpoint.request_data(options);
        let sent_text =
            attach_document_state(context, &mut data, options, self.has_update_service());

        self.endpoint.send(
            context,
            Method::Post,
            data,
            move |context, payload| {
                context.mark_clean(true);
                record_state_id(context, payload, sent_text);
                Ok(())
            },
            |_, _| {},
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn setup() -> (EditorContext, MockTransport, SaveResourceService) {
        let transport = MockTransport::new();
        let service =
            SaveResourceService::new("test://xtext-service", "foo.mydsl", Rc::new(transport.clone()));
        (EditorContext::new(), transport, service)
    }

    #[test]
    fn save_without_server_state_sends_full_text() {
        let (context, transport, service) = setup();
        context.set_text("state idle", None);

        service.save_resource(&context, &ServiceOptions::default());

        let request = transport.next_request().unwrap();
        assert_eq!(request.url, "test://xtext-service/save");
        assert_eq!(request.settings.param("fullText"), Some(&json!("state idle")));
        assert_eq!(request.settings.param("resource"), Some(&json!("foo.mydsl")));
    }

    #[test]
    fn save_response_marks_clean_and_records_state() {
        let (context, transport, service) = setup();
        context.set_text("state idle", None);

        service.save_resource(&context, &ServiceOptions::default());
        transport.respond(json!({"stateId": "2"})).unwrap();

        assert!(!context.is_dirty());
        assert_eq!(context.server_state().state_id.as_deref(), Some("2"));
        assert_eq!(context.server_state().text.as_deref(), Some("state idle"));
    }

    #[test]
    fn linked_save_piggybacks_delta() {
        let (context, transport, service) = setup();
        let update = Rc::new(UpdateService::new(
            "test://xtext-service",
            Some("foo.mydsl"),
            Rc::new(transport.clone()),
        ));
        service.set_update_service(update);
        context.update_server_state("abc".to_string(), "3".to_string());
        context.set_text("abcd", None);

        service.save_resource(&context, &ServiceOptions::default());

        let request = transport.next_request().unwrap();
        assert_eq!(request.settings.param("requiredStateId"), Some(&json!("3")));
        assert_eq!(request.settings.param("deltaText"), Some(&json!("d")));
        assert_eq!(request.settings.param("deltaOffset"), Some(&json!(3)));
        assert!(request.settings.param("fullText").is_none());
    }

    #[test]
    fn http_error_leaves_document_dirty() {
        let (context, transport, service) = setup();
        context.set_text("x", None);

        service.save_resource(&context, &ServiceOptions::default());
        transport
            .http_error("Internal Server Error", crate::transport::Xhr::with_status(500))
            .unwrap();

        assert!(context.is_dirty());
    }
}
