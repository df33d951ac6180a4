use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use super::{
    Invocation, Outcome, ServiceEndpoint, ServiceKind, UpdateService, attach_document_state,
    record_state_id,
};
use crate::config::ServiceOptions;
use crate::editor::EditorContext;
use crate::error::ServiceFailure;
use crate::transport::{Deferred, Method, Transport};

/// Requests completion proposals at the caret.
///
/// When linked to the update service, pending edits travel with the request
/// as a delta, so proposals reflect the text the user sees.
pub struct ContentAssistService {
    endpoint: ServiceEndpoint,
    update_service: RefCell<Option<Rc<UpdateService>>>,
}

impl ContentAssistService {
    pub fn new(server_url: &str, resource_id: Option<&str>, transport: Rc<dyn Transport>) -> Self {
        Self {
            endpoint: ServiceEndpoint::new(
                ServiceKind::ContentAssist,
                server_url,
                resource_id,
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

    /// Ask for proposals at `options.offset` (the caret when unset).
    ///
    /// Offsets past the end of the document are answered immediately with
    /// [`ServiceFailure::OffsetOutOfBounds`] and nothing is sent.
    pub fn compute_content_assist(
        &self,
        context: &EditorContext,
        options: &ServiceOptions,
    ) -> Invocation {
        let offset = options.offset.unwrap_or_else(|| context.caret_offset());
        let length = context.text().len();
        if offset > length {
            return Invocation::Ready(Err(ServiceFailure::OffsetOutOfBounds { offset, length }));
        }

        let mut data = self.endpoint.request_data(options);
        data.insert("caretOffset".to_string(), Value::from(offset));
        let selection = options.selection.unwrap_or_else(|| context.selection());
        if !selection.is_empty() {
            data.insert("selectionStart".to_string(), Value::from(selection.start));
            data.insert("selectionEnd".to_string(), Value::from(selection.end));
        }
        let sent_text =
            attach_document_state(context, &mut data, options, self.has_update_service());

        let deferred: Deferred<Outcome> = Deferred::new();
        let on_success = {
            let deferred = deferred.clone();
            move |context: &EditorContext, payload: &Value| -> Result<(), ServiceFailure> {
                record_state_id(context, payload, sent_text);
                deferred.settle(Ok(payload.clone()));
                Ok(())
            }
        };
        let on_failure = {
            let deferred = deferred.clone();
            move |_: &EditorContext, failure: &ServiceFailure| {
                deferred.settle(Err(failure.clone()));
            }
        };

        self.endpoint
            .send(context, Method::Post, data, on_success, on_failure);
        Invocation::Deferred(deferred)
    }
}
