use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ops::Range;
use std::rc::{Rc, Weak};

use serde_json::Value;

use super::state::{Problem, RequestState, Selection, ServerState};
use crate::config::{InvokeOverrides, ServiceOptions, SharedOptions};
use crate::configure::ServiceDispatcher;
use crate::error::{ServiceError, ServiceFailure, ServiceResult};
use crate::services::{Invocation, ServiceKind};
use crate::text::splice;

/// Called with the context and the changed text after a model change.
pub type ModelChangeListener = Rc<dyn Fn(&EditorContext, &str)>;
/// Called after the server acknowledged a new document state.
pub type ServerStateListener = Rc<dyn Fn(&EditorContext)>;
/// Called after a service round trip succeeded.
pub type ServiceSuccessListener = Rc<dyn Fn(ServiceKind, &Value)>;
/// Called after a service round trip failed.
pub type ServiceErrorListener = Rc<dyn Fn(ServiceKind, &ServiceFailure)>;

/// Unified editor state combining document text, cursor and service bookkeeping.
///
/// Cheaply cloneable handle; clones share the same state. Listener
/// registries keep registration order and are snapshotted before they are
/// iterated, so a listener may register further listeners or trigger more
/// work without conflicting borrows.
#[derive(Clone)]
pub struct EditorContext {
    inner: Rc<ContextInner>,
}

struct ContextInner {
    text: RefCell<String>,
    caret_offset: Cell<usize>,
    selection: Cell<Selection>,
    dirty: Cell<bool>,
    options: RefCell<SharedOptions>,
    server_state: RefCell<ServerState>,
    client_service_state: RefCell<HashMap<ServiceKind, RequestState>>,
    problems: RefCell<Vec<Problem>>,
    model_change_listeners: RefCell<Vec<ModelChangeListener>>,
    server_state_listeners: RefCell<Vec<ServerStateListener>>,
    success_listeners: RefCell<Vec<ServiceSuccessListener>>,
    error_listeners: RefCell<Vec<ServiceErrorListener>>,
    dispatcher: RefCell<Option<Rc<ServiceDispatcher>>>,
}

/// Non-owning handle to an [`EditorContext`].
///
/// Held by work queued on a transport so an unsettled request does not keep
/// the context, its services and the transport alive in a cycle.
#[derive(Clone)]
pub struct WeakEditorContext {
    inner: Weak<ContextInner>,
}

impl WeakEditorContext {
    /// The context, unless every strong handle has been dropped
    pub fn upgrade(&self) -> Option<EditorContext> {
        self.inner.upgrade().map(|inner| EditorContext { inner })
    }
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorContext {
    /// Create an empty, clean editor with no services installed
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ContextInner {
                text: RefCell::new(String::new()),
                caret_offset: Cell::new(0),
                selection: Cell::new(Selection::default()),
                dirty: Cell::new(false),
                options: RefCell::new(Rc::new(RefCell::new(ServiceOptions::default()))),
                server_state: RefCell::new(ServerState::default()),
                client_service_state: RefCell::new(HashMap::new()),
                problems: RefCell::new(Vec::new()),
                model_change_listeners: RefCell::new(Vec::new()),
                server_state_listeners: RefCell::new(Vec::new()),
                success_listeners: RefCell::new(Vec::new()),
                error_listeners: RefCell::new(Vec::new()),
                dispatcher: RefCell::new(None),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakEditorContext {
        WeakEditorContext {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Get the document text
    pub fn text(&self) -> String {
        self.inner.text.borrow().clone()
    }

    /// Replace the text, or only `range` of it, without notifying listeners.
    ///
    /// Any text change marks the document dirty.
    pub fn set_text(&self, text: &str, range: Option<Range<usize>>) {
        splice(&mut self.inner.text.borrow_mut(), range, text);
        self.inner.dirty.set(true);
    }

    pub fn caret_offset(&self) -> usize {
        self.inner.caret_offset.get()
    }

    /// Move the caret; the selection collapses onto it.
    pub fn set_caret_offset(&self, offset: usize) {
        self.inner.caret_offset.set(offset);
        self.inner.selection.set(Selection::caret(offset));
    }

    pub fn selection(&self) -> Selection {
        self.inner.selection.get()
    }

    pub fn set_selection(&self, selection: Selection) {
        self.inner.selection.set(selection);
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    /// Set the clean flag used by save/revert logic.
    pub fn mark_clean(&self, clean: bool) {
        self.inner.dirty.set(!clean);
    }

    /// Shared handle to the options this context was configured with.
    ///
    /// Mutations through the handle are visible to every service.
    pub fn options(&self) -> SharedOptions {
        Rc::clone(&self.inner.options.borrow())
    }

    pub(crate) fn set_options(&self, options: SharedOptions) {
        *self.inner.options.borrow_mut() = options;
    }

    pub fn server_state(&self) -> ServerState {
        self.inner.server_state.borrow().clone()
    }

    /// Record that the server holds `text` under `state_id`.
    ///
    /// Does not notify server-state listeners; see
    /// [`EditorContext::notify_server_state_changed`].
    pub fn update_server_state(&self, text: String, state_id: String) {
        *self.inner.server_state.borrow_mut() = ServerState {
            state_id: Some(state_id),
            text: Some(text),
        };
    }

    /// Forget the server state, e.g. after the server rejected our state id.
    pub fn forget_server_state(&self) {
        *self.inner.server_state.borrow_mut() = ServerState::default();
    }

    pub fn client_service_state(&self, kind: ServiceKind) -> Option<RequestState> {
        self.inner.client_service_state.borrow().get(&kind).copied()
    }

    pub(crate) fn set_client_service_state(&self, kind: ServiceKind, state: RequestState) {
        self.inner
            .client_service_state
            .borrow_mut()
            .insert(kind, state);
    }

    /// Drop all cached client-side service progress.
    pub fn clear_client_service_state(&self) {
        self.inner.client_service_state.borrow_mut().clear();
    }

    pub fn problems(&self) -> Vec<Problem> {
        self.inner.problems.borrow().clone()
    }

    pub(crate) fn set_problems(&self, problems: Vec<Problem>) {
        *self.inner.problems.borrow_mut() = problems;
    }

    pub fn add_model_change_listener(&self, listener: impl Fn(&EditorContext, &str) + 'static) {
        self.inner
            .model_change_listeners
            .borrow_mut()
            .push(Rc::new(listener));
    }

    /// Snapshot of the model-change listeners in registration order
    pub fn model_change_listeners(&self) -> Vec<ModelChangeListener> {
        self.inner.model_change_listeners.borrow().clone()
    }

    pub fn add_server_state_listener(&self, listener: impl Fn(&EditorContext) + 'static) {
        self.inner
            .server_state_listeners
            .borrow_mut()
            .push(Rc::new(listener));
    }

    /// Call every server-state listener in registration order.
    pub fn notify_server_state_changed(&self) {
        let listeners = self.inner.server_state_listeners.borrow().clone();
        log::trace!(
            target: "xtext_web_client::editor",
            "Notifying {} server state listener(s)",
            listeners.len()
        );
        for listener in listeners {
            listener(self);
        }
    }

    pub fn add_service_success_listener(
        &self,
        listener: impl Fn(ServiceKind, &Value) + 'static,
    ) {
        self.inner
            .success_listeners
            .borrow_mut()
            .push(Rc::new(listener));
    }

    pub fn add_service_error_listener(
        &self,
        listener: impl Fn(ServiceKind, &ServiceFailure) + 'static,
    ) {
        self.inner
            .error_listeners
            .borrow_mut()
            .push(Rc::new(listener));
    }

    pub(crate) fn notify_service_success(&self, kind: ServiceKind, result: &Value) {
        let listeners = self.inner.success_listeners.borrow().clone();
        for listener in listeners {
            listener(kind, result);
        }
    }

    pub(crate) fn notify_service_error(&self, kind: ServiceKind, failure: &ServiceFailure) {
        let listeners = self.inner.error_listeners.borrow().clone();
        for listener in listeners {
            listener(kind, failure);
        }
    }

    /// Reset the success and error listener registries to empty.
    pub(crate) fn clear_service_listeners(&self) {
        self.inner.success_listeners.borrow_mut().clear();
        self.inner.error_listeners.borrow_mut().clear();
    }

    pub(crate) fn install_dispatcher(&self, dispatcher: Rc<ServiceDispatcher>) {
        *self.inner.dispatcher.borrow_mut() = Some(dispatcher);
    }

    /// The dispatcher installed by the configurator, if any
    pub fn dispatcher(&self) -> Option<Rc<ServiceDispatcher>> {
        self.inner.dispatcher.borrow().clone()
    }

    /// Route a service invocation to the configured service instance.
    ///
    /// Fails with [`ServiceError::ServiceNotAvailable`] when no dispatcher is
    /// installed or the service was not constructed.
    pub fn invoke_service(
        &self,
        kind: ServiceKind,
        overrides: &InvokeOverrides,
    ) -> ServiceResult<Option<Invocation>> {
        let dispatcher = self
            .dispatcher()
            .ok_or_else(|| ServiceError::not_available(kind.as_str()))?;
        dispatcher.invoke(self, kind, overrides)
    }
}
