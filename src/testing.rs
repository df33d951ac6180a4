//! Fluent test driver for editor service scenarios.
//!
//! [`Tester`] wraps a configured [`EditorContext`] and the [`MockTransport`]
//! its services talk to. A scenario chains edits, service invocations,
//! simulated server answers and checks:
//!
//! ```ignore
//! let mut tester = test_editor(ServiceOptions::for_language("mydsl"))?;
//! tester
//!     .set_text("abc", Some(0..0))
//!     .invoke_service(ServiceKind::ContentAssist, InvokeOverrides::default())?
//!     .respond(json!([{"proposal": "abcd"}]))?
//!     .check_result(|checked| assert!(matches!(checked, Checked::Result(Ok(_)))))
//!     .done();
//! ```

use std::ops::Range;
use std::rc::Rc;

use serde_json::Value;

use crate::config::{InvokeOverrides, ServiceOptions};
use crate::configure::create_editor;
use crate::editor::EditorContext;
use crate::error::ServiceResult;
use crate::services::{Invocation, Outcome, ServiceKind};
use crate::transport::{MockTransport, RequestSettings, Xhr};

/// What a `check_result` checker is handed.
#[derive(Clone)]
pub enum Checked {
    /// Outcome of the last invocation that returned one
    Result(Outcome),
    /// The editor itself, when no invocation returned anything
    Context(EditorContext),
}

impl Checked {
    /// The outcome, if this is one
    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            Checked::Result(outcome) => Some(outcome),
            Checked::Context(_) => None,
        }
    }

    /// The editor context, if this is one
    pub fn context(&self) -> Option<&EditorContext> {
        match self {
            Checked::Context(context) => Some(context),
            Checked::Result(_) => None,
        }
    }
}

/// Build an editor with `options` on a fresh mock transport and wrap it.
pub fn test_editor(options: ServiceOptions) -> ServiceResult<Tester> {
    let transport = MockTransport::new();
    let context = create_editor(options, Rc::new(transport.clone()))?;
    Ok(Tester::new(context, transport))
}

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Sequences one test scenario against an editor context.
pub struct Tester {
    context: EditorContext,
    transport: MockTransport,
    done_callback: Option<Box<dyn FnOnce()>>,
    last_result: Option<Invocation>,
}

impl Tester {
    pub fn new(context: EditorContext, transport: MockTransport) -> Self {
        Self {
            context,
            transport,
            done_callback: None,
            last_result: None,
        }
    }

    /// Callback invoked by [`Tester::done`].
    pub fn with_done_callback(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.done_callback = Some(Box::new(callback));
        self
    }

    pub fn editor_context(&self) -> &EditorContext {
        &self.context
    }

    pub fn transport(&self) -> &MockTransport {
        &self.transport
    }

    /// Requests sent but not yet inspected or settled
    pub fn pending_requests(&self) -> usize {
        self.transport.pending_count()
    }

    /// Run arbitrary wiring against the editor context.
    pub fn setup(&mut self, action: impl FnOnce(&EditorContext)) -> &mut Self {
        action(&self.context);
        self
    }

    /// Replace the text, or `range` of it, without notifying listeners.
    pub fn set_text(&mut self, text: &str, range: Option<Range<usize>>) -> &mut Self {
        self.context.set_text(text, range);
        self
    }

    pub fn set_caret_offset(&mut self, offset: usize) -> &mut Self {
        self.context.set_caret_offset(offset);
        self
    }

    pub fn mark_clean(&mut self, clean: bool) -> &mut Self {
        self.context.mark_clean(clean);
        self
    }

    /// Dispatch `kind`; a returned invocation replaces the last result.
    pub fn invoke_service(
        &mut self,
        kind: ServiceKind,
        overrides: InvokeOverrides,
    ) -> ServiceResult<&mut Self> {
        if let Some(invocation) = self.context.invoke_service(kind, &overrides)? {
            self.last_result = Some(invocation);
        }
        Ok(self)
    }

    /// Like [`Tester::invoke_service`], with the service given by name.
    pub fn invoke_service_named(
        &mut self,
        name: &str,
        overrides: InvokeOverrides,
    ) -> ServiceResult<&mut Self> {
        let kind = name.parse()?;
        self.invoke_service(kind, overrides)
    }

    /// Set the text, then call every model-change listener once with `text`.
    pub fn trigger_model_change(&mut self, text: &str, range: Option<Range<usize>>) -> &mut Self {
        self.context.set_text(text, range);
        for listener in self.context.model_change_listeners() {
            listener(&self.context, text);
        }
        self
    }

    /// Check the last invocation result, or the editor if there is none.
    ///
    /// A result still waiting for its answer defers `checker` until
    /// `respond`/`http_error` settles it.
    pub fn check_result(&mut self, checker: impl FnOnce(Checked) + 'static) -> &mut Self {
        match &self.last_result {
            Some(Invocation::Deferred(deferred)) => {
                deferred.on_settled(move |outcome| checker(Checked::Result(outcome.clone())));
            }
            Some(Invocation::Ready(outcome)) => checker(Checked::Result(outcome.clone())),
            None => checker(Checked::Context(self.context.clone())),
        }
        self
    }

    /// Hand the next sent request to `checker`.
    ///
    /// Does nothing when no request is pending; assert on
    /// [`Tester::pending_requests`] to require one.
    pub fn check_request(&mut self, checker: impl FnOnce(&str, &RequestSettings)) -> &mut Self {
        if let Some(request) = self.transport.next_request() {
            checker(&request.url, &request.settings);
        }
        self
    }

    /// Answer the current request successfully with `result`.
    pub fn respond(&mut self, result: Value) -> ServiceResult<&mut Self> {
        self.transport.respond(result)?;
        Ok(self)
    }

    /// Fail the current request.
    pub fn http_error(&mut self, error_thrown: &str, xhr: Xhr) -> ServiceResult<&mut Self> {
        self.transport.http_error(error_thrown, xhr)?;
        Ok(self)
    }

    /// Finish the scenario; runs the done callback once.
    pub fn done(&mut self) {
        if let Some(callback) = self.done_callback.take() {
            callback();
        }
    }
}
