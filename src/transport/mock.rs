//! Scriptable transport for tests.
//!
//! Requests are queued in the order they are sent. A test inspects them with
//! `next_request` and settles them with `respond` / `http_error`; nothing
//! completes on its own. Settling picks the most recently inspected request
//! that is still open, then the oldest uninspected one.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde_json::Value;

use super::{Completion, Request, Response, Transport, Xhr};
use crate::error::{ServiceError, ServiceResult};

/// Queue of unsettled requests shared between the services and the test.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Rc<RefCell<MockState>>,
}

#[derive(Default)]
struct MockState {
    pending: VecDeque<PendingRequest>,
    /// Requests handed out by `next_request` and not yet settled, oldest first
    inspected: Vec<PendingRequest>,
}

struct PendingRequest {
    request: Request,
    on_complete: Completion,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every queued and inspected request without settling them.
    pub fn reset(&self) {
        let mut state = self.state.borrow_mut();
        state.pending.clear();
        state.inspected.clear();
    }

    /// Number of requests not yet handed out by `next_request`
    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Pop the oldest queued request and make it the current one.
    ///
    /// A previously inspected request that is still unsettled stays
    /// settleable after the new current one.
    pub fn next_request(&self) -> Option<Request> {
        let mut state = self.state.borrow_mut();
        let next = state.pending.pop_front()?;
        let request = next.request.clone();
        state.inspected.push(next);
        Some(request)
    }

    /// Number of requests inspected but not yet settled
    pub fn inspected_count(&self) -> usize {
        self.state.borrow().inspected.len()
    }

    /// Settle the current request, or else the oldest queued one, successfully.
    pub fn respond(&self, result: Value) -> ServiceResult<()> {
        self.settle(Response::Success(result))
    }

    /// Fail the current request, or else the oldest queued one.
    pub fn http_error(&self, error_thrown: impl Into<String>, xhr: Xhr) -> ServiceResult<()> {
        self.settle(Response::Error {
            error_thrown: error_thrown.into(),
            xhr,
        })
    }

    fn settle(&self, response: Response) -> ServiceResult<()> {
        let target = {
            let mut state = self.state.borrow_mut();
            match state.inspected.pop() {
                Some(current) => current,
                None => state
                    .pending
                    .pop_front()
                    .ok_or(ServiceError::NoPendingRequest)?,
            }
        };

        log::debug!(
            target: "xtext_web_client::transport",
            "Settling {} request to {}",
            target.request.settings.service,
            target.request.url
        );

        // Queue borrow is released: the completion may send follow-up requests
        (target.on_complete)(response);
        Ok(())
    }
}

impl Transport for MockTransport {
    fn send(&self, request: Request, on_complete: Completion) {
        log::debug!(
            target: "xtext_web_client::transport",
            "Queued {:?} {}",
            request.settings.method,
            request.url
        );
        self.state.borrow_mut().pending.push_back(PendingRequest {
            request,
            on_complete,
        });
    }
}
