//! Request transport used by the services.
//!
//! Services hand a [`Request`] and a completion continuation to a
//! [`Transport`]. The only implementation shipped here is [`MockTransport`],
//! which queues requests until a test settles them.

mod deferred;
mod mock;

pub use deferred::Deferred;
pub use mock::MockTransport;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::services::ServiceKind;

/// HTTP method of an outbound service request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

/// Everything about a request except its URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSettings {
    #[serde(rename = "type")]
    pub method: Method,
    /// Request parameters
    pub data: Map<String, Value>,
    /// Service that issued the request
    #[serde(skip)]
    pub service: ServiceKind,
}

impl RequestSettings {
    /// Look up a request parameter
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// An outbound service request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub url: String,
    pub settings: RequestSettings,
}

/// Details of a failed exchange, as an XMLHttpRequest would report them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Xhr {
    pub status: Option<u16>,
    pub response_text: Option<String>,
}

impl Xhr {
    pub fn with_status(status: u16) -> Self {
        Self {
            status: Some(status),
            response_text: None,
        }
    }
}

/// How a request was settled
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Success(Value),
    Error { error_thrown: String, xhr: Xhr },
}

/// Continuation invoked exactly once when the request is settled.
pub type Completion = Box<dyn FnOnce(Response)>;

/// Sends service requests and later settles them through their completion.
pub trait Transport {
    fn send(&self, request: Request, on_complete: Completion);
}
