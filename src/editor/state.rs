use serde::{Deserialize, Serialize};

/// Selected range of the document as byte offsets; `start == end` when
/// nothing is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Empty selection at `offset`
    pub fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// What the client knows about the server's copy of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerState {
    /// State id the server handed out with its last answer
    pub state_id: Option<String>,
    /// Document text the server holds under `state_id`
    pub text: Option<String>,
}

/// Progress of a service request, as tracked on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Started,
    Finished,
}

/// A validation issue reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Problem {
    pub description: String,
    pub severity: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub offset: Option<usize>,
    pub length: Option<usize>,
}
