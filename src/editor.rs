//! Editor state under test.
//!
//! `EditorContext` is the document/editor object the services read from and
//! write to: text, caret, selection, dirty flag, what the server knows, and
//! the listener registries the configurator wires up.

mod context;
mod state;

pub use context::{
    EditorContext, ModelChangeListener, ServerStateListener, ServiceErrorListener,
    ServiceSuccessListener, WeakEditorContext,
};
pub use state::{Problem, RequestState, Selection, ServerState};
