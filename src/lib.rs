pub mod config;
pub mod configure;
pub mod editor;
pub mod error;
pub mod services;
pub mod testing;
pub mod text;
pub mod transport;

pub use config::{InvokeOverrides, ServiceOptions};
pub use configure::{ServiceDispatcher, configure_services, create_editor};
pub use editor::EditorContext;
pub use error::{ServiceError, ServiceFailure, ServiceResult};
pub use services::{Invocation, ServiceKind};
pub use testing::{Checked, Tester, test_editor};
pub use transport::{MockTransport, Transport};
