pub mod defaults;
pub mod settings;
pub mod user;

pub use defaults::{DEFAULT_SERVER_URL, SYNTHETIC_RESOURCE_PREFIX, default_options};
pub use settings::{InvokeOverrides, ServiceOptions};
pub use user::{load_options, user_options_path};

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Map, Value};

/// Options shared by reference between the context, its services and the
/// listeners the configurator registers.
pub type SharedOptions = Rc<RefCell<ServiceOptions>>;

/// Shallow-merge two JSON objects.
///
/// Starts from a copy of `base` and overwrites every key present in
/// `overrides`. Nested objects are replaced, not merged.
pub fn shallow_merge(base: &Map<String, Value>, overrides: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Language id derived from a resource id: the part after the last `.`.
///
/// An id without a dot is returned whole.
pub fn language_from_resource(resource_id: &str) -> &str {
    resource_id.rsplit('.').next().unwrap_or(resource_id)
}
