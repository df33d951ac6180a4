//! Default configuration values for the editor service layer.

use super::settings::ServiceOptions;

/// Server address used when the options do not name one.
pub const DEFAULT_SERVER_URL: &str = "test://xtext-service";

/// Prefix of the resource id synthesized for documents without one.
pub const SYNTHETIC_RESOURCE_PREFIX: &str = "text.";

/// Returns the default options: every optional service enabled,
/// incremental updates, no resource.
pub fn default_options() -> ServiceOptions {
    ServiceOptions {
        resource_id: None,
        xtext_lang: None,
        server_url: None,
        load_from_server: None,
        send_full_text: false,
        enable_validation_service: true,
        enable_content_assist_service: true,
        content_type: None,
        offset: None,
        selection: None,
        extra: serde_json::Map::new(),
    }
}
