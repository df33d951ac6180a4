use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::defaults::{DEFAULT_SERVER_URL, default_options};
use super::shallow_merge;
use crate::editor::Selection;
use crate::error::{ServiceError, ServiceResult};

/// Options controlling which services are constructed and how they address
/// the server.
///
/// Deserialized from camelCase keys (`resourceId`, `xtextLang`, ...). Keys
/// that are not recognized land in `extra` and are forwarded as additional
/// request parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xtext_lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    /// `None` means "not specified"; configuration fills it in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_from_server: Option<bool>,
    pub send_full_text: bool,
    pub enable_validation_service: bool,
    pub enable_content_assist_service: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Caret offset; set per content-assist invocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// Selection; set per content-assist invocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        default_options()
    }
}

impl ServiceOptions {
    /// Options for a resource with the given id.
    pub fn for_resource(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: Some(resource_id.into()),
            ..Self::default()
        }
    }

    /// Options for an anonymous document of the given language.
    pub fn for_language(xtext_lang: impl Into<String>) -> Self {
        Self {
            xtext_lang: Some(xtext_lang.into()),
            ..Self::default()
        }
    }

    /// The configured server URL, or the default placeholder.
    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    /// Check the options once before any service is built.
    pub fn validate(&self) -> ServiceResult<()> {
        url::Url::parse(self.server_url()).map_err(|e| {
            ServiceError::config(format!("invalid serverUrl '{}': {}", self.server_url(), e))
        })?;
        Ok(())
    }

    /// Copy of these options with `overrides` applied on top.
    ///
    /// The receiver is left untouched.
    pub fn merged(&self, overrides: &InvokeOverrides) -> ServiceOptions {
        let mut merged = self.clone();
        if let Some(resource_id) = &overrides.resource_id {
            merged.resource_id = Some(resource_id.clone());
        }
        if let Some(xtext_lang) = &overrides.xtext_lang {
            merged.xtext_lang = Some(xtext_lang.clone());
        }
        if let Some(server_url) = &overrides.server_url {
            merged.server_url = Some(server_url.clone());
        }
        if let Some(load_from_server) = overrides.load_from_server {
            merged.load_from_server = Some(load_from_server);
        }
        if let Some(send_full_text) = overrides.send_full_text {
            merged.send_full_text = send_full_text;
        }
        if let Some(content_type) = &overrides.content_type {
            merged.content_type = Some(content_type.clone());
        }
        if let Some(offset) = overrides.offset {
            merged.offset = Some(offset);
        }
        if let Some(selection) = overrides.selection {
            merged.selection = Some(selection);
        }
        merged.extra = shallow_merge(&self.extra, &overrides.extra);
        merged
    }
}

/// Per-invocation overrides; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvokeOverrides {
    pub resource_id: Option<String>,
    pub xtext_lang: Option<String>,
    pub server_url: Option<String>,
    pub load_from_server: Option<bool>,
    pub send_full_text: Option<bool>,
    pub content_type: Option<String>,
    pub offset: Option<usize>,
    pub selection: Option<Selection>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InvokeOverrides {
    /// Add a pass-through request parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
