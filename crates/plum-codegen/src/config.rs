//! Generator configuration.
//!
//! Loaded from a JSON file (camelCase keys, every key optional) and then
//! overridden from the environment:
//!
//! - `PLUM_LANGUAGE`: target language name
//! - `PLUM_STRUCTURE_ENDPOINT_<VENDOR>`: structure lookup URL template for one
//!   vendor, `{id}` is replaced by the structure id

use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{GenerateError, Result};
use crate::types::ModelKind;

const LANGUAGE_ENV: &str = "PLUM_LANGUAGE";
const ENDPOINT_ENV_PREFIX: &str = "PLUM_STRUCTURE_ENDPOINT_";

/// Base class names used for each kind of generated model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseTypes {
    pub child: String,
    pub param: String,
    pub response: String,
    pub request: String,
}

impl BaseTypes {
    /// `{prefix}ParamBase`, `{prefix}ResponseBase`, `{prefix}RequestBase`
    /// with `BaseModel` for nested models.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            child: "BaseModel".to_string(),
            param: format!("{prefix}ParamBase"),
            response: format!("{prefix}ResponseBase"),
            request: format!("{prefix}RequestBase"),
        }
    }

    pub fn for_kind(&self, kind: ModelKind) -> &str {
        match kind {
            ModelKind::Child => &self.child,
            ModelKind::Param => &self.param,
            ModelKind::Response => &self.response,
            ModelKind::Request => &self.request,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    pub language: String,
    pub need_removed: bool,
    pub need_deprecated: bool,
    pub need_example: bool,
    pub need_description: bool,
    /// Base types per vendor id; vendors not listed use their built-in table.
    pub model_config: IndexMap<String, BaseTypes>,
    /// Structure lookup URL template per vendor id.
    pub structure_endpoints: IndexMap<String, String>,
    pub http_timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            language: "Python".to_string(),
            need_removed: false,
            need_deprecated: false,
            need_example: true,
            need_description: true,
            model_config: IndexMap::new(),
            structure_endpoints: IndexMap::new(),
            http_timeout_secs: 30,
        }
    }
}

impl GeneratorConfig {
    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        Self::default().with_overrides(std::env::vars())
    }

    /// Parse a JSON config file, then apply environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GenerateError::Config(format!("{}: {e}", path.display())))?;
        Ok(Self::from_json(&text)?.with_overrides(std::env::vars()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| GenerateError::Config(e.to_string()))
    }

    /// Apply `PLUM_*` variables from `vars`.
    pub fn with_overrides(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        for (key, value) in vars {
            if value.is_empty() {
                continue;
            }
            if key == LANGUAGE_ENV {
                self.language = value;
            } else if let Some(vendor) = key.strip_prefix(ENDPOINT_ENV_PREFIX)
                && !vendor.is_empty()
            {
                self.structure_endpoints
                    .insert(vendor.to_ascii_lowercase(), value);
            }
        }
        self
    }

    /// Configured base types for `vendor`, falling back to `builtin`.
    pub fn base_types(&self, vendor: &str, builtin: BaseTypes) -> BaseTypes {
        self.model_config.get(vendor).cloned().unwrap_or(builtin)
    }

    pub fn structure_endpoint(&self, vendor: &str) -> Option<&str> {
        self.structure_endpoints
            .get(vendor)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }
}
