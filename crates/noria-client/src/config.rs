#![forbid(unsafe_code)]

//! Client configuration.
//!
//! ```toml
//! # noria.toml
//! root_node = 0
//! mount_anchor = "root"
//! diagnostics_capacity = 256
//! ```
//!
//! Every key is optional; [`ClientConfig::default`] matches the stock server.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Node id mounted under the anchor when created. Default: 0.
    pub root_node: NodeId,
    /// `id` of the element the root is attached under. Default: `"root"`.
    ///
    /// The anchor belongs to the document, so this is read when the document
    /// is built (`HeadlessDocument::with_anchor(&config.mount_anchor)`), not
    /// by [`crate::Reconciler`], which mounts through [`noria_dom::Document::mount`].
    pub mount_anchor: String,
    /// Diagnostics kept in memory; older ones are dropped. Default: 256.
    pub diagnostics_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            root_node: NodeId::ROOT,
            mount_anchor: "root".to_owned(),
            diagnostics_capacity: 256,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a file, picking the format by extension (`.json` is JSON,
    /// anything else TOML), and validate the result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&std::fs::read_to_string(path)?)?
        } else {
            Self::from_toml_file(path)?
        };
        let problems = config.validate();
        if problems.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(problems))
        }
    }

    /// Problems with the configuration; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.mount_anchor.trim().is_empty() {
            errors.push("mount_anchor must not be empty".to_owned());
        }
        if self.diagnostics_capacity == 0 {
            errors.push("diagnostics_capacity must be at least 1".to_owned());
        }
        errors
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
