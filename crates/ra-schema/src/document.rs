//! Configuration document types.
//!
//! These types match the on-disk JSON layout of repository-assistant
//! configuration files. Wire field names use the hyphenated convention
//! (`repo-pid`, `target-url`); the serde renames below are the single
//! source of truth for that mapping.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validate::{validate_document, SchemaError};

/// One named configuration document: how a deposit workflow bridges to
/// one or more target repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Unique document name; also the filename stem under the config directory.
    pub name: String,

    /// Legacy configuration label carried over from older documents.
    #[serde(rename = "assistant-config-name", default)]
    pub assistant_config_name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "app-name")]
    pub app_name: String,

    #[serde(rename = "app-config-url", default)]
    pub app_config_url: Option<String>,

    /// Destination repositories. Never empty in a validated document.
    pub targets: Vec<Target>,

    #[serde(rename = "file-conversions", default)]
    pub file_conversions: Option<Vec<FileConversion>>,

    #[serde(default)]
    pub enrichments: Option<Vec<Enrichment>>,
}

/// One destination repository endpoint and its bridging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Persistent identifier of the repository.
    #[serde(rename = "repo-pid")]
    pub repo_pid: String,

    #[serde(rename = "repo-name")]
    pub repo_name: String,

    #[serde(rename = "repo-display-name")]
    pub repo_display_name: String,

    /// Capability-set tag selecting the bridging adapter; an opaque key,
    /// not a class reference.
    #[serde(rename = "bridge-module-class")]
    pub bridge_module_class: String,

    #[serde(rename = "base-url", default)]
    pub base_url: Option<String>,

    #[serde(rename = "target-url")]
    pub target_url: String,

    #[serde(rename = "target-url-params", default)]
    pub target_url_params: Option<String>,

    /// Absent credentials mean "use ambient/default credentials".
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub metadata: Option<Metadata>,

    #[serde(rename = "initial-release-version", default)]
    pub initial_release_version: Option<String>,

    /// Upstream target to source data from, if any.
    #[serde(default)]
    pub input: Option<Input>,
}

/// Metadata block for a target repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub specification: Option<Vec<String>>,

    /// Never empty in a validated document.
    #[serde(rename = "transformed-metadata")]
    pub transformed_metadata: Vec<TransformedMetadata>,
}

/// A named metadata artifact produced for a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedMetadata {
    /// Artifact name; conventionally also its output filename.
    pub name: String,

    /// Absent means the metadata passes through unmodified.
    #[serde(rename = "transformer-url", default)]
    pub transformer_url: Option<String>,

    /// Absent means the document root.
    #[serde(rename = "target-dir", default)]
    pub target_dir: Option<String>,

    #[serde(default)]
    pub restricted: Option<bool>,
}

impl TransformedMetadata {
    /// Whether this artifact is restricted. Unset means unrestricted.
    pub fn is_restricted(&self) -> bool {
        self.restricted.unwrap_or(false)
    }
}

/// Reference to an upstream target whose output feeds this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    #[serde(rename = "from-target-name")]
    pub from_target_name: String,
}

/// One file-conversion rule handled by an external conversion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConversion {
    /// Opaque string key, unique within the document.
    pub id: String,

    #[serde(rename = "origin-type")]
    pub origin_type: String,

    #[serde(rename = "target-type")]
    pub target_type: String,

    #[serde(rename = "conversion-url")]
    pub conversion_url: String,

    #[serde(default)]
    pub notification: Option<Vec<NotificationItem>>,
}

/// One enrichment-service hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Opaque string key, unique within the document.
    pub id: String,

    pub name: String,

    #[serde(rename = "service-url")]
    pub service_url: String,

    #[serde(rename = "result-url")]
    pub result_url: String,

    /// Free-form permission tag, e.g. a visibility level.
    #[serde(default)]
    pub permission: Option<String>,

    #[serde(default)]
    pub notification: Option<Vec<NotificationItem>>,
}

/// A notification channel plus its channel-specific configuration string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationItem {
    /// Channel type, e.g. `mail`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Opaque configuration interpreted by the channel (address, path, ...).
    pub conf: String,
}

impl ConfigDocument {
    /// Validate a raw JSON tree and construct the typed document.
    ///
    /// Pure and side-effect-free; a document is never partially constructed.
    pub fn from_value(raw: &Value) -> Result<Self, SchemaError> {
        validate_document(raw)
    }

    /// Parse and validate a document from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, SchemaError> {
        let raw: Value = serde_json::from_str(json)
            .map_err(|e| SchemaError::malformed(format!("invalid JSON: {e}")))?;
        validate_document(&raw)
    }
}
