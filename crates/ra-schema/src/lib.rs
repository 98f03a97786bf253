//! Repository assistant configuration schema.
//!
//! This crate provides:
//! - Typed Rust structs for repository-assistant configuration documents
//!   (targets, metadata transformation, file conversions, enrichments)
//! - The hyphenated wire-name mapping used by the on-disk JSON files
//! - A pure validation pass that reports every violated field, not just
//!   the first

pub mod document;
pub mod validate;

pub use document::{
    ConfigDocument, Enrichment, FileConversion, Input, Metadata, NotificationItem, Target,
    TransformedMetadata,
};
pub use validate::{validate_document, SchemaError, Violation};
