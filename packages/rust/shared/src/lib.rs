//! Shared types, error model, and configuration for Serialbind.
//!
//! This crate is the foundation depended on by all other Serialbind crates.
//! It provides:
//! - [`SerialbindError`] — the unified error type
//! - Domain types ([`SourceDocument`], [`ContentPart`], [`SeparateFile`], [`BookMetadata`])
//! - The book manifest ([`BookManifest`], manifest loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{BookManifest, load_manifest, load_manifest_str, sample_manifest};
pub use error::{Result, SerialbindError};
pub use types::{
    BookMetadata, ContentPart, SeparateFile, SourceDocument, extra_filename, pad3, part_filename,
};
