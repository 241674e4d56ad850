//! Core pipeline orchestration for Serialbind.
//!
//! This crate ties together fetching, normalization, chapter splitting,
//! attachment resolution, and EPUB packaging into the end-to-end
//! [`pipeline::build_epub`] workflow.

pub mod attachments;
pub mod organize;
pub mod pipeline;
