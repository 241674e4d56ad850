//! HTTP fetching and article extraction.
//!
//! This crate provides:
//! - [`Fetcher`] — a sequential text/binary HTTP facade over `reqwest`
//! - [`extract_article`] — pulls the `<article>` markup out of a chapter page

pub mod article;
pub mod client;

pub use article::{document_title, extract_article};
pub use client::{BinaryPayload, Fetcher};
