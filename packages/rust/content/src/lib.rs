//! Markup normalization and chapter splitting.
//!
//! Pure text transforms between the fetched HTML and the packaged XHTML:
//! - [`normalize`] — rewrites HTML5 shorthand into XHTML-legal text
//! - [`css`] — strips stylesheet constructs that misbehave on e-readers
//! - [`split`] — detects the end-of-chapter marker and splits on dividers

pub mod css;
pub mod normalize;
pub mod split;

pub use css::correct_css;
pub use normalize::correct_html;
pub use split::{DEFAULT_END_MARKER, SplitDocument, split_chapter_ending, split_parts};
