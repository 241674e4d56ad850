//! EPUB package construction.
//!
//! Takes the assembled content parts, separate files, chapter index, and
//! metadata, and produces the complete EPUB file set plus the final zip:
//! - [`xhtml`] — the fixed XHTML shell every content document is wrapped in
//! - [`package`] — container descriptor, OPF package document, navigation
//!   document, and the output file set
//! - [`archive`] — zip serialization with the stored-mimetype-first rule

pub mod archive;
pub mod package;
pub mod xhtml;

pub use archive::write_archive;
pub use package::{BuiltPackage, FileData, PackageFile, PackageInputs, build_package};
