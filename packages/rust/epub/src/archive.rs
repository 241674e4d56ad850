//! Zip serialization of the package file set.
//!
//! EPUB requires the `mimetype` entry to be the first entry in the archive
//! and stored without compression; everything else is deflated.

use std::io::{Cursor, Write};

use tracing::debug;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use serialbind_shared::{Result, SerialbindError};

use crate::package::{FileData, PackageFile};

/// Serialize the file set into an in-memory EPUB zip.
pub fn write_archive(files: &[PackageFile]) -> Result<Vec<u8>> {
    if files.first().map(|f| f.path.as_str()) != Some("mimetype") {
        return Err(SerialbindError::Archive(
            "mimetype must be the first archive entry".into(),
        ));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        let options = if file.path == "mimetype" {
            stored
        } else {
            deflated
        };
        zip.start_file(file.path.as_str(), options)
            .map_err(|e| SerialbindError::Archive(format!("{}: {e}", file.path)))?;

        let written = match &file.data {
            FileData::Text(text) => zip.write_all(text.as_bytes()),
            FileData::Binary(bytes) => zip.write_all(bytes),
        };
        written.map_err(|e| SerialbindError::Archive(format!("{}: {e}", file.path)))?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| SerialbindError::Archive(e.to_string()))?;

    let bytes = cursor.into_inner();
    debug!(entries = files.len(), size = bytes.len(), "archive written");
    Ok(bytes)
}
