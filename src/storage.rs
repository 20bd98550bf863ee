//! Filesystem persistence for uploaded slides and exported reports.
//!
//! Every upload event keeps its own file; the record's `image_path` points at
//! the newest one, so a re-upload never clobbers the slide an earlier verdict
//! was read from. Report exports overwrite: `report_<id>.pdf` is regenerated
//! on demand.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unrecognized image format")]
    UnknownImageFormat,
}

/// Write uploaded slide bytes into the uploads directory.
///
/// The extension is sniffed from the bytes, not taken from the client.
/// Returns the path of the stored file, named `<record_id>_<upload_id>.<ext>`.
pub fn save_slide_image(
    uploads_dir: &Path,
    record_id: &Uuid,
    bytes: &[u8],
) -> Result<PathBuf, StorageError> {
    let format = image::guess_format(bytes).map_err(|_| StorageError::UnknownImageFormat)?;
    let extension = format.extensions_str().first().copied().unwrap_or("bin");

    std::fs::create_dir_all(uploads_dir)?;

    let upload_id = Uuid::new_v4();
    let path = uploads_dir.join(format!("{record_id}_{upload_id}.{extension}"));
    std::fs::write(&path, bytes)?;

    debug!(
        record_id = %record_id,
        size = bytes.len(),
        path = %path.display(),
        "Slide image saved"
    );

    Ok(path)
}

/// Write report bytes to `report_<record_id>.pdf` in the reports directory,
/// replacing any previous export for the same record.
pub fn export_report_pdf(
    reports_dir: &Path,
    record_id: &Uuid,
    pdf_bytes: &[u8],
) -> Result<PathBuf, StorageError> {
    std::fs::create_dir_all(reports_dir)?;

    let path = reports_dir.join(format!("report_{record_id}.pdf"));
    std::fs::write(&path, pdf_bytes)?;

    debug!(
        record_id = %record_id,
        size = pdf_bytes.len(),
        "Report exported"
    );

    Ok(path)
}
