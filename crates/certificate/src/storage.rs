//! Flat-file storage for templates and generated documents

use crate::{CertificateError, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name prefix of generated documents
const OUTPUT_PREFIX: &str = "certificates_";

/// Upload and output directories
#[derive(Debug, Clone)]
pub struct Storage {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl Storage {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create both directories if missing
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.upload_dir)?;
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Store a normalized template under a fresh random name
    ///
    /// Returns the generated name (32 hex characters, no extension).
    pub fn save_template(&self, data: &[u8]) -> Result<String> {
        let filename = uuid::Uuid::new_v4().simple().to_string();
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.upload_dir.join(&filename))?;
        file.write_all(data)?;
        Ok(filename)
    }

    /// Read a stored template by name
    pub fn load_template(&self, filename: &str) -> Result<Vec<u8>> {
        validate_filename(filename)?;
        match fs::read(self.upload_dir.join(filename)) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(CertificateError::TemplateNotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist a generated document as `certificates_<unix-ms>.pdf`
    ///
    /// The bytes go to a temporary file in the output directory first and
    /// are then moved into place without overwriting an existing file. If
    /// the name is taken, `-1`, `-2`, ... is appended to the stem.
    pub fn write_output(&self, data: &[u8]) -> Result<PathBuf> {
        let mut tmp = NamedTempFile::new_in(&self.output_dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;

        let stem = format!("{OUTPUT_PREFIX}{}", chrono::Utc::now().timestamp_millis());
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                format!("{stem}.pdf")
            } else {
                format!("{stem}-{attempt}.pdf")
            };
            let path = self.output_dir.join(name);

            match tmp.persist_noclobber(&path) {
                Ok(_) => return Ok(path),
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                    tmp = e.file;
                    attempt += 1;
                }
                Err(e) => return Err(e.error.into()),
            }
        }
    }

    /// Path of a generated document, if the name is safe and the file exists
    ///
    /// Only names of the form produced by `write_output` are served, so
    /// temporary files still being written are never exposed.
    pub fn output_path(&self, filename: &str) -> Option<PathBuf> {
        validate_filename(filename).ok()?;
        if !(filename.starts_with(OUTPUT_PREFIX) && filename.ends_with(".pdf")) {
            return None;
        }
        let path = self.output_dir.join(filename);
        path.is_file().then_some(path)
    }
}

/// Reject names that could escape the storage directory
fn validate_filename(filename: &str) -> Result<()> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(CertificateError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}
