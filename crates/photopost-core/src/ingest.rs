//! Ingestion: validate a file selection and probe each file's dimensions.
//!
//! Validation is all-or-nothing. A single unsupported or oversized file
//! rejects the whole batch so the user can fix the selection and retry it.
//! Probing never fails a batch: an unreadable file is admitted with
//! fallback dimensions and is only reported once an engine tries to decode
//! it.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::config::PipelineConfig;
use crate::decode::{probe_size, NaturalSize};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("{name}: unsupported file type '{mime_type}', only JPEG and PNG images are accepted")]
    UnsupportedType { name: String, mime_type: String },

    #[error("{name}: file is {size} bytes, the limit is {limit} bytes")]
    TooLarge { name: String, size: u64, limit: u64 },
}

/// A raw file as handed over by a file-selection surface.
#[derive(Clone)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub data: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.size())
            .finish()
    }
}

/// A validated file together with its probed natural size.
#[derive(Debug, Clone)]
pub struct ProbedFile {
    pub file: SelectedFile,
    /// `None` when the probe failed.
    pub size: Option<NaturalSize>,
}

pub fn validate_file(file: &SelectedFile, config: &PipelineConfig) -> Result<(), IngestError> {
    if !config.accepts_mime_type(&file.mime_type) {
        return Err(IngestError::UnsupportedType {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
        });
    }
    if file.size() > config.max_file_bytes {
        return Err(IngestError::TooLarge {
            name: file.name.clone(),
            size: file.size(),
            limit: config.max_file_bytes,
        });
    }
    Ok(())
}

/// Check every file, returning the first violation.
pub fn validate_batch(files: &[SelectedFile], config: &PipelineConfig) -> Result<(), IngestError> {
    files.iter().try_for_each(|file| validate_file(file, config))
}

/// Probe a file's natural size. Failure is logged and yields `size: None`.
pub fn probe_file(file: SelectedFile) -> ProbedFile {
    let size = match probe_size(&file.data) {
        Ok(size) => Some(size),
        Err(err) => {
            tracing::warn!(name = %file.name, error = %err, "dimension probe failed, using fallback size");
            None
        }
    };
    ProbedFile { file, size }
}
