//! Pipeline configuration.
//!
//! Every field has a default, so a partial JSON object (or `{}`) is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::DEFAULT_JPEG_QUALITY;
use crate::package::PackagingPolicy;

/// 20 MiB upload limit per file.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 20 * 1024 * 1024;
/// Width and height recorded when a dimension probe fails.
pub const DEFAULT_FALLBACK_DIMENSION: u32 = 100;
/// Drafts retained before the oldest is evicted.
pub const DEFAULT_MAX_DRAFTS: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Largest accepted file, in bytes.
    pub max_file_bytes: u64,
    /// Accepted MIME types (compared case-insensitively).
    pub accepted_mime_types: Vec<String>,
    /// JPEG quality for baked and filtered rasters (1-100).
    pub jpeg_quality: u8,
    pub fallback_dimension: u32,
    pub max_drafts: usize,
    pub packaging_policy: PackagingPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            accepted_mime_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            fallback_dimension: DEFAULT_FALLBACK_DIMENSION,
            max_drafts: DEFAULT_MAX_DRAFTS,
            packaging_policy: PackagingPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_file_bytes == 0 {
            return Err(ConfigError::Invalid("max_file_bytes must be non-zero".into()));
        }
        if self.accepted_mime_types.is_empty() {
            return Err(ConfigError::Invalid(
                "accepted_mime_types must not be empty".into(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be within 1-100, got {}",
                self.jpeg_quality
            )));
        }
        if self.fallback_dimension == 0 {
            return Err(ConfigError::Invalid(
                "fallback_dimension must be non-zero".into(),
            ));
        }
        if self.max_drafts == 0 {
            return Err(ConfigError::Invalid("max_drafts must be non-zero".into()));
        }
        Ok(())
    }

    pub fn accepts_mime_type(&self, mime_type: &str) -> bool {
        self.accepted_mime_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(mime_type.trim()))
    }
}
