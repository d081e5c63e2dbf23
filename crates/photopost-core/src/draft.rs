//! Draft snapshots and the draft-persistence contract.
//!
//! A draft records the edit parameters of an unfinished post. Image handles
//! are ephemeral and never part of a draft.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::decode::NaturalSize;
use crate::filter::FilterKind;
use crate::photo::{AspectPreset, CropOffset, PhotoState};
use crate::transform::CropRegion;
use crate::wizard::{Step, Wizard};

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("draft {0} not found")]
    NotFound(String),

    #[error("failed to serialize draft: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Edit parameters of one photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPhoto {
    pub original_size: NaturalSize,
    pub cropped_size: Option<NaturalSize>,
    pub crop_offset: CropOffset,
    pub zoom: f64,
    pub rotation: f64,
    pub crop_region: Option<CropRegion>,
    pub aspect_preset: AspectPreset,
    pub filter: Option<FilterKind>,
}

impl From<&PhotoState> for DraftPhoto {
    fn from(photo: &PhotoState) -> Self {
        Self {
            original_size: photo.original_size(),
            cropped_size: photo.cropped_size(),
            crop_offset: photo.crop_offset(),
            zoom: photo.zoom(),
            rotation: photo.rotation(),
            crop_region: photo.crop_region(),
            aspect_preset: photo.aspect_preset(),
            filter: photo.filter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub id: String,
    pub step: Step,
    pub photos: Vec<DraftPhoto>,
    pub description: String,
    pub tags: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl DraftSnapshot {
    /// Snapshot the wizard's current post.
    pub fn capture(wizard: &Wizard, id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            step: wizard.step(),
            photos: wizard.photos().iter().map(DraftPhoto::from).collect(),
            description: wizard.description().to_string(),
            tags: wizard.tags().to_vec(),
            timestamp,
        }
    }

    pub fn to_json(&self) -> Result<String, DraftError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DraftError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Persistence collaborator for drafts.
pub trait DraftStore {
    /// Store a snapshot, replacing any draft with the same id.
    fn save(&mut self, draft: DraftSnapshot) -> Result<(), DraftError>;

    fn load(&self, id: &str) -> Result<DraftSnapshot, DraftError>;

    /// All drafts, oldest first.
    fn list(&self) -> Vec<DraftSnapshot>;

    fn remove(&mut self, id: &str) -> Result<DraftSnapshot, DraftError>;
}

/// In-memory draft store keeping at most `capacity` drafts.
#[derive(Debug, Clone)]
pub struct MemoryDraftStore {
    capacity: usize,
    drafts: VecDeque<DraftSnapshot>,
}

impl MemoryDraftStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            drafts: VecDeque::new(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.max_drafts)
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

impl DraftStore for MemoryDraftStore {
    fn save(&mut self, draft: DraftSnapshot) -> Result<(), DraftError> {
        self.drafts.retain(|existing| existing.id != draft.id);
        self.drafts.push_back(draft);

        while self.drafts.len() > self.capacity {
            if let Some(evicted) = self.drafts.pop_front() {
                tracing::debug!(id = %evicted.id, "evicted oldest draft");
            }
        }
        Ok(())
    }

    fn load(&self, id: &str) -> Result<DraftSnapshot, DraftError> {
        self.drafts
            .iter()
            .find(|draft| draft.id == id)
            .cloned()
            .ok_or_else(|| DraftError::NotFound(id.to_string()))
    }

    fn list(&self) -> Vec<DraftSnapshot> {
        self.drafts.iter().cloned().collect()
    }

    fn remove(&mut self, id: &str) -> Result<DraftSnapshot, DraftError> {
        let index = self
            .drafts
            .iter()
            .position(|draft| draft.id == id)
            .ok_or_else(|| DraftError::NotFound(id.to_string()))?;
        self.drafts
            .remove(index)
            .ok_or_else(|| DraftError::NotFound(id.to_string()))
    }
}
