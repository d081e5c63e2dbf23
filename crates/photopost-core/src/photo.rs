//! Per-photo state and its stage machine.
//!
//! A photo moves through `Raw -> Cropped -> Filtered`. Each stage owns the
//! handles it produced; a stage's artifact is never mutated, only replaced,
//! and every replacement hands the superseded handles back to the caller to
//! revoke.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::NaturalSize;
use crate::filter::FilterKind;
use crate::store::ImageHandle;
use crate::transform::CropRegion;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 3.0;

/// Stable identity of a photo within one wizard run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhotoId(u64);

impl PhotoId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "photo-{}", self.0)
    }
}

/// Interactive pan offset of the crop surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropOffset {
    pub x: f64,
    pub y: f64,
}

impl CropOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Aspect-ratio presets offered by the crop surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectPreset {
    /// The photo's own aspect ratio.
    #[default]
    #[serde(rename = "Original")]
    Original,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Portrait,
    #[serde(rename = "16:9")]
    Wide,
}

impl AspectPreset {
    pub const ALL: [AspectPreset; 4] = [
        AspectPreset::Original,
        AspectPreset::Square,
        AspectPreset::Portrait,
        AspectPreset::Wide,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AspectPreset::Original => "Original",
            AspectPreset::Square => "1:1",
            AspectPreset::Portrait => "4:5",
            AspectPreset::Wide => "16:9",
        }
    }

    /// Width / height ratio the crop surface should enforce.
    pub fn ratio(self, natural_aspect: f64) -> f64 {
        match self {
            AspectPreset::Original => natural_aspect,
            AspectPreset::Square => 1.0,
            AspectPreset::Portrait => 4.0 / 5.0,
            AspectPreset::Wide => 16.0 / 9.0,
        }
    }
}

impl FromStr for AspectPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectPreset::ALL
            .into_iter()
            .find(|preset| preset.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown aspect preset: {s}"))
    }
}

/// Processing stage of a photo, with the handles each stage produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum PhotoStage {
    /// As ingested; the working image is the original.
    Raw,
    /// Rotation and crop baked into `baseline`.
    Cropped { baseline: ImageHandle },
    /// A filter rendered from `baseline` into `filtered`.
    Filtered {
        baseline: ImageHandle,
        filtered: ImageHandle,
        kind: FilterKind,
    },
}

impl PhotoStage {
    pub fn name(&self) -> &'static str {
        match self {
            PhotoStage::Raw => "raw",
            PhotoStage::Cropped { .. } => "cropped",
            PhotoStage::Filtered { .. } => "filtered",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {action} a photo in the {stage} stage")]
pub struct StageError {
    pub action: &'static str,
    pub stage: &'static str,
}

/// One ingested photo.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoState {
    id: PhotoId,
    original: ImageHandle,
    stage: PhotoStage,
    crop_offset: CropOffset,
    zoom: f64,
    rotation: f64,
    crop_region: Option<CropRegion>,
    natural_aspect: f64,
    aspect_preset: AspectPreset,
    original_size: NaturalSize,
    cropped_size: Option<NaturalSize>,
    generation: u64,
}

impl PhotoState {
    /// Fresh photo. A failed probe (`size == None`) records
    /// `fallback x fallback` and an aspect of 1.
    pub(crate) fn new(
        id: PhotoId,
        original: ImageHandle,
        size: Option<NaturalSize>,
        fallback: u32,
    ) -> Self {
        let (original_size, natural_aspect) = match size {
            Some(size) => (size, size.aspect()),
            None => (NaturalSize::new(fallback, fallback), 1.0),
        };
        Self {
            id,
            original,
            stage: PhotoStage::Raw,
            crop_offset: CropOffset::default(),
            zoom: MIN_ZOOM,
            rotation: 0.0,
            crop_region: None,
            natural_aspect,
            aspect_preset: AspectPreset::Original,
            original_size,
            cropped_size: None,
            generation: 0,
        }
    }

    pub fn id(&self) -> PhotoId {
        self.id
    }

    /// The image as first ingested. Never replaced.
    pub fn original(&self) -> ImageHandle {
        self.original
    }

    /// The image as currently displayed/edited.
    pub fn working_handle(&self) -> ImageHandle {
        match self.stage {
            PhotoStage::Raw => self.original,
            PhotoStage::Cropped { baseline } => baseline,
            PhotoStage::Filtered { filtered, .. } => filtered,
        }
    }

    /// Post-crop baseline every filter is rendered from.
    pub fn baseline(&self) -> Option<ImageHandle> {
        match self.stage {
            PhotoStage::Raw => None,
            PhotoStage::Cropped { baseline } | PhotoStage::Filtered { baseline, .. } => {
                Some(baseline)
            }
        }
    }

    pub fn stage(&self) -> PhotoStage {
        self.stage
    }

    pub fn filter(&self) -> Option<FilterKind> {
        match self.stage {
            PhotoStage::Filtered { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn crop_offset(&self) -> CropOffset {
        self.crop_offset
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn crop_region(&self) -> Option<CropRegion> {
        self.crop_region
    }

    pub fn natural_aspect(&self) -> f64 {
        self.natural_aspect
    }

    pub fn aspect_preset(&self) -> AspectPreset {
        self.aspect_preset
    }

    pub fn original_size(&self) -> NaturalSize {
        self.original_size
    }

    pub fn cropped_size(&self) -> Option<NaturalSize> {
        self.cropped_size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Invalidate every outstanding ticket for this photo.
    pub(crate) fn touch(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub(crate) fn set_crop_offset(&mut self, offset: CropOffset) {
        self.crop_offset = offset;
        self.touch();
    }

    pub(crate) fn set_zoom(&mut self, zoom: f64) {
        self.zoom = if zoom.is_finite() {
            zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            MIN_ZOOM
        };
        self.touch();
    }

    pub(crate) fn set_rotation(&mut self, degrees: f64) {
        if degrees.is_finite() {
            self.rotation = degrees;
            self.touch();
        }
    }

    pub(crate) fn set_crop_region(&mut self, region: CropRegion) {
        self.crop_region = Some(region);
        self.touch();
    }

    pub(crate) fn set_aspect_preset(&mut self, preset: AspectPreset) {
        self.aspect_preset = preset;
        self.touch();
    }

    /// Install a freshly baked baseline. Returns the handles to revoke.
    pub(crate) fn commit_bake(
        &mut self,
        baked: ImageHandle,
        region: CropRegion,
        size: NaturalSize,
    ) -> Result<Vec<ImageHandle>, StageError> {
        let superseded = match self.stage {
            PhotoStage::Raw => Vec::new(),
            PhotoStage::Cropped { baseline } => vec![baseline],
            PhotoStage::Filtered { .. } => {
                return Err(StageError {
                    action: "bake",
                    stage: self.stage.name(),
                })
            }
        };

        self.stage = PhotoStage::Cropped { baseline: baked };
        self.rotation = 0.0;
        self.crop_region = Some(region);
        self.cropped_size = Some(size);
        self.touch();
        Ok(superseded)
    }

    /// Install a filter rendered from the current baseline.
    pub(crate) fn commit_filter(
        &mut self,
        kind: FilterKind,
        filtered: ImageHandle,
    ) -> Result<Vec<ImageHandle>, StageError> {
        let (baseline, mut superseded) = match self.stage {
            PhotoStage::Raw => {
                return Err(StageError {
                    action: "filter",
                    stage: self.stage.name(),
                })
            }
            PhotoStage::Cropped { baseline } => (baseline, Vec::new()),
            PhotoStage::Filtered {
                baseline,
                filtered: previous,
                ..
            } => (baseline, vec![previous]),
        };

        if kind.is_identity() {
            // The baseline is the result; the rendered copy is not kept
            superseded.push(filtered);
            self.stage = PhotoStage::Cropped { baseline };
        } else {
            self.stage = PhotoStage::Filtered {
                baseline,
                filtered,
                kind,
            };
        }
        self.touch();
        Ok(superseded)
    }

    /// Drop the applied filter, returning to the baseline.
    pub(crate) fn reset_filter(&mut self) -> Vec<ImageHandle> {
        match self.stage {
            PhotoStage::Filtered {
                baseline, filtered, ..
            } => {
                self.stage = PhotoStage::Cropped { baseline };
                self.touch();
                vec![filtered]
            }
            PhotoStage::Raw | PhotoStage::Cropped { .. } => Vec::new(),
        }
    }

    /// Every handle this photo owns, for revocation when it is discarded.
    pub(crate) fn owned_handles(&self) -> Vec<ImageHandle> {
        let mut handles = vec![self.original];
        match self.stage {
            PhotoStage::Raw => {}
            PhotoStage::Cropped { baseline } => handles.push(baseline),
            PhotoStage::Filtered {
                baseline, filtered, ..
            } => {
                handles.push(baseline);
                handles.push(filtered);
            }
        }
        handles
    }
}
