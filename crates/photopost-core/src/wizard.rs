//! Wizard controller: the upload -> crop -> filters -> description flow.
//!
//! The wizard owns every photo and every handle they reference. Engine work
//! is split into a `begin_*` call that captures a ticket and a `commit_*` call
//! that applies the result. Between the two the caller is free to run the
//! ticket anywhere (a blocking thread, a worker, inline). A ticket only
//! commits if its photo still exists and has not been mutated since the
//! ticket was issued; otherwise the result is discarded.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::decode::NaturalSize;
use crate::filter::{render_filter, FilterError, FilterKind};
use crate::ingest::{probe_file, validate_batch, IngestError, ProbedFile, SelectedFile};
use crate::package::{package_photos, PackageError, PackagedPost};
use crate::photo::{AspectPreset, CropOffset, PhotoId, PhotoState, StageError};
use crate::store::{BlobStore, ImageHandle, StoreError};
use crate::transform::{bake, BakeError, BakeRequest, BakedImage, CropRegion};

/// Mime type of every raster the engines produce.
const BAKED_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Upload,
    Crop,
    Filters,
    Description,
}

impl Step {
    pub fn name(self) -> &'static str {
        match self {
            Step::Upload => "upload",
            Step::Crop => "crop",
            Step::Filters => "filters",
            Step::Description => "description",
        }
    }

    /// The step a successful commit on this step leads to.
    pub fn next(self) -> Step {
        match self {
            Step::Upload => Step::Crop,
            Step::Crop => Step::Filters,
            Step::Filters | Step::Description => Step::Description,
        }
    }

    pub fn previous(self) -> Step {
        match self {
            Step::Upload | Step::Crop => Step::Upload,
            Step::Filters => Step::Crop,
            Step::Description => Step::Filters,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("there are no photos")]
    NoPhotos,

    #[error("no photo at index {index} (have {len})")]
    NoPhotoAt { index: usize, len: usize },

    #[error("cannot {action} during the {step} step")]
    WrongStep { action: &'static str, step: Step },

    #[error(transparent)]
    IllegalStage(#[from] StageError),

    #[error("{0} has no crop region yet")]
    MissingCropRegion(PhotoId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of committing a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// State updated.
    Committed,
    /// The photo was deleted or changed since the ticket was issued.
    Discarded,
    /// The engine failed; state is unchanged.
    Failed,
}

/// A crop bake captured at confirm time.
#[derive(Debug, Clone)]
pub struct BakeTicket {
    pub photo_id: PhotoId,
    pub generation: u64,
    pub step: Step,
    pub source: Arc<[u8]>,
    pub request: BakeRequest,
}

impl BakeTicket {
    /// Run the bake on the calling thread.
    pub fn run(&self) -> Result<BakedImage, BakeError> {
        bake(&self.source, &self.request)
    }
}

/// A filter pass captured at selection time.
#[derive(Debug, Clone)]
pub struct FilterTicket {
    pub photo_id: PhotoId,
    pub generation: u64,
    pub step: Step,
    pub baseline: Arc<[u8]>,
    pub kind: FilterKind,
    pub quality: u8,
}

impl FilterTicket {
    /// Render the filter on the calling thread.
    pub fn run(&self) -> Result<Vec<u8>, FilterError> {
        render_filter(&self.baseline, self.kind, self.quality)
    }
}

#[derive(Debug)]
pub struct Wizard {
    config: PipelineConfig,
    store: BlobStore,
    step: Step,
    photos: Vec<PhotoState>,
    current: usize,
    description: String,
    tags: Vec<String>,
    cancel_prompt_open: bool,
    validation_alert: Option<String>,
    next_photo_id: u64,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Wizard {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_store(config, BlobStore::new())
    }

    pub fn with_store(config: PipelineConfig, store: BlobStore) -> Self {
        Self {
            config,
            store,
            step: Step::Upload,
            photos: Vec::new(),
            current: 0,
            description: String::new(),
            tags: Vec::new(),
            cancel_prompt_open: false,
            validation_alert: None,
            next_photo_id: 0,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &BlobStore {
        &self.store
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn photos(&self) -> &[PhotoState] {
        &self.photos
    }

    pub fn photo(&self, id: PhotoId) -> Option<&PhotoState> {
        self.photos.iter().find(|photo| photo.id() == id)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_photo(&self) -> Option<&PhotoState> {
        self.photos.get(self.current)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn cancel_prompt_open(&self) -> bool {
        self.cancel_prompt_open
    }

    pub fn validation_alert(&self) -> Option<&str> {
        self.validation_alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.validation_alert = None;
    }

    // ---- Ingestion ----

    /// Validate a selection, raising the validation alert on rejection.
    ///
    /// On error nothing is admitted and the caller should clear its file
    /// input so the same selection can be retried.
    pub fn validate_selection(&mut self, files: &[SelectedFile]) -> Result<(), IngestError> {
        match validate_batch(files, &self.config) {
            Ok(()) => {
                self.validation_alert = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(files = files.len(), error = %err, "rejected file selection");
                self.validation_alert = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Admit a probed batch. Returns how many photos were added.
    ///
    /// An empty batch changes nothing; otherwise the wizard moves to the
    /// crop step.
    pub fn accept_batch(&mut self, batch: Vec<ProbedFile>) -> usize {
        if batch.is_empty() {
            return 0;
        }

        let added = batch.len();
        for probed in batch {
            self.next_photo_id += 1;
            let id = PhotoId::new(self.next_photo_id);
            let original = self.store.create(&probed.file.mime_type, probed.file.data);
            self.photos.push(PhotoState::new(
                id,
                original,
                probed.size,
                self.config.fallback_dimension,
            ));
        }
        self.step = Step::Crop;

        tracing::info!(added, total = self.photos.len(), "admitted photos");
        added
    }

    /// Validate, probe and admit a selection on the calling thread.
    pub fn select_files(&mut self, files: Vec<SelectedFile>) -> Result<usize, IngestError> {
        self.validate_selection(&files)?;
        let probed = files.into_iter().map(probe_file).collect();
        Ok(self.accept_batch(probed))
    }

    // ---- Navigation ----

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.photos.len()
    }

    pub fn has_prev(&self) -> bool {
        self.current > 0
    }

    pub fn next_photo(&mut self) -> bool {
        if self.has_next() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_photo(&mut self) -> bool {
        if self.has_prev() {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    pub fn select_photo(&mut self, index: usize) -> Result<(), WizardError> {
        if index >= self.photos.len() {
            return Err(WizardError::NoPhotoAt {
                index,
                len: self.photos.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// Step back. Leaving the filters step drops the current photo's filter.
    pub fn back(&mut self) -> Step {
        if self.step == Step::Filters {
            let superseded = self
                .photos
                .get_mut(self.current)
                .map(PhotoState::reset_filter)
                .unwrap_or_default();
            self.revoke_all(&superseded);
        }
        self.step = self.step.previous();
        self.step
    }

    /// Remove a photo and revoke its handles.
    pub fn delete_photo(&mut self, index: usize) -> Result<PhotoId, WizardError> {
        if index >= self.photos.len() {
            return Err(WizardError::NoPhotoAt {
                index,
                len: self.photos.len(),
            });
        }

        let removed = self.photos.remove(index);
        self.revoke_all(&removed.owned_handles());

        if self.photos.is_empty() {
            self.current = 0;
            self.step = Step::Upload;
        } else {
            if index < self.current {
                self.current -= 1;
            }
            if self.current >= self.photos.len() {
                self.current = self.photos.len() - 1;
            }
        }

        tracing::debug!(photo_id = %removed.id(), index, current = self.current, "deleted photo");
        Ok(removed.id())
    }

    // ---- Cancellation ----

    pub fn request_cancel(&mut self) {
        self.cancel_prompt_open = true;
    }

    pub fn dismiss_cancel(&mut self) {
        self.cancel_prompt_open = false;
    }

    pub fn confirm_cancel(&mut self) {
        self.reset();
    }

    /// Discard everything and revoke every handle.
    pub fn reset(&mut self) {
        let handles: Vec<ImageHandle> = self
            .photos
            .iter()
            .flat_map(PhotoState::owned_handles)
            .collect();
        self.revoke_all(&handles);

        self.photos.clear();
        self.current = 0;
        self.step = Step::Upload;
        self.description.clear();
        self.tags.clear();
        self.cancel_prompt_open = false;
        self.validation_alert = None;

        tracing::info!(revoked = handles.len(), "wizard reset");
    }

    // ---- Crop editing (current photo) ----

    fn current_mut(&mut self) -> Result<&mut PhotoState, WizardError> {
        self.photos.get_mut(self.current).ok_or(WizardError::NoPhotos)
    }

    pub fn set_crop_offset(&mut self, offset: CropOffset) -> Result<(), WizardError> {
        self.current_mut()?.set_crop_offset(offset);
        Ok(())
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), WizardError> {
        self.current_mut()?.set_zoom(zoom);
        Ok(())
    }

    pub fn set_rotation(&mut self, degrees: f64) -> Result<(), WizardError> {
        self.current_mut()?.set_rotation(degrees);
        Ok(())
    }

    /// Quick rotate, typically by +-90 degrees.
    pub fn rotate_by(&mut self, delta: f64) -> Result<(), WizardError> {
        let photo = self.current_mut()?;
        let rotation = photo.rotation() + delta;
        photo.set_rotation(rotation);
        Ok(())
    }

    pub fn set_crop_region(&mut self, region: CropRegion) -> Result<(), WizardError> {
        self.current_mut()?.set_crop_region(region);
        Ok(())
    }

    pub fn set_aspect_preset(&mut self, preset: AspectPreset) -> Result<(), WizardError> {
        self.current_mut()?.set_aspect_preset(preset);
        Ok(())
    }

    // ---- Description ----

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Add a tag. Returns false if it was empty or already present.
    pub fn add_tag(&mut self, raw: &str) -> bool {
        let tag = raw.trim().trim_start_matches('#').trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    // ---- Engine tickets ----

    fn require_step(&self, action: &'static str, step: Step) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                action,
                step: self.step,
            })
        }
    }

    /// Capture the current photo's crop for baking.
    pub fn begin_bake(&mut self) -> Result<BakeTicket, WizardError> {
        self.require_step("confirm a crop", Step::Crop)?;
        let quality = self.config.jpeg_quality;
        let step = self.step;
        let store = self.store.clone();
        let photo = self.current_mut()?;

        let region = photo
            .crop_region()
            .ok_or(WizardError::MissingCropRegion(photo.id()))?;
        if photo.filter().is_some() {
            return Err(StageError {
                action: "bake",
                stage: photo.stage().name(),
            }
            .into());
        }
        let source = store.fetch(photo.working_handle())?;
        let generation = photo.touch();

        tracing::debug!(photo_id = %photo.id(), generation, "issued bake ticket");
        Ok(BakeTicket {
            photo_id: photo.id(),
            generation,
            step,
            source,
            request: BakeRequest::new(photo.rotation(), region).with_quality(quality),
        })
    }

    /// Apply a finished bake.
    pub fn commit_bake(
        &mut self,
        ticket: &BakeTicket,
        result: Result<BakedImage, BakeError>,
    ) -> CommitOutcome {
        let Some(index) = self.live_index(ticket.photo_id, ticket.generation) else {
            tracing::debug!(photo_id = %ticket.photo_id, generation = ticket.generation, "discarded stale bake");
            return CommitOutcome::Discarded;
        };
        let baked = match result {
            Ok(baked) => baked,
            Err(err) => {
                tracing::warn!(photo_id = %ticket.photo_id, error = %err, "crop bake failed");
                return CommitOutcome::Failed;
            }
        };

        let handle = self.store.create(BAKED_MIME_TYPE, baked.bytes);
        let size = NaturalSize::new(baked.width, baked.height);
        match self.photos[index].commit_bake(handle, ticket.request.region, size) {
            Ok(superseded) => self.revoke_all(&superseded),
            Err(err) => {
                tracing::warn!(photo_id = %ticket.photo_id, error = %err, "bake result rejected");
                self.store.revoke(handle);
                return CommitOutcome::Failed;
            }
        }

        self.advance_from(ticket.step, ticket.photo_id);
        tracing::info!(photo_id = %ticket.photo_id, width = size.width, height = size.height, "committed crop");
        CommitOutcome::Committed
    }

    /// Capture the current photo's baseline for a filter pass.
    pub fn begin_filter(&mut self, kind: FilterKind) -> Result<FilterTicket, WizardError> {
        self.require_step("apply a filter", Step::Filters)?;
        let quality = self.config.jpeg_quality;
        let step = self.step;
        let store = self.store.clone();
        let photo = self.current_mut()?;

        let baseline = photo.baseline().ok_or(StageError {
            action: "filter",
            stage: photo.stage().name(),
        })?;
        let baseline = store.fetch(baseline)?;
        let generation = photo.touch();

        tracing::debug!(photo_id = %photo.id(), generation, filter = kind.name(), "issued filter ticket");
        Ok(FilterTicket {
            photo_id: photo.id(),
            generation,
            step,
            baseline,
            kind,
            quality,
        })
    }

    /// Apply a finished filter pass.
    pub fn commit_filter(
        &mut self,
        ticket: &FilterTicket,
        result: Result<Vec<u8>, FilterError>,
    ) -> CommitOutcome {
        let Some(index) = self.live_index(ticket.photo_id, ticket.generation) else {
            tracing::debug!(photo_id = %ticket.photo_id, generation = ticket.generation, "discarded stale filter");
            return CommitOutcome::Discarded;
        };
        let bytes = match result {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(photo_id = %ticket.photo_id, filter = ticket.kind.name(), error = %err, "filter failed");
                return CommitOutcome::Failed;
            }
        };

        let handle = self.store.create(BAKED_MIME_TYPE, bytes);
        match self.photos[index].commit_filter(ticket.kind, handle) {
            Ok(superseded) => self.revoke_all(&superseded),
            Err(err) => {
                tracing::warn!(photo_id = %ticket.photo_id, error = %err, "filter result rejected");
                self.store.revoke(handle);
                return CommitOutcome::Failed;
            }
        }

        self.advance_from(ticket.step, ticket.photo_id);
        tracing::info!(photo_id = %ticket.photo_id, filter = ticket.kind.name(), "committed filter");
        CommitOutcome::Committed
    }

    /// Select `Original`: drop any filter and continue without a pixel pass.
    pub fn apply_original_filter(&mut self) -> Result<CommitOutcome, WizardError> {
        self.require_step("apply a filter", Step::Filters)?;
        let photo = self.current_mut()?;
        if photo.baseline().is_none() {
            return Err(StageError {
                action: "filter",
                stage: photo.stage().name(),
            }
            .into());
        }
        let id = photo.id();
        let superseded = photo.reset_filter();
        self.revoke_all(&superseded);
        self.advance_from(Step::Filters, id);
        Ok(CommitOutcome::Committed)
    }

    fn live_index(&self, id: PhotoId, generation: u64) -> Option<usize> {
        self.photos
            .iter()
            .position(|photo| photo.id() == id && photo.generation() == generation)
    }

    /// Advance only if the user is still where the work was started.
    fn advance_from(&mut self, step: Step, id: PhotoId) {
        let still_there = self.step == step && self.current_photo().map(PhotoState::id) == Some(id);
        if still_there {
            self.step = step.next();
        }
    }

    fn revoke_all(&self, handles: &[ImageHandle]) {
        for handle in handles {
            self.store.revoke(*handle);
        }
    }

    // ---- Submission ----

    /// Package every photo for hand-off under the configured policy.
    pub fn package(&self, timestamp_ms: i64) -> Result<PackagedPost, PackageError> {
        package_photos(
            &self.store,
            &self.photos,
            timestamp_ms,
            self.config.packaging_policy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::PhotoStage;
    use crate::test_support::{init_tracing, png_file, undecodable_file};

    fn wizard_with(count: usize) -> Wizard {
        init_tracing();
        let mut wizard = Wizard::default();
        let files = (0..count)
            .map(|i| png_file(&format!("p{i}.png"), 20 + i as u32, 10))
            .collect();
        wizard.select_files(files).unwrap();
        wizard
    }

    fn confirm_crop(wizard: &mut Wizard, region: CropRegion) -> CommitOutcome {
        wizard.set_crop_region(region).unwrap();
        let ticket = wizard.begin_bake().unwrap();
        let result = ticket.run();
        wizard.commit_bake(&ticket, result)
    }

    fn choose_filter(wizard: &mut Wizard, kind: FilterKind) -> CommitOutcome {
        let ticket = wizard.begin_filter(kind).unwrap();
        let result = ticket.run();
        wizard.commit_filter(&ticket, result)
    }

    #[test]
    fn test_select_files_enters_crop() {
        let wizard = wizard_with(2);

        assert_eq!(wizard.step(), Step::Crop);
        assert_eq!(wizard.photos().len(), 2);
        assert_eq!(wizard.current_index(), 0);
        assert_eq!(wizard.photos()[0].original_size(), NaturalSize::new(20, 10));
        assert!((wizard.photos()[0].natural_aspect() - 2.0).abs() < 1e-12);
        assert_eq!(wizard.store().live_count(), 2);
    }

    #[test]
    fn test_rejected_selection_admits_nothing() {
        let mut wizard = Wizard::default();
        let files = vec![
            png_file("ok.png", 4, 4),
            SelectedFile::new("doc.pdf", "application/pdf", vec![0u8; 4]),
        ];

        assert!(wizard.select_files(files).is_err());
        assert!(wizard.photos().is_empty());
        assert_eq!(wizard.step(), Step::Upload);
        assert!(wizard.validation_alert().is_some());
        assert_eq!(wizard.store().live_count(), 0);

        wizard.dismiss_alert();
        assert_eq!(wizard.validation_alert(), None);
    }

    #[test]
    fn test_one_oversized_file_rejects_ten() {
        let mut wizard = Wizard::default();
        let mut files: Vec<_> = (0..9).map(|i| png_file(&format!("{i}.png"), 2, 2)).collect();
        files.push(SelectedFile::new(
            "huge.jpg",
            "image/jpeg",
            vec![0u8; 20 * 1024 * 1024 + 1],
        ));

        assert!(matches!(
            wizard.select_files(files),
            Err(IngestError::TooLarge { .. })
        ));
        assert!(wizard.photos().is_empty());
        assert!(wizard.validation_alert().is_some());
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let mut wizard = Wizard::default();
        assert_eq!(wizard.select_files(Vec::new()).unwrap(), 0);
        assert_eq!(wizard.step(), Step::Upload);
    }

    #[test]
    fn test_unprobeable_file_gets_fallback() {
        let mut wizard = Wizard::default();
        wizard.select_files(vec![undecodable_file("x.jpg")]).unwrap();

        let photo = &wizard.photos()[0];
        assert_eq!(photo.original_size(), NaturalSize::new(100, 100));
        assert_eq!(photo.natural_aspect(), 1.0);
    }

    #[test]
    fn test_navigation() {
        let mut wizard = wizard_with(3);

        assert!(!wizard.has_prev());
        assert!(wizard.has_next());
        assert!(wizard.next_photo());
        assert!(wizard.next_photo());
        assert!(!wizard.next_photo());
        assert_eq!(wizard.current_index(), 2);
        assert!(wizard.prev_photo());
        assert_eq!(wizard.current_index(), 1);

        assert!(wizard.select_photo(0).is_ok());
        assert!(matches!(
            wizard.select_photo(3),
            Err(WizardError::NoPhotoAt { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_full_flow() {
        let mut wizard = wizard_with(1);
        let original = wizard.photos()[0].original();

        wizard.set_rotation(90.0).unwrap();
        assert_eq!(confirm_crop(&mut wizard, CropRegion::new(0, 0, 10, 20)), CommitOutcome::Committed);
        assert_eq!(wizard.step(), Step::Filters);

        let photo = &wizard.photos()[0];
        assert_eq!(photo.rotation(), 0.0);
        assert_eq!(photo.cropped_size(), Some(NaturalSize::new(10, 20)));
        assert_eq!(photo.original(), original);
        assert!(wizard.store().is_live(original));

        assert_eq!(choose_filter(&mut wizard, FilterKind::Sepia), CommitOutcome::Committed);
        assert_eq!(wizard.step(), Step::Description);
        assert_eq!(wizard.photos()[0].filter(), Some(FilterKind::Sepia));

        wizard.set_description("Sunset");
        assert!(wizard.add_tag("#beach"));
        let post = wizard.package(1000).unwrap();
        assert_eq!(post.files.len(), 1);
        assert_eq!(post.files[0].file_name, "photo_1000_0.jpg");
        assert_eq!(wizard.tags(), ["beach"]);
    }

    #[test]
    fn test_bake_requires_region() {
        let mut wizard = wizard_with(1);
        assert!(matches!(
            wizard.begin_bake(),
            Err(WizardError::MissingCropRegion(_))
        ));
    }

    #[test]
    fn test_engine_calls_check_step() {
        let mut wizard = wizard_with(1);
        assert!(matches!(
            wizard.begin_filter(FilterKind::Sepia),
            Err(WizardError::WrongStep { step: Step::Crop, .. })
        ));
    }

    #[test]
    fn test_failed_bake_keeps_state() {
        let mut wizard = Wizard::default();
        wizard.select_files(vec![undecodable_file("x.jpg")]).unwrap();
        let before = wizard.photos()[0].working_handle();

        let outcome = confirm_crop(&mut wizard, CropRegion::new(0, 0, 10, 10));

        assert_eq!(outcome, CommitOutcome::Failed);
        assert_eq!(wizard.step(), Step::Crop);
        assert_eq!(wizard.photos()[0].stage(), PhotoStage::Raw);
        assert_eq!(wizard.photos()[0].working_handle(), before);
        assert_eq!(wizard.store().live_count(), 1);
    }

    #[test]
    fn test_empty_crop_fails() {
        let mut wizard = wizard_with(1);
        assert_eq!(confirm_crop(&mut wizard, CropRegion::new(0, 0, 0, 5)), CommitOutcome::Failed);
        assert_eq!(wizard.step(), Step::Crop);
    }

    #[test]
    fn test_oversized_crop_fails_without_touching_state() {
        let mut wizard = wizard_with(1);
        let outcome = confirm_crop(&mut wizard, CropRegion::new(0, 0, 60_000, 60_000));

        assert_eq!(outcome, CommitOutcome::Failed);
        assert_eq!(wizard.step(), Step::Crop);
        assert_eq!(wizard.photos()[0].stage(), PhotoStage::Raw);
        assert_eq!(wizard.store().live_count(), 1);
    }

    #[test]
    fn test_stale_bake_is_discarded() {
        let mut wizard = wizard_with(1);
        wizard.set_crop_region(CropRegion::new(0, 0, 5, 5)).unwrap();
        let ticket = wizard.begin_bake().unwrap();
        let result = ticket.run();

        // User keeps editing while the bake runs
        wizard.set_rotation(15.0).unwrap();

        assert_eq!(wizard.commit_bake(&ticket, result), CommitOutcome::Discarded);
        assert_eq!(wizard.step(), Step::Crop);
        assert_eq!(wizard.photos()[0].stage(), PhotoStage::Raw);
        assert_eq!(wizard.store().live_count(), 1);
    }

    #[test]
    fn test_bake_for_deleted_photo_is_discarded() {
        let mut wizard = wizard_with(2);
        wizard.set_crop_region(CropRegion::new(0, 0, 5, 5)).unwrap();
        let ticket = wizard.begin_bake().unwrap();
        wizard.delete_photo(0).unwrap();

        let result = ticket.run();
        assert_eq!(wizard.commit_bake(&ticket, result), CommitOutcome::Discarded);
        assert_eq!(wizard.photos()[0].stage(), PhotoStage::Raw);
        assert_eq!(wizard.store().live_count(), 1);
    }

    #[test]
    fn test_bake_commits_without_advancing_after_navigation() {
        let mut wizard = wizard_with(2);
        wizard.set_crop_region(CropRegion::new(0, 0, 5, 5)).unwrap();
        let ticket = wizard.begin_bake().unwrap();
        wizard.next_photo();

        let result = ticket.run();
        assert_eq!(wizard.commit_bake(&ticket, result), CommitOutcome::Committed);
        assert_eq!(wizard.step(), Step::Crop);
        assert!(wizard.photos()[0].baseline().is_some());
    }

    #[test]
    fn test_rebake_revokes_previous_baseline() {
        let mut wizard = wizard_with(1);
        confirm_crop(&mut wizard, CropRegion::new(0, 0, 8, 8));
        let first = wizard.photos()[0].working_handle();

        wizard.back();
        assert_eq!(wizard.step(), Step::Crop);
        confirm_crop(&mut wizard, CropRegion::new(0, 0, 4, 4));

        assert!(!wizard.store().is_live(first));
        assert_eq!(wizard.photos()[0].cropped_size(), Some(NaturalSize::new(4, 4)));
        assert_eq!(wizard.store().live_count(), 2);
    }

    #[test]
    fn test_switching_filters_renders_from_baseline() {
        let mut wizard = wizard_with(1);
        confirm_crop(&mut wizard, CropRegion::new(0, 0, 8, 8));

        choose_filter(&mut wizard, FilterKind::Sepia);
        let direct = wizard.store().fetch(wizard.photos()[0].working_handle()).unwrap();

        wizard.back();
        assert_eq!(wizard.step(), Step::Filters);
        choose_filter(&mut wizard, FilterKind::Grayscale);
        wizard.back();
        choose_filter(&mut wizard, FilterKind::Sepia);
        let again = wizard.store().fetch(wizard.photos()[0].working_handle()).unwrap();

        assert_eq!(direct, again);
        // original, baseline and one filtered raster
        assert_eq!(wizard.store().live_count(), 3);
    }

    #[test]
    fn test_filter_original_filter_matches_direct() {
        let mut wizard = wizard_with(1);
        confirm_crop(&mut wizard, CropRegion::new(0, 0, 8, 8));

        choose_filter(&mut wizard, FilterKind::Saturation);
        let direct = wizard.store().fetch(wizard.photos()[0].working_handle()).unwrap();

        wizard.back();
        wizard.apply_original_filter().unwrap();
        wizard.back();
        choose_filter(&mut wizard, FilterKind::Saturation);
        let again = wizard.store().fetch(wizard.photos()[0].working_handle()).unwrap();

        assert_eq!(direct, again);
    }

    #[test]
    fn test_original_filter_skips_engine() {
        let mut wizard = wizard_with(1);
        confirm_crop(&mut wizard, CropRegion::new(0, 0, 8, 8));
        choose_filter(&mut wizard, FilterKind::Contrast);
        wizard.back();

        assert_eq!(wizard.apply_original_filter().unwrap(), CommitOutcome::Committed);
        assert_eq!(wizard.step(), Step::Description);
        assert_eq!(wizard.photos()[0].filter(), None);
        assert_eq!(wizard.store().live_count(), 2);
    }

    #[test]
    fn test_back_from_filters_resets_filter() {
        let mut wizard = wizard_with(1);
        confirm_crop(&mut wizard, CropRegion::new(0, 0, 8, 8));
        choose_filter(&mut wizard, FilterKind::Brightness);
        assert_eq!(wizard.back(), Step::Filters);
        assert_eq!(wizard.photos()[0].filter(), Some(FilterKind::Brightness));

        assert_eq!(wizard.back(), Step::Crop);
        assert_eq!(wizard.photos()[0].filter(), None);
        assert_eq!(wizard.back(), Step::Upload);
        assert_eq!(wizard.back(), Step::Upload);
    }

    #[test]
    fn test_filter_on_raw_photo_is_illegal() {
        let mut wizard = wizard_with(2);
        confirm_crop(&mut wizard, CropRegion::new(0, 0, 8, 8));
        wizard.next_photo();

        assert!(matches!(
            wizard.begin_filter(FilterKind::Sepia),
            Err(WizardError::IllegalStage(_))
        ));
    }

    #[test]
    fn test_delete_before_current_shifts_index() {
        let mut wizard = wizard_with(3);
        wizard.select_photo(2).unwrap();
        let current_id = wizard.current_photo().unwrap().id();

        wizard.delete_photo(0).unwrap();

        assert_eq!(wizard.current_index(), 1);
        assert_eq!(wizard.current_photo().unwrap().id(), current_id);
    }

    #[test]
    fn test_delete_last_clamps_index() {
        let mut wizard = wizard_with(3);
        wizard.select_photo(2).unwrap();

        wizard.delete_photo(2).unwrap();
        assert_eq!(wizard.current_index(), 1);
        assert_eq!(wizard.store().live_count(), 2);
    }

    #[test]
    fn test_delete_only_photo_returns_to_upload() {
        let mut wizard = wizard_with(1);
        wizard.delete_photo(0).unwrap();

        assert_eq!(wizard.current_index(), 0);
        assert_eq!(wizard.step(), Step::Upload);
        assert_eq!(wizard.store().live_count(), 0);
        assert!(wizard.delete_photo(0).is_err());
    }

    #[test]
    fn test_cancel_flow() {
        let mut wizard = wizard_with(2);
        confirm_crop(&mut wizard, CropRegion::new(0, 0, 8, 8));

        wizard.request_cancel();
        assert!(wizard.cancel_prompt_open());
        wizard.dismiss_cancel();
        assert!(!wizard.cancel_prompt_open());
        assert_eq!(wizard.photos().len(), 2);

        wizard.request_cancel();
        wizard.confirm_cancel();
        assert!(!wizard.cancel_prompt_open());
        assert!(wizard.photos().is_empty());
        assert_eq!(wizard.step(), Step::Upload);
        assert_eq!(wizard.store().live_count(), 0);
    }

    #[test]
    fn test_tags() {
        let mut wizard = Wizard::default();
        assert!(wizard.add_tag("  #travel "));
        assert!(!wizard.add_tag("travel"));
        assert!(!wizard.add_tag("#"));
        assert!(!wizard.add_tag("   "));
        assert!(wizard.add_tag("food"));
        assert_eq!(wizard.tags(), ["travel", "food"]);

        assert!(wizard.remove_tag("travel"));
        assert!(!wizard.remove_tag("travel"));
        assert_eq!(wizard.tags(), ["food"]);
    }

    #[test]
    fn test_editing_without_photos() {
        let mut wizard = Wizard::default();
        assert!(matches!(wizard.set_zoom(2.0), Err(WizardError::NoPhotos)));
        assert!(matches!(wizard.rotate_by(90.0), Err(WizardError::NoPhotos)));
    }

    #[test]
    fn test_rotate_by_accumulates() {
        let mut wizard = wizard_with(1);
        wizard.rotate_by(90.0).unwrap();
        wizard.rotate_by(90.0).unwrap();
        wizard.rotate_by(-45.0).unwrap();
        assert_eq!(wizard.current_photo().unwrap().rotation(), 135.0);
    }

    #[test]
    fn test_step_serde_names() {
        assert_eq!(serde_json::to_string(&Step::Description).unwrap(), "\"description\"");
        assert_eq!(Step::Crop.next(), Step::Filters);
        assert_eq!(Step::Description.previous(), Step::Filters);
    }
}
