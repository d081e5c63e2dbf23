//! The post-creation wizard as a JavaScript class.
//!
//! Engine work runs inline on the calling thread: each call issues a ticket,
//! runs it and commits it before returning. Hosts that move work to a Web
//! Worker drive `photopost_core::Wizard` directly instead.
//!
//! ```typescript
//! const wizard = new JsPostWizard();
//! for (const file of input.files) {
//!   wizard.stage_file(file.name, file.type, new Uint8Array(await file.arrayBuffer()));
//! }
//! try {
//!   wizard.commit_selection();
//! } catch (message) {
//!   input.value = '';
//!   alert(message);
//! }
//! ```

use photopost_core::ingest::{probe_file, IngestError, SelectedFile};
use photopost_core::photo::{AspectPreset, CropOffset, PhotoState};
use photopost_core::{CommitOutcome, CropRegion, FilterKind, PipelineConfig, Step, Wizard, WizardError};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::types::{console_warn, js_error, JsPackagedFile};

/// Serializable view of the wizard handed to the UI.
#[derive(Serialize)]
struct WizardView<'a> {
    step: Step,
    current_index: usize,
    has_next: bool,
    has_prev: bool,
    photos: Vec<PhotoView<'a>>,
    description: &'a str,
    tags: &'a [String],
    cancel_prompt_open: bool,
    validation_alert: Option<&'a str>,
}

#[derive(Serialize)]
struct PhotoView<'a> {
    working_url: String,
    original_url: String,
    #[serde(flatten)]
    state: &'a PhotoState,
}

fn outcome_name(outcome: CommitOutcome) -> &'static str {
    match outcome {
        CommitOutcome::Committed => "committed",
        CommitOutcome::Discarded => "discarded",
        CommitOutcome::Failed => "failed",
    }
}

#[wasm_bindgen]
pub struct JsPostWizard {
    wizard: Wizard,
    staged: Vec<SelectedFile>,
}

impl Default for JsPostWizard {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl JsPostWizard {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsPostWizard {
        Self::from_config(PipelineConfig::default())
    }

    /// Build a wizard from a JSON `PipelineConfig`; missing fields default.
    pub fn with_config(json: &str) -> Result<JsPostWizard, JsValue> {
        PipelineConfig::from_json(json)
            .map(Self::from_config)
            .map_err(js_error)
    }

    // ---- Selection ----

    /// Queue one file of a selection.
    pub fn stage_file(&mut self, name: &str, mime_type: &str, bytes: &[u8]) {
        self.staged
            .push(SelectedFile::new(name, mime_type, bytes.to_vec()));
    }

    /// Validate and admit the queued selection. The queue is always cleared;
    /// on rejection the message is also kept as the validation alert.
    pub fn commit_selection(&mut self) -> Result<usize, JsValue> {
        self.commit_staged().map_err(js_error)
    }

    pub fn validation_alert(&self) -> Option<String> {
        self.wizard.validation_alert().map(str::to_string)
    }

    pub fn dismiss_alert(&mut self) {
        self.wizard.dismiss_alert();
    }

    // ---- State ----

    pub fn step(&self) -> String {
        self.wizard.step().name().to_string()
    }

    pub fn photo_count(&self) -> usize {
        self.wizard.photos().len()
    }

    pub fn current_index(&self) -> usize {
        self.wizard.current_index()
    }

    /// Full snapshot for rendering.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        let photos = self
            .wizard
            .photos()
            .iter()
            .map(|photo| PhotoView {
                working_url: photo.working_handle().to_string(),
                original_url: photo.original().to_string(),
                state: photo,
            })
            .collect();
        let view = WizardView {
            step: self.wizard.step(),
            current_index: self.wizard.current_index(),
            has_next: self.wizard.has_next(),
            has_prev: self.wizard.has_prev(),
            photos,
            description: self.wizard.description(),
            tags: self.wizard.tags(),
            cancel_prompt_open: self.wizard.cancel_prompt_open(),
            validation_alert: self.wizard.validation_alert(),
        };
        serde_wasm_bindgen::to_value(&view).map_err(js_error)
    }

    /// Bytes of a photo's working image, for display.
    pub fn working_bytes(&self, index: usize) -> Result<Vec<u8>, JsValue> {
        let photo = self.photo_at(index).map_err(js_error)?;
        self.wizard
            .store()
            .fetch(photo.working_handle())
            .map(|bytes| bytes.to_vec())
            .map_err(js_error)
    }

    // ---- Navigation ----

    pub fn has_next(&self) -> bool {
        self.wizard.has_next()
    }

    pub fn has_prev(&self) -> bool {
        self.wizard.has_prev()
    }

    pub fn next_photo(&mut self) -> bool {
        self.wizard.next_photo()
    }

    pub fn prev_photo(&mut self) -> bool {
        self.wizard.prev_photo()
    }

    pub fn select_photo(&mut self, index: usize) -> Result<(), JsValue> {
        self.wizard.select_photo(index).map_err(js_error)
    }

    /// Step back; returns the new step name.
    pub fn back(&mut self) -> String {
        self.wizard.back().name().to_string()
    }

    pub fn delete_photo(&mut self, index: usize) -> Result<(), JsValue> {
        self.wizard.delete_photo(index).map(|_| ()).map_err(js_error)
    }

    // ---- Crop ----

    pub fn set_crop_offset(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        self.wizard
            .set_crop_offset(CropOffset::new(x, y))
            .map_err(js_error)
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), JsValue> {
        self.wizard.set_zoom(zoom).map_err(js_error)
    }

    pub fn set_rotation(&mut self, degrees: f64) -> Result<(), JsValue> {
        self.wizard.set_rotation(degrees).map_err(js_error)
    }

    pub fn rotate_by(&mut self, delta: f64) -> Result<(), JsValue> {
        self.wizard.rotate_by(delta).map_err(js_error)
    }

    pub fn set_crop_region(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<(), JsValue> {
        self.wizard
            .set_crop_region(CropRegion::new(x, y, width, height))
            .map_err(js_error)
    }

    /// `label` is one of "Original", "1:1", "4:5", "16:9".
    pub fn set_aspect_preset(&mut self, label: &str) -> Result<(), JsValue> {
        let preset: AspectPreset = label.parse().map_err(js_error)?;
        self.wizard.set_aspect_preset(preset).map_err(js_error)
    }

    /// Bake the current crop. Returns "committed", "discarded" or "failed".
    pub fn confirm_crop(&mut self) -> Result<String, JsValue> {
        self.run_bake()
            .map(|outcome| outcome_name(outcome).to_string())
            .map_err(js_error)
    }

    // ---- Filters ----

    /// Apply a filter by display name. Returns the commit outcome name.
    pub fn select_filter(&mut self, name: &str) -> Result<String, JsValue> {
        let kind: FilterKind = name.parse().map_err(js_error)?;
        self.run_filter(kind)
            .map(|outcome| outcome_name(outcome).to_string())
            .map_err(js_error)
    }

    // ---- Description ----

    pub fn set_description(&mut self, description: &str) {
        self.wizard.set_description(description);
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        self.wizard.add_tag(tag)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.wizard.remove_tag(tag)
    }

    pub fn tags(&self) -> Vec<String> {
        self.wizard.tags().to_vec()
    }

    // ---- Cancel and submit ----

    pub fn request_cancel(&mut self) {
        self.wizard.request_cancel();
    }

    pub fn dismiss_cancel(&mut self) {
        self.wizard.dismiss_cancel();
    }

    pub fn confirm_cancel(&mut self) {
        self.wizard.confirm_cancel();
    }

    /// Package the post for upload; `timestamp_ms` is usually `Date.now()`.
    pub fn package(&self, timestamp_ms: f64) -> Result<js_sys::Array, JsValue> {
        let post = self.wizard.package(timestamp_ms as i64).map_err(js_error)?;
        if !post.skipped.is_empty() {
            console_warn(&format!("skipped unreadable photos: {:?}", post.skipped));
        }
        Ok(post
            .files
            .into_iter()
            .map(|file| JsValue::from(JsPackagedFile::from(file)))
            .collect())
    }

    /// Call once the post was accepted; releases every image.
    pub fn finish_submission(&mut self) {
        self.wizard.reset();
    }
}

impl JsPostWizard {
    fn from_config(config: PipelineConfig) -> Self {
        Self {
            wizard: Wizard::new(config),
            staged: Vec::new(),
        }
    }

    fn photo_at(&self, index: usize) -> Result<&PhotoState, WizardError> {
        self.wizard
            .photos()
            .get(index)
            .ok_or(WizardError::NoPhotoAt {
                index,
                len: self.wizard.photos().len(),
            })
    }

    fn commit_staged(&mut self) -> Result<usize, IngestError> {
        let files = std::mem::take(&mut self.staged);
        self.wizard.validate_selection(&files)?;
        let probed = files.into_iter().map(probe_file).collect();
        Ok(self.wizard.accept_batch(probed))
    }

    fn run_bake(&mut self) -> Result<CommitOutcome, WizardError> {
        let ticket = self.wizard.begin_bake()?;
        let result = ticket.run();
        if let Err(err) = &result {
            console_warn(&format!("crop failed: {err}"));
        }
        Ok(self.wizard.commit_bake(&ticket, result))
    }

    fn run_filter(&mut self, kind: FilterKind) -> Result<CommitOutcome, WizardError> {
        if kind.is_identity() {
            return self.wizard.apply_original_filter();
        }
        let ticket = self.wizard.begin_filter(kind)?;
        let result = ticket.run();
        if let Err(err) = &result {
            console_warn(&format!("filter {kind} failed: {err}"));
        }
        Ok(self.wizard.commit_filter(&ticket, result))
    }
}
