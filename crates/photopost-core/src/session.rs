//! Async driver for a post-creation session.
//!
//! State lives in a [`Wizard`] owned by the session. Decoding and pixel work
//! run on tokio's blocking pool; every commit happens back on the caller's
//! task, so the wizard is never touched concurrently.

use chrono::Utc;
use thiserror::Error;
use tokio::task;

use crate::config::PipelineConfig;
use crate::draft::{DraftError, DraftSnapshot, DraftStore};
use crate::filter::{FilterError, FilterKind};
use crate::ingest::{probe_file, IngestError, ProbedFile, SelectedFile};
use crate::package::{PackageError, PackagedFile};
use crate::transform::BakeError;
use crate::wizard::{CommitOutcome, Wizard, WizardError};

/// Everything the submission collaborator receives.
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub files: Vec<PackagedFile>,
    pub description: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostAck {
    pub post_id: String,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("submission rejected: {0}")]
    Rejected(String),

    #[error("submission transport failed: {0}")]
    Transport(String),
}

/// The external collaborator that publishes a packaged post.
#[allow(async_fn_in_trait)]
pub trait PostSubmitter {
    async fn submit(&self, payload: SubmissionPayload) -> Result<PostAck, SubmitError>;
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Draft(#[from] DraftError),
}

pub struct PostSession<S> {
    wizard: Wizard,
    submitter: S,
}

impl<S: PostSubmitter> PostSession<S> {
    pub fn new(config: PipelineConfig, submitter: S) -> Self {
        Self {
            wizard: Wizard::new(config),
            submitter,
        }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    /// Direct access for edits that need no engine work.
    pub fn wizard_mut(&mut self) -> &mut Wizard {
        &mut self.wizard
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    /// Validate a selection, probe every file concurrently and admit the
    /// batch once all probes have settled.
    #[tracing::instrument(skip_all, fields(files = files.len()))]
    pub async fn select_files(&mut self, files: Vec<SelectedFile>) -> Result<usize, SessionError> {
        self.wizard.validate_selection(&files)?;

        let probes: Vec<_> = files
            .iter()
            .cloned()
            .map(|file| task::spawn_blocking(move || probe_file(file)))
            .collect();

        let mut batch = Vec::with_capacity(files.len());
        for (file, probe) in files.into_iter().zip(probes) {
            match probe.await {
                Ok(probed) => batch.push(probed),
                Err(err) => {
                    tracing::warn!(name = %file.name, error = %err, "probe task failed, using fallback size");
                    batch.push(ProbedFile { file, size: None });
                }
            }
        }

        Ok(self.wizard.accept_batch(batch))
    }

    /// Bake the current photo's rotation and crop.
    #[tracing::instrument(skip_all)]
    pub async fn confirm_crop(&mut self) -> Result<CommitOutcome, SessionError> {
        let ticket = self.wizard.begin_bake()?;
        let job = ticket.clone();
        let result = task::spawn_blocking(move || job.run())
            .await
            .unwrap_or_else(|err| Err(BakeError::Task(err.to_string())));
        Ok(self.wizard.commit_bake(&ticket, result))
    }

    /// Apply a filter to the current photo. `Original` needs no pixel pass.
    #[tracing::instrument(skip(self), fields(filter = kind.name()))]
    pub async fn select_filter(&mut self, kind: FilterKind) -> Result<CommitOutcome, SessionError> {
        if kind.is_identity() {
            return Ok(self.wizard.apply_original_filter()?);
        }

        let ticket = self.wizard.begin_filter(kind)?;
        let job = ticket.clone();
        let result = task::spawn_blocking(move || job.run())
            .await
            .unwrap_or_else(|err| Err(FilterError::Task(err.to_string())));
        Ok(self.wizard.commit_filter(&ticket, result))
    }

    /// Package the post and hand it to the submitter. On acceptance the
    /// session starts over; on failure everything is kept for a retry.
    #[tracing::instrument(skip_all)]
    pub async fn submit(&mut self) -> Result<PostAck, SessionError> {
        let post = self.wizard.package(Utc::now().timestamp_millis())?;
        if !post.skipped.is_empty() {
            tracing::warn!(skipped = ?post.skipped, "submitting without unreadable photos");
        }

        let payload = SubmissionPayload {
            files: post.files,
            description: self.wizard.description().to_string(),
            tags: self.wizard.tags().to_vec(),
        };
        let ack = self.submitter.submit(payload).await?;

        tracing::info!(post_id = %ack.post_id, "post submitted");
        self.wizard.reset();
        Ok(ack)
    }

    /// Save the current post as a draft stamped with the current time.
    pub fn save_draft(
        &self,
        drafts: &mut impl DraftStore,
        id: impl Into<String>,
    ) -> Result<DraftSnapshot, SessionError> {
        let snapshot = DraftSnapshot::capture(&self.wizard, id, Utc::now());
        drafts.save(snapshot.clone())?;
        Ok(snapshot)
    }
}
