//! Photopost Core - client-side multi-photo post creation
//!
//! This crate provides the pipeline behind the post-creation wizard:
//! ingesting a file selection, baking rotation and crop, applying color
//! filters and packaging the result for submission.
//!
//! The [`Wizard`] owns all state. Engine work goes through tickets so it can
//! run off the event loop; the `runtime` feature adds [`session::PostSession`],
//! which drives the wizard on tokio.

pub mod config;
pub mod decode;
pub mod draft;
pub mod encode;
pub mod filter;
pub mod ingest;
pub mod package;
pub mod photo;
pub mod store;
pub mod transform;
pub mod wizard;

#[cfg(feature = "runtime")]
pub mod session;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, PipelineConfig};
pub use decode::{decode_image, probe_size, DecodeError, DecodedImage, NaturalSize};
pub use draft::{DraftError, DraftPhoto, DraftSnapshot, DraftStore, MemoryDraftStore};
pub use encode::{encode_image, EncodeError, DEFAULT_JPEG_QUALITY};
pub use filter::{apply_filter, render_filter, FilterError, FilterKind};
pub use ingest::{validate_batch, IngestError, ProbedFile, SelectedFile};
pub use package::{PackageError, PackagedFile, PackagedPost, PackagingPolicy};
pub use photo::{AspectPreset, CropOffset, PhotoId, PhotoStage, PhotoState, StageError};
pub use store::{BlobStore, ImageHandle, StoreError};
pub use transform::{
    apply_crop, apply_rotation, bake, compute_rotated_bounds, BakeError, BakeRequest, BakedImage,
    CropRegion,
};
pub use wizard::{BakeTicket, CommitOutcome, FilterTicket, Step, Wizard, WizardError};
