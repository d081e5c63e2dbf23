//! Submission packaging: final working images as upload-ready entries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::photo::{PhotoId, PhotoState};
use crate::store::{BlobStore, ImageHandle};

pub const PACKAGED_MIME_TYPE: &str = "image/jpeg";

/// What to do when a photo's bytes cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackagingPolicy {
    /// Refuse to submit a post with missing photos.
    #[default]
    AbortOnFailure,
    /// Submit the remaining photos and report the skipped indices.
    SkipFailed,
}

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("there are no photos to package")]
    NoPhotos,

    #[error("photo {index} ({photo_id}) has no readable image at {handle}")]
    MissingImage {
        index: usize,
        photo_id: PhotoId,
        handle: ImageHandle,
    },

    #[error("none of the {0} photos could be packaged")]
    NothingPackaged(usize),
}

/// One upload-ready binary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Arc<[u8]>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackagedPost {
    pub files: Vec<PackagedFile>,
    /// Indices of photos left out under [`PackagingPolicy::SkipFailed`].
    pub skipped: Vec<usize>,
}

pub fn packaged_file_name(timestamp_ms: i64, index: usize) -> String {
    format!("photo_{timestamp_ms}_{index}.jpg")
}

/// Package every photo's working image, in order.
///
/// File names keep the photo's position even when earlier photos were
/// skipped.
pub fn package_photos(
    store: &BlobStore,
    photos: &[PhotoState],
    timestamp_ms: i64,
    policy: PackagingPolicy,
) -> Result<PackagedPost, PackageError> {
    if photos.is_empty() {
        return Err(PackageError::NoPhotos);
    }

    let mut post = PackagedPost::default();
    for (index, photo) in photos.iter().enumerate() {
        let handle = photo.working_handle();
        match store.fetch(handle) {
            Ok(bytes) => post.files.push(PackagedFile {
                file_name: packaged_file_name(timestamp_ms, index),
                mime_type: PACKAGED_MIME_TYPE,
                bytes,
            }),
            Err(err) => {
                tracing::warn!(index, photo_id = %photo.id(), error = %err, "photo could not be packaged");
                match policy {
                    PackagingPolicy::AbortOnFailure => {
                        return Err(PackageError::MissingImage {
                            index,
                            photo_id: photo.id(),
                            handle,
                        })
                    }
                    PackagingPolicy::SkipFailed => post.skipped.push(index),
                }
            }
        }
    }

    if post.files.is_empty() {
        return Err(PackageError::NothingPackaged(photos.len()));
    }

    tracing::info!(
        files = post.files.len(),
        skipped = post.skipped.len(),
        "packaged post"
    );
    Ok(post)
}
