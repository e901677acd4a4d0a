//! Ordered image collection for attachments.
//!
//! Image loading may happen concurrently, but the collection is only ever
//! appended to by one writer so order is preserved and duplicates rejected.

use std::future::Future;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::defaults::{FALLBACK_IMAGE_MIME, MAX_IMAGES};

/// Images attached to a request, in insertion order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageCollection {
    images: Vec<Vec<u8>>,
}

impl ImageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an image. Returns false when it is a duplicate or the collection is full.
    pub fn push(&mut self, data: Vec<u8>) -> bool {
        if data.is_empty() || self.images.len() >= MAX_IMAGES || self.images.contains(&data) {
            return false;
        }
        self.images.push(data);
        true
    }

    /// Remove the image at `index`, returning it.
    pub fn remove(&mut self, index: usize) -> Option<Vec<u8>> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn as_slice(&self) -> &[Vec<u8>] {
        &self.images
    }

    pub fn into_vec(self) -> Vec<Vec<u8>> {
        self.images
    }
}

/// Run image loaders concurrently and append their results in loader order.
///
/// Loaders returning `None` (unreadable images) are skipped. Appends happen
/// only on the calling task after every loader finished.
pub async fn collect_images<F>(collection: &mut ImageCollection, loaders: Vec<F>) -> usize
where
    F: Future<Output = Option<Vec<u8>>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    for (index, loader) in loaders.into_iter().enumerate() {
        tasks.spawn(async move { (index, loader.await) });
    }

    let mut slots: Vec<Option<Vec<u8>>> = Vec::new();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok((index, data)) => {
                if slots.len() <= index {
                    slots.resize(index + 1, None);
                }
                slots[index] = data;
            }
            Err(e) => warn!(error = ?e, "Image loader task panicked"),
        }
    }

    let added = slots
        .into_iter()
        .flatten()
        .filter(|data| collection.push(data.clone()))
        .count();
    debug!(added, total = collection.len(), "Collected images");
    added
}

/// MIME type for image bytes, sniffed from magic bytes.
pub fn detect_image_mime(data: &[u8]) -> &'static str {
    match infer::get(data) {
        Some(kind) if kind.mime_type().starts_with("image/") => kind.mime_type(),
        _ => FALLBACK_IMAGE_MIME,
    }
}
