//! Fetches the location and image of one photo as a pair.
//!
//! Both halves start together and share a cancellation token derived from the
//! page token. The first half to fail cancels the other; a half that already
//! succeeded keeps its cache write.

use std::sync::Arc;

use photo_search_cache::PhotoCaches;
use photo_search_core::{DecodedImage, LocationInfo, PhotoDescriptor, PhotoRecord, PhotoSource};
use tokio_util::sync::CancellationToken;

use crate::{PairError, PairHalf};

pub struct PairedResourceFetcher<S: ?Sized> {
    source: Arc<S>,
    caches: PhotoCaches,
}

impl<S: ?Sized> Clone for PairedResourceFetcher<S> {
    fn clone(&self) -> Self {
        Self { source: Arc::clone(&self.source), caches: self.caches.clone() }
    }
}

impl<S: ?Sized> std::fmt::Debug for PairedResourceFetcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairedResourceFetcher").field("caches", &self.caches).finish_non_exhaustive()
    }
}

impl<S: ?Sized> PairedResourceFetcher<S> {
    #[must_use]
    pub fn new(source: Arc<S>, caches: PhotoCaches) -> Self {
        Self { source, caches }
    }

    #[must_use]
    pub fn caches(&self) -> &PhotoCaches {
        &self.caches
    }
}

impl<S: PhotoSource + ?Sized> PairedResourceFetcher<S> {
    /// Resolves `descriptor` into a record, or `None` if either half fails.
    pub async fn fetch(
        &self,
        descriptor: &PhotoDescriptor,
        page_token: &CancellationToken,
    ) -> Option<PhotoRecord> {
        match self.try_fetch(descriptor, page_token).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(photo_id = %descriptor.id, error = %e, "paired fetch produced no record");
                None
            },
        }
    }

    /// Like [`Self::fetch`] but reports why no record was produced.
    ///
    /// # Errors
    /// [`PairError::Partial`] names the half that failed first;
    /// [`PairError::Cancelled`] means the page token was cancelled.
    pub async fn try_fetch(
        &self,
        descriptor: &PhotoDescriptor,
        page_token: &CancellationToken,
    ) -> Result<PhotoRecord, PairError> {
        if page_token.is_cancelled() {
            return Err(PairError::Cancelled);
        }
        let pair_token = page_token.child_token();
        let (location, image) = tokio::join!(
            self.location_half(descriptor, &pair_token),
            self.image_half(descriptor, &pair_token),
        );

        match (location, image) {
            (Ok(location), Ok(image)) => Ok(PhotoRecord::new(descriptor, location, image)),
            // A half only sees cancellation without a failing sibling when the page was cancelled.
            (Err(PairError::Cancelled), Err(PairError::Cancelled) | Ok(_))
            | (Ok(_), Err(PairError::Cancelled)) => Err(PairError::Cancelled),
            (Err(PairError::Cancelled), Err(cause)) | (Ok(_), Err(cause)) => {
                Err(PairError::partial(PairHalf::Image, cause))
            },
            (Err(cause), _) => Err(PairError::partial(PairHalf::Location, cause)),
        }
    }

    async fn location_half(
        &self,
        descriptor: &PhotoDescriptor,
        token: &CancellationToken,
    ) -> Result<LocationInfo, PairError> {
        if let Some(hit) = self.caches.locations().get(descriptor.id.as_str()) {
            return Ok(hit);
        }

        let result = tokio::select! {
            biased;
            () = token.cancelled() => Err(PairError::Cancelled),
            fetched = self.source.fetch_location(&descriptor.id) => match fetched {
                Ok(Some(location)) => Ok(location),
                Ok(None) => Err(PairError::LocationUnavailable),
                Err(e) => Err(PairError::from(e)),
            },
        };

        match &result {
            Ok(location) => self.caches.locations().put(descriptor.id.clone(), *location),
            Err(PairError::Cancelled) => {},
            Err(_) => token.cancel(),
        }
        result
    }

    async fn image_half(
        &self,
        descriptor: &PhotoDescriptor,
        token: &CancellationToken,
    ) -> Result<DecodedImage, PairError> {
        let key = descriptor.image_path();
        if let Some(hit) = self.caches.images().get(key.as_str()) {
            return Ok(hit);
        }

        let result = tokio::select! {
            biased;
            () = token.cancelled() => Err(PairError::Cancelled),
            decoded = self.download_and_decode(descriptor) => decoded,
        };

        match &result {
            Ok(image) => self.caches.images().put(key, image.clone()),
            Err(PairError::Cancelled) => {},
            Err(_) => token.cancel(),
        }
        result
    }

    async fn download_and_decode(
        &self,
        descriptor: &PhotoDescriptor,
    ) -> Result<DecodedImage, PairError> {
        let bytes = self.source.fetch_image_bytes(descriptor).await?;
        tokio::task::spawn_blocking(move || decode_image(&bytes))
            .await
            .map_err(|e| PairError::Decode(format!("decode task failed: {e}")))?
    }
}

/// Decodes encoded image bytes (JPEG, PNG, GIF or WebP).
///
/// # Errors
/// Returns [`PairError::Decode`] for empty or undecodable input.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, PairError> {
    if bytes.is_empty() {
        return Err(PairError::Decode("empty image body".to_owned()));
    }
    image::load_from_memory(bytes)
        .map(DecodedImage::new)
        .map_err(|e| PairError::Decode(e.to_string()))
}
