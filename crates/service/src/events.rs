//! Progress, record and status channels shared by a session and its pages.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use photo_search_core::{FetchState, PhotoRecord};
use tokio::sync::{broadcast, watch};

/// Progress, record and status channels of one session.
///
/// Progress and record sends are best-effort: a send with no subscriber, or a
/// subscriber that lags, loses events. The status watch always holds the
/// latest state.
#[derive(Debug, Clone)]
pub struct FetchEvents {
    progress: broadcast::Sender<f32>,
    records: broadcast::Sender<PhotoRecord>,
    status: Arc<watch::Sender<FetchState>>,
    loaded_signals: Arc<AtomicU64>,
}

impl FetchEvents {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (progress, _) = broadcast::channel(capacity);
        let (records, _) = broadcast::channel(capacity);
        let (status, _) = watch::channel(FetchState::Loading);
        Self {
            progress,
            records,
            status: Arc::new(status),
            loaded_signals: Arc::new(AtomicU64::new(0)),
        }
    }

    #[must_use]
    pub fn subscribe_progress(&self) -> broadcast::Receiver<f32> {
        self.progress.subscribe()
    }

    #[must_use]
    pub fn subscribe_records(&self) -> broadcast::Receiver<PhotoRecord> {
        self.records.subscribe()
    }

    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<FetchState> {
        self.status.subscribe()
    }

    #[must_use]
    pub fn status(&self) -> FetchState {
        *self.status.borrow()
    }

    /// Number of times `Loaded` has been published.
    #[must_use]
    pub fn loaded_signals(&self) -> u64 {
        self.loaded_signals.load(Ordering::Acquire)
    }

    pub(crate) fn publish_progress(&self, value: f32) {
        let _ = self.progress.send(value.clamp(0.0, 1.0));
    }

    pub(crate) fn publish_record(&self, record: PhotoRecord) {
        let _ = self.records.send(record);
    }

    pub(crate) fn set_loading(&self) {
        self.status.send_replace(FetchState::Loading);
    }

    pub(crate) fn publish_loaded(&self) {
        self.loaded_signals.fetch_add(1, Ordering::AcqRel);
        self.status.send_replace(FetchState::Loaded);
    }
}

impl Default for FetchEvents {
    fn default() -> Self {
        Self::new(photo_search_core::EVENT_CHANNEL_CAPACITY)
    }
}
