//! Generation-tagged list of records fetched for the active keyword.

use std::sync::{Mutex, MutexGuard, PoisonError};

use photo_search_core::PhotoRecord;

#[derive(Debug, Default)]
struct Inner {
    generation: u64,
    records: Vec<PhotoRecord>,
}

/// Records of the active keyword, tagged with the generation that owns them.
///
/// Every mutation goes through [`ResultSet::with_current`], which runs only if
/// the caller's generation is still current. Completions of a superseded
/// search therefore never reach the list.
#[derive(Debug, Default)]
pub struct ResultSet {
    inner: Mutex<Inner>,
}

impl ResultSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new generation with an empty list and returns its tag.
    pub fn reset(&self) -> u64 {
        let mut inner = self.lock();
        inner.generation = inner.generation.wrapping_add(1);
        inner.records.clear();
        inner.generation
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Runs `f` on the records under the lock if `generation` is current.
    ///
    /// Returns `None` (without calling `f`) for a stale generation.
    pub fn with_current<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut Vec<PhotoRecord>) -> R,
    ) -> Option<R> {
        let mut inner = self.lock();
        if inner.generation != generation {
            return None;
        }
        Some(f(&mut inner.records))
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<PhotoRecord> {
        self.lock().records.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }
}
