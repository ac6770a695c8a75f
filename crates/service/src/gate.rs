//! Admission gate bounding how many paired fetches run at once.
//!
//! A counting semaphore with in-flight and peak counters. Permits are owned so
//! they can move into spawned tasks; dropping one frees the slot.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::PairError;

#[derive(Debug, Default)]
struct GateCounters {
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl GateCounters {
    fn enter(&self) {
        let current = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        let mut peak = self.peak_in_flight.load(Ordering::Relaxed);
        while current > peak {
            match self.peak_in_flight.compare_exchange_weak(
                peak,
                current,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(p) => peak = p,
            }
        }
    }
}

/// Shared admission gate. Cloning yields a handle to the same slots.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    limit: usize,
    counters: Arc<GateCounters>,
}

/// Slot held for the whole lifetime of one paired fetch.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
    counters: Arc<GateCounters>,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl AdmissionGate {
    /// `limit` is raised to 1 if zero.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
            counters: Arc::new(GateCounters::default()),
        }
    }

    /// Waits for a free slot.
    ///
    /// # Errors
    /// Returns [`PairError::GateClosed`] if the gate was closed.
    pub async fn acquire(&self) -> Result<AdmissionPermit, PairError> {
        let permit =
            Arc::clone(&self.semaphore).acquire_owned().await.map_err(|_| PairError::GateClosed)?;
        self.counters.enter();
        Ok(AdmissionPermit { _permit: permit, counters: Arc::clone(&self.counters) })
    }

    /// Refuses every pending and future acquisition.
    pub fn close(&self) {
        self.semaphore.close();
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::Acquire)
    }

    /// Highest simultaneous occupancy observed since creation.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.counters.peak_in_flight.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
