//! Runs one paired fetch per descriptor of a page under the admission gate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use photo_search_core::{PhotoDescriptor, PhotoRecord, PhotoSource};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::{AdmissionGate, FetchEvents, PairedResourceFetcher, ResultSet};

/// Everything a page fetch reports into.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub page: u32,
    pub generation: u64,
    pub results: Arc<ResultSet>,
    pub events: FetchEvents,
    pub token: CancellationToken,
}

/// Outcome counts of one page fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub total: usize,
    pub completed: usize,
    pub fetched: usize,
    /// A newer search replaced this page's generation before it finished.
    pub superseded: bool,
}

struct PageTracker {
    total: usize,
    completed: AtomicUsize,
    fetched: AtomicUsize,
    superseded: AtomicBool,
}

impl PageTracker {
    fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            fetched: AtomicUsize::new(0),
            superseded: AtomicBool::new(false),
        }
    }

    /// Accounts for one finished descriptor.
    ///
    /// Appending the record, bumping the count and emitting progress happen
    /// under the result set lock, so they are observed in one order.
    #[allow(clippy::cast_precision_loss, reason = "page sizes are far below f32 precision")]
    fn complete(&self, ctx: &PageContext, record: Option<PhotoRecord>) {
        let applied = ctx.results.with_current(ctx.generation, |records| {
            if let Some(record) = record {
                records.push(record.clone());
                self.fetched.fetch_add(1, Ordering::Relaxed);
                ctx.events.publish_record(record);
            }
            let completed = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
            ctx.events.publish_progress(completed as f32 / self.total as f32);
            if completed == self.total {
                ctx.events.publish_loaded();
            }
        });
        if applied.is_none() {
            self.completed.fetch_add(1, Ordering::AcqRel);
            self.superseded.store(true, Ordering::Relaxed);
        }
    }

    fn summary(&self) -> PageSummary {
        PageSummary {
            total: self.total,
            completed: self.completed.load(Ordering::Acquire),
            fetched: self.fetched.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
        }
    }
}

pub struct BoundedFanOutFetcher<S: ?Sized> {
    paired: PairedResourceFetcher<S>,
    gate: AdmissionGate,
}

impl<S: ?Sized> std::fmt::Debug for BoundedFanOutFetcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedFanOutFetcher")
            .field("paired", &self.paired)
            .field("gate", &self.gate)
            .finish()
    }
}

impl<S: ?Sized> BoundedFanOutFetcher<S> {
    #[must_use]
    pub fn new(paired: PairedResourceFetcher<S>, gate: AdmissionGate) -> Self {
        Self { paired, gate }
    }

    #[must_use]
    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    #[must_use]
    pub fn paired(&self) -> &PairedResourceFetcher<S> {
        &self.paired
    }
}

impl<S: PhotoSource + ?Sized + 'static> BoundedFanOutFetcher<S> {
    /// Fetches every descriptor of a page and waits until all have resolved.
    ///
    /// Every descriptor is spawned at once; the gate decides how many run.
    /// Progress restarts at 0.0 and `Loaded` is published when the last one
    /// completes. An empty page publishes 0.0 and `Loaded` right away.
    pub async fn fetch_page(
        &self,
        descriptors: Vec<PhotoDescriptor>,
        ctx: &PageContext,
    ) -> PageSummary {
        let total = descriptors.len();
        let tracker = Arc::new(PageTracker::new(total));

        let started = ctx.results.with_current(ctx.generation, |_| {
            ctx.events.publish_progress(0.0);
            if total == 0 {
                ctx.events.publish_loaded();
            }
        });
        if started.is_none() {
            tracing::debug!(page = ctx.page, generation = ctx.generation, "page superseded before start");
            return PageSummary { total, superseded: true, ..PageSummary::default() };
        }
        if total == 0 {
            tracing::info!(page = ctx.page, "page has no photos");
            return tracker.summary();
        }

        let mut tasks = JoinSet::new();
        for descriptor in descriptors {
            let paired = self.paired.clone();
            let gate = self.gate.clone();
            let ctx = ctx.clone();
            let tracker = Arc::clone(&tracker);
            tasks.spawn(async move {
                let record = fetch_one(&paired, &gate, &descriptor, &ctx.token).await;
                tracker.complete(&ctx, record);
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(page = ctx.page, error = %e, "photo task failed");
                tracker.complete(ctx, None);
            }
        }

        let summary = tracker.summary();
        tracing::info!(
            page = ctx.page,
            generation = ctx.generation,
            total = summary.total,
            fetched = summary.fetched,
            superseded = summary.superseded,
            peak_in_flight = self.gate.peak_in_flight(),
            "page fetch finished"
        );
        summary
    }
}

/// Holds one gate slot across both halves of the pair.
async fn fetch_one<S: PhotoSource + ?Sized>(
    paired: &PairedResourceFetcher<S>,
    gate: &AdmissionGate,
    descriptor: &PhotoDescriptor,
    token: &CancellationToken,
) -> Option<PhotoRecord> {
    let permit = tokio::select! {
        biased;
        () = token.cancelled() => return None,
        acquired = gate.acquire() => acquired,
    };
    let _permit = match permit {
        Ok(permit) => permit,
        Err(e) => {
            tracing::debug!(photo_id = %descriptor.id, error = %e, "admission refused");
            return None;
        },
    };
    paired.fetch(descriptor, token).await
}
