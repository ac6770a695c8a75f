//! Keyword search session: pages, generations and accumulated results.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use photo_search_cache::PhotoCaches;
use photo_search_core::{FetchState, PhotoRecord, PhotoSource, SearchParameters};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::{
    AdmissionGate, BoundedFanOutFetcher, FetchEvents, PageContext, PageSummary,
    PairedResourceFetcher, ResultSet, ServiceError, SessionConfig,
};

/// What a `load_next_page` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLoad {
    /// No keyword yet, or the keyword is blank.
    Skipped,
    /// A newer search started while the page search was in flight.
    Superseded,
    Completed(PageSummary),
}

#[derive(Debug)]
struct SessionState {
    params: SearchParameters,
    generation: u64,
    token: CancellationToken,
    total_pages: Option<u32>,
}

/// Drives keyword searches page by page and owns the accumulated results.
///
/// All commands take `&self`; share the session behind an `Arc` to run
/// `load_next_page` calls concurrently or to start a new search while a page
/// is still loading.
pub struct SearchSession<S: ?Sized> {
    source: Arc<S>,
    fan_out: BoundedFanOutFetcher<S>,
    caches: PhotoCaches,
    config: SessionConfig,
    results: Arc<ResultSet>,
    events: FetchEvents,
    state: Mutex<SessionState>,
}

impl<S: ?Sized> std::fmt::Debug for SearchSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("results", &self.results.len())
            .finish_non_exhaustive()
    }
}

impl<S: PhotoSource + ?Sized + 'static> SearchSession<S> {
    /// # Errors
    /// Returns [`ServiceError::Config`] if `config` is invalid.
    pub fn new(
        source: Arc<S>,
        caches: PhotoCaches,
        config: SessionConfig,
    ) -> Result<Self, ServiceError> {
        config.validate()?;
        let paired = PairedResourceFetcher::new(Arc::clone(&source), caches.clone());
        let fan_out = BoundedFanOutFetcher::new(paired, AdmissionGate::new(config.concurrency_limit));
        Ok(Self {
            source,
            fan_out,
            caches,
            config,
            results: Arc::new(ResultSet::new()),
            events: FetchEvents::new(config.event_capacity),
            state: Mutex::new(SessionState {
                params: SearchParameters::default(),
                generation: 0,
                token: CancellationToken::new(),
                total_pages: None,
            }),
        })
    }

    /// Replaces the active keyword and loads its first page.
    ///
    /// In-flight work of the previous keyword is cancelled and its late
    /// completions are discarded. The caches are kept.
    ///
    /// # Errors
    /// Returns [`ServiceError::Search`] if the first page search fails.
    pub async fn start_search(&self, keyword: &str) -> Result<PageLoad, ServiceError> {
        let prepared = {
            let mut state = self.lock_state();
            state.token.cancel();
            state.token = CancellationToken::new();
            state.generation = self.results.reset();
            state.params = SearchParameters::new(keyword, 0);
            state.total_pages = None;
            self.events.set_loading();
            tracing::info!(keyword, generation = state.generation, "search started");
            self.advance_page(&mut state)
        };
        match prepared {
            Some((params, ctx)) => self.load_page(params, ctx).await,
            None => Ok(PageLoad::Skipped),
        }
    }

    /// Loads the page after the last requested one and appends its records.
    ///
    /// # Errors
    /// Returns [`ServiceError::Search`] if the page search fails; the status
    /// stays as it was and nothing is appended.
    pub async fn load_next_page(&self) -> Result<PageLoad, ServiceError> {
        let prepared = {
            let mut state = self.lock_state();
            self.advance_page(&mut state)
        };
        match prepared {
            Some((params, ctx)) => self.load_page(params, ctx).await,
            None => Ok(PageLoad::Skipped),
        }
    }

    /// Claims the next page number of the current generation.
    fn advance_page(&self, state: &mut SessionState) -> Option<(SearchParameters, PageContext)> {
        let next = state.params.next_page();
        if !next.is_fetchable() {
            return None;
        }
        state.params = next.clone();
        let ctx = PageContext {
            page: next.page,
            generation: state.generation,
            results: Arc::clone(&self.results),
            events: self.events.clone(),
            token: state.token.clone(),
        };
        Some((next, ctx))
    }

    async fn load_page(
        &self,
        params: SearchParameters,
        ctx: PageContext,
    ) -> Result<PageLoad, ServiceError> {
        let searched = tokio::select! {
            biased;
            () = ctx.token.cancelled() => return Ok(PageLoad::Superseded),
            searched = self.source.search_photos(&params.keyword, self.config.per_page, params.page) => searched,
        };
        let page = match searched {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(keyword = %params.keyword, page = params.page, error = %e, "page search failed");
                return Err(ServiceError::Search(e));
            },
        };

        {
            let mut state = self.lock_state();
            if state.generation != ctx.generation {
                return Ok(PageLoad::Superseded);
            }
            state.total_pages = Some(page.total_pages);
        }
        tracing::debug!(
            keyword = %params.keyword,
            page = params.page,
            total_pages = page.total_pages,
            photos = page.descriptors.len(),
            "page search returned"
        );

        let summary = self.fan_out.fetch_page(page.descriptors, &ctx).await;
        if summary.superseded {
            return Ok(PageLoad::Superseded);
        }
        Ok(PageLoad::Completed(summary))
    }

    /// Empties both memory caches. Results already delivered are kept.
    pub fn clear_caches(&self) {
        self.caches.clear();
    }
}

impl<S: ?Sized> SearchSession<S> {
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn parameters(&self) -> SearchParameters {
        self.lock_state().params.clone()
    }

    /// Records fetched so far for the active keyword.
    #[must_use]
    pub fn results(&self) -> Vec<PhotoRecord> {
        self.results.snapshot()
    }

    #[must_use]
    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn fetch_state(&self) -> FetchState {
        self.events.status()
    }

    /// Page count reported by the last successful search of the active keyword.
    #[must_use]
    pub fn total_pages(&self) -> Option<u32> {
        self.lock_state().total_pages
    }

    /// `true` until a search reports that the last page has been requested.
    #[must_use]
    pub fn has_more_pages(&self) -> bool {
        let state = self.lock_state();
        state.total_pages.is_none_or(|total| state.params.page < total)
    }

    #[must_use]
    pub fn subscribe_progress(&self) -> broadcast::Receiver<f32> {
        self.events.subscribe_progress()
    }

    #[must_use]
    pub fn subscribe_records(&self) -> broadcast::Receiver<PhotoRecord> {
        self.events.subscribe_records()
    }

    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<FetchState> {
        self.events.subscribe_status()
    }

    #[must_use]
    pub fn events(&self) -> &FetchEvents {
        &self.events
    }

    #[must_use]
    pub fn caches(&self) -> &PhotoCaches {
        &self.caches
    }

    #[must_use]
    pub fn admission_gate(&self) -> &AdmissionGate {
        self.fan_out.gate()
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl<S: ?Sized> Drop for SearchSession<S> {
    /// Stops in-flight pairs and refuses further admissions.
    fn drop(&mut self) {
        self.lock_state().token.cancel();
        self.fan_out.gate().close();
    }
}
