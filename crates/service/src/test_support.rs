//! In-memory `PhotoSource` double for pipeline and session tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use photo_search_cache::PhotoCaches;
use photo_search_core::{
    LocationInfo, PhotoDescriptor, PhotoSource, SearchPage, SourceError, SourceResult,
};

/// Scripted outcome of one remote call.
#[derive(Debug, Clone)]
pub enum Remote {
    Fail(SourceError),
    /// Location only: the photo has no geotag.
    Missing,
    /// Image only: bytes that do not decode.
    Corrupt,
    /// Never resolves; only cancellation ends it.
    Hang,
}

#[derive(Debug, Default)]
struct Counters {
    search_calls: AtomicUsize,
    location_calls: AtomicUsize,
    image_calls: AtomicUsize,
    active: AtomicUsize,
    peak_active: AtomicUsize,
}

struct ActiveGuard<'a>(&'a Counters);

impl<'a> ActiveGuard<'a> {
    fn enter(counters: &'a Counters) -> Self {
        let now = counters.active.fetch_add(1, Ordering::SeqCst) + 1;
        counters.peak_active.fetch_max(now, Ordering::SeqCst);
        Self(counters)
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeSource {
    pages: Mutex<HashMap<(String, u32), SourceResult<SearchPage>>>,
    locations: Mutex<HashMap<String, Remote>>,
    images: Mutex<HashMap<String, Remote>>,
    image_delays: Mutex<HashMap<String, Duration>>,
    default_delay: Duration,
    searched: Mutex<Vec<(String, u32)>>,
    counters: Counters,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every location and image call sleeps this long first.
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn with_page(self, keyword: &str, page: u32, total_pages: u32, ids: &[&str]) -> Self {
        let descriptors = ids.iter().map(|id| descriptor(id)).collect();
        self.pages
            .lock()
            .unwrap()
            .insert((keyword.to_owned(), page), Ok(SearchPage { page, total_pages, descriptors }));
        self
    }

    pub fn with_failing_page(self, keyword: &str, page: u32, err: SourceError) -> Self {
        self.pages.lock().unwrap().insert((keyword.to_owned(), page), Err(err));
        self
    }

    pub fn with_location(self, id: &str, outcome: Remote) -> Self {
        self.locations.lock().unwrap().insert(id.to_owned(), outcome);
        self
    }

    pub fn with_image(self, id: &str, outcome: Remote) -> Self {
        self.images.lock().unwrap().insert(id.to_owned(), outcome);
        self
    }

    /// Image calls for `id` sleep `delay` instead of the default.
    pub fn with_image_delay(self, id: &str, delay: Duration) -> Self {
        self.image_delays.lock().unwrap().insert(id.to_owned(), delay);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.counters.search_calls.load(Ordering::SeqCst)
    }

    /// `(keyword, page)` of every search call, in call order.
    pub fn searched(&self) -> Vec<(String, u32)> {
        self.searched.lock().unwrap().clone()
    }

    pub fn location_calls(&self) -> usize {
        self.counters.location_calls.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.counters.image_calls.load(Ordering::SeqCst)
    }

    /// Highest number of location or image calls in progress at once.
    pub fn peak_active(&self) -> usize {
        self.counters.peak_active.load(Ordering::SeqCst)
    }

    async fn pause(&self, image_of: Option<&str>) {
        let delay = image_of
            .and_then(|id| self.image_delays.lock().unwrap().get(id).copied())
            .unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl PhotoSource for FakeSource {
    async fn search_photos(
        &self,
        keyword: &str,
        _per_page: u32,
        page: u32,
    ) -> SourceResult<SearchPage> {
        self.counters.search_calls.fetch_add(1, Ordering::SeqCst);
        self.searched.lock().unwrap().push((keyword.to_owned(), page));
        let scripted = self.pages.lock().unwrap().get(&(keyword.to_owned(), page)).cloned();
        scripted.unwrap_or_else(|| Ok(SearchPage { page, total_pages: page, descriptors: vec![] }))
    }

    async fn fetch_location(&self, photo_id: &str) -> SourceResult<Option<LocationInfo>> {
        self.counters.location_calls.fetch_add(1, Ordering::SeqCst);
        let _active = ActiveGuard::enter(&self.counters);
        let scripted = self.locations.lock().unwrap().get(photo_id).cloned();
        if matches!(scripted, Some(Remote::Hang)) {
            std::future::pending::<()>().await;
        }
        self.pause(None).await;
        match scripted {
            Some(Remote::Fail(e)) => Err(e),
            Some(Remote::Missing) => Ok(None),
            _ => Ok(Some(location_for(photo_id))),
        }
    }

    async fn fetch_image_bytes(&self, descriptor: &PhotoDescriptor) -> SourceResult<Vec<u8>> {
        self.counters.image_calls.fetch_add(1, Ordering::SeqCst);
        let _active = ActiveGuard::enter(&self.counters);
        let scripted = self.images.lock().unwrap().get(&descriptor.id).cloned();
        if matches!(scripted, Some(Remote::Hang)) {
            std::future::pending::<()>().await;
        }
        self.pause(Some(&descriptor.id)).await;
        match scripted {
            Some(Remote::Fail(e)) => Err(e),
            Some(Remote::Corrupt) => Ok(b"definitely not an image".to_vec()),
            _ => Ok(png_bytes()),
        }
    }
}

pub fn descriptor(id: &str) -> PhotoDescriptor {
    PhotoDescriptor::new(id, "65535", format!("secret{id}")).with_title(format!("photo {id}"))
}

/// Deterministic coordinates so tests can check which call produced a record.
pub fn location_for(id: &str) -> LocationInfo {
    let seed = id.bytes().map(f64::from).sum::<f64>();
    LocationInfo::new(seed % 90.0, seed % 180.0)
}

pub fn png_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(4, 3))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

pub fn roomy_caches() -> PhotoCaches {
    PhotoCaches::new(16 * 1024 * 1024, 1024 * 1024)
}

pub fn network(msg: &str) -> SourceError {
    SourceError::Network(msg.to_owned())
}

pub fn shared(source: FakeSource) -> Arc<FakeSource> {
    Arc::new(source)
}
