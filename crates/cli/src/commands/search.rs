use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use photo_search_cache::PhotoCaches;
use photo_search_client::FlickrClient;
use photo_search_core::PhotoRecord;
use photo_search_service::{PageLoad, SearchSession};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::export::{default_export_dir, save_record};

pub(crate) struct SearchArgs {
    pub keyword: String,
    pub pages: u32,
    pub export: bool,
    pub export_dir: Option<PathBuf>,
    pub monochrome: bool,
    pub json: bool,
}

#[derive(Serialize)]
struct RecordSummary<'a> {
    id: &'a str,
    title: &'a str,
    latitude: f64,
    longitude: f64,
    width: u32,
    height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    exported_to: Option<PathBuf>,
}

impl<'a> RecordSummary<'a> {
    fn new(record: &'a PhotoRecord, exported_to: Option<PathBuf>) -> Self {
        Self {
            id: &record.id,
            title: &record.title,
            latitude: record.latitude,
            longitude: record.longitude,
            width: record.image.width(),
            height: record.image.height(),
            exported_to,
        }
    }
}

pub(crate) async fn run_search(config: &AppConfig, args: SearchArgs) -> Result<()> {
    let client = FlickrClient::with_endpoints(
        config.require_api_key()?,
        config.api_url.clone(),
        config.image_url.clone(),
        config.http_timeout(),
    )?;
    let caches = PhotoCaches::from_budget(
        config.memory_budget(),
        config.image_cache_fraction,
        config.location_cache_fraction,
    );
    let session = SearchSession::new(Arc::new(client), caches, config.session_config())?;

    let progress = tokio::spawn(render_progress(session.subscribe_progress(), !args.json));

    let pages = args.pages.max(1);
    for index in 0..pages {
        let load = if index == 0 {
            session.start_search(&args.keyword).await?
        } else if session.has_more_pages() {
            session.load_next_page().await?
        } else {
            tracing::info!(keyword = %args.keyword, "no more pages");
            break;
        };
        match load {
            PageLoad::Completed(summary) => tracing::info!(
                page = session.parameters().page,
                fetched = summary.fetched,
                total = summary.total,
                "page loaded"
            ),
            PageLoad::Skipped => {
                anyhow::bail!("keyword must not be blank");
            },
            PageLoad::Superseded => break,
        }
    }
    progress.abort();
    if !args.json {
        eprintln!();
    }

    let records = session.results();
    let (image_stats, location_stats) = session.caches().stats();
    tracing::info!(
        records = records.len(),
        image_hit_rate = image_stats.hit_rate(),
        location_hit_rate = location_stats.hit_rate(),
        "search finished"
    );

    let exported = if args.export || args.export_dir.is_some() {
        let dir = args.export_dir.unwrap_or_else(default_export_dir);
        let monochrome = args.monochrome;
        let to_save = records.clone();
        let paths = tokio::task::spawn_blocking(move || {
            to_save.iter().map(|record| save_record(record, &dir, monochrome)).collect::<Result<Vec<_>>>()
        })
        .await??;
        paths.into_iter().map(Some).collect()
    } else {
        vec![None; records.len()]
    };

    let summaries: Vec<RecordSummary<'_>> =
        records.iter().zip(exported).map(|(record, path)| RecordSummary::new(record, path)).collect();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print_table(&summaries);
    }
    Ok(())
}

async fn render_progress(mut rx: broadcast::Receiver<f32>, visible: bool) {
    loop {
        match rx.recv().await {
            Ok(value) => {
                if visible {
                    eprint!("\rfetching {:>3.0}%", value * 100.0);
                }
            },
            Err(broadcast::error::RecvError::Lagged(_)) => {},
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn print_table(summaries: &[RecordSummary<'_>]) {
    if summaries.is_empty() {
        println!("No geotagged photos found.");
        return;
    }
    for summary in summaries {
        let title = if summary.title.is_empty() { "(untitled)" } else { summary.title };
        print!(
            "{:<14} {:>10.5} {:>11.5} {:>5}x{:<5} {}",
            summary.id, summary.latitude, summary.longitude, summary.width, summary.height, title
        );
        match &summary.exported_to {
            Some(path) => println!("  -> {}", path.display()),
            None => println!(),
        }
    }
}
