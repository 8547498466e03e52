//! Filter/sort stage plus the orchestrator that runs every site adapter.
//!
//! `filter_and_sort()` is the last stage of each adapter: it applies the
//! optional future-only predicate and orders records by their displayed
//! start time.
//!
//! `Pipeline::run()` fans out one task per site. Sites share nothing, so a
//! failure in one never touches the others' results.

use crate::error::ContestError;
use crate::models::{Candidate, ContestRecord, Site};
use crate::scraper::cleaner::display_sort_key;
use crate::scraper::ContestScraper;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Drop candidates not strictly after `future_after` (when given), then sort
/// ascending by the start time parsed back from its display form. The sort
/// is stable, so equal start times keep row order.
pub fn filter_and_sort(
    candidates: Vec<Candidate>,
    future_after: Option<DateTime<Utc>>,
) -> Vec<ContestRecord> {
    let mut records: Vec<ContestRecord> = candidates
        .into_iter()
        .filter(|c| future_after.is_none_or(|now| c.starts_at > now))
        .map(|c| c.record)
        .collect();

    records.sort_by_cached_key(|r| display_sort_key(&r.start_time));
    records
}

pub type SiteOutcome = (Site, Result<Vec<ContestRecord>, ContestError>);

pub struct Pipeline {
    scraper: Arc<ContestScraper>,
}

impl Pipeline {
    pub fn new(scraper: Arc<ContestScraper>) -> Self {
        Self { scraper }
    }

    pub async fn run(&self, sites: &[Site]) -> (Vec<SiteOutcome>, PipelineStats) {
        let mut handles = Vec::new();

        for &site in sites {
            let scraper = Arc::clone(&self.scraper);
            let handle = tokio::spawn(async move { scraper.upcoming(site).await });
            handles.push((site, handle));
        }

        let mut outcomes = Vec::new();
        let mut stats = PipelineStats::default();

        for (site, handle) in handles {
            match handle.await {
                Ok(Ok(contests)) => {
                    stats.sites_ok += 1;
                    stats.contests += contests.len();
                    outcomes.push((site, Ok(contests)));
                }
                Ok(Err(e)) => {
                    warn!("{}", DisplayChain(&e));
                    stats.sites_failed += 1;
                    outcomes.push((site, Err(e)));
                }
                Err(e) => {
                    error!("Task panic for {}: {}", site, e);
                    stats.sites_failed += 1;
                    let reason = e.to_string();
                    outcomes.push((site, Err(ContestError::TaskFailed { site, reason })));
                }
            }
        }

        info!(
            "=== Done: {} sites ok | {} failed | {} contests ===",
            stats.sites_ok, stats.sites_failed, stats.contests
        );

        (outcomes, stats)
    }
}

/// Renders an error with its `source()` chain on one line.
struct DisplayChain<'a>(&'a ContestError);

impl std::fmt::Display for DisplayChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = std::error::Error::source(self.0);
        while let Some(cause) = source {
            write!(f, ": {}", cause)?;
            source = cause.source();
        }
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub sites_ok: usize,
    pub sites_failed: usize,
    pub contests: usize,
}
