pub mod cleaner;
pub mod http_client;
pub mod parsers;
pub mod sites;

use crate::config::{AppConfig, SitesConfig};
use crate::error::ContestError;
use crate::models::{ContestRecord, Site};
use anyhow::{Context, Result};
use chrono::FixedOffset;
use scraper::Html;
use std::sync::Arc;
use tracing::{info, warn};

use self::cleaner::TimeContext;
use self::http_client::{HttpClient, PageSource};
use self::sites::{spec_for, Extraction};
use crate::utils::Timer;

// ── Contest scraper ───────────────────────────────────────────────────────────

/// Fetches a site's listing page and runs its adapter over it.
pub struct ContestScraper {
    source: Arc<dyn PageSource>,
    sites: SitesConfig,
    display: FixedOffset,
}

impl ContestScraper {
    pub fn new(source: Arc<dyn PageSource>, sites: SitesConfig, display: FixedOffset) -> Self {
        Self { source, sites, display }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = HttpClient::new(&config.http).context("Failed to build scraper")?;
        Ok(Self::new(
            Arc::new(client),
            config.sites.clone(),
            config.display.offset()?,
        ))
    }

    pub fn url_for(&self, site: Site) -> &str {
        match site {
            Site::Codeforces => &self.sites.codeforces_url,
            Site::AtCoder => &self.sites.atcoder_url,
            Site::CodeChef => &self.sites.codechef_url,
        }
    }

    /// Upcoming contests for one site, filtered and sorted.
    pub async fn upcoming(&self, site: Site) -> Result<Vec<ContestRecord>, ContestError> {
        let url = self.url_for(site).to_string();
        info!("Fetching {} contests ({})", site, url);
        let _t = Timer::start(format!("{} request", site.slug()));

        let html = self
            .source
            .get_text(&url)
            .await
            .map_err(|e| ContestError::UpstreamFetch {
                site,
                url,
                source: e.into(),
            })?;

        let ctx = TimeContext::now_in(self.display);
        let extraction = extract_page(site, &html, &ctx)?;
        Ok(report(site, extraction))
    }
}

fn extract_page(site: Site, html: &str, ctx: &TimeContext) -> Result<Extraction, ContestError> {
    let doc = Html::parse_document(html);
    spec_for(site).extract(&doc, ctx)
}

/// Emit one event per dropped row and a per-site summary.
fn report(site: Site, extraction: Extraction) -> Vec<ContestRecord> {
    for (row, reason) in &extraction.dropped {
        warn!(site = site.slug(), row, %reason, "dropped contest row");
    }
    info!(
        "{}: {} upcoming, {} dropped, {} already started",
        site,
        extraction.contests.len(),
        extraction.dropped.len(),
        extraction.expired,
    );
    extraction.contests
}
