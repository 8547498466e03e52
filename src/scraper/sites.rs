//! The three site adapters, expressed as data over one shared pipeline shape.

use crate::error::{ContestError, RowError};
use crate::models::{Candidate, ContestRecord, RawRow, Site};
use crate::pipeline::filter_and_sort;
use crate::scraper::cleaner::{
    adjusted_start, format_display, last_path_segment, parse_span, rebrand, sanitize_name,
    span_between, TimeContext, TimeSource,
};
use crate::scraper::parsers::{locate_table, selector, RowExtractor};
use scraper::Html;
use url::Url;

/// Where a contest id comes from.
#[derive(Debug, Clone, Copy)]
pub enum IdSource {
    /// A `<tr>` attribute; empty when missing.
    RowAttr(&'static str),
    /// Last path segment of the link in the given cell.
    CellLink(usize),
}

/// Whether the listing gives a length or an end time.
#[derive(Debug, Clone, Copy)]
pub enum Timing {
    /// Span text shown as-is after validation.
    Duration { col: usize },
    /// End timestamp; the duration is recomputed from start and end.
    EndTime { col: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct SiteSpec {
    pub site: Site,
    pub url: &'static str,
    pub table_rule: &'static str,
    pub min_cells: usize,
    pub id: IdSource,
    pub name_col: usize,
    /// Brand token names are re-prefixed with.
    pub brand: Option<&'static str>,
    pub start_col: usize,
    pub timing: Timing,
    pub time_formats: &'static [&'static str],
    pub time_source: TimeSource,
    /// Base the name cell's href is resolved against; `None` for no link.
    pub link_base: Option<&'static str>,
    pub future_only: bool,
}

pub const CODEFORCES: SiteSpec = SiteSpec {
    site: Site::Codeforces,
    url: "https://codeforces.com/contests",
    table_rule: "div.datatable table",
    min_cells: 6,
    id: IdSource::RowAttr("data-contestId"),
    name_col: 0,
    brand: None,
    start_col: 2,
    timing: Timing::Duration { col: 3 },
    time_formats: &["%b/%d/%Y %H:%M"],
    time_source: TimeSource::Naive,
    link_base: None,
    future_only: false,
};

pub const ATCODER: SiteSpec = SiteSpec {
    site: Site::AtCoder,
    url: "https://atcoder.jp/contests/",
    table_rule: "div#contest-table-upcoming table",
    min_cells: 4,
    id: IdSource::CellLink(1),
    name_col: 1,
    brand: Some("AtCoder"),
    start_col: 0,
    timing: Timing::Duration { col: 2 },
    time_formats: &["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d %H:%M:%S%:z"],
    time_source: TimeSource::Embedded,
    link_base: Some("https://atcoder.jp"),
    future_only: true,
};

pub const CODECHEF: SiteSpec = SiteSpec {
    site: Site::CodeChef,
    url: "https://www.codechef.com/contests",
    table_rule: "div[class*='future-contests'] table[class*='dataTable']",
    min_cells: 4,
    id: IdSource::CellLink(1),
    name_col: 1,
    brand: None,
    start_col: 2,
    timing: Timing::EndTime { col: 3 },
    time_formats: &["%d %b %Y %H:%M"],
    time_source: TimeSource::Assumed,
    link_base: Some("https://www.codechef.com"),
    future_only: true,
};

pub fn spec_for(site: Site) -> &'static SiteSpec {
    match site {
        Site::Codeforces => &CODEFORCES,
        Site::AtCoder => &ATCODER,
        Site::CodeChef => &CODECHEF,
    }
}

/// Outcome of one adapter run.
#[derive(Debug, Default)]
pub struct Extraction {
    pub contests: Vec<ContestRecord>,
    /// Rows that produced no record, in page order (1-based data row index).
    pub dropped: Vec<(usize, RowError)>,
    /// Records removed by the future-only filter.
    pub expired: usize,
}

impl SiteSpec {
    /// Locate → extract → normalize → filter/sort for an already-parsed page.
    pub fn extract(&self, doc: &Html, ctx: &TimeContext) -> Result<Extraction, ContestError> {
        let rule = selector(self.table_rule)?;
        let table = locate_table(doc, &rule).ok_or(ContestError::TableNotFound {
            site: self.site,
            selector: self.table_rule,
        })?;

        let extractor = RowExtractor::new()?;
        if extractor.data_rows(table).next().is_none() {
            return Err(ContestError::EmptyTable { site: self.site });
        }

        let mut candidates = Vec::new();
        let mut dropped = Vec::new();
        for (index, row) in extractor.rows(table, self.min_cells) {
            match self.normalize(&row, ctx) {
                Ok(c) => candidates.push(c),
                Err(e) => dropped.push((index, e)),
            }
        }

        let kept = candidates.len();
        let future_only = self.future_only.then_some(ctx.now);
        let contests = filter_and_sort(candidates, future_only);

        Ok(Extraction {
            expired: kept - contests.len(),
            contests,
            dropped,
        })
    }

    /// Build the record for one raw row.
    pub fn normalize(&self, row: &RawRow, ctx: &TimeContext) -> Result<Candidate, RowError> {
        let cell = move |idx: usize| row.cell(idx).ok_or(RowError::MissingCell(idx));

        let id = match self.id {
            IdSource::RowAttr(name) => row.attr(name).unwrap_or_default().to_string(),
            IdSource::CellLink(idx) => {
                let href = cell(idx)?.href.as_deref().ok_or(RowError::MissingLink(idx))?;
                last_path_segment(href)
            }
        };

        let name_cell = cell(self.name_col)?;
        let mut name = sanitize_name(&name_cell.text).trim().to_string();
        if let Some(brand) = self.brand {
            name = rebrand(&name, brand);
        }

        let start_text = cell(self.start_col)?.text.as_str();
        let starts_at = adjusted_start(start_text, self.time_source, self.time_formats, ctx)
            .ok_or_else(|| RowError::BadStartTime(start_text.to_string()))?;

        let duration = match self.timing {
            Timing::Duration { col } => {
                let text = cell(col)?.text.as_str();
                parse_span(text).ok_or_else(|| RowError::BadDuration(text.to_string()))?;
                text.to_string()
            }
            Timing::EndTime { col } => {
                span_between(start_text, &cell(col)?.text, self.time_formats, ctx)?
            }
        };

        let link = match self.link_base {
            Some(base) => {
                let href = name_cell
                    .href
                    .as_deref()
                    .ok_or(RowError::MissingLink(self.name_col))?;
                Some(resolve_link(base, href)?)
            }
            None => None,
        };

        Ok(Candidate {
            record: ContestRecord {
                id,
                name,
                start_time: format_display(&starts_at.naive_local()),
                duration,
                link,
            },
            starts_at,
        })
    }
}

fn resolve_link(base: &str, href: &str) -> Result<String, RowError> {
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(String::from)
        .map_err(|_| RowError::BadLink(href.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::cleaner::display_sort_key;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn ctx() -> TimeContext {
        TimeContext::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            FixedOffset::east_opt(0).unwrap(),
        )
    }

    const CODEFORCES_PAGE: &str = r#"
      <div class="datatable"><table>
        <tr><th>Name</th><th>Writers</th><th>Start</th><th>Length</th><th></th><th></th></tr>
        <tr data-contestId="2077">
          <td>Div. 2 Round</td><td>tourist</td>
          <td><a href="https://www.timeanddate.com/x"><span class="format-time">Mar/10/2025 14:00</span></a></td>
          <td>02:00</td><td>Before start</td><td>Register &raquo;</td>
        </tr>
        <tr data-contestId="2078">
          <td>Educational Round 170</td><td>awoo</td><td>Mar/08/2025 09:35</td>
          <td>2:00</td><td></td><td></td>
        </tr>
        <tr data-contestId="2079">
          <td>Broken Round</td><td>x</td><td>TBA</td><td>2:00</td><td></td><td></td>
        </tr>
        <tr><td colspan="6">Sponsored</td></tr>
      </table></div>
      <div class="datatable"><table><tr><th>Past</th></tr>
        <tr data-contestId="1"><td>Old</td><td></td><td>Jan/01/2020 10:00</td><td>2:00</td><td></td><td></td></tr>
      </table></div>
    "#;

    const ATCODER_PAGE: &str = r##"
      <div id="contest-table-active"><table><tr><th>x</th></tr></table></div>
      <div id="contest-table-upcoming"><h3>Upcoming Contests</h3>
        <div class="table-responsive"><table class="table">
          <thead><tr><th>Start Time</th><th>Contest Name</th><th>Duration</th><th>Rated</th></tr></thead>
          <tbody>
            <tr>
              <td><a href="http://www.timeanddate.com/worldclock/fixedtime.html?iso=20250322T2100&p1=248">
                <time class="fixtime">2025-03-22 21:00:00+0900</time></a></td>
              <td><span>Ⓐ</span> <a href="/contests/abc398">AtCoder Beginner Contest 398</a></td>
              <td>01:40</td><td>- 1999</td>
            </tr>
            <tr>
              <td><a href="#"><time>2025-03-15 21:00:00+0900</time></a></td>
              <td><a href="/contests/arc194">Promo AtCoder junk AtCoder Regular Contest 194 (Div. 1)</a></td>
              <td>02:00</td><td>1600 - 2999</td>
            </tr>
            <tr>
              <td><time>2025-02-28 21:00:00+0900</time></td>
              <td><a href="/contests/abc396">AtCoder Beginner Contest 396</a></td>
              <td>01:40</td><td>- 1999</td>
            </tr>
            <tr>
              <td><time>2025-03-29 21:00:00+0900</time></td>
              <td><a href="/contests/ahc045">AtCoder Heuristic Contest 045</a></td>
              <td>about a week</td><td>All</td>
            </tr>
          </tbody>
        </table></div>
      </div>
    "##;

    const CODECHEF_PAGE: &str = r#"
      <div class="past-contests"><table class="dataTable"><tr><th>x</th></tr></table></div>
      <div class="content-wrapper future-contests"><table class="dataTable no-footer">
        <tr><th>Code</th><th>Name</th><th>Start</th><th>End</th></tr>
        <tr><td>START180</td><td><a href="/START180">Starters 180 ★</a></td>
            <td>05 Mar 2025 14:30</td><td>05 Mar 2025 16:30</td></tr>
        <tr><td>COOK01</td><td><a href="/COOK01/">Cook-Off #1</a></td>
            <td>01 Mar 2025 10:00</td><td>01 Mar 2025 12:30</td></tr>
        <tr><td>BAD</td><td><a href="/BAD">Backwards Cup</a></td>
            <td>02 Mar 2025 12:30</td><td>02 Mar 2025 10:00</td></tr>
        <tr><td>OLD</td><td><a href="/OLD">Yesterday Lunchtime</a></td>
            <td>27 Feb 2025 10:00</td><td>27 Feb 2025 13:00</td></tr>
        <tr><td>NOLINK</td><td>Mystery Contest</td>
            <td>03 Mar 2025 10:00</td><td>03 Mar 2025 12:00</td></tr>
      </table></div>
    "#;

    fn run(spec: &SiteSpec, page: &str) -> Result<Extraction, ContestError> {
        spec.extract(&Html::parse_document(page), &ctx())
    }

    fn assert_sorted(contests: &[ContestRecord]) {
        for pair in contests.windows(2) {
            assert!(display_sort_key(&pair[0].start_time) <= display_sort_key(&pair[1].start_time));
        }
    }

    #[test]
    fn test_codeforces_adapter() {
        let out = run(&CODEFORCES, CODEFORCES_PAGE).unwrap();
        assert_eq!(out.contests.len(), 2);
        assert_sorted(&out.contests);

        let edu = &out.contests[0];
        assert_eq!(edu.id, "2078");
        assert_eq!(edu.start_time, "08 March 12:35 PM");

        let div2 = &out.contests[1];
        assert_eq!(
            div2,
            &ContestRecord {
                id: "2077".into(),
                name: "Div 2 Round".into(),
                start_time: "10 March 05:00 PM".into(),
                duration: "02:00".into(),
                link: None,
            }
        );

        assert_eq!(out.dropped, vec![(3, RowError::BadStartTime("TBA".into()))]);
        assert_eq!(out.expired, 0);
    }

    #[test]
    fn test_codeforces_keeps_past_contests() {
        let now_late = TimeContext::new(
            Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            FixedOffset::east_opt(0).unwrap(),
        );
        let out = CODEFORCES
            .extract(&Html::parse_document(CODEFORCES_PAGE), &now_late)
            .unwrap();
        assert_eq!(out.contests.len(), 2);
    }

    #[test]
    fn test_atcoder_adapter() {
        let out = run(&ATCODER, ATCODER_PAGE).unwrap();
        assert_sorted(&out.contests);

        let names: Vec<&str> = out.contests.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["AtCoder Regular Contest 194 Div 1", "AtCoder Beginner Contest 398"]
        );

        let abc = &out.contests[1];
        assert_eq!(abc.id, "abc398");
        assert_eq!(abc.start_time, "22 March 03:00 PM");
        assert_eq!(abc.duration, "01:40");
        assert_eq!(abc.link.as_deref(), Some("https://atcoder.jp/contests/abc398"));

        // 28 Feb 21:00 JST + 3h is still before the invocation time
        assert_eq!(out.expired, 1);
        assert_eq!(out.dropped, vec![(4, RowError::BadDuration("about a week".into()))]);
    }

    #[test]
    fn test_codechef_adapter() {
        let out = run(&CODECHEF, CODECHEF_PAGE).unwrap();
        assert_sorted(&out.contests);

        assert_eq!(out.contests.len(), 2);
        let cook = &out.contests[0];
        assert_eq!(cook.id, "COOK01");
        assert_eq!(cook.name, "Cook-Off 1");
        assert_eq!(cook.start_time, "01 March 01:00 PM");
        assert_eq!(cook.duration, "02:30");
        assert_eq!(cook.link.as_deref(), Some("https://www.codechef.com/COOK01/"));

        let starters = &out.contests[1];
        assert_eq!(starters.name, "Starters 180");
        assert_eq!(starters.duration, "02:00");

        assert_eq!(out.expired, 1);
        assert_eq!(out.dropped.len(), 2);
        assert!(matches!(out.dropped[0].1, RowError::NegativeDuration { .. }));
        assert_eq!(out.dropped[1].1, RowError::MissingLink(1));
    }

    #[test]
    fn test_future_filter_is_strict() {
        for c in run(&CODECHEF, CODECHEF_PAGE).unwrap().contests {
            let starts = display_sort_key(&c.start_time).unwrap();
            assert!(starts > display_sort_key("01 March 12:00 AM").unwrap());
        }
    }

    #[test]
    fn test_table_not_found_is_fatal() {
        for spec in [&CODEFORCES, &ATCODER, &CODECHEF] {
            let err = run(spec, "<html><body><table><tr><td>x</td></tr></table></body></html>")
                .unwrap_err();
            assert!(matches!(err, ContestError::TableNotFound { site, .. } if site == spec.site));
        }
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let page = r#"<div id="contest-table-upcoming"><table>
            <tr><th>Start Time</th><th>Contest Name</th></tr></table></div>"#;
        let err = run(&ATCODER, page).unwrap_err();
        assert!(matches!(err, ContestError::EmptyTable { site: Site::AtCoder }));
    }

    #[test]
    fn test_short_rows_never_produce_records() {
        let page = r#"<div class="datatable"><table>
            <tr><th>Name</th></tr>
            <tr data-contestId="9"><td>Round 9</td><td></td><td>Mar/10/2025 14:00</td><td>2:00</td><td></td></tr>
        </table></div>"#;
        let out = run(&CODEFORCES, page).unwrap();
        assert!(out.contests.is_empty());
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn test_dropped_rows_keep_their_page_position() {
        let page = r#"<div class="datatable"><table>
            <tr><th>Name</th></tr>
            <tr><td colspan="6">Sponsored</td></tr>
            <tr data-contestId="10"><td>Round 10</td><td></td><td>Mar/10/2025 14:00</td><td>2:00</td><td></td><td></td></tr>
            <tr data-contestId="11"><td>Round 11</td><td></td><td>someday</td><td>2:00</td><td></td><td></td></tr>
        </table></div>"#;
        let out = run(&CODEFORCES, page).unwrap();
        assert_eq!(out.contests.len(), 1);
        assert_eq!(out.dropped, vec![(3, RowError::BadStartTime("someday".into()))]);
    }

    #[test]
    fn test_garbled_duration_drops_only_that_row() {
        let page = r#"<div class="datatable"><table>
            <tr><th>Name</th></tr>
            <tr data-contestId="12"><td>Round 12</td><td></td><td>Mar/10/2025 14:00</td><td>99999999999999999:00</td><td></td><td></td></tr>
            <tr data-contestId="13"><td>Round 13</td><td></td><td>Mar/11/2025 14:00</td><td>2:00</td><td></td><td></td></tr>
        </table></div>"#;
        let out = run(&CODEFORCES, page).unwrap();
        assert_eq!(out.contests.len(), 1);
        assert_eq!(out.contests[0].id, "13");
        assert_eq!(
            out.dropped,
            vec![(1, RowError::BadDuration("99999999999999999:00".into()))]
        );
    }

    #[test]
    fn test_spec_for() {
        for site in Site::ALL {
            assert_eq!(spec_for(site).site, site);
        }
    }
}
