//! Table location and row extraction over an already-parsed document.

use crate::error::ContestError;
use crate::models::{RawCell, RawRow};
use scraper::{ElementRef, Html, Selector};

pub fn selector(css: &'static str) -> Result<Selector, ContestError> {
    Selector::parse(css).map_err(|e| ContestError::InvalidSelector {
        selector: css,
        reason: format!("{:?}", e),
    })
}

/// Collapse runs of whitespace (including the newlines html indentation
/// leaves inside cells) to single spaces.
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Table locator ─────────────────────────────────────────────────────────────

/// First element matching `rule`, or `None` when the page has no such table.
pub fn locate_table<'a>(doc: &'a Html, rule: &Selector) -> Option<ElementRef<'a>> {
    doc.select(rule).next()
}

// ── Row extractor ─────────────────────────────────────────────────────────────

pub struct RowExtractor {
    tr: Selector,
    td: Selector,
    a: Selector,
}

impl RowExtractor {
    pub fn new() -> Result<Self, ContestError> {
        Ok(Self {
            tr: selector("tr")?,
            td: selector("td")?,
            a: selector("a")?,
        })
    }

    /// Every `<tr>` under the table except the header row.
    pub fn data_rows<'a>(&'a self, table: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        table.select(&self.tr).skip(1)
    }

    /// Lazily yields `(index, row)` for every data row carrying at least
    /// `min_cells` cells; `index` is the 1-based position among all data
    /// rows, so it still points at the page row after short rows (ads,
    /// section summaries) are skipped.
    pub fn rows<'a>(
        &'a self,
        table: ElementRef<'a>,
        min_cells: usize,
    ) -> impl Iterator<Item = (usize, RawRow)> + 'a {
        self.data_rows(table)
            .enumerate()
            .map(move |(i, tr)| (i + 1, self.raw_row(tr)))
            .filter(move |(_, row)| row.cells.len() >= min_cells)
    }

    fn raw_row(&self, tr: ElementRef<'_>) -> RawRow {
        let cells = tr
            .select(&self.td)
            .map(|td| RawCell {
                text: clean_text(&td.text().collect::<String>()),
                href: td
                    .select(&self.a)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(|h| h.trim().to_string()),
            })
            .collect();

        let attrs = tr
            .value()
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        RawRow { cells, attrs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="datatable past"><table><tr><th>Old</th></tr>
            <tr><td>past</td><td>x</td></tr></table></div>
          <div id="upcoming"><table>
            <tr><th>Name</th><th>When</th><th>Length</th></tr>
            <tr data-contestId="7"><td><a href="/c/7">Round
                  7</a></td><td>Mar/10/2025 14:00</td><td>2:00</td></tr>
            <tr><td colspan="3">advert</td></tr>
            <tr data-contestId="8"><td>Round 8</td><td>Mar/11/2025 14:00</td><td>2:30</td></tr>
          </table></div>
        </body></html>
    "#;

    #[test]
    fn test_locate_table_picks_the_scoped_table() {
        let doc = Html::parse_document(PAGE);
        let rule = selector("div#upcoming table").unwrap();
        let table = locate_table(&doc, &rule).expect("table");
        assert!(table.text().collect::<String>().contains("Round 8"));

        let missing = selector("div#nothing table").unwrap();
        assert!(locate_table(&doc, &missing).is_none());
    }

    #[test]
    fn test_rows_skip_header_and_short_rows() {
        let doc = Html::parse_document(PAGE);
        let rule = selector("div#upcoming table").unwrap();
        let table = locate_table(&doc, &rule).unwrap();
        let ex = RowExtractor::new().unwrap();

        assert_eq!(ex.data_rows(table).count(), 3);

        let (indices, rows): (Vec<usize>, Vec<RawRow>) = ex.rows(table, 3).unzip();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells[0].text, "Round 7");
        assert_eq!(rows[0].cells[0].href.as_deref(), Some("/c/7"));
        assert_eq!(rows[0].attr("data-contestId"), Some("7"));
        assert_eq!(rows[1].cells[2].text, "2:30");
        assert!(rows[1].cells[0].href.is_none());
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  a\n   b\tc "), "a b c");
        assert_eq!(clean_text(""), "");
    }
}
