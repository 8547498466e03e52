use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Site ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Codeforces,
    #[value(name = "atcoder")]
    AtCoder,
    #[value(name = "codechef")]
    CodeChef,
}

impl Site {
    pub const ALL: [Site; 3] = [Site::Codeforces, Site::AtCoder, Site::CodeChef];

    pub fn slug(self) -> &'static str {
        match self {
            Site::Codeforces => "codeforces",
            Site::AtCoder => "atcoder",
            Site::CodeChef => "codechef",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Site::Codeforces => "Codeforces",
            Site::AtCoder => "AtCoder",
            Site::CodeChef => "CodeChef",
        })
    }
}

// ── Contest record ────────────────────────────────────────────────────────────

/// One upcoming contest as handed back to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContestRecord {
    pub id: String,
    pub name: String,
    /// Canonical display form, e.g. "10 March 05:00 PM".
    pub start_time: String,
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A normalized record together with the adjusted start instant the
/// future-only filter compares against.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub record: ContestRecord,
    pub starts_at: DateTime<FixedOffset>,
}

// ── Raw rows ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCell {
    /// Inner text, whitespace-collapsed.
    pub text: String,
    /// `href` of the first anchor inside the cell.
    pub href: Option<String>,
}

/// Cells of one `<tr>`, plus the row attributes a site may key on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub cells: Vec<RawCell>,
    pub attrs: Vec<(String, String)>,
}

impl RawRow {
    pub fn cell(&self, idx: usize) -> Option<&RawCell> {
        self.cells.get(idx)
    }

    /// Attribute lookup; html5ever lowercases names so the key is compared
    /// case-insensitively.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
