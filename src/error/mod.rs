use crate::models::Site;
use thiserror::Error;

/// Failures that abort a site's adapter.
#[derive(Debug, Error)]
pub enum ContestError {
    #[error("{site}: contests table not found (selector `{selector}`)")]
    TableNotFound { site: Site, selector: &'static str },

    #[error("{site}: contests table has no data rows")]
    EmptyTable { site: Site },

    #[error("{site}: failed to fetch {url}")]
    UpstreamFetch {
        site: Site,
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{site}: adapter task failed: {reason}")]
    TaskFailed { site: Site, reason: String },

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: &'static str, reason: String },
}

/// Why a single row produced no record. Never fatal: the row is dropped and
/// the caller decides how to report it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("row has no cell {0}")]
    MissingCell(usize),

    #[error("cell {0} has no link")]
    MissingLink(usize),

    #[error("unresolvable link `{0}`")]
    BadLink(String),

    #[error("unparseable start time `{0}`")]
    BadStartTime(String),

    #[error("unparseable end time `{0}`")]
    BadEndTime(String),

    #[error("unparseable duration `{0}`")]
    BadDuration(String),

    #[error("end `{end}` precedes start `{start}`")]
    NegativeDuration { start: String, end: String },
}
