use crate::error::RowError;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Every listing is shifted by this much after its source time is resolved.
pub const START_ADJUSTMENT_HOURS: i64 = 3;

/// Canonical display format: "10 March 05:00 PM".
pub const DISPLAY_FORMAT: &str = "%d %B %I:%M %p";

/// The display form carries no year; parsing it back borrows this one.
/// A leap year, so "29 February" always resolves.
pub const SORT_REFERENCE_YEAR: i32 = 2000;

static NON_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-]").expect("valid name regex"));

// ── Time context ──────────────────────────────────────────────────────────────

/// Invocation time plus the fixed-offset zone results are displayed in.
#[derive(Debug, Clone, Copy)]
pub struct TimeContext {
    pub now: DateTime<Utc>,
    pub display: FixedOffset,
}

impl TimeContext {
    pub fn new(now: DateTime<Utc>, display: FixedOffset) -> Self {
        Self { now, display }
    }

    pub fn now_in(display: FixedOffset) -> Self {
        Self::new(Utc::now(), display)
    }
}

/// How a site's start-time text relates to a timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    /// No zone handling at all: the wall clock is shifted and displayed.
    Naive,
    /// The text carries its own UTC offset.
    Embedded,
    /// No offset in the text; it is read as display-zone wall clock.
    Assumed,
}

// ── Names ─────────────────────────────────────────────────────────────────────

/// Remove everything that is not a word character, whitespace or hyphen.
pub fn sanitize_name(s: &str) -> String {
    NON_NAME_CHARS.replace_all(s, "").into_owned()
}

/// Keep the text after the last `brand` occurrence and re-prefix it.
/// "Ⓐ AtCoder Beginner Contest 400" → "AtCoder Beginner Contest 400"
pub fn rebrand(name: &str, brand: &str) -> String {
    let tail = name.rsplit(brand).next().unwrap_or(name).trim();
    format!("{} {}", brand, tail)
}

/// Last non-empty path segment of a link, ignoring query and fragment.
/// "/contests/abc400?lang=en" → "abc400"
pub fn last_path_segment(href: &str) -> String {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

// ── Times ─────────────────────────────────────────────────────────────────────

pub fn parse_naive(s: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    let s = s.trim();
    formats
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
}

pub fn parse_with_offset(s: &str, formats: &[&str]) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    formats
        .iter()
        .find_map(|f| DateTime::parse_from_str(s, f).ok())
}

/// Resolve a source start-time string to the adjusted start instant,
/// expressed in the display zone.
pub fn adjusted_start(
    text: &str,
    source: TimeSource,
    formats: &[&str],
    ctx: &TimeContext,
) -> Option<DateTime<FixedOffset>> {
    let shift = Duration::try_hours(START_ADJUSTMENT_HOURS)?;
    match source {
        TimeSource::Naive => {
            let wall = parse_naive(text, formats)?.checked_add_signed(shift)?;
            ctx.display.from_local_datetime(&wall).single()
        }
        TimeSource::Embedded => {
            let utc = parse_with_offset(text, formats)?
                .with_timezone(&Utc)
                .checked_add_signed(shift)?;
            Some(utc.with_timezone(&ctx.display))
        }
        TimeSource::Assumed => {
            let utc = assumed_instant(text, formats, ctx)?.checked_add_signed(shift)?;
            Some(utc.with_timezone(&ctx.display))
        }
    }
}

/// A naive source timestamp read as display-zone wall clock.
pub fn assumed_instant(text: &str, formats: &[&str], ctx: &TimeContext) -> Option<DateTime<Utc>> {
    let naive = parse_naive(text, formats)?;
    ctx.display
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn format_display(t: &NaiveDateTime) -> String {
    t.format(DISPLAY_FORMAT).to_string()
}

/// Inverse of `format_display`, with the missing year supplied by the caller.
pub fn parse_display(s: &str, year: i32) -> Option<NaiveDateTime> {
    let fmt = format!("{} %Y", DISPLAY_FORMAT);
    NaiveDateTime::parse_from_str(&format!("{} {}", s.trim(), year), &fmt).ok()
}

/// Sort key for a display string; unparseable values sort first.
pub fn display_sort_key(s: &str) -> Option<NaiveDateTime> {
    parse_display(s, SORT_REFERENCE_YEAR)
}

// ── Durations ─────────────────────────────────────────────────────────────────

/// Parse a span like "2:00", "02:30", "1:02:00" or "3.04:00:00".
/// Hours are uncapped so multi-day contests shown as "240:00" still parse;
/// values too large for a `Duration` are rejected.
pub fn parse_span(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (days, rest) = match s.split_once('.') {
        Some((d, rest)) => (d.parse::<i64>().ok()?, rest),
        None => (0, s),
    };

    let parts: Vec<&str> = rest.split(':').collect();
    let nums: Vec<i64> = parts
        .iter()
        .map(|p| {
            if p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()) {
                None
            } else {
                p.parse().ok()
            }
        })
        .collect::<Option<_>>()?;

    let (hours, minutes, seconds) = match nums.as_slice() {
        [h, m] => (*h, *m, 0),
        [h, m, sec] => (*h, *m, *sec),
        _ => return None,
    };
    if minutes >= 60 || seconds >= 60 || days < 0 {
        return None;
    }

    Duration::try_days(days)?
        .checked_add(&Duration::try_hours(hours)?)?
        .checked_add(&Duration::try_minutes(minutes)?)?
        .checked_add(&Duration::try_seconds(seconds)?)
}

/// `end − start` as "HH:MM" total hours and minutes. A negative span is a
/// parse failure.
pub fn span_between(
    start_text: &str,
    end_text: &str,
    formats: &[&str],
    ctx: &TimeContext,
) -> Result<String, RowError> {
    let start = assumed_instant(start_text, formats, ctx)
        .ok_or_else(|| RowError::BadStartTime(start_text.to_string()))?;
    let end = assumed_instant(end_text, formats, ctx)
        .ok_or_else(|| RowError::BadEndTime(end_text.to_string()))?;

    let span = end - start;
    if span < Duration::zero() {
        return Err(RowError::NegativeDuration {
            start: start_text.to_string(),
            end: end_text.to_string(),
        });
    }
    Ok(format_span(span))
}

pub fn format_span(d: Duration) -> String {
    let minutes = d.num_minutes();
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
