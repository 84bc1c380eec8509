//! Suggestion request extraction from free-text log lines.

use crate::constants::EPOCH_SECONDS_DIGITS;
use crate::metrics::ExtractMetrics;
use crate::pipeline::ingestion::log_reader::LogMessage;
use crate::types::{QueryParams, RequestEvent};
use chrono::{DateTime, Local, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

static REQUEST_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"GET /suggest/",
        r"(?P<dataset_id>(?:alpha|bravo)\.[0-9]+)/",
        r"(?P<pub_stage>[A-Za-z0-9]+)/",
        r"(?P<column_id>[0-9a-z]{4}-[0-9a-z]{4})",
        r"(\?(?P<query_params>[^ ]+))?",
    ))
    .expect("request path pattern compiles")
});

/// Why a log record produced no request event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SkipReason {
    /// `_raw` or `_messagetime` missing or empty
    MissingFields,
    /// `_messagetime` does not start with an epoch-seconds integer
    InvalidTimestamp,
    /// The line is not a suggestion request
    NoRequestMatch,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingFields => "missing_fields",
            SkipReason::InvalidTimestamp => "invalid_timestamp",
            SkipReason::NoRequestMatch => "no_request_match",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Event(RequestEvent),
    Skip(SkipReason),
}

impl Extraction {
    pub fn event(self) -> Option<RequestEvent> {
        match self {
            Extraction::Event(event) => Some(event),
            Extraction::Skip(_) => None,
        }
    }
}

/// Convert a `_messagetime` value to a local datetime.
///
/// Only the first ten characters are read as epoch seconds; anything after is
/// sub-second padding and is dropped, not rounded.
pub fn decode_message_time(message_time: &str) -> Option<DateTime<Local>> {
    let seconds: String = message_time.chars().take(EPOCH_SECONDS_DIGITS).collect();
    let seconds = seconds.trim().parse::<i64>().ok()?;
    Local.timestamp_opt(seconds, 0).single()
}

/// Decode a URL query string into parameter name -> values.
///
/// Pairs with an empty value (including bare keys) are dropped; repeated keys
/// keep their values in order.
pub fn parse_query_string(query: &str) -> QueryParams {
    let mut params = QueryParams::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    params
}

/// Extract a request event from one raw log line and its `_messagetime`.
pub fn extract(raw: &str, message_time: &str) -> Extraction {
    if raw.is_empty() || message_time.is_empty() {
        return Extraction::Skip(SkipReason::MissingFields);
    }
    let Some(timestamp) = decode_message_time(message_time) else {
        return Extraction::Skip(SkipReason::InvalidTimestamp);
    };
    let Some(caps) = REQUEST_PATH_RE.captures(raw) else {
        return Extraction::Skip(SkipReason::NoRequestMatch);
    };

    let query_params = caps
        .name("query_params")
        .map(|m| parse_query_string(m.as_str()))
        .unwrap_or_default();

    Extraction::Event(RequestEvent {
        timestamp,
        dataset_id: caps["dataset_id"].to_string(),
        publication_stage: caps["pub_stage"].to_string(),
        query_params,
    })
}

/// Extract from an exported log record, logging a warning for every skip.
pub fn extract_message(message: &LogMessage) -> Extraction {
    let (raw, message_time) = match (message.raw.as_deref(), message.message_time.as_deref()) {
        (Some(raw), Some(time)) if !raw.is_empty() && !time.is_empty() => (raw, time),
        _ => {
            warn!(
                "Skipping record with no _raw field and no _messagetime field: {:?}",
                message
            );
            ExtractMetrics::record_skip(SkipReason::MissingFields.as_str());
            return Extraction::Skip(SkipReason::MissingFields);
        }
    };

    let extraction = extract(raw, message_time);
    match &extraction {
        Extraction::Event(_) => ExtractMetrics::record_event(),
        Extraction::Skip(reason) => {
            match reason {
                SkipReason::InvalidTimestamp => warn!(
                    "Skipping record with unparseable _messagetime {:?}: {}",
                    message_time, raw
                ),
                _ => warn!("Skipping record that doesn't match request pattern: {}", raw),
            }
            ExtractMetrics::record_skip(reason.as_str());
        }
    }
    extraction
}

/// Events extracted from a batch of log records plus skip counts
#[derive(Debug, Default)]
pub struct ExtractionSummary {
    pub records_read: usize,
    pub events: Vec<RequestEvent>,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl ExtractionSummary {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

pub fn extract_all<'a, I>(messages: I) -> ExtractionSummary
where
    I: IntoIterator<Item = &'a LogMessage>,
{
    let mut summary = ExtractionSummary::default();
    for message in messages {
        summary.records_read += 1;
        match extract_message(message) {
            Extraction::Event(event) => summary.events.push(event),
            Extraction::Skip(reason) => *summary.skipped.entry(reason).or_default() += 1,
        }
    }
    summary
}
