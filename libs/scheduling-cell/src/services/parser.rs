use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::SegmentParseError;
use crate::models::{AvailabilitySegment, SEGMENT_DATE_FORMAT, SEGMENT_TIME_FORMAT};

static SEGMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})\s+(\d{2}:\d{2})-(\d{2}:\d{2})$").unwrap()
});

const SEGMENT_SEPARATOR: char = ';';

/// Reads a doctor's free-text availability, `"YYYY-MM-DD HH:MM-HH:MM; ..."`.
///
/// Malformed segments are logged and skipped; parsing never fails as a whole.
#[derive(Debug, Default, Clone, Copy)]
pub struct AvailabilityParser;

impl AvailabilityParser {
    pub fn new() -> Self {
        Self
    }

    /// Segments in parse order, which is not necessarily chronological.
    pub fn parse(&self, text: &str) -> Vec<AvailabilitySegment> {
        let segments: Vec<AvailabilitySegment> = text
            .split(SEGMENT_SEPARATOR)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(|part| match self.parse_segment(part) {
                Ok(segment) => Some(segment),
                Err(e) => {
                    warn!("Dropping availability segment: {}", e);
                    None
                }
            })
            .collect();

        debug!("Parsed {} availability segments", segments.len());
        segments
    }

    pub fn parse_for_date(&self, text: &str, date: NaiveDate) -> Vec<AvailabilitySegment> {
        self.parse(text)
            .into_iter()
            .filter(|segment| segment.date == date)
            .collect()
    }

    pub fn parse_segment(&self, raw: &str) -> Result<AvailabilitySegment, SegmentParseError> {
        let raw = raw.trim();
        let captures = SEGMENT_PATTERN
            .captures(raw)
            .ok_or_else(|| SegmentParseError::Malformed(raw.to_string()))?;

        let date = NaiveDate::parse_from_str(&captures[1], SEGMENT_DATE_FORMAT)
            .map_err(|_| SegmentParseError::InvalidDate(raw.to_string()))?;
        let start = NaiveTime::parse_from_str(&captures[2], SEGMENT_TIME_FORMAT)
            .map_err(|_| SegmentParseError::InvalidTime(raw.to_string()))?;
        let end = NaiveTime::parse_from_str(&captures[3], SEGMENT_TIME_FORMAT)
            .map_err(|_| SegmentParseError::InvalidTime(raw.to_string()))?;

        AvailabilitySegment::new(date, start, end)
    }

    /// Inverse of [`parse`](Self::parse): `"; "`-joined segments.
    pub fn format(&self, segments: &[AvailabilitySegment]) -> String {
        segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
