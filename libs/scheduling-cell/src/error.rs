use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Why an availability segment was dropped during parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentParseError {
    #[error("Segment does not match 'YYYY-MM-DD HH:MM-HH:MM': '{0}'")]
    Malformed(String),

    #[error("Invalid calendar date in segment '{0}'")]
    InvalidDate(String),

    #[error("Invalid time of day in segment '{0}'")]
    InvalidTime(String),

    #[error("Start {start} is not before end {end}")]
    EmptyRange { start: NaiveTime, end: NaiveTime },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityEditError {
    #[error("Please add at least one valid time slot")]
    Empty,

    #[error("Start time must be before end time ({date} {start}-{end})")]
    InvertedRange { date: NaiveDate, start: NaiveTime, end: NaiveTime },

    #[error("Overlapping slots on {date}")]
    Overlap { date: NaiveDate },

    #[error(transparent)]
    Parse(#[from] SegmentParseError),
}
