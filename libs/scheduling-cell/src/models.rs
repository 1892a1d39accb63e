use std::collections::HashSet;
use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use shared_models::{Appointment, WIRE_TIMESTAMP_FORMAT};

use crate::error::SegmentParseError;

pub const DEFAULT_SLOT_MINUTES: u32 = 15;
pub const SLOT_KEY_FORMAT: &str = "%Y-%m-%dT%H:%M";
pub const SEGMENT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const SEGMENT_TIME_FORMAT: &str = "%H:%M";

const SLOT_KEY_LEN: usize = 16;
const DATE_PREFIX_LEN: usize = 10;

/// One contiguous range of a doctor's availability on a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AvailabilitySegment {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl AvailabilitySegment {
    pub fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Result<Self, SegmentParseError> {
        if start_time >= end_time {
            return Err(SegmentParseError::EmptyRange { start: start_time, end: end_time });
        }

        Ok(Self { date, start_time, end_time })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    pub fn end(&self) -> NaiveDateTime {
        self.date.and_time(self.end_time)
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// End-exclusive overlap on the same date; touching ranges do not overlap.
    pub fn overlaps(&self, other: &AvailabilitySegment) -> bool {
        self.date == other.date
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}

impl fmt::Display for AvailabilitySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{}",
            self.date.format(SEGMENT_DATE_FORMAT),
            self.start_time.format(SEGMENT_TIME_FORMAT),
            self.end_time.format(SEGMENT_TIME_FORMAT),
        )
    }
}

/// Canonical `yyyy-mm-ddThh:mm` identifier of a slot or an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotKey(String);

impl SlotKey {
    pub fn from_start(start: NaiveDateTime) -> Self {
        SlotKey(start.format(SLOT_KEY_FORMAT).to_string())
    }

    /// Normalizes a server timestamp (`YYYY-MM-DD HH:MM[:SS]` or
    /// `YYYY-MM-DDTHH:MM[:SS]`) to minute granularity. Seconds are dropped.
    pub fn from_timestamp(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let iso_like = if raw.contains('T') {
            raw.to_string()
        } else {
            raw.replacen(' ', "T", 1)
        };

        iso_like.get(..SLOT_KEY_LEN).map(|key| SlotKey(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn date_prefix(&self) -> &str {
        self.0.get(..DATE_PREFIX_LEN).unwrap_or(&self.0)
    }

    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.date_prefix() == date.format(SEGMENT_DATE_FORMAT).to_string()
    }

    pub fn to_start(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.0, SLOT_KEY_FORMAT).ok()
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fixed-width bookable interval `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub label: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub key: SlotKey,
    pub disabled: bool,
    pub taken: bool,
}

impl Slot {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            label: format!(
                "{} - {}",
                start.format(SEGMENT_TIME_FORMAT),
                end.format(SEGMENT_TIME_FORMAT)
            ),
            start,
            end,
            key: SlotKey::from_start(start),
            disabled: false,
            taken: false,
        }
    }

    pub fn is_selectable(&self) -> bool {
        !self.disabled
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Start instant at second precision, as the booking endpoint expects it.
    pub fn wire_time(&self) -> String {
        self.start.format(WIRE_TIMESTAMP_FORMAT).to_string()
    }
}

/// Keys of the slots already booked for one doctor on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakenSlotSet {
    date: NaiveDate,
    keys: HashSet<SlotKey>,
}

impl TakenSlotSet {
    pub fn empty(date: NaiveDate) -> Self {
        Self { date, keys: HashSet::new() }
    }

    /// Keeps only appointments whose normalized key falls on `date`.
    pub fn from_appointments(date: NaiveDate, appointments: &[Appointment]) -> Self {
        let keys = appointments
            .iter()
            .filter_map(|appointment| appointment.timestamp())
            .filter_map(SlotKey::from_timestamp)
            .filter(|key| key.is_on(date))
            .collect();

        Self { date, keys }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Records a key learned outside a fetch, e.g. from a rejected booking.
    pub fn insert(&mut self, key: SlotKey) -> bool {
        key.is_on(self.date) && self.keys.insert(key)
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
