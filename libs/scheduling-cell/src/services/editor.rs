use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::error::AvailabilityEditError;
use crate::models::AvailabilitySegment;
use crate::services::parser::AvailabilityParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityRow {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Doctor-side builder for the availability text the slot engine reads.
#[derive(Debug, Default, Clone)]
pub struct AvailabilityEditor {
    rows: Vec<AvailabilityRow>,
}

impl AvailabilityEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the editor from already published text; unparsable parts are skipped.
    pub fn from_text(text: &str) -> Self {
        let rows = AvailabilityParser::new()
            .parse(text)
            .into_iter()
            .map(|segment| AvailabilityRow {
                date: segment.date,
                start_time: segment.start_time,
                end_time: segment.end_time,
            })
            .collect();

        Self { rows }
    }

    pub fn add_row(&mut self, date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) {
        self.rows.push(AvailabilityRow { date, start_time, end_time });
    }

    /// Adds a `YYYY-MM-DD HH:MM-HH:MM` row; the text must parse on its own.
    pub fn add_text_row(&mut self, raw: &str) -> Result<(), AvailabilityEditError> {
        let segment = AvailabilityParser::new().parse_segment(raw)?;
        self.add_row(segment.date, segment.start_time, segment.end_time);
        Ok(())
    }

    pub fn remove_row(&mut self, index: usize) -> Option<AvailabilityRow> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    pub fn rows(&self) -> &[AvailabilityRow] {
        &self.rows
    }

    /// Segments sorted by date then start time, or the first problem found.
    pub fn validate(&self) -> Result<Vec<AvailabilitySegment>, AvailabilityEditError> {
        if self.rows.is_empty() {
            return Err(AvailabilityEditError::Empty);
        }

        let mut by_date: BTreeMap<NaiveDate, Vec<AvailabilitySegment>> = BTreeMap::new();
        for row in &self.rows {
            let segment = AvailabilitySegment::new(row.date, row.start_time, row.end_time)
                .map_err(|_| AvailabilityEditError::InvertedRange {
                    date: row.date,
                    start: row.start_time,
                    end: row.end_time,
                })?;
            by_date.entry(row.date).or_default().push(segment);
        }

        let mut segments = Vec::with_capacity(self.rows.len());
        for (date, mut day) in by_date {
            day.sort_by_key(|segment| segment.start_time);

            if day.windows(2).any(|pair| pair[1].start_time < pair[0].end_time) {
                return Err(AvailabilityEditError::Overlap { date });
            }

            segments.extend(day);
        }

        Ok(segments)
    }

    /// Wire text, e.g. `"2026-01-24 09:00-12:00; 2026-01-25 14:00-16:00"`.
    pub fn render(&self) -> Result<String, AvailabilityEditError> {
        let segments = self.validate()?;
        let text = AvailabilityParser::new().format(&segments);
        debug!("Rendered {} availability rows", segments.len());
        Ok(text)
    }
}
