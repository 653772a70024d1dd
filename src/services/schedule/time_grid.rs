//! The day's 96 quarter-hour rows, in display order.
//!
//! Rows start at 7:00 AM and wrap through midnight, so the first 28 slots of
//! the day (12:00 AM to 6:45 AM) sit at the bottom of the grid.

use std::collections::HashMap;

use chrono::{NaiveTime, Timelike};

use crate::utils::date::format_slot_label;

/// Minutes covered by one row.
pub const SLOT_MINUTES: u32 = 15;
/// Rows in a day.
pub const SLOTS_PER_DAY: usize = 96;
/// Hour shown in the first row.
pub const FIRST_DISPLAY_HOUR: u32 = 7;

const ROTATION: usize = (FIRST_DISPLAY_HOUR * 60 / SLOT_MINUTES) as usize;

/// Ordered slot labels plus a reverse index.
#[derive(Debug, Clone)]
pub struct TimeGrid {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl TimeGrid {
    pub fn new() -> Self {
        let mut labels: Vec<String> = (0..SLOTS_PER_DAY)
            .map(|slot| {
                let minutes = slot as u32 * SLOT_MINUTES;
                NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
                    .map(format_slot_label)
                    .unwrap_or_default()
            })
            .collect();
        labels.rotate_left(ROTATION);

        let index = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();

        Self { labels, index }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, row: usize) -> Option<&str> {
        self.labels.get(row).map(String::as_str)
    }

    /// Row of a slot label, `None` for anything that is not a grid label.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Wall-clock time at the top of `row`.
    pub fn time_at(&self, row: usize) -> Option<NaiveTime> {
        if row >= SLOTS_PER_DAY {
            return None;
        }
        let slot = (row + ROTATION) % SLOTS_PER_DAY;
        let minutes = slot as u32 * SLOT_MINUTES;
        NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
    }

    /// Row for a time that falls exactly on a quarter hour.
    pub fn index_of_time(&self, time: NaiveTime) -> Option<usize> {
        if time.second() != 0 || time.minute() % SLOT_MINUTES != 0 {
            return None;
        }
        let slot = ((time.hour() * 60 + time.minute()) / SLOT_MINUTES) as usize;
        Some((slot + SLOTS_PER_DAY - ROTATION) % SLOTS_PER_DAY)
    }
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self::new()
    }
}
