use super::SalonCalendarApp;
use chrono::{Duration, Local, NaiveDate, Weekday};

use crate::utils::date::{visible_dates, week_start};

impl SalonCalendarApp {
    pub(super) fn navigate_previous(&mut self) {
        self.anchor_date -= Duration::days(i64::from(self.settings.visible_days));
        self.load_visible_range();
    }

    pub(super) fn navigate_next(&mut self) {
        self.anchor_date += Duration::days(i64::from(self.settings.visible_days));
        self.load_visible_range();
    }

    pub(super) fn jump_to_today(&mut self) {
        self.anchor_date = Local::now().date_naive();
        self.load_visible_range();
    }

    pub(super) fn load_visible_range(&mut self) {
        let first_day = self.settings.first_weekday().unwrap_or(Weekday::Mon);
        self.visible_dates = visible_range(self.anchor_date, first_day, self.settings.visible_days);
        if let Err(err) = self.board.set_visible_dates(&self.visible_dates) {
            log::warn!("Cannot load appointments: {}", err);
        }
    }
}

/// Dates shown for `anchor`. Full weeks start on `first_day`; shorter or
/// longer ranges start at the anchor itself.
pub(super) fn visible_range(anchor: NaiveDate, first_day: Weekday, days: u32) -> Vec<NaiveDate> {
    let start = if days == 7 {
        week_start(anchor, first_day)
    } else {
        anchor
    };
    visible_dates(start, days as usize)
}
