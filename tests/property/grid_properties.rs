// Property-based tests for the time grid, overlap layout and date codec

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use proptest::prelude::*;
use salon_calendar::models::appointment::Appointment;
use salon_calendar::services::schedule::{duration_to_span, layout_cards, TimeGrid};
use salon_calendar::utils::date::{
    format_display_date, format_slot_label, snap_to_quarter_hour, to_api_format, DisplayZone,
};

const DAY: &str = "10/05/2024";

fn quarter_time(row: usize) -> NaiveTime {
    NaiveTime::from_hms_opt(0, 0, 0).unwrap() + Duration::minutes(15 * row as i64)
}

fn appointment_strategy() -> impl Strategy<Value = (usize, u32)> {
    // Start row on the grid and duration in quarter hours.
    (0usize..96, 0u32..12)
}

proptest! {
    /// Property: snapping lands on a quarter hour no more than 8 minutes away
    #[test]
    fn prop_snap_is_nearby_quarter_hour(
        day in 1u32..=28,
        hour in 0u32..24,
        minute in 0u32..60,
        second in 0u32..60,
    ) {
        let value = NaiveDate::from_ymd_opt(2024, 2, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap();
        let snapped = snap_to_quarter_hour(value).unwrap();

        prop_assert_eq!(snapped.minute() % 15, 0);
        prop_assert_eq!(snapped.second(), 0);
        prop_assert!((snapped - value).num_seconds().abs() <= 8 * 60);
    }

    /// Property: every grid row maps back to itself by label and by time
    #[test]
    fn prop_grid_rows_round_trip(row in 0usize..96) {
        let grid = TimeGrid::new();
        let label = grid.label(row).unwrap().to_string();
        prop_assert_eq!(grid.index_of(&label), Some(row));

        let time = grid.time_at(row).unwrap();
        prop_assert_eq!(grid.index_of_time(time), Some(row));
        prop_assert_eq!(format_slot_label(time), label);
    }

    /// Property: the backend form of a slot label is its 24-hour time
    #[test]
    fn prop_api_format_matches_24_hour_time(row in 0usize..96) {
        let time = quarter_time(row);
        prop_assert_eq!(
            to_api_format(&format_slot_label(time)),
            Some(time.format("%H:%M").to_string())
        );
    }

    /// Property: a slot written as a UTC timestamp reads back as the same slot
    #[test]
    fn prop_utc_timestamp_round_trip(row in 0usize..96, day in 1u32..=28) {
        let date = format_display_date(NaiveDate::from_ymd_opt(2024, 3, day).unwrap());
        let label = format_slot_label(quarter_time(row));

        let timestamp = DisplayZone::Utc.api_timestamp(&label, &date).unwrap();
        prop_assert_eq!(DisplayZone::Utc.display_slot(&timestamp), (date, label));
    }

    /// Property: spans follow rounded quarter hours
    #[test]
    fn prop_span_counts_quarter_hours(hours in 0u32..10, minutes in 0u32..60) {
        let expected = ((hours * 60 + minutes) as f64 / 15.0).round() as usize;
        prop_assert_eq!(duration_to_span(&format!("{}h {}min", hours, minutes)), expected);
    }

    /// Property: every placed card gets a lane inside its column
    #[test]
    fn prop_cards_fit_their_column(specs in prop::collection::vec(appointment_strategy(), 1..8)) {
        let grid = TimeGrid::new();
        let columns = vec![DAY.to_string()];
        let appointments: Vec<Appointment> = specs
            .iter()
            .enumerate()
            .map(|(i, (row, quarters))| {
                let minutes = quarters * 15;
                Appointment::new(
                    i.to_string(),
                    DAY,
                    grid.label(*row).unwrap(),
                    format!("{}h {}min", minutes / 60, minutes % 60),
                )
            })
            .collect();

        let layouts = layout_cards(&appointments, &columns, &grid);
        prop_assert_eq!(layouts.len(), appointments.len());
        for layout in &layouts {
            let g = layout.geometry;
            prop_assert!(g.width_percent > 0.0 && g.width_percent <= 100.0);
            prop_assert!(g.left_offset_percent >= 0.0);
            prop_assert!(g.left_offset_percent + g.width_percent <= 100.0 + 1e-3);
        }
    }

    /// Property: cards covering the same rows sit side by side without sharing a lane
    #[test]
    fn prop_cards_on_the_same_rows_get_distinct_lanes(
        (row, quarters) in (0usize..90, 1u32..6),
        copies in 2usize..5,
        others in prop::collection::vec(appointment_strategy(), 0..5),
    ) {
        let grid = TimeGrid::new();
        let columns = vec![DAY.to_string()];
        let minutes = quarters * 15;
        let duration = format!("{}h {}min", minutes / 60, minutes % 60);

        let mut appointments: Vec<Appointment> = (0..copies)
            .map(|i| Appointment::new(format!("same-{}", i), DAY, grid.label(row).unwrap(), duration.clone()))
            .collect();
        appointments.extend(others.iter().enumerate().map(|(i, (other_row, other_quarters))| {
            let m = other_quarters * 15;
            Appointment::new(
                format!("other-{}", i),
                DAY,
                grid.label(*other_row).unwrap(),
                format!("{}h {}min", m / 60, m % 60),
            )
        }));

        let layouts = layout_cards(&appointments, &columns, &grid);
        let mut lanes: Vec<(f32, f32)> = layouts
            .iter()
            .filter(|l| l.id.starts_with("same-"))
            .map(|l| (l.geometry.left_offset_percent, l.geometry.left_offset_percent + l.geometry.width_percent))
            .collect();
        prop_assert_eq!(lanes.len(), copies);

        lanes.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in lanes.windows(2) {
            prop_assert!(pair[0].1 <= pair[1].0 + 1e-3);
        }
    }
}
