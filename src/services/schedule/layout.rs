//! Card geometry: lane width and offset inside a column, pixel bounds, and
//! the compact-card threshold.

use crate::models::appointment::Appointment;

use super::overlap::{placement, rendered_groups_for, GridSpan, OverlapGroup};
use super::time_grid::TimeGrid;

/// Horizontal share of a column, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardGeometry {
    pub width_percent: f32,
    pub left_offset_percent: f32,
}

impl CardGeometry {
    pub const FULL: CardGeometry = CardGeometry {
        width_percent: 100.0,
        left_offset_percent: 0.0,
    };
}

/// Width and offset of `id` within the group that holds it. Full width when no
/// group does.
pub fn card_geometry(id: &str, groups: &[OverlapGroup]) -> CardGeometry {
    groups
        .iter()
        .find_map(|group| {
            let index = group.position(id)?;
            let width_percent = 100.0 / group.len() as f32;
            Some(CardGeometry {
                width_percent,
                left_offset_percent: width_percent * index as f32,
            })
        })
        .unwrap_or(CardGeometry::FULL)
}

/// Pixel rectangle of a card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardBounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Pixel bounds of a card inside a day column whose first row starts at
/// `grid_top`. Zero-length cards still get one row of height.
pub fn card_bounds(
    column_left: f32,
    column_width: f32,
    grid_top: f32,
    slot_height: f32,
    span: GridSpan,
    geometry: CardGeometry,
) -> CardBounds {
    CardBounds {
        left: column_left + column_width * geometry.left_offset_percent / 100.0,
        top: grid_top + span.start as f32 * slot_height,
        width: column_width * geometry.width_percent / 100.0,
        height: span.span.max(1) as f32 * slot_height,
    }
}

/// Narrow cards drop the secondary details.
pub fn is_compact(rendered_width: f32, threshold: f32) -> bool {
    rendered_width < threshold
}

/// Everything the renderer needs to place one card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardLayout {
    pub id: String,
    pub span: GridSpan,
    pub geometry: CardGeometry,
}

/// Layouts for every appointment that lands on a visible cell, in list order.
/// Lanes follow the rows cards are drawn over, so zero-length cards take one.
pub fn layout_cards(appointments: &[Appointment], columns: &[String], grid: &TimeGrid) -> Vec<CardLayout> {
    appointments
        .iter()
        .filter_map(|appointment| {
            let span = placement(appointment, columns, grid)?;
            let groups = rendered_groups_for(appointment, appointments, columns, grid);
            Some(CardLayout {
                id: appointment.id.clone(),
                span,
                geometry: card_geometry(&appointment.id, &groups),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: &str = "10/05/2024";

    fn columns() -> Vec<String> {
        vec![DAY.to_string()]
    }

    fn layout_of<'a>(layouts: &'a [CardLayout], id: &str) -> &'a CardLayout {
        layouts.iter().find(|l| l.id == id).unwrap()
    }

    #[test]
    fn test_overlapping_pair_splits_in_half() {
        let grid = TimeGrid::new();
        let list = vec![
            Appointment::new("a", DAY, "9:00 AM", "1h 0min"),
            Appointment::new("b", DAY, "9:30 AM", "1h 0min"),
        ];
        let layouts = layout_cards(&list, &columns(), &grid);

        let a = layout_of(&layouts, "a").geometry;
        let b = layout_of(&layouts, "b").geometry;
        assert_eq!(a.width_percent, 50.0);
        assert_eq!(a.left_offset_percent, 0.0);
        assert_eq!(b.width_percent, 50.0);
        assert_eq!(b.left_offset_percent, 50.0);
    }

    #[test]
    fn test_separate_cards_take_full_width() {
        let grid = TimeGrid::new();
        let list = vec![
            Appointment::new("a", DAY, "9:00 AM", "1h 0min"),
            Appointment::new("b", DAY, "10:00 AM", "1h 0min"),
        ];
        let layouts = layout_cards(&list, &columns(), &grid);

        assert_eq!(layout_of(&layouts, "a").geometry, CardGeometry::FULL);
        assert_eq!(layout_of(&layouts, "b").geometry, CardGeometry::FULL);
    }

    #[test]
    fn test_three_way_split() {
        let grid = TimeGrid::new();
        let list = vec![
            Appointment::new("a", DAY, "9:00 AM", "1h 0min"),
            Appointment::new("b", DAY, "9:00 AM", "1h 0min"),
            Appointment::new("c", DAY, "9:15 AM", "0h 30min"),
        ];
        let layouts = layout_cards(&list, &columns(), &grid);
        let c = layout_of(&layouts, "c").geometry;

        assert!((c.width_percent - 100.0 / 3.0).abs() < 1e-4);
        assert!((c.left_offset_percent - 200.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_missing_id_falls_back_to_full_width() {
        assert_eq!(card_geometry("ghost", &[]), CardGeometry::FULL);
    }

    #[test]
    fn test_card_bounds() {
        let span = GridSpan {
            column: 0,
            start: 8,
            span: 6,
        };
        let geometry = CardGeometry {
            width_percent: 50.0,
            left_offset_percent: 50.0,
        };
        let bounds = card_bounds(100.0, 200.0, 40.0, 30.0, span, geometry);

        assert_eq!(bounds.left, 200.0);
        assert_eq!(bounds.width, 100.0);
        assert_eq!(bounds.top, 40.0 + 8.0 * 30.0);
        assert_eq!(bounds.height, 180.0);
    }

    #[test]
    fn test_zero_span_keeps_one_row() {
        let span = GridSpan {
            column: 0,
            start: 0,
            span: 0,
        };
        let bounds = card_bounds(0.0, 100.0, 0.0, 30.0, span, CardGeometry::FULL);
        assert_eq!(bounds.height, 30.0);
    }

    #[test]
    fn test_zero_length_card_shares_its_row() {
        let grid = TimeGrid::new();
        let list = vec![
            Appointment::new("a", DAY, "9:00 AM", "1h 0min"),
            Appointment::new("quick", DAY, "9:00 AM", "0h 5min"),
        ];
        let layouts = layout_cards(&list, &columns(), &grid);

        assert_eq!(layout_of(&layouts, "quick").span.span, 0);
        assert_eq!(layout_of(&layouts, "a").geometry.width_percent, 50.0);
        let quick = layout_of(&layouts, "quick").geometry;
        assert_eq!(quick.width_percent, 50.0);
        assert_eq!(quick.left_offset_percent, 50.0);
    }

    #[test]
    fn test_compact_threshold() {
        assert!(is_compact(80.0, 110.0));
        assert!(!is_compact(110.0, 110.0));
    }

    #[test]
    fn test_unplaced_cards_are_not_laid_out() {
        let grid = TimeGrid::new();
        let list = vec![Appointment::new("a", "11/05/2024", "9:00 AM", "1h 0min")];
        assert!(layout_cards(&list, &columns(), &grid).is_empty());
    }
}
