//! Overlap grouping for cards sharing a column.
//!
//! Grouping is greedy and order dependent: appointments are visited in list
//! order and each joins the first group holding any member it intersects. A
//! chain A∩B, B∩C (but not A∩C) collapses into one three-wide group when the
//! target cell covers all three.

use crate::models::appointment::Appointment;
use crate::utils::date::parse_duration_minutes;

use super::time_grid::{TimeGrid, SLOT_MINUTES};

/// Span used when a duration label cannot be read (one hour).
pub const FALLBACK_SPAN: usize = 4;

/// Rows covered by a `"<H>h <M>min"` duration, rounded to the nearest row.
pub fn duration_to_span(duration: &str) -> usize {
    match parse_duration_minutes(duration) {
        Some(minutes) => (f64::from(minutes) / f64::from(SLOT_MINUTES)).round() as usize,
        None => FALLBACK_SPAN,
    }
}

/// Half-open interval intersection: `[a_start, a_end)` against `[b_start, b_end)`.
pub fn intervals_overlap(a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> bool {
    a_end > b_start && b_end > a_start
}

/// Where an appointment sits on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpan {
    pub column: usize,
    pub start: usize,
    pub span: usize,
}

impl GridSpan {
    pub fn end(&self) -> usize {
        self.start + self.span
    }

    pub fn overlaps(&self, other: &GridSpan) -> bool {
        self.column == other.column && intervals_overlap(self.start, self.end(), other.start, other.end())
    }

    /// The span as drawn: zero-length cards still cover one row.
    pub fn rendered(&self) -> GridSpan {
        GridSpan {
            span: self.span.max(1),
            ..*self
        }
    }
}

/// Grid placement of `appointment`, or `None` when its date is not one of the
/// visible `columns` or its time is not a slot label.
pub fn placement(appointment: &Appointment, columns: &[String], grid: &TimeGrid) -> Option<GridSpan> {
    let column = columns.iter().position(|date| *date == appointment.date)?;
    let start = grid.index_of(&appointment.time)?;
    Some(GridSpan {
        column,
        start,
        span: duration_to_span(&appointment.duration),
    })
}

/// Appointments sharing horizontal space, in the order they joined.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverlapGroup {
    members: Vec<String>,
}

impl OverlapGroup {
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.members.iter().position(|member| member == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }
}

/// Group the appointments of `column` that intersect
/// `[target_start, target_start + target_span)`.
pub fn group_overlaps(
    appointments: &[Appointment],
    columns: &[String],
    grid: &TimeGrid,
    column: usize,
    target_start: usize,
    target_span: usize,
) -> Vec<OverlapGroup> {
    let target_end = target_start + target_span;

    let selected = appointments.iter().filter_map(|appointment| {
        let span = placement(appointment, columns, grid)?;
        (span.column == column && intervals_overlap(span.start, span.end(), target_start, target_end))
            .then_some((appointment.id.as_str(), span))
    });
    partition(selected)
}

/// Greedy first-fit split of `selected`, in iteration order.
fn partition<'a>(selected: impl Iterator<Item = (&'a str, GridSpan)>) -> Vec<OverlapGroup> {
    let mut groups: Vec<Vec<(&str, GridSpan)>> = Vec::new();
    for (id, span) in selected {
        match groups
            .iter_mut()
            .find(|group| group.iter().any(|(_, member)| member.overlaps(&span)))
        {
            Some(group) => group.push((id, span)),
            None => groups.push(vec![(id, span)]),
        }
    }

    groups
        .into_iter()
        .map(|group| OverlapGroup {
            members: group.into_iter().map(|(id, _)| id.to_string()).collect(),
        })
        .collect()
}

/// Groups for the cell `appointment` occupies; empty when it is not placed.
pub fn groups_for(
    appointment: &Appointment,
    appointments: &[Appointment],
    columns: &[String],
    grid: &TimeGrid,
) -> Vec<OverlapGroup> {
    match placement(appointment, columns, grid) {
        Some(span) => group_overlaps(appointments, columns, grid, span.column, span.start, span.span),
        None => Vec::new(),
    }
}

/// Like [`groups_for`], but every span counts as at least one row, so a
/// zero-length card shares its row instead of being drawn over.
pub fn rendered_groups_for(
    appointment: &Appointment,
    appointments: &[Appointment],
    columns: &[String],
    grid: &TimeGrid,
) -> Vec<OverlapGroup> {
    let Some(target) = placement(appointment, columns, grid).map(|span| span.rendered()) else {
        return Vec::new();
    };
    let selected = appointments.iter().filter_map(|other| {
        let span = placement(other, columns, grid)?.rendered();
        target.overlaps(&span).then_some((other.id.as_str(), span))
    });
    partition(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: &str = "10/05/2024";

    fn columns() -> Vec<String> {
        vec!["09/05/2024".to_string(), DAY.to_string()]
    }

    fn appt(id: &str, time: &str, duration: &str) -> Appointment {
        Appointment::new(id, DAY, time, duration)
    }

    fn ids(groups: &[OverlapGroup]) -> Vec<Vec<&str>> {
        groups
            .iter()
            .map(|g| g.members().iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_duration_to_span() {
        assert_eq!(duration_to_span("1h 30min"), 6);
        assert_eq!(duration_to_span("0h 45min"), 3);
        assert_eq!(duration_to_span("0h 20min"), 1);
        assert_eq!(duration_to_span("0h 23min"), 2);
        assert_eq!(duration_to_span("whenever"), FALLBACK_SPAN);
    }

    #[test]
    fn test_intervals_are_half_open() {
        assert!(intervals_overlap(0, 4, 2, 6));
        assert!(!intervals_overlap(0, 4, 4, 8));
        assert!(!intervals_overlap(4, 8, 0, 4));
    }

    #[test]
    fn test_two_overlapping_share_a_group() {
        let grid = TimeGrid::new();
        let list = vec![appt("a", "9:00 AM", "1h 0min"), appt("b", "9:30 AM", "1h 0min")];
        let groups = groups_for(&list[0], &list, &columns(), &grid);
        assert_eq!(ids(&groups), vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_back_to_back_stay_apart() {
        let grid = TimeGrid::new();
        let list = vec![appt("a", "9:00 AM", "1h 0min"), appt("b", "10:00 AM", "1h 0min")];
        assert_eq!(ids(&groups_for(&list[0], &list, &columns(), &grid)), vec![vec!["a"]]);
        assert_eq!(ids(&groups_for(&list[1], &list, &columns(), &grid)), vec![vec!["b"]]);
    }

    #[test]
    fn test_other_columns_ignored() {
        let grid = TimeGrid::new();
        let list = vec![
            appt("a", "9:00 AM", "1h 0min"),
            Appointment::new("b", "09/05/2024", "9:00 AM", "1h 0min"),
            Appointment::new("c", "11/05/2024", "9:00 AM", "1h 0min"),
        ];
        assert_eq!(ids(&groups_for(&list[0], &list, &columns(), &grid)), vec![vec!["a"]]);
    }

    #[test]
    fn test_triad_chain_collapses_in_middle_cell() {
        let grid = TimeGrid::new();
        let list = vec![
            appt("a", "9:00 AM", "1h 0min"),
            appt("b", "9:45 AM", "1h 0min"),
            appt("c", "10:30 AM", "1h 0min"),
        ];
        let cols = columns();
        assert_eq!(ids(&groups_for(&list[0], &list, &cols, &grid)), vec![vec!["a", "b"]]);
        assert_eq!(ids(&groups_for(&list[1], &list, &cols, &grid)), vec![vec!["a", "b", "c"]]);
        assert_eq!(ids(&groups_for(&list[2], &list, &cols, &grid)), vec![vec!["b", "c"]]);
    }

    #[test]
    fn test_greedy_order_splits_groups() {
        // a and c do not touch; b bridges them but is visited last.
        let grid = TimeGrid::new();
        let list = vec![
            appt("a", "9:00 AM", "0h 30min"),
            appt("c", "9:30 AM", "0h 30min"),
            appt("b", "9:15 AM", "0h 30min"),
        ];
        let groups = group_overlaps(&list, &columns(), &grid, 1, 0, 96);
        assert_eq!(ids(&groups), vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn test_unplaceable_appointments_skipped() {
        let grid = TimeGrid::new();
        let list = vec![
            appt("a", "9:00 AM", "1h 0min"),
            appt("b", "9:07 AM", "1h 0min"),
            appt("c", "Invalid Date", "1h 0min"),
        ];
        assert_eq!(ids(&groups_for(&list[0], &list, &columns(), &grid)), vec![vec!["a"]]);
        assert!(groups_for(&list[2], &list, &columns(), &grid).is_empty());
    }

    #[test]
    fn test_zero_length_groups_only_when_rendered() {
        let grid = TimeGrid::new();
        let list = vec![appt("a", "9:00 AM", "1h 0min"), appt("quick", "9:00 AM", "0h 5min")];

        assert_eq!(ids(&groups_for(&list[0], &list, &columns(), &grid)), vec![vec!["a"]]);
        assert!(groups_for(&list[1], &list, &columns(), &grid).is_empty());
        assert_eq!(
            ids(&rendered_groups_for(&list[1], &list, &columns(), &grid)),
            vec![vec!["a", "quick"]]
        );
    }

    #[test]
    fn test_group_position() {
        let group = OverlapGroup {
            members: vec!["x".to_string(), "y".to_string()],
        };
        assert_eq!(group.position("y"), Some(1));
        assert!(!group.contains("z"));
    }
}
