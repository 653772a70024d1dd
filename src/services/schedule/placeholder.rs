//! Drop cells: one per visible (date, slot), each with a stable string id.

use super::time_grid::TimeGrid;

/// A droppable `(column, row)` coordinate. Owns no appointment data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub column: usize,
    pub start: usize,
}

const ID_PREFIX: &str = "slot";

/// Placeholder cells for the visible date range.
#[derive(Debug, Clone)]
pub struct PlaceholderGrid {
    columns: Vec<String>,
    labels: Vec<String>,
}

impl PlaceholderGrid {
    pub fn new(columns: Vec<String>, grid: &TimeGrid) -> Self {
        Self {
            columns,
            labels: grid.labels().to_vec(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> usize {
        self.labels.len()
    }

    pub fn len(&self) -> usize {
        self.columns.len() * self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn id_for(cell: GridCell) -> String {
        format!("{}-{}-{}", ID_PREFIX, cell.column, cell.start)
    }

    /// Cell behind a placeholder id; `None` for ids this grid never produced.
    pub fn resolve(&self, id: &str) -> Option<GridCell> {
        let mut parts = id.split('-');
        if parts.next()? != ID_PREFIX {
            return None;
        }
        let column = parts.next()?.parse::<usize>().ok()?;
        let start = parts.next()?.parse::<usize>().ok()?;
        if parts.next().is_some() || column >= self.columns.len() || start >= self.labels.len() {
            return None;
        }
        Some(GridCell { column, start })
    }

    /// `(date, slot label)` of a cell.
    pub fn slot_of(&self, cell: GridCell) -> Option<(&str, &str)> {
        let date = self.columns.get(cell.column)?;
        let label = self.labels.get(cell.start)?;
        Some((date.as_str(), label.as_str()))
    }

    /// Every cell, column by column.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        (0..self.columns.len())
            .flat_map(move |column| (0..self.labels.len()).map(move |start| GridCell { column, start }))
    }
}
