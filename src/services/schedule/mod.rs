// Week grid geometry: time rows, overlap lanes, card placement and drop cells

pub mod layout;
pub mod overlap;
pub mod placeholder;
pub mod time_grid;

pub use layout::{card_bounds, card_geometry, is_compact, layout_cards, CardBounds, CardGeometry, CardLayout};
pub use overlap::{
    duration_to_span, group_overlaps, groups_for, placement, rendered_groups_for, GridSpan, OverlapGroup,
};
pub use placeholder::{GridCell, PlaceholderGrid};
pub use time_grid::TimeGrid;
