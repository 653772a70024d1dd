pub mod appointment_card;
pub mod palette;
pub mod week_view;

pub use week_view::{WeekView, WeekViewConfig};
