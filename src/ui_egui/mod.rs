mod app;
pub mod board;
pub mod drag;
mod views;

pub use app::SalonCalendarApp;
pub use board::ScheduleBoard;
pub use drag::{DragCoordinator, PointerGestures, PointerPress};
