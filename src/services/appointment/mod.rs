//! Appointment backend access.
//!
//! [`AppointmentService`] is the seam to the REST backend. Calls are blocking
//! and are only ever made from the [`dispatcher`] worker threads, never from
//! the UI thread.

pub mod dispatcher;
pub mod http;
pub mod store;

use thiserror::Error;

use crate::models::appointment::{AppointmentFilter, AppointmentRecord};

pub use dispatcher::{DispatchOutcome, RescheduleDispatcher, RescheduleRequest};
pub use http::HttpAppointmentService;
pub use store::{fetch_appointments, AppointmentStore, RecordConverter};

/// Failures talking to the appointment backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppointmentError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode server response: {0}")]
    Decode(String),
    #[error("appointment id {0:?} is not a backend id")]
    InvalidId(String),
    #[error("no timestamp for {time} on {date}")]
    InvalidSlot { date: String, time: String },
    #[error("no appointment range has been loaded")]
    NoRange,
}

impl From<reqwest::Error> for AppointmentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppointmentError::Decode(err.to_string())
        } else {
            AppointmentError::Transport(err.to_string())
        }
    }
}

/// Appointment backend operations.
#[cfg_attr(test, mockall::automock)]
pub trait AppointmentService: Send + Sync {
    /// One page of appointments matching `filter`.
    fn list(&self, filter: &AppointmentFilter) -> Result<Vec<AppointmentRecord>, AppointmentError>;

    /// Move appointment `id` to `new_timestamp` (UTC ISO 8601).
    fn reschedule(&self, id: i64, new_timestamp: &str) -> Result<(), AppointmentError>;
}
