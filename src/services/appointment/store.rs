use crate::models::appointment::{Appointment, AppointmentFilter, AppointmentRecord, MovedAppointment};
use crate::utils::date::DisplayZone;

use super::{AppointmentError, AppointmentService};

/// Upper bound on pages fetched for one range.
const MAX_PAGES: u32 = 50;

/// Turns backend records into display appointments.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordConverter {
    pub zone: DisplayZone,
    pub currency_symbol: String,
}

impl RecordConverter {
    pub fn new(zone: DisplayZone, currency_symbol: impl Into<String>) -> Self {
        Self {
            zone,
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn convert(&self, record: &AppointmentRecord) -> Appointment {
        Appointment::from_record(record, self.zone, &self.currency_symbol)
    }
}

/// Fetch every page of `filter`, stopping at the first short page.
pub fn fetch_appointments(
    service: &dyn AppointmentService,
    filter: &AppointmentFilter,
    converter: &RecordConverter,
) -> Result<Vec<Appointment>, AppointmentError> {
    let mut appointments = Vec::new();
    let mut page = filter.page.max(1);

    loop {
        let records = service.list(&filter.with_page(page))?;
        let count = records.len();
        appointments.extend(records.iter().map(|record| converter.convert(record)));

        if count < filter.page_size as usize {
            break;
        }
        if page - filter.page.max(1) + 1 >= MAX_PAGES {
            log::warn!(
                "Stopped fetching appointments after {} pages for {} to {}",
                MAX_PAGES,
                filter.start_date,
                filter.end_date
            );
            break;
        }
        page += 1;
    }

    Ok(appointments)
}

/// The calendar's appointment list. The schedule board is its only writer.
#[derive(Debug, Default, Clone)]
pub struct AppointmentStore {
    appointments: Vec<Appointment>,
    revision: u64,
}

impl AppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn get(&self, id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    /// Bumped on every change; lets renderers skip unchanged frames.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    /// Replace the whole list with server truth.
    pub fn replace_all(&mut self, appointments: Vec<Appointment>) {
        self.appointments = appointments;
        self.revision += 1;
    }

    /// Put appointment `id` on `(date, time)`, keeping its list position.
    ///
    /// Returns `None` when the id is unknown or the appointment is already there.
    pub fn move_to(&mut self, id: &str, date: &str, time: &str) -> Option<MovedAppointment> {
        let appointment = self.appointments.iter_mut().find(|a| a.id == id)?;
        if appointment.is_at(date, time) {
            return None;
        }

        let moved = MovedAppointment {
            id: id.to_string(),
            from_date: std::mem::replace(&mut appointment.date, date.to_string()),
            from_time: std::mem::replace(&mut appointment.time, time.to_string()),
            to_date: date.to_string(),
            to_time: time.to_string(),
        };
        self.revision += 1;
        Some(moved)
    }
}
