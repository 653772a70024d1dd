// Test fixtures - reusable test data
// An in-memory appointment backend plus sample records and dates

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};

use chrono::NaiveDate;
use salon_calendar::models::appointment::{AppointmentFilter, AppointmentRecord};
use salon_calendar::services::appointment::{AppointmentError, AppointmentService};

/// Sample dates for testing
pub mod dates {
    use super::*;

    /// Monday 6 May 2024 through Sunday 12 May 2024
    pub fn week_of_may_6_2024() -> Vec<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .iter_days()
            .take(7)
            .collect()
    }
}

/// Sample backend records
pub mod records {
    use super::*;

    pub fn record(id: i64, timestamp: &str, duration: &str) -> AppointmentRecord {
        AppointmentRecord {
            id,
            appointment_date: timestamp.to_string(),
            duration: duration.to_string(),
            service_name: "Haircut".to_string(),
            customer_name: format!("Customer {}", id),
            customer_phone: "555-0100".to_string(),
            service_price: 30.0,
            payment_status_string: "Unpaid".to_string(),
            category_id: None,
        }
    }

    /// Two overlapping Friday appointments and one on Saturday.
    pub fn busy_friday() -> Vec<AppointmentRecord> {
        vec![
            record(1, "2024-05-10T09:00:00Z", "01:00"),
            record(2, "2024-05-10T09:30:00Z", "01:00"),
            record(3, "2024-05-11T14:00:00Z", "00:45"),
        ]
    }
}

/// Backend kept in memory. Reschedules update the stored records unless
/// failures are switched on. While lists are held, `list` takes its snapshot
/// and then waits for `release_lists` before answering.
pub struct FakeAppointmentService {
    records: Mutex<Vec<AppointmentRecord>>,
    lists_held: Mutex<bool>,
    lists_released: Condvar,
    fail_reschedules: AtomicBool,
    list_calls: AtomicUsize,
    reschedule_calls: Mutex<Vec<(i64, String)>>,
}

impl FakeAppointmentService {
    pub fn new(records: Vec<AppointmentRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            lists_held: Mutex::new(false),
            lists_released: Condvar::new(),
            fail_reschedules: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
            reschedule_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_reschedules(&self, fail: bool) {
        self.fail_reschedules.store(fail, Ordering::SeqCst);
    }

    pub fn hold_lists(&self) {
        *self.lists_held.lock().unwrap() = true;
    }

    pub fn release_lists(&self) {
        *self.lists_held.lock().unwrap() = false;
        self.lists_released.notify_all();
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn reschedule_calls(&self) -> Vec<(i64, String)> {
        self.reschedule_calls.lock().unwrap().clone()
    }

    pub fn records(&self) -> Vec<AppointmentRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl AppointmentService for FakeAppointmentService {
    fn list(&self, filter: &AppointmentFilter) -> Result<Vec<AppointmentRecord>, AppointmentError> {
        if filter.page > 1 {
            return Ok(Vec::new());
        }
        let snapshot = self.records();
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let mut held = self.lists_held.lock().unwrap();
        while *held {
            held = self.lists_released.wait(held).unwrap();
        }
        Ok(snapshot)
    }

    fn reschedule(&self, id: i64, new_timestamp: &str) -> Result<(), AppointmentError> {
        self.reschedule_calls
            .lock()
            .unwrap()
            .push((id, new_timestamp.to_string()));

        if self.fail_reschedules.load(Ordering::SeqCst) {
            return Err(AppointmentError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AppointmentError::Status {
                status: 404,
                body: "not found".to_string(),
            })?;
        record.appointment_date = new_timestamp.to_string();
        Ok(())
    }
}
