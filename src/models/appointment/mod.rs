// Appointment module
// Display model for the week grid plus the raw backend record it is built from

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::date::{format_duration_label, format_price, DisplayZone};

/// A booked appointment as the week grid sees it.
///
/// `date` is `dd/mm/yyyy` and `time` is a grid slot label such as `"9:30 AM"`.
/// `duration` keeps the `"<H>h <M>min"` form and only matters for the row span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub service_name: String,
    pub customer_name: String,
    pub contact: String,
    pub price: String,
    pub status: String,
    pub time: String,
    pub date: String,
    pub duration: String,
}

impl Appointment {
    /// Create an appointment with placement fields only; display fields are empty.
    ///
    /// # Examples
    /// ```
    /// use salon_calendar::models::appointment::Appointment;
    ///
    /// let appointment = Appointment::new("17", "10/05/2024", "9:30 AM", "1h 0min");
    /// assert_eq!(appointment.time, "9:30 AM");
    /// ```
    pub fn new(
        id: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            service_name: String::new(),
            customer_name: String::new(),
            contact: String::new(),
            price: String::new(),
            status: String::new(),
            time: time.into(),
            date: date.into(),
            duration: duration.into(),
        }
    }

    pub fn with_service(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    pub fn with_customer(mut self, name: impl Into<String>, contact: impl Into<String>) -> Self {
        self.customer_name = name.into();
        self.contact = contact.into();
        self
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = price.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Build the display model from a backend record.
    ///
    /// The timestamp is moved into `zone` and snapped to the grid; a broken
    /// timestamp leaves the sentinel in `date`/`time` so the card is simply not
    /// placed.
    pub fn from_record(record: &AppointmentRecord, zone: DisplayZone, currency_symbol: &str) -> Self {
        let (date, time) = zone.display_slot(&record.appointment_date);
        Self {
            id: record.id.to_string(),
            service_name: record.service_name.clone(),
            customer_name: record.customer_name.clone(),
            contact: record.customer_phone.clone(),
            price: format_price(record.service_price, currency_symbol),
            status: record.payment_status_string.clone(),
            time,
            date,
            duration: format_duration_label(&record.duration),
        }
    }

    /// Numeric backend id, when the display id is one.
    pub fn backend_id(&self) -> Option<i64> {
        self.id.parse().ok()
    }

    /// Whether the appointment currently sits on `(date, time)`.
    pub fn is_at(&self, date: &str, time: &str) -> bool {
        self.date == date && self.time == time
    }
}

/// Appointment as returned by the backend list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    pub id: i64,
    /// UTC-qualified ISO timestamp
    pub appointment_date: String,
    /// `"HH:MM"`
    pub duration: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub service_price: f64,
    #[serde(default)]
    pub payment_status_string: String,
    #[serde(default)]
    pub category_id: Option<i64>,
}

/// Payment status values the backend understands as a list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    PartiallyPaid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::PartiallyPaid => "Partially Paid",
            PaymentStatus::Refunded => "Refunded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "paid" => Some(PaymentStatus::Paid),
            "unpaid" => Some(PaymentStatus::Unpaid),
            "partially paid" | "partiallypaid" | "partial" => Some(PaymentStatus::PartiallyPaid),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// Query for the appointment list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentFilter {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub payment_status: Option<PaymentStatus>,
    pub category_id: Option<i64>,
    pub page: u32,
    pub page_size: u32,
}

impl AppointmentFilter {
    /// First page of an inclusive date range.
    pub fn for_range(start_date: NaiveDate, end_date: NaiveDate, page_size: u32) -> Self {
        Self {
            start_date,
            end_date,
            payment_status: None,
            category_id: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// The same query moved to `page`.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Query-string pairs in the backend's naming.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("startDate", self.start_date.format("%Y-%m-%d").to_string()),
            ("endDate", self.end_date.format("%Y-%m-%d").to_string()),
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(status) = self.payment_status {
            pairs.push(("paymentStatus", status.as_str().to_string()));
        }
        if let Some(category_id) = self.category_id {
            pairs.push(("categoryId", category_id.to_string()));
        }
        pairs
    }
}

/// A drag that changed an appointment's slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedAppointment {
    pub id: String,
    pub from_date: String,
    pub from_time: String,
    pub to_date: String,
    pub to_time: String,
}
