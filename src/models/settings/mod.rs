// Settings module
// User-editable configuration for the backend client and the week grid

use chrono::Weekday;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::models::appointment::PaymentStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the appointment REST API, without a trailing slash
    pub api_base_url: String,
    /// Bearer token; `SALON_API_TOKEN` takes precedence when set
    pub api_token: Option<String>,
    /// IANA zone name used for display; the system zone when absent
    pub timezone: Option<String>,
    pub visible_days: u32,
    pub week_starts_on: String,
    pub slot_height: f32,
    /// Cards rendered narrower than this drop their secondary details
    pub compact_card_width: f32,
    pub page_size: u32,
    pub currency_symbol: String,
    pub request_timeout_secs: u64,
    pub payment_status_filter: Option<String>,
    pub category_filter: Option<i64>,
    /// "Light" or "Dark"; ignored while `use_system_theme` is on
    pub theme: String,
    pub use_system_theme: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            api_token: None,
            timezone: None,
            visible_days: 7,
            week_starts_on: "Monday".to_string(),
            slot_height: 30.0,
            compact_card_width: 110.0,
            page_size: 100,
            currency_symbol: "$".to_string(),
            request_timeout_secs: 20,
            payment_status_filter: None,
            category_filter: None,
            theme: "Light".to_string(),
            use_system_theme: true,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err("API base URL must start with http:// or https://".to_string());
        }
        if !(1..=14).contains(&self.visible_days) {
            return Err("Visible days must be between 1 and 14".to_string());
        }
        if self.first_weekday().is_none() {
            return Err(format!("Unknown first day of week: {}", self.week_starts_on));
        }
        if self.slot_height < 8.0 {
            return Err("Slot height must be at least 8 pixels".to_string());
        }
        if self.compact_card_width < 0.0 {
            return Err("Compact card width cannot be negative".to_string());
        }
        if self.page_size == 0 {
            return Err("Page size must be greater than zero".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be greater than zero".to_string());
        }
        if let Some(name) = &self.timezone {
            if name.parse::<Tz>().is_err() {
                return Err(format!("Unknown timezone: {}", name));
            }
        }
        if let Some(status) = &self.payment_status_filter {
            if PaymentStatus::parse(status).is_none() {
                return Err(format!("Unknown payment status filter: {}", status));
            }
        }
        if !matches!(self.theme.as_str(), "Light" | "Dark") {
            return Err(format!("Unknown theme: {}", self.theme));
        }
        Ok(())
    }

    pub fn first_weekday(&self) -> Option<Weekday> {
        self.week_starts_on.parse::<Weekday>().ok()
    }

    /// Named display zone, `None` for the system zone or an unknown name.
    pub fn display_timezone(&self) -> Option<Tz> {
        self.timezone.as_deref().and_then(|name| name.parse::<Tz>().ok())
    }

    pub fn payment_status(&self) -> Option<PaymentStatus> {
        self.payment_status_filter.as_deref().and_then(PaymentStatus::parse)
    }

    /// API base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}
