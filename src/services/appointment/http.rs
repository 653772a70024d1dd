use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use super::{AppointmentError, AppointmentService};
use crate::models::appointment::{AppointmentFilter, AppointmentRecord};
use crate::models::settings::Settings;

/// Longest error body kept in an [`AppointmentError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// REST client for the appointment backend.
pub struct HttpAppointmentService {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Plain(Vec<AppointmentRecord>),
    Paged { items: Vec<AppointmentRecord> },
}

impl ListResponse {
    fn into_records(self) -> Vec<AppointmentRecord> {
        match self {
            ListResponse::Plain(items) | ListResponse::Paged { items } => items,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RescheduleBody<'a> {
    appointment_date: &'a str,
}

impl HttpAppointmentService {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(anyhow!("Appointment API URL must use http or https"));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build appointment HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.base_url(),
            settings.api_token.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn check_status(response: Response) -> Result<Response, AppointmentError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let mut body = response.text().unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(AppointmentError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl AppointmentService for HttpAppointmentService {
    fn list(&self, filter: &AppointmentFilter) -> Result<Vec<AppointmentRecord>, AppointmentError> {
        let request = self
            .client
            .get(self.url("appointments"))
            .query(&filter.query_pairs());
        let response = Self::check_status(self.authorize(request).send()?)?;

        let body = response.text()?;
        let parsed: ListResponse =
            serde_json::from_str(&body).map_err(|e| AppointmentError::Decode(e.to_string()))?;
        let records = parsed.into_records();
        log::debug!(
            "Fetched {} appointments (page {}) for {} to {}",
            records.len(),
            filter.page,
            filter.start_date,
            filter.end_date
        );
        Ok(records)
    }

    fn reschedule(&self, id: i64, new_timestamp: &str) -> Result<(), AppointmentError> {
        let request = self
            .client
            .put(self.url(&format!("appointments/{}/reschedule", id)))
            .json(&RescheduleBody {
                appointment_date: new_timestamp,
            });
        Self::check_status(self.authorize(request).send()?)?;
        log::info!("Rescheduled appointment {} to {}", id, new_timestamp);
        Ok(())
    }
}
