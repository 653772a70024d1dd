// Settings service module

mod service;

pub use service::{SettingsService, API_TOKEN_ENV};
