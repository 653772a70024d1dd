// Salon Calendar Application
// Main entry point

use std::sync::Arc;

use anyhow::Context;
use salon_calendar::services::appointment::HttpAppointmentService;
use salon_calendar::services::settings::SettingsService;
use salon_calendar::ui_egui::SalonCalendarApp;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Starting Salon Calendar");

    let settings_service = SettingsService::from_default_location();
    log::info!("Settings file: {}", settings_service.path().display());
    let settings = settings_service.load_or_default();

    let service = HttpAppointmentService::from_settings(&settings)
        .context("Failed to set up the appointment service")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Salon Calendar")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Salon Calendar",
        options,
        Box::new(move |cc| {
            Ok(Box::new(SalonCalendarApp::new(
                cc,
                settings,
                settings_service,
                Arc::new(service),
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run the calendar window: {}", e))
}
