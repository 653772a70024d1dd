use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use chrono::Local;

use super::toast::ToastManager;
use super::SalonCalendarApp;
use crate::models::settings::Settings;
use crate::services::appointment::{AppointmentService, RecordConverter};
use crate::services::settings::SettingsService;
use crate::ui_egui::board::ScheduleBoard;
use crate::ui_egui::views::WeekView;
use crate::utils::date::DisplayZone;

impl SalonCalendarApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        settings_service: SettingsService,
        service: Arc<dyn AppointmentService>,
    ) -> Self {
        let zone = DisplayZone::from_timezone(settings.display_timezone());
        log::info!(
            "Using {} with display zone {:?}",
            settings.base_url(),
            zone
        );

        let converter = RecordConverter::new(zone, settings.currency_symbol.clone());
        let mut board = ScheduleBoard::new(service, converter, settings.page_size, ToastManager::new());
        board.set_query(settings.payment_status(), settings.category_filter);

        let repaint_ctx = cc.egui_ctx.clone();
        board.set_waker(Arc::new(move || repaint_ctx.request_repaint()));

        let last_action = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&last_action);
        board.on_drag_end(Box::new(move |_, moved| {
            if let Some(moved) = moved {
                *sink.borrow_mut() = format!(
                    "Moved {} {} → {} {}",
                    moved.from_date, moved.from_time, moved.to_date, moved.to_time
                );
            }
        }));
        let sink = Rc::clone(&last_action);
        board.on_time_slot_select(Box::new(move |label| {
            *sink.borrow_mut() = format!("Selected {}", label);
        }));

        let is_dark = resolve_dark_mode(&settings);
        cc.egui_ctx.set_visuals(if is_dark {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        let mut app = Self {
            settings,
            settings_service,
            board,
            week_view: WeekView::new(),
            anchor_date: Local::now().date_naive(),
            visible_dates: Vec::new(),
            is_dark,
            last_action,
        };
        app.load_visible_range();
        app
    }
}

fn resolve_dark_mode(settings: &Settings) -> bool {
    if settings.use_system_theme {
        match dark_light::detect() {
            dark_light::Mode::Dark => return true,
            dark_light::Mode::Light => return false,
            dark_light::Mode::Default => {}
        }
    }
    settings.theme == "Dark"
}
