mod lifecycle;
mod navigation;
mod status_bar;
mod toast;

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;

use self::toast::ToastManager;
use crate::models::appointment::PaymentStatus;
use crate::models::settings::Settings;
use crate::services::settings::SettingsService;
use crate::ui_egui::board::ScheduleBoard;
use crate::ui_egui::views::palette::TimeGridPalette;
use crate::ui_egui::views::{WeekView, WeekViewConfig};

const PAYMENT_FILTERS: [PaymentStatus; 4] = [
    PaymentStatus::Paid,
    PaymentStatus::Unpaid,
    PaymentStatus::PartiallyPaid,
    PaymentStatus::Refunded,
];

pub struct SalonCalendarApp {
    settings: Settings,
    settings_service: SettingsService,
    board: ScheduleBoard<ToastManager>,
    week_view: WeekView,
    /// Any date inside the visible range; navigation moves it.
    anchor_date: NaiveDate,
    visible_dates: Vec<NaiveDate>,
    is_dark: bool,
    /// Last drag or slot selection, shown in the status bar. Written by board callbacks.
    last_action: Rc<RefCell<String>>,
}

impl eframe::App for SalonCalendarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.board.poll();

        self.render_toolbar(ctx);
        self.render_status_bar(ctx);

        let palette = TimeGridPalette::new(self.is_dark);
        let config = WeekViewConfig {
            slot_height: self.settings.slot_height,
            compact_card_width: self.settings.compact_card_width,
        };
        egui::CentralPanel::default().show(ctx, |ui| {
            self.week_view
                .show(ui, &mut self.board, &self.visible_dates, config, &palette);
        });

        self.board.notifier_mut().render(ctx, self.is_dark);
    }
}

impl SalonCalendarApp {
    fn render_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("◀").on_hover_text("Previous").clicked() {
                    self.navigate_previous();
                }
                if ui.button("Today").clicked() {
                    self.jump_to_today();
                }
                if ui.button("▶").on_hover_text("Next").clicked() {
                    self.navigate_next();
                }

                ui.separator();
                ui.heading(self.range_title());
                ui.separator();

                let mut filter = self.settings.payment_status();
                egui::ComboBox::from_id_source("payment_filter")
                    .selected_text(filter.map(|s| s.as_str()).unwrap_or("All payments"))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut filter, None, "All payments");
                        for status in PAYMENT_FILTERS {
                            ui.selectable_value(&mut filter, Some(status), status.as_str());
                        }
                    });
                if filter != self.settings.payment_status() {
                    self.set_payment_filter(filter);
                }

                if ui.button("⟳ Refresh").clicked() {
                    self.refresh();
                }
                if self.board.is_busy() {
                    ui.spinner();
                }
            });
        });
    }

    fn range_title(&self) -> String {
        match (self.visible_dates.first(), self.visible_dates.last()) {
            (Some(first), Some(last)) if first == last => first.format("%d %B %Y").to_string(),
            (Some(first), Some(last)) => {
                format!("{} – {}", first.format("%d %b"), last.format("%d %b %Y"))
            }
            _ => String::new(),
        }
    }

    fn set_payment_filter(&mut self, filter: Option<PaymentStatus>) {
        self.settings.payment_status_filter = filter.map(|s| s.as_str().to_string());
        if let Err(err) = self.settings_service.update(&self.settings) {
            log::warn!("Failed to save payment filter: {:#}", err);
        }
        self.board
            .set_query(self.settings.payment_status(), self.settings.category_filter);
        self.refresh();
    }

    fn refresh(&mut self) {
        self.board.notifier_mut().info("Refreshing appointments");
        if let Err(err) = self.board.refresh() {
            log::warn!("Cannot refresh appointments: {}", err);
        }
    }
}
