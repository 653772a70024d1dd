use super::SalonCalendarApp;
use egui::{Color32, RichText};

fn secondary_text_color(is_dark: bool) -> Color32 {
    if is_dark {
        Color32::from_gray(160)
    } else {
        Color32::from_gray(100)
    }
}

impl SalonCalendarApp {
    pub(super) fn render_status_bar(&mut self, ctx: &egui::Context) {
        let color = secondary_text_color(self.is_dark);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let count = self.board.appointments().len();
                ui.label(
                    RichText::new(format!(
                        "{} appointment{}",
                        count,
                        if count == 1 { "" } else { "s" }
                    ))
                    .color(color),
                );

                let last_action = self.last_action.borrow();
                if !last_action.is_empty() {
                    ui.separator();
                    ui.label(RichText::new(last_action.as_str()).color(color));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(RichText::new(self.settings.base_url()).color(color).small());
                });
            });
        });
    }
}
