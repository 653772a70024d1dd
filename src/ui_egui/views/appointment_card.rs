//! Painting of a single appointment card on the week grid.

use egui::{Pos2, Rect, Rounding, Vec2};

use super::palette::TimeGridPalette;
use crate::models::appointment::Appointment;

/// Side of the square context-menu button in a card's top-right corner.
pub const MENU_ZONE_SIZE: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRects {
    pub body: Rect,
    pub menu: Rect,
}

impl CardRects {
    pub fn new(bounds: Rect) -> Self {
        let body = bounds.shrink2(Vec2::new(1.0, 1.0));
        let side = MENU_ZONE_SIZE.min(body.width()).min(body.height());
        let menu = Rect::from_min_size(Pos2::new(body.right() - side, body.top()), Vec2::splat(side));
        Self { body, menu }
    }
}

/// Text lines shown on a card. Compact cards keep only the service and time.
pub fn card_lines(appointment: &Appointment, compact: bool) -> Vec<String> {
    let title = if appointment.service_name.is_empty() {
        appointment.customer_name.clone()
    } else {
        appointment.service_name.clone()
    };

    if compact {
        return vec![title, appointment.time.clone()];
    }

    let mut lines = vec![title];
    if !appointment.customer_name.is_empty() && appointment.customer_name != lines[0] {
        lines.push(appointment.customer_name.clone());
    }
    lines.push(format!("{} · {}", appointment.time, appointment.duration));
    let mut money = appointment.price.clone();
    if !appointment.status.is_empty() {
        money = format!("{} {}", money, appointment.status).trim().to_string();
    }
    if !money.is_empty() {
        lines.push(money);
    }
    lines
}

pub fn card_details(appointment: &Appointment) -> String {
    let mut details = format!(
        "{}\n{} {}\n{}",
        appointment.service_name, appointment.date, appointment.time, appointment.duration
    );
    if !appointment.customer_name.is_empty() {
        details.push_str(&format!("\n{}", appointment.customer_name));
    }
    if !appointment.contact.is_empty() {
        details.push_str(&format!("\n{}", appointment.contact));
    }
    if !appointment.price.is_empty() {
        details.push_str(&format!("\n{} ({})", appointment.price, appointment.status));
    }
    details
}

pub fn paint_card(
    ui: &egui::Ui,
    rects: &CardRects,
    appointment: &Appointment,
    palette: &TimeGridPalette,
    compact: bool,
    being_dragged: bool,
) {
    let fill = palette.card_fill(&appointment.status);
    let fill = if being_dragged { palette.ghost(fill) } else { fill };
    let painter = ui.painter_at(rects.body);
    painter.rect_filled(rects.body, Rounding::same(3.0), fill);

    let font_id = egui::FontId::proportional(if compact { 9.5 } else { 10.5 });
    let text_width = (rects.body.width() - MENU_ZONE_SIZE - 4.0).max(1.0);
    let mut y = rects.body.top() + 2.0;
    for line in card_lines(appointment, compact) {
        if y > rects.body.bottom() {
            break;
        }
        let mut job = egui::text::LayoutJob::simple_singleline(line, font_id.clone(), palette.card_text);
        job.wrap.max_width = text_width;
        job.wrap.max_rows = 1;
        let galley = ui.fonts(|f| f.layout_job(job));
        let height = galley.size().y;
        painter.galley(Pos2::new(rects.body.left() + 4.0, y), galley, palette.card_text);
        y += height;
    }

    painter.text(
        rects.menu.center(),
        egui::Align2::CENTER_CENTER,
        "⋮",
        egui::FontId::proportional(11.0),
        palette.card_text,
    );
}
