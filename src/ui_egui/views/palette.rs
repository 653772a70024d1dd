use egui::Color32;

use crate::models::appointment::PaymentStatus;

fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

fn blend(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |c1: u8, c2: u8| -> u8 { ((c1 as f32 * (1.0 - t)) + (c2 as f32 * t)).round() as u8 };
    Color32::from_rgb(lerp(a.r(), b.r()), lerp(a.g(), b.g()), lerp(a.b(), b.b()))
}

#[derive(Clone, Copy)]
pub struct TimeGridPalette {
    pub regular_bg: Color32,
    pub today_bg: Color32,
    pub header_bg: Color32,
    pub header_text: Color32,
    pub label_text: Color32,
    pub hour_line: Color32,
    pub slot_line: Color32,
    pub divider: Color32,
    pub hover_overlay: Color32,
    pub selected_overlay: Color32,
    pub drop_fill: Color32,
    pub drop_stroke: Color32,
    pub card_text: Color32,
}

impl TimeGridPalette {
    pub fn new(is_dark: bool) -> Self {
        let (background, border, text, accent) = if is_dark {
            (
                Color32::from_rgb(32, 34, 38),
                Color32::from_rgb(70, 74, 82),
                Color32::from_rgb(220, 222, 228),
                Color32::from_rgb(90, 150, 230),
            )
        } else {
            (
                Color32::from_rgb(252, 252, 253),
                Color32::from_rgb(210, 214, 220),
                Color32::from_rgb(40, 42, 48),
                Color32::from_rgb(40, 110, 210),
            )
        };

        Self {
            regular_bg: background,
            today_bg: blend(background, accent, 0.08),
            header_bg: blend(background, border, 0.35),
            header_text: text,
            label_text: Color32::GRAY,
            hour_line: border,
            slot_line: with_alpha(border, 110),
            divider: with_alpha(border, 220),
            hover_overlay: with_alpha(accent, if is_dark { 60 } else { 35 }),
            selected_overlay: with_alpha(accent, if is_dark { 110 } else { 70 }),
            drop_fill: Color32::from_rgba_unmultiplied(120, 200, 120, 60),
            drop_stroke: Color32::from_rgb(120, 200, 120),
            card_text: Color32::WHITE,
        }
    }

    /// Card fill by payment status label.
    pub fn card_fill(&self, status: &str) -> Color32 {
        match PaymentStatus::parse(status) {
            Some(PaymentStatus::Paid) => Color32::from_rgb(70, 150, 100),
            Some(PaymentStatus::PartiallyPaid) => Color32::from_rgb(200, 140, 50),
            Some(PaymentStatus::Refunded) => Color32::from_rgb(130, 130, 140),
            Some(PaymentStatus::Unpaid) | None => Color32::from_rgb(100, 150, 200),
        }
    }

    /// Faded fill for a card that is being dragged away.
    pub fn ghost(&self, fill: Color32) -> Color32 {
        with_alpha(fill, 90)
    }
}
