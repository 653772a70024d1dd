//! Week grid: day headers, the 96-row slot lattice, appointment cards and
//! the pointer plumbing that feeds egui input into the board's drag handling.

use chrono::{Local, NaiveDate};
use egui::{CursorIcon, Pos2, Rect, Sense, Stroke, Vec2};

use super::appointment_card::{card_details, paint_card, CardRects};
use super::palette::TimeGridPalette;
use crate::services::notification::Notifier;
use crate::services::schedule::{card_bounds, duration_to_span, is_compact, GridCell, PlaceholderGrid};
use crate::ui_egui::board::ScheduleBoard;
use crate::ui_egui::drag::{PointerGestures, PointerPress, PressOrigin};

pub const TIME_LABEL_WIDTH: f32 = 64.0;
pub const COLUMN_SPACING: f32 = 1.0;
pub const HEADER_HEIGHT: f32 = 28.0;
const MIN_COLUMN_WIDTH: f32 = 40.0;

#[derive(Debug, Clone, Copy)]
pub struct WeekViewConfig {
    pub slot_height: f32,
    pub compact_card_width: f32,
}

#[derive(Default)]
pub struct WeekView {
    /// Appointment whose details window is open.
    details_for: Option<String>,
}

impl WeekView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show<N: Notifier>(
        &mut self,
        ui: &mut egui::Ui,
        board: &mut ScheduleBoard<N>,
        dates: &[NaiveDate],
        config: WeekViewConfig,
        palette: &TimeGridPalette,
    ) {
        board.begin_frame();

        let columns = dates.len().max(1) as f32;
        let available = ui.available_width() - TIME_LABEL_WIDTH - COLUMN_SPACING * columns;
        let col_width = (available / columns).max(MIN_COLUMN_WIDTH);

        render_header(ui, dates, col_width, palette);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let column_rects = render_grid(ui, board, dates, col_width, config, palette);
                self.render_cards(ui, board, &column_rects, config, palette);
                draw_drop_highlight(ui, board, config, palette);
                forward_pointer(ui, board);
            });

        draw_hover_cursor(ui.ctx(), board);
        self.render_details(ui.ctx(), board);
    }

    fn render_cards<N: Notifier>(
        &mut self,
        ui: &mut egui::Ui,
        board: &mut ScheduleBoard<N>,
        column_rects: &[Rect],
        config: WeekViewConfig,
        palette: &TimeGridPalette,
    ) {
        let dragged_id = board.drag().transaction().map(|t| t.appointment_id.clone());

        for layout in board.card_layouts() {
            let Some(appointment) = board.store().get(&layout.id).cloned() else {
                continue;
            };
            let Some(column) = column_rects.get(layout.span.column) else {
                continue;
            };

            let bounds = card_bounds(
                column.left(),
                column.width(),
                column.top(),
                config.slot_height,
                layout.span,
                layout.geometry,
            );
            let rect = Rect::from_min_size(
                Pos2::new(bounds.left, bounds.top),
                Vec2::new(bounds.width, bounds.height),
            );
            let rects = CardRects::new(rect);
            let compact = is_compact(rect.width(), config.compact_card_width);
            let being_dragged = dragged_id.as_deref() == Some(appointment.id.as_str());

            paint_card(ui, &rects, &appointment, palette, compact, being_dragged);

            let response = ui.interact(
                rects.body,
                ui.id().with(("appointment", &appointment.id)),
                Sense::click_and_drag(),
            );
            let menu_response = ui.interact(
                rects.menu,
                ui.id().with(("appointment_menu", &appointment.id)),
                Sense::click(),
            );

            if response.drag_started() {
                let press_pos = ui
                    .input(|i| i.pointer.press_origin())
                    .or_else(|| response.interact_pointer_pos());
                if let Some(pos) = press_pos {
                    let origin = if rects.menu.contains(pos) {
                        PressOrigin::ContextMenu
                    } else {
                        PressOrigin::Card
                    };
                    board.on_pointer_down(PointerPress {
                        appointment_id: appointment.id.clone(),
                        pos,
                        origin,
                    });
                }
            }

            if menu_response.clicked() {
                self.details_for = Some(appointment.id.clone());
            }

            if dragged_id.is_none() {
                if response.hovered() {
                    ui.ctx().set_cursor_icon(CursorIcon::Grab);
                }
                response.on_hover_text(card_details(&appointment));
            }
        }
    }

    fn render_details<N: Notifier>(&mut self, ctx: &egui::Context, board: &ScheduleBoard<N>) {
        let Some(id) = self.details_for.clone() else {
            return;
        };
        let Some(appointment) = board.store().get(&id) else {
            self.details_for = None;
            return;
        };

        let mut open = true;
        egui::Window::new("Appointment")
            .id(egui::Id::new("appointment_details"))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(card_details(appointment));
            });
        if !open {
            self.details_for = None;
        }
    }
}

fn render_header(ui: &mut egui::Ui, dates: &[NaiveDate], col_width: f32, palette: &TimeGridPalette) {
    let today = Local::now().date_naive();
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        ui.add_space(TIME_LABEL_WIDTH + COLUMN_SPACING);

        for date in dates {
            let (rect, _) = ui.allocate_exact_size(Vec2::new(col_width, HEADER_HEIGHT), Sense::hover());
            let fill = if *date == today {
                palette.today_bg
            } else {
                palette.header_bg
            };
            ui.painter().rect_filled(rect, 0.0, fill);
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                date.format("%a %d/%m").to_string(),
                egui::FontId::proportional(13.0),
                palette.header_text,
            );
            ui.add_space(COLUMN_SPACING);
        }
    });
}

/// Draw the slot lattice and register every cell as a drop target. Returns the
/// full-height rect of each day column.
fn render_grid<N: Notifier>(
    ui: &mut egui::Ui,
    board: &mut ScheduleBoard<N>,
    dates: &[NaiveDate],
    col_width: f32,
    config: WeekViewConfig,
    palette: &TimeGridPalette,
) -> Vec<Rect> {
    let today = Local::now().date_naive();
    let labels = board.grid().labels().to_vec();
    let mut column_rects: Vec<Rect> = Vec::with_capacity(dates.len());

    ui.spacing_mut().item_spacing.y = 0.0;

    for (row, label) in labels.iter().enumerate() {
        let is_hour_start = row % 4 == 0;
        let is_selected = board.selected_slot() == Some(label.as_str());

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;

            ui.allocate_ui_with_layout(
                Vec2::new(TIME_LABEL_WIDTH, config.slot_height),
                egui::Layout::right_to_left(egui::Align::Center),
                |ui| {
                    if is_hour_start {
                        ui.add_space(5.0);
                        ui.label(egui::RichText::new(label).size(12.0).color(palette.label_text));
                    }
                },
            );
            ui.add_space(COLUMN_SPACING);

            for (column, date) in dates.iter().enumerate() {
                let (rect, response) =
                    ui.allocate_exact_size(Vec2::new(col_width, config.slot_height), Sense::click());

                let cell = GridCell { column, start: row };
                board.register_drop_target(&PlaceholderGrid::id_for(cell), rect);

                match column_rects.get_mut(column) {
                    Some(column_rect) => *column_rect = column_rect.union(rect),
                    None => column_rects.push(rect),
                }

                let fill = if *date == today {
                    palette.today_bg
                } else {
                    palette.regular_bg
                };
                let painter = ui.painter();
                painter.rect_filled(rect, 0.0, fill);
                painter.line_segment(
                    [rect.left_top(), rect.right_top()],
                    Stroke::new(1.0, if is_hour_start { palette.hour_line } else { palette.slot_line }),
                );
                painter.line_segment([rect.right_top(), rect.right_bottom()], Stroke::new(1.0, palette.divider));

                if is_selected {
                    painter.rect_filled(rect, 0.0, palette.selected_overlay);
                } else if response.hovered() && !board.drag().is_dragging() {
                    painter.rect_filled(rect, 0.0, palette.hover_overlay);
                }

                if response.clicked() && !board.drag().is_dragging() {
                    board.select_time_slot(label);
                }

                ui.add_space(COLUMN_SPACING);
            }
        });
    }

    column_rects
}

/// Outline the rows the held card would occupy at the hovered slot.
fn draw_drop_highlight<N: Notifier>(
    ui: &egui::Ui,
    board: &ScheduleBoard<N>,
    config: WeekViewConfig,
    palette: &TimeGridPalette,
) {
    let Some(transaction) = board.drag().transaction() else {
        return;
    };
    let Some(target) = transaction
        .hovered_placeholder
        .as_deref()
        .and_then(|id| board.drag().target_bounds(id))
    else {
        return;
    };

    let span = board
        .store()
        .get(&transaction.appointment_id)
        .map(|appointment| duration_to_span(&appointment.duration))
        .unwrap_or(1)
        .max(1);
    let rect = Rect::from_min_size(
        target.min,
        Vec2::new(target.width(), config.slot_height * span as f32),
    );

    ui.painter().rect_filled(rect, 2.0, palette.drop_fill);
    ui.painter().rect_stroke(rect, 2.0, Stroke::new(2.0, palette.drop_stroke));
}

/// Feed native pointer input into the board while a card is held.
fn forward_pointer<N: Notifier>(ui: &egui::Ui, board: &mut ScheduleBoard<N>) {
    if !board.drag().is_dragging() {
        return;
    }

    let (pos, released) = ui.input(|i| {
        (
            i.pointer.interact_pos().or_else(|| i.pointer.hover_pos()),
            i.pointer.any_released(),
        )
    });
    let Some(pos) = pos else {
        return;
    };

    board.on_pointer_move(pos);
    if released {
        board.on_pointer_up(pos);
    } else {
        ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
        ui.ctx().request_repaint();
    }
}

fn draw_hover_cursor<N: Notifier>(ctx: &egui::Context, board: &ScheduleBoard<N>) {
    let Some(cursor) = board.hover_cursor() else {
        return;
    };

    egui::Area::new(egui::Id::new("drag_hover_cursor"))
        .fixed_pos(cursor.pos + Vec2::new(14.0, 14.0))
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                if cursor.over_target {
                    ui.label(format!("Move to {}", cursor.label));
                } else {
                    ui.weak("Drop on a time slot");
                }
            });
        });
}
