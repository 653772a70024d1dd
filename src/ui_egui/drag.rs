//! Drag-and-drop state for moving appointment cards between slots.
//!
//! The coordinator knows nothing about appointments beyond their ids: it
//! tracks which card is held, which registered drop target the pointer is
//! over, and reports the drop. Applying the move is the board's job.

use egui::{Pos2, Rect};

/// Where on a card the pointer went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOrigin {
    Card,
    /// The card's context-menu button. Never starts a drag.
    ContextMenu,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointerPress {
    pub appointment_id: String,
    pub pos: Pos2,
    pub origin: PressOrigin,
}

impl PointerPress {
    pub fn on_card(appointment_id: impl Into<String>, pos: Pos2) -> Self {
        Self {
            appointment_id: appointment_id.into(),
            pos,
            origin: PressOrigin::Card,
        }
    }

    pub fn on_context_menu(appointment_id: impl Into<String>, pos: Pos2) -> Self {
        Self {
            appointment_id: appointment_id.into(),
            pos,
            origin: PressOrigin::ContextMenu,
        }
    }
}

/// The card currently held by the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct DragTransaction {
    pub appointment_id: String,
    pub hovered_placeholder: Option<String>,
    pub pointer: Pos2,
}

impl DragTransaction {
    pub fn over_valid_target(&self) -> bool {
        self.hovered_placeholder.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragTransaction),
    /// Released; waiting for the owner to apply the drop and call `finish`.
    Dropped,
}

/// Pointer feedback drawn on top of the grid while dragging.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverCursor {
    pub pos: Pos2,
    pub label: String,
    pub over_target: bool,
}

/// A finished gesture, handed to whoever owns the appointment list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropCandidate {
    pub appointment_id: String,
    /// `None` when the card was released outside every drop target.
    pub placeholder: Option<String>,
}

/// Pointer input a drag-aware surface accepts.
pub trait PointerGestures {
    fn register_drop_target(&mut self, id: &str, bounds: Rect);
    fn on_pointer_down(&mut self, press: PointerPress);
    fn on_pointer_move(&mut self, pos: Pos2);
    fn on_pointer_up(&mut self, pos: Pos2);
}

#[derive(Debug, Default)]
pub struct DragCoordinator {
    state: DragState,
    targets: Vec<(String, Rect)>,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn transaction(&self) -> Option<&DragTransaction> {
        match &self.state {
            DragState::Dragging(transaction) => Some(transaction),
            _ => None,
        }
    }

    /// Drop targets are re-registered by every frame that draws them.
    pub fn begin_frame(&mut self) {
        self.targets.clear();
    }

    pub fn register_target(&mut self, id: &str, bounds: Rect) {
        self.targets.push((id.to_string(), bounds));
    }

    pub fn target_at(&self, pos: Pos2) -> Option<&str> {
        self.targets
            .iter()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(id, _)| id.as_str())
    }

    pub fn target_bounds(&self, id: &str) -> Option<Rect> {
        self.targets
            .iter()
            .find(|(target, _)| target == id)
            .map(|(_, rect)| *rect)
    }

    /// Returns `true` when the press started a drag.
    pub fn press(&mut self, press: PointerPress) -> bool {
        if press.origin == PressOrigin::ContextMenu {
            return false;
        }
        if !matches!(self.state, DragState::Idle) {
            log::debug!("Ignoring press on {} while a drag is active", press.appointment_id);
            return false;
        }

        let hovered_placeholder = self.target_at(press.pos).map(str::to_string);
        self.state = DragState::Dragging(DragTransaction {
            appointment_id: press.appointment_id,
            hovered_placeholder,
            pointer: press.pos,
        });
        true
    }

    pub fn update_hover(&mut self, pos: Pos2) {
        let hovered = self.target_at(pos).map(str::to_string);
        if let DragState::Dragging(transaction) = &mut self.state {
            transaction.pointer = pos;
            transaction.hovered_placeholder = hovered;
        }
    }

    /// Hover feedback for the current pointer position. `label_for` names the
    /// hovered target, e.g. with its slot time.
    pub fn hover_cursor(&self, label_for: impl Fn(&str) -> Option<String>) -> Option<HoverCursor> {
        let transaction = self.transaction()?;
        let label = transaction
            .hovered_placeholder
            .as_deref()
            .and_then(label_for)
            .unwrap_or_default();
        Some(HoverCursor {
            pos: transaction.pointer,
            over_target: transaction.over_valid_target(),
            label,
        })
    }

    /// Release the held card at `pos`. `None` when nothing was being dragged.
    pub fn release(&mut self, pos: Pos2) -> Option<DropCandidate> {
        self.update_hover(pos);
        match std::mem::replace(&mut self.state, DragState::Dropped) {
            DragState::Dragging(transaction) => Some(DropCandidate {
                appointment_id: transaction.appointment_id,
                placeholder: transaction.hovered_placeholder,
            }),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn finish(&mut self) {
        self.state = DragState::Idle;
    }
}
