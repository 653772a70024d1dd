//! The week board: owns the appointment list and turns finished drags into
//! optimistic moves plus background reschedule requests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use egui::{Pos2, Rect};

use crate::models::appointment::{Appointment, AppointmentFilter, MovedAppointment, PaymentStatus};
use crate::services::appointment::dispatcher::Waker;
use crate::services::appointment::{
    AppointmentError, AppointmentService, AppointmentStore, DispatchOutcome, RecordConverter,
    RescheduleDispatcher, RescheduleRequest,
};
use crate::services::notification::{NotificationKind, Notifier};
use crate::services::schedule::{layout_cards, CardLayout, PlaceholderGrid, TimeGrid};
use crate::utils::date::format_display_date;

use super::drag::{DragCoordinator, DropCandidate, HoverCursor, PointerGestures, PointerPress};

pub type DragEndCallback = Box<dyn FnMut(&[Appointment], Option<&MovedAppointment>)>;
pub type SlotSelectCallback = Box<dyn FnMut(&str)>;

const RESCHEDULED_MESSAGE: &str = "Appointment rescheduled";

pub struct ScheduleBoard<N: Notifier> {
    store: AppointmentStore,
    grid: TimeGrid,
    placeholders: PlaceholderGrid,
    drag: DragCoordinator,
    dispatcher: RescheduleDispatcher,
    notifier: N,
    /// Optimistic slots whose reschedule has not reported back, re-applied
    /// over reloads that race with them.
    pending_moves: HashMap<String, (String, String)>,
    selected_slot: Option<String>,
    page_size: u32,
    payment_status: Option<PaymentStatus>,
    category_id: Option<i64>,
    on_drag_end: Option<DragEndCallback>,
    on_time_slot_select: Option<SlotSelectCallback>,
}

impl<N: Notifier> ScheduleBoard<N> {
    pub fn new(
        service: Arc<dyn AppointmentService>,
        converter: RecordConverter,
        page_size: u32,
        notifier: N,
    ) -> Self {
        let grid = TimeGrid::new();
        let placeholders = PlaceholderGrid::new(Vec::new(), &grid);
        Self {
            store: AppointmentStore::new(),
            grid,
            placeholders,
            drag: DragCoordinator::new(),
            dispatcher: RescheduleDispatcher::new(service, converter),
            notifier,
            pending_moves: HashMap::new(),
            selected_slot: None,
            page_size,
            payment_status: None,
            category_id: None,
            on_drag_end: None,
            on_time_slot_select: None,
        }
    }

    pub fn set_waker(&mut self, waker: Waker) {
        self.dispatcher.set_waker(waker);
    }

    pub fn on_drag_end(&mut self, callback: DragEndCallback) {
        self.on_drag_end = Some(callback);
    }

    pub fn on_time_slot_select(&mut self, callback: SlotSelectCallback) {
        self.on_time_slot_select = Some(callback);
    }

    /// Narrow the list query. Takes effect on the next refresh.
    pub fn set_query(&mut self, payment_status: Option<PaymentStatus>, category_id: Option<i64>) {
        self.payment_status = payment_status;
        self.category_id = category_id;
    }

    /// Show `dates` as columns and load their appointments.
    pub fn set_visible_dates(&mut self, dates: &[NaiveDate]) -> Result<(), AppointmentError> {
        let (first, last) = match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(AppointmentError::NoRange),
        };

        let columns = dates.iter().map(|date| format_display_date(*date)).collect();
        self.placeholders = PlaceholderGrid::new(columns, &self.grid);

        let mut filter = AppointmentFilter::for_range(first, last, self.page_size);
        filter.payment_status = self.payment_status;
        filter.category_id = self.category_id;
        self.dispatcher.set_filter(filter);
        self.refresh()
    }

    /// Reload the visible range in the background.
    pub fn refresh(&mut self) -> Result<(), AppointmentError> {
        if let Some(mut filter) = self.dispatcher.filter().cloned() {
            filter.payment_status = self.payment_status;
            filter.category_id = self.category_id;
            self.dispatcher.set_filter(filter);
        }
        self.dispatcher.request_reload()
    }

    pub fn appointments(&self) -> &[Appointment] {
        self.store.appointments()
    }

    pub fn store(&self) -> &AppointmentStore {
        &self.store
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn placeholders(&self) -> &PlaceholderGrid {
        &self.placeholders
    }

    pub fn drag(&self) -> &DragCoordinator {
        &self.drag
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn selected_slot(&self) -> Option<&str> {
        self.selected_slot.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.dispatcher.is_busy()
    }

    pub fn card_layouts(&self) -> Vec<CardLayout> {
        layout_cards(self.store.appointments(), self.placeholders.columns(), &self.grid)
    }

    /// Highlight a slot and tell the parent about it.
    pub fn select_time_slot(&mut self, label: &str) {
        if self.grid.index_of(label).is_none() {
            log::debug!("Ignoring selection of unknown slot {:?}", label);
            return;
        }
        self.selected_slot = Some(label.to_string());
        if let Some(callback) = self.on_time_slot_select.as_mut() {
            callback(label);
        }
    }

    /// Drop targets must be registered again by each frame that draws them.
    pub fn begin_frame(&mut self) {
        self.drag.begin_frame();
    }

    pub fn hover_cursor(&self) -> Option<HoverCursor> {
        let placeholders = &self.placeholders;
        self.drag.hover_cursor(|id| {
            let cell = placeholders.resolve(id)?;
            let (date, label) = placeholders.slot_of(cell)?;
            Some(format!("{} {}", date, label))
        })
    }

    /// Apply results that finished since the last frame.
    pub fn poll(&mut self) {
        for outcome in self.dispatcher.poll() {
            self.apply_outcome(outcome);
        }
    }

    /// Block until every request has reported back, or `timeout` passes.
    pub fn settle(&mut self, timeout: Duration) {
        for outcome in self.dispatcher.wait_idle(timeout) {
            self.apply_outcome(outcome);
        }
    }

    fn apply_outcome(&mut self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Rescheduled { appointment_id } => {
                self.pending_moves.remove(&appointment_id);
                self.notifier.show(RESCHEDULED_MESSAGE, NotificationKind::Success);
            }
            DispatchOutcome::RescheduleFailed {
                appointment_id,
                error,
            } => {
                self.pending_moves.remove(&appointment_id);
                self.notifier.show(
                    &format!("Could not reschedule appointment: {}", error),
                    NotificationKind::Error,
                );
            }
            DispatchOutcome::Superseded { appointment_id } => {
                log::debug!("Reschedule of {} superseded by a newer drop", appointment_id);
            }
            DispatchOutcome::Reloaded(appointments) => {
                log::info!("Loaded {} appointments", appointments.len());
                self.store.replace_all(appointments);
                for (id, (date, time)) in &self.pending_moves {
                    self.store.move_to(id, date, time);
                }
            }
            DispatchOutcome::ReloadFailed(error) => {
                self.notifier.show(
                    &format!("Could not load appointments: {}", error),
                    NotificationKind::Error,
                );
            }
        }
    }

    fn handle_drop(&mut self, candidate: DropCandidate) {
        let moved = self.apply_drop(&candidate);
        self.drag.finish();
        if let Some(callback) = self.on_drag_end.as_mut() {
            callback(self.store.appointments(), moved.as_ref());
        }
    }

    fn apply_drop(&mut self, candidate: &DropCandidate) -> Option<MovedAppointment> {
        let placeholder = candidate.placeholder.as_deref()?;
        let Some(cell) = self.placeholders.resolve(placeholder) else {
            log::debug!("Dropped on unknown placeholder {}", placeholder);
            return None;
        };
        let (date, time) = self
            .placeholders
            .slot_of(cell)
            .map(|(date, time)| (date.to_string(), time.to_string()))?;

        let moved = self.store.move_to(&candidate.appointment_id, &date, &time)?;
        log::info!(
            "Moving appointment {} from {} {} to {} {}",
            moved.id,
            moved.from_date,
            moved.from_time,
            moved.to_date,
            moved.to_time
        );

        match self.reschedule_request(&moved) {
            Ok(request) => {
                self.pending_moves.insert(moved.id.clone(), (date, time));
                self.dispatcher.submit(request);
            }
            Err(error) => {
                log::error!("Cannot reschedule appointment {}: {}", moved.id, error);
                self.notifier.show(
                    &format!("Could not reschedule appointment: {}", error),
                    NotificationKind::Error,
                );
                if let Err(err) = self.dispatcher.request_reload() {
                    log::error!("Cannot reload appointments: {}", err);
                }
            }
        }
        Some(moved)
    }

    fn reschedule_request(&self, moved: &MovedAppointment) -> Result<RescheduleRequest, AppointmentError> {
        let backend_id = self
            .store
            .get(&moved.id)
            .and_then(Appointment::backend_id)
            .ok_or_else(|| AppointmentError::InvalidId(moved.id.clone()))?;
        let timestamp = self
            .dispatcher
            .converter()
            .zone
            .api_timestamp(&moved.to_time, &moved.to_date)
            .ok_or_else(|| AppointmentError::InvalidSlot {
                date: moved.to_date.clone(),
                time: moved.to_time.clone(),
            })?;

        Ok(RescheduleRequest {
            appointment_id: moved.id.clone(),
            backend_id,
            timestamp,
        })
    }
}

impl<N: Notifier> PointerGestures for ScheduleBoard<N> {
    fn register_drop_target(&mut self, id: &str, bounds: Rect) {
        self.drag.register_target(id, bounds);
    }

    fn on_pointer_down(&mut self, press: PointerPress) {
        if self.store.get(&press.appointment_id).is_none() {
            return;
        }
        self.drag.press(press);
    }

    fn on_pointer_move(&mut self, pos: Pos2) {
        self.drag.update_hover(pos);
    }

    fn on_pointer_up(&mut self, pos: Pos2) {
        if let Some(candidate) = self.drag.release(pos) {
            self.handle_drop(candidate);
        }
    }
}
