//! Background execution of reschedule and reload requests.
//!
//! Every request runs on its own worker thread and reports back over a
//! channel that the UI drains once per frame with [`RescheduleDispatcher::poll`].
//! Per appointment at most one reschedule is in flight; a newer drop for the
//! same appointment waits in a single-entry queue and replaces whatever was
//! queued before it, so the last drop always wins.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::models::appointment::{Appointment, AppointmentFilter};

use super::store::{fetch_appointments, RecordConverter};
use super::{AppointmentError, AppointmentService};

/// Called from worker threads after a result is queued, e.g. to request a repaint.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// A reschedule ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescheduleRequest {
    pub appointment_id: String,
    pub backend_id: i64,
    pub timestamp: String,
}

/// What the board learns from [`RescheduleDispatcher::poll`].
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Rescheduled { appointment_id: String },
    /// A reload of the current range has been started to restore server truth.
    RescheduleFailed {
        appointment_id: String,
        error: AppointmentError,
    },
    /// The request finished after a newer drop for the same appointment; the
    /// newer one has been sent and will report instead.
    Superseded { appointment_id: String },
    Reloaded(Vec<Appointment>),
    ReloadFailed(AppointmentError),
}

enum WorkerMessage {
    Rescheduled {
        appointment_id: String,
        result: Result<(), AppointmentError>,
    },
    Reloaded {
        generation: u64,
        result: Result<Vec<Appointment>, AppointmentError>,
    },
}

pub struct RescheduleDispatcher {
    service: Arc<dyn AppointmentService>,
    converter: RecordConverter,
    filter: Option<AppointmentFilter>,
    sender: Sender<WorkerMessage>,
    receiver: Receiver<WorkerMessage>,
    in_flight: HashSet<String>,
    queued: HashMap<String, RescheduleRequest>,
    reloads_running: usize,
    reload_generation: u64,
    /// Newest generation that has reported back.
    reported_generation: u64,
    waker: Option<Waker>,
}

impl RescheduleDispatcher {
    pub fn new(service: Arc<dyn AppointmentService>, converter: RecordConverter) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            service,
            converter,
            filter: None,
            sender,
            receiver,
            in_flight: HashSet::new(),
            queued: HashMap::new(),
            reloads_running: 0,
            reload_generation: 0,
            reported_generation: 0,
            waker: None,
        }
    }

    pub fn set_waker(&mut self, waker: Waker) {
        self.waker = Some(waker);
    }

    /// Range used by reloads, including the ones triggered by failures.
    pub fn set_filter(&mut self, filter: AppointmentFilter) {
        self.filter = Some(filter);
    }

    pub fn filter(&self) -> Option<&AppointmentFilter> {
        self.filter.as_ref()
    }

    pub fn converter(&self) -> &RecordConverter {
        &self.converter
    }

    /// Whether any request has not reported back yet.
    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty() || self.reloads_running > 0
    }

    pub fn is_in_flight(&self, appointment_id: &str) -> bool {
        self.in_flight.contains(appointment_id)
    }

    fn newest_reload_running(&self) -> bool {
        self.reported_generation < self.reload_generation
    }

    /// Send a reschedule, or queue it behind the one already in flight for the
    /// same appointment.
    pub fn submit(&mut self, request: RescheduleRequest) {
        if self.in_flight.contains(&request.appointment_id) {
            log::debug!(
                "Queueing reschedule of {} behind the request in flight",
                request.appointment_id
            );
            self.queued.insert(request.appointment_id.clone(), request);
            return;
        }
        self.spawn_reschedule(request);
    }

    /// Reload the current range in the background. Only the newest reload's
    /// result is reported.
    pub fn request_reload(&mut self) -> Result<(), AppointmentError> {
        let filter = self.filter.clone().ok_or(AppointmentError::NoRange)?;
        self.reload_generation += 1;
        let generation = self.reload_generation;
        let service = Arc::clone(&self.service);
        let converter = self.converter.clone();

        self.reloads_running += 1;
        self.spawn_worker(
            "appointment-reload",
            move || WorkerMessage::Reloaded {
                generation,
                result: fetch_appointments(service.as_ref(), &filter, &converter),
            },
            WorkerMessage::Reloaded {
                generation,
                result: Err(worker_unavailable()),
            },
        );
        Ok(())
    }

    /// Drain finished work without blocking.
    pub fn poll(&mut self) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            self.handle(message, &mut outcomes);
        }
        outcomes
    }

    /// Block until nothing is in flight or `timeout` passes.
    pub fn wait_idle(&mut self, timeout: Duration) -> Vec<DispatchOutcome> {
        let deadline = Instant::now() + timeout;
        let mut outcomes = self.poll();
        while self.is_busy() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(message) => self.handle(message, &mut outcomes),
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("Timed out waiting for appointment requests to finish");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        outcomes
    }

    fn handle(&mut self, message: WorkerMessage, outcomes: &mut Vec<DispatchOutcome>) {
        match message {
            WorkerMessage::Rescheduled {
                appointment_id,
                result,
            } => {
                self.in_flight.remove(&appointment_id);

                if let Some(next) = self.queued.remove(&appointment_id) {
                    if let Err(err) = &result {
                        log::debug!("Superseded reschedule of {} failed: {}", appointment_id, err);
                    }
                    self.spawn_reschedule(next);
                    outcomes.push(DispatchOutcome::Superseded { appointment_id });
                    return;
                }

                match result {
                    Ok(()) => {
                        // A reload already under way may have listed the old slot.
                        if self.newest_reload_running() {
                            log::debug!("Restarting reload that predates reschedule of {}", appointment_id);
                            if let Err(err) = self.request_reload() {
                                log::error!("Cannot restart appointment reload: {}", err);
                            }
                        }
                        outcomes.push(DispatchOutcome::Rescheduled { appointment_id });
                    }
                    Err(error) => {
                        log::error!("Failed to reschedule appointment {}: {}", appointment_id, error);
                        if let Err(err) = self.request_reload() {
                            log::error!("Cannot reload appointments after failure: {}", err);
                        }
                        outcomes.push(DispatchOutcome::RescheduleFailed {
                            appointment_id,
                            error,
                        });
                    }
                }
            }
            WorkerMessage::Reloaded { generation, result } => {
                self.reloads_running = self.reloads_running.saturating_sub(1);
                if generation != self.reload_generation {
                    log::debug!("Dropping stale appointment reload {}", generation);
                    return;
                }
                self.reported_generation = generation;
                match result {
                    Ok(appointments) => outcomes.push(DispatchOutcome::Reloaded(appointments)),
                    Err(error) => {
                        log::error!("Failed to reload appointments: {}", error);
                        outcomes.push(DispatchOutcome::ReloadFailed(error));
                    }
                }
            }
        }
    }

    fn spawn_reschedule(&mut self, request: RescheduleRequest) {
        let service = Arc::clone(&self.service);
        self.in_flight.insert(request.appointment_id.clone());
        let fallback = WorkerMessage::Rescheduled {
            appointment_id: request.appointment_id.clone(),
            result: Err(worker_unavailable()),
        };
        self.spawn_worker(
            "appointment-reschedule",
            move || WorkerMessage::Rescheduled {
                result: service.reschedule(request.backend_id, &request.timestamp),
                appointment_id: request.appointment_id,
            },
            fallback,
        );
    }

    /// Run `job` on a new thread. When no thread can be started, `fallback` is
    /// reported instead so the bookkeeping still settles.
    fn spawn_worker<F>(&self, name: &str, job: F, fallback: WorkerMessage)
    where
        F: FnOnce() -> WorkerMessage + Send + 'static,
    {
        let sender = self.sender.clone();
        let waker = self.waker.clone();
        let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
            // The receiver only disappears when the board is dropped.
            let _ = sender.send(job());
            if let Some(waker) = waker {
                waker();
            }
        });

        if let Err(err) = spawned {
            log::error!("Failed to start {} worker: {}", name, err);
            let _ = self.sender.send(fallback);
        }
    }
}

fn worker_unavailable() -> AppointmentError {
    AppointmentError::Transport("could not start a background worker".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointment::AppointmentRecord;
    use crate::services::appointment::MockAppointmentService;
    use crate::utils::date::DisplayZone;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Condvar, Mutex};

    const WAIT: Duration = Duration::from_secs(5);

    fn converter() -> RecordConverter {
        RecordConverter::new(DisplayZone::Utc, "$")
    }

    fn filter() -> AppointmentFilter {
        AppointmentFilter::for_range(
            NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 12).unwrap(),
            100,
        )
    }

    fn request(id: &str, timestamp: &str) -> RescheduleRequest {
        RescheduleRequest {
            appointment_id: id.to_string(),
            backend_id: id.parse().unwrap(),
            timestamp: timestamp.to_string(),
        }
    }

    fn record() -> AppointmentRecord {
        AppointmentRecord {
            id: 1,
            appointment_date: "2024-05-10T09:00:00Z".to_string(),
            duration: "01:00".to_string(),
            service_name: String::new(),
            customer_name: String::new(),
            customer_phone: String::new(),
            service_price: 0.0,
            payment_status_string: String::new(),
            category_id: None,
        }
    }

    #[test]
    fn test_successful_reschedule_reports_once() {
        let mut service = MockAppointmentService::new();
        service
            .expect_reschedule()
            .withf(|id, ts| *id == 1 && ts == "2024-05-10T14:30:00.000Z")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut dispatcher = RescheduleDispatcher::new(Arc::new(service), converter());
        dispatcher.submit(request("1", "2024-05-10T14:30:00.000Z"));
        let outcomes = dispatcher.wait_idle(WAIT);

        assert_eq!(
            outcomes,
            vec![DispatchOutcome::Rescheduled {
                appointment_id: "1".to_string()
            }]
        );
        assert!(!dispatcher.is_busy());
    }

    #[test]
    fn test_failure_triggers_reload() {
        let mut service = MockAppointmentService::new();
        service
            .expect_reschedule()
            .returning(|_, _| Err(AppointmentError::Status {
                status: 422,
                body: "slot taken".to_string(),
            }));
        service.expect_list().times(1).returning(|_| Ok(vec![record()]));

        let mut dispatcher = RescheduleDispatcher::new(Arc::new(service), converter());
        dispatcher.set_filter(filter());
        dispatcher.submit(request("1", "2024-05-10T14:30:00.000Z"));
        let outcomes = dispatcher.wait_idle(WAIT);

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(
            &outcomes[0],
            DispatchOutcome::RescheduleFailed { appointment_id, .. } if appointment_id == "1"
        ));
        match &outcomes[1] {
            DispatchOutcome::Reloaded(list) => assert_eq!(list[0].time, "9:00 AM"),
            other => panic!("expected reload, got {:?}", other),
        }
    }

    #[test]
    fn test_reload_without_range_is_rejected() {
        let service = MockAppointmentService::new();
        let mut dispatcher = RescheduleDispatcher::new(Arc::new(service), converter());
        assert_eq!(dispatcher.request_reload(), Err(AppointmentError::NoRange));
        assert!(!dispatcher.is_busy());
    }

    /// Holds a worker until released.
    struct Gate {
        open: Mutex<bool>,
        signal: Condvar,
    }

    impl Gate {
        fn wait(&self) {
            let mut open = self.open.lock().unwrap();
            while !*open {
                open = self.signal.wait(open).unwrap();
            }
        }

        fn release(&self) {
            *self.open.lock().unwrap() = true;
            self.signal.notify_all();
        }
    }

    #[test]
    fn test_newest_drop_wins_while_in_flight() {
        let gate = Arc::new(Gate {
            open: Mutex::new(false),
            signal: Condvar::new(),
        });
        let sent: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let mut service = MockAppointmentService::new();
        let gate_in_mock = Arc::clone(&gate);
        let sent_in_mock = Arc::clone(&sent);
        service.expect_reschedule().returning(move |_, ts| {
            gate_in_mock.wait();
            sent_in_mock.lock().unwrap().push(ts.to_string());
            Ok(())
        });

        let mut dispatcher = RescheduleDispatcher::new(Arc::new(service), converter());
        dispatcher.submit(request("1", "first"));
        dispatcher.submit(request("1", "second"));
        dispatcher.submit(request("1", "third"));
        assert!(dispatcher.is_in_flight("1"));

        gate.release();
        let outcomes = dispatcher.wait_idle(WAIT);

        assert_eq!(*sent.lock().unwrap(), vec!["first", "third"]);
        assert_eq!(
            outcomes,
            vec![
                DispatchOutcome::Superseded {
                    appointment_id: "1".to_string()
                },
                DispatchOutcome::Rescheduled {
                    appointment_id: "1".to_string()
                },
            ]
        );
    }

    /// Drain results until `done` holds for them or `WAIT` passes.
    fn poll_until(
        dispatcher: &mut RescheduleDispatcher,
        done: impl Fn(&[DispatchOutcome]) -> bool,
    ) -> Vec<DispatchOutcome> {
        let deadline = Instant::now() + WAIT;
        let mut outcomes = Vec::new();
        while !done(&outcomes) && Instant::now() < deadline {
            outcomes.extend(dispatcher.poll());
            thread::sleep(Duration::from_millis(5));
        }
        outcomes
    }

    #[test]
    fn test_reschedule_discards_reload_started_before_it() {
        let gate = Arc::new(Gate {
            open: Mutex::new(false),
            signal: Condvar::new(),
        });
        let lists = Arc::new(AtomicUsize::new(0));

        let mut service = MockAppointmentService::new();
        let gate_in_mock = Arc::clone(&gate);
        let lists_in_mock = Arc::clone(&lists);
        service.expect_list().returning(move |_| {
            let mut listed = record();
            if lists_in_mock.fetch_add(1, Ordering::SeqCst) == 0 {
                // First reload: old slot, held until the reschedule has landed.
                gate_in_mock.wait();
            } else {
                listed.appointment_date = "2024-05-10T14:30:00Z".to_string();
            }
            Ok(vec![listed])
        });
        service.expect_reschedule().returning(|_, _| Ok(()));

        let mut dispatcher = RescheduleDispatcher::new(Arc::new(service), converter());
        dispatcher.set_filter(filter());
        dispatcher.request_reload().unwrap();
        let deadline = Instant::now() + WAIT;
        while lists.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        dispatcher.submit(request("1", "2024-05-10T14:30:00.000Z"));

        let mut outcomes = poll_until(&mut dispatcher, |outcomes| {
            outcomes
                .iter()
                .any(|o| matches!(o, DispatchOutcome::Rescheduled { .. }))
        });
        gate.release();
        outcomes.extend(dispatcher.wait_idle(WAIT));

        let reloads: Vec<&Vec<Appointment>> = outcomes
            .iter()
            .filter_map(|o| match o {
                DispatchOutcome::Reloaded(list) => Some(list),
                _ => None,
            })
            .collect();
        assert_eq!(reloads.len(), 1);
        assert_eq!(reloads[0][0].time, "2:30 PM");
        assert_eq!(lists.load(Ordering::SeqCst), 2);
        assert!(!dispatcher.is_busy());
    }

    #[test]
    fn test_reschedule_after_reload_settled_does_not_reload() {
        let mut service = MockAppointmentService::new();
        service.expect_list().times(1).returning(|_| Ok(vec![record()]));
        service.expect_reschedule().returning(|_, _| Ok(()));

        let mut dispatcher = RescheduleDispatcher::new(Arc::new(service), converter());
        dispatcher.set_filter(filter());
        dispatcher.request_reload().unwrap();
        assert_eq!(dispatcher.wait_idle(WAIT).len(), 1);

        dispatcher.submit(request("1", "2024-05-10T14:30:00.000Z"));
        assert_eq!(
            dispatcher.wait_idle(WAIT),
            vec![DispatchOutcome::Rescheduled {
                appointment_id: "1".to_string()
            }]
        );
    }

    #[test]
    fn test_waker_called_per_result() {
        let mut service = MockAppointmentService::new();
        service.expect_reschedule().returning(|_, _| Ok(()));

        let wakes = Arc::new(AtomicUsize::new(0));
        let wakes_in_waker = Arc::clone(&wakes);
        let mut dispatcher = RescheduleDispatcher::new(Arc::new(service), converter());
        dispatcher.set_waker(Arc::new(move || {
            wakes_in_waker.fetch_add(1, Ordering::SeqCst);
        }));

        dispatcher.submit(request("1", "a"));
        dispatcher.submit(request("2", "b"));
        assert_eq!(dispatcher.wait_idle(WAIT).len(), 2);

        // The waker runs just after the result is sent.
        let deadline = Instant::now() + WAIT;
        while wakes.load(Ordering::SeqCst) < 2 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }
}
