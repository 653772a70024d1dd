//! User-facing notifications raised by the schedule board.
//!
//! The board never renders anything itself; it reports outcomes through
//! [`Notifier`], which the egui toast manager implements for the desktop app.

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Something that can show a short message to the user.
pub trait Notifier {
    fn show(&mut self, message: &str, kind: NotificationKind);
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn show(&mut self, message: &str, kind: NotificationKind) {
        (**self).show(message, kind);
    }
}

/// Notifier that keeps every message, for headless use and tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    pub messages: Vec<(String, NotificationKind)>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.messages.iter().filter(|(_, k)| *k == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&mut self, message: &str, kind: NotificationKind) {
        log::debug!("Notification ({:?}): {}", kind, message);
        self.messages.push((message.to_string(), kind));
    }
}
