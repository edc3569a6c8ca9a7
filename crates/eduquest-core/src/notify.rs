//! Transient user notifications.
//!
//! Components report validation failures, API failures, success messages and
//! cosmetic progress through a [`Notifier`]. The CLI prints them; tests record
//! them.

use std::sync::Mutex;

/// Notification sink for the wizard components.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    /// Cosmetic progress, `percent` in `0..=100`.
    fn progress(&self, percent: u8, status: &str);
}

/// A recorded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
    Progress(u8, String),
}

/// Notifier that keeps everything it is told, in order.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    /// Error messages only.
    pub fn errors(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Error(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    /// Success messages only.
    pub fn successes(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Success(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    /// Progress percentages only.
    pub fn progress_values(&self) -> Vec<u8> {
        self.lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Progress(p, _) => Some(*p),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        // A poisoned log is still a valid log.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.lock().push(Notification::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.lock().push(Notification::Error(message.to_string()));
    }

    fn progress(&self, percent: u8, status: &str) {
        self.lock()
            .push(Notification::Progress(percent, status.to_string()));
    }
}
