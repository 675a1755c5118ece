//! User-facing notifications (toasts, alerts).
//!
//! Notifications are fire-and-forget: nothing waits on them and they cannot
//! fail from the caller's point of view.

use std::cell::RefCell;

pub trait Notifier {
    fn notify_success(&self, message: &str);
    fn notify_error(&self, message: &str);

    /// Rest countdown reached zero
    fn notify_timer_done(&self) {
        self.notify_success("Rest time is over");
    }
}

/// Sends notifications to the log
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_success(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn notify_error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
    TimerDone,
}

/// Keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_success(&self, message: &str) {
        self.sent
            .borrow_mut()
            .push(Notification::Success(message.to_string()));
    }

    fn notify_error(&self, message: &str) {
        self.sent
            .borrow_mut()
            .push(Notification::Error(message.to_string()));
    }

    fn notify_timer_done(&self) {
        self.sent.borrow_mut().push(Notification::TimerDone);
    }
}
