//! Player-facing alerts raised by the session, delivered in FIFO order.

use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Warning,
    Failure,
    Info,
}

impl AlertKind {
    fn tag(self) -> &'static str {
        match self {
            AlertKind::Success => "ok",
            AlertKind::Warning => "warn",
            AlertKind::Failure => "fail",
            AlertKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub kind: AlertKind,
}

impl Alert {
    pub fn new(message: impl Into<String>, kind: AlertKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.tag(), self.message)
    }
}

#[derive(Debug, Default)]
pub struct AlertQueue {
    pending: VecDeque<Alert>,
}

impl AlertQueue {
    pub fn push(&mut self, alert: Alert) {
        tracing::debug!(kind = ?alert.kind, message = %alert.message, "alert queued");
        self.pending.push_back(alert);
    }

    /// Take every pending alert, oldest first.
    pub fn drain(&mut self) -> Vec<Alert> {
        self.pending.drain(..).collect()
    }
}
