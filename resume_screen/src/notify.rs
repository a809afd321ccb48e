//! Transient user-visible notices.
//!
//! Components push notices through a [`Notifier`]; whatever renders the
//! application drains the paired receiver. Sending never fails the caller:
//! if the view has gone away the notice is dropped.

use chrono::{DateTime, Utc};
use std::fmt;
use tokio::sync::mpsc;

/// Importance label used to direct user attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

/// A timestamped notice.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NoticeKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Info => "info",
            NoticeKind::Error => "error",
        };
        write!(
            f,
            "[{} {label}] {}",
            self.timestamp.format("%H:%M:%S"),
            self.message
        )
    }
}

/// Sending half of the notification channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

/// Create a notifier and the receiver the view drains.
pub fn channel() -> (Notifier, mpsc::UnboundedReceiver<Notification>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Notifier { tx }, rx)
}

impl Notifier {
    pub fn success(&self, message: impl Into<String>) {
        self.push(Notification::new(NoticeKind::Success, message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Notification::new(NoticeKind::Info, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Notification::new(NoticeKind::Error, message));
    }

    fn push(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            log::debug!("notification dropped, no receiver");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_arrive_in_order() {
        let (notifier, mut rx) = channel();
        notifier.success("saved");
        notifier.error("failed");

        let first = rx.try_recv().unwrap();
        assert_eq!(first.kind, NoticeKind::Success);
        assert_eq!(first.message, "saved");

        let second = rx.try_recv().unwrap();
        assert!(second.is_error());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_without_receiver_is_silent() {
        let (notifier, rx) = channel();
        drop(rx);
        notifier.info("nobody listening");
    }

    #[test]
    fn test_display_includes_label() {
        let notice = Notification::new(NoticeKind::Error, "Backend error");
        let rendered = notice.to_string();
        assert!(rendered.contains("error]"));
        assert!(rendered.ends_with("Backend error"));
    }
}
