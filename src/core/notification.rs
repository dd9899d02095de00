// In-app notifications.
//
// Only one toast is visible at a time; a new one replaces whatever is shown.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub shown_at: DateTime<Utc>,
}

pub struct NotificationCenter {
    current: Option<Notification>,
    timeout: Duration,
}

impl NotificationCenter {
    pub fn new(timeout_seconds: u64) -> Self {
        Self {
            current: None,
            timeout: timeout_from_secs(timeout_seconds),
        }
    }

    pub fn set_timeout(&mut self, timeout_seconds: u64) {
        self.timeout = timeout_from_secs(timeout_seconds);
    }

    pub fn show(&mut self, message: impl Into<String>, kind: NotificationKind, now: DateTime<Utc>) -> &Notification {
        self.current.insert(Notification {
            message: message.into(),
            kind,
            shown_at: now,
        })
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// Dismiss the visible notification, returning it.
    pub fn close(&mut self) -> Option<Notification> {
        self.current.take()
    }

    /// Hide the notification once it has been visible for the timeout.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Option<Notification> {
        match &self.current {
            Some(n) if now - n.shown_at >= self.timeout => self.current.take(),
            _ => None,
        }
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_SECONDS)
    }
}

fn timeout_from_secs(secs: u64) -> Duration {
    // Anything over a day is as good as "until closed".
    Duration::seconds(i64::try_from(secs.min(86_400)).unwrap_or(86_400))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_notification_replaces_old() {
        let mut center = NotificationCenter::default();
        center.show("Aspirin added successfully", NotificationKind::Success, t0());
        center.show("Aspirin removed", NotificationKind::Info, t0());

        let current = center.current().unwrap();
        assert_eq!(current.message, "Aspirin removed");
        assert_eq!(current.kind, NotificationKind::Info);
    }

    #[test]
    fn test_expire_after_timeout() {
        let mut center = NotificationCenter::new(5);
        center.show("Time for Me to take Aspirin!", NotificationKind::Info, t0());

        assert!(center.expire(t0() + Duration::seconds(4)).is_none());
        assert!(center.current().is_some());

        let expired = center.expire(t0() + Duration::seconds(5)).unwrap();
        assert_eq!(expired.message, "Time for Me to take Aspirin!");
        assert!(center.current().is_none());
        assert!(center.expire(t0() + Duration::seconds(6)).is_none());
    }

    #[test]
    fn test_close() {
        let mut center = NotificationCenter::default();
        assert!(center.close().is_none());
        center.show("x", NotificationKind::Error, t0());
        assert!(center.close().is_some());
        assert!(center.current().is_none());
    }
}
