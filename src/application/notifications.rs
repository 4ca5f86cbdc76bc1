// Transient confirmation messages shown after dashboard edits
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NotificationQueue {
    ttl: TimeDelta,
    items: Vec<Notification>,
    next_id: u64,
}

impl NotificationQueue {
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            items: Vec::new(),
            next_id: 0,
        }
    }

    pub fn push(&mut self, message: String, now: DateTime<Utc>) -> Notification {
        self.prune(now);
        self.next_id += 1;
        let notification = Notification {
            id: self.next_id,
            message,
            expires_at: now + self.ttl,
        };
        self.items.push(notification.clone());
        notification
    }

    /// Notifications still visible at `now`; expired ones are dropped.
    pub fn active(&mut self, now: DateTime<Utc>) -> Vec<Notification> {
        self.prune(now);
        self.items.clone()
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        self.items.retain(|n| n.expires_at > now);
    }
}
