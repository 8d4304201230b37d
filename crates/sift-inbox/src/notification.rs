//! The notification record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sift::Queryable;
use uuid::Uuid;

/// One notification addressed to one recipient.
///
/// Every field except `body` is filterable and sortable, under its
/// camelCase name (`recipientId`, `isRead`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable)]
#[serde(rename_all = "camelCase")]
#[sift(rename_all = "camelCase")]
pub struct Notification {
    #[sift(Uuid)]
    pub id: Uuid,
    #[sift(Text)]
    pub recipient_id: String,
    #[sift(Text)]
    pub subject: String,
    #[sift(skip)]
    pub body: String,
    #[sift(Bool)]
    #[serde(default)]
    pub is_read: bool,
    #[sift(Timestamp)]
    pub created_at: DateTime<Utc>,
    #[sift(Text)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_by_id: Option<String>,
    #[sift(Timestamp)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// A new unread notification.
    pub fn new(
        recipient_id: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Notification {
            id: Uuid::new_v4(),
            recipient_id: recipient_id.into(),
            subject: subject.into(),
            body: body.into(),
            is_read: false,
            created_at,
            read_by_id: None,
            read_at: None,
        }
    }

    /// Marks the notification read by `reader` at `at`.
    pub fn mark_read(&mut self, reader: impl Into<String>, at: DateTime<Utc>) {
        self.is_read = true;
        self.read_by_id = Some(reader.into());
        self.read_at = Some(at);
    }
}
