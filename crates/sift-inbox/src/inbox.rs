//! An in-memory notification inbox answering list requests.
//!
//! A [`GetNotifications`] request is what a client sends: an optional
//! recipient, a filter tree, sort rules, paging and the outputs it wants.
//! The inbox scopes the store to the recipient first, so counts and filters
//! never see another recipient's notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sift::{Compiler, CompilerConfig, FieldMap, FilterNode, Include, Page, Query, Queryable, SortRule};
use tracing::debug;
use uuid::Uuid;

use crate::notification::Notification;

/// Outputs of a [`GetNotifications`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InboxInclude {
    pub items: bool,
    pub total_count: bool,
    pub total_match_count: bool,
    /// Unread notifications of the recipient, ignoring the filter.
    pub total_unread: bool,
}

impl InboxInclude {
    pub fn all() -> Self {
        InboxInclude {
            items: true,
            total_count: true,
            total_match_count: true,
            total_unread: true,
        }
    }

    fn query_include(self) -> Include {
        Include {
            items: self.items,
            total_count: self.total_count,
            total_match_count: self.total_match_count,
        }
    }
}

impl Default for InboxInclude {
    fn default() -> Self {
        InboxInclude {
            items: true,
            total_count: false,
            total_match_count: false,
            total_unread: false,
        }
    }
}

/// A list request against the inbox.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct GetNotifications {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<Page>,
    pub include: InboxInclude,
}

impl GetNotifications {
    pub fn for_recipient(recipient_id: impl Into<String>) -> Self {
        GetNotifications {
            recipient_id: Some(recipient_id.into()),
            ..GetNotifications::default()
        }
    }

    pub fn filter(mut self, node: FilterNode) -> Self {
        self.filter = Some(node);
        self
    }

    pub fn sort(mut self, rule: SortRule) -> Self {
        self.sort.push(rule);
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    pub fn include(mut self, include: InboxInclude) -> Self {
        self.include = include;
        self
    }
}

/// The answer to a [`GetNotifications`] request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNotificationsResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Notification>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_match_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_unread: Option<usize>,
}

/// Notifications held in memory, queried through their field map.
#[derive(Debug)]
pub struct Inbox {
    notifications: Vec<Notification>,
    fields: FieldMap<Notification>,
    config: CompilerConfig,
}

impl Inbox {
    pub fn new(notifications: Vec<Notification>) -> Self {
        Inbox::with_config(notifications, CompilerConfig::default())
    }

    pub fn with_config(notifications: Vec<Notification>, config: CompilerConfig) -> Self {
        Inbox {
            notifications,
            fields: Notification::field_map(),
            config,
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn fields(&self) -> &FieldMap<Notification> {
        &self.fields
    }

    pub fn push(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Runs a list request.
    ///
    /// # Errors
    ///
    /// Any compile error for the request's filter or sort rules.
    pub fn query(&self, request: &GetNotifications) -> sift::Result<GetNotificationsResult> {
        let compiler = Compiler::with_config(&self.fields, self.config);

        let scoped: Vec<&Notification> = match &request.recipient_id {
            Some(recipient) => {
                let scope = compiler
                    .compile_filter(&FilterNode::eq(Notification::RECIPIENT_ID, recipient.as_str()))?;
                self.notifications.iter().filter(|n| scope.matches(n)).collect()
            }
            None => self.notifications.iter().collect(),
        };
        debug!(
            recipient = request.recipient_id.as_deref().unwrap_or("*"),
            scoped = scoped.len(),
            "inbox query"
        );

        let total_unread = if request.include.total_unread {
            let unread = compiler.compile_filter(&FilterNode::eq(Notification::IS_READ, false))?;
            Some(scoped.iter().filter(|n| unread.matches(n)).count())
        } else {
            None
        };

        let query = Query {
            filter: request.filter.clone(),
            sort: request.sort.clone(),
            page: request.page,
            include: request.include.query_include(),
        };
        let result = query.execute_refs(&compiler, scoped)?.map(Notification::clone);

        Ok(GetNotificationsResult {
            items: result.items,
            total_count: result.total_count,
            total_match_count: result.total_match_count,
            total_unread,
        })
    }

    /// Ids of the recipient's unread notifications, oldest first.
    pub fn unread_ids(&self, recipient_id: &str) -> Vec<Uuid> {
        let mut unread: Vec<&Notification> = self
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && !n.is_read)
            .collect();
        unread.sort_by_key(|n| n.created_at);
        unread.into_iter().map(|n| n.id).collect()
    }

    /// Marks the given notifications read. Returns how many changed.
    ///
    /// Already read notifications keep their original reader and time.
    pub fn mark_read(&mut self, ids: &[Uuid], reader: &str, at: DateTime<Utc>) -> usize {
        let mut changed = 0;
        for notification in &mut self.notifications {
            if !notification.is_read && ids.contains(&notification.id) {
                notification.mark_read(reader, at);
                changed += 1;
            }
        }
        debug!(requested = ids.len(), changed, "marked read");
        changed
    }
}
