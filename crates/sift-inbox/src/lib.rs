//! # sift-inbox
//!
//! A notification inbox queried with [`sift`] filter trees.
//!
//! [`Notification`] derives its field map, so every request field is checked
//! against the record's real shape. [`Inbox::query`] answers a
//! [`GetNotifications`] request the way a list endpoint would: scoped to one
//! recipient, filtered, sorted, paged, with the requested counts.
//!
//! The `sift-inbox` binary runs request files against a JSON store; see
//! [`cli`].

pub mod cli;
mod inbox;
mod notification;

pub use inbox::{GetNotifications, GetNotificationsResult, Inbox, InboxInclude};
pub use notification::Notification;
