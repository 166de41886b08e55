#![deny(missing_docs)]
//! This crate provides the entity types for tracked documents and the values
//! derived from them (statuses, attachments, forwarding history, tracking codes).
//! Please avoid writing real business logic in this crate unless it is applicable
//! specifically to only the types that exist inside this crate.

use chrono::serde::{ts_seconds, ts_seconds_option};
use serde::{Deserialize, Serialize};

mod attachment;
pub use attachment::*;
mod file_type;
pub use file_type::*;
mod forwarding;
pub use forwarding::*;
mod ids;
pub use ids::*;
mod status;
pub use status::*;
mod tracking;
pub use tracking::*;


/// A tracked document as persisted in the record store.
///
/// Two status axes evolve independently: [LifecycleStatus] governs which
/// queue a document surfaces in, while [AdminStatus] records the receiving
/// department's triage and is only meaningful once the document has been
/// forwarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The record store key
    #[serde(rename = "id")]
    pub key: DocumentKey,
    /// The human-readable tracking code, assigned exactly once at creation
    pub tracking_code: TrackingCode,
    /// The document title
    pub title: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// The document category (e.g. "Memorandum")
    pub category: String,
    /// The handling priority
    pub priority: Priority,
    /// The department the document originates from
    pub origin_department: Department,
    /// The owning user
    pub owner_id: UserId,
    /// The attached files, never empty
    pub attachments: AttachmentSet,
    /// File-type tags derived from the current attachment extensions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_types: Vec<FileType>,
    /// Where the document is in its lifecycle
    pub status: LifecycleStatus,
    /// The receiving department's triage state.
    /// Not present until the document is first forwarded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_status: Option<AdminStatus>,
    /// The user who last forwarded the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<UserId>,
    /// The user the document is currently routed to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<UserId>,
    /// Latest remark attached by an administrator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    /// Latest administrative reply to the owner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_reply: Option<String>,
    /// Every forwarding hop, in chronological append order.
    /// Entries are immutable once appended.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forwarding_history: Vec<ForwardingRecord>,
    /// The time the document was created
    #[serde(with = "ts_seconds")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// The time the document metadata was last written
    #[serde(with = "ts_seconds")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// The time of the most recent forwarding hop
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "ts_seconds_option"
    )]
    pub last_forwarded_at: Option<chrono::DateTime<chrono::Utc>>,
    /// The time the document was soft deleted
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "ts_seconds_option"
    )]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Document {
    /// true once the document has been soft deleted; [LifecycleStatus::Deleted] is terminal
    pub fn is_deleted(&self) -> bool {
        matches!(self.status, LifecycleStatus::Deleted)
    }
}
