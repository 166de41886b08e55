use crate::{Department, UserId};
use chrono::serde::ts_seconds;
use serde::{Deserialize, Serialize};

/// Who forwarded a document, captured at the moment of forwarding.
///
/// A snapshot rather than a reference: the sender's department or email may
/// change later, the history entry must not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderSnapshot {
    /// the forwarding user
    pub id: UserId,
    /// the forwarding user's email at forwarding time
    pub email: String,
    /// the forwarding user's department at forwarding time
    pub department: Department,
}

/// One forwarding hop in a document's history.
///
/// Immutable once appended; the history list only ever grows, in
/// chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardingRecord {
    /// the user the document was routed to
    pub recipient: UserId,
    /// the unit or office the document was routed to
    pub target_unit: String,
    /// the sender's note for this hop
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    /// who forwarded, captured at forwarding time
    pub sender: SenderSnapshot,
    /// when the hop happened
    #[serde(with = "ts_seconds")]
    pub forwarded_at: chrono::DateTime<chrono::Utc>,
}
