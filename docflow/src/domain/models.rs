//! Request, query, pagination and error types shared by the services and
//! the adapters that serve them.

use chrono::{DateTime, Utc};
use model_document::{
    AdminStatus, Department, Document, DocumentKey, EmptyAttachments, FileType, ForwardingRecord,
    LifecycleStatus, Priority, SenderSnapshot, TrackingCode, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[cfg(test)]
mod tests;

/// The authenticated user driving an operation.
///
/// Request types carry the whole actor, not just the id, so forwarding
/// history can snapshot the sender as they were at that moment.
/// Authentication itself happens upstream of this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// identity-provider id
    pub id: UserId,
    /// contact address recorded into forwarding history
    pub email: String,
    /// the department the actor acts for
    pub department: Department,
}

impl Actor {
    /// freeze the actor into a forwarding-history snapshot
    pub fn snapshot(&self) -> SenderSnapshot {
        SenderSnapshot {
            id: self.id.clone(),
            email: self.email.clone(),
            department: self.department.clone(),
        }
    }
}

/// An attachment payload on its way into the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    /// file name, unique within one document
    pub name: String,
    /// the raw content
    pub bytes: Vec<u8>,
}

/// Input to document creation.
#[derive(Debug, Clone)]
pub struct CreateDocument {
    /// document title, required
    pub title: String,
    /// free-form description
    pub description: String,
    /// document category, required
    pub category: String,
    /// handling priority
    pub priority: Priority,
    /// the department the document originates from; decides the tracking prefix
    pub origin_department: Department,
    /// the creating user, recorded as owner
    pub owner: Actor,
    /// the attachments to store, at least one
    pub attachments: Vec<AttachmentUpload>,
}

/// Input to forwarding a document to another user.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    /// the document to forward
    pub key: DocumentKey,
    /// the user doing the forwarding
    pub sender: Actor,
    /// the user the document is routed to
    pub recipient: UserId,
    /// the unit or office the recipient acts for
    pub target_unit: String,
    /// optional note carried on the hop
    pub remarks: Option<String>,
}

/// An administrative verdict on a sent document.
///
/// `reply` and `remark` are partial: `None` leaves the stored value alone
/// rather than clearing it.
#[derive(Debug, Clone)]
pub struct AdminUpdate {
    /// the document under triage
    pub key: DocumentKey,
    /// the triage state to move to
    pub status: AdminStatus,
    /// reply surfaced to the owner
    pub reply: Option<String>,
    /// internal remark, mandatory when requesting a revision
    pub remark: Option<String>,
}

/// An owner-side revision of a document's content.
///
/// `None` fields stay untouched. An upload whose name matches an existing
/// attachment replaces it; `remove` drops attachments by name.
#[derive(Debug, Clone, Default)]
pub struct EditRequest {
    /// replacement title
    pub title: Option<String>,
    /// replacement description
    pub description: Option<String>,
    /// replacement category
    pub category: Option<String>,
    /// replacement priority
    pub priority: Option<Priority>,
    /// attachments to upload
    pub add: Vec<AttachmentUpload>,
    /// names of attachments to drop
    pub remove: Vec<String>,
}

/// A partial-field merge against a stored document.
///
/// The services compose one patch per state change so that every write
/// lands as a coherent group; [DocumentPatch::apply] is the single place
/// merge semantics live, and every record store adapter defers to it.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    /// replacement title
    pub title: Option<String>,
    /// replacement description
    pub description: Option<String>,
    /// replacement category
    pub category: Option<String>,
    /// replacement priority
    pub priority: Option<Priority>,
    /// replacement attachment set
    pub attachments: Option<model_document::AttachmentSet>,
    /// replacement file-type tags, recomputed alongside `attachments`
    pub file_types: Option<Vec<FileType>>,
    /// lifecycle transition
    pub status: Option<LifecycleStatus>,
    /// triage transition
    pub admin_status: Option<AdminStatus>,
    /// the user who forwarded last
    pub sender_id: Option<UserId>,
    /// the user the document is now routed to
    pub recipient_id: Option<UserId>,
    /// administrative remark
    pub remarks: Option<String>,
    /// administrative reply to the owner
    pub admin_reply: Option<String>,
    /// a forwarding hop to append; existing history entries are never touched
    pub history_append: Option<ForwardingRecord>,
    /// metadata write time
    pub updated_at: Option<DateTime<Utc>>,
    /// time of the hop carried in `history_append`
    pub last_forwarded_at: Option<DateTime<Utc>>,
    /// soft-deletion time
    pub deleted_at: Option<DateTime<Utc>>,
}

impl DocumentPatch {
    /// Fold the patch into a document. Fields left `None` stay untouched;
    /// `history_append` pushes, never replaces.
    pub fn apply(self, document: &mut Document) {
        // destructured so a new field cannot be forgotten here
        let DocumentPatch {
            title,
            description,
            category,
            priority,
            attachments,
            file_types,
            status,
            admin_status,
            sender_id,
            recipient_id,
            remarks,
            admin_reply,
            history_append,
            updated_at,
            last_forwarded_at,
            deleted_at,
        } = self;

        if let Some(title) = title {
            document.title = title;
        }
        if let Some(description) = description {
            document.description = description;
        }
        if let Some(category) = category {
            document.category = category;
        }
        if let Some(priority) = priority {
            document.priority = priority;
        }
        if let Some(attachments) = attachments {
            document.attachments = attachments;
        }
        if let Some(file_types) = file_types {
            document.file_types = file_types;
        }
        if let Some(status) = status {
            document.status = status;
        }
        if let Some(admin_status) = admin_status {
            document.admin_status = Some(admin_status);
        }
        if let Some(sender_id) = sender_id {
            document.sender_id = Some(sender_id);
        }
        if let Some(recipient_id) = recipient_id {
            document.recipient_id = Some(recipient_id);
        }
        if let Some(remarks) = remarks {
            document.remarks = Some(remarks);
        }
        if let Some(admin_reply) = admin_reply {
            document.admin_reply = Some(admin_reply);
        }
        if let Some(record) = history_append {
            document.forwarding_history.push(record);
        }
        if let Some(at) = updated_at {
            document.updated_at = at;
        }
        if let Some(at) = last_forwarded_at {
            document.last_forwarded_at = Some(at);
        }
        if let Some(at) = deleted_at {
            document.deleted_at = Some(at);
        }
    }
}

/// Where an attachment's bytes live, relative to the blob store root:
/// `attachments/{kind}/{document-key}/{file-name}`.
///
/// The kind segment is the file-type tag of the name (or `file` when the
/// extension is unknown), so a path depends only on values that never
/// change after upload and can be rebuilt at deletion time. Separators in
/// the file name are folded away so a name cannot escape its namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentPath(String);

impl AttachmentPath {
    /// the path for one attachment of one document
    pub fn new(key: DocumentKey, file_name: &str) -> AttachmentPath {
        let kind = FileType::for_file_name(file_name)
            .map(|tag| tag.as_str())
            .unwrap_or("file");
        let name: String = file_name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        AttachmentPath(format!("attachments/{kind}/{key}/{name}"))
    }

    /// view the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AttachmentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The read-side views over the record store.
///
/// Filtering and ordering semantics live here, next to the type, so every
/// adapter answers a query the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentQuery {
    /// every non-deleted document owned by the user
    OwnedBy(UserId),
    /// sent documents currently routed to the user
    InboxFor(UserId),
    /// sent documents the user forwarded last
    OutboxFor(UserId),
    /// every sent document, as worked through by administrative staff
    AdminQueue,
}

impl DocumentQuery {
    /// whether a stored document belongs in this view
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            DocumentQuery::OwnedBy(user) => !document.is_deleted() && document.owner_id == *user,
            DocumentQuery::InboxFor(user) => {
                document.status == LifecycleStatus::Sent
                    && document.recipient_id.as_ref() == Some(user)
            }
            DocumentQuery::OutboxFor(user) => {
                document.status == LifecycleStatus::Sent && document.sender_id.as_ref() == Some(user)
            }
            DocumentQuery::AdminQueue => document.status == LifecycleStatus::Sent,
        }
    }

    /// the order a result page follows
    pub fn ordering(&self) -> QueryOrdering {
        match self {
            DocumentQuery::OwnedBy(_) => QueryOrdering::NewestCreated,
            DocumentQuery::InboxFor(_) | DocumentQuery::OutboxFor(_) => {
                QueryOrdering::RecentlyForwarded
            }
            DocumentQuery::AdminQueue => QueryOrdering::OldestCreated,
        }
    }
}

/// Sort orders used by [DocumentQuery] result pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrdering {
    /// `created_at` descending
    NewestCreated,
    /// `created_at` ascending
    OldestCreated,
    /// `last_forwarded_at` descending, falling back to `created_at`
    RecentlyForwarded,
}

impl QueryOrdering {
    /// the instant a document sorts by under this ordering
    pub fn sort_instant(&self, document: &Document) -> DateTime<Utc> {
        match self {
            QueryOrdering::NewestCreated | QueryOrdering::OldestCreated => document.created_at,
            QueryOrdering::RecentlyForwarded => {
                document.last_forwarded_at.unwrap_or(document.created_at)
            }
        }
    }

    /// Total order over `(instant, key)` positions as pages walk the view:
    /// `Less` means `a` is served before `b`. The key tiebreak keeps the
    /// walk total even when instants collide.
    pub fn compare(
        &self,
        a: (DateTime<Utc>, DocumentKey),
        b: (DateTime<Utc>, DocumentKey),
    ) -> std::cmp::Ordering {
        match self {
            QueryOrdering::OldestCreated => a.cmp(&b),
            QueryOrdering::NewestCreated | QueryOrdering::RecentlyForwarded => b.cmp(&a),
        }
    }
}

/// smallest page a query will serve
pub const MIN_PAGE_LIMIT: u32 = 1;
/// largest page a query will serve
pub const MAX_PAGE_LIMIT: u32 = 200;
/// page size used when the caller does not state one
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// A one-page slice request against a [DocumentQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// most items to return, clamped to [MIN_PAGE_LIMIT]..=[MAX_PAGE_LIMIT]
    pub limit: u32,
    /// resume after this position, `None` for the first page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<PageCursor>,
}

impl PageRequest {
    /// a first page of the given size
    pub fn first(limit: u32) -> PageRequest {
        PageRequest { limit, after: None }
    }

    /// the request with its limit clamped into the served range
    pub fn clamped(self) -> PageRequest {
        PageRequest {
            limit: self.limit.clamp(MIN_PAGE_LIMIT, MAX_PAGE_LIMIT),
            after: self.after,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            limit: DEFAULT_PAGE_LIMIT,
            after: None,
        }
    }
}

/// A resume position inside a query walk: the sort instant and key of the
/// last document already served.
///
/// Comparing against the position rather than remembering an offset keeps
/// the walk stable when documents are inserted or deleted between pages.
/// The instant is carried at microsecond precision so positions stay
/// distinct on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCursor {
    /// sort instant of the last served document
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub sort_instant: DateTime<Utc>,
    /// key tiebreak for documents sharing an instant
    pub key: DocumentKey,
}

impl PageCursor {
    /// the position a walk resumes from after serving `document`
    pub fn after(ordering: QueryOrdering, document: &Document) -> PageCursor {
        PageCursor {
            sort_instant: ordering.sort_instant(document),
            key: document.key,
        }
    }
}

/// One page of query results plus the position to resume from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// the page items, already ordered
    pub items: Vec<T>,
    /// present when at least one more item exists past this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<PageCursor>,
}

impl<T> Paginated<T> {
    /// map the items, keeping the cursor
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

/// The per-user record of administrative statuses already surfaced to them.
///
/// Keyed by tracking code; an absent entry means the document has never
/// been shown. This is a best-effort cache: losing it only costs a round
/// of notifications, never document data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationSnapshot {
    seen: HashMap<TrackingCode, AdminStatus>,
}

impl NotificationSnapshot {
    /// the status last surfaced for a code, if any
    pub fn last_seen(&self, code: &TrackingCode) -> Option<AdminStatus> {
        self.seen.get(code).copied()
    }

    /// record a surfaced status and return the one it replaces
    pub fn record(&mut self, code: TrackingCode, status: AdminStatus) -> Option<AdminStatus> {
        self.seen.insert(code, status)
    }

    /// number of tracked documents
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// true when nothing has been surfaced yet
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Tracking codes whose administrative status changed since the user last
/// saw them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedDocuments {
    codes: HashSet<TrackingCode>,
}

impl ChangedDocuments {
    pub(crate) fn insert(&mut self, code: TrackingCode) {
        self.codes.insert(code);
    }

    /// true when the code was flagged as changed
    pub fn contains(&self, code: &TrackingCode) -> bool {
        self.codes.contains(code)
    }

    /// number of flagged documents
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// true when no change was detected
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// iterate the flagged codes, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &TrackingCode> {
        self.codes.iter()
    }
}

/// A request rejected before any store was touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// a required field is empty or absent
    #[error("required field {0:?} is missing or empty")]
    MissingField(&'static str),
    /// sender and recipient are the same user
    #[error("a document cannot be forwarded to its sender")]
    SelfForward,
    /// the operation would leave the document with no attachments
    #[error(transparent)]
    EmptyAttachments(#[from] EmptyAttachments),
}

/// Failure of a workflow operation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// the request was rejected before any store was touched
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// the document's lifecycle status forbids the operation
    #[error("the operation is not allowed while the document is {status}")]
    InvalidState {
        /// the lifecycle status that blocked the operation
        status: LifecycleStatus,
    },
    /// [AdminStatus::may_follow] refused the verdict
    #[error("the administrative status cannot move from {from} to {to}")]
    InvalidTransition {
        /// the verdict the document currently carries
        from: AdminStatus,
        /// the refused verdict
        to: AdminStatus,
    },
    /// no document exists under the key
    #[error("no document found for key {0}")]
    NotFound(DocumentKey),
    /// an attachment failed to upload, so no metadata was committed
    #[error("attachment {failed:?} could not be stored")]
    PartialUpload {
        /// name of the attachment whose upload failed
        failed: String,
        /// the blob store failure
        #[source]
        source: anyhow::Error,
    },
    /// a backing store failed; retrying the operation may succeed
    #[error("a backing store failed")]
    TransientStore(#[source] anyhow::Error),
}

/// Failure to allocate a tracking code.
#[derive(Debug, Error)]
pub enum AllocatorError {
    /// counter contention persisted across the whole retry budget
    #[error("tracking counter contention persisted across {attempts} attempts")]
    Exhausted {
        /// how many transactions were attempted
        attempts: usize,
    },
    /// the record store failed outright
    #[error("the record store failed during allocation")]
    Store(#[source] anyhow::Error),
}

impl From<AllocatorError> for WorkflowError {
    fn from(err: AllocatorError) -> Self {
        WorkflowError::TransientStore(anyhow::Error::new(err))
    }
}
