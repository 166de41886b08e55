//! The document lifecycle: creation, forwarding, administrative triage,
//! revision, deletion and the query views.

use crate::domain::models::{
    AdminUpdate, AttachmentPath, AttachmentUpload, CreateDocument, DocumentPatch, DocumentQuery,
    EditRequest, ForwardRequest, PageRequest, Paginated, ValidationError, WorkflowError,
};
use crate::domain::ports::{AttachmentStore, DocumentRecords, TimeGetter};
use crate::domain::services::allocator::TrackingIdAllocator;
use crate::outbound::time::WallClock;
use futures::future::join_all;
use model_document::{
    AdminStatus, Attachment, AttachmentSet, Document, DocumentKey, EmptyAttachments,
    ForwardingRecord, LifecycleStatus, UserId,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;


/// most attachment uploads in flight at once
const UPLOAD_CONCURRENCY: usize = 4;

/// The write-side and read-side operations over tracked documents.
///
/// Generic over the record store, the attachment blob store and the clock.
/// Metadata writes always land as one coherent patch; attachment bytes are
/// written before the metadata that points at them, so a half-failed
/// operation can orphan bytes but never dangle a record.
pub struct WorkflowService<R, B, T> {
    records: R,
    blobs: B,
    time: T,
    allocator: TrackingIdAllocator<R, T>,
}

impl<R, B> WorkflowService<R, B, WallClock>
where
    R: Clone,
{
    /// a service reading the system clock
    pub fn new_with_default_time(records: R, blobs: B) -> Self {
        WorkflowService::new(records, blobs, WallClock)
    }
}

impl<R, B, T> WorkflowService<R, B, T>
where
    R: Clone,
    T: Clone,
{
    /// a service over the given stores and clock
    pub fn new(records: R, blobs: B, time: T) -> Self {
        let allocator = TrackingIdAllocator::new(records.clone(), time.clone());
        WorkflowService {
            records,
            blobs,
            time,
            allocator,
        }
    }
}

impl<R, B, T> WorkflowService<R, B, T>
where
    R: DocumentRecords,
    anyhow::Error: From<R::Err>,
    B: AttachmentStore,
    anyhow::Error: From<B::Err>,
    T: TimeGetter,
{
    /// Create a draft document owned by the acting user.
    ///
    /// Order matters: validation, then attachment uploads, then tracking
    /// code allocation, then the record insert. A failed upload aborts
    /// before any metadata exists, so no record ever points at missing
    /// bytes, and no tracking code is burned on a document that cannot
    /// store its attachments.
    #[tracing::instrument(err, skip(self, request), fields(owner = %request.owner.id))]
    pub async fn create(&self, request: CreateDocument) -> Result<Document, WorkflowError> {
        require_field("title", &request.title)?;
        require_field("category", &request.category)?;
        if request.owner.id.is_empty() {
            return Err(ValidationError::MissingField("owner").into());
        }
        if request.attachments.is_empty() {
            return Err(ValidationError::EmptyAttachments(EmptyAttachments).into());
        }

        let key = DocumentKey::generate();
        let uploaded = self.upload_all(key, request.attachments).await?;
        let attachments = AttachmentSet::new(uploaded).map_err(ValidationError::from)?;
        let file_types = attachments.file_types();
        let tracking_code = self
            .allocator
            .allocate_for_department(&request.origin_department)
            .await?;

        let now = self.time.now();
        let document = Document {
            key,
            tracking_code,
            title: request.title,
            description: request.description,
            category: request.category,
            priority: request.priority,
            origin_department: request.origin_department,
            owner_id: request.owner.id,
            attachments,
            file_types,
            status: LifecycleStatus::Draft,
            admin_status: None,
            sender_id: None,
            recipient_id: None,
            remarks: None,
            admin_reply: None,
            forwarding_history: Vec::new(),
            created_at: now,
            updated_at: now,
            last_forwarded_at: None,
            deleted_at: None,
        };
        self.records
            .insert(document.clone())
            .await
            .map_err(transient)?;
        Ok(document)
    }

    /// Forward a document to another user.
    ///
    /// The first forward moves the lifecycle axis from Draft to Sent and
    /// seeds the administrative axis at its initial value. Every forward
    /// appends exactly one history record; earlier hops are never
    /// rewritten.
    #[tracing::instrument(err, skip(self, request), fields(key = %request.key, recipient = %request.recipient))]
    pub async fn forward(&self, request: ForwardRequest) -> Result<Document, WorkflowError> {
        if request.recipient.is_empty() {
            return Err(ValidationError::MissingField("recipient").into());
        }
        require_field("target unit", &request.target_unit)?;
        if request.recipient == request.sender.id {
            return Err(ValidationError::SelfForward.into());
        }

        let document = self.fetch(request.key).await?;
        if document.is_deleted() {
            return Err(WorkflowError::InvalidState {
                status: document.status,
            });
        }
        // a document cannot enter circulation without a category
        require_field("category", &document.category)?;

        let now = self.time.now();
        let hop = ForwardingRecord {
            recipient: request.recipient.clone(),
            target_unit: request.target_unit,
            remarks: request.remarks,
            sender: request.sender.snapshot(),
            forwarded_at: now,
        };
        let patch = DocumentPatch {
            status: Some(LifecycleStatus::Sent),
            admin_status: Some(document.admin_status.unwrap_or_else(AdminStatus::initial)),
            sender_id: Some(request.sender.id),
            recipient_id: Some(request.recipient),
            history_append: Some(hop),
            updated_at: Some(now),
            last_forwarded_at: Some(now),
            ..DocumentPatch::default()
        };
        self.merge(request.key, patch).await
    }

    /// Apply an administrative verdict to a sent document.
    ///
    /// Only the administrative axis moves; the lifecycle status is never
    /// touched from here. A rejection is a verdict like any other and the
    /// document stays Sent, visible in the same queues it was in before.
    /// Whether a verdict may follow the current one is the model's rule,
    /// [AdminStatus::may_follow].
    #[tracing::instrument(err, skip(self, update), fields(key = %update.key, status = %update.status))]
    pub async fn admin_update(&self, update: AdminUpdate) -> Result<Document, WorkflowError> {
        let document = self.fetch(update.key).await?;
        if document.status != LifecycleStatus::Sent {
            return Err(WorkflowError::InvalidState {
                status: document.status,
            });
        }
        let current = document.admin_status.unwrap_or_else(AdminStatus::initial);
        if !update.status.may_follow(current) {
            return Err(WorkflowError::InvalidTransition {
                from: current,
                to: update.status,
            });
        }

        let patch = DocumentPatch {
            admin_status: Some(update.status),
            remarks: update.remark,
            admin_reply: update.reply,
            updated_at: Some(self.time.now()),
            ..DocumentPatch::default()
        };
        self.merge(update.key, patch).await
    }

    /// An administrative verdict that asks the owner to rework the
    /// document; the remark explaining what to fix is mandatory.
    #[tracing::instrument(err, skip(self, update), fields(key = %update.key))]
    pub async fn request_revision(&self, update: AdminUpdate) -> Result<Document, WorkflowError> {
        let has_remark = update
            .remark
            .as_deref()
            .is_some_and(|remark| !remark.trim().is_empty());
        if !has_remark {
            return Err(ValidationError::MissingField("remark").into());
        }
        self.admin_update(update).await
    }

    /// Revise a document's content and descriptive fields.
    ///
    /// The resulting attachment set is computed up front so an edit that
    /// would leave zero attachments is rejected before any byte moves.
    /// Replacements land under the same path as the bytes they replace;
    /// bytes dropped by the edit are removed best-effort after the
    /// metadata commit.
    #[tracing::instrument(err, skip(self, request))]
    pub async fn edit(
        &self,
        key: DocumentKey,
        request: EditRequest,
    ) -> Result<Document, WorkflowError> {
        if let Some(title) = request.title.as_deref() {
            require_field("title", title)?;
        }
        if let Some(category) = request.category.as_deref() {
            require_field("category", category)?;
        }

        let document = self.fetch(key).await?;
        if document.is_deleted() {
            return Err(WorkflowError::InvalidState {
                status: document.status,
            });
        }

        let kept: Vec<Attachment> = document
            .attachments
            .iter()
            .filter(|attachment| !request.remove.contains(&attachment.name))
            .filter(|attachment| {
                !request
                    .add
                    .iter()
                    .any(|upload| upload.name == attachment.name)
            })
            .cloned()
            .collect();
        if kept.is_empty() && request.add.is_empty() {
            return Err(ValidationError::EmptyAttachments(EmptyAttachments).into());
        }

        let mut attachments = kept;
        attachments.extend(self.upload_all(key, request.add).await?);
        let attachments = AttachmentSet::new(attachments).map_err(ValidationError::from)?;
        let file_types = attachments.file_types();

        let retained: HashSet<&str> = attachments
            .iter()
            .map(|attachment| attachment.name.as_str())
            .collect();
        let dropped: Vec<AttachmentPath> = document
            .attachments
            .iter()
            .filter(|attachment| !retained.contains(attachment.name.as_str()))
            .map(|attachment| AttachmentPath::new(key, &attachment.name))
            .collect();

        let patch = DocumentPatch {
            title: request.title,
            description: request.description,
            category: request.category,
            priority: request.priority,
            attachments: Some(attachments),
            file_types: Some(file_types),
            updated_at: Some(self.time.now()),
            ..DocumentPatch::default()
        };
        let updated = self.merge(key, patch).await?;

        if !dropped.is_empty()
            && let Err(err) = self.blobs.remove(&dropped).await
        {
            let err = anyhow::Error::from(err);
            tracing::warn!(error = ?err, "detached attachment bytes were not removed");
        }
        Ok(updated)
    }

    /// Soft delete: the document leaves every active queue but remains
    /// fetchable by key with its history intact. Deleting an already
    /// deleted document is a no-op that keeps the original deletion time.
    #[tracing::instrument(err, skip(self))]
    pub async fn soft_delete(&self, key: DocumentKey) -> Result<Document, WorkflowError> {
        let document = self.fetch(key).await?;
        if document.is_deleted() {
            return Ok(document);
        }

        let now = self.time.now();
        let patch = DocumentPatch {
            status: Some(LifecycleStatus::Deleted),
            deleted_at: Some(now),
            updated_at: Some(now),
            ..DocumentPatch::default()
        };
        self.merge(key, patch).await
    }

    /// Permanently remove the document: the record first, then the
    /// attachment bytes. A crash in between leaves orphaned bytes rather
    /// than a record pointing at nothing.
    #[tracing::instrument(err, skip(self))]
    pub async fn hard_delete(&self, key: DocumentKey) -> Result<(), WorkflowError> {
        let document = self.fetch(key).await?;
        let paths: Vec<AttachmentPath> = document
            .attachments
            .iter()
            .map(|attachment| AttachmentPath::new(key, &attachment.name))
            .collect();

        self.records.delete(key).await.map_err(transient)?;
        self.blobs.remove(&paths).await.map_err(transient)?;
        Ok(())
    }

    /// Fetch one document by key, soft-deleted included.
    #[tracing::instrument(err, skip(self))]
    pub async fn document(&self, key: DocumentKey) -> Result<Option<Document>, WorkflowError> {
        self.records.get(key).await.map_err(transient)
    }

    /// The user's own documents, newest first. Soft-deleted ones are
    /// excluded; fetch those by key instead.
    #[tracing::instrument(err, skip(self))]
    pub async fn owned_by(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Paginated<Document>, WorkflowError> {
        self.page(DocumentQuery::OwnedBy(user.clone()), page).await
    }

    /// Sent documents currently routed to the user, most recent hop first.
    #[tracing::instrument(err, skip(self))]
    pub async fn inbox(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Paginated<Document>, WorkflowError> {
        self.page(DocumentQuery::InboxFor(user.clone()), page).await
    }

    /// Sent documents the user forwarded last, most recent hop first.
    #[tracing::instrument(err, skip(self))]
    pub async fn outbox(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Paginated<Document>, WorkflowError> {
        self.page(DocumentQuery::OutboxFor(user.clone()), page)
            .await
    }

    /// Every sent document awaiting administrative attention, oldest
    /// first so nothing starves at the back of the queue.
    #[tracing::instrument(err, skip(self))]
    pub async fn admin_queue(
        &self,
        page: PageRequest,
    ) -> Result<Paginated<Document>, WorkflowError> {
        self.page(DocumentQuery::AdminQueue, page).await
    }

    async fn page(
        &self,
        query: DocumentQuery,
        page: PageRequest,
    ) -> Result<Paginated<Document>, WorkflowError> {
        self.records
            .query(query, page.clamped())
            .await
            .map_err(transient)
    }

    async fn fetch(&self, key: DocumentKey) -> Result<Document, WorkflowError> {
        self.records
            .get(key)
            .await
            .map_err(transient)?
            .ok_or(WorkflowError::NotFound(key))
    }

    async fn merge(
        &self,
        key: DocumentKey,
        patch: DocumentPatch,
    ) -> Result<Document, WorkflowError> {
        self.records
            .merge(key, patch)
            .await
            .map_err(transient)?
            .ok_or(WorkflowError::NotFound(key))
    }

    /// Upload every payload, a bounded number in flight at once. Any
    /// failure aborts the whole operation before metadata is written.
    async fn upload_all(
        &self,
        key: DocumentKey,
        uploads: Vec<AttachmentUpload>,
    ) -> Result<Vec<Attachment>, WorkflowError> {
        let semaphore = Arc::new(Semaphore::new(UPLOAD_CONCURRENCY));
        let blobs = &self.blobs;
        let in_flight = uploads.into_iter().map(|upload| {
            let semaphore = semaphore.clone();
            async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("upload semaphore is never closed");
                let path = AttachmentPath::new(key, &upload.name);
                let stored = blobs.put(&path, upload.bytes).await;
                (upload.name, stored)
            }
        });

        let mut attachments = Vec::new();
        for (name, stored) in join_all(in_flight).await {
            match stored {
                Ok(url) => attachments.push(Attachment { name, url }),
                Err(err) => {
                    return Err(WorkflowError::PartialUpload {
                        failed: name,
                        source: anyhow::Error::from(err),
                    });
                }
            }
        }
        Ok(attachments)
    }
}

fn require_field(name: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(name));
    }
    Ok(())
}

fn transient<E>(err: E) -> WorkflowError
where
    anyhow::Error: From<E>,
{
    WorkflowError::TransientStore(anyhow::Error::from(err))
}
