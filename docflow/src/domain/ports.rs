//! The driven-side ports the services are generic over.
//!
//! Adapters live in [crate::outbound]. Every port owns an associated error
//! type; the services only require that it converts into [anyhow::Error],
//! which keeps adapter error enums as precise as their backend allows.

use crate::domain::models::{
    AttachmentPath, DocumentPatch, DocumentQuery, NotificationSnapshot, PageRequest, Paginated,
};
use chrono::{DateTime, Utc};
use model_document::{AttachmentUrl, Document, DocumentKey, UserId};
use thiserror::Error;

/// The record store holding document metadata and the tracking counter.
pub trait DocumentRecords: Send + Sync + 'static {
    /// adapter-specific error
    type Err: Send;

    /// Persist a freshly created document under its key.
    fn insert(&self, document: Document) -> impl Future<Output = Result<(), Self::Err>> + Send;

    /// Fetch a document by key. Soft-deleted documents are still returned.
    fn get(
        &self,
        key: DocumentKey,
    ) -> impl Future<Output = Result<Option<Document>, Self::Err>> + Send;

    /// Merge a patch into the stored document and return the result,
    /// `None` when no document exists under the key. The merge must land
    /// atomically: concurrent readers see either none or all of the patch.
    fn merge(
        &self,
        key: DocumentKey,
        patch: DocumentPatch,
    ) -> impl Future<Output = Result<Option<Document>, Self::Err>> + Send;

    /// Remove the record outright. Removing an absent key is a no-op.
    fn delete(&self, key: DocumentKey) -> impl Future<Output = Result<(), Self::Err>> + Send;

    /// Serve one page of a query view.
    fn query(
        &self,
        query: DocumentQuery,
        page: PageRequest,
    ) -> impl Future<Output = Result<Paginated<Document>, Self::Err>> + Send;

    /// One transactional step of the tracking counter: read, advance,
    /// write, and return the issued sequence value. Implementations that
    /// cannot make the step atomic report [CounterError::Conflict] when a
    /// concurrent writer got in between; the caller owns the retry.
    fn counter_increment(
        &self,
    ) -> impl Future<Output = Result<u64, CounterError<Self::Err>>> + Send;
}

/// How a [DocumentRecords::counter_increment] step can fail.
#[derive(Debug, Error)]
pub enum CounterError<E> {
    /// a concurrent writer advanced the counter first; retry
    #[error("the counter transaction conflicted with a concurrent writer")]
    Conflict,
    /// the store itself failed; retrying is pointless
    #[error("the counter store failed")]
    Store(E),
}

/// The blob store holding attachment bytes.
pub trait AttachmentStore: Send + Sync + 'static {
    /// adapter-specific error
    type Err: Send;

    /// Store one attachment's bytes and return the URL they are served
    /// under. Writing an existing path replaces its bytes.
    fn put(
        &self,
        path: &AttachmentPath,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<AttachmentUrl, Self::Err>> + Send;

    /// Remove the bytes under every given path. Absent paths are skipped.
    fn remove(&self, paths: &[AttachmentPath])
    -> impl Future<Output = Result<(), Self::Err>> + Send;
}

/// The per-user store of [NotificationSnapshot]s.
///
/// A missing snapshot loads as the empty default; only genuine backend
/// failures surface as errors. Loss of this store costs one round of
/// notifications and nothing else.
pub trait SnapshotStore: Send + Sync + 'static {
    /// adapter-specific error
    type Err: Send;

    /// Load the user's snapshot, or the empty default when none exists.
    fn load(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<NotificationSnapshot, Self::Err>> + Send;

    /// Persist the user's snapshot, replacing any previous one.
    fn store(
        &self,
        user: &UserId,
        snapshot: &NotificationSnapshot,
    ) -> impl Future<Output = Result<(), Self::Err>> + Send;
}

/// The current time, injected so services stay deterministic under test.
pub trait TimeGetter: Send + Sync + 'static {
    /// the current instant
    fn now(&self) -> DateTime<Utc>;
}
