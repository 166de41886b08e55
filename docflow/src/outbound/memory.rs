//! In-memory implementations of the stores.
//!
//! These are the reference adapters: they pin down the behavior a
//! production backend has to match and serve as the substrate for the
//! service tests. All state sits behind a mutex, so the counter step runs
//! genuinely serialized and never reports a conflict.

use crate::domain::models::{
    AttachmentPath, DocumentPatch, DocumentQuery, NotificationSnapshot, PageCursor, PageRequest,
    Paginated,
};
use crate::domain::ports::{AttachmentStore, CounterError, DocumentRecords, SnapshotStore};
use model_document::{AttachmentUrl, Document, DocumentKey, TrackingCounter, UserId};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::Mutex;

#[cfg(test)]
mod tests;

/// In-memory [DocumentRecords]: documents and the tracking counter share
/// one lock, which is what makes every write and the counter step atomic.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecords {
    inner: Arc<Mutex<RecordsInner>>,
}

#[derive(Debug, Default)]
struct RecordsInner {
    documents: HashMap<DocumentKey, Document>,
    counter: Option<TrackingCounter>,
}

impl DocumentRecords for MemoryRecords {
    type Err = Infallible;

    async fn insert(&self, document: Document) -> Result<(), Infallible> {
        let mut inner = self.inner.lock().await;
        inner.documents.insert(document.key, document);
        Ok(())
    }

    async fn get(&self, key: DocumentKey) -> Result<Option<Document>, Infallible> {
        let inner = self.inner.lock().await;
        Ok(inner.documents.get(&key).cloned())
    }

    async fn merge(
        &self,
        key: DocumentKey,
        patch: DocumentPatch,
    ) -> Result<Option<Document>, Infallible> {
        let mut inner = self.inner.lock().await;
        let Some(document) = inner.documents.get_mut(&key) else {
            return Ok(None);
        };
        patch.apply(document);
        Ok(Some(document.clone()))
    }

    async fn delete(&self, key: DocumentKey) -> Result<(), Infallible> {
        let mut inner = self.inner.lock().await;
        inner.documents.remove(&key);
        Ok(())
    }

    async fn query(
        &self,
        query: DocumentQuery,
        page: PageRequest,
    ) -> Result<Paginated<Document>, Infallible> {
        let inner = self.inner.lock().await;
        let ordering = query.ordering();

        let mut matches: Vec<&Document> = inner
            .documents
            .values()
            .filter(|document| query.matches(document))
            .collect();
        matches.sort_by(|a, b| {
            ordering.compare(
                (ordering.sort_instant(a), a.key),
                (ordering.sort_instant(b), b.key),
            )
        });

        let resume_from = page.after.map(|cursor| (cursor.sort_instant, cursor.key));
        let positioned = matches.into_iter().filter(|document| {
            let position = (ordering.sort_instant(document), document.key);
            match resume_from {
                // strictly past the cursor, so a document deleted mid-walk
                // cannot stall the next page
                Some(cursor) => ordering.compare(cursor, position) == std::cmp::Ordering::Less,
                None => true,
            }
        });

        let limit = page.limit as usize;
        let mut items: Vec<Document> = positioned.take(limit + 1).cloned().collect();
        let next_cursor = if items.len() > limit {
            items.truncate(limit);
            items
                .last()
                .map(|document| PageCursor::after(ordering, document))
        } else {
            None
        };
        Ok(Paginated { items, next_cursor })
    }

    // the shared lock serializes the read-modify-write, so this
    // implementation never reports a conflict
    async fn counter_increment(&self) -> Result<u64, CounterError<Infallible>> {
        let mut inner = self.inner.lock().await;
        let (advanced, issued) = inner.counter.unwrap_or_default().next();
        inner.counter = Some(advanced);
        Ok(issued)
    }
}

/// In-memory [AttachmentStore] addressing bytes by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryAttachments {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryAttachments {
    /// true when bytes are stored under the path
    pub async fn contains(&self, path: &AttachmentPath) -> bool {
        self.inner.lock().await.contains_key(path.as_str())
    }

    /// the bytes stored under the path, if any
    pub async fn bytes(&self, path: &AttachmentPath) -> Option<Vec<u8>> {
        self.inner.lock().await.get(path.as_str()).cloned()
    }

    /// number of stored blobs
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// true when no blob is stored
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

impl AttachmentStore for MemoryAttachments {
    type Err = Infallible;

    async fn put(
        &self,
        path: &AttachmentPath,
        bytes: Vec<u8>,
    ) -> Result<AttachmentUrl, Infallible> {
        let mut inner = self.inner.lock().await;
        inner.insert(path.as_str().to_string(), bytes);
        Ok(AttachmentUrl::new(format!("memory://{path}")))
    }

    async fn remove(&self, paths: &[AttachmentPath]) -> Result<(), Infallible> {
        let mut inner = self.inner.lock().await;
        for path in paths {
            inner.remove(path.as_str());
        }
        Ok(())
    }
}

/// In-memory [SnapshotStore].
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshots {
    inner: Arc<Mutex<HashMap<UserId, NotificationSnapshot>>>,
}

impl SnapshotStore for MemorySnapshots {
    type Err = Infallible;

    async fn load(&self, user: &UserId) -> Result<NotificationSnapshot, Infallible> {
        let inner = self.inner.lock().await;
        Ok(inner.get(user).cloned().unwrap_or_default())
    }

    async fn store(
        &self,
        user: &UserId,
        snapshot: &NotificationSnapshot,
    ) -> Result<(), Infallible> {
        let mut inner = self.inner.lock().await;
        inner.insert(user.clone(), snapshot.clone());
        Ok(())
    }
}
