//! Cross-session change detection for administrative statuses.

use crate::domain::models::ChangedDocuments;
use crate::domain::ports::SnapshotStore;
use model_document::{Document, UserId};


/// Detects administrative status changes between a user's sessions.
///
/// Works entirely off the per-user snapshot of statuses already surfaced.
/// The engine never fails the surrounding call: when the snapshot store
/// misbehaves the cost is a missed or repeated notification, which is the
/// accepted trade for keeping document reads unaffected.
pub struct NotificationDiff<S> {
    snapshots: S,
}

impl<S> NotificationDiff<S> {
    /// a diff engine over the given snapshot store
    pub fn new(snapshots: S) -> Self {
        NotificationDiff { snapshots }
    }
}

impl<S> NotificationDiff<S>
where
    S: SnapshotStore,
    anyhow::Error: From<S::Err>,
{
    /// Compare the documents against the user's last-seen snapshot.
    ///
    /// A document is flagged when its administrative status differs from
    /// the recorded one. First sightings record the status without
    /// flagging; drafts carry no administrative status and are skipped.
    /// The advanced snapshot is persisted before returning. If the load
    /// fails nothing is flagged, and if the store fails the flags still
    /// stand and the same changes will simply flag again next time.
    #[tracing::instrument(skip(self, documents), fields(user = %user))]
    pub async fn refresh(&self, user: &UserId, documents: &[Document]) -> ChangedDocuments {
        let mut snapshot = match self.snapshots.load(user).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                let err = anyhow::Error::from(err);
                tracing::warn!(
                    error = ?err,
                    "notification snapshot unavailable, skipping change detection"
                );
                return ChangedDocuments::default();
            }
        };

        let mut changed = ChangedDocuments::default();
        for document in documents {
            let Some(current) = document.admin_status else {
                continue;
            };
            let previous = snapshot.record(document.tracking_code.clone(), current);
            if let Some(previous) = previous
                && previous != current
            {
                changed.insert(document.tracking_code.clone());
            }
        }

        if let Err(err) = self.snapshots.store(user, &snapshot).await {
            let err = anyhow::Error::from(err);
            tracing::warn!(
                error = ?err,
                "notification snapshot not persisted, changes will flag again"
            );
        }
        changed
    }

    /// Record that the user has seen the document's current administrative
    /// status, clearing any pending change flag for it. The write is
    /// skipped when the snapshot already agrees, so repeated views are
    /// free.
    #[tracing::instrument(skip(self, document), fields(user = %user, code = %document.tracking_code))]
    pub async fn mark_viewed(&self, user: &UserId, document: &Document) {
        let Some(current) = document.admin_status else {
            return;
        };

        let mut snapshot = match self.snapshots.load(user).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                let err = anyhow::Error::from(err);
                tracing::warn!(
                    error = ?err,
                    "notification snapshot unavailable, view not recorded"
                );
                return;
            }
        };
        if snapshot.last_seen(&document.tracking_code) == Some(current) {
            return;
        }

        snapshot.record(document.tracking_code.clone(), current);
        if let Err(err) = self.snapshots.store(user, &snapshot).await {
            let err = anyhow::Error::from(err);
            tracing::warn!(error = ?err, "notification snapshot not persisted, view not recorded");
        }
    }
}
