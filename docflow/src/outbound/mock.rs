//! [mockall::mock] doubles for the ports, for tests in dependent crates.

use crate::domain::models::{
    AttachmentPath, DocumentPatch, DocumentQuery, NotificationSnapshot, PageRequest, Paginated,
};
use crate::domain::ports::{
    AttachmentStore, CounterError, DocumentRecords, SnapshotStore, TimeGetter,
};
use chrono::{DateTime, Utc};
use mockall::mock;
use model_document::{AttachmentUrl, Document, DocumentKey, UserId};
use std::convert::Infallible;

const _NOT_PROD: () = const {
    assert!(
        cfg!(debug_assertions),
        "You are trying to include mock code in a production build please run `cargo tree -i docflow -e features -p <FAILING_PACKAGE>` to see how the mock feature is being included in [dependencies]"
    );
};

mock! {
    pub Records {}
    impl DocumentRecords for Records {
        type Err = Infallible;

        fn insert(&self, document: Document) -> impl Future<Output = Result<(), Infallible>> + Send;

        fn get(&self, key: DocumentKey) -> impl Future<Output = Result<Option<Document>, Infallible>> + Send;

        fn merge(&self, key: DocumentKey, patch: DocumentPatch) -> impl Future<Output = Result<Option<Document>, Infallible>> + Send;

        fn delete(&self, key: DocumentKey) -> impl Future<Output = Result<(), Infallible>> + Send;

        fn query(&self, query: DocumentQuery, page: PageRequest) -> impl Future<Output = Result<Paginated<Document>, Infallible>> + Send;

        fn counter_increment(&self) -> impl Future<Output = Result<u64, CounterError<Infallible>>> + Send;
    }
}

mock! {
    pub Attachments {}
    impl AttachmentStore for Attachments {
        type Err = Infallible;

        fn put<'a>(&self, path: &'a AttachmentPath, bytes: Vec<u8>) -> impl Future<Output = Result<AttachmentUrl, Infallible>> + Send;

        fn remove<'a>(&self, paths: &'a [AttachmentPath]) -> impl Future<Output = Result<(), Infallible>> + Send;
    }
}

mock! {
    pub Snapshots {}
    impl SnapshotStore for Snapshots {
        type Err = Infallible;

        fn load<'a>(&self, user: &'a UserId) -> impl Future<Output = Result<NotificationSnapshot, Infallible>> + Send;

        fn store<'a, 'b>(&self, user: &'a UserId, snapshot: &'b NotificationSnapshot) -> impl Future<Output = Result<(), Infallible>> + Send;
    }
}

mock! {
    pub Time {}
    impl TimeGetter for Time {
        fn now(&self) -> DateTime<Utc>;
    }
}
