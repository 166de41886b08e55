use super::*;
use chrono::{DateTime, TimeZone, Utc};
use model_document::{
    AdminStatus, Attachment, AttachmentSet, Department, LifecycleStatus, Priority, TrackingCode,
    TrackingPrefix,
};

fn instant(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).unwrap()
}

fn document(owner: &str, sequence: u64, created: i64) -> Document {
    let attachments = AttachmentSet::new(vec![Attachment {
        name: "report.pdf".to_string(),
        url: AttachmentUrl::new("memory://attachments/pdf/x/report.pdf"),
    }])
    .unwrap();
    Document {
        key: DocumentKey::generate(),
        tracking_code: TrackingCode::new(TrackingPrefix::FALLBACK, 2026, sequence),
        title: "Quarterly report".to_string(),
        description: String::new(),
        category: "Report".to_string(),
        priority: Priority::Normal,
        origin_department: Department::from("Records"),
        owner_id: UserId::from(owner),
        file_types: attachments.file_types(),
        attachments,
        status: LifecycleStatus::Draft,
        admin_status: None,
        sender_id: None,
        recipient_id: None,
        remarks: None,
        admin_reply: None,
        forwarding_history: Vec::new(),
        created_at: instant(created),
        updated_at: instant(created),
        last_forwarded_at: None,
        deleted_at: None,
    }
}

fn sent(owner: &str, sender: &str, recipient: &str, sequence: u64, created: i64) -> Document {
    let mut document = document(owner, sequence, created);
    document.status = LifecycleStatus::Sent;
    document.admin_status = Some(AdminStatus::Pending);
    document.sender_id = Some(UserId::from(sender));
    document.recipient_id = Some(UserId::from(recipient));
    document.last_forwarded_at = Some(instant(created + 10));
    document
}

#[tokio::test]
async fn it_should_round_trip_documents_by_key() {
    let records = MemoryRecords::default();
    let doc = document("user-a", 1, 100);

    records.insert(doc.clone()).await.unwrap();

    assert_eq!(records.get(doc.key).await.unwrap(), Some(doc.clone()));
    assert_eq!(
        records.get(DocumentKey::generate()).await.unwrap(),
        None
    );

    records.delete(doc.key).await.unwrap();
    assert_eq!(records.get(doc.key).await.unwrap(), None);

    // deleting an absent key stays quiet
    records.delete(doc.key).await.unwrap();
}

#[tokio::test]
async fn it_should_merge_patches_without_touching_other_fields() {
    let records = MemoryRecords::default();
    let doc = document("user-a", 1, 100);
    records.insert(doc.clone()).await.unwrap();

    let merged = records
        .merge(
            doc.key,
            DocumentPatch {
                title: Some("Amended report".to_string()),
                ..DocumentPatch::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(merged.title, "Amended report");
    assert_eq!(merged.description, doc.description);
    assert_eq!(merged.updated_at, doc.updated_at);
    assert_eq!(records.get(doc.key).await.unwrap(), Some(merged));
}

#[tokio::test]
async fn it_should_return_none_when_merging_an_absent_key() {
    let records = MemoryRecords::default();

    let merged = records
        .merge(DocumentKey::generate(), DocumentPatch::default())
        .await
        .unwrap();

    assert_eq!(merged, None);
}

#[tokio::test]
async fn it_should_issue_counter_values_from_one() {
    let records = MemoryRecords::default();

    assert_eq!(records.counter_increment().await.unwrap(), 1);
    assert_eq!(records.counter_increment().await.unwrap(), 2);
    assert_eq!(records.counter_increment().await.unwrap(), 3);
}

#[tokio::test]
async fn it_should_filter_each_query_view() {
    let records = MemoryRecords::default();
    let draft = document("user-a", 1, 100);
    let routed = sent("user-a", "user-a", "user-b", 2, 200);
    let mut gone = sent("user-a", "user-a", "user-b", 3, 300);
    gone.status = LifecycleStatus::Deleted;
    gone.deleted_at = Some(instant(400));
    for doc in [draft.clone(), routed.clone(), gone.clone()] {
        records.insert(doc).await.unwrap();
    }

    let owned = records
        .query(
            DocumentQuery::OwnedBy(UserId::from("user-a")),
            PageRequest::default(),
        )
        .await
        .unwrap();
    let owned_keys: Vec<DocumentKey> = owned.items.iter().map(|doc| doc.key).collect();
    assert_eq!(owned_keys, vec![routed.key, draft.key]);

    let inbox = records
        .query(
            DocumentQuery::InboxFor(UserId::from("user-b")),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(inbox.items.len(), 1);
    assert_eq!(inbox.items[0].key, routed.key);

    let queue = records
        .query(DocumentQuery::AdminQueue, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(queue.items.len(), 1);
    assert_eq!(queue.items[0].key, routed.key);
}

#[tokio::test]
async fn it_should_order_the_inbox_by_most_recent_hop() {
    let records = MemoryRecords::default();
    // created later but forwarded earlier
    let mut stale = sent("user-a", "user-a", "user-b", 1, 300);
    stale.last_forwarded_at = Some(instant(310));
    let mut fresh = sent("user-c", "user-c", "user-b", 2, 100);
    fresh.last_forwarded_at = Some(instant(500));
    records.insert(stale.clone()).await.unwrap();
    records.insert(fresh.clone()).await.unwrap();

    let inbox = records
        .query(
            DocumentQuery::InboxFor(UserId::from("user-b")),
            PageRequest::default(),
        )
        .await
        .unwrap();

    let keys: Vec<DocumentKey> = inbox.items.iter().map(|doc| doc.key).collect();
    assert_eq!(keys, vec![fresh.key, stale.key]);
}

#[tokio::test]
async fn it_should_resume_pages_after_a_vanished_cursor_document() {
    let records = MemoryRecords::default();
    let oldest = document("user-a", 1, 100);
    let middle = document("user-a", 2, 200);
    let newest = document("user-a", 3, 300);
    for doc in [oldest.clone(), middle.clone(), newest.clone()] {
        records.insert(doc).await.unwrap();
    }
    let query = DocumentQuery::OwnedBy(UserId::from("user-a"));

    let first_page = records
        .query(query.clone(), PageRequest::first(2))
        .await
        .unwrap();
    let keys: Vec<DocumentKey> = first_page.items.iter().map(|doc| doc.key).collect();
    assert_eq!(keys, vec![newest.key, middle.key]);
    let cursor = first_page.next_cursor.unwrap();

    // the cursor document disappears between pages
    records.delete(middle.key).await.unwrap();

    let second_page = records
        .query(
            query,
            PageRequest {
                limit: 2,
                after: Some(cursor),
            },
        )
        .await
        .unwrap();
    let keys: Vec<DocumentKey> = second_page.items.iter().map(|doc| doc.key).collect();
    assert_eq!(keys, vec![oldest.key]);
    assert!(second_page.next_cursor.is_none());
}

#[tokio::test]
async fn it_should_not_hand_out_a_cursor_on_the_last_page() {
    let records = MemoryRecords::default();
    for (sequence, created) in [(1, 100), (2, 200)] {
        records
            .insert(document("user-a", sequence, created))
            .await
            .unwrap();
    }

    let page = records
        .query(
            DocumentQuery::OwnedBy(UserId::from("user-a")),
            PageRequest::first(2),
        )
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn it_should_store_and_remove_attachment_bytes() {
    let blobs = MemoryAttachments::default();
    let key = DocumentKey::generate();
    let path = AttachmentPath::new(key, "report.pdf");

    let url = blobs.put(&path, b"original".to_vec()).await.unwrap();
    assert_eq!(url.as_str(), format!("memory://{path}"));
    assert!(blobs.contains(&path).await);
    assert_eq!(blobs.bytes(&path).await.as_deref(), Some(b"original".as_slice()));

    // writing the same path replaces the bytes, the address stays
    let replacement = blobs.put(&path, b"signed".to_vec()).await.unwrap();
    assert_eq!(replacement, url);
    assert_eq!(blobs.bytes(&path).await.as_deref(), Some(b"signed".as_slice()));

    let other = AttachmentPath::new(key, "absent.pdf");
    blobs.remove(&[path.clone(), other]).await.unwrap();
    assert!(!blobs.contains(&path).await);
    assert!(blobs.is_empty().await);
}

#[tokio::test]
async fn it_should_default_missing_snapshots() {
    let snapshots = MemorySnapshots::default();
    let user = UserId::from("user-a");

    let loaded = snapshots.load(&user).await.unwrap();
    assert!(loaded.is_empty());

    let mut snapshot = NotificationSnapshot::default();
    snapshot.record(
        TrackingCode::new(TrackingPrefix::FALLBACK, 2026, 1),
        AdminStatus::Pending,
    );
    snapshots.store(&user, &snapshot).await.unwrap();

    assert_eq!(snapshots.load(&user).await.unwrap(), snapshot);
    // other users stay untouched
    assert!(snapshots.load(&UserId::from("user-b")).await.unwrap().is_empty());
}
