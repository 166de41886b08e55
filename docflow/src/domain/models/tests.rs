use super::*;
use chrono::TimeZone;
use model_document::{Attachment, AttachmentSet, AttachmentUrl, TrackingPrefix};

fn instant(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).unwrap()
}

fn attachment(name: &str) -> Attachment {
    Attachment {
        name: name.to_string(),
        url: AttachmentUrl::new(format!("memory://attachments/test/{name}")),
    }
}

fn code(sequence: u64) -> TrackingCode {
    TrackingCode::new(TrackingPrefix::FALLBACK, 2026, sequence)
}

fn document(owner: &str, created: i64) -> Document {
    let attachments = AttachmentSet::new(vec![attachment("report.pdf")]).unwrap();
    let file_types = attachments.file_types();
    Document {
        key: DocumentKey::generate(),
        tracking_code: code(1),
        title: "Quarterly report".to_string(),
        description: String::new(),
        category: "Report".to_string(),
        priority: Priority::Normal,
        origin_department: Department::from("Records"),
        owner_id: UserId::from(owner),
        attachments,
        file_types,
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

fn sent(owner: &str, sender: &str, recipient: &str, created: i64, forwarded: i64) -> Document {
    let mut document = document(owner, created);
    document.status = LifecycleStatus::Sent;
    document.admin_status = Some(AdminStatus::Pending);
    document.sender_id = Some(UserId::from(sender));
    document.recipient_id = Some(UserId::from(recipient));
    document.last_forwarded_at = Some(instant(forwarded));
    document
}

#[test]
fn it_should_apply_every_patch_field() {
    let mut doc = document("user-a", 100);
    let attachments = AttachmentSet::new(vec![attachment("minutes.docx")]).unwrap();
    let hop = ForwardingRecord {
        recipient: UserId::from("user-b"),
        target_unit: "Accounting Unit".to_string(),
        remarks: Some("for processing".to_string()),
        sender: SenderSnapshot {
            id: UserId::from("user-a"),
            email: "a@city.test".to_string(),
            department: Department::from("Finance"),
        },
        forwarded_at: instant(200),
    };

    let patch = DocumentPatch {
        title: Some("Amended report".to_string()),
        description: Some("now with figures".to_string()),
        category: Some("Memorandum".to_string()),
        priority: Some(Priority::Urgent),
        attachments: Some(attachments.clone()),
        file_types: Some(attachments.file_types()),
        status: Some(LifecycleStatus::Sent),
        admin_status: Some(AdminStatus::InReview),
        sender_id: Some(UserId::from("user-a")),
        recipient_id: Some(UserId::from("user-b")),
        remarks: Some("checked".to_string()),
        admin_reply: Some("received".to_string()),
        history_append: Some(hop.clone()),
        updated_at: Some(instant(200)),
        last_forwarded_at: Some(instant(200)),
        deleted_at: Some(instant(300)),
    };
    patch.apply(&mut doc);

    assert_eq!(doc.title, "Amended report");
    assert_eq!(doc.description, "now with figures");
    assert_eq!(doc.category, "Memorandum");
    assert_eq!(doc.priority, Priority::Urgent);
    assert_eq!(doc.attachments, attachments);
    assert_eq!(doc.file_types, vec![FileType::Docx]);
    assert_eq!(doc.status, LifecycleStatus::Sent);
    assert_eq!(doc.admin_status, Some(AdminStatus::InReview));
    assert_eq!(doc.sender_id, Some(UserId::from("user-a")));
    assert_eq!(doc.recipient_id, Some(UserId::from("user-b")));
    assert_eq!(doc.remarks.as_deref(), Some("checked"));
    assert_eq!(doc.admin_reply.as_deref(), Some("received"));
    assert_eq!(doc.forwarding_history, vec![hop]);
    assert_eq!(doc.updated_at, instant(200));
    assert_eq!(doc.last_forwarded_at, Some(instant(200)));
    assert_eq!(doc.deleted_at, Some(instant(300)));
}

#[test]
fn it_should_leave_unpatched_fields_alone() {
    let mut doc = sent("user-a", "user-a", "user-b", 100, 150);
    let before = doc.clone();

    DocumentPatch::default().apply(&mut doc);
    assert_eq!(doc, before);

    let patch = DocumentPatch {
        title: Some("Renamed".to_string()),
        ..DocumentPatch::default()
    };
    patch.apply(&mut doc);
    assert_eq!(doc.title, "Renamed");
    assert_eq!(doc.recipient_id, before.recipient_id);
    assert_eq!(doc.forwarding_history, before.forwarding_history);
    assert_eq!(doc.updated_at, before.updated_at);
}

#[test]
fn it_should_append_history_without_touching_earlier_hops() {
    let mut doc = document("user-a", 100);
    let first = ForwardingRecord {
        recipient: UserId::from("user-b"),
        target_unit: "Records Unit".to_string(),
        remarks: None,
        sender: SenderSnapshot {
            id: UserId::from("user-a"),
            email: "a@city.test".to_string(),
            department: Department::from("Records"),
        },
        forwarded_at: instant(110),
    };
    let second = ForwardingRecord {
        recipient: UserId::from("user-c"),
        target_unit: "Accounting Unit".to_string(),
        remarks: Some("onwards".to_string()),
        sender: SenderSnapshot {
            id: UserId::from("user-b"),
            email: "b@city.test".to_string(),
            department: Department::from("Finance"),
        },
        forwarded_at: instant(120),
    };

    for hop in [first.clone(), second.clone()] {
        let patch = DocumentPatch {
            history_append: Some(hop),
            ..DocumentPatch::default()
        };
        patch.apply(&mut doc);
    }

    assert_eq!(doc.forwarding_history, vec![first, second]);
}

#[test]
fn it_should_derive_attachment_paths_from_stable_parts() {
    let key = DocumentKey::generate();

    let path = AttachmentPath::new(key, "Report.PDF");
    assert_eq!(path.as_str(), format!("attachments/pdf/{key}/Report.PDF"));

    let unknown = AttachmentPath::new(key, "notes.xyz");
    assert_eq!(unknown.as_str(), format!("attachments/file/{key}/notes.xyz"));

    let hostile = AttachmentPath::new(key, "../up/escape.pdf");
    assert_eq!(
        hostile.as_str(),
        format!("attachments/pdf/{key}/.._up_escape.pdf")
    );
}

#[test]
fn it_should_match_documents_to_the_right_views() {
    let owner = UserId::from("user-a");
    let other = UserId::from("user-b");

    let draft = document("user-a", 100);
    assert!(DocumentQuery::OwnedBy(owner.clone()).matches(&draft));
    assert!(!DocumentQuery::OwnedBy(other.clone()).matches(&draft));
    assert!(!DocumentQuery::InboxFor(other.clone()).matches(&draft));
    assert!(!DocumentQuery::AdminQueue.matches(&draft));

    let sent = sent("user-a", "user-a", "user-b", 100, 150);
    assert!(DocumentQuery::OutboxFor(owner.clone()).matches(&sent));
    assert!(DocumentQuery::InboxFor(other.clone()).matches(&sent));
    assert!(!DocumentQuery::InboxFor(owner.clone()).matches(&sent));
    assert!(DocumentQuery::AdminQueue.matches(&sent));

    let mut deleted = sent.clone();
    deleted.status = LifecycleStatus::Deleted;
    deleted.deleted_at = Some(instant(200));
    assert!(!DocumentQuery::OwnedBy(owner.clone()).matches(&deleted));
    assert!(!DocumentQuery::InboxFor(other).matches(&deleted));
    assert!(!DocumentQuery::OutboxFor(owner).matches(&deleted));
    assert!(!DocumentQuery::AdminQueue.matches(&deleted));
}

#[test]
fn it_should_pick_the_ordering_for_each_view() {
    let user = UserId::from("user-a");
    assert_eq!(
        DocumentQuery::OwnedBy(user.clone()).ordering(),
        QueryOrdering::NewestCreated
    );
    assert_eq!(
        DocumentQuery::InboxFor(user.clone()).ordering(),
        QueryOrdering::RecentlyForwarded
    );
    assert_eq!(
        DocumentQuery::OutboxFor(user).ordering(),
        QueryOrdering::RecentlyForwarded
    );
    assert_eq!(
        DocumentQuery::AdminQueue.ordering(),
        QueryOrdering::OldestCreated
    );

    // a never-forwarded document sorts by creation under the hop ordering
    let draft = document("user-a", 100);
    assert_eq!(
        QueryOrdering::RecentlyForwarded.sort_instant(&draft),
        instant(100)
    );
    let sent = sent("user-a", "user-a", "user-b", 100, 150);
    assert_eq!(
        QueryOrdering::RecentlyForwarded.sort_instant(&sent),
        instant(150)
    );
}

#[test]
fn it_should_compare_walk_positions_in_both_directions() {
    let early = (instant(100), DocumentKey::generate());
    let late = (instant(200), DocumentKey::generate());

    assert_eq!(
        QueryOrdering::OldestCreated.compare(early, late),
        std::cmp::Ordering::Less
    );
    assert_eq!(
        QueryOrdering::NewestCreated.compare(early, late),
        std::cmp::Ordering::Greater
    );

    // instants collide, the key keeps the order total
    let tied_a = (instant(100), early.1.min(late.1));
    let tied_b = (instant(100), early.1.max(late.1));
    assert_eq!(
        QueryOrdering::OldestCreated.compare(tied_a, tied_b),
        std::cmp::Ordering::Less
    );
    assert_eq!(
        QueryOrdering::NewestCreated.compare(tied_a, tied_b),
        std::cmp::Ordering::Greater
    );
    assert_eq!(
        QueryOrdering::NewestCreated.compare(tied_a, tied_a),
        std::cmp::Ordering::Equal
    );
}

#[test]
fn it_should_clamp_page_limits_into_the_served_range() {
    assert_eq!(PageRequest::first(0).clamped().limit, MIN_PAGE_LIMIT);
    assert_eq!(PageRequest::first(7).clamped().limit, 7);
    assert_eq!(PageRequest::first(100_000).clamped().limit, MAX_PAGE_LIMIT);
    assert_eq!(PageRequest::default().limit, DEFAULT_PAGE_LIMIT);
}

#[test]
fn it_should_round_trip_cursors_through_json() {
    let request = PageRequest {
        limit: 25,
        after: Some(PageCursor {
            sort_instant: DateTime::from_timestamp_micros(1_772_000_123_456).unwrap(),
            key: DocumentKey::generate(),
        }),
    };

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["limit"], 25);
    assert!(value["after"]["sortInstant"].is_i64());

    let back: PageRequest = serde_json::from_value(value).unwrap();
    assert_eq!(back, request);
}

#[test]
fn it_should_track_last_seen_statuses() {
    let mut snapshot = NotificationSnapshot::default();
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.last_seen(&code(1)), None);

    assert_eq!(snapshot.record(code(1), AdminStatus::Pending), None);
    assert_eq!(
        snapshot.record(code(1), AdminStatus::Rejected),
        Some(AdminStatus::Pending)
    );
    assert_eq!(snapshot.last_seen(&code(1)), Some(AdminStatus::Rejected));
    assert_eq!(snapshot.len(), 1);
}

#[test]
fn it_should_serialize_snapshots_as_a_flat_code_map() {
    let mut snapshot = NotificationSnapshot::default();
    snapshot.record(code(7), AdminStatus::InReview);

    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value, serde_json::json!({ "DOC-2026-00007": "In Review" }));

    let back: NotificationSnapshot = serde_json::from_value(value).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn it_should_expose_changed_codes() {
    let mut changed = ChangedDocuments::default();
    assert!(changed.is_empty());

    changed.insert(code(1));
    changed.insert(code(2));
    changed.insert(code(1));

    assert_eq!(changed.len(), 2);
    assert!(changed.contains(&code(1)));
    assert!(!changed.contains(&code(3)));
    assert_eq!(changed.iter().count(), 2);
}

#[test]
fn it_should_describe_failures_in_plain_language() {
    assert_eq!(
        ValidationError::MissingField("title").to_string(),
        "required field \"title\" is missing or empty"
    );
    assert_eq!(
        ValidationError::SelfForward.to_string(),
        "a document cannot be forwarded to its sender"
    );

    let key = DocumentKey::generate();
    assert_eq!(
        WorkflowError::NotFound(key).to_string(),
        format!("no document found for key {key}")
    );
    assert_eq!(
        WorkflowError::InvalidState {
            status: LifecycleStatus::Deleted
        }
        .to_string(),
        "the operation is not allowed while the document is Deleted"
    );
}
