//! Tests for `#[derive(Queryable)]`.

use chrono::{DateTime, TimeZone, Utc};
use sift::{compile_filter, compile_sort, FieldType, FilterNode, Queryable, SortRule};
use uuid::Uuid;

#[derive(Debug, Clone, sift_macros::Queryable)]
#[sift(rename_all = "camelCase")]
struct Notification {
    #[sift(Uuid)]
    id: Uuid,
    #[sift(Text)]
    recipient_id: String,
    #[sift(Text)]
    subject: String,
    #[sift(Bool)]
    is_read: bool,
    #[sift(Timestamp)]
    created_at: DateTime<Utc>,
    #[sift(Text)]
    read_by_id: Option<String>,
    #[sift(Timestamp)]
    read_at: Option<DateTime<Utc>>,
    #[sift(Integer, rename = "retries")]
    attempt_count: u8,
    #[sift(Float)]
    score: Option<f32>,
    #[sift(skip)]
    body: String,
    internal: u64,
}

fn notification(n: u128, subject: &str) -> Notification {
    Notification {
        id: Uuid::from_u128(n),
        recipient_id: "user-1".into(),
        subject: subject.into(),
        is_read: false,
        created_at: Utc.with_ymd_and_hms(2024, 1, n as u32, 0, 0, 0).unwrap(),
        read_by_id: None,
        read_at: None,
        attempt_count: n as u8,
        score: None,
        body: String::new(),
        internal: 0,
    }
}

#[test]
fn derived_field_map_lists_annotated_fields() {
    let fields = Notification::field_map();
    assert_eq!(
        fields.field_ids(),
        vec![
            "createdAt",
            "id",
            "isRead",
            "readAt",
            "readById",
            "recipientId",
            "retries",
            "score",
            "subject",
        ]
    );
    assert_eq!(fields.field_type("id"), Some(FieldType::Uuid));
    assert_eq!(fields.field_type("retries"), Some(FieldType::Integer));
    assert_eq!(fields.field_type("score"), Some(FieldType::Float));
    assert!(!fields.contains("body"));
    assert!(!fields.contains("internal"));
}

#[test]
fn derived_constants() {
    assert_eq!(Notification::IS_READ, "isRead");
    assert_eq!(Notification::CREATED_AT, "createdAt");
    assert_eq!(Notification::ATTEMPT_COUNT, "retries");
}

#[test]
fn derived_accessors_filter_and_sort() {
    let mut inbox = vec![
        notification(1, "welcome"),
        notification(2, "build failed"),
        notification(3, "build fixed"),
    ];
    inbox[0].is_read = true;
    inbox[0].read_by_id = Some("user-1".into());

    let fields = Notification::field_map();
    let tree = FilterNode::and(vec![
        FilterNode::eq(Notification::IS_READ, false),
        FilterNode::is_null(Notification::READ_BY_ID),
        FilterNode::gte(Notification::ATTEMPT_COUNT, 2i64),
    ]);
    let pred = compile_filter(&fields, &tree).unwrap();
    let order = compile_sort(&fields, &[SortRule::desc(Notification::CREATED_AT)]).unwrap();

    let mut hits = pred.filter(&inbox);
    order.sort_refs(&mut hits);
    let subjects: Vec<_> = hits.iter().map(|n| n.subject.as_str()).collect();
    assert_eq!(subjects, vec!["build fixed", "build failed"]);
}

#[derive(sift_macros::Queryable)]
struct Envelope<T> {
    #[sift(Text)]
    topic: String,
    #[sift(Integer)]
    attempts: Option<i64>,
    payload: T,
}

#[test]
fn derived_for_generic_struct() {
    let fields = Envelope::<Vec<u8>>::field_map();
    assert_eq!(fields.field_ids(), vec!["attempts", "topic"]);

    let envelopes = vec![
        Envelope { topic: "build".into(), attempts: Some(2), payload: vec![1u8] },
        Envelope { topic: "deploy".into(), attempts: None, payload: vec![] },
    ];
    let pred = compile_filter(&fields, &FilterNode::gt("attempts", 1i64)).unwrap();
    let hits = pred.filter(&envelopes);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].topic, "build");
    assert_eq!(hits[0].payload, vec![1u8]);
}
