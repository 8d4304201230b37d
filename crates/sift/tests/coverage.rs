//! Scenario tests over a notification-like record.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use sift::{
    compile_filter, compile_sort, Compiler, FieldMap, FieldType, FilterNode, Include, Operator,
    Page, Predicate, Query, Queryable, SiftError, SortRule, TypedValue,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Message {
    id: Uuid,
    subject: String,
    body: String,
    is_read: bool,
    created_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
}

impl Queryable for Message {
    fn field_map() -> FieldMap<Self> {
        FieldMap::<Self>::builder()
            .uuid("id", |m| Some(m.id))
            .text("subject", |m| Some(m.subject.as_str()))
            .text("body", |m| Some(m.body.as_str()))
            .boolean("isRead", |m| Some(m.is_read))
            .timestamp("createdAt", |m| Some(m.created_at))
            .timestamp("readAt", |m| m.read_at)
            .build()
    }
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
}

fn message(n: u128, subject: &str) -> Message {
    Message {
        id: Uuid::from_u128(n),
        subject: subject.to_string(),
        body: String::new(),
        is_read: false,
        created_at: day(1),
        read_at: None,
    }
}

fn subjects(pred: &Predicate<Message>, messages: &[Message]) -> Vec<String> {
    pred.filter(messages)
        .iter()
        .map(|m| m.subject.clone())
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn contains_on_subject() {
    let messages = vec![message(1, "111"), message(2, "112"), message(3, "123")];
    let fields = Message::field_map();
    let pred = compile_filter(&fields, &FilterNode::contains("subject", "11")).unwrap();
    assert_eq!(subjects(&pred, &messages), vec!["111", "112"]);
}

#[test]
fn eq_on_bool() {
    let mut messages = vec![message(1, "a"), message(2, "b"), message(3, "c")];
    messages[0].is_read = true;
    messages[1].is_read = true;

    let fields = Message::field_map();
    let pred = compile_filter(&fields, &FilterNode::eq("isRead", true)).unwrap();
    assert_eq!(subjects(&pred, &messages), vec!["a", "b"]);
}

#[test]
fn or_of_equalities() {
    let messages = vec![message(1, "123"), message(2, "321"), message(3, "222")];
    let fields = Message::field_map();
    let tree = FilterNode::or(vec![
        FilterNode::eq("subject", "123"),
        FilterNode::eq("subject", "321"),
    ]);
    let pred = compile_filter(&fields, &tree).unwrap();
    assert_eq!(subjects(&pred, &messages), vec!["123", "321"]);
}

#[test]
fn sort_asc_then_desc() {
    let mut messages = vec![message(1, "1"), message(2, "2"), message(3, "1")];
    messages[0].body = "2".into();
    messages[1].body = "1".into();
    messages[2].body = "3".into();

    let fields = Message::field_map();
    let order = compile_sort(&fields, &[SortRule::asc("subject"), SortRule::desc("body")]).unwrap();
    order.sort(&mut messages);

    let got: Vec<_> = messages
        .iter()
        .map(|m| (m.subject.as_str(), m.body.as_str()))
        .collect();
    assert_eq!(got, vec![("1", "3"), ("1", "2"), ("2", "1")]);
}

#[test]
fn not_in_on_timestamp() {
    let mut messages = vec![message(1, "t0"), message(2, "t1"), message(3, "t2")];
    for (i, m) in messages.iter_mut().enumerate() {
        m.created_at = day(i as u32 + 1);
    }

    let fields = Message::field_map();
    let pred = compile_filter(&fields, &FilterNode::not_in("createdAt", [day(1), day(2)])).unwrap();
    assert_eq!(subjects(&pred, &messages), vec!["t2"]);
}

#[test]
fn unknown_field_in_any_node() {
    let fields = Message::field_map();
    let trees = [
        FilterNode::eq("bogus", "x"),
        FilterNode::is_in("bogus", ["x"]),
        FilterNode::and(vec![FilterNode::eq("subject", "x"), FilterNode::contains("bogus", "x")]),
        FilterNode::or(vec![
            FilterNode::eq("subject", "x"),
            FilterNode::and(vec![FilterNode::eq("isRead", true), FilterNode::not_eq("bogus", 1i64)]),
        ]),
    ];
    for tree in &trees {
        assert_eq!(
            compile_filter(&fields, tree).unwrap_err(),
            SiftError::UnknownField("bogus".into()),
            "{tree:?}"
        );
    }
    assert_eq!(
        compile_sort(&fields, &[SortRule::asc("bogus")]).unwrap_err(),
        SiftError::UnknownField("bogus".into())
    );
}

// ============================================================================
// Wire format
// ============================================================================

#[test]
fn json_tree_with_coerced_operands() {
    let mut messages = vec![message(1, "build 11"), message(2, "build 12"), message(3, "deploy")];
    messages[1].created_at = day(5);

    let tree: FilterNode = serde_json::from_value(json!({
        "operator": "and",
        "children": [
            {"fieldId": "subject", "operator": "contains", "value": "build"},
            {"fieldId": "createdAt", "operator": ">=", "value": "2024-03-02T00:00:00Z"},
            {"fieldId": "id", "operator": "!in", "values": ["00000000-0000-0000-0000-000000000009"]}
        ]
    }))
    .unwrap();

    let fields = Message::field_map();
    let pred = compile_filter(&fields, &tree).unwrap();
    assert_eq!(subjects(&pred, &messages), vec!["build 12"]);
}

#[test]
fn json_operand_of_wrong_type_names_the_field() {
    let tree: FilterNode =
        serde_json::from_value(json!({"fieldId": "isRead", "operator": "=", "value": "yes"})).unwrap();
    let fields = Message::field_map();
    let err = compile_filter(&fields, &tree).unwrap_err();
    assert_eq!(err.field(), Some("isRead"));
    assert!(matches!(
        err,
        SiftError::ValueCoercion {
            expected: FieldType::Bool,
            ..
        }
    ));
}

#[test]
fn json_epoch_millis_timestamp() {
    let messages = vec![message(1, "a")];
    let millis = day(1).timestamp_millis();
    let tree: FilterNode =
        serde_json::from_value(json!({"fieldId": "createdAt", "operator": "=", "value": millis}))
            .unwrap();
    let fields = Message::field_map();
    let pred = compile_filter(&fields, &tree).unwrap();
    assert_eq!(pred.count(&messages), 1);
}

#[test]
fn tree_survives_json_round_trip() {
    let tree = FilterNode::or(vec![
        FilterNode::eq("subject", "a"),
        FilterNode::and(vec![
            FilterNode::is_null("readAt"),
            FilterNode::is_in("createdAt", [day(1)]),
        ]),
    ]);
    let text = serde_json::to_string(&tree).unwrap();
    let decoded: FilterNode = serde_json::from_str(&text).unwrap();

    let messages = vec![message(1, "a"), message(2, "b")];
    let fields = Message::field_map();
    let original = compile_filter(&fields, &tree).unwrap();
    let reparsed = compile_filter(&fields, &decoded).unwrap();
    assert_eq!(subjects(&original, &messages), subjects(&reparsed, &messages));
}

// ============================================================================
// Null policy
// ============================================================================

fn with_read_state() -> Vec<Message> {
    let mut messages = vec![message(1, "unread"), message(2, "read early"), message(3, "read late")];
    messages[1].read_at = Some(day(2));
    messages[2].read_at = Some(day(9));
    messages
}

#[test]
fn null_equality() {
    let messages = with_read_state();
    let fields = Message::field_map();

    let is_null = compile_filter(&fields, &FilterNode::is_null("readAt")).unwrap();
    assert_eq!(subjects(&is_null, &messages), vec!["unread"]);

    let not_null = compile_filter(&fields, &FilterNode::not_eq("readAt", TypedValue::Null)).unwrap();
    assert_eq!(subjects(&not_null, &messages), vec!["read early", "read late"]);
}

#[test]
fn negations_match_null_records() {
    let messages = with_read_state();
    let fields = Message::field_map();

    let ne = compile_filter(&fields, &FilterNode::not_eq("readAt", day(2))).unwrap();
    assert_eq!(subjects(&ne, &messages), vec!["unread", "read late"]);

    let not_in = compile_filter(&fields, &FilterNode::not_in("readAt", [day(9)])).unwrap();
    assert_eq!(subjects(&not_in, &messages), vec!["unread", "read early"]);
}

#[test]
fn ordering_never_matches_null() {
    let messages = with_read_state();
    let fields = Message::field_map();

    let before = compile_filter(&fields, &FilterNode::lt("readAt", day(5))).unwrap();
    let after = compile_filter(&fields, &FilterNode::gte("readAt", day(5))).unwrap();
    assert_eq!(subjects(&before, &messages), vec!["read early"]);
    assert_eq!(subjects(&after, &messages), vec!["read late"]);
}

#[test]
fn membership_with_null_member() {
    let messages = with_read_state();
    let fields = Message::field_map();
    let tree: FilterNode = serde_json::from_value(json!({
        "fieldId": "readAt", "operator": "in", "values": [null, "2024-03-09T12:00:00Z"]
    }))
    .unwrap();
    let pred = compile_filter(&fields, &tree).unwrap();
    assert_eq!(subjects(&pred, &messages), vec!["unread", "read late"]);
}

#[test]
fn null_operand_rejected_for_ordering() {
    let fields = Message::field_map();
    let err = compile_filter(&fields, &FilterNode::gt("readAt", TypedValue::Null)).unwrap_err();
    assert_eq!(err.field(), Some("readAt"));
}

#[test]
fn nulls_sort_first_ascending() {
    let mut messages = with_read_state();
    messages.reverse();
    let fields = Message::field_map();

    let asc = compile_sort(&fields, &[SortRule::asc("readAt")]).unwrap();
    let got: Vec<_> = asc.sorted(&messages).iter().map(|m| m.subject.as_str()).collect();
    assert_eq!(got, vec!["unread", "read early", "read late"]);

    let desc = compile_sort(&fields, &[SortRule::desc("readAt")]).unwrap();
    let got: Vec<_> = desc.sorted(&messages).iter().map(|m| m.subject.as_str()).collect();
    assert_eq!(got, vec!["read late", "read early", "unread"]);
}

#[test]
fn float_operands_keep_their_meaning_on_the_wire() {
    struct Reading {
        ratio: Option<f64>,
    }
    let fields = FieldMap::<Reading>::builder()
        .float("ratio", |r| r.ratio)
        .build();

    // NaN has no JSON form and would decode as null
    for bad in [f64::NAN, f64::INFINITY] {
        let err = compile_filter(&fields, &FilterNode::eq("ratio", bad)).unwrap_err();
        assert!(matches!(err, SiftError::ValueCoercion { .. }), "{err}");
    }

    // 2^53 + 1 rounds to 2^53 as an f64
    let tree: FilterNode = serde_json::from_value(json!({
        "fieldId": "ratio", "operator": "=", "value": 9007199254740993u64
    }))
    .unwrap();
    let err = compile_filter(&fields, &tree).unwrap_err();
    assert_eq!(err.field(), Some("ratio"));

    let pred = compile_filter(&fields, &FilterNode::eq("ratio", 0.5)).unwrap();
    assert!(pred.matches(&Reading { ratio: Some(0.5) }));
    assert!(!pred.matches(&Reading { ratio: None }));
}

// ============================================================================
// Operator applicability
// ============================================================================

#[test]
fn ordering_operators_rejected_on_unordered_fields() {
    let fields = Message::field_map();
    for (field, value) in [
        ("subject", json!("a")),
        ("isRead", json!(true)),
        ("id", json!("00000000-0000-0000-0000-000000000001")),
    ] {
        let err = compile_filter(&fields, &FilterNode::gt(field, value)).unwrap_err();
        assert!(
            matches!(err, SiftError::OperatorNotApplicable { operator: Operator::Gt, .. }),
            "{field}: {err}"
        );
    }
}

#[test]
fn contains_rejected_on_non_text_fields() {
    let fields = Message::field_map();
    let err = compile_filter(&fields, &FilterNode::contains("createdAt", "2024")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "operator 'contains' is not applicable to timestamp field 'createdAt'"
    );
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn inbox_page_with_counts() {
    let mut messages: Vec<Message> = (1..=6).map(|n| message(n, &format!("m{n}"))).collect();
    for m in messages.iter_mut().filter(|m| m.id.as_u128() % 2 == 0) {
        m.is_read = true;
    }
    for (i, m) in messages.iter_mut().enumerate() {
        m.created_at = day(i as u32 + 1);
    }

    let fields = Message::field_map();
    let result = Query::new()
        .filter(FilterNode::eq("isRead", false))
        .sort(SortRule::desc("createdAt"))
        .page(Page::new(0, Some(2)))
        .include(Include::all())
        .execute(&Compiler::new(&fields), &messages)
        .unwrap();

    let got: Vec<_> = result
        .items
        .unwrap_or_default()
        .iter()
        .map(|m| m.subject.as_str())
        .collect();
    assert_eq!(got, vec!["m5", "m3"]);
    assert_eq!(result.total_count, Some(6));
    assert_eq!(result.total_match_count, Some(3));
}

#[test]
fn query_json_with_empty_sort_keeps_input_order() {
    let messages = vec![message(2, "b"), message(1, "a")];
    let query: Query = serde_json::from_value(json!({"sort": []})).unwrap();
    let fields = Message::field_map();
    let result = query.execute(&Compiler::new(&fields), &messages).unwrap();
    let got: Vec<_> = result
        .items
        .unwrap_or_default()
        .iter()
        .map(|m| m.subject.as_str())
        .collect();
    assert_eq!(got, vec!["b", "a"]);
}
