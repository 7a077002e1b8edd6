//! End-to-end scenarios over the public API: flatten, diff, compare and edit.

use xml_flatdiff::{
    compare, diff, flatten_str, parse_str, spawn_compare, to_csv_string, CompareEvent,
    CompareRequest, DiffStatus, EditTree, Phase, PrintOptions,
};

fn flat(xml: &str) -> xml_flatdiff::FlatMapping {
    flatten_str(xml, &mut |_: u8| {}).expect("valid xml")
}

#[test]
fn changed_sibling_value() {
    let left = flat("<a><b>1</b><b>2</b></a>");
    let right = flat("<a><b>1</b><b>3</b></a>");

    assert_eq!(left.get("a[1].b[1]/#text"), Some("1"));
    assert_eq!(left.get("a[1].b[2]/#text"), Some("2"));
    assert_eq!(right.get("a[1].b[2]/#text"), Some("3"));

    let report = diff(&left, &right);
    assert_eq!(report.differences.len(), 1);
    let record = &report.differences[0];
    assert_eq!(record.key, "a[1].b[2]/#text");
    assert_eq!(record.status(), DiffStatus::Changed);
    assert_eq!(record.left_value(), Some("2"));
    assert_eq!(record.right_value(), Some("3"));
    assert_eq!(report.stats.changed, 1);
    assert_eq!(report.stats.added + report.stats.removed, 0);
}

#[test]
fn added_empty_leaf_is_not_reported() {
    // Known limitation: elements without attributes or text have no keys
    let left = flat("<a><b>1</b></a>");
    let right = flat("<a><b>1</b><c/></a>");
    let report = diff(&left, &right);
    assert!(report.is_empty());
    assert_eq!(report.stats.total(), 0);
}

#[test]
fn added_leaf_with_attribute_is_reported() {
    let left = flat("<a><b>1</b></a>");
    let right = flat(r#"<a><b>1</b><c on="yes"/></a>"#);
    let report = diff(&left, &right);
    assert_eq!(report.differences.len(), 1);
    assert_eq!(report.differences[0].key, "a[1].c[1]/@on");
    assert_eq!(report.differences[0].status(), DiffStatus::Added);
}

#[test]
fn inserted_sibling_shifts_following_indices() {
    // Index-based identity: inserting a leading sibling reports every later one
    let left = flat("<a><p>x</p><p>y</p></a>");
    let right = flat("<a><p>w</p><p>x</p><p>y</p></a>");
    let report = diff(&left, &right);
    assert_eq!(report.stats.changed, 2);
    assert_eq!(report.stats.added, 1);
    let keys: Vec<&str> = report.differences.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["a[1].p[1]/#text", "a[1].p[2]/#text", "a[1].p[3]/#text"]
    );
}

#[test]
fn device_configuration_comparison() {
    let left = r#"<?xml version="1.0" encoding="UTF-8"?>
<device model="X100" firmware="1.2">
  <!-- network -->
  <network>
    <interface name="eth0"><ip>10.0.0.1</ip><mask>255.255.255.0</mask></interface>
    <interface name="eth1"><ip>10.0.1.1</ip></interface>
  </network>
  <limits><max_sessions>32</max_sessions></limits>
</device>"#;
    let right = r#"<?xml version="1.0" encoding="UTF-8"?>
<device model="X100" firmware="1.3">
  <network>
    <interface name="eth0"><ip>10.0.0.1</ip><mask>255.255.0.0</mask></interface>
    <interface name="eth1"><ip>10.0.1.1</ip><gateway>10.0.1.254</gateway></interface>
  </network>
  <limits/>
</device>"#;

    let report = compare(&CompareRequest::new(left, right), &mut |_| {}).unwrap();
    let summary: Vec<(&str, DiffStatus)> = report
        .differences
        .iter()
        .map(|r| (r.key.as_str(), r.status()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (
                "device[1].limits[1].max_sessions[1]/#text",
                DiffStatus::Removed
            ),
            (
                "device[1].network[1].interface[1].mask[1]/#text",
                DiffStatus::Changed
            ),
            (
                "device[1].network[1].interface[2].gateway[1]/#text",
                DiffStatus::Added
            ),
            ("device[1]/@firmware", DiffStatus::Changed),
        ]
    );

    let csv = to_csv_string(report.filtered(DiffStatus::Changed)).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert_eq!(report.stats.total(), 4);
}

#[test]
fn compare_events_for_failed_side() {
    let events: Vec<CompareEvent> = spawn_compare(CompareRequest::new("<ok/>", "<broken>"))
        .unwrap()
        .collect();
    let (progress, terminal) = events.split_at(events.len() - 1);
    assert!(progress.iter().all(|e| matches!(
        e,
        CompareEvent::Progress(p) if p.phase != Phase::Diff
    )));
    match &terminal[0] {
        CompareEvent::Failed(failure) => {
            assert!(failure.left_error.is_none());
            let message = failure.right_error.as_deref().unwrap();
            assert!(message.contains("parse error"), "{message}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn duplicate_middle_sibling_and_export() {
    let xml = "<list><entry>a</entry><entry>b</entry><entry>c</entry></list>";
    let tree = EditTree::from_document(&parse_str(xml).unwrap());
    let edited = tree.duplicate("list[1].entry[2]").unwrap();

    let values: Vec<(&str, &str)> = edited.roots()[0]
        .children()
        .iter()
        .map(|n| (n.id(), n.value()))
        .collect();
    assert_eq!(
        values,
        vec![
            ("list[1].entry[1]", "a"),
            ("list[1].entry[2]", "b"),
            ("list[1].entry[3]", "b"),
            ("list[1].entry[4]", "c"),
        ]
    );

    let written = edited.to_xml(&PrintOptions::default()).unwrap();
    let report = diff(&flat(xml), &flat(&written));
    assert_eq!(report.stats.added, 1);
    assert_eq!(report.stats.changed, 1);
    assert_eq!(report.differences[1].key, "list[1].entry[4]/#text");
}
