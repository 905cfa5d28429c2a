#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn patch(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn doc_with_curve(id: &str) -> Document {
    let mut doc = Document::new();
    doc.create_arrow(CurveSkeleton::new(id, vec![0.0, 0.0, 10.0, 10.0]), None, None)
        .unwrap();
    doc
}

// =============================================================
// Enums on the wire
// =============================================================

#[test]
fn fill_style_wire_names() {
    let cases = [
        (FillStyle::Solid, "\"solid\""),
        (FillStyle::Hachure, "\"hachure\""),
        (FillStyle::CrossHatch, "\"cross-hatch\""),
        (FillStyle::Zigzag, "\"zigzag\""),
        (FillStyle::Dots, "\"dots\""),
        (FillStyle::Dashed, "\"dashed\""),
        (FillStyle::ZigzagLine, "\"zigzag-line\""),
    ];
    for (style, expected) in cases {
        assert_eq!(serde_json::to_string(&style).unwrap(), expected);
    }
}

#[test]
fn stroke_style_wire_names() {
    assert_eq!(serde_json::to_string(&StrokeStyle::Dotted).unwrap(), "\"dotted\"");
    assert!(serde_json::from_str::<StrokeStyle>("\"wavy\"").is_err());
}

#[test]
fn anchor_kind_wire_names() {
    assert_eq!(serde_json::to_string(&AnchorKind::BookText).unwrap(), "\"bookText\"");
    assert_eq!(serde_json::to_string(&AnchorKind::Text).unwrap(), "\"text\"");
}

#[test]
fn anchor_kind_for_element() {
    assert_eq!(AnchorKind::for_element(ElementKind::BookText), Some(AnchorKind::BookText));
    assert_eq!(AnchorKind::for_element(ElementKind::Text), Some(AnchorKind::Text));
    assert_eq!(AnchorKind::for_element(ElementKind::Circle), None);
}

// =============================================================
// CurveSkeleton / ArrowElement
// =============================================================

#[test]
fn odd_point_count_rejected() {
    let curve = CurveSkeleton::new("c1", vec![0.0, 1.0, 2.0]);
    assert!(matches!(curve.validate(), Err(DocError::Validation(_))));
}

#[test]
fn non_finite_point_rejected() {
    let curve = CurveSkeleton::new("c1", vec![0.0, f64::NAN]);
    assert!(curve.validate().is_err());
}

#[test]
fn empty_points_are_valid() {
    assert!(CurveSkeleton::new("c1", Vec::new()).validate().is_ok());
}

#[test]
fn new_arrow_records_anchor_kinds() {
    let arrow = ArrowElement::new(
        CurveSkeleton::new("a1", Vec::new()),
        Some(Anchor::new("e1", Some(AnchorKind::BookText))),
        None,
    );
    assert_eq!(arrow.start_id.as_deref(), Some("e1"));
    assert_eq!(arrow.start_type, Some(AnchorKind::BookText));
    assert_eq!(arrow.end_id(ArrowEnd::End), None);
    assert!(!arrow.is_free());
}

#[test]
fn type_on_null_end_rejected() {
    let mut arrow = ArrowElement::new(CurveSkeleton::new("a1", Vec::new()), None, None);
    arrow.end_type = Some(AnchorKind::Text);
    assert!(arrow.validate().is_err());
}

#[test]
fn arrow_wire_format_is_flat_with_null_ends() {
    let arrow = ArrowElement::new(CurveSkeleton::new("a1", vec![1.0, 2.0]), None, None);
    let json = serde_json::to_value(&arrow).unwrap();
    assert_eq!(json["id"], "a1");
    assert_eq!(json["points"], json!([1.0, 2.0]));
    assert_eq!(json["strokeStyle"], "solid");
    assert_eq!(json["fillStyle"], "hachure");
    assert!(json["startId"].is_null());
    assert!(json["endType"].is_null());
    assert!(json.get("text").is_none());
}

#[test]
fn arrow_parses_minimal_record() {
    let arrow: ArrowElement = serde_json::from_value(json!({
        "id": "a2",
        "points": [0, 0, 5, 5],
        "startId": "e1",
        "startType": "text",
        "text": "see here",
    }))
    .unwrap();
    assert_eq!(arrow.curve.points, vec![0.0, 0.0, 5.0, 5.0]);
    assert_eq!(arrow.start_type, Some(AnchorKind::Text));
    assert_eq!(arrow.end_id, None);
    assert_eq!(arrow.curve.text.as_deref(), Some("see here"));
    assert_eq!(arrow.curve.bowing, DEFAULT_BOWING);
}

// =============================================================
// update_curve
// =============================================================

#[test]
fn update_curve_restyles() {
    let mut doc = doc_with_curve("a1");
    let updated = doc
        .update_curve("a1", &patch(json!({"strokeStyle": "dashed", "points": [1, 1, 2, 2, 3, 3], "text": "why?"})))
        .unwrap();
    assert_eq!(updated.curve.stroke_style, StrokeStyle::Dashed);
    assert_eq!(updated.curve.points.len(), 6);
    assert_eq!(doc.arrow("a1").unwrap().curve.text.as_deref(), Some("why?"));
}

#[test]
fn update_curve_null_clears_text() {
    let mut doc = doc_with_curve("a1");
    doc.update_curve("a1", &patch(json!({"text": "label"}))).unwrap();
    doc.update_curve("a1", &patch(json!({"text": null}))).unwrap();
    assert_eq!(doc.arrow("a1").unwrap().curve.text, None);
}

#[test]
fn update_curve_rejects_anchor_fields() {
    let mut doc = doc_with_curve("a1");
    for field in ANCHOR_FIELDS {
        let err = doc.update_curve("a1", &patch(json!({ field: "e1" }))).unwrap_err();
        assert!(matches!(err, DocError::Validation(_)), "{field}");
    }
}

#[test]
fn update_curve_rejects_id_change_and_foreign_fields() {
    let mut doc = doc_with_curve("a1");
    assert!(doc.update_curve("a1", &patch(json!({"id": "a2"}))).is_err());
    assert!(doc.update_curve("a1", &patch(json!({"radius": 3}))).is_err());
}

#[test]
fn update_curve_rejects_odd_points_and_keeps_old() {
    let mut doc = doc_with_curve("a1");
    assert!(doc.update_curve("a1", &patch(json!({"points": [1, 2, 3]}))).is_err());
    assert_eq!(doc.arrow("a1").unwrap().curve.points, vec![0.0, 0.0, 10.0, 10.0]);
}

#[test]
fn update_curve_unknown_arrow() {
    let mut doc = Document::new();
    let err = doc.update_curve("ghost", &patch(json!({}))).unwrap_err();
    assert!(matches!(err, DocError::NotFound { kind: EntityKind::Arrow, .. }));
}
