/// Placeholder syntax tests
use crate::*;
use stencil_model::{AccessType, DataKind, DataNode};

#[test]
fn test_parse_sigils_and_values() {
    let data = parse_placeholder(r#"${For $value:"order.lines" as:line index:i}"#).unwrap();

    assert_eq!(data.key(), "For");
    assert_eq!(data.access("value"), AccessType::VariableByName);
    assert_eq!(data.text("value").as_deref(), Some("order.lines"));
    assert_eq!(data.literal_text("as").as_deref(), Some("line"));
    assert_eq!(data.literal_text("index").as_deref(), Some("i"));
}

#[test]
fn test_parse_nested_literals() {
    let data =
        parse_placeholder(r#"${Push name:cfg value:{title: "A \"quoted\" one", sizes: [1, 2.5, null], on: true}}"#)
            .unwrap();
    let value = &data.attribute("value").unwrap().value;

    assert_eq!(value.kind(), DataKind::Map);
    assert_eq!(value.keys(), vec!["title", "sizes", "on"]);
    assert_eq!(
        value.property("title").unwrap().render_text().as_deref(),
        Some("A \"quoted\" one")
    );
    let sizes = value.property("sizes").unwrap();
    assert_eq!(sizes.size(), 3);
    assert_eq!(sizes.element(1), Some(DataNode::leaf(2.5)));
    assert!(sizes.element(2).unwrap().is_null());
    assert_eq!(value.property("on"), Some(DataNode::leaf(true)));
}

#[test]
fn test_commas_between_attributes_are_optional() {
    let with = parse_placeholder("${Push name:x, value:1}").unwrap();
    let without = parse_placeholder("${Push name:x value:1}").unwrap();
    assert_eq!(with, without);
}

#[test]
fn test_empty_list_literal() {
    let data = parse_placeholder("${For value:[] as:x}").unwrap();
    let value = &data.attribute("value").unwrap().value;
    assert_eq!(value.kind(), DataKind::List);
    assert_eq!(value.size(), 0);
}

#[test]
fn test_syntax_errors() {
    assert!(matches!(
        parse_placeholder("${Value value}"),
        Err(CodecError::UnexpectedToken { .. })
    ));
    assert!(matches!(
        parse_placeholder("${Value value:"),
        Err(CodecError::UnexpectedEof { .. })
    ));
    assert!(matches!(
        parse_placeholder("${$Value}"),
        Err(CodecError::InvalidSyntax { pos: 2, .. })
    ));
    assert!(matches!(
        parse_placeholder("${Value value:1} tail"),
        Err(CodecError::UnexpectedToken { .. })
    ));
    assert!(matches!(
        parse_placeholder("${Value value:#}"),
        Err(CodecError::LexerError { pos: 14 })
    ));
}

#[test]
fn test_duplicate_attribute_is_rejected() {
    assert!(matches!(
        parse_placeholder("${For as:x @as:y}"),
        Err(CodecError::InvalidSyntax { pos: 11, .. })
    ));
    assert!(matches!(
        parse_placeholder("${Value value:1 value:2}"),
        Err(CodecError::InvalidSyntax { pos: 16, .. })
    ));
}

#[test]
fn test_sigil_value_is_rejected() {
    assert!(parse_placeholder("${Value value:$x}").is_err());
}

#[test]
fn test_write_then_parse_keeps_meaning() {
    let original = parse_placeholder(
        r#"${Model path:"/customers[0]" prefix:c prefixes:{outer: "/groups[1]", "odd key": "/x"} *extra:"a.b" ratio:2.0}"#,
    )
    .unwrap();
    let written = write_placeholder(&original);

    assert!(written.starts_with("${Model path:\"/customers[0]\""));
    assert!(written.contains("*extra:\"a.b\""));
    assert!(written.contains("ratio:2.0"));
    assert!(written.contains("\"odd key\": \"/x\""));
    assert_eq!(parse_placeholder(&written).unwrap(), original);
}

#[test]
fn test_split_segments_respects_braces_and_quotes() {
    let line = r#"Hi ${Value value:"}"}, ${Push name:m value:{a: 1}}!"#;
    assert_eq!(
        split_segments(line),
        vec![
            Segment::Text("Hi "),
            Segment::Placeholder(r#"${Value value:"}"}"#),
            Segment::Text(", "),
            Segment::Placeholder("${Push name:m value:{a: 1}}"),
            Segment::Text("!"),
        ]
    );
}

#[test]
fn test_unterminated_placeholder_stays_text() {
    assert_eq!(
        split_segments("cost: ${Value value:1"),
        vec![Segment::Text("cost: ${Value value:1")]
    );
}
