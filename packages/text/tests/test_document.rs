use stencil_engine::{NodeKind, PlaceholderProvider, TreeAdapter};
use stencil_model::PlaceholderData;
use stencil_text::{TextDocument, TextNode};

#[test]
fn test_parse_and_render_lines() {
    let src = "Dear ${Value *value:name},\n\nthanks for ${Value $value:\"order.id\"}.";
    let doc = TextDocument::parse(src);

    assert_eq!(doc.children(doc.root()).len(), 3);
    assert_eq!(doc.placeholders().len(), 2);
    assert_eq!(doc.render(), src);
}

#[test]
fn test_node_kinds() {
    let mut doc = TextDocument::new();
    let paragraph = doc.add_paragraph(doc.root());
    let span = doc.add_span(paragraph);
    let text = doc.add_text(span, "x");
    let frame = doc.add_frame(doc.root(), "box");

    assert_eq!(doc.kind(doc.root()), NodeKind::Opaque);
    assert_eq!(doc.kind(paragraph), NodeKind::Boundary);
    assert_eq!(doc.kind(span), NodeKind::TextContainer);
    assert_eq!(doc.kind(text), NodeKind::TextLeaf);
    assert_eq!(doc.kind(frame), NodeKind::Opaque);
}

#[test]
fn test_blank_ignores_whitespace_only() {
    let mut doc = TextDocument::new();
    let spaces = doc.push_line("   ");
    let empty = doc.add_paragraph(doc.root());
    let placeholder = doc.push_line("${Stop}");
    let framed = doc.add_paragraph(doc.root());
    doc.add_frame(framed, "f");

    assert!(doc.is_blank(spaces));
    assert!(doc.is_blank(empty));
    assert!(!doc.is_blank(placeholder));
    assert!(!doc.is_blank(framed));
}

#[test]
fn test_insert_moves_attached_nodes() {
    let mut doc = TextDocument::parse("a\nb");
    let lines = doc.children(doc.root());
    let a_text = doc.children(lines[0])[0];

    doc.append_child(lines[1], a_text);
    assert!(doc.children(lines[0]).is_empty());
    assert_eq!(doc.text(lines[1]), "ba");
    assert_eq!(doc.parent(a_text), Some(lines[1]));

    let fresh = doc.create_text("<");
    assert!(!doc.is_attached(fresh));
    doc.insert_before(a_text, fresh);
    assert!(doc.is_attached(fresh));
    assert_eq!(doc.text(lines[1]), "b<a");
    assert_eq!(doc.previous_sibling(a_text), Some(fresh));
}

#[test]
fn test_node_cannot_move_under_itself() {
    let mut doc = TextDocument::new();
    let outer = doc.add_paragraph(doc.root());
    let inner = doc.add_span(outer);

    doc.append_child(inner, outer);
    assert_eq!(doc.parent(outer), Some(doc.root()));
    assert_eq!(doc.parent(inner), Some(outer));
}

#[test]
fn test_deep_and_shallow_clone() {
    let mut doc = TextDocument::parse("x ${Value value:1} y");
    let paragraph = doc.children(doc.root())[0];

    let deep = doc.clone_node(paragraph, true);
    let shallow = doc.clone_node(paragraph, false);
    assert_eq!(doc.text(deep), doc.text(paragraph));
    assert!(doc.children(shallow).is_empty());
    assert!(!doc.is_attached(deep));
    assert_eq!(doc.node(shallow), Some(&TextNode::Paragraph));
}

#[test]
fn test_delete_detaches_subtree() {
    let mut doc = TextDocument::parse("keep\ndrop ${Stop}");
    let drop = doc.children(doc.root())[1];
    let inner = doc.children(drop)[1];
    let before = doc.node_count();

    doc.delete(drop);
    assert!(!doc.is_attached(drop));
    assert!(!doc.is_attached(inner));
    assert_eq!(doc.node_count(), before - 3);
    assert_eq!(doc.render(), "keep");

    doc.delete(drop);
    assert_eq!(doc.render(), "keep");
}

#[test]
fn test_placeholder_provider() {
    let mut doc = TextDocument::parse("${Push name:x value:1}");
    let node = doc.placeholders()[0];

    assert!(doc.is_placeholder(node));
    let data = doc.parse(node).unwrap();
    assert_eq!(data.key(), "Push");
    assert_eq!(doc.key(node).as_deref(), Some("Push"));

    doc.write(node, &PlaceholderData::new("Pop").with_literal("name", "x"));
    assert_eq!(doc.render(), "${Pop name:\"x\"}");

    let created = doc.create(&PlaceholderData::new("Stop"));
    assert!(!doc.is_attached(created));
    assert_eq!(doc.text(created), "${Stop}");

    let text = doc.children(doc.children(doc.root())[0])[0];
    doc.set_text(text, "done");
    assert!(!doc.is_placeholder(text));
    assert_eq!(doc.render(), "done");
}

#[test]
fn test_unparsable_placeholder_reports_offset() {
    let doc = TextDocument::parse("${Value value:}");
    let node = doc.placeholders()[0];
    let err = doc.parse(node).unwrap_err();
    assert_eq!(err.offset, Some(14));
}
