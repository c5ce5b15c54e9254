/// Ownership and projection tests for DataNode
use crate::*;
use serde_json::json;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_owned_map_keeps_insertion_order() {
    let map = DataNode::new_map();
    map.insert("zeta", DataNode::leaf(1i64)).unwrap();
    map.insert("alpha", DataNode::leaf(2i64)).unwrap();
    map.insert("mid", DataNode::leaf(3i64)).unwrap();

    assert_eq!(map.keys(), vec!["zeta", "alpha", "mid"]);
    assert_eq!(map.element(1), Some(DataNode::leaf(2i64)));
    assert_eq!(map.size(), 3);
}

#[test]
fn test_attach_detaches_from_previous_parent() {
    let first = DataNode::new_list();
    let second = DataNode::new_list();
    let child = DataNode::leaf("moving");

    first.push(child.clone()).unwrap();
    assert_eq!(first.size(), 1);
    assert!(child.parent().unwrap().ptr_eq(&first));

    second.push(child.clone()).unwrap();
    assert_eq!(first.size(), 0);
    assert_eq!(second.size(), 1);
    assert!(child.parent().unwrap().ptr_eq(&second));
}

#[test]
fn test_attach_under_descendant_is_rejected() {
    let outer = DataNode::new_map();
    let inner = DataNode::new_list();
    outer.insert("inner", inner.clone()).unwrap();

    assert_eq!(inner.push(outer.clone()), Err(ModelError::CycleDetected));
    assert_eq!(outer.insert("self", outer.clone()), Err(ModelError::CycleDetected));
}

#[test]
fn test_replaced_map_value_loses_parent() {
    let map = DataNode::new_map();
    let old = DataNode::leaf("old");
    map.insert("k", old.clone()).unwrap();
    let replaced = map.insert("k", DataNode::leaf("new")).unwrap();

    assert!(replaced.unwrap().ptr_eq(&old));
    assert!(old.parent().is_none());
    assert_eq!(map.property("k"), Some(DataNode::leaf("new")));
}

#[test]
fn test_push_on_leaf_fails() {
    let leaf = DataNode::leaf(3i64);
    assert!(matches!(
        leaf.push(DataNode::null()),
        Err(ModelError::NotAList { .. })
    ));
}

#[test]
fn test_from_json_roundtrips_structure() {
    let value = json!({ "name": "Ada", "tags": ["a", "b"], "age": 36, "ratio": 0.5, "nothing": null });
    let node = DataNode::from_json(&value);

    assert_eq!(node.kind(), DataKind::Map);
    assert_eq!(node.property("tags").unwrap().size(), 2);
    assert!(node.property("nothing").unwrap().is_null());
    assert_eq!(node.to_json(), value);
    assert_eq!(serde_json::to_value(&node).unwrap(), value);
}

#[test]
fn test_render_text_and_truthiness() {
    assert_eq!(DataNode::leaf(3.0).render_text().as_deref(), Some("3"));
    assert_eq!(DataNode::leaf(2.5).render_text().as_deref(), Some("2.5"));
    assert_eq!(DataNode::null().render_text().as_deref(), Some(""));
    assert_eq!(DataNode::new_list().render_text(), None);

    assert!(!DataNode::null().is_truthy());
    assert!(!DataNode::leaf("").is_truthy());
    assert!(!DataNode::new_list().is_truthy());
    assert!(DataNode::leaf("x").is_truthy());
    assert!(DataNode::leaf(1i64).is_truthy());
}

#[test]
fn test_indirect_projection_reads_source_at_call_time() {
    let items = DataNode::list_from(vec![DataNode::leaf("a"), DataNode::leaf("b")]);
    let view = DataNode::indirect(items.clone(), PathExpr::parse("[1]").unwrap());

    assert!(view.is_projected());
    assert_eq!(view.render_text().as_deref(), Some("b"));

    items.element(1).unwrap().set_scalar("changed").unwrap();
    assert_eq!(view.render_text().as_deref(), Some("changed"));

    items.element(1).unwrap().detach();
    assert!(view.is_null());
    assert!(view.parent().is_none());
}

#[test]
fn test_json_projection_is_lazy_view() {
    let node = JsonResolver::project(json!({
        "customers": [{ "name": "Ada" }, { "name": "Grace" }]
    }));

    assert!(node.is_projected());
    assert_eq!(node.kind(), DataKind::Map);
    let customers = node.property("customers").unwrap();
    assert_eq!(customers.kind(), DataKind::List);
    assert_eq!(customers.size(), 2);
    assert_eq!(
        customers
            .element(1)
            .and_then(|c| c.property("name"))
            .and_then(|n| n.render_text())
            .as_deref(),
        Some("Grace")
    );
    assert!(node.property("missing").is_none());
    assert_eq!(node.deep_copy().to_json(), node.to_json());
}

struct Counter {
    hits: RefCell<usize>,
}

struct CounterResolver;

impl PropertyResolver for CounterResolver {
    fn property(&self, value: &dyn Any, name: &str) -> Option<DataNode> {
        let counter = value.downcast_ref::<Counter>()?;
        if name != "hits" {
            return None;
        }
        let mut hits = counter.hits.borrow_mut();
        *hits += 1;
        Some(DataNode::leaf(*hits))
    }

    fn names(&self, _value: &dyn Any) -> Vec<String> {
        vec!["hits".to_string()]
    }

    fn len(&self, _value: &dyn Any) -> usize {
        1
    }
}

#[test]
fn test_host_projection_never_caches() {
    let node = DataNode::project(
        Rc::new(Counter {
            hits: RefCell::new(0),
        }),
        Rc::new(CounterResolver),
    );

    assert_eq!(node.property("hits"), Some(DataNode::leaf(1usize)));
    assert_eq!(node.property("hits"), Some(DataNode::leaf(2usize)));
    assert_eq!(node.keys(), vec!["hits"]);
    assert!(node.property("other").is_none());
}
