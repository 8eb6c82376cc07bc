use pagedom::focus::{
    focusable_boundary, focusable_within, is_focusable, is_tabbable, next_tabbable, prev_tabbable,
};
use pagedom::{Document, Element, NodeId};

fn mount(doc: &Document, element: Element) -> NodeId {
    let node = doc.build(&element);
    doc.append_child(doc.body(), node).unwrap();
    node
}

// =============================================================================
// Focusability
// =============================================================================

#[test]
fn test_focusable_elements() {
    let doc = Document::new();
    let root = mount(
        &doc,
        Element::div()
            .child(Element::link("/x", "link").id("link"))
            .child(Element::new("a").id("anchor"))
            .child(Element::button("b").id("button"))
            .child(Element::button("b").id("disabled").disabled())
            .child(Element::input().id("input"))
            .child(Element::input().id("hidden").attr("type", "hidden"))
            .child(Element::new("select").id("select"))
            .child(Element::new("textarea").id("textarea"))
            .child(Element::div().id("editable").attr("contenteditable", "true"))
            .child(Element::div().id("plain")),
    );

    let by_id = |id: &str| {
        doc.query_selector_within(root, &format!("#{id}"))
            .unwrap()
            .unwrap()
    };

    for id in ["link", "button", "input", "select", "textarea", "editable"] {
        assert!(is_focusable(&doc, by_id(id)), "{id} should be focusable");
    }
    for id in ["anchor", "disabled", "hidden", "plain"] {
        assert!(!is_focusable(&doc, by_id(id)), "{id} should not be focusable");
    }
}

#[test]
fn test_detached_elements_are_not_focusable() {
    let doc = Document::new();
    let button = doc.build(&Element::button("x"));
    assert!(!is_focusable(&doc, button));
}

#[test]
fn test_negative_tabindex_is_focusable_but_not_tabbable() {
    let doc = Document::new();
    let node = mount(&doc, Element::div().tabindex(-1));
    assert!(is_focusable(&doc, node));
    assert!(!is_tabbable(&doc, node));

    let zero = mount(&doc, Element::div().focusable());
    assert!(is_tabbable(&doc, zero));
}

// =============================================================================
// Order
// =============================================================================

#[test]
fn test_focusable_within_document_order() {
    let doc = Document::new();
    let root = mount(
        &doc,
        Element::div()
            .child(Element::button("first"))
            .child(Element::div().tabindex(-1).child(Element::input().id("nested")))
            .child(Element::button("last")),
    );

    let found = focusable_within(&doc, root);
    assert_eq!(found.len(), 3);
    assert_eq!(doc.text(found[0]), "first");
    assert_eq!(doc.attribute(found[1], "id").as_deref(), Some("nested"));
    assert_eq!(doc.text(found[2]), "last");

    let (first, last) = focusable_boundary(&doc, root).unwrap();
    assert_eq!(first, found[0]);
    assert_eq!(last, found[2]);
}

#[test]
fn test_boundary_of_empty_container() {
    let doc = Document::new();
    let root = mount(&doc, Element::div().child(Element::span("text")));
    assert_eq!(focusable_boundary(&doc, root), None);
}

#[test]
fn test_sequential_navigation_from_non_tabbable_container() {
    let doc = Document::new();
    let before = mount(&doc, Element::button("before"));
    let container = mount(
        &doc,
        Element::div().tabindex(-1).child(Element::button("inside")),
    );
    let inside = doc.element_children(container)[0];

    assert_eq!(next_tabbable(&doc, Some(container)), Some(inside));
    assert_eq!(prev_tabbable(&doc, Some(container)), Some(before));
    assert_eq!(next_tabbable(&doc, None), Some(before));
    assert_eq!(prev_tabbable(&doc, None), Some(inside));
}
