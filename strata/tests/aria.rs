use std::rc::Rc;

use pagedom::{Document, Element, NodeId};
use strata::util::AriaHiddenSnapshot;
use strata::{AppHost, ModalConfig, ModalOptions, ModalStack};

fn stack(doc: &Document) -> ModalStack {
    ModalStack::new(doc, Rc::new(AppHost::new(doc)), ModalConfig::new().no_animation()).unwrap()
}

/// body > [header, main > [nav, outlet], script, footer(aria-hidden=false)]
struct Page {
    header: NodeId,
    main: NodeId,
    nav: NodeId,
    outlet: NodeId,
    script: NodeId,
    footer: NodeId,
}

fn page(doc: &Document) -> Page {
    let build = |element: Element| {
        let node = doc.build(&element);
        doc.append_child(doc.body(), node).unwrap();
        node
    };
    let header = build(Element::new("header"));
    let main = build(Element::new("main"));
    let script = build(Element::new("script"));
    let footer = build(Element::new("footer").attr("aria-hidden", "false"));
    let nav = doc.build(&Element::new("nav"));
    let outlet = doc.build(&Element::div().id("outlet"));
    doc.append_child(main, nav).unwrap();
    doc.append_child(main, outlet).unwrap();
    Page {
        header,
        main,
        nav,
        outlet,
        script,
        footer,
    }
}

fn aria_hidden(doc: &Document, node: NodeId) -> Option<String> {
    doc.attribute(node, "aria-hidden")
}

// =============================================================================
// Snapshot
// =============================================================================

#[test]
fn test_hides_siblings_up_to_body() {
    let doc = Document::new();
    let page = page(&doc);
    let target = doc.build(&Element::div());
    doc.append_child(page.outlet, target).unwrap();
    let sibling = doc.build(&Element::div());
    doc.append_child(page.outlet, sibling).unwrap();

    let mut snapshot = AriaHiddenSnapshot::new();
    snapshot.hide_outside(&doc, target);

    assert_eq!(aria_hidden(&doc, sibling).as_deref(), Some("true"));
    assert_eq!(aria_hidden(&doc, page.nav).as_deref(), Some("true"));
    assert_eq!(aria_hidden(&doc, page.header).as_deref(), Some("true"));
    assert_eq!(aria_hidden(&doc, page.footer).as_deref(), Some("true"));
    assert_eq!(aria_hidden(&doc, page.script), None);
    assert_eq!(aria_hidden(&doc, target), None);
    assert_eq!(aria_hidden(&doc, page.outlet), None);
    assert_eq!(aria_hidden(&doc, page.main), None);
    assert_eq!(snapshot.len(), 4);
}

#[test]
fn test_revert_restores_previous_values() {
    let doc = Document::new();
    let page = page(&doc);

    let mut snapshot = AriaHiddenSnapshot::new();
    snapshot.hide_outside(&doc, page.outlet);
    snapshot.revert(&doc);

    assert_eq!(aria_hidden(&doc, page.header), None);
    assert_eq!(aria_hidden(&doc, page.nav), None);
    assert_eq!(aria_hidden(&doc, page.footer).as_deref(), Some("false"));
    assert!(snapshot.is_empty());
}

#[test]
fn test_hiding_twice_keeps_first_saved_value() {
    let doc = Document::new();
    let page = page(&doc);

    let mut snapshot = AriaHiddenSnapshot::new();
    snapshot.hide_outside(&doc, page.outlet);
    snapshot.hide_outside(&doc, page.outlet);
    snapshot.revert(&doc);

    assert_eq!(aria_hidden(&doc, page.footer).as_deref(), Some("false"));
}

#[test]
fn test_empty_value_is_removed_on_revert() {
    let doc = Document::new();
    let page = page(&doc);
    doc.set_attribute(page.header, "aria-hidden", "");

    let mut snapshot = AriaHiddenSnapshot::new();
    snapshot.hide_outside(&doc, page.main);
    assert!(snapshot.contains(page.header));
    snapshot.revert(&doc);

    assert_eq!(aria_hidden(&doc, page.header), None);
}

// =============================================================================
// Stack Integration
// =============================================================================

#[test]
fn test_stack_hides_everything_but_top_window() {
    let doc = Document::new();
    let page = page(&doc);
    let stack = stack(&doc);

    let modal = stack.open::<()>("x", ModalOptions::new()).unwrap();
    let backdrop = modal.backdrop().unwrap().host();

    assert_eq!(aria_hidden(&doc, page.header).as_deref(), Some("true"));
    assert_eq!(aria_hidden(&doc, page.main).as_deref(), Some("true"));
    assert_eq!(aria_hidden(&doc, backdrop).as_deref(), Some("true"));
    assert_eq!(aria_hidden(&doc, modal.window().host()), None);
}

#[test]
fn test_stack_moves_aria_scope_with_top_window() {
    let doc = Document::new();
    let page = page(&doc);
    let stack = stack(&doc);
    let first = stack.open::<()>("a", ModalOptions::new()).unwrap();
    doc.event_loop().run_until_idle();

    let second = stack.open::<()>("b", ModalOptions::new()).unwrap();
    doc.event_loop().run_until_idle();
    assert_eq!(aria_hidden(&doc, first.window().host()).as_deref(), Some("true"));
    assert_eq!(aria_hidden(&doc, second.window().host()), None);

    second.close(());
    doc.event_loop().run_until_idle();
    assert_eq!(aria_hidden(&doc, first.window().host()), None);
    assert_eq!(aria_hidden(&doc, page.header).as_deref(), Some("true"));

    first.close(());
    doc.event_loop().run_until_idle();
    assert_eq!(aria_hidden(&doc, page.header), None);
    assert_eq!(aria_hidden(&doc, page.main), None);
    assert_eq!(aria_hidden(&doc, page.footer).as_deref(), Some("false"));
}

#[test]
fn test_stack_in_nested_container() {
    let doc = Document::new();
    let page = page(&doc);
    let stack = stack(&doc);

    stack
        .open::<()>("x", ModalOptions::new().container("#outlet"))
        .unwrap();

    assert_eq!(aria_hidden(&doc, page.nav).as_deref(), Some("true"));
    assert_eq!(aria_hidden(&doc, page.header).as_deref(), Some("true"));
    assert_eq!(aria_hidden(&doc, page.outlet), None);
    assert_eq!(aria_hidden(&doc, page.main), None);
}
