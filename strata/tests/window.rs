use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;
use pagedom::{Document, Element, EventKind, Key, Modifiers, MouseButton, NodeId};
use strata::{
    AppHost, BackdropMode, DismissReason, Fullscreen, ModalConfig, ModalContent, ModalOptions,
    ModalRef, ModalSize, ModalStack, ModalUpdate, TemplateContext, WindowState,
};

fn stack(doc: &Document) -> ModalStack {
    ModalStack::new(doc, Rc::new(AppHost::new(doc)), ModalConfig::new().no_animation()).unwrap()
}

fn open_shown(stack: &ModalStack, options: ModalOptions) -> ModalRef<()> {
    let modal = stack.open::<()>("content", options).unwrap();
    stack.document().event_loop().run_until_idle();
    modal
}

fn with_buttons(doc: &Document, _: &TemplateContext<()>) -> Vec<NodeId> {
    vec![
        doc.build(&Element::button("first").id("first")),
        doc.build(&Element::button("second").id("second")),
    ]
}

fn click_on(doc: &Document, target: NodeId) {
    doc.dispatch(
        target,
        EventKind::Click {
            button: MouseButton::Left,
        },
    );
}

// =============================================================================
// DOM Structure
// =============================================================================

#[test]
fn test_window_markup() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new());
    let window = modal.window();
    let host = window.host();

    assert!(doc.has_class(host, "modal"));
    assert!(doc.has_class(host, "d-block"));
    assert!(doc.has_class(host, "show"));
    assert!(!doc.has_class(host, "fade"));
    assert_eq!(doc.attribute(host, "role").as_deref(), Some("dialog"));
    assert_eq!(doc.attribute(host, "tabindex").as_deref(), Some("-1"));
    assert_eq!(doc.attribute(host, "aria-modal").as_deref(), Some("true"));

    assert_eq!(doc.parent(window.dialog()), Some(host));
    assert_eq!(doc.classes(window.dialog()), vec!["modal-dialog"]);
    assert_eq!(doc.attribute(window.dialog(), "role").as_deref(), Some("document"));
    assert_eq!(doc.parent(window.content()), Some(window.dialog()));
    assert!(doc.has_class(window.content(), "modal-content"));
}

#[test]
fn test_dialog_option_classes() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(
        &stack,
        ModalOptions::new()
            .size(ModalSize::Lg)
            .centered(true)
            .fullscreen("md")
            .scrollable(true)
            .modal_dialog_class("wide tall")
            .window_class("custom-window"),
    );
    let dialog = modal.window().dialog();

    assert_eq!(
        doc.classes(dialog),
        vec![
            "modal-dialog",
            "modal-lg",
            "modal-dialog-centered",
            "modal-fullscreen-md-down",
            "modal-dialog-scrollable",
            "wide",
            "tall",
        ]
    );
    assert!(doc.has_class(modal.window().host(), "custom-window"));
}

#[test]
fn test_aria_attributes_and_role() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(
        &stack,
        ModalOptions::new()
            .aria_labelled_by("title")
            .aria_described_by("body")
            .role("alertdialog"),
    );
    let host = modal.window().host();

    assert_eq!(doc.attribute(host, "aria-labelledby").as_deref(), Some("title"));
    assert_eq!(doc.attribute(host, "aria-describedby").as_deref(), Some("body"));
    assert_eq!(doc.attribute(host, "role").as_deref(), Some("alertdialog"));
}

#[test]
fn test_backdrop_markup() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new().backdrop_class("dim"));
    let backdrop = modal.backdrop().unwrap().host();

    assert!(doc.has_class(backdrop, "modal-backdrop"));
    assert!(doc.has_class(backdrop, "dim"));
    assert!(doc.has_class(backdrop, "show"));
    assert_eq!(doc.style_property(backdrop, "z-index").as_deref(), Some("1055"));
}

#[test]
fn test_animated_window_fades() {
    let doc = Document::new();
    let stack = ModalStack::new(&doc, Rc::new(AppHost::new(&doc)), ModalConfig::new()).unwrap();
    let modal = stack.open::<()>("x", ModalOptions::new()).unwrap();
    let host = modal.window().host();
    let backdrop = modal.backdrop().unwrap().host();

    assert!(doc.has_class(host, "fade"));
    assert!(doc.has_class(backdrop, "fade"));
    assert!(!doc.has_class(host, "show"));

    doc.event_loop().run_until_idle();
    assert!(doc.has_class(host, "show"));
    assert!(doc.has_class(backdrop, "show"));
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_shown_after_first_render() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = stack.open::<()>("x", ModalOptions::new()).unwrap();
    let shown = Rc::new(RefCell::new(0));
    let count = Rc::clone(&shown);
    modal.shown().subscribe(move |_| *count.borrow_mut() += 1).detach();

    assert_eq!(modal.window().state(), WindowState::Constructed);
    doc.event_loop().run_until_idle();

    assert_eq!(*shown.borrow(), 1);
    assert_eq!(modal.window().state(), WindowState::Shown);
}

#[test]
fn test_animated_shown_waits_for_dialog() {
    let doc = Document::new();
    let stack = ModalStack::new(&doc, Rc::new(AppHost::new(&doc)), ModalConfig::new()).unwrap();
    let modal = stack.open::<()>("x", ModalOptions::new()).unwrap();
    let shown = modal.shown().wait();
    let mut shown = Box::pin(shown);

    doc.event_loop().advance(Duration::from_millis(200));
    assert!(shown.as_mut().now_or_never().is_none());

    doc.event_loop().advance(Duration::from_millis(200));
    assert_eq!(shown.now_or_never(), Some(true));
}

#[test]
fn test_window_states_move_forward() {
    let doc = Document::new();
    let stack = ModalStack::new(&doc, Rc::new(AppHost::new(&doc)), ModalConfig::new()).unwrap();
    let modal = stack.open::<()>("x", ModalOptions::new()).unwrap();
    doc.event_loop().advance(Duration::from_millis(400));

    modal.close(());
    assert_eq!(modal.window().state(), WindowState::Hiding);
    assert!(!modal.window().events_enabled());

    doc.event_loop().advance(Duration::from_millis(400));
    assert_eq!(modal.window().state(), WindowState::Hidden);
}

// =============================================================================
// Escape
// =============================================================================

#[test]
fn test_escape_dismisses() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new());
    let result = modal.result().unwrap();

    doc.press_key(Key::Escape, Modifiers::new());
    assert!(modal.is_open(), "dismissal waits for the next frame");
    doc.event_loop().run_until_idle();

    assert_eq!(result.now_or_never(), Some(Err(DismissReason::Esc)));
}

#[test]
fn test_escape_claimed_elsewhere_is_ignored() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new());

    let event = doc.press_key(Key::Escape, Modifiers::new());
    event.prevent_default();
    doc.event_loop().run_until_idle();

    assert!(modal.is_open());
}

#[test]
fn test_escape_without_keyboard_does_nothing() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new().keyboard(false));

    doc.press_key(Key::Escape, Modifiers::new());
    doc.event_loop().run_until_idle();

    assert!(modal.is_open());
    assert!(!doc.has_class(modal.window().host(), "modal-static"));
}

#[test]
fn test_escape_bumps_static_modal_without_keyboard() {
    let doc = Document::new();
    let stack = ModalStack::new(&doc, Rc::new(AppHost::new(&doc)), ModalConfig::new()).unwrap();
    let modal = stack
        .open::<()>(
            "x",
            ModalOptions::new()
                .keyboard(false)
                .backdrop(BackdropMode::Static),
        )
        .unwrap();
    doc.event_loop().advance(Duration::from_millis(400));
    let host = modal.window().host();

    doc.press(host, Key::Escape, Modifiers::new());
    doc.event_loop().run_until_idle();

    assert!(modal.is_open());
    assert!(doc.has_class(host, "modal-static"));

    doc.event_loop().advance(Duration::from_millis(200));
    assert!(!doc.has_class(host, "modal-static"));
}

#[test]
fn test_escape_after_close_is_ignored() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new());
    let host = modal.window().host();
    let dismissed = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&dismissed);
    modal
        .window()
        .dismiss_event()
        .subscribe(move |reason| seen.borrow_mut().push(reason.clone()))
        .detach();

    modal.close(());
    doc.press(host, Key::Escape, Modifiers::new());
    doc.event_loop().run_until_idle();

    assert!(dismissed.borrow().is_empty());
}

// =============================================================================
// Backdrop Clicks
// =============================================================================

#[test]
fn test_click_on_window_area_dismisses() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new());
    let result = modal.result().unwrap();

    doc.click(modal.window().host());
    doc.event_loop().run_until_idle();

    let reason = result.now_or_never().unwrap().unwrap_err();
    assert_eq!(reason, DismissReason::BackdropClick);
    assert_eq!(reason.to_string(), "Backdrop click");
}

#[test]
fn test_click_inside_dialog_keeps_modal() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new());

    doc.click(modal.window().dialog());
    doc.click(modal.window().content());
    doc.event_loop().run_until_idle();

    assert!(modal.is_open());
}

#[test]
fn test_drag_from_dialog_to_window_area_keeps_modal() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new());
    let host = modal.window().host();

    doc.mouse_down(modal.window().dialog());
    doc.mouse_up(host);
    click_on(&doc, host);
    doc.event_loop().run_until_idle();
    assert!(modal.is_open());

    // the guard only covers one click
    doc.click(host);
    doc.event_loop().run_until_idle();
    assert!(!modal.is_open());
}

#[test]
fn test_click_bumps_static_modal() {
    let doc = Document::new();
    let stack = ModalStack::new(&doc, Rc::new(AppHost::new(&doc)), ModalConfig::new()).unwrap();
    let modal = stack
        .open::<()>("x", ModalOptions::new().backdrop(BackdropMode::Static))
        .unwrap();
    doc.event_loop().advance(Duration::from_millis(400));
    let host = modal.window().host();

    doc.click(host);
    doc.event_loop().run_until_idle();

    assert!(modal.is_open());
    assert!(doc.has_class(host, "modal-static"));

    doc.event_loop().advance(Duration::from_millis(200));
    assert!(!doc.has_class(host, "modal-static"));
}

#[test]
fn test_bump_ignored_while_previous_bump_runs() {
    let doc = Document::new();
    let stack = ModalStack::new(&doc, Rc::new(AppHost::new(&doc)), ModalConfig::new()).unwrap();
    let modal = stack
        .open::<()>("x", ModalOptions::new().backdrop(BackdropMode::Static))
        .unwrap();
    doc.event_loop().advance(Duration::from_millis(400));
    let host = modal.window().host();

    doc.click(host);
    doc.event_loop().advance(Duration::from_millis(100));
    doc.click(host);
    doc.event_loop().advance(Duration::from_millis(100));

    // the second bump did not restart the 150ms flash
    assert!(!doc.has_class(host, "modal-static"));
}

#[test]
fn test_window_area_click_without_backdrop_keeps_modal() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new().backdrop(false));

    doc.click(modal.window().host());
    doc.event_loop().run_until_idle();

    assert!(modal.is_open());
}

// =============================================================================
// Focus
// =============================================================================

#[test]
fn test_focus_moves_to_first_focusable() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = stack
        .open::<()>(ModalContent::template(with_buttons), ModalOptions::new())
        .unwrap();
    doc.event_loop().run_until_idle();

    let first = doc.query_selector("#first").unwrap().unwrap();
    assert_eq!(doc.active_element(), first);
    assert!(doc.contains(modal.window().host(), first));
}

#[test]
fn test_focus_prefers_autofocus() {
    let doc = Document::new();
    let stack = stack(&doc);
    stack
        .open::<()>(
            ModalContent::template(|doc: &Document, _: &TemplateContext<()>| {
                vec![
                    doc.build(&Element::button("a")),
                    doc.build(&Element::button("b").id("auto").autofocus()),
                ]
            }),
            ModalOptions::new(),
        )
        .unwrap();
    doc.event_loop().run_until_idle();

    assert_eq!(doc.active_element(), doc.query_selector("#auto").unwrap().unwrap());
}

#[test]
fn test_focus_falls_back_to_window() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new());

    assert_eq!(doc.active_element(), modal.window().host());
}

#[test]
fn test_focus_restored_after_close() {
    let doc = Document::new();
    let trigger = doc.build(&Element::button("open"));
    doc.append_child(doc.body(), trigger).unwrap();
    doc.focus(trigger);
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new());
    assert_ne!(doc.active_element(), trigger);

    modal.close(());
    doc.event_loop().run_until_idle();

    assert_eq!(doc.active_element(), trigger);
}

#[test]
fn test_focus_goes_to_body_when_trigger_is_gone() {
    let doc = Document::new();
    let trigger = doc.build(&Element::button("open"));
    doc.append_child(doc.body(), trigger).unwrap();
    doc.focus(trigger);
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new());

    doc.remove(trigger);
    modal.close(());
    doc.event_loop().run_until_idle();

    assert_eq!(doc.active_element(), doc.body());
}

// =============================================================================
// Updates
// =============================================================================

#[test]
fn test_update_changes_only_given_options() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(
        &stack,
        ModalOptions::new().size(ModalSize::Sm).window_class("before"),
    );
    let host = modal.window().host();
    let dialog = modal.window().dialog();

    modal.update(
        ModalUpdate::new()
            .centered(true)
            .window_class("after")
            .fullscreen(Fullscreen::On)
            .aria_labelled_by("title")
            .backdrop_class("darker"),
    );
    doc.event_loop().run_until_idle();

    assert!(doc.has_class(dialog, "modal-sm"));
    assert!(doc.has_class(dialog, "modal-dialog-centered"));
    assert!(doc.has_class(dialog, "modal-fullscreen"));
    assert!(doc.has_class(host, "after"));
    assert!(!doc.has_class(host, "before"));
    assert_eq!(doc.attribute(host, "aria-labelledby").as_deref(), Some("title"));
    assert!(doc.has_class(modal.backdrop().unwrap().host(), "darker"));
}

#[test]
fn test_update_keeps_foreign_classes() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new().window_class("mine"));
    let host = modal.window().host();
    doc.add_class(host, "theirs");

    modal.update(ModalUpdate::new().window_class("other"));
    doc.event_loop().run_until_idle();

    assert!(doc.has_class(host, "theirs"));
    assert!(!doc.has_class(host, "mine"));
}

#[test]
fn test_update_after_close_is_ignored() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = open_shown(&stack, ModalOptions::new());
    let dialog = modal.window().dialog();

    modal.close(());
    modal.update(ModalUpdate::new().centered(true));
    doc.event_loop().run_until_idle();

    assert!(!doc.has_class(dialog, "modal-dialog-centered"));
}
