use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::FutureExt;
use pagedom::{Document, Key, Modifiers};
use strata::{AppHost, DismissCheck, DismissReason, ModalConfig, ModalOptions, ModalStack};
use tokio::sync::oneshot;

fn stack(doc: &Document) -> ModalStack {
    ModalStack::new(doc, Rc::new(AppHost::new(doc)), ModalConfig::new().no_animation()).unwrap()
}

// =============================================================================
// Synchronous
// =============================================================================

#[test]
fn test_veto_keeps_modal_open() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = stack
        .open::<()>("x", ModalOptions::new().before_dismiss(|| false))
        .unwrap();
    let mut result = modal.result().unwrap();

    modal.dismiss("nope");
    doc.event_loop().run_until_idle();

    assert!(modal.is_open());
    assert!(stack.has_open_modals());
    assert!(doc.is_connected(modal.window().host()));
    assert!((&mut result).now_or_never().is_none());
}

#[test]
fn test_allow_dismisses() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = stack
        .open::<()>("x", ModalOptions::new().before_dismiss(|| true))
        .unwrap();
    let result = modal.result().unwrap();

    modal.dismiss("yes");
    doc.event_loop().run_until_idle();

    assert_eq!(
        result.now_or_never(),
        Some(Err(DismissReason::Custom("yes".into())))
    );
}

#[test]
fn test_close_is_never_vetoed() {
    let doc = Document::new();
    let stack = stack(&doc);
    let asked = Rc::new(Cell::new(0));
    let count = Rc::clone(&asked);
    let modal = stack
        .open::<u8>(
            "x",
            ModalOptions::new().before_dismiss(move || {
                count.set(count.get() + 1);
                false
            }),
        )
        .unwrap();
    let result = modal.result().unwrap();

    modal.close(3);
    doc.event_loop().run_until_idle();

    assert_eq!(result.now_or_never(), Some(Ok(3)));
    assert_eq!(asked.get(), 0);
}

#[test]
fn test_predicate_asked_on_every_attempt() {
    let doc = Document::new();
    let stack = stack(&doc);
    let allow = Rc::new(Cell::new(false));
    let asked = Rc::new(Cell::new(0));
    let (flag, count) = (Rc::clone(&allow), Rc::clone(&asked));
    let modal = stack
        .open::<()>(
            "x",
            ModalOptions::new().before_dismiss(move || {
                count.set(count.get() + 1);
                flag.get()
            }),
        )
        .unwrap();
    doc.event_loop().run_until_idle();

    doc.press_key(Key::Escape, Modifiers::new());
    doc.event_loop().run_until_idle();
    assert!(modal.is_open());

    allow.set(true);
    doc.click(modal.window().host());
    doc.event_loop().run_until_idle();

    assert!(!modal.is_open());
    assert_eq!(asked.get(), 2);
}

#[test]
fn test_vetoed_dismiss_emits_nothing() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = stack
        .open::<()>("x", ModalOptions::new().before_dismiss(|| false))
        .unwrap();
    let reasons = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&reasons);
    modal
        .dismissed()
        .subscribe(move |reason| seen.borrow_mut().push(reason.clone()))
        .detach();

    modal.dismiss(DismissReason::Esc);
    doc.event_loop().run_until_idle();

    assert!(reasons.borrow().is_empty());
}

#[test]
fn test_dismissed_signal_carries_reason() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = stack.open::<()>("x", ModalOptions::new()).unwrap();
    let reasons = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&reasons);
    modal
        .dismissed()
        .subscribe(move |reason| seen.borrow_mut().push(reason.clone()))
        .detach();
    let closed = modal.closed().wait();

    modal.dismiss(DismissReason::Esc);

    assert_eq!(*reasons.borrow(), vec![DismissReason::Esc]);
    assert_eq!(closed.now_or_never(), Some(false));
}

// =============================================================================
// Asynchronous
// =============================================================================

#[test]
fn test_async_predicate_decides_later() {
    let doc = Document::new();
    let stack = stack(&doc);
    let answer = Rc::new(RefCell::new(None::<oneshot::Sender<bool>>));
    let slot = Rc::clone(&answer);
    let modal = stack
        .open::<()>(
            "x",
            ModalOptions::new().before_dismiss_async(move || {
                let (tx, rx) = oneshot::channel();
                *slot.borrow_mut() = Some(tx);
                async move { rx.await.unwrap_or(false) }
            }),
        )
        .unwrap();
    let result = modal.result().unwrap();

    modal.dismiss("later");
    doc.event_loop().run_until_idle();
    assert!(modal.is_open(), "waiting for the predicate");

    answer.borrow_mut().take().unwrap().send(true).unwrap();
    doc.event_loop().run_until_idle();

    assert_eq!(
        result.now_or_never(),
        Some(Err(DismissReason::Custom("later".into())))
    );
}

#[test]
fn test_async_veto_keeps_modal_open() {
    let doc = Document::new();
    let stack = stack(&doc);
    let modal = stack
        .open::<()>(
            "x",
            ModalOptions::new().before_dismiss_async(|| async { false }),
        )
        .unwrap();

    modal.dismiss("no");
    doc.event_loop().run_until_idle();

    assert!(modal.is_open());
    assert!(stack.has_open_modals());
}

#[test]
fn test_close_wins_over_pending_async_dismiss() {
    let doc = Document::new();
    let stack = stack(&doc);
    let answer = Rc::new(RefCell::new(None::<oneshot::Sender<bool>>));
    let slot = Rc::clone(&answer);
    let modal = stack
        .open::<u8>(
            "x",
            ModalOptions::new().before_dismiss_async(move || {
                let (tx, rx) = oneshot::channel();
                *slot.borrow_mut() = Some(tx);
                async move { rx.await.unwrap_or(false) }
            }),
        )
        .unwrap();
    let result = modal.result().unwrap();

    modal.dismiss("slow");
    modal.close(9);
    answer.borrow_mut().take().unwrap().send(true).unwrap();
    doc.event_loop().run_until_idle();

    assert_eq!(result.now_or_never(), Some(Ok(9)));
}

#[test]
fn test_check_can_answer_now_or_later() {
    let doc = Document::new();
    let stack = stack(&doc);
    let calls = Rc::new(Cell::new(0));
    let count = Rc::clone(&calls);
    let modal = stack
        .open::<()>(
            "x",
            ModalOptions::new().before_dismiss_check(move || {
                count.set(count.get() + 1);
                if count.get() == 1 {
                    DismissCheck::Veto
                } else {
                    DismissCheck::Deferred(Box::pin(async { true }))
                }
            }),
        )
        .unwrap();

    modal.dismiss("first");
    doc.event_loop().run_until_idle();
    assert!(modal.is_open());

    modal.dismiss("second");
    doc.event_loop().run_until_idle();
    assert!(!modal.is_open());
}
