//! Keeps Tab and Shift+Tab cycling inside one element.

use std::cell::Cell;
use std::rc::Rc;

use pagedom::focus::focusable_boundary;
use pagedom::{Document, EventType, Key, NodeId, Signal};

/// Trap keyboard focus inside `element` until `stop` emits.
///
/// The element remembers the last node that received focus inside it.
/// Tab on the last focusable wraps to the first, Shift+Tab on the first
/// (or on the element itself) wraps to the last. With `refocus_on_click`,
/// clicks inside the element hand focus back to the last focused node.
pub fn focus_trap(doc: &Document, element: NodeId, stop: &Signal<()>, refocus_on_click: bool) {
    let last_focused: Rc<Cell<Option<NodeId>>> = Rc::new(Cell::new(None));
    let mut listeners = Vec::new();

    let focused = Rc::clone(&last_focused);
    listeners.push(doc.add_event_listener(element, EventType::FocusIn, move |event| {
        focused.set(Some(event.target));
    }));

    let weak = doc.downgrade();
    let focused = Rc::clone(&last_focused);
    listeners.push(doc.add_event_listener(element, EventType::KeyDown, move |event| {
        let Some(key) = event.key().filter(|key| key.is_tab()) else {
            return;
        };
        let (Some(doc), Some(current)) = (weak.upgrade(), focused.get()) else {
            return;
        };
        let backwards = event.modifiers().shift || key == Key::BackTab;

        let Some((first, last)) = focusable_boundary(&doc, element) else {
            // Nothing to cycle through: focus stays on the element.
            if current == element {
                event.prevent_default();
            }
            return;
        };

        if backwards && (current == first || current == element) {
            doc.focus(last);
            event.prevent_default();
        }
        if !backwards && current == last {
            doc.focus(first);
            event.prevent_default();
        }
    }));

    if refocus_on_click {
        let weak = doc.downgrade();
        let focused = Rc::clone(&last_focused);
        listeners.push(doc.add_event_listener(element, EventType::Click, move |_| {
            if let (Some(doc), Some(node)) = (weak.upgrade(), focused.get()) {
                doc.focus(node);
            }
        }));
    }

    log::debug!("focus trapped in {element}");
    let weak = doc.downgrade();
    stop.subscribe_once(move |_| {
        if let Some(doc) = weak.upgrade() {
            for listener in listeners {
                doc.remove_event_listener(listener);
            }
            log::debug!("focus trap on {element} released");
        }
    })
    .detach();
}
