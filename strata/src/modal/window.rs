//! The `ngb-modal-window` element: dialog chrome, open/close transitions,
//! Escape and click-outside dismissal.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use pagedom::focus::focusable_boundary;
use pagedom::{
    Document, DomEvent, EventType, Key, ListenerId, NodeId, RunningTransition, Signal, Transition,
    TransitionOptions, TransitionOutcome, run_transition,
};

use crate::host::Component;
use crate::modal::DismissReason;
use crate::options::{BackdropMode, Fullscreen, ModalSize, WindowOptions};

pub const WINDOW_TAG: &str = "ngb-modal-window";

/// Class flashed on the window when a static modal refuses to close.
pub const STATIC_CLASS: &str = "modal-static";

/// Lifecycle of a window. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WindowState {
    Constructed,
    Shown,
    Hiding,
    Hidden,
}

#[derive(Debug, Clone)]
struct WindowProps {
    animation: bool,
    aria_labelled_by: Option<String>,
    aria_described_by: Option<String>,
    backdrop: BackdropMode,
    centered: bool,
    fullscreen: Fullscreen,
    keyboard: bool,
    role: String,
    scrollable: bool,
    size: Option<ModalSize>,
    window_class: Option<String>,
    modal_dialog_class: Option<String>,
}

impl Default for WindowProps {
    fn default() -> Self {
        Self {
            animation: false,
            aria_labelled_by: None,
            aria_described_by: None,
            backdrop: BackdropMode::Enabled,
            centered: false,
            fullscreen: Fullscreen::Off,
            keyboard: true,
            role: "dialog".into(),
            scrollable: false,
            size: None,
            window_class: None,
            modal_dialog_class: None,
        }
    }
}

impl WindowProps {
    fn apply(&mut self, options: &WindowOptions) {
        if let Some(animation) = options.animation {
            self.animation = animation;
        }
        if let Some(id) = &options.aria_labelled_by {
            self.aria_labelled_by = Some(id.clone());
        }
        if let Some(id) = &options.aria_described_by {
            self.aria_described_by = Some(id.clone());
        }
        if let Some(backdrop) = options.backdrop {
            self.backdrop = backdrop;
        }
        if let Some(centered) = options.centered {
            self.centered = centered;
        }
        if let Some(fullscreen) = &options.fullscreen {
            self.fullscreen = fullscreen.clone();
        }
        if let Some(keyboard) = options.keyboard {
            self.keyboard = keyboard;
        }
        if let Some(role) = &options.role {
            self.role = role.clone();
        }
        if let Some(scrollable) = options.scrollable {
            self.scrollable = scrollable;
        }
        if let Some(size) = &options.size {
            self.size = Some(size.clone());
        }
        if let Some(class) = &options.window_class {
            self.window_class = Some(class.clone());
        }
        if let Some(class) = &options.modal_dialog_class {
            self.modal_dialog_class = Some(class.clone());
        }
    }

    fn host_classes(&self) -> Vec<String> {
        let mut classes = vec!["modal".to_string(), "d-block".to_string()];
        classes.extend(split_classes(self.window_class.as_deref()));
        if self.animation {
            classes.push("fade".into());
        }
        classes
    }

    fn dialog_classes(&self) -> Vec<String> {
        let mut classes = vec!["modal-dialog".to_string()];
        if let Some(size) = &self.size {
            classes.push(format!("modal-{}", size.class_suffix()));
        }
        if self.centered {
            classes.push("modal-dialog-centered".into());
        }
        classes.extend(self.fullscreen.class());
        if self.scrollable {
            classes.push("modal-dialog-scrollable".into());
        }
        classes.extend(split_classes(self.modal_dialog_class.as_deref()));
        classes
    }
}

fn split_classes(classes: Option<&str>) -> Vec<String> {
    classes
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Replace the classes this component put on `node` last time with
/// `wanted`, leaving classes added by anyone else alone.
pub(crate) fn sync_classes(doc: &Document, node: NodeId, applied: &mut Vec<String>, wanted: Vec<String>) {
    for class in applied.iter() {
        if !wanted.contains(class) {
            doc.remove_class(node, class);
        }
    }
    for class in &wanted {
        doc.add_class(node, class);
    }
    *applied = wanted;
}

fn sync_attribute(doc: &Document, node: NodeId, name: &str, value: Option<&str>) {
    match value {
        Some(value) => doc.set_attribute(node, name, value),
        None => doc.remove_attribute(node, name),
    }
}

/// One open modal's window. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ModalWindow {
    inner: Rc<WindowInner>,
}

struct WindowInner {
    doc: Document,
    host: NodeId,
    dialog: NodeId,
    content: NodeId,
    props: RefCell<WindowProps>,
    host_classes: RefCell<Vec<String>>,
    dialog_classes: RefCell<Vec<String>>,
    state: Cell<WindowState>,
    initialized: Cell<bool>,
    focus_before: Cell<Option<NodeId>>,
    listeners: RefCell<Vec<ListenerId>>,
    /// Set when a press that started on the dialog was released on the
    /// window backdrop area.
    prevent_close: Cell<bool>,
    awaiting_mouseup: Cell<bool>,
    hide_transition: RefCell<Option<Transition>>,
    shown: Signal<()>,
    hidden: Signal<()>,
    dismiss_event: Signal<DismissReason>,
    destroyed: Signal<()>,
}

impl std::fmt::Debug for ModalWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalWindow")
            .field("host", &self.inner.host)
            .field("state", &self.inner.state.get())
            .finish()
    }
}

impl ModalWindow {
    /// Build the window DOM around `projected` nodes. Nothing is attached to
    /// the page yet.
    pub fn new(doc: &Document, projected: &[NodeId]) -> Result<Self, pagedom::DomError> {
        let host = doc.create_element(WINDOW_TAG);
        doc.set_attribute(host, "tabindex", "-1");
        doc.set_attribute(host, "aria-modal", "true");

        let dialog = doc.create_element("div");
        doc.set_attribute(dialog, "role", "document");
        let content = doc.create_element("div");
        doc.add_class(content, "modal-content");

        doc.append_child(host, dialog)?;
        doc.append_child(dialog, content)?;
        for node in projected {
            doc.append_child(content, *node)?;
        }

        let window = Self {
            inner: Rc::new(WindowInner {
                doc: doc.clone(),
                host,
                dialog,
                content,
                props: RefCell::new(WindowProps::default()),
                host_classes: RefCell::new(Vec::new()),
                dialog_classes: RefCell::new(Vec::new()),
                state: Cell::new(WindowState::Constructed),
                initialized: Cell::new(false),
                focus_before: Cell::new(None),
                listeners: RefCell::new(Vec::new()),
                prevent_close: Cell::new(false),
                awaiting_mouseup: Cell::new(false),
                hide_transition: RefCell::new(None),
                shown: Signal::once(),
                hidden: Signal::once(),
                dismiss_event: Signal::new(),
                destroyed: Signal::once(),
            }),
        };
        window.refresh();
        Ok(window)
    }

    fn from_weak(weak: &Weak<WindowInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn downgrade(&self) -> Weak<WindowInner> {
        Rc::downgrade(&self.inner)
    }

    pub fn host(&self) -> NodeId {
        self.inner.host
    }

    pub fn dialog(&self) -> NodeId {
        self.inner.dialog
    }

    /// The `.modal-content` element holding the projected nodes.
    pub fn content(&self) -> NodeId {
        self.inner.content
    }

    pub fn state(&self) -> WindowState {
        self.inner.state.get()
    }

    /// Emits once both open transitions have finished.
    pub fn shown(&self) -> Signal<()> {
        self.inner.shown.clone()
    }

    /// Emits once both close transitions have finished.
    pub fn hidden(&self) -> Signal<()> {
        self.inner.hidden.clone()
    }

    /// Dismissal requests coming from Escape or backdrop clicks.
    pub fn dismiss_event(&self) -> Signal<DismissReason> {
        self.inner.dismiss_event.clone()
    }

    pub fn destroyed(&self) -> Signal<()> {
        self.inner.destroyed.clone()
    }

    pub fn events_enabled(&self) -> bool {
        !self.inner.listeners.borrow().is_empty()
    }

    pub fn dismiss(&self, reason: DismissReason) {
        self.inner.dismiss_event.emit(&reason);
    }

    /// Apply the options that are set, then refresh the DOM on the next
    /// render pass.
    pub fn update_options(&self, options: &WindowOptions) {
        self.inner.props.borrow_mut().apply(options);
        self.inner.doc.event_loop().request_render();
    }

    /// Bring classes and attributes in line with the current options.
    pub fn refresh(&self) {
        let inner = &self.inner;
        let props = inner.props.borrow().clone();

        sync_classes(
            &inner.doc,
            inner.host,
            &mut inner.host_classes.borrow_mut(),
            props.host_classes(),
        );
        sync_classes(
            &inner.doc,
            inner.dialog,
            &mut inner.dialog_classes.borrow_mut(),
            props.dialog_classes(),
        );
        sync_attribute(&inner.doc, inner.host, "role", Some(&props.role));
        sync_attribute(
            &inner.doc,
            inner.host,
            "aria-labelledby",
            props.aria_labelled_by.as_deref(),
        );
        sync_attribute(
            &inner.doc,
            inner.host,
            "aria-describedby",
            props.aria_described_by.as_deref(),
        );
    }

    /// First change detection: remember what had focus and show after the
    /// next render.
    fn init(&self) {
        if self.inner.initialized.replace(true) {
            return;
        }
        let doc = &self.inner.doc;
        self.inner.focus_before.set(Some(doc.active_element()));

        let weak = self.downgrade();
        doc.event_loop().after_next_render(move || {
            if let Some(window) = ModalWindow::from_weak(&weak) {
                window.show();
            }
        });
    }

    fn show(&self) {
        if self.state() != WindowState::Constructed {
            log::debug!("window {} closed before it was shown", self.host());
            self.inner.shown.complete();
            return;
        }
        self.inner.state.set(WindowState::Shown);

        let doc = &self.inner.doc;
        let options = TransitionOptions::new(self.inner.props.borrow().animation, RunningTransition::Continue);
        let window_transition = run_transition(
            doc,
            self.inner.host,
            |doc: &Document, node: NodeId, animation: bool| {
                if animation {
                    doc.reflow(node);
                }
                doc.add_class(node, "show");
                None
            },
            options,
        );
        let dialog_transition = run_transition(doc, self.inner.dialog, |_: &Document, _: NodeId, _: bool| None, options);

        let shown = self.inner.shown.clone();
        Transition::join(&window_transition, &dialog_transition).on_settled(move |outcome| {
            if outcome == TransitionOutcome::Finished {
                shown.emit(&());
            } else {
                shown.complete();
            }
        });

        self.enable_event_handling();
        self.set_focus();
    }

    /// Run the close transitions. Event handling stops right away and focus
    /// goes back to where it was before the modal opened.
    pub fn hide(&self) -> Transition {
        if let Some(transition) = self.inner.hide_transition.borrow().clone() {
            return transition;
        }
        self.inner.state.set(WindowState::Hiding);

        let doc = &self.inner.doc;
        let options = TransitionOptions::new(self.inner.props.borrow().animation, RunningTransition::Stop);
        let window_transition = run_transition(
            doc,
            self.inner.host,
            |doc: &Document, node: NodeId, _: bool| {
                doc.remove_class(node, "show");
                None
            },
            options,
        );
        let dialog_transition = run_transition(doc, self.inner.dialog, |_: &Document, _: NodeId, _: bool| None, options);

        let joined = Transition::join(&window_transition, &dialog_transition);
        *self.inner.hide_transition.borrow_mut() = Some(joined.clone());

        let weak = self.downgrade();
        joined.on_settled(move |_| {
            if let Some(window) = ModalWindow::from_weak(&weak) {
                window.inner.state.set(WindowState::Hidden);
                window.inner.hidden.emit(&());
            }
        });

        self.disable_event_handling();
        self.restore_focus();
        joined
    }

    fn enable_event_handling(&self) {
        let doc = &self.inner.doc;
        let host = self.inner.host;
        let mut listeners = Vec::with_capacity(4);

        let weak = self.downgrade();
        listeners.push(doc.add_event_listener(host, EventType::KeyDown, move |event| {
            if event.key() != Some(Key::Escape) {
                return;
            }
            if let Some(window) = ModalWindow::from_weak(&weak) {
                window.on_escape(event);
            }
        }));

        // A press on the dialog released over the window must not count as
        // a backdrop click.
        let weak = self.downgrade();
        listeners.push(doc.add_event_listener(self.inner.dialog, EventType::MouseDown, move |_| {
            if let Some(window) = ModalWindow::from_weak(&weak) {
                window.inner.prevent_close.set(false);
                window.inner.awaiting_mouseup.set(true);
            }
        }));

        let weak = self.downgrade();
        listeners.push(doc.add_event_listener(host, EventType::MouseUp, move |event| {
            if let Some(window) = ModalWindow::from_weak(&weak) {
                if window.inner.awaiting_mouseup.replace(false) && event.target == host {
                    window.inner.prevent_close.set(true);
                }
            }
        }));

        let weak = self.downgrade();
        listeners.push(doc.add_event_listener(host, EventType::Click, move |event| {
            if let Some(window) = ModalWindow::from_weak(&weak) {
                window.on_click(event);
            }
        }));

        *self.inner.listeners.borrow_mut() = listeners;
    }

    fn disable_event_handling(&self) {
        let listeners = std::mem::take(&mut *self.inner.listeners.borrow_mut());
        for listener in listeners {
            self.inner.doc.remove_event_listener(listener);
        }
        self.inner.awaiting_mouseup.set(false);
    }

    fn on_escape(&self, event: &DomEvent) {
        let (keyboard, backdrop) = {
            let props = self.inner.props.borrow();
            (props.keyboard, props.backdrop)
        };
        if keyboard {
            // Give later handlers the chance to claim the key first.
            let event = event.clone();
            let weak = self.downgrade();
            self.inner.doc.event_loop().request_animation_frame(move || {
                if event.is_default_prevented() {
                    return;
                }
                if let Some(window) = ModalWindow::from_weak(&weak) {
                    window.dismiss(DismissReason::Esc);
                }
            });
        } else if backdrop == BackdropMode::Static {
            self.bump();
        }
    }

    fn on_click(&self, event: &DomEvent) {
        if event.target == self.inner.host {
            let backdrop = self.inner.props.borrow().backdrop;
            match backdrop {
                BackdropMode::Static => self.bump(),
                BackdropMode::Enabled if !self.inner.prevent_close.get() => {
                    self.dismiss(DismissReason::BackdropClick);
                }
                _ => {}
            }
        }
        self.inner.prevent_close.set(false);
    }

    /// Flash [`STATIC_CLASS`] to show a static modal cannot be closed this
    /// way.
    pub fn bump(&self) {
        let (animation, backdrop) = {
            let props = self.inner.props.borrow();
            (props.animation, props.backdrop)
        };
        if backdrop != BackdropMode::Static {
            return;
        }
        log::debug!("bumping static modal {}", self.host());
        let weak = self.inner.doc.downgrade();
        run_transition(
            &self.inner.doc,
            self.inner.host,
            move |doc: &Document, node: NodeId, _: bool| {
                doc.add_class(node, STATIC_CLASS);
                let end: pagedom::EndFn = Box::new(move || {
                    if let Some(doc) = weak.upgrade() {
                        doc.remove_class(node, STATIC_CLASS);
                    }
                });
                Some(end)
            },
            TransitionOptions::new(animation, RunningTransition::Continue),
        );
    }

    /// Autofocus target, else first focusable descendant, else the window
    /// itself. Only when focus is not already inside.
    fn set_focus(&self) {
        let doc = &self.inner.doc;
        let host = self.inner.host;
        if doc.contains(host, doc.active_element()) {
            return;
        }
        let target = doc
            .query_selector_within(host, "[autofocus]")
            .ok()
            .flatten()
            .or_else(|| focusable_boundary(doc, host).map(|(first, _)| first))
            .unwrap_or(host);
        doc.focus(target);
    }

    fn restore_focus(&self) {
        let doc = &self.inner.doc;
        let body = doc.body();
        let target = self
            .inner
            .focus_before
            .take()
            .filter(|node| doc.contains(body, *node))
            .unwrap_or(body);

        let weak = doc.downgrade();
        doc.event_loop().set_timeout(std::time::Duration::ZERO, move || {
            if let Some(doc) = weak.upgrade() {
                doc.focus(target);
            }
        });
    }

    /// Stop handling events and tell listeners the window is gone.
    pub fn destroy(&self) {
        self.disable_event_handling();
        self.inner.destroyed.emit(&());
    }
}

impl Component for ModalWindow {
    fn render(&mut self, _doc: &Document) -> NodeId {
        self.inner.host
    }

    fn update(&mut self, _doc: &Document) {
        self.refresh();
        self.init();
    }

    fn destroy(&mut self, _doc: &Document) {
        ModalWindow::destroy(self);
    }
}
