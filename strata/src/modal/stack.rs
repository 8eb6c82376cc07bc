//! The page-wide modal stack.
//!
//! A document has at most one [`ModalStack`]. It owns every open modal in
//! z-order (last is on top) along with the page state they share: the body
//! `modal-open` class, the hidden scrollbar and the `aria-hidden` attributes
//! around the top window. That state is taken when the first modal opens
//! and given back once the last one has both settled and left the page,
//! in whichever order those two happen.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use pagedom::{Document, DomError, NodeId, Signal};

use crate::config::ModalConfig;
use crate::content::ModalContent;
use crate::error::ModalError;
use crate::host::{AppHost, Component, ComponentHost, Descriptor};
use crate::modal::modal_ref::{ModalEntry, ModalParts, ModalRecord};
use crate::modal::{ActiveModal, DismissReason, ModalBackdrop, ModalId, ModalRef, ModalWindow, OpenModal};
use crate::options::{BackdropMode, Container, ModalOptions, WindowOptions};
use crate::scope::Scope;
use crate::util::{AriaHiddenSnapshot, ScrollBar, ScrollLock, focus_trap};

const STACK_CLAIM: &str = "strata::modal-stack";

/// Put on body while at least one modal is open.
pub const MODAL_OPEN_CLASS: &str = "modal-open";

#[derive(Clone)]
pub struct ModalStack {
    inner: Rc<StackInner>,
}

struct StackInner {
    doc: Document,
    host: Rc<dyn ComponentHost>,
    config: ModalConfig,
    scope: Scope,
    scrollbar: ScrollBar,
    records: RefCell<Vec<Rc<dyn ModalEntry>>>,
    windows: RefCell<Vec<ModalWindow>>,
    aria: RefCell<AriaHiddenSnapshot>,
    scroll_lock: RefCell<Option<ScrollLock>>,
    active_window_changed: Signal<()>,
    active_instances: Signal<Vec<OpenModal>>,
}

impl Drop for StackInner {
    fn drop(&mut self) {
        if let Some(lock) = self.scroll_lock.get_mut().take() {
            log::debug!("modal stack dropped with open modals, restoring page state");
            self.doc.remove_class(self.doc.body(), MODAL_OPEN_CLASS);
            lock.release();
            self.aria.get_mut().revert(&self.doc);
        }
    }
}

impl fmt::Debug for ModalStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalStack")
            .field("records", &self.inner.records.borrow().len())
            .field("windows", &self.inner.windows.borrow().len())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl ModalStack {
    /// Create the stack of `doc`. Fails if the document already has one.
    pub fn new(doc: &Document, host: Rc<dyn ComponentHost>, config: ModalConfig) -> Result<Self, ModalError> {
        if !doc.claim(STACK_CLAIM) {
            return Err(ModalError::StackAlreadyInitialized);
        }
        let inner = Rc::new(StackInner {
            doc: doc.clone(),
            host,
            config,
            scope: Scope::new(),
            scrollbar: ScrollBar::new(doc),
            records: RefCell::new(Vec::new()),
            windows: RefCell::new(Vec::new()),
            aria: RefCell::new(AriaHiddenSnapshot::new()),
            scroll_lock: RefCell::new(None),
            active_window_changed: Signal::new(),
            active_instances: Signal::new(),
        });

        let weak = Rc::downgrade(&inner);
        inner
            .active_window_changed
            .subscribe(move |_| {
                if let Some(stack) = ModalStack::from_weak(&weak) {
                    stack.on_active_window_changed();
                }
            })
            .detach();

        log::debug!("modal stack initialized");
        Ok(Self { inner })
    }

    /// A stack rendering through a fresh [`AppHost`] with the default
    /// [`ModalConfig`].
    pub fn for_document(doc: &Document) -> Result<Self, ModalError> {
        Self::new(doc, Rc::new(AppHost::new(doc)), ModalConfig::default())
    }

    fn from_weak(weak: &Weak<StackInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn document(&self) -> &Document {
        &self.inner.doc
    }

    pub fn config(&self) -> &ModalConfig {
        &self.inner.config
    }

    /// Parent scope of component content when the options name none.
    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    /// Number of modals that have not settled yet, plus settled ones
    /// whose bookkeeping has not run yet.
    pub fn len(&self) -> usize {
        self.inner.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_open_modals(&self) -> bool {
        !self.is_empty()
    }

    /// The current stack, bottom first.
    pub fn open_modals(&self) -> Vec<OpenModal> {
        self.inner
            .records
            .borrow()
            .iter()
            .map(|entry| OpenModal::new(Rc::clone(entry)))
            .collect()
    }

    /// Emits the whole stack every time a modal is added or removed.
    pub fn active_instances(&self) -> Signal<Vec<OpenModal>> {
        self.inner.active_instances.clone()
    }

    /// Windows currently in the page, bottom first.
    pub fn windows(&self) -> Vec<ModalWindow> {
        self.inner.windows.borrow().clone()
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.inner.scroll_lock.borrow().is_some()
    }

    /// Open a modal on top of the stack.
    ///
    /// Fails without touching the page when the container cannot be
    /// resolved. A modal that cannot be attached is taken apart again
    /// before the error is returned.
    pub fn open<R: 'static>(
        &self,
        content: impl Into<ModalContent<R>>,
        options: ModalOptions,
    ) -> Result<ModalRef<R>, ModalError> {
        let inner = &self.inner;
        let doc = &inner.doc;
        let options = options.with_defaults(&inner.config);
        let container = self.resolve_container(options.container.as_ref())?;

        let scope = options.scope.clone().unwrap_or_else(|| inner.scope.clone());
        let active = ActiveModal::new();
        let content = content.into().resolve(
            doc,
            inner.host.as_ref(),
            &scope,
            &active,
            options.scrollable.unwrap_or_default(),
        );

        let window = match ModalWindow::new(doc, &content.nodes) {
            Ok(window) => window,
            Err(err) => {
                log::warn!("modal content could not be projected: {err}");
                if let Some(view) = &content.view {
                    inner.host.unmount(view);
                }
                return Err(err.into());
            }
        };

        let took_lock = self.hide_scrollbar();

        let backdrop = match options.backdrop.unwrap_or_default() {
            BackdropMode::Disabled => None,
            BackdropMode::Enabled | BackdropMode::Static => {
                let backdrop = ModalBackdrop::new(
                    doc,
                    options.animation.unwrap_or(inner.config.animation),
                    options.backdrop_class.clone(),
                );
                let view = inner.host.mount(component_of(backdrop.clone()), &scope);
                Some((backdrop, view))
            }
        };
        let window_view = inner.host.mount(component_of(window.clone()), &scope);

        let attached = backdrop
            .iter()
            .map(|(backdrop, _)| backdrop.host())
            .chain([window.host()])
            .try_for_each(|node| doc.append_child(container, node));
        if let Err(err) = attached {
            log::warn!("modal could not be attached: {err}");
            if let Some((backdrop, view)) = &backdrop {
                doc.remove(backdrop.host());
                inner.host.unmount(view);
            }
            doc.remove(window.host());
            inner.host.unmount(&window_view);
            if let Some(view) = &content.view {
                inner.host.unmount(view);
            }
            if took_lock {
                self.release_if_idle();
            }
            return Err(err.into());
        }

        let record = ModalRecord::new(ModalParts {
            doc: doc.clone(),
            host: Rc::clone(&inner.host),
            window: window.clone(),
            window_view: window_view.clone(),
            backdrop: backdrop.clone(),
            content,
            before_dismiss: options.before_dismiss.clone(),
        });
        let id = record.id();
        log::info!("opening modal {id}");

        let entry: Rc<dyn ModalEntry> = record.clone();
        self.register_record(entry, &record.settled());
        self.register_window(&window);

        let weak = Rc::downgrade(inner);
        record
            .hidden()
            .subscribe_once(move |_| {
                if let Some(stack) = ModalStack::from_weak(&weak) {
                    stack.release_when_idle();
                }
            })
            .detach();

        window.update_options(&WindowOptions::from(&options));
        if self.len() == 1 {
            doc.add_class(doc.body(), MODAL_OPEN_CLASS);
        }

        if let Some((_, view)) = &backdrop {
            inner.host.detect_changes(view);
        }
        inner.host.detect_changes(&window_view);

        active.bind(&record);
        Ok(ModalRef::new(record))
    }

    /// Dismiss every open modal, bottom first. Each `before_dismiss` may
    /// still veto its own modal.
    pub fn dismiss_all(&self, reason: impl Into<DismissReason>) {
        let reason = reason.into();
        let entries: Vec<_> = self.inner.records.borrow().clone();
        log::debug!("dismissing {} modal(s): {reason}", entries.len());
        for entry in entries {
            entry.dismiss(reason.clone());
        }
    }

    fn resolve_container(&self, container: Option<&Container>) -> Result<NodeId, ModalError> {
        let doc = &self.inner.doc;
        match container {
            None => Ok(doc.body()),
            Some(Container::Selector(selector)) => doc
                .query_selector(selector)?
                .ok_or_else(|| ModalError::ContainerNotFound(selector.clone())),
            Some(Container::Element(node)) if doc.is_element(*node) => Ok(*node),
            Some(Container::Element(node)) => Err(DomError::UnknownNode(*node).into()),
        }
    }

    /// Returns whether this call took the lock.
    fn hide_scrollbar(&self) -> bool {
        let mut lock = self.inner.scroll_lock.borrow_mut();
        if lock.is_some() {
            return false;
        }
        *lock = Some(self.inner.scrollbar.hide());
        true
    }

    fn register_record(&self, entry: Rc<dyn ModalEntry>, settled: &Signal<()>) {
        let id = entry.id();
        self.inner.records.borrow_mut().push(entry);
        self.emit_instances();

        let weak = Rc::downgrade(&self.inner);
        settled
            .subscribe_once(move |_| {
                let Some(stack) = ModalStack::from_weak(&weak) else {
                    return;
                };
                let weak = Rc::downgrade(&stack.inner);
                stack.inner.doc.event_loop().queue_microtask(move || {
                    if let Some(stack) = ModalStack::from_weak(&weak) {
                        stack.unregister(id);
                        stack.release_if_idle();
                    }
                });
            })
            .detach();
    }

    fn unregister(&self, id: ModalId) {
        let removed = {
            let mut records = self.inner.records.borrow_mut();
            let before = records.len();
            records.retain(|entry| entry.id() != id);
            before != records.len()
        };
        if removed {
            log::debug!("modal {id} left the stack");
            self.emit_instances();
        }
    }

    fn emit_instances(&self) {
        let instances = self.open_modals();
        self.inner.active_instances.emit(&instances);
    }

    fn register_window(&self, window: &ModalWindow) {
        self.inner.windows.borrow_mut().push(window.clone());
        self.inner.active_window_changed.emit(&());

        let host = window.host();
        let weak = Rc::downgrade(&self.inner);
        window
            .destroyed()
            .subscribe_once(move |_| {
                if let Some(stack) = ModalStack::from_weak(&weak) {
                    stack.inner.windows.borrow_mut().retain(|w| w.host() != host);
                    stack.inner.active_window_changed.emit(&());
                }
            })
            .detach();
    }

    /// Trap focus in the new top window and hide everything around it.
    /// The previous trap stops on this same emission.
    fn on_active_window_changed(&self) {
        let top = self.inner.windows.borrow().last().cloned();
        let Some(window) = top else {
            return;
        };
        let doc = &self.inner.doc;
        focus_trap(doc, window.host(), &self.inner.active_window_changed, false);
        let mut aria = self.inner.aria.borrow_mut();
        aria.revert(doc);
        aria.hide_outside(doc, window.host());
    }

    fn release_when_idle(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.doc.event_loop().queue_microtask(move || {
            if let Some(stack) = ModalStack::from_weak(&weak) {
                stack.release_if_idle();
            }
        });
    }

    /// Give back the page state once no modal is registered or mounted.
    /// Does nothing when already released.
    fn release_if_idle(&self) {
        if !self.inner.records.borrow().is_empty() || !self.inner.windows.borrow().is_empty() {
            return;
        }
        let Some(lock) = self.inner.scroll_lock.borrow_mut().take() else {
            return;
        };
        let doc = &self.inner.doc;
        doc.remove_class(doc.body(), MODAL_OPEN_CLASS);
        lock.release();
        self.inner.aria.borrow_mut().revert(doc);
        log::debug!("last modal gone, page state restored");
    }
}

fn component_of<C: Component + Clone + 'static>(component: C) -> Descriptor {
    Descriptor::Component(Rc::new(move |_: &Scope| -> Box<dyn Component> {
        Box::new(component.clone())
    }))
}
