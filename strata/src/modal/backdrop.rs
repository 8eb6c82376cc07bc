//! The dimmed `ngb-modal-backdrop` element behind a modal window.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use pagedom::{Document, NodeId, RunningTransition, Transition, TransitionOptions, run_transition};

use crate::host::Component;
use crate::modal::window::sync_classes;

pub const BACKDROP_TAG: &str = "ngb-modal-backdrop";

/// Stacking order of backdrops, just below modal windows.
pub const BACKDROP_Z_INDEX: &str = "1055";

#[derive(Clone)]
pub struct ModalBackdrop {
    inner: Rc<BackdropInner>,
}

struct BackdropInner {
    doc: Document,
    host: NodeId,
    animation: bool,
    backdrop_class: RefCell<Option<String>>,
    applied: RefCell<Vec<String>>,
    initialized: Cell<bool>,
    hiding: Cell<bool>,
}

impl std::fmt::Debug for ModalBackdrop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalBackdrop")
            .field("host", &self.inner.host)
            .field("animation", &self.inner.animation)
            .finish()
    }
}

impl ModalBackdrop {
    pub fn new(doc: &Document, animation: bool, backdrop_class: Option<String>) -> Self {
        let host = doc.create_element(BACKDROP_TAG);
        doc.set_style_property(host, "z-index", BACKDROP_Z_INDEX);
        let backdrop = Self {
            inner: Rc::new(BackdropInner {
                doc: doc.clone(),
                host,
                animation,
                backdrop_class: RefCell::new(backdrop_class),
                applied: RefCell::new(Vec::new()),
                initialized: Cell::new(false),
                hiding: Cell::new(false),
            }),
        };
        backdrop.refresh();
        backdrop
    }

    fn from_weak(weak: &Weak<BackdropInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn host(&self) -> NodeId {
        self.inner.host
    }

    pub fn set_backdrop_class(&self, class: impl Into<String>) {
        *self.inner.backdrop_class.borrow_mut() = Some(class.into());
        self.inner.doc.event_loop().request_render();
    }

    pub fn refresh(&self) {
        let mut wanted = vec!["modal-backdrop".to_string()];
        if let Some(class) = self.inner.backdrop_class.borrow().as_deref() {
            wanted.extend(class.split_whitespace().map(str::to_string));
        }
        if self.inner.animation {
            wanted.push("fade".into());
        } else if !self.inner.hiding.get() {
            wanted.push("show".into());
        }
        sync_classes(
            &self.inner.doc,
            self.inner.host,
            &mut self.inner.applied.borrow_mut(),
            wanted,
        );
    }

    fn init(&self) {
        if self.inner.initialized.replace(true) {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        self.inner.doc.event_loop().after_next_render(move || {
            if let Some(backdrop) = ModalBackdrop::from_weak(&weak) {
                backdrop.show();
            }
        });
    }

    fn show(&self) {
        if self.inner.hiding.get() {
            return;
        }
        run_transition(
            &self.inner.doc,
            self.inner.host,
            |doc: &Document, node: NodeId, animation: bool| {
                if animation {
                    doc.reflow(node);
                }
                doc.add_class(node, "show");
                None
            },
            TransitionOptions::new(self.inner.animation, RunningTransition::Continue),
        );
    }

    pub fn hide(&self) -> Transition {
        self.inner.hiding.set(true);
        run_transition(
            &self.inner.doc,
            self.inner.host,
            |doc: &Document, node: NodeId, _: bool| {
                doc.remove_class(node, "show");
                None
            },
            TransitionOptions::new(self.inner.animation, RunningTransition::Stop),
        )
    }
}

impl Component for ModalBackdrop {
    fn render(&mut self, _doc: &Document) -> NodeId {
        self.inner.host
    }

    fn update(&mut self, _doc: &Document) {
        self.refresh();
        self.init();
    }
}
