//! The seam between the modal stack and whatever renders views.
//!
//! A [`ComponentHost`] instantiates components and attached views and runs
//! change detection on them. [`AppHost`] is the default: it keeps a list of
//! attached views and refreshes all of them on every render pass of the
//! document's event loop.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use pagedom::{Document, NodeId, RenderHookId};

use crate::scope::Scope;

/// Something rendered into the page that can be refreshed and destroyed.
pub trait View {
    /// Root nodes of the view.
    fn nodes(&self) -> Vec<NodeId>;

    fn detect_changes(&self) {}

    fn destroy(&self) {}
}

/// A stateful piece of UI with a single host element.
pub trait Component {
    /// Build (or return) the host element. Called once when mounted.
    fn render(&mut self, doc: &Document) -> NodeId;

    /// Change detection: bring the DOM up to date with the component state.
    fn update(&mut self, doc: &Document) {
        let _ = doc;
    }

    fn destroy(&mut self, doc: &Document) {
        let _ = doc;
    }
}

pub type ComponentFactory = Rc<dyn Fn(&Scope) -> Box<dyn Component>>;

/// What to mount.
#[derive(Clone)]
pub enum Descriptor {
    Component(ComponentFactory),
    View(Rc<dyn View>),
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Component(_) => f.write_str("Component(..)"),
            Descriptor::View(view) => write!(f, "View({:?})", view.nodes()),
        }
    }
}

static NEXT_VIEW: AtomicU64 = AtomicU64::new(0);

/// Handle to a mounted view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewRef {
    id: u64,
    nodes: Vec<NodeId>,
}

impl ViewRef {
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self {
            id: NEXT_VIEW.fetch_add(1, Ordering::Relaxed),
            nodes,
        }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// First root node (the host element of a component).
    pub fn root(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }
}

pub trait ComponentHost {
    /// Instantiate `descriptor` and attach it for change detection.
    fn mount(&self, descriptor: Descriptor, scope: &Scope) -> ViewRef;

    /// Run change detection on one view now.
    fn detect_changes(&self, view: &ViewRef);

    /// Detach and destroy. Unknown views are ignored.
    fn unmount(&self, view: &ViewRef);
}

enum Attached {
    Component(Rc<RefCell<Box<dyn Component>>>),
    View(Rc<dyn View>),
}

impl Clone for Attached {
    fn clone(&self) -> Self {
        match self {
            Attached::Component(component) => Attached::Component(Rc::clone(component)),
            Attached::View(view) => Attached::View(Rc::clone(view)),
        }
    }
}

/// Default host: every attached view is refreshed on each render pass.
#[derive(Clone)]
pub struct AppHost {
    inner: Rc<AppHostInner>,
}

struct AppHostInner {
    doc: Document,
    views: RefCell<Vec<(ViewRef, Attached)>>,
    hook: Cell<Option<RenderHookId>>,
}

impl Drop for AppHostInner {
    fn drop(&mut self) {
        if let Some(hook) = self.hook.take() {
            self.doc.event_loop().remove_render_hook(hook);
        }
    }
}

impl fmt::Debug for AppHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppHost")
            .field("views", &self.view_count())
            .finish()
    }
}

impl AppHost {
    pub fn new(doc: &Document) -> Self {
        let inner = Rc::new(AppHostInner {
            doc: doc.clone(),
            views: RefCell::new(Vec::new()),
            hook: Cell::new(None),
        });
        let weak: Weak<AppHostInner> = Rc::downgrade(&inner);
        let hook = doc.event_loop().add_render_hook(move || {
            if let Some(inner) = weak.upgrade() {
                AppHost { inner }.tick();
            }
        });
        inner.hook.set(Some(hook));
        Self { inner }
    }

    /// Run change detection on every attached view.
    pub fn tick(&self) {
        let attached: Vec<Attached> = self
            .inner
            .views
            .borrow()
            .iter()
            .map(|(_, attached)| attached.clone())
            .collect();
        for attached in attached {
            self.refresh(&attached);
        }
    }

    pub fn view_count(&self) -> usize {
        self.inner.views.borrow().len()
    }

    pub fn is_attached(&self, view: &ViewRef) -> bool {
        self.find(view).is_some()
    }

    fn find(&self, view: &ViewRef) -> Option<Attached> {
        self.inner
            .views
            .borrow()
            .iter()
            .find(|(v, _)| v.id == view.id)
            .map(|(_, attached)| attached.clone())
    }

    fn refresh(&self, attached: &Attached) {
        match attached {
            Attached::Component(component) => match component.try_borrow_mut() {
                Ok(mut component) => component.update(&self.inner.doc),
                Err(_) => log::warn!("skipping change detection of a component already being updated"),
            },
            Attached::View(view) => view.detect_changes(),
        }
    }
}

impl ComponentHost for AppHost {
    fn mount(&self, descriptor: Descriptor, scope: &Scope) -> ViewRef {
        let (view, attached) = match descriptor {
            Descriptor::Component(factory) => {
                let mut component = factory(scope);
                let host = component.render(&self.inner.doc);
                (
                    ViewRef::new(vec![host]),
                    Attached::Component(Rc::new(RefCell::new(component))),
                )
            }
            Descriptor::View(view) => (ViewRef::new(view.nodes()), Attached::View(view)),
        };
        log::debug!("mounted view {} ({} nodes)", view.id, view.nodes.len());
        self.inner.views.borrow_mut().push((view.clone(), attached));
        view
    }

    fn detect_changes(&self, view: &ViewRef) {
        if let Some(attached) = self.find(view) {
            self.refresh(&attached);
        }
    }

    fn unmount(&self, view: &ViewRef) {
        let removed = {
            let mut views = self.inner.views.borrow_mut();
            views
                .iter()
                .position(|(v, _)| v.id == view.id)
                .map(|index| views.remove(index).1)
        };
        let Some(attached) = removed else {
            return;
        };
        log::debug!("unmounted view {}", view.id);
        match attached {
            Attached::Component(component) => {
                if let Ok(mut borrowed) = component.try_borrow_mut() {
                    borrowed.destroy(&self.inner.doc);
                    return;
                }
                // Unmounted from inside its own update: destroy once that returns.
                let doc = self.inner.doc.clone();
                self.inner.doc.event_loop().queue_microtask(move || {
                    component.borrow_mut().destroy(&doc);
                });
            }
            Attached::View(view) => view.destroy(),
        }
    }
}
