//! What a modal shows: nothing, text, a template or a component.

use std::fmt;
use std::rc::Rc;

use pagedom::{Document, NodeId, WeakDocument};

use crate::host::{Component, ComponentFactory, ComponentHost, Descriptor, View, ViewRef};
use crate::modal::{ActiveModal, DismissReason};
use crate::scope::Scope;

/// Class put on a component's host element when the modal is scrollable.
pub const SCROLLABLE_HOST_CLASS: &str = "component-host-scrollable";

/// Renders the nodes of a template-based modal.
pub trait Template<R> {
    fn render(&self, doc: &Document, context: &TemplateContext<R>) -> Vec<NodeId>;
}

impl<R, F> Template<R> for F
where
    F: Fn(&Document, &TemplateContext<R>) -> Vec<NodeId>,
{
    fn render(&self, doc: &Document, context: &TemplateContext<R>) -> Vec<NodeId> {
        self(doc, context)
    }
}

/// Handed to a [`Template`] while it renders. The `close` and `dismiss`
/// helpers may be kept by event listeners and called later.
pub struct TemplateContext<R> {
    modal: ActiveModal<R>,
}

impl<R: 'static> TemplateContext<R> {
    pub fn modal(&self) -> &ActiveModal<R> {
        &self.modal
    }

    pub fn close(&self, result: R) {
        self.modal.close(result);
    }

    pub fn dismiss(&self, reason: impl Into<DismissReason>) {
        self.modal.dismiss(reason.into());
    }
}

pub enum ModalContent<R> {
    Empty,
    Text(String),
    Template(Rc<dyn Template<R>>),
    /// Built from a scope that provides the modal's [`ActiveModal<R>`].
    Component(ComponentFactory),
}

impl<R> fmt::Debug for ModalContent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModalContent::Empty => f.write_str("Empty"),
            ModalContent::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ModalContent::Template(_) => f.write_str("Template(..)"),
            ModalContent::Component(_) => f.write_str("Component(..)"),
        }
    }
}

impl<R> From<&str> for ModalContent<R> {
    fn from(text: &str) -> Self {
        ModalContent::Text(text.to_string())
    }
}

impl<R> From<String> for ModalContent<R> {
    fn from(text: String) -> Self {
        ModalContent::Text(text)
    }
}

impl<R: 'static> ModalContent<R> {
    pub fn text(text: impl Into<String>) -> Self {
        ModalContent::Text(text.into())
    }

    pub fn template(template: impl Template<R> + 'static) -> Self {
        ModalContent::Template(Rc::new(template))
    }

    pub fn component<C, F>(factory: F) -> Self
    where
        C: Component + 'static,
        F: Fn(&Scope) -> C + 'static,
    {
        ModalContent::Component(Rc::new(move |scope: &Scope| -> Box<dyn Component> {
            Box::new(factory(scope))
        }))
    }

    pub(crate) fn resolve(
        self,
        doc: &Document,
        host: &dyn ComponentHost,
        scope: &Scope,
        modal: &ActiveModal<R>,
        scrollable: bool,
    ) -> ContentRef {
        match self {
            ModalContent::Empty => ContentRef::default(),
            ModalContent::Text(text) => ContentRef {
                nodes: vec![doc.create_text(text)],
                view: None,
            },
            ModalContent::Template(template) => {
                let context = TemplateContext {
                    modal: modal.clone(),
                };
                let nodes = template.render(doc, &context);
                let view = host.mount(
                    Descriptor::View(Rc::new(EmbeddedView::new(doc, nodes.clone()))),
                    scope,
                );
                ContentRef {
                    nodes,
                    view: Some(view),
                }
            }
            ModalContent::Component(factory) => {
                let scope = scope.child();
                scope.provide(modal.clone());
                let view = host.mount(Descriptor::Component(factory), &scope);
                if scrollable {
                    for node in view.nodes() {
                        doc.add_class(*node, SCROLLABLE_HOST_CLASS);
                    }
                }
                ContentRef {
                    nodes: view.nodes().to_vec(),
                    view: Some(view),
                }
            }
        }
    }
}

/// Nodes rendered from a template, detached from the page when destroyed.
pub struct EmbeddedView {
    doc: WeakDocument,
    nodes: Vec<NodeId>,
}

impl EmbeddedView {
    pub fn new(doc: &Document, nodes: Vec<NodeId>) -> Self {
        Self {
            doc: doc.downgrade(),
            nodes,
        }
    }
}

impl View for EmbeddedView {
    fn nodes(&self) -> Vec<NodeId> {
        self.nodes.clone()
    }

    fn destroy(&self) {
        if let Some(doc) = self.doc.upgrade() {
            for node in &self.nodes {
                doc.remove(*node);
            }
        }
    }
}

/// The projected nodes of a modal and the view that owns them, if any.
#[derive(Debug, Clone, Default)]
pub(crate) struct ContentRef {
    pub nodes: Vec<NodeId>,
    pub view: Option<ViewRef>,
}
