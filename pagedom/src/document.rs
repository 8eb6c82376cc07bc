//! The live page: an element tree with attributes, classes, inline style,
//! focus tracking and bubbling events.
//!
//! [`Document`] is a cheap handle (`Rc` inside). Long-lived callbacks stored
//! in the document or its event loop should hold a [`WeakDocument`] to avoid
//! reference cycles.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;

use crate::element::{Content, Element};
use crate::event::{DomEvent, EventKind, EventType, Key, Modifiers, MouseButton};
use crate::event_loop::EventLoop;
use crate::focus;
use crate::selector::{Selector, SelectorError};
use crate::stylesheet::Stylesheet;
use crate::transitions::Running;

static NEXT_NODE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("{0} does not exist in this document")]
    UnknownNode(NodeId),

    #[error("cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}

#[derive(Debug)]
enum NodeKind {
    Element { tag: String },
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
        }
    }
}

type Handler = Rc<dyn Fn(&DomEvent)>;

struct Listener {
    id: ListenerId,
    node: NodeId,
    event_type: EventType,
    handler: Handler,
}

#[derive(Clone)]
pub struct Document {
    inner: Rc<Inner>,
}

#[derive(Clone)]
pub struct WeakDocument {
    inner: Weak<Inner>,
}

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.inner.upgrade().map(|inner| Document { inner })
    }
}

struct Inner {
    nodes: RefCell<HashMap<NodeId, NodeData>>,
    root: NodeId,
    body: NodeId,
    active: Cell<Option<NodeId>>,
    listeners: RefCell<Vec<Listener>>,
    next_listener: Cell<u64>,
    stylesheet: RefCell<Stylesheet>,
    inner_width: Cell<f32>,
    client_width: Cell<f32>,
    reflows: Cell<u64>,
    claims: RefCell<HashSet<&'static str>>,
    running: RefCell<HashMap<NodeId, Running>>,
    event_loop: EventLoop,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.inner.nodes.borrow().len())
            .field("active", &self.inner.active.get())
            .finish()
    }
}

impl Document {
    /// An empty `<html><body></body></html>` page with no scrollbar.
    pub fn new() -> Self {
        let root = NodeId::next();
        let body = NodeId::next();
        let mut html = NodeData::new(NodeKind::Element { tag: "html".into() });
        html.children.push(body);
        let mut body_data = NodeData::new(NodeKind::Element { tag: "body".into() });
        body_data.parent = Some(root);

        let mut nodes = HashMap::new();
        nodes.insert(root, html);
        nodes.insert(body, body_data);

        Self {
            inner: Rc::new(Inner {
                nodes: RefCell::new(nodes),
                root,
                body,
                active: Cell::new(None),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
                stylesheet: RefCell::new(Stylesheet::default()),
                inner_width: Cell::new(1024.0),
                client_width: Cell::new(1024.0),
                reflows: Cell::new(0),
                claims: RefCell::new(HashSet::new()),
                running: RefCell::new(HashMap::new()),
                event_loop: EventLoop::new(),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn event_loop(&self) -> &EventLoop {
        &self.inner.event_loop
    }

    /// The `<html>` element.
    pub fn root(&self) -> NodeId {
        self.inner.root
    }

    pub fn body(&self) -> NodeId {
        self.inner.body
    }

    /// Reserve a page-wide role (e.g. the modal stack). Returns false if it
    /// was already claimed. Claims are never released.
    pub fn claim(&self, role: &'static str) -> bool {
        self.inner.claims.borrow_mut().insert(role)
    }

    // Viewport

    /// Set the window's inner width and the document's client width. The
    /// difference is the width of the vertical scrollbar.
    pub fn set_viewport(&self, inner_width: f32, client_width: f32) {
        self.inner.inner_width.set(inner_width);
        self.inner.client_width.set(client_width);
    }

    pub fn with_viewport(self, inner_width: f32, client_width: f32) -> Self {
        self.set_viewport(inner_width, client_width);
        self
    }

    pub fn inner_width(&self) -> f32 {
        self.inner.inner_width.get()
    }

    pub fn client_width(&self) -> f32 {
        self.inner.client_width.get()
    }

    pub fn scrollbar_width(&self) -> f32 {
        (self.inner_width() - self.client_width()).abs()
    }

    // Styles

    pub fn stylesheet(&self) -> Stylesheet {
        self.inner.stylesheet.borrow().clone()
    }

    pub fn set_stylesheet(&self, stylesheet: Stylesheet) {
        *self.inner.stylesheet.borrow_mut() = stylesheet;
    }

    /// Force a style recalculation of `node`.
    pub fn reflow(&self, node: NodeId) {
        log::trace!("reflow {node}");
        self.inner.reflows.set(self.inner.reflows.get() + 1);
    }

    pub fn reflow_count(&self) -> u64 {
        self.inner.reflows.get()
    }

    /// Computed transition duration of `node` (zero when none applies).
    pub fn transition_duration(&self, node: NodeId) -> Duration {
        let classes = self.classes(node);
        let ancestors = self.ancestors(node);
        self.inner
            .stylesheet
            .borrow()
            .transition_duration(&classes, |class| {
                ancestors.iter().any(|a| self.has_class(*a, class))
            })
    }

    // Tree

    fn insert(&self, data: NodeData) -> NodeId {
        let id = NodeId::next();
        self.inner.nodes.borrow_mut().insert(id, data);
        id
    }

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.insert(NodeData::new(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
        }))
    }

    pub fn create_text(&self, text: impl Into<String>) -> NodeId {
        self.insert(NodeData::new(NodeKind::Text(text.into())))
    }

    /// Create detached live nodes from a builder tree.
    pub fn build(&self, element: &Element) -> NodeId {
        let node = self.create_element(&element.tag);
        {
            let mut nodes = self.inner.nodes.borrow_mut();
            if let Some(data) = nodes.get_mut(&node) {
                data.classes = element.classes.clone();
                data.attributes = element.attributes.clone();
                data.style = element.style.clone();
                if let Some(id) = &element.id {
                    data.attributes.insert("id".into(), id.clone());
                }
            }
        }

        let children: Vec<NodeId> = match &element.content {
            Content::None => Vec::new(),
            Content::Text(text) => vec![self.create_text(text.clone())],
            Content::Children(children) => children.iter().map(|c| self.build(c)).collect(),
        };
        for child in children {
            self.link(node, child);
        }
        node
    }

    fn link(&self, parent: NodeId, child: NodeId) {
        let mut nodes = self.inner.nodes.borrow_mut();
        if let Some(data) = nodes.get_mut(&child) {
            data.parent = Some(parent);
        }
        if let Some(data) = nodes.get_mut(&parent) {
            data.children.push(child);
        }
    }

    fn unlink(&self, node: NodeId) {
        let mut nodes = self.inner.nodes.borrow_mut();
        let parent = nodes.get_mut(&node).and_then(|data| data.parent.take());
        if let Some(parent) = parent {
            if let Some(data) = nodes.get_mut(&parent) {
                data.children.retain(|c| *c != node);
            }
        }
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    /// elsewhere.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if !self.exists(parent) {
            return Err(DomError::UnknownNode(parent));
        }
        if !self.exists(child) {
            return Err(DomError::UnknownNode(child));
        }
        if !self.is_element(parent) || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        self.unlink(child);
        self.link(parent, child);
        Ok(())
    }

    /// Detach `node` (and its subtree) from its parent.
    pub fn remove(&self, node: NodeId) {
        if let Some(active) = self.inner.active.get() {
            if self.contains(node, active) {
                self.inner.active.set(None);
            }
        }
        self.unlink(node);
    }

    pub fn exists(&self, node: NodeId) -> bool {
        self.inner.nodes.borrow().contains_key(&node)
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(
            self.inner.nodes.borrow().get(&node).map(|d| &d.kind),
            Some(NodeKind::Element { .. })
        )
    }

    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        match &self.inner.nodes.borrow().get(&node)?.kind {
            NodeKind::Element { tag } => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    /// Text content: the node's own text, or all descendant text joined.
    pub fn text(&self, node: NodeId) -> String {
        let nodes = self.inner.nodes.borrow();
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(data) = nodes.get(&current) else {
                continue;
            };
            match &data.kind {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Element { .. } => stack.extend(data.children.iter().rev()),
            }
        }
        out
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.nodes.borrow().get(&node)?.parent
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .nodes
            .borrow()
            .get(&node)
            .map(|d| d.children.clone())
            .unwrap_or_default()
    }

    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .into_iter()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    /// Ancestors of `node`, nearest first.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(node);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent(parent);
        }
        out
    }

    /// Descendants of `root` in document order, `root` excluded.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let nodes = self.inner.nodes.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = nodes
            .get(&root)
            .map(|d| d.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(data) = nodes.get(&current) {
                stack.extend(data.children.iter().rev());
            }
        }
        out
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).contains(&ancestor)
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.root(), node)
    }

    // Attributes

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner
            .nodes
            .borrow()
            .get(&node)?
            .attributes
            .get(name)
            .cloned()
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(data) = self.inner.nodes.borrow_mut().get_mut(&node) {
            data.attributes.insert(name.to_string(), value.into());
        }
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) {
        if let Some(data) = self.inner.nodes.borrow_mut().get_mut(&node) {
            data.attributes.remove(name);
        }
    }

    // Classes

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.inner
            .nodes
            .borrow()
            .get(&node)
            .map(|d| d.classes.clone())
            .unwrap_or_default()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.inner
            .nodes
            .borrow()
            .get(&node)
            .is_some_and(|d| d.classes.iter().any(|c| c == class))
    }

    pub fn add_class(&self, node: NodeId, class: &str) {
        if let Some(data) = self.inner.nodes.borrow_mut().get_mut(&node) {
            if !data.classes.iter().any(|c| c == class) {
                data.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(data) = self.inner.nodes.borrow_mut().get_mut(&node) {
            data.classes.retain(|c| c != class);
        }
    }

    // Inline style

    pub fn style_property(&self, node: NodeId, property: &str) -> Option<String> {
        self.inner
            .nodes
            .borrow()
            .get(&node)?
            .style
            .get(property)
            .cloned()
    }

    pub fn set_style_property(&self, node: NodeId, property: &str, value: impl Into<String>) {
        if let Some(data) = self.inner.nodes.borrow_mut().get_mut(&node) {
            data.style.insert(property.to_string(), value.into());
        }
    }

    pub fn remove_style_property(&self, node: NodeId, property: &str) {
        if let Some(data) = self.inner.nodes.borrow_mut().get_mut(&node) {
            data.style.remove(property);
        }
    }

    // Queries

    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        let nodes = self.inner.nodes.borrow();
        match nodes.get(&node) {
            Some(NodeData {
                kind: NodeKind::Element { tag },
                classes,
                attributes,
                ..
            }) => selector.matches(tag, classes, attributes),
            _ => false,
        }
    }

    /// First element in the document matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        let root = self.root();
        if self.matches(root, &selector) {
            return Ok(Some(root));
        }
        Ok(self
            .descendants(root)
            .into_iter()
            .find(|n| self.matches(*n, &selector)))
    }

    /// First descendant of `root` matching `selector`.
    pub fn query_selector_within(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, SelectorError> {
        Ok(self.query_selector_all_within(root, selector)?.into_iter().next())
    }

    pub fn query_selector_all_within(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(root)
            .into_iter()
            .filter(|n| self.matches(*n, &selector))
            .collect())
    }

    // Focus

    /// The focused element, or body when nothing is focused.
    pub fn active_element(&self) -> NodeId {
        self.inner
            .active
            .get()
            .filter(|n| self.is_connected(*n))
            .unwrap_or(self.inner.body)
    }

    /// Move focus to `node`. Focusing body blurs. Returns false when the node
    /// cannot take focus.
    pub fn focus(&self, node: NodeId) -> bool {
        if node == self.body() {
            self.blur();
            return true;
        }
        if !focus::is_focusable(self, node) {
            return false;
        }
        let previous = self.inner.active.get().filter(|p| self.is_connected(*p));
        if previous == Some(node) {
            return true;
        }
        self.inner.active.set(Some(node));
        if let Some(previous) = previous {
            self.dispatch(previous, EventKind::FocusOut);
        }
        self.dispatch(node, EventKind::FocusIn);
        true
    }

    pub fn blur(&self) {
        if let Some(previous) = self.inner.active.take() {
            if self.is_connected(previous) {
                self.dispatch(previous, EventKind::FocusOut);
            }
        }
    }

    // Events

    pub fn add_event_listener(
        &self,
        node: NodeId,
        event_type: EventType,
        handler: impl Fn(&DomEvent) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push(Listener {
            id,
            node,
            event_type,
            handler: Rc::new(handler),
        });
        id
    }

    pub fn remove_event_listener(&self, id: ListenerId) {
        self.inner.listeners.borrow_mut().retain(|l| l.id != id);
    }

    fn has_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.borrow().iter().any(|l| l.id == id)
    }

    /// Listeners registered directly on `node`.
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.node == node)
            .count()
    }

    /// Deliver an event to `target` and its ancestors, then run the default
    /// action unless a listener prevented it.
    pub fn dispatch(&self, target: NodeId, kind: EventKind) -> DomEvent {
        let event = DomEvent::new(kind, target);
        let event_type = kind.event_type();

        let mut path = vec![target];
        path.extend(self.ancestors(target));

        for node in path {
            let handlers: Vec<(ListenerId, Handler)> = self
                .inner
                .listeners
                .borrow()
                .iter()
                .filter(|l| l.node == node && l.event_type == event_type)
                .map(|l| (l.id, Rc::clone(&l.handler)))
                .collect();
            let current = event.at(node);
            for (id, handler) in handlers {
                // A previous handler may have removed this one.
                if self.has_listener(id) {
                    handler(&current);
                }
            }
            if event.is_propagation_stopped() {
                break;
            }
        }

        if !event.is_default_prevented() {
            self.default_action(&event);
        }
        event
    }

    fn default_action(&self, event: &DomEvent) {
        match event.kind {
            EventKind::KeyDown { key, modifiers } if key.is_tab() => {
                let backwards = modifiers.shift || key == Key::BackTab;
                let current = self.inner.active.get().filter(|n| self.is_connected(*n));
                if let Some(next) = focus::sequential_target(self, current, backwards) {
                    self.focus(next);
                }
            }
            EventKind::MouseDown { .. } => {
                let focus_target = std::iter::once(event.target)
                    .chain(self.ancestors(event.target))
                    .find(|n| focus::is_focusable(self, *n));
                match focus_target {
                    Some(node) => {
                        self.focus(node);
                    }
                    None => self.blur(),
                }
            }
            _ => {}
        }
    }

    pub fn mouse_down(&self, target: NodeId) -> DomEvent {
        self.dispatch(
            target,
            EventKind::MouseDown {
                button: MouseButton::Left,
            },
        )
    }

    pub fn mouse_up(&self, target: NodeId) -> DomEvent {
        self.dispatch(
            target,
            EventKind::MouseUp {
                button: MouseButton::Left,
            },
        )
    }

    /// A full left click: mousedown, mouseup and click on the same target.
    pub fn click(&self, target: NodeId) -> DomEvent {
        self.mouse_down(target);
        self.mouse_up(target);
        self.dispatch(
            target,
            EventKind::Click {
                button: MouseButton::Left,
            },
        )
    }

    pub fn press(&self, target: NodeId, key: Key, modifiers: Modifiers) -> DomEvent {
        self.dispatch(target, EventKind::KeyDown { key, modifiers })
    }

    /// Key press delivered to the focused element.
    pub fn press_key(&self, key: Key, modifiers: Modifiers) -> DomEvent {
        self.press(self.active_element(), key, modifiers)
    }

    pub fn transition_end(&self, node: NodeId) -> DomEvent {
        self.dispatch(node, EventKind::TransitionEnd)
    }

    // Transition bookkeeping, owned by `transitions`

    pub(crate) fn take_running(&self, node: NodeId) -> Option<Running> {
        self.inner.running.borrow_mut().remove(&node)
    }

    pub(crate) fn put_running(&self, node: NodeId, running: Running) {
        self.inner.running.borrow_mut().insert(node, running);
    }

    /// Whether a transition is currently running on `node`.
    pub fn is_transitioning(&self, node: NodeId) -> bool {
        self.inner.running.borrow().contains_key(&node)
    }
}
