//! Hiding everything but the active modal from assistive technology.

use pagedom::{Document, NodeId};

/// Saved `aria-hidden` values of the nodes hidden around a modal window.
#[derive(Debug, Default)]
pub struct AriaHiddenSnapshot {
    saved: Vec<(NodeId, Option<String>)>,
}

impl AriaHiddenSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `aria-hidden="true"` on every sibling of `element` and of each of
    /// its ancestors, stopping at body. `<script>` siblings are skipped.
    pub fn hide_outside(&mut self, doc: &Document, element: NodeId) {
        let body = doc.body();
        let mut current = element;
        while current != body {
            let Some(parent) = doc.parent(current) else {
                break;
            };
            for sibling in doc.element_children(parent) {
                if sibling == current || doc.tag_name(sibling).as_deref() == Some("script") {
                    continue;
                }
                if !self.contains(sibling) {
                    self.saved
                        .push((sibling, doc.attribute(sibling, "aria-hidden")));
                }
                doc.set_attribute(sibling, "aria-hidden", "true");
            }
            current = parent;
        }
    }

    /// Put back the saved values. Nodes that had no (or an empty) value lose
    /// the attribute.
    pub fn revert(&mut self, doc: &Document) {
        for (node, value) in self.saved.drain(..) {
            match value {
                Some(value) if !value.is_empty() => doc.set_attribute(node, "aria-hidden", value),
                _ => doc.remove_attribute(node, "aria-hidden"),
            }
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.saved.iter().any(|(saved, _)| *saved == node)
    }

    pub fn hidden_nodes(&self) -> Vec<NodeId> {
        self.saved.iter().map(|(node, _)| *node).collect()
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}
