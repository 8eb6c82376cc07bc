//! Which elements can take focus, and in what order Tab visits them.

use crate::document::{Document, NodeId};

const FOCUSABLE_TAGS: &[&str] = &["button", "select", "textarea"];

/// Whether `node` can receive focus: connected, not disabled, and a link
/// with `href`, a form control, an editable region or anything with an
/// explicit `tabindex`.
pub fn is_focusable(doc: &Document, node: NodeId) -> bool {
    let Some(tag) = doc.tag_name(node) else {
        return false;
    };
    if !doc.is_connected(node) || doc.has_attribute(node, "disabled") {
        return false;
    }
    if doc.has_attribute(node, "tabindex") || doc.has_attribute(node, "contenteditable") {
        return true;
    }
    match tag.as_str() {
        "a" => doc.has_attribute(node, "href"),
        "input" => doc.attribute(node, "type").as_deref() != Some("hidden"),
        tag => FOCUSABLE_TAGS.contains(&tag),
    }
}

/// Focusable and part of the sequential (Tab) order.
pub fn is_tabbable(doc: &Document, node: NodeId) -> bool {
    if !is_focusable(doc, node) {
        return false;
    }
    match doc.attribute(node, "tabindex") {
        Some(index) => index.trim().parse::<i32>().map_or(true, |i| i >= 0),
        None => true,
    }
}

/// Tabbable descendants of `root` in document order.
pub fn focusable_within(doc: &Document, root: NodeId) -> Vec<NodeId> {
    doc.descendants(root)
        .into_iter()
        .filter(|n| is_tabbable(doc, *n))
        .collect()
}

/// First and last tabbable descendants of `root`.
pub fn focusable_boundary(doc: &Document, root: NodeId) -> Option<(NodeId, NodeId)> {
    let focusable = focusable_within(doc, root);
    match (focusable.first(), focusable.last()) {
        (Some(first), Some(last)) => Some((*first, *last)),
        _ => None,
    }
}

/// Where Tab (or Shift+Tab when `backwards`) moves focus from `current`.
///
/// Wraps around the page. When `current` is not itself tabbable (e.g. a
/// container with `tabindex="-1"`), the search starts from its position in
/// document order.
pub fn sequential_target(
    doc: &Document,
    current: Option<NodeId>,
    backwards: bool,
) -> Option<NodeId> {
    let order = doc.descendants(doc.root());
    let tabbable: Vec<(usize, NodeId)> = order
        .iter()
        .enumerate()
        .filter(|(_, n)| is_tabbable(doc, **n))
        .map(|(i, n)| (i, *n))
        .collect();
    if tabbable.is_empty() {
        return None;
    }

    let first = tabbable[0].1;
    let last = tabbable[tabbable.len() - 1].1;
    let Some(position) = current.and_then(|c| order.iter().position(|n| *n == c)) else {
        return Some(if backwards { last } else { first });
    };

    if backwards {
        Some(
            tabbable
                .iter()
                .rev()
                .find(|(i, _)| *i < position)
                .map_or(last, |(_, n)| *n),
        )
    } else {
        Some(
            tabbable
                .iter()
                .find(|(i, _)| *i > position)
                .map_or(first, |(_, n)| *n),
        )
    }
}

/// Next tabbable after `current`, wrapping.
pub fn next_tabbable(doc: &Document, current: Option<NodeId>) -> Option<NodeId> {
    sequential_target(doc, current, false)
}

/// Previous tabbable before `current`, wrapping.
pub fn prev_tabbable(doc: &Document, current: Option<NodeId>) -> Option<NodeId> {
    sequential_target(doc, current, true)
}
