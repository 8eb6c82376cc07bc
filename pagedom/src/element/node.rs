use std::collections::BTreeMap;

use super::Content;

/// Declarative description of an element subtree.
///
/// Builders are plain data; [`Document::build`](crate::Document::build)
/// turns one into live nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
    pub content: Content,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn div() -> Self {
        Self::new("div")
    }

    pub fn span(text: impl Into<String>) -> Self {
        Self::new("span").text(text)
    }

    pub fn button(label: impl Into<String>) -> Self {
        Self::new("button").text(label)
    }

    pub fn input() -> Self {
        Self::new("input")
    }

    pub fn link(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new("a").attr("href", href).text(label)
    }

    // Identity
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    // Interaction
    /// Add the element to the tab sequence (`tabindex="0"`).
    pub fn focusable(self) -> Self {
        self.attr("tabindex", "0")
    }

    pub fn tabindex(self, index: i32) -> Self {
        self.attr("tabindex", index.to_string())
    }

    pub fn disabled(self) -> Self {
        self.attr("disabled", "")
    }

    /// Mark as the element a modal focuses first when it opens.
    pub fn autofocus(self) -> Self {
        self.attr("autofocus", "")
    }

    // Children
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content = Content::Text(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        match &mut self.content {
            Content::Children(children) => children.push(child),
            _ => self.content = Content::Children(vec![child]),
        }
        self
    }

    pub fn children(mut self, new_children: impl IntoIterator<Item = Element>) -> Self {
        match &mut self.content {
            Content::Children(children) => children.extend(new_children),
            _ => self.content = Content::Children(new_children.into_iter().collect()),
        }
        self
    }
}
