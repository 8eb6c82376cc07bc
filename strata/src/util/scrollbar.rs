//! Page scrollbar hiding with layout compensation.

use pagedom::{Document, NodeId};

/// Measures and hides the page's vertical scrollbar.
#[derive(Debug, Clone)]
pub struct ScrollBar {
    doc: Document,
}

impl ScrollBar {
    pub fn new(doc: &Document) -> Self {
        Self { doc: doc.clone() }
    }

    /// Width of the vertical scrollbar, zero when there is none.
    pub fn width(&self) -> f32 {
        self.doc.scrollbar_width()
    }

    /// Hide the scrollbar: body gets `overflow: hidden`, and its right
    /// padding grows by the scrollbar width so content does not shift.
    ///
    /// The page is restored when the returned lock is released or dropped.
    pub fn hide(&self) -> ScrollLock {
        let body = self.doc.body();
        let width = self.width();
        let padding_right = self.doc.style_property(body, "padding-right");
        let overflow = self.doc.style_property(body, "overflow");

        if width > 0.0 {
            let actual = padding_right
                .as_deref()
                .and_then(parse_px)
                .unwrap_or(0.0);
            self.doc
                .set_style_property(body, "padding-right", format!("{}px", actual + width));
        }
        self.doc.set_style_property(body, "overflow", "hidden");
        log::debug!("scrollbar hidden (width {width}px)");

        ScrollLock {
            doc: self.doc.clone(),
            body,
            width,
            padding_right,
            overflow,
            released: false,
        }
    }
}

fn parse_px(value: &str) -> Option<f32> {
    value.trim().trim_end_matches("px").trim().parse().ok()
}

/// Outstanding scrollbar hide. Restores the body's inline style once.
#[must_use = "dropping a ScrollLock restores the scrollbar immediately"]
#[derive(Debug)]
pub struct ScrollLock {
    doc: Document,
    body: NodeId,
    width: f32,
    padding_right: Option<String>,
    overflow: Option<String>,
    released: bool,
}

impl ScrollLock {
    pub fn release(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if self.width > 0.0 {
            restore_property(&self.doc, self.body, "padding-right", self.padding_right.take());
        }
        restore_property(&self.doc, self.body, "overflow", self.overflow.take());
        log::debug!("scrollbar restored");
    }
}

impl Drop for ScrollLock {
    fn drop(&mut self) {
        self.restore();
    }
}

fn restore_property(doc: &Document, node: NodeId, property: &str, value: Option<String>) {
    match value {
        Some(value) => doc.set_style_property(node, property, value),
        None => doc.remove_style_property(node, property),
    }
}
