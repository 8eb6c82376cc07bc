use pagedom::Document;
use strata::util::ScrollBar;

fn padding(doc: &Document) -> Option<String> {
    doc.style_property(doc.body(), "padding-right")
}

fn overflow(doc: &Document) -> Option<String> {
    doc.style_property(doc.body(), "overflow")
}

// =============================================================================
// Measuring
// =============================================================================

#[test]
fn test_width_from_viewport() {
    let doc = Document::new().with_viewport(1200.0, 1185.0);
    assert_eq!(ScrollBar::new(&doc).width(), 15.0);
}

#[test]
fn test_no_scrollbar() {
    let doc = Document::new();
    assert_eq!(ScrollBar::new(&doc).width(), 0.0);
}

// =============================================================================
// Hiding
// =============================================================================

#[test]
fn test_hide_compensates_width() {
    let doc = Document::new().with_viewport(1024.0, 1007.0);

    let lock = ScrollBar::new(&doc).hide();

    assert_eq!(padding(&doc).as_deref(), Some("17px"));
    assert_eq!(overflow(&doc).as_deref(), Some("hidden"));
    lock.release();
}

#[test]
fn test_hide_adds_to_existing_padding() {
    let doc = Document::new().with_viewport(1024.0, 1007.0);
    doc.set_style_property(doc.body(), "padding-right", "8px");

    let lock = ScrollBar::new(&doc).hide();
    assert_eq!(padding(&doc).as_deref(), Some("25px"));

    lock.release();
    assert_eq!(padding(&doc).as_deref(), Some("8px"));
}

#[test]
fn test_hide_without_scrollbar_leaves_padding() {
    let doc = Document::new();

    let lock = ScrollBar::new(&doc).hide();
    assert_eq!(padding(&doc), None);
    assert_eq!(overflow(&doc).as_deref(), Some("hidden"));

    lock.release();
    assert_eq!(overflow(&doc), None);
}

#[test]
fn test_release_restores_inline_style() {
    let doc = Document::new().with_viewport(1024.0, 1007.0);
    doc.set_style_property(doc.body(), "overflow", "scroll");

    let lock = ScrollBar::new(&doc).hide();
    lock.release();

    assert_eq!(padding(&doc), None);
    assert_eq!(overflow(&doc).as_deref(), Some("scroll"));
}

#[test]
fn test_drop_restores() {
    let doc = Document::new().with_viewport(1024.0, 1007.0);

    {
        let _lock = ScrollBar::new(&doc).hide();
        assert_eq!(overflow(&doc).as_deref(), Some("hidden"));
    }

    assert_eq!(padding(&doc), None);
    assert_eq!(overflow(&doc), None);
}
