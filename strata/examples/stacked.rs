use std::fs::File;
use std::time::Duration;

use futures::FutureExt;
use pagedom::EventType;
use simplelog::{Config, LevelFilter, WriteLogger};
use strata::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up file logging
    let log_file = File::create("stacked.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)?;

    let doc = Document::new().with_viewport(1280.0, 1265.0);
    let page = doc.build(
        &Element::new("main")
            .child(Element::new("h1").text("Orders"))
            .child(Element::button("Delete").id("delete")),
    );
    doc.append_child(doc.body(), page)?;

    let stack = ModalStack::for_document(&doc)?;

    let confirm = stack.open::<bool>(
        ModalContent::template(|doc: &Document, context: &TemplateContext<bool>| {
            let yes = doc.build(&Element::button("Delete order").id("yes").autofocus());
            let modal = context.modal().clone();
            doc.add_event_listener(yes, EventType::Click, move |_| modal.close(true));
            vec![
                doc.build(&Element::div().class("modal-body").text("Delete this order?")),
                yes,
            ]
        }),
        ModalOptions::new().size(ModalSize::Sm).centered(true),
    )?;
    let confirm_result = confirm.result();
    doc.event_loop().advance(Duration::from_millis(400));
    report(&doc, &stack, "confirm opened");

    let details = stack.open::<()>(
        "Order #1042 has 3 items",
        ModalOptions::new().backdrop(BackdropMode::Static).scrollable(true),
    )?;
    let details_result = details.result();
    doc.event_loop().advance(Duration::from_millis(400));
    report(&doc, &stack, "details opened");

    // keyboard is on, so Escape dismisses the top modal even with a static backdrop
    doc.press_key(Key::Escape, Modifiers::new());
    doc.event_loop().advance(Duration::from_millis(400));
    report(&doc, &stack, "escape pressed");

    if let Some(yes) = doc.query_selector("#yes")? {
        doc.click(yes);
    }
    doc.event_loop().run_to_completion();
    report(&doc, &stack, "confirmed");

    if let Some(result) = details_result.and_then(FutureExt::now_or_never) {
        println!("details: {result:?}");
    }
    if let Some(result) = confirm_result.and_then(FutureExt::now_or_never) {
        println!("confirm: {result:?}");
    }
    Ok(())
}

fn report(doc: &Document, stack: &ModalStack, label: &str) {
    println!(
        "{label}: {} open, scroll locked: {}, body padding: {}",
        stack.len(),
        stack.is_scroll_locked(),
        doc.style_property(doc.body(), "padding-right")
            .unwrap_or_else(|| "-".into()),
    );
}
