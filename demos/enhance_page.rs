//! # Enhance Page Example
//!
//! Builds a small static page, resolves the widget registry through the
//! fallback loader and drives a few interactions:
//! - picking an option from a combobox
//! - choosing a date in the date picker
//! - a fragment inserted after startup being enhanced once it settles
//!
//! Run with: `cargo run --example enhance_page`

use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use uplift::crossterm::event::KeyCode;
use uplift::widgets::calendar::Nav;
use uplift::{testing, Document, Element, EngineOptions, Namespace, NodeId, Page};

fn page() -> (Document, NodeId, NodeId) {
    let mut doc = Document::new();
    let body = doc.root();
    let fruit = doc.append_fragment(
        body,
        Element::new("div")
            .class("combo-box")
            .attr("data-placeholder", "Pick a fruit")
            .child(Element::new("label").text("Fruit"))
            .child(
                Element::new("select").attr("name", "fruit").children(
                    ["Apple", "Apricot", "Banana", "Cherry"].map(|label| {
                        Element::new("option")
                            .attr("value", label.to_lowercase())
                            .text(label)
                    }),
                ),
            ),
    );
    let date = doc.append_fragment(
        body,
        Element::new("div")
            .class("date-picker")
            .attr("data-min-date", "2024-01-01")
            .child(Element::new("input").attr("name", "appointment")),
    );
    (doc, fruit, date)
}

fn report(page: &mut Page) {
    for event in page.take_events() {
        println!("  {} {} -> {:?}", event.kind, event.root, event.change);
    }
}

#[tokio::main]
async fn main() {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .ok();

    let (doc, fruit, date) = page();
    let mut page = uplift::with_source(
        doc,
        Namespace::new(),
        Some(uplift::builtin_source()),
        EngineOptions::default(),
    );
    page.start().await;
    println!("enhanced {} widget(s), loader {:?}", page.widget_count(), page.load_state());

    println!("combobox: type `ap`, arrow down, enter");
    let input = page
        .widget(fruit)
        .and_then(|w| w.as_combobox())
        .map(|c| c.input());
    if let Some(input) = input {
        testing::type_text(&mut page, input, "ap");
        page.dispatch(testing::key(input, KeyCode::Down));
        page.dispatch(testing::key(input, KeyCode::Enter));
    }
    report(&mut page);

    println!("date picker: open, next month, pick the 14th");
    let controls = page
        .widget(date)
        .and_then(|w| w.as_calendar())
        .map(|c| (c.toggle(), c.nav_control(Nav::NextMonth)));
    if let Some((toggle, next)) = controls {
        page.dispatch(testing::click(toggle));
        page.dispatch(testing::click(next));
        let day = page
            .widget(date)
            .and_then(|w| w.as_calendar())
            .map(|c| c.cells())
            .and_then(|cells| {
                let doc = page.document();
                doc.children(cells)
                    .iter()
                    .copied()
                    .find(|cell| doc.text(*cell) == "14")
            });
        if let Some(day) = day {
            page.dispatch(testing::click(day));
        }
    }
    report(&mut page);

    println!("inserting a tooltip after startup");
    let body = page.document().root();
    let tip = page.append(
        body,
        Element::new("button")
            .class("tooltip")
            .attr("title", "Saved automatically"),
    );
    page.run_until_idle().await;
    page.dispatch(testing::pointer_enter(tip));
    report(&mut page);

    println!("{} widget(s) live", page.widget_count());
}
