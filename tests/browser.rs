//! Browser tests for the `web` bindings. Run with
//! `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use flag_randomizer::store::{KeyValueStore, MemoryStore};
use flag_randomizer::web::{LocalStorage, WebPage, mutation_records, trigger_click_listener};
use flag_randomizer::{Config, FlagRandomizer};
use rand::SeedableRng;
use rand::rngs::StdRng;
use gloo::events::EventListener;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;
use web_sys::{
    Document, Element, Event, EventInit, HtmlSelectElement, MutationObserver,
    MutationObserverInit,
};

wasm_bindgen_test_configure!(run_in_browser);

const SELECT_HTML: &str = r#"<option value="0">Geographic Location</option><option value="AB">Aryanne</option><option value="HT">Hitch</option>"#;

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

/// A fresh container in `<body>`; `tag` keeps each test's widgets apart.
fn container(tag: &str) -> Element {
    let doc = document();
    let div = doc.create_element("div").unwrap();
    div.set_class_name(tag);
    doc.body().unwrap().append_child(&div).unwrap();
    div
}

fn add_select(parent: &Element, tag: &str) -> HtmlSelectElement {
    let select: HtmlSelectElement = document()
        .create_element("select")
        .unwrap()
        .dyn_into()
        .unwrap();
    select.set_class_name(&format!("flagSelector {}", tag));
    select.set_inner_html(SELECT_HTML);
    parent.append_child(&select).unwrap();
    select
}

fn randomizer(tag: &str) -> FlagRandomizer<WebPage, MemoryStore, StdRng> {
    let config = Config {
        widget_selector: format!("select.flagSelector.{}", tag),
        ..Config::default()
    };
    let page = WebPage::new(document(), &config.widget_selector);
    FlagRandomizer::new(config, page, MemoryStore::new(), StdRng::seed_from_u64(1))
}

#[wasm_bindgen_test]
fn local_storage_roundtrip() {
    let storage = LocalStorage::new(&web_sys::window().unwrap());
    storage.set("flagRandomizerBrowserTest", "HT").unwrap();
    assert_eq!(
        storage.get("flagRandomizerBrowserTest").unwrap().as_deref(),
        Some("HT")
    );
    assert_eq!(storage.get("flagRandomizerBrowserTestMissing").unwrap(), None);
}

#[wasm_bindgen_test]
fn process_all_inserts_one_button_after_each_select() {
    let tag = "t-process";
    let root = container(tag);
    let selects = [add_select(&root, tag), add_select(&root, tag)];
    let app = randomizer(tag);
    app.preferences().save_eligible_set(&["HT".to_string()]);

    app.process_all();
    app.process_all();

    assert_eq!(root.query_selector_all(".flag-randomizer-btn").unwrap().length(), 2);
    for select in &selects {
        assert_eq!(select.value(), "HT");
        assert_eq!(select.get_attribute("data-has-randomizer").as_deref(), Some("true"));
        let button = select.next_element_sibling().unwrap();
        assert_eq!(button.class_name(), "flag-randomizer-btn");
        assert_eq!(
            button.get_attribute("data-flag-selector-id"),
            select.get_attribute("data-flag-selector-id")
        );
    }
}

#[wasm_bindgen_test]
fn inserted_selects_are_synced_in_one_broadcast() {
    let tag = "t-mutation";
    let root = container(tag);
    let old = add_select(&root, tag);
    let app = randomizer(tag);
    app.preferences().save_eligible_set(&["AB".to_string(), "HT".to_string()]);
    app.install();

    let noop = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
        |_: js_sys::Array, _: MutationObserver| {},
    );
    let observer = MutationObserver::new(noop.as_ref().unchecked_ref()).unwrap();
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(&root, &init).unwrap();

    let wrapper = document().create_element("form").unwrap();
    let new_a = add_select(&wrapper, tag);
    let new_b = add_select(&wrapper, tag);
    root.append_child(&wrapper).unwrap();

    let selector: Rc<str> = Rc::from(app.config().widget_selector.as_str());
    let batch = mutation_records(&observer.take_records(), &selector);
    observer.disconnect();
    let outcome = app.handle_mutations(&batch);

    assert_eq!(outcome.widgets_found, 2);
    let value = outcome.broadcast.unwrap();
    for select in [&old, &new_a, &new_b] {
        assert_eq!(select.value(), value);
    }
    assert_eq!(root.query_selector_all(".flag-randomizer-btn").unwrap().length(), 3);
}

#[wasm_bindgen_test]
fn trigger_clicks_are_swallowed_in_capture_phase() {
    let tag = "t-click";
    let root = container(tag);
    let select = add_select(&root, tag);
    let app = Rc::new(randomizer(tag));
    app.preferences().save_eligible_set(&["AB".to_string()]);
    app.process_all();
    select.set_value("0");

    let _capture = trigger_click_listener(&document(), Rc::clone(&app));
    let bubbled = Rc::new(Cell::new(false));
    let _bubble = {
        let bubbled = Rc::clone(&bubbled);
        EventListener::new(&root, "click", move |_| bubbled.set(true))
    };

    let init = EventInit::new();
    init.set_bubbles(true);
    init.set_cancelable(true);
    let click = Event::new_with_event_init_dict("click", &init).unwrap();
    let button = root.query_selector(".flag-randomizer-btn").unwrap().unwrap();
    button.dispatch_event(&click).unwrap();

    assert!(click.default_prevented());
    assert!(!bubbled.get());
    assert_eq!(select.value(), "AB");
}
