//! Browser bindings: wires a `FlagRandomizer` to the live page.
//!
//! `install` builds one instance over the real document and
//! `localStorage`, then hands an `Rc` of it to:
//!
//! - a capture-phase `click` listener on the document for trigger buttons,
//! - a `MutationObserver` on `<body>` (`childList` + `subtree`),
//! - the settings panel, mounted at `DOMContentLoaded` or right away.
//!
//! The listeners, observer and panel are kept in a thread-local
//! `Installation` so they live until the page unloads.

mod dom;
mod logger;
mod storage;

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlInputElement, MutationObserver,
    MutationObserverInit,
};

use crate::app::FlagRandomizer;
use crate::config::Config;
use crate::panel::SettingsPanel;
use crate::store::KeyValueStore;

pub use dom::{WebNode, WebPage, WebWidget, mutation_records};
pub use storage::LocalStorage;

type WebRandomizer = FlagRandomizer<WebPage, LocalStorage, StdRng>;
type MutationCallback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

struct PanelMount {
    _root: Element,
    _listeners: [EventListener; 2],
}

struct Installation {
    _randomizer: Rc<WebRandomizer>,
    _click: EventListener,
    _observer: MutationObserver,
    _on_mutations: MutationCallback,
    _panel: Rc<RefCell<Option<PanelMount>>>,
    _ready: Option<EventListener>,
}

thread_local! {
    static INSTALLATION: RefCell<Option<Installation>> = const { RefCell::new(None) };
}

/// Best-effort text for a thrown JS value.
pub(crate) fn describe_js(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

pub fn install(config: Config) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logger::init(config.level_filter());

    if INSTALLATION.with(|i| i.borrow().is_some()) {
        log::warn!("already installed; ignoring second install");
        return Ok(());
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;

    let page = WebPage::new(document.clone(), &config.widget_selector);
    let store = LocalStorage::new(&window);
    let randomizer = Rc::new(FlagRandomizer::new(
        config,
        page,
        store,
        StdRng::from_entropy(),
    ));

    let click = trigger_click_listener(&document, Rc::clone(&randomizer));
    let (observer, on_mutations) = observe_body(&body, Rc::clone(&randomizer))?;
    randomizer.install();

    let panel = Rc::new(RefCell::new(None));
    let ready = if document.ready_state() == "loading" {
        let randomizer = Rc::clone(&randomizer);
        let slot = Rc::clone(&panel);
        let doc = document.clone();
        Some(EventListener::once(&document, "DOMContentLoaded", move |_| {
            mount_panel_into(&slot, &doc, &randomizer);
        }))
    } else {
        mount_panel_into(&panel, &document, &randomizer);
        None
    };

    INSTALLATION.with(|i| {
        *i.borrow_mut() = Some(Installation {
            _randomizer: randomizer,
            _click: click,
            _observer: observer,
            _on_mutations: on_mutations,
            _panel: panel,
            _ready: ready,
        });
    });
    Ok(())
}

// ── Trigger clicks ─────────────────────────────────────────────────

/// Capture-phase listener so the page's own handlers never see trigger clicks.
pub fn trigger_click_listener<S>(
    document: &Document,
    randomizer: Rc<FlagRandomizer<WebPage, S, StdRng>>,
) -> EventListener
where
    S: KeyValueStore + 'static,
{
    let class = randomizer.config().trigger_class.clone();
    EventListener::new_with_options(
        document,
        "click",
        EventListenerOptions {
            phase: EventListenerPhase::Capture,
            passive: false,
        },
        move |event: &Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            if !target.class_list().contains(&class) {
                return;
            }
            event.prevent_default();
            event.stop_propagation();
            event.stop_immediate_propagation();

            let outcome = randomizer.handle_trigger_click();
            log::debug!("trigger click: {:?}", outcome);
        },
    )
}

// ── Mutation observer ──────────────────────────────────────────────

fn observe_body(
    body: &HtmlElement,
    randomizer: Rc<WebRandomizer>,
) -> Result<(MutationObserver, MutationCallback), JsValue> {
    let selector: Rc<str> = Rc::from(randomizer.config().widget_selector.as_str());
    let callback: MutationCallback = Closure::new(
        move |records: js_sys::Array, _observer: MutationObserver| {
            let batch = dom::mutation_records(&records, &selector);
            randomizer.handle_mutations(&batch);
        },
    );

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(body, &init)?;
    Ok((observer, callback))
}

// ── Settings panel ─────────────────────────────────────────────────

fn mount_panel_into(
    slot: &RefCell<Option<PanelMount>>,
    document: &Document,
    randomizer: &Rc<WebRandomizer>,
) {
    match mount_panel(document, randomizer) {
        Ok(mount) => *slot.borrow_mut() = Some(mount),
        Err(e) => log::warn!("settings panel not built: {}", describe_js(&e)),
    }
}

fn mount_panel(document: &Document, randomizer: &Rc<WebRandomizer>) -> Result<PanelMount, JsValue> {
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    let panel = Rc::new(RefCell::new(randomizer.build_settings_panel()));

    let root = document.create_element("div")?;
    root.set_class_name("flag-randomizer-panel");
    root.set_inner_html(&randomizer.panel_request(&mut panel.borrow_mut(), "GET", "/panel", ""));
    body.append_child(&root)?;

    // Buttons: open, close, select-all, clear-all, clear-group.
    let on_click = {
        let randomizer = Rc::clone(randomizer);
        let panel = Rc::clone(&panel);
        let root_for_swap = root.clone();
        EventListener::new(&root, "click", move |event: &Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            if target.tag_name() != "BUTTON" {
                return;
            }
            if let Some(route) = target.get_attribute("data-route") {
                swap_panel(&root_for_swap, &randomizer, &panel, &route, "");
            }
        })
    };

    // Checkboxes: preference toggles and checklist entries.
    let on_change = {
        let randomizer = Rc::clone(randomizer);
        let panel = Rc::clone(&panel);
        let root_for_swap = root.clone();
        EventListener::new(&root, "change", move |event: &Event| {
            let Some(input) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            let Some(route) = input.get_attribute("data-route") else {
                return;
            };
            let body = format!(
                "value={}&checked={}",
                String::from(js_sys::encode_uri_component(&input.value())),
                input.checked()
            );
            swap_panel(&root_for_swap, &randomizer, &panel, &route, &body);
        })
    };

    Ok(PanelMount {
        _root: root,
        _listeners: [on_click, on_change],
    })
}

/// Send one panel request and replace the panel markup, keeping the
/// checklist's scroll position.
fn swap_panel(
    root: &Element,
    randomizer: &WebRandomizer,
    panel: &RefCell<SettingsPanel>,
    route: &str,
    body: &str,
) {
    let scroll = checklist(root).map(|list| list.scroll_top());
    let html = randomizer.panel_request(&mut panel.borrow_mut(), "POST", route, body);
    root.set_inner_html(&html);
    if let (Some(top), Some(list)) = (scroll, checklist(root)) {
        list.set_scroll_top(top);
    }
}

fn checklist(root: &Element) -> Option<Element> {
    root.query_selector(".flag-randomizer-checklist")
        .ok()
        .flatten()
}
