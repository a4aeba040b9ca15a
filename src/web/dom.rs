//! `web-sys` implementation of the host traits.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlOptionElement, HtmlSelectElement, Node, NodeList,
};

use super::describe_js;
use crate::error::HostError;
use crate::host::{AddedNode, MutationRecord, PageHost, SelectorWidget, TriggerAffordance};

const TRIGGER_STYLE: &str = "margin-left:5px;cursor:pointer;";

fn js_error(e: wasm_bindgen::JsValue) -> HostError {
    HostError::Js(describe_js(&e))
}

fn select_elements(list: &NodeList) -> Vec<WebWidget> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlSelectElement>().ok())
        .map(WebWidget)
        .collect()
}

// ── Page ───────────────────────────────────────────────────────────

pub struct WebPage {
    document: Document,
    selector: Rc<str>,
}

impl WebPage {
    pub fn new(document: Document, selector: &str) -> Self {
        Self {
            document,
            selector: Rc::from(selector),
        }
    }
}

impl PageHost for WebPage {
    type Widget = WebWidget;

    fn widgets(&self) -> Vec<WebWidget> {
        match self.document.query_selector_all(&self.selector) {
            Ok(list) => select_elements(&list),
            Err(e) => {
                log::warn!("widget query `{}` failed: {}", self.selector, describe_js(&e));
                Vec::new()
            }
        }
    }

    fn alert(&self, message: &str) {
        gloo::dialogs::alert(message);
    }
}

// ── Widget ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct WebWidget(HtmlSelectElement);

impl SelectorWidget for WebWidget {
    fn options(&self) -> Vec<(String, String)> {
        let Ok(list) = self.0.query_selector_all("option") else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<HtmlOptionElement>().ok())
            .map(|option| (option.value(), option.text_content().unwrap_or_default()))
            .collect()
    }

    fn value(&self) -> String {
        self.0.value()
    }

    fn set_value(&self, value: &str) {
        self.0.set_value(value);
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), HostError> {
        self.0.set_attribute(name, value).map_err(js_error)
    }

    fn insert_trigger_after(&self, trigger: &TriggerAffordance) -> Result<(), HostError> {
        let parent = self.0.parent_node().ok_or(HostError::Detached)?;
        let document = self.0.owner_document().ok_or(HostError::Detached)?;

        let button: HtmlButtonElement = document
            .create_element("button")
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| HostError::Js("created element is not a button".to_string()))?;
        button.set_type("button");
        button.set_text_content(Some(trigger.label.as_str()));
        button.set_title(&trigger.title);
        button.set_class_name(&trigger.class_name);
        button.set_attribute("style", TRIGGER_STYLE).map_err(js_error)?;
        button
            .set_attribute(&trigger.correlation_attribute, &trigger.correlation_id)
            .map_err(js_error)?;

        parent
            .insert_before(&button, self.0.next_sibling().as_ref())
            .map_err(js_error)?;
        Ok(())
    }
}

// ── Mutations ──────────────────────────────────────────────────────

/// An element node from a `MutationRecord`'s `addedNodes`.
pub struct WebNode {
    element: Element,
    selector: Rc<str>,
}

impl AddedNode for WebNode {
    type Widget = WebWidget;

    fn as_widget(&self) -> Option<WebWidget> {
        if !self.element.matches(&self.selector).unwrap_or(false) {
            return None;
        }
        self.element
            .clone()
            .dyn_into::<HtmlSelectElement>()
            .ok()
            .map(WebWidget)
    }

    fn descendant_widgets(&self) -> Vec<WebWidget> {
        self.element
            .query_selector_all(&self.selector)
            .map(|list| select_elements(&list))
            .unwrap_or_default()
    }
}

/// Convert an observer callback's records, keeping only element nodes.
pub fn mutation_records(records: &js_sys::Array, selector: &Rc<str>) -> Vec<MutationRecord<WebNode>> {
    records
        .iter()
        .filter_map(|r| r.dyn_into::<web_sys::MutationRecord>().ok())
        .map(|record| {
            let added = record.added_nodes();
            let nodes = (0..added.length())
                .filter_map(|i| added.item(i))
                .filter(|node| node.node_type() == Node::ELEMENT_NODE)
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .map(|element| WebNode {
                    element,
                    selector: Rc::clone(selector),
                })
                .collect();
            MutationRecord::new(nodes)
        })
        .collect()
}
