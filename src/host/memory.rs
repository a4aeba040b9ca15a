//! In-memory page: widgets, mutations and alerts without a browser.
//!
//! Widgets share state through `Rc<RefCell<_>>` so a test can keep a
//! handle to a widget the page also holds, the same way JS code keeps a
//! reference to a live element.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{AddedNode, MutationRecord, PageHost, SelectorWidget, TriggerAffordance};
use crate::error::HostError;

#[derive(Debug, Default)]
struct WidgetState {
    options: Vec<(String, String)>,
    value: String,
    attributes: HashMap<String, String>,
    triggers: Vec<TriggerAffordance>,
    assigned: Vec<String>,
    detached: bool,
    reject_attributes: bool,
}

/// A `<select>` stand-in.
#[derive(Debug, Clone, Default)]
pub struct MemoryWidget(Rc<RefCell<WidgetState>>);

impl MemoryWidget {
    /// A widget with the given `(value, label)` options; the first option
    /// starts selected, as a `<select>` does.
    pub fn with_options(options: &[(&str, &str)]) -> Self {
        let options: Vec<(String, String)> = options
            .iter()
            .map(|(v, l)| (v.to_string(), l.to_string()))
            .collect();
        let value = options.first().map(|(v, _)| v.clone()).unwrap_or_default();
        Self(Rc::new(RefCell::new(WidgetState {
            options,
            value,
            ..WidgetState::default()
        })))
    }

    /// Triggers inserted after this widget.
    pub fn triggers(&self) -> Vec<TriggerAffordance> {
        self.0.borrow().triggers.clone()
    }

    /// Every value ever assigned through `set_value`, oldest first.
    pub fn assigned_values(&self) -> Vec<String> {
        self.0.borrow().assigned.clone()
    }

    /// Remove the widget's parent so trigger insertion fails.
    pub fn detach(&self) {
        self.0.borrow_mut().detached = true;
    }

    pub fn reattach(&self) {
        self.0.borrow_mut().detached = false;
    }

    /// Make `set_attribute` fail, as the DOM does for an invalid name.
    pub fn fail_attribute_writes(&self, fail: bool) {
        self.0.borrow_mut().reject_attributes = fail;
    }

    pub fn same_widget(&self, other: &MemoryWidget) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl SelectorWidget for MemoryWidget {
    fn options(&self) -> Vec<(String, String)> {
        self.0.borrow().options.clone()
    }

    fn value(&self) -> String {
        self.0.borrow().value.clone()
    }

    /// Unknown values clear the selection, matching `HTMLSelectElement`.
    fn set_value(&self, value: &str) {
        let mut state = self.0.borrow_mut();
        state.assigned.push(value.to_string());
        state.value = if state.options.iter().any(|(v, _)| v == value) {
            value.to_string()
        } else {
            String::new()
        };
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), HostError> {
        let mut state = self.0.borrow_mut();
        if state.reject_attributes {
            return Err(HostError::Js(format!("InvalidCharacterError: `{}`", name)));
        }
        state.attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn insert_trigger_after(&self, trigger: &TriggerAffordance) -> Result<(), HostError> {
        let mut state = self.0.borrow_mut();
        if state.detached {
            return Err(HostError::Detached);
        }
        state.triggers.push(trigger.clone());
        Ok(())
    }
}

/// A node handed to the mutation watcher.
#[derive(Debug, Clone, Default)]
pub struct MemoryNode {
    widget: Option<MemoryWidget>,
    descendants: Vec<MemoryWidget>,
}

impl MemoryNode {
    /// A node that is itself a selector widget.
    pub fn widget(widget: MemoryWidget) -> Self {
        Self {
            widget: Some(widget),
            descendants: Vec::new(),
        }
    }

    /// A container (e.g. a quick-reply form) holding widgets.
    pub fn containing(descendants: Vec<MemoryWidget>) -> Self {
        Self {
            widget: None,
            descendants,
        }
    }

    /// An unrelated node such as a post body.
    pub fn other() -> Self {
        Self::default()
    }

    fn all_widgets(&self) -> impl Iterator<Item = &MemoryWidget> {
        self.widget.iter().chain(self.descendants.iter())
    }
}

impl AddedNode for MemoryNode {
    type Widget = MemoryWidget;

    fn as_widget(&self) -> Option<MemoryWidget> {
        self.widget.clone()
    }

    fn descendant_widgets(&self) -> Vec<MemoryWidget> {
        self.descendants.clone()
    }
}

#[derive(Debug, Default)]
struct PageState {
    widgets: RefCell<Vec<MemoryWidget>>,
    alerts: RefCell<Vec<String>>,
}

/// A document holding `MemoryWidget`s. Cloning shares the document.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage(Rc<PageState>);

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a widget in the document without reporting a mutation.
    pub fn add_widget(&self, widget: MemoryWidget) {
        self.0.widgets.borrow_mut().push(widget);
    }

    /// Add `nodes` to the document and return the matching mutation record.
    pub fn insert(&self, nodes: Vec<MemoryNode>) -> MutationRecord<MemoryNode> {
        {
            let mut widgets = self.0.widgets.borrow_mut();
            for node in &nodes {
                widgets.extend(node.all_widgets().cloned());
            }
        }
        MutationRecord::new(nodes)
    }

    /// Messages shown through `alert`, oldest first.
    pub fn alerts(&self) -> Vec<String> {
        self.0.alerts.borrow().clone()
    }
}

impl PageHost for MemoryPage {
    type Widget = MemoryWidget;

    fn widgets(&self) -> Vec<MemoryWidget> {
        self.0.widgets.borrow().clone()
    }

    fn alert(&self, message: &str) {
        self.0.alerts.borrow_mut().push(message.to_string());
    }
}
