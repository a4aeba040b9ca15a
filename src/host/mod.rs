//! Host document abstraction.
//!
//! The core never touches `web_sys` directly. It sees the page through
//! three capabilities: enumerating selector widgets, classifying nodes
//! added by a mutation, and showing a user-visible message. The browser
//! implementation lives in `crate::web`; `memory` backs tests and other
//! headless uses.

pub mod memory;

use crate::error::HostError;

pub use memory::{MemoryNode, MemoryPage, MemoryWidget};

/// The clickable control inserted right after a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerAffordance {
    /// Shared with the widget through `correlation_attribute`.
    pub correlation_id: String,
    pub correlation_attribute: String,
    pub class_name: String,
    pub label: String,
    pub title: String,
}

/// A live flag-choice control owned by the document.
pub trait SelectorWidget {
    /// `(value, display text)` for each option, in document order.
    fn options(&self) -> Vec<(String, String)>;
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str) -> Result<(), HostError>;
    /// Insert `trigger` as the widget's next sibling.
    fn insert_trigger_after(&self, trigger: &TriggerAffordance) -> Result<(), HostError>;
}

/// The document the widgets live in.
pub trait PageHost {
    type Widget: SelectorWidget;

    /// Every widget currently in the document, in document order.
    fn widgets(&self) -> Vec<Self::Widget>;
    fn alert(&self, message: &str);
}

/// A node reported as added by a subtree mutation.
pub trait AddedNode {
    type Widget: SelectorWidget;

    /// The node itself, when it is a selector widget.
    fn as_widget(&self) -> Option<Self::Widget>;
    fn descendant_widgets(&self) -> Vec<Self::Widget>;
}

/// One mutation record: the nodes it added.
#[derive(Debug, Clone)]
pub struct MutationRecord<N> {
    pub added_nodes: Vec<N>,
}

impl<N> MutationRecord<N> {
    pub fn new(added_nodes: Vec<N>) -> Self {
        Self { added_nodes }
    }
}
