//! Choice extraction — a widget's options as `(identifier, label)` pairs.

use crate::host::SelectorWidget;

/// One selectable flag as offered by a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceDescriptor {
    /// The option's `value`; this is what gets persisted.
    pub value: String,
    /// The option's text content.
    pub label: String,
}

/// Read every option of `widget`, in document order.
pub fn extract<W: SelectorWidget>(widget: &W) -> Vec<ChoiceDescriptor> {
    widget
        .options()
        .into_iter()
        .map(|(value, label)| ChoiceDescriptor { value, label })
        .collect()
}
