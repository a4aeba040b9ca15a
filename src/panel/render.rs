//! HTML rendering for the settings panel.
//!
//! Every interactive element carries a `data-route` attribute naming the
//! panel request the browser layer sends when it is clicked or changed.

use super::SettingsPanel;
use super::form::escape_html;
use crate::config::Config;
use crate::store::{KeyValueStore, Preferences};

const OPEN_BUTTON_STYLE: &str = "top:150px;right:10px;position:absolute;z-index:9999;";
const CONTAINER_STYLE: &str = "top:150px;right:10px;position:absolute;background:#fff;border:1px solid #000;padding:10px;z-index:10000;max-height:80vh;overflow-y:auto;";
const TOGGLE_BOX_STYLE: &str = "margin:10px 0;padding:10px;background:#f0f0f0;border:1px solid #ccc;";
const CHECKLIST_STYLE: &str =
    "max-height:400px;overflow-y:auto;border:1px solid #ccc;padding:5px;background:#fff;";

/// `"3 flags selected"`, with the reason nothing will be randomized when
/// that applies.
pub fn status_line(eligible_count: usize, enabled: bool) -> String {
    let mut status = format!(
        "{} flag{} selected",
        eligible_count,
        if eligible_count == 1 { "" } else { "s" }
    );
    if !enabled {
        status.push_str(" (Randomization disabled)");
    } else if eligible_count == 0 {
        status.push_str(" (Using site default)");
    }
    status
}

pub(super) fn render_panel<S: KeyValueStore>(
    panel: &SettingsPanel,
    prefs: &Preferences<S>,
    config: &Config,
) -> String {
    if !panel.is_open() {
        return format!(
            r#"<button type="button" class="flag-randomizer-open" data-route="/panel/open" style="{}">Flag Randomizer Options</button>"#,
            OPEN_BUTTON_STYLE
        );
    }

    let enabled = prefs.is_enabled();
    let mut html = String::with_capacity(4096 + panel.entries().len() * 160);

    html.push_str(&format!(
        r#"<div class="flag-randomizer-settings" style="{}">"#,
        CONTAINER_STYLE
    ));

    // Header
    html.push_str(r#"<div style="margin-bottom:10px;"><strong>Flag Randomizer Settings</strong>"#);
    html.push_str(
        r#"<button type="button" data-route="/panel/close" style="float:right;cursor:pointer;">X</button></div>"#,
    );

    // Preference toggles
    html.push_str(&render_toggle(
        "/panel/enabled",
        enabled,
        "Enable Randomization",
        "font-weight:bold;cursor:pointer;",
    ));
    html.push_str(&render_toggle(
        "/panel/prevent-duplicates",
        prefs.prevent_duplicates(),
        "Prevent same flag twice in a row",
        "cursor:pointer;",
    ));

    html.push_str(&format!(
        r#"<div class="flag-randomizer-status" style="margin:10px 0;font-style:italic;">{}</div>"#,
        status_line(prefs.load_eligible_set().len(), enabled)
    ));

    // Bulk controls
    html.push_str(r#"<div style="margin-bottom:10px;">"#);
    html.push_str(r#"<button type="button" data-route="/panel/select-all">Select All</button>"#);
    html.push_str(
        r#"<button type="button" data-route="/panel/clear-all" style="margin-left:5px;">Clear All</button>"#,
    );
    for group in &config.choice_groups {
        html.push_str(&format!(
            r#"<button type="button" data-route="/panel/clear/{}" style="margin-left:5px;">{}</button>"#,
            escape_html(&group.key),
            escape_html(&group.label)
        ));
    }
    html.push_str("</div>");

    // Checklist
    html.push_str(&format!(
        r#"<div class="flag-randomizer-checklist" style="{}">"#,
        CHECKLIST_STYLE
    ));
    for entry in panel.entries() {
        html.push_str(&format!(
            r#"<div style="margin:2px 0;"><label style="cursor:pointer;"><input type="checkbox" class="flag-checkbox" data-route="/panel/choice" value="{}"{}> {} ({})</label></div>"#,
            escape_html(&entry.choice.value),
            if entry.checked { " checked" } else { "" },
            escape_html(&entry.choice.label),
            escape_html(&entry.choice.value)
        ));
    }
    html.push_str("</div>");

    html.push_str("</div>");
    html
}

fn render_toggle(route: &str, checked: bool, text: &str, label_style: &str) -> String {
    format!(
        r#"<div style="{}"><label style="{}"><input type="checkbox" data-route="{}" style="margin-right:5px;"{}>{}</label></div>"#,
        TOGGLE_BOX_STYLE,
        label_style,
        route,
        if checked { " checked" } else { "" },
        text
    )
}

pub(super) fn error(message: &str) -> String {
    format!(
        r#"<div class="flag-randomizer-error" style="color:#c00;">{}</div>"#,
        escape_html(message)
    )
}

pub(super) fn not_found() -> String {
    r#"<span class="flag-randomizer-error">404 — route not found</span>"#.to_string()
}

pub(super) fn method_not_allowed() -> String {
    r#"<span class="flag-randomizer-error">405 — method not allowed</span>"#.to_string()
}
