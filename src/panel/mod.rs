//! Settings panel — the checklist model and its request router.
//!
//! The browser layer forwards every panel interaction as a small request
//! (`method`, `path`, form-encoded `body`) and swaps the returned HTML
//! fragment into the panel root:
//!
//! ```text
//! GET  /panel                      re-render
//! POST /panel/open | /panel/close  show or hide the settings box
//! POST /panel/enabled              checked=true|false
//! POST /panel/prevent-duplicates   checked=true|false
//! POST /panel/choice               value={id}&checked=true|false
//! POST /panel/select-all
//! POST /panel/clear-all
//! POST /panel/clear/{group}        uncheck a configured choice group
//! ```
//!
//! The checklist, not the stored set, is authoritative for edits: each
//! checklist or bulk edit recomputes the eligible set from the checked
//! entries and saves it whole. No edit re-rolls the widgets.

pub mod form;
mod render;

use rand::Rng;

use crate::app::FlagRandomizer;
use crate::choices::{self, ChoiceDescriptor};
use crate::config::{ChoiceGroup, Config};
use crate::host::PageHost;
use crate::store::{KeyValueStore, Preferences};
use form::{get_bool, get_param, parse_form_body};

pub use render::status_line;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistEntry {
    pub choice: ChoiceDescriptor,
    pub checked: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SettingsPanel {
    entries: Vec<ChecklistEntry>,
    open: bool,
}

#[derive(Clone, Copy)]
enum Route {
    Render,
    Open,
    Close,
    Enabled,
    PreventDuplicates,
    Choice,
    SelectAll,
    ClearAll,
    ClearGroup,
}

impl SettingsPanel {
    /// A closed panel listing `choices`, checked where present in `eligible`.
    pub fn new(choices: Vec<ChoiceDescriptor>, eligible: &[String]) -> Self {
        let entries = choices
            .into_iter()
            .map(|choice| {
                let checked = eligible.contains(&choice.value);
                ChecklistEntry { choice, checked }
            })
            .collect();
        Self {
            entries,
            open: false,
        }
    }

    pub fn entries(&self) -> &[ChecklistEntry] {
        &self.entries
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Checked identifiers in checklist order.
    pub fn selection(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.checked)
            .map(|e| e.choice.value.clone())
            .collect()
    }

    // ── Checklist edits ────────────────────────────────────────────

    /// Returns false when no entry has `value`.
    pub fn set_checked(&mut self, value: &str, checked: bool) -> bool {
        let mut found = false;
        for entry in self.entries.iter_mut().filter(|e| e.choice.value == value) {
            entry.checked = checked;
            found = true;
        }
        found
    }

    pub fn select_all(&mut self) {
        self.entries.iter_mut().for_each(|e| e.checked = true);
    }

    pub fn clear_all(&mut self) {
        self.entries.iter_mut().for_each(|e| e.checked = false);
    }

    pub fn clear_group(&mut self, group: &ChoiceGroup) {
        self.entries
            .iter_mut()
            .filter(|e| group.contains(&e.choice.value))
            .for_each(|e| e.checked = false);
    }

    // ── Requests ───────────────────────────────────────────────────

    /// Apply one panel interaction and return the re-rendered panel.
    pub fn handle_request<S: KeyValueStore>(
        &mut self,
        prefs: &Preferences<S>,
        config: &Config,
        method: &str,
        path: &str,
        body: &str,
    ) -> String {
        let mut router = matchit::Router::new();
        router.insert("/panel", Route::Render).ok();
        router.insert("/panel/open", Route::Open).ok();
        router.insert("/panel/close", Route::Close).ok();
        router.insert("/panel/enabled", Route::Enabled).ok();
        router.insert("/panel/prevent-duplicates", Route::PreventDuplicates).ok();
        router.insert("/panel/choice", Route::Choice).ok();
        router.insert("/panel/select-all", Route::SelectAll).ok();
        router.insert("/panel/clear-all", Route::ClearAll).ok();
        router.insert("/panel/clear/{group}", Route::ClearGroup).ok();

        let matched = match router.at(path) {
            Ok(matched) => matched,
            Err(_) => return render::not_found(),
        };
        let params = parse_form_body(body);

        match (*matched.value, method) {
            (Route::Render, "GET") => {}
            (Route::Open, "POST") => self.open = true,
            (Route::Close, "POST") => self.open = false,
            (Route::Enabled, "POST") => prefs.set_enabled(get_bool(&params, "checked")),
            (Route::PreventDuplicates, "POST") => {
                prefs.set_prevent_duplicates(get_bool(&params, "checked"))
            }
            (Route::Choice, "POST") => {
                let value = match get_param(&params, "value") {
                    Some(v) if !v.is_empty() => v,
                    _ => return self.render_with_error(prefs, config, "Missing value parameter"),
                };
                if !self.set_checked(value, get_bool(&params, "checked")) {
                    let message = format!("Unknown flag {}", value);
                    return self.render_with_error(prefs, config, &message);
                }
                prefs.save_eligible_set(&self.selection());
            }
            (Route::SelectAll, "POST") => {
                self.select_all();
                prefs.save_eligible_set(&self.selection());
            }
            (Route::ClearAll, "POST") => {
                self.clear_all();
                prefs.save_eligible_set(&self.selection());
            }
            (Route::ClearGroup, "POST") => {
                let key = matched.params.get("group").unwrap_or("");
                let Some(group) = config.group(key) else {
                    let message = format!("Unknown flag group {}", key);
                    return self.render_with_error(prefs, config, &message);
                };
                self.clear_group(group);
                prefs.save_eligible_set(&self.selection());
            }
            _ => return render::method_not_allowed(),
        }

        self.render(prefs, config)
    }

    pub fn render<S: KeyValueStore>(&self, prefs: &Preferences<S>, config: &Config) -> String {
        render::render_panel(self, prefs, config)
    }

    /// The panel with an error line above it, so the panel root keeps its content.
    fn render_with_error<S: KeyValueStore>(
        &self,
        prefs: &Preferences<S>,
        config: &Config,
        message: &str,
    ) -> String {
        let mut html = render::error(message);
        html.push_str(&self.render(prefs, config));
        html
    }
}

impl<H, S, R> FlagRandomizer<H, S, R>
where
    H: PageHost,
    S: KeyValueStore,
    R: Rng,
{
    /// Build the panel from the first widget in the document. With no
    /// widget present the checklist is empty.
    pub fn build_settings_panel(&self) -> SettingsPanel {
        let choices = self
            .host
            .widgets()
            .first()
            .map(choices::extract)
            .unwrap_or_default();
        SettingsPanel::new(choices, &self.prefs.load_eligible_set())
    }

    /// `SettingsPanel::handle_request` against this instance's settings.
    pub fn panel_request(
        &self,
        panel: &mut SettingsPanel,
        method: &str,
        path: &str,
        body: &str,
    ) -> String {
        panel.handle_request(&self.prefs, &self.config, method, path, body)
    }
}
