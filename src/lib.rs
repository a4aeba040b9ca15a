//! Flag randomizer for board flag selector widgets.
//!
//! Keeps a persisted set of eligible flags, rolls one at random (optionally
//! never the same flag twice in a row) and applies it to every
//! `select.flagSelector` on the page, including selectors that appear later
//! (quick reply, thread expansion). Each selector gets a 🎲 button for
//! re-rolling, and a settings panel edits the eligible set.
//!
//! The core is host-agnostic: `FlagRandomizer` is generic over the page
//! (`host::PageHost`), the persistence layer (`store::KeyValueStore`) and
//! the RNG. In the browser the `web` module binds it to the DOM and
//! `localStorage`; natively it runs against the in-memory implementations.
//!
//! Exports `install()` and `installWithConfig(json)` for the userscript
//! loader to call once the page body exists.

pub mod app;
pub mod choices;
pub mod config;
pub mod error;
pub mod host;
pub mod panel;
pub mod randomizer;
pub mod store;
pub mod sync;
pub mod trigger;
pub mod watcher;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::FlagRandomizer;
pub use config::Config;
pub use randomizer::pick_one;
pub use trigger::TriggerOutcome;
pub use watcher::{BatchOutcome, WatcherState};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Install with the default configuration.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn install() -> Result<(), JsValue> {
    web::install(Config::default())
}

/// Install with a JSON configuration override, e.g.
/// `{"max_roll_attempts": 20, "log_level": "debug"}`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = installWithConfig)]
pub fn install_with_config(config_json: &str) -> Result<(), JsValue> {
    let config = Config::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    web::install(config)
}
