//! Persistent preferences — typed accessors over a string key-value store.
//!
//! Four logical settings live under four independent keys:
//!
//! ```text
//! eligible            JSON array of choice identifiers   absent → []
//! enabled             "true" / "false"                    absent → enabled
//! prevent_duplicates  "true" / "false"                    absent → off
//! last_roll           raw identifier                      absent → None
//! ```
//!
//! Every accessor is infallible for its caller: backend failures are
//! logged and replaced by the default (reads) or dropped (writes).

pub mod memory;

use std::rc::Rc;

use crate::config::StorageKeys;
use crate::error::StoreError;

pub use memory::MemoryStore;

/// Minimal synchronous key-value capability (`localStorage`-shaped).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Typed view of the four persisted settings.
pub struct Preferences<S> {
    store: S,
    keys: StorageKeys,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Eligible set ───────────────────────────────────────────────

    /// The persisted eligible set, or empty when absent or unreadable.
    pub fn load_eligible_set(&self) -> Vec<String> {
        self.try_load_eligible_set().unwrap_or_else(|e| {
            log::warn!("{}; treating eligible set as empty", e);
            Vec::new()
        })
    }

    fn try_load_eligible_set(&self) -> Result<Vec<String>, StoreError> {
        let key = &self.keys.eligible;
        match self.store.get(key)? {
            Some(raw) if !raw.is_empty() => {
                serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                    key: key.clone(),
                    source,
                })
            }
            _ => Ok(Vec::new()),
        }
    }

    pub fn save_eligible_set(&self, choices: &[String]) {
        let result = serde_json::to_string(choices)
            .map_err(|source| StoreError::Corrupt {
                key: self.keys.eligible.clone(),
                source,
            })
            .and_then(|json| self.store.set(&self.keys.eligible, &json));
        if let Err(e) = result {
            log::warn!("{}; eligible set not saved", e);
        }
    }

    pub fn clear_eligible_set(&self) {
        self.save_eligible_set(&[]);
    }

    // ── Flags ──────────────────────────────────────────────────────

    /// Randomization is opt-out: enabled until explicitly turned off.
    pub fn is_enabled(&self) -> bool {
        self.read_flag(&self.keys.enabled, true)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.write(&self.keys.enabled, if enabled { "true" } else { "false" });
    }

    pub fn prevent_duplicates(&self) -> bool {
        self.read_flag(&self.keys.prevent_duplicates, false)
    }

    pub fn set_prevent_duplicates(&self, prevent: bool) {
        self.write(
            &self.keys.prevent_duplicates,
            if prevent { "true" } else { "false" },
        );
    }

    // ── Last roll ──────────────────────────────────────────────────

    pub fn last_roll(&self) -> Option<String> {
        self.store.get(&self.keys.last_roll).unwrap_or_else(|e| {
            log::warn!("{}", e);
            None
        })
    }

    pub fn set_last_roll(&self, choice: &str) {
        self.write(&self.keys.last_roll, choice);
    }

    // ── Helpers ────────────────────────────────────────────────────

    /// Absent keys yield `default`; any stored value other than
    /// `"true"` reads as false.
    fn read_flag(&self, key: &str, default: bool) -> bool {
        match self.store.get(key) {
            Ok(Some(raw)) => raw == "true",
            Ok(None) => default,
            Err(e) => {
                log::warn!("{}; using default {}", e, default);
                default
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            log::warn!("{}; write dropped", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> Preferences<MemoryStore> {
        Preferences::new(MemoryStore::new(), StorageKeys::default())
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fresh_store_uses_defaults() {
        let p = prefs();
        assert!(p.load_eligible_set().is_empty());
        assert!(p.is_enabled());
        assert!(!p.prevent_duplicates());
        assert_eq!(p.last_roll(), None);
    }

    #[test]
    fn eligible_set_roundtrip_keeps_order_and_duplicates() {
        let p = prefs();
        let set = strings(&["PP", "HT", "PP"]);
        p.save_eligible_set(&set);
        assert_eq!(p.load_eligible_set(), set);
        assert_eq!(
            p.store().raw("flagRandomizerEligibleFlags").as_deref(),
            Some(r#"["PP","HT","PP"]"#)
        );
    }

    #[test]
    fn clear_eligible_set_persists_empty_array() {
        let p = prefs();
        p.save_eligible_set(&strings(&["AB"]));
        p.clear_eligible_set();
        assert!(p.load_eligible_set().is_empty());
        assert_eq!(p.store().raw("flagRandomizerEligibleFlags").as_deref(), Some("[]"));
    }

    #[test]
    fn corrupt_eligible_set_reads_as_empty() {
        let p = prefs();
        for raw in ["not json", "{\"a\":1}", "[1,2]", "\"HT\""] {
            p.store().insert_raw("flagRandomizerEligibleFlags", raw);
            assert!(p.load_eligible_set().is_empty(), "raw value {raw:?}");
        }
    }

    #[test]
    fn empty_string_eligible_set_reads_as_empty() {
        let p = prefs();
        p.store().insert_raw("flagRandomizerEligibleFlags", "");
        assert!(p.load_eligible_set().is_empty());
    }

    #[test]
    fn flags_are_stored_as_strings() {
        let p = prefs();
        p.set_enabled(false);
        p.set_prevent_duplicates(true);
        assert!(!p.is_enabled());
        assert!(p.prevent_duplicates());
        assert_eq!(p.store().raw("flagRandomizerEnabled").as_deref(), Some("false"));
        assert_eq!(
            p.store().raw("flagRandomizerPreventDuplicates").as_deref(),
            Some("true")
        );
    }

    #[test]
    fn unexpected_flag_value_reads_false() {
        let p = prefs();
        p.store().insert_raw("flagRandomizerEnabled", "yes");
        assert!(!p.is_enabled());
    }

    #[test]
    fn last_roll_is_raw() {
        let p = prefs();
        p.set_last_roll("TFH");
        assert_eq!(p.last_roll().as_deref(), Some("TFH"));
        assert_eq!(p.store().raw("flagRandomizerLastRoll").as_deref(), Some("TFH"));
    }

    #[test]
    fn read_failures_fall_back_to_defaults() {
        let p = prefs();
        p.set_enabled(false);
        p.set_prevent_duplicates(true);
        p.set_last_roll("HT");
        p.save_eligible_set(&strings(&["HT"]));

        p.store().fail_reads(true);
        assert!(p.is_enabled());
        assert!(!p.prevent_duplicates());
        assert_eq!(p.last_roll(), None);
        assert!(p.load_eligible_set().is_empty());
    }

    #[test]
    fn write_failures_are_dropped() {
        let p = prefs();
        p.store().fail_writes(true);
        p.set_enabled(false);
        p.save_eligible_set(&strings(&["HT"]));
        p.set_last_roll("HT");

        p.store().fail_writes(false);
        assert!(p.is_enabled());
        assert!(p.load_eligible_set().is_empty());
        assert_eq!(p.last_roll(), None);
    }

    #[test]
    fn custom_keys_are_independent() {
        let keys = StorageKeys {
            eligible: "e".into(),
            enabled: "on".into(),
            prevent_duplicates: "dup".into(),
            last_roll: "last".into(),
        };
        let p = Preferences::new(MemoryStore::new(), keys);
        p.set_enabled(false);
        assert_eq!(p.store().raw("on").as_deref(), Some("false"));
        assert_eq!(p.store().raw("flagRandomizerEnabled"), None);
    }
}
