//! `window.localStorage` as a `KeyValueStore`.

use web_sys::{Storage, Window};

use super::describe_js;
use crate::error::StoreError;
use crate::store::KeyValueStore;

pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    /// Storage can be missing (privacy modes, sandboxed frames); every
    /// access then fails with `StoreError::Unavailable`.
    pub fn new(window: &Window) -> Self {
        let storage = match window.local_storage() {
            Ok(storage) => storage,
            Err(e) => {
                log::warn!("localStorage unavailable: {}", describe_js(&e));
                None
            }
        };
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StoreError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("localStorage is disabled".to_string()))
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?.get_item(key).map_err(|e| StoreError::Read {
            key: key.to_string(),
            reason: describe_js(&e),
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?.set_item(key, value).map_err(|e| StoreError::Write {
            key: key.to_string(),
            reason: describe_js(&e),
        })
    }
}
