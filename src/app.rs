//! The randomizer instance shared by every entry point.
//!
//! One `FlagRandomizer` is built at install time and handed out by
//! reference (in the browser, through an `Rc`) to the install path, the
//! mutation callback and the trigger click handler. All methods take
//! `&self`; the RNG and the small amount of mutable bookkeeping sit in
//! `RefCell`/`Cell` since everything runs on the page's single UI thread.
//!
//! Behaviour is split across modules by concern:
//! - `randomizer` — picking and broadcasting values
//! - `sync` — trigger attachment and bulk processing
//! - `watcher` — reacting to inserted widgets
//! - `trigger` — user-initiated re-rolls
//! - `panel` — the settings surface

use std::cell::{Cell, RefCell};

use rand::Rng;

use crate::config::Config;
use crate::host::PageHost;
use crate::store::{KeyValueStore, Preferences};
use crate::watcher::WatcherState;

pub struct FlagRandomizer<H, S, R> {
    pub(crate) config: Config,
    pub(crate) host: H,
    pub(crate) prefs: Preferences<S>,
    pub(crate) rng: RefCell<R>,
    pub(crate) next_trigger_seq: Cell<u64>,
    pub(crate) watcher: Cell<WatcherState>,
}

impl<H, S, R> FlagRandomizer<H, S, R>
where
    H: PageHost,
    S: KeyValueStore,
    R: Rng,
{
    pub fn new(config: Config, host: H, store: S, rng: R) -> Self {
        let prefs = Preferences::new(store, config.storage_keys.clone());
        Self {
            config,
            host,
            prefs,
            rng: RefCell::new(rng),
            next_trigger_seq: Cell::new(0),
            watcher: Cell::new(WatcherState::Idle),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn preferences(&self) -> &Preferences<S> {
        &self.prefs
    }

    /// Start watching for inserted widgets, give every existing widget its
    /// trigger, then roll once for all of them. Returns the broadcast value.
    pub fn install(&self) -> Option<String> {
        self.start_watching();
        let rolled = self.process_all();
        log::info!(
            "installed; enabled={} eligible={} rolled={:?}",
            self.prefs.is_enabled(),
            self.prefs.load_eligible_set().len(),
            rolled
        );
        rolled
    }
}
