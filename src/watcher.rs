//! Mutation watcher — keeps widgets inserted after load in sync.
//!
//! The watcher has two states. It moves from `Idle` to `Observing` once,
//! at install, and stays there for the life of the page. Batches that
//! arrive while idle are ignored.
//!
//! A batch is handled in two phases: every added node is classified and
//! each widget found gets its trigger, and only then is a single roll
//! broadcast. Old and new widgets therefore end the batch showing the same
//! value.

use rand::Rng;

use crate::app::FlagRandomizer;
use crate::host::{AddedNode, MutationRecord, PageHost};
use crate::store::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Observing,
}

/// What handling one mutation batch did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    /// Widgets found among the added nodes (a widget reached both as a
    /// node and as a descendant counts twice).
    pub widgets_found: usize,
    pub broadcast: Option<String>,
}

impl<H, S, R> FlagRandomizer<H, S, R>
where
    H: PageHost,
    S: KeyValueStore,
    R: Rng,
{
    pub fn watcher_state(&self) -> WatcherState {
        self.watcher.get()
    }

    /// Returns false if already observing.
    pub fn start_watching(&self) -> bool {
        if self.watcher.get() == WatcherState::Observing {
            return false;
        }
        self.watcher.set(WatcherState::Observing);
        log::debug!("watching for inserted widgets");
        true
    }

    pub fn handle_mutations<N>(&self, records: &[MutationRecord<N>]) -> BatchOutcome
    where
        N: AddedNode<Widget = H::Widget>,
    {
        if self.watcher.get() == WatcherState::Idle {
            return BatchOutcome::default();
        }

        let mut widgets_found = 0;
        for node in records.iter().flat_map(|r| r.added_nodes.iter()) {
            if let Some(widget) = node.as_widget() {
                self.process_widget(&widget, true);
                widgets_found += 1;
            }
            for widget in node.descendant_widgets() {
                self.process_widget(&widget, true);
                widgets_found += 1;
            }
        }

        if widgets_found == 0 {
            return BatchOutcome::default();
        }
        log::debug!("{} widgets inserted", widgets_found);
        BatchOutcome {
            widgets_found,
            broadcast: self.roll_and_broadcast(),
        }
    }
}
