//! User-initiated re-rolls from a trigger affordance.

use rand::Rng;

use crate::app::FlagRandomizer;
use crate::host::PageHost;
use crate::store::KeyValueStore;

pub const DISABLED_GUIDANCE: &str =
    "Randomizer is currently disabled. Enable it in the Flag Randomizer Options.";
pub const EMPTY_GUIDANCE: &str =
    "No flags selected for randomization. Please select flags in the Flag Randomizer Options.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    Rolled(String),
    Disabled,
    NoEligibleChoices,
}

impl TriggerOutcome {
    /// The message shown to the user instead of rolling, if any.
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            TriggerOutcome::Rolled(_) => None,
            TriggerOutcome::Disabled => Some(DISABLED_GUIDANCE),
            TriggerOutcome::NoEligibleChoices => Some(EMPTY_GUIDANCE),
        }
    }
}

impl<H, S, R> FlagRandomizer<H, S, R>
where
    H: PageHost,
    S: KeyValueStore,
    R: Rng,
{
    /// Handle a click on any trigger: re-roll for the whole page, or tell
    /// the user why nothing happened.
    pub fn handle_trigger_click(&self) -> TriggerOutcome {
        let outcome = if !self.prefs.is_enabled() {
            TriggerOutcome::Disabled
        } else if self.prefs.load_eligible_set().is_empty() {
            TriggerOutcome::NoEligibleChoices
        } else {
            self.roll_and_broadcast()
                .map_or(TriggerOutcome::NoEligibleChoices, TriggerOutcome::Rolled)
        };

        if let Some(message) = outcome.guidance() {
            self.host.alert(message);
        }
        outcome
    }
}
