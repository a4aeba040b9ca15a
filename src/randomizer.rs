//! Random selection over the eligible set.
//!
//! Two entry points apply a pick to the page:
//!
//! - `roll_and_broadcast` — one value for every widget present, honouring
//!   duplicate avoidance and recording the result as the last roll.
//! - `pick_one_for` — an independent value for a single widget. It neither
//!   consults nor updates the last roll.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::app::FlagRandomizer;
use crate::host::{PageHost, SelectorWidget};
use crate::store::KeyValueStore;

/// A uniformly chosen element of `eligible`, or `None` when it is empty.
pub fn pick_one<'a, R: Rng + ?Sized>(rng: &mut R, eligible: &'a [String]) -> Option<&'a str> {
    eligible.choose(rng).map(String::as_str)
}

impl<H, S, R> FlagRandomizer<H, S, R>
where
    H: PageHost,
    S: KeyValueStore,
    R: Rng,
{
    /// The eligible set when randomization may run at all.
    fn eligible_if_enabled(&self) -> Option<Vec<String>> {
        if !self.prefs.is_enabled() {
            log::debug!("randomization disabled");
            return None;
        }
        let eligible = self.prefs.load_eligible_set();
        if eligible.is_empty() {
            log::debug!("eligible set empty; keeping site default");
            return None;
        }
        Some(eligible)
    }

    /// Draw until the candidate is acceptable or attempts run out.
    ///
    /// With duplicate avoidance on and two or more entries, a candidate
    /// equal to the last roll is redrawn. After `max_roll_attempts`
    /// draws the last candidate is accepted whatever it is.
    fn draw_for_broadcast(&self, eligible: &[String]) -> Option<String> {
        let prevent_duplicates = self.prefs.prevent_duplicates();
        let last_roll = if prevent_duplicates {
            self.prefs.last_roll()
        } else {
            None
        };

        let mut rng = self.rng.borrow_mut();
        let mut candidate = None;
        for attempt in 1..=self.config.max_roll_attempts {
            let drawn = pick_one(&mut *rng, eligible)?;
            candidate = Some(drawn);
            if !prevent_duplicates || eligible.len() == 1 || last_roll.as_deref() != Some(drawn) {
                break;
            }
            if attempt == self.config.max_roll_attempts {
                log::debug!("no distinct value after {} draws; repeating {}", attempt, drawn);
            }
        }
        candidate.map(str::to_owned)
    }

    /// Pick one value, remember it as the last roll and apply it to every
    /// widget in the document. Returns the broadcast value.
    pub fn roll_and_broadcast(&self) -> Option<String> {
        let eligible = self.eligible_if_enabled()?;
        let choice = self.draw_for_broadcast(&eligible)?;

        self.prefs.set_last_roll(&choice);
        let widgets = self.host.widgets();
        for widget in &widgets {
            widget.set_value(&choice);
        }
        log::debug!("broadcast {} to {} widgets", choice, widgets.len());
        Some(choice)
    }

    /// Apply a fresh pick to `widget` alone.
    pub fn pick_one_for(&self, widget: &H::Widget) -> Option<String> {
        let eligible = self.eligible_if_enabled()?;
        let choice = pick_one(&mut *self.rng.borrow_mut(), &eligible)?.to_owned();
        widget.set_value(&choice);
        Some(choice)
    }
}
