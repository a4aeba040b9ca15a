//! DOM synchronization — trigger attachment and bulk processing.

use rand::{Rng, RngCore};

use crate::app::FlagRandomizer;
use crate::host::{PageHost, SelectorWidget, TriggerAffordance};
use crate::store::KeyValueStore;

impl<H, S, R> FlagRandomizer<H, S, R>
where
    H: PageHost,
    S: KeyValueStore,
    R: Rng,
{
    pub fn is_processed(&self, widget: &H::Widget) -> bool {
        widget.attribute(&self.config.marker_attribute).as_deref() == Some("true")
    }

    fn next_correlation_id(&self) -> String {
        let seq = self.next_trigger_seq.get();
        self.next_trigger_seq.set(seq + 1);
        let salt = self.rng.borrow_mut().next_u32();
        format!("flagsel_{}_{:08x}", seq, salt)
    }

    /// Give `widget` its trigger unless it already has one.
    /// Returns whether a trigger was inserted.
    pub fn attach_trigger(&self, widget: &H::Widget) -> bool {
        if self.is_processed(widget) {
            return false;
        }

        let trigger = TriggerAffordance {
            correlation_id: self.next_correlation_id(),
            correlation_attribute: self.config.correlation_attribute.clone(),
            class_name: self.config.trigger_class.clone(),
            label: self.config.trigger_label.clone(),
            title: self.config.trigger_title.clone(),
        };

        // Mark before inserting: an unmarked widget must never carry a trigger.
        let marked = widget
            .set_attribute(&self.config.correlation_attribute, &trigger.correlation_id)
            .and_then(|()| widget.set_attribute(&self.config.marker_attribute, "true"));
        if let Err(e) = marked {
            log::warn!("could not mark widget: {}", e);
            return false;
        }

        if let Err(e) = widget.insert_trigger_after(&trigger) {
            log::warn!("could not attach trigger {}: {}", trigger.correlation_id, e);
            if let Err(e) = widget.set_attribute(&self.config.marker_attribute, "false") {
                log::warn!("could not unmark widget: {}", e);
            }
            return false;
        }
        true
    }

    /// Optionally randomize `widget` on its own, then ensure its trigger.
    pub fn process_widget(&self, widget: &H::Widget, skip_randomize: bool) {
        if !skip_randomize {
            self.pick_one_for(widget);
        }
        self.attach_trigger(widget);
    }

    /// Attach triggers to every widget without touching their values, then
    /// broadcast a single roll to all of them.
    pub fn process_all(&self) -> Option<String> {
        let widgets = self.host.widgets();
        for widget in &widgets {
            self.process_widget(widget, true);
        }
        log::debug!("processed {} widgets", widgets.len());
        self.roll_and_broadcast()
    }
}

#[cfg(test)]
mod tests {
    use crate::app::tests::{OPTIONS, eligible, test_app, widget};
    use crate::host::{MemoryWidget, SelectorWidget};

    #[test]
    fn attach_trigger_is_idempotent() {
        let (app, page, _store) = test_app(1);
        let w = widget();
        page.add_widget(w.clone());

        assert!(app.attach_trigger(&w));
        assert!(!app.attach_trigger(&w));
        assert_eq!(w.triggers().len(), 1);
    }

    #[test]
    fn trigger_and_widget_share_correlation_id() {
        let (app, _page, _store) = test_app(1);
        let w = widget();
        app.attach_trigger(&w);

        let trigger = &w.triggers()[0];
        assert!(trigger.correlation_id.starts_with("flagsel_"));
        assert_eq!(w.attribute("data-flag-selector-id"), Some(trigger.correlation_id.clone()));
        assert_eq!(w.attribute("data-has-randomizer").as_deref(), Some("true"));
        assert_eq!(trigger.class_name, "flag-randomizer-btn");
        assert_eq!(trigger.title, "Randomize flag");
    }

    #[test]
    fn correlation_ids_are_unique() {
        let (app, _page, _store) = test_app(1);
        let widgets: Vec<MemoryWidget> = (0..20).map(|_| widget()).collect();
        let mut ids: Vec<String> = widgets
            .iter()
            .map(|w| {
                app.attach_trigger(w);
                w.triggers()[0].correlation_id.clone()
            })
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn detached_widget_stays_unmarked() {
        let (app, _page, _store) = test_app(1);
        let w = widget();
        w.detach();
        assert!(!app.attach_trigger(&w));
        assert!(!app.is_processed(&w));
    }

    #[test]
    fn unmarkable_widget_never_gets_a_trigger() {
        let (app, page, _store) = test_app(1);
        let w = widget();
        w.fail_attribute_writes(true);
        page.add_widget(w.clone());

        for _ in 0..3 {
            app.process_all();
        }
        assert!(w.triggers().is_empty());
        assert!(!app.is_processed(&w));

        w.fail_attribute_writes(false);
        app.process_all();
        app.process_all();
        assert_eq!(w.triggers().len(), 1);
    }

    #[test]
    fn detached_widget_is_retried_once_reattached() {
        let (app, page, _store) = test_app(1);
        let w = widget();
        w.detach();
        page.add_widget(w.clone());
        app.process_all();
        assert_eq!(w.attribute("data-has-randomizer").as_deref(), Some("false"));

        w.reattach();
        app.process_all();
        app.process_all();
        assert_eq!(w.triggers().len(), 1);
        assert!(app.is_processed(&w));
    }

    #[test]
    fn process_widget_randomizes_unless_skipped() {
        let (app, _page, _store) = test_app(4);
        eligible(&app, &["HT"]);
        let skipped = widget();
        let rolled = widget();

        app.process_widget(&skipped, true);
        app.process_widget(&rolled, false);

        assert!(skipped.assigned_values().is_empty());
        assert_eq!(rolled.value(), "HT");
        assert_eq!(skipped.triggers().len(), 1);
        assert_eq!(rolled.triggers().len(), 1);
    }

    #[test]
    fn process_all_with_empty_set_only_attaches_triggers() {
        let (app, page, _store) = test_app(1);
        let widgets: Vec<MemoryWidget> = (0..4).map(|_| widget()).collect();
        for w in &widgets {
            page.add_widget(w.clone());
        }

        assert_eq!(app.process_all(), None);
        for w in &widgets {
            assert_eq!(w.value(), OPTIONS[0].0);
            assert!(w.assigned_values().is_empty());
            assert_eq!(w.triggers().len(), 1);
        }
    }

    #[test]
    fn process_all_twice_keeps_one_trigger_each() {
        let (app, page, _store) = test_app(1);
        let w = widget();
        page.add_widget(w.clone());
        eligible(&app, &["AB", "IZ"]);

        app.process_all();
        app.process_all();
        assert_eq!(w.triggers().len(), 1);
        // One broadcast per pass, never a per-widget pick.
        assert_eq!(w.assigned_values().len(), 2);
    }
}
