use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::subscription::{Listeners, Subscription};

mod detect;

pub use detect::detect_prefers_dark;

/// Environment color-scheme signal: whether the desktop prefers a dark theme.
pub trait ColorSchemeSource {
    fn prefers_dark(&self) -> bool;

    /// Registers `on_change`, invoked with the new value after each change.
    fn subscribe(&self, on_change: Box<dyn Fn(bool)>) -> Subscription;
}

impl<S: ColorSchemeSource + ?Sized> ColorSchemeSource for Rc<S> {
    fn prefers_dark(&self) -> bool {
        (**self).prefers_dark()
    }

    fn subscribe(&self, on_change: Box<dyn Fn(bool)>) -> Subscription {
        (**self).subscribe(on_change)
    }
}

struct ManualState {
    prefers_dark: bool,
    listeners: Listeners<bool>,
}

/// Push-driven color-scheme source.
///
/// The host forwards platform notifications through
/// [`ManualColorScheme::set_prefers_dark`]. Clones share state.
#[derive(Clone)]
pub struct ManualColorScheme {
    state: Rc<RefCell<ManualState>>,
}

impl ManualColorScheme {
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(ManualState {
                prefers_dark,
                listeners: Listeners::new(),
            })),
        }
    }

    /// Seeds the source from a one-shot desktop probe, assuming light when nothing answers.
    pub fn detect() -> Self {
        let prefers_dark = detect_prefers_dark().unwrap_or_else(|| {
            tracing::debug!("no desktop color-scheme hint found; assuming light");
            false
        });
        Self::new(prefers_dark)
    }

    /// Updates the signal. Subscribers run only when the value actually changes.
    pub fn set_prefers_dark(&self, prefers_dark: bool) {
        let listeners = {
            let mut state = self.state.borrow_mut();
            if state.prefers_dark == prefers_dark {
                return;
            }
            state.prefers_dark = prefers_dark;
            state.listeners.snapshot()
        };

        tracing::debug!(
            prefers_dark,
            subscribers = listeners.len(),
            "environment color scheme changed"
        );
        for listener in listeners {
            listener(prefers_dark);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }
}

impl std::fmt::Debug for ManualColorScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ManualColorScheme")
            .field("prefers_dark", &state.prefers_dark)
            .field("subscribers", &state.listeners.len())
            .finish()
    }
}

impl ColorSchemeSource for ManualColorScheme {
    fn prefers_dark(&self) -> bool {
        self.state.borrow().prefers_dark
    }

    fn subscribe(&self, on_change: Box<dyn Fn(bool)>) -> Subscription {
        let id = self.state.borrow_mut().listeners.insert(Rc::from(on_change));
        let state: Weak<RefCell<ManualState>> = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                state.borrow_mut().listeners.remove(id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting_subscription(
        source: &ManualColorScheme,
    ) -> (Subscription, Rc<Cell<usize>>, Rc<Cell<Option<bool>>>) {
        let calls = Rc::new(Cell::new(0));
        let last = Rc::new(Cell::new(None));
        let (calls_in, last_in) = (Rc::clone(&calls), Rc::clone(&last));
        let subscription = source.subscribe(Box::new(move |prefers_dark| {
            calls_in.set(calls_in.get() + 1);
            last_in.set(Some(prefers_dark));
        }));
        (subscription, calls, last)
    }

    #[test]
    fn set_prefers_dark_notifies_on_change_only() {
        let source = ManualColorScheme::new(false);
        let (_subscription, calls, last) = counting_subscription(&source);

        source.set_prefers_dark(false);
        assert_eq!(calls.get(), 0);

        source.set_prefers_dark(true);
        assert_eq!(calls.get(), 1);
        assert_eq!(last.get(), Some(true));
        assert!(source.prefers_dark());
    }

    #[test]
    fn independent_subscriptions_each_receive_changes() {
        let source = ManualColorScheme::new(true);
        let (_first, first_calls, _) = counting_subscription(&source);
        let (_second, second_calls, _) = counting_subscription(&source);

        source.set_prefers_dark(false);

        assert_eq!(first_calls.get(), 1);
        assert_eq!(second_calls.get(), 1);
        assert_eq!(source.subscriber_count(), 2);
    }

    #[test]
    fn cancelled_subscription_stops_receiving_changes() {
        let source = ManualColorScheme::new(false);
        let (subscription, calls, _) = counting_subscription(&source);

        subscription.cancel();
        source.set_prefers_dark(true);

        assert_eq!(calls.get(), 0);
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn subscription_outliving_source_cancels_cleanly() {
        let source = ManualColorScheme::new(false);
        let (subscription, _, _) = counting_subscription(&source);
        drop(source);

        subscription.cancel();
        assert!(!subscription.is_active());
    }

    #[test]
    fn listener_may_subscribe_while_being_notified() {
        let source = ManualColorScheme::new(false);
        let nested: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));
        let (source_in, nested_in) = (source.clone(), Rc::clone(&nested));
        let _subscription = source.subscribe(Box::new(move |_| {
            let inner = source_in.subscribe(Box::new(|_| {}));
            nested_in.borrow_mut().push(inner);
        }));

        source.set_prefers_dark(true);
        assert_eq!(source.subscriber_count(), 2);
    }
}
