use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::{Preference, ResolvedTheme, ThemeSnapshot};
use crate::signal::ColorSchemeSource;
use crate::storage::PreferenceStore;
use crate::subscription::{Listeners, Subscription};

/// Store key holding the raw preference tag.
pub const THEME_STORE_KEY: &str = "theme";

type Observer = Rc<dyn Fn(ResolvedTheme)>;

struct ControllerState {
    preference: Preference,
    prefers_dark: bool,
    // Last value handed to observers; only used to detect changes.
    announced: ResolvedTheme,
    // Bumped on every announced change so a superseded round can stop early.
    generation: u64,
    observers: Listeners<ResolvedTheme>,
}

impl ControllerState {
    fn resolved(&self) -> ResolvedTheme {
        self.preference.resolve(self.prefers_dark)
    }

    fn take_change(&mut self) -> Option<(ResolvedTheme, u64, Vec<Observer>)> {
        let resolved = self.resolved();
        if resolved == self.announced {
            return None;
        }
        self.announced = resolved;
        self.generation += 1;
        Some((resolved, self.generation, self.observers.snapshot()))
    }
}

/// Runs observers outside the state borrow so they can call back into the controller.
///
/// An observer that changes the theme starts a newer round; the older round
/// stops there so no observer is left holding a superseded value.
fn announce(state: &RefCell<ControllerState>) {
    let change = state.borrow_mut().take_change();
    let Some((resolved, generation, observers)) = change else {
        return;
    };
    tracing::info!(
        resolved = %resolved,
        observers = observers.len(),
        "resolved theme changed"
    );
    for observer in observers {
        if state.borrow().generation != generation {
            tracing::debug!(
                resolved = %resolved,
                "theme changed during notification; dropping stale round"
            );
            return;
        }
        observer(resolved);
    }
}

/// Owns the theme preference and keeps the resolved theme in step with it.
///
/// The preference is read from `store` once at construction and written back
/// on every change. While the preference is [`Preference::System`] the
/// resolved theme follows the color-scheme source. Store failures never
/// reach the caller; the in-memory preference stays authoritative.
pub struct ThemeController<S: PreferenceStore> {
    store: S,
    state: Rc<RefCell<ControllerState>>,
    environment: Subscription,
}

impl<S: PreferenceStore> ThemeController<S> {
    pub fn new<C: ColorSchemeSource + ?Sized>(store: S, source: &C) -> Self {
        let preference = load_preference(&store);
        let prefers_dark = source.prefers_dark();
        let state = Rc::new(RefCell::new(ControllerState {
            preference,
            prefers_dark,
            announced: preference.resolve(prefers_dark),
            generation: 0,
            observers: Listeners::new(),
        }));

        let weak: Weak<RefCell<ControllerState>> = Rc::downgrade(&state);
        let environment = source.subscribe(Box::new(move |prefers_dark| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let follows_system = {
                let mut state = state.borrow_mut();
                state.prefers_dark = prefers_dark;
                state.preference.follows_system()
            };
            if !follows_system {
                tracing::trace!(prefers_dark, "explicit preference pins theme; ignoring");
                return;
            }
            announce(&state);
        }));

        tracing::debug!(
            preference = %preference,
            prefers_dark,
            resolved = %preference.resolve(prefers_dark),
            "theme controller initialized"
        );

        Self {
            store,
            state,
            environment,
        }
    }

    pub fn preference(&self) -> Preference {
        self.state.borrow().preference
    }

    pub fn resolved_theme(&self) -> ResolvedTheme {
        self.state.borrow().resolved()
    }

    pub fn snapshot(&self) -> ThemeSnapshot {
        let state = self.state.borrow();
        ThemeSnapshot {
            preference: state.preference,
            resolved: state.resolved(),
            prefers_dark: state.prefers_dark,
        }
    }

    /// Last environment signal seen by the controller.
    pub fn prefers_dark(&self) -> bool {
        self.state.borrow().prefers_dark
    }

    pub fn set_preference(&self, preference: Preference) {
        if let Err(err) = self.store.set(THEME_STORE_KEY, preference.as_str()) {
            tracing::warn!(
                ?err,
                preference = %preference,
                "failed to persist theme preference; keeping it for this session"
            );
        }

        let previous = std::mem::replace(&mut self.state.borrow_mut().preference, preference);
        tracing::debug!(from = %previous, to = %preference, "theme preference set");
        announce(&self.state);
    }

    /// Derives the new preference from the current one.
    pub fn update_preference(&self, update: impl FnOnce(Preference) -> Preference) {
        let next = update(self.preference());
        self.set_preference(next);
    }

    /// Advances light, dark, system, light and returns the new preference.
    pub fn toggle(&self) -> Preference {
        self.update_preference(Preference::next);
        self.preference()
    }

    /// Registers an observer of resolved-theme changes.
    pub fn subscribe(&self, observer: impl Fn(ResolvedTheme) + 'static) -> Subscription {
        let id = self.state.borrow_mut().observers.insert(Rc::new(observer));
        let weak = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().observers.remove(id);
            }
        })
    }

    /// Stops following the environment signal. Safe to call repeatedly.
    pub fn teardown(&self) {
        if self.environment.is_active() {
            tracing::debug!("theme controller released environment subscription");
        }
        self.environment.cancel();
    }

    pub fn is_listening(&self) -> bool {
        self.environment.is_active()
    }
}

impl<S: PreferenceStore> fmt::Debug for ThemeController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ThemeController")
            .field("preference", &state.preference)
            .field("prefers_dark", &state.prefers_dark)
            .field("resolved", &state.resolved())
            .field("listening", &self.environment.is_active())
            .finish()
    }
}

fn load_preference<S: PreferenceStore>(store: &S) -> Preference {
    match store.get(THEME_STORE_KEY) {
        Ok(Some(raw)) => raw.parse::<Preference>().unwrap_or_else(|err| {
            tracing::warn!(?err, "ignoring invalid persisted theme preference");
            Preference::default()
        }),
        Ok(None) => Preference::default(),
        Err(err) => {
            tracing::warn!(?err, "failed to read theme preference; using default");
            Preference::default()
        }
    }
}
