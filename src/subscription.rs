use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Handle to a registered callback.
///
/// The registration is released on [`Subscription::cancel`] or when the
/// handle is dropped, whichever comes first.
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    release: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: RefCell::new(Some(Box::new(release))),
        }
    }

    pub fn is_active(&self) -> bool {
        self.release.borrow().is_some()
    }

    /// Releases the registration. Calling this more than once is a no-op.
    pub fn cancel(&self) {
        let release = self.release.borrow_mut().take();
        if let Some(release) = release {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Ordered callback registry shared by the signal sources and the controller.
pub(crate) struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Rc<dyn Fn(T)>)>,
}

impl<T> Listeners<T> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, listener: Rc<dyn Fn(T)>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Clones the current callbacks so they can run without the registry borrowed.
    pub(crate) fn snapshot(&self) -> Vec<Rc<dyn Fn(T)>> {
        self.entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect()
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}
