//! Synchronous subscriber registry.
//!
//! DESIGN
//! ======
//! Callers snapshot the callback list and release their `RefCell` borrow before
//! invoking it, so a callback may read or subscribe to the same owner.

#[cfg(test)]
#[path = "listeners_test.rs"]
mod listeners_test;

use std::rc::Rc;

/// Handle returned by `subscribe`; pass it back to `unsubscribe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub(crate) type Callback<T> = Rc<dyn Fn(&T)>;

pub(crate) struct Listeners<T> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self { next_id: 0, entries: Vec::new() }
    }
}

impl<T> Listeners<T> {
    pub(crate) fn add(&mut self, callback: impl Fn(&T) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, Rc::new(callback)));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Clone the current callbacks so they can run outside the owner's borrow.
    pub(crate) fn callbacks(&self) -> Vec<Callback<T>> {
        self.entries.iter().map(|(_, cb)| Rc::clone(cb)).collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Run each callback with `value`.
pub(crate) fn notify<T>(callbacks: Vec<Callback<T>>, value: &T) {
    for callback in callbacks {
        callback(value);
    }
}
