//! Subscribe/notify primitive for store state changes.
//!
//! Stores own an explicit subscriber list; callbacks run synchronously after
//! each state transition, in registration order. There is no hidden
//! re-render scheduling behind this contract.

use std::sync::Mutex;

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Registry of change callbacks for an observable value.
///
/// Callbacks must not register further subscribers from within a
/// notification; the list is locked while they run.
pub struct Subscribers<T> {
    callbacks: Mutex<Vec<Callback<T>>>,
}

impl<T> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Registers a callback invoked after every state transition.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) {
        self.callbacks
            .lock()
            .expect("subscriber list poisoned")
            .push(Box::new(callback));
    }

    /// Invokes every registered callback with the new value, in registration
    /// order.
    pub fn notify(&self, value: &T) {
        let callbacks = self.callbacks.lock().expect("subscriber list poisoned");
        for callback in callbacks.iter() {
            callback(value);
        }
    }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}
