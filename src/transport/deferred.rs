use std::cell::RefCell;
use std::rc::Rc;

/// A value that becomes available later, settled at most once.
///
/// Callbacks registered before settlement run in registration order when the
/// value arrives; callbacks registered afterwards run immediately.
pub struct Deferred<T> {
    state: Rc<RefCell<DeferredState<T>>>,
}

enum DeferredState<T> {
    Pending(Vec<Box<dyn FnOnce(&T)>>),
    Settled(T),
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: Clone + 'static> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Deferred<T> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(DeferredState::Pending(Vec::new()))),
        }
    }

    /// Settle with `value`.
    ///
    /// Returns `false` (and drops `value`) when already settled.
    pub fn settle(&self, value: T) -> bool {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            let callbacks = match &mut *state {
                DeferredState::Settled(_) => return false,
                DeferredState::Pending(callbacks) => std::mem::take(callbacks),
            };
            *state = DeferredState::Settled(value.clone());
            callbacks
        };

        // State is released here so callbacks may register on this deferred
        for callback in callbacks {
            callback(&value);
        }
        true
    }

    /// Run `callback` once the value is available.
    pub fn on_settled(&self, callback: impl FnOnce(&T) + 'static) {
        let settled = {
            let mut state = self.state.borrow_mut();
            match &mut *state {
                DeferredState::Pending(callbacks) => {
                    callbacks.push(Box::new(callback));
                    return;
                }
                DeferredState::Settled(value) => value.clone(),
            }
        };
        callback(&settled);
    }

    pub fn is_settled(&self) -> bool {
        matches!(*self.state.borrow(), DeferredState::Settled(_))
    }

    /// The settled value, if any
    pub fn value(&self) -> Option<T> {
        match &*self.state.borrow() {
            DeferredState::Settled(value) => Some(value.clone()),
            DeferredState::Pending(_) => None,
        }
    }
}
