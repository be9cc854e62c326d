//! Observable scalar values.
//!
//! A value plus a list of change listeners. Presentation binds to score,
//! level, lives and multiplier through these without gaining write access;
//! only the owning game calls [`Observable::set`].

use std::fmt;

type Listener<T> = Box<dyn FnMut(T)>;

pub struct Observable<T> {
    value: T,
    listeners: Vec<Listener<T>>,
}

impl<T: Copy + PartialEq> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            listeners: Vec::new(),
        }
    }

    pub fn get(&self) -> T {
        self.value
    }

    /// Store a new value. Listeners run only when the value actually changes.
    pub fn set(&mut self, value: T) {
        if self.value == value {
            return;
        }
        self.value = value;
        for listener in &mut self.listeners {
            listener(value);
        }
    }

    /// Register a listener called with each new value.
    pub fn subscribe(&mut self, listener: impl FnMut(T) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T: Copy + PartialEq + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_see_changes_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut value = Observable::new(1u32);
        {
            let seen = Rc::clone(&seen);
            value.subscribe(move |v| seen.borrow_mut().push(v));
        }

        value.set(1);
        value.set(2);
        value.set(2);
        value.set(5);

        assert_eq!(value.get(), 5);
        assert_eq!(*seen.borrow(), vec![2, 5]);
    }
}
