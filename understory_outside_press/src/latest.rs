// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single-slot shared cell that long-lived callbacks read at call time.
//!
//! A listener closure created once can hold a clone of a [`Latest`] and always
//! observe the value most recently written by its owner, without the owner
//! rebuilding the closure.
//!
//! ```
//! use understory_outside_press::Latest;
//!
//! let slot = Latest::new(1);
//! let reader = slot.clone();
//! let read = move || reader.get();
//!
//! slot.set(2);
//! assert_eq!(read(), 2);
//! ```

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

/// Shared, interior-mutable slot holding the current value.
///
/// Clones share the same slot.
pub struct Latest<T> {
    slot: Rc<RefCell<T>>,
}

impl<T> Latest<T> {
    /// Create a slot holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            slot: Rc::new(RefCell::new(value)),
        }
    }

    /// Overwrite the current value.
    pub fn set(&self, value: T) {
        *self.slot.borrow_mut() = value;
    }

    /// Overwrite the current value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        self.slot.replace(value)
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// Writing to the same slot from inside `f` panics.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.borrow())
    }

    /// Clone out the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.slot.borrow().clone()
    }
}

impl<T> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: Default> Default for Latest<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Latest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot.try_borrow() {
            Ok(value) => f.debug_tuple("Latest").field(&*value).finish(),
            Err(_) => f.write_str("Latest(<borrowed>)"),
        }
    }
}
