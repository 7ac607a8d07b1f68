// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Region references and region sets: the parts of the UI treated as "inside".
//!
//! A [`RegionRef`] is a shared, optional slot that the owning component fills
//! when its element mounts and clears when it unmounts. The detector only ever
//! holds clones of the slot, never the element's lifetime, and resolves the slot
//! at interaction time.
//!
//! A [`RegionSet`] normalizes "one reference" and "a collection of references"
//! into one ordered sequence:
//!
//! ```
//! use understory_outside_press::{RegionRef, RegionSet};
//!
//! let menu = RegionRef::attached(1_u32);
//! let trigger = RegionRef::new();
//!
//! let single: RegionSet<u32> = menu.clone().into();
//! assert_eq!(single.len(), 1);
//!
//! let both: RegionSet<u32> = vec![menu, trigger.clone()].into();
//! assert_eq!(both.len(), 2);
//! // Unmounted references stay in the set but resolve to nothing.
//! assert_eq!(both.live().collect::<Vec<_>>(), vec![1]);
//!
//! trigger.attach(2);
//! assert_eq!(both.live().collect::<Vec<_>>(), vec![1, 2]);
//! ```

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use smallvec::SmallVec;

/// A shared, possibly empty handle to a UI element of type `N`.
///
/// Clones share the same slot.
pub struct RegionRef<N> {
    slot: Rc<RefCell<Option<N>>>,
}

impl<N> RegionRef<N> {
    /// Create an empty (unmounted) reference.
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }

    /// Create a reference already pointing at `node`.
    pub fn attached(node: N) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(node))),
        }
    }

    /// Point the reference at `node` (element mounted).
    pub fn attach(&self, node: N) {
        *self.slot.borrow_mut() = Some(node);
    }

    /// Clear the reference (element unmounted), returning the previous node.
    pub fn detach(&self) -> Option<N> {
        self.slot.borrow_mut().take()
    }

    /// Returns `true` if the reference currently points at an element.
    pub fn is_attached(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Resolve the reference to its current element, if any.
    pub fn get(&self) -> Option<N>
    where
        N: Clone,
    {
        self.slot.borrow().clone()
    }

    /// Returns `true` if both references share the same slot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<N> Clone for RegionRef<N> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<N> Default for RegionRef<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: fmt::Debug> fmt::Debug for RegionRef<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot.try_borrow() {
            Ok(node) => f.debug_tuple("RegionRef").field(&*node).finish(),
            Err(_) => f.write_str("RegionRef(<borrowed>)"),
        }
    }
}

/// Ordered sequence of region references.
///
/// Order only affects iteration; containment is a union over all regions.
pub struct RegionSet<N> {
    refs: SmallVec<[RegionRef<N>; 2]>,
}

impl<N> RegionSet<N> {
    /// Create an empty set. Every interaction is outside an empty set.
    pub fn new() -> Self {
        Self {
            refs: SmallVec::new(),
        }
    }

    /// Number of references, attached or not.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Returns `true` if the set holds no references.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Iterate over the references in order.
    pub fn iter(&self) -> impl Iterator<Item = &RegionRef<N>> {
        self.refs.iter()
    }

    /// Resolve each reference now, skipping unmounted ones.
    pub fn live(&self) -> impl Iterator<Item = N> + '_
    where
        N: Clone,
    {
        self.refs.iter().filter_map(RegionRef::get)
    }

    /// Append a reference.
    pub fn push(&mut self, region: RegionRef<N>) {
        self.refs.push(region);
    }
}

impl<N> Clone for RegionSet<N> {
    fn clone(&self) -> Self {
        Self {
            refs: self.refs.clone(),
        }
    }
}

impl<N> Default for RegionSet<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: fmt::Debug> fmt::Debug for RegionSet<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.refs.iter()).finish()
    }
}

impl<N> From<RegionRef<N>> for RegionSet<N> {
    fn from(region: RegionRef<N>) -> Self {
        let mut refs = SmallVec::new();
        refs.push(region);
        Self { refs }
    }
}

impl<N> From<&RegionRef<N>> for RegionSet<N> {
    fn from(region: &RegionRef<N>) -> Self {
        Self::from(region.clone())
    }
}

impl<N> From<Vec<RegionRef<N>>> for RegionSet<N> {
    fn from(refs: Vec<RegionRef<N>>) -> Self {
        Self {
            refs: SmallVec::from_vec(refs),
        }
    }
}

impl<N> From<&[RegionRef<N>]> for RegionSet<N> {
    fn from(refs: &[RegionRef<N>]) -> Self {
        refs.iter().cloned().collect()
    }
}

impl<N, const M: usize> From<[RegionRef<N>; M]> for RegionSet<N> {
    fn from(refs: [RegionRef<N>; M]) -> Self {
        refs.into_iter().collect()
    }
}

impl<N> FromIterator<RegionRef<N>> for RegionSet<N> {
    fn from_iter<I: IntoIterator<Item = RegionRef<N>>>(iter: I) -> Self {
        Self {
            refs: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn single_reference_becomes_one_element_set() {
        let r = RegionRef::<u32>::new();
        let set = RegionSet::from(&r);
        assert_eq!(set.len(), 1);
        assert!(set.iter().next().is_some_and(|s| s.ptr_eq(&r)));
    }

    #[test]
    fn collection_shapes_preserve_order() {
        let a = RegionRef::attached(1_u32);
        let b = RegionRef::attached(2_u32);
        let c = RegionRef::attached(3_u32);

        let from_vec = RegionSet::from(vec![a.clone(), b.clone(), c.clone()]);
        let from_slice = RegionSet::from(&[a.clone(), b.clone(), c.clone()][..]);
        let from_array = RegionSet::from([a, b, c]);

        for set in [from_vec, from_slice, from_array] {
            assert_eq!(set.live().collect::<Vec<_>>(), vec![1, 2, 3]);
        }
    }

    #[test]
    fn unmounted_references_are_kept_but_skipped() {
        let a = RegionRef::attached(1_u32);
        let b = RegionRef::new();
        let set = RegionSet::from(vec![a.clone(), b.clone()]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.live().collect::<Vec<_>>(), vec![1]);

        b.attach(2);
        assert_eq!(a.detach(), Some(1));
        assert_eq!(set.live().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn empty_set_resolves_to_nothing() {
        let set = RegionSet::<u32>::new();
        assert!(set.is_empty());
        assert_eq!(set.live().count(), 0);
    }
}
