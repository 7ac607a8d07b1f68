// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document-like root the detector installs its listeners on.
//!
//! A [`ListenerRoot`] owns a global listener table shared with unrelated code.
//! The detector installs entries through [`ListenerRoot::add_listener`], which
//! returns an owned handle recording exactly what was installed (kind, callback
//! identity, and options). The handle is consumed by
//! [`ListenerRoot::remove_listener`], so an entry can only be removed once, and
//! only with the options it was installed with.
//!
//! Containment is also delegated to the root via [`ListenerRoot::is_inside`],
//! since only the root knows how its nodes nest.

use alloc::rc::Rc;

use crate::capability::ListenerOptions;
use crate::kind::InteractionKind;

/// A callback installed in a root's listener table.
pub type Listener<E> = Rc<dyn Fn(&E)>;

/// A caller-supplied outside-press handler.
pub type Handler<E> = Rc<dyn Fn(&E)>;

/// A document-like root with a global listener table.
pub trait ListenerRoot {
    /// Node type regions resolve to.
    type Node: Clone;
    /// Event payload delivered to listeners.
    type Event;
    /// Owned record of one installed listener entry.
    type Handle;

    /// Install `listener` for `kind` with `options`.
    fn add_listener(
        &self,
        kind: InteractionKind,
        options: ListenerOptions,
        listener: Listener<Self::Event>,
    ) -> Self::Handle;

    /// Remove exactly the entry described by `handle`.
    fn remove_listener(&self, handle: Self::Handle);

    /// Returns `true` if `event`'s target is `region` or one of its descendants.
    ///
    /// Events without a usable target node are never inside.
    fn is_inside(region: &Self::Node, event: &Self::Event) -> bool;
}
