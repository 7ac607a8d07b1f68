// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outside-press detector: call a handler when the user presses or touches
//! outside a set of regions.
//!
//! ## Usage
//!
//! 1) Create one [`OutsidePress`] per owning component with its listener root
//!    and capability probes.
//! 2) On every evaluation of the component (each render or update pass), call
//!    [`OutsidePress::evaluate`] with the current regions and handler. Pass
//!    `None` as the handler to disable detection.
//! 3) Drop the detector (or call [`OutsidePress::teardown`]) when the component
//!    goes away. No listener outlives it.
//!
//! ## Registration policy
//!
//! Listeners are installed when the handler becomes present and removed when it
//! becomes absent. Changing the regions, or swapping one handler for another,
//! does not touch the listener table: the installed listener reads both from
//! [`Latest`] cells at interaction time.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use understory_outside_press::{
//!     Document, Handler, InteractionEvent, OutsidePress, RegionRef, StaticCapabilities,
//! };
//!
//! let doc = Document::new();
//! let menu = doc.create_child(doc.root()).unwrap();
//! let item = doc.create_child(menu).unwrap();
//! let elsewhere = doc.create_child(doc.root()).unwrap();
//!
//! let menu_ref = RegionRef::attached(menu);
//! let dismissed = Rc::new(Cell::new(false));
//! let flag = dismissed.clone();
//! let on_outside: Handler<InteractionEvent> = Rc::new(move |_| flag.set(true));
//!
//! let mut outside = OutsidePress::new(doc.clone(), StaticCapabilities::BROWSER);
//! outside.evaluate(&menu_ref, Some(on_outside));
//!
//! doc.pointer_down(item).unwrap();
//! assert!(!dismissed.get());
//!
//! doc.pointer_down(elsewhere).unwrap();
//! assert!(dismissed.get());
//! ```

use alloc::rc::Rc;
use core::fmt;

use smallvec::SmallVec;

use crate::capability::{Capabilities, ListenerOptions};
use crate::kind::InteractionKind;
use crate::latest::Latest;
use crate::region::RegionSet;
use crate::root::{Handler, Listener, ListenerRoot};

/// Detects presses and touches outside a set of regions.
///
/// Registration state is all-or-nothing: either one listener per
/// [`InteractionKind`] is installed on the root, or none is.
pub struct OutsidePress<R, C>
where
    R: ListenerRoot,
    C: Capabilities,
{
    root: R,
    capabilities: C,
    regions: Latest<RegionSet<R::Node>>,
    handler: Latest<Option<Handler<R::Event>>>,
    installed: Option<SmallVec<[R::Handle; 2]>>,
}

impl<R, C> OutsidePress<R, C>
where
    R: ListenerRoot,
    C: Capabilities,
{
    /// Remove every installed listener. Safe to call when nothing is installed.
    ///
    /// A later [`evaluate`](Self::evaluate) with a handler installs again.
    pub fn teardown(&mut self) {
        let Some(handles) = self.installed.take() else {
            return;
        };
        log::debug!("removing {} outside-press listeners", handles.len());
        for handle in handles {
            self.root.remove_listener(handle);
        }
    }

    /// Returns `true` while listeners are installed on the root.
    pub fn is_registered(&self) -> bool {
        self.installed.is_some()
    }

    /// The listener root this detector installs on.
    pub fn root(&self) -> &R {
        &self.root
    }
}

impl<R, C> OutsidePress<R, C>
where
    R: ListenerRoot,
    R::Node: 'static,
    R::Event: 'static,
    C: Capabilities,
{
    /// Create an inactive detector for `root`.
    pub fn new(root: R, capabilities: C) -> Self {
        Self {
            root,
            capabilities,
            regions: Latest::default(),
            handler: Latest::new(None),
            installed: None,
        }
    }

    /// Evaluate the detector with the owning component's current inputs.
    ///
    /// - On a host without a document this does nothing at all.
    /// - The regions and handler become visible to the installed listener
    ///   immediately.
    /// - Listeners are installed when `handler` becomes `Some` and removed when
    ///   it becomes `None`. Otherwise the listener table is left untouched.
    pub fn evaluate(
        &mut self,
        regions: impl Into<RegionSet<R::Node>>,
        handler: Option<Handler<R::Event>>,
    ) {
        if !self.capabilities.is_interactive() {
            return;
        }
        let enabled = handler.is_some();
        self.regions.set(regions.into());
        self.handler.set(handler);

        match (enabled, self.installed.is_some()) {
            (true, false) => self.install(),
            (false, true) => self.teardown(),
            _ => {}
        }
    }

    fn install(&mut self) {
        let passive = self.capabilities.passive_listeners_supported();
        let listener = self.listener();
        let handles = InteractionKind::ALL
            .into_iter()
            .map(|kind| {
                let options = ListenerOptions::negotiate(kind, passive);
                log::debug!("adding outside-press listener for {kind} with {options:?}");
                self.root.add_listener(kind, options, Rc::clone(&listener))
            })
            .collect();
        self.installed = Some(handles);
    }

    /// Build the shared listener installed for every kind.
    fn listener(&self) -> Listener<R::Event> {
        let regions = self.regions.clone();
        let handler = self.handler.clone();
        Rc::new(move |event: &R::Event| {
            // Clone the handler out so it can write to the cells (by
            // re-evaluating the detector) while it runs.
            let Some(current) = handler.get() else {
                log::trace!("outside-press handler is absent; ignoring");
                return;
            };
            let inside = regions.with(|set| set.live().any(|region| R::is_inside(&region, event)));
            if inside {
                log::trace!("interaction inside a region; ignoring");
                return;
            }
            current(event);
        })
    }
}

impl<R, C> Drop for OutsidePress<R, C>
where
    R: ListenerRoot,
    C: Capabilities,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<R, C> fmt::Debug for OutsidePress<R, C>
where
    R: ListenerRoot + fmt::Debug,
    R::Node: fmt::Debug,
    C: Capabilities + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutsidePress")
            .field("root", &self.root)
            .field("capabilities", &self.capabilities)
            .field("regions", &self.regions)
            .field("enabled", &self.handler.with(Option::is_some))
            .field("installed", &self.installed.as_ref().map_or(0, SmallVec::len))
            .finish()
    }
}
