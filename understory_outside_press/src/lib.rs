// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_outside_press --heading-base-level=0

//! Understory Outside Press: dismiss overlays when the user interacts elsewhere.
//!
//! This crate detects a primary pointer press or a touch start that lands
//! outside a set of UI regions, and calls a handler once per such interaction.
//! It is meant for closing menus, popovers, and other transient surfaces.
//!
//! ## Pieces
//!
//! - [`RegionRef`] / [`RegionSet`]: shared, possibly unmounted handles to the
//!   elements treated as "inside". One reference or many, normalized to a set.
//! - [`OutsidePress`]: owns the listener lifecycle on a [`ListenerRoot`] and
//!   applies the containment test on every watched interaction.
//! - [`Capabilities`]: boolean platform probes (is there a document, are passive
//!   listeners honored) and [`ListenerOptions::negotiate`] for per-kind options.
//! - [`Latest`]: the single-slot cell the installed listener reads the current
//!   handler and regions through.
//! - [`Document`]: a headless document model implementing [`ListenerRoot`], for
//!   native hosts and tests.
//!
//! ## Behavior
//!
//! For every watched interaction ([`InteractionKind::ALL`]):
//!
//! 1. Resolve the regions, skipping references whose element is not mounted.
//! 2. If the target is any region or inside one, do nothing.
//! 3. Otherwise call the handler current at that moment.
//!
//! Listeners are installed when the handler becomes present and removed when it
//! becomes absent, when [`OutsidePress::teardown`] is called, or when the
//! detector is dropped. Swapping handlers or regions does not reinstall.
//!
//! The detector never prevents default behavior or stops propagation, does not
//! coalesce rapid interactions, and does not handle keyboard dismissal.
//!
//! ## Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use understory_outside_press::{
//!     Document, Handler, InteractionEvent, OutsidePress, RegionRef, StaticCapabilities,
//! };
//!
//! let doc = Document::new();
//! let trigger = doc.create_child(doc.root()).unwrap();
//! let popover = doc.create_child(doc.root()).unwrap();
//! let body = doc.create_child(doc.root()).unwrap();
//!
//! let regions = [RegionRef::attached(trigger), RegionRef::attached(popover)];
//! let closes = Rc::new(Cell::new(0));
//! let c = closes.clone();
//! let close: Handler<InteractionEvent> = Rc::new(move |_| c.set(c.get() + 1));
//!
//! let mut outside = OutsidePress::new(doc.clone(), StaticCapabilities::BROWSER);
//! outside.evaluate(regions.clone(), Some(close));
//!
//! doc.touch_start(popover).unwrap();
//! doc.pointer_down(trigger).unwrap();
//! assert_eq!(closes.get(), 0);
//!
//! doc.pointer_down(body).unwrap();
//! assert_eq!(closes.get(), 1);
//!
//! // Disabled: listeners are gone.
//! outside.evaluate(regions, None);
//! doc.pointer_down(body).unwrap();
//! assert_eq!(closes.get(), 1);
//! ```
//!
//! ## Features
//!
//! - `std` (default): no effect beyond marking `std` builds.
//! - `web`: a `web_sys::Document` backend in the `web` module, on `wasm32` only.
//!
//! Diagnostics go through the `log` facade: `debug` for listener installation and
//! removal, `trace` for per-interaction decisions.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod capability;
mod detector;
pub mod document;
mod kind;
mod latest;
mod region;
mod root;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

pub use capability::{Capabilities, ListenerOptions, StaticCapabilities};
pub use detector::OutsidePress;
pub use document::{Document, InteractionEvent, NodeId, TreeError};
pub use kind::InteractionKind;
pub use latest::Latest;
pub use region::{RegionRef, RegionSet};
pub use root::{Handler, Listener, ListenerRoot};
