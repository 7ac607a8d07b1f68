// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend: install outside-press listeners on a `web_sys::Document`.
//!
//! Regions resolve to `web_sys::Node`s; containment uses `Node::contains` on the
//! event target. [`WebCapabilities`] answers the probes from the live page.
//!
//! ```ignore
//! use std::rc::Rc;
//! use understory_outside_press::RegionRef;
//! use understory_outside_press::web::{WebCapabilities, WebRoot};
//! use understory_outside_press::OutsidePress;
//!
//! let root = WebRoot::from_window().expect("page has a document");
//! let popover = RegionRef::attached(popover_element.into());
//! let mut outside = OutsidePress::new(root, WebCapabilities);
//! outside.evaluate(&popover, Some(Rc::new(move |_event: &web_sys::Event| close())));
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt;

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Document, Event, EventListenerOptions, Node};

use crate::capability::{Capabilities, ListenerOptions};
use crate::kind::InteractionKind;
use crate::root::{Listener, ListenerRoot};

/// A `web_sys::Document` used as the listener root.
#[derive(Clone, Debug)]
pub struct WebRoot {
    document: Document,
}

impl WebRoot {
    /// Wrap an existing document.
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The current window's document, if there is one.
    pub fn from_window() -> Option<Self> {
        web_sys::window()
            .and_then(|w| w.document())
            .map(Self::new)
    }

    /// The wrapped document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

/// An installed browser listener. Keeps the JS closure alive until removal.
pub struct WebListener {
    kind: InteractionKind,
    options: ListenerOptions,
    closure: Closure<dyn Fn(Event)>,
}

impl fmt::Debug for WebListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebListener")
            .field("kind", &self.kind)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ListenerRoot for WebRoot {
    type Node = Node;
    type Event = Event;
    type Handle = WebListener;

    fn add_listener(
        &self,
        kind: InteractionKind,
        options: ListenerOptions,
        listener: Listener<Event>,
    ) -> WebListener {
        let closure = Closure::wrap(Box::new(move |event: Event| listener(&event)) as Box<dyn Fn(Event)>);
        let callback: &Function = closure.as_ref().unchecked_ref();
        let result = if options.is_none() {
            self.document
                .add_event_listener_with_callback(kind.event_type(), callback)
        } else {
            let opts = AddEventListenerOptions::new();
            opts.set_passive(options.passive);
            self.document
                .add_event_listener_with_callback_and_add_event_listener_options(
                    kind.event_type(),
                    callback,
                    &opts,
                )
        };
        if let Err(err) = result {
            log::debug!("adding {kind} listener failed: {err:?}");
        }
        WebListener {
            kind,
            options,
            closure,
        }
    }

    fn remove_listener(&self, handle: WebListener) {
        let callback: &Function = handle.closure.as_ref().unchecked_ref();
        let result = if handle.options.is_none() {
            self.document
                .remove_event_listener_with_callback(handle.kind.event_type(), callback)
        } else {
            // Removal only matches on capture, which is never set here.
            let opts = EventListenerOptions::new();
            self.document
                .remove_event_listener_with_callback_and_event_listener_options(
                    handle.kind.event_type(),
                    callback,
                    &opts,
                )
        };
        if let Err(err) = result {
            log::debug!("removing {} listener failed: {err:?}", handle.kind);
        }
    }

    fn is_inside(region: &Node, event: &Event) -> bool {
        event
            .target()
            .and_then(|target| target.dyn_into::<Node>().ok())
            .is_some_and(|target| region.contains(Some(&target)))
    }
}

/// Capability probes answered by the running page.
#[derive(Copy, Clone, Debug, Default)]
pub struct WebCapabilities;

impl Capabilities for WebCapabilities {
    fn is_interactive(&self) -> bool {
        web_sys::window().and_then(|w| w.document()).is_some()
    }

    fn passive_listeners_supported(&self) -> bool {
        probe_passive().unwrap_or(false)
    }
}

/// Register a throwaway listener whose options object reports when `passive`
/// is read. Browsers that understand the option read it.
fn probe_passive() -> Result<bool, JsValue> {
    let Some(window) = web_sys::window() else {
        return Ok(false);
    };
    let supported = Rc::new(Cell::new(false));
    let flag = Rc::clone(&supported);
    let getter = Closure::wrap(Box::new(move || {
        flag.set(true);
        JsValue::FALSE
    }) as Box<dyn Fn() -> JsValue>);

    let descriptor = Object::new();
    Reflect::set(&descriptor, &JsValue::from_str("get"), getter.as_ref())?;
    let options = Object::new();
    Object::define_property(&options, &JsValue::from_str("passive"), &descriptor);

    let noop = Function::new_no_args("");
    let event_type = JsValue::from_str("understory-passive-probe");
    let add: Function = Reflect::get(&window, &JsValue::from_str("addEventListener"))?.dyn_into()?;
    let remove: Function =
        Reflect::get(&window, &JsValue::from_str("removeEventListener"))?.dyn_into()?;
    add.call3(&window, &event_type, &noop, &options)?;
    remove.call3(&window, &event_type, &noop, &options)?;
    Ok(supported.get())
}
