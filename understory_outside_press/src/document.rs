// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless document: an in-memory node tree with a document-level listener table.
//!
//! [`Document`] lets the detector run without a browser: native toolkits can
//! mirror their widget hierarchy into it, and tests can simulate presses and
//! touches with [`Document::pointer_down`] and [`Document::touch_start`].
//!
//! Semantics follow the platform's document-level listeners:
//!
//! - Listeners for a kind run in registration order.
//! - A listener removed by an earlier listener during the same dispatch is skipped.
//! - A listener added during a dispatch first runs on the next dispatch.
//! - Removal matches kind, listener identity, and options. A mismatch is a silent no-op.
//! - Interactions on nodes detached from the document reach no document-level listener.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use understory_outside_press::{Document, InteractionEvent, InteractionKind, ListenerOptions};
//!
//! let doc = Document::new();
//! let panel = doc.create_child(doc.root()).unwrap();
//! let button = doc.create_child(panel).unwrap();
//! assert!(doc.contains(panel, button));
//!
//! let seen = Rc::new(Cell::new(0));
//! let counter = seen.clone();
//! let id = doc.add_event_listener(
//!     InteractionKind::PointerDown,
//!     Rc::new(move |_: &InteractionEvent| counter.set(counter.get() + 1)),
//!     ListenerOptions::NONE,
//! );
//!
//! assert_eq!(doc.pointer_down(button), Ok(1));
//! assert_eq!(seen.get(), 1);
//!
//! // Wrong options: nothing is removed.
//! assert!(!doc.remove_event_listener(InteractionKind::PointerDown, id, ListenerOptions::PASSIVE));
//! assert!(doc.remove_event_listener(InteractionKind::PointerDown, id, ListenerOptions::NONE));
//! assert_eq!(doc.pointer_down(button), Ok(0));
//! ```

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::capability::ListenerOptions;
use crate::kind::InteractionKind;
use crate::root::{Listener, ListenerRoot};

static NEXT_DOCUMENT: AtomicU32 = AtomicU32::new(0);

/// Identifier of a node in a [`Document`].
///
/// Ids are tagged with the document that created them; other documents reject them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    document: u32,
    index: u32,
}

impl NodeId {
    /// Index of the node in creation order within its document. The root is `0`.
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

/// Identifier of an installed listener entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Errors from tree operations on a [`Document`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The node was not created by this document.
    UnknownNode(NodeId),
    /// The document root cannot be detached.
    DetachRoot,
    /// The document cannot hold more nodes.
    Full,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(node) => {
                write!(f, "node {:?} does not belong to this document", node)
            }
            Self::DetachRoot => f.write_str("the document root cannot be detached"),
            Self::Full => f.write_str("the document has no room for more nodes"),
        }
    }
}

impl core::error::Error for TreeError {}

/// An interaction delivered to document-level listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionEvent {
    kind: InteractionKind,
    path: SmallVec<[NodeId; 8]>,
}

impl InteractionEvent {
    /// Which kind of interaction this is.
    pub fn kind(&self) -> InteractionKind {
        self.kind
    }

    /// The node the interaction landed on.
    pub fn target(&self) -> NodeId {
        // Dispatch only builds events for connected targets, so the path
        // always ends at the target.
        self.path[self.path.len() - 1]
    }

    /// Root→target path at dispatch time.
    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    /// Returns `true` if the target is `node` or one of its descendants.
    pub fn is_within(&self, node: NodeId) -> bool {
        self.path.contains(&node)
    }
}

/// Handle for a listener installed through [`ListenerRoot::add_listener`].
///
/// Records exactly what was installed; consumed on removal.
#[derive(Debug, PartialEq, Eq)]
pub struct DocumentListener {
    kind: InteractionKind,
    id: ListenerId,
    options: ListenerOptions,
}

impl DocumentListener {
    /// Kind the listener was installed for.
    pub fn kind(&self) -> InteractionKind {
        self.kind
    }

    /// Identity of the installed entry.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Options the listener was installed with.
    pub fn options(&self) -> ListenerOptions {
        self.options
    }
}

struct Entry {
    id: ListenerId,
    options: ListenerOptions,
    callback: Listener<InteractionEvent>,
}

#[derive(Copy, Clone, Debug)]
struct Slot {
    parent: Option<NodeId>,
}

struct Tree {
    id: u32,
    nodes: Vec<Slot>,
    listeners: HashMap<InteractionKind, Vec<Entry>>,
    next_listener: u64,
}

impl Tree {
    fn root(&self) -> NodeId {
        NodeId {
            document: self.id,
            index: 0,
        }
    }

    fn check(&self, node: NodeId) -> Result<(), TreeError> {
        if node.document == self.id && node.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(TreeError::UnknownNode(node))
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.index()).and_then(|slot| slot.parent)
    }

    /// Root→node path, or `None` if `node` is not connected to the root.
    fn path_from_root(&self, node: NodeId) -> Option<SmallVec<[NodeId; 8]>> {
        let mut path: SmallVec<[NodeId; 8]> = SmallVec::new();
        let mut cur = Some(node);
        while let Some(n) = cur {
            path.push(n);
            cur = self.parent(n);
        }
        if path.last() != Some(&self.root()) {
            return None;
        }
        path.reverse();
        Some(path)
    }

    fn is_installed(&self, kind: InteractionKind, id: ListenerId) -> bool {
        self.listeners
            .get(&kind)
            .is_some_and(|entries| entries.iter().any(|e| e.id == id))
    }
}

/// In-memory document. Clones share the same tree and listener table.
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<Tree>>,
}

impl Document {
    /// Create a document holding only its root node.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Tree {
                id: NEXT_DOCUMENT.fetch_add(1, Ordering::Relaxed),
                nodes: vec![Slot { parent: None }],
                listeners: HashMap::new(),
                next_listener: 0,
            })),
        }
    }

    /// The document root node.
    pub fn root(&self) -> NodeId {
        self.inner.borrow().root()
    }

    /// Number of nodes ever created, including the root and detached nodes.
    pub fn node_count(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    /// Append a new node under `parent`.
    pub fn create_child(&self, parent: NodeId) -> Result<NodeId, TreeError> {
        let mut tree = self.inner.borrow_mut();
        tree.check(parent)?;
        let index = u32::try_from(tree.nodes.len()).map_err(|_| TreeError::Full)?;
        tree.nodes.push(Slot {
            parent: Some(parent),
        });
        Ok(NodeId {
            document: tree.id,
            index,
        })
    }

    /// Detach `node` (and its subtree) from the document.
    ///
    /// Detaching an already detached node is a no-op.
    pub fn detach(&self, node: NodeId) -> Result<(), TreeError> {
        let mut tree = self.inner.borrow_mut();
        tree.check(node)?;
        if node == tree.root() {
            return Err(TreeError::DetachRoot);
        }
        tree.nodes[node.index()].parent = None;
        Ok(())
    }

    /// Returns `true` if `node` is reachable from the root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let tree = self.inner.borrow();
        tree.check(node).is_ok() && tree.path_from_root(node).is_some()
    }

    /// Returns `true` if `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let tree = self.inner.borrow();
        if tree.check(ancestor).is_err() || tree.check(node).is_err() {
            return false;
        }
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = tree.parent(n);
        }
        false
    }

    /// Install a document-level listener for `kind`.
    pub fn add_event_listener(
        &self,
        kind: InteractionKind,
        listener: Listener<InteractionEvent>,
        options: ListenerOptions,
    ) -> ListenerId {
        let mut tree = self.inner.borrow_mut();
        let id = ListenerId(tree.next_listener);
        tree.next_listener += 1;
        tree.listeners.entry(kind).or_default().push(Entry {
            id,
            options,
            callback: listener,
        });
        id
    }

    /// Remove the entry for `kind` with identity `id` installed with `options`.
    ///
    /// Returns `false` (and removes nothing) if no entry matches all three.
    pub fn remove_event_listener(
        &self,
        kind: InteractionKind,
        id: ListenerId,
        options: ListenerOptions,
    ) -> bool {
        let mut tree = self.inner.borrow_mut();
        let Some(entries) = tree.listeners.get_mut(&kind) else {
            return false;
        };
        match entries
            .iter()
            .position(|e| e.id == id && e.options == options)
        {
            Some(pos) => {
                entries.remove(pos);
                true
            }
            None => {
                log::trace!("no {kind} listener {id:?} with {options:?}; nothing removed");
                false
            }
        }
    }

    /// Number of listeners currently installed for `kind`.
    pub fn listener_count(&self, kind: InteractionKind) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Deliver an interaction of `kind` on `target` to the document-level listeners.
    ///
    /// Returns the number of listeners invoked. Detached targets invoke none.
    pub fn dispatch(&self, kind: InteractionKind, target: NodeId) -> Result<usize, TreeError> {
        let (event, snapshot) = {
            let tree = self.inner.borrow();
            tree.check(target)?;
            let Some(path) = tree.path_from_root(target) else {
                log::trace!("{kind} on detached {target:?} does not reach the document");
                return Ok(0);
            };
            let snapshot: SmallVec<[(ListenerId, Listener<InteractionEvent>); 4]> = tree
                .listeners
                .get(&kind)
                .map(|entries| {
                    entries
                        .iter()
                        .map(|e| (e.id, Rc::clone(&e.callback)))
                        .collect()
                })
                .unwrap_or_default();
            (InteractionEvent { kind, path }, snapshot)
        };

        let mut invoked = 0;
        for (id, callback) in snapshot {
            // An earlier listener may have removed this one.
            if !self.inner.borrow().is_installed(kind, id) {
                continue;
            }
            callback(&event);
            invoked += 1;
        }
        Ok(invoked)
    }

    /// Simulate a primary pointer press on `target`.
    pub fn pointer_down(&self, target: NodeId) -> Result<usize, TreeError> {
        self.dispatch(InteractionKind::PointerDown, target)
    }

    /// Simulate a touch start on `target`.
    pub fn touch_start(&self, target: NodeId) -> Result<usize, TreeError> {
        self.dispatch(InteractionKind::TouchStart, target)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(tree) = self.inner.try_borrow() else {
            return f.write_str("Document(<borrowed>)");
        };
        let mut listeners: SmallVec<[(InteractionKind, usize); 2]> = tree
            .listeners
            .iter()
            .map(|(kind, entries)| (*kind, entries.len()))
            .collect();
        listeners.sort();
        f.debug_struct("Document")
            .field("nodes", &tree.nodes.len())
            .field("listeners", &listeners)
            .finish()
    }
}

impl ListenerRoot for Document {
    type Node = NodeId;
    type Event = InteractionEvent;
    type Handle = DocumentListener;

    fn add_listener(
        &self,
        kind: InteractionKind,
        options: ListenerOptions,
        listener: Listener<InteractionEvent>,
    ) -> DocumentListener {
        let id = self.add_event_listener(kind, listener, options);
        DocumentListener { kind, id, options }
    }

    fn remove_listener(&self, handle: DocumentListener) {
        if !self.remove_event_listener(handle.kind, handle.id, handle.options) {
            log::debug!("{} listener {:?} was already removed", handle.kind, handle.id);
        }
    }

    fn is_inside(region: &NodeId, event: &InteractionEvent) -> bool {
        event.is_within(*region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, Listener<InteractionEvent>) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, Rc::new(move |_: &InteractionEvent| c.set(c.get() + 1)))
    }

    #[test]
    fn create_child_rejects_foreign_parent() {
        let doc = Document::new();
        let other = Document::new();
        let a = other.create_child(other.root()).unwrap();
        let b = other.create_child(a).unwrap();
        assert_eq!(doc.create_child(b), Err(TreeError::UnknownNode(b)));
    }

    #[test]
    fn foreign_ids_are_rejected_even_when_the_index_exists() {
        let doc = Document::new();
        let other = Document::new();
        let mine = doc.create_child(doc.root()).unwrap();
        let theirs = other.create_child(other.root()).unwrap();
        assert_eq!(mine.index(), theirs.index());
        assert_ne!(mine, theirs);
        assert_ne!(doc.root(), other.root());

        assert_eq!(doc.create_child(theirs), Err(TreeError::UnknownNode(theirs)));
        assert_eq!(doc.create_child(other.root()), Err(TreeError::UnknownNode(other.root())));
        assert!(!doc.contains(doc.root(), theirs));
        assert!(!doc.contains(other.root(), mine));
        assert!(!doc.is_connected(theirs));
        assert_eq!(doc.detach(theirs), Err(TreeError::UnknownNode(theirs)));
        assert_eq!(doc.detach(other.root()), Err(TreeError::UnknownNode(other.root())));
        assert_eq!(doc.pointer_down(theirs), Err(TreeError::UnknownNode(theirs)));

        // The foreign calls left this document untouched.
        assert_eq!(doc.node_count(), 2);
        assert!(other.is_connected(theirs));
    }

    #[test]
    fn tree_errors_describe_themselves() {
        use alloc::string::ToString;

        assert_eq!(
            TreeError::Full.to_string(),
            "the document has no room for more nodes"
        );
        assert_eq!(
            TreeError::DetachRoot.to_string(),
            "the document root cannot be detached"
        );
    }

    #[test]
    fn contains_is_inclusive_and_follows_ancestry() {
        let doc = Document::new();
        let div = doc.create_child(doc.root()).unwrap();
        let span = doc.create_child(div).unwrap();
        let p = doc.create_child(doc.root()).unwrap();

        assert!(doc.contains(div, div));
        assert!(doc.contains(div, span));
        assert!(!doc.contains(span, div));
        assert!(!doc.contains(div, p));
        assert!(doc.contains(doc.root(), span));
    }

    #[test]
    fn event_path_runs_root_to_target() {
        let doc = Document::new();
        let div = doc.create_child(doc.root()).unwrap();
        let span = doc.create_child(div).unwrap();

        let seen: Rc<RefCell<Vec<NodeId>>> = Rc::default();
        let s = Rc::clone(&seen);
        doc.add_event_listener(
            InteractionKind::TouchStart,
            Rc::new(move |e: &InteractionEvent| {
                assert_eq!(e.kind(), InteractionKind::TouchStart);
                assert_eq!(e.target(), e.path()[e.path().len() - 1]);
                s.borrow_mut().extend_from_slice(e.path());
            }),
            ListenerOptions::PASSIVE,
        );

        assert_eq!(doc.touch_start(span), Ok(1));
        assert_eq!(*seen.borrow(), vec![doc.root(), div, span]);
    }

    #[test]
    fn listeners_are_per_kind() {
        let doc = Document::new();
        let (count, listener) = counter();
        doc.add_event_listener(InteractionKind::PointerDown, listener, ListenerOptions::NONE);

        assert_eq!(doc.touch_start(doc.root()), Ok(0));
        assert_eq!(doc.pointer_down(doc.root()), Ok(1));
        assert_eq!(count.get(), 1);
        assert_eq!(doc.listener_count(InteractionKind::PointerDown), 1);
        assert_eq!(doc.listener_count(InteractionKind::TouchStart), 0);
    }

    #[test]
    fn removal_with_mismatched_options_is_silent_noop() {
        let doc = Document::new();
        let (count, listener) = counter();
        let id = doc.add_event_listener(InteractionKind::TouchStart, listener, ListenerOptions::PASSIVE);

        assert!(!doc.remove_event_listener(InteractionKind::TouchStart, id, ListenerOptions::NONE));
        assert!(!doc.remove_event_listener(InteractionKind::PointerDown, id, ListenerOptions::PASSIVE));
        assert_eq!(doc.touch_start(doc.root()), Ok(1));

        assert!(doc.remove_event_listener(InteractionKind::TouchStart, id, ListenerOptions::PASSIVE));
        assert_eq!(doc.touch_start(doc.root()), Ok(0));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn removal_leaves_unrelated_listeners_alone() {
        let doc = Document::new();
        let (mine, a) = counter();
        let (theirs, b) = counter();
        let id = doc.add_event_listener(InteractionKind::PointerDown, a, ListenerOptions::NONE);
        doc.add_event_listener(InteractionKind::PointerDown, b, ListenerOptions::NONE);

        assert!(doc.remove_event_listener(InteractionKind::PointerDown, id, ListenerOptions::NONE));
        assert_eq!(doc.pointer_down(doc.root()), Ok(1));
        assert_eq!(mine.get(), 0);
        assert_eq!(theirs.get(), 1);
    }

    #[test]
    fn detached_targets_reach_no_listener() {
        let doc = Document::new();
        let div = doc.create_child(doc.root()).unwrap();
        let span = doc.create_child(div).unwrap();
        let (count, listener) = counter();
        doc.add_event_listener(InteractionKind::PointerDown, listener, ListenerOptions::NONE);

        doc.detach(div).unwrap();
        assert!(!doc.is_connected(span));
        assert_eq!(doc.pointer_down(span), Ok(0));
        assert_eq!(count.get(), 0);
        assert_eq!(doc.detach(doc.root()), Err(TreeError::DetachRoot));
    }

    #[test]
    fn dispatch_to_unknown_node_is_an_error() {
        let doc = Document::new();
        let other = Document::new();
        let a = other.create_child(other.root()).unwrap();
        assert_eq!(doc.pointer_down(a), Err(TreeError::UnknownNode(a)));
    }

    #[test]
    fn listener_removed_mid_dispatch_is_skipped() {
        let doc = Document::new();
        let (count, second) = counter();
        let victim: Rc<Cell<Option<ListenerId>>> = Rc::default();

        let d = doc.clone();
        let v = Rc::clone(&victim);
        doc.add_event_listener(
            InteractionKind::PointerDown,
            Rc::new(move |_: &InteractionEvent| {
                if let Some(id) = v.take() {
                    d.remove_event_listener(InteractionKind::PointerDown, id, ListenerOptions::NONE);
                }
            }),
            ListenerOptions::NONE,
        );
        victim.set(Some(doc.add_event_listener(
            InteractionKind::PointerDown,
            second,
            ListenerOptions::NONE,
        )));

        assert_eq!(doc.pointer_down(doc.root()), Ok(1));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn listener_added_mid_dispatch_waits_for_next_dispatch() {
        let doc = Document::new();
        let (count, late) = counter();
        let pending = Rc::new(RefCell::new(Some(late)));

        let d = doc.clone();
        let p = Rc::clone(&pending);
        doc.add_event_listener(
            InteractionKind::PointerDown,
            Rc::new(move |_: &InteractionEvent| {
                if let Some(l) = p.borrow_mut().take() {
                    d.add_event_listener(InteractionKind::PointerDown, l, ListenerOptions::NONE);
                }
            }),
            ListenerOptions::NONE,
        );

        assert_eq!(doc.pointer_down(doc.root()), Ok(1));
        assert_eq!(count.get(), 0);
        assert_eq!(doc.pointer_down(doc.root()), Ok(2));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn root_handle_removes_exactly_what_it_installed() {
        let doc = Document::new();
        let (_, listener) = counter();
        let handle = doc.add_listener(InteractionKind::TouchStart, ListenerOptions::PASSIVE, listener);
        assert_eq!(handle.kind(), InteractionKind::TouchStart);
        assert_eq!(handle.options(), ListenerOptions::PASSIVE);
        assert_eq!(doc.listener_count(InteractionKind::TouchStart), 1);

        doc.remove_listener(handle);
        assert_eq!(doc.listener_count(InteractionKind::TouchStart), 0);
    }
}
