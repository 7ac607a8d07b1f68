// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capability probes and per-kind listener option negotiation.
//!
//! The detector never inspects the platform itself. It asks a [`Capabilities`]
//! implementation two questions:
//!
//! - Is there a document-like root to listen on at all?
//! - Does the platform honor passive listeners?
//!
//! The second answer feeds [`ListenerOptions::negotiate`], which is queried once
//! per registration cycle. Only [`InteractionKind::TouchStart`] is ever registered
//! as passive; [`InteractionKind::PointerDown`] always uses default options.
//!
//! ```
//! use understory_outside_press::{InteractionKind, ListenerOptions};
//!
//! assert_eq!(
//!     ListenerOptions::negotiate(InteractionKind::TouchStart, true),
//!     ListenerOptions::PASSIVE
//! );
//! assert_eq!(
//!     ListenerOptions::negotiate(InteractionKind::TouchStart, false),
//!     ListenerOptions::NONE
//! );
//! assert_eq!(
//!     ListenerOptions::negotiate(InteractionKind::PointerDown, true),
//!     ListenerOptions::NONE
//! );
//! ```

use crate::kind::InteractionKind;

/// Boolean platform probes consumed by the detector.
///
/// Implementations should be pure: the detector may call them on every
/// evaluation and every registration cycle.
pub trait Capabilities {
    /// Returns `true` if a document-like root with global listener registration exists.
    fn is_interactive(&self) -> bool;

    /// Returns `true` if the platform honors the passive listener option.
    fn passive_listeners_supported(&self) -> bool;
}

impl<C: Capabilities + ?Sized> Capabilities for &C {
    fn is_interactive(&self) -> bool {
        (**self).is_interactive()
    }

    fn passive_listeners_supported(&self) -> bool {
        (**self).passive_listeners_supported()
    }
}

/// Fixed capability answers, for headless hosts and tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StaticCapabilities {
    /// Answer for [`Capabilities::is_interactive`].
    pub interactive: bool,
    /// Answer for [`Capabilities::passive_listeners_supported`].
    pub passive_listeners: bool,
}

impl StaticCapabilities {
    /// An interactive host with passive listener support.
    pub const BROWSER: Self = Self {
        interactive: true,
        passive_listeners: true,
    };

    /// An interactive host without passive listener support.
    pub const LEGACY_BROWSER: Self = Self {
        interactive: true,
        passive_listeners: false,
    };

    /// A host with no document (server rendering, batch jobs).
    pub const HEADLESS: Self = Self {
        interactive: false,
        passive_listeners: false,
    };
}

impl Default for StaticCapabilities {
    fn default() -> Self {
        Self::BROWSER
    }
}

impl Capabilities for StaticCapabilities {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn passive_listeners_supported(&self) -> bool {
        self.passive_listeners
    }
}

/// Options a listener was (or will be) registered with.
///
/// The value used at registration is recorded in the registration handle and
/// reused verbatim for removal, since removal with different options does not
/// match the installed entry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ListenerOptions {
    /// The listener promises not to cancel the default action.
    pub passive: bool,
}

impl ListenerOptions {
    /// No special options.
    pub const NONE: Self = Self { passive: false };

    /// A passive listener.
    pub const PASSIVE: Self = Self { passive: true };

    /// Choose options for `kind` given the platform's passive support.
    pub const fn negotiate(kind: InteractionKind, passive_supported: bool) -> Self {
        match kind {
            InteractionKind::TouchStart if passive_supported => Self::PASSIVE,
            _ => Self::NONE,
        }
    }

    /// Returns `true` if these are the default options.
    pub const fn is_none(self) -> bool {
        !self.passive
    }
}
