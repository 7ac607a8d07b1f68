// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The interaction-start event kinds watched by the detector.

use core::fmt;

/// An interaction-start event kind that can dismiss an overlay.
///
/// The detector registers one listener per kind in [`InteractionKind::ALL`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InteractionKind {
    /// Primary pointer press (`mousedown`).
    PointerDown,
    /// Touch start (`touchstart`).
    TouchStart,
}

impl InteractionKind {
    /// Every watched kind, in registration order.
    pub const ALL: [Self; 2] = [Self::PointerDown, Self::TouchStart];

    /// The platform event type name for this kind.
    pub const fn event_type(self) -> &'static str {
        match self {
            Self::PointerDown => "mousedown",
            Self::TouchStart => "touchstart",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_type())
    }
}
