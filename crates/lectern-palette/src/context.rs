#![forbid(unsafe_code)]

//! Back-navigation history.
//!
//! The `ContextStack` holds every [`PaletteState`] the palette has displayed
//! since it was opened, oldest first. Only the top context is live; lower
//! contexts are what "back" returns to.
//!
//! # Invariants
//!
//! - Never empty while the palette is open (the controller closes the
//!   palette instead of popping the last context).
//! - Contexts are immutable; editing the query replaces the top entry
//!   rather than mutating it.
//!
//! # Failure Modes
//!
//! - `pop()` on an empty stack returns `None` (no panic).
//! - `replace_top()` on an empty stack pushes.

use lectern_core::PaletteState;

/// LIFO history of displayed palette states.
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    contexts: Vec<PaletteState>,
}

impl ContextStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new context on top.
    pub fn push(&mut self, state: PaletteState) {
        self.contexts.push(state);
    }

    /// Remove and return the top context.
    pub fn pop(&mut self) -> Option<PaletteState> {
        self.contexts.pop()
    }

    /// The live context.
    #[inline]
    #[must_use]
    pub fn top(&self) -> Option<&PaletteState> {
        self.contexts.last()
    }

    /// Swap the live context for `state`, returning the previous one.
    pub fn replace_top(&mut self, state: PaletteState) -> Option<PaletteState> {
        let previous = self.contexts.pop();
        self.contexts.push(state);
        previous
    }

    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.contexts.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn clear(&mut self) {
        self.contexts.clear();
    }

    /// Contexts from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &PaletteState> {
        self.contexts.iter()
    }
}
