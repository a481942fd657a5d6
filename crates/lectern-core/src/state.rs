#![forbid(unsafe_code)]

//! Immutable palette state and the partial patches that derive new states.
//!
//! A [`PaletteState`] is never mutated in place. [`PaletteState::update`]
//! returns a fresh state built from the receiver with the fields present in
//! a [`StatePatch`] overridden, and announces the patch on the state's
//! update channel. Derived states share that channel with their origin, so a
//! host subscribed once sees every transition of one palette.
//!
//! # Invariants
//!
//! 1. `update` never changes the receiver.
//! 2. Fields absent from the patch are inherited unchanged.
//! 3. Extension entries are kept in key order, so two states with the same
//!    fields compare equal and iterate identically.
//!
//! The update channel is not part of a state's identity: equality and
//! serialization ignore it.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "state-persistence")]
use serde::{Deserialize, Serialize};

use crate::event::EventChannel;

/// Result ceiling used by [`PaletteState::default`].
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Stable identifier for a registered category.
///
/// Navigation targets are identifiers resolved through the controller's
/// registry, never live category instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "state-persistence",
    derive(Serialize, Deserialize),
    serde(transparent)
)]
pub struct CategoryId(Cow<'static, str>);

impl CategoryId {
    /// Identifier backed by a static string (usable in `const` items).
    #[must_use]
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Identifier from an owned or borrowed string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// The identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for CategoryId {
    fn from(id: &'static str) -> Self {
        Self::from_static(id)
    }
}

impl From<String> for CategoryId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Value stored in a state's extension map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "state-persistence", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "state-persistence", serde(untagged))]
pub enum ExtValue {
    /// Boolean flag.
    Flag(bool),
    /// Integer (ordinals, levels, indices).
    Int(i64),
    /// Free text (names, tags).
    Text(String),
}

impl ExtValue {
    /// The value as text, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The value as an integer, if it is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a flag, if it is one.
    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for ExtValue {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

impl From<i64> for ExtValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ExtValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for ExtValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<usize> for ExtValue {
    fn from(v: usize) -> Self {
        Self::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<&str> for ExtValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ExtValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// A partial [`PaletteState`]: only the fields that are `Some` override.
///
/// `active_category` is doubly optional so a patch can both set a category
/// (`Some(Some(id))`) and clear it (`Some(None)`). Extension entries mapped to
/// `None` are removed from the derived state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "state-persistence", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "state-persistence", serde(default))]
pub struct StatePatch {
    pub query: Option<String>,
    pub max_results: Option<usize>,
    pub active_category: Option<Option<CategoryId>>,
    pub expanded: Option<bool>,
    pub extensions: BTreeMap<String, Option<ExtValue>>,
}

impl StatePatch {
    /// An empty patch (derives an equal state).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the query.
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Override the result ceiling.
    #[must_use]
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Make `id` the active category.
    #[must_use]
    pub fn activate(mut self, id: impl Into<CategoryId>) -> Self {
        self.active_category = Some(Some(id.into()));
        self
    }

    /// Clear the active category (show every category).
    #[must_use]
    pub fn deactivate(mut self) -> Self {
        self.active_category = Some(None);
        self
    }

    /// Override the expanded flag.
    #[must_use]
    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    /// Set an extension field.
    #[must_use]
    pub fn ext(mut self, key: impl Into<String>, value: impl Into<ExtValue>) -> Self {
        self.extensions.insert(key.into(), Some(value.into()));
        self
    }

    /// Remove an extension field from the derived state.
    #[must_use]
    pub fn clear_ext(mut self, key: impl Into<String>) -> Self {
        self.extensions.insert(key.into(), None);
        self
    }

    /// Whether the patch overrides nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.max_results.is_none()
            && self.active_category.is_none()
            && self.expanded.is_none()
            && self.extensions.is_empty()
    }
}

/// Immutable snapshot of what the palette is showing.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "state-persistence", derive(Serialize, Deserialize))]
pub struct PaletteState {
    query: String,
    max_results: usize,
    active_category: Option<CategoryId>,
    expanded: bool,
    extensions: BTreeMap<String, ExtValue>,
    #[cfg_attr(feature = "state-persistence", serde(skip))]
    updates: EventChannel<StatePatch>,
}

impl Default for PaletteState {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PaletteState {
    fn eq(&self, other: &Self) -> bool {
        self.query == other.query
            && self.max_results == other.max_results
            && self.active_category == other.active_category
            && self.expanded == other.expanded
            && self.extensions == other.extensions
    }
}

impl Eq for PaletteState {}

impl PaletteState {
    /// Empty query, default ceiling, no active category, collapsed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            query: String::new(),
            max_results: DEFAULT_MAX_RESULTS,
            active_category: None,
            expanded: false,
            extensions: BTreeMap::new(),
            updates: EventChannel::new(),
        }
    }

    /// Builder: replace the result ceiling of a freshly built state.
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Builder: attach an existing update channel.
    #[must_use]
    pub fn with_updates(mut self, updates: EventChannel<StatePatch>) -> Self {
        self.updates = updates;
        self
    }

    /// Derive a new state with `patch` applied and announce the patch.
    #[must_use]
    pub fn update(&self, patch: &StatePatch) -> PaletteState {
        let mut next = self.clone();
        if let Some(query) = &patch.query {
            next.query.clone_from(query);
        }
        if let Some(max_results) = patch.max_results {
            next.max_results = max_results;
        }
        if let Some(active) = &patch.active_category {
            next.active_category.clone_from(active);
        }
        if let Some(expanded) = patch.expanded {
            next.expanded = expanded;
        }
        for (key, value) in &patch.extensions {
            match value {
                Some(value) => {
                    next.extensions.insert(key.clone(), value.clone());
                }
                None => {
                    next.extensions.remove(key);
                }
            }
        }
        self.updates.emit(patch);
        next
    }

    /// Current query text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Result ceiling per category.
    #[must_use]
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// The active category, if one is selected.
    #[must_use]
    pub fn active_category(&self) -> Option<&CategoryId> {
        self.active_category.as_ref()
    }

    /// Whether `id` is the active category.
    #[must_use]
    pub fn is_active(&self, id: &CategoryId) -> bool {
        self.active_category.as_ref() == Some(id)
    }

    /// Whether the host asked for the full (non-preview) listing.
    #[must_use]
    pub fn expanded(&self) -> bool {
        self.expanded
    }

    /// Raw extension value.
    #[must_use]
    pub fn ext(&self, key: &str) -> Option<&ExtValue> {
        self.extensions.get(key)
    }

    /// Extension value as an integer.
    #[must_use]
    pub fn ext_int(&self, key: &str) -> Option<i64> {
        self.ext(key).and_then(ExtValue::as_int)
    }

    /// Extension value as text.
    #[must_use]
    pub fn ext_text(&self, key: &str) -> Option<&str> {
        self.ext(key).and_then(ExtValue::as_text)
    }

    /// Extension value as a flag.
    #[must_use]
    pub fn ext_flag(&self, key: &str) -> Option<bool> {
        self.ext(key).and_then(ExtValue::as_flag)
    }

    /// All extension fields in key order.
    pub fn extensions(&self) -> impl Iterator<Item = (&str, &ExtValue)> {
        self.extensions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Channel on which [`update`](Self::update) announces patches.
    #[must_use]
    pub fn updates(&self) -> &EventChannel<StatePatch> {
        &self.updates
    }
}
