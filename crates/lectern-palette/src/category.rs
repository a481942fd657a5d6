#![forbid(unsafe_code)]

//! The category contract.
//!
//! A [`Category`] owns one class of candidates (verses, topics, settings,
//! ...). The controller drives every category through four hooks:
//!
//! 1. [`trigger`](Category::trigger): refresh the candidate buffer and title
//!    from the new [`PaletteState`].
//! 2. [`list`](Category::list): narrow the buffer by the query.
//! 3. [`describe`](Category::describe): turn a candidate into an [`Entry`]
//!    (label, description, and the patch that drilling into it produces).
//! 4. [`invoke`](Category::invoke): the terminal action, reported back as an
//!    [`Invocation`] the controller applies.
//!
//! Categories never touch controller state. They cannot reach the
//! controller at all; navigation happens only through the patches and
//! invocations they return.
//!
//! # Type erasure
//!
//! Each category has its own candidate type. The controller stores
//! categories as `Box<dyn AnyCategory>`, with the listed candidates kept
//! inside the erased slot so a rendered row only needs `(slot, index)`.

use lectern_core::{CategoryId, PaletteState, StatePatch};

use crate::command::CommandSet;
use crate::error::{HookError, HookResult};

/// How a candidate is shown, and where drilling into it leads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    /// Primary text.
    pub label: String,
    /// Secondary text (verse body, setting value, ...).
    pub description: Option<String>,
    /// Patch applied when the user drills into the candidate.
    pub drill: Option<StatePatch>,
}

impl Entry {
    /// Entry with a label only.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            drill: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the drill-in patch.
    #[must_use]
    pub fn with_drill(mut self, patch: StatePatch) -> Self {
        self.drill = Some(patch);
        self
    }

    /// Whether the candidate permits further navigation.
    #[must_use]
    pub fn is_drillable(&self) -> bool {
        self.drill.is_some()
    }
}

/// What the controller should do after a candidate is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Close the palette.
    Close,
    /// Re-trigger and re-render the current context, keeping the selection.
    Refresh,
    /// Push a new context derived from the current one.
    Display(StatePatch),
    /// Replace the query of the current context.
    SetQuery(String),
    /// Do nothing.
    Stay,
}

/// A provider of searchable, executable candidates.
pub trait Category: 'static {
    /// The category's candidate type.
    type Item: Clone + 'static;

    /// Stable identifier used as a navigation target.
    fn id(&self) -> CategoryId;

    /// Human-readable description of what the category offers.
    fn description(&self) -> &str {
        ""
    }

    /// Heading shown above this category's results (set per trigger).
    fn title(&self) -> &str;

    /// Refresh the candidate buffer and title from `state`.
    fn trigger(&mut self, state: &PaletteState) -> HookResult<()>;

    /// Candidates matching `query`, most relevant first.
    fn list(&self, query: &str) -> HookResult<Vec<Self::Item>>;

    /// Presentation of `item` and its drill-in patch.
    fn describe(&self, item: &Self::Item) -> HookResult<Entry>;

    /// Terminal action for `item`.
    fn invoke(&mut self, item: &Self::Item) -> HookResult<Invocation>;

    /// Categories co-displayed while this one is active.
    fn siblings(&self) -> Vec<CategoryId> {
        Vec::new()
    }

    /// Supplementary commands rendered after this category's results.
    ///
    /// Called once, at registration; the controller takes ownership.
    fn secondary(&mut self) -> Option<CommandSet> {
        None
    }

    /// Hidden categories only render while they are the active category.
    fn hidden(&self) -> bool {
        false
    }
}

/// Object-safe view of a registered category.
pub(crate) trait AnyCategory {
    fn id(&self) -> CategoryId;
    fn title(&self) -> String;
    fn description(&self) -> String;
    fn siblings(&self) -> Vec<CategoryId>;
    fn hidden(&self) -> bool;
    fn trigger(&mut self, state: &PaletteState) -> HookResult<()>;
    /// Lists into the slot buffer, keeping at most `limit`; returns the count kept.
    fn list(&mut self, query: &str, limit: usize) -> HookResult<usize>;
    fn describe(&self, index: usize) -> HookResult<Entry>;
    fn invoke(&mut self, index: usize) -> HookResult<Invocation>;
    fn clear_listed(&mut self);
    fn take_secondary(&mut self) -> Option<CommandSet>;
}

/// Erased wrapper holding a category and its last listed candidates.
pub(crate) struct Slot<C: Category> {
    inner: C,
    listed: Vec<C::Item>,
}

impl<C: Category> Slot<C> {
    pub(crate) fn new(inner: C) -> Self {
        Self {
            inner,
            listed: Vec::new(),
        }
    }

    fn item(&self, index: usize) -> HookResult<&C::Item> {
        self.listed.get(index).ok_or_else(|| {
            HookError::new(format!(
                "candidate {index} is stale ({} listed)",
                self.listed.len()
            ))
        })
    }
}

impl<C: Category> AnyCategory for Slot<C> {
    fn id(&self) -> CategoryId {
        self.inner.id()
    }

    fn title(&self) -> String {
        self.inner.title().to_string()
    }

    fn description(&self) -> String {
        self.inner.description().to_string()
    }

    fn siblings(&self) -> Vec<CategoryId> {
        self.inner.siblings()
    }

    fn hidden(&self) -> bool {
        self.inner.hidden()
    }

    fn trigger(&mut self, state: &PaletteState) -> HookResult<()> {
        self.listed.clear();
        self.inner.trigger(state)
    }

    fn list(&mut self, query: &str, limit: usize) -> HookResult<usize> {
        self.listed.clear();
        let mut items = self.inner.list(query)?;
        items.truncate(limit);
        self.listed = items;
        Ok(self.listed.len())
    }

    fn describe(&self, index: usize) -> HookResult<Entry> {
        let item = self.item(index)?;
        self.inner.describe(item)
    }

    fn invoke(&mut self, index: usize) -> HookResult<Invocation> {
        let item = self.item(index)?.clone();
        self.inner.invoke(&item)
    }

    fn clear_listed(&mut self) {
        self.listed.clear();
    }

    fn take_secondary(&mut self) -> Option<CommandSet> {
        self.inner.secondary()
    }
}
