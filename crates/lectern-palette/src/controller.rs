#![forbid(unsafe_code)]

//! The navigation controller.
//!
//! [`CommandPalette`] owns the category registry, the back-navigation
//! [`ContextStack`], the flattened result list, and the selection. Hosts
//! drive it with lifecycle calls ([`open`](CommandPalette::open),
//! [`display`](CommandPalette::display), [`close`](CommandPalette::close)),
//! query edits ([`set_value`](CommandPalette::set_value)), and keyboard
//! commands ([`handle_key`](CommandPalette::handle_key)).
//!
//! # Render pass
//!
//! Every state change runs one pass:
//!
//! 1. `trigger` every registered category against the new top context.
//! 2. Pick the categories to show: the active category and its siblings, or
//!    every visible top-level category when none is active. Secondary
//!    command sets follow their owners.
//! 3. `list` and `describe` each shown category into [`ResultItem`]s,
//!    grouped per category.
//! 4. Reset or clamp the selection.
//!
//! # Invariants
//!
//! - The context stack is non-empty exactly while the palette is open.
//! - `selected_index()` is `None` iff there are no results, otherwise in
//!   `0..results().len()`.
//! - A failing or panicking hook never aborts a pass. The category
//!   contributes nothing and the fault is kept in
//!   [`last_faults`](CommandPalette::last_faults).
//! - A pending prompt resolves exactly once; closing the palette resolves it
//!   to `None`.
//!
//! # Example
//!
//! ```ignore
//! let mut palette = CommandPalette::new();
//! palette.add_category(Topics::new(library.clone()))?;
//! palette.open(StatePatch::new());
//! palette.set_value("grace", false);
//! palette.handle_key("ArrowDown");
//! palette.handle_key("Enter");
//! ```

use std::fmt;
use std::ops::Range;

use ahash::AHashMap;
use lectern_core::{
    CategoryId, ConfigError, EventChannel, KeyMap, PaletteCommand, PaletteConfig, PaletteState,
    StatePatch,
};
use tracing::debug;

use crate::category::{AnyCategory, Category, Entry, Invocation, Slot};
use crate::command::{Command, CommandList, CommandSet};
use crate::context::ContextStack;
use crate::error::PaletteError;
use crate::fault::{Hook, HookFault, guarded};
use crate::prompt::{self, ConfirmHandle, PROMPT_ID, PromptCategory, PromptHandle, PromptSender};

/// Identifier of the built-in set that [`CommandPalette::add_command`] fills.
pub const COMMANDS_ID: CategoryId = CategoryId::from_static("commands");

/// Suffix appended to a category id to name its secondary command set.
pub const SECONDARY_SUFFIX: &str = ".more";

/// Lifecycle notification, carrying the state it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteEvent {
    /// The palette opened on this state.
    Opened(PaletteState),
    /// A new or revisited context is now on top.
    Displayed(PaletteState),
    /// The palette closed; carries the last displayed state.
    Closed(PaletteState),
}

/// One rendered candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    /// Category that produced the candidate.
    pub category: CategoryId,
    /// What to show, and where drilling leads.
    pub entry: Entry,
    slot: usize,
    index: usize,
}

/// A contiguous run of results from one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultGroup {
    pub category: CategoryId,
    /// Heading set by the category's last trigger.
    pub title: String,
    /// Positions in [`CommandPalette::results`].
    pub range: Range<usize>,
}

struct Registered {
    id: CategoryId,
    category: Box<dyn AnyCategory>,
    /// Owner id when this is a secondary command set.
    secondary_of: Option<CategoryId>,
    /// Id of this category's secondary command set.
    secondary: Option<CategoryId>,
}

/// Keyboard-navigable, multi-category search palette.
pub struct CommandPalette {
    config: PaletteConfig,
    keymap: KeyMap,
    registry: Vec<Registered>,
    index: AHashMap<CategoryId, usize>,
    default_state: PaletteState,
    stack: ContextStack,
    results: Vec<ResultItem>,
    groups: Vec<ResultGroup>,
    selected: Option<usize>,
    open: bool,
    query_selected: bool,
    faults: Vec<HookFault>,
    events: EventChannel<PaletteEvent>,
    prompt: Option<PromptSender>,
    commands: CommandList,
}

impl Default for CommandPalette {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandPalette")
            .field("open", &self.open)
            .field("depth", &self.stack.depth())
            .field("categories", &self.category_ids())
            .field("results", &self.results.len())
            .field("selected", &self.selected)
            .finish()
    }
}

impl CommandPalette {
    /// Palette with default configuration and only the built-in command set.
    #[must_use]
    pub fn new() -> Self {
        Self::build(PaletteConfig::default())
    }

    /// Palette using `config` for result ceilings, matching, and key bindings.
    ///
    /// The config is validated first, as the file loaders do.
    pub fn with_config(config: PaletteConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PaletteConfig) -> Self {
        let commands = CommandSet::new(COMMANDS_ID, "Commands").with_match_mode(config.match_mode());
        let handle = commands.commands();
        let mut palette = Self {
            keymap: config.key_map(),
            default_state: PaletteState::new().with_max_results(config.max_results),
            config,
            registry: Vec::new(),
            index: AHashMap::new(),
            stack: ContextStack::new(),
            results: Vec::new(),
            groups: Vec::new(),
            selected: None,
            open: false,
            query_selected: false,
            faults: Vec::new(),
            events: EventChannel::new(),
            prompt: None,
            commands: handle,
        };
        palette.insert(Box::new(Slot::new(commands)), None, None);
        palette
    }

    // ─── Registration ────────────────────────────────────────────────────

    /// Register a category. Its secondary command set, if any, is registered
    /// alongside it as `<id>.more`.
    pub fn add_category<C: Category>(&mut self, category: C) -> Result<CategoryId, PaletteError> {
        let id = category.id();
        if id == PROMPT_ID {
            return Err(PaletteError::ReservedCategory(id));
        }
        if self.index.contains_key(&id) {
            return Err(PaletteError::DuplicateCategory(id));
        }
        let mut slot: Box<dyn AnyCategory> = Box::new(Slot::new(category));
        let secondary = match slot.take_secondary() {
            Some(mut set) => {
                let more = CategoryId::new(format!("{id}{SECONDARY_SUFFIX}"));
                if self.index.contains_key(&more) {
                    return Err(PaletteError::DuplicateCategory(more));
                }
                set.set_id(more.clone());
                Some((more, set))
            }
            None => None,
        };

        let more_id = secondary.as_ref().map(|(more, _)| more.clone());
        self.insert(slot, None, more_id);
        if let Some((_, set)) = secondary {
            self.insert(Box::new(Slot::new(set)), Some(id.clone()), None);
        }
        debug!(category = %id, "category registered");
        Ok(id)
    }

    /// Append an ad-hoc command to the built-in command set.
    pub fn add_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Deregister a category (and its secondary command set).
    pub fn remove_category(&mut self, id: &CategoryId) -> Result<(), PaletteError> {
        if *id == PROMPT_ID {
            return Err(PaletteError::ReservedCategory(id.clone()));
        }
        if !self.deregister(id) {
            return Err(PaletteError::UnknownCategory(id.clone()));
        }
        debug!(category = %id, "category removed");
        if self.open {
            self.render(false);
        }
        Ok(())
    }

    /// Registered identifiers, in registration order.
    #[must_use]
    pub fn category_ids(&self) -> Vec<CategoryId> {
        self.registry.iter().map(|r| r.id.clone()).collect()
    }

    fn insert(
        &mut self,
        category: Box<dyn AnyCategory>,
        secondary_of: Option<CategoryId>,
        secondary: Option<CategoryId>,
    ) {
        let id = category.id();
        self.index.insert(id.clone(), self.registry.len());
        self.registry.push(Registered {
            id,
            category,
            secondary_of,
            secondary,
        });
    }

    fn deregister(&mut self, id: &CategoryId) -> bool {
        let Some(&position) = self.index.get(id) else {
            return false;
        };
        let removed = self.registry.remove(position);
        if let Some(more) = &removed.secondary {
            self.registry.retain(|r| &r.id != more);
        }
        if let Some(owner) = &removed.secondary_of {
            for r in &mut self.registry {
                if &r.id == owner {
                    r.secondary = None;
                }
            }
        }
        self.index = self
            .registry
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        // Slot positions shifted.
        self.results.clear();
        self.groups.clear();
        self.selected = None;
        true
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Open on `default_state.update(patch)`, discarding any history.
    ///
    /// A pending prompt is abandoned.
    pub fn open(&mut self, patch: StatePatch) {
        self.cancel_prompt();
        self.open_with(&patch);
    }

    fn open_with(&mut self, patch: &StatePatch) {
        self.stack.clear();
        let state = self.default_state.update(patch);
        self.stack.push(state.clone());
        self.open = true;
        self.query_selected = false;
        debug!(query = state.query(), "palette opened");
        self.events.emit(&PaletteEvent::Opened(state));
        self.render(true);
    }

    /// Push a context derived from the current one and render it.
    ///
    /// When closed, the new context derives from the default state and the
    /// palette opens.
    pub fn display(&mut self, patch: StatePatch) {
        let base = self
            .stack
            .top()
            .cloned()
            .unwrap_or_else(|| self.default_state.clone());
        let state = base.update(&patch);
        self.stack.push(state.clone());
        self.open = true;
        self.query_selected = false;
        debug!(
            depth = self.stack.depth(),
            active = ?state.active_category().map(CategoryId::as_str),
            "palette display"
        );
        self.events.emit(&PaletteEvent::Displayed(state));
        self.render(true);
    }

    /// Close, resolving any pending prompt to `None`.
    pub fn close(&mut self) {
        self.cancel_prompt();
        let was_open = self.open;
        let last = self
            .stack
            .top()
            .cloned()
            .unwrap_or_else(|| self.default_state.clone());
        self.stack.clear();
        self.results.clear();
        self.groups.clear();
        self.selected = None;
        self.open = false;
        self.query_selected = false;
        for registered in &mut self.registry {
            registered.category.clear_listed();
        }
        if was_open {
            debug!("palette closed");
            self.events.emit(&PaletteEvent::Closed(last));
        }
    }

    /// Return to the previous context, or close when there is none.
    pub fn go_back(&mut self) {
        if !self.open || self.stack.depth() <= 1 {
            self.close();
            return;
        }
        self.stack.pop();
        let Some(state) = self.stack.top().cloned() else {
            self.close();
            return;
        };
        debug!(depth = self.stack.depth(), "palette back");
        self.events.emit(&PaletteEvent::Displayed(state));
        self.render(true);
    }

    /// Replace the query of the current context and re-render.
    ///
    /// A query edit does not add a back-stack level. `select_text` asks the
    /// host to select the query text (see [`query_selected`](Self::query_selected)).
    pub fn set_value(&mut self, text: impl Into<String>, select_text: bool) {
        let patch = StatePatch::new().query(text);
        match self.stack.top().cloned() {
            Some(top) if self.open => {
                let state = top.update(&patch);
                self.stack.replace_top(state.clone());
                self.events.emit(&PaletteEvent::Displayed(state));
                self.render(true);
            }
            _ => {
                self.cancel_prompt();
                self.open_with(&patch);
            }
        }
        self.query_selected = select_text;
    }

    // ─── Prompts ─────────────────────────────────────────────────────────

    /// Ask for a line of text, pre-filled with `text`.
    ///
    /// Replaces any pending prompt, which resolves to `None`.
    pub fn prompt(&mut self, text: &str) -> PromptHandle {
        self.cancel_prompt();
        let (sender, handle) = prompt::channel();
        self.insert(
            Box::new(Slot::new(PromptCategory::new(sender.clone(), text))),
            None,
            None,
        );
        self.prompt = Some(sender);
        debug!(text, "prompt started");

        let patch = StatePatch::new().activate(PROMPT_ID).query(text);
        if self.open {
            self.display(patch);
        } else {
            self.open_with(&patch);
        }
        self.query_selected = true;
        handle
    }

    /// Ask a yes/no question; resolves to `true` only on "Confirm".
    pub fn confirm(&mut self, text: &str) -> ConfirmHandle {
        ConfirmHandle::new(self.prompt(text))
    }

    fn cancel_prompt(&mut self) {
        let Some(sender) = self.prompt.take() else {
            return;
        };
        if sender.resolve(None) {
            debug!("pending prompt cancelled");
        }
        self.deregister(&PROMPT_ID);
    }

    // ─── Selection & input ───────────────────────────────────────────────

    /// Move the selection by `delta` rows, clamped to the result list.
    pub fn move_selection(&mut self, delta: isize) {
        let Some(last) = self.results.len().checked_sub(1) else {
            self.selected = None;
            return;
        };
        let current = self.selected.unwrap_or(0);
        let target = current.saturating_add_signed(delta).min(last);
        self.selected = Some(target);
    }

    /// Invoke the selected candidate. Returns whether an invocation ran.
    pub fn activate_selected(&mut self) -> bool {
        let Some(item) = self.selected.and_then(|i| self.results.get(i)) else {
            return false;
        };
        let (slot, index, id) = (item.slot, item.index, item.category.clone());
        let Some(registered) = self.registry.get_mut(slot) else {
            return false;
        };
        match guarded(&id, Hook::Invoke, || registered.category.invoke(index)) {
            Ok(invocation) => {
                debug!(category = %id, ?invocation, "candidate invoked");
                self.apply(invocation);
                true
            }
            Err(fault) => {
                self.faults.push(fault);
                false
            }
        }
    }

    /// Descend into the selected candidate.
    pub fn drill_selected(&mut self) -> bool {
        self.selected.is_some_and(|i| self.drill_into(i))
    }

    /// Descend into the candidate at `index`, if it permits navigation.
    pub fn drill_into(&mut self, index: usize) -> bool {
        let Some(patch) = self
            .results
            .get(index)
            .and_then(|item| item.entry.drill.clone())
        else {
            return false;
        };
        self.display(patch);
        true
    }

    /// Dispatch a keyboard command. Returns whether it was consumed.
    pub fn handle_command(&mut self, command: PaletteCommand) -> bool {
        if !self.open {
            return false;
        }
        match command {
            PaletteCommand::Next => {
                self.move_selection(1);
                true
            }
            PaletteCommand::Previous => {
                self.move_selection(-1);
                true
            }
            PaletteCommand::Activate => self.activate_selected(),
            PaletteCommand::Deeper => self.drill_selected(),
            PaletteCommand::Back => {
                self.go_back();
                true
            }
            PaletteCommand::Cancel => {
                self.close();
                true
            }
        }
    }

    /// Look up `key` in the key map and dispatch it.
    pub fn handle_key(&mut self, key: &str) -> bool {
        match self.keymap.lookup(key) {
            Some(command) => self.handle_command(command),
            None => false,
        }
    }

    fn apply(&mut self, invocation: Invocation) {
        match invocation {
            Invocation::Close => self.close(),
            Invocation::Refresh => {
                if self.open {
                    self.render(false);
                }
            }
            Invocation::Display(patch) => self.display(patch),
            Invocation::SetQuery(query) => self.set_value(query, false),
            Invocation::Stay => {}
        }
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    fn render_order(&self, state: &PaletteState) -> Vec<usize> {
        let mut order = Vec::new();
        match state.active_category() {
            Some(active) => {
                if let Some(&position) = self.index.get(active) {
                    order.push(position);
                    for sibling in self.registry[position].category.siblings() {
                        if let Some(&j) = self.index.get(&sibling)
                            && !order.contains(&j)
                        {
                            order.push(j);
                        }
                    }
                }
            }
            None => {
                for (i, registered) in self.registry.iter().enumerate() {
                    if registered.secondary_of.is_none() && !registered.category.hidden() {
                        order.push(i);
                    }
                }
            }
        }
        let secondaries: Vec<usize> = order
            .iter()
            .filter_map(|&i| self.registry[i].secondary.as_ref())
            .filter_map(|more| self.index.get(more).copied())
            .filter(|j| !order.contains(j))
            .collect();
        order.extend(secondaries);
        order
    }

    fn render(&mut self, reset_selection: bool) {
        let Some(state) = self.stack.top().cloned() else {
            self.results.clear();
            self.groups.clear();
            self.selected = None;
            return;
        };
        let _span = tracing::debug_span!(
            "palette_render",
            depth = self.stack.depth(),
            query = state.query()
        )
        .entered();

        let mut faults = Vec::new();
        let mut triggered = vec![false; self.registry.len()];
        for (i, registered) in self.registry.iter_mut().enumerate() {
            let id = registered.id.clone();
            match guarded(&id, Hook::Trigger, || registered.category.trigger(&state)) {
                Ok(()) => triggered[i] = true,
                Err(fault) => faults.push(fault),
            }
        }

        let limit = if state.active_category().is_none() && !state.expanded() {
            state.max_results().min(self.config.preview_results)
        } else {
            state.max_results()
        };

        let order = self.render_order(&state);
        let mut results = Vec::new();
        let mut groups = Vec::new();
        for slot in order {
            if !triggered[slot] {
                continue;
            }
            let registered = &mut self.registry[slot];
            let id = registered.id.clone();
            let count = match guarded(&id, Hook::List, || {
                registered.category.list(state.query(), limit)
            }) {
                Ok(count) => count,
                Err(fault) => {
                    faults.push(fault);
                    continue;
                }
            };

            let start = results.len();
            for index in 0..count {
                match guarded(&id, Hook::Describe, || registered.category.describe(index)) {
                    Ok(entry) => results.push(ResultItem {
                        category: id.clone(),
                        entry,
                        slot,
                        index,
                    }),
                    Err(fault) => {
                        faults.push(fault);
                        results.truncate(start);
                        break;
                    }
                }
            }
            if results.len() > start {
                groups.push(ResultGroup {
                    category: id,
                    title: registered.category.title(),
                    range: start..results.len(),
                });
            }
        }

        self.results = results;
        self.groups = groups;
        self.faults = faults;
        self.selected = match (self.results.len().checked_sub(1), self.selected) {
            (None, _) => None,
            (Some(last), Some(current)) if !reset_selection => Some(current.min(last)),
            (Some(_), _) => Some(0),
        };
        debug!(
            results = self.results.len(),
            groups = self.groups.len(),
            faults = self.faults.len(),
            "palette rendered"
        );
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The live context, or the default state while closed.
    #[must_use]
    pub fn state(&self) -> &PaletteState {
        self.stack.top().unwrap_or(&self.default_state)
    }

    /// Number of contexts on the back stack.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// The back stack, oldest first.
    #[must_use]
    pub fn history(&self) -> &ContextStack {
        &self.stack
    }

    /// Rendered candidates, in display order.
    #[must_use]
    pub fn results(&self) -> &[ResultItem] {
        &self.results
    }

    /// Rendered candidates grouped by category.
    #[must_use]
    pub fn groups(&self) -> &[ResultGroup] {
        &self.groups
    }

    /// `None` iff there are no results.
    #[inline]
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn selected(&self) -> Option<&ResultItem> {
        self.selected.and_then(|i| self.results.get(i))
    }

    /// Hook faults from the most recent render pass or invocation.
    #[must_use]
    pub fn last_faults(&self) -> &[HookFault] {
        &self.faults
    }

    /// Whether the host should select the query text.
    #[must_use]
    pub fn query_selected(&self) -> bool {
        self.query_selected
    }

    /// Whether a prompt is waiting for an answer.
    #[must_use]
    pub fn has_pending_prompt(&self) -> bool {
        self.prompt.as_ref().is_some_and(|p| !p.is_resolved())
    }

    /// Open/display/close notifications.
    #[must_use]
    pub fn events(&self) -> &EventChannel<PaletteEvent> {
        &self.events
    }

    /// Patches applied to any state derived from this palette's default state.
    #[must_use]
    pub fn state_updates(&self) -> &EventChannel<StatePatch> {
        self.default_state.updates()
    }

    #[must_use]
    pub fn config(&self) -> &PaletteConfig {
        &self.config
    }

    #[must_use]
    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HookError, HookResult};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Fixed list of words; drilling a word narrows to words sharing its
    /// first letter via the `letter` extension.
    struct Words {
        id: &'static str,
        words: Vec<&'static str>,
        letter: Option<String>,
        siblings: Vec<CategoryId>,
        hidden: bool,
        invoked: Rc<RefCell<Vec<String>>>,
    }

    impl Words {
        fn new(id: &'static str, words: &[&'static str]) -> Self {
            Self {
                id,
                words: words.to_vec(),
                letter: None,
                siblings: Vec::new(),
                hidden: false,
                invoked: Rc::default(),
            }
        }
    }

    impl Category for Words {
        type Item = &'static str;

        fn id(&self) -> CategoryId {
            CategoryId::from_static(self.id)
        }

        fn title(&self) -> &str {
            self.id
        }

        fn trigger(&mut self, state: &PaletteState) -> HookResult<()> {
            self.letter = state.ext_text("letter").map(str::to_string);
            Ok(())
        }

        fn list(&self, query: &str) -> HookResult<Vec<&'static str>> {
            let pool: Vec<&'static str> = self
                .words
                .iter()
                .copied()
                .filter(|w| self.letter.as_deref().is_none_or(|l| w.starts_with(l)))
                .collect();
            let text = |w: &&'static str| (*w).to_string();
            Ok(lectern_core::filter(query, &pool, &[&text]))
        }

        fn describe(&self, item: &&'static str) -> HookResult<Entry> {
            let letter = item.chars().next().map(String::from).unwrap_or_default();
            Ok(Entry::new(*item).with_drill(
                StatePatch::new()
                    .activate(CategoryId::from_static(self.id))
                    .ext("letter", letter)
                    .query(""),
            ))
        }

        fn invoke(&mut self, item: &&'static str) -> HookResult<Invocation> {
            self.invoked.borrow_mut().push((*item).to_string());
            Ok(Invocation::Close)
        }

        fn siblings(&self) -> Vec<CategoryId> {
            self.siblings.clone()
        }

        fn hidden(&self) -> bool {
            self.hidden
        }
    }

    struct Broken {
        fail_describe: bool,
    }

    impl Category for Broken {
        type Item = u8;

        fn id(&self) -> CategoryId {
            CategoryId::from_static("broken")
        }

        fn title(&self) -> &str {
            "Broken"
        }

        fn trigger(&mut self, _state: &PaletteState) -> HookResult<()> {
            Ok(())
        }

        fn list(&self, _query: &str) -> HookResult<Vec<u8>> {
            Ok(vec![1, 2])
        }

        fn describe(&self, item: &u8) -> HookResult<Entry> {
            if self.fail_describe && *item == 2 {
                return Err(HookError::new("cannot describe 2"));
            }
            Ok(Entry::new(item.to_string()))
        }

        fn invoke(&mut self, _item: &u8) -> HookResult<Invocation> {
            panic!("invoke exploded")
        }
    }

    fn labels(palette: &CommandPalette) -> Vec<&str> {
        palette
            .results()
            .iter()
            .map(|r| r.entry.label.as_str())
            .collect()
    }

    fn expanded() -> StatePatch {
        StatePatch::new().expanded(true)
    }

    #[test]
    fn open_renders_all_top_level_categories() {
        let mut palette = CommandPalette::new();
        palette.add_category(Words::new("fruit", &["apple", "banana"])).unwrap();
        palette.add_category(Words::new("tree", &["ash", "birch"])).unwrap();
        palette.open(expanded());

        assert!(palette.is_open());
        assert_eq!(palette.depth(), 1);
        assert_eq!(labels(&palette), ["apple", "banana", "ash", "birch"]);
        assert_eq!(palette.groups().len(), 2);
        assert_eq!(palette.groups()[1].range, 2..4);
        assert_eq!(palette.selected_index(), Some(0));
    }

    #[test]
    fn duplicate_category_rejected() {
        let mut palette = CommandPalette::new();
        palette.add_category(Words::new("fruit", &[])).unwrap();
        assert_eq!(
            palette.add_category(Words::new("fruit", &[])),
            Err(PaletteError::DuplicateCategory(CategoryId::from_static("fruit")))
        );
    }

    #[test]
    fn prompt_id_is_reserved() {
        let mut palette = CommandPalette::new();
        assert_eq!(
            palette.add_category(Words::new("prompt", &["hello"])),
            Err(PaletteError::ReservedCategory(PROMPT_ID))
        );
        assert_eq!(
            palette.remove_category(&PROMPT_ID),
            Err(PaletteError::ReservedCategory(PROMPT_ID))
        );
        assert!(!palette.category_ids().contains(&PROMPT_ID));
    }

    #[test]
    fn open_and_close_keep_categories_without_a_prompt() {
        let mut palette = CommandPalette::new();
        palette.add_category(Words::new("fruit", &["apple"])).unwrap();
        let before = palette.category_ids();
        palette.open(StatePatch::new());
        palette.close();
        palette.open(StatePatch::new().activate("fruit"));
        assert_eq!(palette.category_ids(), before);
        assert_eq!(labels(&palette), ["apple"]);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = PaletteConfig {
            preview_results: 0,
            ..PaletteConfig::default()
        };
        assert!(matches!(
            CommandPalette::with_config(config),
            Err(ConfigError::Invalid {
                field: "preview_results",
                ..
            })
        ));
        let config = PaletteConfig {
            fuzzy_ratio_percent: 0,
            ..PaletteConfig::default()
        };
        assert!(CommandPalette::with_config(config).is_err());
    }

    #[test]
    fn preview_limit_applies_only_when_collapsed() {
        let config = PaletteConfig {
            preview_results: 1,
            ..PaletteConfig::default()
        };
        let mut palette = CommandPalette::with_config(config).unwrap();
        palette.add_category(Words::new("fruit", &["apple", "apricot"])).unwrap();
        palette.open(StatePatch::new());
        assert_eq!(labels(&palette), ["apple"]);

        palette.display(expanded());
        assert_eq!(labels(&palette), ["apple", "apricot"]);
    }

    #[test]
    fn active_category_shows_itself_and_siblings() {
        let mut palette = CommandPalette::new();
        let mut fruit = Words::new("fruit", &["apple"]);
        fruit.siblings = vec![CategoryId::from_static("nuts")];
        palette.add_category(fruit).unwrap();
        palette.add_category(Words::new("tree", &["ash"])).unwrap();
        palette.add_category(Words::new("nuts", &["almond"])).unwrap();

        palette.open(StatePatch::new().activate("fruit"));
        assert_eq!(labels(&palette), ["apple", "almond"]);
    }

    #[test]
    fn unknown_active_category_renders_nothing() {
        let mut palette = CommandPalette::new();
        palette.add_category(Words::new("fruit", &["apple"])).unwrap();
        palette.open(StatePatch::new().activate("missing"));
        assert!(palette.is_open());
        assert!(palette.results().is_empty());
        assert_eq!(palette.selected_index(), None);
    }

    #[test]
    fn hidden_category_only_renders_when_active() {
        let mut palette = CommandPalette::new();
        let mut secret = Words::new("secret", &["sesame"]);
        secret.hidden = true;
        palette.add_category(secret).unwrap();
        palette.open(StatePatch::new());
        assert!(palette.results().is_empty());
        palette.display(StatePatch::new().activate("secret"));
        assert_eq!(labels(&palette), ["sesame"]);
    }

    #[test]
    fn drill_pushes_and_back_pops() {
        let mut palette = CommandPalette::new();
        palette
            .add_category(Words::new("fruit", &["apple", "banana", "blueberry"]))
            .unwrap();
        palette.open(expanded());
        palette.move_selection(1);
        assert!(palette.drill_selected());

        assert_eq!(palette.depth(), 2);
        assert_eq!(palette.state().ext_text("letter"), Some("b"));
        assert_eq!(labels(&palette), ["banana", "blueberry"]);

        palette.go_back();
        assert_eq!(palette.depth(), 1);
        assert_eq!(labels(&palette), ["apple", "banana", "blueberry"]);
        assert_eq!(palette.selected_index(), Some(0));

        palette.go_back();
        assert!(!palette.is_open());
        assert_eq!(palette.depth(), 0);
    }

    #[test]
    fn drill_without_patch_is_refused() {
        let mut palette = CommandPalette::new();
        palette.add_command(Command::new("Leaf", "", |_| Invocation::Stay));
        palette.open(StatePatch::new());
        assert!(!palette.drill_selected());
        assert!(!palette.drill_into(42));
        assert_eq!(palette.depth(), 1);
    }

    #[test]
    fn set_value_replaces_top_context() {
        let mut palette = CommandPalette::new();
        palette.add_category(Words::new("fruit", &["apple", "banana"])).unwrap();
        palette.open(StatePatch::new());
        palette.set_value("nan", true);

        assert_eq!(palette.depth(), 1);
        assert_eq!(palette.state().query(), "nan");
        assert!(palette.query_selected());
        assert_eq!(labels(&palette), ["banana"]);
    }

    #[test]
    fn set_value_while_closed_opens() {
        let mut palette = CommandPalette::new();
        palette.add_category(Words::new("fruit", &["apple"])).unwrap();
        palette.set_value("app", false);
        assert!(palette.is_open());
        assert_eq!(labels(&palette), ["apple"]);
    }

    #[test]
    fn activate_applies_invocation() {
        let mut palette = CommandPalette::new();
        let words = Words::new("fruit", &["apple", "banana"]);
        let invoked = Rc::clone(&words.invoked);
        palette.add_category(words).unwrap();
        palette.open(StatePatch::new());
        palette.move_selection(1);
        assert!(palette.activate_selected());

        assert_eq!(*invoked.borrow(), ["banana"]);
        assert!(!palette.is_open());
    }

    #[test]
    fn close_resets_to_default_state() {
        let mut palette = CommandPalette::new();
        palette.add_category(Words::new("fruit", &["apple"])).unwrap();
        palette.open(StatePatch::new().query("app").activate("fruit"));
        palette.close();

        assert!(!palette.is_open());
        assert_eq!(palette.state(), &PaletteState::new());
        assert!(palette.results().is_empty());
        assert_eq!(palette.selected_index(), None);
        assert!(!palette.activate_selected());
    }

    #[test]
    fn selection_clamps() {
        let mut palette = CommandPalette::new();
        palette.add_category(Words::new("fruit", &["a1", "a2", "a3"])).unwrap();
        palette.open(StatePatch::new());
        palette.move_selection(10);
        assert_eq!(palette.selected_index(), Some(2));
        palette.move_selection(-10);
        assert_eq!(palette.selected_index(), Some(0));
    }

    #[test]
    fn describe_fault_drops_whole_category() {
        let mut palette = CommandPalette::new();
        palette.add_category(Words::new("fruit", &["apple"])).unwrap();
        palette.add_category(Broken { fail_describe: true }).unwrap();
        palette.open(StatePatch::new());

        assert_eq!(labels(&palette), ["apple"]);
        let faults = palette.last_faults();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].hook, Hook::Describe);
        assert_eq!(faults[0].category.as_str(), "broken");
    }

    #[test]
    fn invoke_panic_is_contained() {
        let mut palette = CommandPalette::new();
        palette.add_category(Broken { fail_describe: false }).unwrap();
        palette.open(StatePatch::new().activate("broken"));
        assert_eq!(labels(&palette), ["1", "2"]);

        assert!(!palette.activate_selected());
        assert!(palette.is_open());
        assert_eq!(palette.last_faults()[0].hook, Hook::Invoke);
        assert!(palette.last_faults()[0].message.contains("invoke exploded"));
    }

    #[test]
    fn refresh_keeps_selection() {
        let mut palette = CommandPalette::new();
        palette.add_command(Command::new("One", "", |_| Invocation::Refresh));
        palette.add_command(Command::new("Two", "", |_| Invocation::Refresh));
        palette.open(StatePatch::new());
        palette.move_selection(1);
        assert!(palette.activate_selected());
        assert!(palette.is_open());
        assert_eq!(palette.selected_index(), Some(1));
    }

    #[test]
    fn set_query_invocation_edits_query() {
        let mut palette = CommandPalette::new();
        palette.add_command(Command::new("Search grace", "", |_| {
            Invocation::SetQuery("grace".into())
        }));
        palette.open(StatePatch::new());
        assert!(palette.activate_selected());
        assert_eq!(palette.state().query(), "grace");
        assert_eq!(palette.depth(), 1);
    }

    #[test]
    fn secondary_set_follows_owner() {
        struct WithMore;

        impl Category for WithMore {
            type Item = ();

            fn id(&self) -> CategoryId {
                CategoryId::from_static("main")
            }

            fn title(&self) -> &str {
                "Main"
            }

            fn trigger(&mut self, _state: &PaletteState) -> HookResult<()> {
                Ok(())
            }

            fn list(&self, _query: &str) -> HookResult<Vec<()>> {
                Ok(vec![()])
            }

            fn describe(&self, _item: &()) -> HookResult<Entry> {
                Ok(Entry::new("primary"))
            }

            fn invoke(&mut self, _item: &()) -> HookResult<Invocation> {
                Ok(Invocation::Stay)
            }

            fn secondary(&mut self) -> Option<CommandSet> {
                Some(
                    CommandSet::new("ignored", "More")
                        .with_command(Command::new("extra", "", |_| Invocation::Stay)),
                )
            }
        }

        let mut palette = CommandPalette::new();
        palette.add_category(WithMore).unwrap();
        palette.add_category(Words::new("fruit", &["apple"])).unwrap();
        assert!(
            palette
                .category_ids()
                .contains(&CategoryId::new("main.more"))
        );

        palette.open(StatePatch::new());
        assert_eq!(labels(&palette), ["primary", "apple", "extra"]);

        palette.display(StatePatch::new().activate("main"));
        assert_eq!(labels(&palette), ["primary", "extra"]);

        palette
            .remove_category(&CategoryId::from_static("main"))
            .unwrap();
        assert!(
            !palette
                .category_ids()
                .contains(&CategoryId::new("main.more"))
        );
    }

    #[test]
    fn remove_unknown_category_errors() {
        let mut palette = CommandPalette::new();
        assert_eq!(
            palette.remove_category(&CategoryId::from_static("nope")),
            Err(PaletteError::UnknownCategory(CategoryId::from_static("nope")))
        );
    }

    #[test]
    fn events_report_lifecycle() {
        let mut palette = CommandPalette::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = palette.events().subscribe(move |event| {
            let kind = match event {
                PaletteEvent::Opened(_) => "opened",
                PaletteEvent::Displayed(_) => "displayed",
                PaletteEvent::Closed(_) => "closed",
            };
            sink.borrow_mut().push(kind);
        });

        palette.open(StatePatch::new());
        palette.display(StatePatch::new().query("x"));
        palette.go_back();
        palette.go_back();
        palette.close();

        assert_eq!(*seen.borrow(), ["opened", "displayed", "displayed", "closed"]);
    }

    #[test]
    fn keys_dispatch_through_keymap() {
        let mut palette = CommandPalette::new();
        palette.add_category(Words::new("fruit", &["apple", "avocado"])).unwrap();
        assert!(!palette.handle_key("ArrowDown"));

        palette.open(expanded());
        assert!(palette.handle_key("ArrowDown"));
        assert_eq!(palette.selected_index(), Some(1));
        assert!(!palette.handle_key("F13"));
        assert!(palette.handle_key("ArrowRight"));
        assert_eq!(palette.depth(), 2);
        assert!(palette.handle_key("ArrowLeft"));
        assert_eq!(palette.depth(), 1);
        assert!(palette.handle_key("Escape"));
        assert!(!palette.is_open());
    }

    #[test]
    fn prompt_confirm_and_close() {
        let mut palette = CommandPalette::new();
        let handle = palette.prompt("Hi");
        assert!(palette.is_open());
        assert!(palette.query_selected());
        assert_eq!(labels(&palette), ["Confirm", "Cancel"]);
        assert!(palette.handle_command(PaletteCommand::Activate));
        assert_eq!(handle.try_result(), Some(Some("Hi".to_string())));
        assert!(!palette.is_open());
        assert!(!palette.category_ids().contains(&PROMPT_ID));

        let abandoned = palette.confirm("Delete?");
        assert!(palette.has_pending_prompt());
        palette.close();
        assert_eq!(abandoned.try_result(), Some(false));
        assert!(!palette.has_pending_prompt());
    }

    #[test]
    fn state_updates_are_shared() {
        let mut palette = CommandPalette::new();
        let before = palette.state_updates().emitted();
        palette.open(StatePatch::new().query("a"));
        palette.set_value("ab", false);
        assert_eq!(palette.state_updates().emitted(), before + 2);
    }
}
