#![forbid(unsafe_code)]

//! Ad-hoc leaf commands.
//!
//! A [`Command`] is a named action that needs no category of its own: the
//! controller keeps a built-in [`CommandSet`] that
//! [`CommandPalette::add_command`](crate::CommandPalette::add_command)
//! appends to. Categories also hand a `CommandSet` to the controller as
//! their secondary commands.
//!
//! Commands are matched by rendered label first, then by description.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use lectern_core::{CategoryId, MatchMode, PaletteState, filter_with};

use crate::category::{Category, Entry, Invocation};
use crate::error::{HookError, HookResult};

type Action = Rc<dyn Fn(&PaletteState) -> Invocation>;
type Render = Rc<dyn Fn(&PaletteState) -> String>;
type Predicate = Rc<dyn Fn(&PaletteState) -> bool>;

/// A labeled action offered by a [`CommandSet`].
#[derive(Clone)]
pub struct Command {
    name: String,
    description: String,
    action: Action,
    render: Option<Render>,
    predicate: Option<Predicate>,
}

impl Command {
    /// Create a command that runs `action` against the state it was listed in.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        action: impl Fn(&PaletteState) -> Invocation + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            action: Rc::new(action),
            render: None,
            predicate: None,
        }
    }

    /// Compute the label from the current state instead of using the name.
    #[must_use]
    pub fn with_render(mut self, render: impl Fn(&PaletteState) -> String + 'static) -> Self {
        self.render = Some(Rc::new(render));
        self
    }

    /// Only offer the command while `predicate` holds.
    #[must_use]
    pub fn with_predicate(mut self, predicate: impl Fn(&PaletteState) -> bool + 'static) -> Self {
        self.predicate = Some(Rc::new(predicate));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Label shown for this command in `state`.
    #[must_use]
    pub fn label(&self, state: &PaletteState) -> String {
        match &self.render {
            Some(render) => render(state),
            None => self.name.clone(),
        }
    }

    /// Whether the command is offered in `state`.
    #[must_use]
    pub fn is_available(&self, state: &PaletteState) -> bool {
        self.predicate.as_ref().is_none_or(|p| p(state))
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("render", &self.render.is_some())
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Shared, appendable list of commands.
///
/// Clones refer to the same list, so commands pushed after the owning set
/// was registered are picked up on the next trigger.
#[derive(Clone, Default)]
pub struct CommandList {
    inner: Rc<RefCell<Vec<Command>>>,
}

impl CommandList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command.
    pub fn push(&self, command: Command) {
        self.inner.borrow_mut().push(command);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    fn get(&self, index: usize) -> Option<Command> {
        self.inner.borrow().get(index).cloned()
    }

    fn snapshot(&self) -> Vec<Command> {
        self.inner.borrow().clone()
    }
}

impl fmt::Debug for CommandList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.borrow().iter()).finish()
    }
}

/// A category whose candidates are [`Command`]s.
///
/// Candidates are positions into the command list, restricted at trigger
/// time to the commands whose predicate holds.
pub struct CommandSet {
    id: CategoryId,
    title: String,
    commands: CommandList,
    mode: MatchMode,
    state: PaletteState,
    available: Vec<usize>,
}

impl CommandSet {
    /// Empty set with the given identifier and heading.
    pub fn new(id: impl Into<CategoryId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            commands: CommandList::new(),
            mode: MatchMode::Substring,
            state: PaletteState::new(),
            available: Vec::new(),
        }
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with_command(self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Use `mode` when matching labels and descriptions.
    #[must_use]
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Append a command.
    pub fn push(&self, command: Command) {
        self.commands.push(command);
    }

    /// Handle to the underlying list.
    #[must_use]
    pub fn commands(&self) -> CommandList {
        self.commands.clone()
    }

    pub(crate) fn set_id(&mut self, id: CategoryId) {
        self.id = id;
    }

    fn command(&self, index: usize) -> HookResult<Command> {
        self.commands
            .get(index)
            .ok_or_else(|| HookError::new(format!("command {index} no longer exists")))
    }
}

impl fmt::Debug for CommandSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSet")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("commands", &self.commands.len())
            .finish()
    }
}

impl Category for CommandSet {
    type Item = usize;

    fn id(&self) -> CategoryId {
        self.id.clone()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn trigger(&mut self, state: &PaletteState) -> HookResult<()> {
        let commands = self.commands.snapshot();
        self.available = commands
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_available(state))
            .map(|(i, _)| i)
            .collect();
        self.state = state.clone();
        Ok(())
    }

    fn list(&self, query: &str) -> HookResult<Vec<usize>> {
        let commands = self.commands.snapshot();
        let label = |i: &usize| {
            commands
                .get(*i)
                .map(|c| c.label(&self.state))
                .unwrap_or_default()
        };
        let description = |i: &usize| {
            commands
                .get(*i)
                .map(|c| c.description.clone())
                .unwrap_or_default()
        };
        Ok(filter_with(
            self.mode,
            query,
            &self.available,
            &[&label, &description],
        ))
    }

    fn describe(&self, item: &usize) -> HookResult<Entry> {
        let command = self.command(*item)?;
        let entry = Entry::new(command.label(&self.state));
        if command.description.is_empty() {
            Ok(entry)
        } else {
            Ok(entry.with_description(command.description))
        }
    }

    fn invoke(&mut self, item: &usize) -> HookResult<Invocation> {
        let command = self.command(*item)?;
        Ok((command.action)(&self.state))
    }
}
