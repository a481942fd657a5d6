#![forbid(unsafe_code)]

//! Category contract and navigation controller for the Lectern palette.
//!
//! # Role in Lectern
//! `lectern-palette` turns the pure pieces in `lectern-core` into a working
//! palette: categories implement [`Category`], the [`CommandPalette`]
//! triggers, lists, and describes them into one grouped result list, and the
//! host feeds it keyboard commands.
//!
//! # Modules
//!
//! - [`category`]: the [`Category`] trait, [`Entry`], and [`Invocation`]
//! - [`command`]: ad-hoc [`Command`]s and the [`CommandSet`] category
//! - [`context`]: the back-navigation [`ContextStack`]
//! - [`controller`]: the [`CommandPalette`] itself
//! - [`fault`]: hook fault isolation ([`HookFault`])
//! - [`prompt`]: prompt/confirm handles

pub mod category;
pub mod command;
pub mod context;
pub mod controller;
pub mod error;
pub mod fault;
pub mod prompt;

pub use category::{Category, Entry, Invocation};
pub use command::{Command, CommandList, CommandSet};
pub use context::ContextStack;
pub use controller::{
    COMMANDS_ID, CommandPalette, PaletteEvent, ResultGroup, ResultItem, SECONDARY_SUFFIX,
};
pub use error::{HookError, HookResult, PaletteError};
pub use fault::{Hook, HookFault};
pub use prompt::{ConfirmHandle, PROMPT_ID, PromptChoice, PromptHandle};

pub use lectern_core::{KeyMap, PaletteCommand};
