#![forbid(unsafe_code)]

//! Abstract keyboard contract for the palette.
//!
//! Hosts translate their own input events into key names (`"ArrowDown"`,
//! `"Enter"`, ...) and look them up in a [`KeyMap`]; the controller only ever
//! sees [`PaletteCommand`]s.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// A navigation command understood by the palette controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum PaletteCommand {
    /// Move the selection down one row.
    Next,
    /// Move the selection up one row.
    Previous,
    /// Invoke the selected candidate.
    Activate,
    /// Drill into the selected candidate.
    Deeper,
    /// Return to the previous context.
    Back,
    /// Close the palette.
    Cancel,
}

impl PaletteCommand {
    /// All commands, in declaration order.
    pub const ALL: [PaletteCommand; 6] = [
        Self::Next,
        Self::Previous,
        Self::Activate,
        Self::Deeper,
        Self::Back,
        Self::Cancel,
    ];

    /// Stable lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Activate => "activate",
            Self::Deeper => "deeper",
            Self::Back => "back",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for PaletteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PaletteCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.name() == s)
            .ok_or_else(|| format!("unknown palette command `{s}`"))
    }
}

/// Key name → command bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(transparent))]
pub struct KeyMap {
    bindings: BTreeMap<String, PaletteCommand>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind("ArrowDown", PaletteCommand::Next);
        map.bind("Tab", PaletteCommand::Next);
        map.bind("ArrowUp", PaletteCommand::Previous);
        map.bind("Shift+Tab", PaletteCommand::Previous);
        map.bind("Enter", PaletteCommand::Activate);
        map.bind("ArrowRight", PaletteCommand::Deeper);
        map.bind("ArrowLeft", PaletteCommand::Back);
        map.bind("Escape", PaletteCommand::Cancel);
        map
    }
}

impl KeyMap {
    /// A map with no bindings.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Bind `key` to `command`, replacing any previous binding for `key`.
    pub fn bind(&mut self, key: impl Into<String>, command: PaletteCommand) {
        self.bindings.insert(key.into(), command);
    }

    /// Remove the binding for `key`.
    pub fn unbind(&mut self, key: &str) -> Option<PaletteCommand> {
        self.bindings.remove(key)
    }

    /// Command bound to `key`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<PaletteCommand> {
        self.bindings.get(key).copied()
    }

    /// Keys bound to `command`, in key order.
    pub fn keys_for(&self, command: PaletteCommand) -> impl Iterator<Item = &str> {
        self.bindings
            .iter()
            .filter(move |(_, c)| **c == command)
            .map(|(k, _)| k.as_str())
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether there are no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Overlay `other` on top of this map; `other` wins on conflicts.
    pub fn extend(&mut self, other: &KeyMap) {
        for (key, command) in &other.bindings {
            self.bindings.insert(key.clone(), *command);
        }
    }
}
