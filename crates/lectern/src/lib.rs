#![forbid(unsafe_code)]

//! # Lectern
//!
//! A keyboard-driven command palette for scripture readers.
//!
//! The palette itself is generic: categories contribute candidates, the
//! controller keeps a back-stack of immutable states, and a failing
//! category never takes the palette down with it. The `reader` feature adds
//! the scripture domain (go to verse, cross references, topics, settings,
//! bookmarks).
//!
//! | Crate | Contents |
//! |-------|----------|
//! | [`core`] | matching, [`PaletteState`](core::PaletteState), event channels, key map, config |
//! | [`palette`] | [`Category`](palette::Category), [`CommandPalette`](palette::CommandPalette), prompts |
//! | [`reader`] | [`Library`](reader::Library), settings, bookmarks, built-in categories |
//!
//! ```rust,ignore
//! use lectern::prelude::*;
//!
//! let mut palette = CommandPalette::new();
//! let context = ReaderContext::new(Rc::new(library));
//! install_builtin(&mut palette, &context)?;
//! palette.open(StatePatch::new().activate(reader::ids::VERSES));
//! ```

pub use lectern_core as core;
pub use lectern_palette as palette;
#[cfg(feature = "reader")]
pub use lectern_reader as reader;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use lectern_core::{
        CategoryId, EventChannel, KeyMap, MatchMode, PaletteCommand, PaletteConfig, PaletteState,
        StatePatch, Subscription,
    };
    pub use lectern_palette::{
        Category, Command, CommandPalette, CommandSet, Entry, HookError, HookResult, Invocation,
        PaletteError, PaletteEvent,
    };

    #[cfg(feature = "reader")]
    pub use lectern_reader::{
        Library, ReaderAction, ReaderContext, Settings, VerseId, install_builtin,
    };
}
