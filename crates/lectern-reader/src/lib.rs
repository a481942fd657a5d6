#![forbid(unsafe_code)]

//! Scripture-reader side of Lectern.
//!
//! # Role in Lectern
//! This crate supplies the domain the generic palette navigates: a
//! read-only [`Library`], the [`Settings`] and [`Bookmarks`] stores, and the
//! built-in categories (go to verse, cross references, topics, settings,
//! bookmarks). [`install_builtin`] registers all of them.
//!
//! Categories never hold host objects. Jumps and other host effects are
//! emitted as [`ReaderAction`]s on [`ReaderContext::actions`].

use std::rc::Rc;

use lectern_core::{EventChannel, MatchMode};
use lectern_palette::{CommandPalette, PaletteError};

pub mod bookmarks;
pub mod categories;
pub mod error;
pub mod library;
pub mod settings;

pub use bookmarks::Bookmarks;
pub use categories::{BookmarksCategory, CrossRefs, SettingsCategory, Topics, Verses};
pub use error::ReaderError;
pub use library::{Book, Citation, Library, VerseId, VerseRef};
pub use settings::{Setting, SettingChange, Settings};

/// Stable identifiers of the built-in categories.
pub mod ids {
    use lectern_core::CategoryId;

    pub const VERSES: CategoryId = CategoryId::from_static("verses");
    pub const CROSS_REFS: CategoryId = CategoryId::from_static("cross_refs");
    pub const TOPICS: CategoryId = CategoryId::from_static("topics");
    pub const SETTINGS: CategoryId = CategoryId::from_static("settings");
    pub const BOOKMARKS: CategoryId = CategoryId::from_static("bookmarks");
}

/// State extension keys the built-in categories read and write.
pub mod ext {
    /// Focused verse, as a [`VerseId`](crate::VerseId) ordinal.
    pub const VERSE: &str = "verse";
    /// Go-to-verse level: 0 books, 1 chapters, 2 verses.
    pub const SPECIFICITY: &str = "specificity";
    /// Book index for specificity 1 and 2.
    pub const BOOK: &str = "book";
    /// 1-based chapter for specificity 2.
    pub const CHAPTER: &str = "chapter";
    /// Selected topic name.
    pub const TOPIC: &str = "topic";
}

/// Effect requested of the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderAction {
    /// Scroll the reader to a verse.
    JumpTo(VerseId),
}

/// Everything the built-in categories share.
#[derive(Debug, Clone)]
pub struct ReaderContext {
    pub library: Rc<Library>,
    pub settings: Settings,
    pub bookmarks: Bookmarks,
    pub actions: EventChannel<ReaderAction>,
    /// Matching used for names and titles.
    pub match_mode: MatchMode,
}

impl ReaderContext {
    /// Context over `library` with empty stores.
    #[must_use]
    pub fn new(library: Rc<Library>) -> Self {
        Self {
            library,
            settings: Settings::new(),
            bookmarks: Bookmarks::new(),
            actions: EventChannel::new(),
            match_mode: MatchMode::default(),
        }
    }

    /// Use the palette's configured match mode.
    #[must_use]
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub(crate) fn jump(&self, id: VerseId) {
        tracing::debug!(verse = id.0, "jump requested");
        self.actions.emit(&ReaderAction::JumpTo(id));
    }
}

/// Register every built-in category on `palette`.
pub fn install_builtin(
    palette: &mut CommandPalette,
    context: &ReaderContext,
) -> Result<(), PaletteError> {
    palette.add_category(Verses::new(context.clone()))?;
    palette.add_category(CrossRefs::new(context.clone()))?;
    palette.add_category(Topics::new(context.clone()))?;
    palette.add_category(SettingsCategory::new(context.clone()))?;
    palette.add_category(BookmarksCategory::new(context.clone()))?;
    Ok(())
}
