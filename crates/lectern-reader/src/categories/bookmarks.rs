#![forbid(unsafe_code)]

use std::rc::Rc;

use lectern_core::{CategoryId, PaletteState, filter};
use lectern_palette::{Category, Command, CommandSet, Entry, HookResult, Invocation};

use super::{focused, verse_entry, verse_fields};
use crate::library::VerseId;
use crate::{ReaderContext, ids};

/// Bookmarked verses, with commands to add and clear bookmarks.
pub struct BookmarksCategory {
    context: ReaderContext,
    marked: Vec<VerseId>,
}

impl BookmarksCategory {
    #[must_use]
    pub fn new(context: ReaderContext) -> Self {
        Self {
            context,
            marked: Vec::new(),
        }
    }
}

impl Category for BookmarksCategory {
    type Item = VerseId;

    fn id(&self) -> CategoryId {
        ids::BOOKMARKS
    }

    fn description(&self) -> &str {
        "Saved verses"
    }

    fn title(&self) -> &str {
        "Bookmarks"
    }

    fn trigger(&mut self, _state: &PaletteState) -> HookResult<()> {
        self.marked = self.context.bookmarks.list();
        Ok(())
    }

    fn list(&self, query: &str) -> HookResult<Vec<VerseId>> {
        let (citation, text) = verse_fields(&self.context.library);
        Ok(filter(query, &self.marked, &[&citation, &text]))
    }

    fn describe(&self, item: &VerseId) -> HookResult<Entry> {
        verse_entry(&self.context.library, *item)
    }

    fn invoke(&mut self, item: &VerseId) -> HookResult<Invocation> {
        self.context.jump(*item);
        Ok(Invocation::Close)
    }

    fn secondary(&mut self) -> Option<CommandSet> {
        let library = Rc::clone(&self.context.library);
        let add = self.context.bookmarks.clone();
        let clear = self.context.bookmarks.clone();

        let bookmark_focused = Command::new(
            "Bookmark focused verse",
            "Save the verse the reader is on",
            move |state: &PaletteState| {
                if let Some(id) = focused(state) {
                    add.add(id);
                }
                Invocation::Refresh
            },
        )
        .with_render(move |state: &PaletteState| match focused(state) {
            Some(id) => format!("Bookmark {}", library.label(id)),
            None => "Bookmark focused verse".to_string(),
        })
        .with_predicate(|state: &PaletteState| focused(state).is_some());

        let clear_all = Command::new(
            "Clear bookmarks",
            "Remove every bookmark",
            move |_: &PaletteState| {
                clear.clear();
                Invocation::Refresh
            },
        );

        Some(
            CommandSet::new(ids::BOOKMARKS, "Bookmark Commands")
                .with_match_mode(self.context.match_mode)
                .with_command(bookmark_focused)
                .with_command(clear_all),
        )
    }
}
