#![forbid(unsafe_code)]

//! Go To Verse.
//!
//! Hierarchical browsing driven by the `specificity` extension:
//!
//! | Level | Lists | Selecting |
//! |-------|-------|-----------|
//! | 0 | books (plus parsed references and verse-text hits) | drills to 1 |
//! | 1 | chapters of `book` | drills to 2 |
//! | 2 | verses of `book` `chapter` | jumps |
//!
//! Without a `specificity` the level comes from the focused verse (its
//! chapter, level 2) or resets to 0.

use lectern_core::{CategoryId, PaletteState, StatePatch, filter, filter_with};
use lectern_palette::{Category, Entry, HookError, HookResult, Invocation};

use super::{focused, verse_entry, verse_fields};
use crate::library::VerseId;
use crate::{ReaderContext, ext, ids};

/// A candidate at any level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerseItem {
    Book(usize),
    Chapter { book: usize, chapter: u32 },
    Verse(VerseId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Books,
    Chapters(usize),
    Verses(usize, u32),
}

impl Level {
    fn specificity(self) -> u8 {
        match self {
            Self::Books => 0,
            Self::Chapters(_) => 1,
            Self::Verses(..) => 2,
        }
    }
}

/// The go-to-verse category.
pub struct Verses {
    context: ReaderContext,
    level: Level,
    title: String,
}

impl Verses {
    #[must_use]
    pub fn new(context: ReaderContext) -> Self {
        Self {
            context,
            level: Level::Books,
            title: "Go To Verse".to_string(),
        }
    }

    /// Current specificity (0, 1, or 2).
    #[must_use]
    pub fn specificity(&self) -> u8 {
        self.level.specificity()
    }

    fn level_from(&self, state: &PaletteState) -> Level {
        let Some(specificity) = state.ext_int(ext::SPECIFICITY) else {
            return focused(state)
                .and_then(|id| self.context.library.locate(id))
                .map_or(Level::Books, |at| Level::Verses(at.book, at.chapter));
        };
        let book = state
            .ext_int(ext::BOOK)
            .and_then(|b| usize::try_from(b).ok());
        let chapter = state
            .ext_int(ext::CHAPTER)
            .and_then(|c| u32::try_from(c).ok());
        match (specificity, book, chapter) {
            (s, Some(book), Some(chapter)) if s >= 2 => Level::Verses(book, chapter),
            (s, Some(book), _) if s >= 1 => Level::Chapters(book),
            _ => Level::Books,
        }
    }

    fn book_name(&self, book: usize) -> HookResult<&str> {
        self.context
            .library
            .book(book)
            .map(|b| b.name.as_str())
            .ok_or_else(|| HookError::new(format!("book {book} is outside the library")))
    }

    fn drill(level: Level) -> StatePatch {
        let patch = StatePatch::new()
            .activate(ids::VERSES)
            .ext(ext::SPECIFICITY, u32::from(level.specificity()))
            .query("");
        match level {
            Level::Books => patch.clear_ext(ext::BOOK).clear_ext(ext::CHAPTER),
            Level::Chapters(book) => patch.ext(ext::BOOK, book).clear_ext(ext::CHAPTER),
            Level::Verses(book, chapter) => patch.ext(ext::BOOK, book).ext(ext::CHAPTER, chapter),
        }
    }

    fn list_books(&self, query: &str) -> Vec<VerseItem> {
        let library = &self.context.library;
        let mut items = Vec::new();
        if let Some(id) = library.parse_ref(query) {
            items.push(VerseItem::Verse(id));
        }

        let books: Vec<usize> = (0..library.books().len()).collect();
        let name = |b: &usize| library.book(*b).map(|b| b.name.clone()).unwrap_or_default();
        let abbreviation = |b: &usize| {
            library
                .book(*b)
                .map(|b| b.abbreviation.clone())
                .unwrap_or_default()
        };
        items.extend(
            filter_with(self.context.match_mode, query, &books, &[&name, &abbreviation])
                .into_iter()
                .map(VerseItem::Book),
        );

        if !query.trim().is_empty() {
            let verses: Vec<VerseId> = library.verses().collect();
            let (_, text) = verse_fields(library);
            for id in filter(query, &verses, &[&text]) {
                if !items.contains(&VerseItem::Verse(id)) {
                    items.push(VerseItem::Verse(id));
                }
            }
        }
        items
    }
}

impl Category for Verses {
    type Item = VerseItem;

    fn id(&self) -> CategoryId {
        ids::VERSES
    }

    fn description(&self) -> &str {
        "Browse by book, chapter, and verse"
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn trigger(&mut self, state: &PaletteState) -> HookResult<()> {
        let level = self.level_from(state);
        self.title = match level {
            Level::Books => "Go To Verse".to_string(),
            Level::Chapters(book) => self.book_name(book)?.to_string(),
            Level::Verses(book, chapter) => format!("{} {chapter}", self.book_name(book)?),
        };
        self.level = level;
        Ok(())
    }

    fn list(&self, query: &str) -> HookResult<Vec<VerseItem>> {
        let library = &self.context.library;
        Ok(match self.level {
            Level::Books => self.list_books(query),
            Level::Chapters(book) => {
                let name = self.book_name(book)?;
                let count = library.book(book).map_or(0, |b| b.chapter_count());
                let chapters: Vec<u32> = (1..=count).collect();
                let number = |c: &u32| c.to_string();
                let full = |c: &u32| format!("{name} {c}");
                filter(query, &chapters, &[&number, &full])
                    .into_iter()
                    .map(|chapter| VerseItem::Chapter { book, chapter })
                    .collect()
            }
            Level::Verses(book, chapter) => {
                let verses: Vec<VerseId> = library.chapter_verses(book, chapter).collect();
                let number = |id: &VerseId| {
                    library
                        .locate(*id)
                        .map(|at| at.verse.to_string())
                        .unwrap_or_default()
                };
                let (_, text) = verse_fields(library);
                filter(query, &verses, &[&number, &text])
                    .into_iter()
                    .map(VerseItem::Verse)
                    .collect()
            }
        })
    }

    fn describe(&self, item: &VerseItem) -> HookResult<Entry> {
        let library = &self.context.library;
        match *item {
            VerseItem::Book(book) => {
                let count = library.book(book).map_or(0, |b| b.chapter_count());
                Ok(Entry::new(self.book_name(book)?)
                    .with_description(format!("{count} chapters"))
                    .with_drill(Self::drill(Level::Chapters(book))))
            }
            VerseItem::Chapter { book, chapter } => {
                let count = library.book(book).map_or(0, |b| b.verse_count(chapter));
                Ok(Entry::new(format!("{} {chapter}", self.book_name(book)?))
                    .with_description(format!("{count} verses"))
                    .with_drill(Self::drill(Level::Verses(book, chapter))))
            }
            VerseItem::Verse(id) => verse_entry(library, id),
        }
    }

    fn invoke(&mut self, item: &VerseItem) -> HookResult<Invocation> {
        Ok(match *item {
            VerseItem::Book(book) => Invocation::Display(Self::drill(Level::Chapters(book))),
            VerseItem::Chapter { book, chapter } => {
                Invocation::Display(Self::drill(Level::Verses(book, chapter)))
            }
            VerseItem::Verse(id) => {
                self.context.jump(id);
                Invocation::Close
            }
        })
    }

    fn siblings(&self) -> Vec<CategoryId> {
        vec![ids::CROSS_REFS]
    }
}

impl VerseItem {
    /// Position this item stands for, if it names a single verse.
    #[must_use]
    pub fn verse(self) -> Option<VerseId> {
        match self {
            Self::Verse(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::testing::{context, record};
    use crate::ReaderAction;

    fn triggered(patch: StatePatch) -> Verses {
        let mut verses = Verses::new(context());
        verses
            .trigger(&PaletteState::new().update(&patch))
            .unwrap();
        verses
    }

    #[test]
    fn starts_at_books() {
        let verses = triggered(StatePatch::new());
        assert_eq!(verses.specificity(), 0);
        assert_eq!(
            verses.list("").unwrap(),
            [VerseItem::Book(0), VerseItem::Book(1)]
        );
        assert_eq!(verses.title(), "Go To Verse");
    }

    #[test]
    fn focused_verse_starts_at_its_chapter() {
        let verses = triggered(StatePatch::new().ext(ext::VERSE, 4));
        assert_eq!(verses.specificity(), 2);
        assert_eq!(verses.title(), "Genesis 2");
        assert_eq!(
            verses.list("").unwrap(),
            [VerseItem::Verse(VerseId(3)), VerseItem::Verse(VerseId(4))]
        );
    }

    #[test]
    fn selecting_drills_one_level() {
        let mut verses = triggered(StatePatch::new());
        let Invocation::Display(patch) = verses.invoke(&VerseItem::Book(0)).unwrap() else {
            panic!("book should drill");
        };
        let state = PaletteState::new().update(&patch);
        verses.trigger(&state).unwrap();
        assert_eq!(verses.specificity(), 1);
        assert_eq!(verses.title(), "Genesis");
        assert_eq!(
            verses.list("").unwrap(),
            [
                VerseItem::Chapter { book: 0, chapter: 1 },
                VerseItem::Chapter { book: 0, chapter: 2 }
            ]
        );

        let entry = verses
            .describe(&VerseItem::Chapter { book: 0, chapter: 1 })
            .unwrap();
        assert_eq!(entry.label, "Genesis 1");
        assert_eq!(entry.description.as_deref(), Some("3 verses"));
        verses
            .trigger(&state.update(&entry.drill.unwrap()))
            .unwrap();
        assert_eq!(verses.specificity(), 2);
        assert_eq!(verses.list("light").unwrap(), [VerseItem::Verse(VerseId(2))]);
    }

    #[test]
    fn fresh_trigger_resets_to_books() {
        let mut verses = triggered(StatePatch::new().ext(ext::SPECIFICITY, 1).ext(ext::BOOK, 1));
        assert_eq!(verses.specificity(), 1);
        verses.trigger(&PaletteState::new()).unwrap();
        assert_eq!(verses.specificity(), 0);
    }

    #[test]
    fn books_level_finds_references_and_text() {
        let verses = triggered(StatePatch::new());
        assert_eq!(
            verses.list("gen 1:2").unwrap()[0],
            VerseItem::Verse(VerseId(1))
        );
        let hits = verses.list("beginning").unwrap();
        assert_eq!(
            hits,
            [
                VerseItem::Verse(VerseId(0)),
                VerseItem::Verse(VerseId(5)),
                VerseItem::Verse(VerseId(6))
            ]
        );
    }

    #[test]
    fn book_names_fall_back_to_fuzzy() {
        let verses = triggered(StatePatch::new());
        assert_eq!(verses.list("genisis").unwrap(), [VerseItem::Book(0)]);
    }

    #[test]
    fn invoking_verse_jumps_and_closes() {
        let context = context();
        let (seen, _sub) = record(&context);
        let mut verses = Verses::new(context);
        assert_eq!(
            verses.invoke(&VerseItem::Verse(VerseId(2))).unwrap(),
            Invocation::Close
        );
        assert_eq!(*seen.borrow(), [ReaderAction::JumpTo(VerseId(2))]);
    }

    #[test]
    fn bad_book_index_is_a_hook_error() {
        let mut verses = Verses::new(context());
        let patch = StatePatch::new().ext(ext::SPECIFICITY, 1).ext(ext::BOOK, 9);
        assert!(verses.trigger(&PaletteState::new().update(&patch)).is_err());
    }

    #[test]
    fn verse_entry_drills_to_cross_refs() {
        let verses = triggered(StatePatch::new());
        let entry = verses.describe(&VerseItem::Verse(VerseId(0))).unwrap();
        assert_eq!(entry.label, "Genesis 1:1");
        let state = PaletteState::new().update(&entry.drill.unwrap());
        assert_eq!(state.active_category(), Some(&ids::CROSS_REFS));
        assert_eq!(state.ext_int(ext::VERSE), Some(0));
        assert_eq!(VerseItem::Verse(VerseId(0)).verse(), Some(VerseId(0)));
    }
}
