#![forbid(unsafe_code)]

//! Read-only scripture data.
//!
//! A [`Library`] is built once and shared as `Rc<Library>` with every
//! category that needs it. Verses are addressed by [`VerseId`], a global
//! ordinal in canonical order, so a verse fits in a state extension as a
//! plain integer.
//!
//! # JSON layout
//!
//! ```json
//! {
//!   "books": [
//!     { "name": "Genesis", "abbreviation": "Gen",
//!       "chapters": [["In the beginning...", "And the earth..."]] }
//!   ],
//!   "cross_refs": [[0, 1]],
//!   "topics": { "Creation": [0, 1] }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReaderError;

/// Global verse ordinal (0 = first verse of the first book).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerseId(pub u32);

impl VerseId {
    /// Read a verse id stored as a state extension integer.
    #[must_use]
    pub fn from_ext(value: i64) -> Option<Self> {
        u32::try_from(value).ok().map(Self)
    }

    #[must_use]
    pub fn to_ext(self) -> i64 {
        i64::from(self.0)
    }
}

/// Position of a verse: book index plus 1-based chapter and verse numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VerseRef {
    pub book: usize,
    pub chapter: u32,
    pub verse: u32,
}

/// A citation that renders as `Genesis 1:3`.
#[derive(Debug, Clone, Copy)]
pub struct Citation<'a> {
    book: &'a str,
    chapter: u32,
    verse: u32,
}

impl fmt::Display for Citation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

/// One book: its names and chapters of verse texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub name: String,
    pub abbreviation: String,
    pub chapters: Vec<Vec<String>>,
}

impl Book {
    pub fn new(
        name: impl Into<String>,
        abbreviation: impl Into<String>,
        chapters: Vec<Vec<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            abbreviation: abbreviation.into(),
            chapters,
        }
    }

    #[must_use]
    pub fn chapter_count(&self) -> u32 {
        u32::try_from(self.chapters.len()).unwrap_or(u32::MAX)
    }

    /// Number of verses in 1-based `chapter`.
    #[must_use]
    pub fn verse_count(&self, chapter: u32) -> u32 {
        chapter
            .checked_sub(1)
            .and_then(|c| self.chapters.get(c as usize))
            .map_or(0, |verses| u32::try_from(verses.len()).unwrap_or(u32::MAX))
    }
}

#[derive(Debug, Clone, Copy)]
struct ChapterStart {
    first: u32,
    book: usize,
    chapter: u32,
}

#[derive(Deserialize)]
#[cfg_attr(not(feature = "json"), allow(dead_code))]
struct LibraryDoc {
    books: Vec<Book>,
    #[serde(default)]
    cross_refs: Vec<(u32, u32)>,
    #[serde(default)]
    topics: BTreeMap<String, Vec<u32>>,
}

/// Books, cross references, and topics.
#[derive(Debug, Clone, Default)]
pub struct Library {
    books: Vec<Book>,
    starts: Vec<ChapterStart>,
    verse_total: u32,
    cross_refs: BTreeMap<VerseId, Vec<VerseId>>,
    topics: BTreeMap<String, Vec<VerseId>>,
}

impl Library {
    /// Library over `books`, with no cross references or topics.
    #[must_use]
    pub fn new(books: Vec<Book>) -> Self {
        let mut starts = Vec::new();
        let mut next = 0u32;
        for (book, data) in books.iter().enumerate() {
            for (c, verses) in data.chapters.iter().enumerate() {
                starts.push(ChapterStart {
                    first: next,
                    book,
                    chapter: u32::try_from(c + 1).unwrap_or(u32::MAX),
                });
                next = next.saturating_add(u32::try_from(verses.len()).unwrap_or(u32::MAX));
            }
        }
        Self {
            books,
            starts,
            verse_total: next,
            cross_refs: BTreeMap::new(),
            topics: BTreeMap::new(),
        }
    }

    /// Parse the JSON layout described in the module docs.
    #[cfg(feature = "json")]
    pub fn from_json_str(source: &str) -> Result<Self, ReaderError> {
        let doc: LibraryDoc = serde_json::from_str(source)?;
        let mut library = Self::new(doc.books);
        for (from, to) in doc.cross_refs {
            library.add_cross_ref(VerseId(from), VerseId(to))?;
        }
        for (name, verses) in doc.topics {
            library.add_topic(name, verses.into_iter().map(VerseId))?;
        }
        tracing::debug!(
            books = library.books.len(),
            verses = library.verse_total,
            topics = library.topics.len(),
            "library loaded"
        );
        Ok(library)
    }

    fn check(&self, id: VerseId) -> Result<VerseId, ReaderError> {
        if id.0 < self.verse_total {
            Ok(id)
        } else {
            Err(ReaderError::UnknownVerse(id.0))
        }
    }

    /// Record that `from` refers to `to`.
    pub fn add_cross_ref(&mut self, from: VerseId, to: VerseId) -> Result<(), ReaderError> {
        let from = self.check(from)?;
        let to = self.check(to)?;
        let refs = self.cross_refs.entry(from).or_default();
        if !refs.contains(&to) {
            refs.push(to);
        }
        Ok(())
    }

    /// Add verses to the topic `name`, creating it if needed.
    pub fn add_topic(
        &mut self,
        name: impl Into<String>,
        verses: impl IntoIterator<Item = VerseId>,
    ) -> Result<(), ReaderError> {
        let checked = verses
            .into_iter()
            .map(|id| self.check(id))
            .collect::<Result<Vec<_>, _>>()?;
        self.topics.entry(name.into()).or_default().extend(checked);
        Ok(())
    }

    #[must_use]
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    #[must_use]
    pub fn book(&self, index: usize) -> Option<&Book> {
        self.books.get(index)
    }

    /// Total number of verses.
    #[must_use]
    pub fn verse_count(&self) -> u32 {
        self.verse_total
    }

    /// All verse ids in canonical order.
    pub fn verses(&self) -> impl Iterator<Item = VerseId> {
        (0..self.verse_total).map(VerseId)
    }

    /// Verse ids of one chapter.
    pub fn chapter_verses(&self, book: usize, chapter: u32) -> impl Iterator<Item = VerseId> {
        let first = self.verse_id(VerseRef {
            book,
            chapter,
            verse: 1,
        });
        let count = self.book(book).map_or(0, |b| b.verse_count(chapter));
        first
            .into_iter()
            .flat_map(move |first| (first.0..first.0 + count).map(VerseId))
    }

    /// Ordinal of a position, if it exists.
    #[must_use]
    pub fn verse_id(&self, at: VerseRef) -> Option<VerseId> {
        let book = self.book(at.book)?;
        if at.verse == 0 || at.verse > book.verse_count(at.chapter) {
            return None;
        }
        let start = self
            .starts
            .iter()
            .find(|s| s.book == at.book && s.chapter == at.chapter)?;
        Some(VerseId(start.first + at.verse - 1))
    }

    /// Position of an ordinal, if it exists.
    #[must_use]
    pub fn locate(&self, id: VerseId) -> Option<VerseRef> {
        if id.0 >= self.verse_total {
            return None;
        }
        let i = self.starts.partition_point(|s| s.first <= id.0).checked_sub(1)?;
        // Empty chapters share a start with the next one; take the last.
        let start = self.starts[i];
        Some(VerseRef {
            book: start.book,
            chapter: start.chapter,
            verse: id.0 - start.first + 1,
        })
    }

    /// Verse text.
    #[must_use]
    pub fn text(&self, id: VerseId) -> Option<&str> {
        let at = self.locate(id)?;
        self.books
            .get(at.book)?
            .chapters
            .get(at.chapter as usize - 1)?
            .get(at.verse as usize - 1)
            .map(String::as_str)
    }

    /// Citation for a verse, e.g. `Genesis 1:3`.
    #[must_use]
    pub fn cite(&self, id: VerseId) -> Option<Citation<'_>> {
        let at = self.locate(id)?;
        Some(Citation {
            book: &self.books.get(at.book)?.name,
            chapter: at.chapter,
            verse: at.verse,
        })
    }

    /// Citation as a string, or the raw ordinal for unknown ids.
    #[must_use]
    pub fn label(&self, id: VerseId) -> String {
        self.cite(id)
            .map_or_else(|| format!("#{}", id.0), |c| c.to_string())
    }

    /// Verses that `id` refers to.
    #[must_use]
    pub fn cross_refs(&self, id: VerseId) -> &[VerseId] {
        self.cross_refs.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Topic names with their verses, alphabetically.
    pub fn topics(&self) -> impl Iterator<Item = (&str, &[VerseId])> {
        self.topics.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    #[must_use]
    pub fn topic(&self, name: &str) -> Option<&[VerseId]> {
        self.topics.get(name).map(Vec::as_slice)
    }

    /// Book whose name or abbreviation starts with `prefix` (case-insensitive).
    #[must_use]
    pub fn find_book(&self, prefix: &str) -> Option<usize> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return None;
        }
        let exact = self.books.iter().position(|b| {
            b.name.to_lowercase() == prefix || b.abbreviation.to_lowercase() == prefix
        });
        exact.or_else(|| {
            self.books.iter().position(|b| {
                b.name.to_lowercase().starts_with(&prefix)
                    || b.abbreviation.to_lowercase().starts_with(&prefix)
            })
        })
    }

    /// Parse `"John 3:16"`, `"jn 3"`, or `"1 Sam 2:1"` into a verse id.
    ///
    /// A bare chapter resolves to its first verse.
    #[must_use]
    pub fn parse_ref(&self, text: &str) -> Option<VerseId> {
        let text = text.trim();
        let (book, numbers) = text.rsplit_once(char::is_whitespace)?;
        let book = self.find_book(book)?;
        let (chapter, verse) = match numbers.split_once(':') {
            Some((c, v)) => (c.parse().ok()?, v.parse().ok()?),
            None => (numbers.parse().ok()?, 1),
        };
        self.verse_id(VerseRef {
            book,
            chapter,
            verse,
        })
    }
}

#[cfg(test)]
pub(crate) fn sample() -> Library {
    let verses = |texts: &[&str]| texts.iter().map(|t| (*t).to_string()).collect::<Vec<_>>();
    let mut library = Library::new(vec![
        Book::new(
            "Genesis",
            "Gen",
            vec![
                verses(&[
                    "In the beginning God created the heaven and the earth.",
                    "And the earth was without form, and void.",
                    "And God said, Let there be light: and there was light.",
                ]),
                verses(&[
                    "Thus the heavens and the earth were finished.",
                    "And on the seventh day God ended his work.",
                ]),
            ],
        ),
        Book::new(
            "John",
            "Jn",
            vec![verses(&[
                "In the beginning was the Word.",
                "The same was in the beginning with God.",
            ])],
        ),
    ]);
    library.add_cross_ref(VerseId(0), VerseId(5)).ok();
    library.add_cross_ref(VerseId(0), VerseId(6)).ok();
    library.add_topic("Creation", [VerseId(0), VerseId(3)]).ok();
    library.add_topic("Light", [VerseId(2)]).ok();
    library
}
