#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;

use crate::library::VerseId;

/// Shared, ordered set of bookmarked verses. Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct Bookmarks {
    verses: Rc<RefCell<Vec<VerseId>>>,
}

impl Bookmarks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bookmark `id`. Returns `false` if it was already bookmarked.
    pub fn add(&self, id: VerseId) -> bool {
        let mut verses = self.verses.borrow_mut();
        if verses.contains(&id) {
            return false;
        }
        verses.push(id);
        true
    }

    pub fn remove(&self, id: VerseId) -> bool {
        let mut verses = self.verses.borrow_mut();
        let before = verses.len();
        verses.retain(|v| *v != id);
        verses.len() != before
    }

    pub fn clear(&self) {
        self.verses.borrow_mut().clear();
    }

    #[must_use]
    pub fn contains(&self, id: VerseId) -> bool {
        self.verses.borrow().contains(&id)
    }

    /// Bookmarks in the order they were added.
    #[must_use]
    pub fn list(&self) -> Vec<VerseId> {
        self.verses.borrow().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.verses.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verses.borrow().is_empty()
    }
}
