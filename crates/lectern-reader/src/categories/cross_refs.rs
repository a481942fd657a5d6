#![forbid(unsafe_code)]

use lectern_core::{CategoryId, PaletteState, filter};
use lectern_palette::{Category, Entry, HookResult, Invocation};

use super::{focused, verse_entry, verse_fields};
use crate::library::VerseId;
use crate::{ReaderContext, ids};

/// References for the focused verse.
///
/// Contributes nothing when no verse is focused. Drilling a reference makes
/// it the focused verse, so the category re-targets itself.
pub struct CrossRefs {
    context: ReaderContext,
    refs: Vec<VerseId>,
    title: String,
}

impl CrossRefs {
    #[must_use]
    pub fn new(context: ReaderContext) -> Self {
        Self {
            context,
            refs: Vec::new(),
            title: "Cross References".to_string(),
        }
    }
}

impl Category for CrossRefs {
    type Item = VerseId;

    fn id(&self) -> CategoryId {
        ids::CROSS_REFS
    }

    fn description(&self) -> &str {
        "Verses that refer to each other"
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn trigger(&mut self, state: &PaletteState) -> HookResult<()> {
        let library = &self.context.library;
        match focused(state) {
            Some(id) => {
                self.refs = library.cross_refs(id).to_vec();
                self.title = format!("Cross References for {}", library.label(id));
            }
            None => {
                self.refs.clear();
                self.title = "Cross References".to_string();
            }
        }
        Ok(())
    }

    fn list(&self, query: &str) -> HookResult<Vec<VerseId>> {
        let (citation, text) = verse_fields(&self.context.library);
        Ok(filter(query, &self.refs, &[&citation, &text]))
    }

    fn describe(&self, item: &VerseId) -> HookResult<Entry> {
        verse_entry(&self.context.library, *item)
    }

    fn invoke(&mut self, item: &VerseId) -> HookResult<Invocation> {
        self.context.jump(*item);
        Ok(Invocation::Close)
    }

    fn siblings(&self) -> Vec<CategoryId> {
        vec![ids::VERSES]
    }
}
