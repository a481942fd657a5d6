#![forbid(unsafe_code)]

//! Built-in reader categories.

mod bookmarks;
mod cross_refs;
mod settings;
mod topics;
mod verses;

pub use bookmarks::BookmarksCategory;
pub use cross_refs::CrossRefs;
pub use settings::SettingsCategory;
pub use topics::Topics;
pub use verses::Verses;

use lectern_core::{PaletteState, StatePatch};
use lectern_palette::{Entry, HookResult};

use crate::library::{Library, VerseId};
use crate::{ext, ids};

/// Focused verse from the state, if any.
pub(crate) fn focused(state: &PaletteState) -> Option<VerseId> {
    state.ext_int(ext::VERSE).and_then(VerseId::from_ext)
}

/// Entry for a verse: citation, text, and a drill into its cross references.
pub(crate) fn verse_entry(library: &Library, id: VerseId) -> HookResult<Entry> {
    let text = library
        .text(id)
        .ok_or_else(|| format!("verse {} is outside the library", id.0))?;
    Ok(Entry::new(library.label(id))
        .with_description(text)
        .with_drill(cross_refs_of(id)))
}

/// Patch that shows the cross references of `id`.
pub(crate) fn cross_refs_of(id: VerseId) -> StatePatch {
    StatePatch::new()
        .activate(ids::CROSS_REFS)
        .ext(ext::VERSE, id.to_ext())
        .clear_ext(ext::SPECIFICITY)
        .query("")
}

/// Citation and text extractors over verse ids.
pub(crate) fn verse_fields(
    library: &Library,
) -> (
    impl Fn(&VerseId) -> String + '_,
    impl Fn(&VerseId) -> String + '_,
) {
    (
        move |id: &VerseId| library.label(*id),
        move |id: &VerseId| library.text(*id).unwrap_or_default().to_string(),
    )
}
