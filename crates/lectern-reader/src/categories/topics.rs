#![forbid(unsafe_code)]

use lectern_core::{CategoryId, PaletteState, StatePatch, filter, filter_with};
use lectern_palette::{Category, Entry, HookResult, Invocation};

use super::{verse_entry, verse_fields};
use crate::library::VerseId;
use crate::{ReaderContext, ext, ids};

/// A topic name, or a verse within the selected topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicItem {
    Topic(String),
    Verse(VerseId),
}

/// Topical index: topic names, then the verses of the chosen topic.
pub struct Topics {
    context: ReaderContext,
    selected: Option<String>,
    title: String,
}

impl Topics {
    #[must_use]
    pub fn new(context: ReaderContext) -> Self {
        Self {
            context,
            selected: None,
            title: "Topics".to_string(),
        }
    }

    fn open_topic(name: &str) -> StatePatch {
        StatePatch::new()
            .activate(ids::TOPICS)
            .ext(ext::TOPIC, name)
            .query("")
    }
}

impl Category for Topics {
    type Item = TopicItem;

    fn id(&self) -> CategoryId {
        ids::TOPICS
    }

    fn description(&self) -> &str {
        "Verses grouped by subject"
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn trigger(&mut self, state: &PaletteState) -> HookResult<()> {
        self.selected = state
            .ext_text(ext::TOPIC)
            .filter(|name| self.context.library.topic(name).is_some())
            .map(str::to_string);
        self.title = self
            .selected
            .clone()
            .unwrap_or_else(|| "Topics".to_string());
        Ok(())
    }

    fn list(&self, query: &str) -> HookResult<Vec<TopicItem>> {
        let library = &self.context.library;
        match &self.selected {
            Some(name) => {
                let verses = library.topic(name).unwrap_or_default();
                let (citation, text) = verse_fields(library);
                Ok(filter(query, verses, &[&citation, &text])
                    .into_iter()
                    .map(TopicItem::Verse)
                    .collect())
            }
            None => {
                let names: Vec<&str> = library.topics().map(|(name, _)| name).collect();
                let text = |name: &&str| (*name).to_string();
                Ok(filter_with(self.context.match_mode, query, &names, &[&text])
                    .into_iter()
                    .map(|name| TopicItem::Topic(name.to_string()))
                    .collect())
            }
        }
    }

    fn describe(&self, item: &TopicItem) -> HookResult<Entry> {
        match item {
            TopicItem::Topic(name) => {
                let count = self.context.library.topic(name).map_or(0, <[_]>::len);
                Ok(Entry::new(name.clone())
                    .with_description(format!("{count} verses"))
                    .with_drill(Self::open_topic(name)))
            }
            TopicItem::Verse(id) => verse_entry(&self.context.library, *id),
        }
    }

    fn invoke(&mut self, item: &TopicItem) -> HookResult<Invocation> {
        Ok(match item {
            TopicItem::Topic(name) => Invocation::Display(Self::open_topic(name)),
            TopicItem::Verse(id) => {
                self.context.jump(*id);
                Invocation::Close
            }
        })
    }
}
