//! A misbehaving category never takes the palette down with it.

use lectern_core::{CategoryId, PaletteState, StatePatch, filter};
use lectern_palette::{Category, CommandPalette, Entry, Hook, HookError, HookResult, Invocation};
use tracing_test::traced_test;

#[derive(Clone, Copy)]
enum Failure {
    None,
    ListError,
    ListPanic,
    TriggerPanic,
}

struct Letters {
    id: &'static str,
    items: Vec<String>,
    failure: Failure,
}

impl Letters {
    fn new(id: &'static str, failure: Failure) -> Self {
        Self {
            id,
            items: ["x-ray", "xylophone", "axe"]
                .iter()
                .map(|s| format!("{id}:{s}"))
                .collect(),
            failure,
        }
    }
}

impl Category for Letters {
    type Item = String;

    fn id(&self) -> CategoryId {
        CategoryId::from_static(self.id)
    }

    fn title(&self) -> &str {
        self.id
    }

    fn trigger(&mut self, _state: &PaletteState) -> HookResult<()> {
        if let Failure::TriggerPanic = self.failure {
            panic!("trigger blew up in {}", self.id);
        }
        Ok(())
    }

    fn list(&self, query: &str) -> HookResult<Vec<String>> {
        match self.failure {
            Failure::ListError => Err(HookError::new("index unavailable")),
            Failure::ListPanic => panic!("list blew up"),
            _ => {
                let text = |s: &String| s.clone();
                Ok(filter(query, &self.items, &[&text]))
            }
        }
    }

    fn describe(&self, item: &String) -> HookResult<Entry> {
        Ok(Entry::new(item.clone()))
    }

    fn invoke(&mut self, _item: &String) -> HookResult<Invocation> {
        Ok(Invocation::Close)
    }
}

fn palette_with_middle(failure: Failure) -> CommandPalette {
    let mut palette = CommandPalette::new();
    palette.add_category(Letters::new("first", Failure::None)).unwrap();
    palette.add_category(Letters::new("second", failure)).unwrap();
    palette.add_category(Letters::new("third", Failure::None)).unwrap();
    palette
}

fn categories(palette: &CommandPalette) -> Vec<&str> {
    palette.groups().iter().map(|g| g.category.as_str()).collect()
}

#[test]
fn erroring_list_contributes_nothing() {
    let mut palette = palette_with_middle(Failure::ListError);
    palette.display(StatePatch::new().query("x"));

    assert!(palette.is_open());
    assert_eq!(categories(&palette), ["first", "third"]);
    assert_eq!(palette.results().len(), 6);
    assert_eq!(palette.last_faults().len(), 1);
    assert_eq!(palette.last_faults()[0].hook, Hook::List);
}

#[test]
fn panicking_list_contributes_nothing() {
    let mut palette = palette_with_middle(Failure::ListPanic);
    palette.display(StatePatch::new().query("x"));

    assert!(palette.is_open());
    assert_eq!(categories(&palette), ["first", "third"]);
    assert_eq!(palette.selected_index(), Some(0));
}

#[test]
fn panicking_trigger_skips_category() {
    let mut palette = palette_with_middle(Failure::TriggerPanic);
    palette.open(StatePatch::new().query("xylo"));

    assert_eq!(
        palette
            .results()
            .iter()
            .map(|r| r.entry.label.as_str())
            .collect::<Vec<_>>(),
        ["first:xylophone", "third:xylophone"]
    );
    assert_eq!(palette.last_faults()[0].hook, Hook::Trigger);
}

#[test]
fn faults_reset_each_pass() {
    let mut palette = palette_with_middle(Failure::ListError);
    palette.open(StatePatch::new());
    assert_eq!(palette.last_faults().len(), 1);

    palette
        .remove_category(&CategoryId::from_static("second"))
        .unwrap();
    assert!(palette.last_faults().is_empty());
    assert_eq!(categories(&palette), ["first", "third"]);
}

#[test]
#[traced_test]
fn fault_log_names_category_and_hook() {
    let mut palette = palette_with_middle(Failure::ListError);
    palette.open(StatePatch::new().query("x"));

    assert!(logs_contain("category hook failed"));
    assert!(logs_contain("category=second"));
    assert!(logs_contain("hook=list"));
    assert!(logs_contain("index unavailable"));
}
