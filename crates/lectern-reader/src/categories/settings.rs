#![forbid(unsafe_code)]

use lectern_core::{CategoryId, PaletteState, filter_with};
use lectern_palette::{Category, Entry, HookError, HookResult, Invocation};

use crate::settings::Setting;
use crate::{ReaderContext, ids};

/// Boolean settings; invoking one flips it and keeps the palette open.
pub struct SettingsCategory {
    context: ReaderContext,
    current: Vec<Setting>,
}

impl SettingsCategory {
    #[must_use]
    pub fn new(context: ReaderContext) -> Self {
        Self {
            context,
            current: Vec::new(),
        }
    }
}

impl Category for SettingsCategory {
    type Item = String;

    fn id(&self) -> CategoryId {
        ids::SETTINGS
    }

    fn description(&self) -> &str {
        "Toggle reader options"
    }

    fn title(&self) -> &str {
        "Settings"
    }

    fn trigger(&mut self, _state: &PaletteState) -> HookResult<()> {
        self.current = self.context.settings.snapshot();
        Ok(())
    }

    fn list(&self, query: &str) -> HookResult<Vec<String>> {
        let label = |s: &Setting| s.label.clone();
        let key = |s: &Setting| s.key.clone();
        Ok(
            filter_with(self.context.match_mode, query, &self.current, &[&label, &key])
                .into_iter()
                .map(|s| s.key)
                .collect(),
        )
    }

    fn describe(&self, key: &String) -> HookResult<Entry> {
        let setting = self
            .current
            .iter()
            .find(|s| &s.key == key)
            .ok_or_else(|| HookError::new(format!("setting {key} is not defined")))?;
        let value = if setting.value { "On" } else { "Off" };
        Ok(Entry::new(setting.label.clone()).with_description(value))
    }

    fn invoke(&mut self, key: &String) -> HookResult<Invocation> {
        self.context.settings.toggle(key)?;
        Ok(Invocation::Refresh)
    }
}
