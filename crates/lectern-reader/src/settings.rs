#![forbid(unsafe_code)]

//! Reader settings with explicit change notification.
//!
//! Settings are boolean toggles. Every mutation goes through
//! [`Settings::set`], which stores the value and then emits a
//! [`SettingChange`] on [`Settings::changes`]. Nothing intercepts field
//! access; a write that does not change the value emits nothing.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use lectern_core::EventChannel;

use crate::error::ReaderError;

/// One defined setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub key: String,
    pub label: String,
    pub value: bool,
}

/// Emitted after a setting changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChange {
    pub key: String,
    pub value: bool,
}

/// Shared settings store. Clones are handles to the same store.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    entries: Rc<RefCell<Vec<Setting>>>,
    changes: EventChannel<SettingChange>,
}

impl Settings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a setting, or relabel an existing one keeping its value.
    pub fn define(&self, key: impl Into<String>, label: impl Into<String>, default: bool) {
        let key = key.into();
        let label = label.into();
        let mut entries = self.entries.borrow_mut();
        match entries.iter_mut().find(|s| s.key == key) {
            Some(existing) => existing.label = label,
            None => entries.push(Setting {
                key,
                label,
                value: default,
            }),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<bool> {
        self.entries
            .borrow()
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.value)
    }

    /// Value of `key`, `false` when undefined.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).unwrap_or(false)
    }

    /// Store `value` and announce it. Returns whether the value changed.
    pub fn set(&self, key: &str, value: bool) -> Result<bool, ReaderError> {
        {
            let mut entries = self.entries.borrow_mut();
            let entry = entries
                .iter_mut()
                .find(|s| s.key == key)
                .ok_or_else(|| ReaderError::UnknownSetting(key.to_string()))?;
            if entry.value == value {
                return Ok(false);
            }
            entry.value = value;
        }
        tracing::debug!(key, value, "setting changed");
        self.changes.emit(&SettingChange {
            key: key.to_string(),
            value,
        });
        Ok(true)
    }

    /// Flip `key`, returning the new value.
    pub fn toggle(&self, key: &str) -> Result<bool, ReaderError> {
        let current = self
            .get(key)
            .ok_or_else(|| ReaderError::UnknownSetting(key.to_string()))?;
        self.set(key, !current)?;
        Ok(!current)
    }

    /// Definitions in definition order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Setting> {
        self.entries.borrow().clone()
    }

    /// Current values by key, for the host to persist.
    #[must_use]
    pub fn values(&self) -> BTreeMap<String, bool> {
        self.entries
            .borrow()
            .iter()
            .map(|s| (s.key.clone(), s.value))
            .collect()
    }

    /// Apply persisted values through [`set`](Self::set); unknown keys are skipped.
    pub fn restore(&self, values: &BTreeMap<String, bool>) {
        for (key, value) in values {
            if let Err(err) = self.set(key, *value) {
                tracing::debug!(%err, "skipping persisted setting");
            }
        }
    }

    /// Change notifications.
    #[must_use]
    pub fn changes(&self) -> &EventChannel<SettingChange> {
        &self.changes
    }
}
