#![forbid(unsafe_code)]

//! Core building blocks for the Lectern command palette.
//!
//! This crate provides:
//! - [`matching`]: multi-field substring and edit-distance filtering
//! - [`state`]: the immutable [`PaletteState`] and its [`StatePatch`]
//! - [`event`]: the single-threaded [`EventChannel`] components hold by value
//! - [`keys`]: the abstract keyboard contract ([`PaletteCommand`], [`KeyMap`])
//! - [`config`]: [`PaletteConfig`] with TOML/JSON loading
//!
//! Nothing here renders or knows about a particular domain.

pub mod config;
pub mod event;
pub mod keys;
pub mod matching;
pub mod state;

pub use config::{ConfigError, DEFAULT_PREVIEW_RESULTS, PaletteConfig};
pub use event::{EventChannel, Subscription};
pub use keys::{KeyMap, PaletteCommand};
pub use matching::{
    DEFAULT_FUZZY_RATIO_PERCENT, Extractor, MatchMode, edit_distance, filter, filter_fuzzy,
    filter_with,
};
pub use state::{CategoryId, DEFAULT_MAX_RESULTS, ExtValue, PaletteState, StatePatch};
