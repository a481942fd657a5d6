#![forbid(unsafe_code)]

use lectern_palette::HookError;

/// Errors from the reader data context and stores.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// No setting with this key was defined.
    #[error("unknown setting `{0}`")]
    UnknownSetting(String),
    /// A cross reference or topic names a verse ordinal outside the library.
    #[error("verse {0} is outside the library")]
    UnknownVerse(u32),
    /// Malformed library document.
    #[cfg(feature = "json")]
    #[error("invalid library JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ReaderError> for HookError {
    fn from(err: ReaderError) -> Self {
        HookError::new(err.to_string())
    }
}
