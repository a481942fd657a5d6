#![forbid(unsafe_code)]

//! Error types for categories and the palette registry.

use lectern_core::CategoryId;

/// Failure reported by a category hook.
///
/// The controller never propagates this to the host: it is logged with the
/// category identity and the category contributes nothing for that round.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    /// Create a hook error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for HookError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HookError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Result type returned by category hooks.
pub type HookResult<T> = Result<T, HookError>;

/// Errors from registering or removing categories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaletteError {
    /// A category with this identifier is already registered.
    #[error("category `{0}` is already registered")]
    DuplicateCategory(CategoryId),
    /// No category with this identifier is registered.
    #[error("category `{0}` is not registered")]
    UnknownCategory(CategoryId),
    /// The identifier belongs to a category the palette manages itself.
    #[error("category `{0}` is reserved by the palette")]
    ReservedCategory(CategoryId),
}
