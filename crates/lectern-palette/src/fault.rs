#![forbid(unsafe_code)]

//! Fault boundary around category hooks.
//!
//! Every hook call goes through [`guarded`]. A returned [`HookError`] and a
//! panic both become a [`HookFault`], which is logged at `warn` and kept by
//! the controller until the next render round. Other categories keep
//! rendering.
//!
//! [`HookError`]: crate::HookError

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use lectern_core::CategoryId;

use crate::error::HookResult;

/// The category hook that was running when a fault occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Trigger,
    List,
    Describe,
    Invoke,
}

impl Hook {
    /// Lowercase hook name, as it appears in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::List => "list",
            Self::Describe => "describe",
            Self::Invoke => "invoke",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A contained category failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFault {
    pub category: CategoryId,
    pub hook: Hook,
    pub message: String,
}

impl fmt::Display for HookFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} failed: {}", self.category, self.hook, self.message)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run one hook call, converting errors and panics into a logged fault.
pub(crate) fn guarded<T>(
    category: &CategoryId,
    hook: Hook,
    f: impl FnOnce() -> HookResult<T>,
) -> Result<T, HookFault> {
    let message = match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(err)) => err.message().to_string(),
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };
    tracing::warn!(
        category = %category,
        hook = %hook,
        error = %message,
        "category hook failed"
    );
    Err(HookFault {
        category: category.clone(),
        hook,
        message,
    })
}
