#![forbid(unsafe_code)]

//! Prompt and confirm.
//!
//! [`CommandPalette::prompt`](crate::CommandPalette::prompt) registers a
//! transient [`PromptCategory`] offering two choices, seeds the query with the
//! prompt text, and returns a [`PromptHandle`]. The handle resolves:
//!
//! - to `Some(query)` when "Confirm" is invoked,
//! - to `None` when "Cancel" is invoked or the palette closes first.
//!
//! Resolution happens exactly once; later outcomes are ignored. The handle is
//! a [`Future`] for hosts with an executor, and can also be polled
//! synchronously with [`PromptHandle::try_result`].

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use lectern_core::{CategoryId, PaletteState};

use crate::category::{Category, Entry, Invocation};
use crate::error::HookResult;

/// Identifier of the transient prompt category.
pub const PROMPT_ID: CategoryId = CategoryId::from_static("prompt");

#[derive(Default)]
struct PromptSlot {
    outcome: Option<Option<String>>,
    waker: Option<Waker>,
}

/// Resolving half of a prompt.
#[derive(Clone)]
pub(crate) struct PromptSender {
    slot: Rc<RefCell<PromptSlot>>,
}

impl PromptSender {
    /// Record `outcome` if nothing was recorded yet. Returns whether it won.
    pub(crate) fn resolve(&self, outcome: Option<String>) -> bool {
        let waker = {
            let mut slot = self.slot.borrow_mut();
            if slot.outcome.is_some() {
                return false;
            }
            slot.outcome = Some(outcome);
            slot.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
        true
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.slot.borrow().outcome.is_some()
    }
}

impl fmt::Debug for PromptSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptSender")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

pub(crate) fn channel() -> (PromptSender, PromptHandle) {
    let slot = Rc::new(RefCell::new(PromptSlot::default()));
    (
        PromptSender {
            slot: Rc::clone(&slot),
        },
        PromptHandle { slot },
    )
}

/// Pending answer to a prompt.
#[must_use = "a prompt handle does nothing unless polled"]
pub struct PromptHandle {
    slot: Rc<RefCell<PromptSlot>>,
}

impl PromptHandle {
    /// Whether the prompt has been answered or abandoned.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.slot.borrow().outcome.is_some()
    }

    /// `None` while pending; `Some(answer)` once resolved.
    #[must_use]
    pub fn try_result(&self) -> Option<Option<String>> {
        self.slot.borrow().outcome.clone()
    }
}

impl Future for PromptHandle {
    type Output = Option<String>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.slot.borrow_mut();
        match &slot.outcome {
            Some(outcome) => Poll::Ready(outcome.clone()),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl fmt::Debug for PromptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptHandle")
            .field("outcome", &self.slot.borrow().outcome)
            .finish()
    }
}

/// Pending answer to a yes/no confirmation.
#[must_use = "a confirm handle does nothing unless polled"]
#[derive(Debug)]
pub struct ConfirmHandle {
    inner: PromptHandle,
}

impl ConfirmHandle {
    pub(crate) fn new(inner: PromptHandle) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.inner.is_resolved()
    }

    /// `None` while pending; `Some(confirmed)` once resolved.
    #[must_use]
    pub fn try_result(&self) -> Option<bool> {
        self.inner.try_result().map(|answer| answer.is_some())
    }
}

impl Future for ConfirmHandle {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        Pin::new(&mut self.inner)
            .poll(cx)
            .map(|answer| answer.is_some())
    }
}

/// The two terminal choices of a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    Confirm,
    Cancel,
}

/// Hidden category shown while a prompt is pending.
#[derive(Debug)]
pub struct PromptCategory {
    sender: PromptSender,
    title: String,
    query: String,
}

impl PromptCategory {
    pub(crate) fn new(sender: PromptSender, text: &str) -> Self {
        Self {
            sender,
            title: text.to_string(),
            query: text.to_string(),
        }
    }
}

impl Category for PromptCategory {
    type Item = PromptChoice;

    fn id(&self) -> CategoryId {
        PROMPT_ID
    }

    fn description(&self) -> &str {
        "Answer a pending prompt"
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn trigger(&mut self, state: &PaletteState) -> HookResult<()> {
        self.query = state.query().to_string();
        Ok(())
    }

    // Both choices stay visible whatever is typed.
    fn list(&self, _query: &str) -> HookResult<Vec<PromptChoice>> {
        Ok(vec![PromptChoice::Confirm, PromptChoice::Cancel])
    }

    fn describe(&self, item: &PromptChoice) -> HookResult<Entry> {
        Ok(match item {
            PromptChoice::Confirm => {
                Entry::new("Confirm").with_description(format!("\"{}\"", self.query))
            }
            PromptChoice::Cancel => Entry::new("Cancel"),
        })
    }

    fn invoke(&mut self, item: &PromptChoice) -> HookResult<Invocation> {
        let outcome = match item {
            PromptChoice::Confirm => Some(self.query.clone()),
            PromptChoice::Cancel => None,
        };
        tracing::debug!(confirmed = outcome.is_some(), "prompt answered");
        self.sender.resolve(outcome);
        Ok(Invocation::Close)
    }

    fn hidden(&self) -> bool {
        true
    }
}
