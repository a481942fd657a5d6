#![forbid(unsafe_code)]

//! Single-threaded event channel with RAII subscriptions.
//!
//! An [`EventChannel<T>`] is a shared, cloneable fan-out point. Components
//! hold a channel by value (clones share the same subscriber list) and emit
//! events explicitly; observers register callbacks with
//! [`subscribe`](EventChannel::subscribe) and receive a [`Subscription`]
//! guard that unsubscribes on drop.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Every `emit` bumps the channel's emission counter exactly once, even
//!    with no subscribers.
//! 3. Dropping a [`Subscription`] removes its callback before the next emit.
//! 4. A callback may subscribe, unsubscribe, or emit on the same channel
//!    without a `RefCell` double borrow: emission iterates a snapshot.
//!
//! # Failure Modes
//!
//! - Channel dropped while a `Subscription` is alive: dropping the guard is a
//!   no-op (the channel is held weakly).
//! - Callback panic: propagates to the caller of `emit`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct ChannelInner<T> {
    next_id: u64,
    emitted: u64,
    subscribers: Vec<(u64, Callback<T>)>,
}

/// Shared event channel. Cloning yields another handle to the same channel.
pub struct EventChannel<T> {
    inner: Rc<RefCell<ChannelInner<T>>>,
}

impl<T> Clone for EventChannel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventChannel")
            .field("subscribers", &inner.subscribers.len())
            .field("emitted", &inner.emitted)
            .finish()
    }
}

impl<T> EventChannel<T> {
    /// Create a channel with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ChannelInner {
                next_id: 1,
                emitted: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Deliver `event` to every current subscriber, in registration order.
    pub fn emit(&self, event: &T) {
        let snapshot: Vec<Callback<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.emitted += 1;
            inner
                .subscribers
                .iter()
                .map(|(_, cb)| Rc::clone(cb))
                .collect()
        };
        for callback in snapshot {
            callback(event);
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.inner.borrow().emitted
    }

    /// Whether two handles refer to the same channel.
    #[must_use]
    pub fn same_channel(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: 'static> EventChannel<T> {
    /// Register `callback`; it stays registered until the returned guard drops.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Rc::new(callback)));
            id
        };
        let weak: Weak<RefCell<ChannelInner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().subscribers.retain(|(sid, _)| *sid != id);
                }
            })),
        }
    }
}

/// RAII guard for a channel subscription.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keep the callback registered for the lifetime of the channel.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
