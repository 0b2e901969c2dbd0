#![forbid(unsafe_code)]

//! Container lifecycle: construction, subscription, and reset.
//!
//! # Design
//!
//! [`StateCell`] holds shared, reference-counted inner state: a frozen
//! snapshot of the initial value, a `RefCell`-guarded working copy, and the
//! subscriber registry. Cloning a `StateCell` creates a new handle to the
//! **same** inner state — clones see the same working copy and share
//! subscribers.
//!
//! `reset` replaces the working copy's contents (not its allocation
//! identity), so every [`StateView`] or [`crate::SeqView`] handed out
//! earlier keeps observing the post-reset state.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::error::StateError;
use crate::registry::SubscriberRegistry;
use crate::view::StateView;

/// Shared interior for [`StateCell`].
pub(crate) struct CellInner {
    /// Deep copy of the initial value, immutable after construction.
    /// Read only by `reset`.
    pub(crate) snapshot: Map<String, Value>,
    /// The live backing store behind every view.
    pub(crate) data: RefCell<Map<String, Value>>,
    pub(crate) registry: SubscriberRegistry,
}

/// An observable state container over a JSON object.
///
/// Construct one with [`StateCell::new`] or [`StateCell::from_value`], hand
/// out read/write access via [`StateCell::state`], and register per-field
/// callbacks with [`StateCell::subscribe`]. [`StateCell::reset`] reverts the
/// container to its construction-time snapshot and re-notifies every
/// original field.
pub struct StateCell {
    inner: Rc<CellInner>,
}

// Manual Clone: shares the same Rc.
impl Clone for StateCell {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for StateCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("fields", &self.inner.data.borrow().len())
            .field("registry", &self.inner.registry)
            .finish()
    }
}

impl StateCell {
    /// Create a container over `initial`.
    ///
    /// The snapshot and the working copy are both deep copies: mutating this
    /// container never affects another container built from a clone of the
    /// same map, and vice versa.
    #[must_use]
    pub fn new(initial: Map<String, Value>) -> Self {
        Self {
            inner: Rc::new(CellInner {
                snapshot: initial.clone(),
                data: RefCell::new(initial),
                registry: SubscriberRegistry::default(),
            }),
        }
    }

    /// Create a container from a `Value`, which must be a JSON object.
    pub fn from_value(initial: Value) -> Result<Self, StateError> {
        match initial {
            Value::Object(map) => Ok(Self::new(map)),
            _ => Err(StateError::NotAnObject),
        }
    }

    /// The mutable view over the working copy.
    ///
    /// Views are cheap handles; every view obtained from this cell (or from
    /// a clone of it) observes the same live state, including across
    /// [`reset`](Self::reset).
    #[must_use]
    pub fn state(&self) -> StateView {
        StateView::new(Rc::clone(&self.inner))
    }

    /// Register `callback` to run whenever the field `key` is assigned or
    /// mutated in place, receiving the field's new value.
    ///
    /// Callbacks for one key run in registration order and are never
    /// deduplicated or removed. `subscribe` never fails: if registry
    /// bookkeeping errors out, the error is logged and the callback is
    /// dropped — by design the caller gets no feedback either way.
    pub fn subscribe(&self, key: impl Into<String>, callback: impl Fn(&Value) + 'static) {
        let key = key.into();
        if let Err(err) = self.inner.registry.register(key.clone(), Rc::new(callback)) {
            tracing::error!(field = %key, error = %err, "dropping subscriber: registration failed");
        }
    }

    /// Restore the working copy from the construction-time snapshot, then
    /// notify every field present in the snapshot with its restored value,
    /// in the initial value's field order.
    ///
    /// Notification is unconditional: fields whose value did not change and
    /// fields with no subscribers are still (no-op) notified. Fields added
    /// after construction are dropped without notification, since the
    /// snapshot does not carry them.
    pub fn reset(&self) {
        *self.inner.data.borrow_mut() = self.inner.snapshot.clone();
        for (key, value) in &self.inner.snapshot {
            self.inner.registry.dispatch(key, value);
        }
    }
}
