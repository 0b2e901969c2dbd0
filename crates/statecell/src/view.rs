#![forbid(unsafe_code)]

//! The mutable view: typed read/write access over the working copy.
//!
//! # Design
//!
//! [`StateView`] is a capability handle, not data: it routes every access
//! through the owning container's working copy and fires the field's
//! subscribers on each successful write. Reads are deep copies and never
//! notify.
//!
//! Writes notify **unconditionally** — assigning a value equal to the
//! current one still counts as a change. The borrow of the working copy is
//! released before dispatch, so subscribers may write back through this or
//! any other view re-entrantly.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::cell::CellInner;
use crate::error::StateError;
use crate::seq::SeqView;

/// Read/write capability over a [`crate::StateCell`]'s working copy.
///
/// Obtained from [`crate::StateCell::state`]. Cheap to create and to clone;
/// all views over one cell observe the same live state.
pub struct StateView {
    inner: Rc<CellInner>,
}

impl Clone for StateView {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for StateView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateView")
            .field("fields", &self.inner.data.borrow().len())
            .finish()
    }
}

impl StateView {
    pub(crate) fn new(inner: Rc<CellInner>) -> Self {
        Self { inner }
    }

    /// Current value of the field `key`, as a deep copy, or `None` if the
    /// field is not present. Never notifies.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.data.borrow().get(key).cloned()
    }

    /// Assign `value` to the field `key`, inserting the field if absent,
    /// then notify the key's subscribers with the new value.
    ///
    /// Notification is unconditional (no equality check) and happens before
    /// `set` returns. If the assignment itself fails, the error propagates
    /// and nothing is notified.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), StateError> {
        let key = key.into();
        let value = value.into();
        let notified = value.clone();
        {
            let mut data = self
                .inner
                .data
                .try_borrow_mut()
                .map_err(|_| StateError::StateBusy)?;
            data.insert(key.clone(), value);
        }
        self.inner.registry.dispatch(&key, &notified);
        Ok(())
    }

    /// Observing wrapper over the sequence-valued field `key`.
    ///
    /// A fresh wrapper is constructed on every call, bound to the field key
    /// (not to the current array), so it stays valid across reassignment of
    /// the field and across [`crate::StateCell::reset`]. Fails if the field
    /// is absent or its current value is not an array.
    pub fn seq(&self, key: &str) -> Result<SeqView, StateError> {
        match self.inner.data.borrow().get(key) {
            None => Err(StateError::MissingField(key.to_owned())),
            Some(Value::Array(_)) => Ok(SeqView::new(Rc::clone(&self.inner), key.to_owned())),
            Some(_) => Err(StateError::NotASequence(key.to_owned())),
        }
    }

    /// Whether the field `key` is currently present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.data.borrow().contains_key(key)
    }

    /// Current field keys, in the working copy's insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.data.borrow().keys().cloned().collect()
    }

    /// Number of fields currently present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.data.borrow().len()
    }

    /// Whether the working copy currently has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.data.borrow().is_empty()
    }
}
