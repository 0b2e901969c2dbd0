#![forbid(unsafe_code)]

//! Per-field subscriber registry and synchronous notification dispatch.
//!
//! # Design
//!
//! One entry per field key that has at least one subscriber; entries are
//! created lazily on first registration and never removed (there is no
//! unsubscribe). Callbacks are stored as strong `Rc<dyn Fn(&Value)>` in
//! registration order, with no deduplication.
//!
//! Dispatch clones the target key's callback list out of the `RefCell`
//! before invoking anything, so no borrow is held while host code runs.
//! A callback may therefore subscribe, write, or reset the owning container
//! re-entrantly without tripping borrow rules.
//!
//! # Failure Modes
//!
//! - A panicking callback unwinds out of `dispatch`; callbacks later in the
//!   list for that notification are skipped. Nothing here catches it.
//! - `register` fails only if the registry is already mutably borrowed; the
//!   caller (`StateCell::subscribe`) logs and discards that error.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

/// A subscriber callback, shared so dispatch can clone the list out of the
/// registry and call entries without holding a borrow.
pub(crate) type SubscriberFn = Rc<dyn Fn(&Value)>;

/// Registration bookkeeping failed. Absorbed by `subscribe`, never surfaced.
#[derive(Debug)]
pub(crate) struct RegistrationError;

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber registry is already mutably borrowed")
    }
}

impl std::error::Error for RegistrationError {}

/// Ordered per-key callback lists.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    entries: RefCell<HashMap<String, Vec<SubscriberFn>>>,
}

impl SubscriberRegistry {
    /// Append `callback` to the list for `key`, creating the entry on first
    /// registration for that key.
    pub(crate) fn register(
        &self,
        key: String,
        callback: SubscriberFn,
    ) -> Result<(), RegistrationError> {
        let mut entries = self.entries.try_borrow_mut().map_err(|_| RegistrationError)?;
        entries.entry(key).or_default().push(callback);
        Ok(())
    }

    /// Invoke every callback registered for `key`, in registration order,
    /// passing `value`. No-op if the key has no entry.
    pub(crate) fn dispatch(&self, key: &str, value: &Value) {
        // Clone the list out first; the borrow must not outlive this
        // statement because callbacks may re-enter the registry.
        let callbacks: Vec<SubscriberFn> = match self.entries.borrow().get(key) {
            Some(list) => list.clone(),
            None => return,
        };
        for callback in &callbacks {
            callback(value);
        }
    }

    /// Number of callbacks registered for `key`.
    #[cfg(test)]
    pub(crate) fn subscriber_count(&self, key: &str) -> usize {
        self.entries.borrow().get(key).map_or(0, Vec::len)
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        f.debug_struct("SubscriberRegistry")
            .field("keys", &entries.len())
            .field(
                "subscribers",
                &entries.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}
