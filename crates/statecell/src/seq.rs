#![forbid(unsafe_code)]

//! Observing wrapper for sequence-valued fields.
//!
//! # Design
//!
//! [`SeqView`] exposes a fixed, closed set of mutating operations — `push`,
//! `pop`, `shift`, `unshift`, `splice`, `sort`, `reverse` — plus read-only
//! access. Mutating operations are observable at the type level: there is no
//! way to change the sequence through a `SeqView` without the owning field's
//! subscribers being notified with the sequence after mutation. Classification
//! is by operation, not by effect: a contents-level no-op (`sort` on a sorted
//! sequence, `pop` on an empty one) still notifies.
//!
//! The wrapper is bound to the field **key**, not to a particular array: each
//! call re-resolves the field in the working copy, so a `SeqView` stays live
//! across reassignment and reset — and fails cleanly if the field has since
//! been removed or is no longer an array. A failed operation never notifies.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::cell::CellInner;
use crate::error::StateError;

/// Observing wrapper over one sequence-valued field.
///
/// Obtained from [`crate::StateView::seq`]; a fresh wrapper per call.
pub struct SeqView {
    inner: Rc<CellInner>,
    key: String,
}

impl fmt::Debug for SeqView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeqView")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl SeqView {
    pub(crate) fn new(inner: Rc<CellInner>, key: String) -> Self {
        Self { inner, key }
    }

    /// The field key this wrapper is bound to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Run a read-only closure over the current sequence.
    fn with_seq<R>(&self, f: impl FnOnce(&[Value]) -> R) -> Result<R, StateError> {
        let data = self.inner.data.borrow();
        let slot = data
            .get(&self.key)
            .ok_or_else(|| StateError::MissingField(self.key.clone()))?;
        let seq = slot
            .as_array()
            .ok_or_else(|| StateError::NotASequence(self.key.clone()))?;
        Ok(f(seq))
    }

    /// Run a mutating closure over the current sequence, then notify the
    /// owning field's subscribers with the sequence after mutation. The
    /// working-copy borrow is released before dispatch.
    fn mutate<R>(&self, f: impl FnOnce(&mut Vec<Value>) -> R) -> Result<R, StateError> {
        let (result, after) = {
            let mut data = self
                .inner
                .data
                .try_borrow_mut()
                .map_err(|_| StateError::StateBusy)?;
            let slot = data
                .get_mut(&self.key)
                .ok_or_else(|| StateError::MissingField(self.key.clone()))?;
            let seq = slot
                .as_array_mut()
                .ok_or_else(|| StateError::NotASequence(self.key.clone()))?;
            let result = f(seq);
            (result, Value::Array(seq.clone()))
        };
        self.inner.registry.dispatch(&self.key, &after);
        Ok(result)
    }

    // ── Mutating operations (each notifies) ───────────────────────────────

    /// Append `value` to the end.
    pub fn push(&self, value: impl Into<Value>) -> Result<(), StateError> {
        let value = value.into();
        self.mutate(move |seq| seq.push(value))
    }

    /// Remove and return the last element, or `None` if empty.
    pub fn pop(&self) -> Result<Option<Value>, StateError> {
        self.mutate(Vec::pop)
    }

    /// Remove and return the first element, or `None` if empty.
    pub fn shift(&self) -> Result<Option<Value>, StateError> {
        self.mutate(|seq| {
            if seq.is_empty() {
                None
            } else {
                Some(seq.remove(0))
            }
        })
    }

    /// Insert `value` at the front.
    pub fn unshift(&self, value: impl Into<Value>) -> Result<(), StateError> {
        let value = value.into();
        self.mutate(move |seq| seq.insert(0, value))
    }

    /// Remove up to `delete_count` elements starting at `start` (both
    /// clamped to the sequence length), insert `replacement` in their place,
    /// and return the removed elements.
    pub fn splice(
        &self,
        start: usize,
        delete_count: usize,
        replacement: Vec<Value>,
    ) -> Result<Vec<Value>, StateError> {
        self.mutate(move |seq| {
            let start = start.min(seq.len());
            let end = start + delete_count.min(seq.len() - start);
            seq.splice(start..end, replacement).collect()
        })
    }

    /// Sort in place by a total order over values: variant rank
    /// (null < bool < number < string < array < object), then natural
    /// ordering within a variant. The sort is stable.
    pub fn sort(&self) -> Result<(), StateError> {
        self.mutate(|seq| seq.sort_by(value_cmp))
    }

    /// Reverse in place.
    pub fn reverse(&self) -> Result<(), StateError> {
        self.mutate(|seq| seq.reverse())
    }

    // ── Read-only access (never notifies) ─────────────────────────────────

    /// Current number of elements.
    pub fn len(&self) -> Result<usize, StateError> {
        self.with_seq(<[Value]>::len)
    }

    /// Whether the sequence is currently empty.
    pub fn is_empty(&self) -> Result<bool, StateError> {
        self.with_seq(<[Value]>::is_empty)
    }

    /// Deep copy of the element at `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Result<Option<Value>, StateError> {
        self.with_seq(|seq| seq.get(index).cloned())
    }

    /// Deep copy of the whole sequence.
    pub fn to_vec(&self) -> Result<Vec<Value>, StateError> {
        self.with_seq(<[Value]>::to_vec)
    }
}

fn variant_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values used by [`SeqView::sort`].
pub(crate) fn value_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (a, b) in x.iter().zip(y.iter()) {
                let ord = value_cmp(a, b);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            for ((ak, av), (bk, bv)) in x.iter().zip(y.iter()) {
                let ord = ak.cmp(bk).then_with(|| value_cmp(av, bv));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => variant_rank(a).cmp(&variant_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StateCell;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    fn items_cell() -> (StateCell, Rc<RefCell<Vec<Value>>>) {
        let cell = StateCell::from_value(json!({ "items": [1, 2] })).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        cell.subscribe("items", move |value| seen_clone.borrow_mut().push(value.clone()));
        (cell, seen)
    }

    #[test]
    fn push_notifies_with_the_mutated_sequence() {
        let (cell, seen) = items_cell();
        cell.state().seq("items").unwrap().push(3).unwrap();
        assert_eq!(*seen.borrow(), vec![json!([1, 2, 3])]);
    }

    #[test]
    fn pop_and_shift_return_removed_elements() {
        let (cell, seen) = items_cell();
        let items = cell.state().seq("items").unwrap();

        assert_eq!(items.pop().unwrap(), Some(json!(2)));
        assert_eq!(items.shift().unwrap(), Some(json!(1)));
        assert_eq!(
            *seen.borrow(),
            vec![json!([1]), json!([])]
        );
    }

    #[test]
    fn pop_on_empty_sequence_still_notifies() {
        let cell = StateCell::from_value(json!({ "items": [] })).unwrap();
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        cell.subscribe("items", move |_| count_clone.set(count_clone.get() + 1));

        let items = cell.state().seq("items").unwrap();
        assert_eq!(items.pop().unwrap(), None);
        assert_eq!(items.shift().unwrap(), None);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn unshift_inserts_at_the_front() {
        let (cell, seen) = items_cell();
        cell.state().seq("items").unwrap().unshift(0).unwrap();
        assert_eq!(*seen.borrow(), vec![json!([0, 1, 2])]);
    }

    #[test]
    fn splice_removes_and_inserts() {
        let cell = StateCell::from_value(json!({ "items": [1, 2, 3, 4] })).unwrap();
        let items = cell.state().seq("items").unwrap();

        let removed = items.splice(1, 2, vec![json!("a"), json!("b")]).unwrap();
        assert_eq!(removed, vec![json!(2), json!(3)]);
        assert_eq!(cell.state().get("items"), Some(json!([1, "a", "b", 4])));
    }

    #[test]
    fn splice_clamps_out_of_range_arguments() {
        let cell = StateCell::from_value(json!({ "items": [1, 2] })).unwrap();
        let items = cell.state().seq("items").unwrap();

        // Start past the end: removes nothing, appends.
        let removed = items.splice(10, 5, vec![json!(3)]).unwrap();
        assert!(removed.is_empty());
        assert_eq!(cell.state().get("items"), Some(json!([1, 2, 3])));

        // Delete count past the end: removes the tail only.
        let removed = items.splice(1, 99, vec![]).unwrap();
        assert_eq!(removed, vec![json!(2), json!(3)]);
        assert_eq!(cell.state().get("items"), Some(json!([1])));
    }

    #[test]
    fn sort_orders_and_notifies_even_when_already_sorted() {
        let cell = StateCell::from_value(json!({ "items": [3, 1, 2] })).unwrap();
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        cell.subscribe("items", move |_| count_clone.set(count_clone.get() + 1));

        let items = cell.state().seq("items").unwrap();
        items.sort().unwrap();
        assert_eq!(cell.state().get("items"), Some(json!([1, 2, 3])));

        // No-op by contents, but sort is a mutating operation: notifies.
        items.sort().unwrap();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn sort_handles_mixed_variants() {
        let cell =
            StateCell::from_value(json!({ "items": ["b", 2, null, true, "a", 1, [0]] })).unwrap();
        let items = cell.state().seq("items").unwrap();
        items.sort().unwrap();
        assert_eq!(
            cell.state().get("items"),
            Some(json!([null, true, 1, 2, "a", "b", [0]]))
        );
    }

    #[test]
    fn reverse_notifies_with_the_reversed_sequence() {
        let (cell, seen) = items_cell();
        cell.state().seq("items").unwrap().reverse().unwrap();
        assert_eq!(*seen.borrow(), vec![json!([2, 1])]);
    }

    #[test]
    fn reads_never_notify() {
        let (cell, seen) = items_cell();
        let items = cell.state().seq("items").unwrap();

        assert_eq!(items.len().unwrap(), 2);
        assert!(!items.is_empty().unwrap());
        assert_eq!(items.get(0).unwrap(), Some(json!(1)));
        assert_eq!(items.get(9).unwrap(), None);
        assert_eq!(items.to_vec().unwrap(), vec![json!(1), json!(2)]);

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn wrapper_fails_cleanly_after_field_reassignment() {
        let cell = StateCell::from_value(json!({ "items": [1] })).unwrap();
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        cell.subscribe("items", move |_| count_clone.set(count_clone.get() + 1));

        let items = cell.state().seq("items").unwrap();
        cell.state().set("items", "not a sequence").unwrap();
        assert_eq!(count.get(), 1); // The reassignment itself notified.

        assert_eq!(
            items.push(2).unwrap_err(),
            StateError::NotASequence("items".to_string())
        );
        assert_eq!(count.get(), 1); // A failed operation never notifies.
    }

    #[test]
    fn each_seq_call_yields_a_fresh_wrapper_over_shared_storage() {
        let (cell, seen) = items_cell();
        let state = cell.state();

        let first = state.seq("items").unwrap();
        let second = state.seq("items").unwrap();

        first.push(3).unwrap();
        second.push(4).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![json!([1, 2, 3]), json!([1, 2, 3, 4])]
        );
    }

    #[test]
    fn value_cmp_is_a_total_order_over_variants() {
        let ordered = [
            json!(null),
            json!(false),
            json!(true),
            json!(-1),
            json!(0.5),
            json!(2),
            json!(""),
            json!("a"),
            json!([]),
            json!([1]),
            json!({}),
            json!({ "a": 1 }),
        ];
        for window in ordered.windows(2) {
            assert_eq!(
                value_cmp(&window[0], &window[1]),
                Ordering::Less,
                "{} should sort before {}",
                window[0],
                window[1]
            );
        }
        for value in &ordered {
            assert_eq!(value_cmp(value, value), Ordering::Equal);
        }
    }
}
