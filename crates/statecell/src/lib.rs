#![forbid(unsafe_code)]

//! Observable JSON state container with per-field change notification.
//!
//! # Design
//!
//! [`StateCell`] owns two independent deep copies of the initial value: a
//! frozen snapshot (used only by [`StateCell::reset`]) and a live working
//! copy. Hosts read and write the working copy through a [`StateView`]
//! capability; every top-level field assignment, and every mutating
//! operation on a sequence-valued field (through [`SeqView`]), synchronously
//! notifies the callbacks subscribed to that field key, in registration
//! order.
//!
//! Values are `serde_json::Value` with insertion-ordered maps, so `reset`
//! re-notifies fields in the initial value's own field order, and `clone`
//! is a deep, alias-free copy.
//!
//! # Invariants
//!
//! 1. Snapshot and working copy never alias each other or the caller's
//!    initial value.
//! 2. Subscribers for a key are notified in registration order; identical
//!    callbacks are not deduplicated; there is no unsubscribe.
//! 3. Every successful field write and every sequence mutator call produces
//!    exactly one notification before returning, with no equality check —
//!    re-assigning an equal value (or sorting an already-sorted sequence)
//!    still notifies.
//! 4. Non-mutating reads never notify.
//! 5. No interior borrow is held while callbacks run, so callbacks may
//!    re-enter the same container (write, subscribe, reset) on the same
//!    call stack.
//!
//! # Failure Modes
//!
//! - A panicking callback aborts the remaining callbacks for that
//!   notification and unwinds out of the write that triggered it. The core
//!   catches nothing on this path.
//! - [`StateCell::subscribe`] never fails: registration bookkeeping errors
//!   are logged via `tracing` and discarded.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use statecell::StateCell;
//!
//! let cell = StateCell::from_value(json!({ "count": 0, "items": [1, 2] }))?;
//! cell.subscribe("count", |v| println!("count is now {v}"));
//!
//! let state = cell.state();
//! state.set("count", 5)?;          // prints "count is now 5"
//! state.seq("items")?.push(3)?;    // notifies "items" subscribers with [1, 2, 3]
//! cell.reset();                    // restores { count: 0, items: [1, 2] },
//!                                  // notifying every original field
//! # Ok::<(), statecell::StateError>(())
//! ```

pub mod cell;
pub mod error;
pub mod seq;
pub mod view;

mod registry;

pub use cell::StateCell;
pub use error::StateError;
pub use seq::SeqView;
pub use view::StateView;
