//! Test utilities for act-dispatch applications
//!
//! - [`RecordingTarget`]: a dispatch target that remembers every action it receives
//! - Assertion macros for verifying dispatched actions by type
//!
//! # Example
//!
//! ```
//! use act_dispatch_core::testing::RecordingTarget;
//! use act_dispatch_core::{assert_dispatched, count_dispatched, Registry};
//!
//! let registry = Registry::new();
//! let recorder = RecordingTarget::new();
//! let ping = registry.create_action::<()>("PING").unwrap().bind_to(&recorder);
//!
//! ping.call(());
//! ping.call(());
//!
//! let actions = recorder.actions();
//! assert_dispatched!(actions, ping);
//! assert_eq!(count_dispatched!(actions, "PING"), 2);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::action::Action;
use crate::target::{Dispatch, Target};

/// Dispatch target recording everything sent to it
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingTarget {
    log: Rc<RefCell<Vec<Action>>>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every recorded action, oldest first
    pub fn actions(&self) -> Vec<Action> {
        self.log.borrow().clone()
    }

    /// Take all recorded actions, leaving the log empty
    pub fn drain(&self) -> Vec<Action> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    /// Recorded action types, oldest first
    pub fn types(&self) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .map(|action| action.kind.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl Dispatch for RecordingTarget {
    fn dispatch(&self, action: Action) -> Action {
        self.log.borrow_mut().push(action.clone());
        action
    }
}

impl From<&RecordingTarget> for Target {
    fn from(recorder: &RecordingTarget) -> Self {
        Target::One(Rc::new(recorder.clone()))
    }
}

impl From<RecordingTarget> for Target {
    fn from(recorder: RecordingTarget) -> Self {
        Target::One(Rc::new(recorder))
    }
}

// ============================================================================
// Assertion Macros
// ============================================================================

/// Assert that an action of the given type was dispatched.
///
/// The type may be anything whose `Display` is an action type: an
/// [`ActionCreator`](crate::ActionCreator), an [`ActionType`](crate::ActionType)
/// or a string.
///
/// # Example
///
/// ```ignore
/// let actions = recorder.actions();
/// assert_dispatched!(actions, increment);
/// assert_dispatched!(actions, "BATCH");
/// ```
#[macro_export]
macro_rules! assert_dispatched {
    ($actions:expr, $kind:expr) => {{
        let kind = ::std::string::ToString::to_string(&$kind);
        assert!(
            $actions.iter().any(|a| a.kind.as_str() == kind),
            "Expected action of type `{}` to be dispatched, but got: {:?}",
            kind,
            $actions.iter().map(|a| a.kind.as_str()).collect::<Vec<_>>()
        );
    }};
}

/// Assert that no action of the given type was dispatched.
///
/// # Example
///
/// ```ignore
/// let actions = recorder.actions();
/// assert_not_dispatched!(actions, reset);
/// ```
#[macro_export]
macro_rules! assert_not_dispatched {
    ($actions:expr, $kind:expr) => {{
        let kind = ::std::string::ToString::to_string(&$kind);
        assert!(
            !$actions.iter().any(|a| a.kind.as_str() == kind),
            "Expected action of type `{}` NOT to be dispatched, but it was",
            kind
        );
    }};
}

/// Count how many actions of the given type were dispatched.
///
/// # Example
///
/// ```ignore
/// let actions = recorder.actions();
/// assert_eq!(count_dispatched!(actions, increment), 3);
/// ```
#[macro_export]
macro_rules! count_dispatched {
    ($actions:expr, $kind:expr) => {{
        let kind = ::std::string::ToString::to_string(&$kind);
        $actions.iter().filter(|a| a.kind.as_str() == kind).count()
    }};
}
