//! Action creators
//!
//! An [`ActionCreator`] owns one [`ActionType`] and turns call arguments into
//! [`Action`]s through a payload reducer and an optional meta reducer. It can
//! also be wired to dispatch targets in two ways:
//!
//! - **assign**: mutates the creator (and every clone of it) in place; can be
//!   changed or cleared at any time
//! - **bind**: returns a new creator permanently wired to the target; binding
//!   or assigning it again has no effect
//!
//! # Example
//!
//! ```
//! use act_dispatch_core::{Registry, Target};
//! use serde_json::json;
//!
//! let registry = Registry::new();
//! let add = registry.create_action::<i32>("ADD").unwrap();
//!
//! let action = add.raw(5);
//! assert_eq!(action.kind.as_str(), "ADD");
//! assert_eq!(action.payload, json!(5));
//!
//! let add = add.assign_to(Target::func(|action| action));
//! assert!(add.assigned());
//! assert!(add.call(1).is_sent());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::action::{Action, ActionType};
use crate::target::{Dispatched, Target};

pub(crate) type ArgsReducer<A> = Rc<dyn Fn(&A) -> Value>;

struct Definition<A> {
    kind: ActionType,
    payload: ArgsReducer<A>,
    meta: Option<ArgsReducer<A>>,
}

#[derive(Clone)]
enum Wiring {
    Assigned(Rc<RefCell<Target>>),
    Bound(Target),
}

/// Callable factory producing (and optionally dispatching) actions of one type
///
/// `A` is the argument type the creator is called with; use a tuple for
/// several arguments and `()` for none. Clones are handles onto the same
/// creator: assigning one assigns them all.
pub struct ActionCreator<A> {
    definition: Rc<Definition<A>>,
    wiring: Wiring,
}

impl<A> Clone for ActionCreator<A> {
    fn clone(&self) -> Self {
        Self {
            definition: self.definition.clone(),
            wiring: self.wiring.clone(),
        }
    }
}

impl<A> fmt::Debug for ActionCreator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCreator")
            .field("type", &self.definition.kind)
            .field("has_meta", &self.definition.meta.is_some())
            .field("assigned", &self.assigned())
            .field("bound", &self.bound())
            .finish()
    }
}

impl<A> fmt::Display for ActionCreator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.definition.kind, f)
    }
}

impl<A> ActionCreator<A> {
    pub(crate) fn from_parts(
        kind: ActionType,
        payload: ArgsReducer<A>,
        meta: Option<ArgsReducer<A>>,
    ) -> Self {
        Self {
            definition: Rc::new(Definition {
                kind,
                payload,
                meta,
            }),
            wiring: Wiring::Assigned(Rc::new(RefCell::new(Target::None))),
        }
    }

    /// The stable type of every action this creator produces
    pub fn action_type(&self) -> &ActionType {
        &self.definition.kind
    }

    /// Build the action without dispatching it, whatever the wiring.
    pub fn raw(&self, args: A) -> Action {
        self.build(&args)
    }

    pub(crate) fn build(&self, args: &A) -> Action {
        let definition = &self.definition;
        Action {
            kind: definition.kind.clone(),
            payload: (definition.payload)(args),
            meta: definition.meta.as_ref().map(|meta| meta(args)),
            error: false,
        }
    }

    /// Build the action and send it to the current target, if any.
    pub fn call(&self, args: A) -> Dispatched {
        self.send(self.raw(args))
    }

    /// Same as [`call`](Self::call) but the action is flagged as an error.
    pub fn as_error(&self, args: A) -> Dispatched {
        let mut action = self.raw(args);
        action.error = true;
        self.send(action)
    }

    /// Dispatch the success value, or the error's message flagged as an error.
    pub fn call_result<E: fmt::Display>(&self, result: Result<A, E>) -> Dispatched {
        match result {
            Ok(args) => self.call(args),
            Err(err) => {
                let mut action = Action::new(self.definition.kind.clone(), err.to_string().into());
                action.error = true;
                self.send(action)
            }
        }
    }

    fn send(&self, action: Action) -> Dispatched {
        // Clone the target out so receivers may reassign this creator.
        self.target().send(action)
    }

    /// The target calls are currently sent to
    pub fn target(&self) -> Target {
        match &self.wiring {
            Wiring::Assigned(cell) => cell.borrow().clone(),
            Wiring::Bound(target) => target.clone(),
        }
    }

    /// Point this creator (and its clones) at `target`. Passing
    /// [`Target::None`] clears the assignment. No-op on bound creators.
    pub fn assign_to(&self, target: impl Into<Target>) -> Self {
        match &self.wiring {
            Wiring::Assigned(cell) => {
                *cell.borrow_mut() = target.into();
            }
            Wiring::Bound(_) => {
                tracing::debug!(action_type = %self.definition.kind, "ignoring assign on bound creator");
            }
        }
        self.clone()
    }

    /// New creator with the same type and reducers, permanently wired to
    /// `target`. Bound creators return themselves.
    pub fn bind_to(&self, target: impl Into<Target>) -> Self {
        match &self.wiring {
            Wiring::Assigned(_) => Self {
                definition: self.definition.clone(),
                wiring: Wiring::Bound(target.into()),
            },
            Wiring::Bound(_) => {
                tracing::debug!(action_type = %self.definition.kind, "ignoring bind on bound creator");
                self.clone()
            }
        }
    }

    pub fn assigned(&self) -> bool {
        match &self.wiring {
            Wiring::Assigned(cell) => !cell.borrow().is_none(),
            Wiring::Bound(_) => false,
        }
    }

    pub fn bound(&self) -> bool {
        matches!(self.wiring, Wiring::Bound(_))
    }

    /// Whether calling the creator has a dispatch side effect
    pub fn dispatched(&self) -> bool {
        self.assigned() || self.bound()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTarget;
    use crate::Registry;
    use serde_json::json;

    #[test]
    fn test_identity_payload() {
        let registry = Registry::new();
        let simple = registry.action::<i32>().build().unwrap();
        let action = simple.raw(1);
        assert_eq!(action.payload, json!(1));
        assert!(action.meta.is_none());
        assert!(!action.error);

        let unit = registry.action::<()>().build().unwrap();
        assert_eq!(unit.raw(()).payload, Value::Null);
    }

    #[test]
    fn test_payload_and_meta_reducers() {
        let registry = Registry::new();
        let both = registry
            .action_with(|(id, content): &(i32, String)| json!({ "id": id, "content": content }))
            .description("description meta")
            .meta(|(_, content): &(i32, String)| json!({ "prepend": format!("hello {content}") }))
            .build()
            .unwrap();

        let action = both.raw((2, "world".into()));
        assert!(action.kind.as_str().contains("description meta"));
        assert_eq!(action.payload, json!({"id": 2, "content": "world"}));
        assert_eq!(action.meta, Some(json!({"prepend": "hello world"})));
    }

    #[test]
    fn test_raw_never_dispatches() {
        let registry = Registry::new();
        let recorder = RecordingTarget::new();
        let creator = registry.action::<i32>().build().unwrap();
        let bound = creator.bind_to(&recorder);
        creator.assign_to(&recorder);

        for _ in 0..3 {
            assert_eq!(creator.raw(7), bound.raw(7));
        }
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_assign_then_clear() {
        let registry = Registry::new();
        let recorder = RecordingTarget::new();
        let a = registry.action::<i32>().build().unwrap().assign_to(&recorder);

        let result = a.call(5);
        assert!(result.is_sent());
        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.actions()[0].payload, json!(5));

        let a = a.assign_to(Target::None);
        assert!(!a.assigned());
        let result = a.call(5);
        assert_eq!(result.into_action().unwrap().payload, json!(5));
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_clones_share_assignment() {
        let registry = Registry::new();
        let recorder = RecordingTarget::new();
        let a = registry.action::<()>().build().unwrap();
        let alias = a.clone();

        a.assign_to(&recorder);
        assert!(alias.assigned());
        alias.call(());
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_bound_is_terminal() {
        let registry = Registry::new();
        let store = RecordingTarget::new();
        let other = RecordingTarget::new();
        let bound = registry.action::<()>().build().unwrap().bind_to(&store);

        assert!(bound.bound());
        assert!(!bound.assigned());
        assert!(bound.dispatched());

        let same = bound.assign_to(&other);
        assert!(same.bound());
        let same = same.bind_to(&other);
        same.call(());

        assert_eq!(store.len(), 1);
        assert!(other.is_empty());
    }

    #[test]
    fn test_status_flags() {
        let registry = Registry::new();
        let a = registry.action::<()>().build().unwrap();
        assert!(!a.assigned());
        assert!(!a.bound());
        assert!(!a.dispatched());

        a.assign_to(Target::func(|action| action));
        assert!(a.assigned());
        assert!(a.dispatched());
    }

    #[test]
    fn test_broadcast_to_many() {
        let registry = Registry::new();
        let first = RecordingTarget::new();
        let second = RecordingTarget::new();
        let a = registry
            .action::<i32>()
            .build()
            .unwrap()
            .bind_to(vec![Target::from(&first), Target::from(&second)]);

        let results = a.call(3).into_vec();
        assert_eq!(results.len(), 2);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_as_error_keeps_type() {
        let registry = Registry::new();
        let a = registry.create_action::<String>("FAILED").unwrap();
        let action = a.as_error("boom".into()).into_action().unwrap();
        assert_eq!(action.kind.as_str(), "FAILED");
        assert!(action.error);
        assert_eq!(action.payload, json!("boom"));
    }

    #[test]
    fn test_call_result() {
        let registry = Registry::new();
        let a = registry.action::<i32>().build().unwrap();

        let ok = a.call_result::<String>(Ok(4)).into_action().unwrap();
        assert!(!ok.error);
        assert_eq!(ok.payload, json!(4));

        let err = a.call_result(Err("network down")).into_action().unwrap();
        assert!(err.error);
        assert_eq!(err.payload, json!("network down"));
    }

    #[test]
    fn test_display_is_type() {
        let registry = Registry::new();
        let a = registry.create_action::<()>("SHOW_ME").unwrap();
        assert_eq!(a.to_string(), "SHOW_ME");
    }
}
