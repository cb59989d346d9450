//! Wiring many creators at once, and dispatching batches
//!
//! [`ActionSet`] is implemented for single creators, for `Vec`s and maps of
//! creators, for tuples of them, and by `#[derive(ActionSet)]` for structs
//! whose fields are creators. [`assign_all`] and [`bind_all`] return the same
//! shape they were given.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::action::Action;
use crate::creator::ActionCreator;
use crate::error::{Error, Result};
use crate::target::{Dispatch, Dispatched, Target};

/// A collection of action creators that can be wired together
pub trait ActionSet: Sized {
    /// Assign every creator to `target`, returning the same shape
    fn assign_all(&self, target: &Target) -> Self;

    /// Bind every creator to `target`, returning the same shape
    fn bind_all(&self, target: &Target) -> Self;
}

impl<A> ActionSet for ActionCreator<A> {
    fn assign_all(&self, target: &Target) -> Self {
        self.assign_to(target.clone())
    }

    fn bind_all(&self, target: &Target) -> Self {
        self.bind_to(target.clone())
    }
}

impl<T: ActionSet> ActionSet for Vec<T> {
    fn assign_all(&self, target: &Target) -> Self {
        self.iter().map(|item| item.assign_all(target)).collect()
    }

    fn bind_all(&self, target: &Target) -> Self {
        self.iter().map(|item| item.bind_all(target)).collect()
    }
}

impl<K: Clone + Eq + Hash, T: ActionSet> ActionSet for HashMap<K, T> {
    fn assign_all(&self, target: &Target) -> Self {
        self.iter()
            .map(|(key, item)| (key.clone(), item.assign_all(target)))
            .collect()
    }

    fn bind_all(&self, target: &Target) -> Self {
        self.iter()
            .map(|(key, item)| (key.clone(), item.bind_all(target)))
            .collect()
    }
}

impl<K: Clone + Ord, T: ActionSet> ActionSet for BTreeMap<K, T> {
    fn assign_all(&self, target: &Target) -> Self {
        self.iter()
            .map(|(key, item)| (key.clone(), item.assign_all(target)))
            .collect()
    }

    fn bind_all(&self, target: &Target) -> Self {
        self.iter()
            .map(|(key, item)| (key.clone(), item.bind_all(target)))
            .collect()
    }
}

macro_rules! impl_action_set_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: ActionSet),+> ActionSet for ($($name,)+) {
            #[allow(non_snake_case)]
            fn assign_all(&self, target: &Target) -> Self {
                let ($($name,)+) = self;
                ($($name.assign_all(target),)+)
            }

            #[allow(non_snake_case)]
            fn bind_all(&self, target: &Target) -> Self {
                let ($($name,)+) = self;
                ($($name.bind_all(target),)+)
            }
        }
    };
}

impl_action_set_for_tuple!(A, B);
impl_action_set_for_tuple!(A, B, C);
impl_action_set_for_tuple!(A, B, C, D);
impl_action_set_for_tuple!(A, B, C, D, E);

/// Assign every creator in `creators` to `target`.
pub fn assign_all<C: ActionSet>(creators: &C, target: impl Into<Target>) -> C {
    creators.assign_all(&target.into())
}

/// Bind every creator in `creators` to `target`.
pub fn bind_all<C: ActionSet>(creators: &C, target: impl Into<Target>) -> C {
    creators.bind_all(&target.into())
}

/// Dispatch `actions` to `target` as a single batch action.
///
/// # Errors
///
/// [`Error::InvalidTarget`] when `target` has no receiver.
pub fn disbatch(target: impl Into<Target>, actions: Vec<Action>) -> Result<Dispatched> {
    let target = target.into();
    if target.is_none() {
        return Err(Error::InvalidTarget);
    }
    tracing::trace!(count = actions.len(), "dispatching batch");
    Ok(target.send(Action::batch(actions)))
}

/// Batch dispatch for anything that can dispatch
pub trait Disbatch: Dispatch {
    /// Dispatch all `actions` wrapped in one batch action
    fn disbatch(&self, actions: Vec<Action>) -> Action {
        self.dispatch(Action::batch(actions))
    }
}

impl<T: Dispatch + ?Sized> Disbatch for T {}

/// Collect actions into a `Vec<Action>` for a batch.
///
/// ```
/// use act_dispatch_core::{batch, Action};
/// use serde_json::json;
///
/// let actions = batch![Action::new("A", json!(1)), Action::new("B", json!(2))];
/// assert_eq!(Action::batch(actions).batched().unwrap().len(), 2);
/// ```
#[macro_export]
macro_rules! batch {
    ($($action:expr),* $(,)?) => {
        ::std::vec![$(::std::convert::Into::<$crate::Action>::into($action)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTarget;
    use crate::{Reducer, Registry, Store};
    use serde_json::json;

    #[test]
    fn test_assign_all_vec() {
        let registry = Registry::new();
        let recorder = RecordingTarget::new();
        let creators: Vec<ActionCreator<i32>> = (0..3)
            .map(|_| registry.action::<i32>().build().unwrap())
            .collect();

        let assigned = assign_all(&creators, &recorder);
        assert_eq!(assigned.len(), 3);
        assert!(creators.iter().all(ActionCreator::assigned));

        for creator in &assigned {
            creator.call(1);
        }
        assert_eq!(recorder.len(), 3);
    }

    #[test]
    fn test_bind_all_map_keeps_keys() {
        let registry = Registry::new();
        let recorder = RecordingTarget::new();
        let mut creators = BTreeMap::new();
        creators.insert("inc", registry.create_action::<()>("INC").unwrap());
        creators.insert("dec", registry.create_action::<()>("DEC").unwrap());

        let bound = bind_all(&creators, &recorder);
        assert_eq!(bound.keys().copied().collect::<Vec<_>>(), vec!["dec", "inc"]);
        assert!(bound.values().all(ActionCreator::bound));
        // Originals are untouched by binding
        assert!(creators.values().all(|c| !c.dispatched()));

        bound["inc"].call(());
        assert_eq!(recorder.types(), vec!["INC"]);
    }

    #[test]
    fn test_tuple_of_mixed_creators() {
        let registry = Registry::new();
        let recorder = RecordingTarget::new();
        let set = (
            registry.action::<i32>().build().unwrap(),
            registry.action::<String>().build().unwrap(),
        );

        let (number, text) = bind_all(&set, &recorder);
        number.call(1);
        text.call("one".into());
        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn test_disbatch_requires_target() {
        let err = disbatch(Target::None, vec![]).unwrap_err();
        assert_eq!(err, Error::InvalidTarget);
    }

    #[test]
    fn test_disbatch_to_function() {
        let recorder = RecordingTarget::new();
        let result = disbatch(
            &recorder,
            batch![Action::new("A", json!(1)), Action::new("B", json!(2))],
        )
        .unwrap();

        let action = result.into_action().unwrap();
        assert!(action.is_batch());
        assert_eq!(recorder.types(), vec!["BATCH"]);
    }

    #[test]
    fn test_disbatch_extension_on_store() {
        let registry = Registry::new();
        let inc = registry.action::<()>().build().unwrap();
        let reducer = Reducer::new(0);
        reducer.on(&inc, |state, _, _| state + 1);
        let store = Store::from_reducer(reducer);

        let dispatcher: &dyn Dispatch = &store;
        dispatcher.disbatch(batch![inc.raw(()), inc.raw(())]);
        assert_eq!(store.state(), 2);
    }
}
