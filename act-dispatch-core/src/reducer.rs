//! Reducers keyed by action type
//!
//! A [`Reducer`] is a dispatch table from [`ActionType`] to handler plus a
//! default state. Handlers can be registered and removed at any time, even
//! from inside another handler: each action looks its handler up fresh.
//!
//! Every reducer starts with a handler for the batch type that folds the
//! contained actions through the reducer itself. Registering or removing a
//! handler for [`BATCH`] replaces that behaviour.
//!
//! # Example
//!
//! ```
//! use act_dispatch_core::{Action, Reducer, Registry};
//! use serde_json::json;
//!
//! let registry = Registry::new();
//! let inc = registry.action::<()>().build().unwrap();
//! let add = registry.action::<i64>().build().unwrap();
//!
//! let reducer = Reducer::new(0i64);
//! reducer
//!     .on(&inc, |state, _, _| state + 1)
//!     .on(&add, |state, payload, _| state + payload.as_i64().unwrap_or(0));
//!
//! assert_eq!(reducer.reduce(None, &inc.raw(())), 1);
//! assert_eq!(reducer.reduce(Some(1), &add.raw(41)), 42);
//! assert_eq!(reducer.reduce(Some(1), &Action::new("unknown", json!(null))), 1);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::action::{Action, ActionType, BATCH};
use crate::creator::ActionCreator;

/// State transition for one action type: `(state, payload, meta) -> state`
///
/// When the reducer runs with `payload = false`, the second argument is the
/// whole action as a JSON object and `meta` is `None`.
pub type Handler<S> = Rc<dyn Fn(S, &Value, Option<&Value>) -> S>;

/// Things usable as handler keys: type strings, action types, creators, and
/// lists of those.
pub trait TypeKeys {
    fn type_keys(&self) -> Vec<ActionType>;
}

impl TypeKeys for str {
    fn type_keys(&self) -> Vec<ActionType> {
        vec![ActionType::new(self)]
    }
}

impl TypeKeys for String {
    fn type_keys(&self) -> Vec<ActionType> {
        vec![ActionType::new(self.as_str())]
    }
}

impl TypeKeys for ActionType {
    fn type_keys(&self) -> Vec<ActionType> {
        vec![self.clone()]
    }
}

impl<A> TypeKeys for ActionCreator<A> {
    fn type_keys(&self) -> Vec<ActionType> {
        vec![self.action_type().clone()]
    }
}

impl<T: TypeKeys> TypeKeys for [T] {
    fn type_keys(&self) -> Vec<ActionType> {
        self.iter().flat_map(TypeKeys::type_keys).collect()
    }
}

impl<T: TypeKeys, const N: usize> TypeKeys for [T; N] {
    fn type_keys(&self) -> Vec<ActionType> {
        self.as_slice().type_keys()
    }
}

impl<T: TypeKeys> TypeKeys for Vec<T> {
    fn type_keys(&self) -> Vec<ActionType> {
        self.as_slice().type_keys()
    }
}

impl<T: TypeKeys + ?Sized> TypeKeys for &T {
    fn type_keys(&self) -> Vec<ActionType> {
        (**self).type_keys()
    }
}

/// Reducer-wide configuration
pub struct ReducerOptions<S> {
    /// Pass `(payload, meta)` to handlers when true, the whole action when false
    pub payload: bool,
    /// Called for valid actions with no registered handler
    pub fallback: Option<Handler<S>>,
}

impl<S> Default for ReducerOptions<S> {
    fn default() -> Self {
        Self {
            payload: true,
            fallback: None,
        }
    }
}

impl<S> Clone for ReducerOptions<S> {
    fn clone(&self) -> Self {
        Self {
            payload: self.payload,
            fallback: self.fallback.clone(),
        }
    }
}

impl<S> fmt::Debug for ReducerOptions<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducerOptions")
            .field("payload", &self.payload)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// Ordered handler mapping used to build a reducer in one go
pub struct Handlers<S> {
    entries: Vec<(ActionType, Handler<S>)>,
}

impl<S> Default for Handlers<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S: 'static> Handlers<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every key to `handler`. Later entries overwrite earlier ones.
    pub fn on<K, F>(mut self, keys: K, handler: F) -> Self
    where
        K: TypeKeys,
        F: Fn(S, &Value, Option<&Value>) -> S + 'static,
    {
        let handler: Handler<S> = Rc::new(handler);
        for key in keys.type_keys() {
            self.entries.push((key, handler.clone()));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct ReducerInner<S> {
    handlers: RefCell<HashMap<ActionType, Handler<S>>>,
    options: RefCell<ReducerOptions<S>>,
    default_state: S,
}

/// Dispatch-table reducer with a default state
///
/// Cloning gives another handle to the same table.
pub struct Reducer<S> {
    inner: Rc<ReducerInner<S>>,
}

impl<S> Clone for Reducer<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S> fmt::Debug for Reducer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.inner.handlers.borrow();
        let mut keys: Vec<_> = handlers.keys().map(ActionType::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Reducer")
            .field("handlers", &keys)
            .field("options", &*self.inner.options.borrow())
            .finish()
    }
}

impl<S: Clone + 'static> Reducer<S> {
    /// Empty reducer (apart from batch handling)
    pub fn new(default_state: S) -> Self {
        let reducer = Self {
            inner: Rc::new(ReducerInner {
                handlers: RefCell::new(HashMap::new()),
                options: RefCell::new(ReducerOptions::default()),
                default_state,
            }),
        };
        reducer.on_handler(BATCH, reducer.batch_handler());
        reducer
    }

    /// Build from a handler mapping.
    pub fn with_handlers(handlers: Handlers<S>, default_state: S) -> Self {
        let reducer = Self::new(default_state);
        {
            let mut table = reducer.inner.handlers.borrow_mut();
            for (key, handler) in handlers.entries {
                table.insert(key, handler);
            }
        }
        reducer
    }

    /// Build by running `factory` once against the new reducer, letting it
    /// call [`on`](Self::on) and [`off`](Self::off) imperatively.
    pub fn from_fn<F>(default_state: S, factory: F) -> Self
    where
        F: FnOnce(&Reducer<S>),
    {
        let reducer = Self::new(default_state);
        factory(&reducer);
        reducer
    }

    /// Register `handler` for every key, overwriting existing handlers.
    pub fn on<K, F>(&self, keys: K, handler: F) -> &Self
    where
        K: TypeKeys,
        F: Fn(S, &Value, Option<&Value>) -> S + 'static,
    {
        self.on_handler(keys, Rc::new(handler))
    }

    /// [`on`](Self::on) for an already shared handler
    pub fn on_handler<K: TypeKeys>(&self, keys: K, handler: Handler<S>) -> &Self {
        let mut table = self.inner.handlers.borrow_mut();
        for key in keys.type_keys() {
            tracing::trace!(action_type = %key, "handler registered");
            table.insert(key, handler.clone());
        }
        self
    }

    /// Remove the handlers for every key. Unknown keys are ignored.
    pub fn off<K: TypeKeys>(&self, keys: K) -> &Self {
        let mut table = self.inner.handlers.borrow_mut();
        for key in keys.type_keys() {
            if table.remove(&key).is_some() {
                tracing::trace!(action_type = %key, "handler removed");
            }
        }
        self
    }

    /// Whether every key has a handler
    pub fn has<K: TypeKeys>(&self, keys: K) -> bool {
        let table = self.inner.handlers.borrow();
        let keys = keys.type_keys();
        !keys.is_empty() && keys.iter().all(|key| table.contains_key(key))
    }

    /// Update the options in place.
    pub fn options<F>(&self, update: F) -> &Self
    where
        F: FnOnce(&mut ReducerOptions<S>),
    {
        update(&mut self.inner.options.borrow_mut());
        self
    }

    /// A snapshot of the current options
    pub fn current_options(&self) -> ReducerOptions<S> {
        self.inner.options.borrow().clone()
    }

    pub fn default_state(&self) -> &S {
        &self.inner.default_state
    }

    /// Apply one action. `None` state means the default state.
    ///
    /// Actions with an empty type, or with no handler and no fallback,
    /// return the state untouched.
    pub fn reduce(&self, state: Option<S>, action: &Action) -> S {
        let state = state.unwrap_or_else(|| self.inner.default_state.clone());
        if action.kind.is_empty() {
            return state;
        }

        let handler = self.inner.handlers.borrow().get(&action.kind).cloned();
        let (payload_only, fallback) = {
            let options = self.inner.options.borrow();
            (options.payload, options.fallback.clone())
        };

        let Some(handler) = handler.or(fallback) else {
            return state;
        };

        if payload_only {
            handler(state, &action.payload, action.meta.as_ref())
        } else {
            handler(state, &action.to_value(), None)
        }
    }

    /// Apply arbitrary JSON. Anything that is not an action is ignored.
    pub fn reduce_value(&self, state: Option<S>, action: &Value) -> S {
        match Action::from_value(action) {
            Some(action) => self.reduce(state, &action),
            None => {
                tracing::trace!("ignoring malformed action");
                state.unwrap_or_else(|| self.inner.default_state.clone())
            }
        }
    }

    /// The built-in batch handler: folds the batch's actions through this
    /// reducer, in order. Useful to restore batching after an `off`.
    pub fn batch_handler(&self) -> Handler<S> {
        let weak = self.downgrade();
        Rc::new(move |state: S, payload: &Value, _meta: Option<&Value>| {
            let Some(reducer) = weak.upgrade() else {
                return state;
            };
            let actions = if reducer.inner.options.borrow().payload {
                Some(payload)
            } else {
                payload.get("payload")
            };
            match actions {
                Some(Value::Array(actions)) => actions
                    .iter()
                    .fold(state, |state, action| reducer.reduce_value(Some(state), action)),
                _ => state,
            }
        })
    }

    /// Handle that does not keep the reducer alive, for use inside handlers
    pub fn downgrade(&self) -> WeakReducer<S> {
        WeakReducer {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Non-owning reducer handle
pub struct WeakReducer<S> {
    inner: Weak<ReducerInner<S>>,
}

impl<S> Clone for WeakReducer<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S> fmt::Debug for WeakReducer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakReducer")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl<S> WeakReducer<S> {
    pub fn upgrade(&self) -> Option<Reducer<S>> {
        self.inner.upgrade().map(|inner| Reducer { inner })
    }
}

/// Root reducer shape accepted by [`Store`](crate::Store)
pub trait Reduce<S> {
    fn apply(&self, state: S, action: &Action) -> S;
}

impl<S: Clone + 'static> Reduce<S> for Reducer<S> {
    fn apply(&self, state: S, action: &Action) -> S {
        self.reduce(Some(state), action)
    }
}

impl<S, F> Reduce<S> for F
where
    F: Fn(S, &Action) -> S,
{
    fn apply(&self, state: S, action: &Action) -> S {
        self(state, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;
    use serde_json::json;

    fn counter(registry: &Registry) -> (ActionCreator<()>, ActionCreator<()>, Reducer<i64>) {
        let inc = registry.action::<()>().build().unwrap();
        let dec = registry.action::<()>().build().unwrap();
        let reducer = Reducer::with_handlers(
            Handlers::new()
                .on(&inc, |state: i64, _, _| state + 1)
                .on(&dec, |state: i64, _, _| state - 1),
            0,
        );
        (inc, dec, reducer)
    }

    #[test]
    fn test_increment_and_unknown() {
        let registry = Registry::new();
        let (inc, _, reducer) = counter(&registry);

        assert_eq!(reducer.reduce(Some(0), &inc.raw(())), 1);
        assert_eq!(reducer.reduce(Some(1), &Action::new("unknown", Value::Null)), 1);
        assert_eq!(reducer.reduce(None, &inc.raw(())), 1);
    }

    #[test]
    fn test_malformed_input_is_ignored() {
        let registry = Registry::new();
        let (_, _, reducer) = counter(&registry);

        assert_eq!(reducer.reduce_value(Some(3), &Value::Null), 3);
        assert_eq!(reducer.reduce_value(Some(3), &json!({"type": 12})), 3);
        assert_eq!(reducer.reduce_value(Some(3), &json!({"payload": 1})), 3);
        assert_eq!(reducer.reduce_value(None, &json!("INC")), 0);
        assert_eq!(reducer.reduce(Some(3), &Action::new("", Value::Null)), 3);
    }

    #[test]
    fn test_from_fn_factory() {
        let registry = Registry::new();
        let dec = registry.action::<()>().build().unwrap();
        let sub = registry.action::<i64>().build().unwrap();

        let reducer = Reducer::from_fn(42i64, |r| {
            r.on(&dec, |state, _, _| state - 1);
            r.on(&sub, |state, payload, _| state - payload.as_i64().unwrap_or(0));
        });

        let state = reducer.reduce(None, &dec.raw(()));
        assert_eq!(state, 41);
        assert_eq!(reducer.reduce(Some(state), &sub.raw(41)), 0);
    }

    #[test]
    fn test_on_off_has() {
        let registry = Registry::new();
        let inc = registry.action::<()>().build().unwrap();
        let reducer = Reducer::new(0i64);

        assert!(!reducer.has(&inc));
        reducer.on(&inc, |state, _, _| state + 1);
        assert!(reducer.has(&inc));
        assert!(reducer.has(inc.action_type().as_str()));
        assert_eq!(reducer.reduce(Some(2), &inc.raw(())), 3);

        reducer.off(&inc);
        assert!(!reducer.has(&inc));
        assert_eq!(reducer.reduce(Some(3), &inc.raw(())), 3);
    }

    #[test]
    fn test_string_keys_and_lists() {
        let registry = Registry::new();
        let a = registry.action::<()>().build().unwrap();
        let b = registry.action::<()>().build().unwrap();
        let reducer = Reducer::new(0i64);

        reducer.on([&a, &b], |state, _, _| state + 10);
        reducer.on("EXTERNAL", |state, _, _| state * 2);
        assert!(reducer.has([&a, &b]));
        assert!(reducer.has("EXTERNAL"));

        assert_eq!(reducer.reduce(Some(1), &b.raw(())), 11);
        assert_eq!(reducer.reduce(Some(2), &Action::new("EXTERNAL", Value::Null)), 4);

        reducer.off(vec![&a, &b]);
        assert!(!reducer.has(&a));
        assert!(!reducer.has(&b));
    }

    #[test]
    fn test_registering_overwrites() {
        let registry = Registry::new();
        let inc = registry.action::<()>().build().unwrap();
        let reducer = Reducer::new(0i64);
        reducer.on(&inc, |state, _, _| state + 1);
        reducer.on(&inc, |state, _, _| state + 100);
        assert_eq!(reducer.reduce(Some(0), &inc.raw(())), 100);
    }

    #[test]
    fn test_payload_option_passes_whole_action() {
        let registry = Registry::new();
        let add = registry.action::<i64>().build().unwrap();
        let reducer = Reducer::new(0i64);
        reducer.on(&add, |state, action, meta| {
            assert!(meta.is_none());
            assert!(action.get("type").is_some());
            state + action["payload"].as_i64().unwrap_or(0)
        });
        reducer.options(|o| o.payload = false);

        assert!(!reducer.current_options().payload);
        assert_eq!(reducer.reduce(Some(0), &add.raw(3)), 3);

        reducer.on(&add, |state, payload, _| state + payload.as_i64().unwrap_or(0));
        reducer.options(|o| o.payload = true);
        assert_eq!(reducer.reduce(Some(3), &add.raw(-4)), -1);
    }

    #[test]
    fn test_meta_is_passed() {
        let registry = Registry::new();
        let add = registry
            .action::<i64>()
            .meta(|n: &i64| json!(n * 2))
            .build()
            .unwrap();
        let reducer = Reducer::new(0i64);
        reducer.on(&add, |state, payload, meta| {
            let meta = meta.and_then(Value::as_i64).unwrap_or(1);
            state + payload.as_i64().unwrap_or(0) * meta
        });
        assert_eq!(reducer.reduce(None, &add.raw(3)), 18);
    }

    #[test]
    fn test_fallback() {
        let registry = Registry::new();
        let (inc, _, reducer) = counter(&registry);
        let fallback: Handler<i64> =
            Rc::new(|state: i64, _: &Value, _: Option<&Value>| state - 1000);
        reducer.options(|o| o.fallback = Some(fallback));

        assert_eq!(reducer.reduce(Some(0), &inc.raw(())), 1);
        assert_eq!(reducer.reduce(Some(0), &Action::new("OTHER", Value::Null)), -1000);
        // Malformed input still bypasses the fallback
        assert_eq!(reducer.reduce_value(Some(0), &Value::Null), 0);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let registry = Registry::new();
        let (inc, dec, reducer) = counter(&registry);

        let batch = registry.batch().raw(vec![inc.raw(()), dec.raw(()), dec.raw(())]);
        let batched = reducer.reduce(Some(2), &batch);

        let mut sequential = 2;
        for action in [inc.raw(()), dec.raw(()), dec.raw(())] {
            sequential = reducer.reduce(Some(sequential), &action);
        }
        assert_eq!(batched, sequential);
        assert_eq!(batched, 1);
    }

    #[test]
    fn test_batch_matches_sequential_with_null_meta() {
        let registry = Registry::new();
        let tick = registry
            .action::<()>()
            .meta(|_: &()| Value::Null)
            .build()
            .unwrap();
        let reducer = Reducer::new(0i64);
        reducer.on(&tick, |state, _, meta| {
            if meta.is_some() {
                state + 1
            } else {
                state + 100
            }
        });

        let sequential = reducer.reduce(None, &tick.raw(()));
        let batched = reducer.reduce(None, &registry.batch().raw(vec![tick.raw(())]));
        assert_eq!(sequential, 1);
        assert_eq!(batched, sequential);
    }

    #[test]
    fn test_empty_and_nested_batch() {
        let registry = Registry::new();
        let (inc, _, reducer) = counter(&registry);

        assert_eq!(reducer.reduce(Some(5), &Action::batch(vec![])), 5);

        let nested = Action::batch(vec![
            inc.raw(()),
            Action::batch(vec![inc.raw(()), inc.raw(())]),
        ]);
        assert_eq!(reducer.reduce(Some(0), &nested), 3);
    }

    #[test]
    fn test_batch_with_payload_option_off() {
        let registry = Registry::new();
        let append = registry.action::<String>().build().unwrap();
        let reset = registry.action::<()>().build().unwrap();
        let text = Reducer::with_handlers(
            Handlers::new()
                .on(&append, |state: String, action, _| {
                    state + action["payload"].as_str().unwrap_or_default()
                })
                .on(&reset, |_: String, _, _| String::new()),
            String::new(),
        );
        text.options(|o| o.payload = false);

        let batch = Action::batch(vec![
            reset.raw(()),
            append.raw("zyx".into()),
            append.raw("321".into()),
        ]);
        assert_eq!(text.reduce(Some("old".into()), &batch), "zyx321");
    }

    #[test]
    fn test_batch_can_be_disabled_and_restored() {
        let registry = Registry::new();
        let (inc, _, reducer) = counter(&registry);
        let batch = registry.batch();

        reducer.off(&batch);
        assert!(!reducer.has(&batch));
        assert_eq!(reducer.reduce(Some(0), &batch.raw(vec![inc.raw(()), inc.raw(())])), 0);

        reducer.on_handler(&batch, reducer.batch_handler());
        assert_eq!(reducer.reduce(Some(0), &batch.raw(vec![inc.raw(()), inc.raw(())])), 2);
    }

    #[test]
    fn test_mapping_can_override_batch() {
        let registry = Registry::new();
        let reducer = Reducer::with_handlers(
            Handlers::new().on(BATCH, |state: i64, _, _| state + 1000),
            0,
        );
        assert_eq!(reducer.reduce(None, &registry.batch().raw(vec![])), 1000);
    }

    #[test]
    fn test_factory_can_remove_batch() {
        let registry = Registry::new();
        let inc = registry.action::<()>().build().unwrap();
        let reducer = Reducer::from_fn(0i64, |r| {
            r.on(&inc, |state, _, _| state + 1);
            r.off(BATCH);
        });
        assert_eq!(reducer.reduce(None, &Action::batch(vec![inc.raw(())])), 0);
    }

    #[test]
    fn test_handler_can_deregister_during_dispatch() {
        let registry = Registry::new();
        let once = registry.action::<()>().build().unwrap();
        let reducer = Reducer::new(0i64);
        let weak = reducer.downgrade();
        let key = once.action_type().clone();

        reducer.on(&once, move |state, _, _| {
            if let Some(reducer) = weak.upgrade() {
                reducer.off(&key);
            }
            state + 1
        });

        let state = reducer.reduce(None, &once.raw(()));
        let state = reducer.reduce(Some(state), &once.raw(()));
        assert_eq!(state, 1);
        assert!(!reducer.has(&once));
    }

    #[test]
    fn test_reduce_trait_for_closures() {
        let double = |state: i64, _: &Action| state * 2;
        assert_eq!(double.apply(4, &Action::new("X", Value::Null)), 8);
    }
}
