//! Minimal single-threaded store driven by a reducer
//!
//! [`Store`] holds the state, applies actions through a [`Reduce`]
//! implementation and notifies subscribers. It is a cloneable handle so that
//! action creators can be assigned or bound to it.
//!
//! # Example
//!
//! ```
//! use act_dispatch_core::{Reducer, Registry, Store};
//!
//! let registry = Registry::new();
//! let inc = registry.action::<()>().build().unwrap();
//!
//! let reducer = Reducer::new(0);
//! reducer.on(&inc, |state, _, _| state + 1);
//!
//! let store = Store::from_reducer(reducer);
//! let inc = inc.bind_to(&store);
//! inc.call(());
//! inc.call(());
//! assert_eq!(store.state(), 2);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::action::Action;
use crate::reducer::{Reduce, Reducer};
use crate::target::{Dispatch, Target};

type Listener = Rc<dyn Fn()>;

struct StoreInner<S, M> {
    state: RefCell<S>,
    reducer: RefCell<Rc<dyn Reduce<S>>>,
    middleware: RefCell<M>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_listener: Cell<u64>,
    dispatching: Cell<bool>,
}

/// Centralized state container
///
/// # Type Parameters
/// * `S` - The state type
/// * `M` - Middleware observing every dispatch
pub struct Store<S, M = NoopMiddleware> {
    inner: Rc<StoreInner<S, M>>,
}

impl<S, M> Clone for Store<S, M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: fmt::Debug, M> fmt::Debug for Store<S, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.inner.state.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

impl<S: Clone + 'static> Store<S> {
    /// Create a store with initial state and reducer
    pub fn new<R>(state: S, reducer: R) -> Self
    where
        R: Reduce<S> + 'static,
    {
        Self::with_middleware(state, reducer, NoopMiddleware)
    }

    /// Create a store starting from the reducer's default state
    pub fn from_reducer(reducer: Reducer<S>) -> Self {
        let state = reducer.default_state().clone();
        Self::new(state, reducer)
    }
}

impl<S: Clone + 'static, M: Middleware + 'static> Store<S, M> {
    /// Create a store whose dispatches pass through `middleware`
    pub fn with_middleware<R>(state: S, reducer: R, middleware: M) -> Self
    where
        R: Reduce<S> + 'static,
    {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(state),
                reducer: RefCell::new(Rc::new(reducer)),
                middleware: RefCell::new(middleware),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
                dispatching: Cell::new(false),
            }),
        }
    }

    /// Dispatch an action to the store
    ///
    /// Runs middleware, applies the reducer, then notifies every subscriber.
    /// Returns the dispatched action. Dispatching from inside the reducer is
    /// refused and the action is returned without effect.
    pub fn dispatch(&self, action: Action) -> Action {
        if self.inner.dispatching.get() {
            tracing::warn!(action_type = %action.kind, "reducers may not dispatch actions");
            return action;
        }

        self.inner.middleware.borrow_mut().before(&action);
        {
            let _guard = DispatchGuard::enter(&self.inner.dispatching);
            let reducer = self.inner.reducer.borrow().clone();
            let current = self.inner.state.borrow().clone();
            let next = reducer.apply(current, &action);
            *self.inner.state.borrow_mut() = next;
        }
        self.inner.middleware.borrow_mut().after(&action);

        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener();
        }

        action
    }

    /// Dispatch all `actions` as a single batch
    pub fn disbatch(&self, actions: Vec<Action>) -> Action {
        self.dispatch(Action::batch(actions))
    }

    /// A copy of the current state
    pub fn state(&self) -> S {
        self.inner.state.borrow().clone()
    }

    /// Borrow the current state
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Swap the reducer, keeping the current state
    pub fn replace_reducer<R>(&self, reducer: R)
    where
        R: Reduce<S> + 'static,
    {
        *self.inner.reducer.borrow_mut() = Rc::new(reducer);
    }

    /// Register a listener called after every dispatch
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + 'static,
    {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let inner: Rc<dyn Unsubscribe> = self.inner.clone();
        Subscription {
            id,
            store: Rc::downgrade(&inner),
        }
    }

    /// Inspect the middleware
    pub fn with_middleware_ref<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&self.inner.middleware.borrow())
    }
}

impl<S: Clone + 'static, M: Middleware + 'static> Dispatch for Store<S, M> {
    fn dispatch(&self, action: Action) -> Action {
        Store::dispatch(self, action)
    }
}

impl<S: Clone + 'static, M: Middleware + 'static> From<&Store<S, M>> for Target {
    fn from(store: &Store<S, M>) -> Self {
        Target::One(Rc::new(store.clone()))
    }
}

impl<S: Clone + 'static, M: Middleware + 'static> From<Store<S, M>> for Target {
    fn from(store: Store<S, M>) -> Self {
        Target::One(Rc::new(store))
    }
}

struct DispatchGuard<'a>(&'a Cell<bool>);

impl<'a> DispatchGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

trait Unsubscribe {
    fn unsubscribe(&self, id: u64);
}

impl<S, M> Unsubscribe for StoreInner<S, M> {
    fn unsubscribe(&self, id: u64) {
        self.listeners
            .borrow_mut()
            .retain(|(listener_id, _)| *listener_id != id);
    }
}

/// Handle returned by [`Store::subscribe`]
///
/// Dropping it keeps the listener registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
pub struct Subscription {
    id: u64,
    store: Weak<dyn Unsubscribe>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(store) = self.store.upgrade() {
            store.unsubscribe(self.id);
        }
    }
}

/// Middleware trait for observing dispatches
///
/// Implement this trait to add logging, persistence, or other
/// cross-cutting concerns to your store.
pub trait Middleware {
    /// Called before the action reaches the reducer
    fn before(&mut self, action: &Action);

    /// Called after the reducer has run
    fn after(&mut self, action: &Action);
}

/// A no-op middleware that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl Middleware for NoopMiddleware {
    fn before(&mut self, _action: &Action) {}
    fn after(&mut self, _action: &Action) {}
}

/// Middleware that logs action types through `tracing`
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Whether to log before dispatch
    pub log_before: bool,
    /// Whether to log after dispatch
    pub log_after: bool,
}

impl LoggingMiddleware {
    /// Log after dispatch only
    pub fn new() -> Self {
        Self {
            log_before: false,
            log_after: true,
        }
    }

    /// Log both before and after
    pub fn verbose() -> Self {
        Self {
            log_before: true,
            log_after: true,
        }
    }
}

impl Middleware for LoggingMiddleware {
    fn before(&mut self, action: &Action) {
        if self.log_before {
            tracing::debug!(action_type = %action.kind, error = action.error, "Dispatching action");
        }
    }

    fn after(&mut self, action: &Action) {
        if self.log_after {
            tracing::debug!(action_type = %action.kind, "Action processed");
        }
    }
}

/// Compose multiple middleware into a single middleware
#[derive(Default)]
pub struct ComposedMiddleware {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl fmt::Debug for ComposedMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedMiddleware")
            .field("middlewares_count", &self.middlewares.len())
            .finish()
    }
}

impl ComposedMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a middleware to the composition
    pub fn add<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }
}

impl Middleware for ComposedMiddleware {
    fn before(&mut self, action: &Action) {
        for middleware in &mut self.middlewares {
            middleware.before(action);
        }
    }

    fn after(&mut self, action: &Action) {
        // Reverse order for proper nesting
        for middleware in self.middlewares.iter_mut().rev() {
            middleware.after(action);
        }
    }
}
