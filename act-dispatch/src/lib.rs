//! act-dispatch: action creators and reducers without type constants
//!
//! Creators allocate their own unique action types, reducers are keyed by
//! creators, and batches of actions reduce as one dispatch.
//!
//! # Example
//! ```
//! use act_dispatch::prelude::*;
//!
//! #[derive(ActionSet)]
//! struct Counter {
//!     increment: ActionCreator<()>,
//!     add: ActionCreator<i64>,
//! }
//!
//! let registry = Registry::new();
//! let counter = Counter {
//!     increment: registry.create_action("increment").unwrap(),
//!     add: registry.create_action("add").unwrap(),
//! };
//!
//! let reducer = Reducer::new(0i64);
//! reducer
//!     .on(&counter.increment, |state, _, _| state + 1)
//!     .on(&counter.add, |state, payload, _| state + payload.as_i64().unwrap_or(0));
//!
//! let store = Store::from_reducer(reducer);
//! let counter = bind_all(&counter, &store);
//! counter.increment.call(());
//! counter.add.call(41);
//! assert_eq!(store.state(), 42);
//! ```

// Re-export everything from core
pub use act_dispatch_core::*;

// Re-export derive macros
pub use act_dispatch_macros::ActionSet;

/// Prelude for convenient imports
pub mod prelude {
    // Actions and creators
    pub use act_dispatch_core::{Action, ActionCreator, ActionType, Registry};

    // Wiring
    pub use act_dispatch_core::{
        assign_all, bind_all, disbatch, ActionSet, Disbatch, Dispatch, Dispatched, Target,
    };

    // Reducers and store
    pub use act_dispatch_core::{
        Middleware, NoopMiddleware, Reduce, Reducer, ReducerOptions, Store, Subscription,
    };

    // Logging
    pub use act_dispatch_core::loggers::{
        action_transformer, ActionLoggerConfig, ActionLoggerMiddleware, BatchLogger,
    };

    pub use act_dispatch_core::{Error, Result};

    // Derive macros
    pub use act_dispatch_macros::ActionSet;
}
