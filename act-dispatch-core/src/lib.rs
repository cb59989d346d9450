//! Core types for act-dispatch
//!
//! Action creators and reducers for a Redux-style state container, without
//! hand-written type constants.
//!
//! # Core Concepts
//!
//! - **Action**: a record `{ type, payload, meta?, error }`
//! - **Registry**: allocates unique action types and builds creators
//! - **ActionCreator**: turns call arguments into actions, optionally
//!   dispatching them to an assigned or bound target
//! - **Reducer**: maps action types to handlers; folds batch actions
//! - **Store**: minimal state container the creators can dispatch to
//!
//! # Basic Example
//!
//! ```
//! use act_dispatch_core::prelude::*;
//! use serde_json::json;
//!
//! let registry = Registry::new();
//! let increment = registry.create_action::<()>("increment").unwrap();
//! let add = registry.create_action::<i64>("add").unwrap();
//!
//! let reducer = Reducer::new(0i64);
//! reducer
//!     .on(&increment, |state, _, _| state + 1)
//!     .on(&add, |state, payload, _| state + payload.as_i64().unwrap_or(0));
//!
//! let store = Store::from_reducer(reducer);
//! let (increment, add) = bind_all(&(increment, add), &store);
//!
//! increment.call(());
//! add.call(10);
//! store.disbatch(vec![increment.raw(()), add.raw(5)]);
//! assert_eq!(store.state(), 17);
//!
//! assert_eq!(add.raw(3).payload, json!(3));
//! ```

pub mod action;
pub mod async_action;
pub mod creator;
pub mod error;
pub mod fanout;
pub mod loggers;
pub mod reducer;
pub mod registry;
pub mod store;
pub mod target;
pub mod testing;
pub mod types;

pub use action::{as_error, as_error_opt, Action, ActionType, BATCH};
pub use async_action::AsyncAction;
pub use creator::ActionCreator;
pub use error::{Error, Result};
pub use fanout::{assign_all, bind_all, disbatch, ActionSet, Disbatch};
pub use reducer::{
    Handler, Handlers, Reduce, Reducer, ReducerOptions, TypeKeys, WeakReducer,
};
pub use registry::{ActionBuilder, Registry};
pub use store::{
    ComposedMiddleware, LoggingMiddleware, Middleware, NoopMiddleware, Store, Subscription,
};
pub use target::{Dispatch, Dispatched, FnDispatch, Target};
pub use types::TypeRegistry;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionType};
    pub use crate::creator::ActionCreator;
    pub use crate::error::{Error, Result};
    pub use crate::fanout::{assign_all, bind_all, disbatch, ActionSet, Disbatch};
    pub use crate::reducer::{Reduce, Reducer, ReducerOptions};
    pub use crate::registry::Registry;
    pub use crate::store::{Middleware, Store};
    pub use crate::target::{Dispatch, Dispatched, Target};
}
