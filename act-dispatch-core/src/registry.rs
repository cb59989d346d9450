//! Action creator factory
//!
//! A [`Registry`] allocates action types and builds [`ActionCreator`]s.
//! Serializable descriptions (`^[0-9A-Z_]+$`) become the type verbatim and are
//! checked for duplicates; anything else gets a synthesized `[n] description`
//! type. `n` comes from a process-wide counter, so synthesized types never
//! repeat across registries.
//!
//! ```
//! use act_dispatch_core::{Error, Registry};
//!
//! let registry = Registry::new();
//! let todo = registry.create_action::<String>("Add todo").unwrap();
//! assert!(todo.action_type().as_str().ends_with("] Add todo"));
//!
//! registry.create_action::<()>("FOO").unwrap();
//! assert_eq!(
//!     registry.create_action::<()>("FOO").unwrap_err(),
//!     Error::DuplicateType("FOO".into()),
//! );
//! ```

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;

use crate::action::{Action, ActionType, BATCH};
use crate::creator::{ActionCreator, ArgsReducer};
use crate::error::Result;
use crate::types::TypeRegistry;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Context owning type allocation for a family of action creators
#[derive(Debug)]
pub struct Registry {
    types: TypeRegistry,
    batch: ActionCreator<Vec<Action>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        let types = TypeRegistry::new();
        types.add(BATCH);
        let payload: ArgsReducer<Vec<Action>> = Rc::new(|actions: &Vec<Action>| -> Value {
            actions.iter().map(Action::to_value).collect()
        });

        Self {
            types,
            batch: ActionCreator::from_parts(ActionType::batch(), payload, None),
        }
    }

    /// The table of issued serializable types
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// The batch creator shared by everything built from this registry.
    ///
    /// Its payload is the ordered list of actions it was called with.
    /// Assigning the returned handle assigns the registry's batch creator.
    pub fn batch(&self) -> ActionCreator<Vec<Action>> {
        self.batch.clone()
    }

    /// Start a creator whose payload is the call argument itself.
    pub fn action<A>(&self) -> ActionBuilder<'_, A>
    where
        A: Serialize + 'static,
    {
        self.action_with(identity_payload::<A>)
    }

    /// Start a creator whose payload is computed by `payload`.
    pub fn action_with<A, F>(&self, payload: F) -> ActionBuilder<'_, A>
    where
        A: 'static,
        F: Fn(&A) -> Value + 'static,
    {
        ActionBuilder {
            registry: self,
            description: None,
            payload: Rc::new(payload),
            meta: None,
        }
    }

    /// Shortcut for `action().description(description).build()`.
    pub fn create_action<A>(&self, description: &str) -> Result<ActionCreator<A>>
    where
        A: Serialize + 'static,
    {
        self.action::<A>().description(description).build()
    }

    fn allocate(&self, description: Option<&str>) -> Result<ActionType> {
        match description {
            Some(name) if ActionType::is_serializable(name) => {
                self.types.check(name)?;
                self.types.add(name);
                tracing::trace!(action_type = name, "issued serializable action type");
                Ok(ActionType::new(name))
            }
            _ => {
                let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
                let kind = match description {
                    Some(text) if !text.is_empty() => format!("[{id}] {text}"),
                    _ => format!("[{id}]"),
                };
                tracing::trace!(action_type = %kind, "issued action type");
                Ok(ActionType::new(kind))
            }
        }
    }
}

fn identity_payload<A: Serialize>(args: &A) -> Value {
    serde_json::to_value(args).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "payload is not representable as JSON, using null");
        Value::Null
    })
}

/// Builder returned by [`Registry::action`] and [`Registry::action_with`]
pub struct ActionBuilder<'r, A> {
    registry: &'r Registry,
    description: Option<String>,
    payload: ArgsReducer<A>,
    meta: Option<ArgsReducer<A>>,
}

impl<A: 'static> ActionBuilder<'_, A> {
    /// Human-readable description, or a serializable constant used as the type
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Compute `meta` from the call arguments. Without this, actions carry no meta.
    pub fn meta<F>(mut self, meta: F) -> Self
    where
        F: Fn(&A) -> Value + 'static,
    {
        self.meta = Some(Rc::new(meta));
        self
    }

    /// Allocate the type and build the creator.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateType`](crate::Error::DuplicateType) when a
    /// serializable description was already issued by this registry.
    pub fn build(self) -> Result<ActionCreator<A>> {
        let kind = self.registry.allocate(self.description.as_deref())?;
        Ok(ActionCreator::from_parts(kind, self.payload, self.meta))
    }
}
