//! Action values and their type identifiers

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Type reserved for batch actions. Every registry issues it up front.
pub const BATCH: &str = "BATCH";

static SERIALIZABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Z_]+$").expect("serializable type pattern is valid")
});

/// Identifier distinguishing one kind of action from another
///
/// Either a serializable constant such as `ADD_TODO`, used verbatim, or a
/// synthesized `[n] description` string allocated by a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionType(String);

impl ActionType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The batch action type
    pub fn batch() -> Self {
        Self(BATCH.to_string())
    }

    /// Whether `name` is an uppercase constant that may be used verbatim as a type
    pub fn is_serializable(name: &str) -> bool {
        SERIALIZABLE.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ActionType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ActionType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A plain record describing an intended state transition
///
/// Serializes as `{ "type", "payload", "meta"?, "error" }`. `meta` is omitted
/// entirely when the creator had no meta reducer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionType,
    #[serde(default)]
    pub payload: Value,
    #[serde(
        default,
        deserialize_with = "present_meta",
        skip_serializing_if = "Option::is_none"
    )]
    pub meta: Option<Value>,
    #[serde(default)]
    pub error: bool,
}

// A `meta` key that is present, even as `null`, was produced by a meta reducer.
fn present_meta<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Action {
    pub fn new(kind: impl Into<ActionType>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            meta: None,
            error: false,
        }
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Build a batch action without going through a registry's batch creator.
    pub fn batch(actions: Vec<Action>) -> Self {
        let payload = actions.into_iter().map(Value::from).collect();
        Self::new(ActionType::batch(), Value::Array(payload))
    }

    pub fn is_batch(&self) -> bool {
        self.kind.as_str() == BATCH
    }

    /// Actions carried by a batch, in order. Elements that are not actions are
    /// skipped; returns `None` for non-batch actions.
    pub fn batched(&self) -> Option<Vec<Action>> {
        if !self.is_batch() {
            return None;
        }
        let items = match &self.payload {
            Value::Array(items) => items.iter().filter_map(Action::from_value).collect(),
            _ => Vec::new(),
        };
        Some(items)
    }

    /// Parse an action out of arbitrary JSON.
    ///
    /// Returns `None` unless `value` is an object with a non-empty string `type`.
    pub fn from_value(value: &Value) -> Option<Action> {
        let action = Action::deserialize(value).ok()?;
        (!action.kind.is_empty()).then_some(action)
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".into(), Value::String(self.kind.to_string()));
        object.insert("payload".into(), self.payload.clone());
        if let Some(meta) = &self.meta {
            object.insert("meta".into(), meta.clone());
        }
        object.insert("error".into(), Value::Bool(self.error));
        Value::Object(object)
    }
}

impl From<Action> for Value {
    fn from(action: Action) -> Self {
        action.to_value()
    }
}

/// Mark an action as an error without changing its type.
pub fn as_error(mut action: Action) -> Action {
    action.error = true;
    action
}

/// Like [`as_error`], passing `None` through untouched.
pub fn as_error_opt(action: Option<Action>) -> Option<Action> {
    action.map(as_error)
}
