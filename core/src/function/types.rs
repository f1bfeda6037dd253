use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Arguments for a remote function, shaped by the JSON value they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum CallArgs {
    None,
    Positional(Vec<Value>),
    Keyword(Map<String, Value>),
    Single(Value),
}

impl CallArgs {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<Value> for CallArgs {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::Array(items) if items.is_empty() => Self::None,
            Value::Array(items) => Self::Positional(items),
            Value::Object(map) if map.is_empty() => Self::None,
            Value::Object(map) => Self::Keyword(map),
            other => Self::Single(other),
        }
    }
}

impl From<CallArgs> for Value {
    fn from(args: CallArgs) -> Self {
        match args {
            CallArgs::None => Value::Null,
            CallArgs::Positional(items) => Value::Array(items),
            CallArgs::Keyword(map) => Value::Object(map),
            CallArgs::Single(value) => value,
        }
    }
}

/// An error raised inside a remote function, kept as data.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct FunctionFailure {
    pub kind: String,
    pub message: String,
}

impl FunctionFailure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new("TypeError", message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new("ValueError", message)
    }
}

/// What a function run left in its output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum FunctionOutcome {
    Returned(Value),
    Raised(FunctionFailure),
}

impl FunctionOutcome {
    pub fn into_result(self) -> Result<Value, FunctionFailure> {
        match self {
            Self::Returned(value) => Ok(value),
            Self::Raised(failure) => Err(failure),
        }
    }
}
