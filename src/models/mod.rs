use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: i32,
    pub text: String,
    pub completed: bool,
}

// body of POST /todos and PUT /todos/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct TodoText {
    pub text: String,
}

/// Identifier taken from a `/todos/{id}` path segment.
///
/// Only values a `SERIAL` column can hold are accepted, so a parsed id can be
/// bound straight into a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TodoId(i32);
impl TodoId {
    pub fn get(self) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid todo id `{0}`")]
pub struct InvalidTodoId(pub String);

impl FromStr for TodoId {
    type Err = InvalidTodoId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.parse::<i32>() {
            Ok(id) if id >= 0 => Ok(Self(id)),
            _ => Err(InvalidTodoId(raw.to_string())),
        }
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
