use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// A single task. All four fields are supplied by the client on create.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub order: i64,
}

impl Todo {
    pub fn new(id: i64, title: impl Into<String>, completed: bool, order: i64) -> Self {
        Self { id: TodoId(id), title: title.into(), completed, order }
    }

    /// Applies the supplied fields, leaving `id` untouched.
    pub fn apply(&mut self, patch: TodoPatch) {
        if let Some(t) = patch.title { self.title = t; }
        if let Some(c) = patch.completed { self.completed = c; }
        if let Some(o) = patch.order { self.order = o; }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub order: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_plain_integer_id() {
        let json = serde_json::to_value(Todo::new(1, "Sample Test", false, 5)).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 1, "title": "Sample Test", "completed": false, "order": 5 }));
    }

    #[test]
    fn rejects_missing_fields() {
        let result: Result<Todo, _> = serde_json::from_str(r#"{"id":1,"title":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let mut todo = Todo::new(3, "Before", false, 1);
        todo.apply(TodoPatch { completed: Some(true), ..Default::default() });
        assert_eq!(todo, Todo::new(3, "Before", true, 1));
    }
}
