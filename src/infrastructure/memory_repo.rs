use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    repository::TodoRepository,
    todo::{Todo, TodoId, TodoPatch},
};

/// Process-local store. A `Vec` keeps listing in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryTodoRepository {
    items: Arc<RwLock<Vec<Todo>>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self { Self::default() }

    pub fn with_todos(todos: impl IntoIterator<Item = Todo>) -> Self {
        Self { items: Arc::new(RwLock::new(todos.into_iter().collect())) }
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn init(&self) -> Result<()> { Ok(()) }

    async fn get_all(&self) -> Result<Vec<Todo>> { Ok(self.items.read().await.clone()) }

    async fn find_by_id(&self, id: TodoId) -> Result<Option<Todo>> {
        Ok(self.items.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn add(&self, todo: Todo) -> Result<bool> {
        let mut items = self.items.write().await;
        if items.iter().any(|t| t.id == todo.id) { return Ok(false); }
        items.push(todo);
        Ok(true)
    }

    async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Option<Todo>> {
        let mut items = self.items.write().await;
        let Some(todo) = items.iter_mut().find(|t| t.id == id) else { return Ok(None) };
        todo.apply(patch);
        Ok(Some(todo.clone()))
    }

    async fn delete_by_id(&self, id: TodoId) -> Result<bool> {
        let mut items = self.items.write().await;
        let Some(pos) = items.iter().position(|t| t.id == id) else { return Ok(false) };
        items.remove(pos);
        Ok(true)
    }
}
