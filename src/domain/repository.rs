use async_trait::async_trait;
use super::todo::{Todo, TodoId, TodoPatch};

/// Persistence for todos. Listing preserves insertion order.
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    async fn get_all(&self) -> anyhow::Result<Vec<Todo>>;
    async fn find_by_id(&self, id: TodoId) -> anyhow::Result<Option<Todo>>;
    /// Returns `false` without storing anything when `todo.id` is taken.
    async fn add(&self, todo: Todo) -> anyhow::Result<bool>;
    async fn update(&self, id: TodoId, patch: TodoPatch) -> anyhow::Result<Option<Todo>>;
    async fn delete_by_id(&self, id: TodoId) -> anyhow::Result<bool>;
}
