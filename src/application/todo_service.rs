use crate::domain::error::TodoError;
use crate::domain::repository::TodoRepository;
use crate::domain::todo::{Todo, TodoId, TodoPatch};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, TodoError>;

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Todo>>;
    async fn get(&self, id: TodoId) -> Result<Todo>;
    async fn create(&self, todo: Todo) -> Result<Todo>;
    async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Todo>;
    async fn delete(&self, id: TodoId) -> Result<()>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

#[async_trait]
impl<R: TodoRepository> TodoService for TodoServiceImpl<R> {
    async fn list(&self) -> Result<Vec<Todo>> { Ok(self.repo.get_all().await?) }

    async fn get(&self, id: TodoId) -> Result<Todo> {
        self.repo.find_by_id(id).await?.ok_or(TodoError::NotFound(id))
    }

    async fn create(&self, todo: Todo) -> Result<Todo> {
        let id = todo.id;
        if !self.repo.add(todo.clone()).await? {
            return Err(TodoError::Conflict(id));
        }
        tracing::debug!(%id, "todo created");
        Ok(todo)
    }

    async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Todo> {
        let updated = self.repo.update(id, patch).await?.ok_or(TodoError::NotFound(id))?;
        tracing::debug!(%id, "todo updated");
        Ok(updated)
    }

    async fn delete(&self, id: TodoId) -> Result<()> {
        // Look up first so a miss is reported before touching the store.
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(TodoError::NotFound(id));
        }
        if !self.repo.delete_by_id(id).await? {
            return Err(TodoError::NotFound(id));
        }
        tracing::debug!(%id, "todo deleted");
        Ok(())
    }
}
