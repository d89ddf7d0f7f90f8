use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{sqlite::{SqlitePoolOptions, SqliteRow}, Pool, Row, Sqlite};

use crate::domain::{
    repository::TodoRepository,
    todo::{Todo, TodoId, TodoPatch},
};

#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTodoRepository {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = pool_options(database_url).connect(database_url).await?;
        Ok(Self { pool: Arc::new(pool) })
    }
}

/// An in-memory database lives only as long as its last connection, so that
/// connection is pinned open for the lifetime of the pool. One connection also
/// avoids shared-cache table locks between writers.
fn pool_options(database_url: &str) -> SqlitePoolOptions {
    if database_url.starts_with("sqlite::memory:") {
        SqlitePoolOptions::new().max_connections(1).min_connections(1).idle_timeout(None).max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id INTEGER NOT NULL UNIQUE,
                title TEXT NOT NULL,
                completed INTEGER NOT NULL,
                position INTEGER NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Todo>> {
        let rows = sqlx::query("SELECT id, title, completed, position FROM todos ORDER BY seq")
            .fetch_all(&*self.pool)
            .await?;
        rows.iter().map(row_to_todo).collect()
    }

    async fn find_by_id(&self, id: TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query("SELECT id, title, completed, position FROM todos WHERE id = ?1")
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await?;
        row.as_ref().map(row_to_todo).transpose()
    }

    async fn add(&self, todo: Todo) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO todos (id, title, completed, position) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(todo.id.0)
        .bind(&todo.title)
        .bind(todo.completed)
        .bind(todo.order)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Option<Todo>> {
        let row = sqlx::query(
            "UPDATE todos SET
                title = COALESCE(?2, title),
                completed = COALESCE(?3, completed),
                position = COALESCE(?4, position)
             WHERE id = ?1
             RETURNING id, title, completed, position",
        )
        .bind(id.0)
        .bind(patch.title)
        .bind(patch.completed)
        .bind(patch.order)
        .fetch_optional(&*self.pool)
        .await?;
        row.as_ref().map(row_to_todo).transpose()
    }

    async fn delete_by_id(&self, id: TodoId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id.0)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_todo(row: &SqliteRow) -> Result<Todo> {
    Ok(Todo {
        id: TodoId(row.try_get("id")?),
        title: row.try_get("title")?,
        completed: row.try_get("completed")?,
        order: row.try_get("position")?,
    })
}
