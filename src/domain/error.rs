use thiserror::Error;

use super::todo::TodoId;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("todo {0} not found")]
    NotFound(TodoId),
    #[error("todo {0} already exists")]
    Conflict(TodoId),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
