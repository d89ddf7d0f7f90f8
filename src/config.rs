use std::net::SocketAddr;

use anyhow::Context;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreKind,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Reads `DATABASE_URL` and `BIND_ADDR`. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(std::env::var("DATABASE_URL").ok(), std::env::var("BIND_ADDR").ok())
    }

    pub fn from_vars(database_url: Option<String>, bind_addr: Option<String>) -> anyhow::Result<Self> {
        let database_url = database_url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let store = if database_url == "memory" { StoreKind::Memory } else { StoreKind::Sqlite(database_url) };
        let bind_addr = bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        let bind_addr = bind_addr.parse().with_context(|| format!("invalid BIND_ADDR {bind_addr:?}"))?;
        Ok(Self { store, bind_addr })
    }
}

/// Makes sure a file-backed SQLite URL points at a file that can be opened.
pub fn prepare_sqlite_file(database_url: &str) -> anyhow::Result<()> {
    if database_url.starts_with("sqlite::memory:") { return Ok(()); }
    if let Some(path) = database_url.strip_prefix("sqlite://") {
        // Windows absolute paths arrive as /C:/path
        let path = if cfg!(windows) && path.len() >= 3 && path.as_bytes()[0] == b'/' && path.as_bytes()[2] == b':' {
            &path[1..]
        } else {
            path
        };
        use std::{fs, path::Path, fs::OpenOptions};
        let p = Path::new(path);
        if let Some(parent) = p.parent() { if !parent.as_os_str().is_empty() { fs::create_dir_all(parent)?; } }
        if !p.exists() {
            OpenOptions::new().create(true).append(true).open(p)
                .with_context(|| format!("cannot create sqlite file {}", p.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::from_vars(None, None).unwrap();
        assert_eq!(config.store, StoreKind::Sqlite(DEFAULT_DATABASE_URL.into()));
        assert_eq!(config.bind_addr.port(), 3000);
    }

    #[test]
    fn memory_store() {
        let config = Config::from_vars(Some("memory".into()), Some("0.0.0.0:8080".into())).unwrap();
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn bad_bind_addr() {
        let err = Config::from_vars(None, Some("nope".into())).unwrap_err();
        assert!(err.to_string().contains("BIND_ADDR"));
    }

    #[test]
    fn in_memory_sqlite_needs_no_file() {
        prepare_sqlite_file("sqlite::memory:").unwrap();
    }
}
