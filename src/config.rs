use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use directories::ProjectDirs;

use crate::infra::fallback::FallbackStore;
use crate::infra::memory::MemoryStore;
use crate::infra::sqlite::repo::SqliteStore;
use crate::usecase::ports::repo::RecordStore;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_KEY: &str = "transport-data";
pub const DEFAULT_RESOURCE: &str = "excel";
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Memory,
    Sqlite,
    /// SQLite, with reads and writes served from memory while SQLite fails.
    SqliteFallback,
}

impl StoreKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(StoreKind::Memory),
            "sqlite" => Some(StoreKind::Sqlite),
            "sqlite-fallback" | "fallback" => Some(StoreKind::SqliteFallback),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub store: StoreKind,
    pub db_path: PathBuf,
    pub data_key: String,
    pub resource: String,
    pub seed_placeholder: bool,
    pub seed_file: Option<PathBuf>,
    pub max_body_bytes: usize,
    pub log_json: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; unset or unparsable values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bind = match var("TRANSPORT_BIND") {
            Some(bind) => bind,
            None => {
                let port = var("PORT")
                    .and_then(|port| port.trim().parse::<u16>().ok())
                    .unwrap_or(DEFAULT_PORT);
                format!("0.0.0.0:{port}")
            }
        };

        let db_path = match var("TRANSPORT_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        Ok(Self {
            bind,
            store: var("TRANSPORT_STORE")
                .and_then(|kind| StoreKind::parse(&kind))
                .unwrap_or(StoreKind::Sqlite),
            db_path,
            data_key: var("TRANSPORT_DATA_KEY").unwrap_or_else(|| DEFAULT_DATA_KEY.to_string()),
            resource: var("TRANSPORT_RESOURCE")
                .map(|resource| resource.trim_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_RESOURCE.to_string()),
            seed_placeholder: parse_bool(var("TRANSPORT_SEED_PLACEHOLDER"), true),
            seed_file: var("TRANSPORT_SEED_FILE").map(PathBuf::from),
            max_body_bytes: var("TRANSPORT_MAX_BODY_BYTES")
                .and_then(|bytes| bytes.trim().parse::<usize>().ok())
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
            log_json: parse_bool(var("TRANSPORT_LOG_JSON"), false),
        })
    }

    pub fn build_store(&self) -> Arc<dyn RecordStore> {
        match self.store {
            StoreKind::Memory => Arc::new(MemoryStore::new()),
            StoreKind::Sqlite => Arc::new(SqliteStore::new(&self.db_path, &self.data_key)),
            StoreKind::SqliteFallback => Arc::new(FallbackStore::new(Arc::new(SqliteStore::new(
                &self.db_path,
                &self.data_key,
            )))),
        }
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .and_then(|v| match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

pub fn default_db_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "hellhbbd", "transport-directory")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))?;
    Ok(project_dirs.data_local_dir().join("transport.sqlite"))
}
