//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::open_store` without depending directly on `common`.

use std::sync::Arc;

use crate::storage::KitStore;

/// Ensure the data directory exists, then open the kit store it holds.
pub async fn open_store(config_path: &str, cfg: &configs::StorageConfig) -> anyhow::Result<Arc<KitStore>> {
    common::env::ensure_env(config_path, &cfg.data_dir).await?;
    Ok(KitStore::from_config(cfg).await)
}
