//! Zone configuration storage.
//!
//! # Purpose
//! Defines the store contract the HTTP layer reads zone snapshots from and the
//! provisioning API writes to.
use crate::model::{Zone, ZoneDefinition};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Every create or update assigns a `last_modified` strictly greater than any
/// value the store handed out before.
#[async_trait]
pub trait ZoneStore: Send + Sync {
    async fn list_zones(&self) -> StoreResult<Vec<Zone>>;
    async fn get_zone(&self, zone_id: &str) -> StoreResult<Zone>;
    async fn create_zone(&self, zone: ZoneDefinition) -> StoreResult<Zone>;
    async fn update_zone(&self, zone: ZoneDefinition) -> StoreResult<Zone>;
    async fn delete_zone(&self, zone_id: &str) -> StoreResult<()>;
    async fn zone_exists(&self, zone_id: &str) -> StoreResult<bool>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
