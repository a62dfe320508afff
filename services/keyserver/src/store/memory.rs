//! In-memory implementation of the zone store.
//!
//! # Purpose
//! Holds zone records in a `HashMap` guarded by `tokio::sync::RwLock`. Used for
//! local development, tests and deployments that seed zones from
//! configuration at startup.
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - Reads return owned copies, so a request works on a stable snapshot while
//!   provisioning writes proceed.
//! - Modification stamps are issued under the write lock with millisecond
//!   resolution and never repeat, even when two writes land in the same
//!   millisecond.
//!
//! # Metrics
//! Keeps `keyserver_zones_total` current and counts changes by operation.
use super::{StoreError, StoreResult, ZoneStore};
use crate::model::{Zone, ZoneDefinition};
use crate::observability::{ZONE_CHANGES, ZONES};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct ZoneTable {
    zones: HashMap<String, Zone>,
    last_stamp_millis: i64,
}

impl ZoneTable {
    fn next_stamp(&mut self) -> StoreResult<DateTime<Utc>> {
        let millis = Utc::now()
            .timestamp_millis()
            .max(self.last_stamp_millis + 1);
        let stamp = DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| anyhow::anyhow!("modification timestamp out of range: {millis}"))?;
        self.last_stamp_millis = millis;
        Ok(stamp)
    }

    fn insert(&mut self, definition: ZoneDefinition) -> StoreResult<Zone> {
        let zone = Zone {
            last_modified: self.next_stamp()?,
            zone_id: definition.zone_id,
            name: definition.name,
            token_policy: definition.token_policy,
        };
        self.zones.insert(zone.zone_id.clone(), zone.clone());
        metrics::gauge!(ZONES).set(self.zones.len() as f64);
        Ok(zone)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryZoneStore {
    table: Arc<RwLock<ZoneTable>>,
}

impl InMemoryZoneStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ZoneStore for InMemoryZoneStore {
    async fn list_zones(&self) -> StoreResult<Vec<Zone>> {
        let table = self.table.read().await;
        let mut zones: Vec<Zone> = table.zones.values().cloned().collect();
        zones.sort_by(|a, b| a.zone_id.cmp(&b.zone_id));
        Ok(zones)
    }

    async fn get_zone(&self, zone_id: &str) -> StoreResult<Zone> {
        self.table
            .read()
            .await
            .zones
            .get(zone_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("zone {zone_id}")))
    }

    async fn create_zone(&self, zone: ZoneDefinition) -> StoreResult<Zone> {
        let mut table = self.table.write().await;
        if table.zones.contains_key(&zone.zone_id) {
            return Err(StoreError::Conflict(format!("zone {} exists", zone.zone_id)));
        }
        let created = table.insert(zone)?;
        metrics::counter!(ZONE_CHANGES, "op" => "created").increment(1);
        Ok(created)
    }

    async fn update_zone(&self, zone: ZoneDefinition) -> StoreResult<Zone> {
        let mut table = self.table.write().await;
        if !table.zones.contains_key(&zone.zone_id) {
            return Err(StoreError::NotFound(format!("zone {}", zone.zone_id)));
        }
        let updated = table.insert(zone)?;
        metrics::counter!(ZONE_CHANGES, "op" => "updated").increment(1);
        Ok(updated)
    }

    async fn delete_zone(&self, zone_id: &str) -> StoreResult<()> {
        let mut table = self.table.write().await;
        if table.zones.remove(zone_id).is_none() {
            return Err(StoreError::NotFound(format!("zone {zone_id}")));
        }
        metrics::counter!(ZONE_CHANGES, "op" => "deleted").increment(1);
        metrics::gauge!(ZONES).set(table.zones.len() as f64);
        Ok(())
    }

    async fn zone_exists(&self, zone_id: &str) -> StoreResult<bool> {
        Ok(self.table.read().await.zones.contains_key(zone_id))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
