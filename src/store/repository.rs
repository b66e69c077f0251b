//! Repository - serialized access to one kind of record
//!
//! Every operation loads the whole store through the gateway. Mutations hold
//! the write lock across load, mutate and save so concurrent requests in this
//! process cannot lose each other's updates; reads share the read lock and
//! always see a fully saved store.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{SortSpec, Store, StoreGateway};
use crate::engine;
use crate::error::{RecordError, RecordResult, ValidationError};
use crate::models::Entity;

pub struct Repository<E: Entity> {
    gateway: Arc<dyn StoreGateway<E>>,
    lock: RwLock<()>,
}

impl<E: Entity> Repository<E> {
    pub fn new(gateway: Arc<dyn StoreGateway<E>>) -> Self {
        Self { gateway, lock: RwLock::new(()) }
    }

    pub async fn list(&self) -> RecordResult<Store<E>> {
        let _guard = self.lock.read().await;
        self.gateway.load().await
    }

    pub async fn get(&self, id: &str) -> RecordResult<E> {
        let _guard = self.lock.read().await;
        let store = self.gateway.load().await?;
        store
            .get(id)
            .cloned()
            .ok_or_else(|| RecordError::NotFound { kind: E::KIND, id: id.to_string() })
    }

    /// Records ordered by `spec`, each paired with its ID.
    pub async fn sorted(&self, spec: &SortSpec) -> RecordResult<Vec<(String, E)>> {
        let _guard = self.lock.read().await;
        let store = self.gateway.load().await?;
        Ok(store
            .sorted(spec)
            .into_iter()
            .map(|(id, record)| (id.to_string(), record.clone()))
            .collect())
    }

    pub async fn create(&self, id: &str, fields: E::Fields) -> RecordResult<E> {
        if id.trim().is_empty() {
            return Err(ValidationError::new("id", "must not be blank").into());
        }
        let record = E::from_fields(fields)?;

        let _guard = self.lock.write().await;
        let mut store = self.gateway.load().await?;
        store.insert(id, record.clone())?;
        self.gateway.save(&store).await?;

        info!("Created {} `{}`", E::KIND, id);
        Ok(record)
    }

    /// Merge-validate `patch` onto the stored record and persist the result.
    pub async fn update(&self, id: &str, patch: E::Patch) -> RecordResult<E> {
        let _guard = self.lock.write().await;
        let mut store = self.gateway.load().await?;

        let applied = match engine::apply_update(&mut store, id, patch) {
            Ok(applied) => applied,
            Err(e) => {
                warn!("Rejected update of {} `{}`: {}", E::KIND, id, e);
                return Err(e);
            }
        };
        let updated = applied.record.clone();
        if !applied.changed {
            debug!("Update of {} `{}` changed nothing; store not rewritten", E::KIND, id);
            return Ok(updated);
        }
        self.gateway.save(&store).await?;

        info!("Updated {} `{}`", E::KIND, id);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> RecordResult<E> {
        let _guard = self.lock.write().await;
        let mut store = self.gateway.load().await?;
        let removed = store.remove(id)?;
        self.gateway.save(&store).await?;

        info!("Deleted {} `{}`", E::KIND, id);
        Ok(removed)
    }
}
