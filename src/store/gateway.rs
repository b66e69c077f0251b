//! Store Gateway
//!
//! Loads and saves a whole [`Store`] at once. The JSON file implementation
//! persists only required attributes and replaces the file through a
//! temp-file rename, so a failed save never leaves a truncated document.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, info};

use super::Store;
use crate::error::{RecordError, RecordResult};
use crate::models::Entity;

/// Backing medium for one kind of record.
#[async_trait]
pub trait StoreGateway<E: Entity>: Send + Sync {
    /// Read the entire store. Missing or corrupt backing data is an error.
    async fn load(&self) -> RecordResult<Store<E>>;

    /// Replace the entire store.
    async fn save(&self, store: &Store<E>) -> RecordResult<()>;
}

pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write an empty store if the file does not exist yet.
    pub async fn init<E: Entity>(&self) -> RecordResult<bool> {
        let exists = fs::try_exists(&self.path)
            .await
            .map_err(|e| RecordError::io(&self.path, e))?;
        if exists {
            return Ok(false);
        }
        info!("Creating empty {} store at {:?}", E::KIND, self.path);
        StoreGateway::<E>::save(self, &Store::new()).await?;
        Ok(true)
    }

    fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> StoreGateway<E> for JsonFileGateway {
    async fn load(&self) -> RecordResult<Store<E>> {
        let bytes = fs::read(&self.path)
            .await
            .map_err(|e| RecordError::io(&self.path, e))?;

        let raw: BTreeMap<String, E::Fields> =
            serde_json::from_slice(&bytes).map_err(|e| RecordError::parse(&self.path, e))?;

        let mut store = Store::new();
        for (id, fields) in raw {
            let record = E::from_fields(fields).map_err(|e| {
                RecordError::parse(&self.path, format!("{} `{}` is invalid: {}", E::KIND, id, e))
            })?;
            store.insert(id, record)?;
        }

        debug!("Loaded {} {} record(s) from {:?}", store.len(), E::KIND, self.path);
        Ok(store)
    }

    async fn save(&self, store: &Store<E>) -> RecordResult<()> {
        let persisted: BTreeMap<&str, &E::Fields> =
            store.iter().map(|(id, record)| (id, record.fields())).collect();

        let bytes = serde_json::to_vec_pretty(&persisted)
            .map_err(|e| RecordError::parse(&self.path, e))?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::write_atomic(&path, &bytes))
            .await
            .map_err(|e| RecordError::io(&self.path, std::io::Error::other(e)))?
            .map_err(|e| RecordError::io(&self.path, e))?;

        debug!("Saved {} {} record(s) to {:?}", store.len(), E::KIND, self.path);
        Ok(())
    }
}
