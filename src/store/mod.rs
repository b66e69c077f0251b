//! Store System Module
//!
//! The in-memory ID → record mapping, the gateway that loads and saves it
//! wholesale, and the repository that serializes access to a gateway.

pub mod gateway;
pub mod repository;
pub mod sort;

pub use gateway::{JsonFileGateway, StoreGateway};
pub use repository::Repository;
pub use sort::{SortError, SortOrder, SortSpec};

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{RecordError, RecordResult};
use crate::models::Entity;

/// Every record of one kind, keyed by ID.
///
/// Serializes as a JSON object of materialized records (derived attributes
/// included). The persisted form is written by the gateway.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Store<E: Entity> {
    records: BTreeMap<String, E>,
}

impl<E: Entity> Default for Store<E> {
    fn default() -> Self {
        Self { records: BTreeMap::new() }
    }
}

impl<E: Entity> Store<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.records.get(id)
    }

    /// Iterate in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &E)> {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }

    /// Insert a record under a fresh ID.
    pub fn insert(&mut self, id: impl Into<String>, record: E) -> RecordResult<()> {
        let id = id.into();
        if self.records.contains_key(&id) {
            return Err(RecordError::Duplicate { kind: E::KIND, id });
        }
        self.records.insert(id, record);
        Ok(())
    }

    /// Swap the record stored under an existing ID, returning the previous one.
    pub fn replace(&mut self, id: &str, record: E) -> RecordResult<E> {
        match self.records.get_mut(id) {
            Some(slot) => Ok(std::mem::replace(slot, record)),
            None => Err(RecordError::NotFound { kind: E::KIND, id: id.to_string() }),
        }
    }

    pub fn remove(&mut self, id: &str) -> RecordResult<E> {
        self.records
            .remove(id)
            .ok_or_else(|| RecordError::NotFound { kind: E::KIND, id: id.to_string() })
    }

    /// Records ordered by `spec`. Ties keep ascending-ID order.
    pub fn sorted(&self, spec: &SortSpec) -> Vec<(&str, &E)> {
        let mut keyed: Vec<(f64, &str, &E)> = self
            .iter()
            .map(|(id, record)| (record.sort_key(&spec.field).unwrap_or(f64::NAN), id, record))
            .collect();

        keyed.sort_by(|a, b| match spec.order {
            SortOrder::Asc => a.0.total_cmp(&b.0),
            SortOrder::Desc => b.0.total_cmp(&a.0),
        });

        keyed.into_iter().map(|(_, id, record)| (id, record)).collect()
    }
}

impl<E: Entity> FromIterator<(String, E)> for Store<E> {
    fn from_iter<I: IntoIterator<Item = (String, E)>>(iter: I) -> Self {
        Self { records: iter.into_iter().collect() }
    }
}
