//! Merge-Validate Engine
//!
//! Turns a stored record plus a client patch into a new, fully validated
//! record. The stored record is never touched: merging happens on a copy
//! of its required attributes, and derived attributes are recomputed by
//! constructing a fresh entity from that copy.

use tracing::{debug, warn};

use crate::error::{RecordError, RecordResult, ValidationError};
use crate::models::{Entity, Patch};
use crate::store::Store;

/// Merge `patch` onto `stored` and revalidate the result as a whole.
pub fn merge<E: Entity>(stored: &E, patch: E::Patch) -> Result<E, ValidationError> {
    let mut working = stored.fields().clone();
    patch.merge_into(&mut working)?;
    E::from_fields(working)
}

/// Outcome of [`apply_update`].
#[derive(Debug)]
pub struct Applied<'s, E> {
    pub record: &'s E,
    /// False when the merged required attributes equal the stored ones.
    pub changed: bool,
}

/// Apply `patch` to the record stored under `id`.
///
/// On error `store` is left exactly as it was. When the merge changes
/// nothing the stored record stays in place untouched.
pub fn apply_update<'s, E: Entity>(
    store: &'s mut Store<E>,
    id: &str,
    patch: E::Patch,
) -> RecordResult<Applied<'s, E>> {
    let stored = store
        .get(id)
        .ok_or_else(|| RecordError::NotFound { kind: E::KIND, id: id.to_string() })?;

    if let Some(claimed) = patch.claimed_id() {
        if claimed != id {
            warn!("Ignoring id `{}` in patch for {} `{}`", claimed, E::KIND, id);
        }
    }
    if patch.is_empty() {
        debug!("Empty patch for {} `{}`; revalidating stored record", E::KIND, id);
    }

    let updated = merge(stored, patch)?;
    let changed = updated.fields() != stored.fields();
    if changed {
        store.replace(id, updated)?;
    }
    let record = store
        .get(id)
        .ok_or_else(|| RecordError::NotFound { kind: E::KIND, id: id.to_string() })?;
    Ok(Applied { record, changed })
}
