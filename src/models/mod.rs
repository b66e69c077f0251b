//! Entity Model
//!
//! Validated record types, their client-facing patch types and the traits
//! the store and the merge engine are written against.

pub mod field;
pub mod patient;
mod rules;
pub mod student;

pub use field::Field;
pub use patient::{Gender, Patient, PatientFields, PatientPatch, Verdict};
pub use student::{Grade, Student, StudentFields, StudentPatch};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

use crate::error::ValidationError;

/// A fully validated record.
///
/// Implementors keep their required attributes private: the only way to
/// obtain a value is [`Entity::from_fields`], which runs every field and
/// cross-field rule. Derived attributes are computed on demand and emitted
/// by the `Serialize` impl, never stored.
pub trait Entity: Serialize + Clone + Debug + Send + Sync + 'static {
    /// The required (stored, settable) attributes
    type Fields: Serialize + DeserializeOwned + Clone + PartialEq + Debug + Send + Sync + 'static;
    /// The partial update accepted for this entity
    type Patch: Patch<Fields = Self::Fields>;

    /// Singular noun used in logs and error messages
    const KIND: &'static str;
    /// Attributes accepted by `sort_by`
    const SORTABLE_FIELDS: &'static [&'static str];

    /// Validate a complete set of required attributes.
    fn from_fields(fields: Self::Fields) -> Result<Self, ValidationError>;

    /// Borrow the required attributes (the persisted representation).
    fn fields(&self) -> &Self::Fields;

    /// Numeric sort key for one of [`Entity::SORTABLE_FIELDS`].
    fn sort_key(&self, field: &str) -> Option<f64>;
}

/// A client-submitted set of intended field changes.
pub trait Patch: DeserializeOwned + Default + Debug + Send + 'static {
    type Fields;

    /// The `id` the client sent along, if any. Never applied.
    fn claimed_id(&self) -> Option<&str>;

    /// True when no attribute is present.
    fn is_empty(&self) -> bool;

    /// Overwrite every present attribute of `fields`. Absent attributes are left alone.
    fn merge_into(self, fields: &mut Self::Fields) -> Result<(), ValidationError>;
}

/// External representation of a record together with its storage key.
#[derive(Debug, Serialize)]
pub struct Identified<'a, E: Entity> {
    pub id: &'a str,
    #[serde(flatten)]
    pub record: &'a E,
}
