use thiserror::Error;

use crate::models::Entity;

pub const ORDERS: &[&str] = &["Asc", "Desc"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error("cannot sort by `{given}`; allowed fields are {allowed:?}")]
    Field { given: String, allowed: &'static [&'static str] },

    #[error("order `{given}` is invalid; allowed values are {allowed:?}")]
    Order { given: String, allowed: &'static [&'static str] },
}

impl SortError {
    pub fn allowed(&self) -> &'static [&'static str] {
        match self {
            SortError::Field { allowed, .. } | SortError::Order { allowed, .. } => allowed,
        }
    }
}

/// A checked `sort_by` / `order` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

impl SortSpec {
    /// Validate raw query values against the entity's sortable fields.
    /// A missing `order` means ascending.
    pub fn parse<E: Entity>(sort_by: &str, order: Option<&str>) -> Result<Self, SortError> {
        if !E::SORTABLE_FIELDS.contains(&sort_by) {
            return Err(SortError::Field {
                given: sort_by.to_string(),
                allowed: E::SORTABLE_FIELDS,
            });
        }

        let order = match order {
            None | Some("Asc") => SortOrder::Asc,
            Some("Desc") => SortOrder::Desc,
            Some(other) => {
                return Err(SortError::Order { given: other.to_string(), allowed: ORDERS });
            }
        };

        Ok(Self { field: sort_by.to_string(), order })
    }
}
