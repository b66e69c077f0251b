//! Presence-tracking patch field

use serde::{Deserialize, Deserializer};

use crate::error::ValidationError;

/// One attribute of a patch.
///
/// Combined with `#[serde(default)]` a missing key decodes to `Absent` while
/// an explicit JSON `null` decodes to `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Field<T> {
    pub fn is_present(&self) -> bool {
        !matches!(self, Field::Absent)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Apply to an attribute that cannot be cleared.
    pub fn merge_required(self, name: &str, slot: &mut T) -> Result<(), ValidationError> {
        match self {
            Field::Absent => Ok(()),
            Field::Null => Err(ValidationError::required(name)),
            Field::Value(v) => {
                *slot = v;
                Ok(())
            }
        }
    }

    /// Apply to a nullable attribute; `Null` clears it.
    pub fn merge_optional(self, slot: &mut Option<T>) {
        match self {
            Field::Absent => {}
            Field::Null => *slot = None,
            Field::Value(v) => *slot = Some(v),
        }
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Value(value)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Field::Value(value),
            None => Field::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Probe {
        a: Field<u32>,
        b: Field<u32>,
        c: Field<u32>,
    }

    #[test]
    fn test_absent_null_and_value_are_distinct() {
        let probe: Probe = serde_json::from_str(r#"{"b": null, "c": 7}"#).unwrap();
        assert_eq!(probe.a, Field::Absent);
        assert_eq!(probe.b, Field::Null);
        assert_eq!(probe.c, Field::Value(7));
        assert!(!probe.a.is_present());
        assert!(probe.b.is_present());
    }

    #[test]
    fn test_merge_required_rejects_null() {
        let mut slot = 5;
        Field::Absent.merge_required("age", &mut slot).unwrap();
        assert_eq!(slot, 5);

        let err = Field::<i32>::Null.merge_required("age", &mut slot).unwrap_err();
        assert_eq!(err.field, "age");
        assert_eq!(slot, 5);

        Field::Value(9).merge_required("age", &mut slot).unwrap();
        assert_eq!(slot, 9);
    }

    #[test]
    fn test_merge_optional_clears_on_null() {
        let mut slot = Some("a@gmail.com".to_string());
        Field::Absent.merge_optional(&mut slot);
        assert!(slot.is_some());
        Field::Null.merge_optional(&mut slot);
        assert!(slot.is_none());
    }
}
