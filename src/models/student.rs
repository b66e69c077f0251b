//! Student score records

use serde::{Deserialize, Serialize, Serializer};

use super::rules::{char_len_between, non_blank};
use super::{Entity, Field, Patch};
use crate::error::ValidationError;

pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Letter grade for an average score; `None` below 60.
    pub fn from_average(average: u32) -> Option<Self> {
        match average {
            90..=u32::MAX => Some(Grade::A),
            80..=89 => Some(Grade::B),
            70..=79 => Some(Grade::C),
            60..=69 => Some(Grade::D),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentFields {
    pub name: String,
    pub scores: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    fields: StudentFields,
}

impl Student {
    /// Floor of the arithmetic mean. Scores are never empty once validated.
    pub fn average(&self) -> u32 {
        let scores = &self.fields.scores;
        let sum: u64 = scores.iter().map(|s| u64::from(*s)).sum();
        let count = scores.len().max(1) as u64;
        (sum / count) as u32
    }

    pub fn max_score(&self) -> u32 {
        self.fields.scores.iter().copied().max().unwrap_or_default()
    }

    pub fn grade(&self) -> Option<Grade> {
        Grade::from_average(self.average())
    }
}

impl Entity for Student {
    type Fields = StudentFields;
    type Patch = StudentPatch;

    const KIND: &'static str = "student";
    const SORTABLE_FIELDS: &'static [&'static str] = &["average", "max_score"];

    fn from_fields(fields: StudentFields) -> Result<Self, ValidationError> {
        non_blank("name", &fields.name)?;
        char_len_between("name", &fields.name, 1, 50)?;
        if fields.scores.is_empty() {
            return Err(ValidationError::new("scores", "must contain at least one score"));
        }
        if let Some(bad) = fields.scores.iter().find(|s| **s > MAX_SCORE) {
            return Err(ValidationError::new(
                "scores",
                format!("every score must be between 0 and {} (got {})", MAX_SCORE, bad),
            ));
        }
        Ok(Self { fields })
    }

    fn fields(&self) -> &StudentFields {
        &self.fields
    }

    fn sort_key(&self, field: &str) -> Option<f64> {
        match field {
            "average" => Some(f64::from(self.average())),
            "max_score" => Some(f64::from(self.max_score())),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct StudentView<'a> {
    #[serde(flatten)]
    fields: &'a StudentFields,
    average: u32,
    max_score: u32,
    grade: Option<Grade>,
}

impl Serialize for Student {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StudentView {
            fields: &self.fields,
            average: self.average(),
            max_score: self.max_score(),
            grade: self.grade(),
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudentPatch {
    pub id: Field<String>,
    pub name: Field<String>,
    pub scores: Field<Vec<u32>>,
}

impl Patch for StudentPatch {
    type Fields = StudentFields;

    fn claimed_id(&self) -> Option<&str> {
        self.id.as_value().map(String::as_str)
    }

    fn is_empty(&self) -> bool {
        !(self.name.is_present() || self.scores.is_present())
    }

    fn merge_into(self, fields: &mut StudentFields) -> Result<(), ValidationError> {
        self.name.merge_required("name", &mut fields.name)?;
        self.scores.merge_required("scores", &mut fields.scores)?;
        Ok(())
    }
}
