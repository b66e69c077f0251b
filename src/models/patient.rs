//! Patient records
//!
//! Required attributes are persisted as-is; `bmi` and `verdict` are derived
//! from `weight` and `height` every time a patient is materialized.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

use super::rules::{char_len_between, non_blank, positive, round2};
use super::{Entity, Field, Patch};
use crate::error::ValidationError;

/// Patients strictly older than this must list an emergency contact.
pub const EMERGENCY_CONTACT_AGE: i32 = 60;
pub const EMERGENCY_CONTACT_KEY: &str = "emergency_contact";
pub const ALLOWED_EMAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.com"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// BMI bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Underweight,
    #[serde(rename = "Normal weight")]
    NormalWeight,
    Overweight,
    Obese,
}

impl Verdict {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Verdict::Underweight
        } else if bmi < 25.0 {
            Verdict::NormalWeight
        } else if bmi < 30.0 {
            Verdict::Overweight
        } else {
            Verdict::Obese
        }
    }
}

/// Required attributes of a patient, exactly as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientFields {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub age: i32,
    pub gender: Gender,
    pub city: String,
    /// Kilograms
    pub weight: f64,
    /// Centimetres
    pub height: f64,
    #[serde(default)]
    pub is_married: bool,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub contact_details: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    fields: PatientFields,
}

impl Patient {
    /// Body mass index rounded to two decimals.
    pub fn bmi(&self) -> f64 {
        let height_m = self.fields.height / 100.0;
        round2(self.fields.weight / (height_m * height_m))
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_bmi(self.bmi())
    }

    fn validate(fields: &PatientFields) -> Result<(), ValidationError> {
        char_len_between("name", &fields.name, 3, 50)?;
        if let Some(email) = &fields.email {
            validate_email(email)?;
        }
        if fields.age <= 0 || fields.age >= 120 {
            return Err(ValidationError::new(
                "age",
                format!("must be greater than 0 and less than 120 (got {})", fields.age),
            ));
        }
        non_blank("city", &fields.city)?;
        positive("weight", fields.weight)?;
        positive("height", fields.height)?;
        let height_m = fields.height / 100.0;
        if !(fields.weight / (height_m * height_m)).is_finite() {
            return Err(ValidationError::new(
                "weight",
                "must give a finite BMI for the given height",
            ));
        }

        if fields.age > EMERGENCY_CONTACT_AGE
            && !fields.contact_details.contains_key(EMERGENCY_CONTACT_KEY)
        {
            return Err(ValidationError::new(
                "contact_details",
                format!(
                    "must contain `{}` for patients older than {}",
                    EMERGENCY_CONTACT_KEY, EMERGENCY_CONTACT_AGE
                ),
            ));
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::new("email", "must contain `@`"));
    };
    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::new("email", "is not a valid address"));
    }
    let domain = domain.to_ascii_lowercase();
    if !ALLOWED_EMAIL_DOMAINS.contains(&domain.as_str()) {
        return Err(ValidationError::new(
            "email",
            format!("domain must be one of {:?} (got `{}`)", ALLOWED_EMAIL_DOMAINS, domain),
        ));
    }
    Ok(())
}

impl Entity for Patient {
    type Fields = PatientFields;
    type Patch = PatientPatch;

    const KIND: &'static str = "patient";
    const SORTABLE_FIELDS: &'static [&'static str] = &["age", "weight", "height", "bmi"];

    fn from_fields(fields: PatientFields) -> Result<Self, ValidationError> {
        Self::validate(&fields)?;
        Ok(Self { fields })
    }

    fn fields(&self) -> &PatientFields {
        &self.fields
    }

    fn sort_key(&self, field: &str) -> Option<f64> {
        match field {
            "age" => Some(f64::from(self.fields.age)),
            "weight" => Some(self.fields.weight),
            "height" => Some(self.fields.height),
            "bmi" => Some(self.bmi()),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct PatientView<'a> {
    #[serde(flatten)]
    fields: &'a PatientFields,
    bmi: f64,
    verdict: Verdict,
}

impl Serialize for Patient {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PatientView {
            fields: &self.fields,
            bmi: self.bmi(),
            verdict: self.verdict(),
        }
        .serialize(serializer)
    }
}

/// Partial update for a patient. Derived attributes are not accepted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatientPatch {
    pub id: Field<String>,
    pub name: Field<String>,
    pub email: Field<String>,
    pub age: Field<i32>,
    pub gender: Field<Gender>,
    pub city: Field<String>,
    pub weight: Field<f64>,
    pub height: Field<f64>,
    pub is_married: Field<bool>,
    pub allergies: Field<Vec<String>>,
    pub contact_details: Field<BTreeMap<String, String>>,
}

impl Patch for PatientPatch {
    type Fields = PatientFields;

    fn claimed_id(&self) -> Option<&str> {
        self.id.as_value().map(String::as_str)
    }

    fn is_empty(&self) -> bool {
        !(self.name.is_present()
            || self.email.is_present()
            || self.age.is_present()
            || self.gender.is_present()
            || self.city.is_present()
            || self.weight.is_present()
            || self.height.is_present()
            || self.is_married.is_present()
            || self.allergies.is_present()
            || self.contact_details.is_present())
    }

    fn merge_into(self, fields: &mut PatientFields) -> Result<(), ValidationError> {
        self.name.merge_required("name", &mut fields.name)?;
        self.email.merge_optional(&mut fields.email);
        self.age.merge_required("age", &mut fields.age)?;
        self.gender.merge_required("gender", &mut fields.gender)?;
        self.city.merge_required("city", &mut fields.city)?;
        self.weight.merge_required("weight", &mut fields.weight)?;
        self.height.merge_required("height", &mut fields.height)?;
        self.is_married.merge_required("is_married", &mut fields.is_married)?;
        self.allergies.merge_required("allergies", &mut fields.allergies)?;
        self.contact_details
            .merge_required("contact_details", &mut fields.contact_details)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_fields() -> PatientFields {
        PatientFields {
            name: "Vikram Patel".to_string(),
            email: Some("vikram.patel@gmail.com".to_string()),
            age: 30,
            gender: Gender::Male,
            city: "Mumbai".to_string(),
            weight: 70.0,
            height: 175.0,
            is_married: false,
            allergies: vec!["dust".to_string()],
            contact_details: BTreeMap::from([("phone".to_string(), "+91 9892775564".to_string())]),
        }
    }

    #[test]
    fn test_bmi_and_verdict() {
        let mut fields = sample_fields();
        fields.weight = 85.0;
        let patient = Patient::from_fields(fields.clone()).unwrap();
        assert_eq!(patient.bmi(), 27.76);
        assert_eq!(patient.verdict(), Verdict::Overweight);

        fields.weight = 60.0;
        let patient = Patient::from_fields(fields).unwrap();
        assert_eq!(patient.bmi(), 19.59);
        assert_eq!(patient.verdict(), Verdict::NormalWeight);
    }

    #[test]
    fn test_verdict_bucket_edges() {
        assert_eq!(Verdict::from_bmi(18.49), Verdict::Underweight);
        assert_eq!(Verdict::from_bmi(18.5), Verdict::NormalWeight);
        assert_eq!(Verdict::from_bmi(24.99), Verdict::NormalWeight);
        assert_eq!(Verdict::from_bmi(25.0), Verdict::Overweight);
        assert_eq!(Verdict::from_bmi(30.0), Verdict::Obese);

        // 100kg at 200cm is exactly 25.0
        let mut fields = sample_fields();
        fields.weight = 100.0;
        fields.height = 200.0;
        let patient = Patient::from_fields(fields).unwrap();
        assert_eq!(patient.bmi(), 25.0);
        assert_eq!(patient.verdict(), Verdict::Overweight);
    }

    #[test]
    fn test_emergency_contact_required_above_sixty() {
        let mut fields = sample_fields();
        fields.age = 60;
        assert!(Patient::from_fields(fields.clone()).is_ok());

        fields.age = 61;
        let err = Patient::from_fields(fields.clone()).unwrap_err();
        assert_eq!(err.field, "contact_details");

        fields
            .contact_details
            .insert(EMERGENCY_CONTACT_KEY.to_string(), "+91 9000000000".to_string());
        assert!(Patient::from_fields(fields).is_ok());
    }

    #[test]
    fn test_scalar_rules() {
        let cases: Vec<(&str, fn(&mut PatientFields))> = vec![
            ("age", |f: &mut PatientFields| f.age = 0),
            ("age", |f: &mut PatientFields| f.age = 120),
            ("height", |f: &mut PatientFields| f.height = -5.0),
            ("weight", |f: &mut PatientFields| f.weight = 0.0),
            ("weight", |f: &mut PatientFields| f.weight = f64::NAN),
            ("weight", |f: &mut PatientFields| {
                f.weight = 1e300;
                f.height = 1e-300;
            }),
            ("name", |f: &mut PatientFields| f.name = "Al".to_string()),
            ("city", |f: &mut PatientFields| f.city = "   ".to_string()),
            ("email", |f: &mut PatientFields| f.email = Some("someone@example.com".to_string())),
            ("email", |f: &mut PatientFields| f.email = Some("no-at-sign".to_string())),
        ];

        for (field, mutate) in cases {
            let mut fields = sample_fields();
            mutate(&mut fields);
            let err = Patient::from_fields(fields).unwrap_err();
            assert_eq!(err.field, field, "unexpected failure: {}", err);
        }
    }

    #[test]
    fn test_serialized_view_includes_derived_fields() {
        let patient = Patient::from_fields(sample_fields()).unwrap();
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["bmi"], 22.86);
        assert_eq!(json["verdict"], "Normal weight");
        assert_eq!(json["name"], "Vikram Patel");
    }

    #[test]
    fn test_derived_fields_are_not_accepted_as_input() {
        let mut json = serde_json::to_value(sample_fields()).unwrap();
        json["bmi"] = serde_json::json!(10.0);
        assert!(serde_json::from_value::<PatientFields>(json).is_err());
        assert!(serde_json::from_str::<PatientPatch>(r#"{"verdict": "Obese"}"#).is_err());
    }

    #[test]
    fn test_patch_presence() {
        let patch: PatientPatch = serde_json::from_str(r#"{"id": "P999"}"#).unwrap();
        assert!(patch.is_empty());
        assert_eq!(patch.claimed_id(), Some("P999"));

        let patch: PatientPatch = serde_json::from_str(r#"{"email": null}"#).unwrap();
        assert!(!patch.is_empty());
        let mut fields = sample_fields();
        patch.merge_into(&mut fields).unwrap();
        assert_eq!(fields.email, None);
    }

    #[test]
    fn test_unknown_gender_is_rejected_on_decode() {
        assert!(serde_json::from_str::<PatientPatch>(r#"{"gender": "Robot"}"#).is_err());
    }
}
