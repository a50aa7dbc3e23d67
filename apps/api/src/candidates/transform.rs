//! Conversion between the wire representation of a candidate and the stored one.
//!
//! Skill sets arrive either as a JSON array or as text holding a JSON array,
//! and dates of birth arrive as `YYYY-MM-DD` text. Both are normalised here,
//! on create and on update alike, so the store only ever holds one shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::candidate::{CandidateFields, CandidatePatch, CandidateRecord};

const DOB_FORMAT: &str = "%Y-%m-%d";

/// A skill set as a client may send it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SkillSetInput {
    List(Vec<String>),
    Encoded(String),
}

impl SkillSetInput {
    pub fn normalize(self) -> Result<Vec<String>, AppError> {
        match self {
            SkillSetInput::List(skills) => Ok(skills),
            SkillSetInput::Encoded(raw) => parse_skill_set(&raw),
        }
    }
}

/// Parses text holding a JSON array of strings.
pub fn parse_skill_set(raw: &str) -> Result<Vec<String>, AppError> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|_| {
        AppError::Validation("Invalid skill_set format. Must be a JSON array.".to_string())
    })?;

    let serde_json::Value::Array(items) = value else {
        return Err(AppError::Validation(
            "skill_set must be a JSON array".to_string(),
        ));
    };

    items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::String(s) => Ok(s),
            other => Err(AppError::Validation(format!(
                "skill_set entries must be strings, got {other}"
            ))),
        })
        .collect()
}

pub fn parse_dob(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), DOB_FORMAT)
        .map_err(|_| AppError::Validation("Invalid date format. Use YYYY-MM-DD".to_string()))
}

fn parse_int(field: &str, raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("{field} must be an integer, got '{raw}'")))
}

fn require(field: &str, value: Option<String>) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("Missing required field '{field}'")))
}

/// Text fields of the create form, exactly as they were received.
#[derive(Debug, Clone, Default)]
pub struct CandidateForm {
    pub full_name: Option<String>,
    pub dob: Option<String>,
    pub contact_number: Option<String>,
    pub contact_address: Option<String>,
    pub education_qualification: Option<String>,
    pub graduation_year: Option<String>,
    pub years_of_experience: Option<String>,
    pub skill_set: Option<String>,
}

impl CandidateForm {
    /// Records a text field by name. Returns `false` for names the form does not know.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "full_name" => &mut self.full_name,
            "dob" => &mut self.dob,
            "contact_number" => &mut self.contact_number,
            "contact_address" => &mut self.contact_address,
            "education_qualification" => &mut self.education_qualification,
            "graduation_year" => &mut self.graduation_year,
            "years_of_experience" => &mut self.years_of_experience,
            "skill_set" => &mut self.skill_set,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    pub fn into_fields(self) -> Result<CandidateFields, AppError> {
        let skill_set = parse_skill_set(&require("skill_set", self.skill_set)?)?;
        let dob = parse_dob(&require("dob", self.dob)?)?;
        let graduation_year = parse_int(
            "graduation_year",
            &require("graduation_year", self.graduation_year)?,
        )?;
        let years_of_experience = parse_int(
            "years_of_experience",
            &require("years_of_experience", self.years_of_experience)?,
        )?;

        Ok(CandidateFields {
            full_name: require("full_name", self.full_name)?,
            dob,
            contact_number: require("contact_number", self.contact_number)?,
            contact_address: require("contact_address", self.contact_address)?,
            education_qualification: require(
                "education_qualification",
                self.education_qualification,
            )?,
            graduation_year,
            years_of_experience,
            skill_set,
        })
    }
}

/// JSON body of a partial update. Absent and `null` fields are both left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCandidateRequest {
    pub full_name: Option<String>,
    pub dob: Option<String>,
    pub contact_number: Option<String>,
    pub contact_address: Option<String>,
    pub education_qualification: Option<String>,
    pub graduation_year: Option<i32>,
    pub years_of_experience: Option<i32>,
    pub skill_set: Option<SkillSetInput>,
}

impl UpdateCandidateRequest {
    pub fn into_patch(self) -> Result<CandidatePatch, AppError> {
        Ok(CandidatePatch {
            full_name: self.full_name,
            dob: self.dob.as_deref().map(parse_dob).transpose()?,
            contact_number: self.contact_number,
            contact_address: self.contact_address,
            education_qualification: self.education_qualification,
            graduation_year: self.graduation_year,
            years_of_experience: self.years_of_experience,
            skill_set: self.skill_set.map(SkillSetInput::normalize).transpose()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateResponse {
    pub id: u64,
    pub full_name: String,
    pub dob: NaiveDate,
    pub contact_number: String,
    pub contact_address: String,
    pub education_qualification: String,
    pub graduation_year: i32,
    pub years_of_experience: i32,
    pub skill_set: Vec<String>,
    pub resume_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CandidateRecord> for CandidateResponse {
    fn from(record: CandidateRecord) -> Self {
        let CandidateRecord {
            id,
            fields,
            resume_path,
            created_at,
            updated_at,
        } = record;
        Self {
            id,
            full_name: fields.full_name,
            dob: fields.dob,
            contact_number: fields.contact_number,
            contact_address: fields.contact_address,
            education_qualification: fields.education_qualification,
            graduation_year: fields.graduation_year,
            years_of_experience: fields.years_of_experience,
            skill_set: fields.skill_set,
            resume_path,
            created_at,
            updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateListResponse {
    pub total: usize,
    pub candidates: Vec<CandidateResponse>,
}
