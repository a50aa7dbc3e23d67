use chrono::{DateTime, NaiveDate, Utc};

/// Caller-supplied attributes of a candidate, already coerced to their stored types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFields {
    pub full_name: String,
    pub dob: NaiveDate,
    pub contact_number: String,
    pub contact_address: String,
    pub education_qualification: String,
    pub graduation_year: i32,
    pub years_of_experience: i32,
    pub skill_set: Vec<String>,
}

/// A partial update. `None` means "leave the stored value untouched".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePatch {
    pub full_name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub contact_number: Option<String>,
    pub contact_address: Option<String>,
    pub education_qualification: Option<String>,
    pub graduation_year: Option<i32>,
    pub years_of_experience: Option<i32>,
    pub skill_set: Option<Vec<String>>,
}

impl CandidatePatch {
    /// Merges every set field into `fields`, leaving the rest as they were.
    pub fn apply_to(self, fields: &mut CandidateFields) {
        if let Some(v) = self.full_name {
            fields.full_name = v;
        }
        if let Some(v) = self.dob {
            fields.dob = v;
        }
        if let Some(v) = self.contact_number {
            fields.contact_number = v;
        }
        if let Some(v) = self.contact_address {
            fields.contact_address = v;
        }
        if let Some(v) = self.education_qualification {
            fields.education_qualification = v;
        }
        if let Some(v) = self.graduation_year {
            fields.graduation_year = v;
        }
        if let Some(v) = self.years_of_experience {
            fields.years_of_experience = v;
        }
        if let Some(v) = self.skill_set {
            fields.skill_set = v;
        }
    }
}

/// A stored candidate: the caller's fields plus system-assigned metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    pub id: u64,
    pub fields: CandidateFields,
    pub resume_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
