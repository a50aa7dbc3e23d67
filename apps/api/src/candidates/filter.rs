use crate::models::candidate::CandidateRecord;

/// Optional predicates over candidate records, AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFilter {
    /// Case-insensitive substring of any skill. An empty string means unset.
    pub skill: Option<String>,
    /// Inclusive lower bound on years of experience.
    pub min_experience: Option<i32>,
    /// Exact graduation year.
    pub graduation_year: Option<i32>,
}

impl CandidateFilter {
    /// Narrows `records` one predicate at a time, preserving their order.
    pub fn apply(&self, mut records: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
        if let Some(needle) = self.skill.as_deref().filter(|s| !s.is_empty()) {
            let needle = needle.to_lowercase();
            records.retain(|r| has_skill_containing(&r.fields.skill_set, &needle));
        }
        if let Some(min) = self.min_experience {
            records.retain(|r| r.fields.years_of_experience >= min);
        }
        if let Some(year) = self.graduation_year {
            records.retain(|r| r.fields.graduation_year == year);
        }
        records
    }
}

/// `needle` must already be lowercase.
fn has_skill_containing(skills: &[String], needle: &str) -> bool {
    skills.iter().any(|s| s.to_lowercase().contains(needle))
}
