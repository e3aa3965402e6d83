//! Core domain model for fitscore profile/requirement matching.
//!
//! This crate defines the value types shared by every other crate:
//! - `FitTier`: coarse classification of skill overlap
//! - `ScoreResult`: the outcome of scoring a candidate against a requirement
//! - `OpportunityRecord`: an externally supplied listing
//! - `RankedOpportunity`: a listing projected for presentation, with its score
//!
//! Field names on the serialized types are a stable contract with downstream
//! consumers; renaming any of them is a breaking change.

use serde::{Deserialize, Deserializer, Serialize};

/// Role id returned when no role can be detected or inferred.
pub const GENERIC_ROLE: &str = "generic";

/// Coarse fit classification of a candidate against a requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitTier {
    #[serde(rename = "Strong Fit")]
    Strong,
    #[serde(rename = "Partial Fit")]
    Partial,
    #[serde(rename = "Weak Fit")]
    Weak,
    /// The requirement yielded no skills to compare against
    #[default]
    #[serde(rename = "Unknown")]
    Unknown,
}

impl FitTier {
    /// Human-readable label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Strong => "Strong Fit",
            Self::Partial => "Partial Fit",
            Self::Weak => "Weak Fit",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for FitTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of scoring one candidate text against one requirement text.
///
/// Built fresh per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Overall compatibility score (0 - 100)
    pub ats_score: u8,

    /// Required skills found in the candidate text, sorted
    pub matched_skills: Vec<String>,

    /// Required skills absent from the candidate text, sorted
    pub missing_skills: Vec<String>,

    /// Role detected from the requirement text
    pub requirement_role: String,

    /// Role inferred from the candidate's skills
    pub candidate_role: String,

    /// Fit tier
    pub fit: FitTier,
}

impl ScoreResult {
    /// Every skill the requirement asked for, matched or not, sorted.
    pub fn required_skills(&self) -> Vec<String> {
        let mut all: Vec<String> = self
            .matched_skills
            .iter()
            .chain(self.missing_skills.iter())
            .cloned()
            .collect();
        all.sort();
        all
    }
}

/// An opportunity listing supplied by an external source.
///
/// Only `title` and `description` feed into scoring. Absent or null fields
/// deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpportunityRecord {
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,

    #[serde(default, deserialize_with = "nullable_string")]
    pub company: String,

    #[serde(default, deserialize_with = "nullable_string")]
    pub location: String,

    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,

    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
}

impl OpportunityRecord {
    /// Create a minimal record for testing.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// An opportunity projected for presentation, carrying its fit score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedOpportunity {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    /// Fit score against the candidate (0 - 100)
    pub score: u8,
}

impl RankedOpportunity {
    /// Project a record, dropping its description.
    pub fn from_record(record: &OpportunityRecord, score: u8) -> Self {
        Self {
            title: record.title.clone(),
            company: record.company.clone(),
            location: record.location.clone(),
            url: record.url.clone(),
            score,
        }
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
