//! Skill taxonomy, role table and experience-signal vocabulary.
//!
//! A `Catalog` is built once at startup from a `CatalogDefinition` (the
//! built-in tables or a JSON file), validated, and then shared read-only.
//! It provides:
//! - Skill extraction against canonical skills and their synonyms
//! - Requirement role detection (first matching role in table order)
//! - Candidate role inference (largest expected-skill overlap)
//! - Experience-signal extraction

mod builtin;

use std::collections::{BTreeSet, HashSet};

use fitscore_features::{NormalizedText, Phrase};
use fitscore_model::GENERIC_ROLE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A set of canonical skill names, sorted.
pub type SkillSet = BTreeSet<String>;

/// A set of experience-signal keywords, sorted.
pub type SignalSet = BTreeSet<String>;

/// Catalog construction failures. These are fatal at startup.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Duplicate skill: {0}")]
    DuplicateSkill(String),

    #[error("Skill '{0}' has no synonyms")]
    NoSynonyms(String),

    #[error("Phrase '{phrase}' in {context} is empty after normalization")]
    EmptyPhrase { context: String, phrase: String },

    #[error("Duplicate role: {0}")]
    DuplicateRole(String),

    #[error("Role id '{0}' is reserved")]
    ReservedRole(String),

    #[error("Role '{role}' expects unknown skill '{skill}'")]
    UnknownSkill { role: String, skill: String },

    #[error("Invalid catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A canonical skill and the phrases that indicate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub name: String,
    pub synonyms: Vec<String>,
}

/// A role: how to detect it in requirement text and which skills it expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub id: String,
    pub keywords: Vec<String>,
    pub expected_skills: Vec<String>,

    /// Phrase used when searching external sources for this role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
}

/// Serialized form of a catalog. Array order is table order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDefinition {
    pub skills: Vec<SkillDefinition>,
    pub roles: Vec<RoleDefinition>,
    #[serde(default)]
    pub experience_signals: Vec<String>,
}

impl CatalogDefinition {
    /// The curated tables shipped with the crate.
    pub fn builtin() -> Self {
        builtin::definition()
    }
}

#[derive(Debug, Clone)]
struct Skill {
    name: String,
    name_phrase: Phrase,
    synonyms: Vec<Phrase>,
}

/// A validated role profile.
#[derive(Debug, Clone)]
pub struct Role {
    id: String,
    keywords: Vec<Phrase>,
    expected_skills: SkillSet,
    search_query: String,
}

impl Role {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn expected_skills(&self) -> &SkillSet {
        &self.expected_skills
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }
}

/// Validated, immutable matching tables.
#[derive(Debug, Clone)]
pub struct Catalog {
    skills: Vec<Skill>,
    roles: Vec<Role>,
    signals: Vec<Phrase>,
}

impl Catalog {
    /// Build the catalog from the built-in tables.
    pub fn builtin() -> Result<Self, TaxonomyError> {
        Self::from_definition(CatalogDefinition::builtin())
    }

    /// Parse and validate a JSON catalog.
    pub fn from_json_str(json: &str) -> Result<Self, TaxonomyError> {
        let definition: CatalogDefinition = serde_json::from_str(json)?;
        Self::from_definition(definition)
    }

    /// Validate a definition and pre-tokenize every phrase.
    pub fn from_definition(definition: CatalogDefinition) -> Result<Self, TaxonomyError> {
        let mut seen = HashSet::new();
        let mut skills = Vec::with_capacity(definition.skills.len());

        for def in definition.skills {
            if !seen.insert(def.name.clone()) {
                return Err(TaxonomyError::DuplicateSkill(def.name));
            }
            if def.synonyms.is_empty() {
                return Err(TaxonomyError::NoSynonyms(def.name));
            }

            let context = format!("skill '{}'", def.name);
            let name_phrase = compile(&def.name, &context)?;
            let synonyms = def
                .synonyms
                .iter()
                .map(|s| compile(s, &context))
                .collect::<Result<Vec<_>, _>>()?;

            skills.push(Skill {
                name: def.name,
                name_phrase,
                synonyms,
            });
        }

        let mut role_ids = HashSet::new();
        let mut roles = Vec::with_capacity(definition.roles.len());

        for def in definition.roles {
            if def.id == GENERIC_ROLE {
                return Err(TaxonomyError::ReservedRole(def.id));
            }
            if !role_ids.insert(def.id.clone()) {
                return Err(TaxonomyError::DuplicateRole(def.id));
            }
            if let Some(skill) = def.expected_skills.iter().find(|s| !seen.contains(*s)) {
                return Err(TaxonomyError::UnknownSkill {
                    role: def.id.clone(),
                    skill: skill.clone(),
                });
            }

            let context = format!("role '{}'", def.id);
            let keywords = def
                .keywords
                .iter()
                .map(|k| compile(k, &context))
                .collect::<Result<Vec<_>, _>>()?;

            roles.push(Role {
                search_query: def.search_query.unwrap_or_else(|| def.id.clone()),
                id: def.id,
                keywords,
                expected_skills: def.expected_skills.into_iter().collect(),
            });
        }

        let signals = definition
            .experience_signals
            .iter()
            .map(|s| compile(s, "experience signals"))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            skills = skills.len(),
            roles = roles.len(),
            signals = signals.len(),
            "Catalog loaded"
        );

        Ok(Self {
            skills,
            roles,
            signals,
        })
    }

    /// Canonical skill names in table order.
    pub fn skill_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.skills.iter().map(|s| s.name.as_str())
    }

    /// Roles in table order.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn role(&self, id: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    /// Experience-signal vocabulary in table order.
    pub fn experience_vocabulary(&self) -> impl Iterator<Item = &str> + '_ {
        self.signals.iter().map(Phrase::as_str)
    }

    /// Expected skills for a role; empty for "generic" or unknown roles.
    pub fn expected_skills(&self, role: &str) -> SkillSet {
        self.role(role)
            .map(|r| r.expected_skills.clone())
            .unwrap_or_default()
    }

    /// Search phrase for a role, falling back to the role id itself.
    pub fn role_query<'a>(&'a self, role: &'a str) -> &'a str {
        self.role(role).map(Role::search_query).unwrap_or(role)
    }

    /// Canonical skills with at least one synonym present as whole words.
    pub fn extract_skills(&self, text: &str) -> SkillSet {
        self.extract_skills_from(&NormalizedText::new(text))
    }

    pub fn extract_skills_from(&self, text: &NormalizedText) -> SkillSet {
        if text.is_empty() {
            return SkillSet::new();
        }

        self.skills
            .iter()
            .filter(|skill| skill.synonyms.iter().any(|p| text.contains_phrase(p)))
            .map(|skill| skill.name.clone())
            .collect()
    }

    /// Whether the skill's canonical name or any synonym appears in the text.
    pub fn mentions_skill(&self, text: &NormalizedText, skill: &str) -> bool {
        self.skills
            .iter()
            .find(|s| s.name == skill)
            .is_some_and(|s| {
                text.contains_phrase(&s.name_phrase)
                    || s.synonyms.iter().any(|p| text.contains_phrase(p))
            })
    }

    /// Experience-signal keywords present anywhere in the text.
    pub fn extract_experience_signals(&self, text: &str) -> SignalSet {
        self.extract_experience_signals_from(&NormalizedText::new(text))
    }

    pub fn extract_experience_signals_from(&self, text: &NormalizedText) -> SignalSet {
        self.signals
            .iter()
            .filter(|signal| text.contains_substring(signal))
            .map(|signal| signal.as_str().to_string())
            .collect()
    }

    /// First role, in table order, with any keyword present in the text.
    ///
    /// First-match rather than best-match: a posting mentioning both
    /// "analytics" and "incident" is a data role.
    pub fn detect_requirement_role(&self, text: &str) -> &str {
        self.detect_requirement_role_from(&NormalizedText::new(text))
    }

    pub fn detect_requirement_role_from(&self, text: &NormalizedText) -> &str {
        self.roles
            .iter()
            .find(|role| role.keywords.iter().any(|k| text.contains_substring(k)))
            .map(|role| role.id.as_str())
            .unwrap_or(GENERIC_ROLE)
    }

    /// Role whose expected skills overlap most with `skills`.
    ///
    /// Ties go to the earliest role in table order; no overlap at all
    /// yields "generic".
    pub fn infer_candidate_role(&self, skills: &SkillSet) -> &str {
        let mut best: Option<(&Role, usize)> = None;

        for role in &self.roles {
            let overlap = role.expected_skills.intersection(skills).count();
            if overlap > best.map_or(0, |(_, n)| n) {
                best = Some((role, overlap));
            }
        }

        best.map(|(role, _)| role.id.as_str()).unwrap_or(GENERIC_ROLE)
    }
}

fn compile(raw: &str, context: &str) -> Result<Phrase, TaxonomyError> {
    Phrase::new(raw).ok_or_else(|| TaxonomyError::EmptyPhrase {
        context: context.to_string(),
        phrase: raw.to_string(),
    })
}
