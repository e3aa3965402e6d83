//! Compatibility scoring of a candidate profile against a requirement.
//!
//! The overall score combines four parts:
//! - weighted skill overlap (up to 50)
//! - raw keyword overlap (up to 30)
//! - a completeness heuristic on profile length (10 or 20)
//! - an experience-signal bonus (up to 10)
//!
//! The sum is rounded and clamped to 0 - 100. A separate, unweighted skill
//! ratio drives the fit tier.

use fitscore_features::{word_count, NormalizedText};
use fitscore_model::{FitTier, ScoreResult};
use fitscore_taxonomy::{Catalog, SkillSet};
use serde::Serialize;

/// Weights and thresholds for compatibility scoring.
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Points for full weighted skill coverage
    pub skill_weight: f64,
    /// Points for full keyword coverage
    pub keyword_weight: f64,
    /// Weight of a skill stated in the requirement text
    pub stated_skill_weight: f64,
    /// Weight of a skill only implied by the requirement's role
    pub implied_skill_weight: f64,
    /// Completeness points for a detailed profile
    pub detailed_profile_points: f64,
    /// Completeness points otherwise
    pub brief_profile_points: f64,
    /// Word count at which a profile counts as detailed
    pub detailed_profile_words: usize,
    /// Bonus points per experience signal
    pub signal_points: f64,
    /// Cap on the experience bonus
    pub max_signal_bonus: f64,
    /// Minimum skill ratio for a strong fit
    pub strong_fit_ratio: f64,
    /// Minimum skill ratio for a partial fit
    pub partial_fit_ratio: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            skill_weight: 50.0,
            keyword_weight: 30.0,
            stated_skill_weight: 3.0,
            implied_skill_weight: 1.0,
            detailed_profile_points: 20.0,
            brief_profile_points: 10.0,
            detailed_profile_words: 300,
            signal_points: 2.0,
            max_signal_bonus: 10.0,
            strong_fit_ratio: 0.7,
            partial_fit_ratio: 0.4,
        }
    }
}

/// Unrounded parts of the overall score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub skill: f64,
    pub keyword: f64,
    pub completeness: f64,
    pub experience_bonus: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.skill + self.keyword + self.completeness + self.experience_bonus
    }

    /// Rounded half away from zero, clamped to 0 - 100.
    pub fn overall(&self) -> u8 {
        self.total().round().clamp(0.0, 100.0) as u8
    }
}

/// Score a candidate text against a requirement text.
pub fn score_compatibility(
    catalog: &Catalog,
    candidate_text: &str,
    requirement_text: &str,
    config: &ScoreConfig,
) -> ScoreResult {
    score_with_breakdown(catalog, candidate_text, requirement_text, config).0
}

/// Score and also return the parts the overall score was built from.
pub fn score_with_breakdown(
    catalog: &Catalog,
    candidate_text: &str,
    requirement_text: &str,
    config: &ScoreConfig,
) -> (ScoreResult, ScoreBreakdown) {
    let candidate = NormalizedText::new(candidate_text);
    let requirement = NormalizedText::new(requirement_text);

    let candidate_skills = catalog.extract_skills_from(&candidate);
    let stated_skills = catalog.extract_skills_from(&requirement);

    let requirement_role = catalog.detect_requirement_role_from(&requirement);
    let candidate_role = catalog.infer_candidate_role(&candidate_skills);

    // Role augmentation guarantees a skill target for terse requirements.
    let mut required_skills = stated_skills.clone();
    required_skills.extend(catalog.expected_skills(requirement_role));

    let matched: SkillSet = required_skills
        .intersection(&candidate_skills)
        .cloned()
        .collect();
    let missing: SkillSet = required_skills
        .difference(&candidate_skills)
        .cloned()
        .collect();

    let weight_of = |skill: &str| {
        if stated_skills.contains(skill) || catalog.mentions_skill(&requirement, skill) {
            config.stated_skill_weight
        } else {
            config.implied_skill_weight
        }
    };
    let required_weight: f64 = required_skills.iter().map(|s| weight_of(s.as_str())).sum();
    let matched_weight: f64 = matched.iter().map(|s| weight_of(s.as_str())).sum();

    let candidate_words = candidate.word_set();
    let requirement_words = requirement.word_set();
    let common_words = requirement_words
        .iter()
        .filter(|w| candidate_words.contains(*w))
        .count();

    let signals = catalog.extract_experience_signals_from(&candidate);

    let breakdown = ScoreBreakdown {
        skill: config.skill_weight * matched_weight / required_weight.max(1.0),
        keyword: config.keyword_weight * common_words as f64
            / requirement_words.len().max(1) as f64,
        completeness: if word_count(candidate_text) >= config.detailed_profile_words {
            config.detailed_profile_points
        } else {
            config.brief_profile_points
        },
        experience_bonus: (config.signal_points * signals.len() as f64)
            .min(config.max_signal_bonus),
    };

    let fit = classify_fit(matched.len(), required_skills.len(), config);

    tracing::debug!(
        skill = breakdown.skill,
        keyword = breakdown.keyword,
        completeness = breakdown.completeness,
        experience_bonus = breakdown.experience_bonus,
        requirement_role,
        candidate_role,
        fit = %fit,
        "Compatibility scored"
    );

    let result = ScoreResult {
        ats_score: breakdown.overall(),
        matched_skills: matched.into_iter().collect(),
        missing_skills: missing.into_iter().collect(),
        requirement_role: requirement_role.to_string(),
        candidate_role: candidate_role.to_string(),
        fit,
    };

    (result, breakdown)
}

/// Fit tier from matched/required skill counts.
pub fn classify_fit(matched: usize, required: usize, config: &ScoreConfig) -> FitTier {
    if required == 0 {
        return FitTier::Unknown;
    }
    fit_for_ratio(matched as f64 / required as f64, config)
}

/// Fit tier for a skill ratio. Thresholds are inclusive.
pub fn fit_for_ratio(ratio: f64, config: &ScoreConfig) -> FitTier {
    if ratio >= config.strong_fit_ratio {
        FitTier::Strong
    } else if ratio >= config.partial_fit_ratio {
        FitTier::Partial
    } else {
        FitTier::Weak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ANALYST_POSTING: &str = "Looking for a Data Analyst with SQL and Python";
    const ANALYST_PROFILE: &str = "Python, SQL, built dashboards, handled escalations daily";

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    fn score(candidate: &str, requirement: &str) -> ScoreResult {
        score_compatibility(&catalog(), candidate, requirement, &ScoreConfig::default())
    }

    #[test]
    fn test_analyst_example() {
        let (result, breakdown) = score_with_breakdown(
            &catalog(),
            ANALYST_PROFILE,
            ANALYST_POSTING,
            &ScoreConfig::default(),
        );

        assert_eq!(result.requirement_role, "data");
        assert_eq!(result.candidate_role, "data");
        assert_eq!(result.matched_skills, vec!["python", "sql"]);
        assert_eq!(result.missing_skills, vec!["data analysis"]);
        assert_eq!(result.fit, FitTier::Partial);

        // python and sql are stated (3 each), data analysis is implied (1)
        assert!((breakdown.skill - 50.0 * 6.0 / 7.0).abs() < 1e-9);
        assert!((breakdown.keyword - 30.0 * 2.0 / 9.0).abs() < 1e-9);
        assert_eq!(breakdown.completeness, 10.0);
        // "escalation" and "dashboard"
        assert_eq!(breakdown.experience_bonus, 4.0);
        assert_eq!(result.ats_score, 64);
    }

    #[test]
    fn test_empty_candidate() {
        let result = score("", ANALYST_POSTING);
        assert_eq!(result.ats_score, 10);
        assert!(result.matched_skills.is_empty());
        assert_eq!(result.missing_skills, vec!["data analysis", "python", "sql"]);
        assert_eq!(result.candidate_role, "generic");
        assert_eq!(result.fit, FitTier::Weak);
    }

    #[test]
    fn test_empty_requirement_is_unknown() {
        let result = score(ANALYST_PROFILE, "");
        assert_eq!(result.fit, FitTier::Unknown);
        assert_eq!(result.requirement_role, "generic");
        assert!(result.matched_skills.is_empty());
        assert!(result.missing_skills.is_empty());
        assert_eq!(result.ats_score, 14);

        let both_empty = score("", "");
        assert_eq!(both_empty.ats_score, 10);
        assert_eq!(both_empty.fit, FitTier::Unknown);
    }

    #[test]
    fn test_requirement_role_survives_line_breaks() {
        let result = score("zendesk", "Technical\nSupport engineer");
        assert_eq!(result.requirement_role, "support");
        assert_eq!(result.candidate_role, "support");
        assert_eq!(result.matched_skills, vec!["ticketing systems".to_string()]);
        assert_eq!(result.missing_skills.len(), 4);
        assert_eq!(result.fit, FitTier::Weak);
    }

    #[test]
    fn test_matched_and_missing_partition_required_skills() {
        let catalog = catalog();
        let cases = [
            (ANALYST_PROFILE, ANALYST_POSTING),
            ("Salesforce and prospecting", "Account Executive, HubSpot CRM"),
            ("Zendesk, SLA tracking", "Customer support lead, service desk"),
            ("SEO copywriting", "Product owner with a roadmap"),
        ];

        for (candidate, requirement) in cases {
            let result =
                score_compatibility(&catalog, candidate, requirement, &ScoreConfig::default());

            let mut required = catalog.extract_skills(requirement);
            required.extend(catalog.expected_skills(&result.requirement_role));

            let matched: SkillSet = result.matched_skills.iter().cloned().collect();
            let missing: SkillSet = result.missing_skills.iter().cloned().collect();
            assert!(matched.is_disjoint(&missing));
            assert_eq!(matched.union(&missing).cloned().collect::<SkillSet>(), required);
        }
    }

    #[test]
    fn test_adding_missing_skill_never_decreases_score() {
        let before = score(ANALYST_PROFILE, ANALYST_POSTING);
        let after = score(&format!("{ANALYST_PROFILE}, data analysis"), ANALYST_POSTING);

        assert!(after.ats_score >= before.ats_score);
        assert!(after.missing_skills.is_empty());
        assert_eq!(after.fit, FitTier::Strong);
    }

    #[test]
    fn test_score_is_idempotent() {
        assert_eq!(
            score(ANALYST_PROFILE, ANALYST_POSTING),
            score(ANALYST_PROFILE, ANALYST_POSTING)
        );
    }

    #[test]
    fn test_score_is_clamped() {
        let requirement = "Customer support with Zendesk, SLA, escalation and incident handling";
        let signals = catalog().experience_vocabulary().collect::<Vec<_>>().join(", ");
        let filler = "word ".repeat(300);
        let candidate = format!("{requirement}. {signals}. {filler}");

        let (result, breakdown) =
            score_with_breakdown(&catalog(), &candidate, requirement, &ScoreConfig::default());
        assert!(breakdown.total() > 100.0);
        assert_eq!(result.ats_score, 100);
        assert_eq!(result.fit, FitTier::Strong);
    }

    #[test]
    fn test_stated_skills_outweigh_implied() {
        let requirement = "Customer support role using Zendesk";
        let config = ScoreConfig::default();

        let (_, stated) =
            score_with_breakdown(&catalog(), "customer service, zendesk", requirement, &config);
        let (_, implied) =
            score_with_breakdown(&catalog(), "incident, sla, escalation", requirement, &config);

        assert!((stated.skill - 50.0 * 6.0 / 9.0).abs() < 1e-9);
        assert!((implied.skill - 50.0 * 3.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_boundaries() {
        let config = ScoreConfig::default();
        assert_eq!(fit_for_ratio(0.7, &config), FitTier::Strong);
        assert_eq!(fit_for_ratio(0.69999, &config), FitTier::Partial);
        assert_eq!(fit_for_ratio(0.4, &config), FitTier::Partial);
        assert_eq!(fit_for_ratio(0.39999, &config), FitTier::Weak);
        assert_eq!(classify_fit(7, 10, &config), FitTier::Strong);
        assert_eq!(classify_fit(0, 0, &config), FitTier::Unknown);
    }
}
