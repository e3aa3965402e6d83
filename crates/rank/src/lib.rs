//! Ranking of opportunity records against a candidate profile.
//!
//! Each record is scored independently from its description and title,
//! then records are sorted by score with a minimum-score filter that never
//! leaves the caller empty-handed.

use fitscore_features::NormalizedText;
use fitscore_model::{OpportunityRecord, RankedOpportunity};
use fitscore_taxonomy::{Catalog, SignalSet, SkillSet};

/// Configuration for the ranker.
#[derive(Debug, Clone)]
pub struct RankConfig {
    /// Weight for experience-signal overlap
    pub experience_weight: f64,
    /// Weight for skill overlap
    pub skill_weight: f64,
    /// Flat bonus when the title mentions a candidate experience signal
    pub title_bonus: f64,
    /// Records scoring below this are dropped, unless all of them do
    pub min_score: u8,
    /// Maximum records returned
    pub limit: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            experience_weight: 0.5,
            skill_weight: 0.3,
            title_bonus: 0.2,
            min_score: 30,
            limit: 10,
        }
    }
}

impl RankConfig {
    pub fn with_min_score(mut self, min_score: u8) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// What the ranker needs from the candidate text, extracted once.
#[derive(Debug, Clone, Default)]
pub struct CandidateProfile {
    pub skills: SkillSet,
    pub signals: SignalSet,
}

impl CandidateProfile {
    pub fn extract(catalog: &Catalog, candidate_text: &str) -> Self {
        let text = NormalizedText::new(candidate_text);
        Self {
            skills: catalog.extract_skills_from(&text),
            signals: catalog.extract_experience_signals_from(&text),
        }
    }
}

/// Score one record against a candidate text (0 - 100).
pub fn score_opportunity(
    catalog: &Catalog,
    candidate_text: &str,
    record: &OpportunityRecord,
    config: &RankConfig,
) -> u8 {
    let profile = CandidateProfile::extract(catalog, candidate_text);
    score_against_profile(catalog, &profile, record, config)
}

/// Score one record against an already extracted candidate profile.
pub fn score_against_profile(
    catalog: &Catalog,
    profile: &CandidateProfile,
    record: &OpportunityRecord,
    config: &RankConfig,
) -> u8 {
    let description = NormalizedText::new(&record.description);
    let record_skills = catalog.extract_skills_from(&description);
    let record_signals = catalog.extract_experience_signals_from(&description);

    let experience = overlap_ratio(&profile.signals, &record_signals);
    let skills = overlap_ratio(&profile.skills, &record_skills);

    let title = record.title.to_lowercase();
    let title_score = if profile.signals.iter().any(|s| title.contains(s.as_str())) {
        config.title_bonus
    } else {
        0.0
    };

    let score = 100.0
        * (config.experience_weight * experience + config.skill_weight * skills + title_score);

    score.round().clamp(0.0, 100.0) as u8
}

/// `|ours ∩ theirs| / max(|theirs|, 1)`
fn overlap_ratio(ours: &SkillSet, theirs: &SkillSet) -> f64 {
    ours.intersection(theirs).count() as f64 / theirs.len().max(1) as f64
}

/// Score, sort and filter records for a candidate.
///
/// Sorting is stable, so equal scores keep input order. Records below
/// `min_score` are dropped; if that would drop everything, the top of the
/// unfiltered list is returned instead.
pub fn rank_opportunities(
    catalog: &Catalog,
    candidate_text: &str,
    records: &[OpportunityRecord],
    config: &RankConfig,
) -> Vec<RankedOpportunity> {
    let profile = CandidateProfile::extract(catalog, candidate_text);

    let mut ranked: Vec<RankedOpportunity> = records
        .iter()
        .map(|record| {
            let score = score_against_profile(catalog, &profile, record, config);
            RankedOpportunity::from_record(record, score)
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    let qualifying = ranked
        .iter()
        .take_while(|r| r.score >= config.min_score)
        .count();

    tracing::debug!(
        total = ranked.len(),
        qualifying,
        min_score = config.min_score,
        "Opportunities ranked"
    );

    if qualifying > 0 {
        ranked.truncate(qualifying.min(config.limit));
    } else {
        ranked.truncate(config.limit);
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PROFILE: &str =
        "Handled incident escalation, SLA tracking, built dashboards in Python and SQL";

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    fn support_record() -> OpportunityRecord {
        OpportunityRecord::new(
            "Support Engineer - Incident Response",
            "Own incident escalation and SLA reporting using Zendesk",
        )
        .with_company("Acme")
        .with_url("https://jobs.example/support")
    }

    fn analyst_record() -> OpportunityRecord {
        OpportunityRecord::new("Data Analyst", "Python and SQL dashboards")
            .with_company("Globex")
    }

    fn marketing_record() -> OpportunityRecord {
        OpportunityRecord::new("Marketing Associate", "SEO and copywriting")
    }

    #[test]
    fn test_score_opportunity() {
        let catalog = catalog();
        let config = RankConfig::default();

        // experience 3/4, skills 3/4, title mentions "incident"
        assert_eq!(score_opportunity(&catalog, PROFILE, &support_record(), &config), 80);
        // experience 1/1, skills 2/2, no title bonus
        assert_eq!(score_opportunity(&catalog, PROFILE, &analyst_record(), &config), 80);
        assert_eq!(score_opportunity(&catalog, PROFILE, &marketing_record(), &config), 0);
    }

    #[test]
    fn test_missing_fields_score_zero() {
        let record = OpportunityRecord::default();
        assert_eq!(
            score_opportunity(&catalog(), PROFILE, &record, &RankConfig::default()),
            0
        );
    }

    #[test]
    fn test_rank_sorted_and_stable() {
        let records = vec![marketing_record(), support_record(), analyst_record()];
        let ranked = rank_opportunities(&catalog(), PROFILE, &records, &RankConfig::default());

        let titles: Vec<&str> = ranked.iter().map(|r| r.title.as_str()).collect();
        // ties keep input order; the marketing record falls below min_score
        assert_eq!(titles, vec!["Support Engineer - Incident Response", "Data Analyst"]);
        assert_eq!(ranked[0].company, "Acme");
        assert_eq!(ranked[0].url, "https://jobs.example/support");
    }

    #[test]
    fn test_rank_falls_back_when_nothing_qualifies() {
        let records = vec![marketing_record(), OpportunityRecord::new("Chef", "Cooking")];
        let ranked = rank_opportunities(&catalog(), PROFILE, &records, &RankConfig::default());

        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| r.score == 0));
        assert_eq!(ranked[0].title, "Marketing Associate");
    }

    #[test]
    fn test_rank_limit() {
        let records: Vec<OpportunityRecord> = (0..15)
            .map(|i| support_record().with_url(format!("https://jobs.example/{i}")))
            .collect();
        let ranked = rank_opportunities(&catalog(), PROFILE, &records, &RankConfig::default());

        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].url, "https://jobs.example/0");
        assert_eq!(ranked[9].url, "https://jobs.example/9");

        let narrow = RankConfig::default().with_limit(3);
        assert_eq!(rank_opportunities(&catalog(), PROFILE, &records, &narrow).len(), 3);
    }

    #[test]
    fn test_rank_never_empty_for_non_empty_input() {
        let records = vec![OpportunityRecord::default()];
        let config = RankConfig::default().with_min_score(100);
        assert_eq!(rank_opportunities(&catalog(), "", &records, &config).len(), 1);
        assert!(rank_opportunities(&catalog(), PROFILE, &[], &config).is_empty());
    }

    #[test]
    fn test_rank_is_descending() {
        let records = vec![
            marketing_record(),
            analyst_record(),
            OpportunityRecord::new("Ops Analyst", "Reporting and automation, Excel"),
            support_record(),
        ];
        let config = RankConfig::default().with_min_score(0);
        let ranked = rank_opportunities(&catalog(), PROFILE, &records, &config);

        assert_eq!(ranked.len(), 4);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
