//! Explanation and improvement planning on top of a score.
//!
//! Merges qualitative insights produced elsewhere (strengths and suggested
//! improvements, delivered as loosely structured JSON) with the rule-based
//! `ScoreResult`. When no usable improvements are supplied, a plan is derived
//! from the missing skills so callers always get something actionable.

use fitscore_model::{FitTier, RankedOpportunity, ScoreResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Fallback improvements derived from missing skills are capped at this.
pub const MAX_SKILL_GAP_IMPROVEMENTS: usize = 5;

/// Priority, impact or effort rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    High,
    Medium,
    Low,
}

impl Level {
    /// Parse case-insensitively, falling back to `default` for anything else.
    pub fn parse_or(value: Option<&str>, default: Level) -> Level {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("high") => Self::High,
            Some("medium") => Self::Medium,
            Some("low") => Self::Low,
            _ => default,
        }
    }
}

/// Whether closing a gap means editing the profile or acquiring experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GapType {
    #[serde(rename = "Resume Fix")]
    ResumeFix,
    #[serde(rename = "Career Gap")]
    CareerGap,
}

impl GapType {
    /// Only high-effort, high-impact gaps are career gaps.
    pub fn classify(effort: Level, impact: Level) -> Self {
        if effort == Level::High && impact == Level::High {
            Self::CareerGap
        } else {
            Self::ResumeFix
        }
    }
}

/// Where an improvement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImprovementSource {
    /// Supplied by an external insight generator
    #[serde(rename = "ai")]
    Insight,
    /// Derived from a missing skill
    #[serde(rename = "skill_gap")]
    SkillGap,
}

/// A strength noted by the insight generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Strength {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub evidence: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub why_it_matters: String,
}

/// An improvement as delivered by the insight generator, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImprovement {
    #[serde(default, deserialize_with = "lenient_option")]
    pub area: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub expected_impact: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub effort: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub why_missing: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub how_to_fix: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub example_bullet: String,
}

/// Qualitative insights for one candidate/requirement pair.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Insights {
    #[serde(default)]
    pub strengths: Vec<Strength>,
    #[serde(default)]
    pub improvements: Vec<RawImprovement>,
}

impl Insights {
    /// Parse insights out of free text.
    ///
    /// The first balanced JSON object in the text is used. Anything that
    /// does not parse yields empty insights.
    pub fn parse(text: &str) -> Self {
        let Some(json) = extract_json_object(text) else {
            tracing::warn!("No JSON object found in insight payload");
            return Self::default();
        };

        match serde_json::from_str(&json) {
            Ok(insights) => insights,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unparseable insight payload");
                Self::default()
            }
        }
    }
}

/// A normalized, actionable improvement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    pub area: String,
    pub priority: Level,
    pub expected_impact: Level,
    pub effort: Level,
    pub gap_type: GapType,
    pub why_missing: String,
    pub how_to_fix: String,
    pub example_bullet: String,
    pub source: ImprovementSource,
}

impl Improvement {
    fn from_raw(raw: &RawImprovement) -> Self {
        let priority = Level::parse_or(raw.priority.as_deref(), Level::Medium);
        let effort = Level::parse_or(raw.effort.as_deref(), Level::Medium);
        let impact = Level::parse_or(raw.expected_impact.as_deref(), Level::Medium);

        Self {
            area: raw
                .area
                .clone()
                .unwrap_or_else(|| "General improvement".to_string()),
            priority,
            expected_impact: impact,
            effort,
            gap_type: GapType::classify(effort, impact),
            why_missing: raw.why_missing.clone(),
            how_to_fix: raw.how_to_fix.clone(),
            example_bullet: raw.example_bullet.clone(),
            source: ImprovementSource::Insight,
        }
    }

    fn for_missing_skill(skill: &str) -> Self {
        Self {
            area: format!("Add {} to resume", skill),
            priority: Level::High,
            expected_impact: Level::High,
            effort: Level::Medium,
            gap_type: GapType::ResumeFix,
            why_missing: format!("{} is required but not found in resume", skill),
            how_to_fix: format!("Add a bullet showing hands-on use of {}", skill),
            example_bullet: String::new(),
            source: ImprovementSource::SkillGap,
        }
    }
}

/// Counts over an improvement plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementStats {
    pub total: usize,
    pub resume_fixes: usize,
    pub career_gaps: usize,
    pub high_priority: usize,
    /// High priority and low effort
    pub quick_wins: usize,
}

impl ImprovementStats {
    pub fn from_improvements(improvements: &[Improvement]) -> Self {
        let count = |pred: &dyn Fn(&Improvement) -> bool| {
            improvements.iter().filter(|i| pred(i)).count()
        };

        Self {
            total: improvements.len(),
            resume_fixes: count(&|i| i.gap_type == GapType::ResumeFix),
            career_gaps: count(&|i| i.gap_type == GapType::CareerGap),
            high_priority: count(&|i| i.priority == Level::High),
            quick_wins: count(&|i| i.priority == Level::High && i.effort == Level::Low),
        }
    }
}

/// Build the improvement plan: supplied insights first, missing skills as fallback.
pub fn build_improvements(result: &ScoreResult, insights: &Insights) -> Vec<Improvement> {
    let supplied: Vec<Improvement> = insights
        .improvements
        .iter()
        .map(Improvement::from_raw)
        .collect();

    if !supplied.is_empty() {
        return supplied;
    }

    result
        .missing_skills
        .iter()
        .take(MAX_SKILL_GAP_IMPROVEMENTS)
        .map(|skill| Improvement::for_missing_skill(skill))
        .collect()
}

/// Everything a presentation layer needs for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub score: ScoreResult,
    pub strengths: Vec<Strength>,
    pub improvements: Vec<Improvement>,
    pub improvement_stats: ImprovementStats,
    pub recommended_opportunities: Vec<RankedOpportunity>,
}

impl AnalysisReport {
    pub fn assemble(
        score: ScoreResult,
        insights: Insights,
        recommended_opportunities: Vec<RankedOpportunity>,
    ) -> Self {
        let improvements = build_improvements(&score, &insights);
        let improvement_stats = ImprovementStats::from_improvements(&improvements);

        Self {
            score,
            strengths: insights.strengths,
            improvements,
            improvement_stats,
            recommended_opportunities,
        }
    }
}

/// One-line summary of a score for terminal output.
pub fn summarize_fit(result: &ScoreResult) -> String {
    if result.fit == FitTier::Unknown {
        return format!(
            "UNKNOWN FIT: no recognizable skills in the requirement (score {}/100)",
            result.ats_score
        );
    }

    let required = result.matched_skills.len() + result.missing_skills.len();
    let mut summary = format!(
        "{}: {}/{} required skills matched, score {}/100 ({} role)",
        result.fit.label().to_uppercase(),
        result.matched_skills.len(),
        required,
        result.ats_score,
        result.requirement_role
    );

    if !result.missing_skills.is_empty() {
        summary.push_str(&format!(" - missing {}", result.missing_skills.join(", ")));
    }

    summary
}

/// Extract the first balanced `{...}` object from free text.
///
/// Markdown fence lines are dropped first; braces inside JSON strings are
/// ignored when balancing.
pub fn extract_json_object(text: &str) -> Option<String> {
    let cleaned: String = text
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in cleaned.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|s| cleaned[s..=i].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

fn lenient_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_option(deserializer)?.unwrap_or_default())
}
