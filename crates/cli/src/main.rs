//! Command-line front end for fitscore.
//!
//! Usage:
//!     fitscore score --candidate profile.txt --requirement posting.txt
//!     fitscore rank --candidate profile.txt --records listings.json --min-score 40
//!     fitscore analyze --candidate profile.txt --requirement posting.txt --fetch
//!     fitscore catalog --catalog custom.json

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fitscore_backend_adzuna::{AdzunaConfig, AdzunaSource, OpportunitySource};
use fitscore_explain::{summarize_fit, AnalysisReport, Insights};
use fitscore_model::{OpportunityRecord, RankedOpportunity, GENERIC_ROLE};
use fitscore_rank::{rank_opportunities, RankConfig};
use fitscore_scoring::{score_with_breakdown, ScoreConfig};
use fitscore_taxonomy::Catalog;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "fitscore")]
#[command(about = "Score candidate profiles against requirements and rank opportunities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON catalog replacing the built-in skill and role tables
    #[arg(long = "catalog", global = true)]
    catalog_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a candidate profile against a requirement
    Score {
        /// Candidate profile text file
        #[arg(short, long)]
        candidate: PathBuf,

        /// Requirement text file
        #[arg(short, long)]
        requirement: PathBuf,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Show the parts the score was built from
        #[arg(long)]
        breakdown: bool,
    },

    /// Rank opportunity records against a candidate profile
    Rank {
        /// Candidate profile text file
        #[arg(short, long)]
        candidate: PathBuf,

        /// JSON array of opportunity records
        #[arg(long)]
        records: PathBuf,

        /// Minimum score to keep a record
        #[arg(long, default_value = "30")]
        min_score: u8,

        /// Maximum results
        #[arg(short, long, default_value = "10")]
        limit: usize,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Full analysis: score, improvement plan and recommended opportunities
    Analyze {
        /// Candidate profile text file
        #[arg(short, long)]
        candidate: PathBuf,

        /// Requirement text file
        #[arg(short, long)]
        requirement: PathBuf,

        /// Insight payload (free text containing a JSON object)
        #[arg(long)]
        insights: Option<PathBuf>,

        /// JSON array of opportunity records to recommend from
        #[arg(long, conflicts_with = "fetch")]
        records: Option<PathBuf>,

        /// Fetch opportunities from Adzuna for the candidate's role
        #[arg(long)]
        fetch: bool,

        #[arg(long, env = "ADZUNA_APP_ID", hide_env_values = true)]
        adzuna_app_id: Option<String>,

        #[arg(long, env = "ADZUNA_API_KEY", hide_env_values = true)]
        adzuna_app_key: Option<String>,

        /// Adzuna country code
        #[arg(long, default_value = "in")]
        country: String,
    },

    /// Validate the catalog and print its tables
    Catalog {
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fitscore=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let catalog = load_catalog(cli.catalog_file.as_deref())?;

    match cli.command {
        Commands::Score {
            candidate,
            requirement,
            format,
            breakdown,
        } => {
            run_score(&catalog, &candidate, &requirement, format, breakdown)?;
        }
        Commands::Rank {
            candidate,
            records,
            min_score,
            limit,
            format,
        } => {
            let config = RankConfig::default()
                .with_min_score(min_score)
                .with_limit(limit);
            run_rank(&catalog, &candidate, &records, &config, format)?;
        }
        Commands::Analyze {
            candidate,
            requirement,
            insights,
            records,
            fetch,
            adzuna_app_id,
            adzuna_app_key,
            country,
        } => {
            let source = if fetch {
                Some(AdzunaSource::new(AdzunaConfig {
                    app_id: adzuna_app_id,
                    app_key: adzuna_app_key,
                    country,
                    ..Default::default()
                })?)
            } else {
                None
            };
            let options = AnalyzeOptions {
                candidate: &candidate,
                requirement: &requirement,
                insights: insights.as_deref(),
                records: records.as_deref(),
                source: source.as_ref(),
            };
            run_analyze(&catalog, options).await?;
        }
        Commands::Catalog { format } => {
            run_catalog(&catalog, format)?;
        }
    }

    Ok(())
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let catalog = match path {
        Some(path) => Catalog::from_json_str(&read_text(path)?)
            .with_context(|| format!("invalid catalog {}", path.display()))?,
        None => Catalog::builtin().context("built-in catalog failed validation")?,
    };
    Ok(catalog)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn parse_records(json: &str) -> Result<Vec<OpportunityRecord>> {
    Ok(serde_json::from_str(json)?)
}

fn load_records(path: &Path) -> Result<Vec<OpportunityRecord>> {
    parse_records(&read_text(path)?)
        .with_context(|| format!("invalid opportunity records in {}", path.display()))
}

fn run_score(
    catalog: &Catalog,
    candidate: &Path,
    requirement: &Path,
    format: OutputFormat,
    show_breakdown: bool,
) -> Result<()> {
    let candidate_text = read_text(candidate)?;
    let requirement_text = read_text(requirement)?;

    let (result, breakdown) = score_with_breakdown(
        catalog,
        &candidate_text,
        &requirement_text,
        &ScoreConfig::default(),
    );

    match format {
        OutputFormat::Json if show_breakdown => {
            let value = serde_json::json!({ "result": result, "breakdown": breakdown });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            println!("{}", summarize_fit(&result));
            println!("Requirement role: {}", result.requirement_role);
            println!("Candidate role:   {}", result.candidate_role);
            println!("Matched: {}", display_list(&result.matched_skills));
            println!("Missing: {}", display_list(&result.missing_skills));

            if show_breakdown {
                println!("---");
                println!("Skills:       {:6.2}", breakdown.skill);
                println!("Keywords:     {:6.2}", breakdown.keyword);
                println!("Completeness: {:6.2}", breakdown.completeness);
                println!("Experience:   {:6.2}", breakdown.experience_bonus);
            }
        }
    }

    Ok(())
}

fn run_rank(
    catalog: &Catalog,
    candidate: &Path,
    records: &Path,
    config: &RankConfig,
    format: OutputFormat,
) -> Result<()> {
    let candidate_text = read_text(candidate)?;
    let records = load_records(records)?;

    let ranked = rank_opportunities(catalog, &candidate_text, &records, config);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ranked)?),
        OutputFormat::Text => print_ranked(&ranked, records.len()),
    }

    Ok(())
}

struct AnalyzeOptions<'a> {
    candidate: &'a Path,
    requirement: &'a Path,
    insights: Option<&'a Path>,
    records: Option<&'a Path>,
    source: Option<&'a AdzunaSource>,
}

async fn run_analyze(catalog: &Catalog, options: AnalyzeOptions<'_>) -> Result<()> {
    let candidate_text = read_text(options.candidate)?;
    let requirement_text = read_text(options.requirement)?;

    let (result, _) = score_with_breakdown(
        catalog,
        &candidate_text,
        &requirement_text,
        &ScoreConfig::default(),
    );

    let insights = match options.insights {
        Some(path) => Insights::parse(&read_text(path)?),
        None => Insights::default(),
    };

    let records = match (options.records, options.source) {
        (Some(path), _) => load_records(path)?,
        (None, Some(source)) => fetch_for_role(catalog, source, &result.candidate_role).await,
        (None, None) => Vec::new(),
    };

    let recommended = if records.is_empty() {
        Vec::new()
    } else {
        rank_opportunities(catalog, &candidate_text, &records, &RankConfig::default())
    };

    let report = AnalysisReport::assemble(result, insights, recommended);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Recommendations are best-effort: a failing source yields none.
async fn fetch_for_role<S: OpportunitySource>(
    catalog: &Catalog,
    source: &S,
    role: &str,
) -> Vec<OpportunityRecord> {
    if role == GENERIC_ROLE {
        tracing::info!("Candidate role is generic, skipping opportunity fetch");
        return Vec::new();
    }

    let query = catalog.role_query(role);
    match source.fetch(query).await {
        Ok(records) => {
            tracing::info!(
                source = source.name(),
                query,
                count = records.len(),
                "Fetched opportunities"
            );
            records
        }
        Err(e) => {
            tracing::warn!(source = source.name(), error = %e, "Opportunity fetch failed");
            Vec::new()
        }
    }
}

#[derive(Serialize)]
struct RoleSummary<'a> {
    id: &'a str,
    search_query: &'a str,
    expected_skills: Vec<&'a str>,
}

#[derive(Serialize)]
struct CatalogSummary<'a> {
    skills: Vec<&'a str>,
    roles: Vec<RoleSummary<'a>>,
    experience_signals: Vec<&'a str>,
}

fn summarize_catalog(catalog: &Catalog) -> CatalogSummary<'_> {
    CatalogSummary {
        skills: catalog.skill_names().collect(),
        roles: catalog
            .roles()
            .iter()
            .map(|role| RoleSummary {
                id: role.id(),
                search_query: role.search_query(),
                expected_skills: role.expected_skills().iter().map(String::as_str).collect(),
            })
            .collect(),
        experience_signals: catalog.experience_vocabulary().collect(),
    }
}

fn run_catalog(catalog: &Catalog, format: OutputFormat) -> Result<()> {
    let summary = summarize_catalog(catalog);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => {
            println!("Catalog OK");
            println!("Skills ({}): {}", summary.skills.len(), summary.skills.join(", "));
            println!("Roles (detection order):");
            for (i, role) in summary.roles.iter().enumerate() {
                println!(
                    "  {}. {} -> {} [query: {}]",
                    i + 1,
                    role.id,
                    role.expected_skills.join(", "),
                    role.search_query
                );
            }
            println!(
                "Experience signals ({}): {}",
                summary.experience_signals.len(),
                summary.experience_signals.join(", ")
            );
        }
    }

    Ok(())
}

fn print_ranked(ranked: &[RankedOpportunity], total: usize) {
    for (i, opportunity) in ranked.iter().enumerate() {
        println!("\n{}. {} ({})", i + 1, opportunity.title, opportunity.score);
        if !opportunity.company.is_empty() || !opportunity.location.is_empty() {
            println!("   {} | {}", opportunity.company, opportunity.location);
        }
        if !opportunity.url.is_empty() {
            println!("   {}", opportunity.url);
        }
    }

    println!("\n---");
    println!("Showing {} of {} records", ranked.len(), total);
}

fn display_list(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use fitscore_backend_adzuna::SourceError;

    struct FixedSource(Result<Vec<OpportunityRecord>, ()>);

    impl OpportunitySource for FixedSource {
        async fn fetch(&self, _query: &str) -> Result<Vec<OpportunityRecord>, SourceError> {
            self.0
                .clone()
                .map_err(|_| SourceError::RequestFailed("HTTP 503".to_string()))
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_records_tolerates_missing_fields() {
        let records = parse_records(r#"[{"title": "Analyst"}, {"description": null}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Analyst");
        assert_eq!(records[1].description, "");
        assert!(parse_records("{}").is_err());
    }

    #[test]
    fn test_catalog_summary() {
        let catalog = Catalog::builtin().unwrap();
        let summary = summarize_catalog(&catalog);
        assert_eq!(summary.roles[0].id, "data");
        assert_eq!(summary.roles[0].expected_skills, vec!["data analysis", "python", "sql"]);
    }

    #[tokio::test]
    async fn test_fetch_skips_generic_role() {
        let catalog = Catalog::builtin().unwrap();
        let source = FixedSource(Ok(vec![OpportunityRecord::new("Analyst", "")]));
        assert!(fetch_for_role(&catalog, &source, GENERIC_ROLE).await.is_empty());
        assert_eq!(fetch_for_role(&catalog, &source, "data").await.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_nothing() {
        let catalog = Catalog::builtin().unwrap();
        let source = FixedSource(Err(()));
        assert!(fetch_for_role(&catalog, &source, "support").await.is_empty());
    }
}
