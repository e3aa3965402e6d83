//! Built-in curated tables.

use crate::{CatalogDefinition, RoleDefinition, SkillDefinition};

const SKILLS: &[(&str, &[&str])] = &[
    // Data / tech
    ("python", &["python", "pandas", "numpy"]),
    ("sql", &["sql", "mysql", "postgres", "sqlite"]),
    ("machine learning", &["machine learning", "ml"]),
    ("data analysis", &["data analysis", "analytics"]),
    ("excel", &["excel", "spreadsheets"]),
    ("power bi", &["power bi", "powerbi"]),
    ("tableau", &["tableau"]),
    ("aws", &["aws", "ec2", "s3"]),
    ("gcp", &["gcp", "bigquery"]),
    // Marketing
    ("seo", &["seo", "search engine optimization"]),
    ("content marketing", &["content marketing", "copywriting"]),
    ("google ads", &["google ads", "ppc", "adwords"]),
    // Sales
    ("crm", &["crm", "salesforce", "hubspot"]),
    ("lead generation", &["lead generation", "prospecting"]),
    ("negotiation", &["negotiation", "closing deals"]),
    // Product
    ("product management", &["product management", "product owner"]),
    ("roadmapping", &["roadmap", "roadmapping"]),
    // Support
    ("customer support", &["customer support", "customer service"]),
    ("incident management", &["incident", "major incident"]),
    ("ticketing systems", &["zendesk", "servicenow", "freshdesk", "jira"]),
    ("sla management", &["sla", "service level agreement"]),
    ("escalation handling", &["escalation", "escalation management"]),
    // Soft
    ("communication", &["communication", "presentation"]),
    ("leadership", &["leadership", "team management"]),
    ("problem solving", &["problem solving"]),
];

// Order matters: requirement role detection is first-match.
const ROLES: &[(&str, &[&str], &[&str], &str)] = &[
    (
        "data",
        &["data analyst", "analytics", "business intelligence"],
        &["python", "sql", "data analysis"],
        "data analyst",
    ),
    (
        "marketing",
        &["marketing", "digital marketing", "seo"],
        &["seo", "content marketing", "google ads"],
        "digital marketing",
    ),
    (
        "sales",
        &["sales", "business development", "account executive"],
        &["crm", "lead generation", "negotiation"],
        "business development",
    ),
    (
        "product",
        &["product manager", "product owner"],
        &["product management", "roadmapping"],
        "product manager",
    ),
    (
        "support",
        &[
            "customer support",
            "service desk",
            "technical support",
            "incident",
            "escalation",
            "operations support",
        ],
        &[
            "customer support",
            "incident management",
            "ticketing systems",
            "sla management",
            "escalation handling",
        ],
        "technical support engineer",
    ),
];

const EXPERIENCE_SIGNALS: &[&str] = &[
    "incident",
    "escalation",
    "sla",
    "ticket",
    "dashboard",
    "reporting",
    "analysis",
    "automation",
    "root cause",
    "monitoring",
    "client handling",
    "stakeholder",
    "operations",
    "troubleshooting",
    "process improvement",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The curated catalog shipped with the crate.
pub fn definition() -> CatalogDefinition {
    CatalogDefinition {
        skills: SKILLS
            .iter()
            .map(|(name, synonyms)| SkillDefinition {
                name: name.to_string(),
                synonyms: strings(synonyms),
            })
            .collect(),
        roles: ROLES
            .iter()
            .map(|(id, keywords, expected, query)| RoleDefinition {
                id: id.to_string(),
                keywords: strings(keywords),
                expected_skills: strings(expected),
                search_query: Some(query.to_string()),
            })
            .collect(),
        experience_signals: strings(EXPERIENCE_SIGNALS),
    }
}
