//! Adjacent roles and skill premiums per job.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A role a buyer could move into, with its typical pay delta in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjacentRole {
    pub role: String,
    pub pay_delta_pct: i32,
}

/// A skill and the premium it typically carries, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkillPremium {
    pub skill: String,
    pub premium_pct: i32,
}

const ADJACENT_ROLES: &[(&str, &[(&str, i32)])] = &[
    (
        "Software Engineer",
        &[
            ("Senior Software Engineer", 18),
            ("Engineering Manager", 24),
            ("Machine Learning Engineer", 15),
            ("DevOps Engineer", 4),
        ],
    ),
    (
        "Product Manager",
        &[
            ("Senior Product Manager", 20),
            ("Group Product Manager", 32),
            ("Product Operations Lead", -6),
        ],
    ),
    (
        "Data Scientist",
        &[
            ("Machine Learning Engineer", 12),
            ("Senior Data Scientist", 17),
            ("Analytics Manager", 10),
        ],
    ),
    (
        "UX Designer",
        &[
            ("Senior Product Designer", 19),
            ("UX Research Lead", 9),
            ("Design Manager", 26),
        ],
    ),
    (
        "DevOps Engineer",
        &[
            ("Site Reliability Engineer", 11),
            ("Platform Engineer", 9),
            ("Cloud Architect", 22),
        ],
    ),
    (
        "Engineering Manager",
        &[
            ("Senior Engineering Manager", 16),
            ("Director of Engineering", 34),
            ("Staff Engineer", 2),
        ],
    ),
    (
        "Data Analyst",
        &[
            ("Senior Data Analyst", 14),
            ("Data Scientist", 27),
            ("Analytics Engineer", 18),
        ],
    ),
];

const GENERIC_ADJACENT_ROLES: &[(&str, i32)] = &[
    ("Senior individual contributor", 15),
    ("Team lead", 20),
];

const SKILL_PREMIUMS: &[(&str, &[(&str, i32)])] = &[
    (
        "Software Engineer",
        &[
            ("Distributed systems", 14),
            ("Machine learning infrastructure", 12),
            ("Rust", 9),
            ("Kubernetes", 7),
        ],
    ),
    (
        "Product Manager",
        &[
            ("AI product strategy", 13),
            ("Pricing and monetization", 10),
            ("Technical background", 8),
        ],
    ),
    (
        "Data Scientist",
        &[
            ("Causal inference", 11),
            ("LLM fine-tuning", 14),
            ("Experimentation platforms", 8),
        ],
    ),
    (
        "UX Designer",
        &[
            ("Design systems", 9),
            ("Prototyping with code", 8),
            ("Quantitative research", 6),
        ],
    ),
    (
        "DevOps Engineer",
        &[
            ("Kubernetes", 12),
            ("Terraform", 9),
            ("Security engineering", 11),
        ],
    ),
    (
        "Engineering Manager",
        &[
            ("Org design", 10),
            ("Platform strategy", 9),
            ("Hiring at scale", 7),
        ],
    ),
    (
        "Data Analyst",
        &[
            ("SQL performance tuning", 8),
            ("dbt", 9),
            ("Python", 11),
        ],
    ),
];

const GENERIC_SKILL_PREMIUMS: &[(&str, i32)] = &[
    ("Leadership", 8),
    ("Domain expertise", 6),
];

/// Adjacent roles for a job label, falling back to a generic list.
pub fn adjacent_roles(job_label: &str) -> Vec<AdjacentRole> {
    let entries = ADJACENT_ROLES
        .iter()
        .find(|(job, _)| *job == job_label)
        .map(|(_, roles)| *roles)
        .unwrap_or(GENERIC_ADJACENT_ROLES);

    entries
        .iter()
        .map(|(role, delta)| AdjacentRole {
            role: role.to_string(),
            pay_delta_pct: *delta,
        })
        .collect()
}

/// Skill premiums for a job label, highest premium first.
pub fn skill_premiums(job_label: &str) -> Vec<SkillPremium> {
    let entries = SKILL_PREMIUMS
        .iter()
        .find(|(job, _)| *job == job_label)
        .map(|(_, skills)| *skills)
        .unwrap_or(GENERIC_SKILL_PREMIUMS);

    let mut premiums: Vec<SkillPremium> = entries
        .iter()
        .map(|(skill, premium)| SkillPremium {
            skill: skill.to_string(),
            premium_pct: *premium,
        })
        .collect();
    premiums.sort_by(|a, b| b.premium_pct.cmp(&a.premium_pct));
    premiums
}
