//! Fixed job and city option lists shown in the purchase forms.

use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_JOB_LABEL: &str = "Software Engineer";
pub const DEFAULT_CITY_LABEL: &str = "San Francisco, CA";

/// One selectable option (`id` is the slug sent by the form).
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct OptionEntry {
    pub id: &'static str,
    pub label: &'static str,
}

const fn entry(id: &'static str, label: &'static str) -> OptionEntry {
    OptionEntry { id, label }
}

pub const JOB_OPTIONS: &[OptionEntry] = &[
    entry("software-engineer", "Software Engineer"),
    entry("product-manager", "Product Manager"),
    entry("data-scientist", "Data Scientist"),
    entry("ux-designer", "UX Designer"),
    entry("devops-engineer", "DevOps Engineer"),
    entry("engineering-manager", "Engineering Manager"),
    entry("data-analyst", "Data Analyst"),
];

pub const CITY_OPTIONS: &[OptionEntry] = &[
    entry("san-francisco-ca", "San Francisco, CA"),
    entry("seattle-wa", "Seattle, WA"),
    entry("new-york-ny", "New York, NY"),
    entry("austin-tx", "Austin, TX"),
    entry("boston-ma", "Boston, MA"),
    entry("remote-us", "Remote (US)"),
];

fn resolve(options: &[OptionEntry], key: &str) -> Option<&'static str> {
    let key = key.trim();
    options
        .iter()
        .find(|opt| opt.id == key || opt.label.eq_ignore_ascii_case(key))
        .map(|opt| opt.label)
}

/// Human-readable job label for an id (or label). Unknown input falls back
/// to "Software Engineer".
pub fn resolve_job_label(job_id: &str) -> &'static str {
    resolve(JOB_OPTIONS, job_id).unwrap_or(DEFAULT_JOB_LABEL)
}

/// Human-readable city label for an id (or label). Unknown input falls back
/// to "San Francisco, CA".
pub fn resolve_city_label(city_id: &str) -> &'static str {
    resolve(CITY_OPTIONS, city_id).unwrap_or(DEFAULT_CITY_LABEL)
}
