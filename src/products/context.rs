//! Shared, read-only input for the document renderers.

use chrono::{DateTime, Utc};

use super::catalog::Product;
use crate::market::lookups::{adjacent_roles, skill_premiums, AdjacentRole, SkillPremium};
use crate::market::{
    compute_ask_range, compute_underpaid_score, resolve_city_label, resolve_job_label,
    AskRange, MarketData, SalaryStats, UnderpaidAssessment,
};
use crate::purchase::models::PurchaseInput;

/// Everything a renderer needs. Built once per generation.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub product: &'static Product,
    pub input: PurchaseInput,
    pub job_label: &'static str,
    pub city_label: &'static str,
    pub stats: SalaryStats,
    pub ask: AskRange,
    pub underpaid: UnderpaidAssessment,
    pub adjacent_roles: Vec<AdjacentRole>,
    pub skill_premiums: Vec<SkillPremium>,
    pub generated_at: DateTime<Utc>,
}

impl RenderContext {
    /// Resolve labels and compute every derived number for `input`.
    pub fn build(market: &MarketData, product: &'static Product, input: &PurchaseInput) -> Self {
        let job_label = resolve_job_label(&input.job_id);
        let city_label = resolve_city_label(&input.city_id);
        let stats = crate::market::get_salary_stats(market, &input.job_id, &input.city_id);
        let ask = compute_ask_range(&stats, &input.options);
        let underpaid = compute_underpaid_score(&stats, &input.options);

        Self {
            product,
            input: input.clone(),
            job_label,
            city_label,
            stats,
            ask,
            underpaid,
            adjacent_roles: adjacent_roles(job_label),
            skill_premiums: skill_premiums(job_label),
            generated_at: Utc::now(),
        }
    }

    pub fn purchase_id(&self) -> &str {
        &self.input.purchase_id
    }

    /// Role the buyer is aiming for, defaulting to the current job.
    pub fn target_role(&self) -> &str {
        self.input.options.target_role_or(self.job_label)
    }
}
