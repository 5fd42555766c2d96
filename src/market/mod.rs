//! Market data module - salary statistics and negotiation math.
//!
//! - `data` - nested company/job/city/level median table
//! - `options` - fixed job and city option lists
//! - `stats` - percentile statistics with national and seed fallbacks
//! - `negotiation` - ask range and underpaid score calculators
//! - `calculators` - equity, inflation and salary percentile calculators
//! - `lookups` - adjacent roles and skill premiums per job
//! - `handlers` - calculator endpoints

pub mod calculators;
pub mod data;
pub mod handlers;
pub mod lookups;
pub mod negotiation;
pub mod options;
pub mod stats;

pub use calculators::{
    compute_equity_value, compute_inflation_adjusted, compute_salary_percentile, CalculatorError,
};
pub use data::{MarketData, MarketDataError};
pub use negotiation::{
    compute_ask_range, compute_underpaid_score, AskRange, PurchaseOptions, UnderpaidAssessment,
    UnderpaidTier,
};
pub use options::{resolve_city_label, resolve_job_label};
pub use stats::{get_salary_stats, SalaryStats};
