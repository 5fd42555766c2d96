//! Salary percentile statistics for a (job, city) pair.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::data::MarketData;
use super::options::{resolve_city_label, resolve_job_label};

/// Local samples below this count widen the scope to the national sample.
pub const MIN_LOCAL_SAMPLE: usize = 25;

/// Illustrative values used when the market table has nothing for the job.
pub const SEED_SALARIES: [i64; 6] = [98_000, 112_000, 126_000, 141_000, 158_000, 176_000];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryStats {
    pub sample_size: usize,
    pub min: i64,
    pub max: i64,
    pub mean: i64,
    pub p25: i64,
    pub p50: i64,
    pub p75: i64,
    pub p90: i64,
    pub estimated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate_note: Option<String>,
}

/// Resolve stats for `job_id` in `city_id`.
///
/// Falls back from the local sample to every city for the job, then to
/// [`SEED_SALARIES`]. Never fails.
pub fn get_salary_stats(market: &MarketData, job_id: &str, city_id: &str) -> SalaryStats {
    let job = resolve_job_label(job_id);
    let city = resolve_city_label(city_id);

    let mut values = market.medians_for(job, city);
    let mut estimate_note = None;

    if values.len() < MIN_LOCAL_SAMPLE {
        let local = values.len();
        values = market.medians_for_job(job);
        estimate_note = Some(if values.is_empty() {
            format!(
                "Only {local} local data points for {job} in {city} and no national sample; \
                 showing illustrative sample values."
            )
        } else {
            format!(
                "Only {local} local data points for {job} in {city}; \
                 estimated from {} {job} data points nationwide.",
                values.len()
            )
        });
    }

    if values.is_empty() {
        values = SEED_SALARIES.to_vec();
    }

    values.sort_unstable();
    summarize(&values, estimate_note)
}

/// Nearest-rank percentile on an ascending slice: `floor(p/100 * len)`,
/// clamped to the last index.
pub fn percentile(sorted: &[i64], p: usize) -> i64 {
    if sorted.is_empty() {
        return 0;
    }
    let index = (p * sorted.len() / 100).min(sorted.len() - 1);
    sorted[index]
}

fn summarize(sorted: &[i64], estimate_note: Option<String>) -> SalaryStats {
    let sum: i64 = sorted.iter().sum();
    let mean = (sum as f64 / sorted.len() as f64).round() as i64;

    SalaryStats {
        sample_size: sorted.len(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean,
        p25: percentile(sorted, 25),
        p50: percentile(sorted, 50),
        p75: percentile(sorted, 75),
        p90: percentile(sorted, 90),
        estimated: estimate_note.is_some(),
        estimate_note,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_market(job: &str, city: &str, points: usize) -> MarketData {
        let mut data = MarketData::default();
        for i in 0..points {
            let company = format!("Company {}", i / 4);
            let level = format!("L{}", i % 4);
            data.insert(&company, job, city, &level, 100_000 + (i as i64) * 1_000);
        }
        data
    }

    #[test]
    fn test_percentile_nearest_rank() {
        let values = [10, 20, 30, 40];
        assert_eq!(percentile(&values, 25), 20);
        assert_eq!(percentile(&values, 50), 30);
        assert_eq!(percentile(&values, 90), 40);
        assert_eq!(percentile(&values, 100), 40);
        assert_eq!(percentile(&[], 50), 0);
    }

    #[test]
    fn test_local_sample_is_used_when_large_enough() {
        let market = dense_market("Data Analyst", "Austin, TX", 28);
        let stats = get_salary_stats(&market, "data-analyst", "austin-tx");

        assert!(!stats.estimated);
        assert!(stats.estimate_note.is_none());
        assert_eq!(stats.sample_size, 28);
        assert_eq!(stats.min, 100_000);
        assert_eq!(stats.max, 127_000);
        assert_eq!(stats.p50, 114_000);
    }

    #[test]
    fn test_sparse_local_sample_widens_to_national() {
        let mut market = dense_market("Data Analyst", "Boston, MA", 30);
        market.insert("Solo", "Data Analyst", "Austin, TX", "L4", 90_000);

        let stats = get_salary_stats(&market, "data-analyst", "austin-tx");
        assert!(stats.estimated);
        assert_eq!(stats.sample_size, 31);
        assert!(stats.estimate_note.unwrap().contains("nationwide"));
    }

    #[test]
    fn test_empty_market_uses_seed() {
        let stats = get_salary_stats(&MarketData::default(), "ux-designer", "remote-us");

        assert!(stats.estimated);
        assert_eq!(stats.sample_size, SEED_SALARIES.len());
        assert_eq!(stats.min, 98_000);
        assert_eq!(stats.max, 176_000);
        assert_eq!(stats.p50, 141_000);
    }

    #[test]
    fn test_percentiles_are_ordered() {
        let market = MarketData::builtin().unwrap();
        for job in super::super::options::JOB_OPTIONS {
            for city in super::super::options::CITY_OPTIONS {
                let s = get_salary_stats(&market, job.id, city.id);
                assert!(s.min <= s.p25, "{} / {}", job.label, city.label);
                assert!(s.p25 <= s.p50 && s.p50 <= s.p75 && s.p75 <= s.p90);
                assert!(s.p90 <= s.max);
            }
        }
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = get_salary_stats(&MarketData::default(), "x", "y");
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("sampleSize").is_some());
        assert!(json.get("estimateNote").is_some());
    }
}
