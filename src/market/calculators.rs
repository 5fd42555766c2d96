//! Standalone calculators: equity vesting value, inflation-adjusted salary
//! and where a salary falls within the market percentiles.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::stats::SalaryStats;

pub const DEFAULT_VESTING_YEARS: u32 = 4;
pub const MAX_VESTING_YEARS: u32 = 10;
pub const DEFAULT_INFLATION_PCT: f64 = 3.0;
pub const MAX_INFLATION_YEARS: u32 = 50;

#[derive(Debug, Error, PartialEq)]
pub enum CalculatorError {
    #[error("{0} must not be negative")]
    Negative(&'static str),
    #[error("{name} must be between {min} and {max}")]
    OutOfRange {
        name: &'static str,
        min: u32,
        max: u32,
    },
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquityInput {
    /// Grant value in dollars at grant time.
    pub grant_value: i64,
    #[serde(default)]
    pub vesting_years: Option<u32>,
    /// Expected yearly change in share value, in percent. May be negative.
    #[serde(default)]
    pub annual_growth_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VestingYear {
    pub year: u32,
    pub vested_value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquityValue {
    pub vesting_years: u32,
    pub schedule: Vec<VestingYear>,
    pub total_value: i64,
    pub annualized_value: i64,
}

/// Even annual vesting. The tranche vesting in year `k` is worth
/// `grant / years * (1 + growth)^k`.
pub fn compute_equity_value(input: &EquityInput) -> Result<EquityValue, CalculatorError> {
    if input.grant_value < 0 {
        return Err(CalculatorError::Negative("grantValue"));
    }
    if !input.annual_growth_pct.is_finite() {
        return Err(CalculatorError::NotFinite("annualGrowthPct"));
    }
    let years = input.vesting_years.unwrap_or(DEFAULT_VESTING_YEARS);
    if !(1..=MAX_VESTING_YEARS).contains(&years) {
        return Err(CalculatorError::OutOfRange {
            name: "vestingYears",
            min: 1,
            max: MAX_VESTING_YEARS,
        });
    }

    let tranche = input.grant_value as f64 / years as f64;
    let growth = 1.0 + input.annual_growth_pct / 100.0;
    let schedule: Vec<VestingYear> = (1..=years)
        .map(|year| VestingYear {
            year,
            vested_value: (tranche * growth.powi(year as i32)).max(0.0).round() as i64,
        })
        .collect();
    let total_value: i64 = schedule.iter().map(|y| y.vested_value).sum();

    Ok(EquityValue {
        vesting_years: years,
        annualized_value: (total_value as f64 / years as f64).round() as i64,
        schedule,
        total_value,
    })
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InflationInput {
    pub salary: i64,
    #[serde(default)]
    pub annual_inflation_pct: Option<f64>,
    #[serde(default)]
    pub years: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InflationAdjusted {
    pub years: u32,
    pub annual_inflation_pct: f64,
    /// Salary needed after `years` to keep today's purchasing power.
    pub equivalent_salary: i64,
    /// Today's salary expressed in today's dollars after `years`.
    pub real_value: i64,
    pub purchasing_power_loss_pct: f64,
}

/// `equivalent = salary * (1 + r)^years`, `real = salary / (1 + r)^years`.
pub fn compute_inflation_adjusted(
    input: &InflationInput,
) -> Result<InflationAdjusted, CalculatorError> {
    if input.salary < 0 {
        return Err(CalculatorError::Negative("salary"));
    }
    let rate = input.annual_inflation_pct.unwrap_or(DEFAULT_INFLATION_PCT);
    if !rate.is_finite() {
        return Err(CalculatorError::NotFinite("annualInflationPct"));
    }
    if rate <= -100.0 {
        return Err(CalculatorError::OutOfRange {
            name: "annualInflationPct",
            min: 0,
            max: 100,
        });
    }
    let years = input.years.unwrap_or(1);
    if years > MAX_INFLATION_YEARS {
        return Err(CalculatorError::OutOfRange {
            name: "years",
            min: 0,
            max: MAX_INFLATION_YEARS,
        });
    }

    let factor = (1.0 + rate / 100.0).powi(years as i32);
    let salary = input.salary as f64;
    let loss = (1.0 - 1.0 / factor) * 100.0;

    Ok(InflationAdjusted {
        years,
        annual_inflation_pct: rate,
        equivalent_salary: (salary * factor).round() as i64,
        real_value: (salary / factor).round() as i64,
        purchasing_power_loss_pct: (loss * 10.0).round() / 10.0,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryPercentile {
    pub salary: i64,
    /// Estimated percentile, 0 to 100.
    pub percentile: u8,
    pub band: String,
}

/// Place `salary` on the market curve by linear interpolation between
/// `(min, 0)`, `(p25, 25)`, `(p50, 50)`, `(p75, 75)`, `(p90, 90)` and
/// `(max, 100)`. Salaries outside `[min, max]` clamp to 0 or 100.
pub fn compute_salary_percentile(
    stats: &SalaryStats,
    salary: i64,
) -> Result<SalaryPercentile, CalculatorError> {
    if salary < 0 {
        return Err(CalculatorError::Negative("salary"));
    }

    let anchors = [
        (stats.min, 0.0),
        (stats.p25, 25.0),
        (stats.p50, 50.0),
        (stats.p75, 75.0),
        (stats.p90, 90.0),
        (stats.max, 100.0),
    ];

    let percentile = if salary <= stats.min {
        0.0
    } else if salary >= stats.max {
        100.0
    } else {
        anchors
            .windows(2)
            .find(|w| salary >= w[0].0 && salary < w[1].0)
            .map(|w| {
                let (lo, lo_p) = w[0];
                let (hi, hi_p) = w[1];
                lo_p + (salary - lo) as f64 / (hi - lo) as f64 * (hi_p - lo_p)
            })
            .unwrap_or(100.0)
    };
    let percentile = percentile.round().clamp(0.0, 100.0) as u8;

    Ok(SalaryPercentile {
        salary,
        percentile,
        band: band_for(salary, stats).to_string(),
    })
}

fn band_for(salary: i64, stats: &SalaryStats) -> &'static str {
    if salary < stats.p25 {
        "below p25"
    } else if salary < stats.p50 {
        "p25 to p50"
    } else if salary < stats.p75 {
        "p50 to p75"
    } else if salary < stats.p90 {
        "p75 to p90"
    } else {
        "p90 and above"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> SalaryStats {
        SalaryStats {
            sample_size: 40,
            min: 80_000,
            max: 200_000,
            mean: 130_000,
            p25: 100_000,
            p50: 120_000,
            p75: 150_000,
            p90: 180_000,
            estimated: false,
            estimate_note: None,
        }
    }

    #[test]
    fn test_equity_flat_growth_splits_evenly() {
        let value = compute_equity_value(&EquityInput {
            grant_value: 200_000,
            vesting_years: None,
            annual_growth_pct: 0.0,
        })
        .unwrap();
        assert_eq!(value.vesting_years, 4);
        assert_eq!(value.schedule.len(), 4);
        assert!(value.schedule.iter().all(|y| y.vested_value == 50_000));
        assert_eq!(value.total_value, 200_000);
        assert_eq!(value.annualized_value, 50_000);
    }

    #[test]
    fn test_equity_growth_compounds_per_tranche() {
        let value = compute_equity_value(&EquityInput {
            grant_value: 100_000,
            vesting_years: Some(2),
            annual_growth_pct: 10.0,
        })
        .unwrap();
        assert_eq!(value.schedule[0].vested_value, 55_000);
        assert_eq!(value.schedule[1].vested_value, 60_500);
        assert_eq!(value.total_value, 115_500);
    }

    #[test]
    fn test_equity_rejects_bad_input() {
        let bad_years = EquityInput {
            grant_value: 1,
            vesting_years: Some(0),
            annual_growth_pct: 0.0,
        };
        assert!(matches!(
            compute_equity_value(&bad_years),
            Err(CalculatorError::OutOfRange { name: "vestingYears", .. })
        ));

        let negative = EquityInput {
            grant_value: -5,
            vesting_years: None,
            annual_growth_pct: 0.0,
        };
        assert_eq!(
            compute_equity_value(&negative).unwrap_err(),
            CalculatorError::Negative("grantValue")
        );
    }

    #[test]
    fn test_inflation_over_two_years() {
        let adjusted = compute_inflation_adjusted(&InflationInput {
            salary: 100_000,
            annual_inflation_pct: Some(10.0),
            years: Some(2),
        })
        .unwrap();
        assert_eq!(adjusted.equivalent_salary, 121_000);
        assert_eq!(adjusted.real_value, 82_645);
        assert_eq!(adjusted.purchasing_power_loss_pct, 17.4);
    }

    #[test]
    fn test_inflation_defaults_and_zero_years() {
        let adjusted = compute_inflation_adjusted(&InflationInput {
            salary: 100_000,
            annual_inflation_pct: None,
            years: None,
        })
        .unwrap();
        assert_eq!(adjusted.annual_inflation_pct, DEFAULT_INFLATION_PCT);
        assert_eq!(adjusted.equivalent_salary, 103_000);

        let same = compute_inflation_adjusted(&InflationInput {
            salary: 90_000,
            annual_inflation_pct: Some(5.0),
            years: Some(0),
        })
        .unwrap();
        assert_eq!(same.equivalent_salary, 90_000);
        assert_eq!(same.real_value, 90_000);
        assert_eq!(same.purchasing_power_loss_pct, 0.0);
    }

    #[test]
    fn test_percentile_hits_anchors_and_interpolates() {
        let s = stats();
        assert_eq!(compute_salary_percentile(&s, 120_000).unwrap().percentile, 50);
        assert_eq!(compute_salary_percentile(&s, 135_000).unwrap().percentile, 63);
        assert_eq!(compute_salary_percentile(&s, 180_000).unwrap().percentile, 90);
        assert_eq!(compute_salary_percentile(&s, 50_000).unwrap().percentile, 0);
        assert_eq!(compute_salary_percentile(&s, 500_000).unwrap().percentile, 100);
    }

    #[test]
    fn test_percentile_is_monotonic_and_banded() {
        let s = stats();
        let mut last = 0;
        for salary in (60_000..=220_000).step_by(2_500) {
            let p = compute_salary_percentile(&s, salary).unwrap().percentile;
            assert!(p >= last, "{salary}");
            last = p;
        }
        assert_eq!(compute_salary_percentile(&s, 90_000).unwrap().band, "below p25");
        assert_eq!(compute_salary_percentile(&s, 185_000).unwrap().band, "p90 and above");
    }

    #[test]
    fn test_percentile_with_flat_sample() {
        let mut s = stats();
        for v in [&mut s.min, &mut s.p25, &mut s.p50, &mut s.p75, &mut s.p90, &mut s.max] {
            *v = 100_000;
        }
        assert_eq!(compute_salary_percentile(&s, 100_000).unwrap().percentile, 0);
        assert_eq!(compute_salary_percentile(&s, 100_001).unwrap().percentile, 100);
    }
}
