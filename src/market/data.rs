//! In-memory market data table.
//!
//! The table is keyed `company -> job label -> city label -> level -> median`.
//! A built-in table ships with the binary; deployments can point
//! `MARKET_DATA_PATH` at a JSON file with the same shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const BUILTIN_MARKET_DATA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/market_data.json"
));

type LevelMedians = BTreeMap<String, i64>;
type CityTable = BTreeMap<String, LevelMedians>;
type JobTable = BTreeMap<String, CityTable>;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("failed to read market data file: {0}")]
    Io(#[source] std::io::Error),
    #[error("market data is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Median salaries per company, job, city and level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketData {
    companies: BTreeMap<String, JobTable>,
}

impl MarketData {
    /// The table compiled into the binary.
    pub fn builtin() -> Result<Self, MarketDataError> {
        Self::from_json(BUILTIN_MARKET_DATA)
    }

    pub fn from_json(raw: &str) -> Result<Self, MarketDataError> {
        serde_json::from_str(raw).map_err(MarketDataError::Parse)
    }

    /// Load from `path`, or the built-in table when no path is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, MarketDataError> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(MarketDataError::Io)?;
                let data = Self::from_json(&raw)?;
                log::info!(
                    "Loaded market data from {} ({} companies)",
                    path.display(),
                    data.company_count()
                );
                Ok(data)
            }
            None => Self::builtin(),
        }
    }

    pub fn company_count(&self) -> usize {
        self.companies.len()
    }

    /// Record one median. Used to assemble tables programmatically.
    pub fn insert(&mut self, company: &str, job: &str, city: &str, level: &str, median: i64) {
        self.companies
            .entry(company.to_string())
            .or_default()
            .entry(job.to_string())
            .or_default()
            .entry(city.to_string())
            .or_default()
            .insert(level.to_string(), median);
    }

    /// All medians for `job` in `city`, across companies and levels.
    pub fn medians_for(&self, job: &str, city: &str) -> Vec<i64> {
        self.companies
            .values()
            .filter_map(|jobs| jobs.get(job))
            .filter_map(|cities| cities.get(city))
            .flat_map(|levels| levels.values().copied())
            .collect()
    }

    /// All medians for `job` in any city.
    pub fn medians_for_job(&self, job: &str) -> Vec<i64> {
        self.companies
            .values()
            .filter_map(|jobs| jobs.get(job))
            .flat_map(|cities| cities.values())
            .flat_map(|levels| levels.values().copied())
            .collect()
    }
}
