//! Negotiation calculators: ask range and underpaid score.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::stats::SalaryStats;

/// Minimum spread between `ask_low` and `ask_high`.
pub const MIN_ASK_SPREAD: i64 = 5_000;

/// Flat score bonus for candidates with more than six years of experience.
const SENIORITY_BONUS: f64 = 8.0;
const SENIORITY_THRESHOLD_YEARS: u32 = 6;

/// Buyer-supplied purchase options. Every field is optional.
///
/// Numeric fields accept JSON numbers or numeric strings, since the values
/// usually come straight from form inputs. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOptions {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub years_experience: Option<u32>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub remote_preference: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub current_salary: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub target_salary: Option<i64>,
    #[serde(default)]
    pub has_offer: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub offer_amount: Option<i64>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
}

impl PurchaseOptions {
    /// Buyer's target salary, or the market p75.
    pub fn target_salary_or(&self, stats: &SalaryStats) -> i64 {
        self.target_salary.unwrap_or(stats.p75)
    }

    /// Current pay: current salary, then offer amount, then the market p50.
    pub fn current_salary_or(&self, stats: &SalaryStats) -> i64 {
        self.current_salary
            .or(self.offer_amount)
            .unwrap_or(stats.p50)
    }

    pub fn experience_years(&self) -> u32 {
        self.years_experience.unwrap_or(0)
    }

    pub fn timeline_or_default(&self) -> &str {
        non_blank(&self.timeline).unwrap_or("the next 90 days")
    }

    pub fn target_role_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_blank(&self.target_role).unwrap_or(fallback)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AskRange {
    pub ask_low: i64,
    pub ask_high: i64,
    pub anchor: i64,
    pub walk_away: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum UnderpaidTier {
    #[serde(rename = "Severely Underpaid")]
    SeverelyUnderpaid,
    #[serde(rename = "Likely Underpaid")]
    LikelyUnderpaid,
    #[serde(rename = "Possibly Underpaid")]
    PossiblyUnderpaid,
    #[serde(rename = "Fairly Paid")]
    FairlyPaid,
}

impl UnderpaidTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s > 80 => Self::SeverelyUnderpaid,
            s if s > 60 => Self::LikelyUnderpaid,
            s if s > 30 => Self::PossiblyUnderpaid,
            _ => Self::FairlyPaid,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SeverelyUnderpaid => "Severely Underpaid",
            Self::LikelyUnderpaid => "Likely Underpaid",
            Self::PossiblyUnderpaid => "Possibly Underpaid",
            Self::FairlyPaid => "Fairly Paid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnderpaidAssessment {
    pub score: u8,
    pub tier: UnderpaidTier,
}

fn round(value: f64) -> i64 {
    value.round() as i64
}

/// Recommended counter-offer band for the buyer.
pub fn compute_ask_range(stats: &SalaryStats, options: &PurchaseOptions) -> AskRange {
    let target = options.target_salary_or(stats) as f64;

    let ask_low = stats.p50.max(round(target * 0.95));
    let ask_high = (ask_low + MIN_ASK_SPREAD).max(round((stats.p90 as f64).min(target * 1.15)));

    AskRange {
        ask_low,
        ask_high,
        anchor: round(ask_high as f64 * 1.03),
        walk_away: round(ask_low as f64 * 0.93),
    }
}

/// Heuristic 0-100 score of how far current pay sits below the market p75.
pub fn compute_underpaid_score(
    stats: &SalaryStats,
    options: &PurchaseOptions,
) -> UnderpaidAssessment {
    let current = options.current_salary_or(stats) as f64;
    let p75 = stats.p75 as f64;

    let gap = if stats.p75 > 0 {
        (p75 - current) / p75 * 100.0
    } else {
        0.0
    };
    let bonus = if options.experience_years() > SENIORITY_THRESHOLD_YEARS {
        SENIORITY_BONUS
    } else {
        0.0
    };

    let score = (gap + bonus).round().clamp(0.0, 100.0) as u8;
    UnderpaidAssessment {
        score,
        tier: UnderpaidTier::from_score(score),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

fn parse_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumberOrText> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(NumberOrText::Int(v)) => Ok(Some(v as f64)),
        Some(NumberOrText::Float(v)) => Ok(Some(v)),
        Some(NumberOrText::Text(text)) => {
            let cleaned: String = text
                .trim()
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | '_' | ' '))
                .collect();
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned
                .parse::<f64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("'{text}' is not a number")))
        }
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_lenient(deserializer)?.map(|v| v.round() as i64))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match parse_lenient(deserializer)? {
        Some(v) if v < 0.0 => Err(serde::de::Error::custom("value must not be negative")),
        Some(v) => Ok(Some(v.floor() as u32)),
        None => Ok(None),
    }
}
