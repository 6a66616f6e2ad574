use anyhow::{Context, Result, anyhow};
use std::env;
use std::str::FromStr;

use crate::scheduling::{ConstraintConfig, DateRange};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub environment: String,
    /// Recorded on every generated assignment.
    pub operator: String,
    /// Fixed base seed; a random one is drawn per run when unset.
    pub seed: Option<u64>,
    pub range: Option<DateRange>,
    /// Re-validate the stored roster instead of generating a new one.
    pub validate_only: bool,
    /// Night shift to batch pre-allocate before generating, if any.
    pub night_allocation_shift: Option<String>,
    pub constraints: ConstraintConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        let constraints = constraints_from_env()?;
        constraints
            .validate()
            .context("Invalid constraint overrides")?;

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://@localhost:5432/roster".to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            operator: env::var("ROSTER_OPERATOR").unwrap_or_else(|_| "system".to_string()),
            seed: parse_var("ROSTER_SEED")?,
            range: range_from_env()?,
            validate_only: match env::var("ROSTER_VALIDATE_ONLY") {
                Ok(value) => parse_flag(&value)
                    .ok_or_else(|| anyhow!("ROSTER_VALIDATE_ONLY must be yes/no, got '{}'", value))?,
                Err(_) => false,
            },
            night_allocation_shift: env::var("ROSTER_NIGHT_ALLOCATION_SHIFT")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            constraints,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn constraints_from_env() -> Result<ConstraintConfig> {
    let mut config = ConstraintConfig::default();

    let numbers: [(&str, &mut u32); 6] = [
        ("ROSTER_MAX_PER_DAY", &mut config.max_per_day),
        ("ROSTER_MAX_CONSECUTIVE", &mut config.max_consecutive),
        ("ROSTER_MIN_PER_MONTH", &mut config.min_per_month),
        ("ROSTER_MAX_PER_MONTH", &mut config.max_per_month),
        ("ROSTER_MAX_NIGHT_CONSECUTIVE", &mut config.max_night_consecutive),
        ("ROSTER_MAX_NIGHT_PER_MONTH", &mut config.max_night_per_month),
    ];
    for (key, field) in numbers {
        if let Some(value) = parse_var(key)? {
            *field = value;
        }
    }

    let flags: [(&str, &mut bool); 7] = [
        ("ROSTER_AUTO_FILL_MISSING", &mut config.auto_fill_missing),
        ("ROSTER_FAIR_DISTRIBUTION", &mut config.fair_distribution),
        ("ROSTER_APPLY_PREFERENCES", &mut config.apply_preferences),
        ("ROSTER_FLEXIBLE_WORKWEEK", &mut config.is_flexible_workweek),
        ("ROSTER_REQUIRE_HOLIDAY", &mut config.require_holiday),
        ("ROSTER_REQUIRE_REST_DAY", &mut config.require_rest_day),
        ("ROSTER_WEEK_SHIFT_CONSISTENCY", &mut config.week_shift_consistency),
    ];
    for (key, field) in flags {
        if let Ok(value) = env::var(key) {
            *field = parse_flag(&value).ok_or_else(|| anyhow!("{} must be yes/no, got '{}'", key, value))?;
        }
    }

    if let Some(day) = parse_var("ROSTER_HOLIDAY_DAY")? {
        config.holiday_day = day;
    }
    if let Some(day) = parse_var("ROSTER_ON_CALL_DAY")? {
        config.on_call_day = day;
    }

    Ok(config)
}

/// `ROSTER_START`/`ROSTER_END` take precedence over `ROSTER_MONTH`.
fn range_from_env() -> Result<Option<DateRange>> {
    match (env::var("ROSTER_START"), env::var("ROSTER_END")) {
        (Ok(start), Ok(end)) => return Ok(Some(DateRange::parse(&start, &end)?)),
        (Ok(_), Err(_)) | (Err(_), Ok(_)) => {
            return Err(anyhow!("ROSTER_START and ROSTER_END must be set together"));
        }
        _ => {}
    }
    match env::var("ROSTER_MONTH") {
        Ok(month) => Ok(Some(DateRange::parse_month(&month)?)),
        Err(_) => Ok(None),
    }
}

fn parse_var<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow!("Invalid value for {}: {} ({})", key, value, e)),
        Err(_) => Ok(None),
    }
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Some(true),
        "no" | "false" | "0" | "off" => Some(false),
        _ => None,
    }
}
