use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Hours removed from a run's end timestamp by the one-time acceleration.
    pub time_reduction_hours: i64,
    /// Fixed third-party cut on the total dirty amount. A business rule
    /// distinct from the per-operation percentage; never derived from it.
    pub house_cut_percent: u32,
    /// Per-operation laundering rates the user may select.
    pub launder_percent_options: Vec<u32>,
    /// Rolling window for sale-revenue rollups.
    pub revenue_window_days: i64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let time_reduction_hours = env_map
            .get("TIME_REDUCTION_HOURS")
            .map(|s| s.as_str())
            .unwrap_or("1")
            .parse::<i64>()
            .ok()
            .filter(|h| *h > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "TIME_REDUCTION_HOURS".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        let house_cut_percent = env_map
            .get("HOUSE_CUT_PERCENT")
            .map(|s| s.as_str())
            .unwrap_or("50")
            .parse::<u32>()
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "HOUSE_CUT_PERCENT".to_string(),
                    "must be an integer between 0 and 100".to_string(),
                )
            })?;

        let launder_percent_options = parse_percent_options(
            env_map
                .get("LAUNDER_PERCENT_OPTIONS")
                .map(|s| s.as_str())
                .unwrap_or("20,30"),
        )?;

        let revenue_window_days = env_map
            .get("REVENUE_WINDOW_DAYS")
            .map(|s| s.as_str())
            .unwrap_or("7")
            .parse::<i64>()
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "REVENUE_WINDOW_DAYS".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        Ok(Config {
            port,
            database_path,
            time_reduction_hours,
            house_cut_percent,
            launder_percent_options,
            revenue_window_days,
        })
    }
}

fn parse_percent_options(raw: &str) -> Result<Vec<u32>, ConfigError> {
    let options = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>().ok().filter(|p| *p > 0 && *p <= 100).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "LAUNDER_PERCENT_OPTIONS".to_string(),
                    format!("invalid percentage: {}", s),
                )
            })
        })
        .collect::<Result<Vec<u32>, ConfigError>>()?;

    if options.is_empty() {
        return Err(ConfigError::InvalidValue(
            "LAUNDER_PERCENT_OPTIONS".to_string(),
            "must list at least one percentage".to_string(),
        ));
    }
    Ok(options)
}
