use crate::error::AppError;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub region: String,
    /// Minutes between sampler polling cycles. Long on purpose: the
    /// upstream API quota is shared by everything we do.
    pub poll_minutes: u64,
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("RIOT_API_KEY").map_err(|_| {
            AppError::ConfigError(
                "RIOT_API_KEY not found in .env file".to_string(),
            )
        })?;

        let region = env::var("RIOT_REGION").unwrap_or_else(|_| "na1".to_string());

        let poll_minutes = env::var("LP_TRACKER_POLL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let data_dir = env::var("LP_TRACKER_DIR").ok().map(PathBuf::from);

        Ok(Config {
            api_key,
            region,
            poll_minutes,
            data_dir,
        })
    }
}
