use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub grading: GradingConfig,
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone)]
pub struct GradingConfig {
    /// Submissions graded concurrently per regrade chunk
    pub regrade_chunk_size: usize,
}

#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Seconds between timer ticks while a session is in progress
    pub tick_interval_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let config = Config {
            grading: GradingConfig {
                regrade_chunk_size: env::var("REGRADE_CHUNK_SIZE")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .context("Failed to parse REGRADE_CHUNK_SIZE")?,
            },
            delivery: DeliveryConfig {
                tick_interval_seconds: env::var("SESSION_TICK_SECONDS")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()
                    .context("Failed to parse SESSION_TICK_SECONDS")?,
            },
        };

        if config.grading.regrade_chunk_size == 0 {
            anyhow::bail!("REGRADE_CHUNK_SIZE must be at least 1");
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grading: GradingConfig {
                regrade_chunk_size: 5,
            },
            delivery: DeliveryConfig {
                tick_interval_seconds: 1,
            },
        }
    }
}
