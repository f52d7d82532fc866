use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::engine::Relation;

/// Top-level configuration. Built once at startup and passed explicitly to
/// the collaborators that need it; core logic never reads the environment
/// on its own.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FourkeysConfig {
    /// Store connection settings, handed to the data-access backend.
    pub store: StoreConfig,
    /// Incident extraction settings used by ingestion.
    pub ingest: IngestConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Backend connection string
    pub url: String,
    /// Per-call timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Which side of the threshold counts as an incident
    pub relation: Relation,
    /// Monitoring value threshold
    pub threshold: f64,
    /// Expected scrape interval of the monitoring source, in seconds
    pub sampling_step_seconds: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Enable structured tracing output
    pub tracing_enabled: bool,
    /// Log level
    pub log_level: String,
}

impl Default for FourkeysConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                url: "memory://".to_string(),
                timeout_seconds: 30,
            },
            ingest: IngestConfig {
                relation: Relation::Gt,
                threshold: 0.0,
                sampling_step_seconds: 60,
            },
            observability: ObservabilityConfig {
                tracing_enabled: true,
                log_level: "info".to_string(),
            },
        }
    }
}

impl FourkeysConfig {
    /// Load configuration with precedence:
    /// 1. Default values
    /// 2. Configuration file (fourkeys.toml)
    /// 3. Environment variables (prefixed with FOURKEYS_)
    pub fn load() -> Result<Self> {
        let defaults = Config::try_from(&FourkeysConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if Path::new("fourkeys.toml").exists() {
            builder = builder.add_source(File::with_name("fourkeys"));
        }

        builder = builder.add_source(
            Environment::with_prefix("FOURKEYS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = FourkeysConfig::default();
        assert_eq!(config.ingest.relation, Relation::Gt);
        assert_eq!(config.ingest.sampling_step_seconds, 60);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn relation_round_trips_through_serde() {
        let json = serde_json::to_string(&Relation::Lt).unwrap();
        assert_eq!(json, "\"lt\"");
        let back: Relation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Relation::Lt);
    }
}
