//! Engine configuration structures.

use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::core::alert::{near_bands_or_defaults, urgency_or_defaults, AlertPolicy, KindBands};
use crate::core::AppResult;

/// Root engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Near-threshold band `B` per kind; omitted kinds keep their defaults.
    #[serde(deserialize_with = "near_bands_or_defaults")]
    pub bands: KindBands,
    /// Urgency threshold `U` per kind; must be strictly below `B`.
    #[serde(deserialize_with = "urgency_or_defaults")]
    pub urgent_within: KindBands,
    /// Maximum events kept by the default in-memory audit sink.
    pub audit_capacity: usize,
    /// Seconds between urgent-alert polls.
    pub poll_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bands: KindBands::near_threshold_defaults(),
            urgent_within: KindBands::urgency_defaults(),
            audit_capacity: 1024,
            poll_interval_secs: 30,
        }
    }
}

impl EngineConfig {
    /// Alert policy described by this configuration.
    pub const fn policy(&self) -> AlertPolicy {
        AlertPolicy {
            near_band: self.bands,
            urgent_within: self.urgent_within,
        }
    }

    /// Validate band, audit and polling values.
    pub fn validate(&self) -> Result<(), String> {
        self.policy().validate()?;
        if self.audit_capacity == 0 {
            return Err("audit_capacity must be greater than 0".into());
        }
        if self.poll_interval_secs == 0 {
            return Err("poll_interval_secs must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse engine configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Fails when a variable does not parse or the result does not validate.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from defaults overridden by `lookup(name)` values.
    ///
    /// Recognized names: `METER_BAND_VEHICLE`, `METER_BAND_COMPRESSOR`,
    /// `METER_BAND_PART`, `METER_URGENT_VEHICLE`, `METER_URGENT_COMPRESSOR`,
    /// `METER_URGENT_PART`, `METER_AUDIT_CAPACITY`, `METER_POLL_INTERVAL_SECS`.
    ///
    /// # Errors
    ///
    /// Fails when a value does not parse or the result does not validate.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn apply<T: FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            name: &str,
            target: &mut T,
        ) -> AppResult<()>
        where
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            if let Some(raw) = lookup(name) {
                *target = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{name}: cannot parse `{raw}`"))?;
            }
            Ok(())
        }

        let mut cfg = Self::default();
        apply(&lookup, "METER_BAND_VEHICLE", &mut cfg.bands.vehicle)?;
        apply(&lookup, "METER_BAND_COMPRESSOR", &mut cfg.bands.compressor)?;
        apply(&lookup, "METER_BAND_PART", &mut cfg.bands.part)?;
        apply(&lookup, "METER_URGENT_VEHICLE", &mut cfg.urgent_within.vehicle)?;
        apply(&lookup, "METER_URGENT_COMPRESSOR", &mut cfg.urgent_within.compressor)?;
        apply(&lookup, "METER_URGENT_PART", &mut cfg.urgent_within.part)?;
        apply(&lookup, "METER_AUDIT_CAPACITY", &mut cfg.audit_capacity)?;
        apply(&lookup, "METER_POLL_INTERVAL_SECS", &mut cfg.poll_interval_secs)?;

        cfg.validate().map_err(|e| anyhow!("engine config invalid: {e}"))?;
        Ok(cfg)
    }
}
