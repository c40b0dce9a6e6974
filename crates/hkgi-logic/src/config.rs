//! Engine tuning - tick period, experience rates, leveling curve, drop rates.
//!
//! Defaults are the live game's values. Every field can be overridden from a
//! config file; [`EngineConfig::validate`] rejects values that would make the
//! simulation divide by zero or never progress, and must pass before an
//! engine is built from the config.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Experience thresholds per level. The last entry is a sentinel cap.
pub const DEFAULT_LEVEL_CURVE: [f64; 24] = [
    120.0, 280.0, 480.0, 720.0, 1400.0, 1700.0, 2100.0, 2700.0, 3500.0, 6800.0, 7700.0, 8800.0,
    10100.0, 11600.0, 22000.0, 24000.0, 26500.0, 29500.0, 33000.0, 37000.0, 41500.0, 46500.0,
    52000.0, 99991.0,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed tick period in milliseconds.
    pub tick_ms: u64,
    /// Experience one plant gains per tick at multiplier 1.
    pub base_xp_per_tick: f64,
    /// Length of a yield cycle at level 0.
    pub base_cycle_xp: f64,
    /// Experience thresholds, one per level.
    pub level_curve: Vec<f64>,
    /// Chance per yield event of a `bag_t1` drop.
    pub bag_drop_chance: f64,
    /// Plants must be above this level to roll bag drops.
    pub bag_drop_min_level: u32,
    /// Multiplier contributed by each owned `{family}_item`.
    pub booster_unit_multiplier: f64,
    /// Activity entries older than this are pruned each tick.
    pub activity_retention_ms: u64,
    /// Hard cap on activity log length.
    pub activity_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_ms: 500,
            base_xp_per_tick: 5.0,
            base_cycle_xp: 300.0,
            level_curve: DEFAULT_LEVEL_CURVE.to_vec(),
            bag_drop_chance: 0.01,
            bag_drop_min_level: 5,
            booster_unit_multiplier: 0.1,
            activity_retention_ms: 5 * 60 * 1000,
            activity_capacity: 1000,
        }
    }
}

impl EngineConfig {
    /// Experience per real second at multiplier 1.
    pub fn xp_per_sec(&self) -> f64 {
        self.base_xp_per_tick * 1000.0 / self.tick_ms as f64
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if !(self.base_xp_per_tick > 0.0) {
            return Err(ConfigError::NonPositive("base_xp_per_tick", self.base_xp_per_tick));
        }
        if !(self.base_cycle_xp > 0.0) {
            return Err(ConfigError::NonPositive("base_cycle_xp", self.base_cycle_xp));
        }
        if self.level_curve.is_empty() {
            return Err(ConfigError::EmptyCurve);
        }
        if let Some((level, &xp)) = self
            .level_curve
            .iter()
            .enumerate()
            .find(|(_, xp)| !(**xp > 0.0))
        {
            return Err(ConfigError::BadThreshold { level, xp });
        }
        if !(0.0..=1.0).contains(&self.bag_drop_chance) {
            return Err(ConfigError::BadChance(self.bag_drop_chance));
        }
        if !(self.booster_unit_multiplier >= 0.0) {
            return Err(ConfigError::NonPositive(
                "booster_unit_multiplier",
                self.booster_unit_multiplier,
            ));
        }
        Ok(())
    }
}

/// Configuration that cannot drive a simulation. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("tick period must be non-zero")]
    ZeroTickPeriod,
    #[error("{0} must be positive, got {1}")]
    NonPositive(&'static str, f64),
    #[error("level curve is empty")]
    EmptyCurve,
    #[error("level {level} threshold must be positive, got {xp}")]
    BadThreshold { level: usize, xp: f64 },
    #[error("bag drop chance must be within [0, 1], got {0}")]
    BadChance(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.level_curve.len(), 24);
        assert!((config.xp_per_sec() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_empty_curve() {
        let config = EngineConfig {
            level_curve: vec![],
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyCurve));
    }

    #[test]
    fn test_rejects_zero_cycle() {
        let config = EngineConfig {
            base_cycle_xp: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive("base_cycle_xp", _))
        ));
    }

    #[test]
    fn test_rejects_nan_threshold() {
        let mut config = EngineConfig::default();
        config.level_curve[3] = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadThreshold { level: 3, .. })
        ));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"tick_ms": 250}"#).unwrap();
        assert_eq!(config.tick_ms, 250);
        assert_eq!(config.base_xp_per_tick, 5.0);
        assert!((config.xp_per_sec() - 20.0).abs() < 1e-9);
    }
}
