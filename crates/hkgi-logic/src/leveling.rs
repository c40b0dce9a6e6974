//! Experience → level mapping and yield cycle length.
//!
//! A plant's level is the number of curve thresholds its experience has
//! started eating into. `xp_to_go` is the absolute value of what is left
//! after the last subtraction: the experience still needed to finish the
//! current level, or, once the curve is exhausted, how far past the cap the
//! plant has grown.
//!
//! ```
//! use hkgi_logic::leveling::level_from_xp;
//! use hkgi_logic::config::DEFAULT_LEVEL_CURVE;
//!
//! let p = level_from_xp(&DEFAULT_LEVEL_CURVE, 130.0);
//! assert_eq!(p.level, 2);
//! assert_eq!(p.xp_to_go, 270.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    pub xp_to_go: f64,
}

/// Consume thresholds in order while experience remains.
pub fn level_from_xp(curve: &[f64], xp: f64) -> LevelProgress {
    let mut remainder = xp;
    let mut level = 0;
    while remainder > 0.0 && level < curve.len() {
        remainder -= curve[level];
        level += 1;
    }
    LevelProgress {
        level: level as u32,
        xp_to_go: remainder.abs(),
    }
}

/// Experience span of one yield cycle at the level `xp` maps to.
///
/// Shrinks linearly with level and never reaches zero: at the cap it is
/// `base_cycle_xp * 2 / (curve_len + 2)`.
pub fn xp_per_yield_cycle(config: &EngineConfig, xp: f64) -> f64 {
    let level = level_from_xp(&config.level_curve, xp).level as f64;
    let len = config.level_curve.len() as f64;
    config.base_cycle_xp * (1.0 - level / (len + 2.0))
}

/// Whether `xp` has filled every threshold of the curve.
pub fn is_max_level(curve: &[f64], xp: f64) -> bool {
    xp >= curve.iter().sum::<f64>()
}

/// Fraction of the current level completed, in `[0, 1]`.
pub fn level_progress(curve: &[f64], xp: f64) -> f64 {
    if is_max_level(curve, xp) {
        return 1.0;
    }
    let LevelProgress { level, xp_to_go } = level_from_xp(curve, xp);
    if level == 0 {
        return 0.0;
    }
    let threshold = curve[level as usize - 1];
    (1.0 - xp_to_go / threshold).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_LEVEL_CURVE;

    #[test]
    fn test_zero_xp_is_level_zero() {
        let p = level_from_xp(&DEFAULT_LEVEL_CURVE, 0.0);
        assert_eq!(p.level, 0);
        assert_eq!(p.xp_to_go, 0.0);
    }

    #[test]
    fn test_first_xp_starts_level_one() {
        let p = level_from_xp(&DEFAULT_LEVEL_CURVE, 5.0);
        assert_eq!(p.level, 1);
        assert_eq!(p.xp_to_go, 115.0);
    }

    #[test]
    fn test_exact_threshold_stays_on_level() {
        let p = level_from_xp(&DEFAULT_LEVEL_CURVE, 120.0);
        assert_eq!(p.level, 1);
        assert_eq!(p.xp_to_go, 0.0);

        let p = level_from_xp(&DEFAULT_LEVEL_CURVE, 121.0);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp_to_go, 279.0);
    }

    #[test]
    fn test_past_cap_reports_overshoot() {
        let total: f64 = DEFAULT_LEVEL_CURVE.iter().sum();
        let p = level_from_xp(&DEFAULT_LEVEL_CURVE, total + 50.0);
        assert_eq!(p.level, 24);
        assert!((p.xp_to_go - 50.0).abs() < 1e-6);
        assert!(is_max_level(&DEFAULT_LEVEL_CURVE, total + 50.0));
        assert!(!is_max_level(&DEFAULT_LEVEL_CURVE, total - 1.0));
    }

    #[test]
    fn test_cycle_shrinks_with_level() {
        let config = EngineConfig::default();
        assert!((xp_per_yield_cycle(&config, 0.0) - 300.0).abs() < 1e-9);
        assert!((xp_per_yield_cycle(&config, 5.0) - 300.0 * 25.0 / 26.0).abs() < 1e-9);
        let at_cap = xp_per_yield_cycle(&config, 1e9);
        assert!((at_cap - 300.0 * 2.0 / 26.0).abs() < 1e-9);
        assert!(at_cap > 0.0);
    }

    #[test]
    fn test_level_progress() {
        assert_eq!(level_progress(&DEFAULT_LEVEL_CURVE, 0.0), 0.0);
        assert!((level_progress(&DEFAULT_LEVEL_CURVE, 60.0) - 0.5).abs() < 1e-9);
        assert!((level_progress(&DEFAULT_LEVEL_CURVE, 120.0) - 1.0).abs() < 1e-9);
        assert!((level_progress(&DEFAULT_LEVEL_CURVE, 260.0) - 0.5).abs() < 1e-9);
        assert_eq!(level_progress(&DEFAULT_LEVEL_CURVE, 1e9), 1.0);
    }
}
