//! Scorer configuration
//!
//! The score is a weighted sum of three independently capped terms (timing,
//! severity, future risk) plus two bounded bonuses, clamped to [0, 100].
//! Every constant that shapes the combination is configuration.

/// Configuration for necessity scoring.
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// Point budget of the timing term
    pub timing_weight: f64,

    /// Point budget of the issue-severity term
    pub severity_weight: f64,

    /// Point budget of the future-risk term
    pub risk_weight: f64,

    /// Clamp bound for the per-issue effect multiplier: severity is scaled
    /// by `1 + clamp(effect / 100, -bound, +bound)`
    pub effect_adjust_bound: f64,

    /// Weight of non-primary issues when combining severities
    pub secondary_issue_factor: f64,

    /// Denominator normalizing the folded age-risk value
    pub risk_scale_denominator: f64,

    /// Per-extra-issue step of the risk problem factor
    pub problem_factor_step: f64,

    /// Cap of the risk problem factor
    pub problem_factor_max: f64,

    /// Prevention bonus per year under 18
    pub youth_bonus_per_year: f64,

    /// Bonus per extra issue for multi-issue adult cases
    pub adult_complexity_bonus: f64,

    /// Adult bonus age window (inclusive)
    pub adult_bonus_ages: (u8, u8),

    /// Ages above this are rejected as malformed input
    pub max_age: u8,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            timing_weight: 35.0,
            severity_weight: 40.0,
            risk_weight: 35.0,
            effect_adjust_bound: 0.5,
            secondary_issue_factor: 0.5,
            risk_scale_denominator: 60.0,
            problem_factor_step: 0.1,
            problem_factor_max: 1.5,
            youth_bonus_per_year: 0.5,
            adult_complexity_bonus: 2.0,
            adult_bonus_ages: (35, 55),
            max_age: 120,
        }
    }
}

impl ScorerConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.timing_weight < 0.0 || self.severity_weight < 0.0 || self.risk_weight < 0.0 {
            return Err("term weights must be non-negative".to_string());
        }
        if !(0.0..=1.0).contains(&self.effect_adjust_bound) {
            return Err(format!(
                "effect_adjust_bound {} is outside [0, 1]",
                self.effect_adjust_bound
            ));
        }
        if self.risk_scale_denominator <= 0.0 {
            return Err("risk_scale_denominator must be positive".to_string());
        }
        if self.adult_bonus_ages.0 > self.adult_bonus_ages.1 {
            return Err("adult_bonus_ages must be an ordered range".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ScorerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timing_weight, 35.0);
        assert_eq!(config.severity_weight, 40.0);
        assert_eq!(config.risk_weight, 35.0);
        assert_eq!(config.effect_adjust_bound, 0.5);
    }

    #[test]
    fn test_invalid_bound_rejected() {
        let config = ScorerConfig {
            effect_adjust_bound: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
