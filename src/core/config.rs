//! Simulation configuration with documented constants
//!
//! All tunable numbers for diplomacy and the calendar live here. Values are
//! plain integers so they read naturally in TOML; they are converted to
//! fixed point at the point of use.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{ArchonError, Result};
use crate::core::fixed::FixedPoint64;

/// A modifier template: whole-number opinion value and decay window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierSpec {
    /// Opinion contribution at the moment the modifier is applied
    pub value: i32,
    /// Ticks until the modifier has decayed to zero (0 = permanent)
    pub decay_ticks: u32,
}

impl ModifierSpec {
    pub const fn new(value: i32, decay_ticks: u32) -> Self {
        Self { value, decay_ticks }
    }

    pub fn fixed_value(&self) -> FixedPoint64 {
        FixedPoint64::from_int(self.value)
    }
}

/// Configuration for the diplomacy systems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiplomacyConfig {
    /// Lower bound of effective opinion
    pub opinion_min: i32,

    /// Upper bound of effective opinion
    pub opinion_max: i32,

    /// Applied to both sides when a war is declared
    pub declared_war: ModifierSpec,

    /// Applied when a war ends in peace
    pub made_peace: ModifierSpec,

    /// Applied by a successful improve-relations action
    pub improve_relations: ModifierSpec,

    /// Gold spent by an improve-relations action when the caller gives no cost
    pub improve_relations_cost: u32,

    /// Hard cap on stacked modifiers per pair (cached as u16 in hot data)
    pub max_modifiers_per_pair: usize,

    /// Time budget for the monthly decay sweep, in milliseconds
    ///
    /// The sweep runs on the simulation thread; exceeding this is logged.
    pub decay_budget_ms: u64,
}

impl Default for DiplomacyConfig {
    fn default() -> Self {
        Self {
            opinion_min: -200,
            opinion_max: 200,

            declared_war: ModifierSpec::new(-50, 3600),
            made_peace: ModifierSpec::new(10, 1800),
            improve_relations: ModifierSpec::new(5, 720),
            improve_relations_cost: 50,

            max_modifiers_per_pair: 256,
            decay_budget_ms: 20,
        }
    }
}

impl DiplomacyConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DiplomacyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn opinion_floor(&self) -> FixedPoint64 {
        FixedPoint64::from_int(self.opinion_min)
    }

    pub fn opinion_ceiling(&self) -> FixedPoint64 {
        FixedPoint64::from_int(self.opinion_max)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.opinion_min >= self.opinion_max {
            return Err(ArchonError::InvalidConfig(format!(
                "opinion_min ({}) must be < opinion_max ({})",
                self.opinion_min, self.opinion_max
            )));
        }

        if self.max_modifiers_per_pair == 0 || self.max_modifiers_per_pair > u16::MAX as usize {
            return Err(ArchonError::InvalidConfig(format!(
                "max_modifiers_per_pair ({}) must be in 1..={}",
                self.max_modifiers_per_pair,
                u16::MAX
            )));
        }

        if self.improve_relations.value <= 0 {
            return Err(ArchonError::InvalidConfig(
                "improve_relations.value must be positive".into(),
            ));
        }

        Ok(())
    }
}

/// Calendar shape: how ticks map onto days and months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// One tick per in-game hour by default
    pub ticks_per_day: u32,
    pub days_per_month: u32,
    pub months_per_year: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            ticks_per_day: 24,
            days_per_month: 30,
            months_per_year: 12,
        }
    }
}

impl CalendarConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ticks_per_day == 0 || self.days_per_month == 0 || self.months_per_year == 0 {
            return Err(ArchonError::InvalidConfig(
                "calendar fields must all be non-zero".into(),
            ));
        }
        if self.ticks_per_day.checked_mul(self.days_per_month).is_none() {
            return Err(ArchonError::InvalidConfig(format!(
                "a month of {} days at {} ticks per day overflows the tick counter",
                self.days_per_month, self.ticks_per_day
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DiplomacyConfig::default().validate().is_ok());
        assert!(CalendarConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = DiplomacyConfig::from_toml_str(
            r#"
            decay_budget_ms = 5

            [declared_war]
            value = -75
            decay_ticks = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.decay_budget_ms, 5);
        assert_eq!(config.declared_war, ModifierSpec::new(-75, 100));
        assert_eq!(config.made_peace, DiplomacyConfig::default().made_peace);
        assert_eq!(config.opinion_max, 200);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let result = DiplomacyConfig::from_toml_str("opinion_min = 10\nopinion_max = -10\n");
        assert!(matches!(result, Err(ArchonError::InvalidConfig(_))));
    }

    #[test]
    fn test_modifier_cap_must_fit_hot_counter() {
        let config = DiplomacyConfig {
            max_modifiers_per_pair: 70_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let result = DiplomacyConfig::from_toml_str("opinion_min = \"low\"");
        assert!(matches!(result, Err(ArchonError::TomlError(_))));
    }

    #[test]
    fn test_zero_calendar_rejected() {
        let config = CalendarConfig {
            ticks_per_day: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_calendar_month_overflow_rejected() {
        let config = CalendarConfig {
            ticks_per_day: 70_000,
            days_per_month: 70_000,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ArchonError::InvalidConfig(_))));

        let widest = CalendarConfig {
            ticks_per_day: 65_536,
            days_per_month: 65_535,
            ..Default::default()
        };
        assert!(widest.validate().is_ok());
    }
}
