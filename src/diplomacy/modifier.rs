//! Opinion modifiers - timed, linearly decaying contributions to opinion

use serde::{Deserialize, Serialize};

use crate::core::config::ModifierSpec;
use crate::core::fixed::FixedPoint64;
use crate::core::types::{ModifierTypeId, Tick};

// ============================================================================
// Built-in modifier types
// ============================================================================

/// Applied when a war is declared
pub const DECLARED_WAR: ModifierTypeId = ModifierTypeId(1);

/// Applied when a war ends in peace
pub const MADE_PEACE: ModifierTypeId = ModifierTypeId(2);

/// Applied by the improve-relations diplomatic action
pub const IMPROVED_RELATIONS: ModifierTypeId = ModifierTypeId(3);

/// Ids at or above this are defined by game rules (same culture, same religion, ...)
pub const FIRST_RULE_MODIFIER: ModifierTypeId = ModifierTypeId(100);

// ============================================================================
// OpinionModifier
// ============================================================================

/// A single timed effect on a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpinionModifier {
    pub modifier_type: ModifierTypeId,
    /// Contribution at `applied_tick`
    pub value: FixedPoint64,
    pub applied_tick: Tick,
    /// Ticks until the contribution reaches zero; 0 means permanent
    pub decay_rate: u32,
}

impl OpinionModifier {
    pub fn new(modifier_type: ModifierTypeId, value: FixedPoint64, applied_tick: Tick, decay_rate: u32) -> Self {
        Self {
            modifier_type,
            value,
            applied_tick,
            decay_rate,
        }
    }

    /// A modifier that never decays
    pub fn permanent(modifier_type: ModifierTypeId, value: FixedPoint64, applied_tick: Tick) -> Self {
        Self::new(modifier_type, value, applied_tick, 0)
    }

    /// Build a modifier from a configured template
    pub fn from_spec(modifier_type: ModifierTypeId, spec: &ModifierSpec, applied_tick: Tick) -> Self {
        Self::new(modifier_type, spec.fixed_value(), applied_tick, spec.decay_ticks)
    }

    pub fn is_permanent(&self) -> bool {
        self.decay_rate == 0
    }

    /// Ticks since application; ticks before `applied_tick` count as zero
    pub fn elapsed(&self, tick: Tick) -> u32 {
        tick.saturating_sub(self.applied_tick)
    }

    /// Contribution at `tick`: `value * (1 - elapsed / decay_rate)`, floored at zero
    ///
    /// Evaluated lazily on every opinion query so results never depend on
    /// how often the decay sweep has run.
    pub fn current_value(&self, tick: Tick) -> FixedPoint64 {
        if self.is_permanent() {
            return self.value;
        }
        let elapsed = self.elapsed(tick);
        if elapsed >= self.decay_rate {
            return FixedPoint64::ZERO;
        }
        let remaining = self.decay_rate - elapsed;
        self.value.mul_ratio(remaining as i64, self.decay_rate as i64)
    }

    /// Eligible for removal by the decay sweep
    pub fn is_fully_decayed(&self, tick: Tick) -> bool {
        !self.is_permanent() && self.elapsed(tick) >= self.decay_rate
    }
}
