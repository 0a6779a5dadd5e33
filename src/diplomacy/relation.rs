//! Per-pair relation records, split into hot and cold halves
//!
//! `RelationData` is fixed-size and touched by every opinion/war query.
//! `DiplomacyColdData` holds the variable-size modifier list and is only
//! created once a pair actually has modifiers.

use serde::{Deserialize, Serialize};

use crate::core::fixed::FixedPoint64;
use crate::core::types::{ModifierTypeId, Tick};
use crate::diplomacy::modifier::OpinionModifier;

/// Hot per-pair record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationData {
    /// Persistent baseline set by game events (shared religion, rivalry, ...)
    pub base_opinion: FixedPoint64,
    pub at_war: bool,
    /// Mirrors `DiplomacyColdData::modifiers.len()`
    pub modifier_count: u16,
}

impl RelationData {
    /// Nothing left worth storing for this pair
    pub fn is_neutral(&self) -> bool {
        !self.at_war && self.modifier_count == 0 && self.base_opinion.is_zero()
    }
}

/// Cold per-pair record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiplomacyColdData {
    /// Insertion order is preserved; decay never reorders survivors
    pub modifiers: Vec<OpinionModifier>,
    pub last_interaction_tick: Tick,
}

impl DiplomacyColdData {
    pub fn new(last_interaction_tick: Tick) -> Self {
        Self {
            modifiers: Vec::new(),
            last_interaction_tick,
        }
    }

    pub fn push(&mut self, modifier: OpinionModifier) {
        self.last_interaction_tick = self.last_interaction_tick.max(modifier.applied_tick);
        self.modifiers.push(modifier);
    }

    /// Sum of decayed contributions at `tick` (unclamped)
    pub fn modifier_sum(&self, tick: Tick) -> FixedPoint64 {
        self.modifiers.iter().map(|m| m.current_value(tick)).sum()
    }

    /// Drop fully-decayed modifiers, returns how many were removed
    pub fn remove_decayed(&mut self, tick: Tick) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| !m.is_fully_decayed(tick));
        before - self.modifiers.len()
    }

    /// Drop every modifier of a type, returns how many were removed
    pub fn remove_type(&mut self, modifier_type: ModifierTypeId) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| m.modifier_type != modifier_type);
        before - self.modifiers.len()
    }

    pub fn count(&self) -> u16 {
        // Bounded by max_modifiers_per_pair, which config caps at u16::MAX
        self.modifiers.len().min(u16::MAX as usize) as u16
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diplomacy::modifier::{DECLARED_WAR, IMPROVED_RELATIONS, MADE_PEACE};

    fn fp(v: i32) -> FixedPoint64 {
        FixedPoint64::from_int(v)
    }

    #[test]
    fn test_hot_record_is_compact() {
        assert!(std::mem::size_of::<RelationData>() <= 16);
    }

    #[test]
    fn test_neutral_detection() {
        let mut hot = RelationData::default();
        assert!(hot.is_neutral());
        hot.base_opinion = fp(5);
        assert!(!hot.is_neutral());
        hot.base_opinion = FixedPoint64::ZERO;
        hot.at_war = true;
        assert!(!hot.is_neutral());
    }

    #[test]
    fn test_modifier_sum() {
        let mut cold = DiplomacyColdData::new(0);
        cold.push(OpinionModifier::new(DECLARED_WAR, fp(-50), 0, 3600));
        cold.push(OpinionModifier::new(MADE_PEACE, fp(10), 0, 1800));
        assert_eq!(cold.modifier_sum(0), fp(-40));
        // war at half strength, peace fully decayed
        assert_eq!(cold.modifier_sum(1800), fp(-25));
    }

    #[test]
    fn test_remove_decayed_keeps_order() {
        let mut cold = DiplomacyColdData::new(0);
        cold.push(OpinionModifier::new(IMPROVED_RELATIONS, fp(1), 0, 10));
        cold.push(OpinionModifier::new(DECLARED_WAR, fp(2), 0, 100));
        cold.push(OpinionModifier::new(IMPROVED_RELATIONS, fp(3), 0, 5));
        cold.push(OpinionModifier::new(MADE_PEACE, fp(4), 0, 0));

        assert_eq!(cold.remove_decayed(10), 2);
        let values: Vec<_> = cold.modifiers.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![fp(2), fp(4)]);
    }

    #[test]
    fn test_remove_type() {
        let mut cold = DiplomacyColdData::new(0);
        cold.push(OpinionModifier::new(IMPROVED_RELATIONS, fp(5), 0, 720));
        cold.push(OpinionModifier::new(DECLARED_WAR, fp(-50), 0, 3600));
        cold.push(OpinionModifier::new(IMPROVED_RELATIONS, fp(5), 10, 720));
        assert_eq!(cold.remove_type(IMPROVED_RELATIONS), 2);
        assert_eq!(cold.count(), 1);
    }

    #[test]
    fn test_last_interaction_tracks_latest() {
        let mut cold = DiplomacyColdData::new(0);
        cold.push(OpinionModifier::new(MADE_PEACE, fp(1), 50, 10));
        cold.push(OpinionModifier::new(MADE_PEACE, fp(1), 20, 10));
        assert_eq!(cold.last_interaction_tick, 50);
    }
}
