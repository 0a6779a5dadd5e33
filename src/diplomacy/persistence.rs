//! Binary save/load of all diplomatic state
//!
//! Uses bincode for a compact little-endian encoding. Records are written in
//! canonical pair order so identical state always produces identical bytes.
//! Only authoritative data is stored; war indices are rebuilt on load.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::error::{ArchonError, Result};
use crate::core::fixed::FixedPoint64;
use crate::core::types::{CountryId, CountryPair, ModifierTypeId, Tick};
use crate::diplomacy::modifier::OpinionModifier;
use crate::diplomacy::relation::{DiplomacyColdData, RelationData};
use crate::diplomacy::system::DiplomacySystem;

/// Version number for the diplomacy save format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Decode bytes written by `bincode::serialize`, refusing anything left over
pub(crate) fn decode_save<T: DeserializeOwned>(bytes: &[u8]) -> bincode::Result<T> {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
        .deserialize(bytes)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiplomacySave {
    pub version: u32,
    pub relations: Vec<RelationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub a: u16,
    pub b: u16,
    /// Raw fixed-point bits
    pub base_opinion: i64,
    pub at_war: bool,
    pub last_interaction_tick: Tick,
    pub modifiers: Vec<ModifierRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierRecord {
    pub type_id: u16,
    /// Raw fixed-point bits
    pub value: i64,
    pub applied_tick: Tick,
    pub decay_rate: u32,
}

impl From<&OpinionModifier> for ModifierRecord {
    fn from(m: &OpinionModifier) -> Self {
        Self {
            type_id: m.modifier_type.0,
            value: m.value.raw(),
            applied_tick: m.applied_tick,
            decay_rate: m.decay_rate,
        }
    }
}

impl From<ModifierRecord> for OpinionModifier {
    fn from(r: ModifierRecord) -> Self {
        OpinionModifier::new(
            ModifierTypeId(r.type_id),
            FixedPoint64::from_raw(r.value),
            r.applied_tick,
            r.decay_rate,
        )
    }
}

/// A validated record ready to be installed
struct DecodedRelation {
    pair: CountryPair,
    hot: RelationData,
    cold: Option<DiplomacyColdData>,
}

impl DiplomacySystem {
    /// Build the serializable form of the current state
    pub fn to_save(&self) -> DiplomacySave {
        let relations = self
            .sorted_pairs()
            .into_iter()
            .filter_map(|pair| {
                let hot = self.relations.get(&pair)?;
                let cold = self.cold.get(&pair);
                Some(RelationRecord {
                    a: pair.a().0,
                    b: pair.b().0,
                    base_opinion: hot.base_opinion.raw(),
                    at_war: hot.at_war,
                    last_interaction_tick: cold.map(|c| c.last_interaction_tick).unwrap_or(0),
                    modifiers: cold
                        .map(|c| c.modifiers.iter().map(ModifierRecord::from).collect())
                        .unwrap_or_default(),
                })
            })
            .collect();

        DiplomacySave {
            version: SAVE_VERSION,
            relations,
        }
    }

    pub fn save_state(&self) -> Result<Vec<u8>> {
        let bytes = bincode::serialize(&self.to_save())?;
        tracing::info!(
            "Saved diplomacy state: {} relations, {} wars, {} bytes",
            self.relation_count(),
            self.war_count(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Replace all state with the contents of `bytes`
    ///
    /// Everything is validated before live state is touched; on error the
    /// system is left exactly as it was.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<()> {
        let save: DiplomacySave = decode_save(bytes)
            .map_err(|e| ArchonError::CorruptSave(format!("undecodable diplomacy data: {}", e)))?;
        self.apply_save(save)
    }

    pub fn apply_save(&mut self, save: DiplomacySave) -> Result<()> {
        if save.version != SAVE_VERSION {
            return Err(ArchonError::UnsupportedSaveVersion {
                found: save.version,
                expected: SAVE_VERSION,
            });
        }

        let mut decoded = Vec::with_capacity(save.relations.len());
        let mut previous: Option<CountryPair> = None;
        for record in save.relations {
            let relation = self.decode_record(record)?;
            // Strictly increasing order also rules out duplicates
            if previous.is_some_and(|p| p >= relation.pair) {
                return Err(ArchonError::CorruptSave(format!(
                    "relation {} is duplicated or out of order",
                    relation.pair
                )));
            }
            previous = Some(relation.pair);
            decoded.push(relation);
        }

        self.clear();
        for relation in decoded {
            self.relations.insert(relation.pair, relation.hot);
            if let Some(cold) = relation.cold {
                self.cold.insert(relation.pair, cold);
            }
        }
        self.rebuild_war_indices();

        tracing::info!(
            "Loaded diplomacy state: {} relations, {} wars",
            self.relation_count(),
            self.war_count()
        );
        Ok(())
    }

    fn decode_record(&self, record: RelationRecord) -> Result<DecodedRelation> {
        let (a, b) = (CountryId(record.a), CountryId(record.b));
        for country in [a, b] {
            if !self.is_valid_country(country) {
                return Err(ArchonError::CorruptSave(format!(
                    "country {} out of range (capacity {})",
                    country, self.country_capacity
                )));
            }
        }
        if a >= b {
            return Err(ArchonError::CorruptSave(format!(
                "relation ({}, {}) is not a canonical pair",
                a, b
            )));
        }
        // a < b was checked above
        let pair = CountryPair::new(a, b)
            .ok_or_else(|| ArchonError::CorruptSave(format!("self relation {}", a)))?;

        let base_opinion = FixedPoint64::from_raw(record.base_opinion);
        if base_opinion < self.config.opinion_floor() || base_opinion > self.config.opinion_ceiling() {
            return Err(ArchonError::CorruptSave(format!(
                "base opinion {} of {} outside [{}, {}]",
                base_opinion, pair, self.config.opinion_min, self.config.opinion_max
            )));
        }

        if record.modifiers.len() > self.config.max_modifiers_per_pair {
            return Err(ArchonError::CorruptSave(format!(
                "{} has {} modifiers (limit {})",
                pair,
                record.modifiers.len(),
                self.config.max_modifiers_per_pair
            )));
        }

        let cold = if record.modifiers.is_empty() && !record.at_war {
            None
        } else {
            Some(DiplomacyColdData {
                modifiers: record.modifiers.into_iter().map(OpinionModifier::from).collect(),
                last_interaction_tick: record.last_interaction_tick,
            })
        };
        let hot = RelationData {
            base_opinion,
            at_war: record.at_war,
            modifier_count: cold.as_ref().map(|c| c.count()).unwrap_or(0),
        };
        if hot.is_neutral() {
            return Err(ArchonError::CorruptSave(format!("{} carries no state", pair)));
        }

        Ok(DecodedRelation { pair, hot, cold })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DiplomacyConfig;
    use crate::diplomacy::modifier::FIRST_RULE_MODIFIER;

    fn fp(v: i32) -> FixedPoint64 {
        FixedPoint64::from_int(v)
    }

    fn populated() -> DiplomacySystem {
        let mut sys = DiplomacySystem::new(DiplomacyConfig::default(), 8);
        sys.declare_war(CountryId(1), CountryId(2), 10).unwrap();
        sys.declare_war(CountryId(5), CountryId(1), 20).unwrap();
        sys.make_peace(CountryId(1), CountryId(5), 40).unwrap();
        sys.set_base_opinion(CountryId(3), CountryId(4), fp(30), 0).unwrap();
        sys.add_opinion_modifier(
            CountryId(0),
            CountryId(7),
            OpinionModifier::permanent(FIRST_RULE_MODIFIER, fp(12), 3),
        )
        .unwrap();
        sys
    }

    #[test]
    fn test_round_trip_preserves_queries() {
        let original = populated();
        let bytes = original.save_state().unwrap();

        let mut restored = DiplomacySystem::new(DiplomacyConfig::default(), 8);
        restored.load_state(&bytes).unwrap();

        for a in 0..8u16 {
            for b in 0..8u16 {
                let (a, b) = (CountryId(a), CountryId(b));
                assert_eq!(original.get_opinion(a, b, 500), restored.get_opinion(a, b, 500));
                assert_eq!(original.is_at_war(a, b), restored.is_at_war(a, b));
            }
            assert_eq!(original.get_enemies(CountryId(a)), restored.get_enemies(CountryId(a)));
        }
        assert!(restored.verify_indices());
        assert_eq!(restored.save_state().unwrap(), bytes);
    }

    #[test]
    fn test_save_is_deterministic() {
        assert_eq!(populated().save_state().unwrap(), populated().save_state().unwrap());
    }

    #[test]
    fn test_garbage_rejected() {
        let mut sys = populated();
        let before = sys.save_state().unwrap();
        assert!(matches!(sys.load_state(&[1, 2, 3]), Err(ArchonError::CorruptSave(_))));
        assert_eq!(sys.save_state().unwrap(), before);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut sys = populated();
        let before = sys.save_state().unwrap();
        let mut padded = before.clone();
        padded.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);

        let mut fresh = DiplomacySystem::new(DiplomacyConfig::default(), 8);
        assert!(matches!(fresh.load_state(&padded), Err(ArchonError::CorruptSave(_))));
        assert_eq!(fresh.relation_count(), 0);
        assert!(matches!(sys.load_state(&padded), Err(ArchonError::CorruptSave(_))));
        assert_eq!(sys.save_state().unwrap(), before);
    }

    #[test]
    fn test_version_mismatch() {
        let mut sys = populated();
        let mut save = sys.to_save();
        save.version = 99;
        assert!(matches!(
            sys.apply_save(save),
            Err(ArchonError::UnsupportedSaveVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_self_pair_rejected() {
        let mut sys = populated();
        let mut save = sys.to_save();
        save.relations[0].b = save.relations[0].a;
        assert!(matches!(sys.apply_save(save), Err(ArchonError::CorruptSave(_))));
        assert!(sys.is_at_war(CountryId(1), CountryId(2)));
    }

    #[test]
    fn test_out_of_range_country_rejected() {
        let sys = populated();
        let save = sys.to_save();
        let mut small = DiplomacySystem::new(DiplomacyConfig::default(), 4);
        assert!(matches!(small.apply_save(save), Err(ArchonError::CorruptSave(_))));
        assert_eq!(small.relation_count(), 0);
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let mut sys = populated();
        let mut save = sys.to_save();
        let first = save.relations[0].clone();
        save.relations.insert(0, first);
        assert!(matches!(sys.apply_save(save), Err(ArchonError::CorruptSave(_))));
    }

    #[test]
    fn test_out_of_bounds_base_opinion_rejected() {
        let mut sys = populated();
        let mut save = sys.to_save();
        save.relations[0].base_opinion = fp(5000).raw();
        assert!(matches!(sys.apply_save(save), Err(ArchonError::CorruptSave(_))));
    }

    #[test]
    fn test_indices_rebuilt_from_flags() {
        let mut sys = DiplomacySystem::new(DiplomacyConfig::default(), 8);
        let save = DiplomacySave {
            version: SAVE_VERSION,
            relations: vec![RelationRecord {
                a: 2,
                b: 6,
                base_opinion: 0,
                at_war: true,
                last_interaction_tick: 0,
                modifiers: vec![],
            }],
        };
        sys.apply_save(save).unwrap();
        assert!(sys.is_at_war(CountryId(6), CountryId(2)));
        assert_eq!(sys.get_enemies(CountryId(6)), vec![CountryId(2)]);
        assert!(sys.verify_indices());
    }

    #[test]
    fn test_empty_round_trip() {
        let sys = DiplomacySystem::new(DiplomacyConfig::default(), 8);
        let bytes = sys.save_state().unwrap();
        let mut restored = populated();
        restored.load_state(&bytes).unwrap();
        assert_eq!(restored.relation_count(), 0);
        assert_eq!(restored.war_count(), 0);
    }
}
