//! Read-only copies of diplomatic state for UI and AI readers
//!
//! Readers never see the live maps; the simulation publishes a fresh
//! snapshot periodically and readers hold on to that.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::fixed::FixedPoint64;
use crate::core::types::{CountryId, Tick};
use crate::diplomacy::system::DiplomacySystem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationView {
    pub a: CountryId,
    pub b: CountryId,
    pub opinion: FixedPoint64,
    pub at_war: bool,
    pub modifier_count: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiplomacySnapshot {
    pub tick: Tick,
    /// Sorted by pair
    pub relations: Vec<RelationView>,
}

impl DiplomacySnapshot {
    pub fn relation(&self, a: CountryId, b: CountryId) -> Option<&RelationView> {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.relations
            .binary_search_by(|view| (view.a, view.b).cmp(&(lo, hi)))
            .ok()
            .map(|idx| &self.relations[idx])
    }

    pub fn wars(&self) -> impl Iterator<Item = &RelationView> {
        self.relations.iter().filter(|view| view.at_war)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl DiplomacySystem {
    /// Copy the observable state at `tick`
    pub fn snapshot(&self, tick: Tick) -> DiplomacySnapshot {
        let relations = self
            .sorted_pairs()
            .into_iter()
            .filter_map(|pair| {
                let hot = self.relation(pair.a(), pair.b())?;
                Some(RelationView {
                    a: pair.a(),
                    b: pair.b(),
                    opinion: self.get_opinion(pair.a(), pair.b(), tick),
                    at_war: hot.at_war,
                    modifier_count: hot.modifier_count,
                })
            })
            .collect();
        DiplomacySnapshot { tick, relations }
    }
}
