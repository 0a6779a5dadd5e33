//! DiplomacySystem - central authority for all diplomatic state
//!
//! Storage is sparse: only pairs that have ever interacted (and still carry
//! state) have records, so memory scales with active relationships rather
//! than with the N² possible pairs.
//!
//! `active_wars` and `wars_by_country` are denormalized indices of
//! `RelationData::at_war`. They are only ever changed through
//! `set_war_state` (or rebuilt wholesale on load), which
//! keeps the three views in agreement.
//!
//! Garbage collection: a pair's cold record is dropped as soon as it holds
//! no modifiers and the pair is not at war; the hot record is dropped when
//! additionally its base opinion is zero.

use ahash::{AHashMap, AHashSet};

use crate::core::config::DiplomacyConfig;
use crate::core::error::{ArchonError, Result};
use crate::core::fixed::FixedPoint64;
use crate::core::types::{CountryId, CountryPair, ModifierTypeId, Tick};
use crate::diplomacy::events::{DiplomacyEvent, EventBus};
use crate::diplomacy::modifier::{OpinionModifier, DECLARED_WAR, MADE_PEACE};
use crate::diplomacy::relation::{DiplomacyColdData, RelationData};

pub struct DiplomacySystem {
    pub(super) config: DiplomacyConfig,
    /// Valid country ids are `0..country_capacity`
    pub(super) country_capacity: u16,
    pub(super) relations: AHashMap<CountryPair, RelationData>,
    pub(super) cold: AHashMap<CountryPair, DiplomacyColdData>,
    pub(super) active_wars: AHashSet<CountryPair>,
    pub(super) wars_by_country: AHashMap<CountryId, AHashSet<CountryId>>,
    pub(super) events: EventBus,
}

impl DiplomacySystem {
    pub fn new(config: DiplomacyConfig, country_capacity: u16) -> Self {
        Self {
            config,
            country_capacity,
            relations: AHashMap::new(),
            cold: AHashMap::new(),
            active_wars: AHashSet::new(),
            wars_by_country: AHashMap::new(),
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &DiplomacyConfig {
        &self.config
    }

    pub fn country_capacity(&self) -> u16 {
        self.country_capacity
    }

    pub fn is_valid_country(&self, country: CountryId) -> bool {
        country.0 < self.country_capacity
    }

    /// Validate and canonicalize a pair for mutation
    pub fn pair(&self, x: CountryId, y: CountryId) -> Result<CountryPair> {
        for country in [x, y] {
            if !self.is_valid_country(country) {
                return Err(ArchonError::InvalidCountry(country));
            }
        }
        CountryPair::new(x, y).ok_or(ArchonError::SelfRelation(x))
    }

    // ========================================================================
    // Queries (never fail; unknown pairs read as neutral)
    // ========================================================================

    /// Effective opinion: base + decayed modifiers, clamped to the configured bounds
    pub fn get_opinion(&self, a: CountryId, b: CountryId, tick: Tick) -> FixedPoint64 {
        match CountryPair::new(a, b) {
            Some(pair) => self.opinion_of(pair, tick),
            None => FixedPoint64::ZERO,
        }
    }

    fn opinion_of(&self, pair: CountryPair, tick: Tick) -> FixedPoint64 {
        let Some(hot) = self.relations.get(&pair) else {
            return FixedPoint64::ZERO;
        };
        let modifiers = self
            .cold
            .get(&pair)
            .map(|cold| cold.modifier_sum(tick))
            .unwrap_or(FixedPoint64::ZERO);
        (hot.base_opinion + modifiers).clamp(self.config.opinion_floor(), self.config.opinion_ceiling())
    }

    pub fn is_at_war(&self, a: CountryId, b: CountryId) -> bool {
        CountryPair::new(a, b).is_some_and(|pair| self.active_wars.contains(&pair))
    }

    /// Everyone `country` is at war with, in ascending id order
    pub fn get_enemies(&self, country: CountryId) -> Vec<CountryId> {
        let mut enemies: Vec<CountryId> = self
            .wars_by_country
            .get(&country)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        enemies.sort_unstable();
        enemies
    }

    pub fn relation(&self, a: CountryId, b: CountryId) -> Option<RelationData> {
        CountryPair::new(a, b).and_then(|pair| self.relations.get(&pair).copied())
    }

    /// Live modifiers for a pair, in application order
    pub fn modifiers(&self, a: CountryId, b: CountryId) -> &[OpinionModifier] {
        CountryPair::new(a, b)
            .and_then(|pair| self.cold.get(&pair))
            .map(|cold| cold.modifiers.as_slice())
            .unwrap_or(&[])
    }

    pub fn last_interaction(&self, a: CountryId, b: CountryId) -> Option<Tick> {
        CountryPair::new(a, b)
            .and_then(|pair| self.cold.get(&pair))
            .map(|cold| cold.last_interaction_tick)
    }

    /// Number of pairs with stored state
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    pub fn war_count(&self) -> usize {
        self.active_wars.len()
    }

    pub fn total_modifiers(&self) -> usize {
        self.cold.values().map(|cold| cold.modifiers.len()).sum()
    }

    /// All stored pairs in canonical order
    pub fn sorted_pairs(&self) -> Vec<CountryPair> {
        let mut pairs: Vec<CountryPair> = self.relations.keys().copied().collect();
        pairs.sort_unstable();
        pairs
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Start a war between two countries
    ///
    /// Declaring twice is rejected so the "Declared War" modifier never stacks.
    pub fn declare_war(&mut self, attacker: CountryId, defender: CountryId, tick: Tick) -> Result<()> {
        let pair = self.pair(attacker, defender)?;
        if self.active_wars.contains(&pair) {
            return Err(ArchonError::AlreadyAtWar(pair));
        }
        self.ensure_modifier_capacity(pair)?;

        let old = self.opinion_of(pair, tick);
        self.set_war_state(pair, true);
        let modifier = OpinionModifier::from_spec(DECLARED_WAR, &self.config.declared_war, tick);
        self.push_modifier(pair, modifier);

        tracing::debug!("War declared: {} -> {} at tick {}", attacker, defender, tick);
        self.events.emit(DiplomacyEvent::WarDeclared {
            attacker,
            defender,
            tick,
        });
        self.emit_opinion_change(pair, old, tick);
        Ok(())
    }

    /// End the war between two countries
    ///
    /// Peace always lands. On a pair already holding the maximum number of
    /// modifiers the "Made Peace" modifier is skipped.
    pub fn make_peace(&mut self, a: CountryId, b: CountryId, tick: Tick) -> Result<()> {
        let pair = self.pair(a, b)?;
        if !self.active_wars.contains(&pair) {
            return Err(ArchonError::NotAtWar(pair));
        }

        let old = self.opinion_of(pair, tick);
        self.set_war_state(pair, false);
        if self.ensure_modifier_capacity(pair).is_ok() {
            let modifier = OpinionModifier::from_spec(MADE_PEACE, &self.config.made_peace, tick);
            self.push_modifier(pair, modifier);
        } else {
            tracing::debug!("{} has no room for a peace modifier, skipping it", pair);
        }

        tracing::debug!("Peace made: {} <-> {} at tick {}", a, b, tick);
        self.events.emit(DiplomacyEvent::PeaceMade { a, b, tick });
        self.emit_opinion_change(pair, old, tick);
        Ok(())
    }

    /// Append a modifier to a pair (commands and passive game rules)
    pub fn add_opinion_modifier(&mut self, a: CountryId, b: CountryId, modifier: OpinionModifier) -> Result<()> {
        let pair = self.pair(a, b)?;
        self.ensure_modifier_capacity(pair)?;

        let tick = modifier.applied_tick;
        let old = self.opinion_of(pair, tick);
        self.push_modifier(pair, modifier);

        tracing::debug!(
            "Modifier {:?} ({}) added to {}",
            modifier.modifier_type,
            modifier.value,
            pair
        );
        self.emit_opinion_change(pair, old, tick);
        Ok(())
    }

    /// Remove every modifier of a type from a pair, returns how many were removed
    pub fn remove_opinion_modifier(
        &mut self,
        a: CountryId,
        b: CountryId,
        modifier_type: ModifierTypeId,
        tick: Tick,
    ) -> Result<usize> {
        let pair = self.pair(a, b)?;
        let old = self.opinion_of(pair, tick);

        let removed = match self.cold.get_mut(&pair) {
            Some(cold) => cold.remove_type(modifier_type),
            None => 0,
        };
        if removed == 0 {
            return Ok(0);
        }

        self.sync_modifier_count(pair);
        self.prune(pair);
        self.emit_opinion_change(pair, old, tick);
        Ok(removed)
    }

    /// Set the persistent baseline for a pair (clamped to the opinion bounds)
    pub fn set_base_opinion(&mut self, a: CountryId, b: CountryId, value: FixedPoint64, tick: Tick) -> Result<()> {
        let pair = self.pair(a, b)?;
        let old = self.opinion_of(pair, tick);

        let value = value.clamp(self.config.opinion_floor(), self.config.opinion_ceiling());
        self.relations.entry(pair).or_default().base_opinion = value;
        self.prune(pair);

        self.emit_opinion_change(pair, old, tick);
        Ok(())
    }

    /// Monthly sweep: drop every fully-decayed modifier
    ///
    /// Only bounds memory; `get_opinion` is already correct without it.
    /// Surviving modifiers keep their order. Returns how many were removed.
    pub fn decay_opinion_modifiers(&mut self, tick: Tick) -> usize {
        if self.cold.is_empty() {
            return 0;
        }

        let mut removed = 0;
        let mut emptied = Vec::new();
        for (pair, cold) in self.cold.iter_mut() {
            let count = cold.remove_decayed(tick);
            if count == 0 {
                continue;
            }
            removed += count;
            if let Some(hot) = self.relations.get_mut(pair) {
                hot.modifier_count = cold.count();
            }
            if cold.is_empty() {
                emptied.push(*pair);
            }
        }

        for pair in emptied {
            self.prune(pair);
        }

        if removed > 0 {
            tracing::debug!("Decay sweep at tick {} removed {} modifiers", tick, removed);
            self.events.emit(DiplomacyEvent::ModifiersExpired { removed, tick });
        }
        removed
    }

    /// Take pending events in emission order
    pub fn drain_events(&mut self) -> Vec<DiplomacyEvent> {
        self.events.drain()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    // ========================================================================
    // War indices
    // ========================================================================

    /// The only place war state changes: hot flag and both indices together
    fn set_war_state(&mut self, pair: CountryPair, at_war: bool) {
        self.relations.entry(pair).or_default().at_war = at_war;

        if at_war {
            self.active_wars.insert(pair);
            self.wars_by_country.entry(pair.a()).or_default().insert(pair.b());
            self.wars_by_country.entry(pair.b()).or_default().insert(pair.a());
        } else {
            self.active_wars.remove(&pair);
            for (country, enemy) in [(pair.a(), pair.b()), (pair.b(), pair.a())] {
                if let Some(enemies) = self.wars_by_country.get_mut(&country) {
                    enemies.remove(&enemy);
                    if enemies.is_empty() {
                        self.wars_by_country.remove(&country);
                    }
                }
            }
        }
    }

    /// Recompute both war indices from the authoritative `at_war` flags
    pub(super) fn rebuild_war_indices(&mut self) {
        self.active_wars.clear();
        self.wars_by_country.clear();
        for (pair, hot) in &self.relations {
            if hot.at_war {
                self.active_wars.insert(*pair);
                self.wars_by_country.entry(pair.a()).or_default().insert(pair.b());
                self.wars_by_country.entry(pair.b()).or_default().insert(pair.a());
            }
        }
    }

    /// Check that both indices agree with the `at_war` flags and cold data with hot counters
    pub fn verify_indices(&self) -> bool {
        let flagged: AHashSet<CountryPair> = self
            .relations
            .iter()
            .filter(|(_, hot)| hot.at_war)
            .map(|(pair, _)| *pair)
            .collect();
        if flagged != self.active_wars {
            return false;
        }

        let indexed: usize = self.wars_by_country.values().map(|set| set.len()).sum();
        if indexed != self.active_wars.len() * 2 {
            return false;
        }
        let indices_match = self.active_wars.iter().all(|pair| {
            self.wars_by_country.get(&pair.a()).is_some_and(|s| s.contains(&pair.b()))
                && self.wars_by_country.get(&pair.b()).is_some_and(|s| s.contains(&pair.a()))
        });
        if !indices_match {
            return false;
        }

        self.relations.iter().all(|(pair, hot)| {
            let cold_count = self.cold.get(pair).map(|c| c.count()).unwrap_or(0);
            hot.modifier_count == cold_count
        }) && self.cold.keys().all(|pair| self.relations.contains_key(pair))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_modifier_capacity(&self, pair: CountryPair) -> Result<()> {
        let limit = self.config.max_modifiers_per_pair;
        let current = self.cold.get(&pair).map(|c| c.modifiers.len()).unwrap_or(0);
        if current >= limit {
            return Err(ArchonError::ModifierLimit { pair, limit });
        }
        Ok(())
    }

    fn push_modifier(&mut self, pair: CountryPair, modifier: OpinionModifier) {
        self.cold
            .entry(pair)
            .or_insert_with(|| DiplomacyColdData::new(modifier.applied_tick))
            .push(modifier);
        self.sync_modifier_count(pair);
    }

    fn sync_modifier_count(&mut self, pair: CountryPair) {
        let count = self.cold.get(&pair).map(|c| c.count()).unwrap_or(0);
        self.relations.entry(pair).or_default().modifier_count = count;
    }

    fn prune(&mut self, pair: CountryPair) {
        let at_war = self.relations.get(&pair).is_some_and(|hot| hot.at_war);
        if !at_war && self.cold.get(&pair).is_some_and(|cold| cold.is_empty()) {
            self.cold.remove(&pair);
        }
        if !self.cold.contains_key(&pair) && self.relations.get(&pair).is_some_and(|hot| hot.is_neutral()) {
            self.relations.remove(&pair);
        }
    }

    fn emit_opinion_change(&mut self, pair: CountryPair, old: FixedPoint64, tick: Tick) {
        let new = self.opinion_of(pair, tick);
        if new != old {
            self.events.emit(DiplomacyEvent::OpinionChanged {
                a: pair.a(),
                b: pair.b(),
                old,
                new,
                tick,
            });
        }
    }

    /// Drop all state (used before loading)
    pub(super) fn clear(&mut self) {
        self.relations.clear();
        self.cold.clear();
        self.active_wars.clear();
        self.wars_by_country.clear();
        self.events.clear();
    }
}
