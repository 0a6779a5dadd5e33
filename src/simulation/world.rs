//! Simulation - the world object that owns all diplomatic state
//!
//! Everything lives here and is passed down by reference; there are no
//! global managers. The simulation thread is the only writer.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::command::wire::decode_stream;
use crate::command::{CommandContext, CommandOutcome, CommandProcessor, DiplomacyCommand};
use crate::core::calendar::{Calendar, TickSource};
use crate::core::config::{CalendarConfig, DiplomacyConfig};
use crate::core::error::{ArchonError, Result};
use crate::core::fixed::FixedPoint64;
use crate::core::types::{CountryId, Tick};
use crate::country::CountryRegistry;
use crate::diplomacy::persistence::{decode_save, DiplomacySave};
use crate::diplomacy::{DiplomacyEvent, DiplomacySnapshot, DiplomacySystem};
use crate::economy::{GoldProvider, Treasury};
use crate::simulation::scenario::ScenarioConfig;
use crate::simulation::tick::run_simulation_tick;

/// Version number for world save files (increment when format changes)
const WORLD_SAVE_VERSION: u32 = 1;

/// Serializable world state
#[derive(Debug, Serialize, Deserialize)]
pub struct WorldSave {
    pub version: u32,
    pub tick: Tick,
    /// Country tags in id order; a save only loads into the same country set
    pub countries: Vec<String>,
    /// (country id, raw fixed-point gold)
    pub gold: Vec<(u16, i64)>,
    pub diplomacy: DiplomacySave,
}

pub struct Simulation {
    pub calendar: Calendar,
    pub registry: CountryRegistry,
    pub diplomacy: DiplomacySystem,
    pub treasury: Treasury,
    pub processor: CommandProcessor,
    /// Last published read-only view
    snapshot: DiplomacySnapshot,
}

impl Simulation {
    /// Build a world from a scenario
    pub fn from_scenario(
        scenario: &ScenarioConfig,
        config: DiplomacyConfig,
        calendar: CalendarConfig,
    ) -> Result<Self> {
        config.validate()?;
        calendar.validate()?;

        let mut registry = CountryRegistry::new();
        let mut treasury = Treasury::new();
        for def in &scenario.countries {
            let id = registry.register(&def.tag, &def.name)?;
            let gold = def.gold.unwrap_or(scenario.starting_gold);
            treasury.set_gold(id, FixedPoint64::from_fraction(gold as i64, 1));
        }

        let mut diplomacy = DiplomacySystem::new(config, registry.capacity());
        let lookup = |tag: &str| {
            registry
                .by_tag(tag)
                .ok_or_else(|| ArchonError::InvalidConfig(format!("unknown country tag {}", tag)))
        };
        for rel in &scenario.relations {
            diplomacy.set_base_opinion(lookup(&rel.a)?, lookup(&rel.b)?, FixedPoint64::from_int(rel.base_opinion), 0)?;
        }
        for war in &scenario.wars {
            diplomacy.declare_war(lookup(&war.attacker)?, lookup(&war.defender)?, 0)?;
        }
        // Setup is not news
        diplomacy.drain_events();

        tracing::info!(
            "Scenario loaded: {} countries, {} relations, {} wars",
            registry.len(),
            diplomacy.relation_count(),
            diplomacy.war_count()
        );

        let snapshot = diplomacy.snapshot(0);
        Ok(Self {
            calendar: Calendar::new(calendar),
            registry,
            diplomacy,
            treasury,
            processor: CommandProcessor::new(),
            snapshot,
        })
    }

    /// Default template scenario with default configs
    pub fn with_defaults() -> Result<Self> {
        Self::from_scenario(&ScenarioConfig::default(), DiplomacyConfig::default(), CalendarConfig::default())
    }

    pub fn current_tick(&self) -> Tick {
        self.calendar.current_tick()
    }

    /// Validate and execute a command against live state at the current tick
    pub fn submit(&mut self, command: DiplomacyCommand) -> CommandOutcome {
        let tick = self.current_tick();
        let mut ctx = CommandContext::new(&self.registry, &mut self.diplomacy, &mut self.treasury, tick);
        self.processor.submit(command, &mut ctx)
    }

    /// Re-apply a command journal produced by `processor.journal()`
    ///
    /// The calendar is run forward to each command's tick before it is
    /// submitted, so monthly maintenance happens exactly where it did the
    /// first time. Commands stamped before the current tick are rejected.
    pub fn replay(&mut self, journal: &[u8]) -> Result<Vec<CommandOutcome>> {
        let commands = decode_stream(journal)?;
        tracing::info!("Replaying {} commands from tick {}", commands.len(), self.current_tick());

        let mut outcomes = Vec::with_capacity(commands.len());
        for command in commands {
            while self.current_tick() < command.tick() {
                run_simulation_tick(self);
            }
            outcomes.push(self.submit(command));
        }
        Ok(outcomes)
    }

    pub fn opinion(&self, a: CountryId, b: CountryId) -> FixedPoint64 {
        self.diplomacy.get_opinion(a, b, self.current_tick())
    }

    pub fn gold(&self, country: CountryId) -> FixedPoint64 {
        self.treasury.gold(country)
    }

    /// The last published snapshot (refreshed monthly and on demand)
    pub fn snapshot(&self) -> &DiplomacySnapshot {
        &self.snapshot
    }

    pub fn publish_snapshot(&mut self) -> &DiplomacySnapshot {
        self.snapshot = self.diplomacy.snapshot(self.current_tick());
        &self.snapshot
    }

    pub fn drain_events(&mut self) -> Vec<DiplomacyEvent> {
        self.diplomacy.drain_events()
    }

    // ========================================================================
    // Save / load
    // ========================================================================

    pub fn to_save(&self) -> WorldSave {
        WorldSave {
            version: WORLD_SAVE_VERSION,
            tick: self.current_tick(),
            countries: self.registry.iter().map(|c| c.tag.clone()).collect(),
            gold: self
                .treasury
                .balances()
                .into_iter()
                .map(|(country, gold)| (country.0, gold.raw()))
                .collect(),
            diplomacy: self.diplomacy.to_save(),
        }
    }

    pub fn save(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self.to_save())?)
    }

    /// Replace world state from `bytes`; nothing changes unless the whole save is valid
    pub fn load(&mut self, bytes: &[u8]) -> Result<()> {
        let save: WorldSave = decode_save(bytes)
            .map_err(|e| ArchonError::CorruptSave(format!("undecodable world data: {}", e)))?;

        if save.version != WORLD_SAVE_VERSION {
            return Err(ArchonError::UnsupportedSaveVersion {
                found: save.version,
                expected: WORLD_SAVE_VERSION,
            });
        }

        let tags: Vec<&str> = self.registry.iter().map(|c| c.tag.as_str()).collect();
        if save.countries.iter().map(String::as_str).ne(tags.iter().copied()) {
            return Err(ArchonError::CorruptSave(
                "save was made for a different set of countries".into(),
            ));
        }

        let mut gold = Vec::with_capacity(save.gold.len());
        let mut seen = AHashSet::with_capacity(save.gold.len());
        for (id, raw) in save.gold {
            let country = CountryId(id);
            if !self.registry.contains(country) {
                return Err(ArchonError::CorruptSave(format!("gold for unknown country {}", country)));
            }
            if !seen.insert(country) {
                return Err(ArchonError::CorruptSave(format!("duplicate gold entry for {}", country)));
            }
            let balance = FixedPoint64::from_raw(raw);
            if balance < FixedPoint64::ZERO {
                return Err(ArchonError::CorruptSave(format!("negative gold for {}", country)));
            }
            gold.push((country, balance));
        }

        let mut diplomacy = DiplomacySystem::new(self.diplomacy.config().clone(), self.registry.capacity());
        diplomacy.apply_save(save.diplomacy)?;

        self.diplomacy = diplomacy;
        self.treasury = Treasury::from_balances(gold);
        self.calendar = Calendar::at_tick(*self.calendar.config(), save.tick);
        self.processor = CommandProcessor::new();
        self.publish_snapshot();

        tracing::info!("World loaded at tick {}", save.tick);
        Ok(())
    }
}

impl TickSource for Simulation {
    fn current_tick(&self) -> Tick {
        self.calendar.current_tick()
    }
}
