//! Command pipeline
//!
//! Every mutation of diplomatic state from players, AI or the network goes
//! through a command: `validate` (read-only) then `execute`. Commands are a
//! closed sum type so dispatch is a `match`, and each one has a compact
//! binary form used identically for network sync and replay journals.

pub mod diplomacy;
pub mod executor;
pub mod wire;

use thiserror::Error;

use crate::core::fixed::FixedPoint64;
use crate::core::types::{CountryId, CountryPair, Tick};
use crate::country::CountryRegistry;
use crate::diplomacy::DiplomacySystem;
use crate::economy::GoldProvider;

pub use diplomacy::{DeclareWarCommand, ImproveRelationsCommand, MakePeaceCommand};
pub use executor::{CommandOutcome, CommandProcessor, CommandState, TrackedCommand};

/// Everything a command may read or mutate
pub struct CommandContext<'a> {
    pub registry: &'a CountryRegistry,
    pub diplomacy: &'a mut DiplomacySystem,
    pub gold: &'a mut dyn GoldProvider,
    /// Calendar tick the command is being applied at
    pub tick: Tick,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        registry: &'a CountryRegistry,
        diplomacy: &'a mut DiplomacySystem,
        gold: &'a mut dyn GoldProvider,
        tick: Tick,
    ) -> Self {
        Self {
            registry,
            diplomacy,
            gold,
            tick,
        }
    }

    /// Commands only apply on the tick they were issued for
    pub fn check_tick(&self, tick: Tick) -> Result<(), Rejection> {
        if tick != self.tick {
            return Err(Rejection::WrongTick {
                expected: self.tick,
                found: tick,
            });
        }
        Ok(())
    }

    /// Both countries exist and differ
    pub fn check_pair(&self, x: CountryId, y: CountryId) -> Result<CountryPair, Rejection> {
        for country in [x, y] {
            if !self.registry.contains(country) || !self.diplomacy.is_valid_country(country) {
                return Err(Rejection::UnknownCountry(country));
            }
        }
        CountryPair::new(x, y).ok_or(Rejection::SameCountry)
    }

    /// The pair can take one more modifier
    pub fn check_modifier_room(&self, pair: CountryPair) -> Result<(), Rejection> {
        let limit = self.diplomacy.config().max_modifiers_per_pair;
        if self.diplomacy.modifiers(pair.a(), pair.b()).len() >= limit {
            return Err(Rejection::ModifierLimit);
        }
        Ok(())
    }
}

/// Why a command failed validation
///
/// Rejections are routine (AI and players try invalid actions all the
/// time) so they are values, not errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Unknown country {0}")]
    UnknownCountry(CountryId),

    #[error("A country cannot target itself")]
    SameCountry,

    #[error("Already at war")]
    AlreadyAtWar,

    #[error("Not at war")]
    NotAtWar,

    #[error("Cannot improve relations while at war")]
    AtWar,

    #[error("Insufficient gold: need {required}, have {available}")]
    InsufficientGold {
        required: FixedPoint64,
        available: FixedPoint64,
    },

    #[error("Too many opinion modifiers on this relation")]
    ModifierLimit,

    #[error("Command is stamped for tick {found}, current tick is {expected}")]
    WrongTick { expected: Tick, found: Tick },
}

/// All commands that mutate diplomatic state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiplomacyCommand {
    DeclareWar(DeclareWarCommand),
    MakePeace(MakePeaceCommand),
    ImproveRelations(ImproveRelationsCommand),
}

impl DiplomacyCommand {
    /// Check preconditions without mutating anything
    pub fn validate(&self, ctx: &CommandContext) -> Result<(), Rejection> {
        match self {
            DiplomacyCommand::DeclareWar(cmd) => cmd.validate(ctx),
            DiplomacyCommand::MakePeace(cmd) => cmd.validate(ctx),
            DiplomacyCommand::ImproveRelations(cmd) => cmd.validate(ctx),
        }
    }

    /// Apply the command; assumes `validate` passed
    pub fn execute(&self, ctx: &mut CommandContext) -> bool {
        match self {
            DiplomacyCommand::DeclareWar(cmd) => cmd.execute(ctx),
            DiplomacyCommand::MakePeace(cmd) => cmd.execute(ctx),
            DiplomacyCommand::ImproveRelations(cmd) => cmd.execute(ctx),
        }
    }

    pub fn tick(&self) -> Tick {
        match self {
            DiplomacyCommand::DeclareWar(cmd) => cmd.tick,
            DiplomacyCommand::MakePeace(cmd) => cmd.tick,
            DiplomacyCommand::ImproveRelations(cmd) => cmd.tick,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DiplomacyCommand::DeclareWar(_) => "DeclareWar",
            DiplomacyCommand::MakePeace(_) => "MakePeace",
            DiplomacyCommand::ImproveRelations(_) => "ImproveRelations",
        }
    }
}

impl From<DeclareWarCommand> for DiplomacyCommand {
    fn from(cmd: DeclareWarCommand) -> Self {
        DiplomacyCommand::DeclareWar(cmd)
    }
}

impl From<MakePeaceCommand> for DiplomacyCommand {
    fn from(cmd: MakePeaceCommand) -> Self {
        DiplomacyCommand::MakePeace(cmd)
    }
}

impl From<ImproveRelationsCommand> for DiplomacyCommand {
    fn from(cmd: ImproveRelationsCommand) -> Self {
        DiplomacyCommand::ImproveRelations(cmd)
    }
}
