//! Diplomatic commands: declare war, make peace, improve relations

use crate::command::{CommandContext, Rejection};
use crate::core::fixed::FixedPoint64;
use crate::core::types::{CountryId, Tick};
use crate::diplomacy::modifier::{OpinionModifier, IMPROVED_RELATIONS};

// ============================================================================
// DeclareWar
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclareWarCommand {
    pub attacker: CountryId,
    pub defender: CountryId,
    pub tick: Tick,
}

impl DeclareWarCommand {
    pub fn new(attacker: CountryId, defender: CountryId, tick: Tick) -> Self {
        Self {
            attacker,
            defender,
            tick,
        }
    }

    pub fn validate(&self, ctx: &CommandContext) -> Result<(), Rejection> {
        ctx.check_tick(self.tick)?;
        let pair = ctx.check_pair(self.attacker, self.defender)?;
        if ctx.diplomacy.is_at_war(self.attacker, self.defender) {
            return Err(Rejection::AlreadyAtWar);
        }
        ctx.check_modifier_room(pair)
    }

    pub fn execute(&self, ctx: &mut CommandContext) -> bool {
        match ctx.diplomacy.declare_war(self.attacker, self.defender, self.tick) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("DeclareWar failed after validation: {}", e);
                false
            }
        }
    }
}

// ============================================================================
// MakePeace
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MakePeaceCommand {
    pub a: CountryId,
    pub b: CountryId,
    pub tick: Tick,
}

impl MakePeaceCommand {
    pub fn new(a: CountryId, b: CountryId, tick: Tick) -> Self {
        Self { a, b, tick }
    }

    pub fn validate(&self, ctx: &CommandContext) -> Result<(), Rejection> {
        ctx.check_tick(self.tick)?;
        ctx.check_pair(self.a, self.b)?;
        // Ending a war is never blocked by a full modifier list
        if !ctx.diplomacy.is_at_war(self.a, self.b) {
            return Err(Rejection::NotAtWar);
        }
        Ok(())
    }

    pub fn execute(&self, ctx: &mut CommandContext) -> bool {
        match ctx.diplomacy.make_peace(self.a, self.b, self.tick) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("MakePeace failed after validation: {}", e);
                false
            }
        }
    }
}

// ============================================================================
// ImproveRelations
// ============================================================================

/// Spend gold for a temporary opinion boost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImproveRelationsCommand {
    pub source: CountryId,
    pub target: CountryId,
    /// Whole gold units
    pub gold_cost: u32,
    pub tick: Tick,
}

impl ImproveRelationsCommand {
    pub fn new(source: CountryId, target: CountryId, gold_cost: u32, tick: Tick) -> Self {
        Self {
            source,
            target,
            gold_cost,
            tick,
        }
    }

    pub fn cost(&self) -> FixedPoint64 {
        // u32 can exceed the 32-bit integer part; from_fraction saturates
        FixedPoint64::from_fraction(self.gold_cost as i64, 1)
    }

    pub fn validate(&self, ctx: &CommandContext) -> Result<(), Rejection> {
        ctx.check_tick(self.tick)?;
        let pair = ctx.check_pair(self.source, self.target)?;
        if ctx.diplomacy.is_at_war(self.source, self.target) {
            return Err(Rejection::AtWar);
        }
        let available = ctx.gold.gold(self.source);
        if available < self.cost() {
            return Err(Rejection::InsufficientGold {
                required: self.cost(),
                available,
            });
        }
        ctx.check_modifier_room(pair)
    }

    pub fn execute(&self, ctx: &mut CommandContext) -> bool {
        // Two mutations (gold, then opinion): re-check so neither half can land alone
        if let Err(reason) = self.validate(ctx) {
            tracing::warn!("ImproveRelations no longer valid at execution: {}", reason);
            return false;
        }
        if !ctx.gold.try_deduct(self.source, self.cost()) {
            return false;
        }

        let spec = ctx.diplomacy.config().improve_relations;
        let modifier = OpinionModifier::from_spec(IMPROVED_RELATIONS, &spec, self.tick);
        match ctx.diplomacy.add_opinion_modifier(self.source, self.target, modifier) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("ImproveRelations charged gold but could not add modifier: {}", e);
                false
            }
        }
    }
}
