//! Simulation tick - the main update loop
//!
//! Commands are applied as they are submitted; the tick itself only
//! advances time and runs scheduled maintenance.

use std::time::Instant;

use crate::diplomacy::DiplomacyEvent;
use crate::simulation::world::Simulation;

/// Run a single simulation tick
///
/// Returns the diplomacy events produced since the previous tick
/// (including those from commands submitted in between).
pub fn run_simulation_tick(sim: &mut Simulation) -> Vec<DiplomacyEvent> {
    sim.calendar.advance();

    // Monthly systems
    if sim.calendar.is_month_start() {
        run_monthly_maintenance(sim);
    }

    sim.drain_events()
}

/// Advance `ticks` ticks, collecting every event
pub fn run_ticks(sim: &mut Simulation, ticks: u32) -> Vec<DiplomacyEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(run_simulation_tick(sim));
    }
    events
}

/// Decay sweep plus snapshot publication
pub fn run_monthly_maintenance(sim: &mut Simulation) {
    let tick = sim.current_tick();
    let start = Instant::now();
    let removed = sim.diplomacy.decay_opinion_modifiers(tick);
    let elapsed = start.elapsed();

    let budget_ms = sim.diplomacy.config().decay_budget_ms;
    if elapsed.as_millis() > budget_ms as u128 {
        tracing::warn!(
            "Decay sweep took {:?} (budget {}ms) for {} modifiers",
            elapsed,
            budget_ms,
            sim.diplomacy.total_modifiers() + removed
        );
    } else {
        tracing::debug!(
            "Month {} maintenance: removed {} modifiers in {:?}",
            sim.calendar.current_month(),
            removed,
            elapsed
        );
    }

    sim.publish_snapshot();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::DeclareWarCommand;
    use crate::core::types::CountryId;

    #[test]
    fn test_tick_advances_calendar() {
        let mut sim = Simulation::with_defaults().unwrap();
        run_simulation_tick(&mut sim);
        assert_eq!(sim.current_tick(), 1);
    }

    #[test]
    fn test_command_events_surface_on_next_tick() {
        let mut sim = Simulation::with_defaults().unwrap();
        sim.submit(DeclareWarCommand::new(CountryId(0), CountryId(1), 0).into());
        let events = run_simulation_tick(&mut sim);
        assert!(matches!(events[0], DiplomacyEvent::WarDeclared { .. }));
        assert!(run_simulation_tick(&mut sim).is_empty());
    }

    #[test]
    fn test_monthly_sweep_removes_expired() {
        let mut sim = Simulation::with_defaults().unwrap();
        sim.submit(DeclareWarCommand::new(CountryId(0), CountryId(1), 0).into());
        run_simulation_tick(&mut sim);

        // Declared War decays over 3600 ticks = 5 months of 720
        run_ticks(&mut sim, 3598);
        assert_eq!(sim.diplomacy.modifiers(CountryId(0), CountryId(1)).len(), 1);

        let events = run_ticks(&mut sim, 1);
        assert_eq!(sim.current_tick(), 3600);
        assert!(events
            .iter()
            .any(|e| matches!(e, DiplomacyEvent::ModifiersExpired { removed: 1, .. })));
        assert!(sim.diplomacy.modifiers(CountryId(0), CountryId(1)).is_empty());
        assert!(sim.diplomacy.is_at_war(CountryId(0), CountryId(1)));
    }

    #[test]
    fn test_snapshot_published_monthly() {
        let mut sim = Simulation::with_defaults().unwrap();
        sim.submit(DeclareWarCommand::new(CountryId(2), CountryId(5), 0).into());
        assert_eq!(sim.snapshot().wars().count(), 0);

        run_ticks(&mut sim, 720);
        assert_eq!(sim.snapshot().tick, 720);
        assert_eq!(sim.snapshot().wars().count(), 1);
    }
}
