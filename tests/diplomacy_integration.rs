//! Diplomacy integration tests
//!
//! End-to-end behaviour through the command layer and the tick loop,
//! using the default ten-country world.

use archon_diplomacy::command::{
    CommandOutcome, DeclareWarCommand, DiplomacyCommand, ImproveRelationsCommand, MakePeaceCommand, Rejection,
};
use archon_diplomacy::core::config::{CalendarConfig, DiplomacyConfig};
use archon_diplomacy::core::fixed::FixedPoint64;
use archon_diplomacy::core::types::CountryId;
use archon_diplomacy::diplomacy::modifier::DECLARED_WAR;
use archon_diplomacy::diplomacy::DiplomacyEvent;
use archon_diplomacy::simulation::{run_ticks, ScenarioConfig, Simulation};
use std::path::Path;

const A: CountryId = CountryId(1);
const B: CountryId = CountryId(2);

fn fp(value: i32) -> FixedPoint64 {
    FixedPoint64::from_int(value)
}

fn war(a: CountryId, b: CountryId, tick: u32) -> DiplomacyCommand {
    DeclareWarCommand::new(a, b, tick).into()
}

fn peace(a: CountryId, b: CountryId, tick: u32) -> DiplomacyCommand {
    MakePeaceCommand::new(a, b, tick).into()
}

fn improve(a: CountryId, b: CountryId, cost: u32, tick: u32) -> DiplomacyCommand {
    ImproveRelationsCommand::new(a, b, cost, tick).into()
}

/// War, peace, then improve relations within the same tick
#[test]
fn test_war_peace_improve_scenario() {
    let mut sim = Simulation::with_defaults().unwrap();
    assert_eq!(sim.opinion(A, B), FixedPoint64::ZERO);

    assert_eq!(sim.submit(war(A, B, 0)), CommandOutcome::Executed);
    assert!(sim.diplomacy.is_at_war(A, B));
    assert_eq!(sim.opinion(A, B), fp(-50));

    assert_eq!(sim.submit(peace(A, B, 0)), CommandOutcome::Executed);
    assert!(!sim.diplomacy.is_at_war(A, B));
    assert_eq!(sim.opinion(A, B), fp(-40));

    let gold_before = sim.gold(A);
    assert_eq!(sim.submit(improve(A, B, 50, 0)), CommandOutcome::Executed);
    assert_eq!(sim.gold(A), gold_before - fp(50));
    assert_eq!(sim.opinion(A, B), fp(-35));

    assert!(sim.diplomacy.verify_indices());
}

#[test]
fn test_declare_war_twice_is_rejected() {
    let mut sim = Simulation::with_defaults().unwrap();
    assert!(sim.submit(war(A, B, 0)).is_executed());
    assert_eq!(
        sim.submit(war(B, A, 0)),
        CommandOutcome::Rejected(Rejection::AlreadyAtWar)
    );

    let declared = sim
        .diplomacy
        .modifiers(A, B)
        .iter()
        .filter(|m| m.modifier_type == DECLARED_WAR)
        .count();
    assert_eq!(declared, 1);
    assert!(sim.diplomacy.is_at_war(A, B));
    assert_eq!(sim.processor.rejected_count(), 1);
}

#[test]
fn test_command_rejections() {
    let mut sim = Simulation::with_defaults().unwrap();

    assert_eq!(sim.submit(war(A, A, 0)), CommandOutcome::Rejected(Rejection::SameCountry));
    assert_eq!(
        sim.submit(war(A, CountryId(99), 0)),
        CommandOutcome::Rejected(Rejection::UnknownCountry(CountryId(99)))
    );
    assert_eq!(sim.submit(peace(A, B, 0)), CommandOutcome::Rejected(Rejection::NotAtWar));

    sim.submit(war(A, B, 0));
    assert_eq!(sim.submit(improve(A, B, 10, 0)), CommandOutcome::Rejected(Rejection::AtWar));

    let outcome = sim.submit(improve(A, CountryId(3), 1_000, 0));
    assert!(matches!(
        outcome,
        CommandOutcome::Rejected(Rejection::InsufficientGold { .. })
    ));
    // Rejected commands leave gold untouched
    assert_eq!(sim.gold(A), fp(100));
}

#[test]
fn test_queries_are_symmetric() {
    let mut sim = Simulation::with_defaults().unwrap();
    sim.submit(war(CountryId(4), CountryId(7), 0));
    sim.submit(improve(CountryId(0), CountryId(9), 10, 0));

    for x in 0..10u16 {
        for y in 0..10u16 {
            let (a, b) = (CountryId(x), CountryId(y));
            assert_eq!(sim.opinion(a, b), sim.opinion(b, a));
            assert_eq!(sim.diplomacy.is_at_war(a, b), sim.diplomacy.is_at_war(b, a));
        }
    }
    assert_eq!(sim.diplomacy.get_enemies(CountryId(7)), vec![CountryId(4)]);
}

#[test]
fn test_untouched_pairs_are_neutral() {
    let mut sim = Simulation::with_defaults().unwrap();
    sim.submit(war(A, B, 0));

    assert_eq!(sim.opinion(CountryId(5), CountryId(6)), FixedPoint64::ZERO);
    assert!(!sim.diplomacy.is_at_war(CountryId(5), CountryId(6)));
    // Out-of-range and self queries are neutral, not errors
    assert_eq!(sim.opinion(CountryId(500), A), FixedPoint64::ZERO);
    assert!(!sim.diplomacy.is_at_war(A, A));
    assert!(sim.diplomacy.get_enemies(CountryId(500)).is_empty());
}

/// Declared War decays linearly: -50 at t=0, -25 halfway, gone at 3600
#[test]
fn test_war_modifier_decays_through_ticks() {
    let mut sim = Simulation::with_defaults().unwrap();
    sim.submit(war(A, B, 0));

    run_ticks(&mut sim, 1800);
    assert_eq!(sim.opinion(A, B), fp(-25));

    run_ticks(&mut sim, 1800);
    assert_eq!(sim.opinion(A, B), FixedPoint64::ZERO);
    assert!(sim.diplomacy.modifiers(A, B).is_empty());
    // The war outlives its modifier
    assert!(sim.diplomacy.is_at_war(A, B));
}

#[test]
fn test_peace_after_decay_cleans_up() {
    let mut sim = Simulation::with_defaults().unwrap();
    sim.submit(war(A, B, 0));
    run_ticks(&mut sim, 3600);

    let tick = sim.current_tick();
    assert!(sim.submit(peace(A, B, tick)).is_executed());
    assert_eq!(sim.opinion(A, B), fp(10));

    // Made Peace reaches zero at 5400 but is only swept at the 5760 month start
    run_ticks(&mut sim, 1800);
    assert_eq!(sim.opinion(A, B), FixedPoint64::ZERO);
    assert_eq!(sim.diplomacy.modifiers(A, B).len(), 1);

    run_ticks(&mut sim, 360);
    assert!(sim.diplomacy.modifiers(A, B).is_empty());
    assert!(sim.diplomacy.relation(A, B).is_none());
    assert_eq!(sim.diplomacy.relation_count(), 0);
}

#[test]
fn test_event_stream_order() {
    let mut sim = Simulation::with_defaults().unwrap();
    sim.submit(war(A, B, 0));
    sim.submit(peace(A, B, 0));

    let events = run_ticks(&mut sim, 1);
    let kinds: Vec<&str> = events
        .iter()
        .map(|e| match e {
            DiplomacyEvent::WarDeclared { .. } => "war",
            DiplomacyEvent::PeaceMade { .. } => "peace",
            DiplomacyEvent::OpinionChanged { .. } => "opinion",
            DiplomacyEvent::ModifiersExpired { .. } => "expired",
        })
        .collect();
    assert_eq!(kinds, vec!["war", "opinion", "peace", "opinion"]);
}

/// A relation at its modifier cap can still leave a war
#[test]
fn test_peace_on_full_relation() {
    let config = DiplomacyConfig {
        max_modifiers_per_pair: 3,
        ..DiplomacyConfig::default()
    };
    let mut sim = Simulation::from_scenario(&ScenarioConfig::default(), config, CalendarConfig::default()).unwrap();
    assert!(sim.submit(improve(A, B, 50, 0)).is_executed());
    assert!(sim.submit(improve(A, B, 50, 0)).is_executed());
    assert!(sim.submit(war(B, A, 0)).is_executed());
    assert_eq!(sim.diplomacy.modifiers(A, B).len(), 3);
    assert_eq!(sim.submit(war(A, CountryId(3), 0)), CommandOutcome::Executed);

    assert_eq!(sim.submit(peace(A, B, 0)), CommandOutcome::Executed);
    assert!(!sim.diplomacy.is_at_war(A, B));
    assert_eq!(sim.diplomacy.get_enemies(A), vec![CountryId(3)]);
    assert_eq!(sim.opinion(A, B), fp(-40));
    assert!(sim.diplomacy.verify_indices());
}

#[test]
fn test_commands_apply_only_at_their_tick() {
    let mut sim = Simulation::with_defaults().unwrap();
    run_ticks(&mut sim, 10);

    assert_eq!(
        sim.submit(war(A, B, 3)),
        CommandOutcome::Rejected(Rejection::WrongTick { expected: 10, found: 3 })
    );
    assert_eq!(
        sim.submit(war(A, B, 50)),
        CommandOutcome::Rejected(Rejection::WrongTick { expected: 10, found: 50 })
    );
    assert!(sim.processor.journal().is_empty());

    assert!(sim.submit(war(A, B, 10)).is_executed());
    assert_eq!(sim.diplomacy.modifiers(A, B)[0].applied_tick, 10);
}

#[test]
fn test_bundled_data_files_load() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let config = DiplomacyConfig::load(&root.join("data/diplomacy.toml")).unwrap();
    assert_eq!(config, DiplomacyConfig::default());

    let scenario = ScenarioConfig::load(&root.join("data/scenario.toml")).unwrap();
    let sim = Simulation::from_scenario(&scenario, config, CalendarConfig::default()).unwrap();
    let red = sim.registry.by_tag("RED").unwrap();
    let grn = sim.registry.by_tag("GRN").unwrap();
    let blu = sim.registry.by_tag("blu").unwrap();

    assert_eq!(sim.gold(red), fp(250));
    assert_eq!(sim.gold(blu), fp(100));
    assert_eq!(sim.opinion(red, grn), fp(30));
    assert!(sim.diplomacy.is_at_war(blu, grn));
}
