//! Archon Diplomacy - Entry Point
//!
//! Interactive console for driving the diplomacy simulation: issue
//! commands, advance time, inspect relations, save and load.

use archon_diplomacy::command::{
    CommandOutcome, DeclareWarCommand, DiplomacyCommand, ImproveRelationsCommand, MakePeaceCommand,
};
use archon_diplomacy::core::config::{CalendarConfig, DiplomacyConfig};
use archon_diplomacy::core::error::Result;
use archon_diplomacy::core::types::CountryId;
use archon_diplomacy::diplomacy::DiplomacyEvent;
use archon_diplomacy::simulation::{run_ticks, ScenarioConfig, Simulation};

use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Interactive diplomacy console
#[derive(Parser, Debug)]
#[command(name = "archon-diplomacy")]
#[command(about = "Drive the deterministic diplomacy simulation from a console")]
struct Args {
    /// Scenario TOML (defaults to the ten template countries)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Diplomacy config TOML
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "archon_diplomacy=info".into()),
        )
        .init();

    let args = Args::parse();
    let scenario = match &args.scenario {
        Some(path) => ScenarioConfig::load(path)?,
        None => ScenarioConfig::default(),
    };
    let config = match &args.config {
        Some(path) => DiplomacyConfig::load(path)?,
        None => DiplomacyConfig::default(),
    };
    let mut sim = Simulation::from_scenario(&scenario, config, CalendarConfig::default())?;

    tracing::info!("Archon Diplomacy starting...");
    print_help();

    loop {
        print!("[tick {}] > ", sim.current_tick());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let words: Vec<&str> = input.split_whitespace().collect();
        let Some((&verb, rest)) = words.split_first() else {
            continue;
        };

        match verb {
            "quit" | "q" => break,
            "help" | "h" => print_help(),
            "tick" | "t" => {
                let events = run_ticks(&mut sim, 1);
                print_events(&sim, &events);
            }
            "run" => match rest.first().and_then(|n| n.parse::<u32>().ok()) {
                Some(n) => {
                    let events = run_ticks(&mut sim, n);
                    print_events(&sim, &events);
                    println!("Advanced {} ticks.", n);
                }
                None => println!("Usage: run <ticks>"),
            },
            "war" | "peace" | "improve" => match parse_command(&sim, verb, rest) {
                Some(cmd) => report_outcome(sim.submit(cmd)),
                None => println!("Usage: war <A> <B> | peace <A> <B> | improve <A> <B> [gold]"),
            },
            "opinion" => match parse_pair(&sim, rest) {
                Some((a, b)) => println!(
                    "{} -> {}: {} (at war: {})",
                    sim.registry.label(a),
                    sim.registry.label(b),
                    sim.opinion(a, b),
                    sim.diplomacy.is_at_war(a, b)
                ),
                None => println!("Usage: opinion <A> <B>"),
            },
            "enemies" => match rest.first().and_then(|c| resolve_country(&sim, c)) {
                Some(country) => {
                    let enemies: Vec<String> = sim
                        .diplomacy
                        .get_enemies(country)
                        .into_iter()
                        .map(|e| sim.registry.label(e))
                        .collect();
                    println!("{} is at war with: [{}]", sim.registry.label(country), enemies.join(", "));
                }
                None => println!("Usage: enemies <A>"),
            },
            "gold" => match rest.first().and_then(|c| resolve_country(&sim, c)) {
                Some(country) => println!("{}: {} gold", sim.registry.label(country), sim.gold(country)),
                None => println!("Usage: gold <A>"),
            },
            "status" | "s" => display_status(&sim),
            "dump" => println!("{}", sim.publish_snapshot().to_json()?),
            "save" => match rest.first() {
                Some(path) => match sim.save().and_then(|bytes| Ok(fs::write(path, bytes)?)) {
                    Ok(()) => println!("Saved to {}", path),
                    Err(e) => println!("Save failed: {}", e),
                },
                None => println!("Usage: save <path>"),
            },
            "load" => match rest.first() {
                Some(path) => match fs::read(path).map_err(Into::into).and_then(|bytes| sim.load(&bytes)) {
                    Ok(()) => println!("Loaded {} at tick {}", path, sim.current_tick()),
                    Err(e) => println!("Load failed: {}", e),
                },
                None => println!("Usage: load <path>"),
            },
            other => println!("Unknown command '{}'. Type 'help' for a list.", other),
        }
    }

    Ok(())
}

fn print_help() {
    println!("\n=== ARCHON DIPLOMACY ===");
    println!("Countries are given by tag (RED) or numeric id (0).");
    println!();
    println!("  war <A> <B>            - A declares war on B");
    println!("  peace <A> <B>          - End the war between A and B");
    println!("  improve <A> <B> [gold] - A spends gold to improve relations with B");
    println!("  opinion <A> <B>        - Show current opinion");
    println!("  enemies <A>            - List A's wars");
    println!("  gold <A>               - Show A's treasury");
    println!("  tick / t               - Advance one tick");
    println!("  run <n>                - Advance n ticks");
    println!("  status / s             - Summary of all relations");
    println!("  dump                   - Print a JSON snapshot");
    println!("  save <path>            - Save the world");
    println!("  load <path>            - Load a saved world");
    println!("  quit / q               - Exit");
    println!();
}

fn resolve_country(sim: &Simulation, token: &str) -> Option<CountryId> {
    sim.registry.by_tag(token).or_else(|| {
        token
            .parse::<u16>()
            .ok()
            .map(CountryId)
            .filter(|id| sim.registry.contains(*id))
    })
}

fn parse_pair(sim: &Simulation, args: &[&str]) -> Option<(CountryId, CountryId)> {
    match args {
        [a, b, ..] => Some((resolve_country(sim, a)?, resolve_country(sim, b)?)),
        _ => None,
    }
}

fn parse_command(sim: &Simulation, verb: &str, args: &[&str]) -> Option<DiplomacyCommand> {
    let (a, b) = parse_pair(sim, args)?;
    let tick = sim.current_tick();
    let command = match verb {
        "war" => DeclareWarCommand::new(a, b, tick).into(),
        "peace" => MakePeaceCommand::new(a, b, tick).into(),
        "improve" => {
            let cost = match args.get(2) {
                Some(raw) => raw.parse::<u32>().ok()?,
                None => sim.diplomacy.config().improve_relations_cost,
            };
            ImproveRelationsCommand::new(a, b, cost, tick).into()
        }
        _ => return None,
    };
    Some(command)
}

fn report_outcome(outcome: CommandOutcome) {
    match outcome {
        CommandOutcome::Executed => println!("Done."),
        CommandOutcome::Rejected(reason) => println!("Rejected: {}", reason),
        CommandOutcome::Failed => println!("Command could not be applied."),
    }
}

fn print_events(sim: &Simulation, events: &[DiplomacyEvent]) {
    for event in events {
        match event {
            DiplomacyEvent::WarDeclared { attacker, defender, tick } => println!(
                "  [{}] {} declared war on {}",
                tick,
                sim.registry.label(*attacker),
                sim.registry.label(*defender)
            ),
            DiplomacyEvent::PeaceMade { a, b, tick } => println!(
                "  [{}] {} and {} made peace",
                tick,
                sim.registry.label(*a),
                sim.registry.label(*b)
            ),
            DiplomacyEvent::OpinionChanged { a, b, old, new, tick } => println!(
                "  [{}] {} <-> {}: {} -> {}",
                tick,
                sim.registry.label(*a),
                sim.registry.label(*b),
                old,
                new
            ),
            DiplomacyEvent::ModifiersExpired { removed, tick } => {
                println!("  [{}] {} opinion modifiers expired", tick, removed)
            }
        }
    }
}

fn display_status(sim: &Simulation) {
    println!(
        "\nDay {} of month {}, year {}",
        sim.calendar.day_of_month(),
        sim.calendar.month_of_year(),
        sim.calendar.current_year()
    );
    println!(
        "{} relations, {} wars, {} live modifiers",
        sim.diplomacy.relation_count(),
        sim.diplomacy.war_count(),
        sim.diplomacy.total_modifiers()
    );
    for pair in sim.diplomacy.sorted_pairs() {
        let (a, b) = (pair.a(), pair.b());
        println!(
            "  {} <-> {}: {:>10}{}",
            sim.registry.label(a),
            sim.registry.label(b),
            sim.opinion(a, b).to_string(),
            if sim.diplomacy.is_at_war(a, b) { "  [WAR]" } else { "" }
        );
    }
    println!();
}
