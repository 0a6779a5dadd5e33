pub mod scenario;
pub mod tick;
pub mod world;

pub use scenario::ScenarioConfig;
pub use tick::{run_simulation_tick, run_ticks};
pub use world::{Simulation, WorldSave};
