pub mod calendar;
pub mod config;
pub mod error;
pub mod fixed;
pub mod types;

pub use calendar::{Calendar, TickSource};
pub use fixed::FixedPoint64;
