//! Gold bookkeeping consumed by diplomatic actions

pub mod treasury;

pub use treasury::{GoldProvider, Treasury};
