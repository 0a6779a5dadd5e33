//! Archon Diplomacy - deterministic diplomatic relations core
//!
//! Fixed-point opinion math, sparse relation storage with decaying
//! modifiers, validated commands with a compact wire format, and binary
//! save/load.

pub mod command;
pub mod core;
pub mod country;
pub mod diplomacy;
pub mod economy;
pub mod simulation;
