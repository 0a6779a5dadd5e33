//! Diplomatic relations engine
//!
//! Sparse per-pair storage with a hot/cold split, lazily evaluated opinion
//! decay, war indices and binary persistence.

pub mod events;
pub mod modifier;
pub mod persistence;
pub mod relation;
pub mod snapshot;
pub mod system;

pub use events::{DiplomacyEvent, EventBus};
pub use modifier::OpinionModifier;
pub use relation::{DiplomacyColdData, RelationData};
pub use snapshot::{DiplomacySnapshot, RelationView};
pub use system::DiplomacySystem;
