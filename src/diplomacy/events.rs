//! Diplomacy events consumed by AI and UI layers

use serde::{Deserialize, Serialize};

use crate::core::fixed::FixedPoint64;
use crate::core::types::{CountryId, Tick};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiplomacyEvent {
    WarDeclared {
        attacker: CountryId,
        defender: CountryId,
        tick: Tick,
    },
    PeaceMade {
        a: CountryId,
        b: CountryId,
        tick: Tick,
    },
    OpinionChanged {
        a: CountryId,
        b: CountryId,
        old: FixedPoint64,
        new: FixedPoint64,
        tick: Tick,
    },
    /// Emitted by the monthly sweep when it removed anything
    ModifiersExpired { removed: usize, tick: Tick },
}

impl DiplomacyEvent {
    pub fn tick(&self) -> Tick {
        match self {
            DiplomacyEvent::WarDeclared { tick, .. }
            | DiplomacyEvent::PeaceMade { tick, .. }
            | DiplomacyEvent::OpinionChanged { tick, .. }
            | DiplomacyEvent::ModifiersExpired { tick, .. } => *tick,
        }
    }
}

/// FIFO queue of pending events, drained by the owner once per tick
#[derive(Clone, Debug, Default)]
pub struct EventBus {
    pending: Vec<DiplomacyEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: DiplomacyEvent) {
        self.pending.push(event);
    }

    /// Take all pending events in emission order
    pub fn drain(&mut self) -> Vec<DiplomacyEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order() {
        let mut bus = EventBus::new();
        bus.emit(DiplomacyEvent::WarDeclared {
            attacker: CountryId(1),
            defender: CountryId(2),
            tick: 5,
        });
        bus.emit(DiplomacyEvent::PeaceMade {
            a: CountryId(1),
            b: CountryId(2),
            tick: 9,
        });
        assert_eq!(bus.len(), 2);

        let events = bus.drain();
        assert_eq!(events[0].tick(), 5);
        assert_eq!(events[1].tick(), 9);
        assert!(bus.is_empty());
    }
}
