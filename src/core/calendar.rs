//! Calendar system for tick-driven simulation time
//!
//! The calendar is the tick provider for the simulation: commands are
//! stamped with its current tick and the monthly maintenance (modifier
//! decay) is scheduled off its month boundaries.

use serde::{Deserialize, Serialize};

use crate::core::config::CalendarConfig;
use crate::core::types::Tick;

/// Anything that can report the current simulation tick
pub trait TickSource {
    fn current_tick(&self) -> Tick;
}

/// Calendar tracks simulation time with day/month/year granularity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    tick: Tick,
    config: CalendarConfig,
}

impl Calendar {
    pub fn new(config: CalendarConfig) -> Self {
        Self { tick: 0, config }
    }

    /// Resume at a given tick (used when loading a save)
    pub fn at_tick(config: CalendarConfig, tick: Tick) -> Self {
        Self { tick, config }
    }

    pub fn advance(&mut self) {
        self.tick = self.tick.saturating_add(1);
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn ticks_per_month(&self) -> u32 {
        self.config.ticks_per_day * self.config.days_per_month
    }

    pub fn current_day(&self) -> u32 {
        self.tick / self.config.ticks_per_day
    }

    /// Months elapsed since tick 0
    pub fn current_month(&self) -> u32 {
        self.tick / self.ticks_per_month()
    }

    pub fn current_year(&self) -> u32 {
        self.current_month() / self.config.months_per_year
    }

    /// Day within the current month, starting at 1
    pub fn day_of_month(&self) -> u32 {
        self.current_day() % self.config.days_per_month + 1
    }

    /// Month within the current year, starting at 1
    pub fn month_of_year(&self) -> u32 {
        self.current_month() % self.config.months_per_year + 1
    }

    /// True on the first tick of every month except tick 0
    pub fn is_month_start(&self) -> bool {
        self.tick > 0 && self.tick % self.ticks_per_month() == 0
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }
}

impl TickSource for Calendar {
    fn current_tick(&self) -> Tick {
        self.tick
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(CalendarConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_advances() {
        let mut cal = Calendar::default(); // 24 ticks per day
        assert_eq!(cal.current_tick(), 0);
        assert_eq!(cal.current_day(), 0);

        cal.advance();
        assert_eq!(cal.current_tick(), 1);

        for _ in 0..23 {
            cal.advance();
        }
        assert_eq!(cal.current_tick(), 24);
        assert_eq!(cal.current_day(), 1);
        assert_eq!(cal.day_of_month(), 2);
    }

    #[test]
    fn test_month_start() {
        let mut cal = Calendar::default();
        assert!(!cal.is_month_start());

        let per_month = cal.ticks_per_month();
        assert_eq!(per_month, 720);
        for _ in 0..per_month - 1 {
            cal.advance();
            assert!(!cal.is_month_start());
        }
        cal.advance();
        assert!(cal.is_month_start());
        assert_eq!(cal.current_month(), 1);
        assert_eq!(cal.month_of_year(), 2);
    }

    #[test]
    fn test_year_rollover() {
        let config = CalendarConfig::default();
        let cal = Calendar::at_tick(config, 720 * 12);
        assert_eq!(cal.current_year(), 1);
        assert_eq!(cal.month_of_year(), 1);
        assert_eq!(cal.day_of_month(), 1);
    }

    #[test]
    fn test_tick_source() {
        fn read(source: &dyn TickSource) -> Tick {
            source.current_tick()
        }
        let cal = Calendar::at_tick(CalendarConfig::default(), 99);
        assert_eq!(read(&cal), 99);
    }
}
