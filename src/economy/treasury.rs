//! Treasury - per-country gold balances

use ahash::AHashMap;

use crate::core::fixed::FixedPoint64;
use crate::core::types::CountryId;

/// Read/spend access to gold, as seen by commands
pub trait GoldProvider {
    /// Current balance; unknown countries have none
    fn gold(&self, country: CountryId) -> FixedPoint64;

    /// Spend `amount` if the balance covers it, returns true if spent
    fn try_deduct(&mut self, country: CountryId, amount: FixedPoint64) -> bool;
}

/// Gold balances keyed by country
#[derive(Debug, Clone, Default)]
pub struct Treasury {
    balances: AHashMap<CountryId, FixedPoint64>,
}

impl Treasury {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from (country, balance) entries, e.g. from a save
    pub fn from_balances(entries: impl IntoIterator<Item = (CountryId, FixedPoint64)>) -> Self {
        Self {
            balances: entries.into_iter().collect(),
        }
    }

    pub fn set_gold(&mut self, country: CountryId, amount: FixedPoint64) {
        self.balances.insert(country, amount);
    }

    pub fn deposit(&mut self, country: CountryId, amount: FixedPoint64) {
        let entry = self.balances.entry(country).or_insert(FixedPoint64::ZERO);
        *entry += amount;
    }

    /// Balances in ascending country order
    pub fn balances(&self) -> Vec<(CountryId, FixedPoint64)> {
        let mut entries: Vec<_> = self.balances.iter().map(|(c, g)| (*c, *g)).collect();
        entries.sort_unstable_by_key(|(country, _)| *country);
        entries
    }

    pub fn total(&self) -> FixedPoint64 {
        self.balances.values().copied().sum()
    }
}

impl GoldProvider for Treasury {
    fn gold(&self, country: CountryId) -> FixedPoint64 {
        self.balances.get(&country).copied().unwrap_or(FixedPoint64::ZERO)
    }

    fn try_deduct(&mut self, country: CountryId, amount: FixedPoint64) -> bool {
        if amount.is_negative() {
            return false;
        }
        match self.balances.get_mut(&country) {
            Some(balance) if *balance >= amount => {
                *balance -= amount;
                true
            }
            _ => amount.is_zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(v: i32) -> FixedPoint64 {
        FixedPoint64::from_int(v)
    }

    #[test]
    fn test_deposit_and_deduct() {
        let mut treasury = Treasury::new();
        treasury.deposit(CountryId(1), fp(100));
        treasury.deposit(CountryId(1), fp(20));
        assert_eq!(treasury.gold(CountryId(1)), fp(120));

        assert!(treasury.try_deduct(CountryId(1), fp(50)));
        assert_eq!(treasury.gold(CountryId(1)), fp(70));
    }

    #[test]
    fn test_insufficient_gold_untouched() {
        let mut treasury = Treasury::new();
        treasury.set_gold(CountryId(2), fp(10));
        assert!(!treasury.try_deduct(CountryId(2), fp(11)));
        assert_eq!(treasury.gold(CountryId(2)), fp(10));
        assert!(!treasury.try_deduct(CountryId(9), fp(1)));
    }

    #[test]
    fn test_negative_amount_refused() {
        let mut treasury = Treasury::new();
        treasury.set_gold(CountryId(2), fp(10));
        assert!(!treasury.try_deduct(CountryId(2), fp(-5)));
        assert_eq!(treasury.gold(CountryId(2)), fp(10));
    }

    #[test]
    fn test_balances_sorted() {
        let treasury = Treasury::from_balances([(CountryId(5), fp(1)), (CountryId(2), fp(2))]);
        let ids: Vec<_> = treasury.balances().into_iter().map(|(c, _)| c).collect();
        assert_eq!(ids, vec![CountryId(2), CountryId(5)]);
        assert_eq!(treasury.total(), fp(3));
    }
}
