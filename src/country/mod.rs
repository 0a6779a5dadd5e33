//! Country registry - dense ids, tags and display names

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{ArchonError, Result};
use crate::core::types::CountryId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    /// Three-letter tag, e.g. "RED"
    pub tag: String,
    pub name: String,
}

/// Most countries a registry holds; the count itself must fit a u16 capacity
pub const MAX_COUNTRIES: usize = u16::MAX as usize;

/// All countries known to the simulation; ids are handed out in order from 0
#[derive(Debug, Clone, Default)]
pub struct CountryRegistry {
    countries: Vec<Country>,
    by_tag: AHashMap<String, CountryId>,
}

impl CountryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a country, returns its id
    pub fn register(&mut self, tag: &str, name: &str) -> Result<CountryId> {
        let tag = tag.trim().to_uppercase();
        if tag.is_empty() {
            return Err(ArchonError::InvalidConfig("country tag must not be empty".into()));
        }
        if self.by_tag.contains_key(&tag) {
            return Err(ArchonError::InvalidConfig(format!("duplicate country tag {}", tag)));
        }
        if self.countries.len() >= MAX_COUNTRIES {
            return Err(ArchonError::InvalidConfig(format!(
                "too many countries (limit {})",
                MAX_COUNTRIES
            )));
        }

        let id = CountryId(self.countries.len() as u16);
        self.by_tag.insert(tag.clone(), id);
        self.countries.push(Country {
            id,
            tag,
            name: name.to_string(),
        });
        Ok(id)
    }

    pub fn get(&self, id: CountryId) -> Option<&Country> {
        self.countries.get(id.index())
    }

    pub fn by_tag(&self, tag: &str) -> Option<CountryId> {
        self.by_tag.get(&tag.trim().to_uppercase()).copied()
    }

    pub fn contains(&self, id: CountryId) -> bool {
        id.index() < self.countries.len()
    }

    /// Tag if known, otherwise the numeric id
    pub fn label(&self, id: CountryId) -> String {
        self.get(id).map(|c| c.tag.clone()).unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Country> {
        self.countries.iter()
    }

    /// Registry size as a country-id capacity
    pub fn capacity(&self) -> u16 {
        // register() stops at MAX_COUNTRIES
        self.countries.len() as u16
    }
}
