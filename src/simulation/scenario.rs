//! Scenario definitions loaded from TOML
//!
//! A scenario lists the countries in play, their starting gold and any
//! relations that exist before the first tick.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::Result;

/// Template countries used when no scenario file is given
const TEMPLATE_COUNTRIES: [(&str, &str); 10] = [
    ("RED", "Red Empire"),
    ("BLU", "Blue Kingdom"),
    ("GRN", "Green Republic"),
    ("YEL", "Yellow Dominion"),
    ("PUR", "Purple Realm"),
    ("ORG", "Orange Federation"),
    ("CYN", "Cyan Alliance"),
    ("PNK", "Pink Dynasty"),
    ("BRN", "Brown Confederacy"),
    ("GRY", "Gray Union"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryDef {
    pub tag: String,
    pub name: String,
    /// Overrides the scenario-wide starting gold
    #[serde(default)]
    pub gold: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDef {
    pub a: String,
    pub b: String,
    pub base_opinion: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarDef {
    pub attacker: String,
    pub defender: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default = "default_starting_gold")]
    pub starting_gold: u32,
    pub countries: Vec<CountryDef>,
    #[serde(default)]
    pub relations: Vec<RelationDef>,
    #[serde(default)]
    pub wars: Vec<WarDef>,
}

fn default_starting_gold() -> u32 {
    100
}

impl Default for ScenarioConfig {
    /// The ten template countries, all at peace
    fn default() -> Self {
        Self {
            starting_gold: default_starting_gold(),
            countries: TEMPLATE_COUNTRIES
                .iter()
                .map(|(tag, name)| CountryDef {
                    tag: tag.to_string(),
                    name: name.to_string(),
                    gold: None,
                })
                .collect(),
            relations: Vec::new(),
            wars: Vec::new(),
        }
    }
}

impl ScenarioConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
