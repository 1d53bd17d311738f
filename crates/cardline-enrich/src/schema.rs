//! Canonical output schema
//!
//! The enrichment field set and the full output column order are data on
//! [`Schema`]; enrichment and merge read them from here instead of
//! hardcoding column lists.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Foreign-key column referencing a card record
pub const KEY_COLUMN: &str = "Scryfall ID";

/// Output worksheet name
pub const SHEET_NAME: &str = "MtG Collection";

/// Enrichment field projected from a card record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CardName,
    Color,
    Rarity,
    ManaValue,
    Power,
    Toughness,
    /// Type line part before the separator (e.g. "Legendary Creature")
    CardType,
    /// Type line part after the separator (e.g. "Elf Druid")
    Subtype,
    SetName,
}

impl Field {
    /// Output column header
    pub fn column(self) -> &'static str {
        match self {
            Self::CardName => "Card Name",
            Self::Color => "Color",
            Self::Rarity => "Rarity",
            Self::ManaValue => "Mana Value",
            Self::Power => "Power",
            Self::Toughness => "Toughness",
            Self::CardType => "Card",
            Self::Subtype => "Type",
            Self::SetName => "Set Name",
        }
    }
}

/// User-owned columns carried over from the input, in output order
pub const INPUT_COLUMNS: [&str; 5] = [
    "Foil",
    "Quantity",
    "Collector Number",
    "ManaBox ID",
    KEY_COLUMN,
];

/// Output schema revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// Without power/toughness
    V1,
    /// Power/toughness after "Mana Value"
    #[default]
    V2,
}

impl SchemaVersion {
    pub fn name(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }

    fn fields(self) -> &'static [Field] {
        use Field::*;
        match self {
            Self::V1 => &[CardName, Color, Rarity, ManaValue, CardType, Subtype, SetName],
            Self::V2 => &[
                CardName, Color, Rarity, ManaValue, Power, Toughness, CardType, Subtype, SetName,
            ],
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2" | "2" => Ok(Self::V2),
            other => Err(format!("unknown schema version '{other}' (expected v1 or v2)")),
        }
    }
}

/// Column set of one schema version
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: SchemaVersion,
    pub key_column: &'static str,
    /// Projected fields, in output order
    pub enrichment: Vec<Field>,
    /// Full canonical column order (enrichment fields, then input columns)
    pub columns: Vec<&'static str>,
    /// Legacy header spellings, `(from, to)`, applied before dedup
    pub renames: Vec<(&'static str, &'static str)>,
}

impl Schema {
    pub fn new(version: SchemaVersion) -> Self {
        let enrichment = version.fields().to_vec();
        let columns = enrichment
            .iter()
            .map(|f| f.column())
            .chain(INPUT_COLUMNS)
            .collect();
        Self {
            version,
            key_column: KEY_COLUMN,
            enrichment,
            columns,
            renames: vec![("Collector number", "Collector Number")],
        }
    }

    pub fn enrichment_columns(&self) -> Vec<String> {
        self.enrichment.iter().map(|f| f.column().to_string()).collect()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(SchemaVersion::default())
    }
}
