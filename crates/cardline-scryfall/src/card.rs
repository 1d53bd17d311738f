//! Card record as stored in the bulk payload

use serde::Deserialize;

// === Row struct (deserialized from JSON) ===

/// Scryfall card object, reduced to the fields enrichment projects.
///
/// Unknown fields are ignored; every field is optional in practice
/// (tokens, art cards and reversible cards omit different subsets).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardRecord {
    /// Scryfall ID (UUID)
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Converted mana cost / mana value
    #[serde(default)]
    pub cmc: Option<f64>,

    /// Single-letter color codes (W, U, B, R, G)
    #[serde(default)]
    pub color_identity: Option<Vec<String>>,

    /// common / uncommon / rare / mythic / special / bonus
    #[serde(default)]
    pub rarity: Option<String>,

    /// e.g. "Legendary Creature — Elf Druid"
    #[serde(default)]
    pub type_line: Option<String>,

    #[serde(default)]
    pub set_name: Option<String>,

    #[serde(default)]
    pub power: Option<String>,

    #[serde(default)]
    pub toughness: Option<String>,

    /// Faces of split, flip, transform and modal cards
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
}

/// One face of a multi-faced card
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardFace {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,
}

impl CardRecord {
    pub fn color_identity(&self) -> &[String] {
        self.color_identity.as_deref().unwrap_or(&[])
    }

    pub fn first_face(&self) -> Option<&CardFace> {
        self.card_faces.as_deref().and_then(<[CardFace]>::first)
    }

    /// Top-level type line, falling back to the first face (reversible cards)
    pub fn type_line(&self) -> Option<&str> {
        self.type_line
            .as_deref()
            .or_else(|| self.first_face()?.type_line.as_deref())
    }

    /// Top-level power, falling back to the first face
    pub fn power(&self) -> Option<&str> {
        self.power
            .as_deref()
            .or_else(|| self.first_face()?.power.as_deref())
    }

    /// Top-level toughness, falling back to the first face
    pub fn toughness(&self) -> Option<&str> {
        self.toughness
            .as_deref()
            .or_else(|| self.first_face()?.toughness.as_deref())
    }
}
