//! Row enricher: card record → enrichment cells

use cardline_scryfall::{CardRecord, LookupIndex};

use crate::frame::Cell;
use crate::schema::{Field, Schema};

/// Split a type line into (card type, subtype).
///
/// Splits on the first em-dash, else on the first `" - "`; em-dash wins
/// when both are present. Without a separator the whole line is the card
/// type. Both parts are trimmed.
pub fn split_type_line(line: &str) -> (&str, &str) {
    let (left, right) = line
        .split_once('—')
        .or_else(|| line.split_once(" - "))
        .unwrap_or((line, ""));
    (left.trim(), right.trim())
}

/// Full color names for single-letter codes, joined by `", "`.
///
/// Unknown codes pass through unchanged; an empty list is `"Colorless"`.
pub fn color_names(codes: &[String]) -> String {
    if codes.is_empty() {
        return "Colorless".to_string();
    }
    codes
        .iter()
        .map(|code| match code.as_str() {
            "W" => "White",
            "U" => "Blue",
            "B" => "Black",
            "R" => "Red",
            "G" => "Green",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Uppercase the first character, leave the rest as is
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Numeric coercion for power/toughness: `"3"` → 3, `"*"` or blank → `Empty`
pub fn numeric_cell(value: Option<&str>) -> Cell {
    value
        .map(str::trim)
        .and_then(|v| v.parse::<f64>().ok())
        .map(Cell::number)
        .unwrap_or(Cell::Empty)
}

/// Enrichment cells for one input row
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    /// One cell per schema enrichment field, in schema order
    pub cells: Vec<Cell>,
    /// Whether the key matched a card record
    pub found: bool,
}

/// Projects card records onto the schema's enrichment fields
pub struct Enricher<'a> {
    index: &'a LookupIndex,
    schema: &'a Schema,
}

impl<'a> Enricher<'a> {
    pub fn new(index: &'a LookupIndex, schema: &'a Schema) -> Self {
        Self { index, schema }
    }

    /// Enrichment for `key`. A lookup miss yields all-`Empty` cells.
    pub fn enrich(&self, key: &str) -> Enrichment {
        match self.index.get(key) {
            Some(card) => Enrichment {
                cells: self.project(card),
                found: true,
            },
            None => Enrichment {
                cells: vec![Cell::Empty; self.schema.enrichment.len()],
                found: false,
            },
        }
    }

    fn project(&self, card: &CardRecord) -> Vec<Cell> {
        let (card_type, subtype) = split_type_line(card.type_line().unwrap_or_default());
        self.schema
            .enrichment
            .iter()
            .map(|field| match field {
                Field::CardName => Cell::text(card.name.as_str()),
                Field::Color => Cell::text(color_names(card.color_identity())),
                Field::Rarity => Cell::text(capitalize_first(card.rarity.as_deref().unwrap_or_default())),
                Field::ManaValue => card.cmc.map(Cell::number).unwrap_or_default(),
                Field::Power => numeric_cell(card.power()),
                Field::Toughness => numeric_cell(card.toughness()),
                Field::CardType => Cell::text(card_type),
                Field::Subtype => Cell::text(subtype),
                Field::SetName => Cell::text(card.set_name.as_deref().unwrap_or_default()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaVersion;
    use cardline_scryfall::CardFace;

    fn card(id: &str) -> CardRecord {
        CardRecord {
            id: id.into(),
            name: "Llanowar Elves".into(),
            cmc: Some(1.0),
            color_identity: Some(vec!["G".into()]),
            rarity: Some("common".into()),
            type_line: Some("Creature — Elf Druid".into()),
            set_name: Some("Dominaria".into()),
            power: Some("1".into()),
            toughness: Some("1".into()),
            card_faces: None,
        }
    }

    fn cell_strings(e: &Enrichment) -> Vec<String> {
        e.cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn em_dash_split() {
        assert_eq!(
            split_type_line("Legendary Creature — Elf Druid"),
            ("Legendary Creature", "Elf Druid")
        );
    }

    #[test]
    fn hyphen_split() {
        assert_eq!(split_type_line("Creature - Goblin"), ("Creature", "Goblin"));
    }

    #[test]
    fn em_dash_beats_hyphen() {
        assert_eq!(
            split_type_line("Creature - Test — Elf"),
            ("Creature - Test", "Elf")
        );
    }

    #[test]
    fn no_separator() {
        assert_eq!(split_type_line("Instant"), ("Instant", ""));
        assert_eq!(split_type_line(""), ("", ""));
        // bare hyphen without spaces is not a separator
        assert_eq!(split_type_line("Half-Elf"), ("Half-Elf", ""));
    }

    #[test]
    fn colors() {
        assert_eq!(color_names(&[]), "Colorless");
        assert_eq!(color_names(&["W".into(), "U".into()]), "White, Blue");
        assert_eq!(color_names(&["G".into(), "B".into()]), "Green, Black");
        assert_eq!(color_names(&["X".into(), "R".into()]), "X, Red");
    }

    #[test]
    fn rarity_capitalization() {
        assert_eq!(capitalize_first("mythic"), "Mythic");
        assert_eq!(capitalize_first("Rare"), "Rare");
        assert_eq!(capitalize_first("sPECIAL"), "SPECIAL");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(numeric_cell(Some("3")), Cell::Number(3.0));
        assert_eq!(numeric_cell(Some(" 2 ")), Cell::Number(2.0));
        assert_eq!(numeric_cell(Some("*")), Cell::Empty);
        assert_eq!(numeric_cell(Some("1+*")), Cell::Empty);
        assert_eq!(numeric_cell(Some("")), Cell::Empty);
        assert_eq!(numeric_cell(None), Cell::Empty);
    }

    #[test]
    fn found_card_v2() {
        let index = LookupIndex::from_records([card("a1")]);
        let schema = Schema::new(SchemaVersion::V2);
        let e = Enricher::new(&index, &schema).enrich("a1");
        assert!(e.found);
        assert_eq!(
            cell_strings(&e),
            [
                "Llanowar Elves",
                "Green",
                "Common",
                "1",
                "1",
                "1",
                "Creature",
                "Elf Druid",
                "Dominaria"
            ]
        );
        assert_eq!(e.cells[3], Cell::Number(1.0));
    }

    #[test]
    fn found_card_v1_has_no_power() {
        let index = LookupIndex::from_records([card("a1")]);
        let schema = Schema::new(SchemaVersion::V1);
        let e = Enricher::new(&index, &schema).enrich("a1");
        assert_eq!(e.cells.len(), 7);
        assert_eq!(e.cells[4], Cell::text("Creature"));
    }

    #[test]
    fn lookup_miss_is_blank_not_colorless() {
        let index = LookupIndex::from_records([card("a1")]);
        let schema = Schema::default();
        let e = Enricher::new(&index, &schema).enrich("abc-123");
        assert!(!e.found);
        assert_eq!(e.cells.len(), schema.enrichment.len());
        assert!(e.cells.iter().all(|c| *c == Cell::Empty));
    }

    #[test]
    fn found_card_without_colors_is_colorless() {
        let mut sol_ring = card("s1");
        sol_ring.color_identity = Some(vec![]);
        let index = LookupIndex::from_records([sol_ring]);
        let schema = Schema::default();
        let e = Enricher::new(&index, &schema).enrich("s1");
        assert_eq!(e.cells[1], Cell::text("Colorless"));
    }

    #[test]
    fn power_from_first_face() {
        let mut delver = card("d1");
        delver.power = None;
        delver.toughness = None;
        delver.card_faces = Some(vec![
            CardFace {
                power: Some("3".into()),
                toughness: Some("2".into()),
                ..Default::default()
            },
            CardFace {
                power: Some("5".into()),
                ..Default::default()
            },
        ]);
        let index = LookupIndex::from_records([delver]);
        let schema = Schema::new(SchemaVersion::V2);
        let e = Enricher::new(&index, &schema).enrich("d1");
        assert_eq!(e.cells[4], Cell::Number(3.0));
        assert_eq!(e.cells[5], Cell::Number(2.0));
    }

    #[test]
    fn variable_power_is_missing_not_zero() {
        let mut tarmogoyf = card("t1");
        tarmogoyf.power = Some("*".into());
        tarmogoyf.toughness = Some("1+*".into());
        let index = LookupIndex::from_records([tarmogoyf]);
        let schema = Schema::new(SchemaVersion::V2);
        let e = Enricher::new(&index, &schema).enrich("t1");
        assert_eq!(e.cells[4], Cell::Empty);
        assert_eq!(e.cells[5], Cell::Empty);
    }

    #[test]
    fn missing_fields_are_blank() {
        let bare = CardRecord {
            id: "b1".into(),
            name: "Token".into(),
            ..Default::default()
        };
        let index = LookupIndex::from_records([bare]);
        let schema = Schema::new(SchemaVersion::V2);
        let e = Enricher::new(&index, &schema).enrich("b1");
        assert_eq!(
            cell_strings(&e),
            ["Token", "Colorless", "", "", "", "", "", "", ""]
        );
    }
}
