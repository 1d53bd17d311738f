use cardline_core::LogSink;
use cardline_enrich::{Cell, EnrichConfig, Enricher, Frame, Schema, merge};
use cardline_scryfall::{CardRecord, LookupIndex};

const CARDS: usize = 50_000;

fn index() -> LookupIndex {
    LookupIndex::from_records((0..CARDS).map(|i| CardRecord {
        id: format!("{i:08x}-0000-4000-8000-000000000000"),
        name: format!("Card {i}"),
        cmc: Some((i % 8) as f64),
        color_identity: Some(vec!["W".into(), "U".into()]),
        rarity: Some("uncommon".into()),
        type_line: Some("Legendary Creature — Human Wizard".into()),
        set_name: Some("Bench Set".into()),
        power: Some("2".into()),
        toughness: Some("3".into()),
        card_faces: None,
    }))
}

fn input(rows: usize) -> Frame {
    let mut frame = Frame::new(vec![
        "Name".into(),
        "Quantity".into(),
        "Collector number".into(),
        "Scryfall ID".into(),
    ]);
    for i in 0..rows {
        frame.push_row(vec![
            Cell::text(format!("Card {i}")),
            Cell::Number(1.0),
            Cell::text(format!("{}", i % 300)),
            Cell::text(format!("{:08x}-0000-4000-8000-000000000000", i * 7 % CARDS)),
        ]);
    }
    frame
}

#[divan::bench]
fn enrich_lookup(bencher: divan::Bencher) {
    let index = index();
    let schema = Schema::default();
    let keys: Vec<String> = (0..10_000)
        .map(|i| format!("{:08x}-0000-4000-8000-000000000000", i * 13 % CARDS))
        .collect();
    bencher.bench(|| {
        let enricher = Enricher::new(&index, &schema);
        keys.iter().map(|k| enricher.enrich(k).cells.len()).sum::<usize>()
    });
}

#[divan::bench(args = [1_000, 10_000])]
fn merge_rows(bencher: divan::Bencher, rows: usize) {
    let index = index();
    let schema = Schema::default();
    let config = EnrichConfig::default();
    bencher
        .with_inputs(|| input(rows))
        .bench_values(|frame| merge(None, frame, &index, &schema, &config, &LogSink));
}

fn main() {
    divan::main();
}
