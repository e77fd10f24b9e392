use pocketfx_core::{CardDef, CostSymbol, EffectKind, EffectSource, EnergyType};
use pocketfx_data::{classify_corpus, load_corpus, render_text};
use std::fs;
use std::path::Path;

fn write_cards(path: &Path, cards: &[CardDef]) {
    let json = serde_json::to_string_pretty(cards).expect("serialize cards");
    fs::write(path, json).expect("write cards");
}

fn starter_set() -> Vec<CardDef> {
    vec![
        CardDef::pokemon("a1-001", "Bulbasaur", 70, EnergyType::Grass).with_attack(
            "Vine Whip",
            &[CostSymbol::Typed(EnergyType::Grass), CostSymbol::Colorless],
            40,
            "",
        ),
        CardDef::pokemon("a1-029", "Petilil", 60, EnergyType::Grass).with_attack(
            "Blot",
            &[CostSymbol::Typed(EnergyType::Grass)],
            10,
            "Heal 10 damage from this Pokémon.",
        ),
        CardDef::pokemon("a1-095", "Raichu", 120, EnergyType::Lightning).with_attack(
            "Thunderbolt",
            &[CostSymbol::Typed(EnergyType::Lightning); 3],
            140,
            "Discard all Energy from this Pokémon.",
        ),
    ]
}

fn promo_set() -> Vec<CardDef> {
    vec![
        CardDef::pokemon("p-a-005", "Mewtwo ex", 150, EnergyType::Psychic)
            .with_attack(
                "Psydrive",
                &[CostSymbol::Typed(EnergyType::Psychic); 4],
                150,
                "Discard 2 {P} Energy from this Pokémon.",
            )
            .with_ability("Mind Reader", "Your opponent reveals their hand."),
        CardDef::trainer("p-a-007", "Professor's Research", "Draw 2 cards."),
        CardDef::trainer("p-a-002", "X Speed", "During this turn, the Retreat Cost of your Active Pokémon is 1 less."),
    ]
}

#[test]
fn directory_corpus_is_read_in_file_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_cards(&dir.path().join("b_promo.json"), &promo_set());
    write_cards(&dir.path().join("a_starter.json"), &starter_set());
    fs::write(dir.path().join("notes.txt"), "not a card file").expect("write notes");

    let cards = load_corpus(dir.path()).expect("load corpus");
    let ids: Vec<&str> = cards.iter().map(|card| card.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["a1-001", "a1-029", "a1-095", "p-a-005", "p-a-007", "p-a-002"]
    );
}

#[test]
fn single_file_corpus_loads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("starter.json");
    write_cards(&path, &starter_set());
    let cards = load_corpus(&path).expect("load corpus");
    assert_eq!(cards, starter_set());
}

#[test]
fn broken_card_file_names_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("broken.json"), "[{ \"id\": 3 ").expect("write broken");
    let err = load_corpus(dir.path()).expect_err("broken json");
    assert!(format!("{err:#}").contains("broken.json"));
}

#[test]
fn coverage_counts_every_text() {
    let mut cards = starter_set();
    cards.extend(promo_set());
    let report = classify_corpus(&cards, 1).expect("classify");

    assert_eq!(report.cards, 6);
    // Vine Whip has no text; Mewtwo ex contributes an attack and an ability.
    assert_eq!(report.texts, 6);
    assert_eq!(report.unparsed, 2);
    assert_eq!(report.parsed, 4);
    assert_eq!(report.by_kind.get(&EffectKind::EnergyDiscard), Some(&2));
    assert_eq!(report.by_kind.get(&EffectKind::Heal), Some(&1));
    assert_eq!(report.by_kind.get(&EffectKind::SearchOrDraw), Some(&1));
    assert_eq!(report.by_rule.get("energy_discard"), Some(&2));
    assert_eq!(report.by_rule.get("draw"), Some(&1));

    let manual: Vec<(&str, EffectSource)> = report
        .unparsed_entries
        .iter()
        .map(|entry| (entry.card.as_str(), entry.source))
        .collect();
    assert_eq!(
        manual,
        vec![
            ("p-a-005", EffectSource::Ability(0)),
            ("p-a-002", EffectSource::Trainer)
        ]
    );
    assert!(report.mean_confidence > 0.0 && report.mean_confidence < 1.0);
}

#[test]
fn thread_count_does_not_change_the_report() {
    let mut cards = Vec::new();
    for _ in 0..25 {
        cards.extend(starter_set());
        cards.extend(promo_set());
    }
    let serial = classify_corpus(&cards, 1).expect("serial");
    for threads in [2, 3, 8, 0] {
        let parallel = classify_corpus(&cards, threads).expect("parallel");
        assert_eq!(parallel.cards, serial.cards);
        assert_eq!(parallel.texts, serial.texts);
        assert_eq!(parallel.by_kind, serial.by_kind);
        assert_eq!(parallel.by_rule, serial.by_rule);
        assert_eq!(parallel.unparsed_entries, serial.unparsed_entries);
        assert!((parallel.mean_confidence - serial.mean_confidence).abs() < 1e-4);
    }
}

#[test]
fn empty_corpus_reports_nothing() {
    let report = classify_corpus(&[], 4).expect("classify");
    assert_eq!(report.texts, 0);
    assert!(render_text(&report).contains("effect texts     0"));
}

#[test]
fn report_serializes_kind_keys_as_names() {
    let report = classify_corpus(&starter_set(), 2).expect("classify");
    let json = serde_json::to_value(&report).expect("json");
    assert_eq!(json["by_kind"]["Heal"], 1);
    assert!(json.get("confidence_total").is_none());
}
