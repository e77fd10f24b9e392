use pocketfx_core::{EffectKind, EffectSource, ParseReport};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Below this confidence a parsed text counts as only partially understood.
pub const PARTIAL_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UnparsedEntry {
    pub card: String,
    pub name: String,
    pub source: EffectSource,
    pub text: String,
}

/// Parser coverage over a set of cards.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CoverageReport {
    pub cards: usize,
    pub texts: usize,
    pub parsed: usize,
    pub unparsed: usize,
    /// Parsed, but with confidence under [`PARTIAL_CONFIDENCE`].
    pub partial: usize,
    pub by_kind: BTreeMap<EffectKind, usize>,
    pub by_rule: BTreeMap<String, usize>,
    pub mean_confidence: f32,
    pub unparsed_entries: Vec<UnparsedEntry>,
    #[serde(skip)]
    confidence_total: f64,
}

impl CoverageReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(
        &mut self,
        card_id: &str,
        card_name: &str,
        source: EffectSource,
        text: &str,
        parsed: &ParseReport,
    ) {
        self.texts += 1;
        for descriptor in &parsed.descriptors {
            *self.by_kind.entry(descriptor.kind()).or_default() += 1;
        }
        for rule in &parsed.rules {
            *self.by_rule.entry(rule.clone()).or_default() += 1;
        }

        if parsed.descriptors.iter().any(|descriptor| descriptor.is_unparsed()) {
            self.unparsed += 1;
            self.unparsed_entries.push(UnparsedEntry {
                card: card_id.to_string(),
                name: card_name.to_string(),
                source,
                text: text.to_string(),
            });
        } else {
            self.parsed += 1;
            if parsed.confidence < PARTIAL_CONFIDENCE {
                self.partial += 1;
            }
        }
        self.confidence_total += f64::from(parsed.confidence);
        self.refresh_mean();
    }

    /// Folds `other` in after `self`; entry order follows merge order.
    pub fn merge(&mut self, other: CoverageReport) {
        self.cards += other.cards;
        self.texts += other.texts;
        self.parsed += other.parsed;
        self.unparsed += other.unparsed;
        self.partial += other.partial;
        for (kind, count) in other.by_kind {
            *self.by_kind.entry(kind).or_default() += count;
        }
        for (rule, count) in other.by_rule {
            *self.by_rule.entry(rule).or_default() += count;
        }
        self.unparsed_entries.extend(other.unparsed_entries);
        self.confidence_total += other.confidence_total;
        self.refresh_mean();
    }

    /// Share of texts with no unparsed remainder, in [0, 1].
    pub fn coverage(&self) -> f32 {
        if self.texts == 0 {
            return 1.0;
        }
        self.parsed as f32 / self.texts as f32
    }

    fn refresh_mean(&mut self) {
        self.mean_confidence = if self.texts == 0 {
            0.0
        } else {
            (self.confidence_total / self.texts as f64) as f32
        };
    }
}

fn source_label(source: EffectSource) -> String {
    match source {
        EffectSource::Attack(idx) => format!("attack #{idx}"),
        EffectSource::Ability(idx) => format!("ability #{idx}"),
        EffectSource::Trainer => "trainer".to_string(),
    }
}

/// Human-readable table of a report.
pub fn render_text(report: &CoverageReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "cards            {}", report.cards);
    let _ = writeln!(out, "effect texts     {}", report.texts);
    let _ = writeln!(
        out,
        "parsed           {} ({:.1}%)",
        report.parsed,
        report.coverage() * 100.0
    );
    let _ = writeln!(out, "partial          {}", report.partial);
    let _ = writeln!(out, "unparsed         {}", report.unparsed);
    let _ = writeln!(out, "mean confidence  {:.2}", report.mean_confidence);

    if !report.by_kind.is_empty() {
        let _ = writeln!(out, "\nby effect kind:");
        for (kind, count) in &report.by_kind {
            let _ = writeln!(out, "  {:<24} {count}", kind.id());
        }
    }
    if !report.by_rule.is_empty() {
        let _ = writeln!(out, "\nby rule:");
        for (rule, count) in &report.by_rule {
            let _ = writeln!(out, "  {rule:<24} {count}");
        }
    }
    if !report.unparsed_entries.is_empty() {
        let _ = writeln!(out, "\nneeds manual handling:");
        for entry in &report.unparsed_entries {
            let _ = writeln!(
                out,
                "  {} {} ({}): {}",
                entry.card,
                entry.name,
                source_label(entry.source),
                entry.text
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketfx_core::parse_detailed;

    #[test]
    fn record_splits_parsed_and_unparsed() {
        let mut report = CoverageReport::new();
        let text = "Heal 30 damage from this Pokémon.";
        report.record("a1-001", "Bulbasaur", EffectSource::Attack(0), text, &parse_detailed(text));
        let text = "Your opponent reveals their hand.";
        report.record("a1-002", "Ivysaur", EffectSource::Ability(0), text, &parse_detailed(text));

        assert_eq!(report.texts, 2);
        assert_eq!(report.parsed, 1);
        assert_eq!(report.unparsed, 1);
        assert_eq!(report.by_kind.get(&EffectKind::Heal), Some(&1));
        assert_eq!(report.by_kind.get(&EffectKind::RawUnparsed), Some(&1));
        assert_eq!(report.unparsed_entries[0].card, "a1-002");
        assert!((report.coverage() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn merge_adds_counts_and_keeps_entry_order() {
        let raw = "Your opponent reveals their hand.";
        let mut left = CoverageReport::new();
        left.cards = 1;
        left.record("a", "A", EffectSource::Trainer, raw, &parse_detailed(raw));
        let mut right = CoverageReport::new();
        right.cards = 1;
        right.record("b", "B", EffectSource::Trainer, raw, &parse_detailed(raw));

        left.merge(right);
        assert_eq!(left.cards, 2);
        assert_eq!(left.unparsed, 2);
        let order: Vec<&str> = left.unparsed_entries.iter().map(|e| e.card.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(left.mean_confidence, 0.0);
    }

    #[test]
    fn rendered_report_lists_manual_cards() {
        let raw = "Your opponent reveals their hand.";
        let mut report = CoverageReport::new();
        report.record("a1-200", "Sneasel", EffectSource::Attack(1), raw, &parse_detailed(raw));
        let text = render_text(&report);
        assert!(text.contains("needs manual handling:"));
        assert!(text.contains("a1-200 Sneasel (attack #1): Your opponent reveals their hand."));
        assert!(text.contains("raw_unparsed"));
    }
}
