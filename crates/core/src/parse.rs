//! Card text to effect descriptors.
//!
//! Every rule of the fixed table runs against the normalized text and every
//! match is collected; conflicts between overlapping matches are settled later
//! by the priority resolver, never here. The one exception is positional:
//! a plain clause rule never fires inside a sentence that opens with a coin
//! flip or an `if`, since there it is only the consequence of a gate.

use crate::EffectDescriptor;
use serde::{Deserialize, Serialize};
use tracing::debug;

mod rules;
mod tokens;

pub(crate) use rules::RULES;
use rules::{compiled_rules, Clause};
use tokens::{inside_gated_sentence, normalize};

/// Parse output with the advisory data the bulk classifier reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseReport {
    pub descriptors: Vec<EffectDescriptor>,
    /// Ids of the rules that produced a descriptor, in table order.
    pub rules: Vec<String>,
    /// Share of the text's letters and digits covered by rule matches. Never
    /// used to decide whether an effect runs.
    pub confidence: f32,
}

/// Never fails. Text no rule recognizes becomes a single `RawUnparsed`
/// descriptor; blank text has no effect at all.
pub fn parse(text: &str) -> Vec<EffectDescriptor> {
    parse_detailed(text).descriptors
}

pub fn parse_detailed(text: &str) -> ParseReport {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return ParseReport {
            descriptors: Vec::new(),
            rules: Vec::new(),
            confidence: 1.0,
        };
    }

    let mut descriptors = Vec::new();
    let mut fired = Vec::new();
    let mut covered = vec![false; normalized.len()];
    for compiled in compiled_rules() {
        for caps in compiled.regex.captures_iter(&normalized) {
            let Some(span) = caps.get(0) else {
                continue;
            };
            if compiled.rule.clause == Clause::Plain
                && inside_gated_sentence(&normalized, span.start())
            {
                debug!(rule = compiled.rule.id, at = span.start(), "skipped gated clause");
                continue;
            }
            let Some(descriptor) = (compiled.rule.build)(&caps, compiled.rule.id) else {
                continue;
            };
            debug_assert_eq!(descriptor.kind(), compiled.rule.kind);
            covered[span.start()..span.end()]
                .iter_mut()
                .for_each(|flag| *flag = true);
            debug!(rule = compiled.rule.id, effect = %descriptor, "rule matched");
            if !fired.iter().any(|id: &String| id == compiled.rule.id) {
                fired.push(compiled.rule.id.to_string());
            }
            descriptors.push(descriptor);
        }
    }

    if descriptors.is_empty() {
        debug!(text, "no rule matched");
        return ParseReport {
            descriptors: vec![EffectDescriptor::raw(text)],
            rules: Vec::new(),
            confidence: 0.0,
        };
    }

    ParseReport {
        descriptors,
        rules: fired,
        confidence: coverage(&normalized, &covered),
    }
}

fn coverage(text: &str, covered: &[bool]) -> f32 {
    let mut total = 0usize;
    let mut hit = 0usize;
    for (idx, byte) in text.bytes().enumerate() {
        if byte.is_ascii_alphanumeric() {
            total += 1;
            if covered[idx] {
                hit += 1;
            }
        }
    }
    if total == 0 {
        return 0.0;
    }
    hit as f32 / total as f32
}

/// Ids of every rule in the table, in evaluation order.
pub fn rule_ids() -> Vec<&'static str> {
    RULES.iter().map(|rule| rule.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;

    #[test]
    fn unmatched_text_keeps_original_verbatim() {
        let text = "Your opponent reveals their hand.";
        assert_eq!(
            parse(text),
            vec![EffectDescriptor::RawUnparsed(RawUnparsed {
                text: text.to_string()
            })]
        );
    }

    #[test]
    fn blank_text_has_no_effect() {
        assert!(parse("   ").is_empty());
    }

    #[test]
    fn full_clause_coverage_scores_high() {
        let report = parse_detailed("Heal 30 damage from this Pokémon.");
        assert_eq!(report.rules, vec!["heal".to_string()]);
        assert!(report.confidence > 0.99, "{}", report.confidence);
    }

    #[test]
    fn partial_coverage_scores_between_zero_and_one() {
        let report =
            parse_detailed("Heal 30 damage from this Pokémon. Your opponent reveals their hand.");
        assert!(report.confidence > 0.0 && report.confidence < 0.6);
    }

    #[test]
    fn unknown_gate_leaves_its_consequence_unparsed() {
        let text = "If your opponent's Active Pokémon is a Pokémon ex, this attack does 30 more damage.";
        let report = parse_detailed(text);
        assert_eq!(report.descriptors, vec![EffectDescriptor::raw(text)]);
        assert!(report.rules.is_empty());
    }

    #[test]
    fn plain_clause_after_a_gated_sentence_still_fires() {
        let report = parse_detailed(
            "Flip a coin. If heads, this attack does 20 more damage. Draw a card.",
        );
        assert_eq!(
            report.rules,
            vec!["coin_bonus".to_string(), "draw".to_string()]
        );
    }

    #[test]
    fn raw_text_scores_zero() {
        assert_eq!(parse_detailed("Shuffle your hand.").confidence, 0.0);
    }
}
