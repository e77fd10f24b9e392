use crate::{DiscardCount, EnergyError, EnergyTarget, EnergyType, HealTarget, Side, StatusKind, StatusTarget};
use regex_lite::Captures;
use tracing::warn;

/// Lower-cases, folds accents and typographic apostrophes, and collapses
/// whitespace so rule patterns only deal with one spelling.
pub(crate) fn normalize(text: &str) -> String {
    let folded: String = text
        .chars()
        .map(|ch| match ch {
            'é' | 'É' => 'e',
            '’' | '‘' => '\'',
            '\n' | '\t' | '\r' => ' ',
            _ => ch,
        })
        .collect();
    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn number_word(value: &str) -> Option<u32> {
    match value {
        "a" | "an" | "one" | "a random" => Some(1),
        "two" | "both" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        _ => value.parse().ok(),
    }
}

/// Numeric capture, falling back to 0 with a warning when it is missing or
/// does not parse.
pub(crate) fn number(caps: &Captures<'_>, idx: usize, rule: &str) -> u32 {
    let Some(raw) = caps.get(idx).map(|m| m.as_str()) else {
        warn!(rule, group = idx, "missing numeric capture, using 0");
        return 0;
    };
    match number_word(raw.trim()) {
        Some(value) => value,
        None => {
            warn!(rule, value = raw, "invalid numeric token, using 0");
            0
        }
    }
}

/// Optional energy-type capture. A present token that is the wildcard or
/// unknown rejects the whole rule match.
pub(crate) fn energy(
    caps: &Captures<'_>,
    idx: usize,
    rule: &str,
) -> Result<Option<EnergyType>, EnergyError> {
    let Some(raw) = caps.get(idx).map(|m| m.as_str()) else {
        return Ok(None);
    };
    EnergyType::from_token(raw).map(Some).map_err(|err| {
        warn!(rule, token = raw, %err, "rejected energy token");
        err
    })
}

pub(crate) fn discard_count(caps: &Captures<'_>, idx: usize, rule: &str) -> DiscardCount {
    match caps.get(idx).map(|m| m.as_str()) {
        Some("all") => DiscardCount::All,
        _ => DiscardCount::Count(number(caps, idx, rule)),
    }
}

pub(crate) fn status(caps: &Captures<'_>, idx: usize) -> Option<StatusKind> {
    caps.get(idx).and_then(|m| StatusKind::from_word(m.as_str()))
}

pub(crate) fn status_target(phrase: Option<&str>) -> StatusTarget {
    match phrase {
        Some(phrase) if phrase.starts_with("this") => StatusTarget::This,
        _ => StatusTarget::Opponent,
    }
}

pub(crate) fn side(phrase: Option<&str>) -> Side {
    match phrase {
        Some(phrase) if phrase.contains("opponent") => Side::Opponent,
        _ => Side::Own,
    }
}

pub(crate) fn energy_target(phrase: Option<&str>) -> EnergyTarget {
    match phrase {
        Some(phrase) if phrase.contains("benched") => EnergyTarget::Bench,
        Some(phrase) if phrase.starts_with("this") || phrase.contains("active") => {
            EnergyTarget::This
        }
        Some(_) => EnergyTarget::AnyOwn,
        None => EnergyTarget::This,
    }
}

pub(crate) fn heal_target(phrase: Option<&str>) -> HealTarget {
    match phrase {
        Some(phrase) if phrase.starts_with("each") => HealTarget::EachOwn,
        Some(phrase) if phrase.starts_with("1 of") => HealTarget::AnyOwn,
        _ => HealTarget::This,
    }
}

/// True when the sentence holding byte `at` opens with a coin flip or an
/// `if`, so whatever follows is gated.
pub(crate) fn inside_gated_sentence(text: &str, at: usize) -> bool {
    let opening = text[..at].rfind('.').map(|idx| idx + 1).unwrap_or(0);
    let sentence = text[opening..at].trim_start();
    sentence.starts_with("if ") || sentence.starts_with("flip ")
}

/// Splits "wishiwashi or wishiwashi ex" style name lists.
pub(crate) fn name_list(phrase: &str) -> Vec<String> {
    phrase
        .replace(" and ", ",")
        .replace(" or ", ",")
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}
