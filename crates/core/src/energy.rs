use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// The eight named energy types. Only these can ever be generated or attached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnergyType {
    Grass,
    Fire,
    Water,
    Lightning,
    Psychic,
    Fighting,
    Darkness,
    Metal,
}

impl EnergyType {
    pub const ALL: [Self; 8] = [
        Self::Grass,
        Self::Fire,
        Self::Water,
        Self::Lightning,
        Self::Psychic,
        Self::Fighting,
        Self::Darkness,
        Self::Metal,
    ];

    pub fn symbol(self) -> char {
        match self {
            Self::Grass => 'G',
            Self::Fire => 'R',
            Self::Water => 'W',
            Self::Lightning => 'L',
            Self::Psychic => 'P',
            Self::Fighting => 'F',
            Self::Darkness => 'D',
            Self::Metal => 'M',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Grass => "grass",
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Lightning => "lightning",
            Self::Psychic => "psychic",
            Self::Fighting => "fighting",
            Self::Darkness => "darkness",
            Self::Metal => "metal",
        }
    }

    /// Resolve a printed token to a named type. The colorless wildcard is a
    /// cost requirement only and is rejected here.
    pub fn from_token(token: &str) -> Result<Self, EnergyError> {
        match CostSymbol::from_token(token)? {
            CostSymbol::Typed(kind) => Ok(kind),
            CostSymbol::Colorless => Err(EnergyError::Wildcard(token.to_string())),
        }
    }
}

impl fmt::Display for EnergyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnergyError {
    #[error("unknown energy token '{0}'")]
    UnknownToken(String),
    #[error("wildcard energy '{0}' cannot be generated or attached")]
    Wildcard(String),
}

/// One symbol of an attack cost. `Colorless` is satisfied by any energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CostSymbol {
    Typed(EnergyType),
    Colorless,
}

const TOKEN_TABLE: &[(&str, CostSymbol)] = &[
    ("g", CostSymbol::Typed(EnergyType::Grass)),
    ("grass", CostSymbol::Typed(EnergyType::Grass)),
    ("r", CostSymbol::Typed(EnergyType::Fire)),
    ("fire", CostSymbol::Typed(EnergyType::Fire)),
    ("w", CostSymbol::Typed(EnergyType::Water)),
    ("water", CostSymbol::Typed(EnergyType::Water)),
    ("l", CostSymbol::Typed(EnergyType::Lightning)),
    ("lightning", CostSymbol::Typed(EnergyType::Lightning)),
    ("electric", CostSymbol::Typed(EnergyType::Lightning)),
    ("p", CostSymbol::Typed(EnergyType::Psychic)),
    ("psychic", CostSymbol::Typed(EnergyType::Psychic)),
    ("f", CostSymbol::Typed(EnergyType::Fighting)),
    ("fighting", CostSymbol::Typed(EnergyType::Fighting)),
    ("d", CostSymbol::Typed(EnergyType::Darkness)),
    ("darkness", CostSymbol::Typed(EnergyType::Darkness)),
    ("dark", CostSymbol::Typed(EnergyType::Darkness)),
    ("m", CostSymbol::Typed(EnergyType::Metal)),
    ("metal", CostSymbol::Typed(EnergyType::Metal)),
    ("steel", CostSymbol::Typed(EnergyType::Metal)),
    ("c", CostSymbol::Colorless),
    ("colorless", CostSymbol::Colorless),
];

impl CostSymbol {
    /// Accepts `{R}`, `R`, `fire`, `Fire` and so on.
    pub fn from_token(token: &str) -> Result<Self, EnergyError> {
        let cleaned = token
            .trim()
            .trim_start_matches('{')
            .trim_end_matches('}')
            .to_ascii_lowercase();
        TOKEN_TABLE
            .iter()
            .find(|(key, _)| *key == cleaned)
            .map(|(_, symbol)| *symbol)
            .ok_or_else(|| EnergyError::UnknownToken(token.to_string()))
    }

    pub fn token(self) -> String {
        match self {
            Self::Typed(kind) => format!("{{{}}}", kind.symbol()),
            Self::Colorless => "{C}".to_string(),
        }
    }
}

impl Serialize for CostSymbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.token())
    }
}

impl<'de> Deserialize<'de> for CostSymbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_token(&raw).map_err(serde::de::Error::custom)
    }
}

/// Attached-energy multiset. Ordered so iteration never depends on hashing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnergyPool {
    units: BTreeMap<EnergyType, u32>,
}

impl EnergyPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(units: &[(EnergyType, u32)]) -> Self {
        let mut pool = Self::new();
        for (kind, count) in units {
            pool.attach_many(*kind, *count);
        }
        pool
    }

    pub fn attach(&mut self, kind: EnergyType) {
        self.attach_many(kind, 1);
    }

    pub fn attach_many(&mut self, kind: EnergyType, count: u32) {
        if count == 0 {
            return;
        }
        let entry = self.units.entry(kind).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Removes up to `count` units of `kind`; returns how many were removed.
    pub fn discard(&mut self, kind: EnergyType, count: u32) -> u32 {
        let Some(entry) = self.units.get_mut(&kind) else {
            return 0;
        };
        let removed = (*entry).min(count);
        *entry -= removed;
        if *entry == 0 {
            self.units.remove(&kind);
        }
        removed
    }

    /// Removes up to `count` units of any type, taking from the first types in
    /// ordered position. Returns the removed units in removal order.
    pub fn discard_any(&mut self, count: u32) -> Vec<(EnergyType, u32)> {
        let mut remaining = count;
        let mut removed = Vec::new();
        let kinds: Vec<EnergyType> = self.units.keys().copied().collect();
        for kind in kinds {
            if remaining == 0 {
                break;
            }
            let taken = self.discard(kind, remaining);
            if taken > 0 {
                removed.push((kind, taken));
                remaining -= taken;
            }
        }
        removed
    }

    pub fn discard_all(&mut self) -> Vec<(EnergyType, u32)> {
        let removed = self.units.iter().map(|(k, v)| (*k, *v)).collect();
        self.units.clear();
        removed
    }

    pub fn count_of(&self, kind: EnergyType) -> u32 {
        self.units.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.units.values().sum()
    }

    /// `None` counts every attached unit.
    pub fn count(&self, kind: Option<EnergyType>) -> u32 {
        match kind {
            Some(kind) => self.count_of(kind),
            None => self.total(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EnergyType, u32)> + '_ {
        self.units.iter().map(|(k, v)| (*k, *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_resolve_through_symbol_table() {
        assert_eq!(EnergyType::from_token("{R}"), Ok(EnergyType::Fire));
        assert_eq!(EnergyType::from_token("water"), Ok(EnergyType::Water));
        assert_eq!(EnergyType::from_token("{d}"), Ok(EnergyType::Darkness));
        assert_eq!(
            CostSymbol::from_token("{C}"),
            Ok(CostSymbol::Colorless)
        );
    }

    #[test]
    fn wildcard_is_rejected_as_named_type() {
        assert!(matches!(
            EnergyType::from_token("{C}"),
            Err(EnergyError::Wildcard(_))
        ));
        assert!(matches!(
            EnergyType::from_token("rainbow"),
            Err(EnergyError::UnknownToken(_))
        ));
    }

    #[test]
    fn discard_never_underflows() {
        let mut pool = EnergyPool::with(&[(EnergyType::Fire, 2)]);
        assert_eq!(pool.discard(EnergyType::Fire, 5), 2);
        assert_eq!(pool.discard(EnergyType::Fire, 1), 0);
        assert_eq!(pool.discard(EnergyType::Water, 1), 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn discard_any_takes_in_type_order() {
        let mut pool = EnergyPool::with(&[(EnergyType::Water, 1), (EnergyType::Grass, 2)]);
        let removed = pool.discard_any(2);
        assert_eq!(removed, vec![(EnergyType::Grass, 2)]);
        assert_eq!(pool.total(), 1);
    }

    #[test]
    fn cost_symbols_serialize_as_tokens() {
        let json = serde_json::to_string(&vec![
            CostSymbol::Typed(EnergyType::Lightning),
            CostSymbol::Colorless,
        ])
        .expect("serialize");
        assert_eq!(json, r#"["{L}","{C}"]"#);
        let back: Vec<CostSymbol> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.len(), 2);
    }
}
