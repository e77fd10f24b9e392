use crate::{CostSymbol, EnergyType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardCategory {
    Pokemon,
    Trainer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttackDef {
    pub name: String,
    #[serde(default)]
    pub cost: Vec<CostSymbol>,
    #[serde(default)]
    pub damage: u32,
    #[serde(default)]
    pub effect: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AbilityDef {
    pub name: String,
    #[serde(default)]
    pub effect: String,
}

/// Immutable card record as handed over by the card collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardDef {
    pub id: String,
    pub name: String,
    pub category: CardCategory,
    #[serde(default)]
    pub hp: u32,
    #[serde(default)]
    pub energy_type: Option<EnergyType>,
    #[serde(default)]
    pub attacks: Vec<AttackDef>,
    #[serde(default)]
    pub abilities: Vec<AbilityDef>,
    /// Trainer card text.
    #[serde(default)]
    pub effect: String,
}

/// Where an effect text came from on its card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EffectSource {
    Attack(usize),
    Ability(usize),
    Trainer,
}

impl CardDef {
    pub fn pokemon(id: &str, name: &str, hp: u32, energy_type: EnergyType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: CardCategory::Pokemon,
            hp,
            energy_type: Some(energy_type),
            attacks: Vec::new(),
            abilities: Vec::new(),
            effect: String::new(),
        }
    }

    pub fn trainer(id: &str, name: &str, effect: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: CardCategory::Trainer,
            hp: 0,
            energy_type: None,
            attacks: Vec::new(),
            abilities: Vec::new(),
            effect: effect.to_string(),
        }
    }

    pub fn with_attack(mut self, name: &str, cost: &[CostSymbol], damage: u32, effect: &str) -> Self {
        self.attacks.push(AttackDef {
            name: name.to_string(),
            cost: cost.to_vec(),
            damage,
            effect: effect.to_string(),
        });
        self
    }

    pub fn with_ability(mut self, name: &str, effect: &str) -> Self {
        self.abilities.push(AbilityDef {
            name: name.to_string(),
            effect: effect.to_string(),
        });
        self
    }

    /// Every non-empty effect text on the card, in printed order.
    pub fn effect_texts(&self) -> Vec<(EffectSource, &str)> {
        let mut out = Vec::new();
        for (idx, attack) in self.attacks.iter().enumerate() {
            if !attack.effect.trim().is_empty() {
                out.push((EffectSource::Attack(idx), attack.effect.as_str()));
            }
        }
        for (idx, ability) in self.abilities.iter().enumerate() {
            if !ability.effect.trim().is_empty() {
                out.push((EffectSource::Ability(idx), ability.effect.as_str()));
            }
        }
        if !self.effect.trim().is_empty() {
            out.push((EffectSource::Trainer, self.effect.as_str()));
        }
        out
    }
}

impl AttackDef {
    /// Cost units demanded of one named type (colorless symbols excluded).
    pub fn cost_of(&self, kind: EnergyType) -> u32 {
        self.cost
            .iter()
            .filter(|symbol| **symbol == CostSymbol::Typed(kind))
            .count() as u32
    }

    pub fn cost_total(&self) -> u32 {
        self.cost.len() as u32
    }
}
