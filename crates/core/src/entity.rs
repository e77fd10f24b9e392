use crate::{EnergyPool, EnergyType, StatusSet};
use serde::{Deserialize, Serialize};

pub const BENCH_SLOTS: usize = 3;

/// A reserve combatant sitting in a bench slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BenchOccupant {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    #[serde(default)]
    pub energy: EnergyPool,
}

impl BenchOccupant {
    pub fn new(name: &str, max_hp: u32) -> Self {
        Self {
            name: name.to_string(),
            hp: max_hp,
            max_hp,
            energy: EnergyPool::new(),
        }
    }

    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_hp.saturating_sub(self.hp));
        self.hp += healed;
        healed
    }
}

/// Capability interface every battle-entity implementation provides to the
/// effect engine.
pub trait BattleEntity {
    fn name(&self) -> &str;
    fn energy_type(&self) -> EnergyType;
    fn current_hp(&self) -> u32;
    fn max_hp(&self) -> u32;
    /// Clamps at zero; returns the damage actually taken.
    fn take_damage(&mut self, amount: u32) -> u32;
    /// Clamps at `max_hp`; returns the HP actually restored.
    fn heal(&mut self, amount: u32) -> u32;
    fn energy(&self) -> &EnergyPool;
    fn energy_mut(&mut self) -> &mut EnergyPool;
    fn conditions(&self) -> &StatusSet;
    fn conditions_mut(&mut self) -> &mut StatusSet;
    fn bench(&self) -> &[Option<BenchOccupant>];
    fn bench_mut(&mut self) -> &mut [Option<BenchOccupant>];

    fn attach_energy(&mut self, kind: EnergyType) {
        self.energy_mut().attach(kind);
    }

    /// `false` when no unit of `kind` was attached.
    fn discard_energy(&mut self, kind: EnergyType) -> bool {
        self.energy_mut().discard(kind, 1) == 1
    }

    fn is_knocked_out(&self) -> bool {
        self.current_hp() == 0
    }

    fn damage_taken(&self) -> u32 {
        self.max_hp().saturating_sub(self.current_hp())
    }

    fn occupied_bench(&self) -> usize {
        self.bench().iter().filter(|slot| slot.is_some()).count()
    }
}

/// Plain in-memory battle entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Combatant {
    pub name: String,
    pub energy_type: EnergyType,
    pub hp: u32,
    pub max_hp: u32,
    #[serde(default)]
    pub energy: EnergyPool,
    #[serde(default)]
    pub conditions: StatusSet,
    #[serde(default)]
    pub bench: Vec<Option<BenchOccupant>>,
}

impl Combatant {
    pub fn new(name: &str, energy_type: EnergyType, max_hp: u32) -> Self {
        Self {
            name: name.to_string(),
            energy_type,
            hp: max_hp,
            max_hp,
            energy: EnergyPool::new(),
            conditions: StatusSet::new(),
            bench: vec![None; BENCH_SLOTS],
        }
    }

    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = hp.min(self.max_hp);
        self
    }

    pub fn with_energy(mut self, kind: EnergyType, count: u32) -> Self {
        self.energy.attach_many(kind, count);
        self
    }

    /// Fills the first free slot; extra occupants past the bench size are
    /// ignored.
    pub fn with_bench(mut self, occupant: BenchOccupant) -> Self {
        if let Some(slot) = self.bench.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(occupant);
        }
        self
    }
}

impl BattleEntity for Combatant {
    fn name(&self) -> &str {
        &self.name
    }

    fn energy_type(&self) -> EnergyType {
        self.energy_type
    }

    fn current_hp(&self) -> u32 {
        self.hp
    }

    fn max_hp(&self) -> u32 {
        self.max_hp
    }

    fn take_damage(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.hp);
        self.hp -= taken;
        taken
    }

    fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_hp.saturating_sub(self.hp));
        self.hp += healed;
        healed
    }

    fn energy(&self) -> &EnergyPool {
        &self.energy
    }

    fn energy_mut(&mut self) -> &mut EnergyPool {
        &mut self.energy
    }

    fn conditions(&self) -> &StatusSet {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut StatusSet {
        &mut self.conditions
    }

    fn bench(&self) -> &[Option<BenchOccupant>] {
        &self.bench
    }

    fn bench_mut(&mut self) -> &mut [Option<BenchOccupant>] {
        &mut self.bench
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_and_heal_clamp() {
        let mut mon = Combatant::new("Pikachu", EnergyType::Lightning, 60);
        assert_eq!(mon.take_damage(40), 40);
        assert_eq!(mon.take_damage(40), 20);
        assert!(mon.is_knocked_out());
        assert_eq!(mon.heal(100), 60);
        assert_eq!(mon.current_hp(), 60);
        assert_eq!(mon.heal(10), 0);
    }

    #[test]
    fn bench_fills_free_slots_only() {
        let mon = Combatant::new("Wishiwashi", EnergyType::Water, 40)
            .with_bench(BenchOccupant::new("Wishiwashi", 40))
            .with_bench(BenchOccupant::new("Wishiwashi ex", 130))
            .with_bench(BenchOccupant::new("Staryu", 50))
            .with_bench(BenchOccupant::new("Starmie", 90));
        assert_eq!(mon.occupied_bench(), BENCH_SLOTS);
        assert_eq!(mon.bench().len(), BENCH_SLOTS);
    }

    #[test]
    fn discard_energy_reports_absence() {
        let mut mon = Combatant::new("Charmander", EnergyType::Fire, 60).with_energy(EnergyType::Fire, 1);
        assert!(mon.discard_energy(EnergyType::Fire));
        assert!(!mon.discard_energy(EnergyType::Fire));
        assert_eq!(mon.energy().total(), 0);
    }
}
