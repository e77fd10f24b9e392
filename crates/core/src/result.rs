use crate::{ApplyOutcome, EffectKind, EnergyTarget, EnergyType, StatusKind};
use serde::{Deserialize, Serialize};

/// Which side of the exchange a change landed on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Participant {
    Attacker,
    Defender,
    /// Own bench occupants.
    Bench,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoinFlipRecord {
    pub effect: EffectKind,
    /// `true` is heads.
    pub flips: Vec<bool>,
    pub heads: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusDelta {
    pub kind: StatusKind,
    pub target: Participant,
    pub outcome: ApplyOutcome,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EnergyDirection {
    Gain,
    Loss,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnergyDelta {
    pub direction: EnergyDirection,
    pub energy: EnergyType,
    pub amount: u32,
    pub target: Participant,
    /// `false` when the caller still has to place the energy (see
    /// `PendingAction::DistributeEnergy`).
    pub applied: bool,
}

/// Work the engine cannot finish on its own and hands back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PendingAction {
    DistributeEnergy {
        energy: EnergyType,
        amount: u32,
        target: EnergyTarget,
    },
    Draw(u32),
    Search { criteria: String },
    ManualEffect { text: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HandlerStatus {
    /// Changed the board or the damage total.
    Applied,
    /// Ran, but its condition or its coins said nothing happens.
    NoEffect,
    /// Produced a pending action for the caller.
    Deferred,
    /// Raw text that needs a hand-written implementation.
    NeedsManual,
    /// No handler registered for the kind.
    NotImplemented,
    /// Skipped because an earlier effect cancelled the attack.
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EffectRecord {
    pub kind: EffectKind,
    pub status: HandlerStatus,
    pub description: String,
}

/// What one handler produced. The executor folds these into an
/// `EffectExecutionResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectOutcome {
    pub kind: EffectKind,
    pub status: HandlerStatus,
    pub bonus_damage: u32,
    pub negates_attack: bool,
    pub coin_flips: Vec<CoinFlipRecord>,
    pub status_changes: Vec<StatusDelta>,
    pub energy_changes: Vec<EnergyDelta>,
    pub healed: u32,
    pub pending: Vec<PendingAction>,
    pub notes: Vec<String>,
}

impl EffectOutcome {
    pub fn new(kind: EffectKind, status: HandlerStatus) -> Self {
        Self {
            kind,
            status,
            bonus_damage: 0,
            negates_attack: false,
            coin_flips: Vec::new(),
            status_changes: Vec::new(),
            energy_changes: Vec::new(),
            healed: 0,
            pending: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn applied(kind: EffectKind) -> Self {
        Self::new(kind, HandlerStatus::Applied)
    }

    pub fn no_effect(kind: EffectKind, note: impl Into<String>) -> Self {
        Self::new(kind, HandlerStatus::NoEffect).note(note)
    }

    pub fn not_implemented(kind: EffectKind) -> Self {
        Self::new(kind, HandlerStatus::NotImplemented)
            .note(format!("no handler registered for {kind}"))
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_status(mut self, status: HandlerStatus) -> Self {
        self.status = status;
        self
    }
}

/// Everything one resolution did, in execution order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EffectExecutionResult {
    pub base_damage: u32,
    pub bonus_damage: u32,
    /// Zero whenever the attack was negated.
    pub total_damage: u32,
    pub attack_negated: bool,
    /// Damage actually removed from the defender, when the engine applied it.
    pub damage_dealt: Option<u32>,
    pub knocked_out: bool,
    pub coin_flips: Vec<CoinFlipRecord>,
    pub status_changes: Vec<StatusDelta>,
    pub energy_changes: Vec<EnergyDelta>,
    pub healed: u32,
    pub pending: Vec<PendingAction>,
    pub effects: Vec<EffectRecord>,
    pub trace: Vec<String>,
}

impl EffectExecutionResult {
    pub fn new(base_damage: u32) -> Self {
        Self {
            base_damage,
            total_damage: base_damage,
            ..Self::default()
        }
    }

    pub fn absorb(&mut self, outcome: EffectOutcome, description: String) {
        self.bonus_damage = self.bonus_damage.saturating_add(outcome.bonus_damage);
        self.attack_negated |= outcome.negates_attack;
        self.coin_flips.extend(outcome.coin_flips);
        self.status_changes.extend(outcome.status_changes);
        self.energy_changes.extend(outcome.energy_changes);
        self.healed = self.healed.saturating_add(outcome.healed);
        self.pending.extend(outcome.pending);
        for note in outcome.notes {
            self.trace.push(format!("{}: {note}", outcome.kind));
        }
        self.effects.push(EffectRecord {
            kind: outcome.kind,
            status: outcome.status,
            description,
        });
        self.refresh_total();
    }

    pub fn negate(&mut self, reason: &str) {
        self.attack_negated = true;
        self.trace.push(reason.to_string());
        self.refresh_total();
    }

    fn refresh_total(&mut self) {
        self.total_damage = if self.attack_negated {
            0
        } else {
            self.base_damage.saturating_add(self.bonus_damage)
        };
    }

    /// Effects that changed something on the board or in the damage total.
    pub fn executed_count(&self) -> usize {
        self.effects
            .iter()
            .filter(|record| record.status == HandlerStatus::Applied)
            .count()
    }

    pub fn count_with(&self, status: HandlerStatus) -> usize {
        self.effects
            .iter()
            .filter(|record| record.status == status)
            .count()
    }

    pub fn needs_manual(&self) -> bool {
        self.effects.iter().any(|record| {
            matches!(
                record.status,
                HandlerStatus::NeedsManual | HandlerStatus::NotImplemented
            )
        })
    }

    pub fn energy_gained(&self, energy: EnergyType) -> u32 {
        self.energy_changes
            .iter()
            .filter(|delta| delta.direction == EnergyDirection::Gain && delta.energy == energy)
            .map(|delta| delta.amount)
            .sum()
    }

    pub fn heads(&self) -> u32 {
        self.coin_flips.iter().map(|record| record.heads).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_zeroes_total_even_with_bonus() {
        let mut result = EffectExecutionResult::new(40);
        let mut bonus = EffectOutcome::applied(EffectKind::DamageBonus);
        bonus.bonus_damage = 30;
        result.absorb(bonus, "+30 damage".to_string());
        assert_eq!(result.total_damage, 70);
        result.negate("attack does nothing");
        assert_eq!(result.total_damage, 0);
        assert_eq!(result.bonus_damage, 30);
    }

    #[test]
    fn only_applied_effects_count_as_executed() {
        let mut result = EffectExecutionResult::new(0);
        result.absorb(
            EffectOutcome::new(EffectKind::RawUnparsed, HandlerStatus::NeedsManual),
            "manual".to_string(),
        );
        result.absorb(EffectOutcome::applied(EffectKind::Heal), "heal".to_string());
        assert_eq!(result.executed_count(), 1);
        assert!(result.needs_manual());
    }
}
