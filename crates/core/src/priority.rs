use crate::{EffectDescriptor, EffectKind, Mechanism};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coarse execution rank; lower runs first and wins conflicts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriorityClass {
    CoinFlip = 1,
    Status = 2,
    DamageModifier = 3,
    Healing = 4,
    Energy = 5,
}

impl PriorityClass {
    pub fn rank(self) -> u8 {
        self as u8
    }
}

/// Full sort key: class first, then how specific the matching family is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Priority {
    pub class: PriorityClass,
    pub specificity: u8,
}

pub const PRIORITY_TABLE: &[(EffectKind, PriorityClass, u8)] = &[
    (EffectKind::CoinFlipEnergy, PriorityClass::CoinFlip, 0),
    (EffectKind::CoinFlipConditional, PriorityClass::CoinFlip, 1),
    (EffectKind::CoinFlipDamage, PriorityClass::CoinFlip, 2),
    (EffectKind::StatusApplyRandom, PriorityClass::Status, 0),
    (EffectKind::StatusApply, PriorityClass::Status, 1),
    (EffectKind::ConditionalDamage, PriorityClass::DamageModifier, 0),
    (EffectKind::EnergyScalingDamage, PriorityClass::DamageModifier, 1),
    (EffectKind::BenchScalingDamage, PriorityClass::DamageModifier, 2),
    (EffectKind::DamageBonus, PriorityClass::DamageModifier, 9),
    (EffectKind::HealFull, PriorityClass::Healing, 0),
    (EffectKind::Heal, PriorityClass::Healing, 1),
    (EffectKind::EnergyDiscard, PriorityClass::Energy, 0),
    (EffectKind::SearchOrDraw, PriorityClass::Energy, 1),
    (EffectKind::EnergyAttach, PriorityClass::Energy, 8),
    (EffectKind::RawUnparsed, PriorityClass::Energy, 9),
];

pub fn priority_of(kind: EffectKind) -> Priority {
    PRIORITY_TABLE
        .iter()
        .find(|(entry, _, _)| *entry == kind)
        .map(|(_, class, specificity)| Priority {
            class: *class,
            specificity: *specificity,
        })
        .unwrap_or(Priority {
            class: PriorityClass::Energy,
            specificity: u8::MAX,
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuppressReason {
    /// Same clause already claimed by a higher-priority descriptor.
    Mechanism { by: EffectKind, mechanism: Mechanism },
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suppressed {
    pub descriptor: EffectDescriptor,
    pub reason: SuppressReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub kept: Vec<EffectDescriptor>,
    pub suppressed: Vec<Suppressed>,
}

/// Orders descriptors by priority and drops the ones that would apply a
/// mechanism a strictly higher-priority descriptor already claimed.
pub fn resolve(descriptors: &[EffectDescriptor]) -> Vec<EffectDescriptor> {
    resolve_detailed(descriptors).kept
}

pub fn resolve_detailed(descriptors: &[EffectDescriptor]) -> Resolution {
    let mut ordered: Vec<&EffectDescriptor> = descriptors.iter().collect();
    ordered.sort_by_key(|descriptor| priority_of(descriptor.kind()));

    let mut resolution = Resolution::default();
    let mut claimed: Vec<(Mechanism, Priority, EffectKind)> = Vec::new();
    for descriptor in ordered {
        if resolution.kept.contains(descriptor) {
            debug!(effect = %descriptor, "suppress duplicate");
            resolution.suppressed.push(Suppressed {
                descriptor: descriptor.clone(),
                reason: SuppressReason::Duplicate,
            });
            continue;
        }
        let mechanism = descriptor.mechanism();
        let priority = priority_of(descriptor.kind());
        let winner = claimed
            .iter()
            .find(|(claimed_mech, claimed_priority, _)| {
                *claimed_mech == mechanism && *claimed_priority < priority
            })
            .map(|(_, _, kind)| *kind);
        if let Some(by) = winner {
            debug!(effect = %descriptor, %by, "suppress lower-priority match");
            resolution.suppressed.push(Suppressed {
                descriptor: descriptor.clone(),
                reason: SuppressReason::Mechanism { by, mechanism },
            });
            continue;
        }
        claimed.push((mechanism, priority, descriptor.kind()));
        resolution.kept.push(descriptor.clone());
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;

    fn coin_energy() -> EffectDescriptor {
        EffectDescriptor::CoinFlipEnergy(CoinFlipEnergy {
            coins: CoinCount::Fixed(1),
            per_heads: 1,
            energy: EnergySpec::OwnType,
            target: EnergyTarget::This,
        })
    }

    fn plain_attach() -> EffectDescriptor {
        EffectDescriptor::EnergyAttach(EnergyAttach {
            energy: EnergySpec::OwnType,
            count: 1,
            target: EnergyTarget::This,
        })
    }

    fn heal(amount: u32) -> EffectDescriptor {
        EffectDescriptor::Heal(Heal {
            amount,
            target: HealTarget::This,
        })
    }

    #[test]
    fn table_covers_every_kind_once() {
        for kind in EffectKind::ALL {
            let hits = PRIORITY_TABLE.iter().filter(|(k, _, _)| *k == kind).count();
            assert_eq!(hits, 1, "{kind} must appear exactly once");
        }
    }

    #[test]
    fn classes_rank_coin_flips_first_and_energy_last() {
        assert_eq!(priority_of(EffectKind::CoinFlipDamage).class.rank(), 1);
        assert_eq!(priority_of(EffectKind::StatusApply).class.rank(), 2);
        assert_eq!(priority_of(EffectKind::BenchScalingDamage).class.rank(), 3);
        assert_eq!(priority_of(EffectKind::HealFull).class.rank(), 4);
        assert_eq!(priority_of(EffectKind::EnergyAttach).class.rank(), 5);
    }

    #[test]
    fn specific_energy_flip_suppresses_generic_attach() {
        let resolution = resolve_detailed(&[plain_attach(), coin_energy(), plain_attach()]);
        assert_eq!(resolution.kept, vec![coin_energy()]);
        assert_eq!(resolution.suppressed.len(), 2);
    }

    #[test]
    fn equal_priority_same_mechanism_both_survive() {
        let kept = resolve(&[heal(10), heal(20)]);
        assert_eq!(kept, vec![heal(10), heal(20)]);
    }

    #[test]
    fn exact_duplicates_collapse() {
        let kept = resolve(&[heal(10), heal(10)]);
        assert_eq!(kept, vec![heal(10)]);
    }

    #[test]
    fn conditional_bonus_does_not_suppress_flat_bonus_of_equal_size() {
        let flat = EffectDescriptor::DamageBonus(DamageBonus { amount: 20 });
        let conditional = EffectDescriptor::ConditionalDamage(ConditionalDamage {
            bonus: 20,
            condition: DamageCondition::TargetHasStatus(Some(StatusKind::Poisoned)),
        });
        let resolution = resolve_detailed(&[flat.clone(), conditional.clone()]);
        assert_eq!(resolution.kept, vec![conditional, flat]);
        assert!(resolution.suppressed.is_empty());
    }

    #[test]
    fn ordering_is_stable_and_repeatable() {
        let input = vec![
            heal(30),
            plain_attach(),
            EffectDescriptor::DamageBonus(DamageBonus { amount: 10 }),
            EffectDescriptor::StatusApply(StatusApply {
                kind: StatusKind::Poisoned,
                target: StatusTarget::Opponent,
            }),
        ];
        let first = resolve(&input);
        for _ in 0..10 {
            assert_eq!(resolve(&input), first);
        }
        let kinds: Vec<EffectKind> = first.iter().map(|d| d.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                EffectKind::StatusApply,
                EffectKind::DamageBonus,
                EffectKind::Heal,
                EffectKind::EnergyAttach
            ]
        );
    }
}
