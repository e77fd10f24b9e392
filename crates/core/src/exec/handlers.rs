use super::EffectContext;
use crate::{
    heads_count, ApplyOutcome, CardFlow, CoinFace, CoinFlipRecord, CostSymbol,
    DamageCondition, DiscardCount, EffectDescriptor, EffectKind, EffectOutcome, EnergyDelta,
    EnergyDiscard,
    EnergyDirection, EnergySpec, EnergyTarget, EnergyType, FlipConsequence, HandlerStatus,
    HealTarget, Participant, PendingAction, Side, StatusDelta, StatusKind, StatusTarget,
};
use std::collections::BTreeMap;
use tracing::warn;

fn mismatch(kind: EffectKind, descriptor: &EffectDescriptor) -> EffectOutcome {
    warn!(%kind, got = %descriptor.kind(), "handler received the wrong descriptor");
    EffectOutcome::not_implemented(kind)
}

fn flip_record(kind: EffectKind, flips: Vec<bool>) -> CoinFlipRecord {
    CoinFlipRecord {
        effect: kind,
        heads: heads_count(&flips),
        flips,
    }
}

fn describe_flips(flips: &[bool]) -> String {
    if flips.is_empty() {
        return "no coins to flip".to_string();
    }
    let faces: Vec<&str> = flips
        .iter()
        .map(|face| if *face { "heads" } else { "tails" })
        .collect();
    format!("flipped {}", faces.join(", "))
}

pub(super) fn coin_flip_damage(
    ctx: &mut EffectContext<'_>,
    descriptor: &EffectDescriptor,
) -> EffectOutcome {
    let kind = EffectKind::CoinFlipDamage;
    let EffectDescriptor::CoinFlipDamage(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    let flips = ctx.flip(params.coins);
    let heads = heads_count(&flips);
    let bonus = heads.saturating_mul(params.per_heads);
    let mut outcome = if bonus > 0 {
        EffectOutcome::applied(kind)
    } else {
        EffectOutcome::new(kind, HandlerStatus::NoEffect)
    };
    outcome.bonus_damage = bonus;
    outcome.notes.push(describe_flips(&flips));
    outcome.notes.push(format!("{heads} heads, +{bonus} damage"));
    outcome.coin_flips.push(flip_record(kind, flips));
    outcome
}

pub(super) fn coin_flip_energy(
    ctx: &mut EffectContext<'_>,
    descriptor: &EffectDescriptor,
) -> EffectOutcome {
    let kind = EffectKind::CoinFlipEnergy;
    let EffectDescriptor::CoinFlipEnergy(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    let flips = ctx.flip(params.coins);
    let units = heads_count(&flips).saturating_mul(params.per_heads);
    let energy = params.energy.resolve(&*ctx.attacker);
    let note = describe_flips(&flips);
    let mut outcome = attach_energy(ctx, kind, energy, units, params.target);
    outcome.notes.insert(0, note);
    outcome.coin_flips.push(flip_record(kind, flips));
    outcome
}

pub(super) fn coin_flip_conditional(
    ctx: &mut EffectContext<'_>,
    descriptor: &EffectDescriptor,
) -> EffectOutcome {
    let kind = EffectKind::CoinFlipConditional;
    let EffectDescriptor::CoinFlipConditional(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    let flips = ctx.coins.flip_n(params.coins.max(1));
    let wanted = params.on == CoinFace::Heads;
    let triggered = flips.iter().all(|face| *face == wanted);
    let note = describe_flips(&flips);
    let record = flip_record(kind, flips);

    let mut outcome = if !triggered {
        EffectOutcome::no_effect(kind, format!("{note}, nothing happens"))
    } else {
        match params.then {
            FlipConsequence::BonusDamage(amount) => {
                let mut outcome = EffectOutcome::applied(kind).note(format!("{note}, +{amount} damage"));
                outcome.bonus_damage = amount;
                outcome
            }
            FlipConsequence::AttackFails => {
                let mut outcome =
                    EffectOutcome::applied(kind).note(format!("{note}, the attack does nothing"));
                outcome.negates_attack = true;
                outcome
            }
            FlipConsequence::Status { kind: status, target } => {
                lead_note(apply_status(ctx, kind, status, target), note)
            }
            FlipConsequence::Heal(amount) => {
                lead_note(heal_entities(ctx, kind, HealTarget::This, Some(amount)), note)
            }
            FlipConsequence::Discard(discard) => {
                lead_note(discard_energy(ctx, kind, &discard), note)
            }
        }
    };
    outcome.coin_flips.push(record);
    outcome
}

fn lead_note(mut outcome: EffectOutcome, note: String) -> EffectOutcome {
    outcome.notes.insert(0, note);
    outcome
}

fn apply_status(
    ctx: &mut EffectContext<'_>,
    kind: EffectKind,
    status: StatusKind,
    target: StatusTarget,
) -> EffectOutcome {
    let machine = ctx.status_machine();
    let turn = ctx.turn.turn;
    let Some((entity, participant)) = ctx.status_target(target) else {
        return EffectOutcome::no_effect(kind, "no opposing Pokémon to target");
    };
    let applied = machine.apply(entity, status, turn);
    let name = entity.name().to_string();
    let mut outcome = match applied {
        ApplyOutcome::Applied => {
            EffectOutcome::applied(kind).note(format!("{name} is now {status}"))
        }
        ApplyOutcome::AlreadyPresent => {
            EffectOutcome::no_effect(kind, format!("{name} is already {status}"))
        }
    };
    outcome.status_changes.push(StatusDelta {
        kind: status,
        target: participant,
        outcome: applied,
    });
    outcome
}

pub(super) fn status_apply(ctx: &mut EffectContext<'_>, descriptor: &EffectDescriptor) -> EffectOutcome {
    let kind = EffectKind::StatusApply;
    let EffectDescriptor::StatusApply(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    apply_status(ctx, kind, params.kind, params.target)
}

pub(super) fn status_apply_random(
    ctx: &mut EffectContext<'_>,
    descriptor: &EffectDescriptor,
) -> EffectOutcome {
    let kind = EffectKind::StatusApplyRandom;
    let EffectDescriptor::StatusApplyRandom(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    let machine = ctx.status_machine();
    let turn = ctx.turn.turn;
    let (entity, participant) = match params.target {
        StatusTarget::This => (&mut *ctx.attacker, Participant::Attacker),
        StatusTarget::Opponent => match ctx.defender.as_deref_mut() {
            Some(entity) => (entity, Participant::Defender),
            None => return EffectOutcome::no_effect(kind, "no opposing Pokémon to target"),
        },
    };
    match machine.apply_random(entity, turn, ctx.coins) {
        Some(status) => {
            let mut outcome = EffectOutcome::applied(kind)
                .note(format!("{} is now {status}", entity.name()));
            outcome.status_changes.push(StatusDelta {
                kind: status,
                target: participant,
                outcome: ApplyOutcome::Applied,
            });
            outcome
        }
        None => EffectOutcome::no_effect(
            kind,
            format!("{} already has every condition", entity.name()),
        ),
    }
}

fn bonus_outcome(kind: EffectKind, bonus: u32, note: String) -> EffectOutcome {
    let mut outcome = if bonus > 0 {
        EffectOutcome::applied(kind)
    } else {
        EffectOutcome::new(kind, HandlerStatus::NoEffect)
    };
    outcome.bonus_damage = bonus;
    outcome.note(note)
}

pub(super) fn damage_bonus(_ctx: &mut EffectContext<'_>, descriptor: &EffectDescriptor) -> EffectOutcome {
    let kind = EffectKind::DamageBonus;
    let EffectDescriptor::DamageBonus(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    bonus_outcome(kind, params.amount, format!("+{} damage", params.amount))
}

pub(super) fn energy_scaling_damage(
    ctx: &mut EffectContext<'_>,
    descriptor: &EffectDescriptor,
) -> EffectOutcome {
    let kind = EffectKind::EnergyScalingDamage;
    let EffectDescriptor::EnergyScalingDamage(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    let units = match params.source {
        Side::Own => ctx.attacker.energy().count(params.energy),
        Side::Opponent => ctx
            .defender
            .as_deref()
            .map(|entity| entity.energy().count(params.energy))
            .unwrap_or(0),
    };
    let bonus = units.saturating_mul(params.per_unit);
    bonus_outcome(kind, bonus, format!("{units} energy counted, +{bonus} damage"))
}

/// Energy attached beyond what the attack's cost asks of it. Typed costs are
/// paid by their own type first and colorless costs by other types first.
fn extra_energy(ctx: &EffectContext<'_>, energy: Option<EnergyType>) -> u32 {
    let pool = ctx.attacker.energy();
    let Some(attack) = ctx.attack else {
        return pool.count(energy);
    };
    let Some(kind) = energy else {
        return pool.total().saturating_sub(attack.cost_total());
    };
    let colorless = attack
        .cost
        .iter()
        .filter(|symbol| **symbol == CostSymbol::Colorless)
        .count() as u32;
    let other_typed = attack
        .cost_total()
        .saturating_sub(colorless)
        .saturating_sub(attack.cost_of(kind));
    let own_left = pool.count_of(kind).saturating_sub(attack.cost_of(kind));
    let others_left = pool
        .total()
        .saturating_sub(pool.count_of(kind))
        .saturating_sub(other_typed);
    own_left.saturating_sub(colorless.saturating_sub(others_left))
}

fn condition_met(ctx: &EffectContext<'_>, condition: DamageCondition) -> bool {
    let defender = ctx.defender.as_deref();
    match condition {
        DamageCondition::TargetDamaged => defender.map(|e| e.damage_taken() > 0).unwrap_or(false),
        DamageCondition::SelfDamaged => ctx.attacker.damage_taken() > 0,
        DamageCondition::TargetHasStatus(Some(status)) => defender
            .map(|e| e.conditions().contains(status))
            .unwrap_or(false),
        DamageCondition::TargetHasStatus(None) => defender
            .map(|e| !e.conditions().is_empty())
            .unwrap_or(false),
        DamageCondition::SelfExtraEnergy { energy, at_least } => {
            extra_energy(ctx, energy) >= at_least
        }
    }
}

pub(super) fn conditional_damage(
    ctx: &mut EffectContext<'_>,
    descriptor: &EffectDescriptor,
) -> EffectOutcome {
    let kind = EffectKind::ConditionalDamage;
    let EffectDescriptor::ConditionalDamage(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    if !condition_met(ctx, params.condition) {
        return EffectOutcome::no_effect(kind, format!("{:?} not met", params.condition));
    }
    bonus_outcome(
        kind,
        params.bonus,
        format!("{:?} met, +{} damage", params.condition, params.bonus),
    )
}

pub(super) fn bench_scaling_damage(
    ctx: &mut EffectContext<'_>,
    descriptor: &EffectDescriptor,
) -> EffectOutcome {
    let kind = EffectKind::BenchScalingDamage;
    let EffectDescriptor::BenchScalingDamage(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    let bench = match params.side {
        Side::Own => Some(ctx.attacker.bench()),
        Side::Opponent => ctx.defender.as_deref().map(|entity| entity.bench()),
    };
    let counted = bench
        .unwrap_or(&[])
        .iter()
        .flatten()
        .filter(|occupant| {
            params
                .filter
                .as_ref()
                .map(|filter| filter.matches(&occupant.name))
                .unwrap_or(true)
        })
        .count() as u32;
    let bonus = counted.saturating_mul(params.per_unit);
    bonus_outcome(
        kind,
        bonus,
        format!("{counted} benched Pokémon counted, +{bonus} damage"),
    )
}

/// `amount` of `None` heals to full.
fn heal_entities(
    ctx: &mut EffectContext<'_>,
    kind: EffectKind,
    target: HealTarget,
    amount: Option<u32>,
) -> EffectOutcome {
    let attacker = &mut *ctx.attacker;
    let wanted = amount.unwrap_or_else(|| attacker.damage_taken());
    let mut healed = attacker.heal(wanted);
    if target == HealTarget::EachOwn {
        for occupant in attacker.bench_mut().iter_mut().flatten() {
            let wanted = amount.unwrap_or(occupant.max_hp);
            healed = healed.saturating_add(occupant.heal(wanted));
        }
    }
    if healed == 0 {
        return EffectOutcome::no_effect(kind, "nothing to heal");
    }
    let mut outcome = EffectOutcome::applied(kind).note(format!("healed {healed} damage"));
    outcome.healed = healed;
    outcome
}

pub(super) fn heal(ctx: &mut EffectContext<'_>, descriptor: &EffectDescriptor) -> EffectOutcome {
    let kind = EffectKind::Heal;
    let EffectDescriptor::Heal(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    heal_entities(ctx, kind, params.target, Some(params.amount))
}

pub(super) fn heal_full(ctx: &mut EffectContext<'_>, descriptor: &EffectDescriptor) -> EffectOutcome {
    let kind = EffectKind::HealFull;
    let EffectDescriptor::HealFull(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    heal_entities(ctx, kind, params.target, None)
}

/// Attaches directly to the acting entity; other destinations are handed to
/// the caller as a pending distribution.
fn attach_energy(
    ctx: &mut EffectContext<'_>,
    kind: EffectKind,
    energy: EnergyType,
    units: u32,
    target: EnergyTarget,
) -> EffectOutcome {
    if units == 0 {
        return EffectOutcome::no_effect(kind, "no energy to attach");
    }
    if target == EnergyTarget::This {
        ctx.attacker.energy_mut().attach_many(energy, units);
        let mut outcome =
            EffectOutcome::applied(kind).note(format!("attached {units} {energy} energy"));
        outcome.energy_changes.push(EnergyDelta {
            direction: EnergyDirection::Gain,
            energy,
            amount: units,
            target: Participant::Attacker,
            applied: true,
        });
        return outcome;
    }
    let mut outcome = EffectOutcome::new(kind, HandlerStatus::Deferred)
        .note(format!("{units} {energy} energy waiting for placement"));
    outcome.energy_changes.push(EnergyDelta {
        direction: EnergyDirection::Gain,
        energy,
        amount: units,
        target: Participant::Bench,
        applied: false,
    });
    outcome.pending.push(PendingAction::DistributeEnergy {
        energy,
        amount: units,
        target,
    });
    outcome
}

pub(super) fn energy_attach(ctx: &mut EffectContext<'_>, descriptor: &EffectDescriptor) -> EffectOutcome {
    let kind = EffectKind::EnergyAttach;
    let EffectDescriptor::EnergyAttach(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    let energy = match params.energy {
        EnergySpec::Named(energy) => energy,
        EnergySpec::OwnType => ctx.attacker.energy_type(),
    };
    attach_energy(ctx, kind, energy, params.count, params.target)
}

pub(super) fn energy_discard(
    ctx: &mut EffectContext<'_>,
    descriptor: &EffectDescriptor,
) -> EffectOutcome {
    let kind = EffectKind::EnergyDiscard;
    let EffectDescriptor::EnergyDiscard(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    discard_energy(ctx, kind, params)
}

/// Saturating discard; never removes more than is attached.
fn discard_energy(ctx: &mut EffectContext<'_>, kind: EffectKind, params: &EnergyDiscard) -> EffectOutcome {
    let (entity, participant) = match params.from {
        Side::Own => (&mut *ctx.attacker, Participant::Attacker),
        Side::Opponent => match ctx.defender.as_deref_mut() {
            Some(entity) => (entity, Participant::Defender),
            None => return EffectOutcome::no_effect(kind, "no opposing Pokémon to target"),
        },
    };

    let removed: Vec<(EnergyType, u32)> = match (params.energy, params.count) {
        (Some(energy), DiscardCount::Count(count)) => {
            vec![(energy, entity.energy_mut().discard(energy, count))]
        }
        (Some(energy), DiscardCount::All) => {
            vec![(energy, entity.energy_mut().discard(energy, u32::MAX))]
        }
        (None, DiscardCount::All) => entity.energy_mut().discard_all(),
        (None, DiscardCount::Count(count)) => {
            let mut tally: BTreeMap<EnergyType, u32> = BTreeMap::new();
            for _ in 0..count {
                let units: Vec<EnergyType> = entity
                    .energy()
                    .iter()
                    .flat_map(|(energy, amount)| std::iter::repeat(energy).take(amount as usize))
                    .collect();
                if units.is_empty() {
                    break;
                }
                let energy = units[ctx.coins.pick_index(units.len())];
                if entity.energy_mut().discard(energy, 1) == 1 {
                    *tally.entry(energy).or_insert(0) += 1;
                }
            }
            tally.into_iter().collect()
        }
    };

    let removed: Vec<(EnergyType, u32)> = removed.into_iter().filter(|(_, n)| *n > 0).collect();
    if removed.is_empty() {
        return EffectOutcome::no_effect(kind, format!("{} has no matching energy", entity.name()));
    }
    let mut outcome = EffectOutcome::applied(kind);
    for (energy, amount) in removed {
        outcome.notes.push(format!("discarded {amount} {energy} energy from {}", entity.name()));
        outcome.energy_changes.push(EnergyDelta {
            direction: EnergyDirection::Loss,
            energy,
            amount,
            target: participant,
            applied: true,
        });
    }
    outcome
}

pub(super) fn search_or_draw(
    _ctx: &mut EffectContext<'_>,
    descriptor: &EffectDescriptor,
) -> EffectOutcome {
    let kind = EffectKind::SearchOrDraw;
    let EffectDescriptor::SearchOrDraw(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    let pending = match &params.flow {
        CardFlow::Draw(count) => PendingAction::Draw(*count),
        CardFlow::Search { criteria } => PendingAction::Search {
            criteria: criteria.clone(),
        },
    };
    let mut outcome =
        EffectOutcome::new(kind, HandlerStatus::Deferred).note(format!("{pending:?} for the caller"));
    outcome.pending.push(pending);
    outcome
}

pub(super) fn raw_unparsed(_ctx: &mut EffectContext<'_>, descriptor: &EffectDescriptor) -> EffectOutcome {
    let kind = EffectKind::RawUnparsed;
    let EffectDescriptor::RawUnparsed(params) = descriptor else {
        return mismatch(kind, descriptor);
    };
    let mut outcome = EffectOutcome::new(kind, HandlerStatus::NeedsManual)
        .note(format!("needs manual handling: {}", params.text));
    outcome.pending.push(PendingAction::ManualEffect {
        text: params.text.clone(),
    });
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;

    fn run(
        handler: fn(&mut EffectContext<'_>, &EffectDescriptor) -> EffectOutcome,
        attacker: &mut Combatant,
        defender: &mut Combatant,
        seed: u64,
        descriptor: EffectDescriptor,
    ) -> EffectOutcome {
        let mut coins = CoinSource::from_seed(seed);
        let config = EngineConfig::default();
        let mut ctx = EffectContext::new(
            attacker,
            Some(defender),
            TurnContext::new(2, 0),
            &mut coins,
            &config,
        );
        handler(&mut ctx, &descriptor)
    }

    #[test]
    fn coin_damage_counts_heads() {
        let mut attacker = Combatant::new("Jigglypuff", EnergyType::Psychic, 50);
        let mut defender = Combatant::new("Squirtle", EnergyType::Water, 60);
        let outcome = run(
            coin_flip_damage,
            &mut attacker,
            &mut defender,
            42,
            EffectDescriptor::CoinFlipDamage(CoinFlipDamage {
                coins: CoinCount::Fixed(3),
                per_heads: 30,
            }),
        );
        let record = &outcome.coin_flips[0];
        assert_eq!(record.flips.len(), 3);
        assert_eq!(outcome.bonus_damage, record.heads * 30);
        assert!(outcome.bonus_damage <= 90);
    }

    #[test]
    fn status_reapply_reports_already_present() {
        let mut attacker = Combatant::new("Ekans", EnergyType::Darkness, 60);
        let mut defender = Combatant::new("Squirtle", EnergyType::Water, 60);
        defender.conditions.insert(StatusKind::Poisoned, 1);
        let outcome = run(
            status_apply,
            &mut attacker,
            &mut defender,
            0,
            EffectDescriptor::StatusApply(StatusApply {
                kind: StatusKind::Poisoned,
                target: StatusTarget::Opponent,
            }),
        );
        assert_eq!(outcome.status, HandlerStatus::NoEffect);
        assert_eq!(outcome.status_changes[0].outcome, ApplyOutcome::AlreadyPresent);
        assert_eq!(defender.conditions.len(), 1);
    }

    #[test]
    fn coin_gated_discard_follows_the_flip() {
        let descriptor = EffectDescriptor::CoinFlipConditional(CoinFlipConditional {
            coins: 1,
            on: CoinFace::Heads,
            then: FlipConsequence::Discard(EnergyDiscard {
                energy: None,
                count: DiscardCount::Count(1),
                from: Side::Opponent,
            }),
        });
        let mut discarded = 0;
        for seed in 0..40 {
            let mut attacker = Combatant::new("Pinsir", EnergyType::Grass, 90);
            let mut defender =
                Combatant::new("Moltres", EnergyType::Fire, 130).with_energy(EnergyType::Fire, 2);
            let outcome = run(
                coin_flip_conditional,
                &mut attacker,
                &mut defender,
                seed,
                descriptor.clone(),
            );
            let heads = outcome.coin_flips[0].heads;
            assert_eq!(defender.energy.total(), 2 - heads);
            if heads == 1 {
                discarded += 1;
                assert_eq!(outcome.energy_changes[0].direction, EnergyDirection::Loss);
            } else {
                assert!(outcome.energy_changes.is_empty());
            }
        }
        assert!(discarded > 0 && discarded < 40);
    }

    #[test]
    fn random_discard_never_overdraws() {
        for seed in 0..30 {
            let mut attacker = Combatant::new("Crabominable", EnergyType::Water, 140);
            let mut defender = Combatant::new("Charizard", EnergyType::Fire, 180)
                .with_energy(EnergyType::Fire, 1)
                .with_energy(EnergyType::Water, 1);
            let outcome = run(
                energy_discard,
                &mut attacker,
                &mut defender,
                seed,
                EffectDescriptor::EnergyDiscard(EnergyDiscard {
                    energy: None,
                    count: DiscardCount::Count(5),
                    from: Side::Opponent,
                }),
            );
            let lost: u32 = outcome.energy_changes.iter().map(|d| d.amount).sum();
            assert_eq!(lost, 2);
            assert!(defender.energy.is_empty());
        }
    }

    #[test]
    fn bench_energy_is_deferred_to_caller() {
        let mut attacker = Combatant::new("Gardevoir", EnergyType::Psychic, 110);
        let mut defender = Combatant::new("Squirtle", EnergyType::Water, 60);
        let outcome = run(
            energy_attach,
            &mut attacker,
            &mut defender,
            0,
            EffectDescriptor::EnergyAttach(EnergyAttach {
                energy: EnergySpec::Named(EnergyType::Psychic),
                count: 1,
                target: EnergyTarget::Bench,
            }),
        );
        assert_eq!(outcome.status, HandlerStatus::Deferred);
        assert!(!outcome.energy_changes[0].applied);
        assert!(attacker.energy.is_empty());
        assert_eq!(
            outcome.pending,
            vec![PendingAction::DistributeEnergy {
                energy: EnergyType::Psychic,
                amount: 1,
                target: EnergyTarget::Bench,
            }]
        );
    }

    #[test]
    fn extra_energy_subtracts_attack_cost() {
        let card = CardDef::pokemon("a1-x", "Blastoise", 150, EnergyType::Water).with_attack(
            "Hydro Pump",
            &[
                CostSymbol::Typed(EnergyType::Water),
                CostSymbol::Typed(EnergyType::Water),
                CostSymbol::Colorless,
            ],
            80,
            "",
        );
        let mut attacker = Combatant::new("Blastoise", EnergyType::Water, 150)
            .with_energy(EnergyType::Water, 4)
            .with_energy(EnergyType::Grass, 1);
        let mut coins = CoinSource::from_seed(0);
        let config = EngineConfig::default();
        let ctx = EffectContext::new(
            &mut attacker,
            None,
            TurnContext::default(),
            &mut coins,
            &config,
        )
        .with_attack(&card.attacks[0]);
        assert_eq!(extra_energy(&ctx, Some(EnergyType::Water)), 2);
        assert_eq!(extra_energy(&ctx, None), 2);
        assert!(condition_met(
            &ctx,
            DamageCondition::SelfExtraEnergy {
                energy: Some(EnergyType::Water),
                at_least: 2
            }
        ));

        let mut water_only =
            Combatant::new("Blastoise", EnergyType::Water, 150).with_energy(EnergyType::Water, 4);
        let ctx = EffectContext::new(
            &mut water_only,
            None,
            TurnContext::default(),
            &mut coins,
            &config,
        )
        .with_attack(&card.attacks[0]);
        assert_eq!(extra_energy(&ctx, Some(EnergyType::Water)), 1);
    }

    #[test]
    fn each_own_heals_bench_too() {
        let mut occupant = BenchOccupant::new("Bulbasaur", 70);
        occupant.hp = 40;
        let mut attacker = Combatant::new("Venusaur", EnergyType::Grass, 160)
            .with_hp(100)
            .with_bench(occupant);
        let mut defender = Combatant::new("Squirtle", EnergyType::Water, 60);
        let outcome = run(
            heal,
            &mut attacker,
            &mut defender,
            0,
            EffectDescriptor::Heal(Heal {
                amount: 20,
                target: HealTarget::EachOwn,
            }),
        );
        assert_eq!(outcome.healed, 40);
        assert_eq!(attacker.hp, 120);
    }
}
