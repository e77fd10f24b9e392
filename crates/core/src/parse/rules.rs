use super::tokens::{
    discard_count, energy, energy_target, heal_target, name_list, number, side, status,
    status_target,
};
use crate::*;
use regex_lite::{Captures, Regex};
use std::sync::OnceLock;
use tracing::error;

macro_rules! count_pat {
    () => {
        r"(\d+|a|an|one|two|three|four|five|six)"
    };
}

macro_rules! energy_pat {
    () => {
        r"(\{[a-z]\}|grass|fire|water|lightning|psychic|fighting|darkness|dark|metal|colorless)"
    };
}

/// Coin gate between the flip and its consequence; every coin must be heads.
macro_rules! heads_gate {
    () => {
        r" coins?\. if (?:heads|both of them are heads|all of them are heads), "
    };
}

macro_rules! status_pat {
    () => {
        r"(burned|poisoned|asleep|paralyzed|confused)"
    };
}

type Builder = fn(&Captures<'_>, &'static str) -> Option<EffectDescriptor>;

/// Where a rule may match inside a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Clause {
    /// The pattern spells out its own gate ("flip ...", "if ...").
    Gate,
    /// Ignored inside a sentence opened by a coin flip or an `if`, where the
    /// same words are only the consequence of a gate.
    Plain,
}

/// One entry of the fixed rule table.
pub(crate) struct Rule {
    pub id: &'static str,
    pub kind: EffectKind,
    pub clause: Clause,
    pub pattern: &'static str,
    pub build: Builder,
}

pub(crate) struct CompiledRule {
    pub rule: &'static Rule,
    pub regex: Regex,
}

pub(crate) static RULES: &[Rule] = &[
    // coin flips
    Rule {
        id: "coin_damage_fixed",
        kind: EffectKind::CoinFlipDamage,
        clause: Clause::Gate,
        pattern: concat!(
            "flip ",
            count_pat!(),
            r" coins?\. this attack does (\d+) (?:more )?damage for each heads"
        ),
        build: |caps, id| {
            Some(EffectDescriptor::CoinFlipDamage(CoinFlipDamage {
                coins: CoinCount::Fixed(number(caps, 1, id)),
                per_heads: number(caps, 2, id),
            }))
        },
    },
    Rule {
        id: "coin_damage_until_tails",
        kind: EffectKind::CoinFlipDamage,
        clause: Clause::Gate,
        pattern: r"flip a coin until you get tails\. this attack does (\d+) (?:more )?damage for each heads",
        build: |caps, id| {
            Some(EffectDescriptor::CoinFlipDamage(CoinFlipDamage {
                coins: CoinCount::UntilTails,
                per_heads: number(caps, 1, id),
            }))
        },
    },
    Rule {
        id: "coin_damage_per_energy",
        kind: EffectKind::CoinFlipDamage,
        clause: Clause::Gate,
        pattern: concat!(
            r"flip a coin for each (?:",
            energy_pat!(),
            r" )?energy attached to this pokemon\. this attack does (\d+) (?:more )?damage for each heads"
        ),
        build: |caps, id| {
            let kind = energy(caps, 1, id).ok()?;
            Some(EffectDescriptor::CoinFlipDamage(CoinFlipDamage {
                coins: CoinCount::PerEnergyAttached(kind),
                per_heads: number(caps, 2, id),
            }))
        },
    },
    Rule {
        id: "coin_damage_per_pokemon_in_play",
        kind: EffectKind::CoinFlipDamage,
        clause: Clause::Gate,
        pattern: r"flip a coin for each pokemon you have in play\. this attack does (\d+) (?:more )?damage for each heads",
        build: |caps, id| {
            Some(EffectDescriptor::CoinFlipDamage(CoinFlipDamage {
                coins: CoinCount::PerPokemonInPlay,
                per_heads: number(caps, 1, id),
            }))
        },
    },
    Rule {
        id: "coin_damage_per_bench",
        kind: EffectKind::CoinFlipDamage,
        clause: Clause::Gate,
        pattern: r"flip a coin for each of (your|your opponent's) benched pokemon\. this attack does (\d+) (?:more )?damage for each heads",
        build: |caps, id| {
            Some(EffectDescriptor::CoinFlipDamage(CoinFlipDamage {
                coins: CoinCount::PerBenchOccupant(side(caps.get(1).map(|m| m.as_str()))),
                per_heads: number(caps, 2, id),
            }))
        },
    },
    Rule {
        id: "coin_energy_amount",
        kind: EffectKind::CoinFlipEnergy,
        clause: Clause::Gate,
        pattern: concat!(
            "flip ",
            count_pat!(),
            r" coins?\. take an amount of (?:",
            energy_pat!(),
            r" )?energy from your energy zone equal to the number of heads and attach it to (this pokemon|your benched pokemon|1 of your benched pokemon|1 of your pokemon)"
        ),
        build: |caps, id| {
            let kind = energy(caps, 2, id).ok()?;
            Some(EffectDescriptor::CoinFlipEnergy(CoinFlipEnergy {
                coins: CoinCount::Fixed(number(caps, 1, id)),
                per_heads: 1,
                energy: kind.map(EnergySpec::Named).unwrap_or(EnergySpec::OwnType),
                target: energy_target(caps.get(3).map(|m| m.as_str())),
            }))
        },
    },
    Rule {
        id: "coin_energy_heads",
        kind: EffectKind::CoinFlipEnergy,
        clause: Clause::Gate,
        pattern: concat!(
            r"flip a coin\. if heads, (?:take an? (?:",
            energy_pat!(),
            r" )?energy from your energy zone and attach it|attach an? (?:",
            energy_pat!(),
            r" )?energy(?: from your energy zone)?) to (this pokemon|your benched pokemon|1 of your benched pokemon|1 of your pokemon)"
        ),
        build: |caps, id| {
            let taken = energy(caps, 1, id).ok()?;
            let attached = energy(caps, 2, id).ok()?;
            Some(EffectDescriptor::CoinFlipEnergy(CoinFlipEnergy {
                coins: CoinCount::Fixed(1),
                per_heads: 1,
                energy: taken
                    .or(attached)
                    .map(EnergySpec::Named)
                    .unwrap_or(EnergySpec::OwnType),
                target: energy_target(caps.get(3).map(|m| m.as_str())),
            }))
        },
    },
    Rule {
        id: "coin_bonus",
        kind: EffectKind::CoinFlipConditional,
        clause: Clause::Gate,
        pattern: concat!(
            "flip ",
            count_pat!(),
            heads_gate!(),
            r"this attack does (\d+) more damage"
        ),
        build: |caps, id| {
            Some(EffectDescriptor::CoinFlipConditional(CoinFlipConditional {
                coins: number(caps, 1, id),
                on: CoinFace::Heads,
                then: FlipConsequence::BonusDamage(number(caps, 2, id)),
            }))
        },
    },
    Rule {
        id: "coin_fail",
        kind: EffectKind::CoinFlipConditional,
        clause: Clause::Gate,
        pattern: r"flip a coin\. if tails, this attack does nothing",
        build: |_, _| {
            Some(EffectDescriptor::CoinFlipConditional(CoinFlipConditional {
                coins: 1,
                on: CoinFace::Tails,
                then: FlipConsequence::AttackFails,
            }))
        },
    },
    Rule {
        id: "coin_status",
        kind: EffectKind::CoinFlipConditional,
        clause: Clause::Gate,
        pattern: concat!(
            "flip ",
            count_pat!(),
            heads_gate!(),
            r"(your opponent's active pokemon|the defending pokemon|this pokemon) is now ",
            status_pat!()
        ),
        build: |caps, id| {
            Some(EffectDescriptor::CoinFlipConditional(CoinFlipConditional {
                coins: number(caps, 1, id),
                on: CoinFace::Heads,
                then: FlipConsequence::Status {
                    kind: status(caps, 3)?,
                    target: status_target(caps.get(2).map(|m| m.as_str())),
                },
            }))
        },
    },
    Rule {
        id: "coin_heal",
        kind: EffectKind::CoinFlipConditional,
        clause: Clause::Gate,
        pattern: concat!("flip ", count_pat!(), heads_gate!(), r"heal (\d+) damage"),
        build: |caps, id| {
            Some(EffectDescriptor::CoinFlipConditional(CoinFlipConditional {
                coins: number(caps, 1, id),
                on: CoinFace::Heads,
                then: FlipConsequence::Heal(number(caps, 2, id)),
            }))
        },
    },
    Rule {
        id: "coin_discard",
        kind: EffectKind::CoinFlipConditional,
        clause: Clause::Gate,
        pattern: concat!(
            "flip ",
            count_pat!(),
            heads_gate!(),
            r"discard (a random|a|an|\d+|one|two|three|all) (?:",
            energy_pat!(),
            r" )?energy from (this pokemon|your opponent's active pokemon)"
        ),
        build: |caps, id| {
            let kind = energy(caps, 3, id).ok()?;
            Some(EffectDescriptor::CoinFlipConditional(CoinFlipConditional {
                coins: number(caps, 1, id),
                on: CoinFace::Heads,
                then: FlipConsequence::Discard(EnergyDiscard {
                    energy: kind,
                    count: discard_count(caps, 2, id),
                    from: side(caps.get(4).map(|m| m.as_str())),
                }),
            }))
        },
    },
    // status conditions
    Rule {
        id: "status_apply",
        kind: EffectKind::StatusApply,
        clause: Clause::Plain,
        pattern: concat!(
            r"(your opponent's active pokemon|the defending pokemon|this pokemon) is now ",
            status_pat!()
        ),
        build: |caps, _| {
            Some(EffectDescriptor::StatusApply(StatusApply {
                kind: status(caps, 2)?,
                target: status_target(caps.get(1).map(|m| m.as_str())),
            }))
        },
    },
    Rule {
        id: "status_apply_second",
        kind: EffectKind::StatusApply,
        clause: Clause::Plain,
        pattern: concat!(
            r"(your opponent's active pokemon|the defending pokemon|this pokemon) is now (?:burned|poisoned|asleep|paralyzed|confused) and ",
            status_pat!()
        ),
        build: |caps, _| {
            Some(EffectDescriptor::StatusApply(StatusApply {
                kind: status(caps, 2)?,
                target: status_target(caps.get(1).map(|m| m.as_str())),
            }))
        },
    },
    Rule {
        id: "status_apply_random",
        kind: EffectKind::StatusApplyRandom,
        clause: Clause::Plain,
        pattern: r"(your opponent's active pokemon|this pokemon) is now affected by (?:a random special condition|a special condition (?:chosen )?at random)",
        build: |caps, _| {
            Some(EffectDescriptor::StatusApplyRandom(StatusApplyRandom {
                target: status_target(caps.get(1).map(|m| m.as_str())),
            }))
        },
    },
    // damage modification
    Rule {
        id: "conditional_target_status",
        kind: EffectKind::ConditionalDamage,
        clause: Clause::Gate,
        pattern: r"if your opponent's active pokemon is (burned|poisoned|asleep|paralyzed|confused|affected by a special condition), this attack does (\d+) more damage",
        build: |caps, id| {
            Some(EffectDescriptor::ConditionalDamage(ConditionalDamage {
                bonus: number(caps, 2, id),
                condition: DamageCondition::TargetHasStatus(status(caps, 1)),
            }))
        },
    },
    Rule {
        id: "conditional_damaged",
        kind: EffectKind::ConditionalDamage,
        clause: Clause::Gate,
        pattern: r"if (your opponent's active pokemon|this pokemon) has damage on it, this attack does (\d+) more damage",
        build: |caps, id| {
            let condition = match side(caps.get(1).map(|m| m.as_str())) {
                Side::Opponent => DamageCondition::TargetDamaged,
                Side::Own => DamageCondition::SelfDamaged,
            };
            Some(EffectDescriptor::ConditionalDamage(ConditionalDamage {
                bonus: number(caps, 2, id),
                condition,
            }))
        },
    },
    Rule {
        id: "conditional_extra_energy",
        kind: EffectKind::ConditionalDamage,
        clause: Clause::Gate,
        pattern: concat!(
            r"if this pokemon has at least (\d+|one|two|three) extra (?:",
            energy_pat!(),
            r" )?energy attached, this attack does (\d+) more damage"
        ),
        build: |caps, id| {
            let kind = energy(caps, 2, id).ok()?;
            Some(EffectDescriptor::ConditionalDamage(ConditionalDamage {
                bonus: number(caps, 3, id),
                condition: DamageCondition::SelfExtraEnergy {
                    energy: kind,
                    at_least: number(caps, 1, id),
                },
            }))
        },
    },
    Rule {
        id: "energy_scaling",
        kind: EffectKind::EnergyScalingDamage,
        clause: Clause::Plain,
        pattern: concat!(
            r"this attack does (\d+) (?:more )?damage for each (?:",
            energy_pat!(),
            r" )?energy attached to (this pokemon|your opponent's active pokemon)"
        ),
        build: |caps, id| {
            let kind = energy(caps, 2, id).ok()?;
            Some(EffectDescriptor::EnergyScalingDamage(EnergyScalingDamage {
                per_unit: number(caps, 1, id),
                energy: kind,
                source: side(caps.get(3).map(|m| m.as_str())),
            }))
        },
    },
    Rule {
        id: "bench_scaling",
        kind: EffectKind::BenchScalingDamage,
        clause: Clause::Plain,
        pattern: r"this attack does (\d+) (?:more )?damage for each of (your|your opponent's) benched ([a-z0-9' \-]+?)(?:\.|,|$)",
        build: |caps, id| {
            let phrase = caps.get(3).map(|m| m.as_str()).unwrap_or("pokemon");
            let filter = if phrase.starts_with("pokemon") {
                None
            } else {
                let names = name_list(phrase);
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                Some(NameFilter::new(&names))
            };
            Some(EffectDescriptor::BenchScalingDamage(BenchScalingDamage {
                per_unit: number(caps, 1, id),
                side: side(caps.get(2).map(|m| m.as_str())),
                filter,
            }))
        },
    },
    Rule {
        id: "damage_bonus",
        kind: EffectKind::DamageBonus,
        clause: Clause::Plain,
        pattern: r"this attack does (\d+) more damage(?:\.|$)",
        build: |caps, id| {
            Some(EffectDescriptor::DamageBonus(DamageBonus {
                amount: number(caps, 1, id),
            }))
        },
    },
    Rule {
        id: "damage_bonus_turn",
        kind: EffectKind::DamageBonus,
        clause: Clause::Plain,
        pattern: r"attacks used by your pokemon do \+(\d+) damage",
        build: |caps, id| {
            Some(EffectDescriptor::DamageBonus(DamageBonus {
                amount: number(caps, 1, id),
            }))
        },
    },
    // healing
    Rule {
        id: "heal_full",
        kind: EffectKind::HealFull,
        clause: Clause::Plain,
        pattern: r"heal all damage from (this pokemon|each of your pokemon|1 of your pokemon|your active pokemon)",
        build: |caps, _| {
            Some(EffectDescriptor::HealFull(HealFull {
                target: heal_target(caps.get(1).map(|m| m.as_str())),
            }))
        },
    },
    Rule {
        id: "heal",
        kind: EffectKind::Heal,
        clause: Clause::Plain,
        pattern: r"heal (\d+) damage(?: from (this pokemon|each of your pokemon|1 of your pokemon|your active pokemon))?",
        build: |caps, id| {
            Some(EffectDescriptor::Heal(Heal {
                amount: number(caps, 1, id),
                target: heal_target(caps.get(2).map(|m| m.as_str())),
            }))
        },
    },
    // energy manipulation
    Rule {
        id: "energy_attach_zone",
        kind: EffectKind::EnergyAttach,
        clause: Clause::Plain,
        pattern: concat!(
            r"take (a|an|\d+|one|two|three) ",
            energy_pat!(),
            r" energy from your energy zone and attach it to (this pokemon|your active pokemon|your benched pokemon|1 of your benched [a-z0-9' {}\-]*?pokemon|1 of your [a-z0-9' {}\-]*?pokemon)"
        ),
        build: |caps, id| {
            let kind = energy(caps, 2, id).ok()??;
            Some(EffectDescriptor::EnergyAttach(EnergyAttach {
                energy: EnergySpec::Named(kind),
                count: number(caps, 1, id),
                target: energy_target(caps.get(3).map(|m| m.as_str())),
            }))
        },
    },
    Rule {
        id: "energy_attach_generic",
        kind: EffectKind::EnergyAttach,
        clause: Clause::Plain,
        pattern: concat!(
            r"attach (a|an|\d+|one|two) (?:",
            energy_pat!(),
            r" )?energy(?: from your energy zone)?(?: to (this pokemon|your active pokemon|your benched pokemon|1 of your benched pokemon|1 of your pokemon))?"
        ),
        build: |caps, id| {
            let kind = energy(caps, 2, id).ok()?;
            Some(EffectDescriptor::EnergyAttach(EnergyAttach {
                energy: kind.map(EnergySpec::Named).unwrap_or(EnergySpec::OwnType),
                count: number(caps, 1, id),
                target: energy_target(caps.get(3).map(|m| m.as_str())),
            }))
        },
    },
    Rule {
        id: "energy_discard",
        kind: EffectKind::EnergyDiscard,
        clause: Clause::Plain,
        pattern: concat!(
            r"discard (a random|a|an|\d+|one|two|three|all) (?:",
            energy_pat!(),
            r" )?energy from (this pokemon|your opponent's active pokemon)"
        ),
        build: |caps, id| {
            let kind = energy(caps, 2, id).ok()?;
            Some(EffectDescriptor::EnergyDiscard(EnergyDiscard {
                energy: kind,
                count: discard_count(caps, 1, id),
                from: side(caps.get(3).map(|m| m.as_str())),
            }))
        },
    },
    // card flow placeholders
    Rule {
        id: "draw",
        kind: EffectKind::SearchOrDraw,
        clause: Clause::Plain,
        pattern: r"draw (a|an|\d+|one|two|three) cards?",
        build: |caps, id| {
            Some(EffectDescriptor::SearchOrDraw(SearchOrDraw {
                flow: CardFlow::Draw(number(caps, 1, id)),
            }))
        },
    },
    Rule {
        id: "search",
        kind: EffectKind::SearchOrDraw,
        clause: Clause::Plain,
        pattern: r"put (?:a |1 )?random (.+?) from your deck into your hand",
        build: |caps, _| {
            Some(EffectDescriptor::SearchOrDraw(SearchOrDraw {
                flow: CardFlow::Search {
                    criteria: caps.get(1)?.as_str().trim().to_string(),
                },
            }))
        },
    },
];

static COMPILED: OnceLock<Vec<CompiledRule>> = OnceLock::new();

/// The rule table with every pattern compiled once per process. A pattern
/// that fails to compile is logged and left out.
pub(crate) fn compiled_rules() -> &'static [CompiledRule] {
    COMPILED.get_or_init(|| {
        RULES
            .iter()
            .filter_map(|rule| match Regex::new(rule.pattern) {
                Ok(regex) => Some(CompiledRule { rule, regex }),
                Err(err) => {
                    error!(rule = rule.id, %err, "rule pattern does not compile");
                    None
                }
            })
            .collect()
    })
}
