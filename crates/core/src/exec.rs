//! Runs resolved descriptors against live battle state.

use crate::{
    AttackDef, BattleEntity, CoinCount, CoinSource, EffectDescriptor, EffectExecutionResult,
    EffectRecord, EngineConfig, HandlerStatus, Participant, Side, StatusMachine, StatusTarget,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

mod handlers;
mod registry;

pub use registry::*;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnContext {
    pub turn: u32,
    /// Seat of the acting player.
    pub player: u8,
}

impl TurnContext {
    pub fn new(turn: u32, player: u8) -> Self {
        Self { turn, player }
    }
}

/// Everything a handler may read or mutate while one effect text resolves.
pub struct EffectContext<'a> {
    pub attacker: &'a mut dyn BattleEntity,
    pub defender: Option<&'a mut dyn BattleEntity>,
    pub turn: TurnContext,
    pub coins: &'a mut CoinSource,
    pub config: &'a EngineConfig,
    /// The attack being resolved, when there is one. Extra-energy checks read
    /// its cost.
    pub attack: Option<&'a AttackDef>,
}

impl<'a> EffectContext<'a> {
    pub fn new(
        attacker: &'a mut dyn BattleEntity,
        defender: Option<&'a mut dyn BattleEntity>,
        turn: TurnContext,
        coins: &'a mut CoinSource,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            attacker,
            defender,
            turn,
            coins,
            config,
            attack: None,
        }
    }

    pub fn with_attack(mut self, attack: &'a AttackDef) -> Self {
        self.attack = Some(attack);
        self
    }

    pub fn status_machine(&self) -> StatusMachine<'a> {
        let config: &'a EngineConfig = self.config;
        StatusMachine::new(&config.status)
    }

    /// Number of coins a count resolves to against the current board.
    pub fn coin_total(&self, count: CoinCount) -> u32 {
        match count {
            CoinCount::Fixed(count) => count,
            CoinCount::UntilTails => self.config.max_flips_until_tails,
            CoinCount::PerPokemonInPlay => 1 + self.attacker.occupied_bench() as u32,
            CoinCount::PerBenchOccupant(Side::Own) => self.attacker.occupied_bench() as u32,
            CoinCount::PerBenchOccupant(Side::Opponent) => self
                .defender
                .as_deref()
                .map(|entity| entity.occupied_bench() as u32)
                .unwrap_or(0),
            CoinCount::PerEnergyAttached(kind) => self.attacker.energy().count(kind),
        }
    }

    /// Flips for a count. "Until tails" stops early at the first tails.
    pub fn flip(&mut self, count: CoinCount) -> Vec<bool> {
        match count {
            CoinCount::UntilTails => {
                self.coins
                    .flip_until_tails(self.config.max_flips_until_tails)
                    .0
            }
            other => {
                let total = self.coin_total(other);
                self.coins.flip_n(total)
            }
        }
    }

    /// Entity a status clause points at, or `None` when the opponent is
    /// absent.
    pub fn status_target(
        &mut self,
        target: StatusTarget,
    ) -> Option<(&mut (dyn BattleEntity + 'a), Participant)> {
        match target {
            StatusTarget::This => Some((&mut *self.attacker, Participant::Attacker)),
            StatusTarget::Opponent => self
                .defender
                .as_deref_mut()
                .map(|entity| (entity, Participant::Defender)),
        }
    }
}

/// Runs descriptors in the order given. Once an effect cancels the attack the
/// rest are recorded as skipped and never run.
pub fn execute_all(
    registry: &EffectRegistry,
    ctx: &mut EffectContext<'_>,
    base_damage: u32,
    descriptors: &[EffectDescriptor],
) -> EffectExecutionResult {
    let mut result = EffectExecutionResult::new(base_damage);
    for descriptor in descriptors {
        let description = descriptor.to_string();
        if result.attack_negated {
            debug!(effect = %description, "skipped after attack negation");
            result.effects.push(EffectRecord {
                kind: descriptor.kind(),
                status: HandlerStatus::Skipped,
                description,
            });
            continue;
        }
        let outcome = registry.execute(ctx, descriptor);
        debug!(effect = %description, status = ?outcome.status, "effect executed");
        result.absorb(outcome, description);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;

    #[test]
    fn coin_totals_follow_board_state() {
        let mut attacker = Combatant::new("Magnezone", EnergyType::Lightning, 150)
            .with_energy(EnergyType::Lightning, 3)
            .with_bench(BenchOccupant::new("Pikachu", 60));
        let mut defender = Combatant::new("Onix", EnergyType::Fighting, 110)
            .with_bench(BenchOccupant::new("Geodude", 70))
            .with_bench(BenchOccupant::new("Machop", 70));
        let mut coins = CoinSource::from_seed(1);
        let config = EngineConfig::default();
        let ctx = EffectContext::new(
            &mut attacker,
            Some(&mut defender),
            TurnContext::new(3, 0),
            &mut coins,
            &config,
        );
        assert_eq!(ctx.coin_total(CoinCount::Fixed(2)), 2);
        assert_eq!(ctx.coin_total(CoinCount::PerPokemonInPlay), 2);
        assert_eq!(ctx.coin_total(CoinCount::PerBenchOccupant(Side::Opponent)), 2);
        assert_eq!(
            ctx.coin_total(CoinCount::PerEnergyAttached(Some(EnergyType::Lightning))),
            3
        );
        assert_eq!(
            ctx.coin_total(CoinCount::PerEnergyAttached(Some(EnergyType::Water))),
            0
        );
    }

    #[test]
    fn until_tails_respects_cap() {
        let mut attacker = Combatant::new("Sandslash", EnergyType::Fighting, 100);
        let mut config = EngineConfig::default();
        config.max_flips_until_tails = 3;
        for seed in 0..50 {
            let mut coins = CoinSource::from_seed(seed);
            let mut ctx = EffectContext::new(
                &mut attacker,
                None,
                TurnContext::default(),
                &mut coins,
                &config,
            );
            let flips = ctx.flip(CoinCount::UntilTails);
            assert!(!flips.is_empty() && flips.len() <= 3);
        }
    }

    #[test]
    fn negation_skips_remaining_effects() {
        let registry = EffectRegistry::with_defaults();
        let mut attacker = Combatant::new("Farfetch'd", EnergyType::Fighting, 60).with_hp(30);
        let mut defender = Combatant::new("Rattata", EnergyType::Darkness, 40);
        let config = EngineConfig::default();
        let descriptors = vec![
            EffectDescriptor::CoinFlipConditional(CoinFlipConditional {
                coins: 1,
                on: CoinFace::Tails,
                then: FlipConsequence::AttackFails,
            }),
            EffectDescriptor::Heal(Heal {
                amount: 30,
                target: HealTarget::This,
            }),
        ];
        let mut saw_negation = false;
        for seed in 0..20 {
            let mut coins = CoinSource::from_seed(seed);
            let mut ctx = EffectContext::new(
                &mut attacker,
                Some(&mut defender),
                TurnContext::default(),
                &mut coins,
                &config,
            );
            let result = execute_all(&registry, &mut ctx, 40, &descriptors);
            if result.attack_negated {
                saw_negation = true;
                assert_eq!(result.total_damage, 0);
                assert_eq!(result.effects[1].status, HandlerStatus::Skipped);
                assert_eq!(result.healed, 0);
            }
        }
        assert!(saw_negation);
    }
}
