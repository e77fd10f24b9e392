use crate::{
    execute_all, parse, resolve_detailed, ActionGate, AttackDef, BattleAction, BattleEntity, CardDef,
    CoinFlipRecord, CoinSource, EffectContext, EffectExecutionResult, EffectKind, EffectRegistry,
    EngineConfig, EngineError, Resolution, StatusLog, StatusMachine, SuppressReason, TurnContext,
};
use tracing::{debug, info};

/// Parse, prioritize and execute in one call.
#[derive(Debug)]
pub struct EffectEngine {
    config: EngineConfig,
    registry: EffectRegistry,
}

impl Default for EffectEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EffectEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registry(config, EffectRegistry::with_defaults())
    }

    pub fn with_registry(config: EngineConfig, registry: EffectRegistry) -> Self {
        Self { config, registry }
    }

    /// Validating constructor for configs that came from outside.
    pub fn try_new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EffectRegistry {
        &mut self.registry
    }

    pub fn status_machine(&self) -> StatusMachine<'_> {
        StatusMachine::new(&self.config.status)
    }

    /// Parsed and prioritized descriptors for a text, without touching any
    /// battle state.
    pub fn plan(&self, text: &str) -> Resolution {
        resolve_detailed(&parse(text))
    }

    /// Resolves free-standing effect text with `base_damage` as the starting
    /// total.
    pub fn resolve_text<'a>(
        &self,
        text: &str,
        base_damage: u32,
        attacker: &'a mut dyn BattleEntity,
        defender: Option<&'a mut dyn BattleEntity>,
        turn: TurnContext,
        coins: &mut CoinSource,
    ) -> EffectExecutionResult {
        self.run(text, base_damage, None, attacker, defender, turn, coins)
    }

    /// Resolves one attack of `card`. Attackers blocked by a condition, or
    /// confused attackers that flip tails, deal nothing and trigger no effect.
    pub fn resolve_attack<'a>(
        &self,
        card: &CardDef,
        attack_index: usize,
        attacker: &'a mut dyn BattleEntity,
        defender: Option<&'a mut dyn BattleEntity>,
        turn: TurnContext,
        coins: &mut CoinSource,
    ) -> Result<EffectExecutionResult, EngineError> {
        let attack = card
            .attacks
            .get(attack_index)
            .ok_or_else(|| EngineError::NoSuchAttack {
                card: card.id.clone(),
                index: attack_index,
            })?;

        let machine = self.status_machine();
        if let ActionGate::BlockedBy(blockers) =
            machine.can_perform(&*attacker, BattleAction::Attack)
        {
            let mut result = EffectExecutionResult::new(attack.damage);
            let names: Vec<&str> = blockers.iter().map(|kind| kind.name()).collect();
            result.negate(&format!(
                "{} cannot attack while {}",
                attacker.name(),
                names.join(", ")
            ));
            info!(attacker = attacker.name(), attack = %attack.name, "attack blocked");
            return Ok(result);
        }

        if self.config.confusion_check {
            if let Some(heads) = machine.confusion_check(&*attacker, coins) {
                if !heads {
                    let mut result = EffectExecutionResult::new(attack.damage);
                    result.coin_flips.push(CoinFlipRecord {
                        effect: EffectKind::CoinFlipConditional,
                        flips: vec![false],
                        heads: 0,
                    });
                    result.negate(&format!("{} is confused and flipped tails", attacker.name()));
                    info!(attacker = attacker.name(), attack = %attack.name, "confused attack failed");
                    return Ok(result);
                }
            }
        }

        Ok(self.run(
            &attack.effect,
            attack.damage,
            Some(attack),
            attacker,
            defender,
            turn,
            coins,
        ))
    }

    /// Resolves one ability of `card`. Abilities start from zero damage.
    pub fn resolve_ability<'a>(
        &self,
        card: &CardDef,
        ability_index: usize,
        attacker: &'a mut dyn BattleEntity,
        defender: Option<&'a mut dyn BattleEntity>,
        turn: TurnContext,
        coins: &mut CoinSource,
    ) -> Result<EffectExecutionResult, EngineError> {
        let ability = card
            .abilities
            .get(ability_index)
            .ok_or_else(|| EngineError::NoSuchAbility {
                card: card.id.clone(),
                index: ability_index,
            })?;
        Ok(self.run(&ability.effect, 0, None, attacker, defender, turn, coins))
    }

    pub fn process_between_turns(
        &self,
        entity: &mut dyn BattleEntity,
        turn: u32,
        coins: &mut CoinSource,
    ) -> Vec<StatusLog> {
        self.status_machine().process_between_turns(entity, turn, coins)
    }

    #[allow(clippy::too_many_arguments)]
    fn run<'a>(
        &self,
        text: &str,
        base_damage: u32,
        attack: Option<&AttackDef>,
        attacker: &'a mut dyn BattleEntity,
        defender: Option<&'a mut dyn BattleEntity>,
        turn: TurnContext,
        coins: &mut CoinSource,
    ) -> EffectExecutionResult {
        let plan = self.plan(text);
        let defender = defender.map(|entity| entity as &mut dyn BattleEntity);
        let mut ctx = EffectContext::new(attacker, defender, turn, coins, &self.config);
        ctx.attack = attack;

        let mut result = execute_all(&self.registry, &mut ctx, base_damage, &plan.kept);
        for suppressed in &plan.suppressed {
            let line = match &suppressed.reason {
                SuppressReason::Duplicate => format!("dropped duplicate {}", suppressed.descriptor),
                SuppressReason::Mechanism { by, .. } => {
                    format!("dropped {} in favour of {by}", suppressed.descriptor)
                }
            };
            result.trace.push(line);
        }

        if self.config.apply_damage_to_defender && result.total_damage > 0 {
            if let Some(defender) = ctx.defender.as_deref_mut() {
                let dealt = defender.take_damage(result.total_damage);
                result.damage_dealt = Some(dealt);
                result.knocked_out = defender.is_knocked_out();
                result
                    .trace
                    .push(format!("{} took {dealt} damage", defender.name()));
            }
        }
        debug!(
            total = result.total_damage,
            effects = result.effects.len(),
            suppressed = plan.suppressed.len(),
            "resolution finished"
        );
        result
    }
}
