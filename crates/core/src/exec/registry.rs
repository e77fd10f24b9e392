use super::handlers;
use super::EffectContext;
use crate::{EffectDescriptor, EffectKind, EffectOutcome};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

pub trait EffectHandler: Send + Sync {
    fn execute(&self, ctx: &mut EffectContext<'_>, descriptor: &EffectDescriptor) -> EffectOutcome;
}

impl<F> EffectHandler for F
where
    F: Fn(&mut EffectContext<'_>, &EffectDescriptor) -> EffectOutcome + Send + Sync,
{
    fn execute(&self, ctx: &mut EffectContext<'_>, descriptor: &EffectDescriptor) -> EffectOutcome {
        self(ctx, descriptor)
    }
}

/// Maps each effect kind to the handler that applies it.
pub struct EffectRegistry {
    handlers: HashMap<EffectKind, Box<dyn EffectHandler>>,
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(EffectKind::CoinFlipDamage, handlers::coin_flip_damage);
        registry.register(EffectKind::CoinFlipEnergy, handlers::coin_flip_energy);
        registry.register(EffectKind::CoinFlipConditional, handlers::coin_flip_conditional);
        registry.register(EffectKind::StatusApply, handlers::status_apply);
        registry.register(EffectKind::StatusApplyRandom, handlers::status_apply_random);
        registry.register(EffectKind::DamageBonus, handlers::damage_bonus);
        registry.register(EffectKind::EnergyScalingDamage, handlers::energy_scaling_damage);
        registry.register(EffectKind::ConditionalDamage, handlers::conditional_damage);
        registry.register(EffectKind::BenchScalingDamage, handlers::bench_scaling_damage);
        registry.register(EffectKind::Heal, handlers::heal);
        registry.register(EffectKind::HealFull, handlers::heal_full);
        registry.register(EffectKind::EnergyAttach, handlers::energy_attach);
        registry.register(EffectKind::EnergyDiscard, handlers::energy_discard);
        registry.register(EffectKind::SearchOrDraw, handlers::search_or_draw);
        registry.register(EffectKind::RawUnparsed, handlers::raw_unparsed);
        registry
    }

    /// Returns the handler previously registered for `kind`, if any.
    pub fn register<H>(&mut self, kind: EffectKind, handler: H) -> Option<Box<dyn EffectHandler>>
    where
        H: EffectHandler + 'static,
    {
        self.handlers.insert(kind, Box::new(handler))
    }

    pub fn unregister(&mut self, kind: EffectKind) -> Option<Box<dyn EffectHandler>> {
        self.handlers.remove(&kind)
    }

    pub fn contains(&self, kind: EffectKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Registered kinds in declaration order.
    pub fn kinds(&self) -> Vec<EffectKind> {
        EffectKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.contains(*kind))
            .collect()
    }

    /// A kind without a handler reports `NotImplemented` instead of failing.
    pub fn execute(&self, ctx: &mut EffectContext<'_>, descriptor: &EffectDescriptor) -> EffectOutcome {
        let kind = descriptor.kind();
        match self.handlers.get(&kind) {
            Some(handler) => handler.execute(ctx, descriptor),
            None => {
                warn!(%kind, "no handler registered");
                EffectOutcome::not_implemented(kind)
            }
        }
    }
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
