use crate::{BattleEntity, EnergyType, StatusKind};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Side {
    Own,
    Opponent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CoinFace {
    Heads,
    Tails,
}

/// How many coins to flip. Everything but `Fixed` is read from live battle
/// state when the effect executes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CoinCount {
    Fixed(u32),
    UntilTails,
    /// Active plus occupied bench slots of the acting side.
    PerPokemonInPlay,
    PerBenchOccupant(Side),
    PerEnergyAttached(Option<EnergyType>),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StatusTarget {
    Opponent,
    This,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FlipConsequence {
    BonusDamage(u32),
    AttackFails,
    Status {
        kind: StatusKind,
        target: StatusTarget,
    },
    Heal(u32),
    Discard(EnergyDiscard),
}

/// Energy named on the card, or "an Energy" meaning the acting entity's own
/// type. Neither form can name the colorless wildcard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EnergySpec {
    Named(EnergyType),
    OwnType,
}

impl EnergySpec {
    pub fn resolve(self, entity: &dyn BattleEntity) -> EnergyType {
        match self {
            Self::Named(kind) => kind,
            Self::OwnType => entity.energy_type(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EnergyTarget {
    This,
    /// One or more benched Pokémon picked by the caller.
    Bench,
    /// Any own Pokémon picked by the caller.
    AnyOwn,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HealTarget {
    This,
    /// The acting entity stands in for the caller's pick.
    AnyOwn,
    EachOwn,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DamageCondition {
    TargetDamaged,
    SelfDamaged,
    /// `None` means any special condition.
    TargetHasStatus(Option<StatusKind>),
    SelfExtraEnergy {
        energy: Option<EnergyType>,
        at_least: u32,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DiscardCount {
    Count(u32),
    All,
}

/// Bench names a scaling effect counts, compared case-insensitively and
/// whole-name (no substring matching).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NameFilter {
    pub names: Vec<String>,
}

impl NameFilter {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|name| normalize_name(name)).collect(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        let name = normalize_name(name);
        self.names.iter().any(|candidate| *candidate == name)
    }
}

pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace('é', "e")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardFlow {
    Draw(u32),
    Search { criteria: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CoinFlipDamage {
    pub coins: CoinCount,
    pub per_heads: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CoinFlipEnergy {
    pub coins: CoinCount,
    pub per_heads: u32,
    pub energy: EnergySpec,
    pub target: EnergyTarget,
}

/// All `coins` must land on `on` for `then` to happen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CoinFlipConditional {
    pub coins: u32,
    pub on: CoinFace,
    pub then: FlipConsequence,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StatusApply {
    pub kind: StatusKind,
    pub target: StatusTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StatusApplyRandom {
    pub target: StatusTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DamageBonus {
    pub amount: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EnergyScalingDamage {
    pub per_unit: u32,
    pub energy: Option<EnergyType>,
    pub source: Side,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ConditionalDamage {
    pub bonus: u32,
    pub condition: DamageCondition,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BenchScalingDamage {
    pub per_unit: u32,
    pub side: Side,
    pub filter: Option<NameFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Heal {
    pub amount: u32,
    pub target: HealTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HealFull {
    pub target: HealTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EnergyAttach {
    pub energy: EnergySpec,
    pub count: u32,
    pub target: EnergyTarget,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EnergyDiscard {
    /// `None` discards whatever is attached.
    pub energy: Option<EnergyType>,
    pub count: DiscardCount,
    pub from: Side,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SearchOrDraw {
    pub flow: CardFlow,
}

/// Text no rule understood. Kept verbatim so the card gets hand-authored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RawUnparsed {
    pub text: String,
}

/// One parsed effect clause.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EffectDescriptor {
    CoinFlipDamage(CoinFlipDamage),
    CoinFlipEnergy(CoinFlipEnergy),
    CoinFlipConditional(CoinFlipConditional),
    StatusApply(StatusApply),
    StatusApplyRandom(StatusApplyRandom),
    DamageBonus(DamageBonus),
    EnergyScalingDamage(EnergyScalingDamage),
    ConditionalDamage(ConditionalDamage),
    BenchScalingDamage(BenchScalingDamage),
    Heal(Heal),
    HealFull(HealFull),
    EnergyAttach(EnergyAttach),
    EnergyDiscard(EnergyDiscard),
    SearchOrDraw(SearchOrDraw),
    RawUnparsed(RawUnparsed),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EffectKind {
    CoinFlipDamage,
    CoinFlipEnergy,
    CoinFlipConditional,
    StatusApply,
    StatusApplyRandom,
    DamageBonus,
    EnergyScalingDamage,
    ConditionalDamage,
    BenchScalingDamage,
    Heal,
    HealFull,
    EnergyAttach,
    EnergyDiscard,
    SearchOrDraw,
    RawUnparsed,
}

impl EffectKind {
    pub const ALL: [Self; 15] = [
        Self::CoinFlipDamage,
        Self::CoinFlipEnergy,
        Self::CoinFlipConditional,
        Self::StatusApply,
        Self::StatusApplyRandom,
        Self::DamageBonus,
        Self::EnergyScalingDamage,
        Self::ConditionalDamage,
        Self::BenchScalingDamage,
        Self::Heal,
        Self::HealFull,
        Self::EnergyAttach,
        Self::EnergyDiscard,
        Self::SearchOrDraw,
        Self::RawUnparsed,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::CoinFlipDamage => "coin_flip_damage",
            Self::CoinFlipEnergy => "coin_flip_energy",
            Self::CoinFlipConditional => "coin_flip_conditional",
            Self::StatusApply => "status_apply",
            Self::StatusApplyRandom => "status_apply_random",
            Self::DamageBonus => "damage_bonus",
            Self::EnergyScalingDamage => "energy_scaling_damage",
            Self::ConditionalDamage => "conditional_damage",
            Self::BenchScalingDamage => "bench_scaling_damage",
            Self::Heal => "heal",
            Self::HealFull => "heal_full",
            Self::EnergyAttach => "energy_attach",
            Self::EnergyDiscard => "energy_discard",
            Self::SearchOrDraw => "search_or_draw",
            Self::RawUnparsed => "raw_unparsed",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The board effect a descriptor ultimately produces. Two descriptors with the
/// same mechanism describe the same clause when both were matched from one
/// text. Bonuses are told apart by what gates them, never by their amount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Mechanism {
    CoinDamage,
    CoinBonus,
    FlatBonus,
    ConditionalBonus(DamageCondition),
    EnergyScaling,
    BenchScaling,
    AttackNegation,
    Status(StatusKind),
    RandomStatus,
    EnergyGain,
    EnergyLoss,
    Healing,
    CardFlow,
    Manual,
}

impl EffectDescriptor {
    pub fn kind(&self) -> EffectKind {
        match self {
            Self::CoinFlipDamage(_) => EffectKind::CoinFlipDamage,
            Self::CoinFlipEnergy(_) => EffectKind::CoinFlipEnergy,
            Self::CoinFlipConditional(_) => EffectKind::CoinFlipConditional,
            Self::StatusApply(_) => EffectKind::StatusApply,
            Self::StatusApplyRandom(_) => EffectKind::StatusApplyRandom,
            Self::DamageBonus(_) => EffectKind::DamageBonus,
            Self::EnergyScalingDamage(_) => EffectKind::EnergyScalingDamage,
            Self::ConditionalDamage(_) => EffectKind::ConditionalDamage,
            Self::BenchScalingDamage(_) => EffectKind::BenchScalingDamage,
            Self::Heal(_) => EffectKind::Heal,
            Self::HealFull(_) => EffectKind::HealFull,
            Self::EnergyAttach(_) => EffectKind::EnergyAttach,
            Self::EnergyDiscard(_) => EffectKind::EnergyDiscard,
            Self::SearchOrDraw(_) => EffectKind::SearchOrDraw,
            Self::RawUnparsed(_) => EffectKind::RawUnparsed,
        }
    }

    pub fn mechanism(&self) -> Mechanism {
        match self {
            Self::CoinFlipDamage(_) => Mechanism::CoinDamage,
            Self::CoinFlipEnergy(_) => Mechanism::EnergyGain,
            Self::CoinFlipConditional(params) => match params.then {
                FlipConsequence::BonusDamage(_) => Mechanism::CoinBonus,
                FlipConsequence::AttackFails => Mechanism::AttackNegation,
                FlipConsequence::Status { kind, .. } => Mechanism::Status(kind),
                FlipConsequence::Heal(_) => Mechanism::Healing,
                FlipConsequence::Discard(_) => Mechanism::EnergyLoss,
            },
            Self::StatusApply(params) => Mechanism::Status(params.kind),
            Self::StatusApplyRandom(_) => Mechanism::RandomStatus,
            Self::DamageBonus(_) => Mechanism::FlatBonus,
            Self::EnergyScalingDamage(_) => Mechanism::EnergyScaling,
            Self::ConditionalDamage(params) => Mechanism::ConditionalBonus(params.condition),
            Self::BenchScalingDamage(_) => Mechanism::BenchScaling,
            Self::Heal(_) | Self::HealFull(_) => Mechanism::Healing,
            Self::EnergyAttach(_) => Mechanism::EnergyGain,
            Self::EnergyDiscard(_) => Mechanism::EnergyLoss,
            Self::SearchOrDraw(_) => Mechanism::CardFlow,
            Self::RawUnparsed(_) => Mechanism::Manual,
        }
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, Self::RawUnparsed(_))
    }

    pub fn raw(text: &str) -> Self {
        Self::RawUnparsed(RawUnparsed {
            text: text.to_string(),
        })
    }
}

impl fmt::Display for CoinCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(count) => write!(f, "{count} coin(s)"),
            Self::UntilTails => f.write_str("coins until tails"),
            Self::PerPokemonInPlay => f.write_str("a coin per Pokémon in play"),
            Self::PerBenchOccupant(Side::Own) => f.write_str("a coin per own benched Pokémon"),
            Self::PerBenchOccupant(Side::Opponent) => {
                f.write_str("a coin per opponent benched Pokémon")
            }
            Self::PerEnergyAttached(Some(kind)) => write!(f, "a coin per attached {kind} energy"),
            Self::PerEnergyAttached(None) => f.write_str("a coin per attached energy"),
        }
    }
}

impl fmt::Display for EffectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoinFlipDamage(p) => write!(f, "flip {}: +{} per heads", p.coins, p.per_heads),
            Self::CoinFlipEnergy(p) => write!(
                f,
                "flip {}: {} x {:?} energy per heads to {:?}",
                p.coins, p.per_heads, p.energy, p.target
            ),
            Self::CoinFlipConditional(p) => {
                write!(f, "flip {} coin(s): if all {:?}, {:?}", p.coins, p.on, p.then)
            }
            Self::StatusApply(p) => write!(f, "{:?} is now {}", p.target, p.kind),
            Self::StatusApplyRandom(p) => write!(f, "{:?} gets a random condition", p.target),
            Self::DamageBonus(p) => write!(f, "+{} damage", p.amount),
            Self::EnergyScalingDamage(p) => write!(
                f,
                "+{} per {} energy on {:?}",
                p.per_unit,
                p.energy.map(|e| e.name()).unwrap_or("any"),
                p.source
            ),
            Self::ConditionalDamage(p) => write!(f, "+{} if {:?}", p.bonus, p.condition),
            Self::BenchScalingDamage(p) => match &p.filter {
                Some(filter) => write!(
                    f,
                    "+{} per {:?} benched {}",
                    p.per_unit,
                    p.side,
                    filter.names.join(" / ")
                ),
                None => write!(f, "+{} per {:?} benched Pokémon", p.per_unit, p.side),
            },
            Self::Heal(p) => write!(f, "heal {} from {:?}", p.amount, p.target),
            Self::HealFull(p) => write!(f, "heal all from {:?}", p.target),
            Self::EnergyAttach(p) => {
                write!(f, "attach {} x {:?} energy to {:?}", p.count, p.energy, p.target)
            }
            Self::EnergyDiscard(p) => write!(
                f,
                "discard {:?} {} energy from {:?}",
                p.count,
                p.energy.map(|e| e.name()).unwrap_or("any"),
                p.from
            ),
            Self::SearchOrDraw(p) => write!(f, "{:?}", p.flow),
            Self::RawUnparsed(p) => write!(f, "manual: {}", p.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_filter_matches_whole_names_only() {
        let filter = NameFilter::new(&["Wishiwashi", "Wishiwashi ex"]);
        assert!(filter.matches("wishiwashi"));
        assert!(filter.matches("Wishiwashi  EX"));
        assert!(!filter.matches("Wishiwashi Jr"));
        assert!(!filter.matches("Wishi"));
    }

    #[test]
    fn coin_flip_status_shares_mechanism_with_plain_status() {
        let coin = EffectDescriptor::CoinFlipConditional(CoinFlipConditional {
            coins: 1,
            on: CoinFace::Heads,
            then: FlipConsequence::Status {
                kind: StatusKind::Paralyzed,
                target: StatusTarget::Opponent,
            },
        });
        let plain = EffectDescriptor::StatusApply(StatusApply {
            kind: StatusKind::Paralyzed,
            target: StatusTarget::Opponent,
        });
        assert_eq!(coin.mechanism(), plain.mechanism());
        assert_ne!(coin.kind(), plain.kind());
    }

    #[test]
    fn bonuses_with_equal_amounts_are_different_mechanisms() {
        let flat = EffectDescriptor::DamageBonus(DamageBonus { amount: 20 });
        let gated = EffectDescriptor::ConditionalDamage(ConditionalDamage {
            bonus: 20,
            condition: DamageCondition::TargetHasStatus(Some(StatusKind::Poisoned)),
        });
        let coin = EffectDescriptor::CoinFlipConditional(CoinFlipConditional {
            coins: 1,
            on: CoinFace::Heads,
            then: FlipConsequence::BonusDamage(20),
        });
        assert_ne!(flat.mechanism(), gated.mechanism());
        assert_ne!(flat.mechanism(), coin.mechanism());
        assert_ne!(gated.mechanism(), coin.mechanism());
    }
}
