use crate::{BattleEntity, CoinSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusKind {
    Burned,
    Poisoned,
    Asleep,
    Paralyzed,
    Confused,
}

impl StatusKind {
    pub const ALL: [Self; 5] = [
        Self::Burned,
        Self::Poisoned,
        Self::Asleep,
        Self::Paralyzed,
        Self::Confused,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Burned => "burned",
            Self::Poisoned => "poisoned",
            Self::Asleep => "asleep",
            Self::Paralyzed => "paralyzed",
            Self::Confused => "confused",
        }
    }

    pub fn from_word(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "burned" | "burn" | "burnt" => Some(Self::Burned),
            "poisoned" | "poison" => Some(Self::Poisoned),
            "asleep" | "sleep" | "sleeping" => Some(Self::Asleep),
            "paralyzed" | "paralysis" | "paralyze" => Some(Self::Paralyzed),
            "confused" | "confusion" => Some(Self::Confused),
            _ => None,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BattleAction {
    Attack,
    Retreat,
    UseAbility,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// Stays until explicitly removed.
    Never,
    /// Removed by the first between-turns check after it was applied.
    AfterOneTurn,
    /// Removed when a between-turns coin flip lands heads.
    CoinFlip,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusRule {
    pub kind: StatusKind,
    #[serde(default)]
    pub between_turn_damage: u32,
    pub removal: RemovalPolicy,
    #[serde(default)]
    pub blocks: Vec<BattleAction>,
}

impl StatusRule {
    pub fn standard(kind: StatusKind) -> Self {
        let (between_turn_damage, removal, blocks) = match kind {
            StatusKind::Burned => (20, RemovalPolicy::Never, Vec::new()),
            StatusKind::Poisoned => (10, RemovalPolicy::Never, Vec::new()),
            StatusKind::Asleep => (
                0,
                RemovalPolicy::CoinFlip,
                vec![BattleAction::Attack, BattleAction::Retreat],
            ),
            StatusKind::Paralyzed => (
                0,
                RemovalPolicy::AfterOneTurn,
                vec![BattleAction::Attack, BattleAction::Retreat],
            ),
            StatusKind::Confused => (0, RemovalPolicy::Never, Vec::new()),
        };
        Self {
            kind,
            between_turn_damage,
            removal,
            blocks,
        }
    }
}

/// Per-kind damage, removal and action-blocking table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusRules {
    pub rules: Vec<StatusRule>,
}

impl Default for StatusRules {
    fn default() -> Self {
        Self::standard()
    }
}

impl StatusRules {
    pub fn standard() -> Self {
        Self {
            rules: StatusKind::ALL.iter().map(|k| StatusRule::standard(*k)).collect(),
        }
    }

    pub fn rule(&self, kind: StatusKind) -> StatusRule {
        self.rules
            .iter()
            .find(|rule| rule.kind == kind)
            .cloned()
            .unwrap_or_else(|| StatusRule::standard(kind))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusInstance {
    pub kind: StatusKind,
    pub applied_turn: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Absent,
}

/// Active conditions of one entity, at most one instance per kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusSet {
    active: BTreeMap<StatusKind, StatusInstance>,
}

impl StatusSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: StatusKind, turn: u32) -> ApplyOutcome {
        if self.active.contains_key(&kind) {
            return ApplyOutcome::AlreadyPresent;
        }
        self.active.insert(
            kind,
            StatusInstance {
                kind,
                applied_turn: turn,
            },
        );
        ApplyOutcome::Applied
    }

    pub fn remove(&mut self, kind: StatusKind) -> RemoveOutcome {
        match self.active.remove(&kind) {
            Some(_) => RemoveOutcome::Removed,
            None => RemoveOutcome::Absent,
        }
    }

    pub fn contains(&self, kind: StatusKind) -> bool {
        self.active.contains_key(&kind)
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusInstance> {
        self.active.get(&kind)
    }

    pub fn kinds(&self) -> Vec<StatusKind> {
        self.active.keys().copied().collect()
    }

    pub fn clear(&mut self) -> Vec<StatusKind> {
        let kinds = self.kinds();
        self.active.clear();
        kinds
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionGate {
    Allowed,
    BlockedBy(Vec<StatusKind>),
}

impl ActionGate {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// What happened to one condition during between-turns processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLog {
    pub kind: StatusKind,
    pub turn: u32,
    pub damage: u32,
    pub knocked_out: bool,
    /// Coin flip used for the removal check, if any. `true` is heads.
    pub roll: Option<bool>,
    pub removed: bool,
}

impl StatusLog {
    pub fn describe(&self) -> String {
        let mut text = format!("turn {}: {}", self.turn, self.kind);
        if self.damage > 0 {
            text.push_str(&format!(" dealt {} damage", self.damage));
        }
        if self.knocked_out {
            text.push_str(", knocked out");
        }
        if let Some(roll) = self.roll {
            text.push_str(if roll { ", flip heads" } else { ", flip tails" });
        }
        if self.removed {
            text.push_str(", removed");
        }
        text
    }
}

/// Applies, removes and ticks conditions against a rules table.
#[derive(Debug, Clone, Copy)]
pub struct StatusMachine<'a> {
    rules: &'a StatusRules,
}

impl<'a> StatusMachine<'a> {
    pub fn new(rules: &'a StatusRules) -> Self {
        Self { rules }
    }

    pub fn apply(&self, entity: &mut dyn BattleEntity, kind: StatusKind, turn: u32) -> ApplyOutcome {
        let outcome = entity.conditions_mut().insert(kind, turn);
        debug!(entity = entity.name(), %kind, turn, ?outcome, "apply status");
        outcome
    }

    pub fn remove(&self, entity: &mut dyn BattleEntity, kind: StatusKind) -> RemoveOutcome {
        let outcome = entity.conditions_mut().remove(kind);
        debug!(entity = entity.name(), %kind, ?outcome, "remove status");
        outcome
    }

    pub fn has(&self, entity: &dyn BattleEntity, kind: StatusKind) -> bool {
        entity.conditions().contains(kind)
    }

    pub fn clear_all(&self, entity: &mut dyn BattleEntity) -> Vec<StatusKind> {
        let cleared = entity.conditions_mut().clear();
        if !cleared.is_empty() {
            debug!(entity = entity.name(), ?cleared, "clear status");
        }
        cleared
    }

    pub fn can_perform(&self, entity: &dyn BattleEntity, action: BattleAction) -> ActionGate {
        let blockers: Vec<StatusKind> = entity
            .conditions()
            .kinds()
            .into_iter()
            .filter(|kind| self.rules.rule(*kind).blocks.contains(&action))
            .collect();
        if blockers.is_empty() {
            ActionGate::Allowed
        } else {
            ActionGate::BlockedBy(blockers)
        }
    }

    /// Damage first, then the removal check, for each active condition in
    /// kind order.
    pub fn process_between_turns(
        &self,
        entity: &mut dyn BattleEntity,
        turn: u32,
        coins: &mut CoinSource,
    ) -> Vec<StatusLog> {
        let mut logs = Vec::new();
        for kind in entity.conditions().kinds() {
            let rule = self.rules.rule(kind);
            let damage = if rule.between_turn_damage > 0 {
                entity.take_damage(rule.between_turn_damage)
            } else {
                0
            };
            let (roll, removed) = match rule.removal {
                RemovalPolicy::Never => (None, false),
                RemovalPolicy::AfterOneTurn => (None, true),
                RemovalPolicy::CoinFlip => {
                    let heads = coins.flip();
                    (Some(heads), heads)
                }
            };
            if removed {
                entity.conditions_mut().remove(kind);
            }
            let log = StatusLog {
                kind,
                turn,
                damage,
                knocked_out: entity.is_knocked_out(),
                roll,
                removed,
            };
            debug!(entity = entity.name(), status = %log.describe(), "between turns");
            logs.push(log);
        }
        logs
    }

    /// Inflicts a condition chosen uniformly among the kinds not already
    /// active. Returns `None` when every kind is already present.
    pub fn apply_random(
        &self,
        entity: &mut dyn BattleEntity,
        turn: u32,
        coins: &mut CoinSource,
    ) -> Option<StatusKind> {
        let candidates: Vec<StatusKind> = StatusKind::ALL
            .iter()
            .copied()
            .filter(|kind| !entity.conditions().contains(*kind))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let kind = candidates[coins.pick_index(candidates.len())];
        self.apply(entity, kind, turn);
        Some(kind)
    }

    /// Confused attackers flip before attacking. `Some(false)` means the
    /// attack fails; `None` means no check was needed.
    pub fn confusion_check(&self, entity: &dyn BattleEntity, coins: &mut CoinSource) -> Option<bool> {
        if !entity.conditions().contains(StatusKind::Confused) {
            return None;
        }
        Some(coins.flip())
    }
}
