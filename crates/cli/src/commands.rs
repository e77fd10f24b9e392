use anyhow::{anyhow, Result};
use clap::Parser;
use pocketfx_core::{
    parse_detailed, priority_of, CoinSource, Combatant, EffectEngine, EngineConfig, EnergyType,
    StatusKind, TurnContext,
};
use pocketfx_data::{classify_corpus, load_corpus, render_text};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
pub struct Parse {
    /// Effect text, quoted
    #[arg(value_name = "TEXT")]
    text: String,
}

impl Parse {
    pub fn execute(self, config: EngineConfig) -> Result<()> {
        let engine = EffectEngine::try_new(config)?;
        let report = parse_detailed(&self.text);
        let plan = engine.plan(&self.text);

        println!("confidence {:.2}", report.confidence);
        if !report.rules.is_empty() {
            println!("rules      {}", report.rules.join(", "));
        }
        for descriptor in &plan.kept {
            let priority = priority_of(descriptor.kind());
            println!("  [{}] {descriptor}", priority.class.rank());
        }
        for suppressed in &plan.suppressed {
            println!("  dropped {} ({:?})", suppressed.descriptor, suppressed.reason);
        }
        Ok(())
    }
}

#[derive(Parser)]
pub struct Resolve {
    /// Effect text, quoted
    #[arg(value_name = "TEXT")]
    text: String,

    /// Coin seed; drawn at random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Base damage before effects
    #[arg(short, long, default_value_t = 0)]
    base: u32,

    /// Defender HP
    #[arg(long, default_value_t = 100)]
    hp: u32,

    /// Attacker energy type, as a symbol or name (default psychic)
    #[arg(long = "type", value_name = "ENERGY")]
    energy_type: Option<String>,

    /// Energy of the attacker's own type already attached
    #[arg(long, default_value_t = 0)]
    attached: u32,
}

impl Resolve {
    pub fn execute(self, config: EngineConfig) -> Result<()> {
        let engine = EffectEngine::try_new(config)?;
        let energy_type = match self.energy_type.as_deref() {
            Some(token) => EnergyType::from_token(token)?,
            None => EnergyType::Psychic,
        };
        let mut attacker =
            Combatant::new("Attacker", energy_type, 100).with_energy(energy_type, self.attached);
        let mut defender = Combatant::new("Defender", EnergyType::Fighting, self.hp);
        let mut coins = CoinSource::new(self.seed);
        info!(seed = coins.seed(), "resolving");

        let result = engine.resolve_text(
            &self.text,
            self.base,
            &mut attacker,
            Some(&mut defender),
            TurnContext::new(1, 0),
            &mut coins,
        );
        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }
}

#[derive(Parser)]
pub struct Classify {
    /// Card JSON file or directory of card JSON files
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Worker threads, 0 for one per core
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Classify {
    pub fn execute(self) -> Result<()> {
        let cards = load_corpus(&self.path)?;
        let report = classify_corpus(&cards, self.threads)?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", render_text(&report));
        }
        Ok(())
    }
}

#[derive(Parser)]
pub struct Status {
    /// burned, poisoned, asleep, paralyzed or confused
    #[arg(value_name = "KIND")]
    kind: String,

    /// Between-turn checks to run
    #[arg(short, long, default_value_t = 5)]
    turns: u32,

    /// Coin seed; drawn at random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// HP of the affected combatant
    #[arg(long, default_value_t = 100)]
    hp: u32,
}

impl Status {
    pub fn execute(self, config: EngineConfig) -> Result<()> {
        let kind = StatusKind::from_word(&self.kind)
            .ok_or_else(|| anyhow!("unknown special condition: {}", self.kind))?;
        let engine = EffectEngine::try_new(config)?;
        let machine = engine.status_machine();
        let mut coins = CoinSource::new(self.seed);
        let mut mon = Combatant::new("Target", EnergyType::Psychic, self.hp);

        machine.apply(&mut mon, kind, 0);
        println!("seed {}", coins.seed());
        for turn in 1..=self.turns {
            let logs = engine.process_between_turns(&mut mon, turn, &mut coins);
            for log in &logs {
                println!("{}", log.describe());
            }
            if logs.iter().any(|log| log.knocked_out) {
                println!("knocked out");
                break;
            }
            if mon.conditions.is_empty() {
                println!("no conditions left");
                break;
            }
        }
        println!("hp {}/{}", mon.hp, mon.max_hp);
        Ok(())
    }
}
