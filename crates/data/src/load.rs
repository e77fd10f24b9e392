use anyhow::{bail, Context};
use pocketfx_core::{CardDef, EngineConfig};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reads an engine config. A missing file means the built-in defaults.
pub fn load_engine_config(path: impl AsRef<Path>) -> anyhow::Result<EngineConfig> {
    let path = path.as_ref();
    let config: EngineConfig = if path.exists() {
        load_json(path)?
    } else {
        debug!(path = %path.display(), "no engine config, using defaults");
        EngineConfig::default()
    };
    config
        .validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(config)
}

/// One JSON file holding an array of cards.
pub fn load_cards(path: impl AsRef<Path>) -> anyhow::Result<Vec<CardDef>> {
    load_json(path)
}

/// Loads a corpus from a single card file or from every `.json` file of a
/// directory, taken in file-name order.
pub fn load_corpus(path: impl AsRef<Path>) -> anyhow::Result<Vec<CardDef>> {
    let path = path.as_ref();
    if !path.exists() {
        bail!("corpus not found: {}", path.display());
    }
    if path.is_file() {
        let cards = load_cards(path)?;
        info!(cards = cards.len(), path = %path.display(), "loaded corpus");
        return Ok(cards);
    }

    let mut files = corpus_files(path)?;
    files.sort();
    let mut cards = Vec::new();
    for file in &files {
        let mut batch = load_cards(file)?;
        debug!(cards = batch.len(), path = %file.display(), "loaded card file");
        cards.append(&mut batch);
    }
    info!(
        cards = cards.len(),
        files = files.len(),
        path = %path.display(),
        "loaded corpus"
    );
    Ok(cards)
}

fn corpus_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        files.push(path);
    }
    Ok(files)
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
