//! Runs the effect parser over a whole card corpus.
//!
//! Workers only read card text and fill their own report; reports are merged
//! in chunk order so the result does not depend on thread scheduling.

use crate::CoverageReport;
use anyhow::anyhow;
use pocketfx_core::{parse_detailed, CardDef};
use std::num::NonZeroUsize;
use std::thread;
use tracing::{debug, info};

/// Coverage for one card's attack, ability and trainer texts.
pub fn classify_card(card: &CardDef) -> CoverageReport {
    let mut report = CoverageReport::new();
    report.cards = 1;
    for (source, text) in card.effect_texts() {
        report.record(&card.id, &card.name, source, text, &parse_detailed(text));
    }
    report
}

/// Classifies `cards` on up to `threads` workers. Zero picks the machine's
/// available parallelism.
pub fn classify_corpus(cards: &[CardDef], threads: usize) -> anyhow::Result<CoverageReport> {
    let workers = worker_count(threads, cards.len());
    if workers <= 1 {
        let report = classify_chunk(cards);
        info!(cards = report.cards, texts = report.texts, "classified corpus");
        return Ok(report);
    }

    let chunk_size = cards.len().div_ceil(workers);
    let partials = thread::scope(|scope| {
        let handles: Vec<_> = cards
            .chunks(chunk_size)
            .enumerate()
            .map(|(idx, chunk)| {
                scope.spawn(move || {
                    debug!(worker = idx, cards = chunk.len(), "classifying chunk");
                    classify_chunk(chunk)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| anyhow!("classification worker panicked"))
            })
            .collect::<anyhow::Result<Vec<_>>>()
    })?;

    let mut report = CoverageReport::new();
    for partial in partials {
        report.merge(partial);
    }
    info!(
        cards = report.cards,
        texts = report.texts,
        workers,
        "classified corpus"
    );
    Ok(report)
}

fn classify_chunk(cards: &[CardDef]) -> CoverageReport {
    let mut report = CoverageReport::new();
    for card in cards {
        report.merge(classify_card(card));
    }
    report
}

fn worker_count(requested: usize, cards: usize) -> usize {
    let wanted = if requested == 0 {
        thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
    } else {
        requested
    };
    wanted.min(cards).max(1)
}
