use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

pub const DEFAULT_MAX_FLIPS: u32 = 10;

/// Seeded coin flipper. Each battle or test owns its own instance; two sources
/// built from the same seed yield the same sequence.
#[derive(Debug, Clone)]
pub struct CoinSource {
    seed: u64,
    rng: StdRng,
}

impl CoinSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Without a seed one is drawn from the OS so the run can still be replayed
    /// through `seed()`.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_seed(rand::thread_rng().next_u64()),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// `true` is heads.
    pub fn flip(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    pub fn flip_n(&mut self, count: u32) -> Vec<bool> {
        (0..count).map(|_| self.flip()).collect()
    }

    /// Flips until the first tails or `max_flips` coins, whichever comes first.
    pub fn flip_until_tails(&mut self, max_flips: u32) -> (Vec<bool>, u32) {
        let mut flips = Vec::new();
        let mut heads = 0;
        while (flips.len() as u32) < max_flips {
            let face = self.flip();
            flips.push(face);
            if !face {
                break;
            }
            heads += 1;
        }
        (flips, heads)
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

pub fn heads_count(flips: &[bool]) -> u32 {
    flips.iter().filter(|face| **face).count() as u32
}
