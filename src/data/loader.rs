use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};

/// Order in which the trainer visits samples during each epoch.
///
/// Sequential order replays the dataset order every epoch. Shuffled order
/// reshuffles the indices at the start of every epoch from a seeded RNG, so
/// two runs with the same seed visit samples identically.
pub struct EpochOrder {
    indices: Vec<usize>,
    rng: Option<StdRng>,
}

impl EpochOrder {
    pub fn sequential(len: usize) -> Self {
        EpochOrder {
            indices: (0..len).collect(),
            rng: None,
        }
    }

    pub fn shuffled(len: usize, seed: u64) -> Self {
        EpochOrder {
            indices: (0..len).collect(),
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }

    /// Indices for the next epoch.
    pub fn next_epoch(&mut self) -> &[usize] {
        if let Some(rng) = self.rng.as_mut() {
            self.indices.shuffle(rng);
        }
        &self.indices
    }
}
