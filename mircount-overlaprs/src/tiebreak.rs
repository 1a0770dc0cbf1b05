use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

///
/// Chooses one of several equally good features for a read.
///
pub trait TieBreaker {
    /// Index of the chosen candidate. Called with `candidates >= 2`; must return a value below it.
    fn pick(&mut self, candidates: usize) -> usize;
}

///
/// Uniform random choice backed by a [`StdRng`].
///
/// With a seed the sequence of choices is reproducible; without one the
/// generator is seeded from the operating system.
///
pub struct SeededTieBreaker {
    rng: StdRng,
}

impl SeededTieBreaker {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };

        Self { rng }
    }
}

impl TieBreaker for SeededTieBreaker {
    fn pick(&mut self, candidates: usize) -> usize {
        if candidates <= 1 {
            return 0;
        }
        self.rng.random_range(0..candidates)
    }
}

/// Always takes the first candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstCandidate;

impl TieBreaker for FirstCandidate {
    fn pick(&mut self, _candidates: usize) -> usize {
        0
    }
}
