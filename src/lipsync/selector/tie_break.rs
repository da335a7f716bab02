use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::types::Viseme;

/// Chooses among equally valid anti-duplication candidates.
///
/// The selector only calls `pick` with two or more candidates.
pub trait TieBreaker: Send {
    fn pick(&mut self, candidates: &[Viseme]) -> Viseme;
}

pub struct RandomTieBreaker {
    rng: StdRng,
}

impl RandomTieBreaker {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl TieBreaker for RandomTieBreaker {
    fn pick(&mut self, candidates: &[Viseme]) -> Viseme {
        candidates
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Viseme::Neutral)
    }
}

/// Cycles through candidate positions, one step per decision.
#[derive(Debug, Default)]
pub struct RoundRobinTieBreaker {
    cursor: usize,
}

impl TieBreaker for RoundRobinTieBreaker {
    fn pick(&mut self, candidates: &[Viseme]) -> Viseme {
        let picked = candidates
            .get(self.cursor % candidates.len().max(1))
            .copied()
            .unwrap_or(Viseme::Neutral);
        self.cursor = self.cursor.wrapping_add(1);
        picked
    }
}

/// Per-request tie-breaker factory held by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreakStrategy {
    #[default]
    Random,
    /// Random, but reproducible: every request starts from the same seed.
    Seeded(u64),
    RoundRobin,
}

impl TieBreakStrategy {
    pub fn build(&self) -> Box<dyn TieBreaker> {
        match *self {
            Self::Random => Box::new(RandomTieBreaker::from_entropy()),
            Self::Seeded(seed) => Box::new(RandomTieBreaker::seeded(seed)),
            Self::RoundRobin => Box::new(RoundRobinTieBreaker::default()),
        }
    }
}
