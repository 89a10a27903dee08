use crate::*;
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Draws a single outcome from a ballot distribution.
///
/// Candidate `i` must be returned with probability `distribution[i]`. Implementations may be
/// a pseudo-random generator or a measurement on a real or simulated quantum device; the
/// tally makes no other assumption about them.
pub trait Sampler {
    fn draw(&mut self, distribution: &BallotDistribution) -> Result<Candidate, Error>;
}

impl<S: Sampler + ?Sized> Sampler for &mut S {
    fn draw(&mut self, distribution: &BallotDistribution) -> Result<Candidate, Error> {
        (**self).draw(distribution)
    }
}

/// Weighted random choice driven by an `Rng`
pub struct RandomSampler<R: Rng = ChaCha20Rng> {
    rng: R,
}

impl RandomSampler<ChaCha20Rng> {
    pub fn from_entropy() -> Self {
        RandomSampler {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// A reproducible sampler
    pub fn seeded(seed: u64) -> Self {
        RandomSampler {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomSampler<R> {
    pub fn new(rng: R) -> Self {
        RandomSampler { rng }
    }
}

impl<R: Rng> Sampler for RandomSampler<R> {
    fn draw(&mut self, distribution: &BallotDistribution) -> Result<Candidate, Error> {
        let weights = WeightedIndex::new(distribution.probabilities().iter())
            .map_err(|e| Error::SamplerFailure(e.to_string()))?;
        Candidate::new(weights.sample(&mut self.rng))
    }
}

/// Deterministic sampler returning the most probable candidate.
///
/// Ties go to the lowest index. Useful wherever an exact, repeatable outcome is needed.
#[derive(Default, Copy, Clone, Debug)]
pub struct ArgmaxSampler;

impl Sampler for ArgmaxSampler {
    fn draw(&mut self, distribution: &BallotDistribution) -> Result<Candidate, Error> {
        let probabilities = distribution.probabilities();
        let mut best = 0;
        for (index, probability) in probabilities.iter().enumerate() {
            if *probability > probabilities[best] {
                best = index;
            }
        }
        Candidate::new(best)
    }
}
