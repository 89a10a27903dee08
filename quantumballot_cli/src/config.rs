use quantumballot::DuplicatePolicy;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::env::var;
use thiserror::Error;

/// Random stream used to issue voter identities
pub const ISSUER_STREAM: u64 = 0;

/// Random stream used to sample ballots during the tally
pub const SAMPLER_STREAM: u64 = 1;

/// Random stream used to invent simulated approvals and tokens
pub const SIMULATION_STREAM: u64 = 2;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("quantumballot: invalid seed `{0}`: {1}")]
    BadSeed(String, std::num::ParseIntError),

    #[error(transparent)]
    Policy(#[from] quantumballot::Error),
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Config {
    pub on_duplicate: DuplicatePolicy,
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let on_duplicate = match var("QUANTUMBALLOT_ON_DUPLICATE") {
            Ok(val) => val.parse()?,
            Err(_e) => DuplicatePolicy::default(),
        };

        let seed = match var("QUANTUMBALLOT_SEED") {
            Ok(val) => Some(parse_seed(&val)?),
            Err(_e) => None,
        };

        Ok(Config { on_duplicate, seed })
    }

    /// Command line flags take precedence over the environment
    pub fn with_matches(mut self, matches: &clap::ArgMatches) -> Result<Self, ConfigError> {
        if let Some(val) = matches.value_of("on-duplicate") {
            self.on_duplicate = val.parse()?;
        }
        if let Some(val) = matches.value_of("seed") {
            self.seed = Some(parse_seed(val)?);
        }
        Ok(self)
    }

    /// A random source for one part of the run.
    ///
    /// With a seed configured, every stream is reproducible and independent of the others.
    pub fn rng(&self, stream: u64) -> ChaCha20Rng {
        match self.seed {
            Some(seed) => {
                let mut rng = ChaCha20Rng::seed_from_u64(seed);
                rng.set_stream(stream);
                rng
            }
            None => ChaCha20Rng::from_entropy(),
        }
    }
}

fn parse_seed(val: &str) -> Result<u64, ConfigError> {
    val.trim()
        .parse()
        .map_err(|e| ConfigError::BadSeed(val.to_owned(), e))
}
