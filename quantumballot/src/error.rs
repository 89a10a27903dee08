use crate::*;

use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("quantumballot: invalid approval set: {0}")]
    InvalidApprovalSet(String),

    #[error("quantumballot: candidate index {0} is out of range")]
    InvalidCandidate(usize),

    #[error("quantumballot: invalid ballot distribution: {0}")]
    InvalidDistribution(String),

    #[error("quantumballot: a ballot is already stored under key {0}")]
    DuplicateKey(AnonymizedKey),

    #[error("quantumballot: invalid key - invalid hexidecimal")]
    KeyBadHex,

    #[error("quantumballot: invalid key - wrong length")]
    KeyBadLen,

    #[error("quantumballot: unknown duplicate policy `{0}` (expected `overwrite` or `reject`)")]
    UnknownDuplicatePolicy(String),

    #[error("quantumballot: sampler failure: {0}")]
    SamplerFailure(String),

    #[error("quantumballot: CBOR error in store snapshot: {0}")]
    CBORDeserialization(#[from] serde_cbor::Error),

    #[error("quantumballot: JSON error in store snapshot: {0}")]
    JSONDeserialization(#[from] serde_json::Error),

    #[error("quantumballot: error deserializing store snapshot: unknown format")]
    DeserializationUnknownFormat,
}
