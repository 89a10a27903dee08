use crate::*;
use std::convert::TryFrom;

/// Number of candidates on every ballot
pub const NUM_CANDIDATES: usize = 4;

/// Tolerance used when checking that a distribution sums to one
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-9;

/// A candidate, identified by its index on the ballot
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct Candidate(u8);

impl Candidate {
    /// The candidate a blank ballot is assigned to
    pub const DEFAULT: Candidate = Candidate(0);

    pub fn new(index: usize) -> Result<Self, Error> {
        if index >= NUM_CANDIDATES {
            return Err(Error::InvalidCandidate(index));
        }
        Ok(Candidate(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// All candidates in ballot order
    pub fn all() -> impl Iterator<Item = Candidate> {
        (0..NUM_CANDIDATES as u8).map(Candidate)
    }
}

impl TryFrom<u8> for Candidate {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Candidate::new(index as usize)
    }
}

impl From<Candidate> for u8 {
    fn from(candidate: Candidate) -> Self {
        candidate.0
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single approval as it arrives from a collaborator: a boolean or a 0/1 flag.
///
/// Any other value still deserializes, as `Other`, so that it is rejected by the
/// conversion to `bool` rather than by the parser of the surrounding document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum ApprovalFlag {
    Bool(bool),
    Flag(u8),
    Other(serde_json::Value),
}

impl TryFrom<ApprovalFlag> for bool {
    type Error = Error;

    fn try_from(flag: ApprovalFlag) -> Result<Self, Self::Error> {
        match flag {
            ApprovalFlag::Bool(approved) => Ok(approved),
            ApprovalFlag::Flag(0) => Ok(false),
            ApprovalFlag::Flag(1) => Ok(true),
            ApprovalFlag::Flag(other) => Err(Error::InvalidApprovalSet(format!(
                "approval flags must be 0 or 1, found {}",
                other
            ))),
            ApprovalFlag::Other(value) => Err(Error::InvalidApprovalSet(format!(
                "approval flags must be 0, 1 or a boolean, found {}",
                value
            ))),
        }
    }
}

/// One approval per candidate, in candidate order
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "Vec<ApprovalFlag>")]
pub struct ApprovalSet([bool; NUM_CANDIDATES]);

impl ApprovalSet {
    pub fn new(approvals: &[bool]) -> Result<Self, Error> {
        if approvals.len() != NUM_CANDIDATES {
            return Err(Error::InvalidApprovalSet(format!(
                "expected {} approvals, found {}",
                NUM_CANDIDATES,
                approvals.len()
            )));
        }
        let mut set = [false; NUM_CANDIDATES];
        set.copy_from_slice(approvals);
        Ok(ApprovalSet(set))
    }

    /// Build an approval set from 0/1 flags
    pub fn from_flags(flags: &[u8]) -> Result<Self, Error> {
        let flags: Vec<ApprovalFlag> = flags.iter().map(|f| ApprovalFlag::Flag(*f)).collect();
        Self::try_from(flags)
    }

    /// An approval set approving exactly one candidate
    pub fn single(candidate: Candidate) -> Self {
        let mut set = [false; NUM_CANDIDATES];
        set[candidate.index()] = true;
        ApprovalSet(set)
    }

    pub fn is_approved(&self, candidate: Candidate) -> bool {
        self.0[candidate.index()]
    }

    pub fn approval_count(&self) -> usize {
        self.0.iter().filter(|approved| **approved).count()
    }

    /// True when no candidate is approved
    pub fn is_blank(&self) -> bool {
        self.approval_count() == 0
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl From<[bool; NUM_CANDIDATES]> for ApprovalSet {
    fn from(approvals: [bool; NUM_CANDIDATES]) -> Self {
        ApprovalSet(approvals)
    }
}

impl TryFrom<Vec<ApprovalFlag>> for ApprovalSet {
    type Error = Error;

    fn try_from(flags: Vec<ApprovalFlag>) -> Result<Self, Self::Error> {
        let approvals = flags
            .into_iter()
            .map(bool::try_from)
            .collect::<Result<Vec<bool>, Error>>()?;
        ApprovalSet::new(&approvals)
    }
}

/// A probability distribution over the candidates
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
#[serde(try_from = "Vec<f64>")]
pub struct BallotDistribution([f64; NUM_CANDIDATES]);

impl BallotDistribution {
    /// Validate and wrap a list of per-candidate probabilities.
    ///
    /// Entries must be finite and non-negative, and must sum to one within `DISTRIBUTION_TOLERANCE`.
    pub fn new(probabilities: &[f64]) -> Result<Self, Error> {
        if probabilities.len() != NUM_CANDIDATES {
            return Err(Error::InvalidDistribution(format!(
                "expected {} probabilities, found {}",
                NUM_CANDIDATES,
                probabilities.len()
            )));
        }
        if let Some(bad) = probabilities.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(Error::InvalidDistribution(format!(
                "probability {} is not a finite non-negative number",
                bad
            )));
        }
        let total: f64 = probabilities.iter().sum();
        if (total - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(Error::InvalidDistribution(format!(
                "probabilities sum to {}, not 1",
                total
            )));
        }

        let mut distribution = [0.0; NUM_CANDIDATES];
        distribution.copy_from_slice(probabilities);
        Ok(BallotDistribution(distribution))
    }

    /// A distribution with all probability on one candidate
    pub fn concentrated(candidate: Candidate) -> Self {
        let mut distribution = [0.0; NUM_CANDIDATES];
        distribution[candidate.index()] = 1.0;
        BallotDistribution(distribution)
    }

    pub fn probability(&self, candidate: Candidate) -> f64 {
        self.0[candidate.index()]
    }

    pub fn probabilities(&self) -> &[f64; NUM_CANDIDATES] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for BallotDistribution {
    type Error = Error;

    fn try_from(probabilities: Vec<f64>) -> Result<Self, Self::Error> {
        BallotDistribution::new(&probabilities)
    }
}

/// Encode an approval set as a probability distribution over candidates.
///
/// Each of the `k` approved candidates receives probability `1/k`; the rest receive zero.
/// A blank approval set is treated as an approval of `Candidate::DEFAULT` alone, and a
/// warning is logged.
pub fn encode(approvals: &ApprovalSet) -> BallotDistribution {
    let approvals = if approvals.is_blank() {
        warn!(
            "quantumballot: blank approval set, assigning default vote to candidate {}",
            Candidate::DEFAULT
        );
        ApprovalSet::single(Candidate::DEFAULT)
    } else {
        *approvals
    };

    let share = 1.0 / approvals.approval_count() as f64;
    let mut distribution = [0.0; NUM_CANDIDATES];
    for (probability, approved) in distribution.iter_mut().zip(approvals.0.iter()) {
        if *approved {
            *probability = share;
        }
    }
    BallotDistribution(distribution)
}

/// A ballot carrying the voter's signature marker. Only `sign` can produce one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SignedBallot {
    distribution: BallotDistribution,
    signed: bool,
}

impl SignedBallot {
    pub fn distribution(&self) -> &BallotDistribution {
        &self.distribution
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }
}

/// Sign an encoded ballot.
///
/// The signature is a structural marker only. It never alters the distribution, so the
/// sampled outcome of a signed ballot has exactly the statistics of the unsigned one.
pub fn sign(distribution: BallotDistribution) -> SignedBallot {
    SignedBallot {
        distribution,
        signed: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_approval_sets() -> Vec<ApprovalSet> {
        (0u8..16)
            .map(|bits| {
                let approvals: Vec<bool> =
                    (0..NUM_CANDIDATES).map(|i| bits & (1 << i) != 0).collect();
                ApprovalSet::new(&approvals).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_encode() {
        for approvals in all_approval_sets().into_iter().filter(|a| !a.is_blank()) {
            let k = approvals.approval_count() as f64;
            let distribution = encode(&approvals);

            for candidate in Candidate::all() {
                let expected = if approvals.is_approved(candidate) {
                    1.0 / k
                } else {
                    0.0
                };
                assert_eq!(distribution.probability(candidate), expected);
            }

            let total: f64 = distribution.probabilities().iter().sum();
            assert!((total - 1.0).abs() <= DISTRIBUTION_TOLERANCE);
        }
    }

    #[test]
    fn test_blank_ballot_defaults_to_first_candidate() {
        let blank = ApprovalSet::new(&[false, false, false, false]).unwrap();
        let first = ApprovalSet::new(&[true, false, false, false]).unwrap();
        assert!(blank.is_blank());
        assert_eq!(encode(&blank), encode(&first));
        assert_eq!(
            encode(&blank),
            BallotDistribution::concentrated(Candidate::DEFAULT)
        );
    }

    #[test]
    fn test_invalid_approval_sets() {
        assert!(matches!(
            ApprovalSet::new(&[true, false, true]),
            Err(Error::InvalidApprovalSet(_))
        ));
        assert!(matches!(
            ApprovalSet::from_flags(&[1, 0, 0, 0, 1]),
            Err(Error::InvalidApprovalSet(_))
        ));
        assert!(matches!(
            ApprovalSet::from_flags(&[1, 0, 2, 0]),
            Err(Error::InvalidApprovalSet(_))
        ));
        assert_eq!(
            ApprovalSet::from_flags(&[0, 1, 1, 0]).unwrap(),
            ApprovalSet::new(&[false, true, true, false]).unwrap()
        );

        let mixed: ApprovalSet = serde_json::from_str("[1, false, true, 0]").unwrap();
        assert_eq!(mixed.as_slice(), &[true, false, true, false]);
        assert!(serde_json::from_str::<ApprovalSet>("[1, 0, 1]").is_err());
        assert!(serde_json::from_str::<ApprovalSet>("[1, 0, 7, 0]").is_err());
    }

    #[test]
    fn test_malformed_flags_parse_then_fail_conversion() {
        let flags: Vec<ApprovalFlag> =
            serde_json::from_str(r#"[1, 0, "x", 0, -1, 256, 0.5, null, true]"#).unwrap();
        assert_eq!(flags.len(), 9);
        assert_eq!(flags[2], ApprovalFlag::Other(serde_json::json!("x")));

        for i in &[2, 4, 5, 6, 7] {
            assert!(matches!(
                bool::try_from(flags[*i].clone()),
                Err(Error::InvalidApprovalSet(_))
            ));
        }
        assert!(bool::try_from(flags[8].clone()).unwrap());

        let flags: Vec<ApprovalFlag> = serde_json::from_str(r#"[1, 0, "yes", 0]"#).unwrap();
        assert!(matches!(
            ApprovalSet::try_from(flags),
            Err(Error::InvalidApprovalSet(_))
        ));
    }

    #[test]
    fn test_sign_preserves_distribution() {
        for approvals in all_approval_sets() {
            let distribution = encode(&approvals);
            let signed = sign(distribution);
            assert!(signed.is_signed());
            assert_eq!(signed.distribution(), &distribution);
        }

        let uneven = BallotDistribution::new(&[0.1, 0.2, 0.3, 0.4]).unwrap();
        assert_eq!(sign(uneven).distribution(), &uneven);
    }

    #[test]
    fn test_distribution_validation() {
        assert!(BallotDistribution::new(&[0.5, 0.5, 0.0, 0.0]).is_ok());
        assert!(BallotDistribution::new(&[0.5, 0.5, 0.0]).is_err());
        assert!(BallotDistribution::new(&[0.5, 0.6, 0.0, 0.0]).is_err());
        assert!(BallotDistribution::new(&[1.5, -0.5, 0.0, 0.0]).is_err());
        assert!(BallotDistribution::new(&[f64::NAN, 1.0, 0.0, 0.0]).is_err());

        assert!(serde_json::from_str::<BallotDistribution>("[0.25, 0.25, 0.25, 0.25]").is_ok());
        assert!(serde_json::from_str::<BallotDistribution>("[0.25, 0.25, 0.25, 0.2]").is_err());
    }

    #[test]
    fn test_candidate() {
        assert_eq!(Candidate::all().count(), NUM_CANDIDATES);
        assert!(Candidate::new(3).is_ok());
        assert!(matches!(Candidate::new(4), Err(Error::InvalidCandidate(4))));
        assert!(serde_json::from_str::<Candidate>("2").is_ok());
        assert!(serde_json::from_str::<Candidate>("9").is_err());
    }
}
