use crate::*;
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Counts per candidate
pub type Counts = IndexMap<Candidate, u64>;

/// Counts with every candidate present at zero
pub fn empty_counts() -> Counts {
    Candidate::all().map(|candidate| (candidate, 0)).collect()
}

/// The outcome of a tally
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TallyResult {
    pub counts: Counts,
    pub winners: BTreeSet<Candidate>,
    pub max_count: u64,
}

impl TallyResult {
    pub fn from_counts(counts: Counts) -> Self {
        let (winners, max_count) = resolve_winners(&counts);
        TallyResult {
            counts,
            winners,
            max_count,
        }
    }

    pub fn count(&self, candidate: Candidate) -> u64 {
        self.counts.get(&candidate).copied().unwrap_or(0)
    }

    pub fn is_tie(&self) -> bool {
        self.winners.len() > 1
    }

    /// Human readable statement of the winner, or of the tie
    pub fn announcement(&self) -> String {
        let winners: Vec<String> = self.winners.iter().map(|w| w.to_string()).collect();
        if self.is_tie() {
            format!(
                "It's a tie! Candidates {} have the highest votes with {} votes.",
                winners.join(", "),
                self.max_count
            )
        } else {
            format!(
                "The winner is Candidate {} with {} votes.",
                winners.join(""),
                self.max_count
            )
        }
    }
}

/// Find the highest count and every candidate that reached it.
///
/// Ties are reported in full. When every count is zero, every candidate wins at zero.
pub fn resolve_winners(counts: &Counts) -> (BTreeSet<Candidate>, u64) {
    let max_count = counts.values().copied().max().unwrap_or(0);
    let winners = counts
        .iter()
        .filter(|(_, count)| **count == max_count)
        .map(|(candidate, _)| *candidate)
        .collect();
    (winners, max_count)
}

/// A ballot the sampler could not draw from
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UnsampledBallot {
    pub key: AnonymizedKey,
    pub reason: String,
}

/// Everything a tally pass produced
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TallyReport {
    pub result: TallyResult,

    /// The sampled outcome of each counted ballot
    pub outcomes: IndexMap<AnonymizedKey, Candidate>,

    /// Ballots left out of the counts because sampling failed
    pub unsampled: Vec<UnsampledBallot>,
}

/// Sample every stored ballot exactly once and count the outcomes.
///
/// The pass runs over one call to `Store::records`, so it sees a single consistent set of
/// ballots. A failed draw leaves that ballot out of the counts and is reported in
/// `TallyReport::unsampled`; the rest of the pass carries on. Running twice over the same
/// store can give different counts, since each ballot is sampled afresh.
pub fn tally<S, D>(store: &S, sampler: &mut D) -> TallyReport
where
    S: Store + ?Sized,
    D: Sampler + ?Sized,
{
    let mut counts = empty_counts();
    let mut outcomes = IndexMap::new();
    let mut unsampled = vec![];

    for (key, ballot) in store.records() {
        match sampler.draw(ballot.distribution()) {
            Ok(candidate) => {
                debug!("quantumballot: ballot {} sampled as candidate {}", key, candidate);
                *counts.entry(candidate).or_insert(0) += 1;
                outcomes.insert(key, candidate);
            }
            Err(e) => {
                error!("quantumballot: unable to sample ballot {}: {}", key, e);
                unsampled.push(UnsampledBallot {
                    key,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "quantumballot: tallied {} ballots ({} could not be sampled)",
        outcomes.len(),
        unsampled.len()
    );

    TallyReport {
        result: TallyResult::from_counts(counts),
        outcomes,
        unsampled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(values: [u64; NUM_CANDIDATES]) -> Counts {
        Candidate::all().zip(values.iter().copied()).collect()
    }

    fn winners(indexes: &[usize]) -> BTreeSet<Candidate> {
        indexes.iter().map(|i| Candidate::new(*i).unwrap()).collect()
    }

    #[test]
    fn test_resolve_winners() {
        let (tied, max) = resolve_winners(&counts([5, 5, 1, 0]));
        assert_eq!(tied, winners(&[0, 1]));
        assert_eq!(max, 5);

        let (single, max) = resolve_winners(&counts([0, 2, 7, 3]));
        assert_eq!(single, winners(&[2]));
        assert_eq!(max, 7);

        let (everyone, max) = resolve_winners(&empty_counts());
        assert_eq!(everyone, winners(&[0, 1, 2, 3]));
        assert_eq!(max, 0);

        let input = counts([3, 1, 3, 2]);
        assert_eq!(resolve_winners(&input), resolve_winners(&input));
    }

    #[test]
    fn test_announcement() {
        let result = TallyResult::from_counts(counts([1, 4, 0, 0]));
        assert!(!result.is_tie());
        assert_eq!(
            result.announcement(),
            "The winner is Candidate 1 with 4 votes."
        );

        let result = TallyResult::from_counts(counts([2, 0, 2, 2]));
        assert!(result.is_tie());
        assert_eq!(
            result.announcement(),
            "It's a tie! Candidates 0, 2, 3 have the highest votes with 2 votes."
        );
    }

    struct FailingSampler {
        fail_on: AnonymizedKey,
        store: MemStore,
    }

    impl Sampler for FailingSampler {
        fn draw(&mut self, distribution: &BallotDistribution) -> Result<Candidate, Error> {
            let failing = self.store.get(&self.fail_on).map(|b| *b.distribution());
            if failing.as_ref() == Some(distribution) {
                return Err(Error::SamplerFailure("measurement lost".to_owned()));
            }
            ArgmaxSampler.draw(distribution)
        }
    }

    #[test]
    fn test_sampler_failures_are_isolated() {
        let mut store = MemStore::default();
        let lost = hash_identity("Dave_7777");
        store
            .store(lost, sign(BallotDistribution::new(&[0.0, 0.0, 0.0, 1.0]).unwrap()))
            .unwrap();
        for name in &["Alice_1000", "Bob_1001"] {
            let ballot = sign(BallotDistribution::concentrated(Candidate::DEFAULT));
            store.store(hash_identity(name), ballot).unwrap();
        }

        let mut sampler = FailingSampler {
            fail_on: lost,
            store: store.clone(),
        };
        let report = tally(&store, &mut sampler);

        assert_eq!(report.result.counts, counts([2, 0, 0, 0]));
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.unsampled.len(), 1);
        assert_eq!(report.unsampled[0].key, lost);
        assert!(report.unsampled[0].reason.contains("measurement lost"));
    }

    #[test]
    fn test_tally_empty_store() {
        let report = tally(&MemStore::default(), &mut ArgmaxSampler);
        assert_eq!(report.result.counts, empty_counts());
        assert_eq!(report.result.winners, winners(&[0, 1, 2, 3]));
        assert_eq!(report.result.max_count, 0);
    }

    #[test]
    fn test_result_serialization() {
        let result = TallyResult::from_counts(counts([5, 5, 1, 0]));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "counts": {"0": 5, "1": 5, "2": 1, "3": 0},
                "winners": [0, 1],
                "max_count": 5
            })
        );
        let back: TallyResult = serde_json::from_str(&json.to_string()).unwrap();
        assert_eq!(back, result);
    }
}
