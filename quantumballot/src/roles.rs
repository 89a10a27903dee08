use crate::*;
use rand::rngs::ThreadRng;
use rand::Rng;

/// A voter holding an issued identity
pub struct Voter {
    identity: VoterIdentity,
    key: AnonymizedKey,
}

impl Voter {
    pub fn new(identity: VoterIdentity) -> Self {
        let key = identity.key();
        Voter { identity, key }
    }

    pub fn identity(&self) -> &VoterIdentity {
        &self.identity
    }

    /// The anonymized key this voter's ballot is stored under
    pub fn key(&self) -> AnonymizedKey {
        self.key
    }

    pub fn encode_vote(&self, approvals: &ApprovalSet) -> BallotDistribution {
        encode(approvals)
    }

    pub fn sign_vote(&self, distribution: BallotDistribution) -> SignedBallot {
        sign(distribution)
    }
}

/// Issues voter identities and keeps the ballot store
pub struct Tallyman<R: Rng = ThreadRng> {
    issuer: IdentityIssuer<R>,
    store: MemStore,
}

impl Tallyman<ThreadRng> {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Tallyman::with_issuer(IdentityIssuer::new(), policy)
    }
}

impl<R: Rng> Tallyman<R> {
    pub fn with_issuer(issuer: IdentityIssuer<R>, policy: DuplicatePolicy) -> Self {
        Tallyman {
            issuer,
            store: MemStore::with_policy(policy),
        }
    }

    pub fn issue_voter_id(&mut self, name: &str) -> VoterIdentity {
        self.issuer.issue_identity(name)
    }

    pub fn store_vote(&mut self, key: AnonymizedKey, ballot: SignedBallot) -> Result<(), Error> {
        self.store.store(key, ballot)
    }

    pub fn store(&self) -> &MemStore {
        &self.store
    }

    pub fn tally<D: Sampler + ?Sized>(&self, sampler: &mut D) -> TallyReport {
        tally(&self.store, sampler)
    }
}

/// An independent party confirming that ballots were recorded.
///
/// The scrutineer is given a token meant to be shared with voters, but it is never compared
/// against anything: verification is a membership test on the anonymized key alone.
pub struct Scrutineer {
    token: SecretToken,
}

impl Scrutineer {
    pub fn new(token: SecretToken) -> Self {
        Scrutineer { token }
    }

    pub fn token(&self) -> &SecretToken {
        &self.token
    }

    pub fn verify_vote<S: Store + ?Sized>(&self, key: &AnonymizedKey, store: &S) -> bool {
        verify(key, store)
    }
}

/// What a voter gets back after casting a ballot
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CastReceipt {
    pub voter: String,
    pub key: AnonymizedKey,

    /// The voter approved no one and the ballot went to `Candidate::DEFAULT`
    pub defaulted: bool,

    /// The scrutineer found the ballot in the store straight after it was cast
    pub verified: bool,
}

/// A ballot the store refused
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RejectedBallot {
    pub voter: String,
    pub key: AnonymizedKey,
    pub reason: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ElectionReport {
    pub receipts: Vec<CastReceipt>,
    pub rejected: Vec<RejectedBallot>,
    pub tally: TallyReport,
}

/// Run the whole protocol over a list of named approval sets.
///
/// For each voter in order: issue an identity, encode and sign the approvals, store the
/// ballot under the voter's anonymized key, and have the scrutineer check it. Once every
/// ballot is in, the store is tallied.
pub fn run_election<R, D>(
    ballots: &[(String, ApprovalSet)],
    tallyman: &mut Tallyman<R>,
    scrutineer: &Scrutineer,
    sampler: &mut D,
) -> ElectionReport
where
    R: Rng,
    D: Sampler + ?Sized,
{
    let mut receipts = Vec::with_capacity(ballots.len());
    let mut rejected = vec![];

    for (name, approvals) in ballots {
        let voter = Voter::new(tallyman.issue_voter_id(name));
        let ballot = voter.sign_vote(voter.encode_vote(approvals));

        if let Err(e) = tallyman.store_vote(voter.key(), ballot) {
            warn!("quantumballot: ballot from {} refused: {}", voter.key(), e);
            rejected.push(RejectedBallot {
                voter: name.clone(),
                key: voter.key(),
                reason: e.to_string(),
            });
            continue;
        }

        let verified = scrutineer.verify_vote(&voter.key(), tallyman.store());
        if verified {
            info!("quantumballot: vote verified for voter hash ID {}", voter.key());
        } else {
            warn!("quantumballot: vote could not be verified for {}", voter.key());
        }

        receipts.push(CastReceipt {
            voter: name.clone(),
            key: voter.key(),
            defaulted: approvals.is_blank(),
            verified,
        });
    }

    let tally = tallyman.tally(sampler);

    ElectionReport {
        receipts,
        rejected,
        tally,
    }
}
