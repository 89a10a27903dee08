use crate::*;
use rand::rngs::ThreadRng;
use rand::Rng;

/// Smallest numeric suffix appended to a voter name
pub const ID_SUFFIX_MIN: u16 = 1000;

/// Largest numeric suffix appended to a voter name
pub const ID_SUFFIX_MAX: u16 = 9999;

/// An opaque 4-bit token, rendered as a zero-padded binary string such as `"0110"`.
///
/// Tokens are carried through the protocol but nothing in this crate checks them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct SecretToken(String);

impl SecretToken {
    /// Number of random bits in a token
    pub const BITS: u32 = 4;

    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let bits: u8 = rng.gen_range(0..(1 << Self::BITS));
        SecretToken(format!("{:04b}", bits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SecretToken {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A voter identity as issued by the tallyman
#[derive(Clone, Debug)]
pub struct VoterIdentity {
    pub raw_id: String,

    /// Token shared between the voter and the tallyman
    pub token_ab: SecretToken,

    /// Token shared between the voter and the scrutineer
    pub token_ac: SecretToken,
}

impl VoterIdentity {
    /// The key this voter's ballot is stored under
    pub fn key(&self) -> AnonymizedKey {
        hash_identity(&self.raw_id)
    }
}

/// Issues voter identities.
///
/// A raw id is the voter's name joined to a random four digit suffix. Two voters with the
/// same name can draw the same suffix; nothing here detects or prevents that.
pub struct IdentityIssuer<R: Rng = ThreadRng> {
    rng: R,
}

impl IdentityIssuer<ThreadRng> {
    pub fn new() -> Self {
        IdentityIssuer {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for IdentityIssuer<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> IdentityIssuer<R> {
    /// Create an issuer drawing from the given random source
    pub fn with_rng(rng: R) -> Self {
        IdentityIssuer { rng }
    }

    /// Issue a fresh identity and a pair of secret tokens for `name`
    pub fn issue_identity(&mut self, name: &str) -> VoterIdentity {
        let suffix = self.rng.gen_range(ID_SUFFIX_MIN..=ID_SUFFIX_MAX);
        VoterIdentity {
            raw_id: format!("{}_{}", name, suffix),
            token_ab: SecretToken::generate(&mut self.rng),
            token_ac: SecretToken::generate(&mut self.rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_issue_identity() {
        let mut issuer = IdentityIssuer::new();

        for _ in 0..200 {
            let identity = issuer.issue_identity("Alice");
            let suffix = identity.raw_id.strip_prefix("Alice_").unwrap();
            let suffix: u16 = suffix.parse().unwrap();
            assert!((ID_SUFFIX_MIN..=ID_SUFFIX_MAX).contains(&suffix));

            for token in &[&identity.token_ab, &identity.token_ac] {
                assert_eq!(token.as_str().len(), 4);
                assert!(token.as_str().chars().all(|c| c == '0' || c == '1'));
            }

            assert_eq!(identity.key(), hash_identity(&identity.raw_id));
        }
    }

    #[test]
    fn test_seeded_issuer() {
        let mut first = IdentityIssuer::with_rng(ChaCha20Rng::seed_from_u64(7));
        let mut second = IdentityIssuer::with_rng(ChaCha20Rng::seed_from_u64(7));

        let a = first.issue_identity("Eve");
        let b = second.issue_identity("Eve");
        assert_eq!(a.raw_id, b.raw_id);
        assert_eq!(a.token_ab, b.token_ab);
        assert_eq!(a.token_ac, b.token_ac);
    }
}
