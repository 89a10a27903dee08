use crate::*;
use digest::Digest;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::convert::TryInto;
use std::str::FromStr;

/// Length of an anonymized key in bytes
pub const KEY_LEN: usize = 32;

/// Anonymized voter key
///
/// The SHA-256 digest of a voter's raw identity. Ballots are stored under this key,
/// so neither the ballot store nor a scrutineer ever handles the raw identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnonymizedKey([u8; KEY_LEN]);

impl AnonymizedKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        AnonymizedKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

/// Derive the anonymized key for a raw voter identity
pub fn hash_identity(raw_id: &str) -> AnonymizedKey {
    let digest = sha2::Sha256::digest(raw_id.as_bytes());
    let mut bytes = [0; KEY_LEN];
    bytes.copy_from_slice(&digest);
    AnonymizedKey(bytes)
}

impl FromStr for AnonymizedKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| Error::KeyBadHex)?;
        let bytes: [u8; KEY_LEN] = bytes.as_slice().try_into().map_err(|_| Error::KeyBadLen)?;
        Ok(AnonymizedKey(bytes))
    }
}

impl std::fmt::Display for AnonymizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for AnonymizedKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(de::Error::custom)
    }
}

impl Serialize for AnonymizedKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hash_identity() {
        assert_eq!(
            hash_identity("abc").to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_identity("Alice_4821"), hash_identity("Alice_4821"));
        assert_ne!(hash_identity("Alice_4821"), hash_identity("Alice_4822"));

        let keys: HashSet<AnonymizedKey> = (1000..10000)
            .map(|suffix| hash_identity(&format!("Alice_{}", suffix)))
            .collect();
        assert_eq!(keys.len(), 9000);
    }

    #[test]
    fn test_key_parsing() {
        let key = hash_identity("Bob_1234");
        let parsed = AnonymizedKey::from_str(&key.to_string()).unwrap();
        assert_eq!(key, parsed);

        assert!(matches!(
            AnonymizedKey::from_str("not hex"),
            Err(Error::KeyBadHex)
        ));
        assert!(matches!(
            AnonymizedKey::from_str("abcd"),
            Err(Error::KeyBadLen)
        ));

        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", key));
        let from_json: AnonymizedKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, from_json);
    }
}
