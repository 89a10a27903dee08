use crate::*;
use content_inspector::ContentType;
use indexmap::IndexMap;

const UTF_8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A stored ballot as it is written to disk
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BallotRecord {
    pub key: AnonymizedKey,
    pub distribution: BallotDistribution,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampled_outcome: Option<Candidate>,
}

/// A persisted copy of a ballot store
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub records: Vec<BallotRecord>,
}

impl StoreSnapshot {
    /// Capture the records of a store, along with their sampled outcomes if a tally has run
    pub fn capture<S: Store + ?Sized>(
        store: &S,
        outcomes: Option<&IndexMap<AnonymizedKey, Candidate>>,
    ) -> Self {
        let records = store
            .records()
            .into_iter()
            .map(|(key, ballot)| BallotRecord {
                key,
                distribution: *ballot.distribution(),
                sampled_outcome: outcomes.and_then(|o| o.get(&key).copied()),
            })
            .collect();
        StoreSnapshot { records }
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Unpack from bytes, either JSON or CBOR
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes = bytes.strip_prefix(UTF_8_BOM).unwrap_or(bytes);
        let starts_like_json = bytes
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .map_or(false, |b| *b == b'{');

        match content_inspector::inspect(bytes) {
            ContentType::UTF_8 if starts_like_json => Ok(serde_json::from_slice(bytes)?),
            ContentType::UTF_8 | ContentType::BINARY => Ok(serde_cbor::from_slice(bytes)?),
            _ => Err(Error::DeserializationUnknownFormat),
        }
    }

    /// Rebuild a store from the snapshot. Each ballot is signed afresh.
    pub fn into_store(self, policy: DuplicatePolicy) -> Result<MemStore, Error> {
        let mut store = MemStore::with_policy(policy);
        for record in self.records {
            store.store(record.key, sign(record.distribution))?;
        }
        Ok(store)
    }
}
