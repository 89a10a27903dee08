use crate::*;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// What a store does when a ballot arrives under a key it already holds
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Replace the stored ballot with the new one
    Overwrite,

    /// Keep the stored ballot and refuse the new one
    Reject,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        DuplicatePolicy::Overwrite
    }
}

impl FromStr for DuplicatePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(DuplicatePolicy::Overwrite),
            "reject" => Ok(DuplicatePolicy::Reject),
            _ => Err(Error::UnknownDuplicatePolicy(s.to_owned())),
        }
    }
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            DuplicatePolicy::Overwrite => "overwrite",
            DuplicatePolicy::Reject => "reject",
        };
        write!(f, "{}", name)
    }
}

/// A ballot store
pub trait Store {
    /// Get the ballot stored under a key
    fn get(&self, key: &AnonymizedKey) -> Option<SignedBallot>;

    /// All records, ordered by key
    fn records(&self) -> Vec<(AnonymizedKey, SignedBallot)>;

    fn contains(&self, key: &AnonymizedKey) -> bool {
        self.get(key).is_some()
    }

    fn len(&self) -> usize {
        self.records().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A simple store that uses an in-memory BTreeMap
#[derive(Default, Clone, Debug)]
pub struct MemStore {
    inner: BTreeMap<AnonymizedKey, SignedBallot>,
    policy: DuplicatePolicy,
}

impl MemStore {
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        MemStore {
            inner: BTreeMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Store a ballot under `key`, applying the duplicate policy if the key is taken
    pub fn store(&mut self, key: AnonymizedKey, ballot: SignedBallot) -> Result<(), Error> {
        match self.inner.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(ballot);
            }
            Entry::Occupied(mut entry) => match self.policy {
                DuplicatePolicy::Overwrite => {
                    warn!("quantumballot: overwriting ballot stored under {}", key);
                    entry.insert(ballot);
                }
                DuplicatePolicy::Reject => return Err(Error::DuplicateKey(key)),
            },
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &AnonymizedKey) -> Option<SignedBallot> {
        self.inner.remove(key)
    }
}

impl Store for MemStore {
    fn get(&self, key: &AnonymizedKey) -> Option<SignedBallot> {
        self.inner.get(key).copied()
    }

    fn records(&self) -> Vec<(AnonymizedKey, SignedBallot)> {
        self.inner.iter().map(|(k, v)| (*k, *v)).collect()
    }

    fn contains(&self, key: &AnonymizedKey) -> bool {
        self.inner.contains_key(key)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// A store that can be shared between threads.
///
/// Writes take the write lock, so two writes to the same key never interleave. Tally
/// passes should run over `snapshot()`, which copies the store under a single read lock.
#[derive(Default, Clone, Debug)]
pub struct SharedStore {
    inner: Arc<RwLock<MemStore>>,
}

impl SharedStore {
    pub fn new(store: MemStore) -> Self {
        SharedStore {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn store(&self, key: AnonymizedKey, ballot: SignedBallot) -> Result<(), Error> {
        self.write().store(key, ballot)
    }

    pub fn remove(&self, key: &AnonymizedKey) -> Option<SignedBallot> {
        self.write().remove(key)
    }

    /// Copy the current contents of the store
    pub fn snapshot(&self) -> MemStore {
        self.read().clone()
    }

    // A panic while holding the lock cannot leave a MemStore half-written
    fn read(&self) -> RwLockReadGuard<'_, MemStore> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for SharedStore {
    fn get(&self, key: &AnonymizedKey) -> Option<SignedBallot> {
        self.read().get(key)
    }

    fn records(&self) -> Vec<(AnonymizedKey, SignedBallot)> {
        self.read().records()
    }

    fn contains(&self, key: &AnonymizedKey) -> bool {
        self.read().contains(key)
    }

    fn len(&self) -> usize {
        self.read().len()
    }
}

impl From<Vec<(AnonymizedKey, SignedBallot)>> for MemStore {
    fn from(item: Vec<(AnonymizedKey, SignedBallot)>) -> Self {
        let mut memstore = MemStore::default();
        for (key, ballot) in item {
            memstore.inner.insert(key, ballot);
        }
        memstore
    }
}
