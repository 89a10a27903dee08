use crate::*;

/// Check that a ballot is stored under `key`.
///
/// This is a membership test only: a missing key, including one that was never issued,
/// gives `false`.
pub fn verify<S: Store + ?Sized>(key: &AnonymizedKey, store: &S) -> bool {
    store.contains(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let mut store = MemStore::default();
        let stored = hash_identity("Charlie_5150");
        store
            .store(stored, sign(encode(&ApprovalSet::from_flags(&[1, 1, 0, 0]).unwrap())))
            .unwrap();

        assert!(verify(&stored, &store));
        assert!(!verify(&hash_identity("Charlie_5151"), &store));
        assert!(!verify(&hash_identity("never issued"), &MemStore::default()));

        store.remove(&stored);
        assert!(!verify(&stored, &store));
    }
}
