use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

/// Append-only set of revoked token identifiers.
///
/// The set must support concurrent inserts and membership checks without
/// lost updates. Entries are never removed during a process's lifetime.
/// Implementations are not required to survive a restart; a multi-process
/// deployment should back this trait with a shared store instead.
pub trait RevocationStore: Send + Sync {
    fn revoke(&self, jti: &str);
    fn is_revoked(&self, jti: &str) -> bool;
}

/// Process-local revocation set for single-process deployments.
/// Empty at startup, grows monotonically, gone on restart.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    revoked: RwLock<HashSet<String>>,
}

impl RevocationStore for InMemoryRevocationStore {
    fn revoke(&self, jti: &str) {
        self.revoked
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(jti.to_string());
    }

    fn is_revoked(&self, jti: &str) -> bool {
        self.revoked
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(jti)
    }
}
