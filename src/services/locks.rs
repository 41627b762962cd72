//! Per-repository edit locks
//!
//! Interactive generation/revision and the auto-generation poller share one
//! `EditLocks`. Holding an `EditLease` means no other writer touches that
//! repository's history until the lease is dropped.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug, Clone, Default)]
pub struct EditLocks {
    held: Arc<Mutex<HashSet<String>>>,
}

impl EditLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock for `repo_id`, or `None` if someone else holds it
    pub fn try_acquire(&self, repo_id: &str) -> Option<EditLease> {
        let mut held = self.held.lock();
        if !held.insert(repo_id.to_string()) {
            return None;
        }
        Some(EditLease {
            repo_id: repo_id.to_string(),
            held: Arc::clone(&self.held),
        })
    }

    pub fn is_locked(&self, repo_id: &str) -> bool {
        self.held.lock().contains(repo_id)
    }
}

/// Releases its repository on drop
#[derive(Debug)]
pub struct EditLease {
    repo_id: String,
    held: Arc<Mutex<HashSet<String>>>,
}

impl Drop for EditLease {
    fn drop(&mut self) {
        self.held.lock().remove(&self.repo_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lease_is_exclusive_until_dropped() {
        let locks = EditLocks::new();
        let lease = locks.try_acquire("acme/widgets");
        assert!(lease.is_some());
        assert!(locks.try_acquire("acme/widgets").is_none());
        assert!(locks.try_acquire("acme/gadgets").is_some());

        drop(lease);
        assert!(!locks.is_locked("acme/widgets"));
        assert!(locks.try_acquire("acme/widgets").is_some());
    }
}
