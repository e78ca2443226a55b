//! Definition identity allocation.
//!
//! # Responsibility
//! - Issue one integer identity per created definition, process-wide.
//!
//! # Invariants
//! - Identities strictly increase in allocation order.
//! - An identity is never reissued or reassigned, across every kernel.
//! - The first identity issued by a fresh allocator is `DefinitionId::ROOT`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique, monotonically assigned identity of one definition.
///
/// Used as the base half of every extension cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionId(u64);

impl DefinitionId {
    /// Identity of the first definition created in the process.
    pub const ROOT: DefinitionId = DefinitionId(0);

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl Display for DefinitionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

static PROCESS_IDENTITIES: IdentityAllocator = IdentityAllocator::new();

/// Counter issuing definition identities.
///
/// Increments are atomic, so concurrent callers still observe strictly
/// increasing values.
#[derive(Debug, Default)]
pub struct IdentityAllocator {
    next: AtomicU64,
}

impl IdentityAllocator {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Allocator shared by every kernel in the process.
    pub fn global() -> &'static IdentityAllocator {
        &PROCESS_IDENTITIES
    }

    /// Issues the next identity. Called exactly once per created definition.
    pub fn allocate(&self) -> DefinitionId {
        DefinitionId(self.next.fetch_add(1, Ordering::SeqCst))
    }

    /// Returns the number of identities issued so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::{DefinitionId, IdentityAllocator};

    #[test]
    fn first_identity_is_root() {
        let allocator = IdentityAllocator::new();
        let first = allocator.allocate();
        assert_eq!(first, DefinitionId::ROOT);
        assert!(first.is_root());
    }

    #[test]
    fn identities_strictly_increase() {
        let allocator = IdentityAllocator::new();
        let ids: Vec<DefinitionId> = (0..5).map(|_| allocator.allocate()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(allocator.issued(), 5);
    }

    #[test]
    fn concurrent_allocation_never_repeats() {
        use std::collections::BTreeSet;
        use std::sync::Arc;

        let allocator = Arc::new(IdentityAllocator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let allocator = Arc::clone(&allocator);
                std::thread::spawn(move || {
                    (0..100).map(|_| allocator.allocate()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = BTreeSet::new();
        for handle in handles {
            for id in handle.join().expect("allocator thread") {
                assert!(seen.insert(id), "identity {id} issued twice");
            }
        }
        assert_eq!(seen.len(), 400);
    }

    #[test]
    fn global_allocator_is_shared() {
        let first = IdentityAllocator::global().allocate();
        let second = IdentityAllocator::global().allocate();
        assert!(first < second);
        assert!(std::ptr::eq(
            IdentityAllocator::global(),
            IdentityAllocator::global()
        ));
    }
}
