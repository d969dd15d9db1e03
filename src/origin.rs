//! Origin brands for positions.
//!
//! Every container instance carries an `Origin`, and every position it
//! hands out is stamped with it. A position presented to a container
//! with a different origin is foreign and gets rejected instead of being
//! interpreted against the wrong storage.
//!
//! Origins are never reused within a process. Cloning a container mints
//! a fresh origin; moving one keeps it.

use core::marker::PhantomData;
use core::sync::atomic::{AtomicU64, Ordering};

static NEXT_ORIGIN: AtomicU64 = AtomicU64::new(1);

/// Identity of one container instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Origin {
    id: u64,
    // Containers are single-threaded; keep the brand !Send + !Sync with them.
    _nosend: PhantomData<*const ()>,
}

impl Origin {
    /// Mint a brand no other live container carries.
    #[inline]
    pub fn fresh() -> Self {
        let id = NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed);
        Self {
            id,
            _nosend: PhantomData,
        }
    }
}

impl Default for Origin {
    fn default() -> Self {
        Self::fresh()
    }
}

#[cfg(test)]
mod tests {
    use super::Origin;

    #[test]
    fn fresh_origins_are_distinct() {
        let a = Origin::fresh();
        let b = Origin::fresh();
        assert_ne!(a, b);
        assert_eq!(a, a);
        assert!(b.id > a.id);
    }
}
