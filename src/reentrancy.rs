//! Debug-only reentrancy check for sections that call into user code.
//!
//! `ChainedMap` runs `K: Eq`, `K: Hash` and the caller's hasher while its
//! chains are being probed or relinked. Entering the same map again from
//! inside one of those calls would observe half-linked chains. In debug
//! builds the check panics on nested entry and names both operations; in
//! release builds it compiles to nothing.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

/// Per-instance tracker. Guard a section with
/// `let _g = self.reentrancy.enter("find");`.
#[derive(Debug)]
pub struct ReentrancyCheck {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    _nosend: PhantomData<*mut ()>,
}

impl ReentrancyCheck {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _nosend: PhantomData,
        }
    }

    /// Enter the section named `op`. Panics in debug builds when another
    /// section of the same instance is still active.
    #[inline]
    pub fn enter(&self, op: &'static str) -> SectionGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("reentrant call: `{op}` entered while `{outer}` is running");
            }
            self.active.set(Some(op));
            SectionGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            SectionGuard { _z: PhantomData }
        }
    }
}

impl Default for ReentrancyCheck {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by `ReentrancyCheck::enter`.
pub struct SectionGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ReentrancyCheck,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for SectionGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReentrancyCheck;

    #[test]
    fn sequential_sections_are_ok() {
        let r = ReentrancyCheck::new();
        {
            let _g = r.enter("find");
        }
        let _g = r.enter("remove");
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_section_panics_with_both_names() {
        let r = ReentrancyCheck::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = r.enter("find");
            let _inner = r.enter("insert");
        }));
        let payload = res.expect_err("nested entry must panic in debug builds");
        let msg = payload
            .downcast_ref::<String>()
            .cloned()
            .unwrap_or_default();
        assert!(msg.contains("insert") && msg.contains("find"), "{msg}");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_section_is_noop_in_release() {
        let r = ReentrancyCheck::new();
        let _outer = r.enter("find");
        let _inner = r.enter("insert");
    }
}
