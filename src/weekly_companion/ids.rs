//! Identifier generation for new habits, logs and reflections.
//!
//! The store never calls `Uuid::new_v4` directly; it asks its [`IdGenerator`].
//! Production stores use [`RandomIds`], tests inject [`SequentialIds`] to get
//! predictable ids.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Uuid;
}

/// Random (v4) UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> Uuid {
        generate_id()
    }
}

/// Deterministic ids: `00000000-0000-4000-8000-000000000001`, `…002`, …
///
/// The version and variant nibbles are set so the values still look like v4.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after `last` (the next id will be `last + 1`).
    pub fn starting_after(last: u64) -> Self {
        Self {
            counter: AtomicU64::new(last),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> Uuid {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let tail = u128::from(n & 0x0000_FFFF_FFFF_FFFF);
        Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0000 | tail)
    }
}

pub fn generate_id() -> Uuid {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_ids_are_v4() {
        let id = RandomIds.next_id();
        assert_eq!(id.get_version_num(), 4);
    }

    #[test]
    fn random_ids_are_unique() {
        let ids: HashSet<Uuid> = (0..100).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::new();
        assert_eq!(
            ids.next_id().to_string(),
            "00000000-0000-4000-8000-000000000001"
        );
        assert_eq!(
            ids.next_id().to_string(),
            "00000000-0000-4000-8000-000000000002"
        );
    }

    #[test]
    fn sequential_ids_can_resume() {
        let ids = SequentialIds::starting_after(41);
        assert_eq!(
            ids.next_id().to_string(),
            "00000000-0000-4000-8000-00000000002a"
        );
    }

    #[test]
    fn sequential_ids_look_like_v4() {
        let id = SequentialIds::new().next_id();
        assert_eq!(id.get_version_num(), 4);
    }
}
