//! Deciding whether this site owns a row of a partitioned table.

use ahash::RandomState;
use partdb_sats::AlgebraicValue;
use std::collections::BTreeSet;

/// Answers, for the partition key of a row, whether the row belongs to a partition hosted here.
pub trait PartitionLocality {
    fn is_local(&self, key: &AlgebraicValue) -> bool;
}

impl<F: Fn(&AlgebraicValue) -> bool> PartitionLocality for F {
    fn is_local(&self, key: &AlgebraicValue) -> bool {
        self(key)
    }
}

/// Every partition is hosted here, as in a single-site deployment.
#[derive(Debug, Default, Copy, Clone)]
pub struct AllLocal;

impl PartitionLocality for AllLocal {
    fn is_local(&self, _: &AlgebraicValue) -> bool {
        true
    }
}

/// Assigns keys to `partition_count` partitions by hash,
/// of which the ones in `local` are hosted here.
///
/// The hasher is seeded with fixed keys,
/// so every site running the same build agrees on the assignment.
#[derive(Clone)]
pub struct HashPartitioner {
    partition_count: u32,
    local: BTreeSet<u32>,
    hasher: RandomState,
}

impl HashPartitioner {
    const SEEDS: [u64; 4] = [
        0x243f_6a88_85a3_08d3,
        0x1319_8a2e_0370_7344,
        0xa409_3822_299f_31d0,
        0x082e_fa98_ec4e_6c89,
    ];

    /// Returns a partitioner over `partition_count` partitions hosting `local`.
    ///
    /// Panics if `partition_count` is zero.
    pub fn new(partition_count: u32, local: impl IntoIterator<Item = u32>) -> Self {
        assert!(partition_count > 0, "a table has at least one partition");
        let [k0, k1, k2, k3] = Self::SEEDS;
        Self {
            partition_count,
            local: local.into_iter().collect(),
            hasher: RandomState::with_seeds(k0, k1, k2, k3),
        }
    }

    /// Returns the partition that owns `key`.
    pub fn partition_of(&self, key: &AlgebraicValue) -> u32 {
        (self.hasher.hash_one(key) % u64::from(self.partition_count)) as u32
    }

    pub fn partition_count(&self) -> u32 {
        self.partition_count
    }
}

impl PartitionLocality for HashPartitioner {
    fn is_local(&self, key: &AlgebraicValue) -> bool {
        self.local.contains(&self.partition_of(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn closures_are_oracles() {
        let even = |key: &AlgebraicValue| key.as_i64().is_some_and(|k| k % 2 == 0);
        assert!(even.is_local(&AlgebraicValue::I64(4)));
        assert!(!even.is_local(&AlgebraicValue::I64(3)));
        assert!(AllLocal.is_local(&AlgebraicValue::Null));
    }

    #[test]
    fn owning_every_partition_is_all_local() {
        let partitioner = HashPartitioner::new(4, 0..4);
        assert!((0..100i64).all(|k| partitioner.is_local(&k.into())));
        let none = HashPartitioner::new(4, []);
        assert!((0..100i64).all(|k| !none.is_local(&k.into())));
    }

    proptest! {
        #[test]
        fn partition_assignment_is_stable(key in any::<i64>(), count in 1u32..64) {
            let a = HashPartitioner::new(count, [0]);
            let b = HashPartitioner::new(count, [0]);
            let key = AlgebraicValue::I64(key);
            prop_assert!(a.partition_of(&key) < count);
            prop_assert_eq!(a.partition_of(&key), b.partition_of(&key));
            prop_assert_eq!(a.is_local(&key), a.partition_of(&key) == 0);
        }
    }
}
