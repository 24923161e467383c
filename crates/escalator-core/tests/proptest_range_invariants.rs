//! Property-based invariant tests for `IndexRange`.
//!
//! 1. Intersection is commutative and fits within both inputs.
//! 2. Partition pieces are disjoint, ordered and cover the original range.
//! 3. Expand never leaves `0..limit` and always covers the clipped input.
//! 4. Config from an empty environment validates.

use escalator_core::{EscalatorConfig, IndexRange};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn range_strategy() -> impl Strategy<Value = IndexRange> {
    (0usize..=500, 0usize..=500).prop_map(|(a, b)| IndexRange::new(a.min(b), a.max(b)))
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Intersection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn intersection_commutative(a in range_strategy(), b in range_strategy()) {
        let ab = a.intersection(&b);
        let ba = b.intersection(&a);
        prop_assert_eq!(ab.len(), ba.len());
        if !ab.is_empty() {
            prop_assert_eq!(ab, ba);
        }
    }

    #[test]
    fn intersection_within_both(a in range_strategy(), b in range_strategy()) {
        let i = a.intersection(&b);
        prop_assert!(a.contains_range(&i), "a={a} i={i}");
        prop_assert!(b.contains_range(&i), "b={b} i={i}");
        for index in i {
            prop_assert!(a.contains(index) && b.contains(index));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Partition
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn partition_covers_range(a in range_strategy(), b in range_strategy()) {
        let (before, inside, after) = a.partition(&b);
        prop_assert_eq!(before.len() + inside.len() + after.len(), a.len());
        let mut all: Vec<usize> = before.into_iter().collect();
        all.extend(inside);
        all.extend(after);
        prop_assert_eq!(all, a.into_iter().collect::<Vec<_>>());
        for index in before {
            prop_assert!(index < b.start());
        }
        for index in after {
            prop_assert!(index >= b.end());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Expand
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn expand_stays_in_limit(
        a in range_strategy(),
        before in 0usize..10,
        after in 0usize..10,
        limit in 0usize..600,
    ) {
        let grown = a.expand(before, after, limit);
        prop_assert!(grown.end() <= limit);
        let clipped = a.intersection(&IndexRange::new(0, limit));
        prop_assert!(grown.contains_range(&clipped), "grown={grown} clipped={clipped}");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Config
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn env_overscan_parses_any_integer(rows in 0usize..10_000) {
        let value = rows.to_string();
        let config = EscalatorConfig::from_env_with(|key| {
            (key == escalator_core::config::ENV_ROW_OVERSCAN).then(|| value.clone())
        });
        prop_assert_eq!(config.row_overscan, rows);
        prop_assert!(config.validate().is_ok());
    }
}
