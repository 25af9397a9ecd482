//! Deterministic ordering for aggregated results.
//!
//! Concurrent fetches complete in any order; merged lists are always sorted
//! by an explicit field instead of relying on arrival order.

use chrono::{DateTime, Utc};

/// Anything carrying a server-assigned creation timestamp.
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
}

/// Sort newest first (`created_at` descending).
///
/// The sort is stable: items with equal timestamps keep their relative order.
pub fn sort_newest_first<T: Timestamped>(items: &mut [T]) {
    items.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    struct Stamp(i64, usize);

    impl Timestamped for Stamp {
        fn created_at(&self) -> DateTime<Utc> {
            Utc.timestamp_opt(self.0, 0).unwrap()
        }
    }

    #[test]
    fn newest_comes_first() {
        let mut items = vec![Stamp(10, 0), Stamp(30, 1), Stamp(20, 2)];
        sort_newest_first(&mut items);
        let secs: Vec<i64> = items.iter().map(|s| s.0).collect();
        assert_eq!(secs, vec![30, 20, 10]);
    }

    proptest! {
        #[test]
        fn result_does_not_depend_on_arrival_order(
            secs in proptest::collection::vec(0i64..1_000, 0..32),
            rotate in 0usize..32,
        ) {
            let mut a: Vec<Stamp> = secs.iter().enumerate().map(|(i, s)| Stamp(*s, i)).collect();
            let mut b = a.clone();
            if !b.is_empty() {
                let k = rotate % b.len();
                b.rotate_left(k);
            }

            sort_newest_first(&mut a);
            sort_newest_first(&mut b);

            let ts_a: Vec<i64> = a.iter().map(|s| s.0).collect();
            let ts_b: Vec<i64> = b.iter().map(|s| s.0).collect();
            prop_assert_eq!(&ts_a, &ts_b);
            prop_assert!(ts_a.windows(2).all(|w| w[0] >= w[1]));
        }
    }
}
