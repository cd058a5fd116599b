//! # Checkpoint throttling and percent bookkeeping.
//!
//! [`Throttle`] decides, per processed item, whether the worker should reach a
//! *checkpoint*: the point where it polls cancellation, updates shared
//! progress, and honors the pause gate. The cadence is every Nth index.
//!
//! Pure, stateless logic; all thread-safe state lives with the worker.

/// Decides which item indices are checkpoints.
///
/// Configured from a raw `notify_interval`; values `<= 0` are normalized to 1
/// so that every item is a checkpoint.
///
/// # Example
/// ```
/// use temptask::Throttle;
///
/// let t = Throttle::new(5);
/// assert!(!t.is_checkpoint(3));
/// assert!(t.is_checkpoint(5));
/// assert!(t.is_checkpoint(10));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Throttle {
    interval: i64,
}

impl Throttle {
    /// Creates a throttle from a raw interval, normalizing `<= 0` to 1.
    pub fn new(raw_interval: i64) -> Self {
        Self {
            interval: raw_interval.max(1),
        }
    }

    /// Returns the normalized interval (always `>= 1`).
    pub fn interval(&self) -> i64 {
        self.interval
    }

    /// Returns true if the given index is a checkpoint.
    pub fn is_checkpoint(&self, index: i64) -> bool {
        index % self.interval == 0
    }
}

impl Default for Throttle {
    /// Every item is a checkpoint.
    fn default() -> Self {
        Self::new(1)
    }
}

/// Computes `index * 100 / total`, clamped to `0..=100`.
///
/// Callers must only pass a known `total > 0`; anything else yields 0.
/// A carried item index may run past a stale total, hence the clamp.
pub fn percent_of(index: i64, total: i64) -> u8 {
    if total <= 0 || index <= 0 {
        return 0;
    }
    (index.saturating_mul(100) / total).clamp(0, 100) as u8
}

/// Extracts an exact element count from [`Iterator::size_hint`].
///
/// Returns `Some` only when the lower and upper bounds agree, the analog of
/// probing a source collection for its known size.
pub fn exact_size(hint: (usize, Option<usize>)) -> Option<i64> {
    match hint {
        (lo, Some(hi)) if lo == hi => i64::try_from(lo).ok(),
        _ => None,
    }
}

/// Resolves the total count used for percent computation.
///
/// An exact source size wins over the caller's hint; hints `<= 0` mean
/// "unknown" and suppress percent computation entirely.
pub fn resolve_total(exact: Option<i64>, hint: Option<i64>) -> Option<i64> {
    exact.filter(|n| *n > 0).or_else(|| hint.filter(|n| *n > 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_normalized_to_one() {
        assert_eq!(Throttle::new(0).interval(), 1);
        assert_eq!(Throttle::new(-7).interval(), 1);
        assert_eq!(Throttle::new(3).interval(), 3);
    }

    #[test]
    fn test_every_item_is_checkpoint_at_interval_one() {
        let t = Throttle::new(1);
        for i in 1..50 {
            assert!(t.is_checkpoint(i), "index {} should be a checkpoint", i);
        }
    }

    #[test]
    fn test_cadence_multiples_only() {
        let t = Throttle::new(5);
        let hits: Vec<i64> = (1..=20).filter(|i| t.is_checkpoint(*i)).collect();
        assert_eq!(hits, vec![5, 10, 15, 20]);
    }

    #[test]
    fn test_percent_bounds() {
        assert_eq!(percent_of(0, 10), 0);
        assert_eq!(percent_of(5, 10), 50);
        assert_eq!(percent_of(10, 10), 100);
        // Carried index past the total is clamped, never above 100.
        assert_eq!(percent_of(25, 10), 100);
    }

    #[test]
    fn test_percent_unknown_total_is_zero() {
        assert_eq!(percent_of(5, 0), 0);
        assert_eq!(percent_of(5, -1), 0);
        assert_eq!(percent_of(-3, 10), 0);
    }

    #[test]
    fn test_percent_no_overflow_on_huge_index() {
        assert_eq!(percent_of(i64::MAX, 10), 100);
    }

    #[test]
    fn test_exact_size_requires_agreeing_bounds() {
        assert_eq!(exact_size((4, Some(4))), Some(4));
        assert_eq!(exact_size((0, None)), None);
        assert_eq!(exact_size((1, Some(9))), None);
    }

    #[test]
    fn test_resolve_total_prefers_exact_over_hint() {
        assert_eq!(resolve_total(Some(4), Some(1000)), Some(4));
        assert_eq!(resolve_total(None, Some(12)), Some(12));
        assert_eq!(resolve_total(None, Some(-1)), None);
        assert_eq!(resolve_total(Some(0), None), None);
    }
}
