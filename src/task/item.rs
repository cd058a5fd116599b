//! # Items that carry their own progress index.
//!
//! The loop driver normally increments `current_index` by one per processed
//! item. An item type can override that by returning `Some` from
//! [`ItemIndex::item_index`]: the observed index is then reset to the item's
//! own value. Integer primitives carry their value; everything else defaults
//! to sequential counting.
//!
//! Custom item types opt in with a one-line impl:
//!
//! ```
//! use temptask::ItemIndex;
//!
//! struct Row { offset: i64, text: String }
//!
//! impl ItemIndex for Row {
//!     fn item_index(&self) -> Option<i64> { Some(self.offset) }
//! }
//! ```
//!
//! or accept sequential counting with an empty impl: `impl ItemIndex for Row {}`.

/// Optional self-reported progress index of an iteration item.
pub trait ItemIndex {
    /// The index this item resets progress to, or `None` to increment by one.
    fn item_index(&self) -> Option<i64> {
        None
    }
}

macro_rules! carries_index {
    ($($t:ty),* $(,)?) => {
        $(impl ItemIndex for $t {
            fn item_index(&self) -> Option<i64> {
                Some(*self as i64)
            }
        })*
    };
}

carries_index!(i8, i16, i32, i64, isize, u8, u16, u32);

impl ItemIndex for u64 {
    fn item_index(&self) -> Option<i64> {
        Some(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

impl ItemIndex for usize {
    fn item_index(&self) -> Option<i64> {
        Some(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

macro_rules! sequential {
    ($($t:ty),* $(,)?) => {
        $(impl ItemIndex for $t {})*
    };
}

sequential!((), bool, char, f32, f64, String, &str);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_carry_their_value() {
        assert_eq!(7i32.item_index(), Some(7));
        assert_eq!((-3i64).item_index(), Some(-3));
        assert_eq!(42usize.item_index(), Some(42));
    }

    #[test]
    fn test_oversized_unsigned_saturates() {
        assert_eq!(u64::MAX.item_index(), Some(i64::MAX));
    }

    #[test]
    fn test_non_integers_are_sequential() {
        assert_eq!("row".item_index(), None);
        assert_eq!(String::from("row").item_index(), None);
        assert_eq!(true.item_index(), None);
        assert_eq!(1.5f64.item_index(), None);
    }
}
