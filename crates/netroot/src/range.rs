use std::fmt;

use crate::netlist::BusExtent;

/// Inclusive bit-index interval walked from `left` to `right`.
///
/// The cursor makes a `Range` its own iterator; [`Range::reset`] rewinds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub left: i64,
    pub right: i64,
    pub ascending: bool,
    pos: i64,
}

impl Range {
    pub fn new(left: i64, right: i64) -> Self {
        Self {
            left,
            right,
            ascending: right > left,
            pos: left,
        }
    }

    pub fn width(&self) -> usize {
        usize::try_from(self.left.abs_diff(self.right))
            .map_or(usize::MAX, |diff| diff.saturating_add(1))
    }

    pub fn pos(&self) -> i64 {
        self.pos
    }

    pub fn has_next(&self) -> bool {
        if self.ascending {
            self.pos <= self.right
        } else {
            self.pos >= self.right
        }
    }

    pub fn reset(&mut self) {
        self.pos = self.left;
    }

    /// Per-bit names `base[idx]` in declared order, independent of the cursor.
    pub fn bit_names(self, base: &str) -> impl Iterator<Item = String> + '_ {
        Range::new(self.left, self.right).map(move |idx| bit_name(base, idx))
    }
}

impl From<BusExtent> for Range {
    fn from(extent: BusExtent) -> Self {
        Range::new(extent.from, extent.to)
    }
}

impl Iterator for Range {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if !self.has_next() {
            return None;
        }
        let idx = self.pos;
        self.pos += if self.ascending { 1 } else { -1 };
        Some(idx)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.left, self.right)
    }
}

pub fn bit_name(base: &str, idx: i64) -> String {
    format!("{base}[{idx}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descending_range() {
        let range = Range::new(7, 0);
        assert!(!range.ascending);
        assert_eq!(range.width(), 8);
        assert_eq!(range.collect::<Vec<_>>(), vec![7, 6, 5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_ascending_range() {
        let range = Range::new(2, 5);
        assert!(range.ascending);
        assert_eq!(range.collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_single_bit_range() {
        let mut range = Range::new(3, 3);
        assert_eq!(range.width(), 1);
        assert_eq!(range.next(), Some(3));
        assert_eq!(range.next(), None);
        range.reset();
        assert_eq!(range.pos(), 3);
        assert!(range.has_next());
    }

    #[test]
    fn test_width_of_extreme_extents() {
        assert_eq!(Range::new(-2, 1).width(), 4);
        assert_eq!(Range::new(i64::MAX, i64::MAX - 1).width(), 2);
        assert_eq!(Range::new(i64::MIN, i64::MAX).width(), usize::MAX);
    }

    #[test]
    fn test_bit_names_ignore_cursor() {
        let mut range = Range::new(1, 0);
        range.next();
        assert_eq!(
            range.bit_names("d").collect::<Vec<_>>(),
            vec!["d[1]".to_string(), "d[0]".to_string()]
        );
        assert_eq!(range.to_string(), "[1:0]");
    }
}
