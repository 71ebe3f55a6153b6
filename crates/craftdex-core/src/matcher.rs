//! Submatrix containment with wildcard cells.
//!
//! The pattern (`small`) slides over every offset of `big`. An empty cell in
//! the pattern matches anything; any other cell must be equal.

use crate::shape::NormalizedShape;

/// Check whether `small` occurs somewhere inside `big`.
///
/// Returns false immediately when `small` is taller or wider than `big`.
#[must_use]
pub fn contains(big: &NormalizedShape, small: &NormalizedShape) -> bool {
    if small.height() > big.height() || small.width() > big.width() {
        return false;
    }

    let max_y = big.height() - small.height();
    let max_x = big.width() - small.width();

    for start_y in 0..=max_y {
        for start_x in 0..=max_x {
            if matches_at(big, small, start_y, start_x) {
                return true;
            }
        }
    }
    false
}

/// Check the pattern against `big` with its top-left corner at
/// `(start_y, start_x)`.
fn matches_at(
    big: &NormalizedShape,
    small: &NormalizedShape,
    start_y: usize,
    start_x: usize,
) -> bool {
    for y in 0..small.height() {
        for x in 0..small.width() {
            let wanted = small.get(y, x);
            if !wanted.is_empty() && wanted != big.get(start_y + y, start_x + x) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{normalize, normalize_rows, Grid};
    use craftdex_common::ItemId;
    use proptest::prelude::*;

    fn shape(rows: &[&[u32]]) -> NormalizedShape {
        let rows: Vec<Vec<ItemId>> = rows
            .iter()
            .map(|r| r.iter().copied().map(ItemId::new).collect())
            .collect();
        normalize_rows(&rows).expect("rectangular")
    }

    #[test]
    fn test_wildcard_matches_any_value() {
        let big = shape(&[&[1, 2], &[3, 4]]);
        // A leading zero column is trimmed away, leaving `[[2]]`.
        assert_eq!(shape(&[&[0, 2]]), shape(&[&[2]]));
        assert!(contains(&big, &shape(&[&[0, 2]])));

        // Interior zeros survive normalization and act as wildcards.
        let pattern = shape(&[&[1, 0], &[0, 4]]);
        assert_eq!((pattern.height(), pattern.width()), (2, 2));
        assert!(contains(&big, &pattern));
        assert!(!contains(&shape(&[&[1, 2], &[3, 5]]), &pattern));

        assert!(contains(&big, &shape(&[&[1, 2]])));
        assert!(contains(&big, &shape(&[&[2], &[4]])));
        assert!(!contains(&big, &shape(&[&[5, 2]])));
    }

    #[test]
    fn test_zero_cell_inside_pattern_is_wildcard() {
        // Normalization keeps interior zeros; build the pattern by hand.
        let big = shape(&[&[1, 2], &[3, 4]]);
        let pattern = shape(&[&[7, 7]]);
        assert!(!contains(&big, &pattern));

        let wildcard = normalize_rows(&[vec![ItemId::new(2), ItemId::EMPTY, ItemId::new(9)]])
            .expect("rectangular");
        let wide = shape(&[&[2, 5, 9]]);
        assert!(contains(&wide, &wildcard));
    }

    #[test]
    fn test_pattern_must_fit() {
        let big = shape(&[&[1, 1]]);
        assert!(!contains(&big, &shape(&[&[1], &[1]])));
        assert!(!contains(&big, &shape(&[&[1, 1, 1]])));
    }

    #[test]
    fn test_slides_to_every_offset() {
        let big = shape(&[&[1, 2, 3], &[4, 5, 6], &[7, 8, 9]]);
        assert!(contains(&big, &shape(&[&[5, 6], &[8, 9]])));
        assert!(contains(&big, &shape(&[&[7]])));
        assert!(!contains(&big, &shape(&[&[6, 4]])));
    }

    #[test]
    fn test_degenerate_pattern_matches_everything() {
        let big = shape(&[&[3]]);
        assert!(contains(&big, &normalize(&Grid::empty())));
    }

    proptest! {
        #[test]
        fn prop_shape_contains_itself(cells in prop::array::uniform9(0u32..4)) {
            let s = normalize(&Grid::from_flat(&cells).expect("nine cells"));
            prop_assert!(contains(&s, &s));
        }

        #[test]
        fn prop_oversized_pattern_never_matches(
            big in prop::array::uniform9(0u32..3),
            small in prop::array::uniform9(0u32..3),
        ) {
            let big = normalize(&Grid::from_flat(&big).expect("nine cells"));
            let small = normalize(&Grid::from_flat(&small).expect("nine cells"));
            if small.height() > big.height() || small.width() > big.width() {
                prop_assert!(!contains(&big, &small));
            }
        }
    }
}
