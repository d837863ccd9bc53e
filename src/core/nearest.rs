//! Nearest-sample lookup over time-ordered sequences.
//!
//! Every function here expects its input sorted in non-decreasing order;
//! callers own that guarantee.

use serde::{Deserialize, Serialize};

use crate::core::LinearScale;

/// Hover distance, in pixels, under which a candidate counts as found.
pub const DEFAULT_HOVER_THRESHOLD_PX: f64 = 5.0;

/// Insertion boundary to return instead of the nearest element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchSide {
    /// First index whose value is `>= target`.
    Left,
    /// First index whose value is `> target`.
    Right,
}

/// Index of the value closest to `target` in a sorted slice.
///
/// See [`closest_index_by`].
#[must_use]
pub fn closest_index(target: f64, sorted_values: &[f64], side: Option<SearchSide>) -> Option<usize> {
    closest_index_by(target, sorted_values, |value| *value, side)
}

/// Index of the item whose key is closest to `target`.
///
/// Without a side, equal distances to the predecessor and the successor
/// resolve to the predecessor (the lower index). With a side, the matching
/// insertion boundary is returned, clamped to the last index.
/// Returns `None` only for empty input.
#[must_use]
pub fn closest_index_by<T>(
    target: f64,
    items: &[T],
    key: impl Fn(&T) -> f64,
    side: Option<SearchSide>,
) -> Option<usize> {
    match items.len() {
        0 => return None,
        1 => return Some(0),
        _ => {}
    }
    let last = items.len() - 1;

    match side {
        Some(SearchSide::Left) => {
            Some(items.partition_point(|item| key(item) < target).min(last))
        }
        Some(SearchSide::Right) => {
            Some(items.partition_point(|item| key(item) <= target).min(last))
        }
        None => {
            let insertion = items.partition_point(|item| key(item) < target);
            if insertion == 0 {
                return Some(0);
            }
            if insertion == items.len() {
                return Some(last);
            }
            let before = target - key(&items[insertion - 1]);
            let after = key(&items[insertion]) - target;
            if after < before {
                Some(insertion)
            } else {
                Some(insertion - 1)
            }
        }
    }
}

/// Whether `candidate` lies within `threshold_px` of `target` on screen.
#[must_use]
pub fn within_pixel_threshold(
    target: f64,
    candidate: f64,
    scale: LinearScale,
    threshold_px: f64,
) -> bool {
    (scale.map(target) - scale.map(candidate)).abs() < threshold_px
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_pick_insertion_boundaries_on_duplicates() {
        let values = [1.0, 2.0, 2.0, 3.0];
        assert_eq!(closest_index(2.0, &values, Some(SearchSide::Left)), Some(1));
        assert_eq!(closest_index(2.0, &values, Some(SearchSide::Right)), Some(3));
    }

    #[test]
    fn side_boundary_past_the_end_is_clamped() {
        let values = [1.0, 2.0];
        assert_eq!(closest_index(9.0, &values, Some(SearchSide::Left)), Some(1));
    }
}
