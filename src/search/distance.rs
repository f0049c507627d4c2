//! Term proximity scoring

use crate::storage::LocationCombination;
use std::collections::BTreeMap;

/// Sum of gaps between consecutive query-term positions
///
/// # Example
///
/// ```
/// use sumi_seek::search::location_distance;
///
/// assert_eq!(location_distance(&[5, 9]), 4);
/// assert_eq!(location_distance(&[10, 2, 4]), 10);
/// ```
pub fn location_distance(positions: &[i64]) -> i64 {
    positions.windows(2).map(|pair| (pair[1] - pair[0]).abs()).sum()
}

/// Smallest distance per url over all of its combinations
pub fn min_distances(combinations: &[LocationCombination]) -> BTreeMap<i64, i64> {
    let mut minimums: BTreeMap<i64, i64> = BTreeMap::new();
    for combination in combinations {
        let distance = location_distance(&combination.positions);
        minimums
            .entry(combination.url_id)
            .and_modify(|min| *min = (*min).min(distance))
            .or_insert(distance);
    }
    minimums
}

/// Normalizes per-url distances so the closest page scores 1.0
///
/// Distinct query words never share a position, so every distance is at
/// least 1.
pub fn distance_scores(minimums: &BTreeMap<i64, i64>) -> BTreeMap<i64, f64> {
    let Some(&best) = minimums.values().min() else {
        return BTreeMap::new();
    };
    let best = best.max(1) as f64;

    minimums
        .iter()
        .map(|(&url_id, &distance)| (url_id, best / distance.max(1) as f64))
        .collect()
}
