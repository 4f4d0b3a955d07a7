// board-collab-service/src/utils/ordering.rs
//
// Dense ordering helpers shared by the server reconciler and the client
// optimistic board. Lists are the source of truth; an item's position is its
// index, so renumbering after a relocation is always 0..n-1.

use std::collections::HashSet;
use std::hash::Hash;

// Clamp a requested index into [0, len]; stale client indices land at an end
pub fn clamp_position(requested: i64, len: usize) -> usize {
    if requested <= 0 {
        0
    } else {
        (requested as u64).min(len as u64) as usize
    }
}

// Insert at a clamped index, returning where the item landed
pub fn insert_clamped<T>(list: &mut Vec<T>, item: T, requested: i64) -> usize {
    let index = clamp_position(requested, list.len());
    list.insert(index, item);
    index
}

// Same-column reorder: removal and insertion act on the same shortened list
pub fn relocate_within<T>(list: &mut Vec<T>, from: usize, requested: i64) -> Option<usize> {
    if from >= list.len() {
        return None;
    }
    let item = list.remove(from);
    Some(insert_clamped(list, item, requested))
}

// Cross-column move: target length is measured before insertion
pub fn relocate_between<T>(
    source: &mut Vec<T>,
    from: usize,
    target: &mut Vec<T>,
    requested: i64,
) -> Option<usize> {
    if from >= source.len() {
        return None;
    }
    let item = source.remove(from);
    Some(insert_clamped(target, item, requested))
}

// sorted(positions) == [0, 1, ..., n-1]
pub fn is_dense<I>(positions: I) -> bool
where
    I: IntoIterator<Item = usize>,
{
    let mut sorted: Vec<usize> = positions.into_iter().collect();
    sorted.sort_unstable();
    sorted.iter().enumerate().all(|(index, position)| index == *position)
}

pub fn has_duplicates<T: Eq + Hash>(items: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(items.len());
    !items.iter().all(|item| seen.insert(item))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn clamping_absorbs_out_of_range_requests() {
        assert_eq!(clamp_position(-4, 3), 0);
        assert_eq!(clamp_position(2, 3), 2);
        assert_eq!(clamp_position(3, 3), 3);
        assert_eq!(clamp_position(10_000, 3), 3);
        assert_eq!(clamp_position(i64::MAX, 0), 0);
    }

    #[test]
    fn move_to_front_within_column() {
        let mut column = letters(&["A", "B", "C"]);
        assert_eq!(relocate_within(&mut column, 1, 0), Some(0));
        assert_eq!(column, letters(&["B", "A", "C"]));
    }

    #[test]
    fn move_down_within_column_uses_shortened_list() {
        let mut column = letters(&["A", "B", "C", "D"]);
        // A out, then index 2 of [B, C, D]
        assert_eq!(relocate_within(&mut column, 0, 2), Some(2));
        assert_eq!(column, letters(&["B", "C", "A", "D"]));
    }

    #[test]
    fn huge_target_equals_end_of_list() {
        let mut far = letters(&["A", "B", "C"]);
        let mut end = far.clone();
        relocate_within(&mut far, 0, 10_000);
        relocate_within(&mut end, 0, 2);
        assert_eq!(far, end);
        assert_eq!(far, letters(&["B", "C", "A"]));
    }

    #[test]
    fn cross_column_move_appends_when_clamped() {
        let mut source = letters(&["A", "B"]);
        let mut target = letters(&["X", "Y", "Z"]);
        assert_eq!(relocate_between(&mut source, 0, &mut target, 3), Some(3));
        assert_eq!(source, letters(&["B"]));
        assert_eq!(target, letters(&["X", "Y", "Z", "A"]));

        let mut again = letters(&["X"]);
        assert_eq!(relocate_between(&mut source, 0, &mut again, 10_000), Some(1));
    }

    #[test]
    fn missing_source_index_is_rejected() {
        let mut column = letters(&["A"]);
        assert_eq!(relocate_within(&mut column, 3, 0), None);
        assert_eq!(column, letters(&["A"]));
    }

    #[test]
    fn density_check() {
        assert!(is_dense(vec![]));
        assert!(is_dense(vec![2, 0, 1]));
        assert!(!is_dense(vec![0, 2]));
        assert!(!is_dense(vec![0, 1, 1]));
        assert!(has_duplicates(&["a", "b", "a"]));
        assert!(!has_duplicates(&["a", "b"]));
    }
}
