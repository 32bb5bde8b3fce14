//! Display-order arithmetic shared by the repositories.

use uuid::Uuid;

use crate::models::ordering::MoveDirection;

/// Order for an item appended after `existing`; `1` when empty.
pub fn next_order<I>(existing: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    existing.into_iter().max().map_or(1, |max| max + 1)
}

/// Nearest neighbour of `current` in `direction`, by strict comparison.
///
/// `Up` picks the highest order below `current`, `Down` the lowest above it.
/// Items sharing `current`'s order are never neighbours.
pub fn find_adjacent<T, F>(items: &[T], order_of: F, current: i32, direction: MoveDirection) -> Option<&T>
where
    F: Fn(&T) -> i32,
{
    match direction {
        MoveDirection::Up => items
            .iter()
            .filter(|i| order_of(i) < current)
            .max_by_key(|i| order_of(i)),
        MoveDirection::Down => items
            .iter()
            .filter(|i| order_of(i) > current)
            .min_by_key(|i| order_of(i)),
    }
}

/// `(id, position + 1)` for each id in sequence.
pub fn reindex_positions(ids: &[Uuid]) -> Vec<(Uuid, i32)> {
    ids.iter()
        .enumerate()
        .map(|(pos, id)| (*id, pos as i32 + 1))
        .collect()
}

/// Returns the first id that appears twice.
pub fn first_duplicate(ids: &[Uuid]) -> Option<Uuid> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().find(|id| !seen.insert(*id))
}
