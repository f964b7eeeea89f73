use std::collections::HashSet;

use storage::IndexQueue;

/// Indices picked for one quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Picked indices in draw order, no duplicates.
    pub indices: Vec<usize>,
    /// True when too few unused questions were left and the used set must be cleared.
    pub exhausted: bool,
}

/// The draw ran out of attempts before reaching the requested size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub requested: usize,
    pub selected: usize,
}

/// Pick `count` distinct indices from a pool of `pool_size`.
///
/// `queue` supplies the draw order and keeps whatever is left over for the next
/// call. Entries that are out of range, already used, or already picked are
/// discarded as stale. When the queue runs dry it is refilled, first from
/// unpicked candidates, then from any unpicked index. Total pops are bounded by
/// `2 * pool_size`.
///
/// `count` must already be capped to `pool_size`.
///
/// # Errors
///
/// Returns `Shortfall` if the pop bound is hit before `count` indices are found.
pub fn select_indices(
    queue: &mut IndexQueue,
    used: &HashSet<usize>,
    pool_size: usize,
    count: usize,
    allow_repeats: bool,
) -> Result<Selection, Shortfall> {
    debug_assert!(count <= pool_size);

    let mut exhausted = false;
    let mut candidates: HashSet<usize> = (0..pool_size)
        .filter(|i| allow_repeats || !used.contains(i))
        .collect();

    if !allow_repeats && candidates.len() < count {
        exhausted = true;
        candidates = (0..pool_size).collect();
        queue.reset((0..pool_size).collect());
    }

    let mut indices = Vec::with_capacity(count);
    let mut picked = HashSet::with_capacity(count);
    let max_draws = pool_size.saturating_mul(2);
    let mut draws = 0;
    let mut widened = false;

    while indices.len() < count && draws < max_draws {
        let Some(index) = queue.pop_front() else {
            let refill: Vec<usize> = (0..pool_size)
                .filter(|i| !picked.contains(i) && (widened || candidates.contains(i)))
                .collect();
            if !refill.is_empty() {
                queue.reset(refill);
            } else if widened {
                break;
            } else {
                widened = true;
            }
            continue;
        };
        draws += 1;

        if index >= pool_size || picked.contains(&index) {
            continue;
        }
        if !widened && !candidates.contains(&index) {
            continue;
        }
        picked.insert(index);
        indices.push(index);
    }

    if indices.len() < count {
        return Err(Shortfall {
            requested: count,
            selected: indices.len(),
        });
    }

    Ok(Selection { indices, exhausted })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
