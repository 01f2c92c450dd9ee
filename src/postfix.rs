//! Postfixer engine: silent, deterministic repair of the flat-list invariants
//! after every committed change batch.
//!
//! Postfixers never fail and never roll a change back; they converge in a
//! single forward pass over each affected list. Where a repair is ambiguous
//! (two neighbouring values could "win"), the earlier block in document order
//! wins.

use std::collections::BTreeSet;

use crate::ids::IdAllocator;
use crate::model::{Block, ItemId};
use crate::walker::{self, ListWalker, WalkerOptions, is_list_block_at, iter_list};

/// Run the full postfix pass over every list adjacent to a changed block.
///
/// `changed` holds block indices touched by the batch (already adjusted for
/// insertions/removals). Returns the indices the pass itself had to mutate.
pub(crate) fn run(
    blocks: &mut [Block],
    ids: &mut IdAllocator,
    changed: &BTreeSet<usize>,
) -> BTreeSet<usize> {
    let mut fixed = BTreeSet::new();

    // Invariant 5: blocks whose kind no longer admits list attributes lose
    // them. Former descendants get re-based by the indent fixer below, since
    // the stripped block splits the run and the trailing part re-heads.
    for &index in changed {
        if index >= blocks.len() {
            continue;
        }
        if blocks[index].is_list_block() && !blocks[index].kind.allows_list_attributes() {
            blocks[index].list = None;
            fixed.insert(index);
        }
    }

    let mut heads = BTreeSet::new();
    let mut visited = BTreeSet::new();
    for &index in changed {
        for position in [index, index.saturating_add(1)] {
            find_and_add_list_head_to_map(
                blocks,
                position.min(blocks.len()),
                &mut heads,
                &mut visited,
            );
        }
    }

    let mut seen_ids = BTreeSet::new();
    for &head in &heads {
        fixed.extend(fix_list_indents(blocks, head));
        fixed.extend(fix_list_item_ids(blocks, head, &mut seen_ids, ids));
        fixed.extend(fix_item_props(blocks, head));
    }

    fixed
}

/// Locate the head of the list adjacent to the gap `position` (between block
/// `position - 1` and block `position`) and record it in `heads`.
///
/// `visited` memoizes blocks whose head is already known, so a fix-up pass
/// over many changed positions in one large list stays O(n). A run of plain
/// blocks is a hard separator: a position flanked only by plain blocks finds
/// no list.
pub fn find_and_add_list_head_to_map(
    blocks: &[Block],
    position: usize,
    heads: &mut BTreeSet<usize>,
    visited: &mut BTreeSet<usize>,
) -> Option<usize> {
    let before = position
        .checked_sub(1)
        .filter(|&i| is_list_block_at(blocks, i));

    let Some(start) = before else {
        // Nothing before the gap; the block after it (if a list block) heads
        // its own list.
        if is_list_block_at(blocks, position) && visited.insert(position) {
            heads.insert(position);
            return Some(position);
        }
        return None;
    };

    if !visited.insert(start) {
        return None;
    }
    let mut head = start;
    while head > 0 && is_list_block_at(blocks, head - 1) {
        head -= 1;
        if !visited.insert(head) {
            // Already discovered from an earlier position; its head is in
            // `heads` already.
            return None;
        }
    }
    heads.insert(head);
    Some(head)
}

/// Repair indent depths across one list (invariants 1 and 2).
///
/// Walks forward from the head keeping the highest currently-valid indent.
/// An over-indented run is shifted down as a whole (`fix_by`), preserving the
/// relative indentation inside it, and every block is additionally clamped to
/// one deeper than its predecessor.
pub fn fix_list_indents(blocks: &mut [Block], head: usize) -> Vec<usize> {
    let mut fixed = Vec::new();
    let indices: Vec<usize> = iter_list(&*blocks, head).collect();

    let mut max_indent: i64 = 0;
    let mut prev_indent: i64 = -1;
    let mut fix_by: Option<i64> = None;

    for index in indices {
        let indent = i64::from(blocks[index].indent().unwrap_or(0));

        if indent > max_indent {
            let shifted = match fix_by {
                None => {
                    fix_by = Some(indent - max_indent);
                    max_indent
                }
                Some(current) => {
                    let current = current.min(indent);
                    fix_by = Some(current);
                    indent - current
                }
            };
            let new_indent = shifted.min(prev_indent + 1);
            if let Some(list) = blocks[index].list.as_mut()
                && i64::from(list.indent) != new_indent
            {
                list.indent = new_indent as u32;
                fixed.push(index);
            }
            prev_indent = new_indent;
        } else {
            fix_by = None;
            max_indent = indent + 1;
            prev_indent = indent;
        }
    }

    fixed
}

/// Repair item ids across one list (invariants 3 and 4).
///
/// For each run of blocks sharing an id: a previously-seen id gets replaced
/// with a fresh one across the whole run, and a `listKind` divergence inside
/// the run splits it — every block from the divergence on becomes a new item
/// on the next outer-loop turn. `seen_ids` is shared across all lists of one
/// postfix pass, so lists merged by a deletion renumber their trailing ids.
pub fn fix_list_item_ids(
    blocks: &mut [Block],
    head: usize,
    seen_ids: &mut BTreeSet<ItemId>,
    ids: &mut IdAllocator,
) -> Vec<usize> {
    let mut fixed = Vec::new();
    let mut visited: BTreeSet<usize> = BTreeSet::new();
    let indices: Vec<usize> = iter_list(&*blocks, head).collect();

    for index in indices {
        if visited.contains(&index) {
            continue;
        }
        let Some(original_id) = blocks[index].item_id().cloned() else {
            continue;
        };
        let run_kind = blocks[index].list_kind();

        let item_id = if seen_ids.contains(&original_id) {
            ids.next_id()
        } else {
            original_id.clone()
        };
        seen_ids.insert(item_id.clone());

        let run: Vec<usize> = ListWalker::new(&*blocks, index, WalkerOptions::same_item())
            .iter()
            .collect();
        for run_index in run {
            if blocks[run_index].list_kind() != run_kind {
                // Kind divergence: the rest of the run becomes a new item,
                // picked up by the outer loop.
                break;
            }
            visited.insert(run_index);
            if blocks[run_index].item_id() != Some(&item_id)
                && let Some(list) = blocks[run_index].list.as_mut()
            {
                list.item_id = item_id.clone();
                fixed.push(run_index);
            }
        }
    }

    fixed
}

/// Restore uniformity of per-item properties (first block wins; a key that is
/// not identical across the whole item is dropped from every block of it).
fn fix_item_props(blocks: &mut [Block], head: usize) -> Vec<usize> {
    let mut fixed = Vec::new();
    let mut visited: BTreeSet<usize> = BTreeSet::new();
    let indices: Vec<usize> = iter_list(&*blocks, head).collect();

    for index in indices {
        if visited.contains(&index) {
            continue;
        }
        if !blocks[index].is_list_block() {
            continue;
        }
        let item = walker::item_blocks(&*blocks, index);
        visited.extend(item.iter().copied());

        let canonical: std::collections::BTreeMap<String, String> = blocks[index]
            .list
            .as_ref()
            .map(|l| {
                l.props
                    .iter()
                    .filter(|(key, value)| {
                        item.iter().all(|&i| {
                            blocks[i]
                                .list
                                .as_ref()
                                .is_some_and(|other| other.props.get(*key) == Some(*value))
                        })
                    })
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();

        for &i in &item {
            if let Some(list) = blocks[i].list.as_mut()
                && list.props != canonical
            {
                list.props = canonical.clone();
                fixed.push(i);
            }
        }
    }

    fixed
}
