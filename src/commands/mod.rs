//! Structural list commands: toggle, indent/outdent, split.
//!
//! Commands follow one contract: a pure `state` predicate computed against
//! the current model and selection, and an `execute` that applies the minimal
//! attribute writes as one change batch. Executing a disabled command is a
//! no-op returning `None`, not an error. After a successful batch the command
//! queues a [`BlocksChanged`] event carrying the blocks it reassigned itself
//! (postfix repairs land in the returned [`Patch`] instead).
//!
//! [`BlocksChanged`]: crate::model::BlocksChanged
//! [`Patch`]: crate::model::Patch

mod indent;
mod split;
mod toggle;

pub use indent::{IndentCommand, IndentDirection};
pub use split::{SplitItemCommand, SplitMode};
pub use toggle::{ToggleListCommand, ToggleListState};

use std::collections::BTreeSet;

use crate::model::{Block, Selection};
use crate::walker;

/// First-block indices of every distinct list item the selection touches, in
/// document order.
fn selected_item_heads(blocks: &[Block], selection: &Selection) -> Vec<usize> {
    let mut seen = BTreeSet::new();
    let mut heads = Vec::new();
    for index in selection.covered_blocks() {
        if !walker::is_list_block_at(blocks, index) {
            continue;
        }
        let first = walker::item_blocks(blocks, index)
            .first()
            .copied()
            .unwrap_or(index);
        if seen.insert(first) {
            heads.push(first);
        }
    }
    heads
}

/// What sits before a block when scanning backward at a given depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Preceding {
    /// A list block at exactly `depth`.
    Sibling(usize),
    /// A list block shallower than `depth`; the would-be parent.
    Parent(usize),
    /// Document boundary or a plain block.
    None,
}

/// Scan backward from `start` (exclusive), skipping blocks deeper than
/// `depth`, and report the first block at or above it.
fn preceding_at_depth(blocks: &[Block], start: usize, depth: u32) -> Preceding {
    let mut index = start;
    while index > 0 {
        index -= 1;
        let Some(indent) = blocks[index].indent() else {
            return Preceding::None;
        };
        if indent > depth {
            continue;
        }
        if indent == depth {
            return Preceding::Sibling(index);
        }
        return Preceding::Parent(index);
    }
    Preceding::None
}
