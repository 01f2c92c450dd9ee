//! Sibling list walker: iteration over contiguous runs of list blocks in the
//! flat sequence.
//!
//! A "list" here is a maximal contiguous run of blocks carrying list
//! attributes. Two runs separated by even a single plain block are distinct
//! lists and are never conflated, regardless of matching kinds or ids.

use crate::model::Block;

/// Traversal direction of a [`ListWalker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Which neighbouring blocks a [`ListWalker`] yields, relative to the indent
/// of the start block.
///
/// Deeper blocks are *skipped* (iteration continues past them) unless
/// `higher_indent` is set; same-depth blocks *stop* the walk unless
/// `same_indent` is set; shallower blocks stop it unless `lower_indent` is
/// set. A non-list block always stops the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkerOptions {
    pub direction: Direction,
    pub include_self: bool,
    pub higher_indent: bool,
    pub same_indent: bool,
    pub lower_indent: bool,
    /// At the start depth, stop as soon as the item id differs from the start
    /// block's. Deeper blocks (a nested sub-list between two blocks of one
    /// item) do not end the item.
    pub same_item_only: bool,
}

impl WalkerOptions {
    /// Every block of the list, in document order.
    pub fn whole_list() -> Self {
        Self {
            direction: Direction::Forward,
            include_self: true,
            higher_indent: true,
            same_indent: true,
            lower_indent: true,
            same_item_only: false,
        }
    }

    /// Blocks belonging to the same logical item as the start block.
    pub fn same_item() -> Self {
        Self {
            direction: Direction::Forward,
            include_self: true,
            higher_indent: false,
            same_indent: true,
            lower_indent: false,
            same_item_only: true,
        }
    }

    /// Blocks nested strictly deeper than the start block's item.
    pub fn descendants() -> Self {
        Self {
            direction: Direction::Forward,
            include_self: false,
            higher_indent: true,
            same_indent: false,
            lower_indent: false,
            same_item_only: false,
        }
    }
}

/// Lazy, finite, restartable walk over the blocks of one list.
///
/// The walker borrows the block sequence immutably; calling [`iter`] again
/// restarts the traversal from the same start block.
///
/// [`iter`]: ListWalker::iter
#[derive(Debug, Clone)]
pub struct ListWalker<'a> {
    blocks: &'a [Block],
    start: usize,
    opts: WalkerOptions,
}

impl<'a> ListWalker<'a> {
    pub fn new(blocks: &'a [Block], start: usize, opts: WalkerOptions) -> Self {
        Self {
            blocks,
            start,
            opts,
        }
    }

    pub fn iter(&self) -> Walk<'a> {
        let first = if self.opts.include_self {
            Some(self.start)
        } else {
            match self.opts.direction {
                Direction::Forward => self.start.checked_add(1),
                Direction::Backward => self.start.checked_sub(1),
            }
        };
        Walk {
            blocks: self.blocks,
            opts: self.opts,
            reference_indent: self.blocks.get(self.start).and_then(Block::indent),
            reference_item: self
                .blocks
                .get(self.start)
                .and_then(|b| b.item_id().cloned()),
            next: first,
            pending_self: self.opts.include_self,
        }
    }
}

impl<'a> IntoIterator for &ListWalker<'a> {
    type Item = usize;
    type IntoIter = Walk<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One in-progress traversal produced by [`ListWalker::iter`].
pub struct Walk<'a> {
    blocks: &'a [Block],
    opts: WalkerOptions,
    reference_indent: Option<u32>,
    reference_item: Option<crate::model::ItemId>,
    next: Option<usize>,
    pending_self: bool,
}

impl Walk<'_> {
    fn step(&self, index: usize) -> Option<usize> {
        match self.opts.direction {
            Direction::Forward => index.checked_add(1),
            Direction::Backward => index.checked_sub(1),
        }
    }
}

impl Iterator for Walk<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let reference = self.reference_indent?;

        if self.pending_self {
            self.pending_self = false;
            let index = self.next?;
            self.next = self.step(index);
            if self.blocks.get(index)?.is_list_block() {
                return Some(index);
            }
            return None;
        }

        loop {
            let index = match self.next {
                Some(index) if index < self.blocks.len() => index,
                _ => return None,
            };

            let block = &self.blocks[index];
            let Some(indent) = block.indent() else {
                // Plain block: hard stop, never walk across it.
                self.next = None;
                return None;
            };

            self.next = self.step(index);

            if indent > reference {
                if self.opts.higher_indent {
                    return Some(index);
                }
                // Deeper block: part of a nested item, skip past it.
                continue;
            }
            if indent == reference {
                if !self.opts.same_indent {
                    self.next = None;
                    return None;
                }
                if self.opts.same_item_only && block.item_id() != self.reference_item.as_ref() {
                    self.next = None;
                    return None;
                }
                return Some(index);
            }
            // Shallower block.
            if self.opts.lower_indent {
                return Some(index);
            }
            self.next = None;
            return None;
        }
    }
}

/// True when `index` is in bounds and the block there carries list attributes.
pub fn is_list_block_at(blocks: &[Block], index: usize) -> bool {
    blocks.get(index).is_some_and(Block::is_list_block)
}

/// Index of the head (first block) of the list containing `index`.
///
/// Walks backward over contiguous list blocks; `index` itself must be a list
/// block for the result to be meaningful.
pub fn list_head(blocks: &[Block], index: usize) -> usize {
    let mut head = index;
    while head > 0 && is_list_block_at(blocks, head - 1) {
        head -= 1;
    }
    head
}

/// Indices of the whole list starting at `head`, in document order.
pub fn iter_list(blocks: &[Block], head: usize) -> impl Iterator<Item = usize> + '_ {
    (head..blocks.len()).take_while(|&i| is_list_block_at(blocks, i))
}

/// Indices of every block belonging to the same logical item as `index`,
/// including `index` itself and any continuation blocks that follow a nested
/// sub-list.
pub fn item_blocks(blocks: &[Block], index: usize) -> Vec<usize> {
    let mut out = Vec::new();
    // Continuation blocks may precede `index` too; rewind to the item's first
    // block before walking forward.
    let first = {
        let backward = ListWalker::new(
            blocks,
            index,
            WalkerOptions {
                direction: Direction::Backward,
                ..WalkerOptions::same_item()
            },
        );
        backward.iter().last().unwrap_or(index)
    };
    let forward = ListWalker::new(blocks, first, WalkerOptions::same_item());
    out.extend(forward.iter());
    out
}

/// Indices of every block nested strictly deeper than the item at `index`,
/// stopping at the first block at the same or a shallower depth.
pub fn descendant_blocks(blocks: &[Block], index: usize) -> Vec<usize> {
    let last_of_item = *item_blocks(blocks, index).last().unwrap_or(&index);
    ListWalker::new(blocks, last_of_item, WalkerOptions::descendants())
        .iter()
        .collect()
}
