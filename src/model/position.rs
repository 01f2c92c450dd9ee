use serde::{Deserialize, Serialize};

/// A caret position inside a block's inline content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Index of the block in the flat sequence.
    pub block: usize,
    /// Byte offset into the block's text.
    pub offset: usize,
}

impl Position {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Any addressable position in the flat model: either inside a block's text
/// or in a gap between two blocks (or at a document boundary).
///
/// Gap `i` sits between block `i - 1` and block `i`; gap `0` is the document
/// start, gap `len` the document end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelPosition {
    InBlock(Position),
    Gap(usize),
}

impl ModelPosition {
    pub fn in_block(block: usize, offset: usize) -> Self {
        Self::InBlock(Position::new(block, offset))
    }
}

/// The current selection, expressed over the flat block sequence.
///
/// Commands evaluate their enabled state and compute their changed-block sets
/// from a selection snapshot; they never mutate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// Collapsed caret at one position.
    pub fn caret(block: usize, offset: usize) -> Self {
        let position = Position::new(block, offset);
        Self::new(position, position)
    }

    /// Selection covering whole blocks `start..=end`.
    pub fn blocks(start: usize, end: usize) -> Self {
        Self::new(Position::new(start, 0), Position::new(end, usize::MAX))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn first_block(&self) -> usize {
        self.anchor.block.min(self.focus.block)
    }

    pub fn last_block(&self) -> usize {
        self.anchor.block.max(self.focus.block)
    }

    /// Inclusive range of block indices the selection touches.
    pub fn covered_blocks(&self) -> std::ops::RangeInclusive<usize> {
        self.first_block()..=self.last_block()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_is_collapsed() {
        let sel = Selection::caret(3, 7);
        assert!(sel.is_collapsed());
        assert_eq!(sel.first_block(), 3);
        assert_eq!(sel.last_block(), 3);
    }

    #[test]
    fn test_covered_blocks_is_direction_agnostic() {
        let forward = Selection::new(Position::new(1, 0), Position::new(4, 2));
        let backward = Selection::new(Position::new(4, 2), Position::new(1, 0));
        assert_eq!(forward.covered_blocks(), 1..=4);
        assert_eq!(backward.covered_blocks(), 1..=4);
    }
}
