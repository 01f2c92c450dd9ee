use std::collections::{BTreeSet, VecDeque};

use crate::ids::IdAllocator;
use crate::model::{Block, BlockKind, ItemId, ListAttributes};
use crate::postfix;

/// Result of one committed change batch.
///
/// `changed` lists every block index the batch touched, including repairs the
/// postfix pass had to make on top of the writer's own mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub changed: Vec<usize>,
    pub version: u64,
}

/// Event published by structural commands after each operation, carrying the
/// block set the command itself reassigned (not the postfixer's repairs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlocksChanged {
    pub blocks: Vec<usize>,
}

/// The flat document model this engine operates on.
///
/// Holds the block sequence, the session-wide id allocator, the version
/// counter and a drainable queue of command events. All mutation goes through
/// [`change`], which runs the postfix pass synchronously before returning, so
/// the model is always invariant-clean between batches.
///
/// [`change`]: ListModel::change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListModel {
    blocks: Vec<Block>,
    version: u64,
    ids: IdAllocator,
    events: VecDeque<BlocksChanged>,
}

impl ListModel {
    pub fn new() -> Self {
        Self::from_blocks(Vec::new())
    }

    /// Build a model from raw blocks without normalizing them. Callers that
    /// inject external content should follow up with [`normalize`].
    ///
    /// [`normalize`]: ListModel::normalize
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            version: 0,
            ids: IdAllocator::new(),
            events: VecDeque::new(),
        }
    }

    /// Same as [`from_blocks`] but with a deterministic allocator seed, for
    /// tests.
    ///
    /// [`from_blocks`]: ListModel::from_blocks
    pub fn from_blocks_seeded(blocks: Vec<Block>, seed: u64) -> Self {
        Self {
            blocks,
            version: 0,
            ids: IdAllocator::with_seed(seed),
            events: VecDeque::new(),
        }
    }

    /// Adopt blocks together with the allocator that minted their ids, so
    /// later allocations cannot collide with them.
    pub(crate) fn from_parts(blocks: Vec<Block>, ids: IdAllocator) -> Self {
        Self {
            blocks,
            version: 0,
            ids,
            events: VecDeque::new(),
        }
    }

    /// Parse UTF-8 Markdown bytes into a normalized model.
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::from_markdown(text))
    }

    /// Upcast Markdown source into a normalized model.
    pub fn from_markdown(source: &str) -> Self {
        let mut model = crate::upcast::parse_markdown(source);
        model.normalize();
        model
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Apply one change batch. The closure mutates the model through the
    /// writer; when it returns, the postfix pass repairs any invariant
    /// violations and the version is bumped. One batch = one undo step on the
    /// host side.
    pub fn change(&mut self, batch: impl FnOnce(&mut Writer<'_>)) -> Patch {
        let mut changed = BTreeSet::new();
        {
            let mut writer = Writer {
                blocks: &mut self.blocks,
                ids: &mut self.ids,
                changed: &mut changed,
            };
            batch(&mut writer);
        }

        let fixed = postfix::run(&mut self.blocks, &mut self.ids, &changed);
        changed.extend(fixed);

        self.version += 1;
        Patch {
            changed: changed.into_iter().collect(),
            version: self.version,
        }
    }

    /// Run the postfix pass over the whole document, as if every block had
    /// just changed. Returns the indices that needed repair; running it again
    /// immediately returns an empty list (idempotence).
    pub fn normalize(&mut self) -> Vec<usize> {
        let all: BTreeSet<usize> = (0..self.blocks.len()).collect();
        let fixed = postfix::run(&mut self.blocks, &mut self.ids, &all);
        if !fixed.is_empty() {
            self.version += 1;
        }
        fixed.into_iter().collect()
    }

    /// Queue a changed-blocks event for downstream listeners.
    pub(crate) fn emit(&mut self, event: BlocksChanged) {
        self.events.push_back(event);
    }

    /// Drain all pending command events, oldest first.
    pub fn drain_events(&mut self) -> Vec<BlocksChanged> {
        self.events.drain(..).collect()
    }
}

impl Default for ListModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer handed to a change batch: the only sanctioned mutation surface.
///
/// Every write records the touched index so the postfix pass and the
/// resulting [`Patch`] know where to look. Attribute writes that would not
/// change anything are dropped, keeping change sets minimal.
pub struct Writer<'a> {
    blocks: &'a mut Vec<Block>,
    ids: &'a mut IdAllocator,
    changed: &'a mut BTreeSet<usize>,
}

impl Writer<'_> {
    pub fn blocks(&self) -> &[Block] {
        self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Allocate a fresh item id from the model's session allocator.
    pub fn allocate_id(&mut self) -> ItemId {
        self.ids.next_id()
    }

    pub fn set_list_attributes(&mut self, index: usize, list: ListAttributes) {
        if let Some(block) = self.blocks.get_mut(index)
            && block.list.as_ref() != Some(&list)
        {
            block.list = Some(list);
            self.changed.insert(index);
        }
    }

    /// Mutate the list attributes in place; a no-op (and not recorded) when
    /// the block is not a list block or the closure changes nothing.
    pub fn update_list(&mut self, index: usize, f: impl FnOnce(&mut ListAttributes)) {
        if let Some(block) = self.blocks.get_mut(index)
            && let Some(list) = block.list.as_ref()
        {
            let mut updated = list.clone();
            f(&mut updated);
            if block.list.as_ref() != Some(&updated) {
                block.list = Some(updated);
                self.changed.insert(index);
            }
        }
    }

    pub fn clear_list_attributes(&mut self, index: usize) {
        if let Some(block) = self.blocks.get_mut(index)
            && block.list.take().is_some()
        {
            self.changed.insert(index);
        }
    }

    pub fn set_kind(&mut self, index: usize, kind: BlockKind) {
        if let Some(block) = self.blocks.get_mut(index)
            && block.kind != kind
        {
            block.kind = kind;
            self.changed.insert(index);
        }
    }

    pub fn set_text(&mut self, index: usize, text: impl Into<String>) {
        let text = text.into();
        if let Some(block) = self.blocks.get_mut(index)
            && block.text != text
        {
            block.text = text;
            self.changed.insert(index);
        }
    }

    pub fn set_attr(&mut self, index: usize, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        if let Some(block) = self.blocks.get_mut(index)
            && block.attrs.get(&key) != Some(&value)
        {
            block.attrs.insert(key, value);
            self.changed.insert(index);
        }
    }

    pub fn remove_attr(&mut self, index: usize, key: &str) {
        if let Some(block) = self.blocks.get_mut(index)
            && block.attrs.remove(key).is_some()
        {
            self.changed.insert(index);
        }
    }

    /// Insert a block at `index`, shifting later blocks (and their recorded
    /// change indices) right.
    pub fn insert_block(&mut self, index: usize, block: Block) {
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
        *self.changed = self
            .changed
            .iter()
            .map(|&i| if i >= index { i + 1 } else { i })
            .collect();
        self.changed.insert(index);
    }

    /// Remove and return the block at `index`, shifting later recorded
    /// change indices left. The neighbouring position stays marked so the
    /// postfix pass re-examines the seam.
    pub fn remove_block(&mut self, index: usize) -> Option<Block> {
        if index >= self.blocks.len() {
            return None;
        }
        let removed = self.blocks.remove(index);
        *self.changed = self
            .changed
            .iter()
            .filter_map(|&i| {
                if i == index {
                    None
                } else if i > index {
                    Some(i - 1)
                } else {
                    Some(i)
                }
            })
            .collect();
        if index < self.blocks.len() {
            self.changed.insert(index);
        } else if index > 0 {
            self.changed.insert(index - 1);
        }
        Some(removed)
    }
}
