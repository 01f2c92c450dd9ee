//! Nested view projection of the flat model.
//!
//! The flat annotated sequence is grouped into a real tree: consecutive
//! blocks sharing an item id become one item node, consecutive items become
//! list nodes nested per indent, everything else hangs directly off the root.
//! The tree is an arena of nodes addressed by index; node 0 is always the
//! root.
//!
//! A single-block paragraph item with no extra attributes renders through a
//! transparent "bogus" wrapper (its text goes straight into the `<li>`); any
//! extra attribute, a non-paragraph kind or a multi-block item forces an
//! explicit element.

mod html;
mod mapping;

pub use html::render_html;
pub use mapping::{model_to_view, view_to_model, MappingError, ViewPosition};

use std::collections::BTreeMap;

use crate::model::{Block, BlockKind, ItemId, ListKind, ListModel};
use crate::walker;

/// Index of the root node in every [`ViewTree`] arena.
pub const ROOT: usize = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewNodeKind {
    Root,
    /// A `<ul>`/`<ol>` container.
    List { kind: ListKind },
    /// One `<li>`.
    Item { id: ItemId },
    /// The rendering of one model block.
    Content { block: usize, bogus: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewNode {
    pub kind: ViewNodeKind,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// First model block rendered inside this subtree.
    pub first_block: Option<usize>,
    /// Last model block rendered inside this subtree.
    pub last_block: Option<usize>,
}

/// Per-block shape fingerprint; when it is unchanged for every changed block,
/// a model edit was content-only and the tree can be kept as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Signature {
    kind: BlockKind,
    has_attrs: bool,
    list: Option<(u32, ItemId, ListKind)>,
    bogus: bool,
}

/// Arena tree projected from one model snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTree {
    nodes: Vec<ViewNode>,
    content_of: BTreeMap<usize, usize>,
    signatures: Vec<Signature>,
}

impl ViewTree {
    /// Project the whole model into a fresh tree.
    pub fn build(model: &ListModel) -> Self {
        let blocks = model.blocks();
        let mut tree = Self {
            nodes: vec![ViewNode {
                kind: ViewNodeKind::Root,
                parent: None,
                children: Vec::new(),
                first_block: None,
                last_block: None,
            }],
            content_of: BTreeMap::new(),
            signatures: blocks.iter().enumerate().map(|(i, b)| signature(blocks, i, b)).collect(),
        };

        // Stack of currently open (list node, current item node) per depth.
        let mut open: Vec<(usize, usize)> = Vec::new();

        for (index, block) in blocks.iter().enumerate() {
            let Some(list) = block.list.as_ref() else {
                open.clear();
                let node = tree.push(ViewNodeKind::Content { block: index, bogus: false }, ROOT);
                tree.content_of.insert(index, node);
                tree.track(node, index);
                continue;
            };

            let depth = list.indent as usize;
            open.truncate(depth + 1);

            // A kind change at the current depth closes the container.
            if let Some(&(list_node, _)) = open.get(depth)
                && tree.nodes[list_node].kind != (ViewNodeKind::List { kind: list.kind })
            {
                open.truncate(depth);
            }

            while open.len() <= depth {
                // Nested lists live inside the deepest open item; top-level
                // lists (and lists after an indent repair) hang off the root.
                let parent = open.last().map_or(ROOT, |&(_, item)| item);
                let list_node = tree.push(ViewNodeKind::List { kind: list.kind }, parent);
                let item_node = tree.push(
                    ViewNodeKind::Item { id: list.item_id.clone() },
                    list_node,
                );
                open.push((list_node, item_node));
            }

            let (list_node, item_node) = open[depth];
            let item_node = if tree.nodes[item_node].children.is_empty() {
                // Freshly opened item, not yet bound to an id from content.
                tree.nodes[item_node].kind = ViewNodeKind::Item { id: list.item_id.clone() };
                item_node
            } else if tree.nodes[item_node].kind
                == (ViewNodeKind::Item { id: list.item_id.clone() })
            {
                item_node
            } else {
                let fresh = tree.push(
                    ViewNodeKind::Item { id: list.item_id.clone() },
                    list_node,
                );
                open[depth] = (list_node, fresh);
                fresh
            };

            let bogus = tree.signatures[index].bogus;
            let node = tree.push(ViewNodeKind::Content { block: index, bogus }, item_node);
            tree.content_of.insert(index, node);
            tree.track(node, index);
        }

        tree
    }

    /// Bring the tree up to date after a change batch. Content-only edits
    /// (text changes) keep the arena untouched; any structural change
    /// reprojects.
    ///
    /// Every block's signature is compared, not only the batch's own changed
    /// set: a removal plus an insertion can keep the length equal while
    /// silently shifting the blocks in between to new indices.
    pub fn refresh(&mut self, model: &ListModel) {
        let blocks = model.blocks();
        let unchanged = blocks.len() == self.signatures.len()
            && blocks
                .iter()
                .enumerate()
                .all(|(i, b)| self.signatures[i] == signature(blocks, i, b));
        if !unchanged {
            *self = Self::build(model);
        }
    }

    pub fn node(&self, index: usize) -> Option<&ViewNode> {
        self.nodes.get(index)
    }

    pub fn root(&self) -> &ViewNode {
        &self.nodes[ROOT]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Arena index of the content node rendering `block`.
    pub fn content_node(&self, block: usize) -> Option<usize> {
        self.content_of.get(&block).copied()
    }

    fn push(&mut self, kind: ViewNodeKind, parent: usize) -> usize {
        let index = self.nodes.len();
        self.nodes.push(ViewNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            first_block: None,
            last_block: None,
        });
        self.nodes[parent].children.push(index);
        index
    }

    /// Record that `block` renders inside `node`, updating block spans up the
    /// ancestor chain.
    fn track(&mut self, node: usize, block: usize) {
        let mut current = Some(node);
        while let Some(index) = current {
            let entry = &mut self.nodes[index];
            if entry.first_block.is_none() {
                entry.first_block = Some(block);
            }
            entry.last_block = Some(block);
            current = entry.parent;
        }
    }
}

fn signature(blocks: &[Block], index: usize, block: &Block) -> Signature {
    let list = block
        .list
        .as_ref()
        .map(|l| (l.indent, l.item_id.clone(), l.kind));
    Signature {
        kind: block.kind,
        has_attrs: !block.attrs.is_empty(),
        list,
        bogus: is_bogus(blocks, index, block),
    }
}

/// A block renders through the transparent wrapper only when it is a bare
/// paragraph and the sole block of its item.
fn is_bogus(blocks: &[Block], index: usize, block: &Block) -> bool {
    block.kind == BlockKind::Paragraph
        && block.attrs.is_empty()
        && block.is_list_block()
        && walker::item_blocks(blocks, index).len() == 1
}
