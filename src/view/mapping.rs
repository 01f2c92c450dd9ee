//! Bidirectional position mapping between the flat model and the projected
//! tree.
//!
//! The tree contains synthetic containers (lists, items, bogus wrappers)
//! with no model counterpart; mapping skips over them so that a caller can
//! translate any valid model position into a view position and back without
//! loss.

use thiserror::Error;

use crate::model::{ModelPosition, Position};
use crate::view::{ViewNodeKind, ViewTree, ROOT};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("block {0} is not rendered in the view tree")]
    UnknownBlock(usize),
    #[error("gap {0} is outside the document")]
    GapOutOfRange(usize),
    #[error("view node {0} does not exist")]
    UnknownNode(usize),
    #[error("offset {offset} is not a valid child index of node {node}")]
    OffsetOutOfRange { node: usize, offset: usize },
}

/// A position in the projected tree.
///
/// When `node` is a content node, `offset` addresses the block's text; for
/// container nodes it is a child index (a boundary between children).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewPosition {
    pub node: usize,
    pub offset: usize,
}

/// Map a model position into the tree.
///
/// Text positions land inside the block's content node. A gap before block
/// `B` maps to the boundary before the outermost container whose subtree
/// starts with `B`; the document-end gap maps after the outermost container
/// whose subtree ends with the last block.
pub fn model_to_view(tree: &ViewTree, position: ModelPosition) -> Result<ViewPosition, MappingError> {
    match position {
        ModelPosition::InBlock(Position { block, offset }) => {
            let node = tree
                .content_node(block)
                .ok_or(MappingError::UnknownBlock(block))?;
            Ok(ViewPosition { node, offset })
        }
        ModelPosition::Gap(gap) => {
            let block_count = tree
                .root()
                .last_block
                .map(|last| last + 1)
                .unwrap_or(0);
            if gap > block_count {
                return Err(MappingError::GapOutOfRange(gap));
            }
            if gap == 0 && block_count == 0 {
                return Ok(ViewPosition { node: ROOT, offset: 0 });
            }
            if gap < block_count {
                before_block(tree, gap)
            } else {
                after_block(tree, block_count - 1)
            }
        }
    }
}

/// Map a view position back into the model. Exact inverse of
/// [`model_to_view`] for every position that function can produce.
pub fn view_to_model(tree: &ViewTree, position: ViewPosition) -> Result<ModelPosition, MappingError> {
    let node = tree
        .node(position.node)
        .ok_or(MappingError::UnknownNode(position.node))?;

    if let ViewNodeKind::Content { block, .. } = node.kind {
        return Ok(ModelPosition::in_block(block, position.offset));
    }

    if position.offset < node.children.len() {
        let child = node.children[position.offset];
        let first = tree
            .node(child)
            .and_then(|n| n.first_block)
            .ok_or(MappingError::UnknownNode(child))?;
        return Ok(ModelPosition::Gap(first));
    }
    if position.offset == node.children.len() {
        // Boundary after the last child (or inside an empty root).
        let last = match node.last_block {
            Some(last) => last + 1,
            None => 0,
        };
        return Ok(ModelPosition::Gap(last));
    }
    Err(MappingError::OffsetOutOfRange {
        node: position.node,
        offset: position.offset,
    })
}

/// Boundary before the outermost ancestor whose subtree starts at `block`.
fn before_block(tree: &ViewTree, block: usize) -> Result<ViewPosition, MappingError> {
    let mut node = tree
        .content_node(block)
        .ok_or(MappingError::UnknownBlock(block))?;
    loop {
        let parent = tree
            .node(node)
            .and_then(|n| n.parent)
            .ok_or(MappingError::UnknownBlock(block))?;
        let parent_node = tree.node(parent).ok_or(MappingError::UnknownNode(parent))?;
        if parent != ROOT && parent_node.first_block == Some(block) {
            node = parent;
            continue;
        }
        let index = parent_node
            .children
            .iter()
            .position(|&c| c == node)
            .ok_or(MappingError::UnknownNode(node))?;
        return Ok(ViewPosition { node: parent, offset: index });
    }
}

/// Boundary after the outermost ancestor whose subtree ends at `block`.
fn after_block(tree: &ViewTree, block: usize) -> Result<ViewPosition, MappingError> {
    let mut node = tree
        .content_node(block)
        .ok_or(MappingError::UnknownBlock(block))?;
    loop {
        let parent = tree
            .node(node)
            .and_then(|n| n.parent)
            .ok_or(MappingError::UnknownBlock(block))?;
        let parent_node = tree.node(parent).ok_or(MappingError::UnknownNode(parent))?;
        if parent != ROOT && parent_node.last_block == Some(block) {
            node = parent;
            continue;
        }
        let index = parent_node
            .children
            .iter()
            .position(|&c| c == node)
            .ok_or(MappingError::UnknownNode(node))?;
        return Ok(ViewPosition { node: parent, offset: index + 1 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, ListKind, ListModel};
    use crate::view::ViewTree;
    use pretty_assertions::assert_eq;

    fn bulleted(text: &str, indent: u32, id: &str) -> Block {
        Block::item(text, indent, id, ListKind::Bulleted)
    }

    fn round_trips(tree: &ViewTree, position: ModelPosition) {
        let view = model_to_view(tree, position).unwrap();
        assert_eq!(
            view_to_model(tree, view).unwrap(),
            position,
            "round trip through {view:?}"
        );
    }

    // ============ text positions ============

    #[test]
    fn test_text_position_maps_into_content_node() {
        let model = ListModel::from_blocks(vec![bulleted("hello", 0, "a")]);
        let tree = ViewTree::build(&model);

        let view = model_to_view(&tree, ModelPosition::in_block(0, 3)).unwrap();
        assert_eq!(view.node, tree.content_node(0).unwrap());
        assert_eq!(view.offset, 3);
        round_trips(&tree, ModelPosition::in_block(0, 3));
    }

    // ============ gap positions ============

    #[test]
    fn test_gap_between_sibling_items_lands_between_their_elements() {
        let model = ListModel::from_blocks(vec![
            bulleted("one", 0, "a"),
            bulleted("two", 0, "b"),
        ]);
        let tree = ViewTree::build(&model);

        // The boundary between the two items is inside the shared list node,
        // before the second item element.
        let view = model_to_view(&tree, ModelPosition::Gap(1)).unwrap();
        assert!(matches!(
            tree.node(view.node).unwrap().kind,
            ViewNodeKind::List { .. }
        ));
        assert_eq!(view.offset, 1);
    }

    #[test]
    fn test_document_start_gap_lands_before_the_list() {
        let model = ListModel::from_blocks(vec![bulleted("one", 0, "a")]);
        let tree = ViewTree::build(&model);

        let view = model_to_view(&tree, ModelPosition::Gap(0)).unwrap();
        assert_eq!(view, ViewPosition { node: ROOT, offset: 0 });
    }

    #[test]
    fn test_document_end_gap_lands_after_the_list() {
        let model = ListModel::from_blocks(vec![bulleted("one", 0, "a")]);
        let tree = ViewTree::build(&model);

        let view = model_to_view(&tree, ModelPosition::Gap(1)).unwrap();
        assert_eq!(view, ViewPosition { node: ROOT, offset: 1 });
    }

    #[test]
    fn test_gap_after_nested_sublist_maps_past_the_inner_container() {
        // child ends a nested sub-list; the gap before the next top-level
        // item sits between the two outer item elements.
        let model = ListModel::from_blocks(vec![
            bulleted("parent", 0, "a"),
            bulleted("child", 1, "b"),
            bulleted("next", 0, "c"),
        ]);
        let tree = ViewTree::build(&model);

        let view = model_to_view(&tree, ModelPosition::Gap(2)).unwrap();
        let parent = tree.node(view.node).unwrap();
        assert!(matches!(parent.kind, ViewNodeKind::List { .. }));
        assert_eq!(parent.parent, Some(ROOT));
        assert_eq!(view.offset, 1);
    }

    // ============ round trips ============

    #[test]
    fn test_every_position_round_trips() {
        let model = ListModel::from_blocks(vec![
            Block::paragraph("intro"),
            bulleted("a1", 0, "a"),
            bulleted("child", 1, "b"),
            bulleted("grandchild", 2, "c"),
            bulleted("a2", 0, "a"),
            Block::item("numbered", 0, "d", ListKind::Numbered),
            Block::paragraph("outro"),
        ]);
        let tree = ViewTree::build(&model);

        for gap in 0..=model.len() {
            round_trips(&tree, ModelPosition::Gap(gap));
        }
        for block in 0..model.len() {
            round_trips(&tree, ModelPosition::in_block(block, 0));
            round_trips(&tree, ModelPosition::in_block(block, 2));
        }
    }

    #[test]
    fn test_empty_document_maps_to_root() {
        let model = ListModel::new();
        let tree = ViewTree::build(&model);

        let view = model_to_view(&tree, ModelPosition::Gap(0)).unwrap();
        assert_eq!(view, ViewPosition { node: ROOT, offset: 0 });
        assert_eq!(view_to_model(&tree, view).unwrap(), ModelPosition::Gap(0));
    }

    // ============ errors ============

    #[test]
    fn test_out_of_range_positions_are_rejected() {
        let model = ListModel::from_blocks(vec![bulleted("one", 0, "a")]);
        let tree = ViewTree::build(&model);

        assert_eq!(
            model_to_view(&tree, ModelPosition::Gap(5)),
            Err(MappingError::GapOutOfRange(5))
        );
        assert_eq!(
            model_to_view(&tree, ModelPosition::in_block(9, 0)),
            Err(MappingError::UnknownBlock(9))
        );
        assert_eq!(
            view_to_model(&tree, ViewPosition { node: 99, offset: 0 }),
            Err(MappingError::UnknownNode(99))
        );
    }
}
