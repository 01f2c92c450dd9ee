use crate::commands::selected_item_heads;
use crate::model::{
    Block, BlocksChanged, ListAttributes, ListKind, ListModel, Patch, Selection,
};
use crate::walker;

/// Observable state of a [`ToggleListCommand`] for a given selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleListState {
    /// Whether invoking the command would do anything at all.
    pub is_enabled: bool,
    /// True iff the first selected block is already part of a list of the
    /// command's kind; executing then turns the list *off*.
    pub value: bool,
}

/// Turns the selected blocks into list items of one kind, or strips list
/// formatting when they already are.
///
/// Turning on retypes whole items (an item's blocks never end up with mixed
/// kinds) and leaves unselected nested children alone. Turning off strips the
/// closest item around a collapsed caret, or every selected item for a range
/// selection, re-rooting any nested children it leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleListCommand {
    pub kind: ListKind,
}

impl ToggleListCommand {
    pub fn new(kind: ListKind) -> Self {
        Self { kind }
    }

    pub fn state(&self, model: &ListModel, selection: &Selection) -> ToggleListState {
        let blocks = model.blocks();
        let value = blocks
            .get(selection.first_block())
            .and_then(Block::list_kind)
            == Some(self.kind);
        let is_enabled = selection
            .covered_blocks()
            .any(|i| blocks.get(i).is_some_and(|b| b.kind.allows_list_attributes()));
        ToggleListState { is_enabled, value }
    }

    pub fn execute(&self, model: &mut ListModel, selection: &Selection) -> Option<Patch> {
        let state = self.state(model, selection);
        if !state.is_enabled {
            return None;
        }
        let patch = if state.value {
            self.turn_off(model, selection)
        } else {
            self.turn_on(model, selection)
        };
        Some(patch)
    }

    fn turn_on(&self, model: &mut ListModel, selection: &Selection) -> Patch {
        let kind = self.kind;

        // Plan against the pre-change snapshot; indices stay stable because
        // the batch only writes attributes.
        let mut retype = Vec::new();
        let mut convert = Vec::new();
        {
            let blocks = model.blocks();
            for head in selected_item_heads(blocks, selection) {
                if blocks[head].list_kind() != Some(kind) {
                    retype.extend(walker::item_blocks(blocks, head));
                }
            }
            for index in selection.covered_blocks() {
                if let Some(block) = blocks.get(index)
                    && !block.is_list_block()
                    && block.kind.allows_list_attributes()
                {
                    convert.push(index);
                }
            }
        }

        let mut command_changed = Vec::new();
        let patch = model.change(|writer| {
            for &index in &retype {
                writer.update_list(index, |list| list.kind = kind);
                command_changed.push(index);
            }
            for &index in &convert {
                let id = writer.allocate_id();
                writer.set_list_attributes(index, ListAttributes::new(0, id, kind));
                command_changed.push(index);
            }
        });
        command_changed.sort_unstable();
        model.emit(BlocksChanged {
            blocks: command_changed,
        });
        patch
    }

    fn turn_off(&self, model: &mut ListModel, selection: &Selection) -> Patch {
        // Collapsed caret: strip only the item under the cursor. Range: strip
        // every selected item.
        let mut strip = Vec::new();
        let mut reroot: Vec<(usize, u32)> = Vec::new();
        {
            let blocks = model.blocks();
            let heads = if selection.is_collapsed() {
                selected_item_heads(blocks, selection).into_iter().take(1).collect()
            } else {
                selected_item_heads(blocks, selection)
            };
            let stripped: std::collections::BTreeSet<usize> = heads
                .iter()
                .flat_map(|&head| walker::item_blocks(blocks, head))
                .collect();
            strip.extend(stripped.iter().copied());
            for &head in &heads {
                let Some(depth) = blocks[head].indent() else {
                    continue;
                };
                for index in walker::descendant_blocks(blocks, head) {
                    if stripped.contains(&index) {
                        continue;
                    }
                    reroot.push((index, depth + 1));
                }
            }
        }

        let mut command_changed = Vec::new();
        let patch = model.change(|writer| {
            for &index in &strip {
                writer.clear_list_attributes(index);
                command_changed.push(index);
            }
            // Former children become top-level items of their own list.
            for &(index, shift) in &reroot {
                writer.update_list(index, |list| {
                    list.indent = list.indent.saturating_sub(shift);
                });
                command_changed.push(index);
            }
        });
        command_changed.sort_unstable();
        command_changed.dedup();
        model.emit(BlocksChanged {
            blocks: command_changed,
        });
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKind, ItemId};
    use pretty_assertions::assert_eq;

    fn bulleted(text: &str, indent: u32, id: &str) -> Block {
        Block::item(text, indent, id, ListKind::Bulleted)
    }

    // ============ state ============

    #[test]
    fn test_value_reflects_first_selected_block() {
        let model = ListModel::from_blocks(vec![
            bulleted("a", 0, "a"),
            Block::paragraph("plain"),
        ]);
        let command = ToggleListCommand::new(ListKind::Bulleted);

        assert!(command.state(&model, &Selection::caret(0, 0)).value);
        assert!(!command.state(&model, &Selection::caret(1, 0)).value);
        assert!(
            !ToggleListCommand::new(ListKind::Numbered)
                .state(&model, &Selection::caret(0, 0))
                .value
        );
    }

    #[test]
    fn test_disabled_when_no_selected_block_is_eligible() {
        let model = ListModel::from_blocks(vec![Block::new(BlockKind::Divider, "")]);
        let command = ToggleListCommand::new(ListKind::Bulleted);

        let state = command.state(&model, &Selection::caret(0, 0));
        assert!(!state.is_enabled);
        assert_eq!(command.execute(
            &mut model.clone(),
            &Selection::caret(0, 0),
        ), None);
    }

    // ============ turning on ============

    #[test]
    fn test_turn_on_converts_paragraphs_with_fresh_ids() {
        let mut model = ListModel::from_blocks(vec![
            Block::paragraph("one"),
            Block::paragraph("two"),
        ]);
        let command = ToggleListCommand::new(ListKind::Numbered);

        let patch = command
            .execute(&mut model, &Selection::blocks(0, 1))
            .unwrap();

        assert_eq!(patch.changed, vec![0, 1]);
        assert_eq!(model.block(0).and_then(Block::list_kind), Some(ListKind::Numbered));
        assert_eq!(model.block(0).and_then(Block::indent), Some(0));
        assert_eq!(model.block(0).and_then(Block::item_id), Some(&ItemId::from("a00")));
        assert_eq!(model.block(1).and_then(Block::item_id), Some(&ItemId::from("a01")));
    }

    #[test]
    fn test_turn_on_retypes_whole_item_not_nested_children() {
        let mut model = ListModel::from_blocks(vec![
            bulleted("parent 1", 0, "a"),
            bulleted("parent 2", 0, "a"),
            bulleted("child", 1, "b"),
        ]);
        let command = ToggleListCommand::new(ListKind::Numbered);

        // Select only the first block; both blocks of item "a" retype, the
        // nested child does not.
        command.execute(&mut model, &Selection::caret(0, 0)).unwrap();

        assert_eq!(model.block(0).and_then(Block::list_kind), Some(ListKind::Numbered));
        assert_eq!(model.block(1).and_then(Block::list_kind), Some(ListKind::Numbered));
        assert_eq!(model.block(2).and_then(Block::list_kind), Some(ListKind::Bulleted));
    }

    // ============ turning off ============

    #[test]
    fn test_turn_off_collapsed_strips_only_cursor_item_and_reroots_children() {
        let mut model = ListModel::from_blocks(vec![
            bulleted("target", 0, "a"),
            bulleted("child", 1, "b"),
            bulleted("grandchild", 2, "c"),
        ]);
        let command = ToggleListCommand::new(ListKind::Bulleted);

        command.execute(&mut model, &Selection::caret(0, 0)).unwrap();

        assert!(!model.block(0).is_some_and(Block::is_list_block));
        assert_eq!(model.block(1).and_then(Block::indent), Some(0));
        assert_eq!(model.block(2).and_then(Block::indent), Some(1));
    }

    #[test]
    fn test_turn_off_range_strips_every_selected_item() {
        let mut model = ListModel::from_blocks(vec![
            bulleted("a", 0, "a"),
            bulleted("b", 0, "b"),
            bulleted("c", 0, "c"),
        ]);
        let command = ToggleListCommand::new(ListKind::Bulleted);

        command
            .execute(&mut model, &Selection::blocks(0, 1))
            .unwrap();

        assert!(!model.block(0).is_some_and(Block::is_list_block));
        assert!(!model.block(1).is_some_and(Block::is_list_block));
        assert!(model.block(2).is_some_and(Block::is_list_block));
    }

    // ============ events ============

    #[test]
    fn test_execute_emits_changed_blocks() {
        let mut model = ListModel::from_blocks(vec![Block::paragraph("one")]);
        let command = ToggleListCommand::new(ListKind::Bulleted);

        command.execute(&mut model, &Selection::caret(0, 0)).unwrap();

        let events = model.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].blocks, vec![0]);
    }
}
