use crate::model::{Block, BlocksChanged, ListModel, Patch, Selection};
use crate::walker;

/// Where a [`SplitItemCommand`] cuts a multi-block item relative to the
/// cursor block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// The cursor block starts the new item.
    Before,
    /// The new item starts right after the cursor block.
    After,
}

/// Splits one multi-block list item into two items at the cursor block.
///
/// Both halves keep the original indent and kind; the trailing half gets a
/// freshly allocated id. Only meaningful with a collapsed selection inside a
/// non-first (before) or non-last (after) block of the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitItemCommand {
    pub mode: SplitMode,
}

impl SplitItemCommand {
    pub fn new(mode: SplitMode) -> Self {
        Self { mode }
    }

    pub fn is_enabled(&self, model: &ListModel, selection: &Selection) -> bool {
        self.splitting_blocks(model, selection).is_some()
    }

    pub fn execute(&self, model: &mut ListModel, selection: &Selection) -> Option<Patch> {
        let reassign = self.splitting_blocks(model, selection)?;

        let mut command_changed = reassign.clone();
        let patch = model.change(|writer| {
            let id = writer.allocate_id();
            for &index in &reassign {
                writer.update_list(index, |list| list.item_id = id.clone());
            }
        });
        command_changed.sort_unstable();
        model.emit(BlocksChanged {
            blocks: command_changed,
        });
        Some(patch)
    }

    /// The block indices that would receive the fresh id, or `None` when the
    /// command is not applicable here.
    fn splitting_blocks(&self, model: &ListModel, selection: &Selection) -> Option<Vec<usize>> {
        if !selection.is_collapsed() {
            return None;
        }
        let blocks = model.blocks();
        let cursor = selection.anchor.block;
        if !walker::is_list_block_at(blocks, cursor) {
            return None;
        }
        let members = walker::item_blocks(blocks, cursor);
        if members.len() < 2 {
            return None;
        }
        let position = members.iter().position(|&i| i == cursor)?;
        let tail: Vec<usize> = match self.mode {
            // The cursor block and everything after it leave the item.
            SplitMode::Before if position > 0 => members[position..].to_vec(),
            // Everything after the cursor block leaves the item.
            SplitMode::After if position + 1 < members.len() => members[position + 1..].to_vec(),
            _ => return None,
        };
        Some(tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemId, ListKind};
    use pretty_assertions::assert_eq;

    fn three_block_item() -> ListModel {
        ListModel::from_blocks(vec![
            Block::item("one", 0, "a", ListKind::Bulleted),
            Block::item("two", 0, "a", ListKind::Bulleted),
            Block::item("three", 0, "a", ListKind::Bulleted),
        ])
    }

    fn ids(model: &ListModel) -> Vec<&str> {
        model
            .blocks()
            .iter()
            .filter_map(|b| b.item_id().map(ItemId::as_str))
            .collect()
    }

    // ============ enablement ============

    #[test]
    fn test_before_needs_a_non_first_block() {
        let model = three_block_item();
        let before = SplitItemCommand::new(SplitMode::Before);

        assert!(!before.is_enabled(&model, &Selection::caret(0, 0)));
        assert!(before.is_enabled(&model, &Selection::caret(1, 0)));
        assert!(before.is_enabled(&model, &Selection::caret(2, 0)));
    }

    #[test]
    fn test_after_needs_a_non_last_block() {
        let model = three_block_item();
        let after = SplitItemCommand::new(SplitMode::After);

        assert!(after.is_enabled(&model, &Selection::caret(0, 0)));
        assert!(after.is_enabled(&model, &Selection::caret(1, 0)));
        assert!(!after.is_enabled(&model, &Selection::caret(2, 0)));
    }

    #[test]
    fn test_disabled_on_single_block_items_and_ranges() {
        let single = ListModel::from_blocks(vec![Block::item(
            "only",
            0,
            "a",
            ListKind::Bulleted,
        )]);
        let before = SplitItemCommand::new(SplitMode::Before);

        assert!(!before.is_enabled(&single, &Selection::caret(0, 0)));
        assert!(!before.is_enabled(&three_block_item(), &Selection::blocks(0, 1)));
    }

    // ============ effects ============

    #[test]
    fn test_split_before_reassigns_cursor_block_and_followers() {
        // Caret in the second of three blocks of item "a": the second and
        // third block become a new item.
        let mut model = three_block_item();

        let patch = SplitItemCommand::new(SplitMode::Before)
            .execute(&mut model, &Selection::caret(1, 0))
            .unwrap();

        assert_eq!(ids(&model), vec!["a", "a00", "a00"]);
        assert_eq!(patch.changed, vec![1, 2]);
        let events = model.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].blocks, vec![1, 2]);
    }

    #[test]
    fn test_split_after_reassigns_only_the_followers() {
        let mut model = three_block_item();

        let patch = SplitItemCommand::new(SplitMode::After)
            .execute(&mut model, &Selection::caret(1, 0))
            .unwrap();

        assert_eq!(ids(&model), vec!["a", "a", "a00"]);
        assert_eq!(patch.changed, vec![2]);
    }

    #[test]
    fn test_split_keeps_indent_and_kind() {
        let mut model = ListModel::from_blocks(vec![
            Block::item("parent", 0, "p", ListKind::Numbered),
            Block::item("one", 1, "a", ListKind::Numbered),
            Block::item("two", 1, "a", ListKind::Numbered),
        ]);

        SplitItemCommand::new(SplitMode::Before)
            .execute(&mut model, &Selection::caret(2, 0))
            .unwrap();

        let second = model.block(2).unwrap();
        assert_eq!(second.indent(), Some(1));
        assert_eq!(second.list_kind(), Some(ListKind::Numbered));
        assert_eq!(second.item_id(), Some(&ItemId::from("a00")));
    }

    #[test]
    fn test_split_spans_a_nested_sublist() {
        // Item "a" continues after a nested child; splitting before the
        // continuation block must not touch the child.
        let mut model = ListModel::from_blocks(vec![
            Block::item("a1", 0, "a", ListKind::Bulleted),
            Block::item("child", 1, "b", ListKind::Bulleted),
            Block::item("a2", 0, "a", ListKind::Bulleted),
        ]);

        SplitItemCommand::new(SplitMode::Before)
            .execute(&mut model, &Selection::caret(2, 0))
            .unwrap();

        assert_eq!(ids(&model), vec!["a", "b", "a00"]);
    }
}
