use std::collections::BTreeSet;

use crate::commands::{selected_item_heads, Preceding, preceding_at_depth};
use crate::model::{Block, BlocksChanged, ListKind, ListModel, Patch, Selection};
use crate::walker;

/// Which way an [`IndentCommand`] moves the selected items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentDirection {
    /// Nest deeper under the preceding sibling.
    Forward,
    /// Lift one level out; items already at the top level leave the list.
    Backward,
}

/// Changes the nesting depth of the selected list items and their whole
/// subtrees.
///
/// Forward indentation needs a preceding sibling at the same depth to nest
/// under. Backward is allowed anywhere inside a list; outdenting a top-level
/// item strips its list attributes entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentCommand {
    pub direction: IndentDirection,
}

impl IndentCommand {
    pub fn new(direction: IndentDirection) -> Self {
        Self { direction }
    }

    pub fn is_enabled(&self, model: &ListModel, selection: &Selection) -> bool {
        let blocks = model.blocks();
        let Some(head) = selected_item_heads(blocks, selection).first().copied() else {
            return false;
        };
        match self.direction {
            IndentDirection::Backward => true,
            IndentDirection::Forward => {
                let Some(depth) = blocks[head].indent() else {
                    return false;
                };
                matches!(
                    preceding_at_depth(blocks, head, depth),
                    Preceding::Sibling(_)
                )
            }
        }
    }

    pub fn execute(&self, model: &mut ListModel, selection: &Selection) -> Option<Patch> {
        if !self.is_enabled(model, selection) {
            return None;
        }
        let patch = match self.direction {
            IndentDirection::Forward => indent_forward(model, selection),
            IndentDirection::Backward => indent_backward(model, selection),
        };
        Some(patch)
    }
}

/// The subtree of one selected item: its own blocks plus every descendant
/// block, and whether it had descendants at all (decides kind inheritance).
struct SubtreePlan {
    head: usize,
    depth: u32,
    blocks: Vec<usize>,
    has_descendants: bool,
}

fn subtree_plans(blocks: &[Block], selection: &Selection) -> Vec<SubtreePlan> {
    selected_item_heads(blocks, selection)
        .into_iter()
        .filter_map(|head| {
            let depth = blocks[head].indent()?;
            let mut members = walker::item_blocks(blocks, head);
            let descendants = walker::descendant_blocks(blocks, head);
            let has_descendants = !descendants.is_empty();
            members.extend(descendants);
            Some(SubtreePlan {
                head,
                depth,
                blocks: members,
                has_descendants,
            })
        })
        .collect()
}

/// Like [`preceding_at_depth`], but blocks in `shift` are read one level
/// deeper than they currently are.
fn preceding_shifted(
    blocks: &[Block],
    shift: &BTreeSet<usize>,
    start: usize,
    depth: u32,
) -> Preceding {
    let mut index = start;
    while index > 0 {
        index -= 1;
        let Some(mut indent) = blocks[index].indent() else {
            return Preceding::None;
        };
        if shift.contains(&index) {
            indent += 1;
        }
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

fn indent_forward(model: &mut ListModel, selection: &Selection) -> Patch {
    let plans = subtree_plans(model.blocks(), selection);
    // Dedupe: a descendant selected alongside its ancestor shifts once.
    let mut shift: BTreeSet<usize> = BTreeSet::new();
    let mut items: Vec<&SubtreePlan> = Vec::new();
    for plan in &plans {
        if shift.contains(&plan.head) {
            continue;
        }
        shift.extend(plan.blocks.iter().copied());
        items.push(plan);
    }

    // Kind inheritance, decided per item at its new depth:
    // - preceding sibling indented by this same invocation: inherit its
    //   (possibly already inherited) kind;
    // - preceding sibling from an existing nested list: keep own kind;
    // - no sibling (empty nesting point): inherit the parent's kind, unless
    //   the item brings its own nested sub-list along.
    // Neighbours shifted by this invocation are read at their post-shift
    // depth, so later items see the earlier ones as siblings.
    let mut inherit: Vec<(Vec<usize>, ListKind)> = Vec::new();
    {
        let blocks = model.blocks();
        let mut pending: std::collections::BTreeMap<usize, ListKind> = std::collections::BTreeMap::new();
        for plan in &items {
            let new_depth = plan.depth + 1;
            let kind = match preceding_shifted(blocks, &shift, plan.head, new_depth) {
                Preceding::Sibling(sibling) if shift.contains(&sibling) => pending
                    .get(&sibling)
                    .copied()
                    .or_else(|| blocks[sibling].list_kind()),
                Preceding::Sibling(_) => None,
                Preceding::Parent(parent) if !plan.has_descendants => blocks[parent].list_kind(),
                Preceding::Parent(_) | Preceding::None => None,
            };
            if let Some(kind) = kind
                && blocks[plan.head].list_kind() != Some(kind)
            {
                let members = walker::item_blocks(blocks, plan.head);
                for &index in &members {
                    pending.insert(index, kind);
                }
                inherit.push((members, kind));
            }
        }
    }

    let mut command_changed: Vec<usize> = shift.iter().copied().collect();
    let patch = model.change(|writer| {
        for &index in &shift {
            writer.update_list(index, |list| list.indent += 1);
        }
        for (members, kind) in &inherit {
            for &index in members {
                writer.update_list(index, |list| list.kind = *kind);
            }
        }
    });
    command_changed.sort_unstable();
    model.emit(BlocksChanged {
        blocks: command_changed,
    });
    patch
}

fn indent_backward(model: &mut ListModel, selection: &Selection) -> Patch {
    let plans = subtree_plans(model.blocks(), selection);
    let mut shift: BTreeSet<usize> = BTreeSet::new();
    let mut items: Vec<&SubtreePlan> = Vec::new();
    for plan in &plans {
        if shift.contains(&plan.head) {
            continue;
        }
        shift.extend(plan.blocks.iter().copied());
        items.push(plan);
    }

    // Outdented items re-align to the kind of their new preceding sibling,
    // when one exists outside the outdented range.
    let mut realign: Vec<(Vec<usize>, ListKind)> = Vec::new();
    {
        let blocks = model.blocks();
        for plan in &items {
            let Some(new_depth) = plan.depth.checked_sub(1) else {
                continue;
            };
            if let Preceding::Sibling(sibling) = preceding_at_depth(blocks, plan.head, new_depth)
                && !shift.contains(&sibling)
                && let Some(kind) = blocks[sibling].list_kind()
                && blocks[plan.head].list_kind() != Some(kind)
            {
                realign.push((walker::item_blocks(blocks, plan.head), kind));
            }
        }
    }

    let mut command_changed: Vec<usize> = shift.iter().copied().collect();
    let patch = model.change(|writer| {
        for &index in &shift {
            let at_top = writer
                .block(index)
                .and_then(Block::indent)
                .is_some_and(|indent| indent == 0);
            if at_top {
                writer.clear_list_attributes(index);
            } else {
                writer.update_list(index, |list| list.indent -= 1);
            }
        }
        for (members, kind) in &realign {
            for &index in members {
                writer.update_list(index, |list| list.kind = *kind);
            }
        }
    });
    command_changed.sort_unstable();
    model.emit(BlocksChanged {
        blocks: command_changed,
    });
    patch
}
