//! HTML serialization of the projected tree.
//!
//! The emitted shape is the compatibility contract: nested `<ul>`/`<ol>`
//! containers, `<li>` elements carrying the item id as a `data-list-item-id`
//! attribute for lossless re-import, and a checkbox input as the first inline
//! child of todo items.

use std::fmt::Write;

use crate::model::{Block, BlockKind, ListKind, ListModel};
use crate::view::{ViewNodeKind, ViewTree, ROOT};

/// Serialize the whole tree against its model snapshot.
pub fn render_html(model: &ListModel, tree: &ViewTree) -> String {
    let mut out = String::new();
    if let Some(root) = tree.node(ROOT) {
        for &child in &root.children {
            render_node(model, tree, child, false, &mut out);
        }
    }
    out
}

fn render_node(model: &ListModel, tree: &ViewTree, index: usize, first_in_item: bool, out: &mut String) {
    let Some(node) = tree.node(index) else {
        return;
    };
    match &node.kind {
        ViewNodeKind::Root => {}
        ViewNodeKind::List { kind } => {
            match kind {
                ListKind::Todo => out.push_str("<ul class=\"todo-list\">"),
                _ => {
                    let _ = write!(out, "<{}>", kind.container_tag());
                }
            }
            for &child in &node.children {
                render_node(model, tree, child, false, out);
            }
            let _ = write!(out, "</{}>", kind.container_tag());
        }
        ViewNodeKind::Item { id } => {
            let _ = write!(
                out,
                "<li data-list-item-id=\"{}\">",
                html_escape::encode_double_quoted_attribute(id.as_str())
            );
            for (position, &child) in node.children.iter().enumerate() {
                render_node(model, tree, child, position == 0, out);
            }
            out.push_str("</li>");
        }
        ViewNodeKind::Content { block, bogus } => {
            if let Some(block) = model.block(*block) {
                render_block(block, *bogus, first_in_item, out);
            }
        }
    }
}

fn render_block(block: &Block, bogus: bool, first_in_item: bool, out: &mut String) {
    // The todo checkbox leads the item's first content block.
    let checkbox = first_in_item && block.list_kind() == Some(ListKind::Todo);

    if block.kind == BlockKind::Divider {
        out.push_str("<hr>");
        return;
    }
    if bogus {
        push_inline(block, checkbox, out);
        return;
    }

    let tag = block.kind.element_tag();
    let _ = write!(out, "<{tag}");
    for (key, value) in &block.attrs {
        // Attribute values are escaped; names cannot be, so anything outside
        // the identifier shape is not serialized at all.
        if !is_valid_attr_name(key) {
            continue;
        }
        let _ = write!(
            out,
            " {key}=\"{}\"",
            html_escape::encode_double_quoted_attribute(value)
        );
    }
    out.push('>');
    push_inline(block, checkbox, out);
    let _ = write!(out, "</{tag}>");
}

fn is_valid_attr_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn push_inline(block: &Block, checkbox: bool, out: &mut String) {
    if checkbox {
        let checked = block
            .list
            .as_ref()
            .and_then(|l| l.props.get("todoChecked"))
            .is_some_and(|v| v == "true");
        if checked {
            out.push_str("<input type=\"checkbox\" disabled checked>");
        } else {
            out.push_str("<input type=\"checkbox\" disabled>");
        }
    }
    let _ = write!(out, "{}", html_escape::encode_text(&block.text));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, ListAttributes, ListKind, ListModel};
    use crate::view::ViewTree;

    fn render(blocks: Vec<Block>) -> String {
        let model = ListModel::from_blocks(blocks);
        let tree = ViewTree::build(&model);
        render_html(&model, &tree)
    }

    fn bulleted(text: &str, indent: u32, id: &str) -> Block {
        Block::item(text, indent, id, ListKind::Bulleted)
    }

    #[test]
    fn test_flat_bulleted_list() {
        let html = render(vec![bulleted("One", 0, "a"), bulleted("Two", 0, "b")]);
        insta::assert_snapshot!(
            html,
            @r#"<ul><li data-list-item-id="a">One</li><li data-list-item-id="b">Two</li></ul>"#
        );
    }

    #[test]
    fn test_nested_mixed_kinds() {
        let html = render(vec![
            bulleted("Parent", 0, "a"),
            Block::item("Child", 1, "b", ListKind::Numbered),
        ]);
        insta::assert_snapshot!(
            html,
            @r#"<ul><li data-list-item-id="a">Parent<ol><li data-list-item-id="b">Child</li></ol></li></ul>"#
        );
    }

    #[test]
    fn test_todo_list_emits_checkboxes() {
        let html = render(vec![
            Block::paragraph("Buy milk").with_list(
                ListAttributes::new(0, "a", ListKind::Todo).with_prop("todoChecked", "true"),
            ),
            Block::item("Call home", 0, "b", ListKind::Todo),
        ]);
        insta::assert_snapshot!(
            html,
            @r#"<ul class="todo-list"><li data-list-item-id="a"><input type="checkbox" disabled checked>Buy milk</li><li data-list-item-id="b"><input type="checkbox" disabled>Call home</li></ul>"#
        );
    }

    #[test]
    fn test_multi_block_item_uses_explicit_paragraphs() {
        let html = render(vec![
            Block::paragraph("Intro"),
            bulleted("First", 0, "a"),
            bulleted("Second", 0, "a"),
        ]);
        insta::assert_snapshot!(
            html,
            @r#"<p>Intro</p><ul><li data-list-item-id="a"><p>First</p><p>Second</p></li></ul>"#
        );
    }

    #[test]
    fn test_extra_attribute_forces_explicit_element() {
        let html = render(vec![
            bulleted("Left", 0, "a"),
            Block::paragraph("Right")
                .with_attr("align", "right")
                .with_list(ListAttributes::new(0, "b", ListKind::Bulleted)),
        ]);
        insta::assert_snapshot!(
            html,
            @r#"<ul><li data-list-item-id="a">Left</li><li data-list-item-id="b"><p align="right">Right</p></li></ul>"#
        );
    }

    #[test]
    fn test_hostile_attribute_name_is_not_serialized() {
        // The value still forces an explicit element, but the name itself
        // never reaches the output.
        let html = render(vec![
            Block::paragraph("Text")
                .with_attr("align", "left")
                .with_attr("on<click x=\"", "payload")
                .with_list(ListAttributes::new(0, "a", ListKind::Bulleted)),
        ]);
        insta::assert_snapshot!(
            html,
            @r#"<ul><li data-list-item-id="a"><p align="left">Text</p></li></ul>"#
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render(vec![bulleted("Fish & <chips>", 0, "a")]);
        insta::assert_snapshot!(
            html,
            @r#"<ul><li data-list-item-id="a">Fish &amp; &lt;chips&gt;</li></ul>"#
        );
    }
}
