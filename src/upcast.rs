//! Markdown upcast: turns Markdown source into the flat annotated model.
//!
//! Nested Markdown lists flatten into indent levels; every list item gets a
//! freshly allocated id, so externally authored documents never depend on
//! textual ids. Task-list markers (`- [x]`) upcast to todo items with a
//! `todoChecked` property.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::ids::IdAllocator;
use crate::model::{Block, BlockKind, ItemId, ListAttributes, ListKind, ListModel};

/// Parse Markdown into an un-normalized model. Most callers want
/// [`ListModel::from_markdown`], which normalizes the result.
pub fn parse_markdown(source: &str) -> ListModel {
    let mut upcaster = Upcaster::new();
    let parser = Parser::new_ext(source, Options::ENABLE_TASKLISTS);
    for event in parser {
        upcaster.handle(event);
    }
    let Upcaster { blocks, ids, .. } = upcaster;
    ListModel::from_parts(blocks, ids)
}

/// The item currently being read: id is allocated on entry, kind starts as
/// the enclosing list's and flips to todo when a task marker shows up.
struct ItemState {
    id: ItemId,
    kind: ListKind,
    checked: bool,
}

struct Upcaster {
    blocks: Vec<Block>,
    ids: IdAllocator,
    /// Kinds of the currently open list containers, outermost first.
    lists: Vec<ListKind>,
    /// Currently open items, one per open list that has an item in progress.
    items: Vec<ItemState>,
    quote_depth: usize,
    inline: String,
}

impl Upcaster {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            ids: IdAllocator::new(),
            lists: Vec::new(),
            items: Vec::new(),
            quote_depth: 0,
            inline: String::new(),
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::List(start)) => {
                // In a tight list the parent item's text has no closing
                // paragraph event before a nested list begins.
                if !self.inline.is_empty() {
                    self.flush(BlockKind::Paragraph);
                }
                let kind = if start.is_some() {
                    ListKind::Numbered
                } else {
                    ListKind::Bulleted
                };
                self.lists.push(kind);
            }
            Event::End(TagEnd::List(_)) => {
                self.lists.pop();
            }
            Event::Start(Tag::Item) => {
                let kind = self.lists.last().copied().unwrap_or(ListKind::Bulleted);
                self.items.push(ItemState {
                    id: self.ids.next_id(),
                    kind,
                    checked: false,
                });
            }
            Event::End(TagEnd::Item) => {
                // Tight list items carry bare text with no paragraph events.
                if !self.inline.is_empty() {
                    self.flush(BlockKind::Paragraph);
                }
                self.items.pop();
            }
            Event::TaskListMarker(checked) => {
                if let Some(item) = self.items.last_mut() {
                    item.kind = ListKind::Todo;
                    item.checked = checked;
                }
            }
            Event::End(TagEnd::Paragraph) => {
                let kind = if self.quote_depth > 0 {
                    BlockKind::Quote
                } else {
                    BlockKind::Paragraph
                };
                self.flush(kind);
            }
            Event::End(TagEnd::Heading(level)) => {
                self.flush(BlockKind::Heading(heading_level(level)));
            }
            Event::End(TagEnd::CodeBlock) => {
                // Code blocks keep their trailing newline in pulldown-cmark.
                while self.inline.ends_with('\n') {
                    self.inline.pop();
                }
                self.flush(BlockKind::Code);
            }
            Event::Start(Tag::BlockQuote(_)) => {
                self.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            Event::Rule => {
                self.inline.clear();
                self.blocks.push(Block::new(BlockKind::Divider, ""));
            }
            Event::Text(text) | Event::Code(text) => {
                self.inline.push_str(&text);
            }
            Event::SoftBreak => self.inline.push(' '),
            Event::HardBreak => self.inline.push('\n'),
            // Inline markup containers and embedded HTML contribute only
            // their text content, which arrives as separate events.
            _ => {}
        }
    }

    /// Emit the accumulated inline text as one block, annotated with the
    /// current item's list attributes when inside a list.
    fn flush(&mut self, kind: BlockKind) {
        let text = std::mem::take(&mut self.inline);
        let mut block = Block::new(kind, text);
        if let Some(item) = self.items.last()
            && kind.allows_list_attributes()
        {
            let indent = (self.lists.len().saturating_sub(1)) as u32;
            let mut attrs = ListAttributes::new(indent, item.id.clone(), item.kind);
            if item.checked {
                attrs = attrs.with_prop("todoChecked", "true");
            }
            block.list = Some(attrs);
        }
        self.blocks.push(block);
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
