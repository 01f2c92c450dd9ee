use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{ItemId, ListAttributes, ListKind};

/// Kind of a block in the flat document model.
///
/// The engine does not own blocks; it only reads their kind to decide schema
/// eligibility and rendering shape. Anything a host editor treats as a block
/// container maps onto one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    Quote,
    Code,
    Table,
    /// Thematic break / horizontal rule. Cannot carry list attributes.
    Divider,
}

impl BlockKind {
    /// Schema query: may a block of this kind carry the list attribute triple?
    ///
    /// Blocks that fail this check get their list attributes stripped by the
    /// postfixer (invariant 5).
    pub fn allows_list_attributes(&self) -> bool {
        !matches!(self, BlockKind::Divider)
    }

    /// Tag name used when the block renders as an explicit view element.
    pub fn element_tag(&self) -> String {
        match self {
            BlockKind::Paragraph => "p".to_string(),
            BlockKind::Heading(level) => format!("h{}", (*level).clamp(1, 6)),
            BlockKind::Quote => "blockquote".to_string(),
            BlockKind::Code => "pre".to_string(),
            BlockKind::Table => "table".to_string(),
            BlockKind::Divider => "hr".to_string(),
        }
    }
}

/// One block of the flat document sequence.
///
/// `attrs` holds non-list attributes (alignment and the like). Their presence
/// is what forces the view projection to emit an explicit element instead of
/// the transparent bogus wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<ListAttributes>,
}

impl Block {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            attrs: BTreeMap::new(),
            list: None,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, text)
    }

    /// Convenience constructor for a single-block list item.
    pub fn item(
        text: impl Into<String>,
        indent: u32,
        item_id: impl Into<ItemId>,
        kind: ListKind,
    ) -> Self {
        let mut block = Self::paragraph(text);
        block.list = Some(ListAttributes::new(indent, item_id, kind));
        block
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_list(mut self, list: ListAttributes) -> Self {
        self.list = Some(list);
        self
    }

    pub fn is_list_block(&self) -> bool {
        self.list.is_some()
    }

    pub fn indent(&self) -> Option<u32> {
        self.list.as_ref().map(|l| l.indent)
    }

    pub fn item_id(&self) -> Option<&ItemId> {
        self.list.as_ref().map(|l| &l.item_id)
    }

    pub fn list_kind(&self) -> Option<ListKind> {
        self.list.as_ref().map(|l| l.kind)
    }
}
