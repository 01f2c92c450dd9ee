use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Visual/semantic type of a list item.
///
/// The kind decides which container element the view projection emits
/// (`<ul>` for bulleted and todo lists, `<ol>` for numbered ones) and which
/// per-item decorations apply (todo items get a checkbox).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Bulleted,
    Numbered,
    Todo,
}

impl ListKind {
    /// Tag name of the list container element in the serialized view shape.
    pub fn container_tag(&self) -> &'static str {
        match self {
            ListKind::Numbered => "ol",
            ListKind::Bulleted | ListKind::Todo => "ul",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListKind::Bulleted => write!(f, "bulleted"),
            ListKind::Numbered => write!(f, "numbered"),
            ListKind::Todo => write!(f, "todo"),
        }
    }
}

/// Opaque token shared by every block belonging to the same logical list item.
///
/// A list item may span multiple blocks (e.g. a paragraph followed by an
/// image); all of them carry the same id. Ids are normally produced by
/// [`IdAllocator`](crate::ids::IdAllocator); externally injected content may
/// carry arbitrary ids, which the postfixer de-duplicates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The attribute triple that makes a block a list item, plus optional
/// per-item properties.
///
/// `props` holds item-scoped formatting/marker attributes (e.g.
/// `"todoChecked"`, marker color). Every block of one item must agree on
/// them; the postfixer drops any key that is not identical across the whole
/// item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAttributes {
    /// Nesting depth; 0 = top-level item.
    pub indent: u32,
    /// Shared token of the logical item this block belongs to.
    pub item_id: ItemId,
    /// List type of the item.
    pub kind: ListKind,
    /// Item-scoped formatting/marker attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub props: BTreeMap<String, String>,
}

impl ListAttributes {
    pub fn new(indent: u32, item_id: impl Into<ItemId>, kind: ListKind) -> Self {
        Self {
            indent,
            item_id: item_id.into(),
            kind,
            props: BTreeMap::new(),
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
