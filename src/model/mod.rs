//! The flat document model: annotated blocks, positions and the change-batch
//! surface.
//!
//! Lists are not nested containers here. A list item is any block carrying
//! list attributes (indent depth, item id, kind); structure is recovered from
//! those annotations when projecting to a view. This keeps every structural
//! edit a small attribute rewrite on a handful of blocks instead of a tree
//! surgery.

mod attributes;
mod block;
mod document;
mod position;

pub use attributes::{ItemId, ListAttributes, ListKind};
pub use block::{Block, BlockKind};
pub use document::{BlocksChanged, ListModel, Patch, Writer};
pub use position::{ModelPosition, Position, Selection};
