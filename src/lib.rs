//! Flat-list editing engine.
//!
//! Documents are flat sequences of blocks; list membership, nesting depth and
//! list kind live in per-block attributes rather than in a container tree.
//! The crate provides:
//!
//! - the flat [`model`] with its change-batch API and invariant postfixer,
//! - structural [`commands`] (toggle, indent/outdent, split),
//! - a nested [`view`] projection with HTML rendering and bidirectional
//!   position mapping,
//! - a Markdown [`upcast`] for loading documents.
//!
//! All mutation flows through [`ListModel::change`]; the postfix pass runs at
//! the end of every batch, so between batches the block sequence always
//! satisfies the list invariants (sane indents, unique non-interleaved item
//! ids, one kind per item, attributes only on eligible blocks).
//!
//! [`ListModel::change`]: model::ListModel::change

pub mod commands;
pub mod ids;
pub mod model;
pub mod postfix;
pub mod upcast;
pub mod view;
pub mod walker;

pub use ids::IdAllocator;
pub use model::{
    Block, BlockKind, BlocksChanged, ItemId, ListAttributes, ListKind, ListModel, ModelPosition,
    Patch, Position, Selection, Writer,
};
pub use walker::{Direction, ListWalker, WalkerOptions};
