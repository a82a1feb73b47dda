//! Element arena: slotmap-backed element tree that builds query chains.

pub mod node;
pub mod tree;

pub use node::{ElementData, ElementId};
pub use tree::ElementTree;
