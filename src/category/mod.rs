//! Blog category taxonomy.
//!
//! The API hands out categories as a flat list where each record knows its
//! own level and its parent's url alias. This module turns that list into a
//! nested forest for display and lookup.
//!
//! - `record` - the wire type, [`CategoryRecord`]
//! - `tree` - [`build_forest`] and the resulting [`Forest`] / [`TreeNode`]
//! - `render` - indented text rendering for the terminal

mod record;
mod render;
mod tree;

pub use record::CategoryRecord;
pub use render::render_forest;
pub use tree::{build_forest, Forest, TreeNode, Walk};
