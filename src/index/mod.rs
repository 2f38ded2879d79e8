//! Tag Index and Filter Catalog Module
//!
//! # Components
//!
//! - **tag_index**: `tag name -> tag value -> RecordSet` mapping plus
//!   conjunctive filter resolution with pivot-set intersection
//! - **trie**: character trie over `"name:value"` strings for prefix search

pub mod tag_index;
pub mod trie;

// Re-export main types
pub use tag_index::TagIndex;
pub use trie::FilterTrie;
