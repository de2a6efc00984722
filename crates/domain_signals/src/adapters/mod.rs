//! Built-in collaborator adapters

pub mod keyword_index;

pub use keyword_index::{KeywordPatternIndex, KnownPattern};
