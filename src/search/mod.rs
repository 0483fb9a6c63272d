mod fts5_index;
mod query_string;
mod search_index;

pub use fts5_index::{Fts5SearchIndex, IndexStatus};
pub use search_index::*;
