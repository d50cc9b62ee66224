pub mod entity;
pub mod ordering;
pub mod search;

pub use entity::*;
pub use ordering::{sort_prompts, PromptSort};
pub use search::SearchResult;
