pub mod dialects;
pub mod splitter;
