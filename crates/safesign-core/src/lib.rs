pub mod completion;
pub mod config;
pub mod index;
pub mod pipeline;
pub mod retrieve;
pub mod rubric;
pub mod scorer;
pub mod segment;
pub mod stream;
pub mod suggest;
pub mod types;

pub use types::*;
