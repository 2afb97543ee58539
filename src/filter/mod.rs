pub mod engine;
pub mod marker;
pub mod stack;

pub use engine::{FilterStats, Filtered, LineFilter};
pub use marker::MatchEngine;
