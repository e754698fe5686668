pub mod highlight;
pub mod measurement;
pub mod reply;
pub mod scoring;

pub use highlight::{Highlighter, Segment};
pub use scoring::ScoreBoard;
