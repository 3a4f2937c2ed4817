pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("grid width {width} is narrower than a piece template")]
    TooNarrow { width: usize },
    #[display("grid height {height} is shorter than a piece template")]
    TooShort { height: usize },
    #[display("{hidden_rows} hidden rows leave nothing visible in a grid of height {height}")]
    NoVisibleRows { hidden_rows: usize, height: usize },
    #[display("spawn row {spawn_y} does not fit a piece template inside the grid")]
    SpawnOutsideGrid { spawn_y: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LevelTableError {
    #[display("the first level threshold must be 0")]
    FirstThresholdNotZero,
    #[display("{thresholds} thresholds but {intervals} descent intervals")]
    LengthMismatch { thresholds: usize, intervals: usize },
    #[display("threshold of level {level} does not exceed the previous one")]
    NotIncreasing { level: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown command: {token}")]
pub struct ParseCommandError {
    #[error(not(source))]
    pub token: String,
}
