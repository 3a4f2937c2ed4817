use serde::{Deserialize, Serialize};
use stackfall_engine::{
    Command, CommandOutcome, EngineConfig, GameStats, Grid, LevelTable, PieceSeed, ViewSnapshot,
};

/// Contents of the `--config` file. Missing sections fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub engine: EngineConfig,
    pub levels: LevelTable,
}

/// One line of `--output-mode steps` output.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord<'a> {
    pub step: usize,
    pub command: Command,
    pub outcome: &'a CommandOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelRecord {
    pub level: usize,
    pub threshold: usize,
    pub interval_ms: u128,
}

/// Final state after a scripted run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub seed: PieceSeed,
    pub config: EngineConfig,
    pub commands_applied: usize,
    pub level: usize,
    pub descent_interval_ms: u128,
    pub stats: GameStats,
    pub snapshot: ViewSnapshot,
    pub grid: Grid,
}
