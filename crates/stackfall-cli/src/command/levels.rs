use std::path::PathBuf;

use anyhow::Context as _;

use crate::{
    schema::LevelRecord,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub struct LevelsArg {
    /// Driver config file (JSON); the default table is used when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Score to look up instead of listing the whole table
    #[arg(long)]
    score: Option<usize>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub fn run(arg: &LevelsArg) -> anyhow::Result<()> {
    let LevelsArg {
        config,
        score,
        output,
    } = arg;

    let config = util::read_config_file(config.as_deref())?;
    let table = &config.levels;
    let mut output = Output::from_output_path(output.clone())?;

    if let Some(score) = *score {
        let level = table.level_for_score(score);
        eprintln!("Score {score} is level {level}");
        let (level, threshold, interval) = table
            .levels()
            .nth(level - 1)
            .context("level table is empty")?;
        return output.write_json(&LevelRecord {
            level,
            threshold,
            interval_ms: interval.as_millis(),
        });
    }

    let records: Vec<LevelRecord> = table
        .levels()
        .map(|(level, threshold, interval)| LevelRecord {
            level,
            threshold,
            interval_ms: interval.as_millis(),
        })
        .collect();
    eprintln!("{} levels", records.len());
    output.write_json(&records)
}
