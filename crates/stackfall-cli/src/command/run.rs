use std::path::PathBuf;

use anyhow::{Context, bail};
use stackfall_engine::{Command, GameEngine, PieceSeed};

use crate::{
    schema::{RunReport, StepRecord},
    util::{self, Output},
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum OutputMode {
    /// Only the final report
    #[default]
    Final,
    /// One JSON line per command, then the final report
    Steps,
}

#[derive(Debug, Clone, clap::Args)]
pub struct RunArg {
    /// Commands separated by whitespace (e.g. "left left rotate drop")
    #[arg(long, conflicts_with = "script_file")]
    script: Option<String>,
    /// File with commands; text after `#` on a line is ignored
    #[arg(long)]
    script_file: Option<PathBuf>,
    /// Driver config file (JSON) with `engine` and `levels` sections
    #[arg(long)]
    config: Option<PathBuf>,
    /// Piece seed as 32 hex digits; random when omitted
    #[arg(long)]
    seed: Option<String>,
    /// What to print
    #[arg(long, default_value = "final")]
    output_mode: OutputMode,
    /// Stop at the first game over instead of running the whole script
    #[arg(long)]
    stop_on_game_over: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub fn run(arg: &RunArg) -> anyhow::Result<()> {
    let RunArg {
        script,
        script_file,
        config,
        seed,
        output_mode,
        stop_on_game_over,
        output,
    } = arg;

    let script = match (script, script_file) {
        (Some(script), _) => script.clone(),
        (None, Some(path)) => {
            eprintln!("Loading script from {}", path.display());
            util::read_script_file(path)?
        }
        (None, None) => bail!("either --script or --script-file is required"),
    };
    let commands = parse_script(&script)?;

    let config = util::read_config_file(config.as_deref())?;
    let seed = match seed {
        Some(seed) => parse_seed(seed)?,
        None => rand::random(),
    };

    let mut engine = GameEngine::with_seed(config.engine, seed)?;
    let mut output = Output::from_output_path(output.clone())?;
    eprintln!(
        "Running {} commands on a {}x{} grid",
        commands.len(),
        config.engine.width,
        config.engine.height
    );

    let mut applied = 0;
    for (step, &command) in commands.iter().enumerate() {
        let outcome = engine.apply(command);
        applied += 1;
        if *output_mode == OutputMode::Steps {
            output.write_json_line(&StepRecord {
                step,
                command,
                outcome: &outcome,
            })?;
        }
        if *stop_on_game_over && engine.is_game_over() {
            eprintln!("Game over after {applied} commands");
            break;
        }
    }

    let score = engine.score();
    let level = config.levels.level_for_score(score);
    let report = RunReport {
        seed,
        config: config.engine,
        commands_applied: applied,
        level,
        descent_interval_ms: config.levels.descent_interval(level).as_millis(),
        stats: engine.stats().clone(),
        snapshot: engine.snapshot(),
        grid: engine.grid().clone(),
    };
    eprintln!(
        "Score {score} (level {level}), {} pieces, {} lines",
        report.stats.completed_pieces(),
        report.stats.total_cleared_lines()
    );
    output.write_json(&report)?;

    Ok(())
}

fn parse_script(script: &str) -> anyhow::Result<Vec<Command>> {
    let mut commands = vec![];
    for (line_no, line) in script.lines().enumerate() {
        let line = line.split_once('#').map_or(line, |(code, _)| code);
        for token in line.split_whitespace() {
            let command = token
                .parse()
                .with_context(|| format!("Invalid script at line {}", line_no + 1))?;
            commands.push(command);
        }
    }
    Ok(commands)
}

fn parse_seed(seed: &str) -> anyhow::Result<PieceSeed> {
    serde_json::from_value(serde_json::Value::String(seed.to_owned()))
        .with_context(|| format!("Invalid seed: {seed}"))
}
