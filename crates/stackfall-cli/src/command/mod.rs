use clap::{Parser, Subcommand};

use self::{levels::LevelsArg, run::RunArg};

mod levels;
mod run;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a scripted command sequence and print the result as JSON
    Run(#[clap(flatten)] RunArg),
    /// Print the score-to-level table as JSON
    Levels(#[clap(flatten)] LevelsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Run(arg) => run::run(&arg)?,
        Mode::Levels(arg) => levels::run(&arg)?,
    }
    Ok(())
}
