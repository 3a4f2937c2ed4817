use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ParseCommandError;

use super::snapshot::{DownResult, ViewSnapshot};

/// A discrete driver command.
///
/// Parsed from and displayed as short script tokens, case-insensitively:
///
/// | Command     | Tokens                  |
/// |-------------|-------------------------|
/// | `MoveLeft`  | `left`, `l`             |
/// | `MoveRight` | `right`, `r`            |
/// | `SoftDrop`  | `down`, `d`, `soft`     |
/// | `HardDrop`  | `drop`, `hard`          |
/// | `RotateCw`  | `rotate`, `cw`, `u`     |
/// | `Hold`      | `hold`, `h`             |
/// | `NewGame`   | `new`, `new-game`       |
///
/// # Example
///
/// ```
/// use stackfall_engine::Command;
///
/// let commands: Vec<Command> = "l l cw drop"
///     .split_whitespace()
///     .map(str::parse)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(commands[2], Command::RotateCw);
/// assert_eq!(commands[3].to_string(), "drop");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCw,
    Hold,
    NewGame,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::MoveLeft,
        Command::MoveRight,
        Command::SoftDrop,
        Command::HardDrop,
        Command::RotateCw,
        Command::Hold,
        Command::NewGame,
    ];

    /// Canonical script token.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Command::MoveLeft => "left",
            Command::MoveRight => "right",
            Command::SoftDrop => "down",
            Command::HardDrop => "drop",
            Command::RotateCw => "rotate",
            Command::Hold => "hold",
            Command::NewGame => "new",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Command::MoveLeft,
            "right" | "r" => Command::MoveRight,
            "down" | "d" | "soft" => Command::SoftDrop,
            "drop" | "hard" => Command::HardDrop,
            "rotate" | "cw" | "u" => Command::RotateCw,
            "hold" | "h" => Command::Hold,
            "new" | "new-game" => Command::NewGame,
            _ => {
                return Err(ParseCommandError {
                    token: s.to_owned(),
                });
            }
        };
        Ok(command)
    }
}

/// What [`GameEngine::apply`](crate::GameEngine::apply) reports for a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// A move, rotation or hold, with whether it took effect.
    Action {
        success: bool,
        snapshot: ViewSnapshot,
    },
    /// A soft or hard drop.
    Down(DownResult),
    /// A freshly started game.
    NewGame { snapshot: ViewSnapshot },
}

impl CommandOutcome {
    /// Returns the snapshot taken after the command.
    #[must_use]
    pub const fn snapshot(&self) -> &ViewSnapshot {
        match self {
            CommandOutcome::Action { snapshot, .. } | CommandOutcome::NewGame { snapshot } => {
                snapshot
            }
            CommandOutcome::Down(down) => &down.snapshot,
        }
    }
}
