use serde::{Deserialize, Serialize};

use crate::core::{ClearResult, PieceKind, PiecePosition, Shape};

/// Read-only projection of the engine state for rendering.
///
/// Everything is copied out of the engine; holding a snapshot never borrows
/// or aliases engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    /// Type of the falling piece.
    pub piece: PieceKind,
    /// Current orientation template of the falling piece.
    pub shape: Shape,
    /// Anchor of the falling piece.
    pub position: PiecePosition,
    /// Row the falling piece would be anchored at after a hard drop.
    pub ghost_y: i32,
    /// Type of the piece that spawns next.
    pub next_piece: PieceKind,
    /// Spawn orientation of the next piece.
    pub next_shape: Shape,
    /// Type of the held piece, if any.
    pub held_piece: Option<PieceKind>,
    /// Spawn orientation of the held piece, if any.
    pub held_shape: Option<Shape>,
    /// Current score.
    pub score: usize,
    /// Whether the last spawn topped out.
    pub game_over: bool,
}

impl ViewSnapshot {
    /// Returns the anchor of the ghost piece.
    #[must_use]
    pub const fn ghost_position(&self) -> PiecePosition {
        PiecePosition::new(self.position.x, self.ghost_y)
    }
}

/// Result of a soft drop or hard drop.
///
/// `clear` is present whenever the piece locked, even if no row was full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownResult {
    pub clear: Option<ClearResult>,
    pub snapshot: ViewSnapshot,
}

impl DownResult {
    /// Checks if the piece locked during this drop.
    #[must_use]
    pub const fn locked(&self) -> bool {
        self.clear.is_some()
    }

    /// Number of rows cleared by this drop.
    #[must_use]
    pub fn rows_removed(&self) -> usize {
        self.clear.as_ref().map_or(0, |clear| clear.rows_removed)
    }

    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.snapshot.game_over
    }
}
