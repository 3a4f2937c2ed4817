use std::sync::mpsc::Receiver;

use serde::{Deserialize, Serialize};

use crate::{
    ConfigError,
    core::{ClearResult, Grid, PieceKind, PiecePosition, Shape},
};

use super::{
    command::{Command, CommandOutcome},
    config::EngineConfig,
    game_stats::GameStats,
    piece_bag::{PieceBag, PieceSeed},
    rotation::RotationCursor,
    score::Score,
    snapshot::{DownResult, ViewSnapshot},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Playing,
    GameOver,
}

/// The game-state engine.
///
/// Owns the grid, the falling piece, the bag, the hold slot and the score,
/// and exposes the operations a driver needs to run a game. All operations
/// are synchronous and bounded; the engine has no clock, so the driver
/// decides when to call [`GameEngine::soft_drop`] for gravity.
///
/// Blocked moves, rejected rotations and refused holds are ordinary outcomes
/// reported as `false`. Once a spawn collides the engine enters
/// [`EngineState::GameOver`]; from then on moves, rotations, holds and locks
/// are no-ops (returning `false` where they return anything) until
/// [`GameEngine::new_game`] or a [`GameEngine::spawn_piece`] that fits.
///
/// # Example
///
/// ```
/// use stackfall_engine::{EngineConfig, GameEngine, PieceSeed};
///
/// let mut engine =
///     GameEngine::with_seed(EngineConfig::default(), PieceSeed::from_u128(42)).unwrap();
///
/// engine.move_left();
/// engine.rotate();
/// let result = engine.hard_drop();
///
/// assert!(result.locked());
/// assert!(!result.is_game_over());
/// assert_eq!(engine.stats().completed_pieces(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GameEngine {
    config: EngineConfig,
    grid: Grid,
    cursor: RotationCursor,
    position: PiecePosition,
    bag: PieceBag,
    held: Option<PieceKind>,
    hold_used: bool,
    score: Score,
    stats: GameStats,
    state: EngineState,
}

impl GameEngine {
    /// Creates an engine with an OS-seeded bag and spawns the first piece.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_bag(config, PieceBag::new())
    }

    /// Like [`Self::new`], but with a deterministic piece sequence.
    pub fn with_seed(config: EngineConfig, seed: PieceSeed) -> Result<Self, ConfigError> {
        Self::with_bag(config, PieceBag::with_seed(seed))
    }

    /// Creates an engine drawing pieces from `bag` and spawns the first piece.
    pub fn with_bag(config: EngineConfig, bag: PieceBag) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut this = Self {
            config,
            grid: Grid::new(config.width, config.height),
            cursor: RotationCursor::new(bag.peek_next()),
            position: Self::spawn_position(&config),
            bag,
            held: None,
            hold_used: false,
            score: Score::new(),
            stats: GameStats::new(),
            state: EngineState::Playing,
        };
        this.spawn_piece();
        Ok(this)
    }

    fn spawn_position(config: &EngineConfig) -> PiecePosition {
        PiecePosition::new(config.spawn_x(), config.spawn_y)
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score.value()
    }

    /// Returns a receiver fed with the score after every change.
    pub fn subscribe_score(&mut self) -> Receiver<usize> {
        self.score.subscribe()
    }

    #[must_use]
    pub const fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub const fn active_piece(&self) -> PieceKind {
        self.cursor.kind()
    }

    #[must_use]
    pub const fn orientation(&self) -> usize {
        self.cursor.index()
    }

    #[must_use]
    pub const fn active_shape(&self) -> Shape {
        self.cursor.current_shape()
    }

    #[must_use]
    pub const fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub const fn held_piece(&self) -> Option<PieceKind> {
        self.held
    }

    #[must_use]
    pub const fn is_hold_used(&self) -> bool {
        self.hold_used
    }

    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.bag.peek_next()
    }

    /// Returns the queued pieces, next piece first.
    pub fn upcoming_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.upcoming()
    }

    /// Draws the next piece and places it at the spawn position.
    ///
    /// Clears the hold-used flag. Returns `true` when the new piece already
    /// collides, which ends the game; the piece stays installed so the final
    /// board can still be rendered. The engine state always agrees with the
    /// returned flag, so a spawn that fits resumes play.
    pub fn spawn_piece(&mut self) -> bool {
        let kind = self.bag.draw();
        self.cursor.set_piece(kind);
        self.hold_used = false;
        self.position = Self::spawn_position(&self.config);

        let game_over = self.collides_at(&self.cursor.current_shape(), self.position);
        self.state = if game_over {
            EngineState::GameOver
        } else {
            EngineState::Playing
        };
        game_over
    }

    fn collides_at(&self, shape: &Shape, position: PiecePosition) -> bool {
        self.grid.collides(shape, position.x, position.y)
    }

    fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        if self.is_game_over() {
            return false;
        }
        let candidate = self.position.offset(dx, dy);
        if self.collides_at(&self.cursor.current_shape(), candidate) {
            return false;
        }
        self.position = candidate;
        true
    }

    pub fn move_down(&mut self) -> bool {
        self.try_move(0, 1)
    }

    pub fn move_left(&mut self) -> bool {
        self.try_move(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_move(1, 0)
    }

    /// Rotates clockwise in place if the next orientation fits.
    ///
    /// There is no kick search: a rotation blocked by a wall or the stack
    /// simply fails.
    pub fn rotate(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        let (shape, index) = self.cursor.preview_next();
        if self.collides_at(&shape, self.position) {
            return false;
        }
        self.cursor.commit(index);
        true
    }

    /// Sets the falling piece aside, once per spawned piece.
    ///
    /// With an empty hold slot the falling piece is stored and the next piece
    /// spawns. Otherwise the falling piece and the held piece trade places
    /// and the swapped-in piece restarts at the spawn position in its spawn
    /// orientation. The swap is not collision-checked and never ends the
    /// game by itself; a spawn on the empty-slot path can.
    pub fn hold(&mut self) -> bool {
        if self.is_game_over() || self.hold_used {
            return false;
        }

        let current = self.cursor.kind();
        if let Some(held) = self.held.replace(current) {
            self.cursor.set_piece(held);
            self.position = Self::spawn_position(&self.config);
        } else {
            self.spawn_piece();
        }
        // Spawning clears the flag, so set it afterwards.
        self.hold_used = true;
        true
    }

    /// Writes the falling piece into the grid at its current position.
    pub fn lock(&mut self) {
        if self.is_game_over() {
            return;
        }
        let shape = self.cursor.current_shape();
        self.grid = self.grid.merge(&shape, self.position.x, self.position.y);
        self.stats.record_lock();
    }

    /// Removes full rows, adds the bonus to the score and returns the result.
    pub fn clear_rows(&mut self) -> ClearResult {
        let result = self.grid.clear_full_rows();
        self.grid = result.grid.clone();
        self.score.add(result.bonus);
        self.stats.record_clear(result.rows_removed);
        result
    }

    /// Returns the lowest row the falling piece can reach straight down.
    #[must_use]
    pub fn ghost_row(&self) -> i32 {
        let shape = self.cursor.current_shape();
        let mut ghost = self.position;
        loop {
            let below = ghost.offset(0, 1);
            if self.collides_at(&shape, below) {
                return ghost.y;
            }
            ghost = below;
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> ViewSnapshot {
        let next_piece = self.bag.peek_next();
        ViewSnapshot {
            piece: self.cursor.kind(),
            shape: self.cursor.current_shape(),
            position: self.position,
            ghost_y: self.ghost_row(),
            next_piece,
            next_shape: next_piece.base_shape(),
            held_piece: self.held,
            held_shape: self.held.map(PieceKind::base_shape),
            score: self.score.value(),
            game_over: self.is_game_over(),
        }
    }

    /// Starts over: empty grid, zero score, empty hold slot, fresh piece.
    ///
    /// The bag keeps its sequence, so the new game continues from the next
    /// queued piece.
    pub fn new_game(&mut self) {
        self.grid = Grid::new(self.config.width, self.config.height);
        self.score.reset();
        self.stats = GameStats::new();
        self.held = None;
        self.hold_used = false;
        self.state = EngineState::Playing;
        self.spawn_piece();
    }

    /// Moves down one row, or locks the piece and spawns the next one when
    /// it cannot move.
    pub fn soft_drop(&mut self) -> DownResult {
        if self.is_game_over() || self.move_down() {
            return DownResult {
                clear: None,
                snapshot: self.snapshot(),
            };
        }
        self.lock_and_spawn()
    }

    /// Drops the piece as far as it goes, locks it and spawns the next one.
    pub fn hard_drop(&mut self) -> DownResult {
        if self.is_game_over() {
            return DownResult {
                clear: None,
                snapshot: self.snapshot(),
            };
        }
        while self.move_down() {}
        self.lock_and_spawn()
    }

    fn lock_and_spawn(&mut self) -> DownResult {
        self.lock();
        let clear = self.clear_rows();
        self.spawn_piece();
        DownResult {
            clear: Some(clear),
            snapshot: self.snapshot(),
        }
    }

    /// Runs one driver command.
    pub fn apply(&mut self, command: Command) -> CommandOutcome {
        let success = match command {
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::RotateCw => self.rotate(),
            Command::Hold => self.hold(),
            Command::SoftDrop => return CommandOutcome::Down(self.soft_drop()),
            Command::HardDrop => return CommandOutcome::Down(self.hard_drop()),
            Command::NewGame => {
                self.new_game();
                return CommandOutcome::NewGame {
                    snapshot: self.snapshot(),
                };
            }
        };
        CommandOutcome::Action {
            success,
            snapshot: self.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Cell;

    const SEED: PieceSeed = PieceSeed::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);

    fn engine() -> GameEngine {
        GameEngine::with_seed(EngineConfig::default(), SEED).unwrap()
    }

    /// Engine whose grid is replaced by `art` (bottom-aligned), keeping the
    /// current falling piece.
    fn engine_with_grid(art: &str) -> GameEngine {
        let mut engine = engine();
        engine.grid = Grid::from_ascii(engine.config.width, engine.config.height, art);
        engine
    }

    /// Installs `kind` as the falling piece at `position`.
    fn place(engine: &mut GameEngine, kind: PieceKind, position: PiecePosition) {
        engine.cursor.set_piece(kind);
        engine.position = position;
    }

    #[test]
    fn test_new_engine_spawns_centered() {
        let engine = engine();
        assert_eq!(engine.position(), PiecePosition::new(3, 0));
        assert_eq!(engine.orientation(), 0);
        assert!(engine.state().is_playing());
        assert!(!engine.is_hold_used());
        assert!(engine.grid().is_empty());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = EngineConfig {
            height: 0,
            ..EngineConfig::default()
        };
        assert!(GameEngine::new(config).is_err());
    }

    #[test]
    fn test_spawn_draws_previewed_piece() {
        let mut engine = engine();
        for _ in 0..10 {
            let upcoming: Vec<_> = engine.upcoming_pieces().collect();
            assert!(upcoming.len() >= PieceKind::LEN);
            assert_eq!(upcoming[0], engine.next_piece());

            assert!(!engine.spawn_piece());
            assert_eq!(engine.active_piece(), upcoming[0]);
            assert_eq!(engine.upcoming_pieces().next(), Some(upcoming[1]));
        }
    }

    #[test]
    fn test_spawn_reports_collision() {
        let mut engine = engine_with_grid(&"IIIIIIIIII\n".repeat(25));
        let next = engine.next_piece();

        assert!(engine.spawn_piece());
        assert!(engine.is_game_over());
        assert_eq!(engine.active_piece(), next);
        assert_eq!(engine.position(), PiecePosition::new(3, 0));
        assert_eq!(engine.orientation(), 0);
        assert!(engine.snapshot().game_over);
    }

    #[test]
    fn test_spawn_that_fits_resumes_play() {
        let mut engine = engine_with_grid(&"IIIIIIIIII\n".repeat(25));
        assert!(engine.spawn_piece());
        assert!(engine.is_game_over());

        engine.grid = Grid::new(10, 25);
        assert!(!engine.spawn_piece());
        assert!(engine.state().is_playing());
    }

    #[test]
    fn test_hold_empty_slot_can_top_out() {
        let mut engine = engine_with_grid(&"IIIIIIIIII\n".repeat(25));
        let first = engine.active_piece();
        let next = engine.next_piece();

        assert!(engine.hold());
        assert!(engine.is_game_over());
        assert_eq!(engine.held_piece(), Some(first));
        assert_eq!(engine.active_piece(), next);
        assert_eq!(engine.position(), PiecePosition::new(3, 0));
        assert!(engine.is_hold_used());

        engine.new_game();
        assert!(engine.state().is_playing());
        assert_eq!(engine.held_piece(), None);
    }

    #[test]
    fn test_move_down_until_blocked_then_lock() {
        let mut engine = engine();
        let shape = engine.active_shape();
        while engine.move_down() {}
        let landed = engine.position();
        assert_eq!(engine.ghost_row(), landed.y);

        let before = engine.grid().clone();
        engine.lock();
        let result = engine.clear_rows();

        assert_eq!(result.rows_removed, 0);
        assert_eq!(result.bonus, 0);
        assert_eq!(result.grid, before.merge(&shape, landed.x, landed.y));
        assert_eq!(engine.grid(), &result.grid);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_moves_stop_at_walls() {
        let mut engine = engine();
        place(&mut engine, PieceKind::O, PiecePosition::new(3, 0));
        let mut lefts = 0;
        while engine.move_left() {
            lefts += 1;
        }
        // O occupies template columns 1-2.
        assert_eq!(lefts, 4);
        assert_eq!(engine.position().x, -1);

        let mut rights = 0;
        while engine.move_right() {
            rights += 1;
        }
        assert_eq!(rights, 8);
        assert_eq!(engine.position().x, 7);
    }

    #[test]
    fn test_blocked_move_leaves_state_unchanged() {
        let mut engine = engine_with_grid("IIIIIIIIII");
        place(&mut engine, PieceKind::T, PiecePosition::new(3, 21));
        // T spawn orientation occupies rows 1-2 of the template: rows 22-23.
        assert!(!engine.move_down());
        assert_eq!(engine.position(), PiecePosition::new(3, 21));
    }

    #[test]
    fn test_rotate_cycles_and_commits() {
        let mut engine = engine();
        place(&mut engine, PieceKind::T, PiecePosition::new(3, 5));
        for expected in [1, 2, 3, 0] {
            assert!(engine.rotate());
            assert_eq!(engine.orientation(), expected);
        }
    }

    #[test]
    fn test_rotate_against_wall_fails_without_kick() {
        let mut engine = engine();
        // Horizontal I spans template columns 0-3; vertical I uses column 1.
        place(&mut engine, PieceKind::I, PiecePosition::new(3, 5));
        assert!(engine.rotate());
        while engine.move_left() {}
        assert_eq!(engine.position().x, -1);

        assert!(!engine.rotate(), "horizontal I would stick out of the left wall");
        assert_eq!(engine.orientation(), 1);
        assert_eq!(engine.position().x, -1);
    }

    #[test]
    fn test_rotate_blocked_by_stack() {
        let mut engine = engine_with_grid(
            "
            ...O......
            ..........
            ..........
            ..........
            ",
        );
        // Vertical I in column 4, rows 20-23; horizontal I would cover row 21,
        // columns 3-6.
        place(&mut engine, PieceKind::I, PiecePosition::new(3, 20));
        engine.cursor.commit(1);
        assert!(!engine.collides_at(&engine.active_shape(), engine.position()));

        assert!(!engine.rotate());
        assert_eq!(engine.orientation(), 1);
    }

    #[test]
    fn test_hold_empty_slot_spawns_next() {
        let mut engine = engine();
        let first = engine.active_piece();
        let next = engine.next_piece();

        assert!(engine.hold());
        assert_eq!(engine.held_piece(), Some(first));
        assert_eq!(engine.active_piece(), next);
        assert!(engine.is_hold_used());
    }

    #[test]
    fn test_hold_is_single_use_per_turn() {
        let mut engine = engine();
        assert!(engine.hold());
        assert!(!engine.hold());

        engine.hard_drop();
        assert!(!engine.is_hold_used());
        assert!(engine.hold());
    }

    #[test]
    fn test_hold_swaps_and_recenters() {
        let mut engine = engine();
        let first = engine.active_piece();
        assert!(engine.hold());
        engine.hard_drop();

        let current = engine.active_piece();
        engine.move_left();
        engine.move_down();
        engine.rotate();

        assert!(engine.hold());
        assert_eq!(engine.active_piece(), first);
        assert_eq!(engine.held_piece(), Some(current));
        assert_eq!(engine.orientation(), 0);
        assert_eq!(engine.position(), PiecePosition::new(3, 0));
    }

    #[test]
    fn test_hold_swap_skips_collision_check() {
        let mut engine = engine();
        assert!(engine.hold());
        engine.hard_drop();
        engine.grid = Grid::from_ascii(10, 25, &"IIIIIIIIII\n".repeat(25));

        assert!(engine.hold());
        assert!(engine.state().is_playing());
    }

    #[test]
    fn test_gap_fill_scores_fifty() {
        let mut engine = engine_with_grid("IIIII.IIII");
        place(&mut engine, PieceKind::I, PiecePosition::new(4, 21));
        engine.cursor.commit(1);
        // Vertical I at column 5, rows 21-24.
        let result = engine.hard_drop();

        assert_eq!(result.rows_removed(), 1);
        let clear = result.clear.unwrap();
        assert_eq!(clear.rows_removed, 1);
        assert_eq!(clear.cleared_rows, [24]);
        assert_eq!(clear.bonus, 50);
        assert_eq!(engine.score(), 50);
        assert_eq!(result.snapshot.score, 50);
        assert_eq!(engine.grid().cell(5, 24), Some(Cell::Piece(PieceKind::I)));
        assert_eq!(engine.grid().cell(4, 24), Some(Cell::Empty));
    }

    #[test]
    fn test_score_observers_see_clear_bonus() {
        let mut engine = engine_with_grid(
            "
            IIIII.IIII
            IIIII.IIII
            ",
        );
        let changes = engine.subscribe_score();
        place(&mut engine, PieceKind::I, PiecePosition::new(4, 10));
        engine.cursor.commit(1);
        engine.hard_drop();

        assert_eq!(changes.try_iter().collect::<Vec<_>>(), [200]);
        assert_eq!(engine.stats().line_cleared_counter()[2], 1);
    }

    #[test]
    fn test_soft_drop_moves_then_locks() {
        let mut engine = engine();
        let result = engine.soft_drop();
        assert!(!result.locked());
        assert_eq!(result.snapshot.position.y, 1);

        let mut drops = 1;
        while !engine.soft_drop().locked() {
            drops += 1;
        }
        assert!(drops > 20);
        assert_eq!(engine.stats().completed_pieces(), 1);
        assert_eq!(engine.position(), PiecePosition::new(3, 0));
    }

    #[test]
    fn test_ghost_row_matches_hard_drop() {
        let mut engine = engine_with_grid(
            "
            ...II.....
            ..IIII....
            ",
        );
        let ghost = engine.ghost_row();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.ghost_y, ghost);
        assert_eq!(
            snapshot.ghost_position(),
            PiecePosition::new(snapshot.position.x, ghost)
        );
        assert_eq!(engine.position().y, 0);

        while engine.move_down() {}
        assert_eq!(engine.position().y, ghost);
    }

    #[test]
    fn test_top_out_ends_game() {
        let mut engine = engine();
        let mut game_over = false;
        for _ in 0..200 {
            if engine.hard_drop().is_game_over() {
                game_over = true;
                break;
            }
        }
        assert!(game_over);
        assert!(engine.is_game_over());

        let grid = engine.grid().clone();
        let position = engine.position();
        assert!(!engine.move_left());
        assert!(!engine.move_down());
        assert!(!engine.rotate());
        assert!(!engine.hold());
        engine.lock();
        let result = engine.hard_drop();
        assert!(!result.locked());
        assert_eq!(engine.grid(), &grid);
        assert_eq!(engine.position(), position);
    }

    #[test]
    fn test_new_game_resets() {
        let mut engine = engine_with_grid("IIIII.IIII");
        place(&mut engine, PieceKind::I, PiecePosition::new(4, 0));
        engine.cursor.commit(1);
        engine.hard_drop();
        engine.hold();
        assert_eq!(engine.score(), 50);

        engine.new_game();
        assert_eq!(engine.score(), 0);
        assert!(engine.grid().is_empty());
        assert_eq!(engine.held_piece(), None);
        assert!(!engine.is_hold_used());
        assert_eq!(engine.stats(), &GameStats::new());
        assert!(engine.state().is_playing());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut engine = engine();
        assert!(engine.hold());
        let snapshot = engine.snapshot();

        assert_eq!(snapshot.piece, engine.active_piece());
        assert_eq!(snapshot.shape, engine.active_shape());
        assert_eq!(snapshot.next_shape, engine.next_piece().base_shape());
        assert_eq!(snapshot.held_shape, engine.held_piece().map(PieceKind::base_shape));

        engine.move_right();
        engine.rotate();
        assert_ne!(snapshot.position, engine.position());
    }

    #[test]
    fn test_apply_dispatches_commands() {
        let mut engine = engine();
        let outcome = engine.apply(Command::MoveRight);
        assert!(matches!(outcome, CommandOutcome::Action { success: true, .. }));
        assert_eq!(outcome.snapshot().position.x, 4);

        let outcome = engine.apply(Command::HardDrop);
        assert!(outcome.is_down());

        let outcome = engine.apply(Command::NewGame);
        assert!(outcome.is_new_game());
        assert!(engine.grid().is_empty());
    }

    #[test]
    fn test_same_seed_same_game() {
        let script = [
            Command::MoveLeft,
            Command::RotateCw,
            Command::HardDrop,
            Command::Hold,
            Command::MoveRight,
            Command::HardDrop,
            Command::HardDrop,
        ];
        let mut a = engine();
        let mut b = engine();
        for command in script {
            assert_eq!(a.apply(command), b.apply(command));
        }
        assert_eq!(a.grid(), b.grid());
    }
}
