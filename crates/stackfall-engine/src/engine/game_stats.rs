use serde::{Deserialize, Serialize};

/// Longest clear a single piece can produce (one row per template row).
const MAX_ROWS_PER_CLEAR: usize = 4;

/// Game statistics tracking locked pieces and cleared rows.
///
/// - **Completed pieces**: Total number of pieces locked
/// - **Total cleared lines**: Sum of rows removed by every clear
/// - **Line clear distribution**: Count of locks clearing 0, 1, 2, 3 and 4 rows
///
/// The score itself lives in [`Score`](super::Score) so drivers can observe
/// it separately.
///
/// # Example
///
/// ```
/// use stackfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.record_lock();
/// stats.record_clear(2);
///
/// assert_eq!(stats.completed_pieces(), 1);
/// assert_eq!(stats.total_cleared_lines(), 2);
/// assert_eq!(stats.line_cleared_counter()[2], 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; MAX_ROWS_PER_CLEAR + 1],
}

impl GameStats {
    /// Creates a new statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; MAX_ROWS_PER_CLEAR + 1],
        }
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    /// Returns the total number of lines cleared across all line clears.
    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of line clears by row count.
    ///
    /// Index `n` counts the clears that removed exactly `n` rows. Clears of
    /// more than 4 rows (only possible on hand-built grids) are counted in
    /// the total but not in the histogram.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; MAX_ROWS_PER_CLEAR + 1] {
        &self.line_cleared_counter
    }

    pub const fn record_lock(&mut self) {
        self.completed_pieces += 1;
    }

    pub const fn record_clear(&mut self, cleared_lines: usize) {
        self.total_cleared_lines += cleared_lines;
        if cleared_lines < self.line_cleared_counter.len() {
            self.line_cleared_counter[cleared_lines] += 1;
        }
    }
}
