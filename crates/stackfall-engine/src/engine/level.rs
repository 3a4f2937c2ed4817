use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::LevelTableError;

/// Maps the cumulative score to a level and each level to a descent interval.
///
/// The engine never consults this table: it has no notion of time. Drivers
/// poll [`LevelTable::level_for_score`] after score changes and retune their
/// own descent timer with [`LevelTable::descent_interval`].
///
/// Levels are 1-based. Level `n` starts at `thresholds[n - 1]` points.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use stackfall_engine::LevelTable;
///
/// let table = LevelTable::default();
/// assert_eq!(table.level_for_score(0), 1);
/// assert_eq!(table.level_for_score(799), 2);
/// assert_eq!(table.level_for_score(10_000), 5);
/// assert_eq!(table.descent_interval(2), Duration::from_millis(320));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLevelTable", into = "RawLevelTable")]
pub struct LevelTable {
    thresholds: Vec<usize>,
    intervals: Vec<Duration>,
}

#[derive(Serialize, Deserialize)]
struct RawLevelTable {
    thresholds: Vec<usize>,
    intervals_ms: Vec<u64>,
}

impl TryFrom<RawLevelTable> for LevelTable {
    type Error = LevelTableError;

    fn try_from(raw: RawLevelTable) -> Result<Self, Self::Error> {
        Self::new(
            raw.thresholds,
            raw.intervals_ms.into_iter().map(Duration::from_millis).collect(),
        )
    }
}

impl From<LevelTable> for RawLevelTable {
    fn from(table: LevelTable) -> Self {
        Self {
            thresholds: table.thresholds,
            intervals_ms: table
                .intervals
                .iter()
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
                .collect(),
        }
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            thresholds: vec![0, 300, 800, 1500, 3000],
            intervals: [400, 320, 240, 160, 80]
                .into_iter()
                .map(Duration::from_millis)
                .collect(),
        }
    }
}

impl LevelTable {
    /// Builds a table from per-level score thresholds and descent intervals.
    ///
    /// The thresholds must start at 0 and increase strictly, and there must
    /// be exactly one interval per threshold.
    pub fn new(thresholds: Vec<usize>, intervals: Vec<Duration>) -> Result<Self, LevelTableError> {
        if thresholds.first() != Some(&0) {
            return Err(LevelTableError::FirstThresholdNotZero);
        }
        if thresholds.len() != intervals.len() {
            return Err(LevelTableError::LengthMismatch {
                thresholds: thresholds.len(),
                intervals: intervals.len(),
            });
        }
        if let Some(level) = thresholds.windows(2).position(|w| w[0] >= w[1]) {
            return Err(LevelTableError::NotIncreasing { level: level + 2 });
        }
        Ok(Self {
            thresholds,
            intervals,
        })
    }

    /// Number of levels in the table.
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.thresholds.len()
    }

    /// Returns `(level, threshold, descent interval)` for every level.
    pub fn levels(&self) -> impl Iterator<Item = (usize, usize, Duration)> + '_ {
        self.thresholds
            .iter()
            .zip(&self.intervals)
            .enumerate()
            .map(|(i, (&threshold, &interval))| (i + 1, threshold, interval))
    }

    /// Returns the highest level whose threshold is at most `score`.
    #[must_use]
    pub fn level_for_score(&self, score: usize) -> usize {
        self.thresholds.partition_point(|&threshold| threshold <= score).max(1)
    }

    /// Returns the descent interval of `level`, clamped to the table's range.
    #[must_use]
    pub fn descent_interval(&self, level: usize) -> Duration {
        let level = level.clamp(1, self.max_level());
        self.intervals[level - 1]
    }
}
