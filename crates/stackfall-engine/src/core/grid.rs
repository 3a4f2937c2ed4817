use std::fmt::Write as _;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::piece::{PieceKind, Shape};

/// Score awarded per cleared row, multiplied by the square of the row count.
const CLEAR_BONUS_UNIT: usize = 50;

/// A single cell of the board or of a piece template.
///
/// Serialized as its color id: `0` for empty, `1..=7` for the piece occupying
/// it. Because the only non-empty variant carries a [`PieceKind`], a cell can
/// never hold a value outside `0..=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell filled by a piece of the given type.
    Piece(PieceKind),
}

impl Cell {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Returns the color id of the cell (`0` when empty).
    #[must_use]
    pub const fn color_id(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Piece(kind) => kind.color_id(),
        }
    }

    #[must_use]
    pub const fn from_color_id(id: u8) -> Option<Self> {
        if id == 0 {
            return Some(Cell::Empty);
        }
        match PieceKind::from_color_id(id) {
            Some(kind) => Some(Cell::Piece(kind)),
            None => None,
        }
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.color_id())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = u8::deserialize(deserializer)?;
        Cell::from_color_id(id)
            .ok_or_else(|| serde::de::Error::custom(format!("cell id must be 0-7, got {id}")))
    }
}

/// The persistent board matrix.
///
/// Row 0 is the top of the board and x grows to the right. The first
/// `hidden_rows` rows (see [`EngineConfig`](crate::EngineConfig)) are above
/// the visible field; the grid itself does not treat them specially.
///
/// Dimensions are fixed at construction. Every operation that produces a new
/// board state ([`Grid::merge`], [`Grid::clear_full_rows`]) returns a fresh
/// value and leaves the receiver untouched.
///
/// # Example
///
/// ```
/// use stackfall_engine::{Grid, PieceKind};
///
/// let grid = Grid::new(10, 25);
/// let shape = PieceKind::O.base_shape();
///
/// assert!(!grid.collides(&shape, 3, 0));
/// let merged = grid.merge(&shape, 3, 0);
/// assert!(merged.collides(&shape, 3, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero. Engine code goes through
    /// [`EngineConfig::validate`](crate::EngineConfig::validate) first.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0, "grid width must be positive");
        assert!(height > 0, "grid height must be positive");
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns the cell at column `x`, row `y`, or `None` when out of bounds.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    /// Sets a single cell.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        assert!(x < self.width && y < self.height, "cell ({x}, {y}) out of bounds");
        self.cells[y * self.width + x] = cell;
    }

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks_exact(self.width)
    }

    /// Returns the rows below the first `hidden_rows` rows.
    pub fn visible_rows(&self, hidden_rows: usize) -> impl Iterator<Item = &[Cell]> + '_ {
        self.rows().skip(hidden_rows)
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &[Cell] {
        &self.cells[y * self.width..][..self.width]
    }

    /// Checks if every column of row `y` is occupied.
    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        self.row(y).iter().all(|cell| !cell.is_empty())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }

    /// Maps template cell `(row, col)` anchored at `(x, y)` to a grid index.
    fn target(&self, x: i32, y: i32, row: usize, col: usize) -> Option<(usize, usize)> {
        let tx = usize::try_from(x.checked_add(i32::try_from(col).ok()?)?).ok()?;
        let ty = usize::try_from(y.checked_add(i32::try_from(row).ok()?)?).ok()?;
        (tx < self.width && ty < self.height).then_some((tx, ty))
    }

    /// Checks if `shape` anchored at `(x, y)` collides.
    ///
    /// A collision is any occupied template cell that lands outside the grid
    /// or on an occupied grid cell. Empty template cells never collide, even
    /// when they hang over the edge.
    #[must_use]
    pub fn collides(&self, shape: &Shape, x: i32, y: i32) -> bool {
        shape
            .occupied_cells()
            .into_iter()
            .any(|(row, col, _)| match self.target(x, y, row, col) {
                Some((tx, ty)) => !self.cells[ty * self.width + tx].is_empty(),
                None => true,
            })
    }

    /// Writes the occupied cells of `shape` anchored at `(x, y)` in place.
    ///
    /// Cells that fall outside the grid are dropped; callers only fill shapes
    /// at positions that passed [`Grid::collides`].
    pub fn fill_shape(&mut self, shape: &Shape, x: i32, y: i32) {
        for (row, col, kind) in shape.occupied_cells() {
            debug_assert!(
                self.target(x, y, row, col).is_some(),
                "filling shape cell outside the grid"
            );
            if let Some((tx, ty)) = self.target(x, y, row, col) {
                self.cells[ty * self.width + tx] = Cell::Piece(kind);
            }
        }
    }

    /// Returns a copy of the grid with `shape` locked at `(x, y)`.
    #[must_use]
    pub fn merge(&self, shape: &Shape, x: i32, y: i32) -> Self {
        let mut merged = self.clone();
        merged.fill_shape(shape, x, y);
        merged
    }

    /// Removes every full row and compacts the rest toward the bottom.
    ///
    /// Rows are scanned top to bottom. Non-full rows keep their relative
    /// order, and the removed rows are replaced by empty rows at the top.
    #[must_use]
    pub fn clear_full_rows(&self) -> ClearResult {
        let mut cleared_rows = Vec::new();
        let mut kept = Vec::with_capacity(self.cells.len());
        for (y, row) in self.rows().enumerate() {
            if row.iter().all(|cell| !cell.is_empty()) {
                cleared_rows.push(y);
            } else {
                kept.extend_from_slice(row);
            }
        }

        let mut cells = vec![Cell::Empty; cleared_rows.len() * self.width];
        cells.extend(kept);
        let grid = Self {
            width: self.width,
            height: self.height,
            cells,
        };

        let count = cleared_rows.len();
        ClearResult {
            rows_removed: count,
            cleared_rows,
            bonus: clear_bonus(count),
            grid,
        }
    }

    /// Creates a grid from ASCII art, one line per row, top to bottom.
    ///
    /// `.` is an empty cell, a piece letter (`I`, `J`, `L`, `O`, `S`, `T`,
    /// `Z`) or `#` (rendered as `I`) is an occupied one. Blank lines and
    /// whitespace are ignored. Missing rows are added empty at the top, so the
    /// art describes the bottom of the board.
    ///
    /// # Panics
    ///
    /// Panics if a row has the wrong width, the art is taller than `height`,
    /// or it contains an unknown character.
    #[must_use]
    pub fn from_ascii(width: usize, height: usize, art: &str) -> Self {
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= height,
            "art has {} rows but the grid is {height} tall",
            lines.len()
        );

        let mut grid = Self::new(width, height);
        let top = height - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            assert_eq!(
                chars.len(),
                width,
                "each row must have exactly {width} cells, got {} at row {i}",
                chars.len()
            );
            for (x, ch) in chars.into_iter().enumerate() {
                let cell = match ch {
                    '.' => Cell::Empty,
                    '#' => Cell::Piece(PieceKind::I),
                    _ => Cell::Piece(
                        PieceKind::from_char(ch)
                            .unwrap_or_else(|| panic!("unknown cell character {ch:?}")),
                    ),
                };
                grid.set_cell(x, top + i, cell);
            }
        }
        grid
    }
}

/// Returns the score bonus for clearing `rows` rows at once: 50 × rows².
#[must_use]
pub const fn clear_bonus(rows: usize) -> usize {
    CLEAR_BONUS_UNIT * rows * rows
}

impl Serialize for Grid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Format: ["0000000000", "0000330000", ...] (one digit string per row)
        let rows: Vec<String> = self
            .rows()
            .map(|row| {
                let mut s = String::with_capacity(self.width);
                for cell in row {
                    write!(&mut s, "{}", cell.color_id()).unwrap();
                }
                s
            })
            .collect();
        rows.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        let Some(first) = rows.first() else {
            return Err(serde::de::Error::custom("grid must have at least one row"));
        };
        let width = first.chars().count();
        if width == 0 {
            return Err(serde::de::Error::custom("grid rows must not be empty"));
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(serde::de::Error::custom(format!(
                    "row {y} has {} cells, expected {width}",
                    row.chars().count()
                )));
            }
            for ch in row.chars() {
                let cell = ch
                    .to_digit(10)
                    .and_then(|d| u8::try_from(d).ok())
                    .and_then(Cell::from_color_id)
                    .ok_or_else(|| {
                        serde::de::Error::custom(format!("invalid cell {ch:?} at row {y}"))
                    })?;
                cells.push(cell);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }
}

/// Outcome of one line-clear pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearResult {
    /// Number of rows removed.
    pub rows_removed: usize,
    /// Indices of the removed rows in the grid before the clear, top to bottom.
    pub cleared_rows: Vec<usize>,
    /// Score bonus earned, see [`clear_bonus`].
    pub bonus: usize,
    /// Grid after compaction.
    pub grid: Grid,
}
