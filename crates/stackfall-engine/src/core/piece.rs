use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::grid::Cell;

/// Side length of every orientation template.
pub const SHAPE_SIZE: usize = 4;

/// Enum representing the type of piece.
///
/// The discriminant doubles as the piece's color id, which is what the
/// [`Grid`](super::grid::Grid) stores for locked cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 1,
    /// J-piece.
    J = 2,
    /// L-piece.
    L = 3,
    /// O-piece.
    O = 4,
    /// S-piece.
    S = 5,
    /// T-piece.
    T = 6,
    /// Z-piece.
    Z = 7,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece types, ordered by color id.
    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Returns the color id (1-7) this piece writes into the grid.
    #[must_use]
    pub const fn color_id(self) -> u8 {
        self as u8
    }

    /// Looks up the piece type owning a color id.
    #[must_use]
    pub const fn from_color_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(PieceKind::I),
            2 => Some(PieceKind::J),
            3 => Some(PieceKind::L),
            4 => Some(PieceKind::O),
            5 => Some(PieceKind::S),
            6 => Some(PieceKind::T),
            7 => Some(PieceKind::Z),
            _ => None,
        }
    }

    const fn table_index(self) -> usize {
        self as usize - 1
    }

    /// Number of distinct orientations of this piece.
    #[must_use]
    pub const fn orientation_count(self) -> usize {
        PIECE_ORIENTATIONS[self.table_index()].len()
    }

    /// Returns a copy of the orientation template at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.orientation_count()`.
    #[must_use]
    pub const fn orientation(self, index: usize) -> Shape {
        PIECE_ORIENTATIONS[self.table_index()][index]
    }

    /// Returns a copy of the spawn orientation.
    #[must_use]
    pub const fn base_shape(self) -> Shape {
        self.orientation(0)
    }

    /// Returns copies of every orientation template, in rotation order.
    pub fn orientations(self) -> impl Iterator<Item = Shape> {
        PIECE_ORIENTATIONS[self.table_index()].iter().copied()
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'T' => Some(PieceKind::T),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }
}

/// A 4×4 orientation template.
///
/// Row `r`, column `c` of the template lands on grid cell `(x + c, y + r)`
/// when the template is anchored at `(x, y)`. Shapes are plain values: every
/// accessor hands out a copy, so a caller can never mutate the piece tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape {
    cells: [[Cell; SHAPE_SIZE]; SHAPE_SIZE],
}

impl Shape {
    /// A template with no occupied cells.
    pub const EMPTY: Self = Self {
        cells: [[Cell::Empty; SHAPE_SIZE]; SHAPE_SIZE],
    };

    #[must_use]
    pub const fn new(cells: [[Cell; SHAPE_SIZE]; SHAPE_SIZE]) -> Self {
        Self { cells }
    }

    /// A template holding exactly one cell of `kind` at its top-left corner.
    #[must_use]
    pub const fn single(kind: PieceKind) -> Self {
        let mut cells = [[Cell::Empty; SHAPE_SIZE]; SHAPE_SIZE];
        cells[0][0] = Cell::Piece(kind);
        Self { cells }
    }

    #[must_use]
    pub const fn cells(&self) -> [[Cell; SHAPE_SIZE]; SHAPE_SIZE] {
        self.cells
    }

    #[must_use]
    pub const fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|cell| cell.is_empty())
    }

    /// Returns `(row, col, kind)` for every occupied cell, in row-major order.
    #[must_use]
    pub fn occupied_cells(&self) -> ArrayVec<(usize, usize, PieceKind), { SHAPE_SIZE * SHAPE_SIZE }> {
        let mut occupied = ArrayVec::new();
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if let Cell::Piece(kind) = *cell {
                    occupied.push((row, col, kind));
                }
            }
        }
        occupied
    }

    /// Returns the template as raw color ids (0 = empty).
    #[must_use]
    pub fn color_ids(&self) -> [[u8; SHAPE_SIZE]; SHAPE_SIZE] {
        self.cells.map(|row| row.map(Cell::color_id))
    }
}

/// Anchor of a piece template on the grid.
///
/// The anchor is the grid coordinate of the template's top-left cell. It may
/// be negative or past the right edge as long as the occupied cells stay on
/// the grid (a vertical I-piece hugging the left wall is anchored at
/// `x = -1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PiecePosition {
    pub x: i32,
    pub y: i32,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the position shifted by `(dx, dy)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

const PIECE_ORIENTATIONS: [&[Shape]; PieceKind::LEN] = {
    use Cell::Empty as E;
    const I: Cell = Cell::Piece(PieceKind::I);
    const J: Cell = Cell::Piece(PieceKind::J);
    const L: Cell = Cell::Piece(PieceKind::L);
    const O: Cell = Cell::Piece(PieceKind::O);
    const S: Cell = Cell::Piece(PieceKind::S);
    const T: Cell = Cell::Piece(PieceKind::T);
    const Z: Cell = Cell::Piece(PieceKind::Z);
    const EEEE: [Cell; 4] = [E; 4];
    [
        // I-piece
        &[
            Shape::new([EEEE, [I, I, I, I], EEEE, EEEE]),
            Shape::new([[E, I, E, E], [E, I, E, E], [E, I, E, E], [E, I, E, E]]),
        ],
        // J-piece
        &[
            Shape::new([EEEE, [J, J, J, E], [E, E, J, E], EEEE]),
            Shape::new([EEEE, [E, J, J, E], [E, J, E, E], [E, J, E, E]]),
            Shape::new([EEEE, [E, J, E, E], [E, J, J, J], EEEE]),
            Shape::new([[E, E, J, E], [E, E, J, E], [E, J, J, E], EEEE]),
        ],
        // L-piece
        &[
            Shape::new([EEEE, [E, L, L, L], [E, L, E, E], EEEE]),
            Shape::new([EEEE, [E, L, L, E], [E, E, L, E], [E, E, L, E]]),
            Shape::new([EEEE, [E, E, L, E], [L, L, L, E], EEEE]),
            Shape::new([[E, L, E, E], [E, L, E, E], [E, L, L, E], EEEE]),
        ],
        // O-piece
        &[Shape::new([EEEE, [E, O, O, E], [E, O, O, E], EEEE])],
        // S-piece
        &[
            Shape::new([EEEE, [E, S, S, E], [S, S, E, E], EEEE]),
            Shape::new([[S, E, E, E], [S, S, E, E], [E, S, E, E], EEEE]),
        ],
        // T-piece
        &[
            Shape::new([EEEE, [T, T, T, E], [E, T, E, E], EEEE]),
            Shape::new([[E, T, E, E], [E, T, T, E], [E, T, E, E], EEEE]),
            Shape::new([[E, T, E, E], [T, T, T, E], EEEE, EEEE]),
            Shape::new([[E, T, E, E], [T, T, E, E], [E, T, E, E], EEEE]),
        ],
        // Z-piece
        &[
            Shape::new([EEEE, [Z, Z, E, E], [E, Z, Z, E], EEEE]),
            Shape::new([[E, Z, E, E], [Z, Z, E, E], [Z, E, E, E], EEEE]),
        ],
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_counts() {
        assert_eq!(PieceKind::I.orientation_count(), 2);
        assert_eq!(PieceKind::O.orientation_count(), 1);
        assert_eq!(PieceKind::S.orientation_count(), 2);
        assert_eq!(PieceKind::Z.orientation_count(), 2);
        assert_eq!(PieceKind::J.orientation_count(), 4);
        assert_eq!(PieceKind::L.orientation_count(), 4);
        assert_eq!(PieceKind::T.orientation_count(), 4);
    }

    #[test]
    fn test_every_orientation_has_four_cells_of_own_color() {
        for kind in PieceKind::ALL {
            for shape in kind.orientations() {
                let occupied = shape.occupied_cells();
                assert_eq!(occupied.len(), 4, "{kind:?} orientation must have 4 cells");
                assert!(occupied.iter().all(|&(_, _, k)| k == kind));
            }
        }
    }

    #[test]
    fn test_color_ids_are_stable() {
        let ids: Vec<u8> = PieceKind::ALL.iter().map(|k| k.color_id()).collect();
        assert_eq!(ids, [1, 2, 3, 4, 5, 6, 7]);
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_color_id(kind.color_id()), Some(kind));
        }
        assert_eq!(PieceKind::from_color_id(0), None);
        assert_eq!(PieceKind::from_color_id(8), None);
    }

    #[test]
    fn test_base_shape_matches_first_orientation() {
        for kind in PieceKind::ALL {
            assert_eq!(kind.base_shape(), kind.orientation(0));
        }
        assert_eq!(
            PieceKind::T.base_shape().color_ids(),
            [[0, 0, 0, 0], [6, 6, 6, 0], [0, 6, 0, 0], [0, 0, 0, 0]]
        );
    }

    #[test]
    fn test_shape_copies_do_not_alias_tables() {
        let mut cells = PieceKind::I.base_shape().cells();
        cells[1][0] = Cell::Empty;
        let _ = Shape::new(cells);
        assert_eq!(PieceKind::I.base_shape().occupied_cells().len(), 4);
    }

    #[test]
    fn test_single_shape() {
        let shape = Shape::single(PieceKind::L);
        assert_eq!(shape.occupied_cells().as_slice(), &[(0, 0, PieceKind::L)]);
        assert!(!shape.is_empty());
        assert!(Shape::EMPTY.is_empty());
    }

    #[test]
    fn test_shape_serialization() {
        let json = serde_json::to_string(&PieceKind::O.base_shape()).unwrap();
        assert_eq!(json, "[[0,0,0,0],[0,4,4,0],[0,4,4,0],[0,0,0,0]]");
        let shape: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(shape, PieceKind::O.base_shape());
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('x'), None);
    }
}
