use crate::core::{PieceKind, Shape};

/// Tracks the active piece type and its orientation.
///
/// Rotation is split into a pure preview and an explicit commit so the
/// caller can test the next orientation against the grid before adopting it.
///
/// # Example
///
/// ```
/// use stackfall_engine::{PieceKind, RotationCursor};
///
/// let mut cursor = RotationCursor::new(PieceKind::T);
/// let (shape, index) = cursor.preview_next();
/// assert_eq!(index, 1);
/// assert_eq!(cursor.index(), 0);
///
/// cursor.commit(index);
/// assert_eq!(cursor.current_shape(), shape);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationCursor {
    kind: PieceKind,
    index: usize,
}

impl RotationCursor {
    /// Creates a cursor for `kind` in its spawn orientation.
    #[must_use]
    pub const fn new(kind: PieceKind) -> Self {
        Self { kind, index: 0 }
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn current_shape(&self) -> Shape {
        self.kind.orientation(self.index)
    }

    /// Returns the next clockwise orientation and its index without
    /// changing the cursor.
    #[must_use]
    pub const fn preview_next(&self) -> (Shape, usize) {
        let next = (self.index + 1) % self.kind.orientation_count();
        (self.kind.orientation(next), next)
    }

    /// Adopts an orientation index, normally one returned by
    /// [`Self::preview_next`].
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid orientation of the current piece.
    pub fn commit(&mut self, index: usize) {
        assert!(
            index < self.kind.orientation_count(),
            "orientation {index} out of range for {:?}",
            self.kind
        );
        self.index = index;
    }

    /// Replaces the piece and resets to the spawn orientation.
    pub fn set_piece(&mut self, kind: PieceKind) {
        self.kind = kind;
        self.index = 0;
    }
}
