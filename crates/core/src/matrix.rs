//! Matrix module - the playfield grid
//!
//! The matrix keeps two grids:
//!
//! - **master**: committed cells only. Every validity check runs against it, so the active
//!   piece can never collide with its own overlay.
//! - **live**: master plus the active piece and its ghost, rebuilt from scratch by
//!   [`Matrix::refresh_live`] whenever the piece changes. Renderers read this one.
//!
//! Rows are stored as fixed arrays including the border padding, so every access made by a
//! piece template stays inside the array. Lookups outside the array return `None` and are
//! treated as blocked.

use arrayvec::ArrayVec;
use log::{debug, warn};

use crate::rng::RandomSource;
use crate::shapes::{cells_at, get_shape, PieceShape};
use crate::tspin::detect_tspin;
use crate::types::{
    Cell, MoveKind, PieceKind, Position, Rotation, TSpinKind, END_COL, FIRST_COL, MATRIX_COLS,
    MATRIX_ROWS, PLAYABLE_ROWS, SKYLINE_ROW, VISIBLE_COLS,
};

/// One matrix row, border padding included
pub type Row = [Cell; MATRIX_COLS];

const fn playable_row(fill: Cell) -> Row {
    let mut row = [Cell::Border; MATRIX_COLS];
    let mut col = FIRST_COL;
    while col < END_COL {
        row[col] = fill;
        col += 1;
    }
    row
}

/// A playable row with nothing in it
pub const EMPTY_ROW: Row = playable_row(Cell::Empty);

const BORDER_ROW: Row = [Cell::Border; MATRIX_COLS];

/// A cleared row as it looked right before removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// Matrix row index before the collapse
    pub row: usize,
    pub cells: [Cell; VISIBLE_COLS],
}

/// Cleared rows of one commit, bottom to top
pub type ClearedLines = ArrayVec<Line, PLAYABLE_ROWS>;

/// Result of committing a piece
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitOutcome {
    pub lines: ClearedLines,
    pub tspin: TSpinKind,
    pub perfect_clear: bool,
}

impl CommitOutcome {
    pub fn lines_cleared(&self) -> usize {
        self.lines.len()
    }
}

/// Fixed-size cell grid with border sentinels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: [Row; MATRIX_ROWS],
}

impl Grid {
    /// Empty playable area surrounded by borders
    pub fn new() -> Self {
        let mut rows = [EMPTY_ROW; MATRIX_ROWS];
        for row in &mut rows[PLAYABLE_ROWS..] {
            *row = BORDER_ROW;
        }
        Self { rows }
    }

    #[inline]
    fn index(row: i16, col: i16) -> Option<(usize, usize)> {
        if row < 0 || col < 0 || row >= MATRIX_ROWS as i16 || col >= MATRIX_COLS as i16 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    /// Cell at (row, col), `None` when outside the matrix
    #[inline]
    pub fn get(&self, row: i16, col: i16) -> Option<Cell> {
        Self::index(row, col).map(|(r, c)| self.rows[r][c])
    }

    /// Whether the cell is in range and not passable
    pub fn is_occupied(&self, row: i16, col: i16) -> bool {
        self.get(row, col).map_or(true, Cell::is_occupied)
    }

    /// Set a playable cell. Border cells and out-of-range coordinates are refused.
    fn set(&mut self, row: i16, col: i16, cell: Cell) -> bool {
        match Self::index(row, col) {
            Some((r, c)) if self.rows[r][c] != Cell::Border => {
                self.rows[r][c] = cell;
                true
            }
            _ => false,
        }
    }

    pub fn row(&self, row: usize) -> &Row {
        &self.rows[row]
    }

    /// The visible columns of a row
    pub fn visible_row(&self, row: usize) -> &[Cell] {
        &self.rows[row][FIRST_COL..END_COL]
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Write compact cell codes for the visible playfield (renderers, hashing)
    pub fn write_u8_grid(&self, out: &mut [[u8; VISIBLE_COLS]]) {
        for (dst, src) in out.iter_mut().zip(self.rows[SKYLINE_ROW..PLAYABLE_ROWS].iter()) {
            for (d, s) in dst.iter_mut().zip(src[FIRST_COL..END_COL].iter()) {
                *d = s.code();
            }
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

fn is_clearable(row: &Row) -> bool {
    row[FIRST_COL..END_COL].iter().all(|cell| cell.is_filled())
}

fn is_garbage(row: &Row) -> bool {
    let solid = row[FIRST_COL..END_COL]
        .iter()
        .filter(|&&cell| cell == Cell::Solid)
        .count();
    solid >= VISIBLE_COLS - 1
}

/// The game matrix: committed master grid plus live render view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    master: Grid,
    live: Grid,
}

impl Matrix {
    /// Create a new empty matrix
    pub fn new() -> Self {
        Self {
            master: Grid::new(),
            live: Grid::new(),
        }
    }

    /// Build a matrix from visible rows, bottom-aligned.
    ///
    /// `.` empty, `#` solid, `*` bomb, piece letters for committed cells.
    /// Returns `None` for malformed input.
    ///
    /// ```
    /// use blockfall_core::Matrix;
    ///
    /// let matrix = Matrix::from_ascii(&["ZZZZZZZZZ."]).unwrap();
    /// assert_eq!(matrix.topmost_filled_row(), Some(23));
    /// ```
    pub fn from_ascii(rows: &[&str]) -> Option<Self> {
        if rows.len() > PLAYABLE_ROWS {
            return None;
        }
        let mut matrix = Self::new();
        let first = PLAYABLE_ROWS - rows.len();
        for (i, text) in rows.iter().enumerate() {
            if text.chars().count() != VISIBLE_COLS {
                return None;
            }
            for (c, ch) in text.chars().enumerate() {
                let cell = match ch {
                    '.' => Cell::Empty,
                    '#' => Cell::Solid,
                    '*' => Cell::Bomb,
                    other => Cell::Piece(PieceKind::from_str(&other.to_string())?),
                };
                matrix
                    .master
                    .set((first + i) as i16, (FIRST_COL + c) as i16, cell);
            }
        }
        matrix.refresh_live();
        Some(matrix)
    }

    /// Clear every playable cell of both grids
    pub fn reset(&mut self) {
        self.master = Grid::new();
        self.live = Grid::new();
    }

    /// Committed cells
    pub fn master(&self) -> &Grid {
        &self.master
    }

    /// Committed cells plus the active piece overlay
    pub fn live(&self) -> &Grid {
        &self.live
    }

    /// Set a committed cell (border cells are refused)
    pub fn set(&mut self, row: i16, col: i16, cell: Cell) -> bool {
        self.master.set(row, col, cell)
    }

    /// Check whether `shape` fits at `position` on the committed grid
    pub fn is_valid(&self, position: Position, shape: &PieceShape) -> bool {
        cells_at(position, shape).all(|(row, col)| {
            self.master
                .get(row, col)
                .is_some_and(|cell| cell.is_passable())
        })
    }

    /// Rebuild the live view from master, dropping any overlay
    pub fn refresh_live(&mut self) {
        self.live.clone_from(&self.master);
    }

    /// Draw a piece (or its ghost) into the live view only
    pub fn insert(&mut self, position: Position, kind: PieceKind, shape: &PieceShape, as_ghost: bool) {
        let cell = if as_ghost {
            Cell::Ghost(kind)
        } else {
            Cell::Piece(kind)
        };
        for (row, col) in cells_at(position, shape) {
            self.live.set(row, col, cell);
        }
    }

    /// Lowest position reachable by straight descent from `position`
    pub fn drop_position(&self, position: Position, shape: &PieceShape) -> Position {
        let mut landing = position;
        while self.is_valid(landing.down(), shape) {
            landing = landing.down();
        }
        landing
    }

    /// Whether every cell of `shape` at `position` is above the first visible row
    pub fn is_above_skyline(&self, position: Position, shape: &PieceShape) -> bool {
        cells_at(position, shape).all(|(row, _)| row < SKYLINE_ROW as i16)
    }

    /// Topmost playable row holding anything, scanning from the top
    pub fn topmost_filled_row(&self) -> Option<usize> {
        (0..PLAYABLE_ROWS).find(|&r| self.master.rows[r] != EMPTY_ROW)
    }

    /// Whether every playable row equals the empty row
    pub fn is_empty(&self) -> bool {
        self.master.rows[..PLAYABLE_ROWS]
            .iter()
            .all(|row| *row == EMPTY_ROW)
    }

    /// Number of rows that `remove_lines` would take out
    pub fn garbage_rows(&self) -> usize {
        self.master.rows[..PLAYABLE_ROWS]
            .iter()
            .filter(|row| is_garbage(row))
            .count()
    }

    /// Write a piece permanently, detect T-Spins, clear full rows.
    ///
    /// T-Spin detection only runs for a T piece whose last move was a rotation.
    pub fn commit(
        &mut self,
        kind: PieceKind,
        rotation: Rotation,
        last_move: MoveKind,
        position: Position,
    ) -> CommitOutcome {
        let shape = get_shape(kind, rotation);
        for (row, col) in cells_at(position, &shape) {
            let written = self.master.set(row, col, Cell::Piece(kind));
            debug_assert!(written, "commit outside the playable area at ({row}, {col})");
        }

        let tspin = if kind == PieceKind::T && last_move == MoveKind::Rotate {
            detect_tspin(&self.master, position, rotation)
        } else {
            TSpinKind::None
        };

        let mut lines = ClearedLines::new();
        self.collapse(is_clearable, |row, cells| {
            let mut visible = [Cell::Empty; VISIBLE_COLS];
            visible.copy_from_slice(&cells[FIRST_COL..END_COL]);
            lines.push(Line {
                row,
                cells: visible,
            });
        });

        let perfect_clear = !lines.is_empty() && self.is_empty();
        self.refresh_live();

        debug!(
            "commit {:?} {:?} at {:?}: {} line(s), tspin {:?}, perfect {}",
            kind,
            rotation,
            position,
            lines.len(),
            tspin,
            perfect_clear
        );

        CommitOutcome {
            lines,
            tspin,
            perfect_clear,
        }
    }

    /// Push the stack up and add up to `count` solid garbage rows at the bottom.
    ///
    /// The bomb column is re-rolled every two rows. Returns the number of rows actually
    /// inserted; zero means there was no room and nothing changed.
    pub fn insert_lines<R: RandomSource + ?Sized>(&mut self, count: usize, rng: &mut R) -> usize {
        let room = self.topmost_filled_row().unwrap_or(PLAYABLE_ROWS);
        let inserted = count.min(room);
        if inserted == 0 {
            if count > 0 {
                warn!("no room for {} garbage line(s)", count);
            }
            return 0;
        }

        // Rows above `room` are empty, so shifting the whole playable block loses nothing.
        self.master.rows.copy_within(inserted..PLAYABLE_ROWS, 0);

        let mut bomb_col = FIRST_COL;
        for i in 0..inserted {
            if i % 2 == 0 {
                bomb_col = FIRST_COL + rng.next_range(VISIBLE_COLS as u32) as usize;
            }
            let mut row = playable_row(Cell::Solid);
            row[bomb_col] = Cell::Bomb;
            self.master.rows[PLAYABLE_ROWS - 1 - i] = row;
        }

        if inserted < count {
            warn!("garbage clamped: {} of {} line(s) fit", inserted, count);
        }
        debug!("inserted {} garbage line(s)", inserted);
        self.refresh_live();
        inserted
    }

    /// Remove every garbage row (solid cells in all but at most one column).
    ///
    /// Returns the number of rows removed.
    pub fn remove_lines(&mut self) -> usize {
        let mut removed = 0;
        self.collapse(is_garbage, |_, _| removed += 1);
        if removed > 0 {
            debug!("removed {} garbage line(s)", removed);
            self.refresh_live();
        }
        removed
    }

    /// Remove all rows matching `cleared` in one bottom-up compaction pass.
    ///
    /// `on_cleared` sees each removed row (bottom to top) before it is overwritten.
    fn collapse(&mut self, cleared: impl Fn(&Row) -> bool, mut on_cleared: impl FnMut(usize, &Row)) {
        let mut write = PLAYABLE_ROWS;

        for read in (0..PLAYABLE_ROWS).rev() {
            if cleared(&self.master.rows[read]) {
                on_cleared(read, &self.master.rows[read]);
            } else {
                write -= 1;
                if write != read {
                    self.master.rows[write] = self.master.rows[read];
                }
            }
        }

        for row in &mut self.master.rows[..write] {
            *row = EMPTY_ROW;
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRng;
    use crate::types::{MATRIX_ROWS, SPAWN_COL, SPAWN_ROW};

    #[test]
    fn test_new_matrix_borders() {
        let matrix = Matrix::new();
        let grid = matrix.master();

        for row in 0..MATRIX_ROWS {
            for col in 0..MATRIX_COLS {
                let cell = grid.row(row)[col];
                let border = row >= PLAYABLE_ROWS || !(FIRST_COL..END_COL).contains(&col);
                assert_eq!(cell == Cell::Border, border, "({row}, {col})");
            }
        }
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_set_refuses_border() {
        let mut matrix = Matrix::new();
        assert!(!matrix.set(0, 0, Cell::Solid));
        assert!(!matrix.set(PLAYABLE_ROWS as i16, 5, Cell::Solid));
        assert!(!matrix.set(-1, 5, Cell::Solid));
        assert!(matrix.set(10, FIRST_COL as i16, Cell::Solid));
    }

    #[test]
    fn test_get_out_of_range() {
        let grid = Grid::new();
        assert_eq!(grid.get(-1, 0), None);
        assert_eq!(grid.get(0, MATRIX_COLS as i16), None);
        assert!(grid.is_occupied(-1, 3));
    }

    #[test]
    fn test_from_ascii_rejects_bad_rows() {
        assert!(Matrix::from_ascii(&["short"]).is_none());
        assert!(Matrix::from_ascii(&["ZZZZZZZZZ?"]).is_none());
    }

    #[test]
    fn test_is_valid_treats_bomb_as_passable() {
        let matrix = Matrix::from_ascii(&["#########*"]).unwrap();
        let dot: PieceShape = [(0, 0), (0, 0), (0, 0), (0, 0)];
        let bomb = Position::new((PLAYABLE_ROWS - 1) as i8, (END_COL - 1) as i8);
        assert!(matrix.is_valid(bomb, &dot));
        assert!(!matrix.is_valid(bomb.left(), &dot));
    }

    #[test]
    fn test_insert_only_touches_live() {
        let mut matrix = Matrix::new();
        let shape = get_shape(PieceKind::T, Rotation::North);
        let pos = Position::new(SPAWN_ROW, SPAWN_COL);

        matrix.insert(pos, PieceKind::T, &shape, false);
        assert!(matrix.is_empty());
        assert_eq!(
            matrix.live().get(SPAWN_ROW as i16, SPAWN_COL as i16 + 1),
            Some(Cell::Piece(PieceKind::T))
        );
        assert!(matrix.is_valid(pos, &shape));

        matrix.refresh_live();
        assert_eq!(matrix.live(), matrix.master());
    }

    #[test]
    fn test_collapse_handles_adjacent_rows() {
        let mut matrix = Matrix::from_ascii(&[
            "J.........",
            "ZZZZZZZZZZ",
            "ZZZZZZZZZZ",
            "..L.......",
        ])
        .unwrap();

        let mut seen = Vec::new();
        matrix.collapse(is_clearable, |row, _| seen.push(row));

        assert_eq!(seen, vec![22, 21]);
        assert_eq!(matrix.master().get(23, FIRST_COL as i16 + 2), Some(Cell::Piece(PieceKind::L)));
        assert_eq!(matrix.master().get(22, FIRST_COL as i16), Some(Cell::Piece(PieceKind::J)));
        assert_eq!(matrix.topmost_filled_row(), Some(22));
    }

    #[test]
    fn test_insert_lines_rerolls_bomb_every_two_rows() {
        let mut matrix = Matrix::new();
        let mut rng = SequenceRng::new(vec![1, 8]);

        assert_eq!(matrix.insert_lines(4, &mut rng), 4);

        let bomb_col = |row: usize| {
            matrix
                .master()
                .visible_row(row)
                .iter()
                .position(|&c| c == Cell::Bomb)
        };
        assert_eq!(bomb_col(23), Some(1));
        assert_eq!(bomb_col(22), Some(1));
        assert_eq!(bomb_col(21), Some(8));
        assert_eq!(bomb_col(20), Some(8));
        assert_eq!(bomb_col(19), None);
        assert_eq!(matrix.garbage_rows(), 4);
    }

    #[test]
    fn test_insert_lines_without_room() {
        let mut rows = vec!["Z........."; PLAYABLE_ROWS];
        rows[PLAYABLE_ROWS - 1] = "ZZZZZ.....";
        let mut matrix = Matrix::from_ascii(&rows).unwrap();
        let before = matrix.clone();

        assert_eq!(matrix.insert_lines(3, &mut SequenceRng::new(vec![0])), 0);
        assert_eq!(matrix, before);
    }

    #[test]
    fn test_write_u8_grid() {
        let matrix = Matrix::from_ascii(&["I#*......."]).unwrap();
        let mut out = [[0u8; VISIBLE_COLS]; 20];
        matrix.master().write_u8_grid(&mut out);
        assert_eq!(&out[19][..4], &[1, 8, 9, 0]);
    }
}
