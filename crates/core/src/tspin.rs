//! T-Spin detection
//!
//! The 3x3 kernel for the lock rotation is laid over the T's bounding box. Front corners
//! flank the point of the T, back corners sit behind its flat side.
//!
//! | Front corners hit | Back corners hit | Result |
//! |-------------------|------------------|--------|
//! | 2 | 1 or 2 | `Full` |
//! | 1 | 2 | `Mini` |
//! | anything else | | `None` |
//!
//! Cells outside the matrix count as occupied. Callers only ask for T pieces locked by a
//! rotation; [`crate::Matrix::commit`] enforces that.

use crate::matrix::Grid;
use crate::shapes::{tspin_kernel, KernelMark};
use crate::types::{Position, Rotation, TSpinKind};

/// Classify a lock at `position` with `rotation` against the committed grid
pub fn detect_tspin(grid: &Grid, position: Position, rotation: Rotation) -> TSpinKind {
    let (corners, minis) = count_corners(grid, position, rotation);

    match (corners, minis) {
        (2, m) if m >= 1 => TSpinKind::Full,
        (1, m) if m >= 2 => TSpinKind::Mini,
        _ => TSpinKind::None,
    }
}

/// Occupied (front, back) kernel corners
pub fn count_corners(grid: &Grid, position: Position, rotation: Rotation) -> (usize, usize) {
    let mut corners = 0;
    let mut minis = 0;

    for (dr, marks) in tspin_kernel(rotation).iter().enumerate() {
        for (dc, mark) in marks.iter().enumerate() {
            let row = position.row as i16 + dr as i16;
            let col = position.col as i16 + dc as i16;
            match mark {
                KernelMark::Corner if grid.is_occupied(row, col) => corners += 1,
                KernelMark::MiniCorner if grid.is_occupied(row, col) => minis += 1,
                _ => {}
            }
        }
    }

    (corners, minis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;
    use crate::types::FIRST_COL;

    const COL: i8 = (FIRST_COL + 3) as i8;

    fn matrix(rows: &[&str]) -> Matrix {
        Matrix::from_ascii(rows).expect("valid fixture")
    }

    #[test]
    fn test_full_pocket() {
        // South-facing T with its stem in the gap at visible column 4, roofed on the left
        let m = matrix(&["ZZZZ......", "ZZZ...ZZZZ", "ZZZZ.ZZZZZ"]);
        let pos = Position::new(21, COL);
        assert_eq!(count_corners(m.master(), pos, Rotation::South), (2, 1));
        assert_eq!(detect_tspin(m.master(), pos, Rotation::South), TSpinKind::Full);
    }

    #[test]
    fn test_mini_pocket() {
        let m = matrix(&["...Z.Z....", "..........", "...Z......"]);
        let pos = Position::new(21, COL);
        assert_eq!(count_corners(m.master(), pos, Rotation::South), (1, 2));
        assert_eq!(detect_tspin(m.master(), pos, Rotation::South), TSpinKind::Mini);
    }

    #[test]
    fn test_open_pocket() {
        let m = matrix(&["...Z......", "..........", ".........."]);
        let pos = Position::new(21, COL);
        assert_eq!(detect_tspin(m.master(), pos, Rotation::South), TSpinKind::None);
    }

    #[test]
    fn test_front_corners_alone_are_not_a_spin() {
        // Both front corners but no back corner is not a spin
        let m = matrix(&["..........", "..........", "...Z.Z...."]);
        let pos = Position::new(21, COL);
        assert_eq!(count_corners(m.master(), pos, Rotation::South), (2, 0));
        assert_eq!(detect_tspin(m.master(), pos, Rotation::South), TSpinKind::None);
    }

    #[test]
    fn test_out_of_range_counts_as_occupied() {
        // West-facing T against the left wall: both front corners are border cells.
        let m = Matrix::new();
        let pos = Position::new(21, (FIRST_COL - 1) as i8);
        assert_eq!(count_corners(m.master(), pos, Rotation::West), (2, 0));

        let pos = Position::new(21, (FIRST_COL - 2) as i8);
        let (_, minis) = count_corners(m.master(), pos, Rotation::East);
        assert_eq!(minis, 2);
    }
}
