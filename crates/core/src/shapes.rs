//! Shapes module - tetromino rotation templates and the T-Spin kernel
//!
//! Every piece is described inside a 4x4 template anchored at its top-left corner.
//! Offsets are `(row, col)` with rows growing downwards, matching matrix coordinates.
//!
//! There is no wall-kick table: a rotation either fits at the current anchor or is rejected.

use crate::types::{PieceKind, Position, Rotation};

/// Offset of a single mino relative to the piece anchor, as `(row, col)`
pub type MinoOffset = (i8, i8);

/// Shape of a piece - 4 mino offsets from the anchor
pub type PieceShape = [MinoOffset; 4];

/// Get the shape (mino offsets) for a piece kind and rotation
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    match kind {
        PieceKind::I => get_i_shape(rotation),
        PieceKind::O => get_o_shape(rotation),
        PieceKind::T => get_t_shape(rotation),
        PieceKind::S => get_s_shape(rotation),
        PieceKind::Z => get_z_shape(rotation),
        PieceKind::J => get_j_shape(rotation),
        PieceKind::L => get_l_shape(rotation),
    }
}

fn get_i_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(1, 0), (1, 1), (1, 2), (1, 3)],
        Rotation::East => [(0, 2), (1, 2), (2, 2), (3, 2)],
        Rotation::South => [(2, 0), (2, 1), (2, 2), (2, 3)],
        Rotation::West => [(0, 1), (1, 1), (2, 1), (3, 1)],
    }
}

/// Same cells for every rotation
fn get_o_shape(_rotation: Rotation) -> PieceShape {
    [(0, 1), (0, 2), (1, 1), (1, 2)]
}

/// T piece shapes. The "point" faces up at North and turns clockwise.
fn get_t_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(0, 1), (1, 0), (1, 1), (1, 2)],
        Rotation::East => [(0, 1), (1, 1), (1, 2), (2, 1)],
        Rotation::South => [(1, 0), (1, 1), (1, 2), (2, 1)],
        Rotation::West => [(0, 1), (1, 0), (1, 1), (2, 1)],
    }
}

fn get_s_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(0, 1), (0, 2), (1, 0), (1, 1)],
        Rotation::East => [(0, 1), (1, 1), (1, 2), (2, 2)],
        Rotation::South => [(1, 1), (1, 2), (2, 0), (2, 1)],
        Rotation::West => [(0, 0), (1, 0), (1, 1), (2, 1)],
    }
}

fn get_z_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(0, 0), (0, 1), (1, 1), (1, 2)],
        Rotation::East => [(0, 2), (1, 1), (1, 2), (2, 1)],
        Rotation::South => [(1, 0), (1, 1), (2, 1), (2, 2)],
        Rotation::West => [(0, 1), (1, 0), (1, 1), (2, 0)],
    }
}

fn get_j_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(0, 0), (1, 0), (1, 1), (1, 2)],
        Rotation::East => [(0, 1), (0, 2), (1, 1), (2, 1)],
        Rotation::South => [(1, 0), (1, 1), (1, 2), (2, 2)],
        Rotation::West => [(0, 1), (1, 1), (2, 0), (2, 1)],
    }
}

fn get_l_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(0, 2), (1, 0), (1, 1), (1, 2)],
        Rotation::East => [(0, 1), (1, 1), (2, 1), (2, 2)],
        Rotation::South => [(1, 0), (1, 1), (1, 2), (2, 0)],
        Rotation::West => [(0, 0), (0, 1), (1, 1), (2, 1)],
    }
}

/// Absolute cells covered by `shape` anchored at `position`
pub fn cells_at(position: Position, shape: &PieceShape) -> impl Iterator<Item = (i16, i16)> + '_ {
    shape.iter().map(move |&(dr, dc)| {
        (
            position.row as i16 + dr as i16,
            position.col as i16 + dc as i16,
        )
    })
}

/// Leftmost and rightmost column offsets used by a shape
pub fn column_span(shape: &PieceShape) -> (i8, i8) {
    let mut min_dc = i8::MAX;
    let mut max_dc = i8::MIN;
    for &(_, dc) in shape {
        min_dc = min_dc.min(dc);
        max_dc = max_dc.max(dc);
    }
    (min_dc, max_dc)
}

/// Marker in the T-Spin detection kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelMark {
    Blank,
    /// Corner on the side the T points to
    Corner,
    /// Corner behind the flat side of the T
    MiniCorner,
}

/// 3x3 kernel laid over the T piece's bounding box
pub type TSpinKernel = [[KernelMark; 3]; 3];

const B: KernelMark = KernelMark::Blank;
const C: KernelMark = KernelMark::Corner;
const M: KernelMark = KernelMark::MiniCorner;

const KERNEL_NORTH: TSpinKernel = [[C, B, C], [B, B, B], [M, B, M]];
const KERNEL_EAST: TSpinKernel = [[M, B, C], [B, B, B], [M, B, C]];
const KERNEL_SOUTH: TSpinKernel = [[M, B, M], [B, B, B], [C, B, C]];
const KERNEL_WEST: TSpinKernel = [[C, B, M], [B, B, B], [C, B, M]];

/// T-Spin kernel for a rotation, aligned with the T templates above
pub fn tspin_kernel(rotation: Rotation) -> &'static TSpinKernel {
    match rotation {
        Rotation::North => &KERNEL_NORTH,
        Rotation::East => &KERNEL_EAST,
        Rotation::South => &KERNEL_SOUTH,
        Rotation::West => &KERNEL_WEST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shape_has_four_distinct_cells() {
        for kind in PieceKind::ALL {
            for i in 0..4 {
                let shape = get_shape(kind, Rotation::from_index(i));
                for (a, cell) in shape.iter().enumerate() {
                    assert!(cell.0 < 4 && cell.1 < 4 && cell.0 >= 0 && cell.1 >= 0);
                    assert!(!shape[a + 1..].contains(cell), "{kind:?} has duplicate cell");
                }
            }
        }
    }

    #[test]
    fn test_kernel_markers_avoid_t_cells() {
        for i in 0..4 {
            let rotation = Rotation::from_index(i);
            let kernel = tspin_kernel(rotation);
            let shape = get_shape(PieceKind::T, rotation);

            let mut corners = 0;
            let mut minis = 0;
            for (r, row) in kernel.iter().enumerate() {
                for (c, mark) in row.iter().enumerate() {
                    match mark {
                        KernelMark::Corner => corners += 1,
                        KernelMark::MiniCorner => minis += 1,
                        KernelMark::Blank => continue,
                    }
                    assert!(!shape.contains(&(r as i8, c as i8)));
                }
            }
            assert_eq!((corners, minis), (2, 2));
        }
    }

    #[test]
    fn test_corners_flank_the_point() {
        // The mino opposite the flat side sits between the two front corners.
        let shape = get_shape(PieceKind::T, Rotation::South);
        assert!(shape.contains(&(2, 1)));
        let kernel = tspin_kernel(Rotation::South);
        assert_eq!(kernel[2][0], KernelMark::Corner);
        assert_eq!(kernel[2][2], KernelMark::Corner);
    }

    #[test]
    fn test_column_span() {
        assert_eq!(column_span(&get_shape(PieceKind::I, Rotation::North)), (0, 3));
        assert_eq!(column_span(&get_shape(PieceKind::I, Rotation::East)), (2, 2));
        assert_eq!(column_span(&get_shape(PieceKind::O, Rotation::West)), (1, 2));
    }
}
