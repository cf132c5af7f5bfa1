//! Property tests for garbage rows and landing positions
//!
//! - Inserting garbage that fits, then removing it, restores the board exactly.
//! - Inserting more than fits is clamped to the free rows above the stack.
//! - A landing position is stable: dropping again from it goes nowhere.

use proptest::prelude::*;

use blockfall::core::{get_shape, Matrix, SimpleRng};
use blockfall::types::{PieceKind, Position, Rotation, PLAYABLE_ROWS, VISIBLE_COLS};

/// Bottom-aligned board rows made of piece cells and holes (never garbage)
fn board_rows() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::collection::vec(any::<bool>(), VISIBLE_COLS).prop_map(|cells| {
            cells
                .into_iter()
                .map(|filled| if filled { 'J' } else { '.' })
                .collect::<String>()
        }),
        0..16,
    )
}

fn build(rows: &[String]) -> Matrix {
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    Matrix::from_ascii(&rows).unwrap()
}

fn free_rows(matrix: &Matrix) -> usize {
    matrix.topmost_filled_row().unwrap_or(PLAYABLE_ROWS)
}

proptest! {
    #[test]
    fn insert_then_remove_restores_board(
        rows in board_rows(),
        count in 1usize..=PLAYABLE_ROWS,
        seed in any::<u32>(),
    ) {
        let original = build(&rows);
        let count = count.min(free_rows(&original));
        prop_assume!(count > 0);

        let mut matrix = original.clone();
        let mut rng = SimpleRng::new(seed);
        prop_assert_eq!(matrix.insert_lines(count, &mut rng), count);
        prop_assert_eq!(matrix.garbage_rows(), count);

        prop_assert_eq!(matrix.remove_lines(), count);
        prop_assert_eq!(matrix, original);
    }

    #[test]
    fn insert_is_clamped_to_free_rows(
        rows in board_rows(),
        extra in 1usize..10,
        seed in any::<u32>(),
    ) {
        let mut matrix = build(&rows);
        let room = free_rows(&matrix);
        let mut rng = SimpleRng::new(seed);

        prop_assert_eq!(matrix.insert_lines(room + extra, &mut rng), room);
        if room > 0 {
            prop_assert_eq!(matrix.topmost_filled_row(), Some(0));
        }
        prop_assert_eq!(matrix.insert_lines(1, &mut rng), 0);
    }

    #[test]
    fn drop_position_is_a_resting_place(
        rows in board_rows(),
        kind in 0usize..7,
        rotation in 0usize..4,
        col in 0i8..12,
    ) {
        let matrix = build(&rows);
        let shape = get_shape(PieceKind::ALL[kind], Rotation::from_index(rotation));
        let start = Position::new(0, col);
        prop_assume!(matrix.is_valid(start, &shape));

        let landing = matrix.drop_position(start, &shape);
        prop_assert!(landing.row >= start.row);
        prop_assert_eq!(landing.col, start.col);
        prop_assert!(matrix.is_valid(landing, &shape));
        prop_assert!(!matrix.is_valid(landing.down(), &shape));
        prop_assert_eq!(matrix.drop_position(landing, &shape), landing);
    }
}
