//! Placement helper - rotate, shift and hard-drop the active piece in one call
//!
//! Used by scripted players and bots. The target column is the visible column (0..10) of
//! the piece's leftmost mino in the target rotation.

use blockfall_core::shapes::column_span;
use blockfall_core::{Player, PlayerStatus, RandomSource};
use blockfall_types::{GameAction, Rotation, FIRST_COL, VISIBLE_COLS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceError {
    HoldUnavailable,
    RotationBlocked,
    ColOutOfBounds,
    ColBlocked,
    NotPlayable,
    NoActive,
}

impl PlaceError {
    pub fn code(self) -> &'static str {
        match self {
            PlaceError::HoldUnavailable => "hold_unavailable",
            PlaceError::RotationBlocked
            | PlaceError::ColOutOfBounds
            | PlaceError::ColBlocked
            | PlaceError::NotPlayable
            | PlaceError::NoActive => "invalid_place",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlaceError::HoldUnavailable => "hold requested when unavailable",
            PlaceError::RotationBlocked => "could not rotate to target rotation",
            PlaceError::ColOutOfBounds => "target column would place piece out of bounds",
            PlaceError::ColBlocked => "could not move to target column due to collision",
            PlaceError::NotPlayable => "game is not playable",
            PlaceError::NoActive => "no active piece",
        }
    }
}

impl std::fmt::Display for PlaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for PlaceError {}

/// Rotate, shift and hard-drop the active piece. On error the piece is left where it was
/// after the optional hold.
pub fn apply_place<R: RandomSource + Clone>(
    player: &mut Player<R>,
    target_col: i8,
    target_rot: Rotation,
    use_hold: bool,
) -> Result<(), PlaceError> {
    if player.paused() || player.status() != PlayerStatus::Playing {
        return Err(PlaceError::NotPlayable);
    }

    // Hold first if requested.
    if use_hold && !player.apply_action(GameAction::Hold) {
        return Err(PlaceError::HoldUnavailable);
    }

    let Some(active) = player.sprite() else {
        return Err(PlaceError::NoActive);
    };

    // Try CW/CCW plans including 180; keep shorter first.
    let cur = active.rotation().index() as i8;
    let tgt = target_rot.index() as i8;
    let cw = (tgt - cur).rem_euclid(4) as u8;
    let ccw = (cur - tgt).rem_euclid(4) as u8;

    let mut plans: [(GameAction, u8); 2] = [(GameAction::RotateCw, cw), (GameAction::RotateCcw, ccw)];
    if plans[1].1 < plans[0].1 {
        plans.swap(0, 1);
    }

    let snapshot = player.clone();
    let mut rotated = false;
    for (action, steps) in plans {
        *player = snapshot.clone();
        if (0..steps).all(|_| player.apply_action(action)) {
            rotated = true;
            break;
        }
    }
    if !rotated {
        *player = snapshot;
        return Err(PlaceError::RotationBlocked);
    }

    let Some(active) = player.sprite() else {
        *player = snapshot;
        return Err(PlaceError::NoActive);
    };
    if active.rotation() != target_rot {
        *player = snapshot;
        return Err(PlaceError::RotationBlocked);
    }

    // Validate the column range based on the rotated shape.
    let (min_dc, max_dc) = column_span(&active.shape());
    let col = i16::from(target_col);
    if col < 0 || col + i16::from(max_dc - min_dc) >= VISIBLE_COLS as i16 {
        *player = snapshot;
        return Err(PlaceError::ColOutOfBounds);
    }

    let anchor_col = FIRST_COL as i16 + col - i16::from(min_dc);
    let dc = anchor_col - i16::from(active.position().col);
    let step = if dc > 0 {
        GameAction::MoveRight
    } else {
        GameAction::MoveLeft
    };
    for _ in 0..dc.unsigned_abs() {
        if !player.apply_action(step) {
            *player = snapshot;
            return Err(PlaceError::ColBlocked);
        }
    }

    if !player.apply_action(GameAction::HardDrop) {
        return Err(if player.sprite().is_none() {
            PlaceError::NoActive
        } else {
            PlaceError::NotPlayable
        });
    }

    Ok(())
}
