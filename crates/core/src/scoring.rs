//! Scoring module - line clears, T-Spins, combos and back-to-back
//!
//! [`calculate_score`] is a pure function: the caller owns the [`ScoreState`] counters and
//! passes the level in as a plain number. Nothing here reaches back into the session.
//!
//! Rules applied on a lock:
//! - A lock clearing no lines resets both counters (a T-Spin with no lines still scores its
//!   zero-line table entry).
//! - Plain clears use `LINE_SCORES`; a Tetris extends back-to-back and, from the second one
//!   on, earns `B2B_TETRIS_BONUS`.
//! - T-Spins use `TSPIN_SCORES` / `TSPIN_MINI_SCORES`. A full T-Spin that clears lines
//!   extends back-to-back and, from the second one on, earns `B2B_TSPIN_BONUS`.
//! - Every clear extends the combo. From the second consecutive clear on it earns
//!   `(combo - 1) * COMBO_STEP` and resets back-to-back.
//! - Base and combo points are multiplied by the level (at least 1).
//!
//! Drop points are reported separately and never touch the counters.

use arrayvec::ArrayVec;

use crate::types::{
    ComboKind, MoveTag, TSpinKind, B2B_TETRIS_BONUS, B2B_TSPIN_BONUS, COMBO_STEP,
    HARD_DROP_POINTS, LINE_SCORES, SOFT_DROP_POINTS, TSPIN_MINI_SCORES, TSPIN_SCORES,
};

/// Combo and back-to-back counters carried between locks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreState {
    pub combo: u32,
    pub back_to_back: u32,
}

/// What is being scored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreAction {
    /// Rows travelled by a soft or hard drop
    Drop { cells: u32, hard: bool },
    /// A piece lock and what it cleared
    Lock {
        lines: usize,
        tspin: TSpinKind,
        perfect_clear: bool,
    },
}

/// Tags describing a scored move, at most one per category
pub type MoveTags = ArrayVec<MoveTag, 5>;

/// Score calculation result
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Clear points including back-to-back bonus, level-scaled
    pub base: u32,
    /// Combo points, level-scaled
    pub combo_bonus: u32,
    pub combo_kind: ComboKind,
    /// Soft/hard drop points (not level-scaled)
    pub drop_points: u32,
    pub total: u32,
    pub tags: MoveTags,
    /// Counters after this event
    pub state: ScoreState,
}

/// Calculate drop score
/// soft_drop: +1 per cell
/// hard_drop: +2 per cell
pub fn calculate_drop_score(cells: u32, is_hard_drop: bool) -> u32 {
    if is_hard_drop {
        cells * HARD_DROP_POINTS
    } else {
        cells * SOFT_DROP_POINTS
    }
}

/// Check if this clear extends back-to-back
/// B2B applies to: T-spin full with any lines, or Tetris (4 lines)
pub fn qualifies_for_b2b(tspin: TSpinKind, lines: usize) -> bool {
    matches!(
        (tspin, lines),
        (TSpinKind::Full, 1..=4) | // T-spin full with lines
        (TSpinKind::None, 4) // Tetris
    )
}

/// Base points for a clear before bonuses and level scaling
pub fn base_points(lines: usize, tspin: TSpinKind) -> u32 {
    match tspin {
        TSpinKind::Full => TSPIN_SCORES[lines.min(3)],
        TSpinKind::Mini => TSPIN_MINI_SCORES[lines.min(3)],
        TSpinKind::None => LINE_SCORES[lines.min(4)],
    }
}

/// Score one event and return the updated counters
pub fn calculate_score(action: ScoreAction, level: u32, state: ScoreState) -> ScoreResult {
    let (lines, tspin, perfect_clear) = match action {
        ScoreAction::Drop { cells, hard } => {
            let drop_points = calculate_drop_score(cells, hard);
            return ScoreResult {
                drop_points,
                total: drop_points,
                state,
                ..ScoreResult::default()
            };
        }
        ScoreAction::Lock {
            lines,
            tspin,
            perfect_clear,
        } => (lines, tspin, perfect_clear),
    };

    let multiplier = level.max(1);
    let mut state = state;
    let mut tags = MoveTags::new();
    match tspin {
        TSpinKind::Full => tags.push(MoveTag::TSpin),
        TSpinKind::Mini => tags.push(MoveTag::TSpinMini),
        TSpinKind::None => {}
    }

    if lines == 0 {
        state = ScoreState::default();
        let base = base_points(0, tspin) * multiplier;
        return ScoreResult {
            base,
            total: base,
            tags,
            state,
            ..ScoreResult::default()
        };
    }

    if let Some(tag) = MoveTag::for_lines(lines) {
        tags.push(tag);
    }
    if perfect_clear {
        tags.push(MoveTag::PerfectClear);
    }

    let mut base = base_points(lines, tspin);
    let mut combo_kind = ComboKind::None;
    if qualifies_for_b2b(tspin, lines) {
        state.back_to_back += 1;
        if state.back_to_back > 1 {
            if tspin == TSpinKind::Full {
                base += B2B_TSPIN_BONUS[lines.min(3)];
                combo_kind = ComboKind::B2BTSpin;
            } else {
                base += B2B_TETRIS_BONUS;
                combo_kind = ComboKind::B2BTetris;
            }
            tags.push(MoveTag::BackToBack);
        }
    }

    state.combo += 1;
    let mut combo_bonus = 0;
    if state.combo > 1 {
        combo_bonus = (state.combo - 1) * COMBO_STEP;
        state.back_to_back = 0;
        if combo_kind == ComboKind::None {
            combo_kind = ComboKind::Combo;
        }
        tags.push(MoveTag::Combo);
    }

    let base = base * multiplier;
    let combo_bonus = combo_bonus * multiplier;
    ScoreResult {
        base,
        combo_bonus,
        combo_kind,
        drop_points: 0,
        total: base + combo_bonus,
        tags,
        state,
    }
}
