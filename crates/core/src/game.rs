//! Game module - one player's match
//!
//! This module ties together all core components: matrix, sprite, bag, hold, scoring and
//! the level policy. It owns the order of operations around a lock:
//!
//! 1. The sprite commits and reports the outcome.
//! 2. Score and level are updated, events are queued.
//! 3. Pending garbage is inserted unless the lock cleared lines, then the next piece spawns
//!    with `got_lines` set if any garbage arrived.
//!
//! Presentation and network layers read the queued [`GameEvent`]s with
//! [`Player::drain_events`]; the session never calls out.

use log::{debug, info, warn};

use crate::config::{GameMode, RulesConfig};
use crate::level::{calculate_level, GravityPolicy};
use crate::matrix::{ClearedLines, CommitOutcome, Matrix};
use crate::rng::{PieceQueue, RandomSource, SimpleRng};
use crate::scoring::{calculate_score, ScoreAction, ScoreResult, ScoreState};
use crate::sprite::{Sprite, SpriteState};
use crate::types::{GameAction, PieceKind, TSpinKind};

/// Salt mixed into the seed for the garbage RNG so bag and garbage streams differ
const GARBAGE_SEED_SALT: u32 = 0x9E37_79B9;

/// One held piece, swappable once per spawned piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldSlot {
    held: Option<PieceKind>,
    can_hold: bool,
}

impl HoldSlot {
    pub fn new() -> Self {
        Self {
            held: None,
            can_hold: true,
        }
    }

    pub fn held(&self) -> Option<PieceKind> {
        self.held
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    /// Store `current` and return what was held before (`None` means draw from the queue).
    pub fn swap(&mut self, current: PieceKind) -> Option<PieceKind> {
        debug_assert!(self.can_hold, "hold used twice for one piece");
        self.can_hold = false;
        self.held.replace(current)
    }

    /// Re-arm after a lock
    pub fn unlock(&mut self) {
        self.can_hold = true;
    }
}

impl Default for HoldSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Ready,
    Playing,
    GameOver,
    KnockedOut,
}

/// Things that happened since the last drain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Spawned {
        piece_id: u32,
        kind: PieceKind,
    },
    Locked {
        kind: PieceKind,
        tspin: TSpinKind,
        lines: usize,
    },
    LinesCleared {
        lines: ClearedLines,
        perfect_clear: bool,
    },
    Score(ScoreResult),
    LevelUp {
        level: u32,
    },
    GarbageInserted {
        requested: u32,
        inserted: u32,
    },
    GarbageRemoved {
        lines: u32,
    },
    Held {
        kind: PieceKind,
    },
    GameOver,
    KnockedOut,
}

/// A single player's board, active piece and counters
#[derive(Debug, Clone)]
pub struct Player<R = SimpleRng> {
    config: RulesConfig,
    matrix: Matrix,
    sprite: Option<Sprite>,
    queue: PieceQueue<R>,
    garbage_rng: R,
    hold: HoldSlot,
    score_state: ScoreState,
    score: u32,
    lines: u32,
    level: u32,
    pending_garbage: u32,
    paused: bool,
    status: PlayerStatus,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    /// Monotonic id for spawned pieces (increments only on successful spawn).
    piece_id: u32,
    events: Vec<GameEvent>,
}

impl Player<SimpleRng> {
    /// Create a new player with the given RNG seed
    pub fn new(config: RulesConfig, seed: u32) -> Self {
        Self::with_sources(
            config,
            SimpleRng::new(seed),
            SimpleRng::new(seed ^ GARBAGE_SEED_SALT),
        )
    }
}

impl<R: RandomSource> Player<R> {
    /// Create a player with injected random sources for the bag and for garbage holes
    pub fn with_sources(config: RulesConfig, piece_rng: R, garbage_rng: R) -> Self {
        let level = calculate_level(config.start_level, 0, config.lines_per_level);
        Self {
            config,
            matrix: Matrix::new(),
            sprite: None,
            queue: PieceQueue::new(piece_rng),
            garbage_rng,
            hold: HoldSlot::new(),
            score_state: ScoreState::default(),
            score: 0,
            lines: 0,
            level,
            pending_garbage: 0,
            paused: false,
            status: PlayerStatus::Ready,
            episode_id: 0,
            piece_id: 0,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        matches!(
            self.status,
            PlayerStatus::GameOver | PlayerStatus::KnockedOut
        )
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score_state(&self) -> ScoreState {
        self.score_state
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold.held()
    }

    pub fn can_hold(&self) -> bool {
        self.config.hold_enabled && self.hold.can_hold()
    }

    /// Upcoming pieces, as many as the rules show
    pub fn preview(&self) -> &[PieceKind] {
        self.queue.preview(self.config.preview_count)
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    pub fn pending_garbage(&self) -> u32 {
        self.pending_garbage
    }

    /// Garbage rows currently on the board
    pub fn garbage_rows(&self) -> usize {
        self.matrix.garbage_rows()
    }

    /// Gravity and lock delay at the current level
    pub fn gravity_policy(&self) -> GravityPolicy {
        GravityPolicy::for_level(&self.config, self.level)
    }

    /// Take every queued event in order
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    /// Start the game and spawn the first piece
    pub fn start(&mut self) {
        if self.status != PlayerStatus::Ready {
            return;
        }
        self.status = PlayerStatus::Playing;
        self.spawn(true);
    }

    /// Replace the committed board (scripted setups) and redraw the active piece
    pub fn set_matrix(&mut self, matrix: Matrix) {
        self.matrix = matrix;
        match self.sprite.as_mut() {
            Some(sprite) => sprite.resettle(&mut self.matrix),
            None => self.matrix.refresh_live(),
        }
    }

    fn can_play(&self) -> bool {
        self.status == PlayerStatus::Playing && !self.paused
    }

    /// Apply a game action
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Pause => {
                if self.status != PlayerStatus::Playing {
                    return false;
                }
                self.paused = !self.paused;
                true
            }
            GameAction::Restart => {
                self.restart();
                true
            }
            _ if !self.can_play() => false,
            GameAction::Hold => self.hold(),
            GameAction::HardDrop => self.hard_drop(),
            other => {
                let Some(sprite) = self.sprite.as_mut() else {
                    return false;
                };
                let matrix = &mut self.matrix;
                match other {
                    GameAction::MoveLeft => sprite.left(matrix),
                    GameAction::MoveRight => sprite.right(matrix),
                    GameAction::RotateCw => sprite.rotate_cw(matrix),
                    GameAction::RotateCcw => sprite.rotate_ccw(matrix),
                    GameAction::SoftDrop => {
                        let moved = sprite.soft_drop(matrix);
                        if moved {
                            self.score_drop(1, false);
                        }
                        moved
                    }
                    _ => false,
                }
            }
        }
    }

    /// Main game tick - advance gravity and lock delay.
    ///
    /// Returns whether the active piece moved or locked.
    pub fn tick(&mut self, elapsed_ms: u32, soft_drop: bool) -> bool {
        if !self.can_play() {
            return false;
        }
        let gravity = self.gravity_policy().gravity(soft_drop);
        let Some(sprite) = self.sprite.as_mut() else {
            return false;
        };

        let row_before = sprite.position().row;
        if let Some(outcome) = sprite.tick(&mut self.matrix, elapsed_ms, gravity) {
            self.after_lock(outcome);
            return true;
        }

        let fallen = (sprite.position().row - row_before) as u32;
        if fallen > 0 && soft_drop {
            self.score_drop(fallen, false);
        }
        fallen > 0
    }

    fn hard_drop(&mut self) -> bool {
        let gravity = self.gravity_policy().gravity(false);
        let Some(sprite) = self.sprite.as_mut() else {
            return false;
        };
        let distance = sprite.hard_drop(&mut self.matrix);
        // A hard-dropped sprite locks on its next tick regardless of the thresholds
        let Some(outcome) = sprite.tick(&mut self.matrix, 0, gravity) else {
            return false;
        };
        if distance > 0 {
            self.score_drop(distance, true);
        }
        self.after_lock(outcome);
        true
    }

    /// Swap the active piece with the hold slot
    pub fn hold(&mut self) -> bool {
        if !self.can_play() || !self.can_hold() {
            return false;
        }
        let Some(current) = self.sprite.as_ref().map(Sprite::kind) else {
            return false;
        };

        let previous = self.hold.swap(current);
        self.events.push(GameEvent::Held { kind: current });
        match previous {
            Some(kind) => self.place(kind, false),
            None => self.spawn(false),
        }
        true
    }

    fn score_drop(&mut self, cells: u32, hard: bool) {
        let result = calculate_score(ScoreAction::Drop { cells, hard }, self.level, self.score_state);
        self.score = self.score.saturating_add(result.total);
        self.events.push(GameEvent::Score(result));
    }

    fn after_lock(&mut self, outcome: CommitOutcome) {
        let Some(sprite) = self.sprite.take() else {
            return;
        };
        let cleared = outcome.lines_cleared();
        self.events.push(GameEvent::Locked {
            kind: sprite.kind(),
            tspin: outcome.tspin,
            lines: cleared,
        });

        let result = calculate_score(
            ScoreAction::Lock {
                lines: cleared,
                tspin: outcome.tspin,
                perfect_clear: outcome.perfect_clear,
            },
            self.level,
            self.score_state,
        );
        self.score_state = result.state;
        self.score = self.score.saturating_add(result.total);

        if cleared > 0 {
            self.events.push(GameEvent::LinesCleared {
                lines: outcome.lines,
                perfect_clear: outcome.perfect_clear,
            });
            self.lines += cleared as u32;
            let level = calculate_level(
                self.config.start_level,
                self.lines,
                self.config.lines_per_level,
            );
            if level != self.level {
                self.level = level;
                self.events.push(GameEvent::LevelUp { level });
            }
        }
        if result.total > 0 || !result.tags.is_empty() {
            self.events.push(GameEvent::Score(result));
        }

        match sprite.state() {
            SpriteState::GameOver | SpriteState::KO => self.finish(sprite.state()),
            _ => {
                self.hold.unlock();
                // A clearing lock keeps garbage pending so its attack can cancel it
                self.spawn(cleared == 0);
            }
        }
    }

    /// Optionally insert pending garbage, then put the next queued piece into play
    fn spawn(&mut self, insert_garbage: bool) {
        let mut got_lines = false;
        if insert_garbage && self.pending_garbage > 0 {
            let requested = std::mem::take(&mut self.pending_garbage);
            let inserted = self
                .matrix
                .insert_lines(requested as usize, &mut self.garbage_rng) as u32;
            self.events.push(GameEvent::GarbageInserted {
                requested,
                inserted,
            });
            if inserted == 0 {
                self.finish(SpriteState::KO);
                return;
            }
            got_lines = true;
        }

        let kind = self.queue.draw();
        self.place(kind, got_lines);
    }

    fn place(&mut self, kind: PieceKind, got_lines: bool) {
        let mut sprite = Sprite::new(kind);
        let state = sprite.generate(&mut self.matrix, got_lines);
        if state.is_terminal() {
            self.sprite = None;
            self.matrix.refresh_live();
            self.finish(state);
            return;
        }

        self.piece_id = self.piece_id.wrapping_add(1);
        self.sprite = Some(sprite);
        self.events.push(GameEvent::Spawned {
            piece_id: self.piece_id,
            kind,
        });
    }

    fn finish(&mut self, state: SpriteState) {
        self.sprite = None;
        if state == SpriteState::KO {
            self.status = PlayerStatus::KnockedOut;
            self.events.push(GameEvent::KnockedOut);
        } else {
            self.status = PlayerStatus::GameOver;
            self.events.push(GameEvent::GameOver);
        }
        info!(
            "episode {} ended: {:?}, score {}, lines {}",
            self.episode_id, self.status, self.score, self.lines
        );
    }

    /// Queue garbage sent by the opponent; it is inserted after the next lock that clears
    /// nothing.
    pub fn receive_garbage(&mut self, lines: u32) {
        if self.config.mode != GameMode::Battle {
            warn!("ignoring {} garbage line(s) outside battle mode", lines);
            return;
        }
        self.pending_garbage = self.pending_garbage.saturating_add(lines);
        debug!("pending garbage now {}", self.pending_garbage);
    }

    /// Cancel up to `lines` of pending garbage; returns how many were cancelled
    pub fn cancel_pending(&mut self, lines: u32) -> u32 {
        let cancelled = lines.min(self.pending_garbage);
        self.pending_garbage -= cancelled;
        cancelled
    }

    /// Remove every garbage row from the board right away; returns the number removed
    pub fn remove_garbage(&mut self) -> u32 {
        let removed = self.matrix.remove_lines() as u32;
        if removed > 0 {
            if let Some(sprite) = self.sprite.as_mut() {
                sprite.resettle(&mut self.matrix);
            }
            self.events.push(GameEvent::GarbageRemoved { lines: removed });
        }
        removed
    }

    /// Reset the board and counters and start a new episode. The bag keeps its stream.
    pub fn restart(&mut self) {
        self.matrix.reset();
        self.sprite = None;
        self.hold = HoldSlot::new();
        self.score_state = ScoreState::default();
        self.score = 0;
        self.lines = 0;
        self.level = calculate_level(self.config.start_level, 0, self.config.lines_per_level);
        self.pending_garbage = 0;
        self.paused = false;
        self.status = PlayerStatus::Ready;
        self.episode_id = self.episode_id.wrapping_add(1);
        info!("restart: episode {}", self.episode_id);
        self.start();
    }
}

impl Default for Player<SimpleRng> {
    fn default() -> Self {
        Self::new(RulesConfig::default(), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRng;

    fn battle_player(seed: u32) -> Player {
        let mut player = Player::new(RulesConfig::battle(), seed);
        player.start();
        player
    }

    #[test]
    fn test_new_player() {
        let player = Player::new(RulesConfig::default(), 12345);

        assert_eq!(player.status(), PlayerStatus::Ready);
        assert!(!player.paused());
        assert_eq!(player.score(), 0);
        assert_eq!(player.level(), 1);
        assert_eq!(player.lines(), 0);
        assert!(player.sprite().is_none());
        assert!(player.hold_piece().is_none());
        assert_eq!(player.preview().len(), 5);
    }

    #[test]
    fn test_start_spawns_preview_head() {
        let mut player = Player::new(RulesConfig::default(), 12345);
        let next = player.preview()[0];
        player.start();

        assert_eq!(player.status(), PlayerStatus::Playing);
        assert_eq!(player.sprite().map(Sprite::kind), Some(next));
        assert_eq!(player.piece_id(), 1);
        let events: Vec<_> = player.drain_events().collect();
        assert_eq!(events, vec![GameEvent::Spawned { piece_id: 1, kind: next }]);
    }

    #[test]
    fn test_hard_drop_locks_and_spawns() {
        let mut player = battle_player(7);
        let next = player.preview()[0];

        assert!(player.apply_action(GameAction::HardDrop));
        assert_eq!(player.piece_id(), 2);
        assert_eq!(player.sprite().map(Sprite::kind), Some(next));
        assert!(player.score() > 0, "hard drop earns drop points");
        assert!(player
            .drain_events()
            .any(|e| matches!(e, GameEvent::Locked { lines: 0, .. })));
    }

    #[test]
    fn test_hold_once_per_piece() {
        let mut player = battle_player(3);
        let first = player.sprite().map(Sprite::kind);

        assert!(player.apply_action(GameAction::Hold));
        assert_eq!(player.hold_piece(), first);
        assert!(!player.apply_action(GameAction::Hold));

        player.apply_action(GameAction::HardDrop);
        let current = player.sprite().map(Sprite::kind);
        assert!(player.apply_action(GameAction::Hold));
        assert_eq!(player.sprite().map(Sprite::kind), first);
        assert_eq!(player.hold_piece(), current);
    }

    #[test]
    fn test_hold_disabled_by_rules() {
        let config = RulesConfig {
            hold_enabled: false,
            ..RulesConfig::default()
        };
        let mut player = Player::new(config, 3);
        player.start();
        assert!(!player.apply_action(GameAction::Hold));
    }

    #[test]
    fn test_pause_blocks_moves_and_ticks() {
        let mut player = battle_player(1);
        assert!(player.apply_action(GameAction::Pause));
        let before = player.sprite().map(Sprite::position);

        assert!(!player.apply_action(GameAction::MoveLeft));
        assert!(!player.tick(5000, false));
        assert_eq!(player.sprite().map(Sprite::position), before);

        assert!(player.apply_action(GameAction::Pause));
        assert!(player.apply_action(GameAction::MoveLeft));
    }

    #[test]
    fn test_garbage_waits_for_next_spawn() {
        let mut player = battle_player(5);
        player.receive_garbage(3);
        assert_eq!(player.pending_garbage(), 3);
        assert_eq!(player.garbage_rows(), 0);

        player.apply_action(GameAction::HardDrop);
        assert_eq!(player.pending_garbage(), 0);
        assert_eq!(player.garbage_rows(), 3);
        assert!(player.sprite().is_some_and(Sprite::got_lines));
    }

    #[test]
    fn test_garbage_ignored_in_marathon() {
        let mut player = Player::new(RulesConfig::default(), 5);
        player.start();
        player.receive_garbage(3);
        assert_eq!(player.pending_garbage(), 0);
    }

    #[test]
    fn test_cancel_pending() {
        let mut player = battle_player(5);
        player.receive_garbage(2);
        assert_eq!(player.cancel_pending(5), 2);
        assert_eq!(player.pending_garbage(), 0);
    }

    #[test]
    fn test_clearing_lock_keeps_garbage_pending() {
        // All-zero bag draws O first
        let mut player = Player::with_sources(
            RulesConfig::battle(),
            SequenceRng::new(vec![0]),
            SequenceRng::new(vec![0]),
        );
        player.start();
        player.set_matrix(Matrix::from_ascii(&["ZZZZ..ZZZZ"]).unwrap());
        player.receive_garbage(2);

        player.apply_action(GameAction::HardDrop);
        assert_eq!(player.lines(), 1);
        assert_eq!(player.pending_garbage(), 2);
        assert_eq!(player.garbage_rows(), 0);

        player.apply_action(GameAction::HardDrop);
        assert_eq!(player.pending_garbage(), 0);
        assert_eq!(player.garbage_rows(), 2);
    }

    #[test]
    fn test_no_room_for_garbage_is_knockout() {
        let mut player = battle_player(5);
        let mut rows = vec!["Z........."; 24];
        rows[23] = "ZZZZZ.....";
        player.set_matrix(Matrix::from_ascii(&rows).unwrap());
        player.receive_garbage(1);

        player.apply_action(GameAction::HardDrop);
        assert_eq!(player.status(), PlayerStatus::KnockedOut);
        assert!(player.drain_events().any(|e| e == GameEvent::KnockedOut));
        assert!(!player.apply_action(GameAction::MoveLeft));
    }

    #[test]
    fn test_remove_garbage() {
        let mut player = Player::with_sources(
            RulesConfig::battle(),
            SequenceRng::new(vec![0]),
            SequenceRng::new(vec![4]),
        );
        player.start();
        player.receive_garbage(2);
        player.apply_action(GameAction::HardDrop);
        assert_eq!(player.garbage_rows(), 2);

        assert_eq!(player.remove_garbage(), 2);
        assert_eq!(player.garbage_rows(), 0);
        assert!(player
            .drain_events()
            .any(|e| e == GameEvent::GarbageRemoved { lines: 2 }));
    }

    #[test]
    fn test_restart_resets_counters() {
        let mut player = battle_player(9);
        player.apply_action(GameAction::HardDrop);
        player.receive_garbage(2);

        assert!(player.apply_action(GameAction::Restart));
        assert_eq!(player.episode_id(), 1);
        assert_eq!(player.score(), 0);
        assert_eq!(player.pending_garbage(), 0);
        assert!(player.matrix().is_empty());
        assert_eq!(player.status(), PlayerStatus::Playing);
    }

    #[test]
    fn test_top_out_is_game_over() {
        let mut player = battle_player(11);
        for _ in 0..200 {
            if player.is_over() {
                break;
            }
            player.apply_action(GameAction::HardDrop);
        }
        assert_eq!(player.status(), PlayerStatus::GameOver);
        assert!(player.sprite().is_none());
    }

    #[test]
    fn test_hold_slot_swap() {
        let mut slot = HoldSlot::new();
        assert_eq!(slot.swap(PieceKind::T), None);
        assert!(!slot.can_hold());
        slot.unlock();
        assert_eq!(slot.swap(PieceKind::I), Some(PieceKind::T));
        assert_eq!(slot.held(), Some(PieceKind::I));
    }
}
