//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the matrix engine, the active-piece state machine and the rules
//! around them. It has no UI, networking or clock dependencies:
//!
//! - **Deterministic**: randomness is injected through [`RandomSource`], time through
//!   elapsed-millisecond deltas
//! - **Synchronous**: every operation runs to completion inside the caller's frame update
//! - **Error-free gameplay**: invalid moves are no-ops, top-outs and knockouts are states
//!
//! # Module Structure
//!
//! - [`matrix`]: padded playfield with master/live grids, commits, line clears, garbage
//! - [`shapes`]: rotation templates and the T-Spin kernels
//! - [`tspin`]: corner-counting T-Spin classifier
//! - [`sprite`]: the falling piece and its Falling/OnFloor/Commited state machine
//! - [`scoring`]: line, T-Spin, combo and back-to-back scoring
//! - [`level`]: level progression and gravity thresholds
//! - [`rng`]: random sources and the 7-bag queue
//! - [`config`]: rule knobs loaded from JSON
//! - [`game`]: a player's session tying everything together
//!
//! # Rules
//!
//! - **7-Bag Randomizer** with up to 7 pieces of preview
//! - **No wall kicks**: a rotation fits at the current anchor or is rejected
//! - **Lock Delay**: 450ms on the floor, cancelled when the piece can fall again
//! - **Garbage**: solid rows with one bomb hole, pushed in from the bottom
//!
//! # Example
//!
//! ```
//! use blockfall_core::{Player, RulesConfig};
//! use blockfall_types::GameAction;
//!
//! let mut player = Player::new(RulesConfig::default(), 12345);
//! player.start();
//!
//! player.apply_action(GameAction::MoveRight);
//! player.apply_action(GameAction::RotateCw);
//! player.apply_action(GameAction::HardDrop);
//!
//! assert!(player.score() > 0); // Hard drop awards points
//! assert_eq!(player.piece_id(), 2);
//! ```
//!
//! Call [`Player::tick`](game::Player::tick) every frame with the elapsed time.

pub mod config;
pub mod game;
pub mod level;
pub mod matrix;
pub mod rng;
pub mod scoring;
pub mod shapes;
pub mod sprite;
pub mod tspin;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use config::{ConfigError, GameMode, RulesConfig};
pub use game::{GameEvent, HoldSlot, Player, PlayerStatus};
pub use level::GravityPolicy;
pub use matrix::{CommitOutcome, Grid, Line, Matrix};
pub use rng::{PieceQueue, RandomSource, SequenceRng, SimpleRng};
pub use scoring::{calculate_score, ScoreAction, ScoreResult, ScoreState};
pub use shapes::get_shape;
pub use sprite::{Gravity, Sprite, SpriteState};
pub use tspin::detect_tspin;
