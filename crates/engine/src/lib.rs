//! Drivers layered on top of the core session
//!
//! - [`place`]: one-call placement for scripted players
//! - [`link`]: sequenced JSON messages between two players
//! - [`battle`]: attack tables, garbage netting and the per-player battle driver

pub mod battle;
pub mod link;
pub mod place;

pub use battle::{attack_lines, BattleSide, GarbageLedger, OpponentView};
pub use link::{BattleBody, BattleLink, BattleMessage, LinkError};
pub use place::{apply_place, PlaceError};
