//! Battle mode - attack tables, garbage netting and the per-player driver
//!
//! Garbage flows like this:
//!
//! 1. A clearing lock produces an attack from [`attack_lines`].
//! 2. The attack first cancels the player's own pending garbage.
//! 3. If what is left covers every garbage row already on the board, those rows are removed
//!    and the attack shrinks by the number removed.
//! 4. Anything still left is sent to the opponent as `LinesSent`.
//!
//! Received lines are queued on the player and inserted before its next spawn.

use log::debug;

use blockfall_core::{GameEvent, Player, RandomSource, ScoreResult, SimpleRng};
use blockfall_types::{ComboKind, TSpinKind};

use crate::link::{BattleBody, BattleLink, LinkError};

/// Lines sent by plain clears, index = lines cleared
pub const CLEAR_ATTACK: [u32; 5] = [0, 0, 1, 2, 4];

/// Lines sent by T-Spin Minis, index = lines cleared
pub const MINI_ATTACK: [u32; 4] = [0, 0, 1, 2];

/// Extra line for a back-to-back clear
pub const B2B_ATTACK: u32 = 1;

pub const MAX_COMBO: usize = 9;

/// Combo attack, index = consecutive clears before this one
pub const COMBO_ATTACK: [u32; 1 + MAX_COMBO] = [0, 0, 1, 1, 1, 2, 2, 3, 3, 4];

/// Lines sent for one clearing lock.
///
/// `combo` is the combo counter after the lock (1 on the first clear of a chain).
pub fn attack_lines(lines: usize, tspin: TSpinKind, back_to_back: bool, combo: u32) -> u32 {
    if lines == 0 {
        return 0;
    }
    let mut attack = match tspin {
        TSpinKind::Full => 2 * lines as u32,
        TSpinKind::Mini => MINI_ATTACK[lines.min(3)],
        TSpinKind::None => CLEAR_ATTACK[lines.min(4)],
    };
    if back_to_back {
        attack += B2B_ATTACK;
    }
    let chain = (combo.saturating_sub(1) as usize).min(MAX_COMBO);
    attack + COMBO_ATTACK[chain]
}

/// Attack for a lock given its scored result
pub fn attack_for(lines: usize, tspin: TSpinKind, result: &ScoreResult) -> u32 {
    let back_to_back = matches!(
        result.combo_kind,
        ComboKind::B2BTetris | ComboKind::B2BTSpin
    );
    attack_lines(lines, tspin, back_to_back, result.state.combo)
}

/// Running totals of garbage exchanged by one player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GarbageLedger {
    pub received: u32,
    pub cancelled: u32,
    pub removed: u32,
    pub sent: u32,
}

impl GarbageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue incoming lines on the player
    pub fn receive<R: RandomSource>(&mut self, player: &mut Player<R>, lines: u32) {
        self.received += lines;
        player.receive_garbage(lines);
    }

    /// Net an attack against pending and on-board garbage; returns the lines to send
    pub fn settle_attack<R: RandomSource>(&mut self, player: &mut Player<R>, attack: u32) -> u32 {
        let cancelled = player.cancel_pending(attack);
        self.cancelled += cancelled;
        let mut rest = attack - cancelled;

        let on_board = player.garbage_rows() as u32;
        if on_board > 0 && rest >= on_board {
            let removed = player.remove_garbage();
            self.removed += removed;
            rest -= removed.min(rest);
        }

        self.sent += rest;
        debug!(
            "attack {}: cancelled {}, board rows {}, sending {}",
            attack, cancelled, on_board, rest
        );
        rest
    }
}

/// What this side knows about the opponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpponentView {
    pub lines: u32,
    pub score: u32,
    pub knocked_out: bool,
}

/// One player wired to a battle link
#[derive(Debug)]
pub struct BattleSide<R = SimpleRng> {
    player: Player<R>,
    ledger: GarbageLedger,
    link: BattleLink,
    opponent: OpponentView,
    last_lock: Option<(usize, TSpinKind)>,
    announced_end: bool,
}

impl<R: RandomSource> BattleSide<R> {
    pub fn new(player: Player<R>, link: BattleLink) -> Self {
        Self {
            player,
            ledger: GarbageLedger::new(),
            link,
            opponent: OpponentView::default(),
            last_lock: None,
            announced_end: false,
        }
    }

    pub fn player(&self) -> &Player<R> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player<R> {
        &mut self.player
    }

    pub fn ledger(&self) -> GarbageLedger {
        self.ledger
    }

    pub fn opponent(&self) -> OpponentView {
        self.opponent
    }

    /// Apply every message waiting in the inbox; returns how many were applied
    pub fn poll_inbox(&mut self) -> Result<usize, LinkError> {
        let mut applied = 0;
        while let Some(msg) = self.link.try_recv()? {
            match msg.body {
                BattleBody::LinesSent { lines } => self.ledger.receive(&mut self.player, lines),
                BattleBody::Progress { lines, score } => {
                    self.opponent.lines = lines;
                    self.opponent.score = score;
                }
                BattleBody::KnockedOut => self.opponent.knocked_out = true,
            }
            applied += 1;
        }
        Ok(applied)
    }

    /// Drain the player's events, send attacks and status, and hand the events back
    pub fn process_events(&mut self) -> Result<Vec<GameEvent>, LinkError> {
        let events: Vec<GameEvent> = self.player.drain_events().collect();
        let mut progressed = false;

        for event in &events {
            match event {
                GameEvent::Locked { lines, tspin, .. } => {
                    self.last_lock = Some((*lines, *tspin));
                    progressed = true;
                }
                GameEvent::Score(result) if result.drop_points == 0 => {
                    let Some((lines, tspin)) = self.last_lock.take() else {
                        continue;
                    };
                    let attack = attack_for(lines, tspin, result);
                    if attack == 0 {
                        continue;
                    }
                    let outgoing = self.ledger.settle_attack(&mut self.player, attack);
                    if outgoing > 0 {
                        self.link.send(BattleBody::LinesSent { lines: outgoing })?;
                    }
                }
                GameEvent::GameOver | GameEvent::KnockedOut if !self.announced_end => {
                    self.announced_end = true;
                    self.link.send(BattleBody::KnockedOut)?;
                }
                _ => {}
            }
        }

        if progressed {
            self.link.send(BattleBody::Progress {
                lines: self.player.lines(),
                score: self.player.score(),
            })?;
        }

        let mut events = events;
        // Netting may have removed garbage while the batch was processed
        events.extend(self.player.drain_events());
        Ok(events)
    }

    /// One frame: inbox, gravity, outgoing messages
    pub fn update(&mut self, elapsed_ms: u32, soft_drop: bool) -> Result<Vec<GameEvent>, LinkError> {
        self.poll_inbox()?;
        self.player.tick(elapsed_ms, soft_drop);
        self.process_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfall_core::RulesConfig;

    #[test]
    fn test_attack_table() {
        assert_eq!(attack_lines(0, TSpinKind::Full, true, 5), 0);
        assert_eq!(attack_lines(1, TSpinKind::None, false, 1), 0);
        assert_eq!(attack_lines(2, TSpinKind::None, false, 1), 1);
        assert_eq!(attack_lines(4, TSpinKind::None, false, 1), 4);
        assert_eq!(attack_lines(4, TSpinKind::None, true, 1), 5);
        assert_eq!(attack_lines(2, TSpinKind::Full, false, 1), 4);
        assert_eq!(attack_lines(1, TSpinKind::Mini, false, 1), 0);
        assert_eq!(attack_lines(2, TSpinKind::Mini, false, 1), 1);
    }

    #[test]
    fn test_combo_attack_grows_and_caps() {
        assert_eq!(attack_lines(1, TSpinKind::None, false, 3), 1);
        assert_eq!(attack_lines(1, TSpinKind::None, false, 6), 2);
        assert_eq!(attack_lines(1, TSpinKind::None, false, 50), 4);
    }

    #[test]
    fn test_attack_cancels_pending_first() {
        let mut player = Player::new(RulesConfig::battle(), 1);
        player.start();
        let mut ledger = GarbageLedger::new();
        ledger.receive(&mut player, 3);

        assert_eq!(ledger.settle_attack(&mut player, 2), 0);
        assert_eq!(player.pending_garbage(), 1);
        assert_eq!(ledger.settle_attack(&mut player, 4), 3);
        assert_eq!(ledger.cancelled, 3);
        assert_eq!(ledger.sent, 3);
    }

    #[test]
    fn test_attack_clears_board_garbage_when_large_enough() {
        let mut player = Player::new(RulesConfig::battle(), 1);
        player.start();
        let mut ledger = GarbageLedger::new();
        ledger.receive(&mut player, 2);
        player.apply_action(blockfall_types::GameAction::HardDrop);
        assert_eq!(player.garbage_rows(), 2);

        // Too small to cover both rows: everything is sent on
        assert_eq!(ledger.settle_attack(&mut player, 1), 1);
        assert_eq!(player.garbage_rows(), 2);

        assert_eq!(ledger.settle_attack(&mut player, 3), 1);
        assert_eq!(player.garbage_rows(), 0);
        assert_eq!(ledger.removed, 2);
    }
}
