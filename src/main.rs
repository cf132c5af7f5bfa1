//! Headless battle simulation (default binary).
//!
//! Two scripted players place pieces at random columns and rotations and trade garbage
//! over an in-process battle link until one of them tops out or the tick budget runs out.
//!
//! Usage: `blockfall-sim [seed_a] [seed_b] [max_ticks]`
//!
//! Rules come from the JSON file named by `BLOCKFALL_RULES` (battle mode is forced on).

use std::env;

use anyhow::{Context, Result};

use blockfall::core::{GameMode, Player, RandomSource, RulesConfig, SimpleRng};
use blockfall::engine::{apply_place, BattleLink, BattleSide};
use blockfall::types::{Rotation, TICK_MS, VISIBLE_COLS};

/// Ticks between scripted placements (~0.5s of game time)
const PLACE_EVERY: u32 = 30;

/// Random placements tried before the bot gives up for this turn
const PLACE_ATTEMPTS: usize = 8;

fn parse_arg(args: &[String], index: usize, default: u32) -> Result<u32> {
    match args.get(index) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("argument {} is not a number: {raw:?}", index + 1)),
        None => Ok(default),
    }
}

fn place_randomly(side: &mut BattleSide, bot: &mut SimpleRng) -> bool {
    for _ in 0..PLACE_ATTEMPTS {
        let rotation = Rotation::from_index(bot.next_range(4) as usize);
        let col = bot.next_range(VISIBLE_COLS as u32) as i8;
        if apply_place(side.player_mut(), col, rotation, false).is_ok() {
            return true;
        }
    }
    false
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let seed_a = parse_arg(&args, 0, 1)?;
    let seed_b = parse_arg(&args, 1, 2)?;
    let max_ticks = parse_arg(&args, 2, 60 * 60 * 5)?;

    let rules = RulesConfig {
        mode: GameMode::Battle,
        ..RulesConfig::from_env().context("loading rules")?
    };

    let (link_a, link_b) = BattleLink::pair();
    let mut sides = [
        BattleSide::new(Player::new(rules.clone(), seed_a), link_a),
        BattleSide::new(Player::new(rules, seed_b), link_b),
    ];
    let mut bots = [
        SimpleRng::new(seed_a.wrapping_mul(31).wrapping_add(7)),
        SimpleRng::new(seed_b.wrapping_mul(31).wrapping_add(7)),
    ];
    let mut placed = [0u32; 2];

    for side in &mut sides {
        side.player_mut().start();
    }

    let mut tick = 0;
    while tick < max_ticks && sides.iter().all(|s| !s.player().is_over()) {
        for (i, (side, bot)) in sides.iter_mut().zip(bots.iter_mut()).enumerate() {
            side.poll_inbox()?;
            if tick % PLACE_EVERY == 0 && place_randomly(side, bot) {
                placed[i] += 1;
            }
            side.update(TICK_MS, false)?;
        }
        tick += 1;
    }

    println!("ticks: {tick}");
    for (i, side) in sides.iter().enumerate() {
        let player = side.player();
        let ledger = side.ledger();
        println!(
            "player {}: {:?} score={} lines={} level={} pieces={} sent={} received={} cancelled={} removed={}",
            i + 1,
            player.status(),
            player.score(),
            player.lines(),
            player.level(),
            placed[i],
            ledger.sent,
            ledger.received,
            ledger.cancelled,
            ledger.removed,
        );
    }

    Ok(())
}
