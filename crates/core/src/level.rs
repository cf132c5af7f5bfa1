//! Level and gravity policy
//!
//! Level grows by one every `lines_per_level` cleared lines, starting from the configured
//! start level. Gravity comes from the interval table (index 0 = level 1) and falls back to
//! the floor once the table runs out.

use crate::config::RulesConfig;
use crate::sprite::Gravity;

/// Level reached after clearing `total_lines`
pub fn calculate_level(start_level: u32, total_lines: u32, lines_per_level: u32) -> u32 {
    start_level.max(1) + total_lines / lines_per_level.max(1)
}

/// Get drop interval for a level (in milliseconds)
pub fn get_drop_interval_ms(intervals: &[u32], floor_ms: u32, level: u32) -> u32 {
    let index = level.saturating_sub(1) as usize;
    intervals.get(index).copied().unwrap_or(floor_ms)
}

/// Calculate soft drop interval
/// Base interval divided by soft drop multiplier
pub fn get_soft_drop_interval_ms(base_interval: u32, multiplier: u32) -> u32 {
    let interval = base_interval / multiplier.max(1);
    interval.max(1) // Minimum 1ms to avoid division issues
}

/// Timing thresholds for the current level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GravityPolicy {
    pub drop_interval_ms: u32,
    pub soft_drop_interval_ms: u32,
    pub lock_delay_ms: u32,
}

impl GravityPolicy {
    pub fn for_level(config: &RulesConfig, level: u32) -> Self {
        let drop_interval_ms = get_drop_interval_ms(
            &config.drop_intervals_ms,
            config.drop_interval_floor_ms,
            level,
        );
        Self {
            drop_interval_ms,
            soft_drop_interval_ms: get_soft_drop_interval_ms(
                drop_interval_ms,
                config.soft_drop_multiplier,
            ),
            lock_delay_ms: config.lock_delay_ms,
        }
    }

    /// Thresholds for one sprite tick
    pub fn gravity(&self, soft_drop: bool) -> Gravity {
        Gravity {
            drop_interval_ms: if soft_drop {
                self.soft_drop_interval_ms
            } else {
                self.drop_interval_ms
            },
            lock_delay_ms: self.lock_delay_ms,
        }
    }
}
