use std::time::Duration;

pub const BASE_DROP_INTERVAL_MS: f64 = 800.0;
pub const DROP_DECAY: f64 = 0.846;
pub const FAST_DROP_FACTOR: f64 = 7.0;
pub const LINES_PER_LEVEL: u32 = 10;
pub const MAX_LEVEL: u32 = 19;

/// Bonus per lock event, indexed by the number of lines it cleared.
pub const LINE_SCORES: [u64; 5] = [0, 40, 100, 300, 1200];

pub fn level_for_lines(lines: u32) -> u32 {
    (lines / LINES_PER_LEVEL).min(MAX_LEVEL)
}

pub fn line_clear_bonus(lines: usize, level: u32) -> u64 {
    LINE_SCORES.get(lines).copied().unwrap_or(0) * (u64::from(level) + 1)
}

/// Points for one lock: one per row fallen since spawn, plus the line bonus
/// at the level in force before the clear.
pub fn lock_points(rows_fallen: u32, lines: usize, level: u32) -> u64 {
    u64::from(rows_fallen) + line_clear_bonus(lines, level)
}

pub fn drop_interval(level: u32) -> Duration {
    Duration::from_secs_f64(BASE_DROP_INTERVAL_MS * DROP_DECAY.powi(level as i32) / 1000.0)
}

pub fn fast_drop_interval(level: u32) -> Duration {
    drop_interval(level).div_f64(FAST_DROP_FACTOR)
}
