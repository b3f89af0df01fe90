use serde::{Deserialize, Serialize};

/// One completed exercise session in the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    /// Calendar day in the shared day format.
    pub date: String,
    pub exercise: String,
    /// Whole minutes, rounded up.
    pub duration: u32,
    /// Milliseconds since the Unix epoch when the session was stopped.
    pub timestamp: i64,
}

/// Whole minutes for an elapsed second count, rounded up. Zero stays zero.
pub fn minutes_rounded_up(elapsed_secs: u64) -> u32 {
    u32::try_from(elapsed_secs.div_ceil(60)).unwrap_or(u32::MAX)
}
