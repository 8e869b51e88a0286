//! Cross-platform wall-clock helpers.
//!
//! Token validity windows are expressed in whole unix seconds, so that is the
//! resolution offered here.

pub use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Returns the current system time.
#[cfg(not(target_arch = "wasm32"))]
pub fn now() -> SystemTime {
    SystemTime::now()
}

/// Returns the current system time.
#[cfg(target_arch = "wasm32")]
pub fn now() -> SystemTime {
    use web_time::web::SystemTimeExt;
    web_time::SystemTime::now().to_std()
}

/// Seconds elapsed since the unix epoch. A clock set before the epoch reads
/// as zero.
pub fn unix_now() -> u64 {
    now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_clock_reads_past_2020() {
        assert!(unix_now() > 1_577_836_800);
    }

    #[test]
    fn seconds_match_the_system_time() {
        let before = unix_now();
        let elapsed = now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default();
        assert!(elapsed >= before);
    }
}
