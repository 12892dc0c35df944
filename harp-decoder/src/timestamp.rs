//! Hardware timestamp reconstruction
//!
//! Timestamped payloads start with a 4-byte seconds counter followed by a
//! 2-byte sub-second counter. The sub-second counter runs at the HARP clock
//! resolution of 32 microseconds per tick.

use serde::{Deserialize, Serialize};

/// Duration of one hardware clock tick in seconds
pub const TICK_SECONDS: f64 = 32e-6;

/// Size of the timestamp prefix in a payload (u32 seconds + u16 ticks)
pub const TIMESTAMP_SIZE: usize = 6;

/// Raw timestamp fields as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarpTimestamp {
    /// Whole seconds
    pub seconds: u32,
    /// Sub-second ticks of 32 µs
    pub ticks: u16,
}

impl HarpTimestamp {
    pub fn new(seconds: u32, ticks: u16) -> Self {
        Self { seconds, ticks }
    }

    /// Timestamp as floating point seconds
    pub fn as_secs_f64(&self) -> f64 {
        reconstruct(self.seconds, self.ticks)
    }
}

/// Combine seconds and ticks into floating point seconds
pub fn reconstruct(seconds: u32, ticks: u16) -> f64 {
    f64::from(seconds) + f64::from(ticks) * TICK_SECONDS
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reconstruct_whole_seconds() {
        assert_eq!(reconstruct(0, 0), 0.0);
        assert_eq!(reconstruct(1234, 0), 1234.0);
    }

    #[test]
    fn test_tick_resolution_is_32us() {
        // 31250 ticks make one second
        let ts = reconstruct(10, 31_250);
        assert!((ts - 11.0).abs() < 1e-9);

        let one_tick = reconstruct(0, 1);
        assert_eq!(one_tick, 32e-6);
    }

    #[test]
    fn test_harp_timestamp() {
        let ts = HarpTimestamp::new(u32::MAX, u16::MAX);
        assert_eq!(ts.as_secs_f64(), f64::from(u32::MAX) + 65535.0 * 32e-6);
    }

    proptest! {
        #[test]
        fn prop_reconstruct_matches_formula(seconds in any::<u32>(), ticks in any::<u16>()) {
            let expected = seconds as f64 + ticks as f64 * 32e-6;
            prop_assert_eq!(reconstruct(seconds, ticks), expected);
            prop_assert!(reconstruct(seconds, ticks) >= seconds as f64);
        }
    }
}
