//! Confirmation state machine.
//!
//! `PENDING -> { CONFIRMED, FAILED }`, both terminal. A pattern's range
//! defines a high/low extreme; closes strictly after the range either break
//! out (confirm), break down (fail), or leave the pattern pending. The
//! scanner is re-run fresh per finding and holds no state.

use crate::{Direction, SampleBuffer};

/// Terminal-or-pending confirmation state of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confirmation {
    Confirmed,
    Pending,
    Failed,
}

impl Confirmation {
    /// `(confirmed, pending)` flags for the uniform finding record;
    /// `Failed` maps to `(false, false)`.
    #[inline]
    pub fn flags(self) -> (bool, bool) {
        match self {
            Confirmation::Confirmed => (true, false),
            Confirmation::Pending => (false, true),
            Confirmation::Failed => (false, false),
        }
    }

    #[inline]
    pub fn is_confirmed(self) -> bool {
        matches!(self, Confirmation::Confirmed)
    }
}

/// Scan closes strictly after `end` for a breakout past the range's extreme
/// high (bullish confirm) or extreme low (bullish fail); mirrored for
/// bearish setups. Neutral findings stay pending. Deterministic and
/// idempotent for a given buffer and range.
pub fn confirm(buf: &SampleBuffer, start: usize, end: usize, direction: Direction) -> Confirmation {
    if direction == Direction::Neutral || end >= buf.end() {
        return Confirmation::Pending;
    }

    let (_, range_high) = buf.max_high(start, end);
    let (_, range_low) = buf.min_low(start, end);

    for i in end + 1..=buf.end() {
        let c = buf.close(i);
        match direction {
            Direction::Bullish => {
                if c > range_high {
                    return Confirmation::Confirmed;
                }
                if c < range_low {
                    return Confirmation::Failed;
                }
            }
            Direction::Bearish => {
                if c < range_low {
                    return Confirmation::Confirmed;
                }
                if c > range_high {
                    return Confirmation::Failed;
                }
            }
            Direction::Neutral => unreachable!(),
        }
    }

    Confirmation::Pending
}
