//! Shared confidence-scoring policy.
//!
//! Every detector starts from a per-family base prior and adds bounded
//! evidence contributions, then a confirmation bonus. The combination is
//! monotone in each piece of evidence, so a confirmed finding never scores
//! below an otherwise-identical pending one.

use crate::Confirmation;

/// Bonus applied when the confirmation scanner reports `Confirmed`.
pub const CONFIRM_BONUS: f64 = 0.08;
/// Penalty applied when the confirmation scanner reports `Failed`.
pub const FAIL_PENALTY: f64 = 0.12;

/// Candlestick findings clamp to this band instead of `[0, 1]`.
pub const CANDLE_FLOOR: f64 = 0.35;
pub const CANDLE_CEIL: f64 = 0.98;

/// Accumulating confidence score.
#[derive(Debug, Clone, Copy)]
pub struct Score(f64);

/// Start from a family base prior (typically 0.55–0.72).
pub fn base(prior: f64) -> Score {
    Score(prior)
}

impl Score {
    /// Add a bounded contribution: `weight * value`, with `value` clamped to
    /// `[0, 1]` first. Non-finite evidence contributes nothing.
    pub fn evidence(mut self, weight: f64, value: f64) -> Self {
        if value.is_finite() {
            self.0 += weight * value.clamp(0.0, 1.0);
        }
        self
    }

    /// Apply the confirmation bonus/penalty.
    pub fn confirmation(mut self, c: Confirmation) -> Self {
        match c {
            Confirmation::Confirmed => self.0 += CONFIRM_BONUS,
            Confirmation::Pending => {}
            Confirmation::Failed => self.0 -= FAIL_PENALTY,
        }
        self
    }

    /// Final value for swing/single-day findings, in `[0, 1]`.
    pub fn finish(self) -> f64 {
        if self.0.is_finite() {
            self.0.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Final value for candlestick findings, in `[0.35, 0.98]`.
    pub fn finish_candle(self) -> f64 {
        if self.0.is_finite() {
            self.0.clamp(CANDLE_FLOOR, CANDLE_CEIL)
        } else {
            CANDLE_FLOOR
        }
    }
}
