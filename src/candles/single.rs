//! Single-bar candle classification.
//!
//! Each bar receives exactly one label, chosen by a cascade from the most
//! specific shape to the plain colored-candle fallback.

use crate::geometry::TrendDirection;
use crate::{Direction, Finding, PatternKind};

use super::Candles;

/// Shadow at least this multiple of the body reads as a long shadow.
const LONG_SHADOW_MULT: f64 = 2.0;
/// Takuri: lower shadow at least this multiple of the body.
const TAKURI_MULT: f64 = 3.0;
/// Marubozu body as a fraction of the range.
const FULL_BODY: f64 = 0.95;
/// One-sided marubozu: the bare side.
const SIDE_BODY: f64 = 0.05;

pub(crate) fn classify(m: &Candles, i: usize, out: &mut Vec<Finding>) {
    let (kind, direction, prior) = label(m, i);
    m.push(out, kind, direction, i, i, prior);
}

fn label(m: &Candles, i: usize) -> (PatternKind, Direction, f64) {
    use Direction::{Bearish, Bullish, Neutral};
    use PatternKind::*;

    let r = m.range(i);
    let body = m.body(i);
    let us = m.upper_shadow(i);
    let ls = m.lower_shadow(i);
    let trend = m.trend(i);

    if r <= 0.0 {
        return (FourPriceDoji, Neutral, 0.36);
    }

    if m.doji(i) {
        let us_frac = us / r;
        let ls_frac = ls / r;
        if us_frac <= 0.1 && ls_frac <= 0.1 {
            return (FourPriceDoji, Neutral, 0.36);
        }
        if us_frac <= 0.1 && ls_frac >= 0.6 {
            return (DragonflyDoji, Bullish, 0.50);
        }
        if ls_frac <= 0.1 && us_frac >= 0.6 {
            return (GravestoneDoji, Bearish, 0.50);
        }
        let centered = {
            let body_mid = (m.body_top(i) + m.body_bottom(i)) / 2.0;
            let range_mid = m.buf.midpoint(i);
            (body_mid - range_mid).abs() <= 0.1 * r
        };
        if r >= m.avg_range(i) * 1.3 && us_frac >= 0.3 && ls_frac >= 0.3 {
            if centered {
                return (RickshawMan, Neutral, 0.40);
            }
            return (LongLeggedDoji, Neutral, 0.42);
        }
        return match trend {
            TrendDirection::Up => (NorthernDoji, Bearish, 0.45),
            TrendDirection::Down => (SouthernDoji, Bullish, 0.45),
            TrendDirection::Flat => (Doji, Neutral, 0.38),
        };
    }

    // full and one-sided marubozus
    if body >= r * FULL_BODY && m.long_body(i) {
        return if m.bull(i) {
            (WhiteMarubozu, Bullish, 0.55)
        } else {
            (BlackMarubozu, Bearish, 0.55)
        };
    }
    if m.long_body(i) {
        if m.bull(i) && ls <= r * SIDE_BODY && us > r * SIDE_BODY {
            if trend == TrendDirection::Down {
                return (BeltHoldBull, Bullish, 0.54);
            }
            return (OpeningWhiteMarubozu, Bullish, 0.50);
        }
        if m.bear(i) && us <= r * SIDE_BODY && ls > r * SIDE_BODY {
            if trend == TrendDirection::Up {
                return (BeltHoldBear, Bearish, 0.54);
            }
            return (OpeningBlackMarubozu, Bearish, 0.50);
        }
        if m.bull(i) && us <= r * SIDE_BODY && ls > r * SIDE_BODY {
            return (ClosingWhiteMarubozu, Bullish, 0.52);
        }
        if m.bear(i) && ls <= r * SIDE_BODY && us > r * SIDE_BODY {
            return (ClosingBlackMarubozu, Bearish, 0.52);
        }
    }

    // umbrella shapes
    if ls >= body * LONG_SHADOW_MULT && us <= body {
        if trend == TrendDirection::Down {
            if ls >= body * TAKURI_MULT {
                return (Takuri, Bullish, 0.56);
            }
            return (Hammer, Bullish, 0.55);
        }
        if trend == TrendDirection::Up {
            return (HangingMan, Bearish, 0.52);
        }
    }
    if us >= body * LONG_SHADOW_MULT && ls <= body {
        if trend == TrendDirection::Down {
            return (InvertedHammer, Bullish, 0.50);
        }
        if trend == TrendDirection::Up {
            return (ShootingStar, Bearish, 0.54);
        }
    }

    if m.short_body(i) {
        if us >= body * LONG_SHADOW_MULT
            && ls >= body * LONG_SHADOW_MULT
            && r >= m.avg_range(i) * 1.3
        {
            return (HighWave, Neutral, 0.42);
        }
        if us > body && ls > body {
            return if m.bull(i) {
                (WhiteSpinningTop, Neutral, 0.40)
            } else {
                (BlackSpinningTop, Neutral, 0.40)
            };
        }
        return if m.bull(i) {
            (ShortWhiteDay, Bullish, 0.37)
        } else {
            (ShortBlackDay, Bearish, 0.37)
        };
    }

    if m.long_body(i) {
        return if m.bull(i) {
            (LongWhiteDay, Bullish, 0.48)
        } else {
            (LongBlackDay, Bearish, 0.48)
        };
    }

    if m.bull(i) {
        (WhiteCandle, Bullish, 0.36)
    } else {
        (BlackCandle, Bearish, 0.36)
    }
}
