//! Candlestick formation suite.
//!
//! Rules are grouped by bar count. Every bar of the active window is
//! offered to each group; a group emits a finding when its formation
//! completes on that bar. Body and range thresholds are relative to a
//! trailing ten-bar average so the rules adapt to the instrument's scale.

pub mod multi;
pub mod single;
pub mod three;
pub mod two;

use crate::confirm::confirm;
use crate::geometry::{is_near, trend_direction, Tolerance, TrendDirection};
use crate::{score, Details, DetectionContext, Direction, Finding, PatternKind, SampleBuffer};

/// Trailing average lookback for body and range baselines.
const AVG_LOOKBACK: usize = 10;
/// Trend gate window preceding a formation.
const TREND_WINDOW: usize = 7;
/// Doji body threshold as a fraction of the average range.
const DOJI_FRAC: f64 = 0.1;
const DOJI_FRAC_STRICT: f64 = 0.05;
/// Long body: multiple of the average body.
const LONG_BODY: f64 = 1.3;
/// Short body: fraction of the average body.
const SHORT_BODY: f64 = 0.5;
/// Shadow small enough to count as absent, as a fraction of the range.
const BARE_SHADOW: f64 = 0.05;
/// Relative tolerance for "equal" prices between bars.
const PRICE_NEAR: f64 = 0.002;

pub(crate) fn scan(buf: &SampleBuffer, ctx: &DetectionContext, out: &mut Vec<Finding>) {
    let before = out.len();
    let m = Candles { buf, ctx };
    for i in buf.start()..=buf.end() {
        single::classify(&m, i, out);
        two::classify(&m, i, out);
        three::classify(&m, i, out);
        multi::classify(&m, i, out);
    }
    log::trace!("candle rules produced {} findings", out.len() - before);
}

/// Shared read-only view the rule groups work against.
pub(crate) struct Candles<'a> {
    pub buf: &'a SampleBuffer,
    pub ctx: &'a DetectionContext,
}

impl Candles<'_> {
    #[inline]
    pub fn body(&self, i: usize) -> f64 {
        self.buf.body(i)
    }

    #[inline]
    pub fn range(&self, i: usize) -> f64 {
        self.buf.range(i)
    }

    #[inline]
    pub fn body_top(&self, i: usize) -> f64 {
        self.buf.open(i).max(self.buf.close(i))
    }

    #[inline]
    pub fn body_bottom(&self, i: usize) -> f64 {
        self.buf.open(i).min(self.buf.close(i))
    }

    #[inline]
    pub fn upper_shadow(&self, i: usize) -> f64 {
        self.buf.high(i) - self.body_top(i)
    }

    #[inline]
    pub fn lower_shadow(&self, i: usize) -> f64 {
        self.body_bottom(i) - self.buf.low(i)
    }

    #[inline]
    pub fn bull(&self, i: usize) -> bool {
        self.buf.is_bull(i)
    }

    #[inline]
    pub fn bear(&self, i: usize) -> bool {
        self.buf.is_bear(i)
    }

    /// Mean body over the trailing lookback, excluding the bar itself. Falls
    /// back to the bar's own body at the start of the series.
    pub fn avg_body(&self, i: usize) -> f64 {
        let lo = i.saturating_sub(AVG_LOOKBACK).max(self.buf.start());
        if i <= lo {
            return self.body(i);
        }
        (lo..i).map(|k| self.body(k)).sum::<f64>() / (i - lo) as f64
    }

    /// Mean range over the trailing lookback, excluding the bar itself.
    pub fn avg_range(&self, i: usize) -> f64 {
        let lo = i.saturating_sub(AVG_LOOKBACK).max(self.buf.start());
        if i <= lo {
            return self.range(i);
        }
        (lo..i).map(|k| self.buf.range(k)).sum::<f64>() / (i - lo) as f64
    }

    pub fn doji_threshold(&self, i: usize) -> f64 {
        let frac = if self.ctx.strict {
            DOJI_FRAC_STRICT
        } else {
            DOJI_FRAC
        };
        let avg = self.avg_range(i);
        if avg > 0.0 {
            avg * frac
        } else {
            self.range(i) * DOJI_FRAC
        }
    }

    #[inline]
    pub fn doji(&self, i: usize) -> bool {
        self.body(i) <= self.doji_threshold(i)
    }

    #[inline]
    pub fn long_body(&self, i: usize) -> bool {
        self.body(i) >= self.avg_body(i) * LONG_BODY
    }

    #[inline]
    pub fn short_body(&self, i: usize) -> bool {
        self.body(i) <= self.avg_body(i) * SHORT_BODY
    }

    /// Both shadows effectively absent.
    pub fn bare(&self, i: usize) -> bool {
        let r = self.range(i);
        r > 0.0
            && self.upper_shadow(i) <= r * BARE_SHADOW
            && self.lower_shadow(i) <= r * BARE_SHADOW
    }

    /// Trend established before bar `i`.
    pub fn trend(&self, i: usize) -> TrendDirection {
        if i <= self.buf.start() {
            return TrendDirection::Flat;
        }
        trend_direction(self.buf, i - 1, TREND_WINDOW)
    }

    #[inline]
    pub fn downtrend(&self, i: usize) -> bool {
        self.trend(i) == TrendDirection::Down
    }

    #[inline]
    pub fn uptrend(&self, i: usize) -> bool {
        self.trend(i) == TrendDirection::Up
    }

    /// Price equality within the shared relative tolerance.
    pub fn near(&self, a: f64, b: f64) -> bool {
        is_near(a, b, Tolerance::Relative(self.ctx.near_pct(PRICE_NEAR)), self.ctx)
    }

    /// Emit a completed formation spanning `[start, end]`.
    pub fn push(
        &self,
        out: &mut Vec<Finding>,
        kind: PatternKind,
        direction: Direction,
        start: usize,
        end: usize,
        prior: f64,
    ) {
        let buf = self.buf;
        let close = buf.close(end);
        let (_, low) = buf.min_low(start, end);
        let (_, high) = buf.max_high(start, end);
        let (entry, stop, target) = match direction {
            Direction::Bullish => (close, low, close + 2.0 * (close - low)),
            Direction::Bearish => (close, high, close - 2.0 * (high - close)),
            Direction::Neutral => (close, low, high),
        };

        let confirmation = confirm(buf, start, end, direction);
        let confidence = score::base(prior).confirmation(confirmation).finish_candle();

        out.push(Finding::new(
            kind,
            direction,
            start,
            (start + end) / 2,
            end,
            entry,
            stop,
            target,
            confidence,
            confirmation,
            Details::Candle {
                bars: end - start + 1,
            },
        ));
    }
}
