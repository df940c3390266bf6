//! # chartscan
//!
//! Chart-pattern and candlestick-formation detection engine for OHLCV series.
//!
//! The engine is a pure function from a price series to a list of
//! [`Finding`] records. Each finding carries an entry/stop/target triple, a
//! risk/reward ratio, a confidence score in `[0, 1]` and a confirmation
//! state. It performs no I/O, holds no state between calls and is safe to
//! run on many buffers in parallel.
//!
//! ## Quick start
//!
//! ```rust
//! use chartscan::prelude::*;
//!
//! let close: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.4).sin()).collect();
//! let open: Vec<f64> = close.iter().map(|c| c - 0.1).collect();
//! let high: Vec<f64> = close.iter().map(|c| c + 0.5).collect();
//! let low: Vec<f64> = close.iter().map(|c| c - 0.5).collect();
//! let volume = vec![0.0; 60];
//!
//! let buf = SampleBuffer::new(open, high, low, close, volume).unwrap();
//! let scanner = Scanner::new(DetectionContext::default()).include_candlesticks(true);
//! let findings = scanner.scan(&buf);
//! for f in &findings {
//!     println!("{} {:?} entry={} target={}", f.kind.label(), f.direction, f.entry, f.target);
//! }
//! ```

pub mod candles;
pub mod confirm;
pub mod daily;
pub mod geometry;
pub mod kind;
pub mod score;
pub mod swing;

pub use confirm::Confirmation;
pub use kind::PatternKind;

pub mod prelude {
    pub use crate::{
        confirm::Confirmation,
        geometry::{Pivot, PivotKind, Tolerance, TrendDirection, Trendline},
        kind::PatternKind,
        detect, scan_parallel, BatchError, BatchResult, BottomShape, Details, DetectionContext,
        Direction,
        Finding, MarketKind, Result, SampleBuffer, ScanError, ScanRequest, Scanner,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, ScanError>;

/// Fatal input errors. Insufficient history is not an error: the engine
/// silently skips detectors that cannot run and returns what it can.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("{field} has {got} samples, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("empty price series")]
    EmptyInput,

    #[error("window [{start}, {end}] out of bounds for {len} samples")]
    InvalidWindow {
        start: usize,
        end: usize,
        len: usize,
    },
}

// ============================================================
// SAMPLE BUFFER
// ============================================================

/// Immutable-after-construction view over five equal-length OHLCV columns
/// plus an optional timestamp column and an active `[start, end]` window.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<f64>,
    timestamps: Option<Vec<i64>>,
    start: usize,
    end: usize,
}

impl SampleBuffer {
    /// Build a buffer over the full series. Fails if the columns disagree in
    /// length or the series is empty.
    pub fn new(
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        volume: Vec<f64>,
    ) -> Result<Self> {
        let n = open.len();
        if n == 0 {
            return Err(ScanError::EmptyInput);
        }
        for (field, len) in [
            ("high", high.len()),
            ("low", low.len()),
            ("close", close.len()),
            ("volume", volume.len()),
        ] {
            if len != n {
                return Err(ScanError::LengthMismatch {
                    field,
                    expected: n,
                    got: len,
                });
            }
        }
        Ok(Self {
            open,
            high,
            low,
            close,
            volume,
            timestamps: None,
            start: 0,
            end: n - 1,
        })
    }

    /// Attach a timestamp column (must match the series length).
    pub fn with_timestamps(mut self, timestamps: Vec<i64>) -> Result<Self> {
        if timestamps.len() != self.open.len() {
            return Err(ScanError::LengthMismatch {
                field: "timestamps",
                expected: self.open.len(),
                got: timestamps.len(),
            });
        }
        self.timestamps = Some(timestamps);
        Ok(self)
    }

    /// Restrict the analysis window to `[start, end]` (inclusive, global
    /// indices).
    pub fn with_window(mut self, start: usize, end: usize) -> Result<Self> {
        if start > end || end >= self.open.len() {
            return Err(ScanError::InvalidWindow {
                start,
                end,
                len: self.open.len(),
            });
        }
        self.start = start;
        self.end = end;
        Ok(self)
    }

    /// Total number of samples in the underlying series.
    #[inline]
    pub fn bars(&self) -> usize {
        self.open.len()
    }

    /// First index of the active window.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last index of the active window (inclusive).
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of samples in the active window.
    #[inline]
    pub fn window_len(&self) -> usize {
        self.end - self.start + 1
    }

    #[inline]
    pub fn open(&self, i: usize) -> f64 {
        self.open[i]
    }

    #[inline]
    pub fn high(&self, i: usize) -> f64 {
        self.high[i]
    }

    #[inline]
    pub fn low(&self, i: usize) -> f64 {
        self.low[i]
    }

    #[inline]
    pub fn close(&self, i: usize) -> f64 {
        self.close[i]
    }

    #[inline]
    pub fn volume(&self, i: usize) -> f64 {
        self.volume[i]
    }

    #[inline]
    pub fn timestamp(&self, i: usize) -> Option<i64> {
        self.timestamps.as_ref().map(|t| t[i])
    }

    #[inline]
    pub fn highs(&self) -> &[f64] {
        &self.high
    }

    #[inline]
    pub fn lows(&self) -> &[f64] {
        &self.low
    }

    #[inline]
    pub fn closes(&self) -> &[f64] {
        &self.close
    }

    #[inline]
    pub fn opens(&self) -> &[f64] {
        &self.open
    }

    /// Candle body size at `i`.
    #[inline]
    pub fn body(&self, i: usize) -> f64 {
        (self.close[i] - self.open[i]).abs()
    }

    /// Bar range (high - low) at `i`.
    #[inline]
    pub fn range(&self, i: usize) -> f64 {
        self.high[i] - self.low[i]
    }

    /// Midpoint of the bar range at `i`.
    #[inline]
    pub fn midpoint(&self, i: usize) -> f64 {
        (self.high[i] + self.low[i]) / 2.0
    }

    #[inline]
    pub fn is_bull(&self, i: usize) -> bool {
        self.close[i] > self.open[i]
    }

    #[inline]
    pub fn is_bear(&self, i: usize) -> bool {
        self.close[i] < self.open[i]
    }

    /// Highest high over `[a, b]` inclusive; returns `(index, price)`.
    pub fn max_high(&self, a: usize, b: usize) -> (usize, f64) {
        let mut best = (a, self.high[a]);
        for i in a..=b {
            if self.high[i] > best.1 {
                best = (i, self.high[i]);
            }
        }
        best
    }

    /// Lowest low over `[a, b]` inclusive; returns `(index, price)`.
    pub fn min_low(&self, a: usize, b: usize) -> (usize, f64) {
        let mut best = (a, self.low[a]);
        for i in a..=b {
            if self.low[i] < best.1 {
                best = (i, self.low[i]);
            }
        }
        best
    }
}

// ============================================================
// DETECTION CONTEXT
// ============================================================

/// Instrument class. Absolute price tolerances shrink for futures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketKind {
    #[default]
    Equity,
    Futures,
    NearFutures,
}

/// Per-call configuration shared by every detector. Immutable for the
/// lifetime of a batch of calls; build a new context to change strictness.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectionContext {
    pub strict: bool,
    pub market: MarketKind,
}

impl DetectionContext {
    pub fn new(strict: bool, market: MarketKind) -> Self {
        Self { strict, market }
    }

    pub fn strict() -> Self {
        Self {
            strict: true,
            market: MarketKind::Equity,
        }
    }

    /// Relative tolerance for a detector, tightened in strict mode.
    #[inline]
    pub fn near_pct(&self, base: f64) -> f64 {
        if self.strict {
            base * 0.6
        } else {
            base
        }
    }
}

// ============================================================
// FINDINGS
// ============================================================

/// Direction of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Neutral,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

/// Shape of a swing extremum: sharp V ("Adam") or rounded U ("Eve").
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BottomShape {
    Adam,
    Eve,
}

/// Family-specific metadata attached to a [`Finding`]. Consumers match
/// exhaustively instead of probing optional fields.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Details {
    None,
    Cup {
        left_rim: usize,
        bottom: usize,
        right_rim: usize,
        depth: f64,
        breakout: Option<usize>,
    },
    Extremes {
        swings: Vec<usize>,
        shapes: Vec<BottomShape>,
        spike_pcts: Vec<f64>,
    },
    Triangle {
        upper_slope: f64,
        lower_slope: f64,
        upper_touches: usize,
        lower_touches: usize,
    },
    HeadShoulders {
        left: usize,
        head: usize,
        right: usize,
        neckline: f64,
        neckline_slope: f64,
    },
    Channel {
        upper_slope: f64,
        lower_slope: f64,
        height: f64,
    },
    Flag {
        pole_gain_pct: f64,
        pullback_pct: f64,
    },
    Contraction {
        depths: Vec<f64>,
    },
    Daily {
        trend_slope: f64,
    },
    Candle {
        bars: usize,
    },
}

/// Uniform output record of the engine.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Finding {
    pub kind: PatternKind,
    pub label: &'static str,
    pub direction: Direction,
    pub start: usize,
    pub mid: usize,
    pub end: usize,
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    /// `|target - entry| / |entry - stop|`, or 0 when the risk is non-positive.
    pub risk_reward: f64,
    /// Finite, clamped to `[0, 1]`.
    pub confidence: f64,
    pub confirmed: bool,
    pub pending: bool,
    pub details: Details,
}

impl Finding {
    /// Build an unnormalized finding; the orchestrator rounds prices and
    /// derives `risk_reward` before returning it to the caller.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        kind: PatternKind,
        direction: Direction,
        start: usize,
        mid: usize,
        end: usize,
        entry: f64,
        stop: f64,
        target: f64,
        confidence: f64,
        confirmation: Confirmation,
        details: Details,
    ) -> Self {
        let (confirmed, pending) = confirmation.flags();
        Self {
            kind,
            label: kind.label(),
            direction,
            start,
            mid,
            end,
            entry,
            stop,
            target,
            risk_reward: 0.0,
            confidence,
            confirmed,
            pending,
            details,
        }
    }

    fn normalize(&mut self) {
        self.entry = round2(self.entry);
        self.stop = round2(self.stop);
        self.target = round2(self.target);
        let risk = (self.entry - self.stop).abs();
        self.risk_reward = if risk > 0.0 {
            (self.target - self.entry).abs() / risk
        } else {
            0.0
        };
        self.confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }
}

#[inline]
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ============================================================
// SCANNER (ORCHESTRATOR)
// ============================================================

/// Swing-family detectors need this much history to run.
const MIN_SWING_BARS: usize = 50;
/// Below this window length the engine returns nothing at all.
const MIN_BARS: usize = 5;

/// Detection orchestrator: selects the family detectors to run based on
/// data sufficiency and normalizes all outputs into the uniform finding
/// schema. Stateless across calls.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    ctx: DetectionContext,
    include_candlesticks: bool,
    min_confidence: Option<f64>,
}

impl Scanner {
    pub fn new(ctx: DetectionContext) -> Self {
        Self {
            ctx,
            include_candlesticks: false,
            min_confidence: None,
        }
    }

    /// Also run the candlestick suite.
    pub fn include_candlesticks(mut self, on: bool) -> Self {
        self.include_candlesticks = on;
        self
    }

    /// Drop findings scoring below `min`.
    pub fn min_confidence(mut self, min: f64) -> Self {
        self.min_confidence = Some(min);
        self
    }

    pub fn context(&self) -> &DetectionContext {
        &self.ctx
    }

    /// Run every applicable family detector over the buffer's active window.
    /// Output order is detector insertion order, not sorted.
    pub fn scan(&self, buf: &SampleBuffer) -> Vec<Finding> {
        let n = buf.window_len();
        if n < MIN_BARS {
            return Vec::new();
        }

        let mut out = Vec::new();

        if n >= MIN_SWING_BARS {
            swing::run_all(buf, &self.ctx, &mut out);
        } else {
            log::debug!("skipping swing families: {n} bars < {MIN_SWING_BARS}");
        }

        daily::scan(buf, &self.ctx, &mut out);

        if self.include_candlesticks {
            candles::scan(buf, &self.ctx, &mut out);
        }

        for f in &mut out {
            f.normalize();
        }
        if let Some(min) = self.min_confidence {
            out.retain(|f| f.confidence >= min);
        }

        log::debug!("scan produced {} findings over {n} bars", out.len());
        out
    }
}

// ============================================================
// REQUEST SURFACE
// ============================================================

/// Caller-facing request: raw columns plus per-call flags. The engine has
/// no knowledge of ticker symbols; callers attach labels at their boundary.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ScanRequest {
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
    #[serde(default)]
    pub timestamps: Option<Vec<i64>>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub include_candlesticks: bool,
}

impl ScanRequest {
    fn into_buffer(self) -> Result<(SampleBuffer, bool, bool)> {
        let strict = self.strict;
        let candles = self.include_candlesticks;
        let mut buf = SampleBuffer::new(self.open, self.high, self.low, self.close, self.volume)?;
        if let Some(ts) = self.timestamps {
            buf = buf.with_timestamps(ts)?;
        }
        Ok((buf, strict, candles))
    }
}

/// One-shot detection from a raw request.
pub fn detect(request: ScanRequest, market: MarketKind) -> Result<Vec<Finding>> {
    let (buf, strict, candles) = request.into_buffer()?;
    let scanner =
        Scanner::new(DetectionContext::new(strict, market)).include_candlesticks(candles);
    Ok(scanner.scan(&buf))
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Findings for one instrument of a batch.
#[derive(Debug)]
pub struct BatchResult {
    pub symbol: String,
    pub findings: Vec<Finding>,
}

/// Failure for one instrument of a batch.
#[derive(Debug)]
pub struct BatchError {
    pub symbol: String,
    pub error: ScanError,
}

/// Scan many instruments in parallel. Each invocation only reads its own
/// buffer, so no locking is needed.
pub fn scan_parallel<'a, I>(scanner: &Scanner, instruments: I) -> (Vec<BatchResult>, Vec<BatchError>)
where
    I: IntoParallelIterator<Item = (&'a str, ScanRequest)>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, request)| {
            let strict = request.strict || scanner.ctx.strict;
            let candles = request.include_candlesticks || scanner.include_candlesticks;
            match request.into_buffer() {
                Ok((buf, _, _)) => {
                    let s = Scanner::new(DetectionContext::new(strict, scanner.ctx.market))
                        .include_candlesticks(candles);
                    Ok(BatchResult {
                        symbol: symbol.to_string(),
                        findings: s.scan(&buf),
                    })
                }
                Err(error) => Err(BatchError {
                    symbol: symbol.to_string(),
                    error,
                }),
            }
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();
    for r in results {
        match r {
            Ok(v) => successes.push(v),
            Err(e) => errors.push(e),
        }
    }
    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(n: usize, price: f64) -> SampleBuffer {
        SampleBuffer::new(
            vec![price; n],
            vec![price + 0.5; n],
            vec![price - 0.5; n],
            vec![price; n],
            vec![0.0; n],
        )
        .unwrap()
    }

    #[test]
    fn empty_input_is_fatal() {
        let err = SampleBuffer::new(vec![], vec![], vec![], vec![], vec![]).unwrap_err();
        assert_eq!(err, ScanError::EmptyInput);
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let err = SampleBuffer::new(
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![1.0],
            vec![1.0, 2.0],
            vec![0.0, 0.0],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ScanError::LengthMismatch {
                field: "low",
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn window_validation() {
        let buf = flat(10, 100.0);
        assert!(buf.clone().with_window(3, 2).is_err());
        assert!(buf.clone().with_window(0, 10).is_err());
        let buf = buf.with_window(2, 8).unwrap();
        assert_eq!(buf.window_len(), 7);
    }

    #[test]
    fn timestamps_must_match_length() {
        let buf = flat(10, 100.0);
        assert!(buf.clone().with_timestamps(vec![0; 9]).is_err());
        assert!(buf.with_timestamps(vec![0; 10]).is_ok());
    }

    #[test]
    fn short_buffer_yields_nothing() {
        let buf = flat(4, 100.0);
        let scanner = Scanner::new(DetectionContext::default()).include_candlesticks(true);
        assert!(scanner.scan(&buf).is_empty());
    }

    #[test]
    fn round2_behaviour() {
        assert_eq!(round2(1.005 + 1e-9), 1.01);
        assert_eq!(round2(88.2), 88.2);
    }

    #[test]
    fn strict_context_tightens_tolerances() {
        let loose = DetectionContext::default();
        let strict = DetectionContext::strict();
        assert!(strict.near_pct(0.01) < loose.near_pct(0.01));
    }

    #[test]
    fn normalize_zero_risk_reports_zero_rr() {
        let mut f = Finding::new(
            PatternKind::InsideDay,
            Direction::Neutral,
            0,
            0,
            0,
            100.0,
            100.0,
            110.0,
            0.6,
            Confirmation::Pending,
            Details::None,
        );
        f.normalize();
        assert_eq!(f.risk_reward, 0.0);
    }
}
