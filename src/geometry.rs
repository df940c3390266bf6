//! Geometry primitives shared by the swing-pattern detectors: pivot finder,
//! nearness comparator, least-squares trend estimator and trendline builder.

use crate::{DetectionContext, MarketKind, SampleBuffer};

// ============================================================
// PIVOTS
// ============================================================

/// Kind of local extremum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PivotKind {
    Top,
    Bottom,
}

/// A validated local price extremum.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Pivot {
    pub index: usize,
    pub price: f64,
    pub kind: PivotKind,
}

#[inline]
fn at_least_as_extreme(a: f64, b: f64, kind: PivotKind) -> bool {
    match kind {
        PivotKind::Top => a >= b,
        PivotKind::Bottom => a <= b,
    }
}

fn validated(values: &[f64], candidate: usize, window: usize, kind: PivotKind) -> bool {
    if candidate < window {
        // truncated lookback at the start of the series: accept
        return true;
    }
    let extreme = values[candidate];
    values[candidate - window..candidate].iter().all(|&v| match kind {
        PivotKind::Top => v < extreme,
        PivotKind::Bottom => v > extreme,
    })
}

/// Find confirmed local extrema in `values`.
///
/// Scans left to right maintaining a candidate extreme. A bar at least as
/// extreme as the candidate replaces it and resets a `window - 1` countdown;
/// otherwise the countdown ticks down, and when it expires the candidate is
/// re-validated against the `window` bars immediately preceding it (all must
/// be strictly less extreme) before being committed. The trailing candidate
/// is validated the same way when the scan runs out of bars. The design
/// trades a `window`-bar detection lag for robustness against single-bar
/// noise.
pub fn find_pivots(values: &[f64], window: usize, kind: PivotKind) -> Vec<Pivot> {
    let mut pivots = Vec::new();
    if values.is_empty() || window == 0 {
        return pivots;
    }

    let mut candidate = 0usize;
    let mut countdown = window as isize - 1;

    for i in 1..values.len() {
        if at_least_as_extreme(values[i], values[candidate], kind) {
            candidate = i;
            countdown = window as isize - 1;
        } else {
            countdown -= 1;
            if countdown < 0 {
                if validated(values, candidate, window, kind) {
                    pivots.push(Pivot {
                        index: candidate,
                        price: values[candidate],
                        kind,
                    });
                }
                candidate = i;
                countdown = window as isize - 1;
            }
        }
    }

    if validated(values, candidate, window, kind) {
        pivots.push(Pivot {
            index: candidate,
            price: values[candidate],
            kind,
        });
    }

    pivots
}

/// Pivots over the buffer's active window in global indices. Tops scan the
/// high column, bottoms the low column.
pub fn window_pivots(buf: &SampleBuffer, window: usize, kind: PivotKind) -> Vec<Pivot> {
    let series = match kind {
        PivotKind::Top => &buf.highs()[buf.start()..=buf.end()],
        PivotKind::Bottom => &buf.lows()[buf.start()..=buf.end()],
    };
    let mut pivots = find_pivots(series, window, kind);
    for p in &mut pivots {
        p.index += buf.start();
    }
    pivots
}

// ============================================================
// NEARNESS
// ============================================================

/// Tolerance mode for the nearness comparator. The two modes are mutually
/// exclusive: relative compares against the larger price, absolute compares
/// raw distance with instrument-dependent rescaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tolerance {
    /// `|a - b| / max(a, b) <= pct`
    Relative(f64),
    /// `|a - b| <= price_vary`, rescaled for expensive instruments and
    /// futures markets.
    Absolute(f64),
}

/// Compare two prices for nearness. Non-positive inputs are never near.
///
/// Absolute tolerances are halved above 2500, halved again above 5000,
/// quartered for futures and halved for near-futures.
pub fn is_near(a: f64, b: f64, tolerance: Tolerance, ctx: &DetectionContext) -> bool {
    if a <= 0.0 || b <= 0.0 {
        return false;
    }
    match tolerance {
        Tolerance::Relative(pct) => (a - b).abs() / a.max(b) <= pct,
        Tolerance::Absolute(price_vary) => {
            let mut vary = price_vary;
            let px = a.max(b);
            if px > 2500.0 {
                vary /= 2.0;
            }
            if px > 5000.0 {
                vary /= 2.0;
            }
            match ctx.market {
                MarketKind::Futures => vary /= 4.0,
                MarketKind::NearFutures => vary /= 2.0,
                MarketKind::Equity => {}
            }
            (a - b).abs() <= vary
        }
    }
}

// ============================================================
// LINEAR FIT
// ============================================================

/// Least-squares line over `values` with x = 0..n.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    #[inline]
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares. `None` for fewer than two points.
pub fn linear_fit(values: &[f64]) -> Option<LinearFit> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let sum_x = nf * (nf - 1.0) / 2.0;
    let sum_xx = (nf - 1.0) * nf * (2.0 * nf - 1.0) / 6.0;
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, &v)| i as f64 * v).sum();

    let denom = nf * sum_xx - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let slope = (nf * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / nf;
    Some(LinearFit { slope, intercept })
}

// ============================================================
// TREND DIRECTION
// ============================================================

/// Short-window trend estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum TrendDirection {
    Up,
    Flat,
    Down,
}

/// Trend direction at bar `at` from a least-squares slope over the trailing
/// `window` bar midpoints.
///
/// Recency override: when the two most recent midpoints disagree with the
/// fitted slope's sign, the reported direction flips. This bias toward the
/// latest bars is a deliberate rule, not noise.
pub fn trend_direction(buf: &SampleBuffer, at: usize, window: usize) -> TrendDirection {
    let lo = at.saturating_sub(window.saturating_sub(1)).max(buf.start());
    if at <= lo || at > buf.end() {
        return TrendDirection::Flat;
    }
    let mids: Vec<f64> = (lo..=at).map(|i| buf.midpoint(i)).collect();
    let Some(fit) = linear_fit(&mids) else {
        return TrendDirection::Flat;
    };

    let mean = mids.iter().sum::<f64>() / mids.len() as f64;
    let eps = (mean.abs() * 1e-4).max(1e-9);
    let mut dir = if fit.slope > eps {
        TrendDirection::Up
    } else if fit.slope < -eps {
        TrendDirection::Down
    } else {
        TrendDirection::Flat
    };

    let last = mids[mids.len() - 1];
    let prev = mids[mids.len() - 2];
    if dir == TrendDirection::Up && last < prev {
        dir = TrendDirection::Down;
    } else if dir == TrendDirection::Down && last > prev {
        dir = TrendDirection::Up;
    }
    dir
}

// ============================================================
// TRENDLINES
// ============================================================

/// A horizontal level or a sloped line through pivots, with a count of
/// pivots lying within tolerance of the line.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub enum Trendline {
    Horizontal {
        price: f64,
        touches: usize,
    },
    Sloped {
        start_idx: usize,
        start_price: f64,
        slope: f64,
        touches: usize,
    },
}

impl Trendline {
    /// Line value at a global bar index.
    pub fn value_at(&self, idx: usize) -> f64 {
        match *self {
            Trendline::Horizontal { price, .. } => price,
            Trendline::Sloped {
                start_idx,
                start_price,
                slope,
                ..
            } => start_price + slope * (idx as f64 - start_idx as f64),
        }
    }

    /// Per-bar slope (0 for horizontal lines).
    pub fn slope(&self) -> f64 {
        match *self {
            Trendline::Horizontal { .. } => 0.0,
            Trendline::Sloped { slope, .. } => slope,
        }
    }

    pub fn touches(&self) -> usize {
        match *self {
            Trendline::Horizontal { touches, .. } | Trendline::Sloped { touches, .. } => touches,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Trendline::Horizontal { .. })
    }
}

/// Fit a trendline through pivots via least squares, then count pivots
/// within `touch_pct` of the line. Lines whose total drift over the pivot
/// span is small relative to price collapse to a horizontal level.
pub fn fit_trendline(pivots: &[Pivot], touch_pct: f64, ctx: &DetectionContext) -> Option<Trendline> {
    if pivots.len() < 2 {
        return None;
    }
    let x0 = pivots[0].index as f64;
    let n = pivots.len() as f64;
    let sum_x: f64 = pivots.iter().map(|p| p.index as f64 - x0).sum();
    let sum_y: f64 = pivots.iter().map(|p| p.price).sum();
    let sum_xx: f64 = pivots
        .iter()
        .map(|p| {
            let x = p.index as f64 - x0;
            x * x
        })
        .sum();
    let sum_xy: f64 = pivots
        .iter()
        .map(|p| (p.index as f64 - x0) * p.price)
        .sum();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let span = pivots[pivots.len() - 1].index - pivots[0].index;
    let mean_price = sum_y / n;
    let drift = slope.abs() * span as f64;

    let line = if drift <= mean_price * 0.005 {
        Trendline::Horizontal {
            price: mean_price,
            touches: 0,
        }
    } else {
        Trendline::Sloped {
            start_idx: pivots[0].index,
            start_price: intercept,
            slope,
            touches: 0,
        }
    };

    let touches = pivots
        .iter()
        .filter(|p| {
            is_near(
                p.price,
                line.value_at(p.index),
                Tolerance::Relative(touch_pct),
                ctx,
            )
        })
        .count();

    Some(match line {
        Trendline::Horizontal { price, .. } => Trendline::Horizontal { price, touches },
        Trendline::Sloped {
            start_idx,
            start_price,
            slope,
            ..
        } => Trendline::Sloped {
            start_idx,
            start_price,
            slope,
            touches,
        },
    })
}

// ============================================================
// TESTS
// ============================================================
