//! Single-session bar patterns: inside/outside days, narrow and wide range
//! days, spikes, three-bar reversals and closing/opening price reversals.
//!
//! Every bar of the active window is classified independently. Reversal
//! rules carry a trend gate over the trailing seven bars so a "reversal"
//! only fires against an established move.

use crate::confirm::confirm;
use crate::geometry::{linear_fit, trend_direction, TrendDirection};
use crate::{score, Details, DetectionContext, Direction, Finding, PatternKind, SampleBuffer};

/// Trend gate window for the reversal rules.
const TREND_WINDOW: usize = 7;
/// Narrow range lookbacks. A bar qualifying for both reports only the
/// stricter seven-bar form.
const NR_LONG: usize = 7;
const NR_SHORT: usize = 4;
/// Wide range: bar range against the trailing average.
const WIDE_MULT: f64 = 3.0;
const AVG_LOOKBACK: usize = 10;
/// Spike: protrusion beyond both neighbors as a fraction of the bar range.
const SPIKE_PROTRUSION: f64 = 0.3;
/// Quartile thresholds for close placement within the bar.
const UPPER_QUARTILE: f64 = 0.75;
const LOWER_QUARTILE: f64 = 0.25;

pub(crate) fn scan(buf: &SampleBuffer, ctx: &DetectionContext, out: &mut Vec<Finding>) {
    let before = out.len();
    for i in buf.start()..=buf.end() {
        classify_bar(buf, ctx, i, out);
    }
    log::trace!("daily rules produced {} findings", out.len() - before);
}

fn classify_bar(buf: &SampleBuffer, _ctx: &DetectionContext, i: usize, out: &mut Vec<Finding>) {
    let s = buf.start();
    let e = buf.end();
    let r = buf.range(i);
    let slope = trailing_slope(buf, i);

    if i > s {
        let p = i - 1;

        if buf.high(i) < buf.high(p) && buf.low(i) > buf.low(p) {
            emit(
                buf, out, PatternKind::InsideDay, Direction::Neutral,
                p, i, i, i, 0.55, range_contraction(buf, p, i), slope,
            );
        }

        if buf.high(i) > buf.high(p) && buf.low(i) < buf.low(p) {
            let direction = if buf.is_bull(i) {
                Direction::Bullish
            } else if buf.is_bear(i) {
                Direction::Bearish
            } else {
                Direction::Neutral
            };
            emit(
                buf, out, PatternKind::OutsideDay, direction,
                p, i, i, i, 0.56, body_dominance(buf, i), slope,
            );
        }
    }

    if let Some(kind) = narrow_range(buf, i) {
        emit(
            buf, out, kind, Direction::Neutral,
            i, i, i, i, 0.55, 0.0, slope,
        );
    }

    if r > 0.0 {
        if let Some(avg) = trailing_avg_range(buf, i) {
            if r > WIDE_MULT * avg {
                let close_pos = (buf.close(i) - buf.low(i)) / r;
                let trend = trend_direction(buf, i.saturating_sub(1).max(s), TREND_WINDOW);
                let vol_ev = volume_surge(buf, i);
                if close_pos >= UPPER_QUARTILE && trend == TrendDirection::Down {
                    emit(
                        buf, out, PatternKind::WideRangeBull, Direction::Bullish,
                        i, i, i, i, 0.58, vol_ev, slope,
                    );
                } else if close_pos <= LOWER_QUARTILE && trend == TrendDirection::Up {
                    emit(
                        buf, out, PatternKind::WideRangeBear, Direction::Bearish,
                        i, i, i, i, 0.58, vol_ev, slope,
                    );
                }
            }
        }

        // spikes need a neighbor on each side
        if i > s && i < e {
            let protrusion_high = buf.high(i) - buf.high(i - 1).max(buf.high(i + 1));
            if protrusion_high > SPIKE_PROTRUSION * r {
                emit(
                    buf, out, PatternKind::SpikeHigh, Direction::Bearish,
                    i - 1, i, i + 1, i, 0.57, protrusion_high / r, slope,
                );
            }
            let protrusion_low = buf.low(i - 1).min(buf.low(i + 1)) - buf.low(i);
            if protrusion_low > SPIKE_PROTRUSION * r {
                emit(
                    buf, out, PatternKind::SpikeLow, Direction::Bullish,
                    i - 1, i, i + 1, i, 0.57, protrusion_low / r, slope,
                );
            }
        }
    }

    if i >= s + 2 {
        let (a, b) = (i - 2, i - 1);
        if buf.is_bear(a) && buf.low(b) < buf.low(a) && buf.close(i) > buf.high(b) {
            emit(
                buf, out, PatternKind::ThreeBarReversalBull, Direction::Bullish,
                a, b, i, i, 0.60, body_dominance(buf, i), slope,
            );
        }
        if buf.is_bull(a) && buf.high(b) > buf.high(a) && buf.close(i) < buf.low(b) {
            emit(
                buf, out, PatternKind::ThreeBarReversalBear, Direction::Bearish,
                a, b, i, i, 0.60, body_dominance(buf, i), slope,
            );
        }
    }

    if i > s && r > 0.0 {
        let p = i - 1;
        let trend = trend_direction(buf, p, TREND_WINDOW);
        let open_pos = (buf.open(i) - buf.low(i)) / r;
        let close_pos = (buf.close(i) - buf.low(i)) / r;

        if trend == TrendDirection::Down {
            if close_pos >= UPPER_QUARTILE && open_pos <= LOWER_QUARTILE {
                if buf.open(i) < buf.low(p) {
                    // gapped below the prior bar and recovered
                    emit(
                        buf, out, PatternKind::OpeningPriceReversalBull, Direction::Bullish,
                        p, i, i, i, 0.59, close_pos, slope,
                    );
                } else if buf.low(i) < buf.low(p) {
                    emit(
                        buf, out, PatternKind::ClosingPriceReversalBull, Direction::Bullish,
                        p, i, i, i, 0.58, close_pos, slope,
                    );
                }
            }
        } else if trend == TrendDirection::Up
            && close_pos <= LOWER_QUARTILE
            && open_pos >= UPPER_QUARTILE
        {
            if buf.open(i) > buf.high(p) {
                emit(
                    buf, out, PatternKind::OpeningPriceReversalBear, Direction::Bearish,
                    p, i, i, i, 0.59, 1.0 - close_pos, slope,
                );
            } else if buf.high(i) > buf.high(p) {
                emit(
                    buf, out, PatternKind::ClosingPriceReversalBear, Direction::Bearish,
                    p, i, i, i, 0.58, 1.0 - close_pos, slope,
                );
            }
        }
    }
}

/// Fitted midpoint slope over the trailing trend window, 0 when too short.
fn trailing_slope(buf: &SampleBuffer, at: usize) -> f64 {
    let lo = at.saturating_sub(TREND_WINDOW - 1).max(buf.start());
    if at <= lo {
        return 0.0;
    }
    let mids: Vec<f64> = (lo..=at).map(|i| buf.midpoint(i)).collect();
    linear_fit(&mids).map(|f| f.slope).unwrap_or(0.0)
}

/// Strictly smallest range of the trailing lookback, preferring the
/// seven-bar form.
fn narrow_range(buf: &SampleBuffer, i: usize) -> Option<PatternKind> {
    let r = buf.range(i);
    let smallest_of = |n: usize| -> bool {
        if i < buf.start() + n - 1 {
            return false;
        }
        (i + 1 - n..i).all(|k| buf.range(k) > r)
    };
    if smallest_of(NR_LONG) {
        Some(PatternKind::NarrowRange7)
    } else if smallest_of(NR_SHORT) {
        Some(PatternKind::NarrowRange4)
    } else {
        None
    }
}

/// Mean range of the trailing lookback, excluding the bar itself.
fn trailing_avg_range(buf: &SampleBuffer, i: usize) -> Option<f64> {
    let lo = i.saturating_sub(AVG_LOOKBACK).max(buf.start());
    if i <= lo {
        return None;
    }
    let n = i - lo;
    let sum: f64 = (lo..i).map(|k| buf.range(k)).sum();
    let avg = sum / n as f64;
    (avg > 0.0).then_some(avg)
}

/// Volume above the trailing average scales to evidence in `[0, 1]`.
fn volume_surge(buf: &SampleBuffer, i: usize) -> f64 {
    let lo = i.saturating_sub(AVG_LOOKBACK).max(buf.start());
    if i <= lo {
        return 0.0;
    }
    let avg: f64 = (lo..i).map(|k| buf.volume(k)).sum::<f64>() / (i - lo) as f64;
    if avg <= 0.0 {
        return 0.0;
    }
    (buf.volume(i) / avg - 1.0).clamp(0.0, 1.0)
}

fn range_contraction(buf: &SampleBuffer, prev: usize, i: usize) -> f64 {
    let rp = buf.range(prev);
    if rp <= 0.0 {
        return 0.0;
    }
    (1.0 - buf.range(i) / rp).clamp(0.0, 1.0)
}

fn body_dominance(buf: &SampleBuffer, i: usize) -> f64 {
    let r = buf.range(i);
    if r <= 0.0 {
        return 0.0;
    }
    buf.body(i) / r
}

#[allow(clippy::too_many_arguments)]
fn emit(
    buf: &SampleBuffer,
    out: &mut Vec<Finding>,
    kind: PatternKind,
    direction: Direction,
    start: usize,
    mid: usize,
    end: usize,
    bar: usize,
    prior: f64,
    evidence: f64,
    trend_slope: f64,
) {
    let r = buf.range(bar);
    let (entry, stop, target) = match direction {
        Direction::Bullish => (buf.high(bar), buf.low(bar), buf.high(bar) + r),
        Direction::Bearish => (buf.low(bar), buf.high(bar), buf.low(bar) - r),
        Direction::Neutral => (buf.close(bar), buf.low(bar), buf.high(bar)),
    };
    let confirmation = confirm(buf, start, end, direction);
    let confidence = score::base(prior)
        .evidence(0.08, evidence)
        .confirmation(confirmation)
        .finish();

    out.push(Finding::new(
        kind,
        direction,
        start,
        mid,
        end,
        entry,
        stop,
        target,
        confidence,
        confirmation,
        Details::Daily { trend_slope },
    ));
}
