//! Band and continuation detectors: channels, rectangles, wedges,
//! broadening formations, flags and pennants.
//!
//! Bands come from least-squares lines over the highs and lows of a
//! trailing region. The gap ratio between region start and end sorts the
//! band into broadening, converging (wedge) or parallel (channel or
//! rectangle). Flags look for a steep pole followed by a shallow
//! counter-trend drift.

use crate::confirm::confirm;
use crate::geometry::linear_fit;
use crate::{score, Details, DetectionContext, Direction, Finding, PatternKind, SampleBuffer};

/// Trailing region examined for band shapes.
const SPAN: usize = 60;
const MIN_SPAN: usize = 30;
/// End gap above this multiple of the start gap is a broadening formation.
const GAP_BROADEN: f64 = 1.25;
/// End gap below this multiple of the start gap is a wedge.
const GAP_CONVERGE: f64 = 0.8;
/// Band residual gate: mean deviation from the fitted lines relative to the
/// band height.
const MIN_TIGHTNESS: f64 = 0.5;
const MIN_TIGHTNESS_STRICT: f64 = 0.6;

const FLAG_BARS: usize = 12;
const POLE_BARS: usize = 20;
const MIN_POLE_GAIN: f64 = 0.10;
/// Flag retracement of the pole beyond this fraction disqualifies.
const MAX_PULLBACK: f64 = 0.5;
/// Pennant: flag ranges in the back half contract to this fraction of the
/// front half.
const PENNANT_CONTRACTION: f64 = 0.75;

pub(crate) fn scan(buf: &SampleBuffer, ctx: &DetectionContext, out: &mut Vec<Finding>) {
    scan_band(buf, ctx, out);
    scan_flag(buf, ctx, out);
}

fn scan_band(buf: &SampleBuffer, ctx: &DetectionContext, out: &mut Vec<Finding>) {
    let e = buf.end();
    let span = SPAN.min(buf.window_len());
    if span < MIN_SPAN {
        return;
    }
    let s = e + 1 - span;
    let highs = &buf.highs()[s..=e];
    let lows = &buf.lows()[s..=e];
    let (Some(upper), Some(lower)) = (linear_fit(highs), linear_fit(lows)) else {
        return;
    };

    let last_x = (span - 1) as f64;
    let gap_start = upper.value_at(0.0) - lower.value_at(0.0);
    let gap_end = upper.value_at(last_x) - lower.value_at(last_x);
    if gap_start <= 0.0 || gap_end <= 0.0 {
        return;
    }
    let ratio = gap_end / gap_start;

    // mean deviation from the fitted lines, relative to the band height
    let mut resid = 0.0;
    for (i, (&h, &l)) in highs.iter().zip(lows).enumerate() {
        let x = i as f64;
        resid += (h - upper.value_at(x)).abs() + (l - lower.value_at(x)).abs();
    }
    resid /= (2 * span) as f64;
    let tightness = 1.0 - (resid / gap_end.max(f64::EPSILON)).min(1.0);
    let min_tightness = if ctx.strict {
        MIN_TIGHTNESS_STRICT
    } else {
        MIN_TIGHTNESS
    };
    if tightness < min_tightness {
        return;
    }

    let eps = buf.close(e).abs().max(f64::EPSILON) * 2e-4;
    let us = upper.slope;
    let ls = lower.slope;
    let upper_end = upper.value_at(last_x);
    let lower_end = lower.value_at(last_x);

    let (kind, direction, entry, stop, target) = if ratio > GAP_BROADEN {
        (
            PatternKind::BroadeningFormation,
            Direction::Neutral,
            buf.close(e),
            lower_end,
            upper_end,
        )
    } else if ratio < GAP_CONVERGE {
        if us > eps && ls > eps {
            let entry = lower_end;
            (
                PatternKind::RisingWedge,
                Direction::Bearish,
                entry,
                upper_end,
                entry - gap_start,
            )
        } else if us < -eps && ls < -eps {
            let entry = upper_end;
            (
                PatternKind::FallingWedge,
                Direction::Bullish,
                entry,
                lower_end,
                entry + gap_start,
            )
        } else {
            // converging with a flat or mixed side is triangle territory
            return;
        }
    } else {
        let mean_slope = (us + ls) / 2.0;
        if mean_slope > eps {
            let entry = upper_end;
            (
                PatternKind::ChannelUp,
                Direction::Bullish,
                entry,
                lower_end,
                entry + gap_end,
            )
        } else if mean_slope < -eps {
            let entry = lower_end;
            (
                PatternKind::ChannelDown,
                Direction::Bearish,
                entry,
                upper_end,
                entry - gap_end,
            )
        } else {
            (
                PatternKind::Rectangle,
                Direction::Neutral,
                buf.close(e),
                lower_end,
                upper_end,
            )
        }
    };

    let confirmation = confirm(buf, s, e, direction);
    let confidence = score::base(0.58)
        .evidence(0.10, (tightness - min_tightness) / (1.0 - min_tightness))
        .evidence(0.05, span as f64 / SPAN as f64)
        .confirmation(confirmation)
        .finish();

    out.push(Finding::new(
        kind,
        direction,
        s,
        (s + e) / 2,
        e,
        entry,
        stop,
        target,
        confidence,
        confirmation,
        Details::Channel {
            upper_slope: us,
            lower_slope: ls,
            height: gap_end,
        },
    ));
}

fn scan_flag(buf: &SampleBuffer, _ctx: &DetectionContext, out: &mut Vec<Finding>) {
    let e = buf.end();
    if buf.window_len() < FLAG_BARS + POLE_BARS {
        return;
    }
    let flag_start = e + 1 - FLAG_BARS;
    let pole_start = flag_start - POLE_BARS;
    let pole_end = flag_start - 1;

    let (lo_idx, pole_low) = buf.min_low(pole_start, pole_end);
    let (hi_idx, pole_high) = buf.max_high(pole_start, pole_end);
    if pole_low <= 0.0 || pole_high <= pole_low {
        return;
    }
    let pole_height = pole_high - pole_low;

    let closes = &buf.closes()[flag_start..=e];
    let Some(drift) = linear_fit(closes) else {
        return;
    };

    let finding = if hi_idx > lo_idx {
        // up pole, drift must not continue the advance
        let gain = (pole_high - pole_low) / pole_low;
        if gain < MIN_POLE_GAIN || drift.slope > 0.0 {
            return;
        }
        let (_, flag_low) = buf.min_low(flag_start, e);
        let (_, flag_high) = buf.max_high(flag_start, e);
        if flag_high > pole_high * 1.02 {
            return;
        }
        let pullback = (pole_high - flag_low) / pole_height;
        if !(0.0..=MAX_PULLBACK).contains(&pullback) {
            return;
        }
        emit_flag(
            buf,
            Direction::Bullish,
            pole_start,
            flag_start,
            gain,
            pullback,
            pole_high,
            flag_low,
            pole_high + pole_height,
        )
    } else {
        // down pole
        let gain = (pole_high - pole_low) / pole_high;
        if gain < MIN_POLE_GAIN || drift.slope < 0.0 {
            return;
        }
        let (_, flag_high) = buf.max_high(flag_start, e);
        let (_, flag_low) = buf.min_low(flag_start, e);
        if flag_low < pole_low * 0.98 {
            return;
        }
        let pullback = (flag_high - pole_low) / pole_height;
        if !(0.0..=MAX_PULLBACK).contains(&pullback) {
            return;
        }
        emit_flag(
            buf,
            Direction::Bearish,
            pole_start,
            flag_start,
            gain,
            pullback,
            pole_low,
            flag_high,
            pole_low - pole_height,
        )
    };
    out.push(finding);
}

/// Flag ranges contracting front-to-back make a pennant.
fn is_pennant(buf: &SampleBuffer, flag_start: usize, e: usize) -> bool {
    let half = (e - flag_start + 1) / 2;
    if half == 0 {
        return false;
    }
    let front: f64 = (flag_start..flag_start + half).map(|i| buf.range(i)).sum();
    let back: f64 = (e + 1 - half..=e).map(|i| buf.range(i)).sum();
    front > 0.0 && back < front * PENNANT_CONTRACTION
}

#[allow(clippy::too_many_arguments)]
fn emit_flag(
    buf: &SampleBuffer,
    direction: Direction,
    pole_start: usize,
    flag_start: usize,
    gain: f64,
    pullback: f64,
    entry: f64,
    stop: f64,
    target: f64,
) -> Finding {
    let e = buf.end();
    let kind = if is_pennant(buf, flag_start, e) {
        PatternKind::Pennant
    } else if direction.is_bullish() {
        PatternKind::BullFlag
    } else {
        PatternKind::BearFlag
    };

    let confirmation = confirm(buf, pole_start, e, direction);
    let confidence = score::base(0.60)
        .evidence(0.08, gain / (2.0 * MIN_POLE_GAIN))
        .evidence(0.06, 1.0 - pullback / MAX_PULLBACK)
        .confirmation(confirmation)
        .finish();

    Finding::new(
        kind,
        direction,
        pole_start,
        flag_start,
        e,
        entry,
        stop,
        target,
        confidence,
        confirmation,
        Details::Flag {
            pole_gain_pct: gain,
            pullback_pct: pullback,
        },
    )
}
