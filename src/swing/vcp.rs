//! Volatility contraction and high-tight-flag detectors.
//!
//! The contraction pattern is a run of top-to-bottom swings whose depths
//! shrink by a fixed ratio each time. The high tight flag is a near-vertical
//! pole followed by a short, shallow consolidation band under the pole high;
//! once a flag is reported the scan resumes past it so consecutive reports
//! never overlap.

use crate::confirm::confirm;
use crate::geometry::{window_pivots, Pivot, PivotKind};
use crate::{score, Details, DetectionContext, Direction, Finding, PatternKind, SampleBuffer};

/// Contraction swings use a tight pivot window to catch shallow swings.
const SWING_WINDOW: usize = 3;
/// Each swing depth must shrink to this fraction of the previous one.
const CONTRACTION_RATIO: f64 = 0.85;
const MIN_SWINGS: usize = 3;
/// The first swing must be a real correction.
const MIN_FIRST_DEPTH: f64 = 0.08;

const POLE_LOOKBACK: usize = 60;
/// Pole gain off the lookback low close.
const MIN_POLE_GAIN: f64 = 0.9;
const FLAG_MIN_BARS: usize = 5;
const FLAG_MAX_BARS: usize = 25;
/// Flag band around the pole high.
const FLAG_FLOOR: f64 = 0.75;
const FLAG_CEIL: f64 = 1.05;

pub(crate) fn scan(buf: &SampleBuffer, ctx: &DetectionContext, out: &mut Vec<Finding>) {
    scan_contraction(buf, ctx, out);
    scan_high_tight_flag(buf, ctx, out);
}

fn scan_contraction(buf: &SampleBuffer, _ctx: &DetectionContext, out: &mut Vec<Finding>) {
    let mut pivots = window_pivots(buf, SWING_WINDOW, PivotKind::Top);
    pivots.extend(window_pivots(buf, SWING_WINDOW, PivotKind::Bottom));
    pivots.sort_by_key(|p| p.index);

    // alternating top -> following bottom pairs
    let mut swings: Vec<(Pivot, Pivot)> = Vec::new();
    let mut pending_top: Option<Pivot> = None;
    for p in pivots {
        match p.kind {
            PivotKind::Top => pending_top = Some(p),
            PivotKind::Bottom => {
                if let Some(top) = pending_top.take() {
                    if p.price < top.price {
                        swings.push((top, p));
                    }
                }
            }
        }
    }
    if swings.len() < MIN_SWINGS {
        return;
    }

    let depth = |s: &(Pivot, Pivot)| (s.0.price - s.1.price) / s.0.price;

    // longest trailing run of contracting depths
    let mut run_start = swings.len() - 1;
    while run_start > 0 {
        let prev = depth(&swings[run_start - 1]);
        let cur = depth(&swings[run_start]);
        if cur <= prev * CONTRACTION_RATIO {
            run_start -= 1;
        } else {
            break;
        }
    }
    let run = &swings[run_start..];
    if run.len() < MIN_SWINGS {
        return;
    }
    let depths: Vec<f64> = run.iter().map(depth).collect();
    if depths[0] < MIN_FIRST_DEPTH {
        return;
    }

    let first_top = &run[0].0;
    let last_top = &run[run.len() - 1].0;
    let last_bottom = &run[run.len() - 1].1;
    let tightening = 1.0 - depths[depths.len() - 1] / depths[0];

    let entry = last_top.price;
    let stop = last_bottom.price;
    let target = entry * (1.0 + depths[0]);

    let confirmation = confirm(buf, first_top.index, last_bottom.index, Direction::Bullish);
    let confidence = score::base(0.63)
        .evidence(0.08, tightening)
        .evidence(0.05, (run.len() - MIN_SWINGS) as f64 / 2.0)
        .confirmation(confirmation)
        .finish();

    out.push(Finding::new(
        PatternKind::VolatilityContraction,
        Direction::Bullish,
        first_top.index,
        last_top.index,
        last_bottom.index,
        entry,
        stop,
        target,
        confidence,
        confirmation,
        Details::Contraction { depths },
    ));
}

fn scan_high_tight_flag(buf: &SampleBuffer, _ctx: &DetectionContext, out: &mut Vec<Finding>) {
    let s = buf.start();
    let e = buf.end();

    let mut i = s + FLAG_MIN_BARS;
    while i + FLAG_MIN_BARS <= e {
        let lb = i.saturating_sub(POLE_LOOKBACK).max(s);
        let mut lo_idx = lb;
        let mut lo_close = buf.close(lb);
        for k in lb..=i {
            if buf.close(k) < lo_close {
                lo_close = buf.close(k);
                lo_idx = k;
            }
        }
        if lo_close <= 0.0 {
            i += 1;
            continue;
        }
        let gain = buf.close(i) / lo_close - 1.0;
        if gain < MIN_POLE_GAIN {
            i += 1;
            continue;
        }

        let pole_high = buf.high(i);
        let pole_low = buf.low(lo_idx);

        // longest qualifying flag band after the pole top
        let mut flag_end = None;
        let limit = (i + FLAG_MAX_BARS).min(e);
        let mut j = i + 1;
        while j <= limit {
            if buf.low(j) < pole_high * FLAG_FLOOR || buf.high(j) > pole_high * FLAG_CEIL {
                break;
            }
            if j - i >= FLAG_MIN_BARS {
                flag_end = Some(j);
            }
            j += 1;
        }
        let Some(end) = flag_end else {
            i += 1;
            continue;
        };

        let (_, flag_low) = buf.min_low(i + 1, end);
        let pullback = (pole_high - flag_low) / (pole_high - pole_low).max(f64::EPSILON);

        let entry = pole_high;
        let stop = flag_low;
        let target = pole_high + (pole_high - pole_low);

        let confirmation = confirm(buf, lo_idx, end, Direction::Bullish);
        let confidence = score::base(0.68)
            .evidence(0.06, (gain - MIN_POLE_GAIN) / MIN_POLE_GAIN)
            .evidence(0.06, 1.0 - pullback / 0.25)
            .confirmation(confirmation)
            .finish();

        out.push(Finding::new(
            PatternKind::HighTightFlag,
            Direction::Bullish,
            lo_idx,
            i,
            end,
            entry,
            stop,
            target,
            confidence,
            confirmation,
            Details::Flag {
                pole_gain_pct: gain,
                pullback_pct: pullback,
            },
        ));

        // resume past the reported flag
        i = end + 1;
    }
}
