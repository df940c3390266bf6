//! Double and triple bottom/top detectors with Adam/Eve classification.
//!
//! Two (or three) extrema whose prices are mutually near, separated by a
//! bounded spacing window and preceded by a qualifying directional move,
//! form the pattern. Each bottom is classified as a sharp "Adam" or rounded
//! "Eve" by the spike of the bar immediately outside it, yielding the four
//! named double-bottom/top sub-variants. Entry sits at the intervening
//! extreme; the target projects the pattern depth (measured move).

use crate::confirm::confirm;
use crate::geometry::{is_near, window_pivots, Pivot, PivotKind, Tolerance};
use crate::{
    score, BottomShape, Details, DetectionContext, Direction, Finding, PatternKind, SampleBuffer,
};

use super::PIVOT_WINDOW;

const MIN_SPACING: usize = 10;
const MAX_SPACING: usize = 100;
/// Relative nearness of the extremum prices.
const NEAR_PCT: f64 = 0.005;
/// Triples tolerate slightly looser mutual nearness.
const TRIPLE_NEAR_PCT: f64 = 0.0075;
/// Prior trend: required move over the trailing lookback before the first extremum.
const TREND_LOOKBACK: usize = 21;
const TREND_MIN_MOVE: f64 = 0.20;
/// Stop offset below/above the extremum.
const STOP_OFFSET: f64 = 0.02;
/// Neighbor spike beyond this fraction of the extremum bar's range is an Adam.
const ADAM_SPIKE: f64 = 0.30;
/// Minimum bounce of the intervening extreme relative to the pattern extrema.
const MIN_BOUNCE: f64 = 0.03;

pub(crate) fn scan(buf: &SampleBuffer, ctx: &DetectionContext, out: &mut Vec<Finding>) {
    scan_side(buf, ctx, out, PivotKind::Bottom);
    scan_side(buf, ctx, out, PivotKind::Top);
}

fn scan_side(buf: &SampleBuffer, ctx: &DetectionContext, out: &mut Vec<Finding>, side: PivotKind) {
    let pivots = window_pivots(buf, PIVOT_WINDOW, side);
    let mut used = vec![false; pivots.len()];

    // triples first so a triple is not also reported as two doubles
    for i in 0..pivots.len().saturating_sub(2) {
        let (a, b, c) = (&pivots[i], &pivots[i + 1], &pivots[i + 2]);
        if !spacing_ok(a, b) || !spacing_ok(b, c) {
            continue;
        }
        let tol = Tolerance::Relative(ctx.near_pct(TRIPLE_NEAR_PCT));
        if !is_near(a.price, b.price, tol, ctx)
            || !is_near(b.price, c.price, tol, ctx)
            || !is_near(a.price, c.price, tol, ctx)
        {
            continue;
        }
        if !prior_trend_ok(buf, a, side) {
            continue;
        }
        if let Some(f) = emit(buf, ctx, &[a, b, c], side) {
            out.push(f);
            used[i] = true;
            used[i + 1] = true;
            used[i + 2] = true;
        }
    }

    let mut i = 0;
    while i + 1 < pivots.len() {
        if used[i] {
            i += 1;
            continue;
        }
        let mut advanced = false;
        for j in i + 1..pivots.len() {
            if used[j] {
                continue;
            }
            let (a, b) = (&pivots[i], &pivots[j]);
            if b.index - a.index > MAX_SPACING {
                break;
            }
            if !spacing_ok(a, b) {
                continue;
            }
            if !is_near(
                a.price,
                b.price,
                Tolerance::Relative(ctx.near_pct(NEAR_PCT)),
                ctx,
            ) {
                continue;
            }
            if !prior_trend_ok(buf, a, side) {
                continue;
            }
            if let Some(f) = emit(buf, ctx, &[a, b], side) {
                out.push(f);
                i = j;
                advanced = true;
                break;
            }
        }
        if !advanced {
            i += 1;
        }
    }
}

#[inline]
fn spacing_ok(a: &Pivot, b: &Pivot) -> bool {
    let spacing = b.index - a.index;
    (MIN_SPACING..=MAX_SPACING).contains(&spacing)
}

/// Bottoms need a preceding decline in the highs; tops a preceding rally in
/// the lows. Measured over the trailing lookback before the first extremum.
fn prior_trend_ok(buf: &SampleBuffer, first: &Pivot, side: PivotKind) -> bool {
    let lb = first.index.saturating_sub(TREND_LOOKBACK).max(buf.start());
    if lb >= first.index {
        return false;
    }
    match side {
        PivotKind::Bottom => {
            let (_, hi) = buf.max_high(lb, first.index);
            hi > 0.0 && (hi - buf.high(first.index)) / hi >= TREND_MIN_MOVE
        }
        PivotKind::Top => {
            let (_, lo) = buf.min_low(lb, first.index);
            let here = buf.low(first.index);
            here > 0.0 && (here - lo) / here >= TREND_MIN_MOVE
        }
    }
}

/// Adam/Eve: spike of the bar immediately outside the extremum, as a
/// fraction of the extremum bar's own range.
fn shape(buf: &SampleBuffer, pivot: &Pivot, neighbor: usize, side: PivotKind) -> (BottomShape, f64) {
    let rb = buf.range(pivot.index);
    if rb <= 0.0 {
        return (BottomShape::Eve, 0.0);
    }
    let spike = match side {
        PivotKind::Bottom => (buf.low(neighbor) - buf.low(pivot.index)) / rb,
        PivotKind::Top => (buf.high(pivot.index) - buf.high(neighbor)) / rb,
    };
    let spike = spike.max(0.0);
    if spike > ADAM_SPIKE {
        (BottomShape::Adam, spike)
    } else {
        (BottomShape::Eve, spike)
    }
}

fn emit(
    buf: &SampleBuffer,
    ctx: &DetectionContext,
    extrema: &[&Pivot],
    side: PivotKind,
) -> Option<Finding> {
    let first = extrema[0];
    let last = extrema[extrema.len() - 1];

    // intervening extreme between the outer extrema
    let (peak_idx, peak) = match side {
        PivotKind::Bottom => buf.max_high(first.index + 1, last.index - 1),
        PivotKind::Top => buf.min_low(first.index + 1, last.index - 1),
    };

    // deepest extremum (lowest bottom / highest top)
    let worst = match side {
        PivotKind::Bottom => extrema.iter().map(|p| p.price).fold(f64::MAX, f64::min),
        PivotKind::Top => extrema.iter().map(|p| p.price).fold(f64::MIN, f64::max),
    };

    // the pattern needs an actual bounce between the extrema
    let best_extreme = match side {
        PivotKind::Bottom => extrema.iter().map(|p| p.price).fold(f64::MIN, f64::max),
        PivotKind::Top => extrema.iter().map(|p| p.price).fold(f64::MAX, f64::min),
    };
    let bounce = match side {
        PivotKind::Bottom => (peak - best_extreme) / best_extreme,
        PivotKind::Top => (best_extreme - peak) / best_extreme,
    };
    if !bounce.is_finite() || bounce < MIN_BOUNCE {
        return None;
    }

    // interior must not undercut the extrema (that would be a deeper swing)
    let interior_ok = match side {
        PivotKind::Bottom => buf.min_low(first.index + 1, last.index - 1).1 >= worst,
        PivotKind::Top => buf.max_high(first.index + 1, last.index - 1).1 <= worst,
    };
    if !interior_ok {
        return None;
    }

    let depth = (peak - worst).abs();
    let (direction, entry, stop, target) = match side {
        PivotKind::Bottom => (
            Direction::Bullish,
            peak,
            worst * (1.0 - STOP_OFFSET),
            peak + depth,
        ),
        PivotKind::Top => (
            Direction::Bearish,
            peak,
            worst * (1.0 + STOP_OFFSET),
            peak - depth,
        ),
    };

    let mut shapes = Vec::with_capacity(extrema.len());
    let mut spikes = Vec::with_capacity(extrema.len());
    for (k, p) in extrema.iter().enumerate() {
        // the bar outside the pattern: left of the first, right of the others
        let neighbor = if k == 0 {
            p.index.saturating_sub(1).max(buf.start())
        } else {
            (p.index + 1).min(buf.end())
        };
        let (s, pct) = shape(buf, p, neighbor, side);
        shapes.push(s);
        spikes.push(pct);
    }

    let kind = classify(extrema.len(), side, &shapes)?;
    let confirmation = confirm(buf, first.index, last.index, direction);

    let rel_diff = (first.price - last.price).abs() / first.price.max(last.price);
    let closeness = 1.0 - rel_diff / ctx.near_pct(NEAR_PCT);
    let confidence = score::base(0.62)
        .evidence(0.08, closeness)
        .evidence(0.06, bounce / 0.10)
        .evidence(0.04, (extrema.len() - 2) as f64)
        .confirmation(confirmation)
        .finish();

    let mut swings: Vec<usize> = extrema.iter().map(|p| p.index).collect();
    swings.insert(swings.len() / 2, peak_idx);

    Some(Finding::new(
        kind,
        direction,
        first.index,
        peak_idx,
        last.index,
        entry,
        stop,
        target,
        confidence,
        confirmation,
        Details::Extremes {
            swings,
            shapes,
            spike_pcts: spikes,
        },
    ))
}

fn classify(count: usize, side: PivotKind, shapes: &[BottomShape]) -> Option<PatternKind> {
    use BottomShape::{Adam, Eve};
    use PatternKind::*;
    Some(match (count, side) {
        (3, PivotKind::Bottom) => TripleBottom,
        (3, PivotKind::Top) => TripleTop,
        (2, PivotKind::Bottom) => match (shapes[0], shapes[1]) {
            (Adam, Adam) => DoubleBottomAdamAdam,
            (Adam, Eve) => DoubleBottomAdamEve,
            (Eve, Adam) => DoubleBottomEveAdam,
            (Eve, Eve) => DoubleBottomEveEve,
        },
        (2, PivotKind::Top) => match (shapes[0], shapes[1]) {
            (Adam, Adam) => DoubleTopAdamAdam,
            (Adam, Eve) => DoubleTopAdamEve,
            (Eve, Adam) => DoubleTopEveAdam,
            (Eve, Eve) => DoubleTopEveEve,
        },
        _ => return None,
    })
}
