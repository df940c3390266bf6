//! Triangle detectors: ascending, descending, symmetrical.
//!
//! Trendlines are fitted through the top and bottom pivots of a trailing
//! region. The pair must converge (the gap at the end of the region is a
//! fraction of the gap at its start) and carry enough touches per side.
//! The breakout side determines the entry; the target projects the initial
//! gap height (measured move).

use crate::confirm::confirm;
use crate::geometry::{fit_trendline, window_pivots, PivotKind, Trendline};
use crate::{score, Details, DetectionContext, Direction, Finding, PatternKind, SampleBuffer};

/// Triangles use a tighter pivot window than the wide formations.
const PIVOT_WINDOW: usize = 3;
/// Trailing region examined.
const SPAN: usize = 120;
/// Relative tolerance for a pivot to count as a trendline touch.
const TOUCH_PCT: f64 = 0.012;
/// End gap must shrink to this fraction of the start gap.
const CONVERGENCE: f64 = 0.6;
const CONVERGENCE_STRICT: f64 = 0.5;

pub(crate) fn scan(buf: &SampleBuffer, ctx: &DetectionContext, out: &mut Vec<Finding>) {
    let e = buf.end();
    let span = SPAN.min(buf.window_len());
    let region_start = e + 1 - span;

    let mut tops = window_pivots(buf, PIVOT_WINDOW, PivotKind::Top);
    tops.retain(|p| p.index >= region_start);
    let mut bottoms = window_pivots(buf, PIVOT_WINDOW, PivotKind::Bottom);
    bottoms.retain(|p| p.index >= region_start);
    if tops.len() < 2 || bottoms.len() < 2 {
        return;
    }

    let touch_pct = ctx.near_pct(TOUCH_PCT);
    let Some(upper) = fit_trendline(&tops, touch_pct, ctx) else {
        return;
    };
    let Some(lower) = fit_trendline(&bottoms, touch_pct, ctx) else {
        return;
    };

    let min_total = if ctx.strict { 5 } else { 4 };
    if upper.touches() < 2 || lower.touches() < 2 || upper.touches() + lower.touches() < min_total
    {
        return;
    }

    let first = tops[0].index.min(bottoms[0].index);
    let gap_start = upper.value_at(first) - lower.value_at(first);
    let gap_end = upper.value_at(e) - lower.value_at(e);
    if gap_start <= 0.0 || gap_end <= 0.0 {
        return;
    }
    let convergence = if ctx.strict {
        CONVERGENCE_STRICT
    } else {
        CONVERGENCE
    };
    if gap_end >= gap_start * convergence {
        return;
    }

    let Some((kind, direction)) = classify(&upper, &lower, buf, e) else {
        return;
    };

    let (entry, stop, target) = match direction {
        Direction::Bullish => {
            let entry = upper.value_at(e);
            (entry, lower.value_at(e), entry + gap_start)
        }
        _ => {
            let entry = lower.value_at(e);
            (entry, upper.value_at(e), entry - gap_start)
        }
    };

    let confirmation = confirm(buf, first, e, direction);
    let touches = upper.touches() + lower.touches();
    let confidence = score::base(0.60)
        .evidence(0.10, (touches as f64 - 4.0) / 4.0)
        .evidence(0.08, 1.0 - gap_end / gap_start)
        .confirmation(confirmation)
        .finish();

    out.push(Finding::new(
        kind,
        direction,
        first,
        (first + e) / 2,
        e,
        entry,
        stop,
        target,
        confidence,
        confirmation,
        Details::Triangle {
            upper_slope: upper.slope(),
            lower_slope: lower.slope(),
            upper_touches: upper.touches(),
            lower_touches: lower.touches(),
        },
    ));
}

fn classify(
    upper: &Trendline,
    lower: &Trendline,
    buf: &SampleBuffer,
    e: usize,
) -> Option<(PatternKind, Direction)> {
    let scale = buf.close(e).abs().max(f64::EPSILON);
    let eps = scale * 4e-4;
    let us = upper.slope();
    let ls = lower.slope();
    let upper_flat = upper.is_horizontal() || us.abs() < eps;
    let lower_flat = lower.is_horizontal() || ls.abs() < eps;

    if upper_flat && ls > eps {
        return Some((PatternKind::AscendingTriangle, Direction::Bullish));
    }
    if lower_flat && us < -eps {
        return Some((PatternKind::DescendingTriangle, Direction::Bearish));
    }
    if us < -eps && ls > eps {
        // breakout side unknown until it happens; lean on the latest close
        let mid = (upper.value_at(e) + lower.value_at(e)) / 2.0;
        let direction = if buf.close(e) >= mid {
            Direction::Bullish
        } else {
            Direction::Bearish
        };
        return Some((PatternKind::SymmetricalTriangle, direction));
    }
    None
}
