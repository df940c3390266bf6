//! Head & Shoulders (top and inverted) detector.
//!
//! Three consecutive same-side pivots where the middle one is the most
//! extreme and the outer two are mutually near. The neckline is the mean of
//! the two inner troughs (peaks for the inverted case); the target projects
//! the head-to-neckline distance beyond the neckline.

use crate::confirm::confirm;
use crate::geometry::{is_near, window_pivots, Pivot, PivotKind, Tolerance};
use crate::{score, Details, DetectionContext, Direction, Finding, PatternKind, SampleBuffer};

use super::PIVOT_WINDOW;

const SHOULDER_NEAR_PCT: f64 = 0.05;
const MIN_LEG: usize = 5;
const MAX_LEG: usize = 90;

pub(crate) fn scan(buf: &SampleBuffer, ctx: &DetectionContext, out: &mut Vec<Finding>) {
    scan_side(buf, ctx, out, PivotKind::Top);
    scan_side(buf, ctx, out, PivotKind::Bottom);
}

fn scan_side(buf: &SampleBuffer, ctx: &DetectionContext, out: &mut Vec<Finding>, side: PivotKind) {
    let pivots = window_pivots(buf, PIVOT_WINDOW, side);
    let mut i = 0;
    while i + 2 < pivots.len() {
        if let Some(f) = try_formation(buf, ctx, &pivots[i], &pivots[i + 1], &pivots[i + 2], side)
        {
            out.push(f);
            // the right shoulder may start the next formation
            i += 2;
        } else {
            i += 1;
        }
    }
}

fn try_formation(
    buf: &SampleBuffer,
    ctx: &DetectionContext,
    left: &Pivot,
    head: &Pivot,
    right: &Pivot,
    side: PivotKind,
) -> Option<Finding> {
    let leg1 = head.index - left.index;
    let leg2 = right.index - head.index;
    if !(MIN_LEG..=MAX_LEG).contains(&leg1) || !(MIN_LEG..=MAX_LEG).contains(&leg2) {
        return None;
    }

    let head_extreme = match side {
        PivotKind::Top => head.price > left.price && head.price > right.price,
        PivotKind::Bottom => head.price < left.price && head.price < right.price,
    };
    if !head_extreme {
        return None;
    }

    if !is_near(
        left.price,
        right.price,
        Tolerance::Relative(ctx.near_pct(SHOULDER_NEAR_PCT)),
        ctx,
    ) {
        return None;
    }

    // inner troughs (peaks for the inverted case) define the neckline
    let ((i1, t1), (i2, t2)) = match side {
        PivotKind::Top => (
            buf.min_low(left.index + 1, head.index - 1),
            buf.min_low(head.index + 1, right.index - 1),
        ),
        PivotKind::Bottom => (
            buf.max_high(left.index + 1, head.index - 1),
            buf.max_high(head.index + 1, right.index - 1),
        ),
    };
    let neckline = (t1 + t2) / 2.0;
    let neckline_slope = (t2 - t1) / (i2 as f64 - i1 as f64);

    let head_to_neck = match side {
        PivotKind::Top => head.price - neckline,
        PivotKind::Bottom => neckline - head.price,
    };
    if head_to_neck <= 0.0 {
        return None;
    }

    let (kind, direction, entry, stop, target) = match side {
        PivotKind::Top => (
            PatternKind::HeadAndShoulders,
            Direction::Bearish,
            neckline,
            right.price,
            neckline - head_to_neck,
        ),
        PivotKind::Bottom => (
            PatternKind::InverseHeadAndShoulders,
            Direction::Bullish,
            neckline,
            right.price,
            neckline + head_to_neck,
        ),
    };

    let confirmation = confirm(buf, left.index, right.index, direction);

    let shoulder_diff = (left.price - right.price).abs() / left.price.max(right.price);
    let symmetry = 1.0 - shoulder_diff / ctx.near_pct(SHOULDER_NEAR_PCT);
    let prominence = head_to_neck
        / match side {
            PivotKind::Top => (head.price - left.price.min(right.price)).max(f64::EPSILON),
            PivotKind::Bottom => (left.price.max(right.price) - head.price).max(f64::EPSILON),
        };
    let confidence = score::base(0.64)
        .evidence(0.08, symmetry)
        .evidence(0.06, 1.0 / prominence.max(1.0))
        .confirmation(confirmation)
        .finish();

    Some(Finding::new(
        kind,
        direction,
        left.index,
        head.index,
        right.index,
        entry,
        stop,
        target,
        confidence,
        confirmation,
        Details::HeadShoulders {
            left: left.index,
            head: head.index,
            right: right.index,
            neckline,
            neckline_slope,
        },
    ))
}
