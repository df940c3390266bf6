//! Cup & Handle detector.
//!
//! Pairs of top pivots 35–325 bars apart form the rims. The lower envelope
//! between them must stay below dynamic depth thresholds through the middle
//! of the span (stricter in the middle fifth) so a "U" qualifies but a
//! spike-shaped dip with a high middle does not. A breakout close above the
//! right rim within a quarter of the cup width confirms; the target
//! projects the cup depth above the right rim.

use crate::confirm::Confirmation;
use crate::geometry::{window_pivots, Pivot, PivotKind};
use crate::{score, Details, DetectionContext, Direction, Finding, PatternKind, SampleBuffer};

use super::PIVOT_WINDOW;

const MIN_WIDTH: usize = 35;
const MAX_WIDTH: usize = 325;
/// Right rim height as a fraction of left rim height, measured from the bottom.
const RIM_RATIO_MIN: f64 = 0.8;
const RIM_RATIO_MAX: f64 = 1.2;

pub(crate) fn scan(buf: &SampleBuffer, ctx: &DetectionContext, out: &mut Vec<Finding>) {
    let tops = window_pivots(buf, PIVOT_WINDOW, PivotKind::Top);

    let mut li = 0;
    while li < tops.len() {
        let mut matched = false;
        for ri in li + 1..tops.len() {
            let width = tops[ri].index - tops[li].index;
            if width < MIN_WIDTH {
                continue;
            }
            if width > MAX_WIDTH {
                break;
            }
            if let Some(finding) = try_cup(buf, ctx, &tops[li], &tops[ri]) {
                out.push(finding);
                // resume from the right rim so cups do not overlap
                li = ri;
                matched = true;
                break;
            }
        }
        if !matched {
            li += 1;
        }
    }
}

fn try_cup(
    buf: &SampleBuffer,
    ctx: &DetectionContext,
    left: &Pivot,
    right: &Pivot,
) -> Option<Finding> {
    let width = right.index - left.index;
    let (bottom_idx, bottom) = buf.min_low(left.index + 1, right.index - 1);

    let depth_left = left.price - bottom;
    let depth_right = right.price - bottom;
    if depth_left <= 0.0 || depth_right <= 0.0 {
        return None;
    }

    let ratio = depth_right / depth_left;
    if !(RIM_RATIO_MIN..=RIM_RATIO_MAX).contains(&ratio) {
        return None;
    }

    // interior must not overshoot the rims
    let rim_cap = left.price.max(right.price);
    for i in left.index + 1..right.index {
        if buf.high(i) > rim_cap {
            return None;
        }
    }

    // U-shape: lower envelope below the depth thresholds through the middle
    let depth = (depth_left + depth_right) / 2.0;
    let (mid60, mid20) = if ctx.strict {
        (0.55, 0.22)
    } else {
        (0.65, 0.30)
    };
    let lo60 = left.index + width * 20 / 100;
    let hi60 = left.index + width * 80 / 100;
    let lo20 = left.index + width * 40 / 100;
    let hi20 = left.index + width * 60 / 100;
    for i in lo60..=hi60 {
        let cap = if (lo20..=hi20).contains(&i) {
            bottom + depth * mid20
        } else {
            bottom + depth * mid60
        };
        if buf.low(i) > cap {
            return None;
        }
    }

    // handle: breakout above the right rim within width/4 bars
    let limit = (right.index + width / 4).min(buf.end());
    let mut breakout = None;
    let mut handle_low = f64::INFINITY;
    let mut failed = false;
    for i in right.index + 1..=limit {
        handle_low = handle_low.min(buf.low(i));
        if buf.close(i) < bottom {
            failed = true;
            break;
        }
        if buf.close(i) > right.price {
            breakout = Some(i);
            break;
        }
    }
    // a handle that retraces most of the cup is no handle
    if handle_low.is_finite() && handle_low < bottom + depth * 0.4 {
        return None;
    }

    let confirmation = if failed {
        Confirmation::Failed
    } else if breakout.is_some() {
        Confirmation::Confirmed
    } else {
        Confirmation::Pending
    };

    let entry = right.price;
    let stop = if handle_low.is_finite() {
        handle_low
    } else {
        bottom
    };
    let target = right.price + depth_right;

    let symmetry = 1.0 - (1.0 - ratio).abs() / (RIM_RATIO_MAX - 1.0);
    let width_fit = 1.0 - (width - MIN_WIDTH) as f64 / (MAX_WIDTH - MIN_WIDTH) as f64;
    let confidence = score::base(0.66)
        .evidence(0.08, symmetry)
        .evidence(0.05, width_fit)
        .confirmation(confirmation)
        .finish();

    Some(Finding::new(
        PatternKind::CupWithHandle,
        Direction::Bullish,
        left.index,
        bottom_idx,
        right.index,
        entry,
        stop,
        target,
        confidence,
        confirmation,
        Details::Cup {
            left_rim: left.index,
            bottom: bottom_idx,
            right_rim: right.index,
            depth: depth_right,
            breakout,
        },
    ))
}
