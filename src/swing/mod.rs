//! Swing-pattern family detectors.
//!
//! Every family follows the same shape: locate candidate pivots, validate
//! geometry and tolerances, derive the entry/stop/target triple, run the
//! confirmation scanner, then score. Families are isolated from each other;
//! a family that finds nothing contributes zero findings.

pub mod channel;
pub mod cup;
pub mod double;
pub mod head_shoulders;
pub mod triangle;
pub mod vcp;

use crate::{DetectionContext, Finding, SampleBuffer};

/// Pivot confirmation window shared by the wide-formation families.
pub(crate) const PIVOT_WINDOW: usize = 5;

pub(crate) fn run_all(buf: &SampleBuffer, ctx: &DetectionContext, out: &mut Vec<Finding>) {
    let before = out.len();
    cup::scan(buf, ctx, out);
    double::scan(buf, ctx, out);
    triangle::scan(buf, ctx, out);
    head_shoulders::scan(buf, ctx, out);
    channel::scan(buf, ctx, out);
    vcp::scan(buf, ctx, out);
    log::trace!("swing families produced {} findings", out.len() - before);
}
