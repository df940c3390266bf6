use chartscan::prelude::*;

fn bar_buf(bars: &[(f64, f64, f64, f64)]) -> SampleBuffer {
    let open: Vec<f64> = bars.iter().map(|b| b.0).collect();
    let high: Vec<f64> = bars.iter().map(|b| b.1).collect();
    let low: Vec<f64> = bars.iter().map(|b| b.2).collect();
    let close: Vec<f64> = bars.iter().map(|b| b.3).collect();
    SampleBuffer::new(open, high, low, close, vec![0.0; bars.len()]).unwrap()
}

fn scan(buf: &SampleBuffer) -> Vec<Finding> {
    Scanner::new(DetectionContext::default()).scan(buf)
}

fn kinds_at(findings: &[Finding], end: usize) -> Vec<PatternKind> {
    findings
        .iter()
        .filter(|f| f.end == end && matches!(f.details, Details::Daily { .. }))
        .map(|f| f.kind)
        .collect()
}

/// Ordinary filler bar of unit range around a close.
fn filler(c: f64) -> (f64, f64, f64, f64) {
    (c + 0.2, c + 0.5, c - 0.5, c)
}

#[test]
fn inside_day_is_neutral_with_bar_levels() {
    let mut bars: Vec<_> = (0..6).map(|_| filler(100.0)).collect();
    bars.push((100.0, 102.0, 98.0, 101.0)); // wide bar, idx 6
    bars.push((100.2, 101.0, 99.0, 100.5)); // inside bar, idx 7
    let buf = bar_buf(&bars);

    let findings = scan(&buf);
    let inside = findings
        .iter()
        .find(|f| f.kind == PatternKind::InsideDay)
        .expect("inside day not found");
    assert_eq!(inside.direction, Direction::Neutral);
    assert_eq!((inside.start, inside.end), (6, 7));
    assert!((inside.entry - 100.5).abs() < 1e-9);
    assert!((inside.stop - 99.0).abs() < 1e-9);
    assert!((inside.target - 101.0).abs() < 1e-9);
}

#[test]
fn seven_bar_narrow_range_outranks_four_bar() {
    let mut bars: Vec<_> = (0..9).map(|_| filler(100.0)).collect();
    bars.push((100.0, 100.1, 99.9, 100.05)); // range 0.2, idx 9
    let buf = bar_buf(&bars);

    let findings = scan(&buf);
    let kinds = kinds_at(&findings, 9);
    assert!(kinds.contains(&PatternKind::NarrowRange7));
    assert!(!kinds.contains(&PatternKind::NarrowRange4));
}

#[test]
fn three_bar_reversal_bull() {
    let mut bars: Vec<_> = (0..5).map(|_| filler(100.0)).collect();
    bars.push((100.0, 100.5, 98.5, 99.0)); // bear, idx 5
    bars.push((99.0, 99.5, 98.0, 98.6)); // lower low, idx 6
    bars.push((98.8, 100.3, 98.5, 100.0)); // closes above bar 6 high, idx 7
    let buf = bar_buf(&bars);

    let findings = scan(&buf);
    let rev = findings
        .iter()
        .find(|f| f.kind == PatternKind::ThreeBarReversalBull)
        .expect("reversal not found");
    assert_eq!(rev.direction, Direction::Bullish);
    assert_eq!((rev.start, rev.end), (5, 7));
    assert!((rev.entry - 100.3).abs() < 1e-9);
    assert!((rev.stop - 98.5).abs() < 1e-9);
}

#[test]
fn spike_low_needs_a_right_neighbor() {
    let mut bars: Vec<_> = (0..5).map(|_| filler(100.0)).collect();
    bars.push((100.0, 100.0, 95.0, 99.5)); // deep probe, idx 5
    bars.push(filler(100.0)); // idx 6
    let buf = bar_buf(&bars);

    let findings = scan(&buf);
    let spike = findings
        .iter()
        .find(|f| f.kind == PatternKind::SpikeLow)
        .expect("spike low not found");
    assert_eq!(spike.direction, Direction::Bullish);
    assert_eq!((spike.start, spike.mid, spike.end), (4, 5, 6));

    // without the right neighbor the probe bar stays unclassified
    let truncated = bar_buf(&bars[..6]);
    let findings = scan(&truncated);
    assert!(findings.iter().all(|f| f.kind != PatternKind::SpikeLow));
}

#[test]
fn closing_price_reversal_after_decline() {
    let mut bars: Vec<_> = Vec::new();
    for i in 0..8 {
        bars.push(filler(100.0 - i as f64)); // steady decline to 93
    }
    // wide recovery bar: opens low, probes a new low, closes near the high
    bars.push((93.8, 100.0, 92.0, 98.5));
    let buf = bar_buf(&bars);

    let findings = scan(&buf);
    let kinds = kinds_at(&findings, 8);
    assert!(
        kinds.contains(&PatternKind::ClosingPriceReversalBull),
        "got {kinds:?}"
    );
    assert!(!kinds.contains(&PatternKind::OpeningPriceReversalBull));
}

#[test]
fn opening_price_reversal_gaps_below_prior_low() {
    let mut bars: Vec<_> = Vec::new();
    for i in 0..8 {
        bars.push(filler(100.0 - i as f64));
    }
    // gaps under the prior low (92.5) and recovers into the top quartile
    bars.push((92.3, 94.2, 92.0, 93.9));
    let buf = bar_buf(&bars);

    let findings = scan(&buf);
    let kinds = kinds_at(&findings, 8);
    assert!(
        kinds.contains(&PatternKind::OpeningPriceReversalBull),
        "got {kinds:?}"
    );
}
