use chartscan::prelude::*;

/// Build a buffer from per-bar lows with a fixed 1.0 range.
fn buf_from_lows(lows: &[f64]) -> SampleBuffer {
    let open: Vec<f64> = lows.iter().map(|l| l + 0.3).collect();
    let high: Vec<f64> = lows.iter().map(|l| l + 1.0).collect();
    let close: Vec<f64> = lows.iter().map(|l| l + 0.5).collect();
    SampleBuffer::new(open, high, lows.to_vec(), close, vec![0.0; lows.len()]).unwrap()
}

fn scan(buf: &SampleBuffer) -> Vec<Finding> {
    Scanner::new(DetectionContext::default()).scan(buf)
}

#[test]
fn double_bottom_levels_and_confirmation() {
    // decline from ~134 to 90.0, rally to a 110.0 peak, second bottom at
    // 90.2, then a rally that clears the peak
    let mut lows = Vec::with_capacity(80);
    for i in 0..30 {
        lows.push(134.0 - 1.5 * i as f64);
    }
    lows.push(90.0); // idx 30
    for i in 31..45 {
        lows.push(90.0 + 1.3 * (i - 30) as f64);
    }
    lows.push(108.5); // idx 45, shaped below into the peak bar
    for i in 46..60 {
        lows.push(108.5 - 1.3 * (i - 45) as f64);
    }
    lows.push(90.2); // idx 60
    for i in 61..80 {
        lows.push(90.2 + 1.2 * (i - 60) as f64);
    }
    let mut high: Vec<f64> = lows.iter().map(|l| l + 1.0).collect();
    high[45] = 110.0; // intervening peak
    let open: Vec<f64> = lows.iter().map(|l| l + 0.3).collect();
    let close: Vec<f64> = lows.iter().map(|l| l + 0.5).collect();
    let n = lows.len();
    let buf = SampleBuffer::new(open, high, lows, close, vec![0.0; n]).unwrap();

    let findings = scan(&buf);
    let db = findings
        .iter()
        .find(|f| f.kind == PatternKind::DoubleBottomAdamAdam)
        .expect("double bottom not found");

    assert_eq!(db.direction, Direction::Bullish);
    assert!((db.entry - 110.0).abs() < 1e-9);
    assert!((db.stop - 88.2).abs() < 1e-9);
    assert!((db.target - 130.0).abs() < 1e-9);
    assert!(db.confirmed);
    assert!(!db.pending);
    assert!((db.risk_reward - 20.0 / 21.8).abs() < 1e-6);
    match &db.details {
        Details::Extremes { shapes, .. } => {
            assert_eq!(shapes, &[BottomShape::Adam, BottomShape::Adam]);
        }
        other => panic!("unexpected details: {other:?}"),
    }
}

#[test]
fn cup_with_handle_breaks_out() {
    // rims at 100.0 / 100.4, bottom at 80.0, handle near 95, breakout close
    let n = 111;
    let mut low = Vec::with_capacity(n);
    for i in 0..=20 {
        low.push(89.0 + 0.5 * i as f64);
    }
    for i in 21..=50 {
        low.push(99.0 - (19.0 / 30.0) * (i - 20) as f64);
    }
    for i in 51..=80 {
        low.push(80.0 + (19.4 / 30.0) * (i - 50) as f64);
    }
    for _ in 81..=90 {
        low.push(95.0);
    }
    for i in 91..=110 {
        low.push(100.0 + 0.2 * (i - 91) as f64);
    }
    let high: Vec<f64> = low.iter().map(|l| l + 1.0).collect();
    let open: Vec<f64> = low.iter().map(|l| l + 0.3).collect();
    let mut close: Vec<f64> = low.iter().map(|l| l + 0.7).collect();
    for i in 81..=90 {
        close[i] = 96.0;
    }
    for i in 91..=110 {
        close[i] = 101.0 + 0.2 * (i - 91) as f64;
    }
    let buf = SampleBuffer::new(open, high, low, close, vec![0.0; n]).unwrap();

    let findings = scan(&buf);
    let cup = findings
        .iter()
        .find(|f| f.kind == PatternKind::CupWithHandle)
        .expect("cup not found");

    assert!(cup.confirmed);
    assert!((cup.entry - 100.4).abs() < 1e-6);
    assert!((cup.stop - 95.0).abs() < 1e-6);
    assert!((cup.target - 120.8).abs() < 1e-6);
    match &cup.details {
        Details::Cup {
            bottom, breakout, ..
        } => {
            assert_eq!(*bottom, 50);
            assert_eq!(*breakout, Some(91));
        }
        other => panic!("unexpected details: {other:?}"),
    }
}

#[test]
fn head_and_shoulders_with_flat_neckline() {
    let mut close = Vec::with_capacity(66);
    for i in 0..=20 {
        close.push(81.0 + 0.925 * i as f64);
    }
    for i in 21..=28 {
        close.push(99.5 - 0.5 * (i - 20) as f64);
    }
    for i in 29..=35 {
        close.push(95.5 + 2.0 * (i - 28) as f64);
    }
    for i in 36..=43 {
        close.push(109.5 - 1.75 * (i - 35) as f64);
    }
    for i in 44..=50 {
        close.push(95.5 + (4.5 / 7.0) * (i - 43) as f64);
    }
    for i in 51..=65 {
        close.push(100.0 - (i - 50) as f64);
    }
    let open: Vec<f64> = close.iter().map(|c| c - 0.2).collect();
    let high: Vec<f64> = close.iter().map(|c| c + 0.5).collect();
    let low: Vec<f64> = close.iter().map(|c| c - 0.5).collect();
    let n = close.len();
    let buf = SampleBuffer::new(open, high, low, close, vec![0.0; n]).unwrap();

    let findings = scan(&buf);
    let hs = findings
        .iter()
        .find(|f| f.kind == PatternKind::HeadAndShoulders)
        .expect("head and shoulders not found");

    assert_eq!(hs.direction, Direction::Bearish);
    assert!(hs.confirmed);
    assert!((hs.entry - 95.0).abs() < 1e-6);
    assert!((hs.target - 80.0).abs() < 1e-6);
    match &hs.details {
        Details::HeadShoulders { head, neckline, .. } => {
            assert_eq!(*head, 35);
            assert!((neckline - 95.0).abs() < 1e-6);
        }
        other => panic!("unexpected details: {other:?}"),
    }
}

#[test]
fn volatility_contraction_with_shrinking_swings() {
    let mut close = Vec::with_capacity(60);
    close.push(100.0);
    for i in 1..=8 {
        close.push(100.0 - 1.25 * i as f64);
    }
    for i in 9..=16 {
        close.push(90.0 + 1.25 * (i - 8) as f64);
    }
    for i in 17..=24 {
        close.push(100.0 - (i - 16) as f64);
    }
    for i in 25..=32 {
        close.push(92.0 + (i - 24) as f64);
    }
    for i in 33..=40 {
        close.push(100.0 - 0.775 * (i - 32) as f64);
    }
    for i in 41..=59 {
        close.push(93.8 + 0.28 * (i - 40) as f64);
    }
    let open: Vec<f64> = close.iter().map(|c| c - 0.1).collect();
    let high: Vec<f64> = close.iter().map(|c| c + 0.2).collect();
    let low: Vec<f64> = close.iter().map(|c| c - 0.2).collect();
    let n = close.len();
    let buf = SampleBuffer::new(open, high, low, close, vec![0.0; n]).unwrap();

    let findings = scan(&buf);
    let vcp = findings
        .iter()
        .find(|f| f.kind == PatternKind::VolatilityContraction)
        .expect("contraction not found");

    assert_eq!(vcp.direction, Direction::Bullish);
    assert!(vcp.pending);
    match &vcp.details {
        Details::Contraction { depths } => {
            assert_eq!(depths.len(), 3);
            assert!(depths[1] < depths[0]);
            assert!(depths[2] < depths[1]);
        }
        other => panic!("unexpected details: {other:?}"),
    }
}

#[test]
fn high_tight_flags_never_overlap() {
    // two vertical poles with tight flags; the scan must resume past each
    // reported flag
    let mut close = Vec::with_capacity(120);
    for _ in 0..=4 {
        close.push(10.0);
    }
    for i in 5..=14 {
        close.push(10.0 * (1.0 + 0.095 * (i - 4) as f64));
    }
    for _ in 15..=22 {
        close.push(19.0);
    }
    for i in 23..=30 {
        close.push(19.0 * (1.0 + 0.12 * (i - 22) as f64));
    }
    for _ in 31..=119 {
        close.push(36.0);
    }
    let open: Vec<f64> = close.iter().map(|c| c - 0.1).collect();
    let high: Vec<f64> = close.iter().map(|c| c + 0.2).collect();
    let low: Vec<f64> = close.iter().map(|c| c - 0.5).collect();
    let n = close.len();
    let buf = SampleBuffer::new(open, high, low, close, vec![0.0; n]).unwrap();

    let findings = scan(&buf);
    let flags: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.kind == PatternKind::HighTightFlag)
        .collect();

    assert!(flags.len() >= 2, "expected repeated flags, got {}", flags.len());
    for pair in flags.windows(2) {
        assert!(
            pair[1].mid > pair[0].end,
            "flags overlap: {}..{} then pole at {}",
            pair[0].mid,
            pair[0].end,
            pair[1].mid
        );
    }
    for f in &flags {
        assert_eq!(f.direction, Direction::Bullish);
        assert!(f.entry > f.stop);
    }
}

#[test]
fn short_series_produces_no_swing_findings() {
    let lows: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
    let buf = buf_from_lows(&lows);
    let findings = scan(&buf);
    assert!(findings.iter().all(|f| !matches!(
        f.details,
        Details::Cup { .. }
            | Details::Extremes { .. }
            | Details::Triangle { .. }
            | Details::HeadShoulders { .. }
            | Details::Channel { .. }
            | Details::Flag { .. }
            | Details::Contraction { .. }
    )));
}
