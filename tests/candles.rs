use chartscan::prelude::*;

fn bar_buf(bars: &[(f64, f64, f64, f64)]) -> SampleBuffer {
    let open: Vec<f64> = bars.iter().map(|b| b.0).collect();
    let high: Vec<f64> = bars.iter().map(|b| b.1).collect();
    let low: Vec<f64> = bars.iter().map(|b| b.2).collect();
    let close: Vec<f64> = bars.iter().map(|b| b.3).collect();
    SampleBuffer::new(open, high, low, close, vec![0.0; bars.len()]).unwrap()
}

fn scan(buf: &SampleBuffer) -> Vec<Finding> {
    Scanner::new(DetectionContext::default())
        .include_candlesticks(true)
        .scan(buf)
}

/// Declining filler bar: bearish body of 0.5 inside a unit range.
fn decline(c: f64) -> (f64, f64, f64, f64) {
    (c + 0.5, c + 0.7, c - 0.3, c)
}

fn candle_kind_at(findings: &[Finding], end: usize, bars: usize) -> Vec<PatternKind> {
    findings
        .iter()
        .filter(|f| f.end == end && matches!(f.details, Details::Candle { bars: b } if b == bars))
        .map(|f| f.kind)
        .collect()
}

#[test]
fn hammer_after_a_decline() {
    let mut bars: Vec<_> = (0..8).map(|i| decline(100.0 - i as f64)).collect();
    // small body at the top of a lower shadow between two and three times
    // its size (a longer shadow would read as a takuri line)
    bars.push((93.0, 93.3, 92.5, 93.2));
    let buf = bar_buf(&bars);

    let findings = scan(&buf);
    let kinds = candle_kind_at(&findings, 8, 1);
    assert_eq!(kinds, vec![PatternKind::Hammer]);

    let hammer = findings
        .iter()
        .find(|f| f.kind == PatternKind::Hammer)
        .unwrap();
    assert_eq!(hammer.direction, Direction::Bullish);
    // stop under the shadow, target projects twice the risk
    assert!((hammer.entry - 93.2).abs() < 1e-9);
    assert!((hammer.stop - 92.5).abs() < 1e-9);
    assert!((hammer.target - (93.2 + 2.0 * 0.7)).abs() < 1e-6);
    assert!(hammer.confidence >= 0.35 && hammer.confidence <= 0.98);
}

#[test]
fn bullish_engulfing_after_a_decline() {
    let mut bars: Vec<_> = (0..8).map(|i| decline(100.0 - i as f64)).collect();
    bars.push((93.4, 93.6, 92.8, 93.0)); // small bear, idx 8
    bars.push((92.9, 94.1, 92.7, 94.0)); // engulfing bull, idx 9
    let buf = bar_buf(&bars);

    let findings = scan(&buf);
    let kinds = candle_kind_at(&findings, 9, 2);
    assert!(kinds.contains(&PatternKind::EngulfingBull), "got {kinds:?}");
}

#[test]
fn morning_star_resolves_a_downtrend() {
    let mut bars: Vec<_> = (0..9).map(|i| decline(100.0 - i as f64)).collect();
    bars.push((92.2, 92.3, 90.0, 90.2)); // long bear, idx 9
    bars.push((89.8, 89.9, 89.4, 89.6)); // small body gapping under, idx 10
    bars.push((89.9, 91.9, 89.8, 91.8)); // strong white into the first body, idx 11
    let buf = bar_buf(&bars);

    let findings = scan(&buf);
    let kinds = candle_kind_at(&findings, 11, 3);
    assert!(kinds.contains(&PatternKind::MorningStar), "got {kinds:?}");
    let star = findings
        .iter()
        .find(|f| f.kind == PatternKind::MorningStar)
        .unwrap();
    assert_eq!(star.direction, Direction::Bullish);
    assert_eq!((star.start, star.end), (9, 11));
}

#[test]
fn rising_window_on_a_full_gap() {
    let mut bars: Vec<_> = (0..6).map(|_| (100.0, 100.6, 99.6, 100.3)).collect();
    bars.push((101.2, 101.9, 101.0, 101.7)); // gaps above every prior high
    let buf = bar_buf(&bars);

    let findings = scan(&buf);
    let kinds = candle_kind_at(&findings, 6, 2);
    assert!(kinds.contains(&PatternKind::RisingWindow), "got {kinds:?}");
}

#[test]
fn every_bar_gets_exactly_one_single_bar_label() {
    let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.7).sin() * 3.0).collect();
    let bars: Vec<_> = closes
        .iter()
        .map(|c| (c - 0.4, c + 0.6, c - 0.8, *c))
        .collect();
    let buf = bar_buf(&bars);

    let findings = scan(&buf);
    for i in 0..30 {
        let singles = candle_kind_at(&findings, i, 1);
        assert_eq!(singles.len(), 1, "bar {i}: {singles:?}");
    }
}

#[test]
fn findings_serialize_with_uniform_schema() {
    let mut bars: Vec<_> = (0..8).map(|i| decline(100.0 - i as f64)).collect();
    bars.push((93.0, 93.3, 92.5, 93.2));
    let buf = bar_buf(&bars);
    let findings = scan(&buf);
    assert!(!findings.is_empty());

    let json = serde_json::to_value(&findings).unwrap();
    let first = &json[0];
    for field in [
        "kind",
        "label",
        "direction",
        "start",
        "mid",
        "end",
        "entry",
        "stop",
        "target",
        "risk_reward",
        "confidence",
        "confirmed",
        "pending",
        "details",
    ] {
        assert!(first.get(field).is_some(), "missing field {field}");
    }

    let hammer = findings
        .iter()
        .position(|f| f.kind == PatternKind::Hammer)
        .unwrap();
    assert_eq!(json[hammer]["kind"], "HAMMER");
    assert_eq!(json[hammer]["direction"], "bullish");
    assert_eq!(json[hammer]["details"]["family"], "candle");
}
