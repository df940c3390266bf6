use chartscan::prelude::*;
use proptest::prelude::*;

fn wave_request(n: usize) -> ScanRequest {
    let close: Vec<f64> = (0..n).map(|i| 100.0 + (i as f64 * 0.4).sin() * 4.0).collect();
    ScanRequest {
        open: close.iter().map(|c| c - 0.3).collect(),
        high: close.iter().map(|c| c + 0.8).collect(),
        low: close.iter().map(|c| c - 0.8).collect(),
        close,
        volume: vec![1000.0; n],
        ..Default::default()
    }
}

#[test]
fn fewer_than_five_bars_yields_nothing() {
    let findings = detect(wave_request(4), MarketKind::Equity).unwrap();
    assert!(findings.is_empty());
}

#[test]
fn candlesticks_are_opt_in() {
    let findings = detect(wave_request(60), MarketKind::Equity).unwrap();
    assert!(findings
        .iter()
        .all(|f| !matches!(f.details, Details::Candle { .. })));

    let mut req = wave_request(60);
    req.include_candlesticks = true;
    let findings = detect(req, MarketKind::Equity).unwrap();
    assert!(findings
        .iter()
        .any(|f| matches!(f.details, Details::Candle { .. })));
}

#[test]
fn confidence_floor_filters_output() {
    let req = wave_request(60);
    let buf = SampleBuffer::new(req.open, req.high, req.low, req.close, req.volume).unwrap();

    let all = Scanner::new(DetectionContext::default())
        .include_candlesticks(true)
        .scan(&buf);
    let filtered = Scanner::new(DetectionContext::default())
        .include_candlesticks(true)
        .min_confidence(0.5)
        .scan(&buf);

    assert!(filtered.len() <= all.len());
    assert!(filtered.iter().all(|f| f.confidence >= 0.5));
    let expected = all.iter().filter(|f| f.confidence >= 0.5).count();
    assert_eq!(filtered.len(), expected);
}

#[test]
fn mismatched_columns_are_rejected() {
    let mut req = wave_request(20);
    req.low.pop();
    let err = detect(req, MarketKind::Equity).unwrap_err();
    assert!(matches!(err, ScanError::LengthMismatch { field: "low", .. }));
}

#[test]
fn parallel_scan_separates_failures() {
    let scanner = Scanner::new(DetectionContext::default());
    let bad = ScanRequest::default(); // empty columns
    let jobs = vec![("GOOD", wave_request(60)), ("BAD", bad)];

    let (results, errors) = scan_parallel(&scanner, jobs);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].symbol, "GOOD");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].symbol, "BAD");
    assert_eq!(errors[0].error, ScanError::EmptyInput);
}

#[test]
fn request_deserializes_from_json() {
    let req: ScanRequest = serde_json::from_str(
        r#"{
            "open": [1.0, 1.1],
            "high": [1.2, 1.3],
            "low": [0.9, 1.0],
            "close": [1.1, 1.2],
            "volume": [10.0, 12.0],
            "strict": true
        }"#,
    )
    .unwrap();
    assert!(req.strict);
    assert!(!req.include_candlesticks);
    assert_eq!(req.close.len(), 2);
}

fn series_strategy() -> impl Strategy<Value = Vec<(f64, f64, f64, f64)>> {
    // (close, up wick, down wick, body offset) per bar
    prop::collection::vec(
        (10.0..500.0f64, 0.0..3.0f64, 0.0..3.0f64, -1.0..1.0f64),
        5..90,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .map(|(c, up, down, off)| {
                let high = c + up;
                let low = c - down;
                let open = (c + off).clamp(low, high);
                (open, high, low, c)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn findings_satisfy_schema_invariants(bars in series_strategy()) {
        let open: Vec<f64> = bars.iter().map(|b| b.0).collect();
        let high: Vec<f64> = bars.iter().map(|b| b.1).collect();
        let low: Vec<f64> = bars.iter().map(|b| b.2).collect();
        let close: Vec<f64> = bars.iter().map(|b| b.3).collect();
        let n = bars.len();
        let buf = SampleBuffer::new(open, high, low, close, vec![0.0; n]).unwrap();

        let findings = Scanner::new(DetectionContext::default())
            .include_candlesticks(true)
            .scan(&buf);

        for f in &findings {
            prop_assert!(f.start <= f.mid && f.mid <= f.end, "{:?}", f.kind);
            prop_assert!(f.end < n);
            prop_assert!((0.0..=1.0).contains(&f.confidence));
            prop_assert!(f.entry.is_finite() && f.stop.is_finite() && f.target.is_finite());
            prop_assert!(!(f.confirmed && f.pending));

            // risk/reward is derivable from the rounded price levels
            let risk = (f.entry - f.stop).abs();
            let expected = if risk > 0.0 {
                (f.target - f.entry).abs() / risk
            } else {
                0.0
            };
            prop_assert!((f.risk_reward - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn strict_mode_never_widens_the_result_set(bars in series_strategy()) {
        let open: Vec<f64> = bars.iter().map(|b| b.0).collect();
        let high: Vec<f64> = bars.iter().map(|b| b.1).collect();
        let low: Vec<f64> = bars.iter().map(|b| b.2).collect();
        let close: Vec<f64> = bars.iter().map(|b| b.3).collect();
        let n = bars.len();
        let buf = SampleBuffer::new(open, high, low, close, vec![0.0; n]).unwrap();

        let loose = Scanner::new(DetectionContext::default()).scan(&buf);
        let strict = Scanner::new(DetectionContext::strict()).scan(&buf);

        // strict tolerances only remove cup and channel candidates
        let swing = |fs: &[Finding]| {
            fs.iter()
                .filter(|f| matches!(f.details, Details::Cup { .. } | Details::Channel { .. }))
                .count()
        };
        prop_assert!(swing(&strict) <= swing(&loose));
    }
}
