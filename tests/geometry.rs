use chartscan::geometry::{
    find_pivots, trend_direction, window_pivots, PivotKind, TrendDirection,
};
use chartscan::SampleBuffer;
use proptest::prelude::*;

fn buf_from_mids(mids: &[f64]) -> SampleBuffer {
    let open: Vec<f64> = mids.iter().map(|m| m - 0.1).collect();
    let high: Vec<f64> = mids.iter().map(|m| m + 0.5).collect();
    let low: Vec<f64> = mids.iter().map(|m| m - 0.5).collect();
    SampleBuffer::new(open, high, low, mids.to_vec(), vec![0.0; mids.len()]).unwrap()
}

#[test]
fn two_clear_tops_are_both_found() {
    // rise to 110 at 10, dip to 100, rise to 112 at 30, then fade
    let mut values = Vec::new();
    values.extend((0..=10).map(|i| 100.0 + i as f64));
    values.extend((1..=10).map(|i| 110.0 - i as f64));
    values.extend((1..=10).map(|i| 100.0 + 1.2 * i as f64));
    values.extend((1..=8).map(|i| 112.0 - i as f64));

    let pivots = find_pivots(&values, 5, PivotKind::Top);
    let indices: Vec<usize> = pivots.iter().map(|p| p.index).collect();
    assert!(indices.contains(&10), "pivots: {indices:?}");
    assert!(indices.contains(&30), "pivots: {indices:?}");
}

#[test]
fn flat_shelf_does_not_validate_as_pivot() {
    // a plateau of equal highs never has strictly lower bars behind it
    let mut values = vec![100.0; 20];
    values.extend((1..=10).map(|i| 100.0 - i as f64));
    let pivots = find_pivots(&values, 5, PivotKind::Top);
    assert!(pivots.is_empty(), "pivots: {pivots:?}");
}

#[test]
fn window_pivots_report_global_indices() {
    let n = 30;
    let mut high = vec![100.0; n];
    high[15] = 110.0;
    let low: Vec<f64> = high.iter().map(|h| h - 1.0).collect();
    let close: Vec<f64> = high.iter().map(|h| h - 0.5).collect();
    let buf = SampleBuffer::new(close.clone(), high, low, close, vec![0.0; n])
        .unwrap()
        .with_window(5, 25)
        .unwrap();

    let tops = window_pivots(&buf, 3, PivotKind::Top);
    assert_eq!(tops.len(), 1);
    assert_eq!(tops[0].index, 15);
    assert_eq!(tops[0].price, 110.0);
}

#[test]
fn recency_overrides_fitted_uptrend() {
    // fitted slope is positive but the latest bar turned down
    let buf = buf_from_mids(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 103.0]);
    assert_eq!(trend_direction(&buf, 6, 7), TrendDirection::Down);
}

#[test]
fn steady_rise_reads_up() {
    let buf = buf_from_mids(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0]);
    assert_eq!(trend_direction(&buf, 6, 7), TrendDirection::Up);
}

proptest! {
    #[test]
    fn monotone_series_has_at_most_one_top(
        steps in prop::collection::vec(0.01..2.0f64, 10..60),
        window in 2usize..8,
    ) {
        let mut values = vec![100.0];
        for s in steps {
            values.push(values.last().unwrap() + s);
        }
        let pivots = find_pivots(&values, window, PivotKind::Top);
        prop_assert!(pivots.len() <= 1, "pivots: {pivots:?}");
    }

    #[test]
    fn pivots_are_local_extremes(
        values in prop::collection::vec(50.0..150.0f64, 20..80),
        window in 2usize..6,
    ) {
        for p in find_pivots(&values, window, PivotKind::Top) {
            // validated against `window` bars behind and the countdown span ahead
            let lo = p.index.saturating_sub(window);
            let hi = (p.index + window - 1).min(values.len() - 1);
            for i in lo..=hi {
                prop_assert!(values[i] <= p.price, "bar {i} above pivot {p:?}");
            }
        }
    }
}
