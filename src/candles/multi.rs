//! Gap-driven and longer multi-session candle formations.
//!
//! Gap rules key off body or range gaps between consecutive sessions; the
//! longer formations cover the three-methods family, ladder bottom,
//! concealing baby swallow, three line strikes and hikkake false breaks.

use crate::{Direction, Finding, PatternKind};

use super::Candles;

pub(crate) fn classify(m: &Candles, i: usize, out: &mut Vec<Finding>) {
    gaps(m, i, out);
    sessions(m, i, out);
}

fn gaps(m: &Candles, i: usize, out: &mut Vec<Finding>) {
    let s = m.buf.start();
    if i < s + 1 {
        return;
    }
    use Direction::{Bearish, Bullish, Neutral};
    use PatternKind::*;

    let p = i - 1;
    let gap_up = m.buf.low(i) > m.buf.high(p);
    let gap_down = m.buf.high(i) < m.buf.low(p);

    if gap_up {
        if m.doji(i) {
            m.push(out, GappingUpDoji, Neutral, p, i, 0.46);
        } else {
            m.push(out, RisingWindow, Bullish, p, i, 0.50);
        }
    }
    if gap_down {
        if m.doji(i) {
            m.push(out, GappingDownDoji, Neutral, p, i, 0.46);
        } else {
            m.push(out, FallingWindow, Bearish, p, i, 0.50);
        }
    }

    if i < s + 2 {
        return;
    }
    let (a, b, c) = (i - 2, i - 1, i);
    let body_gap_up = m.body_bottom(b) > m.body_top(a);
    let body_gap_down = m.body_top(b) < m.body_bottom(a);

    // tasuki gaps: a counter-color bar leans into the gap without closing it
    if m.uptrend(a)
        && m.bull(a)
        && m.bull(b)
        && body_gap_up
        && m.bear(c)
        && m.buf.open(c) >= m.body_bottom(b)
        && m.buf.open(c) <= m.body_top(b)
        && m.buf.close(c) < m.body_bottom(b)
        && m.buf.close(c) > m.body_top(a)
    {
        m.push(out, UpsideTasukiGap, Bullish, a, c, 0.50);
    }
    if m.downtrend(a)
        && m.bear(a)
        && m.bear(b)
        && body_gap_down
        && m.bull(c)
        && m.buf.open(c) >= m.body_bottom(b)
        && m.buf.open(c) <= m.body_top(b)
        && m.buf.close(c) > m.body_top(b)
        && m.buf.close(c) < m.body_bottom(a)
    {
        m.push(out, DownsideTasukiGap, Bearish, a, c, 0.50);
    }

    // upside gap two crows
    if m.uptrend(a)
        && m.bull(a)
        && m.long_body(a)
        && m.bear(b)
        && body_gap_up
        && m.bear(c)
        && m.body_top(c) >= m.body_top(b)
        && m.body_bottom(c) <= m.body_bottom(b)
        && m.buf.close(c) > m.buf.close(a)
    {
        m.push(out, UpsideGapTwoCrows, Bearish, a, c, 0.52);
    }

    // gap three methods: the third bar closes the gap
    if m.uptrend(a)
        && m.bull(a)
        && m.bull(b)
        && body_gap_up
        && m.bear(c)
        && m.buf.open(c) >= m.body_bottom(b)
        && m.buf.open(c) <= m.body_top(b)
        && m.buf.close(c) <= m.body_top(a)
        && m.buf.close(c) >= m.body_bottom(a)
    {
        m.push(out, UpsideGapThreeMethods, Bullish, a, c, 0.50);
    }
    if m.downtrend(a)
        && m.bear(a)
        && m.bear(b)
        && body_gap_down
        && m.bull(c)
        && m.buf.open(c) >= m.body_bottom(b)
        && m.buf.open(c) <= m.body_top(b)
        && m.buf.close(c) >= m.body_bottom(a)
        && m.buf.close(c) <= m.body_top(a)
    {
        m.push(out, DownsideGapThreeMethods, Bearish, a, c, 0.50);
    }

    // two black gapping: a gap down followed by two declining black bars
    if m.downtrend(b)
        && m.buf.high(b) < m.buf.low(a)
        && m.bear(b)
        && m.bear(c)
        && m.buf.low(c) < m.buf.low(b)
        && m.buf.high(c) < m.buf.high(b)
    {
        m.push(out, TwoBlackGapping, Bearish, a, c, 0.54);
    }

    breakaway(m, i, out);
}

/// Five bars: a long bar, a body gap continuing the move, two drifting bars,
/// then a long counter bar closing inside the gap.
fn breakaway(m: &Candles, i: usize, out: &mut Vec<Finding>) {
    if i < m.buf.start() + 4 {
        return;
    }
    let (b1, b2, b3, b4, b5) = (i - 4, i - 3, i - 2, i - 1, i);

    if m.downtrend(b1)
        && m.bear(b1)
        && m.long_body(b1)
        && m.bear(b2)
        && m.body_top(b2) < m.body_bottom(b1)
        && m.buf.close(b3) < m.buf.close(b2)
        && m.bear(b4)
        && m.buf.close(b4) < m.buf.close(b3)
        && m.bull(b5)
        && m.long_body(b5)
        && m.buf.close(b5) > m.body_top(b2)
        && m.buf.close(b5) < m.body_bottom(b1)
    {
        m.push(out, PatternKind::BreakawayBull, Direction::Bullish, b1, b5, 0.54);
    }

    if m.uptrend(b1)
        && m.bull(b1)
        && m.long_body(b1)
        && m.bull(b2)
        && m.body_bottom(b2) > m.body_top(b1)
        && m.buf.close(b3) > m.buf.close(b2)
        && m.bull(b4)
        && m.buf.close(b4) > m.buf.close(b3)
        && m.bear(b5)
        && m.long_body(b5)
        && m.buf.close(b5) < m.body_bottom(b2)
        && m.buf.close(b5) > m.body_top(b1)
    {
        m.push(out, PatternKind::BreakawayBear, Direction::Bearish, b1, b5, 0.54);
    }
}

fn sessions(m: &Candles, i: usize, out: &mut Vec<Finding>) {
    let s = m.buf.start();
    use Direction::{Bearish, Bullish};
    use PatternKind::*;

    // four-bar formations
    if i >= s + 3 {
        let (b1, b2, b3, b4) = (i - 3, i - 2, i - 1, i);

        // concealing baby swallow
        if m.downtrend(b1)
            && m.bear(b1)
            && m.bare(b1)
            && m.bear(b2)
            && m.bare(b2)
            && m.buf.close(b2) < m.buf.close(b1)
            && m.bear(b3)
            && m.buf.open(b3) < m.buf.close(b2)
            && m.buf.high(b3) > m.buf.close(b2)
            && m.bear(b4)
            && m.buf.high(b4) > m.buf.high(b3)
            && m.buf.low(b4) < m.buf.low(b3)
        {
            m.push(out, ConcealingBabySwallow, Bullish, b1, b4, 0.56);
        }

        // three line strikes
        let three_bulls = m.bull(b1)
            && m.bull(b2)
            && m.bull(b3)
            && m.buf.close(b2) > m.buf.close(b1)
            && m.buf.close(b3) > m.buf.close(b2);
        if three_bulls
            && m.bear(b4)
            && m.buf.open(b4) > m.buf.close(b3)
            && m.buf.close(b4) < m.buf.open(b1)
        {
            m.push(out, ThreeLineStrikeBull, Bullish, b1, b4, 0.52);
        }
        let three_bears = m.bear(b1)
            && m.bear(b2)
            && m.bear(b3)
            && m.buf.close(b2) < m.buf.close(b1)
            && m.buf.close(b3) < m.buf.close(b2);
        if three_bears
            && m.bull(b4)
            && m.buf.open(b4) < m.buf.close(b3)
            && m.buf.close(b4) > m.buf.open(b1)
        {
            m.push(out, ThreeLineStrikeBear, Bearish, b1, b4, 0.52);
        }

        // hikkake: inside bar, false break, close back through the inside bar
        if m.buf.high(b2) < m.buf.high(b1)
            && m.buf.low(b2) > m.buf.low(b1)
            && m.buf.low(b3) < m.buf.low(b2)
            && m.buf.high(b3) <= m.buf.high(b2)
            && m.buf.close(b4) > m.buf.high(b2)
        {
            m.push(out, HikkakeBull, Bullish, b1, b4, 0.52);
        }
        if m.buf.high(b2) < m.buf.high(b1)
            && m.buf.low(b2) > m.buf.low(b1)
            && m.buf.high(b3) > m.buf.high(b2)
            && m.buf.low(b3) >= m.buf.low(b2)
            && m.buf.close(b4) < m.buf.low(b2)
        {
            m.push(out, HikkakeBear, Bearish, b1, b4, 0.52);
        }
    }

    // five-bar formations
    if i >= s + 4 {
        let (b1, b2, b3, b4, b5) = (i - 4, i - 3, i - 2, i - 1, i);

        // rising three methods
        let small_pullback_bulls = (b2..=b4).all(|k| {
            m.short_body(k) && m.buf.low(k) >= m.buf.low(b1) && m.buf.high(k) <= m.buf.high(b1)
        });
        if m.bull(b1)
            && m.long_body(b1)
            && small_pullback_bulls
            && m.bull(b5)
            && m.long_body(b5)
            && m.buf.close(b5) > m.buf.close(b1)
        {
            m.push(out, RisingThreeMethods, Bullish, b1, b5, 0.56);
        }

        // falling three methods
        let small_pullback_bears = (b2..=b4).all(|k| {
            m.short_body(k) && m.buf.low(k) >= m.buf.low(b1) && m.buf.high(k) <= m.buf.high(b1)
        });
        if m.bear(b1)
            && m.long_body(b1)
            && small_pullback_bears
            && m.bear(b5)
            && m.long_body(b5)
            && m.buf.close(b5) < m.buf.close(b1)
        {
            m.push(out, FallingThreeMethods, Bearish, b1, b5, 0.56);
        }

        // mat hold: the pullback starts with a gap up and holds the body
        let holds = (b2..=b4).all(|k| {
            m.short_body(k) && m.buf.close(k) > m.body_bottom(b1)
        });
        if m.bull(b1)
            && m.long_body(b1)
            && m.buf.open(b2) > m.buf.close(b1)
            && holds
            && m.bull(b5)
            && m.buf.close(b5) > m.buf.max_high(b2, b4).1
            && m.buf.close(b5) > m.buf.close(b1)
        {
            m.push(out, MatHold, Bullish, b1, b5, 0.54);
        }

        // ladder bottom
        if m.downtrend(b1)
            && m.bear(b1)
            && m.bear(b2)
            && m.bear(b3)
            && m.buf.close(b2) < m.buf.close(b1)
            && m.buf.close(b3) < m.buf.close(b2)
            && m.bear(b4)
            && m.upper_shadow(b4) > m.body(b4)
            && m.bull(b5)
            && m.buf.open(b5) > m.buf.open(b4)
            && m.buf.close(b5) > m.buf.high(b4)
        {
            m.push(out, LadderBottom, Bullish, b1, b5, 0.54);
        }
    }
}
