//! Three-bar candle formations completing on bar `i`.

use crate::{Direction, Finding, PatternKind};

use super::Candles;

pub(crate) fn classify(m: &Candles, i: usize, out: &mut Vec<Finding>) {
    if i < m.buf.start() + 2 {
        return;
    }
    let (a, b, c) = (i - 2, i - 1, i);
    use Direction::{Bearish, Bullish};
    use PatternKind::*;

    let mid_a = (m.buf.open(a) + m.buf.close(a)) / 2.0;

    // star group, bullish: long black, small body gapping below, strong white
    if m.downtrend(b) && m.bear(a) && m.long_body(a) && m.body_top(b) < m.buf.close(a) {
        let strong_white = m.bull(c) && m.buf.close(c) > mid_a;
        if strong_white {
            if m.doji(b) {
                if m.buf.high(b) < m.buf.low(a) && m.buf.high(b) < m.buf.low(c) {
                    m.push(out, AbandonedBabyBull, Bullish, a, c, 0.62);
                } else {
                    m.push(out, MorningDojiStar, Bullish, a, c, 0.58);
                }
            } else if m.short_body(b) {
                m.push(out, MorningStar, Bullish, a, c, 0.56);
            }
        }
    }

    // star group, bearish
    if m.uptrend(b) && m.bull(a) && m.long_body(a) && m.body_bottom(b) > m.buf.close(a) {
        let strong_black = m.bear(c) && m.buf.close(c) < mid_a;
        if strong_black {
            if m.doji(b) {
                if m.buf.low(b) > m.buf.high(a) && m.buf.low(b) > m.buf.high(c) {
                    m.push(out, AbandonedBabyBear, Bearish, a, c, 0.62);
                } else {
                    m.push(out, EveningDojiStar, Bearish, a, c, 0.58);
                }
            } else if m.short_body(b) {
                m.push(out, EveningStar, Bearish, a, c, 0.56);
            }
        }
    }

    // three advancing / declining long bodies
    let stacked_bulls = m.bull(a)
        && m.bull(b)
        && m.bull(c)
        && m.buf.close(b) > m.buf.close(a)
        && m.buf.close(c) > m.buf.close(b)
        && m.buf.open(b) > m.buf.open(a)
        && m.buf.open(b) < m.buf.close(a)
        && m.buf.open(c) > m.buf.open(b)
        && m.buf.open(c) < m.buf.close(b);
    if stacked_bulls {
        let shrinking = m.body(b) < m.body(a) && m.body(c) < m.body(b);
        let rising_shadows =
            m.upper_shadow(b) > m.upper_shadow(a) && m.upper_shadow(c) > m.upper_shadow(b);
        if m.uptrend(a) && shrinking && rising_shadows {
            m.push(out, AdvanceBlock, Bearish, a, c, 0.50);
        } else if m.long_body(a) && m.long_body(b) {
            m.push(out, ThreeWhiteSoldiers, Bullish, a, c, 0.60);
        }
    }

    let stacked_bears = m.bear(a)
        && m.bear(b)
        && m.bear(c)
        && m.buf.close(b) < m.buf.close(a)
        && m.buf.close(c) < m.buf.close(b)
        && m.buf.open(b) < m.buf.open(a)
        && m.buf.open(b) > m.buf.close(a)
        && m.buf.open(c) < m.buf.open(b)
        && m.buf.open(c) > m.buf.close(b);
    if stacked_bears && m.long_body(a) && m.long_body(b) {
        m.push(out, ThreeBlackCrows, Bearish, a, c, 0.60);
    }

    // identical crows open at the prior close instead of inside the body
    if m.bear(a)
        && m.bear(b)
        && m.bear(c)
        && m.near(m.buf.open(b), m.buf.close(a))
        && m.near(m.buf.open(c), m.buf.close(b))
        && m.buf.close(b) < m.buf.close(a)
        && m.buf.close(c) < m.buf.close(b)
    {
        m.push(out, IdenticalThreeCrows, Bearish, a, c, 0.58);
    }

    // two crows: a gap-up pair of black bars erasing into the white body
    if m.uptrend(a)
        && m.bull(a)
        && m.long_body(a)
        && m.bear(b)
        && m.body_bottom(b) > m.buf.close(a)
        && m.bear(c)
        && m.buf.open(c) >= m.body_bottom(b)
        && m.buf.open(c) <= m.body_top(b)
        && m.buf.close(c) < m.buf.close(a)
        && m.buf.close(c) > m.buf.open(a)
    {
        m.push(out, TwoCrows, Bearish, a, c, 0.52);
    }

    // harami plus a confirming third close
    let harami_bull = m.bear(a)
        && m.long_body(a)
        && m.body_top(b) <= m.body_top(a)
        && m.body_bottom(b) >= m.body_bottom(a)
        && m.bull(b);
    if m.downtrend(b) && harami_bull && m.buf.close(c) > m.body_top(a) {
        m.push(out, ThreeInsideUp, Bullish, a, c, 0.56);
    }
    let harami_bear = m.bull(a)
        && m.long_body(a)
        && m.body_top(b) <= m.body_top(a)
        && m.body_bottom(b) >= m.body_bottom(a)
        && m.bear(b);
    if m.uptrend(b) && harami_bear && m.buf.close(c) < m.body_bottom(a) {
        m.push(out, ThreeInsideDown, Bearish, a, c, 0.56);
    }

    // engulfing plus a confirming third close
    let engulf_bull = m.bear(a)
        && m.bull(b)
        && m.body_top(b) >= m.body_top(a)
        && m.body_bottom(b) <= m.body_bottom(a)
        && m.body(b) > m.body(a);
    if m.downtrend(b) && engulf_bull && m.buf.close(c) > m.buf.close(b) {
        m.push(out, ThreeOutsideUp, Bullish, a, c, 0.58);
    }
    let engulf_bear = m.bull(a)
        && m.bear(b)
        && m.body_top(b) >= m.body_top(a)
        && m.body_bottom(b) <= m.body_bottom(a)
        && m.body(b) > m.body(a);
    if m.uptrend(b) && engulf_bear && m.buf.close(c) < m.buf.close(b) {
        m.push(out, ThreeOutsideDown, Bearish, a, c, 0.58);
    }

    // three stars in the south: shrinking black bars with rising lows
    if m.downtrend(a)
        && m.bear(a)
        && m.bear(b)
        && m.bear(c)
        && m.long_body(a)
        && m.lower_shadow(a) > m.body(a)
        && m.buf.low(b) > m.buf.low(a)
        && m.buf.low(c) > m.buf.low(b)
        && m.range(b) < m.range(a)
        && m.range(c) < m.range(b)
    {
        m.push(out, ThreeStarsInTheSouth, Bullish, a, c, 0.52);
    }

    // stick sandwich: matching black closes around a white bar
    if m.downtrend(a)
        && m.bear(a)
        && m.bull(b)
        && m.buf.close(b) > m.buf.close(a)
        && m.bear(c)
        && m.near(m.buf.close(c), m.buf.close(a))
    {
        m.push(out, StickSandwich, Bullish, a, c, 0.52);
    }

    // unique three river bottom
    if m.downtrend(a)
        && m.bear(a)
        && m.long_body(a)
        && m.bear(b)
        && m.body_top(b) <= m.body_top(a)
        && m.buf.low(b) < m.buf.low(a)
        && m.bull(c)
        && m.short_body(c)
        && m.buf.close(c) < m.buf.close(b)
    {
        m.push(out, UniqueThreeRiverBottom, Bullish, a, c, 0.52);
    }

    // deliberation: two long whites then a hesitant short white
    if m.uptrend(a)
        && m.bull(a)
        && m.long_body(a)
        && m.bull(b)
        && m.long_body(b)
        && m.buf.close(b) > m.buf.close(a)
        && m.bull(c)
        && m.short_body(c)
        && m.buf.open(c) >= m.buf.close(b) - m.body(b) * 0.1
    {
        m.push(out, Deliberation, Bearish, a, c, 0.50);
    }

    // tri-star: three dojis with the middle body gapped beyond both
    if m.doji(a) && m.doji(b) && m.doji(c) {
        if m.uptrend(a) && m.body_bottom(b) > m.body_top(a) && m.body_bottom(b) > m.body_top(c) {
            m.push(out, TriStarBear, Bearish, a, c, 0.56);
        }
        if m.downtrend(a) && m.body_top(b) < m.body_bottom(a) && m.body_top(b) < m.body_bottom(c)
        {
            m.push(out, TriStarBull, Bullish, a, c, 0.56);
        }
    }

    // collapsing doji star: doji gaps below a white bar, black bar gaps lower
    if m.uptrend(a)
        && m.bull(a)
        && m.doji(b)
        && m.buf.high(b) < m.buf.low(a)
        && m.bear(c)
        && m.buf.high(c) < m.buf.low(b)
    {
        m.push(out, CollapsingDojiStar, Bearish, a, c, 0.58);
    }

    // side-by-side white lines: a body gap then two similar whites
    let similar_whites = m.bull(b)
        && m.bull(c)
        && m.near(m.buf.open(b), m.buf.open(c))
        && m.body(b) > 0.0
        && (0.6..=1.67).contains(&(m.body(c) / m.body(b)));
    if similar_whites {
        if m.uptrend(a) && m.bull(a) && m.body_bottom(b) > m.body_top(a) {
            m.push(out, SideBySideWhiteLinesBull, Bullish, a, c, 0.50);
        }
        if m.downtrend(a) && m.bear(a) && m.body_top(b) < m.body_bottom(a) {
            m.push(out, SideBySideWhiteLinesBear, Bearish, a, c, 0.50);
        }
    }
}
