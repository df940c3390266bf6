//! Two-bar candle formations. The formation completes on bar `i`; bar
//! `i - 1` is its setup bar.

use crate::{Direction, Finding, PatternKind};

use super::Candles;

pub(crate) fn classify(m: &Candles, i: usize, out: &mut Vec<Finding>) {
    if i < m.buf.start() + 1 {
        return;
    }
    let p = i - 1;
    use Direction::{Bearish, Bullish};
    use PatternKind::*;

    let body_mid_p = (m.buf.open(p) + m.buf.close(p)) / 2.0;
    let inside_body =
        m.body_top(i) <= m.body_top(p) && m.body_bottom(i) >= m.body_bottom(p);
    let engulfs_body =
        m.body_top(i) >= m.body_top(p) && m.body_bottom(i) <= m.body_bottom(p);

    // engulfing group
    if m.bear(p) && m.bull(i) && engulfs_body && m.body(i) > m.body(p) {
        if m.downtrend(i) {
            m.push(out, EngulfingBull, Bullish, p, i, 0.58);
        } else if m.uptrend(i) {
            m.push(out, LastEngulfingTop, Bearish, p, i, 0.52);
        }
    }
    if m.bull(p) && m.bear(i) && engulfs_body && m.body(i) > m.body(p) {
        if m.uptrend(i) {
            m.push(out, EngulfingBear, Bearish, p, i, 0.58);
        } else if m.downtrend(i) {
            m.push(out, LastEngulfingBottom, Bullish, p, i, 0.52);
        }
    }

    // harami group
    if m.long_body(p) && inside_body && m.body(i) < m.body(p) {
        if m.bear(p) && m.downtrend(i) {
            if m.doji(i) {
                m.push(out, HaramiCrossBull, Bullish, p, i, 0.54);
            } else if m.bull(i) {
                m.push(out, HaramiBull, Bullish, p, i, 0.50);
            }
        }
        if m.bull(p) && m.uptrend(i) {
            if m.doji(i) {
                m.push(out, HaramiCrossBear, Bearish, p, i, 0.54);
            } else if m.bear(i) {
                m.push(out, HaramiBear, Bearish, p, i, 0.50);
            }
        }
    }

    // piercing / dark cloud
    if m.downtrend(i)
        && m.bear(p)
        && m.long_body(p)
        && m.bull(i)
        && m.buf.open(i) < m.buf.low(p)
        && m.buf.close(i) > body_mid_p
        && m.buf.close(i) < m.buf.open(p)
    {
        m.push(out, Piercing, Bullish, p, i, 0.56);
    }
    if m.uptrend(i)
        && m.bull(p)
        && m.long_body(p)
        && m.bear(i)
        && m.buf.open(i) > m.buf.high(p)
        && m.buf.close(i) < body_mid_p
        && m.buf.close(i) > m.buf.open(p)
    {
        m.push(out, DarkCloudCover, Bearish, p, i, 0.56);
    }

    // doji stars
    if m.doji(i) && m.long_body(p) {
        if m.downtrend(i) && m.bear(p) && m.body_top(i) < m.buf.close(p) {
            m.push(out, DojiStarBull, Bullish, p, i, 0.52);
        }
        if m.uptrend(i) && m.bull(p) && m.body_bottom(i) > m.buf.close(p) {
            m.push(out, DojiStarBear, Bearish, p, i, 0.52);
        }
    }

    // meeting lines: long opposite bodies closing at the same price
    if m.long_body(p) && m.long_body(i) && m.near(m.buf.close(p), m.buf.close(i)) {
        if m.downtrend(i) && m.bear(p) && m.bull(i) {
            m.push(out, MeetingLinesBull, Bullish, p, i, 0.50);
        }
        if m.uptrend(i) && m.bull(p) && m.bear(i) {
            m.push(out, MeetingLinesBear, Bearish, p, i, 0.50);
        }
    }

    // matching close pairs
    if m.downtrend(i) && m.bear(p) && m.bear(i) && m.near(m.buf.close(p), m.buf.close(i)) {
        m.push(out, MatchingLow, Bullish, p, i, 0.50);
    }
    if m.uptrend(i) && m.bull(p) && m.bull(i) && m.near(m.buf.close(p), m.buf.close(i)) {
        m.push(out, MatchingHigh, Bearish, p, i, 0.50);
    }

    // small same-color bar inside a long body
    if m.long_body(p) && inside_body && m.short_body(i) {
        if m.downtrend(i) && m.bear(p) && m.bear(i) {
            m.push(out, HomingPigeon, Bullish, p, i, 0.50);
        }
        if m.uptrend(i) && m.bull(p) && m.bull(i) {
            m.push(out, DescendingHawk, Bearish, p, i, 0.50);
        }
    }

    // tweezers
    if m.downtrend(i) && m.near(m.buf.low(p), m.buf.low(i)) && m.buf.low(i) < m.body_bottom(i) {
        m.push(out, TweezersBottom, Bullish, p, i, 0.48);
    }
    if m.uptrend(i) && m.near(m.buf.high(p), m.buf.high(i)) && m.buf.high(i) > m.body_top(i) {
        m.push(out, TweezersTop, Bearish, p, i, 0.48);
    }

    // kicking: opposing marubozus separated by a gap
    if m.bare(p) && m.bare(i) && m.long_body(p) && m.long_body(i) {
        if m.bear(p) && m.bull(i) && m.buf.low(i) > m.buf.high(p) {
            m.push(out, KickingBull, Bullish, p, i, 0.60);
        }
        if m.bull(p) && m.bear(i) && m.buf.high(i) < m.buf.low(p) {
            m.push(out, KickingBear, Bearish, p, i, 0.60);
        }
    }

    // separating lines: continuation off a shared open
    if m.near(m.buf.open(p), m.buf.open(i)) {
        if m.uptrend(i) && m.bear(p) && m.bull(i) && m.long_body(i) {
            m.push(out, SeparatingLinesBull, Bullish, p, i, 0.50);
        }
        if m.downtrend(i) && m.bull(p) && m.bear(i) && m.long_body(i) {
            m.push(out, SeparatingLinesBear, Bearish, p, i, 0.50);
        }
    }

    // neck lines and thrusting: weak rallies into a long black bar
    if m.downtrend(i)
        && m.bear(p)
        && m.long_body(p)
        && m.bull(i)
        && m.buf.open(i) < m.buf.low(p)
    {
        let c = m.buf.close(i);
        if m.near(c, m.buf.low(p)) {
            m.push(out, OnNeck, Bearish, p, i, 0.48);
        } else if c > m.buf.close(p) && c <= m.buf.close(p) + m.body(p) * 0.1 {
            m.push(out, InNeck, Bearish, p, i, 0.48);
        } else if c > m.buf.close(p) + m.body(p) * 0.1 && c < body_mid_p {
            m.push(out, Thrusting, Bearish, p, i, 0.46);
        }
    }

    // stomach pairs: the second body sits beyond the prior body's midpoint
    if m.downtrend(i)
        && m.bear(p)
        && m.bull(i)
        && m.body_bottom(i) >= body_mid_p
        && m.buf.open(i) <= m.body_top(p)
    {
        m.push(out, AboveTheStomach, Bullish, p, i, 0.52);
    }
    if m.uptrend(i)
        && m.bull(p)
        && m.bear(i)
        && m.body_top(i) <= body_mid_p
        && m.buf.open(i) >= m.body_bottom(p)
    {
        m.push(out, BelowTheStomach, Bearish, p, i, 0.52);
    }
}
