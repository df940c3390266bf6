//! Closed catalog of pattern identifiers.
//!
//! Every finding the engine can emit carries exactly one [`PatternKind`].
//! The display-label table is an exhaustive match so adding a variant
//! without a label is a compile error.

/// Identifier for a detectable pattern.
///
/// Grouped by detector family: swing patterns, single-day patterns and the
/// candlestick suite. Serialized as `SCREAMING_SNAKE_CASE` identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternKind {
    // ---- Swing: cup ----
    CupWithHandle,

    // ---- Swing: double / triple extremes ----
    DoubleBottomAdamAdam,
    DoubleBottomAdamEve,
    DoubleBottomEveAdam,
    DoubleBottomEveEve,
    DoubleTopAdamAdam,
    DoubleTopAdamEve,
    DoubleTopEveAdam,
    DoubleTopEveEve,
    TripleBottom,
    TripleTop,

    // ---- Swing: triangles ----
    AscendingTriangle,
    DescendingTriangle,
    SymmetricalTriangle,

    // ---- Swing: head & shoulders ----
    HeadAndShoulders,
    InverseHeadAndShoulders,

    // ---- Swing: channel group ----
    BullFlag,
    BearFlag,
    Pennant,
    RisingWedge,
    FallingWedge,
    Rectangle,
    ChannelUp,
    ChannelDown,
    BroadeningFormation,

    // ---- Swing: volatility contraction ----
    VolatilityContraction,
    HighTightFlag,

    // ---- Single-day suite ----
    InsideDay,
    OutsideDay,
    NarrowRange4,
    NarrowRange7,
    WideRangeBull,
    WideRangeBear,
    SpikeHigh,
    SpikeLow,
    ThreeBarReversalBull,
    ThreeBarReversalBear,
    ClosingPriceReversalBull,
    ClosingPriceReversalBear,
    OpeningPriceReversalBull,
    OpeningPriceReversalBear,

    // ---- Candles: single bar ----
    Doji,
    FourPriceDoji,
    LongLeggedDoji,
    DragonflyDoji,
    GravestoneDoji,
    NorthernDoji,
    SouthernDoji,
    RickshawMan,
    Hammer,
    HangingMan,
    InvertedHammer,
    ShootingStar,
    Takuri,
    WhiteMarubozu,
    BlackMarubozu,
    OpeningWhiteMarubozu,
    OpeningBlackMarubozu,
    ClosingWhiteMarubozu,
    ClosingBlackMarubozu,
    LongWhiteDay,
    LongBlackDay,
    ShortWhiteDay,
    ShortBlackDay,
    WhiteSpinningTop,
    BlackSpinningTop,
    HighWave,
    WhiteCandle,
    BlackCandle,
    BeltHoldBull,
    BeltHoldBear,

    // ---- Candles: two bar ----
    EngulfingBull,
    EngulfingBear,
    LastEngulfingBottom,
    LastEngulfingTop,
    HaramiBull,
    HaramiBear,
    HaramiCrossBull,
    HaramiCrossBear,
    Piercing,
    DarkCloudCover,
    DojiStarBull,
    DojiStarBear,
    MeetingLinesBull,
    MeetingLinesBear,
    MatchingLow,
    MatchingHigh,
    HomingPigeon,
    DescendingHawk,
    TweezersBottom,
    TweezersTop,
    KickingBull,
    KickingBear,
    SeparatingLinesBull,
    SeparatingLinesBear,
    OnNeck,
    InNeck,
    Thrusting,
    AboveTheStomach,
    BelowTheStomach,

    // ---- Candles: three bar ----
    MorningStar,
    EveningStar,
    MorningDojiStar,
    EveningDojiStar,
    AbandonedBabyBull,
    AbandonedBabyBear,
    ThreeWhiteSoldiers,
    ThreeBlackCrows,
    IdenticalThreeCrows,
    TwoCrows,
    ThreeInsideUp,
    ThreeInsideDown,
    ThreeOutsideUp,
    ThreeOutsideDown,
    ThreeStarsInTheSouth,
    StickSandwich,
    UniqueThreeRiverBottom,
    Deliberation,
    AdvanceBlock,
    TriStarBull,
    TriStarBear,
    CollapsingDojiStar,
    SideBySideWhiteLinesBull,
    SideBySideWhiteLinesBear,

    // ---- Candles: gap-and-run ----
    RisingWindow,
    FallingWindow,
    GappingUpDoji,
    GappingDownDoji,
    UpsideTasukiGap,
    DownsideTasukiGap,
    UpsideGapTwoCrows,
    UpsideGapThreeMethods,
    DownsideGapThreeMethods,
    TwoBlackGapping,
    BreakawayBull,
    BreakawayBear,

    // ---- Candles: multi-session ----
    RisingThreeMethods,
    FallingThreeMethods,
    MatHold,
    LadderBottom,
    ConcealingBabySwallow,
    ThreeLineStrikeBull,
    ThreeLineStrikeBear,
    HikkakeBull,
    HikkakeBear,
}

impl PatternKind {
    /// Human-readable display label.
    pub fn label(self) -> &'static str {
        use PatternKind::*;
        match self {
            CupWithHandle => "Cup with Handle",

            DoubleBottomAdamAdam => "Double Bottom (Adam & Adam)",
            DoubleBottomAdamEve => "Double Bottom (Adam & Eve)",
            DoubleBottomEveAdam => "Double Bottom (Eve & Adam)",
            DoubleBottomEveEve => "Double Bottom (Eve & Eve)",
            DoubleTopAdamAdam => "Double Top (Adam & Adam)",
            DoubleTopAdamEve => "Double Top (Adam & Eve)",
            DoubleTopEveAdam => "Double Top (Eve & Adam)",
            DoubleTopEveEve => "Double Top (Eve & Eve)",
            TripleBottom => "Triple Bottom",
            TripleTop => "Triple Top",

            AscendingTriangle => "Ascending Triangle",
            DescendingTriangle => "Descending Triangle",
            SymmetricalTriangle => "Symmetrical Triangle",

            HeadAndShoulders => "Head and Shoulders",
            InverseHeadAndShoulders => "Inverse Head and Shoulders",

            BullFlag => "Bull Flag",
            BearFlag => "Bear Flag",
            Pennant => "Pennant",
            RisingWedge => "Rising Wedge",
            FallingWedge => "Falling Wedge",
            Rectangle => "Rectangle",
            ChannelUp => "Channel Up",
            ChannelDown => "Channel Down",
            BroadeningFormation => "Broadening Formation",

            VolatilityContraction => "Volatility Contraction Pattern",
            HighTightFlag => "High and Tight Flag",

            InsideDay => "Inside Day",
            OutsideDay => "Outside Day",
            NarrowRange4 => "Narrow Range 4",
            NarrowRange7 => "Narrow Range 7",
            WideRangeBull => "Wide Range Day (Bullish)",
            WideRangeBear => "Wide Range Day (Bearish)",
            SpikeHigh => "Spike High",
            SpikeLow => "Spike Low",
            ThreeBarReversalBull => "Three-Bar Reversal (Bullish)",
            ThreeBarReversalBear => "Three-Bar Reversal (Bearish)",
            ClosingPriceReversalBull => "Closing Price Reversal (Bullish)",
            ClosingPriceReversalBear => "Closing Price Reversal (Bearish)",
            OpeningPriceReversalBull => "Opening Price Reversal (Bullish)",
            OpeningPriceReversalBear => "Opening Price Reversal (Bearish)",

            Doji => "Doji",
            FourPriceDoji => "Four Price Doji",
            LongLeggedDoji => "Long Legged Doji",
            DragonflyDoji => "Dragonfly Doji",
            GravestoneDoji => "Gravestone Doji",
            NorthernDoji => "Northern Doji",
            SouthernDoji => "Southern Doji",
            RickshawMan => "Rickshaw Man",
            Hammer => "Hammer",
            HangingMan => "Hanging Man",
            InvertedHammer => "Inverted Hammer",
            ShootingStar => "Shooting Star",
            Takuri => "Takuri Line",
            WhiteMarubozu => "White Marubozu",
            BlackMarubozu => "Black Marubozu",
            OpeningWhiteMarubozu => "Opening White Marubozu",
            OpeningBlackMarubozu => "Opening Black Marubozu",
            ClosingWhiteMarubozu => "Closing White Marubozu",
            ClosingBlackMarubozu => "Closing Black Marubozu",
            LongWhiteDay => "Long White Day",
            LongBlackDay => "Long Black Day",
            ShortWhiteDay => "Short White Day",
            ShortBlackDay => "Short Black Day",
            WhiteSpinningTop => "White Spinning Top",
            BlackSpinningTop => "Black Spinning Top",
            HighWave => "High Wave",
            WhiteCandle => "White Candle",
            BlackCandle => "Black Candle",
            BeltHoldBull => "Belt Hold (Bullish)",
            BeltHoldBear => "Belt Hold (Bearish)",

            EngulfingBull => "Engulfing (Bullish)",
            EngulfingBear => "Engulfing (Bearish)",
            LastEngulfingBottom => "Last Engulfing Bottom",
            LastEngulfingTop => "Last Engulfing Top",
            HaramiBull => "Harami (Bullish)",
            HaramiBear => "Harami (Bearish)",
            HaramiCrossBull => "Harami Cross (Bullish)",
            HaramiCrossBear => "Harami Cross (Bearish)",
            Piercing => "Piercing Line",
            DarkCloudCover => "Dark Cloud Cover",
            DojiStarBull => "Doji Star (Bullish)",
            DojiStarBear => "Doji Star (Bearish)",
            MeetingLinesBull => "Meeting Lines (Bullish)",
            MeetingLinesBear => "Meeting Lines (Bearish)",
            MatchingLow => "Matching Low",
            MatchingHigh => "Matching High",
            HomingPigeon => "Homing Pigeon",
            DescendingHawk => "Descending Hawk",
            TweezersBottom => "Tweezers Bottom",
            TweezersTop => "Tweezers Top",
            KickingBull => "Kicking (Bullish)",
            KickingBear => "Kicking (Bearish)",
            SeparatingLinesBull => "Separating Lines (Bullish)",
            SeparatingLinesBear => "Separating Lines (Bearish)",
            OnNeck => "On Neck Line",
            InNeck => "In Neck Line",
            Thrusting => "Thrusting Line",
            AboveTheStomach => "Above the Stomach",
            BelowTheStomach => "Below the Stomach",

            MorningStar => "Morning Star",
            EveningStar => "Evening Star",
            MorningDojiStar => "Morning Doji Star",
            EveningDojiStar => "Evening Doji Star",
            AbandonedBabyBull => "Abandoned Baby (Bullish)",
            AbandonedBabyBear => "Abandoned Baby (Bearish)",
            ThreeWhiteSoldiers => "Three White Soldiers",
            ThreeBlackCrows => "Three Black Crows",
            IdenticalThreeCrows => "Identical Three Crows",
            TwoCrows => "Two Crows",
            ThreeInsideUp => "Three Inside Up",
            ThreeInsideDown => "Three Inside Down",
            ThreeOutsideUp => "Three Outside Up",
            ThreeOutsideDown => "Three Outside Down",
            ThreeStarsInTheSouth => "Three Stars in the South",
            StickSandwich => "Stick Sandwich",
            UniqueThreeRiverBottom => "Unique Three River Bottom",
            Deliberation => "Deliberation",
            AdvanceBlock => "Advance Block",
            TriStarBull => "Tri-Star (Bullish)",
            TriStarBear => "Tri-Star (Bearish)",
            CollapsingDojiStar => "Collapsing Doji Star",
            SideBySideWhiteLinesBull => "Side-by-Side White Lines (Bullish)",
            SideBySideWhiteLinesBear => "Side-by-Side White Lines (Bearish)",

            RisingWindow => "Rising Window",
            FallingWindow => "Falling Window",
            GappingUpDoji => "Gapping Up Doji",
            GappingDownDoji => "Gapping Down Doji",
            UpsideTasukiGap => "Upside Tasuki Gap",
            DownsideTasukiGap => "Downside Tasuki Gap",
            UpsideGapTwoCrows => "Upside Gap Two Crows",
            UpsideGapThreeMethods => "Upside Gap Three Methods",
            DownsideGapThreeMethods => "Downside Gap Three Methods",
            TwoBlackGapping => "Two Black Gapping",
            BreakawayBull => "Breakaway (Bullish)",
            BreakawayBear => "Breakaway (Bearish)",

            RisingThreeMethods => "Rising Three Methods",
            FallingThreeMethods => "Falling Three Methods",
            MatHold => "Mat Hold",
            LadderBottom => "Ladder Bottom",
            ConcealingBabySwallow => "Concealing Baby Swallow",
            ThreeLineStrikeBull => "Three Line Strike (Bullish)",
            ThreeLineStrikeBear => "Three Line Strike (Bearish)",
            HikkakeBull => "Hikkake (Bullish)",
            HikkakeBear => "Hikkake (Bearish)",
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_nonempty() {
        // spot checks across the groups; exhaustiveness is enforced by the match itself
        for kind in [
            PatternKind::CupWithHandle,
            PatternKind::DoubleBottomAdamEve,
            PatternKind::NarrowRange7,
            PatternKind::Doji,
            PatternKind::MatHold,
        ] {
            assert!(!kind.label().is_empty());
        }
    }

    #[test]
    fn serializes_as_screaming_snake() {
        let s = serde_json::to_string(&PatternKind::CupWithHandle).unwrap();
        assert_eq!(s, "\"CUP_WITH_HANDLE\"");
        let s = serde_json::to_string(&PatternKind::NarrowRange4).unwrap();
        assert_eq!(s, "\"NARROW_RANGE4\"");
    }
}
