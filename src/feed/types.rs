//! Price history request types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Price feed errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// Provider could not supply data for the instrument
    #[error("Data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },
    /// Unknown bar interval
    #[error("Invalid granularity: {0} (use 1m, 2m, 5m, 15m, 30m, 1h, 90m, 1d, 5d, 1wk, 1mo)")]
    InvalidGranularity(String),
    /// Look-back must cover at least one day
    #[error("Invalid lookback: {0} days")]
    InvalidLookback(u32),
    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl FeedError {
    pub fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        FeedError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

/// Bar interval requested from the price provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Granularity {
    OneMinute,
    TwoMinutes,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    NinetyMinutes,
    OneDay,
    FiveDays,
    OneWeek,
    OneMonth,
}

impl Granularity {
    /// Interval code understood by the provider
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::OneMinute => "1m",
            Granularity::TwoMinutes => "2m",
            Granularity::FiveMinutes => "5m",
            Granularity::FifteenMinutes => "15m",
            Granularity::ThirtyMinutes => "30m",
            Granularity::OneHour => "1h",
            Granularity::NinetyMinutes => "90m",
            Granularity::OneDay => "1d",
            Granularity::FiveDays => "5d",
            Granularity::OneWeek => "1wk",
            Granularity::OneMonth => "1mo",
        }
    }

    pub fn is_intraday(&self) -> bool {
        !matches!(
            self,
            Granularity::OneDay
                | Granularity::FiveDays
                | Granularity::OneWeek
                | Granularity::OneMonth
        )
    }

    /// How far back the provider serves this interval, `None` if unlimited
    pub fn max_lookback_days(&self) -> Option<u32> {
        match self {
            Granularity::OneMinute => Some(7),
            Granularity::TwoMinutes
            | Granularity::FiveMinutes
            | Granularity::FifteenMinutes
            | Granularity::ThirtyMinutes
            | Granularity::NinetyMinutes => Some(60),
            Granularity::OneHour => Some(730),
            _ => None,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let granularity = match s.trim().to_lowercase().as_str() {
            "1m" | "1" | "1min" | "1minute" => Granularity::OneMinute,
            "2m" | "2" => Granularity::TwoMinutes,
            "5m" | "5" => Granularity::FiveMinutes,
            "15m" | "15" => Granularity::FifteenMinutes,
            "30m" | "30" => Granularity::ThirtyMinutes,
            "1h" | "60" | "60m" | "1hour" | "1hr" => Granularity::OneHour,
            "90m" | "90" => Granularity::NinetyMinutes,
            "1d" | "1day" | "daily" | "d" => Granularity::OneDay,
            "5d" => Granularity::FiveDays,
            "1wk" | "1week" | "weekly" | "w" => Granularity::OneWeek,
            "1mo" | "1month" | "monthly" => Granularity::OneMonth,
            _ => return Err(FeedError::InvalidGranularity(s.to_string())),
        };
        Ok(granularity)
    }
}

impl TryFrom<String> for Granularity {
    type Error = FeedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Granularity> for String {
    fn from(value: Granularity) -> Self {
        value.as_str().to_string()
    }
}

/// Caveat about a look-back request, worth surfacing but not fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookbackNote {
    /// The provider serves less history than requested for this interval
    ExceedsProviderLimit { max_days: u32 },
    /// Many intraday bars, slow to download and analyze
    LargeIntradayRequest,
}

impl fmt::Display for LookbackNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookbackNote::ExceedsProviderLimit { max_days } => write!(
                f,
                "interval is limited to {} days, the provider may return less data or fail",
                max_days
            ),
            LookbackNote::LargeIntradayRequest => {
                write!(f, "long intraday request, download and analysis may be slow")
            }
        }
    }
}

/// Number of calendar days of history to request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lookback {
    days: u32,
}

impl Lookback {
    /// Intraday requests longer than this get a volume note
    const INTRADAY_NOTE_DAYS: u32 = 30;

    pub fn days(days: u32) -> Result<Self, FeedError> {
        if days == 0 {
            return Err(FeedError::InvalidLookback(days));
        }
        Ok(Self { days })
    }

    pub fn as_days(&self) -> u32 {
        self.days
    }

    /// Provider range string: whole days up to a year, whole years beyond
    pub fn range(&self) -> String {
        if self.days <= 365 {
            format!("{}d", self.days)
        } else {
            format!("{}y", (self.days / 365).max(1))
        }
    }

    /// Caveats for requesting this look-back at `granularity`
    pub fn notes(&self, granularity: Granularity) -> Vec<LookbackNote> {
        let mut notes = Vec::new();
        if let Some(max_days) = granularity.max_lookback_days() {
            if self.days > max_days {
                notes.push(LookbackNote::ExceedsProviderLimit { max_days });
            }
        }
        if granularity.is_intraday() && self.days > Self::INTRADAY_NOTE_DAYS {
            notes.push(LookbackNote::LargeIntradayRequest);
        }
        notes
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self { days: 1000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granularity_parse_codes() {
        assert_eq!("1d".parse::<Granularity>().unwrap(), Granularity::OneDay);
        assert_eq!("1wk".parse::<Granularity>().unwrap(), Granularity::OneWeek);
        assert_eq!("90m".parse::<Granularity>().unwrap(), Granularity::NinetyMinutes);
        assert_eq!("1mo".parse::<Granularity>().unwrap(), Granularity::OneMonth);
    }

    #[test]
    fn test_granularity_parse_aliases() {
        assert_eq!("daily".parse::<Granularity>().unwrap(), Granularity::OneDay);
        assert_eq!("D".parse::<Granularity>().unwrap(), Granularity::OneDay);
        assert_eq!("1hr".parse::<Granularity>().unwrap(), Granularity::OneHour);
        assert_eq!("60".parse::<Granularity>().unwrap(), Granularity::OneHour);
        assert_eq!("weekly".parse::<Granularity>().unwrap(), Granularity::OneWeek);
        assert_eq!(" 1min ".parse::<Granularity>().unwrap(), Granularity::OneMinute);
    }

    #[test]
    fn test_granularity_parse_invalid() {
        assert!(matches!(
            "3h".parse::<Granularity>(),
            Err(FeedError::InvalidGranularity(_))
        ));
    }

    #[test]
    fn test_granularity_round_trips_through_display() {
        let all = [
            Granularity::OneMinute,
            Granularity::TwoMinutes,
            Granularity::FiveMinutes,
            Granularity::FifteenMinutes,
            Granularity::ThirtyMinutes,
            Granularity::OneHour,
            Granularity::NinetyMinutes,
            Granularity::OneDay,
            Granularity::FiveDays,
            Granularity::OneWeek,
            Granularity::OneMonth,
        ];
        for g in all {
            assert_eq!(g.to_string().parse::<Granularity>().unwrap(), g);
        }
    }

    #[test]
    fn test_granularity_limits() {
        assert_eq!(Granularity::OneMinute.max_lookback_days(), Some(7));
        assert_eq!(Granularity::FiveMinutes.max_lookback_days(), Some(60));
        assert_eq!(Granularity::OneHour.max_lookback_days(), Some(730));
        assert_eq!(Granularity::OneDay.max_lookback_days(), None);
        assert!(Granularity::OneHour.is_intraday());
        assert!(!Granularity::OneWeek.is_intraday());
    }

    #[test]
    fn test_lookback_rejects_zero() {
        assert!(matches!(
            Lookback::days(0),
            Err(FeedError::InvalidLookback(0))
        ));
    }

    #[test]
    fn test_lookback_range() {
        assert_eq!(Lookback::days(5).unwrap().range(), "5d");
        assert_eq!(Lookback::days(365).unwrap().range(), "365d");
        assert_eq!(Lookback::days(366).unwrap().range(), "1y");
        assert_eq!(Lookback::days(1000).unwrap().range(), "2y");
    }

    #[test]
    fn test_lookback_notes() {
        let lookback = Lookback::days(90).unwrap();
        assert_eq!(
            lookback.notes(Granularity::FiveMinutes),
            vec![
                LookbackNote::ExceedsProviderLimit { max_days: 60 },
                LookbackNote::LargeIntradayRequest
            ]
        );
        assert_eq!(
            lookback.notes(Granularity::OneHour),
            vec![LookbackNote::LargeIntradayRequest]
        );
        assert!(lookback.notes(Granularity::OneDay).is_empty());
        assert!(Lookback::days(5)
            .unwrap()
            .notes(Granularity::OneMinute)
            .is_empty());
    }

    #[test]
    fn test_granularity_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            interval: Granularity,
        }
        let w: Wrapper = toml::from_str(r#"interval = "daily""#).unwrap();
        assert_eq!(w.interval, Granularity::OneDay);
        assert!(toml::from_str::<Wrapper>(r#"interval = "7x""#).is_err());
    }
}
