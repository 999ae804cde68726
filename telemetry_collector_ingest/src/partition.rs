//! Naming of the time-partitioned indices submissions are written to.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Every partition name starts with this prefix, followed by `-` and the time bucket.
pub const PARTITION_PREFIX: &str = "telemetry";

/// Size of the time bucket covered by a single index.
///
/// Coarser buckets mean fewer, larger indices. `Year` produces names like `telemetry-2026`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PartitionGranularity {
    #[default]
    Year,
    Month,
    Day,
}

impl PartitionGranularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
        }
    }

    fn time_format(&self) -> &'static str {
        match self {
            Self::Year => "%Y",
            Self::Month => "%Y-%m",
            Self::Day => "%Y-%m-%d",
        }
    }

    /// Name of the index a submission received at `now` belongs to.
    ///
    /// Depends only on `now`, never on the submission itself.
    pub fn partition_name(&self, now: DateTime<Utc>) -> String {
        format!("{PARTITION_PREFIX}-{}", now.format(self.time_format()))
    }
}

impl Display for PartitionGranularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitionGranularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "year" | "yearly" => Ok(Self::Year),
            "month" | "monthly" => Ok(Self::Month),
            "day" | "daily" => Ok(Self::Day),
            _ => Err(format!(
                "Invalid partition granularity '{s}'. Valid options: year, month, day"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn partition_names() {
        let now = Utc.with_ymd_and_hms(2026, 3, 7, 23, 59, 59).unwrap();
        assert_eq!(
            PartitionGranularity::Year.partition_name(now),
            "telemetry-2026"
        );
        assert_eq!(
            PartitionGranularity::Month.partition_name(now),
            "telemetry-2026-03"
        );
        assert_eq!(
            PartitionGranularity::Day.partition_name(now),
            "telemetry-2026-03-07"
        );
    }

    #[test]
    fn partition_name_is_deterministic() {
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 12, 0, 0).unwrap();
        for granularity in [
            PartitionGranularity::Year,
            PartitionGranularity::Month,
            PartitionGranularity::Day,
        ] {
            assert_eq!(
                granularity.partition_name(now),
                granularity.partition_name(now)
            );
        }
    }

    #[test]
    fn buckets_roll_over_at_utc_boundaries() {
        let last = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        let first = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            PartitionGranularity::Year.partition_name(last),
            "telemetry-2025"
        );
        assert_eq!(
            PartitionGranularity::Year.partition_name(first),
            "telemetry-2026"
        );
    }

    #[test]
    fn default_is_yearly() {
        assert_eq!(PartitionGranularity::default(), PartitionGranularity::Year);
    }

    #[test]
    fn parse_granularity() {
        assert_eq!(
            "year".parse::<PartitionGranularity>().unwrap(),
            PartitionGranularity::Year
        );
        assert_eq!(
            "Daily".parse::<PartitionGranularity>().unwrap(),
            PartitionGranularity::Day
        );
        assert_eq!(
            "month".parse::<PartitionGranularity>().unwrap(),
            PartitionGranularity::Month
        );
        assert_eq!(
            "hour".parse::<PartitionGranularity>().unwrap_err(),
            "Invalid partition granularity 'hour'. Valid options: year, month, day"
        );
        for granularity in [
            PartitionGranularity::Year,
            PartitionGranularity::Month,
            PartitionGranularity::Day,
        ] {
            assert_eq!(
                granularity.to_string().parse::<PartitionGranularity>(),
                Ok(granularity)
            );
        }
    }
}
