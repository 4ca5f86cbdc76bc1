// Time range selection and the date bounds derived from it
use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "range", rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    Today,
    Yesterday,
    Week,
    Month,
    #[serde(rename_all = "camelCase")]
    Custom {
        #[serde(default)]
        start_date: Option<DateTime<Utc>>,
        #[serde(default)]
        end_date: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Bounds for this range as seen at `now`. Custom ranges return their
    /// supplied bounds untouched.
    pub fn params(&self, now: DateTime<Utc>) -> DateRangeParams {
        let midnight = now.date_naive().and_time(NaiveTime::default()).and_utc();

        let (start, end) = match *self {
            TimeRange::Today => (Some(midnight), Some(now)),
            TimeRange::Yesterday => (Some(midnight - TimeDelta::days(1)), Some(midnight)),
            TimeRange::Week => (Some(now - TimeDelta::days(7)), Some(now)),
            TimeRange::Month => (Some(now - TimeDelta::days(30)), Some(now)),
            TimeRange::Custom {
                start_date,
                end_date,
            } => (start_date, end_date),
        };

        DateRangeParams {
            start_date: start,
            end_date: end,
        }
    }
}
