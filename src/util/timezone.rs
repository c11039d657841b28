//! Date display in a fixed target timezone.

use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use time::{
    OffsetDateTime, UtcOffset,
    format_description::{self, OwnedFormatItem},
    macros::format_description,
};
use tracing::warn;

/// Pattern used when no display pattern is configured, e.g. `March 5, 2024`.
pub const DEFAULT_DATE_PATTERN: &str = "[month repr:long] [day padding:none], [year]";

/// Pure formatting collaborator used for embedded-entry dates.
pub trait DateFormatter: Send + Sync {
    fn format(&self, instant: OffsetDateTime) -> String;
}

#[derive(Debug, Error)]
pub enum DateFormatError {
    #[error("invalid date pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },
}

/// Formats instants with a fixed pattern after shifting them into `timezone`.
#[derive(Debug, Clone)]
pub struct ZonedDateFormatter {
    pattern: OwnedFormatItem,
    timezone: Tz,
}

impl ZonedDateFormatter {
    pub fn new(pattern: &str, timezone: Tz) -> Result<Self, DateFormatError> {
        let pattern = format_description::parse_owned::<2>(pattern).map_err(|err| {
            DateFormatError::Pattern {
                pattern: pattern.to_string(),
                message: err.to_string(),
            }
        })?;
        Ok(Self { pattern, timezone })
    }
}

impl Default for ZonedDateFormatter {
    fn default() -> Self {
        Self {
            pattern: OwnedFormatItem::from(format_description!(
                "[month repr:long] [day padding:none], [year]"
            )),
            timezone: Tz::UTC,
        }
    }
}

impl DateFormatter for ZonedDateFormatter {
    fn format(&self, instant: OffsetDateTime) -> String {
        let localized = localized_datetime(instant, self.timezone);
        localized.format(&self.pattern).unwrap_or_else(|err| {
            warn!(
                target = "util::timezone",
                error = %err,
                "date pattern could not format instant; falling back to ISO date"
            );
            localized.date().to_string()
        })
    }
}

/// UTC offset that `tz` observes at `time`.
pub fn offset_at(time: OffsetDateTime, tz: Tz) -> UtcOffset {
    let utc = time.to_offset(UtcOffset::UTC);
    let Some(datetime_utc) = DateTime::<Utc>::from_timestamp(utc.unix_timestamp(), utc.nanosecond())
    else {
        return UtcOffset::UTC;
    };
    let seconds = tz
        .offset_from_utc_datetime(&datetime_utc.naive_utc())
        .fix()
        .local_minus_utc();
    UtcOffset::from_whole_seconds(seconds).unwrap_or(UtcOffset::UTC)
}

pub fn localized_datetime(time: OffsetDateTime, tz: Tz) -> OffsetDateTime {
    time.to_offset(offset_at(time, tz))
}
