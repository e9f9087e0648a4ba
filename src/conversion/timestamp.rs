//! Timestamps and their fixed-pattern wire encoding
//!
//! Wire format:
//! - full:      `YYYYY-MM-DDTHH:MM:SS.fffffff` (UTC, 100 ns precision)
//! - date only: `YYYYY-MM-DD`
//!
//! The encoded text does not record which interpretation produced it. A value
//! written as a full timestamp is read back as UTC or as local time depending
//! on the reader's [`FormatContext`]; a date-only value can only be read with a
//! date-only context. Readers and writers must agree on the context.

use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Timelike, Utc,
};

use super::codec::ValueCodec;
use super::errors::{CodecError, CodecResult};
use super::format::{FormatContext, TimestampRepresentation};
use super::wire::WireValue;

const NANOS_PER_TICK: u32 = 100;
const MAX_YEAR: i32 = 99_999;

/// How a [`Timestamp`]'s wall-clock value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampKind {
    Utc,
    Local,
    /// No zone; treated as local time when converted to UTC
    Unspecified,
}

/// A wall-clock date and time tagged with its interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    datetime: NaiveDateTime,
    kind: TimestampKind,
    /// UTC offset in effect for a `Local` value; disambiguates the DST fold hour
    offset: Option<FixedOffset>,
}

impl Timestamp {
    pub fn from_utc(datetime: DateTime<Utc>) -> Self {
        Self {
            datetime: datetime.naive_utc(),
            kind: TimestampKind::Utc,
            offset: None,
        }
    }

    pub fn from_local(datetime: DateTime<Local>) -> Self {
        Self {
            datetime: datetime.naive_local(),
            kind: TimestampKind::Local,
            offset: Some(datetime.offset().fix()),
        }
    }

    pub fn unspecified(datetime: NaiveDateTime) -> Self {
        Self {
            datetime,
            kind: TimestampKind::Unspecified,
            offset: None,
        }
    }

    /// Midnight of `date`, without a zone.
    pub fn date(date: NaiveDate) -> Self {
        Self::unspecified(date.and_time(NaiveTime::MIN))
    }

    pub fn now_utc() -> Self {
        Self::from_utc(Utc::now())
    }

    pub fn now_local() -> Self {
        Self::from_local(Local::now())
    }

    /// Wall-clock value as stored
    pub fn naive(&self) -> NaiveDateTime {
        self.datetime
    }

    pub fn kind(&self) -> TimestampKind {
        self.kind
    }

    /// Drops precision below the 100 ns tick the wire format keeps.
    pub fn truncated(self) -> Self {
        let nanos = self.datetime.nanosecond().min(999_999_999);
        let datetime = self
            .datetime
            .with_nanosecond(nanos - nanos % NANOS_PER_TICK)
            .unwrap_or(self.datetime);
        Self { datetime, ..self }
    }

    /// The instant in UTC.
    ///
    /// `Local` values use the offset they were built with. `Unspecified` values
    /// are read as local time, taking the earlier instant in a DST fold.
    pub fn to_utc(&self) -> CodecResult<DateTime<Utc>> {
        if let Some(offset) = self.offset {
            return offset
                .from_local_datetime(&self.datetime)
                .single()
                .map(|local| local.with_timezone(&Utc))
                .ok_or_else(|| CodecError::OutOfRange {
                    value: self.datetime.to_string(),
                    target: "timestamp",
                });
        }
        match self.kind {
            TimestampKind::Utc => Ok(Utc.from_utc_datetime(&self.datetime)),
            TimestampKind::Local | TimestampKind::Unspecified => Local
                .from_local_datetime(&self.datetime)
                .earliest()
                .map(|local| local.with_timezone(&Utc))
                .ok_or_else(|| CodecError::NonexistentLocalTime(self.datetime.to_string())),
        }
    }

    /// The same instant as local time.
    pub fn to_local(&self) -> CodecResult<Self> {
        Ok(Self::from_local(self.to_utc()?.with_timezone(&Local)))
    }
}

/// Codec for [`Timestamp`], driven by the timestamp facet of the context
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampCodec;

impl ValueCodec<Timestamp> for TimestampCodec {
    fn convert_to(&self, value: &Timestamp, ctx: &FormatContext) -> CodecResult<WireValue> {
        if ctx.timestamp_representation().is_date_only() {
            return format_date(value.datetime.date()).map(WireValue::Text);
        }
        let utc = value.to_utc()?.naive_utc();
        format_full(&utc).map(WireValue::Text)
    }

    fn convert_from(&self, wire: &WireValue, ctx: &FormatContext) -> CodecResult<Timestamp> {
        let text = wire.as_text("timestamp")?;
        match ctx.timestamp_representation() {
            TimestampRepresentation::AsDate => Ok(Timestamp::date(parse_date(&text)?)),
            TimestampRepresentation::AsUtcTime => {
                Ok(Timestamp::from_utc(Utc.from_utc_datetime(&parse_full(&text)?)))
            }
            TimestampRepresentation::AsLocalTime => {
                let utc = Utc.from_utc_datetime(&parse_full(&text)?);
                Ok(Timestamp::from_local(utc.with_timezone(&Local)))
            }
        }
    }
}

fn format_date(date: NaiveDate) -> CodecResult<String> {
    if !(0..=MAX_YEAR).contains(&date.year()) {
        return Err(CodecError::OutOfRange {
            value: date.to_string(),
            target: "timestamp",
        });
    }
    Ok(format!("{:05}-{:02}-{:02}", date.year(), date.month(), date.day()))
}

fn format_full(datetime: &NaiveDateTime) -> CodecResult<String> {
    let date = format_date(datetime.date())?;
    let ticks = datetime.nanosecond().min(999_999_999) / NANOS_PER_TICK;
    Ok(format!(
        "{}T{:02}:{:02}:{:02}.{:07}",
        date,
        datetime.hour(),
        datetime.minute(),
        datetime.second(),
        ticks
    ))
}

fn malformed(text: &str) -> CodecError {
    CodecError::Malformed {
        expected: "timestamp",
        text: text.to_string(),
    }
}

/// Parses a fixed-width, all-digit component.
fn digits(part: &str, width: usize, whole: &str) -> CodecResult<u32> {
    if part.len() != width || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(whole));
    }
    part.parse().map_err(|_| malformed(whole))
}

fn parse_date(text: &str) -> CodecResult<NaiveDate> {
    let mut parts = text.splitn(3, '-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed(text));
    };
    let year = digits(year, 5, text)? as i32;
    let month = digits(month, 2, text)?;
    let day = digits(day, 2, text)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| malformed(text))
}

fn parse_full(text: &str) -> CodecResult<NaiveDateTime> {
    let (date, time) = text.split_once('T').ok_or_else(|| malformed(text))?;
    let date = parse_date(date).map_err(|_| malformed(text))?;

    let (hms, fraction) = time.split_once('.').ok_or_else(|| malformed(text))?;
    let mut parts = hms.splitn(3, ':');
    let (Some(hour), Some(minute), Some(second)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed(text));
    };
    let hour = digits(hour, 2, text)?;
    let minute = digits(minute, 2, text)?;
    let second = digits(second, 2, text)?;
    let ticks = digits(fraction, 7, text)?;

    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, ticks * NANOS_PER_TICK)
        .ok_or_else(|| malformed(text))?;
    Ok(date.and_time(time))
}
