//! OMM primitive type definitions.
//!
//! This module provides the closed set of OMM data type tags plus the
//! structured scalar types carried on the wire: fixed-point [`Real`],
//! [`Date`]/[`Time`]/[`DateTime`], quality-of-service [`Qos`] and stream
//! [`State`]. Numeric tag values follow the RWF wire format.

use std::fmt;

use crate::error::{OmmError, Result};

/// Wire format version pair, negotiated per connection and recorded on
/// decode-side views at bind time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireVersion {
    /// Major wire format version.
    pub major: u8,
    /// Minor wire format version.
    pub minor: u8,
}

impl WireVersion {
    /// Current major version of the RWF-style wire format.
    pub const MAJOR: u8 = 14;
    /// Current minor version of the RWF-style wire format.
    pub const MINOR: u8 = 1;
}

impl Default for WireVersion {
    fn default() -> Self {
        Self {
            major: Self::MAJOR,
            minor: Self::MINOR,
        }
    }
}

/// OMM data type tag.
///
/// Tags 0..=19 are primitives, 128..=142 are containers. The numeric values
/// match the RWF assignments so dumps line up with the original format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    /// Signed integer, up to 64 bits, minimal-width encoded.
    Int = 3,
    /// Unsigned integer, up to 64 bits, minimal-width encoded.
    UInt = 4,
    /// IEEE-754 single-precision float.
    Float = 5,
    /// IEEE-754 double-precision float.
    Double = 6,
    /// Fixed-point value: mantissa plus exponent/fraction hint.
    Real = 8,
    /// Calendar date.
    Date = 9,
    /// Time of day with optional sub-second components.
    Time = 10,
    /// Date plus time.
    DateTime = 11,
    /// Quality of service descriptor.
    Qos = 12,
    /// Stream state descriptor.
    State = 13,
    /// Enumerated value (u16).
    Enum = 14,
    /// Homogeneous primitive array.
    Array = 15,
    /// Raw byte buffer.
    Buffer = 16,
    /// ASCII string.
    Ascii = 17,
    /// UTF-8 string.
    Utf8 = 18,
    /// RMTES string (raw bytes; Unicode expansion is a separate operation).
    Rmtes = 19,
    /// Entry present but carrying no payload.
    NoData = 128,
    /// Opaque byte payload.
    Opaque = 130,
    /// XML payload.
    Xml = 131,
    /// Field-id keyed ordered container.
    FieldList = 132,
    /// Name keyed ordered container.
    ElementList = 133,
    /// ANSI page payload.
    AnsiPage = 134,
    /// Id-keyed container with per-entry container types.
    FilterList = 135,
    /// Index-keyed container.
    Vector = 136,
    /// Typed-key associative container with entry actions.
    Map = 137,
    /// Homogeneous row-list container.
    Series = 138,
    /// A full nested message.
    Msg = 141,
    /// JSON payload.
    Json = 142,
}

impl DataType {
    /// Decodes a data type tag from its wire value.
    pub fn from_u8(tag: u8) -> Result<Self> {
        Ok(match tag {
            3 => Self::Int,
            4 => Self::UInt,
            5 => Self::Float,
            6 => Self::Double,
            8 => Self::Real,
            9 => Self::Date,
            10 => Self::Time,
            11 => Self::DateTime,
            12 => Self::Qos,
            13 => Self::State,
            14 => Self::Enum,
            15 => Self::Array,
            16 => Self::Buffer,
            17 => Self::Ascii,
            18 => Self::Utf8,
            19 => Self::Rmtes,
            128 => Self::NoData,
            130 => Self::Opaque,
            131 => Self::Xml,
            132 => Self::FieldList,
            133 => Self::ElementList,
            134 => Self::AnsiPage,
            135 => Self::FilterList,
            136 => Self::Vector,
            137 => Self::Map,
            138 => Self::Series,
            141 => Self::Msg,
            142 => Self::Json,
            other => return Err(OmmError::UnknownType(other)),
        })
    }

    /// Returns the wire tag value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns true for container types (including nested messages).
    #[must_use]
    pub const fn is_container(self) -> bool {
        self.as_u8() >= 128
    }

    /// Returns true for primitive (scalar) types.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        !self.is_container()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "Int",
            Self::UInt => "UInt",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Real => "Real",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::DateTime => "DateTime",
            Self::Qos => "Qos",
            Self::State => "State",
            Self::Enum => "Enum",
            Self::Array => "OmmArray",
            Self::Buffer => "Buffer",
            Self::Ascii => "Ascii",
            Self::Utf8 => "Utf8",
            Self::Rmtes => "Rmtes",
            Self::NoData => "NoData",
            Self::Opaque => "Opaque",
            Self::Xml => "Xml",
            Self::FieldList => "FieldList",
            Self::ElementList => "ElementList",
            Self::AnsiPage => "AnsiPage",
            Self::FilterList => "FilterList",
            Self::Vector => "Vector",
            Self::Map => "Map",
            Self::Series => "Series",
            Self::Msg => "Msg",
            Self::Json => "Json",
        };
        f.write_str(name)
    }
}

/// Exponent or fraction hint for a [`Real`] value.
///
/// Hints 0..=21 scale the mantissa by a power of ten (exponent −14..+7),
/// hints 22..=30 divide it by a power of two, and 33..=35 mark the IEEE
/// special values. 31 and 32 are reserved and rejected at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RealHint {
    /// 10^-14 scaling.
    ExponentNeg14 = 0,
    /// 10^-13 scaling.
    ExponentNeg13 = 1,
    /// 10^-12 scaling.
    ExponentNeg12 = 2,
    /// 10^-11 scaling.
    ExponentNeg11 = 3,
    /// 10^-10 scaling.
    ExponentNeg10 = 4,
    /// 10^-9 scaling.
    ExponentNeg9 = 5,
    /// 10^-8 scaling.
    ExponentNeg8 = 6,
    /// 10^-7 scaling.
    ExponentNeg7 = 7,
    /// 10^-6 scaling.
    ExponentNeg6 = 8,
    /// 10^-5 scaling.
    ExponentNeg5 = 9,
    /// 10^-4 scaling.
    ExponentNeg4 = 10,
    /// 10^-3 scaling.
    ExponentNeg3 = 11,
    /// 10^-2 scaling.
    ExponentNeg2 = 12,
    /// 10^-1 scaling.
    ExponentNeg1 = 13,
    /// No scaling.
    Exponent0 = 14,
    /// 10^1 scaling.
    Exponent1 = 15,
    /// 10^2 scaling.
    Exponent2 = 16,
    /// 10^3 scaling.
    Exponent3 = 17,
    /// 10^4 scaling.
    Exponent4 = 18,
    /// 10^5 scaling.
    Exponent5 = 19,
    /// 10^6 scaling.
    Exponent6 = 20,
    /// 10^7 scaling.
    Exponent7 = 21,
    /// Divide by 1 (whole fraction).
    Fraction1 = 22,
    /// Divide by 2.
    Fraction2 = 23,
    /// Divide by 4.
    Fraction4 = 24,
    /// Divide by 8.
    Fraction8 = 25,
    /// Divide by 16.
    Fraction16 = 26,
    /// Divide by 32.
    Fraction32 = 27,
    /// Divide by 64.
    Fraction64 = 28,
    /// Divide by 128.
    Fraction128 = 29,
    /// Divide by 256.
    Fraction256 = 30,
    /// Positive infinity; no mantissa bytes follow.
    Infinity = 33,
    /// Negative infinity; no mantissa bytes follow.
    NegInfinity = 34,
    /// Not a number; no mantissa bytes follow.
    NotANumber = 35,
}

impl RealHint {
    /// Decodes a hint from its wire value. 31 and 32 are reserved.
    pub fn from_u8(hint: u8) -> Result<Self> {
        if hint == 31 || hint == 32 || hint > 35 {
            return Err(OmmError::InvalidData(format!("invalid real hint {hint}")));
        }
        // Discriminants are contiguous apart from the reserved gap checked
        // above, so a transmute-free table keeps this obvious.
        Ok(match hint {
            0 => Self::ExponentNeg14,
            1 => Self::ExponentNeg13,
            2 => Self::ExponentNeg12,
            3 => Self::ExponentNeg11,
            4 => Self::ExponentNeg10,
            5 => Self::ExponentNeg9,
            6 => Self::ExponentNeg8,
            7 => Self::ExponentNeg7,
            8 => Self::ExponentNeg6,
            9 => Self::ExponentNeg5,
            10 => Self::ExponentNeg4,
            11 => Self::ExponentNeg3,
            12 => Self::ExponentNeg2,
            13 => Self::ExponentNeg1,
            14 => Self::Exponent0,
            15 => Self::Exponent1,
            16 => Self::Exponent2,
            17 => Self::Exponent3,
            18 => Self::Exponent4,
            19 => Self::Exponent5,
            20 => Self::Exponent6,
            21 => Self::Exponent7,
            22 => Self::Fraction1,
            23 => Self::Fraction2,
            24 => Self::Fraction4,
            25 => Self::Fraction8,
            26 => Self::Fraction16,
            27 => Self::Fraction32,
            28 => Self::Fraction64,
            29 => Self::Fraction128,
            30 => Self::Fraction256,
            33 => Self::Infinity,
            34 => Self::NegInfinity,
            _ => Self::NotANumber,
        })
    }

    /// Returns the wire value of the hint.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns true for Infinity/NegInfinity/NotANumber.
    #[must_use]
    pub const fn is_special(self) -> bool {
        matches!(self, Self::Infinity | Self::NegInfinity | Self::NotANumber)
    }
}

/// Fixed-point value: `mantissa` scaled by the [`RealHint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Real {
    /// The mantissa (significand).
    pub mantissa: i64,
    /// Scaling hint.
    pub hint: RealHint,
}

impl Real {
    /// Creates a new real value.
    #[must_use]
    pub const fn new(mantissa: i64, hint: RealHint) -> Self {
        Self { mantissa, hint }
    }

    /// Converts to a floating point value (specials map to the IEEE values).
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self.hint {
            RealHint::Infinity => f64::INFINITY,
            RealHint::NegInfinity => f64::NEG_INFINITY,
            RealHint::NotANumber => f64::NAN,
            h if (h.as_u8()) <= 21 => {
                self.mantissa as f64 * 10f64.powi(h.as_u8() as i32 - 14)
            }
            h => self.mantissa as f64 / (1u64 << (h.as_u8() - 22)) as f64,
        }
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hint {
            RealHint::Infinity => f.write_str("Inf"),
            RealHint::NegInfinity => f.write_str("-Inf"),
            RealHint::NotANumber => f.write_str("NaN"),
            _ => write!(f, "{}", self.to_f64()),
        }
    }
}

/// Calendar date. A zero component is a blank (unset) component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Date {
    /// Four-digit year, 0 for blank.
    pub year: u16,
    /// Month 1..=12, 0 for blank.
    pub month: u8,
    /// Day 1..=31, 0 for blank.
    pub day: u8,
}

impl Date {
    /// Creates a date after validating its components.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self> {
        let date = Self { year, month, day };
        date.validate()?;
        Ok(date)
    }

    /// Rejects out-of-range components. Zero means blank and is accepted.
    pub fn validate(&self) -> Result<()> {
        if self.month > 12 {
            return Err(OmmError::InvalidData(format!(
                "invalid month {}",
                self.month
            )));
        }
        if self.day > 31 {
            return Err(OmmError::InvalidData(format!("invalid day {}", self.day)));
        }
        Ok(())
    }

    /// Returns true when every component is blank.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        self.year == 0 && self.month == 0 && self.day == 0
    }
}

const MONTH_NAMES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_blank() {
            return f.write_str("(blank date)");
        }
        match self.month {
            1..=12 => write!(
                f,
                "{:02} {} {}",
                self.day,
                MONTH_NAMES[(self.month - 1) as usize],
                self.year
            ),
            _ => write!(f, "{:02} {:02} {}", self.day, self.month, self.year),
        }
    }
}

/// Time of day. Trailing zero components are truncated on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Time {
    /// Hour 0..=23.
    pub hour: u8,
    /// Minute 0..=59.
    pub minute: u8,
    /// Second 0..=60 (60 allows a leap second, as in RWF).
    pub second: u8,
    /// Millisecond 0..=999.
    pub millisecond: u16,
    /// Microsecond 0..=999.
    pub microsecond: u16,
    /// Nanosecond 0..=999.
    pub nanosecond: u16,
}

impl Time {
    /// Creates an hour/minute/second time after validation.
    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Self> {
        let time = Self {
            hour,
            minute,
            second,
            ..Self::default()
        };
        time.validate()?;
        Ok(time)
    }

    /// Rejects out-of-range components before any bytes are written.
    pub fn validate(&self) -> Result<()> {
        if self.hour > 23 {
            return Err(OmmError::InvalidData(format!("invalid hour {}", self.hour)));
        }
        if self.minute > 59 {
            return Err(OmmError::InvalidData(format!(
                "invalid minute {}",
                self.minute
            )));
        }
        if self.second > 60 {
            return Err(OmmError::InvalidData(format!(
                "invalid second {}",
                self.second
            )));
        }
        if self.millisecond > 999 || self.microsecond > 999 || self.nanosecond > 999 {
            return Err(OmmError::InvalidData(
                "sub-second component out of range".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.millisecond != 0 || self.microsecond != 0 || self.nanosecond != 0 {
            write!(f, ".{:03}", self.millisecond)?;
        }
        if self.microsecond != 0 || self.nanosecond != 0 {
            write!(f, ":{:03}", self.microsecond)?;
        }
        if self.nanosecond != 0 {
            write!(f, ":{:03}", self.nanosecond)?;
        }
        Ok(())
    }
}

/// Date plus time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DateTime {
    /// The date portion.
    pub date: Date,
    /// The time portion.
    pub time: Time,
}

impl DateTime {
    /// Creates a datetime after validating both portions.
    pub fn new(date: Date, time: Time) -> Result<Self> {
        date.validate()?;
        time.validate()?;
        Ok(Self { date, time })
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

/// Timeliness leg of a [`Qos`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum QosTimeliness {
    /// No timeliness information; rejected at encode time.
    Unspecified = 0,
    /// Data is realtime.
    Realtime = 1,
    /// Delayed by an unknown amount.
    DelayedUnknown = 2,
    /// Delayed by `time_info` (the explicit-numeric escape).
    Delayed = 3,
}

impl QosTimeliness {
    /// Decodes from the wire bit field.
    pub fn from_u8(v: u8) -> Result<Self> {
        Ok(match v {
            0 => Self::Unspecified,
            1 => Self::Realtime,
            2 => Self::DelayedUnknown,
            3 => Self::Delayed,
            other => {
                return Err(OmmError::InvalidData(format!(
                    "invalid qos timeliness {other}"
                )))
            }
        })
    }
}

/// Rate leg of a [`Qos`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum QosRate {
    /// No rate information; rejected at encode time.
    Unspecified = 0,
    /// Every tick is delivered.
    TickByTick = 1,
    /// Just-in-time conflation.
    JitConflated = 2,
    /// Conflated by `rate_info` milliseconds (the explicit-numeric escape).
    TimeConflated = 3,
}

impl QosRate {
    /// Decodes from the wire bit field.
    pub fn from_u8(v: u8) -> Result<Self> {
        Ok(match v {
            0 => Self::Unspecified,
            1 => Self::TickByTick,
            2 => Self::JitConflated,
            3 => Self::TimeConflated,
            other => return Err(OmmError::InvalidData(format!("invalid qos rate {other}"))),
        })
    }
}

/// Quality of service descriptor.
///
/// One packed byte on the wire (`timeliness << 5 | rate << 1 | dynamic`)
/// followed by an explicit u16 per escape leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Qos {
    /// Timeliness leg.
    pub timeliness: QosTimeliness,
    /// Rate leg.
    pub rate: QosRate,
    /// True when the QoS may change over the life of the stream.
    pub dynamic: bool,
    /// Explicit timeliness value; meaningful when `timeliness` is `Delayed`.
    pub time_info: u16,
    /// Explicit rate value; meaningful when `rate` is `TimeConflated`.
    pub rate_info: u16,
}

impl Qos {
    /// Realtime, tick-by-tick service.
    #[must_use]
    pub const fn realtime() -> Self {
        Self {
            timeliness: QosTimeliness::Realtime,
            rate: QosRate::TickByTick,
            dynamic: false,
            time_info: 0,
            rate_info: 0,
        }
    }

    /// QoS with explicit numeric timeliness and rate values.
    #[must_use]
    pub const fn from_numeric(time_info: u16, rate_info: u16) -> Self {
        Self {
            timeliness: QosTimeliness::Delayed,
            rate: QosRate::TimeConflated,
            dynamic: false,
            time_info,
            rate_info,
        }
    }

    /// Renders the timeliness leg; escape values render numerically.
    #[must_use]
    pub fn timeliness_as_string(&self) -> String {
        match self.timeliness {
            QosTimeliness::Unspecified => "Unspecified".to_string(),
            QosTimeliness::Realtime => "RealTime".to_string(),
            QosTimeliness::DelayedUnknown => "InexactDelayed".to_string(),
            QosTimeliness::Delayed => format!("Timeliness: {}", self.time_info),
        }
    }

    /// Renders the rate leg; escape values render numerically.
    #[must_use]
    pub fn rate_as_string(&self) -> String {
        match self.rate {
            QosRate::Unspecified => "Unspecified".to_string(),
            QosRate::TickByTick => "TickByTick".to_string(),
            QosRate::JitConflated => "JustInTimeConflated".to_string(),
            QosRate::TimeConflated => format!("Rate: {}", self.rate_info),
        }
    }
}

impl fmt::Display for Qos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.timeliness_as_string(),
            self.rate_as_string()
        )
    }
}

/// Stream state of a [`State`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StreamState {
    /// No state information; rejected at encode time.
    Unspecified = 0,
    /// Stream is open and may deliver further data.
    Open = 1,
    /// Delivered as a snapshot; the stream closes afterwards.
    NonStreaming = 2,
    /// Stream is closed.
    Closed = 3,
    /// Stream is closed but may be recovered.
    ClosedRecover = 4,
    /// Stream is closed and redirected elsewhere.
    ClosedRedirected = 5,
}

impl StreamState {
    /// Decodes from the wire bit field.
    pub fn from_u8(v: u8) -> Result<Self> {
        Ok(match v {
            0 => Self::Unspecified,
            1 => Self::Open,
            2 => Self::NonStreaming,
            3 => Self::Closed,
            4 => Self::ClosedRecover,
            5 => Self::ClosedRedirected,
            other => {
                return Err(OmmError::InvalidData(format!(
                    "invalid stream state {other}"
                )))
            }
        })
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unspecified => "Unspecified",
            Self::Open => "Open",
            Self::NonStreaming => "NonStreaming",
            Self::Closed => "Closed",
            Self::ClosedRecover => "ClosedRecover",
            Self::ClosedRedirected => "ClosedRedirected",
        };
        f.write_str(name)
    }
}

/// Data state of a [`State`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataState {
    /// No change to the previous data state.
    NoChange = 0,
    /// Data is healthy.
    Ok = 1,
    /// Data is suspect.
    Suspect = 2,
}

impl DataState {
    /// Decodes from the wire bit field.
    pub fn from_u8(v: u8) -> Result<Self> {
        Ok(match v {
            0 => Self::NoChange,
            1 => Self::Ok,
            2 => Self::Suspect,
            other => return Err(OmmError::InvalidData(format!("invalid data state {other}"))),
        })
    }
}

impl fmt::Display for DataState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoChange => "NoChange",
            Self::Ok => "Ok",
            Self::Suspect => "Suspect",
        };
        f.write_str(name)
    }
}

/// Well-known status code values carried in [`State::status_code`].
pub mod status_code {
    /// No special status.
    pub const NONE: u8 = 0;
    /// Item not found.
    pub const NOT_FOUND: u8 = 5;
    /// Request timed out.
    pub const TIMEOUT: u8 = 6;
    /// Access denied by the source.
    pub const NOT_AUTHORIZED: u8 = 7;
    /// Source is unavailable.
    pub const NO_RESOURCES: u8 = 10;
}

/// Stream state descriptor: stream/data state, status code and text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    /// Stream state leg.
    pub stream_state: StreamState,
    /// Data state leg.
    pub data_state: DataState,
    /// Status code (see [`status_code`]).
    pub status_code: u8,
    /// Human-readable status text.
    pub status_text: String,
}

impl State {
    /// Creates a state with an empty status text and `status_code::NONE`.
    #[must_use]
    pub fn new(stream_state: StreamState, data_state: DataState) -> Self {
        Self {
            stream_state,
            data_state,
            status_code: status_code::NONE,
            status_text: String::new(),
        }
    }

    /// Sets the status text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / '{}'",
            self.stream_state, self.data_state, self.status_code, self.status_text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_round_trips_through_tag() {
        for dt in [
            DataType::Int,
            DataType::UInt,
            DataType::Real,
            DataType::Qos,
            DataType::FieldList,
            DataType::Map,
            DataType::Msg,
        ] {
            assert_eq!(DataType::from_u8(dt.as_u8()).unwrap(), dt);
        }
        assert!(matches!(
            DataType::from_u8(200),
            Err(OmmError::UnknownType(200))
        ));
    }

    #[test]
    fn container_classification() {
        assert!(DataType::FieldList.is_container());
        assert!(DataType::Msg.is_container());
        assert!(DataType::NoData.is_container());
        assert!(DataType::Real.is_primitive());
    }

    #[test]
    fn real_hint_rejects_reserved_values() {
        assert!(RealHint::from_u8(31).is_err());
        assert!(RealHint::from_u8(32).is_err());
        assert!(RealHint::from_u8(36).is_err());
        assert_eq!(RealHint::from_u8(14).unwrap(), RealHint::Exponent0);
        assert_eq!(RealHint::from_u8(35).unwrap(), RealHint::NotANumber);
    }

    #[test]
    fn real_to_f64_exponent_and_fraction() {
        let r = Real::new(15050, RealHint::ExponentNeg2);
        assert!((r.to_f64() - 150.50).abs() < 1e-9);

        let r = Real::new(5, RealHint::Fraction2);
        assert!((r.to_f64() - 2.5).abs() < 1e-9);

        assert!(Real::new(0, RealHint::NotANumber).to_f64().is_nan());
    }

    #[test]
    fn date_validation() {
        assert!(Date::new(1999, 11, 7).is_ok());
        assert!(Date::new(2020, 13, 1).is_err());
        assert!(Date::new(2020, 1, 32).is_err());
        assert!(Date::new(0, 0, 0).unwrap().is_blank());
    }

    #[test]
    fn date_display() {
        let d = Date::new(1999, 11, 7).unwrap();
        assert_eq!(d.to_string(), "07 NOV 1999");
    }

    #[test]
    fn time_validation() {
        assert!(Time::new(23, 59, 59).is_ok());
        assert!(Time::new(25, 0, 0).is_err());
        assert!(Time::new(1, 60, 0).is_err());
        // Leap second is legal.
        assert!(Time::new(23, 59, 60).is_ok());
    }

    #[test]
    fn qos_named_rendering() {
        assert_eq!(Qos::realtime().to_string(), "RealTime/TickByTick");
    }

    #[test]
    fn qos_numeric_rendering() {
        let qos = Qos::from_numeric(5656, 2345);
        assert_eq!(qos.timeliness_as_string(), "Timeliness: 5656");
        assert_eq!(qos.to_string(), "Timeliness: 5656/Rate: 2345");
    }

    #[test]
    fn state_rendering() {
        let state = State::new(StreamState::Open, DataState::Ok).with_text("all is well");
        assert_eq!(state.to_string(), "Open / Ok / 0 / 'all is well'");
    }
}
