//! Scalar wire codec.
//!
//! Every decode function consumes a [`WireCursor`] framed over exactly one
//! value's payload; the enclosing entry supplies the length. Integers are
//! minimal-width big-endian, so the payload length *is* the width. Encoding
//! validates before writing: a rejected value leaves the writer untouched.

use crate::buffer::{WireCursor, WireWriter};
use crate::error::{OmmError, Result};
use crate::types::{
    DataState, Date, DateTime, Qos, QosRate, QosTimeliness, Real, RealHint, State, StreamState,
    Time,
};

/// Minimal number of bytes needed for an unsigned value (at least 1).
#[must_use]
pub fn uint_width(v: u64) -> usize {
    ((71 - v.leading_zeros() as usize) / 8).max(1)
}

/// Minimal number of bytes for a signed value in two's complement.
#[must_use]
pub fn int_width(v: i64) -> usize {
    let bytes = v.to_be_bytes();
    let mut start = 0;
    while start < 7 {
        let lead = bytes[start];
        let next = bytes[start + 1];
        let redundant = (lead == 0x00 && next & 0x80 == 0) || (lead == 0xFF && next & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    8 - start
}

/// Encodes an unsigned integer at its minimal width.
pub fn encode_uint(w: &mut WireWriter, v: u64) -> Result<()> {
    encode_uint_fixed(w, v, uint_width(v))
}

/// Encodes an unsigned integer at exactly `width` bytes.
pub fn encode_uint_fixed(w: &mut WireWriter, v: u64, width: usize) -> Result<()> {
    if width == 0 || width > 8 || uint_width(v) > width {
        return Err(OmmError::InvalidData(format!(
            "uint {v} does not fit in {width} bytes"
        )));
    }
    w.put_bytes(&v.to_be_bytes()[8 - width..])
}

/// Encodes a signed integer at its minimal width.
pub fn encode_int(w: &mut WireWriter, v: i64) -> Result<()> {
    encode_int_fixed(w, v, int_width(v))
}

/// Encodes a signed integer at exactly `width` bytes.
pub fn encode_int_fixed(w: &mut WireWriter, v: i64, width: usize) -> Result<()> {
    if width == 0 || width > 8 || int_width(v) > width {
        return Err(OmmError::InvalidData(format!(
            "int {v} does not fit in {width} bytes"
        )));
    }
    w.put_bytes(&v.to_be_bytes()[8 - width..])
}

/// Decodes an unsigned integer from all remaining payload bytes.
pub fn decode_uint(cur: &mut WireCursor) -> Result<u64> {
    let len = cur.remaining();
    if len == 0 {
        return Err(OmmError::BlankValue("uint"));
    }
    if len > 8 {
        return Err(OmmError::InvalidData(format!("uint payload of {len} bytes")));
    }
    let bytes = cur.take(len)?;
    let mut v: u64 = 0;
    for b in &bytes {
        v = (v << 8) | u64::from(*b);
    }
    Ok(v)
}

/// Decodes a signed integer from all remaining payload bytes.
pub fn decode_int(cur: &mut WireCursor) -> Result<i64> {
    let len = cur.remaining();
    if len == 0 {
        return Err(OmmError::BlankValue("int"));
    }
    if len > 8 {
        return Err(OmmError::InvalidData(format!("int payload of {len} bytes")));
    }
    let bytes = cur.take(len)?;
    let mut v: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
    for b in &bytes {
        v = (v << 8) | i64::from(*b);
    }
    Ok(v)
}

/// Encodes an enumerated value at minimal width (1 or 2 bytes).
pub fn encode_enum(w: &mut WireWriter, v: u16) -> Result<()> {
    encode_uint(w, u64::from(v))
}

/// Decodes an enumerated value.
pub fn decode_enum(cur: &mut WireCursor) -> Result<u16> {
    let v = decode_uint(cur).map_err(|e| match e {
        OmmError::BlankValue(_) => OmmError::BlankValue("enum"),
        other => other,
    })?;
    u16::try_from(v).map_err(|_| OmmError::InvalidData(format!("enum value {v} exceeds u16")))
}

/// Encodes an IEEE-754 single-precision float (4 bytes).
pub fn encode_float(w: &mut WireWriter, v: f32) -> Result<()> {
    w.put_u32(v.to_bits())
}

/// Decodes an IEEE-754 single-precision float.
pub fn decode_float(cur: &mut WireCursor) -> Result<f32> {
    if cur.is_empty() {
        return Err(OmmError::BlankValue("float"));
    }
    Ok(f32::from_bits(cur.u32()?))
}

/// Encodes an IEEE-754 double-precision float (8 bytes).
pub fn encode_double(w: &mut WireWriter, v: f64) -> Result<()> {
    w.put_u64(v.to_bits())
}

/// Decodes an IEEE-754 double-precision float.
pub fn decode_double(cur: &mut WireCursor) -> Result<f64> {
    if cur.is_empty() {
        return Err(OmmError::BlankValue("double"));
    }
    Ok(f64::from_bits(cur.u64()?))
}

/// Encodes a real: one hint byte, then the minimal-width mantissa.
/// Special hints (Inf/-Inf/NaN) carry no mantissa bytes.
pub fn encode_real(w: &mut WireWriter, v: &Real) -> Result<()> {
    w.put_u8(v.hint.as_u8())?;
    if v.hint.is_special() {
        return Ok(());
    }
    encode_int(w, v.mantissa)
}

/// Decodes a real. A zero-length payload is the blank sentinel.
pub fn decode_real(cur: &mut WireCursor) -> Result<Real> {
    if cur.is_empty() {
        return Err(OmmError::BlankValue("real"));
    }
    let hint = RealHint::from_u8(cur.u8()?)?;
    let mantissa = if hint.is_special() || cur.is_empty() {
        0
    } else {
        decode_int(cur)?
    };
    Ok(Real { mantissa, hint })
}

/// Encodes a date: day, month, then a big-endian year (RWF field order).
pub fn encode_date(w: &mut WireWriter, v: &Date) -> Result<()> {
    v.validate()?;
    w.put_u8(v.day)?;
    w.put_u8(v.month)?;
    w.put_u16(v.year)
}

/// Decodes a 4-byte date.
pub fn decode_date(cur: &mut WireCursor) -> Result<Date> {
    if cur.is_empty() {
        return Err(OmmError::BlankValue("date"));
    }
    let day = cur.u8()?;
    let month = cur.u8()?;
    let year = cur.u16()?;
    Ok(Date { year, month, day })
}

fn time_encoded_len(v: &Time) -> usize {
    if v.nanosecond != 0 {
        8
    } else if v.microsecond != 0 {
        7
    } else if v.millisecond != 0 {
        5
    } else if v.second != 0 {
        3
    } else {
        2
    }
}

/// Encodes a time at 2, 3, 5, 7 or 8 bytes depending on which trailing
/// components are zero. The 8-byte form folds the high nanosecond bits into
/// the microsecond word, exactly as RWF does.
pub fn encode_time(w: &mut WireWriter, v: &Time) -> Result<()> {
    v.validate()?;
    let len = time_encoded_len(v);
    w.put_u8(v.hour)?;
    w.put_u8(v.minute)?;
    if len >= 3 {
        w.put_u8(v.second)?;
    }
    if len >= 5 {
        w.put_u16(v.millisecond)?;
    }
    match len {
        7 => w.put_u16(v.microsecond)?,
        8 => {
            let micro_word = ((v.nanosecond & 0xFF00) << 3) | v.microsecond;
            w.put_u16(micro_word)?;
            w.put_u8((v.nanosecond & 0xFF) as u8)?;
        }
        _ => {}
    }
    Ok(())
}

/// Decodes a time; the payload length selects the component set.
pub fn decode_time(cur: &mut WireCursor) -> Result<Time> {
    let len = cur.remaining();
    let mut time = Time::default();
    match len {
        0 => return Err(OmmError::BlankValue("time")),
        2 | 3 | 5 | 7 | 8 => {}
        other => {
            return Err(OmmError::InvalidData(format!(
                "time payload of {other} bytes"
            )))
        }
    }
    time.hour = cur.u8()?;
    time.minute = cur.u8()?;
    if len >= 3 {
        time.second = cur.u8()?;
    }
    if len >= 5 {
        time.millisecond = cur.u16()?;
    }
    if len == 7 {
        time.microsecond = cur.u16()?;
    }
    if len == 8 {
        let micro_word = cur.u16()?;
        let nano_low = cur.u8()?;
        time.microsecond = micro_word & 0x07FF;
        time.nanosecond = ((micro_word & 0x3800) >> 3) | u16::from(nano_low);
    }
    Ok(time)
}

/// Encodes a datetime: date bytes followed by time bytes.
pub fn encode_datetime(w: &mut WireWriter, v: &DateTime) -> Result<()> {
    v.date.validate()?;
    v.time.validate()?;
    encode_date(w, &v.date)?;
    encode_time(w, &v.time)
}

/// Decodes a datetime (4 date bytes, then a variable-length time).
pub fn decode_datetime(cur: &mut WireCursor) -> Result<DateTime> {
    if cur.is_empty() {
        return Err(OmmError::BlankValue("datetime"));
    }
    let date = decode_date(cur)?;
    let time = decode_time(cur)?;
    Ok(DateTime { date, time })
}

/// Encodes a QoS descriptor: a packed byte, then the escape words.
pub fn encode_qos(w: &mut WireWriter, v: &Qos) -> Result<()> {
    if v.timeliness == QosTimeliness::Unspecified || v.rate == QosRate::Unspecified {
        return Err(OmmError::InvalidData(
            "qos timeliness and rate must be specified".into(),
        ));
    }
    let packed = ((v.timeliness as u8) << 5) | ((v.rate as u8) << 1) | u8::from(v.dynamic);
    w.put_u8(packed)?;
    if v.timeliness == QosTimeliness::Delayed {
        w.put_u16(v.time_info)?;
    }
    if v.rate == QosRate::TimeConflated {
        w.put_u16(v.rate_info)?;
    }
    Ok(())
}

/// Decodes a QoS descriptor.
pub fn decode_qos(cur: &mut WireCursor) -> Result<Qos> {
    if cur.is_empty() {
        return Err(OmmError::BlankValue("qos"));
    }
    let packed = cur.u8()?;
    let timeliness = QosTimeliness::from_u8(packed >> 5)?;
    let rate = QosRate::from_u8((packed >> 1) & 0x0F)?;
    let dynamic = packed & 0x01 != 0;
    let time_info = if timeliness == QosTimeliness::Delayed {
        cur.u16()?
    } else {
        0
    };
    let rate_info = if rate == QosRate::TimeConflated {
        cur.u16()?
    } else {
        0
    };
    Ok(Qos {
        timeliness,
        rate,
        dynamic,
        time_info,
        rate_info,
    })
}

/// Encodes a state descriptor: packed states, status code, u15 text.
pub fn encode_state(w: &mut WireWriter, v: &State) -> Result<()> {
    if v.stream_state == StreamState::Unspecified {
        return Err(OmmError::InvalidData("stream state must be specified".into()));
    }
    let packed = ((v.stream_state as u8) << 3) | v.data_state as u8;
    w.put_u8(packed)?;
    w.put_u8(v.status_code)?;
    w.put_buf15(v.status_text.as_bytes())
}

/// Decodes a state descriptor.
pub fn decode_state(cur: &mut WireCursor) -> Result<State> {
    if cur.is_empty() {
        return Err(OmmError::BlankValue("state"));
    }
    let packed = cur.u8()?;
    let stream_state = StreamState::from_u8(packed >> 3)?;
    let data_state = DataState::from_u8(packed & 0x07)?;
    let status_code = cur.u8()?;
    let text = cur.buf15()?;
    let status_text = String::from_utf8(text.to_vec())
        .map_err(|_| OmmError::InvalidData("state text is not valid UTF-8".into()))?;
    Ok(State {
        stream_state,
        data_state,
        status_code,
        status_text,
    })
}

/// Expands RMTES bytes to a Unicode string.
///
/// This is a distinct operation from raw buffer decode: raw decode never
/// transcodes. Only the Latin-1 subset is supported; partial-update escape
/// sequences (0x1B) are rejected.
pub fn rmtes_to_string(raw: &[u8]) -> Result<String> {
    if raw.contains(&0x1B) {
        return Err(OmmError::InvalidData(
            "RMTES partial-update sequences are not supported".into(),
        ));
    }
    Ok(raw.iter().map(|&b| b as char).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn round_trip<T, E, D>(encode: E, decode: D, value: T) -> T
    where
        E: Fn(&mut WireWriter, &T) -> Result<()>,
        D: Fn(&mut WireCursor) -> Result<T>,
    {
        let mut w = WireWriter::new(256);
        encode(&mut w, &value).unwrap();
        let mut c = WireCursor::new(w.freeze());
        let out = decode(&mut c).unwrap();
        assert!(c.is_empty(), "decode left trailing bytes");
        out
    }

    #[test]
    fn uint_minimal_widths() {
        assert_eq!(uint_width(0), 1);
        assert_eq!(uint_width(0xFF), 1);
        assert_eq!(uint_width(0x100), 2);
        assert_eq!(uint_width(u64::MAX), 8);
    }

    #[test]
    fn int_minimal_widths() {
        assert_eq!(int_width(0), 1);
        assert_eq!(int_width(127), 1);
        assert_eq!(int_width(128), 2);
        assert_eq!(int_width(-1), 1);
        assert_eq!(int_width(-128), 1);
        assert_eq!(int_width(-129), 2);
        assert_eq!(int_width(i64::MIN), 8);
    }

    #[test]
    fn uint_round_trip() {
        for v in [0u64, 1, 64, 0xFF, 0x100, 0xFFFF, 1 << 40, u64::MAX] {
            let out = round_trip(|w, v| encode_uint(w, *v), decode_uint, v);
            assert_eq!(out, v);
        }
    }

    #[test]
    fn int_round_trip() {
        for v in [0i64, 1, -1, 127, -128, 128, -129, i64::MAX, i64::MIN] {
            let out = round_trip(|w, v| encode_int(w, *v), decode_int, v);
            assert_eq!(out, v);
        }
    }

    #[test]
    fn fixed_width_rejects_overflow() {
        let mut w = WireWriter::new(16);
        assert!(encode_uint_fixed(&mut w, 0x1FF, 1).is_err());
        assert!(encode_int_fixed(&mut w, -200, 1).is_err());
        assert_eq!(w.position(), 0);
    }

    #[test]
    fn empty_payload_is_blank() {
        let mut c = WireCursor::new(Bytes::new());
        assert_eq!(decode_uint(&mut c).unwrap_err(), OmmError::BlankValue("uint"));
        let mut c = WireCursor::new(Bytes::new());
        assert_eq!(decode_real(&mut c).unwrap_err(), OmmError::BlankValue("real"));
    }

    #[test]
    fn real_round_trip() {
        for r in [
            Real::new(15050, RealHint::ExponentNeg2),
            Real::new(-7, RealHint::Exponent0),
            Real::new(5, RealHint::Fraction2),
            Real::new(0, RealHint::Infinity),
            Real::new(0, RealHint::NegInfinity),
            Real::new(0, RealHint::NotANumber),
        ] {
            let out = round_trip(encode_real, decode_real, r);
            assert_eq!(out, r);
        }
    }

    #[test]
    fn real_decode_rejects_reserved_hint() {
        let mut c = WireCursor::new(Bytes::from_static(&[31, 0x01]));
        assert!(matches!(
            decode_real(&mut c),
            Err(OmmError::InvalidData(_))
        ));
    }

    #[test]
    fn date_round_trip_and_validation() {
        let d = Date::new(1999, 11, 7).unwrap();
        assert_eq!(round_trip(encode_date, decode_date, d), d);

        let mut w = WireWriter::new(16);
        let bad = Date {
            year: 2020,
            month: 13,
            day: 1,
        };
        assert!(encode_date(&mut w, &bad).is_err());
        assert_eq!(w.position(), 0, "no bytes written on validation failure");
    }

    #[test]
    fn time_truncated_lengths() {
        let cases = [
            (Time::new(2, 3, 0).unwrap(), 2usize),
            (Time::new(2, 3, 4).unwrap(), 3),
            (
                Time {
                    hour: 2,
                    minute: 3,
                    second: 4,
                    millisecond: 5,
                    ..Time::default()
                },
                5,
            ),
            (
                Time {
                    hour: 2,
                    minute: 3,
                    second: 4,
                    millisecond: 5,
                    microsecond: 6,
                    ..Time::default()
                },
                7,
            ),
            (
                Time {
                    hour: 2,
                    minute: 3,
                    second: 4,
                    millisecond: 5,
                    microsecond: 666,
                    nanosecond: 999,
                },
                8,
            ),
        ];
        for (t, expected_len) in cases {
            let mut w = WireWriter::new(16);
            encode_time(&mut w, &t).unwrap();
            assert_eq!(w.position(), expected_len, "{t:?}");
            let mut c = WireCursor::new(w.freeze());
            assert_eq!(decode_time(&mut c).unwrap(), t);
        }
    }

    #[test]
    fn time_rejects_out_of_range() {
        let mut w = WireWriter::new(16);
        let bad = Time {
            hour: 25,
            ..Time::default()
        };
        assert!(encode_time(&mut w, &bad).is_err());
        assert_eq!(w.position(), 0);
    }

    #[test]
    fn datetime_round_trip() {
        let dt = DateTime {
            date: Date::new(2004, 11, 7).unwrap(),
            time: Time {
                hour: 1,
                minute: 2,
                second: 3,
                millisecond: 4,
                microsecond: 5,
                nanosecond: 6,
            },
        };
        assert_eq!(round_trip(encode_datetime, decode_datetime, dt), dt);
    }

    #[test]
    fn qos_named_round_trip() {
        let qos = Qos::realtime();
        let mut w = WireWriter::new(16);
        encode_qos(&mut w, &qos).unwrap();
        assert_eq!(w.position(), 1, "named qos is a single packed byte");
        let mut c = WireCursor::new(w.freeze());
        assert_eq!(decode_qos(&mut c).unwrap(), qos);
    }

    #[test]
    fn qos_numeric_round_trip() {
        let qos = Qos::from_numeric(5656, 2345);
        let mut w = WireWriter::new(16);
        encode_qos(&mut w, &qos).unwrap();
        assert_eq!(w.position(), 5, "both escape words present");
        let mut c = WireCursor::new(w.freeze());
        let out = decode_qos(&mut c).unwrap();
        assert_eq!(out, qos);
        assert_eq!(out.to_string(), "Timeliness: 5656/Rate: 2345");
    }

    #[test]
    fn qos_rejects_unspecified() {
        let mut w = WireWriter::new(16);
        let bad = Qos {
            timeliness: QosTimeliness::Unspecified,
            ..Qos::realtime()
        };
        assert!(encode_qos(&mut w, &bad).is_err());
    }

    #[test]
    fn state_round_trip() {
        let state =
            State::new(StreamState::Open, DataState::Ok).with_text("refresh completed");
        let mut w = WireWriter::new(64);
        encode_state(&mut w, &state).unwrap();
        let mut c = WireCursor::new(w.freeze());
        assert_eq!(decode_state(&mut c).unwrap(), state);
    }

    #[test]
    fn state_rejects_unspecified_stream_state() {
        let mut w = WireWriter::new(64);
        let bad = State::new(StreamState::Unspecified, DataState::Ok);
        assert!(encode_state(&mut w, &bad).is_err());
        assert_eq!(w.position(), 0);
    }

    #[test]
    fn rmtes_plain_expansion() {
        assert_eq!(rmtes_to_string(b"NYSE").unwrap(), "NYSE");
        assert_eq!(rmtes_to_string(&[0xE9]).unwrap(), "\u{e9}");
        assert!(rmtes_to_string(&[0x1B, 0x5B]).is_err());
    }
}
