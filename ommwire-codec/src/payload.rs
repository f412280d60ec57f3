//! Entry values.
//!
//! Three representations of "the data inside an entry" live here:
//! - [`Value`]: the owned encode-side value placed into a container builder.
//! - [`Load`]: the decode-side value produced lazily when an entry is read.
//! - [`Payload`]: an undecoded container body (type tag plus raw bytes),
//!   passed through untouched until something asks for a view over it.
//!
//! A malformed entry payload never aborts iteration over its container:
//! [`decode_load`] substitutes [`Load::Blank`] for anything it cannot decode
//! and records the reason at debug level. Structural truncation of the
//! container itself is a hard error and is reported by the iterators, not
//! here.

use std::fmt;

use bytes::Bytes;

use ommwire_core::primitive;
use ommwire_core::{
    encode_with_growth, DataType, Date, DateTime, OmmError, Qos, Real, Result, State, Time,
    WireCursor, WireWriter,
};

use crate::array::{ArrayView, OmmArray};
use crate::element_list::ElementListView;
use crate::field_list::FieldListView;
use crate::filter_list::FilterListView;
use crate::map::MapView;
use crate::series::SeriesView;
use crate::vector::VectorView;
use crate::view::MsgView;

/// An undecoded container body: the declared container type and its raw
/// encoded bytes.
///
/// Payloads are zero-copy slices of the buffer they were decoded from; use
/// [`Payload::to_owned_copy`] to detach one from its parent buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Declared container type of `data`.
    pub container_type: DataType,
    /// Raw encoded container body.
    pub data: Bytes,
}

impl Payload {
    /// Wraps raw container bytes with their declared type.
    #[must_use]
    pub fn new(container_type: DataType, data: Bytes) -> Self {
        Self {
            container_type,
            data,
        }
    }

    /// The empty payload.
    #[must_use]
    pub fn no_data() -> Self {
        Self {
            container_type: DataType::NoData,
            data: Bytes::new(),
        }
    }

    /// Returns a payload whose bytes are copied out of the parent buffer.
    #[must_use]
    pub fn to_owned_copy(&self) -> Self {
        Self {
            container_type: self.container_type,
            data: Bytes::copy_from_slice(&self.data),
        }
    }

    fn check(&self, want: DataType) -> Result<()> {
        if self.container_type != want {
            return Err(OmmError::TypeMismatch {
                expected: want,
                actual: self.container_type,
            });
        }
        Ok(())
    }

    /// Decodes the body as a field list.
    pub fn field_list(&self) -> Result<FieldListView> {
        self.check(DataType::FieldList)?;
        FieldListView::decode(self.data.clone())
    }

    /// Decodes the body as an element list.
    pub fn element_list(&self) -> Result<ElementListView> {
        self.check(DataType::ElementList)?;
        ElementListView::decode(self.data.clone())
    }

    /// Decodes the body as a map.
    pub fn map(&self) -> Result<MapView> {
        self.check(DataType::Map)?;
        MapView::decode(self.data.clone())
    }

    /// Decodes the body as a vector.
    pub fn vector(&self) -> Result<VectorView> {
        self.check(DataType::Vector)?;
        VectorView::decode(self.data.clone())
    }

    /// Decodes the body as a series.
    pub fn series(&self) -> Result<SeriesView> {
        self.check(DataType::Series)?;
        SeriesView::decode(self.data.clone())
    }

    /// Decodes the body as a filter list.
    pub fn filter_list(&self) -> Result<FilterListView> {
        self.check(DataType::FilterList)?;
        FilterListView::decode(self.data.clone())
    }

    /// Decodes the body as a nested message.
    pub fn msg(&self) -> Result<MsgView> {
        self.check(DataType::Msg)?;
        let mut view = MsgView::new();
        view.bind(self.data.clone())?;
        Ok(view)
    }
}

/// An owned encode-side value for a container entry.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    Real(Real),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
    Enum(u16),
    Ascii(String),
    Utf8(String),
    Rmtes(Bytes),
    Buffer(Bytes),
    Qos(Qos),
    State(State),
    Array(OmmArray),
    /// A pre-encoded container body carried through unchanged.
    Container(Payload),
    /// Explicitly no value, typed. Encoded as a zero-length payload.
    Blank(DataType),
    NoData,
}

impl Value {
    /// The wire type tag this value encodes under.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::UInt(_) => DataType::UInt,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::Real(_) => DataType::Real,
            Value::Date(_) => DataType::Date,
            Value::Time(_) => DataType::Time,
            Value::DateTime(_) => DataType::DateTime,
            Value::Enum(_) => DataType::Enum,
            Value::Ascii(_) => DataType::Ascii,
            Value::Utf8(_) => DataType::Utf8,
            Value::Rmtes(_) => DataType::Rmtes,
            Value::Buffer(_) => DataType::Buffer,
            Value::Qos(_) => DataType::Qos,
            Value::State(_) => DataType::State,
            Value::Array(_) => DataType::Array,
            Value::Container(p) => p.container_type,
            Value::Blank(ty) => *ty,
            Value::NoData => DataType::NoData,
        }
    }

    /// Writes this value's payload bytes (no length prefix, no type tag).
    pub fn encode_into(&self, w: &mut WireWriter) -> Result<()> {
        match self {
            Value::Int(v) => primitive::encode_int(w, *v),
            Value::UInt(v) => primitive::encode_uint(w, *v),
            Value::Float(v) => primitive::encode_float(w, *v),
            Value::Double(v) => primitive::encode_double(w, *v),
            Value::Real(v) => primitive::encode_real(w, v),
            Value::Date(v) => primitive::encode_date(w, v),
            Value::Time(v) => primitive::encode_time(w, v),
            Value::DateTime(v) => primitive::encode_datetime(w, v),
            Value::Enum(v) => primitive::encode_enum(w, *v),
            Value::Ascii(s) => {
                if !s.is_ascii() {
                    return Err(OmmError::InvalidData(
                        "ascii value contains non-ASCII bytes".into(),
                    ));
                }
                w.put_bytes(s.as_bytes())
            }
            Value::Utf8(s) => w.put_bytes(s.as_bytes()),
            Value::Rmtes(b) | Value::Buffer(b) => w.put_bytes(b),
            Value::Qos(v) => primitive::encode_qos(w, v),
            Value::State(v) => primitive::encode_state(w, v),
            Value::Array(a) => a.encode_into(w),
            Value::Container(p) => w.put_bytes(&p.data),
            Value::Blank(_) | Value::NoData => Ok(()),
        }
    }

    /// Encodes this value's payload into an owned buffer.
    pub fn encode_payload(&self) -> Result<Bytes> {
        // Pre-encoded container bodies pass through without re-framing.
        if let Value::Container(p) = self {
            return Ok(p.data.clone());
        }
        encode_with_growth(64, |w| self.encode_into(w))
    }
}

/// A lazily-decoded entry value.
///
/// Produced by [`EntryData::load`]; each call re-decodes from the raw entry
/// bytes, so a `Load` never goes stale when its view is rebound.
#[derive(Debug, Clone)]
pub enum Load {
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    Real(Real),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
    Enum(u16),
    Ascii(String),
    Utf8(String),
    Rmtes(Bytes),
    Buffer(Bytes),
    Qos(Qos),
    State(State),
    Array(ArrayView),
    /// A nested container, still undecoded.
    Container(Payload),
    NoData,
    /// A typed entry that carries no value, or one whose payload could not
    /// be decoded.
    Blank(DataType),
    /// The entry's declared type tag is outside the known set.
    Error(OmmError),
}

impl Load {
    /// The wire type this load was decoded as, when one is known.
    #[must_use]
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Load::Int(_) => Some(DataType::Int),
            Load::UInt(_) => Some(DataType::UInt),
            Load::Float(_) => Some(DataType::Float),
            Load::Double(_) => Some(DataType::Double),
            Load::Real(_) => Some(DataType::Real),
            Load::Date(_) => Some(DataType::Date),
            Load::Time(_) => Some(DataType::Time),
            Load::DateTime(_) => Some(DataType::DateTime),
            Load::Enum(_) => Some(DataType::Enum),
            Load::Ascii(_) => Some(DataType::Ascii),
            Load::Utf8(_) => Some(DataType::Utf8),
            Load::Rmtes(_) => Some(DataType::Rmtes),
            Load::Buffer(_) => Some(DataType::Buffer),
            Load::Qos(_) => Some(DataType::Qos),
            Load::State(_) => Some(DataType::State),
            Load::Array(_) => Some(DataType::Array),
            Load::Container(p) => Some(p.container_type),
            Load::NoData => Some(DataType::NoData),
            Load::Blank(ty) => Some(*ty),
            Load::Error(_) => None,
        }
    }

    /// Returns true for a blank (typed, valueless) load.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Load::Blank(_))
    }

    /// Converts this load into an owned [`Value`], deep-copying any bytes
    /// that alias the decoded buffer.
    pub fn to_owned_value(&self) -> Result<Value> {
        Ok(match self {
            Load::Int(v) => Value::Int(*v),
            Load::UInt(v) => Value::UInt(*v),
            Load::Float(v) => Value::Float(*v),
            Load::Double(v) => Value::Double(*v),
            Load::Real(v) => Value::Real(*v),
            Load::Date(v) => Value::Date(*v),
            Load::Time(v) => Value::Time(*v),
            Load::DateTime(v) => Value::DateTime(*v),
            Load::Enum(v) => Value::Enum(*v),
            Load::Ascii(s) => Value::Ascii(s.clone()),
            Load::Utf8(s) => Value::Utf8(s.clone()),
            Load::Rmtes(b) => Value::Rmtes(Bytes::copy_from_slice(b)),
            Load::Buffer(b) => Value::Buffer(Bytes::copy_from_slice(b)),
            Load::Qos(v) => Value::Qos(*v),
            Load::State(v) => Value::State(v.clone()),
            Load::Array(a) => Value::Array(a.to_owned_array()?),
            Load::Container(p) => Value::Container(p.to_owned_copy()),
            Load::NoData => Value::NoData,
            Load::Blank(ty) => Value::Blank(*ty),
            Load::Error(err) => return Err(err.clone()),
        })
    }
}

impl fmt::Display for Load {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Load::Int(v) => write!(f, "{v}"),
            Load::UInt(v) => write!(f, "{v}"),
            Load::Float(v) => write!(f, "{v}"),
            Load::Double(v) => write!(f, "{v}"),
            Load::Real(v) => write!(f, "{v}"),
            Load::Date(v) => write!(f, "{v}"),
            Load::Time(v) => write!(f, "{v}"),
            Load::DateTime(v) => write!(f, "{v}"),
            Load::Enum(v) => write!(f, "{v}"),
            Load::Ascii(s) | Load::Utf8(s) => write!(f, "{s}"),
            Load::Rmtes(b) | Load::Buffer(b) => {
                for byte in b.iter() {
                    write!(f, "{byte:02X}")?;
                }
                Ok(())
            }
            Load::Qos(v) => write!(f, "{v}"),
            Load::State(v) => write!(f, "{v}"),
            Load::Array(_) => write!(f, "<Array>"),
            Load::Container(p) => write!(f, "<{}>", p.container_type),
            Load::NoData => write!(f, "<NoData>"),
            Load::Blank(_) => write!(f, "(blank)"),
            Load::Error(err) => write!(f, "(error: {err})"),
        }
    }
}

fn is_stringish(ty: DataType) -> bool {
    matches!(
        ty,
        DataType::Ascii | DataType::Utf8 | DataType::Rmtes | DataType::Buffer
    )
}

fn try_decode(ty: DataType, raw: Bytes) -> Result<Load> {
    if ty == DataType::NoData {
        return Ok(Load::NoData);
    }
    if ty == DataType::Array {
        if raw.is_empty() {
            return Ok(Load::Blank(ty));
        }
        return Ok(Load::Array(ArrayView::decode(raw)?));
    }
    if ty.is_container() {
        return Ok(Load::Container(Payload::new(ty, raw)));
    }
    match ty {
        DataType::Ascii => {
            if !raw.is_ascii() {
                return Err(OmmError::InvalidData(
                    "ascii value contains non-ASCII bytes".into(),
                ));
            }
            // Safe: validated above.
            Ok(Load::Ascii(String::from_utf8_lossy(&raw).into_owned()))
        }
        DataType::Utf8 => {
            let s = String::from_utf8(raw.to_vec())
                .map_err(|_| OmmError::InvalidData("utf8 value is not valid UTF-8".into()))?;
            Ok(Load::Utf8(s))
        }
        DataType::Rmtes => Ok(Load::Rmtes(raw)),
        DataType::Buffer => Ok(Load::Buffer(raw)),
        _ => {
            let mut cur = WireCursor::new(raw);
            let load = match ty {
                DataType::Int => Load::Int(primitive::decode_int(&mut cur)?),
                DataType::UInt => Load::UInt(primitive::decode_uint(&mut cur)?),
                DataType::Float => Load::Float(primitive::decode_float(&mut cur)?),
                DataType::Double => Load::Double(primitive::decode_double(&mut cur)?),
                DataType::Real => Load::Real(primitive::decode_real(&mut cur)?),
                DataType::Date => Load::Date(primitive::decode_date(&mut cur)?),
                DataType::Time => Load::Time(primitive::decode_time(&mut cur)?),
                DataType::DateTime => Load::DateTime(primitive::decode_datetime(&mut cur)?),
                DataType::Enum => Load::Enum(primitive::decode_enum(&mut cur)?),
                DataType::Qos => Load::Qos(primitive::decode_qos(&mut cur)?),
                DataType::State => Load::State(primitive::decode_state(&mut cur)?),
                other => {
                    return Err(OmmError::InvalidData(format!(
                        "{other} cannot appear as an entry payload"
                    )))
                }
            };
            if !cur.is_empty() {
                return Err(OmmError::InvalidData(format!(
                    "{} trailing bytes after {ty} payload",
                    cur.remaining()
                )));
            }
            Ok(load)
        }
    }
}

/// Decodes one entry payload into a [`Load`].
///
/// Never fails: anything undecodable becomes [`Load::Blank`] so iteration
/// over the enclosing container continues past the bad entry.
#[must_use]
pub fn decode_load(ty: DataType, raw: Bytes) -> Load {
    match try_decode(ty, raw) {
        Ok(load) => load,
        Err(OmmError::BlankValue(_)) => Load::Blank(ty),
        Err(err) => {
            tracing::debug!(data_type = %ty, error = %err, "substituting blank for undecodable entry payload");
            Load::Blank(ty)
        }
    }
}

/// Whether a structurally-present entry carries a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCode {
    /// The entry carries data.
    NoCode,
    /// The entry is explicitly blank.
    Blank,
}

/// The undecoded data of one container entry: a declared type tag and the
/// raw payload slice.
///
/// Accessors decode on demand. Typed accessors fail with
/// [`OmmError::TypeMismatch`] when called against a differently-typed entry
/// and with [`OmmError::BlankValue`] when the entry is blank.
#[derive(Debug, Clone)]
pub struct EntryData {
    declared: u8,
    raw: Bytes,
}

impl EntryData {
    pub(crate) fn new(declared: u8, raw: Bytes) -> Self {
        Self { declared, raw }
    }

    /// The entry's declared wire type.
    pub fn data_type(&self) -> Result<DataType> {
        DataType::from_u8(self.declared)
    }

    /// Raw payload bytes, zero-copy.
    #[must_use]
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Whether this entry carries data or is explicitly blank.
    ///
    /// A zero-length payload is blank for every type except the string and
    /// buffer types, where it is a legal empty value.
    #[must_use]
    pub fn code(&self) -> DataCode {
        match self.data_type() {
            Ok(ty) if self.raw.is_empty() && !is_stringish(ty) && ty != DataType::NoData => {
                DataCode::Blank
            }
            _ => DataCode::NoCode,
        }
    }

    /// Decodes the payload into a [`Load`], substituting blank for anything
    /// undecodable.
    #[must_use]
    pub fn load(&self) -> Load {
        match self.data_type() {
            Ok(ty) => decode_load(ty, self.raw.clone()),
            Err(err) => Load::Error(err),
        }
    }

    fn check(&self, want: DataType) -> Result<()> {
        let actual = self.data_type()?;
        if actual != want {
            return Err(OmmError::TypeMismatch {
                expected: want,
                actual,
            });
        }
        Ok(())
    }

    fn cursor(&self, want: DataType) -> Result<WireCursor> {
        self.check(want)?;
        Ok(WireCursor::new(self.raw.clone()))
    }

    /// Decodes as a signed integer.
    pub fn int(&self) -> Result<i64> {
        primitive::decode_int(&mut self.cursor(DataType::Int)?)
    }

    /// Decodes as an unsigned integer.
    pub fn uint(&self) -> Result<u64> {
        primitive::decode_uint(&mut self.cursor(DataType::UInt)?)
    }

    /// Decodes as a single-precision float.
    pub fn float(&self) -> Result<f32> {
        primitive::decode_float(&mut self.cursor(DataType::Float)?)
    }

    /// Decodes as a double-precision float.
    pub fn double(&self) -> Result<f64> {
        primitive::decode_double(&mut self.cursor(DataType::Double)?)
    }

    /// Decodes as a real.
    pub fn real(&self) -> Result<Real> {
        primitive::decode_real(&mut self.cursor(DataType::Real)?)
    }

    /// Decodes as a date.
    pub fn date(&self) -> Result<Date> {
        primitive::decode_date(&mut self.cursor(DataType::Date)?)
    }

    /// Decodes as a time.
    pub fn time(&self) -> Result<Time> {
        primitive::decode_time(&mut self.cursor(DataType::Time)?)
    }

    /// Decodes as a datetime.
    pub fn datetime(&self) -> Result<DateTime> {
        primitive::decode_datetime(&mut self.cursor(DataType::DateTime)?)
    }

    /// Decodes as an enumerated value.
    pub fn enum_value(&self) -> Result<u16> {
        primitive::decode_enum(&mut self.cursor(DataType::Enum)?)
    }

    /// Decodes as a QoS descriptor.
    pub fn qos(&self) -> Result<Qos> {
        primitive::decode_qos(&mut self.cursor(DataType::Qos)?)
    }

    /// Decodes as a state descriptor.
    pub fn state(&self) -> Result<State> {
        primitive::decode_state(&mut self.cursor(DataType::State)?)
    }

    /// Decodes as an ASCII string. A zero-length payload is the empty
    /// string, not blank.
    pub fn ascii(&self) -> Result<String> {
        self.check(DataType::Ascii)?;
        if !self.raw.is_ascii() {
            return Err(OmmError::InvalidData(
                "ascii value contains non-ASCII bytes".into(),
            ));
        }
        Ok(String::from_utf8_lossy(&self.raw).into_owned())
    }

    /// Decodes as a UTF-8 string.
    pub fn utf8(&self) -> Result<String> {
        self.check(DataType::Utf8)?;
        String::from_utf8(self.raw.to_vec())
            .map_err(|_| OmmError::InvalidData("utf8 value is not valid UTF-8".into()))
    }

    /// Raw RMTES bytes, untranscoded.
    pub fn rmtes(&self) -> Result<Bytes> {
        self.check(DataType::Rmtes)?;
        Ok(self.raw.clone())
    }

    /// Expands RMTES bytes to a Unicode string.
    pub fn rmtes_as_string(&self) -> Result<String> {
        self.check(DataType::Rmtes)?;
        primitive::rmtes_to_string(&self.raw)
    }

    /// Raw opaque buffer bytes.
    pub fn buffer(&self) -> Result<Bytes> {
        self.check(DataType::Buffer)?;
        Ok(self.raw.clone())
    }

    /// Decodes as a primitive array.
    pub fn array(&self) -> Result<ArrayView> {
        self.check(DataType::Array)?;
        ArrayView::decode(self.raw.clone())
    }

    /// Decodes as a field list.
    pub fn field_list(&self) -> Result<FieldListView> {
        self.check(DataType::FieldList)?;
        FieldListView::decode(self.raw.clone())
    }

    /// Decodes as an element list.
    pub fn element_list(&self) -> Result<ElementListView> {
        self.check(DataType::ElementList)?;
        ElementListView::decode(self.raw.clone())
    }

    /// Decodes as a map.
    pub fn map(&self) -> Result<MapView> {
        self.check(DataType::Map)?;
        MapView::decode(self.raw.clone())
    }

    /// Decodes as a vector.
    pub fn vector(&self) -> Result<VectorView> {
        self.check(DataType::Vector)?;
        VectorView::decode(self.raw.clone())
    }

    /// Decodes as a series.
    pub fn series(&self) -> Result<SeriesView> {
        self.check(DataType::Series)?;
        SeriesView::decode(self.raw.clone())
    }

    /// Decodes as a filter list.
    pub fn filter_list(&self) -> Result<FilterListView> {
        self.check(DataType::FilterList)?;
        FilterListView::decode(self.raw.clone())
    }

    /// Wraps any container payload without decoding it.
    pub fn payload(&self) -> Result<Payload> {
        let ty = self.data_type()?;
        if !ty.is_container() && ty != DataType::Array {
            return Err(OmmError::NotAContainer(ty));
        }
        Ok(Payload::new(ty, self.raw.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ommwire_core::RealHint;

    fn entry(ty: DataType, raw: &'static [u8]) -> EntryData {
        EntryData::new(ty.as_u8(), Bytes::from_static(raw))
    }

    #[test]
    fn container_accessor_rejects_primitive_entries() {
        let e = entry(DataType::UInt, &[0x40]);
        let err = e.payload().unwrap_err();
        assert_eq!(err, OmmError::NotAContainer(DataType::UInt));
        assert!(err.to_string().contains("expected a container type"));
    }

    #[test]
    fn uint_entry_decodes_and_checks_type() {
        let e = entry(DataType::UInt, &[0x01, 0x00]);
        assert_eq!(e.uint().unwrap(), 256);
        assert_eq!(e.code(), DataCode::NoCode);
        let err = e.int().unwrap_err();
        assert_eq!(
            err,
            OmmError::TypeMismatch {
                expected: DataType::Int,
                actual: DataType::UInt
            }
        );
    }

    #[test]
    fn empty_payload_is_blank_for_numerics() {
        let e = entry(DataType::Real, &[]);
        assert_eq!(e.code(), DataCode::Blank);
        assert!(e.load().is_blank());
        assert_eq!(e.real().unwrap_err(), OmmError::BlankValue("real"));
    }

    #[test]
    fn empty_payload_is_legal_for_strings() {
        let e = entry(DataType::Ascii, &[]);
        assert_eq!(e.code(), DataCode::NoCode);
        assert_eq!(e.ascii().unwrap(), "");
        assert!(matches!(e.load(), Load::Ascii(s) if s.is_empty()));
    }

    #[test]
    fn undecodable_payload_substitutes_blank() {
        // Hint 31 is a reserved Real hint and must be rejected.
        let load = decode_load(DataType::Real, Bytes::from_static(&[31, 0x05]));
        assert!(load.is_blank());
        // Trailing bytes after a complete date are also undecodable.
        let load = decode_load(
            DataType::Date,
            Bytes::from_static(&[7, 11, 0x07, 0xCF, 0xFF]),
        );
        assert!(load.is_blank());
    }

    #[test]
    fn unknown_type_tag_is_an_error_load() {
        let e = EntryData::new(99, Bytes::new());
        assert!(matches!(e.load(), Load::Error(OmmError::UnknownType(99))));
    }

    #[test]
    fn container_payload_passes_through_undecoded() {
        let body = Bytes::from_static(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let load = decode_load(DataType::FieldList, body.clone());
        match load {
            Load::Container(p) => {
                assert_eq!(p.container_type, DataType::FieldList);
                assert_eq!(p.data, body);
            }
            other => panic!("expected container, got {other:?}"),
        }
    }

    #[test]
    fn value_round_trips_through_payload_bytes() {
        let v = Value::Real(Real::new(2995, RealHint::ExponentNeg2));
        let raw = v.encode_payload().unwrap();
        let load = decode_load(DataType::Real, raw);
        match load {
            Load::Real(r) => assert_eq!(r.mantissa, 2995),
            other => panic!("expected real, got {other:?}"),
        }
    }

    #[test]
    fn load_to_owned_value_detaches_bytes() {
        let parent = Bytes::from_static(b"opaque-bytes");
        let load = decode_load(DataType::Buffer, parent.slice(..));
        let value = load.to_owned_value().unwrap();
        match value {
            Value::Buffer(b) => assert_eq!(&b[..], b"opaque-bytes"),
            other => panic!("expected buffer, got {other:?}"),
        }
    }
}
