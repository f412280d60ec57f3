//! Primitive arrays: a homogeneous list of primitive values.
//!
//! Wire layout: item type tag, item length byte (0 selects variable-width
//! items, each carried behind a u16ob length prefix), a u16 item count, then
//! the items back to back.

use bytes::Bytes;

use ommwire_core::primitive;
use ommwire_core::{DataType, OmmError, Result, WireCursor, WireWriter};

use crate::payload::{decode_load, Load, Value};

/// Encode-side primitive array builder.
#[derive(Debug, Clone)]
pub struct OmmArray {
    item_type: DataType,
    item_length: u8,
    items: Vec<Value>,
}

impl OmmArray {
    /// Creates a variable-width array of `item_type` values.
    pub fn new(item_type: DataType) -> Result<Self> {
        if !item_type.is_primitive() || item_type == DataType::Array {
            return Err(OmmError::InvalidData(format!(
                "array items must be primitive, got {item_type}"
            )));
        }
        Ok(Self {
            item_type,
            item_length: 0,
            items: Vec::new(),
        })
    }

    /// Creates an array whose items all occupy exactly `width` bytes.
    ///
    /// Fixed-width arrays cannot hold blank items; integers are padded to
    /// the width, every other type must encode to it naturally.
    pub fn fixed_width(item_type: DataType, width: u8) -> Result<Self> {
        let mut array = Self::new(item_type)?;
        if width == 0 {
            return Err(OmmError::InvalidData("fixed item width must be nonzero".into()));
        }
        array.item_length = width;
        Ok(array)
    }

    /// Item type of this array.
    #[must_use]
    pub fn item_type(&self) -> DataType {
        self.item_type
    }

    /// Number of items added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when no items have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends an item. Its type must match the array's item type; a
    /// [`Value::Blank`] of the item type is allowed in variable-width
    /// arrays only.
    pub fn push(&mut self, value: Value) -> Result<&mut Self> {
        if value.data_type() != self.item_type {
            return Err(OmmError::TypeMismatch {
                expected: self.item_type,
                actual: value.data_type(),
            });
        }
        if self.item_length != 0 && matches!(value, Value::Blank(_)) {
            return Err(OmmError::InvalidData(
                "fixed-width arrays cannot hold blank items".into(),
            ));
        }
        self.items.push(value);
        Ok(self)
    }

    /// Writes the complete array (header and items).
    pub fn encode_into(&self, w: &mut WireWriter) -> Result<()> {
        if self.items.len() > u16::MAX as usize {
            return Err(OmmError::InvalidData(format!(
                "array of {} items exceeds u16 count",
                self.items.len()
            )));
        }
        w.put_u8(self.item_type.as_u8())?;
        w.put_u8(self.item_length)?;
        w.put_u16(self.items.len() as u16)?;
        for item in &self.items {
            if self.item_length == 0 {
                let payload = item.encode_payload()?;
                w.put_buf16ob(&payload)?;
            } else {
                self.encode_fixed_item(w, item)?;
            }
        }
        Ok(())
    }

    fn encode_fixed_item(&self, w: &mut WireWriter, item: &Value) -> Result<()> {
        let width = self.item_length as usize;
        match item {
            // Integers pad to the declared width.
            Value::Int(v) => primitive::encode_int_fixed(w, *v, width),
            Value::UInt(v) => primitive::encode_uint_fixed(w, *v, width),
            Value::Enum(v) => primitive::encode_uint_fixed(w, u64::from(*v), width),
            other => {
                let payload = other.encode_payload()?;
                if payload.len() != width {
                    return Err(OmmError::InvalidData(format!(
                        "{} item encodes to {} bytes, declared width is {width}",
                        other.data_type(),
                        payload.len()
                    )));
                }
                w.put_bytes(&payload)
            }
        }
    }
}

/// Decoded array header over an undecoded item region.
#[derive(Debug, Clone)]
pub struct ArrayView {
    item_type: DataType,
    item_length: u8,
    count: u16,
    body: Bytes,
}

impl ArrayView {
    /// Parses the array header; items stay encoded until iterated.
    pub fn decode(raw: Bytes) -> Result<Self> {
        let mut cur = WireCursor::new(raw);
        let item_type = DataType::from_u8(cur.u8()?)?;
        let item_length = cur.u8()?;
        let count = cur.u16()?;
        Ok(Self {
            item_type,
            item_length,
            count,
            body: cur.take_rest(),
        })
    }

    /// Item type of the array.
    #[must_use]
    pub fn item_type(&self) -> DataType {
        self.item_type
    }

    /// Declared item count.
    #[must_use]
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Fixed item width, or `None` for variable-width items.
    #[must_use]
    pub fn fixed_width(&self) -> Option<u8> {
        (self.item_length != 0).then_some(self.item_length)
    }

    /// Iterates the items. The iterator decodes from the start every time
    /// it is created, so iteration is restartable.
    #[must_use]
    pub fn iter(&self) -> ArrayIter {
        ArrayIter {
            item_type: self.item_type,
            item_length: self.item_length,
            remaining: self.count,
            cursor: WireCursor::new(self.body.clone()),
            failed: false,
        }
    }

    /// Materializes an owned builder holding copies of every item.
    pub fn to_owned_array(&self) -> Result<OmmArray> {
        let mut array = if self.item_length == 0 {
            OmmArray::new(self.item_type)?
        } else {
            OmmArray::fixed_width(self.item_type, self.item_length)?
        };
        for item in self.iter() {
            array.push(item?.to_owned_value()?)?;
        }
        Ok(array)
    }
}

/// Iterator over array items.
///
/// Yields `Err` once and then stops if the item region is truncated.
#[derive(Debug)]
pub struct ArrayIter {
    item_type: DataType,
    item_length: u8,
    remaining: u16,
    cursor: WireCursor,
    failed: bool,
}

impl Iterator for ArrayIter {
    type Item = Result<Load>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 {
            return None;
        }
        let raw = if self.item_length == 0 {
            self.cursor.buf16ob()
        } else {
            self.cursor.take(self.item_length as usize)
        };
        match raw {
            Ok(raw) => {
                self.remaining -= 1;
                Some(Ok(decode_load(self.item_type, raw)))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ommwire_core::encode_with_growth;

    fn encode(array: &OmmArray) -> Bytes {
        encode_with_growth(64, |w| array.encode_into(w)).unwrap()
    }

    #[test]
    fn variable_width_ascii_round_trip() {
        let mut array = OmmArray::new(DataType::Ascii).unwrap();
        array
            .push(Value::Ascii("TRI.N".into()))
            .unwrap()
            .push(Value::Ascii("".into()))
            .unwrap()
            .push(Value::Ascii("IBM.N".into()))
            .unwrap();

        let view = ArrayView::decode(encode(&array)).unwrap();
        assert_eq!(view.item_type(), DataType::Ascii);
        assert_eq!(view.count(), 3);
        assert_eq!(view.fixed_width(), None);

        let items: Vec<_> = view.iter().map(|i| i.unwrap()).collect();
        assert!(matches!(&items[0], Load::Ascii(s) if s == "TRI.N"));
        assert!(matches!(&items[1], Load::Ascii(s) if s.is_empty()));
        assert!(matches!(&items[2], Load::Ascii(s) if s == "IBM.N"));
    }

    #[test]
    fn fixed_width_uints_pad_to_declared_width() {
        let mut array = OmmArray::fixed_width(DataType::UInt, 4).unwrap();
        array
            .push(Value::UInt(5))
            .unwrap()
            .push(Value::UInt(0xAABBCCDD))
            .unwrap();

        let raw = encode(&array);
        // Header (4 bytes) plus two 4-byte items.
        assert_eq!(raw.len(), 12);

        let view = ArrayView::decode(raw).unwrap();
        let items: Vec<_> = view.iter().map(|i| i.unwrap()).collect();
        assert!(matches!(items[0], Load::UInt(5)));
        assert!(matches!(items[1], Load::UInt(0xAABBCCDD)));
    }

    #[test]
    fn blank_items_only_in_variable_width() {
        let mut array = OmmArray::new(DataType::Real).unwrap();
        array.push(Value::Blank(DataType::Real)).unwrap();
        let view = ArrayView::decode(encode(&array)).unwrap();
        let items: Vec<_> = view.iter().map(|i| i.unwrap()).collect();
        assert!(items[0].is_blank());

        let mut fixed = OmmArray::fixed_width(DataType::Real, 4).unwrap();
        assert!(fixed.push(Value::Blank(DataType::Real)).is_err());
    }

    #[test]
    fn mismatched_item_type_rejected() {
        let mut array = OmmArray::new(DataType::UInt).unwrap();
        let err = array.push(Value::Int(-1)).unwrap_err();
        assert_eq!(
            err,
            OmmError::TypeMismatch {
                expected: DataType::UInt,
                actual: DataType::Int
            }
        );
    }

    #[test]
    fn truncated_body_yields_error_then_stops() {
        let mut array = OmmArray::fixed_width(DataType::UInt, 4).unwrap();
        array.push(Value::UInt(1)).unwrap().push(Value::UInt(2)).unwrap();
        let raw = encode(&array);
        let truncated = raw.slice(..raw.len() - 2);

        let view = ArrayView::decode(truncated).unwrap();
        let mut iter = view.iter();
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }

    #[test]
    fn owned_copy_re_encodes_identically() {
        let mut array = OmmArray::new(DataType::UInt).unwrap();
        array.push(Value::UInt(7)).unwrap().push(Value::UInt(300)).unwrap();
        let raw = encode(&array);
        let copy = ArrayView::decode(raw.clone()).unwrap().to_owned_array().unwrap();
        assert_eq!(encode(&copy), raw);
    }
}
