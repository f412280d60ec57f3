//! Field lists: entries keyed by a dictionary field id.
//!
//! Wire layout: a flags byte (bit 0 marks the optional info block of
//! dictionary id and field-list number), a u16 entry count, then entries of
//! field id (i16), type tag, and a u16ob-framed payload. Entries are
//! self-describing; a dictionary is only consulted for rendering.

use bytes::Bytes;

use ommwire_core::{encode_with_growth, OmmError, Result, WireCursor, WireWriter};

use crate::payload::{DataCode, EntryData, Load, Value};

const HAS_INFO: u8 = 0x01;

/// Encode-side field list builder.
#[derive(Debug, Clone, Default)]
pub struct FieldList {
    info: Option<FieldListInfo>,
    entries: Vec<(i16, Value)>,
}

/// Optional dictionary binding carried in the field list header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldListInfo {
    /// Dictionary the field ids resolve against.
    pub dictionary_id: u8,
    /// Pre-agreed field-list template number.
    pub field_list_num: u16,
}

impl FieldList {
    /// Creates an empty field list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the dictionary id / field-list number info block.
    #[must_use]
    pub fn with_info(mut self, dictionary_id: u8, field_list_num: u16) -> Self {
        self.info = Some(FieldListInfo {
            dictionary_id,
            field_list_num,
        });
        self
    }

    /// Appends an entry. Entry order is preserved on the wire.
    pub fn add(&mut self, field_id: i16, value: Value) -> &mut Self {
        self.entries.push((field_id, value));
        self
    }

    /// Number of entries added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no entries have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the complete field list.
    pub fn encode_into(&self, w: &mut WireWriter) -> Result<()> {
        if self.entries.len() > u16::MAX as usize {
            return Err(OmmError::InvalidData(format!(
                "field list of {} entries exceeds u16 count",
                self.entries.len()
            )));
        }
        let flags = if self.info.is_some() { HAS_INFO } else { 0 };
        w.put_u8(flags)?;
        if let Some(info) = self.info {
            w.put_u8(info.dictionary_id)?;
            w.put_u16(info.field_list_num)?;
        }
        w.put_u16(self.entries.len() as u16)?;
        for (field_id, value) in &self.entries {
            w.put_i16(*field_id)?;
            w.put_u8(value.data_type().as_u8())?;
            let payload = value.encode_payload()?;
            w.put_buf16ob(&payload)?;
        }
        Ok(())
    }

    /// Encodes into an owned buffer, growing as needed.
    pub fn encode(&self) -> Result<Bytes> {
        encode_with_growth(128, |w| self.encode_into(w))
    }
}

/// Decoded field list header over an undecoded entry region.
#[derive(Debug, Clone)]
pub struct FieldListView {
    info: Option<FieldListInfo>,
    count: u16,
    body: Bytes,
}

impl FieldListView {
    /// Parses the header; entries stay encoded until iterated.
    pub fn decode(raw: Bytes) -> Result<Self> {
        let mut cur = WireCursor::new(raw);
        let flags = cur.u8()?;
        let info = if flags & HAS_INFO != 0 {
            Some(FieldListInfo {
                dictionary_id: cur.u8()?,
                field_list_num: cur.u16()?,
            })
        } else {
            None
        };
        let count = cur.u16()?;
        Ok(Self {
            info,
            count,
            body: cur.take_rest(),
        })
    }

    /// The info block, when present.
    #[must_use]
    pub fn info(&self) -> Option<FieldListInfo> {
        self.info
    }

    /// Declared entry count.
    #[must_use]
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Iterates the entries from the start; restartable.
    #[must_use]
    pub fn iter(&self) -> FieldListIter {
        FieldListIter {
            remaining: self.count,
            cursor: WireCursor::new(self.body.clone()),
            failed: false,
        }
    }

    /// Materializes an owned builder with deep copies of every entry.
    pub fn to_owned_list(&self) -> Result<FieldList> {
        let mut list = FieldList::new();
        if let Some(info) = self.info {
            list = list.with_info(info.dictionary_id, info.field_list_num);
        }
        for entry in self.iter() {
            let entry = entry?;
            list.add(entry.field_id(), entry.data().load().to_owned_value()?);
        }
        Ok(list)
    }
}

/// One decoded field list entry.
#[derive(Debug, Clone)]
pub struct FieldEntry {
    field_id: i16,
    data: EntryData,
}

impl FieldEntry {
    /// The entry's field id.
    #[must_use]
    pub fn field_id(&self) -> i16 {
        self.field_id
    }

    /// The entry's undecoded data.
    #[must_use]
    pub fn data(&self) -> &EntryData {
        &self.data
    }

    /// Decodes the entry payload.
    #[must_use]
    pub fn load(&self) -> Load {
        self.data.load()
    }

    /// Whether the entry is blank.
    #[must_use]
    pub fn code(&self) -> DataCode {
        self.data.code()
    }
}

/// Iterator over field list entries.
///
/// A malformed entry *payload* decodes as blank and iteration continues;
/// truncation of the entry framing itself yields one `Err` and stops.
#[derive(Debug)]
pub struct FieldListIter {
    remaining: u16,
    cursor: WireCursor,
    failed: bool,
}

impl FieldListIter {
    fn read_entry(&mut self) -> Result<FieldEntry> {
        let field_id = self.cursor.i16()?;
        let declared = self.cursor.u8()?;
        let raw = self.cursor.buf16ob()?;
        Ok(FieldEntry {
            field_id,
            data: EntryData::new(declared, raw),
        })
    }
}

impl Iterator for FieldListIter {
    type Item = Result<FieldEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 {
            return None;
        }
        match self.read_entry() {
            Ok(entry) => {
                self.remaining -= 1;
                Some(Ok(entry))
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
    use ommwire_core::{DataType, Real, RealHint};

    fn sample() -> FieldList {
        let mut list = FieldList::new().with_info(1, 99);
        list.add(22, Value::Real(Real::new(2995, RealHint::ExponentNeg2)))
            .add(25, Value::Blank(DataType::Real))
            .add(3, Value::Ascii("TRI.N".into()))
            .add(1025, Value::UInt(3));
        list
    }

    #[test]
    fn round_trip_preserves_order_and_blanks() {
        let view = FieldListView::decode(sample().encode().unwrap()).unwrap();
        assert_eq!(view.count(), 4);
        assert_eq!(
            view.info(),
            Some(FieldListInfo {
                dictionary_id: 1,
                field_list_num: 99
            })
        );

        let entries: Vec<_> = view.iter().map(|e| e.unwrap()).collect();
        assert_eq!(
            entries.iter().map(FieldEntry::field_id).collect::<Vec<_>>(),
            vec![22, 25, 3, 1025]
        );
        assert!(matches!(entries[0].load(), Load::Real(r) if r.mantissa == 2995));
        assert_eq!(entries[1].code(), DataCode::Blank);
        assert!(entries[1].load().is_blank());
        assert_eq!(entries[2].data().ascii().unwrap(), "TRI.N");
        assert_eq!(entries[3].data().uint().unwrap(), 3);
    }

    #[test]
    fn iteration_is_restartable() {
        let view = FieldListView::decode(sample().encode().unwrap()).unwrap();
        assert_eq!(view.iter().count(), 4);
        assert_eq!(view.iter().count(), 4);
    }

    #[test]
    fn malformed_payload_does_not_abort_iteration() {
        // Entry 2 of 3 declares Date but carries 2 bytes.
        let mut raw = Vec::new();
        raw.push(0u8);
        raw.extend_from_slice(&3u16.to_be_bytes());
        raw.extend_from_slice(&6i16.to_be_bytes());
        raw.push(DataType::UInt.as_u8());
        raw.extend_from_slice(&[1, 0x2A]);
        raw.extend_from_slice(&7i16.to_be_bytes());
        raw.push(DataType::Date.as_u8());
        raw.extend_from_slice(&[2, 0x01, 0x02]);
        raw.extend_from_slice(&8i16.to_be_bytes());
        raw.push(DataType::UInt.as_u8());
        raw.extend_from_slice(&[1, 0x2B]);

        let view = FieldListView::decode(Bytes::from(raw)).unwrap();
        let entries: Vec<_> = view.iter().map(|e| e.unwrap()).collect();
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[0].load(), Load::UInt(0x2A)));
        assert!(entries[1].load().is_blank());
        assert!(matches!(entries[2].load(), Load::UInt(0x2B)));
    }

    #[test]
    fn truncated_entry_framing_stops_iteration() {
        let raw = sample().encode().unwrap();
        let view = FieldListView::decode(raw.slice(..raw.len() - 3)).unwrap();
        let results: Vec<_> = view.iter().collect();
        // Three good entries, one framing error, then nothing.
        assert_eq!(results.len(), 4);
        assert!(results[..3].iter().all(Result::is_ok));
        assert!(results[3].is_err());
    }

    #[test]
    fn owned_copy_re_encodes_identically() {
        let raw = sample().encode().unwrap();
        let copy = FieldListView::decode(raw.clone())
            .unwrap()
            .to_owned_list()
            .unwrap();
        assert_eq!(copy.encode().unwrap(), raw);
    }
}
