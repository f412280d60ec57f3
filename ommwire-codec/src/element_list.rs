//! Element lists: entries keyed by name instead of field id.
//!
//! Same shape as a field list, with a u15-framed name where the field id
//! would be.

use bytes::Bytes;

use ommwire_core::{encode_with_growth, OmmError, Result, WireCursor, WireWriter};

use crate::payload::{DataCode, EntryData, Load, Value};

const HAS_INFO: u8 = 0x01;

/// Encode-side element list builder.
#[derive(Debug, Clone, Default)]
pub struct ElementList {
    list_num: Option<u16>,
    entries: Vec<(String, Value)>,
}

impl ElementList {
    /// Creates an empty element list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the pre-agreed element-list template number.
    #[must_use]
    pub fn with_info(mut self, list_num: u16) -> Self {
        self.list_num = Some(list_num);
        self
    }

    /// Appends a named entry. Entry order is preserved on the wire.
    pub fn add(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.entries.push((name.into(), value));
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

    /// Writes the complete element list.
    pub fn encode_into(&self, w: &mut WireWriter) -> Result<()> {
        if self.entries.len() > u16::MAX as usize {
            return Err(OmmError::InvalidData(format!(
                "element list of {} entries exceeds u16 count",
                self.entries.len()
            )));
        }
        let flags = if self.list_num.is_some() { HAS_INFO } else { 0 };
        w.put_u8(flags)?;
        if let Some(num) = self.list_num {
            w.put_u16(num)?;
        }
        w.put_u16(self.entries.len() as u16)?;
        for (name, value) in &self.entries {
            w.put_buf15(name.as_bytes())?;
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

/// Decoded element list header over an undecoded entry region.
#[derive(Debug, Clone)]
pub struct ElementListView {
    list_num: Option<u16>,
    count: u16,
    body: Bytes,
}

impl ElementListView {
    /// Parses the header; entries stay encoded until iterated.
    pub fn decode(raw: Bytes) -> Result<Self> {
        let mut cur = WireCursor::new(raw);
        let flags = cur.u8()?;
        let list_num = if flags & HAS_INFO != 0 {
            Some(cur.u16()?)
        } else {
            None
        };
        let count = cur.u16()?;
        Ok(Self {
            list_num,
            count,
            body: cur.take_rest(),
        })
    }

    /// The template number, when present.
    #[must_use]
    pub fn list_num(&self) -> Option<u16> {
        self.list_num
    }

    /// Declared entry count.
    #[must_use]
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Iterates the entries from the start; restartable.
    #[must_use]
    pub fn iter(&self) -> ElementListIter {
        ElementListIter {
            remaining: self.count,
            cursor: WireCursor::new(self.body.clone()),
            failed: false,
        }
    }

    /// Looks up the first entry with the given name.
    pub fn find(&self, name: &str) -> Result<Option<ElementEntry>> {
        for entry in self.iter() {
            let entry = entry?;
            if entry.name() == name {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// Materializes an owned builder with deep copies of every entry.
    pub fn to_owned_list(&self) -> Result<ElementList> {
        let mut list = ElementList::new();
        if let Some(num) = self.list_num {
            list = list.with_info(num);
        }
        for entry in self.iter() {
            let entry = entry?;
            list.add(entry.name(), entry.data().load().to_owned_value()?);
        }
        Ok(list)
    }
}

/// One decoded element list entry.
#[derive(Debug, Clone)]
pub struct ElementEntry {
    name: Bytes,
    data: EntryData,
}

impl ElementEntry {
    /// The entry's name. Names are ASCII in practice; non-UTF-8 bytes are
    /// replaced rather than failing the whole entry.
    #[must_use]
    pub fn name(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// Raw name bytes.
    #[must_use]
    pub fn name_raw(&self) -> &Bytes {
        &self.name
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

/// Iterator over element list entries.
#[derive(Debug)]
pub struct ElementListIter {
    remaining: u16,
    cursor: WireCursor,
    failed: bool,
}

impl ElementListIter {
    fn read_entry(&mut self) -> Result<ElementEntry> {
        let name = self.cursor.buf15()?;
        let declared = self.cursor.u8()?;
        let raw = self.cursor.buf16ob()?;
        Ok(ElementEntry {
            name,
            data: EntryData::new(declared, raw),
        })
    }
}

impl Iterator for ElementListIter {
    type Item = Result<ElementEntry>;

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
