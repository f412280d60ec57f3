//! Vectors: index-addressed container entries.
//!
//! Wire layout: flags byte (bit 0 summary), container type tag, the
//! optional u16ob-framed summary, a u16 entry count, then entries of action
//! byte, u32 index and u16ob-framed payload. Clear and delete entries carry
//! an empty payload region.

use bytes::Bytes;

use ommwire_core::{encode_with_growth, DataType, OmmError, Result, WireCursor, WireWriter};

use crate::payload::{EntryData, Payload};

const HAS_SUMMARY: u8 = 0x01;

/// What a vector entry does to the indexed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VectorAction {
    /// Place the payload at the index.
    Set = 1,
    /// Apply the payload as a partial update at the index.
    Update = 2,
    /// Empty the position but keep it; no payload.
    Clear = 3,
    /// Insert at the index, shifting later positions up.
    Insert = 4,
    /// Remove the position, shifting later positions down; no payload.
    Delete = 5,
}

impl VectorAction {
    fn from_u8(v: u8) -> Result<Self> {
        match v {
            1 => Ok(Self::Set),
            2 => Ok(Self::Update),
            3 => Ok(Self::Clear),
            4 => Ok(Self::Insert),
            5 => Ok(Self::Delete),
            other => Err(OmmError::InvalidData(format!(
                "invalid vector action {other}"
            ))),
        }
    }

    /// Whether entries with this action carry a payload.
    #[must_use]
    pub fn carries_payload(self) -> bool {
        !matches!(self, Self::Clear | Self::Delete)
    }
}

/// Encode-side vector builder.
#[derive(Debug, Clone)]
pub struct Vector {
    container_type: DataType,
    summary: Option<Payload>,
    entries: Vec<(VectorAction, u32, Option<Payload>)>,
}

impl Vector {
    /// Creates a vector of `container_type` payloads.
    #[must_use]
    pub fn new(container_type: DataType) -> Self {
        Self {
            container_type,
            summary: None,
            entries: Vec::new(),
        }
    }

    /// Attaches summary data. Its container type must match the entry
    /// container type.
    pub fn with_summary(mut self, summary: Payload) -> Result<Self> {
        if summary.container_type != self.container_type {
            return Err(OmmError::TypeMismatch {
                expected: self.container_type,
                actual: summary.container_type,
            });
        }
        self.summary = Some(summary);
        Ok(self)
    }

    /// Appends an entry. Clear and delete take no payload; every other
    /// action requires one of the vector's container type.
    pub fn push(
        &mut self,
        action: VectorAction,
        index: u32,
        payload: Option<Payload>,
    ) -> Result<&mut Self> {
        match (&payload, action.carries_payload()) {
            (Some(p), true) => {
                if p.container_type != self.container_type {
                    return Err(OmmError::TypeMismatch {
                        expected: self.container_type,
                        actual: p.container_type,
                    });
                }
            }
            (None, false) => {}
            (Some(_), false) => {
                return Err(OmmError::InvalidData(format!(
                    "{action:?} entries carry no payload"
                )))
            }
            (None, true) => {
                return Err(OmmError::InvalidData(format!(
                    "{action:?} entries require a payload"
                )))
            }
        }
        self.entries.push((action, index, payload));
        Ok(self)
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

    /// Writes the complete vector.
    pub fn encode_into(&self, w: &mut WireWriter) -> Result<()> {
        if self.entries.len() > u16::MAX as usize {
            return Err(OmmError::InvalidData(format!(
                "vector of {} entries exceeds u16 count",
                self.entries.len()
            )));
        }
        let flags = if self.summary.is_some() { HAS_SUMMARY } else { 0 };
        w.put_u8(flags)?;
        w.put_u8(self.container_type.as_u8())?;
        if let Some(summary) = &self.summary {
            w.put_buf16ob(&summary.data)?;
        }
        w.put_u16(self.entries.len() as u16)?;
        for (action, index, payload) in &self.entries {
            w.put_u8(*action as u8)?;
            w.put_u32(*index)?;
            match payload {
                Some(p) => w.put_buf16ob(&p.data)?,
                None => w.put_u16ob(0)?,
            }
        }
        Ok(())
    }

    /// Encodes into an owned buffer, growing as needed.
    pub fn encode(&self) -> Result<Bytes> {
        encode_with_growth(256, |w| self.encode_into(w))
    }
}

/// Decoded vector header over an undecoded entry region.
#[derive(Debug, Clone)]
pub struct VectorView {
    container_type: DataType,
    summary: Option<Bytes>,
    count: u16,
    body: Bytes,
}

impl VectorView {
    /// Parses the header; entries stay encoded until iterated.
    pub fn decode(raw: Bytes) -> Result<Self> {
        let mut cur = WireCursor::new(raw);
        let flags = cur.u8()?;
        let container_type = DataType::from_u8(cur.u8()?)?;
        let summary = if flags & HAS_SUMMARY != 0 {
            Some(cur.buf16ob()?)
        } else {
            None
        };
        let count = cur.u16()?;
        Ok(Self {
            container_type,
            summary,
            count,
            body: cur.take_rest(),
        })
    }

    /// Container type of the entry payloads.
    #[must_use]
    pub fn container_type(&self) -> DataType {
        self.container_type
    }

    /// Summary data, when present.
    #[must_use]
    pub fn summary(&self) -> Option<Payload> {
        self.summary
            .as_ref()
            .map(|data| Payload::new(self.container_type, data.clone()))
    }

    /// Declared entry count.
    #[must_use]
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Iterates the entries from the start; restartable.
    #[must_use]
    pub fn iter(&self) -> VectorIter {
        VectorIter {
            container_type: self.container_type,
            remaining: self.count,
            cursor: WireCursor::new(self.body.clone()),
            failed: false,
        }
    }

    /// Materializes an owned builder with deep copies of every entry.
    pub fn to_owned_vector(&self) -> Result<Vector> {
        let mut vector = Vector::new(self.container_type);
        if let Some(summary) = self.summary() {
            vector = vector.with_summary(summary.to_owned_copy())?;
        }
        for entry in self.iter() {
            let entry = entry?;
            let payload = if entry.action().carries_payload() {
                Some(entry.payload()?.to_owned_copy())
            } else {
                None
            };
            vector.push(entry.action(), entry.index(), payload)?;
        }
        Ok(vector)
    }
}

/// One decoded vector entry.
#[derive(Debug, Clone)]
pub struct VectorEntry {
    action: VectorAction,
    index: u32,
    container_type: DataType,
    data: EntryData,
}

impl VectorEntry {
    /// The entry's action.
    #[must_use]
    pub fn action(&self) -> VectorAction {
        self.action
    }

    /// The entry's position index.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The entry's undecoded data. Clear and delete entries present as
    /// no-data.
    #[must_use]
    pub fn data(&self) -> &EntryData {
        &self.data
    }

    /// The entry payload wrapped with the vector's container type.
    pub fn payload(&self) -> Result<Payload> {
        if !self.action.carries_payload() {
            return Err(OmmError::BlankValue("vector entry without payload"));
        }
        Ok(Payload::new(self.container_type, self.data.raw().clone()))
    }
}

/// Iterator over vector entries.
#[derive(Debug)]
pub struct VectorIter {
    container_type: DataType,
    remaining: u16,
    cursor: WireCursor,
    failed: bool,
}

impl VectorIter {
    fn read_entry(&mut self) -> Result<VectorEntry> {
        let action = VectorAction::from_u8(self.cursor.u8()?)?;
        let index = self.cursor.u32()?;
        let raw = self.cursor.buf16ob()?;
        let data = if action.carries_payload() {
            EntryData::new(self.container_type.as_u8(), raw)
        } else {
            EntryData::new(DataType::NoData.as_u8(), Bytes::new())
        };
        Ok(VectorEntry {
            action,
            index,
            container_type: self.container_type,
            data,
        })
    }
}

impl Iterator for VectorIter {
    type Item = Result<VectorEntry>;

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
    use crate::element_list::ElementList;
    use crate::payload::Value;

    fn row(label: &str) -> Payload {
        let mut el = ElementList::new();
        el.add("Label", Value::Ascii(label.into()));
        Payload::new(DataType::ElementList, el.encode().unwrap())
    }

    fn sample() -> Vector {
        let mut vector = Vector::new(DataType::ElementList)
            .with_summary(row("summary"))
            .unwrap();
        vector
            .push(VectorAction::Set, 0, Some(row("zero")))
            .unwrap()
            .push(VectorAction::Insert, 1, Some(row("one")))
            .unwrap()
            .push(VectorAction::Clear, 0, None)
            .unwrap()
            .push(VectorAction::Delete, 1, None)
            .unwrap();
        vector
    }

    #[test]
    fn round_trip_with_all_actions() {
        let view = VectorView::decode(sample().encode().unwrap()).unwrap();
        assert_eq!(view.container_type(), DataType::ElementList);
        assert_eq!(view.count(), 4);

        let summary = view.summary().unwrap().element_list().unwrap();
        assert_eq!(
            summary
                .find("Label")
                .unwrap()
                .unwrap()
                .data()
                .ascii()
                .unwrap(),
            "summary"
        );

        let entries: Vec<_> = view.iter().map(|e| e.unwrap()).collect();
        assert_eq!(
            entries
                .iter()
                .map(|e| (e.action(), e.index()))
                .collect::<Vec<_>>(),
            vec![
                (VectorAction::Set, 0),
                (VectorAction::Insert, 1),
                (VectorAction::Clear, 0),
                (VectorAction::Delete, 1)
            ]
        );
        let el = entries[1].payload().unwrap().element_list().unwrap();
        assert_eq!(
            el.find("Label").unwrap().unwrap().data().ascii().unwrap(),
            "one"
        );
        assert!(entries[2].payload().is_err());
    }

    #[test]
    fn payload_rules_enforced_at_build_time() {
        let mut vector = Vector::new(DataType::ElementList);
        assert!(vector.push(VectorAction::Set, 0, None).is_err());
        assert!(vector
            .push(VectorAction::Clear, 0, Some(row("x")))
            .is_err());
    }

    #[test]
    fn owned_copy_re_encodes_identically() {
        let raw = sample().encode().unwrap();
        let copy = VectorView::decode(raw.clone())
            .unwrap()
            .to_owned_vector()
            .unwrap();
        assert_eq!(copy.encode().unwrap(), raw);
    }
}
