//! Filter lists: sparse, id-addressed container entries.
//!
//! Each entry names a filter id (a bit position clients request via the
//! message key filter), an action, and a payload. Entries may override the
//! list's default container type.
//!
//! Wire layout: flags byte (unused, reserved as zero), default container
//! type tag, u8 entry count, then entries of id byte, an entry flags byte
//! (bit 0 marks a per-entry container type, bits 4..6 hold the action), the
//! optional type tag and a u16ob-framed payload.

use bytes::Bytes;

use ommwire_core::{encode_with_growth, DataType, OmmError, Result, WireCursor, WireWriter};

use crate::payload::{EntryData, Payload};

const ENTRY_HAS_CONTAINER_TYPE: u8 = 0x01;
const ENTRY_ACTION_SHIFT: u8 = 4;
const ENTRY_ACTION_MASK: u8 = 0x07;

/// What a filter entry does to the addressed section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FilterAction {
    /// Replace the section wholesale.
    Set = 1,
    /// Apply the payload as a partial update.
    Update = 2,
    /// Drop the section; the entry carries no payload.
    Clear = 3,
}

impl FilterAction {
    fn from_u8(v: u8) -> Result<Self> {
        match v {
            1 => Ok(Self::Set),
            2 => Ok(Self::Update),
            3 => Ok(Self::Clear),
            other => Err(OmmError::InvalidData(format!(
                "invalid filter action {other}"
            ))),
        }
    }
}

/// Encode-side filter list builder.
#[derive(Debug, Clone)]
pub struct FilterList {
    container_type: DataType,
    entries: Vec<(u8, FilterAction, Option<Payload>)>,
}

impl FilterList {
    /// Creates a filter list whose entries default to `container_type`.
    #[must_use]
    pub fn new(container_type: DataType) -> Self {
        Self {
            container_type,
            entries: Vec::new(),
        }
    }

    /// Appends a set or update entry. The payload's container type is
    /// written per-entry when it differs from the list default.
    pub fn push(&mut self, id: u8, action: FilterAction, payload: Payload) -> Result<&mut Self> {
        if action == FilterAction::Clear {
            return Err(OmmError::InvalidData(
                "clear entries carry no payload".into(),
            ));
        }
        self.entries.push((id, action, Some(payload)));
        Ok(self)
    }

    /// Appends a clear entry.
    pub fn clear(&mut self, id: u8) -> &mut Self {
        self.entries.push((id, FilterAction::Clear, None));
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

    /// Writes the complete filter list.
    pub fn encode_into(&self, w: &mut WireWriter) -> Result<()> {
        if self.entries.len() > u8::MAX as usize {
            return Err(OmmError::InvalidData(format!(
                "filter list of {} entries exceeds u8 count",
                self.entries.len()
            )));
        }
        w.put_u8(0)?;
        w.put_u8(self.container_type.as_u8())?;
        w.put_u8(self.entries.len() as u8)?;
        for (id, action, payload) in &self.entries {
            w.put_u8(*id)?;
            let override_type = payload
                .as_ref()
                .filter(|p| p.container_type != self.container_type)
                .map(|p| p.container_type);
            let mut eflags = (*action as u8) << ENTRY_ACTION_SHIFT;
            if override_type.is_some() {
                eflags |= ENTRY_HAS_CONTAINER_TYPE;
            }
            w.put_u8(eflags)?;
            if let Some(ty) = override_type {
                w.put_u8(ty.as_u8())?;
            }
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

/// Decoded filter list header over an undecoded entry region.
#[derive(Debug, Clone)]
pub struct FilterListView {
    container_type: DataType,
    count: u8,
    body: Bytes,
}

impl FilterListView {
    /// Parses the header; entries stay encoded until iterated.
    pub fn decode(raw: Bytes) -> Result<Self> {
        let mut cur = WireCursor::new(raw);
        let _flags = cur.u8()?;
        let container_type = DataType::from_u8(cur.u8()?)?;
        let count = cur.u8()?;
        Ok(Self {
            container_type,
            count,
            body: cur.take_rest(),
        })
    }

    /// Default container type of the entries.
    #[must_use]
    pub fn container_type(&self) -> DataType {
        self.container_type
    }

    /// Declared entry count.
    #[must_use]
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Iterates the entries from the start; restartable.
    #[must_use]
    pub fn iter(&self) -> FilterListIter {
        FilterListIter {
            default_type: self.container_type,
            remaining: self.count,
            cursor: WireCursor::new(self.body.clone()),
            failed: false,
        }
    }

    /// Materializes an owned builder with deep copies of every entry.
    pub fn to_owned_list(&self) -> Result<FilterList> {
        let mut list = FilterList::new(self.container_type);
        for entry in self.iter() {
            let entry = entry?;
            match entry.action() {
                FilterAction::Clear => {
                    list.clear(entry.id());
                }
                action => {
                    list.push(entry.id(), action, entry.payload()?.to_owned_copy())?;
                }
            }
        }
        Ok(list)
    }
}

/// One decoded filter list entry.
#[derive(Debug, Clone)]
pub struct FilterEntry {
    id: u8,
    action: FilterAction,
    container_type: DataType,
    data: EntryData,
}

impl FilterEntry {
    /// The entry's filter id.
    #[must_use]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// The entry's action.
    #[must_use]
    pub fn action(&self) -> FilterAction {
        self.action
    }

    /// Effective container type (the per-entry override, or the list
    /// default).
    #[must_use]
    pub fn container_type(&self) -> DataType {
        self.container_type
    }

    /// The entry's undecoded data. Clear entries present as no-data.
    #[must_use]
    pub fn data(&self) -> &EntryData {
        &self.data
    }

    /// The entry payload wrapped with its effective container type.
    pub fn payload(&self) -> Result<Payload> {
        if self.action == FilterAction::Clear {
            return Err(OmmError::BlankValue("filter clear entry"));
        }
        Ok(Payload::new(self.container_type, self.data.raw().clone()))
    }
}

/// Iterator over filter list entries.
#[derive(Debug)]
pub struct FilterListIter {
    default_type: DataType,
    remaining: u8,
    cursor: WireCursor,
    failed: bool,
}

impl FilterListIter {
    fn read_entry(&mut self) -> Result<FilterEntry> {
        let id = self.cursor.u8()?;
        let eflags = self.cursor.u8()?;
        let action = FilterAction::from_u8((eflags >> ENTRY_ACTION_SHIFT) & ENTRY_ACTION_MASK)?;
        let container_type = if eflags & ENTRY_HAS_CONTAINER_TYPE != 0 {
            DataType::from_u8(self.cursor.u8()?)?
        } else {
            self.default_type
        };
        let raw = self.cursor.buf16ob()?;
        let data = if action == FilterAction::Clear {
            EntryData::new(DataType::NoData.as_u8(), Bytes::new())
        } else {
            EntryData::new(container_type.as_u8(), raw)
        };
        Ok(FilterEntry {
            id,
            action,
            container_type,
            data,
        })
    }
}

impl Iterator for FilterListIter {
    type Item = Result<FilterEntry>;

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
    use crate::field_list::FieldList;
    use crate::payload::Value;

    fn sample() -> FilterList {
        let mut fl = FieldList::new();
        fl.add(22, Value::UInt(1));
        let mut el = ElementList::new();
        el.add("Name", Value::Ascii("svc".into()));

        let mut list = FilterList::new(DataType::ElementList);
        list.push(
            1,
            FilterAction::Set,
            Payload::new(DataType::ElementList, el.encode().unwrap()),
        )
        .unwrap()
        .push(
            2,
            FilterAction::Update,
            Payload::new(DataType::FieldList, fl.encode().unwrap()),
        )
        .unwrap()
        .clear(3);
        list
    }

    #[test]
    fn round_trip_with_type_override() {
        let view = FilterListView::decode(sample().encode().unwrap()).unwrap();
        assert_eq!(view.container_type(), DataType::ElementList);
        assert_eq!(view.count(), 3);

        let entries: Vec<_> = view.iter().map(|e| e.unwrap()).collect();
        assert_eq!(entries[0].id(), 1);
        assert_eq!(entries[0].action(), FilterAction::Set);
        assert_eq!(entries[0].container_type(), DataType::ElementList);
        let el = entries[0].payload().unwrap().element_list().unwrap();
        assert_eq!(
            el.find("Name").unwrap().unwrap().data().ascii().unwrap(),
            "svc"
        );

        // Entry 2 overrides the default container type.
        assert_eq!(entries[1].container_type(), DataType::FieldList);
        let fl = entries[1].payload().unwrap().field_list().unwrap();
        assert_eq!(fl.count(), 1);

        assert_eq!(entries[2].action(), FilterAction::Clear);
        assert!(entries[2].payload().is_err());
    }

    #[test]
    fn clear_with_payload_rejected_at_build_time() {
        let mut list = FilterList::new(DataType::ElementList);
        let err = list
            .push(
                1,
                FilterAction::Clear,
                Payload::new(DataType::ElementList, Bytes::new()),
            )
            .unwrap_err();
        assert!(matches!(err, OmmError::InvalidData(_)));
    }

    #[test]
    fn owned_copy_re_encodes_identically() {
        let raw = sample().encode().unwrap();
        let copy = FilterListView::decode(raw.clone())
            .unwrap()
            .to_owned_list()
            .unwrap();
        assert_eq!(copy.encode().unwrap(), raw);
    }
}
