//! Maps: action-tagged entries of primitive key and container payload.
//!
//! Wire layout: flags byte (bit 0 key-field-id, bit 1 summary), key type
//! tag, entry container type tag, the optional key field id and u16ob-framed
//! summary, a u16 entry count, then entries of action byte, u16ob-framed key
//! and u16ob-framed payload. Delete entries carry an empty payload region.

use bytes::Bytes;

use ommwire_core::{encode_with_growth, DataType, OmmError, Result, WireCursor, WireWriter};

use crate::payload::{EntryData, Payload, Value};

const HAS_KEY_FIELD_ID: u8 = 0x01;
const HAS_SUMMARY: u8 = 0x02;

/// What a map entry does to the keyed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MapAction {
    /// Insert the keyed item.
    Add = 1,
    /// Replace the keyed item.
    Update = 2,
    /// Remove the keyed item; the entry carries no payload.
    Delete = 3,
}

impl MapAction {
    fn from_u8(v: u8) -> Result<Self> {
        match v {
            1 => Ok(Self::Add),
            2 => Ok(Self::Update),
            3 => Ok(Self::Delete),
            other => Err(OmmError::InvalidData(format!("invalid map action {other}"))),
        }
    }
}

/// Encode-side map builder.
#[derive(Debug, Clone)]
pub struct Map {
    key_type: DataType,
    container_type: DataType,
    key_field_id: Option<i16>,
    summary: Option<Payload>,
    entries: Vec<(MapAction, Value, Option<Value>)>,
}

impl Map {
    /// Creates a map of `key_type` keys over `container_type` payloads.
    pub fn new(key_type: DataType, container_type: DataType) -> Result<Self> {
        if !key_type.is_primitive() || key_type == DataType::Array {
            return Err(OmmError::InvalidData(format!(
                "map keys must be primitive, got {key_type}"
            )));
        }
        Ok(Self {
            key_type,
            container_type,
            key_field_id: None,
            summary: None,
            entries: Vec::new(),
        })
    }

    /// Declares which dictionary field the keys correspond to.
    #[must_use]
    pub fn with_key_field_id(mut self, field_id: i16) -> Self {
        self.key_field_id = Some(field_id);
        self
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

    fn push(&mut self, action: MapAction, key: Value, value: Option<Value>) -> Result<&mut Self> {
        if key.data_type() != self.key_type {
            return Err(OmmError::TypeMismatch {
                expected: self.key_type,
                actual: key.data_type(),
            });
        }
        if let Some(v) = &value {
            if v.data_type() != self.container_type {
                return Err(OmmError::TypeMismatch {
                    expected: self.container_type,
                    actual: v.data_type(),
                });
            }
        }
        self.entries.push((action, key, value));
        Ok(self)
    }

    /// Appends an add entry.
    pub fn add(&mut self, key: Value, value: Value) -> Result<&mut Self> {
        self.push(MapAction::Add, key, Some(value))
    }

    /// Appends an update entry.
    pub fn update(&mut self, key: Value, value: Value) -> Result<&mut Self> {
        self.push(MapAction::Update, key, Some(value))
    }

    /// Appends a delete entry (no payload).
    pub fn delete(&mut self, key: Value) -> Result<&mut Self> {
        self.push(MapAction::Delete, key, None)
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

    /// Writes the complete map.
    pub fn encode_into(&self, w: &mut WireWriter) -> Result<()> {
        if self.entries.len() > u16::MAX as usize {
            return Err(OmmError::InvalidData(format!(
                "map of {} entries exceeds u16 count",
                self.entries.len()
            )));
        }
        let mut flags = 0u8;
        if self.key_field_id.is_some() {
            flags |= HAS_KEY_FIELD_ID;
        }
        if self.summary.is_some() {
            flags |= HAS_SUMMARY;
        }
        w.put_u8(flags)?;
        w.put_u8(self.key_type.as_u8())?;
        w.put_u8(self.container_type.as_u8())?;
        if let Some(field_id) = self.key_field_id {
            w.put_i16(field_id)?;
        }
        if let Some(summary) = &self.summary {
            w.put_buf16ob(&summary.data)?;
        }
        w.put_u16(self.entries.len() as u16)?;
        for (action, key, value) in &self.entries {
            w.put_u8(*action as u8)?;
            w.put_buf16ob(&key.encode_payload()?)?;
            match value {
                Some(v) => w.put_buf16ob(&v.encode_payload()?)?,
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

/// Decoded map header over an undecoded entry region.
#[derive(Debug, Clone)]
pub struct MapView {
    key_type: DataType,
    container_type: DataType,
    key_field_id: Option<i16>,
    summary: Option<Bytes>,
    count: u16,
    body: Bytes,
}

impl MapView {
    /// Parses the header; entries stay encoded until iterated.
    pub fn decode(raw: Bytes) -> Result<Self> {
        let mut cur = WireCursor::new(raw);
        let flags = cur.u8()?;
        let key_type = DataType::from_u8(cur.u8()?)?;
        let container_type = DataType::from_u8(cur.u8()?)?;
        let key_field_id = if flags & HAS_KEY_FIELD_ID != 0 {
            Some(cur.i16()?)
        } else {
            None
        };
        let summary = if flags & HAS_SUMMARY != 0 {
            Some(cur.buf16ob()?)
        } else {
            None
        };
        let count = cur.u16()?;
        Ok(Self {
            key_type,
            container_type,
            key_field_id,
            summary,
            count,
            body: cur.take_rest(),
        })
    }

    /// Key type of the map.
    #[must_use]
    pub fn key_type(&self) -> DataType {
        self.key_type
    }

    /// Container type of the entry payloads.
    #[must_use]
    pub fn container_type(&self) -> DataType {
        self.container_type
    }

    /// Dictionary field id the keys correspond to, when declared.
    #[must_use]
    pub fn key_field_id(&self) -> Option<i16> {
        self.key_field_id
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
    pub fn iter(&self) -> MapIter {
        MapIter {
            key_type: self.key_type,
            container_type: self.container_type,
            remaining: self.count,
            cursor: WireCursor::new(self.body.clone()),
            failed: false,
        }
    }

    /// Materializes an owned builder with deep copies of every entry.
    pub fn to_owned_map(&self) -> Result<Map> {
        let mut map = Map::new(self.key_type, self.container_type)?;
        if let Some(field_id) = self.key_field_id {
            map = map.with_key_field_id(field_id);
        }
        if let Some(summary) = self.summary() {
            map = map.with_summary(summary.to_owned_copy())?;
        }
        for entry in self.iter() {
            let entry = entry?;
            let key = entry.key().load().to_owned_value()?;
            match entry.action() {
                MapAction::Add => map.add(key, entry.data().load().to_owned_value()?)?,
                MapAction::Update => map.update(key, entry.data().load().to_owned_value()?)?,
                MapAction::Delete => map.delete(key)?,
            };
        }
        Ok(map)
    }
}

/// One decoded map entry.
#[derive(Debug, Clone)]
pub struct MapEntry {
    action: MapAction,
    key: EntryData,
    data: EntryData,
}

impl MapEntry {
    /// The entry's action.
    #[must_use]
    pub fn action(&self) -> MapAction {
        self.action
    }

    /// The entry's key. An empty key payload for a string key type is a
    /// legal empty key, not blank.
    #[must_use]
    pub fn key(&self) -> &EntryData {
        &self.key
    }

    /// The entry's payload. Delete entries present as no-data.
    #[must_use]
    pub fn data(&self) -> &EntryData {
        &self.data
    }
}

/// Iterator over map entries.
#[derive(Debug)]
pub struct MapIter {
    key_type: DataType,
    container_type: DataType,
    remaining: u16,
    cursor: WireCursor,
    failed: bool,
}

impl MapIter {
    fn read_entry(&mut self) -> Result<MapEntry> {
        let action = MapAction::from_u8(self.cursor.u8()?)?;
        let key = self.cursor.buf16ob()?;
        let payload = self.cursor.buf16ob()?;
        let data = if action == MapAction::Delete {
            EntryData::new(DataType::NoData.as_u8(), Bytes::new())
        } else {
            EntryData::new(self.container_type.as_u8(), payload)
        };
        Ok(MapEntry {
            action,
            key: EntryData::new(self.key_type.as_u8(), key),
            data,
        })
    }
}

impl Iterator for MapIter {
    type Item = Result<MapEntry>;

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
    use crate::field_list::FieldList;
    use crate::payload::Load;

    fn order_entry(price: u64) -> Value {
        let mut fl = FieldList::new();
        fl.add(3427, Value::UInt(price));
        Value::Container(Payload::new(DataType::FieldList, fl.encode().unwrap()))
    }

    fn sample() -> Map {
        let mut summary = FieldList::new();
        summary.add(15, Value::UInt(840));
        let mut map = Map::new(DataType::Ascii, DataType::FieldList)
            .unwrap()
            .with_key_field_id(3426)
            .with_summary(Payload::new(
                DataType::FieldList,
                summary.encode().unwrap(),
            ))
            .unwrap();
        map.add(Value::Ascii("100".into()), order_entry(9950))
            .unwrap()
            .add(Value::Ascii("".into()), order_entry(9951))
            .unwrap()
            .update(Value::Ascii("100".into()), order_entry(9952))
            .unwrap()
            .delete(Value::Ascii("100".into()))
            .unwrap();
        map
    }

    #[test]
    fn round_trip_with_summary_and_actions() {
        let view = MapView::decode(sample().encode().unwrap()).unwrap();
        assert_eq!(view.key_type(), DataType::Ascii);
        assert_eq!(view.container_type(), DataType::FieldList);
        assert_eq!(view.key_field_id(), Some(3426));
        assert_eq!(view.count(), 4);

        let summary = view.summary().unwrap();
        let fl = summary.field_list().unwrap();
        let first = fl.iter().next().unwrap().unwrap();
        assert_eq!(first.data().uint().unwrap(), 840);

        let entries: Vec<_> = view.iter().map(|e| e.unwrap()).collect();
        assert_eq!(
            entries.iter().map(MapEntry::action).collect::<Vec<_>>(),
            vec![
                MapAction::Add,
                MapAction::Add,
                MapAction::Update,
                MapAction::Delete
            ]
        );
        assert_eq!(entries[0].key().ascii().unwrap(), "100");
        // An empty string key is a legal key, not a blank.
        assert_eq!(entries[1].key().ascii().unwrap(), "");
        let fl = entries[2].data().field_list().unwrap();
        let entry = fl.iter().next().unwrap().unwrap();
        assert_eq!(entry.data().uint().unwrap(), 9952);
    }

    #[test]
    fn delete_entry_presents_no_data() {
        let view = MapView::decode(sample().encode().unwrap()).unwrap();
        let delete = view.iter().last().unwrap().unwrap();
        assert_eq!(delete.action(), MapAction::Delete);
        assert!(matches!(delete.data().load(), Load::NoData));
    }

    #[test]
    fn key_type_enforced_at_build_time() {
        let mut map = Map::new(DataType::UInt, DataType::FieldList).unwrap();
        let err = map.delete(Value::Ascii("k".into())).unwrap_err();
        assert_eq!(
            err,
            OmmError::TypeMismatch {
                expected: DataType::UInt,
                actual: DataType::Ascii
            }
        );
    }

    #[test]
    fn invalid_action_byte_is_a_framing_error() {
        let mut raw = Vec::new();
        raw.push(0u8);
        raw.push(DataType::UInt.as_u8());
        raw.push(DataType::FieldList.as_u8());
        raw.extend_from_slice(&1u16.to_be_bytes());
        raw.push(9); // not a valid action
        raw.push(0);
        raw.push(0);
        let view = MapView::decode(Bytes::from(raw)).unwrap();
        let results: Vec<_> = view.iter().collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn owned_copy_re_encodes_identically() {
        let raw = sample().encode().unwrap();
        let copy = MapView::decode(raw.clone()).unwrap().to_owned_map().unwrap();
        assert_eq!(copy.encode().unwrap(), raw);
    }
}
