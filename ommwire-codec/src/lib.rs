//! # ommwire-codec
//!
//! Container and message layer of the ommwire OMM/RWF codec:
//! - [`payload`] - entry values, lazy loads and typed sub-buffers
//! - [`array`], [`field_list`], [`element_list`], [`map`], [`filter_list`],
//!   [`vector`], [`series`] - the OMM container set
//! - [`msg`] - message envelope builders for all eight message classes
//! - [`view`] - poolable, rebindable decoded message views
//! - [`clone`] - independent re-encoding of decoded object graphs
//! - [`dictionary`] - field-id metadata lookup for rendering
//! - [`render`] - canonical text rendering used by clone-equality checks

pub mod array;
pub mod clone;
pub mod dictionary;
pub mod element_list;
pub mod field_list;
pub mod filter_list;
pub mod map;
pub mod msg;
pub mod payload;
pub mod render;
pub mod series;
pub mod vector;
pub mod view;

pub use array::{ArrayIter, ArrayView, OmmArray};
pub use clone::clone_msg;
pub use dictionary::{FieldDictionary, FieldInfo, SimpleDictionary};
pub use element_list::{ElementEntry, ElementList, ElementListIter, ElementListView};
pub use field_list::{FieldEntry, FieldList, FieldListInfo, FieldListIter, FieldListView};
pub use filter_list::{FilterAction, FilterEntry, FilterList, FilterListIter, FilterListView};
pub use map::{Map, MapAction, MapEntry, MapIter, MapView};
pub use msg::{
    nak_code, AckFields, ClassDetails, CloseFields, ConflationInfo, GenericFields, Msg, MsgClass,
    MsgKey, PostFields, PostUserInfo, Priority, RefreshFields, RequestFields, StatusFields,
    UpdateFields,
};
pub use payload::{decode_load, DataCode, EntryData, Load, Payload, Value};
pub use render::{render_msg, render_msg_with};
pub use series::{Series, SeriesIter, SeriesRow, SeriesView};
pub use vector::{Vector, VectorAction, VectorEntry, VectorIter, VectorView};
pub use view::MsgView;

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use ommwire_core::{DataType, Qos};

    #[test]
    fn field_list_uint_round_trip() {
        let mut list = FieldList::new();
        list.add(1, Value::UInt(64));
        let view = FieldListView::decode(list.encode().unwrap()).unwrap();
        let entry = view.iter().next().unwrap().unwrap();
        assert_eq!(entry.field_id(), 1);
        assert_eq!(entry.data().data_type().unwrap(), DataType::UInt);
        assert!(matches!(entry.load(), Load::UInt(64)));
    }

    #[test]
    fn ack_msg_full_accessor_walk() {
        let mut attrib = FieldList::new();
        attrib.add(1, Value::UInt(64));
        let msg = Msg {
            details: ClassDetails::Ack(AckFields {
                ack_id: 321,
                nak_code: Some(nak_code::DENIED_BY_SOURCE),
                text: Some("denied by source".into()),
                seq_num: None,
                private_stream: false,
            }),
            ..Msg::ack(6, 15, 321)
        }
        .with_key(MsgKey {
            name: Some("ABCDEF".into()),
            name_type: Some(1),
            service_id: Some(5),
            filter: Some(12),
            identifier: Some(21),
            attrib: Some(Payload::new(DataType::FieldList, attrib.encode().unwrap())),
        });

        let mut view = MsgView::new();
        view.bind(msg.encode().unwrap()).unwrap();
        assert_eq!(view.msg_class().unwrap(), MsgClass::Ack);
        assert_eq!(view.ack_id().unwrap(), 321);
        assert_eq!(view.nak_code().unwrap(), nak_code::DENIED_BY_SOURCE);
        assert_eq!(view.ack_text().unwrap(), "denied by source");
        let key = view.msg_key().unwrap();
        assert_eq!(key.name.as_deref(), Some("ABCDEF"));
        assert_eq!(key.name_type, Some(1));
        assert_eq!(key.service_id, Some(5));
        assert_eq!(key.filter, Some(12));
        assert_eq!(key.identifier, Some(21));
        let attrib = key.attrib.as_ref().unwrap().field_list().unwrap();
        let entry = attrib.iter().next().unwrap().unwrap();
        assert_eq!(entry.data().uint().unwrap(), 64);
    }

    #[test]
    fn numeric_qos_renders_raw_words() {
        let mut list = ElementList::new();
        list.add("Timeliness", Value::Qos(Qos::from_numeric(5656, 2345)));
        let view = ElementListView::decode(list.encode().unwrap()).unwrap();
        let entry = view.iter().next().unwrap().unwrap();
        let qos = entry.data().qos().unwrap();
        assert_eq!(qos.to_string(), "Timeliness: 5656/Rate: 2345");
    }

    #[test]
    fn map_buffer_keys_all_actions_in_order() {
        fn row(name: &str) -> Value {
            let mut el = ElementList::new();
            el.add("Name", Value::Ascii(name.into()));
            Value::Container(Payload::new(DataType::ElementList, el.encode().unwrap()))
        }
        let key = |k: &'static [u8]| Value::Buffer(Bytes::from_static(k));

        let mut map = Map::new(DataType::Buffer, DataType::ElementList).unwrap();
        map.delete(key(b"ABCD"))
            .unwrap()
            .add(key(b""), row("empty"))
            .unwrap()
            .add(key(b"EFGHI"), row("second"))
            .unwrap()
            .update(key(b"JKLMNOP"), row("third"))
            .unwrap();

        let view = MapView::decode(map.encode().unwrap()).unwrap();
        let entries: Vec<_> = view.iter().map(|e| e.unwrap()).collect();
        assert_eq!(entries.len(), 4);

        assert_eq!(entries[0].action(), MapAction::Delete);
        assert_eq!(&entries[0].key().buffer().unwrap()[..], b"ABCD");
        assert!(matches!(entries[0].data().load(), Load::NoData));

        assert_eq!(entries[1].action(), MapAction::Add);
        assert!(entries[1].key().buffer().unwrap().is_empty());
        let el = entries[1].data().element_list().unwrap();
        assert_eq!(
            el.find("Name").unwrap().unwrap().data().ascii().unwrap(),
            "empty"
        );

        assert_eq!(entries[2].action(), MapAction::Add);
        assert_eq!(&entries[2].key().buffer().unwrap()[..], b"EFGHI");

        assert_eq!(entries[3].action(), MapAction::Update);
        assert_eq!(&entries[3].key().buffer().unwrap()[..], b"JKLMNOP");
        let el = entries[3].data().element_list().unwrap();
        assert_eq!(
            el.find("Name").unwrap().unwrap().data().ascii().unwrap(),
            "third"
        );
    }
}
