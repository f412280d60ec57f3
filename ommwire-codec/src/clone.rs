//! Independent copies of decoded messages.
//!
//! [`clone_msg`] materializes an owned [`Msg`] from a bound view. Every
//! byte region (payload, key attrib, group id, permission data, extended
//! header) is copied out of the source buffer, so the clone stays valid and
//! re-encodable after the view is rebound or its buffer dropped.

use bytes::Bytes;

use ommwire_core::{OmmError, Result};

use crate::msg::{ClassDetails, Msg, MsgKey};
use crate::payload::Payload;
use crate::view::MsgView;

fn detach(bytes: &Bytes) -> Bytes {
    Bytes::copy_from_slice(bytes)
}

fn detach_payload(payload: &Payload) -> Payload {
    payload.to_owned_copy()
}

fn detach_key(key: &MsgKey) -> MsgKey {
    MsgKey {
        name: key.name.clone(),
        name_type: key.name_type,
        service_id: key.service_id,
        filter: key.filter,
        identifier: key.identifier,
        attrib: key.attrib.as_ref().map(detach_payload),
    }
}

fn detach_details(details: &ClassDetails) -> ClassDetails {
    let mut details = details.clone();
    match &mut details {
        ClassDetails::Refresh(f) => {
            f.group_id = detach(&f.group_id);
            f.perm_data = f.perm_data.as_ref().map(detach);
        }
        ClassDetails::Status(f) => {
            f.group_id = f.group_id.as_ref().map(detach);
            f.perm_data = f.perm_data.as_ref().map(detach);
        }
        ClassDetails::Update(f) => {
            f.perm_data = f.perm_data.as_ref().map(detach);
        }
        ClassDetails::Generic(f) => {
            f.perm_data = f.perm_data.as_ref().map(detach);
        }
        ClassDetails::Post(f) => {
            f.perm_data = f.perm_data.as_ref().map(detach);
        }
        ClassDetails::Request(_) | ClassDetails::Close(_) | ClassDetails::Ack(_) => {}
    }
    details
}

/// Copies the message bound to `view` into an owned, editable [`Msg`].
///
/// The copy shares no storage with the view's buffer. An implicit key
/// (installed by [`MsgView::bind_with_key`]) is carried over and stays
/// marked implicit. Cloning an unbound view fails.
pub fn clone_msg(view: &MsgView) -> Result<Msg> {
    let msg = view.msg().map_err(|_| {
        OmmError::CloneFailed(
            "Failed to clone empty encoded buffer; no message is bound to the source view"
                .into(),
        )
    })?;
    Ok(Msg {
        domain_type: msg.domain_type,
        stream_id: msg.stream_id,
        msg_key: msg.msg_key.as_ref().map(detach_key),
        implicit_key: msg.implicit_key,
        extended_header: msg.extended_header.as_ref().map(detach),
        payload: detach_payload(&msg.payload),
        details: detach_details(&msg.details),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_list::FieldList;
    use crate::payload::Value;
    use crate::render::render_msg;
    use ommwire_core::{DataState, DataType, Real, RealHint, State, StreamState};

    fn refresh_bytes() -> Bytes {
        let mut fl = FieldList::new();
        fl.add(22, Value::Real(Real::new(2995, RealHint::ExponentNeg2)))
            .add(25, Value::Blank(DataType::Real));
        let state = State::new(StreamState::Open, DataState::Ok).with_text("ok");
        let mut msg = Msg::refresh(6, 5, state)
            .with_key(MsgKey::with_name("TRI.N"))
            .with_payload(Payload::new(DataType::FieldList, fl.encode().unwrap()));
        if let ClassDetails::Refresh(f) = &mut msg.details {
            f.group_id = Bytes::from_static(&[0, 1]);
            f.perm_data = Some(Bytes::from_static(&[0x03]));
            f.seq_num = Some(9);
        }
        msg.encode().unwrap()
    }

    #[test]
    fn clone_renders_identically_to_source() {
        let mut view = MsgView::new();
        view.bind(refresh_bytes()).unwrap();
        let clone = clone_msg(&view).unwrap();

        let mut clone_view = MsgView::new();
        clone_view.bind(clone.encode().unwrap()).unwrap();
        assert_eq!(
            render_msg(&view).unwrap(),
            render_msg(&clone_view).unwrap()
        );
    }

    #[test]
    fn clone_survives_rebinding_the_source_view() {
        let mut view = MsgView::new();
        view.bind(refresh_bytes()).unwrap();
        let clone = clone_msg(&view).unwrap();

        // Rebind the source to an unrelated message and drop nothing.
        view.bind(Msg::close(6, 99).encode().unwrap()).unwrap();

        let fl = clone.payload.field_list().unwrap();
        let entry = fl.iter().next().unwrap().unwrap();
        assert_eq!(entry.data().real().unwrap().mantissa, 2995);
        assert_eq!(clone.stream_id, 5);
    }

    #[test]
    fn clone_is_editable_without_touching_the_source() {
        let mut view = MsgView::new();
        view.bind(refresh_bytes()).unwrap();
        let before = render_msg(&view).unwrap();

        let clone = clone_msg(&view).unwrap();
        let mut edited = clone.payload.field_list().unwrap().to_owned_list().unwrap();
        edited.add(21, Value::UInt(12));
        let edited_msg = clone
            .clone()
            .with_payload(Payload::new(DataType::FieldList, edited.encode().unwrap()));
        let mut edited_view = MsgView::new();
        edited_view.bind(edited_msg.encode().unwrap()).unwrap();

        // The source never sees the added field and its render is unchanged.
        let source_fids: Vec<_> = view
            .field_list()
            .unwrap()
            .iter()
            .map(|e| e.unwrap().field_id())
            .collect();
        assert!(!source_fids.contains(&21));
        assert_eq!(render_msg(&view).unwrap(), before);
        assert!(render_msg(&edited_view).unwrap().contains("fid=\"21\""));
        assert_ne!(render_msg(&edited_view).unwrap(), before);
    }

    #[test]
    fn clone_of_a_clone_still_renders_identically() {
        let mut view = MsgView::new();
        view.bind(refresh_bytes()).unwrap();
        let first = clone_msg(&view).unwrap();

        let mut first_view = MsgView::new();
        first_view.bind(first.encode().unwrap()).unwrap();
        let second = clone_msg(&first_view).unwrap();

        let mut second_view = MsgView::new();
        second_view.bind(second.encode().unwrap()).unwrap();
        assert_eq!(
            render_msg(&view).unwrap(),
            render_msg(&second_view).unwrap()
        );
    }

    #[test]
    fn implicit_key_is_not_written_back_to_the_wire() {
        let state = State::new(StreamState::Open, DataState::Ok);
        let keyless = Msg::refresh(6, 5, state).encode().unwrap();
        let mut view = MsgView::new();
        view.bind_with_key(keyless.clone(), MsgKey::with_name("IBM.N"))
            .unwrap();

        let reencoded = clone_msg(&view).unwrap().encode().unwrap();
        assert_eq!(reencoded, keyless);
    }

    #[test]
    fn implicit_key_state_is_preserved() {
        let state = State::new(StreamState::Open, DataState::Ok);
        let keyless = Msg::refresh(6, 5, state).encode().unwrap();
        let mut view = MsgView::new();
        view.bind_with_key(keyless, MsgKey::with_name("IBM.N")).unwrap();

        let clone = clone_msg(&view).unwrap();
        assert!(clone.implicit_key);
        assert_eq!(
            clone.msg_key.as_ref().and_then(|k| k.name.as_deref()),
            Some("IBM.N")
        );
    }

    #[test]
    fn cloning_an_unbound_view_fails_with_the_empty_buffer_error() {
        let view = MsgView::new();
        let err = clone_msg(&view).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Failed to clone empty encoded buffer"));
    }
}
