//! Rebindable decoded message views.
//!
//! A [`MsgView`] is created once (typically held in a pool), bound to an
//! encoded buffer to read one message, then rebound to the next buffer.
//! Binding replaces all previous state; nothing from an earlier message
//! survives a rebind. Accessors on an unbound view fail with
//! [`OmmError::NotBound`].

use bytes::Bytes;

use ommwire_core::{OmmError, Qos, Result, State, WireVersion};

use crate::element_list::ElementListView;
use crate::field_list::FieldListView;
use crate::filter_list::FilterListView;
use crate::map::MapView;
use crate::msg::{ClassDetails, ConflationInfo, Msg, MsgClass, MsgKey, PostUserInfo, Priority};
use crate::payload::Payload;
use crate::series::SeriesView;
use crate::vector::VectorView;

#[derive(Debug, Clone)]
struct Binding {
    raw: Bytes,
    msg: Msg,
    version: WireVersion,
}

/// A poolable view over one encoded message.
#[derive(Debug, Clone, Default)]
pub struct MsgView {
    binding: Option<Binding>,
}

impl MsgView {
    /// Creates an unbound view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the view to an encoded message, replacing any previous
    /// binding. The envelope is decoded now; the payload stays encoded
    /// until asked for.
    pub fn bind(&mut self, data: Bytes) -> Result<()> {
        self.bind_versioned(data, WireVersion::default())
    }

    /// Binds like [`MsgView::bind`], recording the negotiated wire format
    /// version of the connection the buffer arrived on.
    pub fn bind_versioned(&mut self, data: Bytes, version: WireVersion) -> Result<()> {
        let msg = Msg::decode(data.clone())?;
        self.binding = Some(Binding {
            raw: data,
            msg,
            version,
        });
        Ok(())
    }

    /// Binds like [`MsgView::bind`], then installs `key` as the message key
    /// when the wire carries none. A key adopted this way is marked
    /// implicit; a key decoded from the wire always wins.
    pub fn bind_with_key(&mut self, data: Bytes, key: MsgKey) -> Result<()> {
        self.bind(data)?;
        let binding = self.binding.as_mut().filter(|b| b.msg.msg_key.is_none());
        if let Some(binding) = binding {
            binding.msg.msg_key = Some(key);
            binding.msg.implicit_key = true;
        }
        Ok(())
    }

    /// Drops the binding, returning the view to its pool-ready state.
    pub fn clear(&mut self) {
        self.binding = None;
    }

    /// Whether a message is currently bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    fn binding(&self) -> Result<&Binding> {
        self.binding.as_ref().ok_or(OmmError::NotBound)
    }

    /// The decoded message.
    pub fn msg(&self) -> Result<&Msg> {
        Ok(&self.binding()?.msg)
    }

    /// The bound encoded buffer.
    pub fn raw(&self) -> Result<&Bytes> {
        Ok(&self.binding()?.raw)
    }

    /// The wire format version recorded at bind time.
    pub fn version(&self) -> Result<WireVersion> {
        Ok(self.binding()?.version)
    }

    /// The message class.
    pub fn msg_class(&self) -> Result<MsgClass> {
        Ok(self.msg()?.msg_class())
    }

    /// The domain type.
    pub fn domain_type(&self) -> Result<u8> {
        Ok(self.msg()?.domain_type)
    }

    /// The stream id.
    pub fn stream_id(&self) -> Result<i32> {
        Ok(self.msg()?.stream_id)
    }

    /// Class-specific fields.
    pub fn details(&self) -> Result<&ClassDetails> {
        Ok(&self.msg()?.details)
    }

    /// Whether a message key is present (decoded or implicit).
    #[must_use]
    pub fn has_msg_key(&self) -> bool {
        self.msg().map(|m| m.msg_key.is_some()).unwrap_or(false)
    }

    /// The message key.
    pub fn msg_key(&self) -> Result<&MsgKey> {
        self.msg()?
            .msg_key
            .as_ref()
            .ok_or(OmmError::FieldNotSet("msg_key"))
    }

    /// Whether the key was installed by [`MsgView::bind_with_key`] rather
    /// than decoded from the wire.
    #[must_use]
    pub fn key_is_implicit(&self) -> bool {
        self.msg().map(|m| m.implicit_key).unwrap_or(false)
    }

    /// The extended header.
    pub fn extended_header(&self) -> Result<&Bytes> {
        self.msg()?
            .extended_header
            .as_ref()
            .ok_or(OmmError::FieldNotSet("extended_header"))
    }

    /// The undecoded payload.
    pub fn payload(&self) -> Result<&Payload> {
        Ok(&self.msg()?.payload)
    }

    /// Decodes the payload as a field list.
    pub fn field_list(&self) -> Result<FieldListView> {
        self.payload()?.field_list()
    }

    /// Decodes the payload as an element list.
    pub fn element_list(&self) -> Result<ElementListView> {
        self.payload()?.element_list()
    }

    /// Decodes the payload as a map.
    pub fn map(&self) -> Result<MapView> {
        self.payload()?.map()
    }

    /// Decodes the payload as a vector.
    pub fn vector(&self) -> Result<VectorView> {
        self.payload()?.vector()
    }

    /// Decodes the payload as a series.
    pub fn series(&self) -> Result<SeriesView> {
        self.payload()?.series()
    }

    /// Decodes the payload as a filter list.
    pub fn filter_list(&self) -> Result<FilterListView> {
        self.payload()?.filter_list()
    }

    /// The stream/data state (refresh always, status when present).
    pub fn state(&self) -> Result<&State> {
        match self.details()? {
            ClassDetails::Refresh(f) => Ok(&f.state),
            ClassDetails::Status(f) => f.state.as_ref().ok_or(OmmError::FieldNotSet("state")),
            _ => Err(OmmError::FieldNotSet("state")),
        }
    }

    /// The item group id (refresh always, status when present).
    pub fn group_id(&self) -> Result<&Bytes> {
        match self.details()? {
            ClassDetails::Refresh(f) => Ok(&f.group_id),
            ClassDetails::Status(f) => {
                f.group_id.as_ref().ok_or(OmmError::FieldNotSet("group_id"))
            }
            _ => Err(OmmError::FieldNotSet("group_id")),
        }
    }

    /// The sequence number, on the classes that carry one.
    pub fn seq_num(&self) -> Result<u32> {
        let seq = match self.details()? {
            ClassDetails::Refresh(f) => f.seq_num,
            ClassDetails::Update(f) => f.seq_num,
            ClassDetails::Ack(f) => f.seq_num,
            ClassDetails::Generic(f) => f.seq_num,
            ClassDetails::Post(f) => f.seq_num,
            _ => None,
        };
        seq.ok_or(OmmError::FieldNotSet("seq_num"))
    }

    /// The part number, on the classes that carry one.
    pub fn part_num(&self) -> Result<u16> {
        let part = match self.details()? {
            ClassDetails::Refresh(f) => f.part_num,
            ClassDetails::Generic(f) => f.part_num,
            ClassDetails::Post(f) => f.part_num,
            _ => None,
        };
        part.ok_or(OmmError::FieldNotSet("part_num"))
    }

    /// The QoS descriptor (request or refresh).
    pub fn qos(&self) -> Result<Qos> {
        let qos = match self.details()? {
            ClassDetails::Request(f) => f.qos,
            ClassDetails::Refresh(f) => f.qos,
            _ => None,
        };
        qos.ok_or(OmmError::FieldNotSet("qos"))
    }

    /// Permission data, on the classes that carry it.
    pub fn perm_data(&self) -> Result<&Bytes> {
        let perm = match self.details()? {
            ClassDetails::Refresh(f) => f.perm_data.as_ref(),
            ClassDetails::Status(f) => f.perm_data.as_ref(),
            ClassDetails::Update(f) => f.perm_data.as_ref(),
            ClassDetails::Generic(f) => f.perm_data.as_ref(),
            ClassDetails::Post(f) => f.perm_data.as_ref(),
            _ => None,
        };
        perm.ok_or(OmmError::FieldNotSet("perm_data"))
    }

    /// The poster identity, on the classes that carry it.
    pub fn post_user_info(&self) -> Result<PostUserInfo> {
        let pui = match self.details()? {
            ClassDetails::Refresh(f) => f.post_user_info,
            ClassDetails::Status(f) => f.post_user_info,
            ClassDetails::Update(f) => f.post_user_info,
            ClassDetails::Post(f) => Some(f.post_user_info),
            _ => None,
        };
        pui.ok_or(OmmError::FieldNotSet("post_user_info"))
    }

    /// The update kind (update only).
    pub fn update_type(&self) -> Result<u8> {
        match self.details()? {
            ClassDetails::Update(f) => Ok(f.update_type),
            _ => Err(OmmError::FieldNotSet("update_type")),
        }
    }

    /// The conflation info (update only).
    pub fn conf_info(&self) -> Result<ConflationInfo> {
        match self.details()? {
            ClassDetails::Update(f) => f.conf_info.ok_or(OmmError::FieldNotSet("conf_info")),
            _ => Err(OmmError::FieldNotSet("conf_info")),
        }
    }

    /// The requested priority (request only).
    pub fn priority(&self) -> Result<Priority> {
        match self.details()? {
            ClassDetails::Request(f) => f.priority.ok_or(OmmError::FieldNotSet("priority")),
            _ => Err(OmmError::FieldNotSet("priority")),
        }
    }

    /// The acknowledged id (ack only).
    pub fn ack_id(&self) -> Result<u32> {
        match self.details()? {
            ClassDetails::Ack(f) => Ok(f.ack_id),
            _ => Err(OmmError::FieldNotSet("ack_id")),
        }
    }

    /// The negative-acknowledge code (ack only, when present).
    pub fn nak_code(&self) -> Result<u8> {
        match self.details()? {
            ClassDetails::Ack(f) => f.nak_code.ok_or(OmmError::FieldNotSet("nak_code")),
            _ => Err(OmmError::FieldNotSet("nak_code")),
        }
    }

    /// The ack text (ack only, when present).
    pub fn ack_text(&self) -> Result<&str> {
        match self.details()? {
            ClassDetails::Ack(f) => f
                .text
                .as_deref()
                .ok_or(OmmError::FieldNotSet("ack_text")),
            _ => Err(OmmError::FieldNotSet("ack_text")),
        }
    }

    /// The post id (post only, when present).
    pub fn post_id(&self) -> Result<u32> {
        match self.details()? {
            ClassDetails::Post(f) => f.post_id.ok_or(OmmError::FieldNotSet("post_id")),
            _ => Err(OmmError::FieldNotSet("post_id")),
        }
    }
}

impl std::fmt::Display for MsgView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match crate::render::render_msg(self) {
            Ok(text) => f.write_str(&text),
            Err(err) => write!(f, "({err})"),
        }
    }
}
