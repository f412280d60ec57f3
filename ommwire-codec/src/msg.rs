//! Message envelope codec.
//!
//! Every message shares one envelope: class byte, domain byte, i32 stream
//! id, u16 flags, payload container type tag, a class-specific block, the
//! optional message key and extended header, then the payload to the end of
//! the buffer. The flag word gates every optional field; absent fields
//! occupy zero bytes.

use bytes::Bytes;

use ommwire_core::primitive;
use ommwire_core::{encode_with_growth, DataType, OmmError, Qos, Result, State, WireCursor, WireWriter};

use crate::payload::Payload;

const HAS_MSG_KEY: u16 = 0x0001;
const HAS_EXTENDED_HEADER: u16 = 0x0002;

mod request_flags {
    pub const STREAMING: u16 = 0x0004;
    pub const PAUSE: u16 = 0x0008;
    pub const PRIVATE_STREAM: u16 = 0x0010;
    pub const HAS_VIEW: u16 = 0x0020;
    pub const HAS_PRIORITY: u16 = 0x0040;
    pub const HAS_QOS: u16 = 0x0080;
}

mod refresh_flags {
    pub const SOLICITED: u16 = 0x0004;
    pub const COMPLETE: u16 = 0x0008;
    pub const CLEAR_CACHE: u16 = 0x0010;
    pub const DO_NOT_CACHE: u16 = 0x0020;
    pub const PRIVATE_STREAM: u16 = 0x0040;
    pub const HAS_SEQ_NUM: u16 = 0x0080;
    pub const HAS_PART_NUM: u16 = 0x0100;
    pub const HAS_QOS: u16 = 0x0200;
    pub const HAS_PERM_DATA: u16 = 0x0400;
    pub const HAS_POST_USER_INFO: u16 = 0x0800;
}

mod status_flags {
    pub const HAS_STATE: u16 = 0x0004;
    pub const HAS_GROUP_ID: u16 = 0x0008;
    pub const HAS_PERM_DATA: u16 = 0x0010;
    pub const HAS_POST_USER_INFO: u16 = 0x0020;
    pub const CLEAR_CACHE: u16 = 0x0040;
    pub const PRIVATE_STREAM: u16 = 0x0080;
}

mod update_flags {
    pub const DO_NOT_CACHE: u16 = 0x0004;
    pub const DO_NOT_CONFLATE: u16 = 0x0008;
    pub const DO_NOT_RIPPLE: u16 = 0x0010;
    pub const HAS_SEQ_NUM: u16 = 0x0020;
    pub const HAS_CONF_INFO: u16 = 0x0040;
    pub const HAS_PERM_DATA: u16 = 0x0080;
    pub const HAS_POST_USER_INFO: u16 = 0x0100;
}

mod close_flags {
    pub const ACK: u16 = 0x0004;
}

mod ack_flags {
    pub const HAS_NAK_CODE: u16 = 0x0004;
    pub const HAS_TEXT: u16 = 0x0008;
    pub const HAS_SEQ_NUM: u16 = 0x0010;
    pub const PRIVATE_STREAM: u16 = 0x0020;
}

mod generic_flags {
    pub const HAS_SEQ_NUM: u16 = 0x0004;
    pub const HAS_SECONDARY_SEQ_NUM: u16 = 0x0008;
    pub const HAS_PART_NUM: u16 = 0x0010;
    pub const HAS_PERM_DATA: u16 = 0x0020;
    pub const COMPLETE: u16 = 0x0040;
    pub const PROVIDER_DRIVEN: u16 = 0x0080;
}

mod post_flags {
    pub const HAS_POST_ID: u16 = 0x0004;
    pub const HAS_POST_USER_RIGHTS: u16 = 0x0008;
    pub const HAS_SEQ_NUM: u16 = 0x0010;
    pub const HAS_PART_NUM: u16 = 0x0020;
    pub const HAS_PERM_DATA: u16 = 0x0040;
    pub const ACK_REQUESTED: u16 = 0x0080;
    pub const COMPLETE: u16 = 0x0100;
}

mod key_flags {
    pub const HAS_SERVICE_ID: u16 = 0x01;
    pub const HAS_NAME: u16 = 0x02;
    pub const HAS_NAME_TYPE: u16 = 0x04;
    pub const HAS_FILTER: u16 = 0x08;
    pub const HAS_IDENTIFIER: u16 = 0x10;
    pub const HAS_ATTRIB: u16 = 0x20;
}

/// Negative-acknowledge codes carried by ack messages.
pub mod nak_code {
    pub const NONE: u8 = 0;
    pub const ACCESS_DENIED: u8 = 1;
    pub const DENIED_BY_SOURCE: u8 = 2;
    pub const SOURCE_DOWN: u8 = 3;
    pub const SOURCE_UNKNOWN: u8 = 4;
    pub const NO_RESOURCES: u8 = 5;
    pub const NO_RESPONSE: u8 = 6;
    pub const GATEWAY_DOWN: u8 = 7;
    pub const SYMBOL_UNKNOWN: u8 = 10;
    pub const NOT_OPEN: u8 = 12;
    pub const INVALID_CONTENT: u8 = 13;
}

/// The eight message classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MsgClass {
    Request = 1,
    Refresh = 2,
    Status = 3,
    Update = 4,
    Close = 5,
    Ack = 6,
    Generic = 7,
    Post = 8,
}

impl MsgClass {
    /// Decodes a class from its wire value.
    pub fn from_u8(v: u8) -> Result<Self> {
        match v {
            1 => Ok(Self::Request),
            2 => Ok(Self::Refresh),
            3 => Ok(Self::Status),
            4 => Ok(Self::Update),
            5 => Ok(Self::Close),
            6 => Ok(Self::Ack),
            7 => Ok(Self::Generic),
            8 => Ok(Self::Post),
            other => Err(OmmError::InvalidData(format!(
                "invalid message class {other}"
            ))),
        }
    }
}

/// Identifies the item a message stream is about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MsgKey {
    /// Item name.
    pub name: Option<String>,
    /// Namespace of the name; only meaningful when a name is present.
    pub name_type: Option<u8>,
    /// Originating service.
    pub service_id: Option<u16>,
    /// Filter-list section bits the consumer wants.
    pub filter: Option<u32>,
    /// Provider-assigned numeric identifier.
    pub identifier: Option<i32>,
    /// Key attribute data (typically an element list).
    pub attrib: Option<Payload>,
}

impl MsgKey {
    /// Creates a key with just an item name.
    #[must_use]
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        // A name type qualifies a name; one without the other is malformed
        // and is rejected before any bytes are written or trusted.
        if self.name_type.is_some() && self.name.is_none() {
            return Err(OmmError::InvalidData(
                "message key has a name type but no name".into(),
            ));
        }
        Ok(())
    }

    fn encode_into(&self, w: &mut WireWriter) -> Result<()> {
        self.validate()?;
        let mut flags = 0u16;
        if self.service_id.is_some() {
            flags |= key_flags::HAS_SERVICE_ID;
        }
        if self.name.is_some() {
            flags |= key_flags::HAS_NAME;
        }
        if self.name_type.is_some() {
            flags |= key_flags::HAS_NAME_TYPE;
        }
        if self.filter.is_some() {
            flags |= key_flags::HAS_FILTER;
        }
        if self.identifier.is_some() {
            flags |= key_flags::HAS_IDENTIFIER;
        }
        if self.attrib.is_some() {
            flags |= key_flags::HAS_ATTRIB;
        }
        w.put_u15(flags)?;
        if let Some(service_id) = self.service_id {
            w.put_u16(service_id)?;
        }
        if let Some(name) = &self.name {
            w.put_buf15(name.as_bytes())?;
        }
        if let Some(name_type) = self.name_type {
            w.put_u8(name_type)?;
        }
        if let Some(filter) = self.filter {
            w.put_u32(filter)?;
        }
        if let Some(identifier) = self.identifier {
            w.put_i32(identifier)?;
        }
        if let Some(attrib) = &self.attrib {
            w.put_u8(attrib.container_type.as_u8())?;
            w.put_buf15(&attrib.data)?;
        }
        Ok(())
    }

    fn decode(cur: &mut WireCursor) -> Result<Self> {
        let flags = cur.u15()?;
        let service_id = (flags & key_flags::HAS_SERVICE_ID != 0)
            .then(|| cur.u16())
            .transpose()?;
        let name = if flags & key_flags::HAS_NAME != 0 {
            let raw = cur.buf15()?;
            Some(String::from_utf8(raw.to_vec()).map_err(|_| {
                OmmError::InvalidData("message key name is not valid UTF-8".into())
            })?)
        } else {
            None
        };
        let name_type = (flags & key_flags::HAS_NAME_TYPE != 0)
            .then(|| cur.u8())
            .transpose()?;
        let filter = (flags & key_flags::HAS_FILTER != 0)
            .then(|| cur.u32())
            .transpose()?;
        let identifier = (flags & key_flags::HAS_IDENTIFIER != 0)
            .then(|| cur.i32())
            .transpose()?;
        let attrib = if flags & key_flags::HAS_ATTRIB != 0 {
            let ty = DataType::from_u8(cur.u8()?)?;
            Some(Payload::new(ty, cur.buf15()?))
        } else {
            None
        };
        let key = Self {
            name,
            name_type,
            service_id,
            filter,
            identifier,
            attrib,
        };
        key.validate()?;
        Ok(key)
    }
}

/// Consumer stream priority: class outranks count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    pub class: u8,
    pub count: u16,
}

/// Identifies the poster of post-sourced data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostUserInfo {
    /// IPv4 address of the posting application.
    pub user_addr: u32,
    /// Process or user id of the posting application.
    pub user_id: u32,
}

/// Conflation details attached to a conflated update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflationInfo {
    /// Number of updates folded together.
    pub count: u16,
    /// Conflation interval in milliseconds.
    pub time: u16,
}

/// Request-class fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFields {
    pub streaming: bool,
    pub pause: bool,
    pub private_stream: bool,
    /// The payload carries a view specification.
    pub has_view: bool,
    pub priority: Option<Priority>,
    pub qos: Option<Qos>,
}

/// Refresh-class fields. State and group id are mandatory.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshFields {
    pub state: State,
    pub group_id: Bytes,
    pub solicited: bool,
    pub complete: bool,
    pub clear_cache: bool,
    pub do_not_cache: bool,
    pub private_stream: bool,
    pub seq_num: Option<u32>,
    pub part_num: Option<u16>,
    pub qos: Option<Qos>,
    pub perm_data: Option<Bytes>,
    pub post_user_info: Option<PostUserInfo>,
}

impl RefreshFields {
    /// Creates refresh fields around the mandatory stream state.
    #[must_use]
    pub fn new(state: State) -> Self {
        Self {
            state,
            group_id: Bytes::new(),
            solicited: false,
            complete: false,
            clear_cache: false,
            do_not_cache: false,
            private_stream: false,
            seq_num: None,
            part_num: None,
            qos: None,
            perm_data: None,
            post_user_info: None,
        }
    }
}

/// Status-class fields. Everything is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusFields {
    pub state: Option<State>,
    pub group_id: Option<Bytes>,
    pub clear_cache: bool,
    pub private_stream: bool,
    pub perm_data: Option<Bytes>,
    pub post_user_info: Option<PostUserInfo>,
}

/// Update-class fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFields {
    /// Domain-defined update kind (quote, trade, ...).
    pub update_type: u8,
    pub do_not_cache: bool,
    pub do_not_conflate: bool,
    pub do_not_ripple: bool,
    pub seq_num: Option<u32>,
    pub conf_info: Option<ConflationInfo>,
    pub perm_data: Option<Bytes>,
    pub post_user_info: Option<PostUserInfo>,
}

/// Close-class fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloseFields {
    /// The closer wants the close acknowledged.
    pub ack: bool,
}

/// Ack-class fields. The ack id is mandatory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AckFields {
    /// Identifier of the message being acknowledged (a post id or close).
    pub ack_id: u32,
    /// Present on negative acknowledgements; see [`nak_code`].
    pub nak_code: Option<u8>,
    pub text: Option<String>,
    pub seq_num: Option<u32>,
    pub private_stream: bool,
}

/// Generic-class fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericFields {
    pub seq_num: Option<u32>,
    pub secondary_seq_num: Option<u32>,
    pub part_num: Option<u16>,
    pub perm_data: Option<Bytes>,
    pub complete: bool,
    pub provider_driven: bool,
}

/// Post-class fields. The post user info is mandatory.
#[derive(Debug, Clone, PartialEq)]
pub struct PostFields {
    pub post_user_info: PostUserInfo,
    pub post_id: Option<u32>,
    pub post_user_rights: Option<u16>,
    pub seq_num: Option<u32>,
    pub part_num: Option<u16>,
    pub perm_data: Option<Bytes>,
    pub ack_requested: bool,
    pub complete: bool,
}

impl PostFields {
    /// Creates post fields around the mandatory poster identity.
    #[must_use]
    pub fn new(post_user_info: PostUserInfo) -> Self {
        Self {
            post_user_info,
            post_id: None,
            post_user_rights: None,
            seq_num: None,
            part_num: None,
            perm_data: None,
            ack_requested: false,
            complete: false,
        }
    }
}

/// Class-specific message fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassDetails {
    Request(RequestFields),
    Refresh(RefreshFields),
    Status(StatusFields),
    Update(UpdateFields),
    Close(CloseFields),
    Ack(AckFields),
    Generic(GenericFields),
    Post(PostFields),
}

impl ClassDetails {
    /// The message class these details belong to.
    #[must_use]
    pub fn msg_class(&self) -> MsgClass {
        match self {
            Self::Request(_) => MsgClass::Request,
            Self::Refresh(_) => MsgClass::Refresh,
            Self::Status(_) => MsgClass::Status,
            Self::Update(_) => MsgClass::Update,
            Self::Close(_) => MsgClass::Close,
            Self::Ack(_) => MsgClass::Ack,
            Self::Generic(_) => MsgClass::Generic,
            Self::Post(_) => MsgClass::Post,
        }
    }
}

/// An owned, encodable message.
///
/// Built directly or materialized from a decoded view by
/// [`clone_msg`](crate::clone::clone_msg). Messages do not render
/// themselves; decode-side views do. The `Display` impl below says so.
#[derive(Debug, Clone, PartialEq)]
pub struct Msg {
    /// Domain model the stream belongs to (6 = market price, ...).
    pub domain_type: u8,
    /// Stream the message travels on.
    pub stream_id: i32,
    /// Item identification; optional on every class.
    pub msg_key: Option<MsgKey>,
    /// Key was supplied out of band rather than decoded from the wire.
    /// Never encoded.
    pub implicit_key: bool,
    /// Opaque header extension.
    pub extended_header: Option<Bytes>,
    /// Message body.
    pub payload: Payload,
    /// Class-specific fields.
    pub details: ClassDetails,
}

impl Msg {
    fn with_details(domain_type: u8, stream_id: i32, details: ClassDetails) -> Self {
        Self {
            domain_type,
            stream_id,
            msg_key: None,
            implicit_key: false,
            extended_header: None,
            payload: Payload::no_data(),
            details,
        }
    }

    /// Creates a request message.
    #[must_use]
    pub fn request(domain_type: u8, stream_id: i32) -> Self {
        Self::with_details(
            domain_type,
            stream_id,
            ClassDetails::Request(RequestFields::default()),
        )
    }

    /// Creates a refresh message carrying the mandatory state.
    #[must_use]
    pub fn refresh(domain_type: u8, stream_id: i32, state: State) -> Self {
        Self::with_details(
            domain_type,
            stream_id,
            ClassDetails::Refresh(RefreshFields::new(state)),
        )
    }

    /// Creates a status message.
    #[must_use]
    pub fn status(domain_type: u8, stream_id: i32) -> Self {
        Self::with_details(
            domain_type,
            stream_id,
            ClassDetails::Status(StatusFields::default()),
        )
    }

    /// Creates an update message of the given update kind.
    #[must_use]
    pub fn update(domain_type: u8, stream_id: i32, update_type: u8) -> Self {
        Self::with_details(
            domain_type,
            stream_id,
            ClassDetails::Update(UpdateFields {
                update_type,
                ..UpdateFields::default()
            }),
        )
    }

    /// Creates a close message.
    #[must_use]
    pub fn close(domain_type: u8, stream_id: i32) -> Self {
        Self::with_details(
            domain_type,
            stream_id,
            ClassDetails::Close(CloseFields::default()),
        )
    }

    /// Creates an ack message for `ack_id`.
    #[must_use]
    pub fn ack(domain_type: u8, stream_id: i32, ack_id: u32) -> Self {
        Self::with_details(
            domain_type,
            stream_id,
            ClassDetails::Ack(AckFields {
                ack_id,
                ..AckFields::default()
            }),
        )
    }

    /// Creates a generic message.
    #[must_use]
    pub fn generic(domain_type: u8, stream_id: i32) -> Self {
        Self::with_details(
            domain_type,
            stream_id,
            ClassDetails::Generic(GenericFields::default()),
        )
    }

    /// Creates a post message carrying the mandatory poster identity.
    #[must_use]
    pub fn post(domain_type: u8, stream_id: i32, post_user_info: PostUserInfo) -> Self {
        Self::with_details(
            domain_type,
            stream_id,
            ClassDetails::Post(PostFields::new(post_user_info)),
        )
    }

    /// The message class.
    #[must_use]
    pub fn msg_class(&self) -> MsgClass {
        self.details.msg_class()
    }

    /// Attaches a message key.
    #[must_use]
    pub fn with_key(mut self, key: MsgKey) -> Self {
        self.msg_key = Some(key);
        self
    }

    /// Attaches the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Attaches an extended header.
    #[must_use]
    pub fn with_extended_header(mut self, header: Bytes) -> Self {
        self.extended_header = Some(header);
        self
    }

    fn flags(&self) -> u16 {
        let mut flags = 0u16;
        if self.msg_key.is_some() && !self.implicit_key {
            flags |= HAS_MSG_KEY;
        }
        if self.extended_header.is_some() {
            flags |= HAS_EXTENDED_HEADER;
        }
        match &self.details {
            ClassDetails::Request(f) => {
                if f.streaming {
                    flags |= request_flags::STREAMING;
                }
                if f.pause {
                    flags |= request_flags::PAUSE;
                }
                if f.private_stream {
                    flags |= request_flags::PRIVATE_STREAM;
                }
                if f.has_view {
                    flags |= request_flags::HAS_VIEW;
                }
                if f.priority.is_some() {
                    flags |= request_flags::HAS_PRIORITY;
                }
                if f.qos.is_some() {
                    flags |= request_flags::HAS_QOS;
                }
            }
            ClassDetails::Refresh(f) => {
                if f.solicited {
                    flags |= refresh_flags::SOLICITED;
                }
                if f.complete {
                    flags |= refresh_flags::COMPLETE;
                }
                if f.clear_cache {
                    flags |= refresh_flags::CLEAR_CACHE;
                }
                if f.do_not_cache {
                    flags |= refresh_flags::DO_NOT_CACHE;
                }
                if f.private_stream {
                    flags |= refresh_flags::PRIVATE_STREAM;
                }
                if f.seq_num.is_some() {
                    flags |= refresh_flags::HAS_SEQ_NUM;
                }
                if f.part_num.is_some() {
                    flags |= refresh_flags::HAS_PART_NUM;
                }
                if f.qos.is_some() {
                    flags |= refresh_flags::HAS_QOS;
                }
                if f.perm_data.is_some() {
                    flags |= refresh_flags::HAS_PERM_DATA;
                }
                if f.post_user_info.is_some() {
                    flags |= refresh_flags::HAS_POST_USER_INFO;
                }
            }
            ClassDetails::Status(f) => {
                if f.state.is_some() {
                    flags |= status_flags::HAS_STATE;
                }
                if f.group_id.is_some() {
                    flags |= status_flags::HAS_GROUP_ID;
                }
                if f.perm_data.is_some() {
                    flags |= status_flags::HAS_PERM_DATA;
                }
                if f.post_user_info.is_some() {
                    flags |= status_flags::HAS_POST_USER_INFO;
                }
                if f.clear_cache {
                    flags |= status_flags::CLEAR_CACHE;
                }
                if f.private_stream {
                    flags |= status_flags::PRIVATE_STREAM;
                }
            }
            ClassDetails::Update(f) => {
                if f.do_not_cache {
                    flags |= update_flags::DO_NOT_CACHE;
                }
                if f.do_not_conflate {
                    flags |= update_flags::DO_NOT_CONFLATE;
                }
                if f.do_not_ripple {
                    flags |= update_flags::DO_NOT_RIPPLE;
                }
                if f.seq_num.is_some() {
                    flags |= update_flags::HAS_SEQ_NUM;
                }
                if f.conf_info.is_some() {
                    flags |= update_flags::HAS_CONF_INFO;
                }
                if f.perm_data.is_some() {
                    flags |= update_flags::HAS_PERM_DATA;
                }
                if f.post_user_info.is_some() {
                    flags |= update_flags::HAS_POST_USER_INFO;
                }
            }
            ClassDetails::Close(f) => {
                if f.ack {
                    flags |= close_flags::ACK;
                }
            }
            ClassDetails::Ack(f) => {
                if f.nak_code.is_some() {
                    flags |= ack_flags::HAS_NAK_CODE;
                }
                if f.text.is_some() {
                    flags |= ack_flags::HAS_TEXT;
                }
                if f.seq_num.is_some() {
                    flags |= ack_flags::HAS_SEQ_NUM;
                }
                if f.private_stream {
                    flags |= ack_flags::PRIVATE_STREAM;
                }
            }
            ClassDetails::Generic(f) => {
                if f.seq_num.is_some() {
                    flags |= generic_flags::HAS_SEQ_NUM;
                }
                if f.secondary_seq_num.is_some() {
                    flags |= generic_flags::HAS_SECONDARY_SEQ_NUM;
                }
                if f.part_num.is_some() {
                    flags |= generic_flags::HAS_PART_NUM;
                }
                if f.perm_data.is_some() {
                    flags |= generic_flags::HAS_PERM_DATA;
                }
                if f.complete {
                    flags |= generic_flags::COMPLETE;
                }
                if f.provider_driven {
                    flags |= generic_flags::PROVIDER_DRIVEN;
                }
            }
            ClassDetails::Post(f) => {
                if f.post_id.is_some() {
                    flags |= post_flags::HAS_POST_ID;
                }
                if f.post_user_rights.is_some() {
                    flags |= post_flags::HAS_POST_USER_RIGHTS;
                }
                if f.seq_num.is_some() {
                    flags |= post_flags::HAS_SEQ_NUM;
                }
                if f.part_num.is_some() {
                    flags |= post_flags::HAS_PART_NUM;
                }
                if f.perm_data.is_some() {
                    flags |= post_flags::HAS_PERM_DATA;
                }
                if f.ack_requested {
                    flags |= post_flags::ACK_REQUESTED;
                }
                if f.complete {
                    flags |= post_flags::COMPLETE;
                }
            }
        }
        flags
    }

    fn encode_class_block(&self, w: &mut WireWriter) -> Result<()> {
        match &self.details {
            ClassDetails::Request(f) => {
                if let Some(priority) = f.priority {
                    w.put_u8(priority.class)?;
                    w.put_u16(priority.count)?;
                }
                if let Some(qos) = &f.qos {
                    primitive::encode_qos(w, qos)?;
                }
            }
            ClassDetails::Refresh(f) => {
                primitive::encode_state(w, &f.state)?;
                w.put_buf15(&f.group_id)?;
                if let Some(seq) = f.seq_num {
                    w.put_u32(seq)?;
                }
                if let Some(part) = f.part_num {
                    w.put_u16(part)?;
                }
                if let Some(qos) = &f.qos {
                    primitive::encode_qos(w, qos)?;
                }
                if let Some(perm) = &f.perm_data {
                    w.put_buf15(perm)?;
                }
                if let Some(pui) = f.post_user_info {
                    w.put_u32(pui.user_addr)?;
                    w.put_u32(pui.user_id)?;
                }
            }
            ClassDetails::Status(f) => {
                if let Some(state) = &f.state {
                    primitive::encode_state(w, state)?;
                }
                if let Some(group) = &f.group_id {
                    w.put_buf15(group)?;
                }
                if let Some(perm) = &f.perm_data {
                    w.put_buf15(perm)?;
                }
                if let Some(pui) = f.post_user_info {
                    w.put_u32(pui.user_addr)?;
                    w.put_u32(pui.user_id)?;
                }
            }
            ClassDetails::Update(f) => {
                w.put_u8(f.update_type)?;
                if let Some(seq) = f.seq_num {
                    w.put_u32(seq)?;
                }
                if let Some(conf) = f.conf_info {
                    w.put_u15(conf.count)?;
                    w.put_u16(conf.time)?;
                }
                if let Some(perm) = &f.perm_data {
                    w.put_buf15(perm)?;
                }
                if let Some(pui) = f.post_user_info {
                    w.put_u32(pui.user_addr)?;
                    w.put_u32(pui.user_id)?;
                }
            }
            ClassDetails::Close(_) => {}
            ClassDetails::Ack(f) => {
                w.put_u32(f.ack_id)?;
                if let Some(nak) = f.nak_code {
                    w.put_u8(nak)?;
                }
                if let Some(text) = &f.text {
                    w.put_buf15(text.as_bytes())?;
                }
                if let Some(seq) = f.seq_num {
                    w.put_u32(seq)?;
                }
            }
            ClassDetails::Generic(f) => {
                if let Some(seq) = f.seq_num {
                    w.put_u32(seq)?;
                }
                if let Some(secondary) = f.secondary_seq_num {
                    w.put_u32(secondary)?;
                }
                if let Some(part) = f.part_num {
                    w.put_u16(part)?;
                }
                if let Some(perm) = &f.perm_data {
                    w.put_buf15(perm)?;
                }
            }
            ClassDetails::Post(f) => {
                w.put_u32(f.post_user_info.user_addr)?;
                w.put_u32(f.post_user_info.user_id)?;
                if let Some(post_id) = f.post_id {
                    w.put_u32(post_id)?;
                }
                if let Some(rights) = f.post_user_rights {
                    w.put_u15(rights)?;
                }
                if let Some(seq) = f.seq_num {
                    w.put_u32(seq)?;
                }
                if let Some(part) = f.part_num {
                    w.put_u16(part)?;
                }
                if let Some(perm) = &f.perm_data {
                    w.put_buf15(perm)?;
                }
            }
        }
        Ok(())
    }

    /// Writes the complete message.
    pub fn encode_into(&self, w: &mut WireWriter) -> Result<()> {
        w.put_u8(self.msg_class() as u8)?;
        w.put_u8(self.domain_type)?;
        w.put_i32(self.stream_id)?;
        w.put_u16(self.flags())?;
        w.put_u8(self.payload.container_type.as_u8())?;
        self.encode_class_block(w)?;
        // An implicit key came from outside the wire image and stays there.
        if let Some(key) = self.msg_key.as_ref().filter(|_| !self.implicit_key) {
            key.encode_into(w)?;
        }
        if let Some(header) = &self.extended_header {
            w.put_buf15(header)?;
        }
        w.put_bytes(&self.payload.data)
    }

    /// Encodes into an owned buffer, growing as needed.
    pub fn encode(&self) -> Result<Bytes> {
        encode_with_growth(512, |w| self.encode_into(w))
    }

    /// Decodes a complete message from `raw`. The payload and every other
    /// byte region are zero-copy slices of `raw`.
    pub fn decode(raw: Bytes) -> Result<Self> {
        let mut cur = WireCursor::new(raw);
        let class = MsgClass::from_u8(cur.u8()?)?;
        let domain_type = cur.u8()?;
        let stream_id = cur.i32()?;
        let flags = cur.u16()?;
        let container_type = DataType::from_u8(cur.u8()?)?;
        let details = Self::decode_class_block(class, flags, &mut cur)?;
        let msg_key = if flags & HAS_MSG_KEY != 0 {
            Some(MsgKey::decode(&mut cur)?)
        } else {
            None
        };
        let extended_header = if flags & HAS_EXTENDED_HEADER != 0 {
            Some(cur.buf15()?)
        } else {
            None
        };
        let payload = Payload::new(container_type, cur.take_rest());
        Ok(Self {
            domain_type,
            stream_id,
            msg_key,
            implicit_key: false,
            extended_header,
            payload,
            details,
        })
    }

    fn decode_post_user_info(cur: &mut WireCursor) -> Result<PostUserInfo> {
        Ok(PostUserInfo {
            user_addr: cur.u32()?,
            user_id: cur.u32()?,
        })
    }

    fn decode_class_block(
        class: MsgClass,
        flags: u16,
        cur: &mut WireCursor,
    ) -> Result<ClassDetails> {
        Ok(match class {
            MsgClass::Request => {
                let priority = if flags & request_flags::HAS_PRIORITY != 0 {
                    Some(Priority {
                        class: cur.u8()?,
                        count: cur.u16()?,
                    })
                } else {
                    None
                };
                let qos = (flags & request_flags::HAS_QOS != 0)
                    .then(|| primitive::decode_qos(cur))
                    .transpose()?;
                ClassDetails::Request(RequestFields {
                    streaming: flags & request_flags::STREAMING != 0,
                    pause: flags & request_flags::PAUSE != 0,
                    private_stream: flags & request_flags::PRIVATE_STREAM != 0,
                    has_view: flags & request_flags::HAS_VIEW != 0,
                    priority,
                    qos,
                })
            }
            MsgClass::Refresh => {
                let state = primitive::decode_state(cur)?;
                let group_id = cur.buf15()?;
                let seq_num = (flags & refresh_flags::HAS_SEQ_NUM != 0)
                    .then(|| cur.u32())
                    .transpose()?;
                let part_num = (flags & refresh_flags::HAS_PART_NUM != 0)
                    .then(|| cur.u16())
                    .transpose()?;
                let qos = (flags & refresh_flags::HAS_QOS != 0)
                    .then(|| primitive::decode_qos(cur))
                    .transpose()?;
                let perm_data = (flags & refresh_flags::HAS_PERM_DATA != 0)
                    .then(|| cur.buf15())
                    .transpose()?;
                let post_user_info = (flags & refresh_flags::HAS_POST_USER_INFO != 0)
                    .then(|| Self::decode_post_user_info(cur))
                    .transpose()?;
                ClassDetails::Refresh(RefreshFields {
                    state,
                    group_id,
                    solicited: flags & refresh_flags::SOLICITED != 0,
                    complete: flags & refresh_flags::COMPLETE != 0,
                    clear_cache: flags & refresh_flags::CLEAR_CACHE != 0,
                    do_not_cache: flags & refresh_flags::DO_NOT_CACHE != 0,
                    private_stream: flags & refresh_flags::PRIVATE_STREAM != 0,
                    seq_num,
                    part_num,
                    qos,
                    perm_data,
                    post_user_info,
                })
            }
            MsgClass::Status => {
                let state = (flags & status_flags::HAS_STATE != 0)
                    .then(|| primitive::decode_state(cur))
                    .transpose()?;
                let group_id = (flags & status_flags::HAS_GROUP_ID != 0)
                    .then(|| cur.buf15())
                    .transpose()?;
                let perm_data = (flags & status_flags::HAS_PERM_DATA != 0)
                    .then(|| cur.buf15())
                    .transpose()?;
                let post_user_info = (flags & status_flags::HAS_POST_USER_INFO != 0)
                    .then(|| Self::decode_post_user_info(cur))
                    .transpose()?;
                ClassDetails::Status(StatusFields {
                    state,
                    group_id,
                    clear_cache: flags & status_flags::CLEAR_CACHE != 0,
                    private_stream: flags & status_flags::PRIVATE_STREAM != 0,
                    perm_data,
                    post_user_info,
                })
            }
            MsgClass::Update => {
                let update_type = cur.u8()?;
                let seq_num = (flags & update_flags::HAS_SEQ_NUM != 0)
                    .then(|| cur.u32())
                    .transpose()?;
                let conf_info = if flags & update_flags::HAS_CONF_INFO != 0 {
                    Some(ConflationInfo {
                        count: cur.u15()?,
                        time: cur.u16()?,
                    })
                } else {
                    None
                };
                let perm_data = (flags & update_flags::HAS_PERM_DATA != 0)
                    .then(|| cur.buf15())
                    .transpose()?;
                let post_user_info = (flags & update_flags::HAS_POST_USER_INFO != 0)
                    .then(|| Self::decode_post_user_info(cur))
                    .transpose()?;
                ClassDetails::Update(UpdateFields {
                    update_type,
                    do_not_cache: flags & update_flags::DO_NOT_CACHE != 0,
                    do_not_conflate: flags & update_flags::DO_NOT_CONFLATE != 0,
                    do_not_ripple: flags & update_flags::DO_NOT_RIPPLE != 0,
                    seq_num,
                    conf_info,
                    perm_data,
                    post_user_info,
                })
            }
            MsgClass::Close => ClassDetails::Close(CloseFields {
                ack: flags & close_flags::ACK != 0,
            }),
            MsgClass::Ack => {
                let ack_id = cur.u32()?;
                let nak_code = (flags & ack_flags::HAS_NAK_CODE != 0)
                    .then(|| cur.u8())
                    .transpose()?;
                let text = if flags & ack_flags::HAS_TEXT != 0 {
                    let raw = cur.buf15()?;
                    Some(String::from_utf8(raw.to_vec()).map_err(|_| {
                        OmmError::InvalidData("ack text is not valid UTF-8".into())
                    })?)
                } else {
                    None
                };
                let seq_num = (flags & ack_flags::HAS_SEQ_NUM != 0)
                    .then(|| cur.u32())
                    .transpose()?;
                ClassDetails::Ack(AckFields {
                    ack_id,
                    nak_code,
                    text,
                    seq_num,
                    private_stream: flags & ack_flags::PRIVATE_STREAM != 0,
                })
            }
            MsgClass::Generic => {
                let seq_num = (flags & generic_flags::HAS_SEQ_NUM != 0)
                    .then(|| cur.u32())
                    .transpose()?;
                let secondary_seq_num = (flags & generic_flags::HAS_SECONDARY_SEQ_NUM != 0)
                    .then(|| cur.u32())
                    .transpose()?;
                let part_num = (flags & generic_flags::HAS_PART_NUM != 0)
                    .then(|| cur.u16())
                    .transpose()?;
                let perm_data = (flags & generic_flags::HAS_PERM_DATA != 0)
                    .then(|| cur.buf15())
                    .transpose()?;
                ClassDetails::Generic(GenericFields {
                    seq_num,
                    secondary_seq_num,
                    part_num,
                    perm_data,
                    complete: flags & generic_flags::COMPLETE != 0,
                    provider_driven: flags & generic_flags::PROVIDER_DRIVEN != 0,
                })
            }
            MsgClass::Post => {
                let post_user_info = Self::decode_post_user_info(cur)?;
                let post_id = (flags & post_flags::HAS_POST_ID != 0)
                    .then(|| cur.u32())
                    .transpose()?;
                let post_user_rights = (flags & post_flags::HAS_POST_USER_RIGHTS != 0)
                    .then(|| cur.u15())
                    .transpose()?;
                let seq_num = (flags & post_flags::HAS_SEQ_NUM != 0)
                    .then(|| cur.u32())
                    .transpose()?;
                let part_num = (flags & post_flags::HAS_PART_NUM != 0)
                    .then(|| cur.u16())
                    .transpose()?;
                let perm_data = (flags & post_flags::HAS_PERM_DATA != 0)
                    .then(|| cur.buf15())
                    .transpose()?;
                ClassDetails::Post(PostFields {
                    post_user_info,
                    post_id,
                    post_user_rights,
                    seq_num,
                    part_num,
                    perm_data,
                    ack_requested: flags & post_flags::ACK_REQUESTED != 0,
                    complete: flags & post_flags::COMPLETE != 0,
                })
            }
        })
    }
}

impl std::fmt::Display for Msg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Rendering belongs to the decode side; an encode-side builder has
        // no decoded content to show.
        f.write_str("Decoding of just encoded object in the same application is not supported")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ommwire_core::{DataState, QosRate, QosTimeliness, StreamState};

    #[test]
    fn request_round_trip() {
        let msg = Msg::request(6, 5)
            .with_key(MsgKey {
                name: Some("TRI.N".into()),
                name_type: Some(1),
                service_id: Some(10),
                ..MsgKey::default()
            })
            .with_payload(Payload::no_data());
        let mut out = match &msg.details {
            ClassDetails::Request(f) => f.clone(),
            _ => unreachable!(),
        };
        out.streaming = true;
        out.priority = Some(Priority { class: 1, count: 2 });
        out.qos = Some(Qos::realtime());
        let msg = Msg {
            details: ClassDetails::Request(out),
            ..msg
        };

        let decoded = Msg::decode(msg.encode().unwrap()).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.msg_class(), MsgClass::Request);
        let key = decoded.msg_key.as_ref().unwrap();
        assert_eq!(key.name.as_deref(), Some("TRI.N"));
        assert_eq!(key.service_id, Some(10));
    }

    #[test]
    fn refresh_round_trip_with_all_optionals() {
        let state = State::new(StreamState::Open, DataState::Ok).with_text("All is well");
        let mut fields = RefreshFields::new(state);
        fields.solicited = true;
        fields.complete = true;
        fields.group_id = Bytes::from_static(&[0, 1]);
        fields.seq_num = Some(42);
        fields.part_num = Some(0);
        fields.qos = Some(Qos {
            timeliness: QosTimeliness::Delayed,
            rate: QosRate::TimeConflated,
            dynamic: false,
            time_info: 5656,
            rate_info: 2345,
        });
        fields.perm_data = Some(Bytes::from_static(&[0x03, 0x27]));
        fields.post_user_info = Some(PostUserInfo {
            user_addr: 0x0A000001,
            user_id: 77,
        });
        let msg = Msg {
            details: ClassDetails::Refresh(fields),
            ..Msg::refresh(6, 5, State::new(StreamState::Open, DataState::Ok))
        }
        .with_extended_header(Bytes::from_static(b"EXTENDED"));

        let decoded = Msg::decode(msg.encode().unwrap()).unwrap();
        assert_eq!(decoded, msg);
        match &decoded.details {
            ClassDetails::Refresh(f) => {
                assert_eq!(f.state.status_text, "All is well");
                assert_eq!(f.qos.unwrap().time_info, 5656);
            }
            _ => panic!("wrong class"),
        }
    }

    #[test]
    fn every_class_round_trips_minimally() {
        let state = State::new(StreamState::Closed, DataState::Suspect);
        let msgs = vec![
            Msg::request(6, 1),
            Msg::refresh(6, 2, state.clone()),
            Msg::status(6, 3),
            Msg::update(6, 4, 1),
            Msg::close(6, 5),
            Msg::ack(6, 6, 99),
            Msg::generic(200, 7),
            Msg::post(6, 8, PostUserInfo {
                user_addr: 1,
                user_id: 2,
            }),
        ];
        for msg in msgs {
            let decoded = Msg::decode(msg.encode().unwrap()).unwrap();
            assert_eq!(decoded, msg, "class {:?}", msg.msg_class());
        }
    }

    #[test]
    fn ack_with_nak_round_trips() {
        let mut fields = AckFields {
            ack_id: 12,
            nak_code: Some(nak_code::SYMBOL_UNKNOWN),
            text: Some("unknown symbol".into()),
            seq_num: Some(3),
            private_stream: false,
        };
        fields.private_stream = true;
        let msg = Msg {
            details: ClassDetails::Ack(fields),
            ..Msg::ack(6, 9, 12)
        };
        let decoded = Msg::decode(msg.encode().unwrap()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn key_name_type_without_name_is_rejected_both_ways() {
        let msg = Msg::request(6, 1).with_key(MsgKey {
            name_type: Some(1),
            ..MsgKey::default()
        });
        assert!(matches!(
            msg.encode().unwrap_err(),
            OmmError::InvalidData(_)
        ));

        // Hand-build the same malformed key on the wire.
        let mut raw = Vec::new();
        raw.push(1u8); // request
        raw.push(6u8);
        raw.extend_from_slice(&1i32.to_be_bytes());
        raw.extend_from_slice(&HAS_MSG_KEY.to_be_bytes());
        raw.push(DataType::NoData.as_u8());
        raw.push(key_flags::HAS_NAME_TYPE as u8); // u15 key flags
        raw.push(1u8); // name type with no name
        assert!(matches!(
            Msg::decode(Bytes::from(raw)).unwrap_err(),
            OmmError::InvalidData(_)
        ));
    }

    #[test]
    fn key_attrib_carries_container_payload() {
        let attrib = Payload::new(DataType::ElementList, Bytes::from_static(&[0, 0, 0]));
        let msg = Msg::request(1, 1).with_key(MsgKey {
            name: Some("user".into()),
            attrib: Some(attrib.clone()),
            ..MsgKey::default()
        });
        let decoded = Msg::decode(msg.encode().unwrap()).unwrap();
        assert_eq!(decoded.msg_key.unwrap().attrib.unwrap(), attrib);
    }

    #[test]
    fn builder_display_is_the_unsupported_sentinel() {
        let msg = Msg::close(6, 5);
        assert_eq!(
            msg.to_string(),
            "Decoding of just encoded object in the same application is not supported"
        );
    }

    #[test]
    fn truncated_envelope_is_incomplete() {
        let raw = Msg::ack(6, 6, 99).encode().unwrap();
        let err = Msg::decode(raw.slice(..raw.len() - 2)).unwrap_err();
        assert!(matches!(err, OmmError::Incomplete { .. }));
    }
}
