//! # ommwire
//!
//! Open Message Model (OMM) / RWF binary codec for market data.
//!
//! ommwire encodes and decodes the message and container model used by
//! real-time market data feeds: eight message classes over a recursive set
//! of containers (field lists, element lists, maps, vectors, series, filter
//! lists and primitive arrays) with lazy, zero-copy decoding.
//!
//! ## Features
//!
//! - **Zero-copy decoding** - views slice the source buffer; nothing is
//!   parsed until asked for
//! - **Rebindable views** - decode-side objects are pooled and rebound per
//!   message, not reallocated
//! - **Caller-driven buffer growth** - encoding never grows a buffer behind
//!   the caller's back
//! - **Per-entry error isolation** - one malformed entry never poisons the
//!   rest of its container
//! - **Independent clones** - decoded messages can be copied, edited and
//!   re-encoded without aliasing the source buffer
//!
//! ## Quick Start
//!
//! ```
//! use ommwire::prelude::*;
//!
//! // Encode a market price refresh.
//! let mut fields = FieldList::new();
//! fields.add(22, Value::Real(Real::new(2995, RealHint::ExponentNeg2)));
//! let state = State::new(StreamState::Open, DataState::Ok).with_text("OK");
//! let raw = Msg::refresh(6, 5, state)
//!     .with_key(MsgKey::with_name("TRI.N"))
//!     .with_payload(Payload::new(DataType::FieldList, fields.encode()?))
//!     .encode()?;
//!
//! // Decode it through a rebindable view.
//! let mut view = MsgView::new();
//! view.bind(raw)?;
//! assert_eq!(view.msg_class()?, MsgClass::Refresh);
//! for entry in view.field_list()?.iter() {
//!     let entry = entry?;
//!     println!("{} = {}", entry.field_id(), entry.load());
//! }
//! # Ok::<(), OmmError>(())
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - wire buffers, primitive types and the scalar codec
//! - [`codec`] - containers, messages, views, rendering and cloning

pub mod prelude;

/// Wire buffers, primitive types and the scalar codec.
pub mod core {
    pub use ommwire_core::*;
}

/// Containers, messages, views, rendering and cloning.
pub mod codec {
    pub use ommwire_codec::*;
}
