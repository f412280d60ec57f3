//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use ommwire::prelude::*;
//! ```

// Core types
pub use ommwire_core::{
    encode_with_growth, DataState, DataType, Date, DateTime, OmmError, Qos, QosRate,
    QosTimeliness, Real, RealHint, Result, State, StreamState, Time, WireCursor, WireVersion,
    WireWriter,
};

// Container types
pub use ommwire_codec::{
    ArrayView, ElementList, ElementListView, FieldList, FieldListView, FilterAction, FilterList,
    FilterListView, Map, MapAction, MapView, OmmArray, Series, SeriesView, Vector, VectorAction,
    VectorView,
};

// Message types
pub use ommwire_codec::{
    clone_msg, ClassDetails, DataCode, EntryData, Load, Msg, MsgClass, MsgKey, MsgView, Payload,
    PostUserInfo, Priority, Value,
};

// Dictionary and rendering
pub use ommwire_codec::{render_msg, render_msg_with, FieldDictionary, FieldInfo, SimpleDictionary};
