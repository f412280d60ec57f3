//! # ommwire-core
//!
//! Core building blocks for the ommwire OMM/RWF codec:
//! - [`buffer`] - sequential wire cursors and capacity-capped writers
//! - [`error`] - the [`OmmError`](error::OmmError) taxonomy
//! - [`types`] - OMM primitive types (Real, Date, Time, Qos, State, ...)
//! - [`primitive`] - encode/decode for every scalar wire type

pub mod buffer;
pub mod error;
pub mod primitive;
pub mod types;

pub use buffer::{encode_with_growth, WireCursor, WireWriter};
pub use error::{OmmError, Result};
pub use types::{
    DataState, DataType, Date, DateTime, Qos, QosRate, QosTimeliness, Real, RealHint, State,
    StreamState, Time, WireVersion,
};
