//! Error types for ommwire codec operations.

use thiserror::Error;

use crate::types::DataType;

/// Core error type for all encode, decode and clone operations.
///
/// Every error is synchronous: it is returned from the call that detected
/// it, never deferred.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OmmError {
    /// The target buffer lacks capacity for the encode operation.
    ///
    /// This is not a data error; the caller retries with a larger buffer
    /// (see [`encode_with_growth`](crate::buffer::encode_with_growth)).
    #[error("buffer too small: needed {needed} bytes, capacity {capacity} bytes")]
    BufferTooSmall {
        /// Total bytes the operation would have required.
        needed: usize,
        /// Capacity of the buffer that was handed in.
        capacity: usize,
    },

    /// The source buffer ended before the value was fully read.
    #[error("incomplete data: needed {needed} bytes, {remaining} remaining")]
    Incomplete {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// Encode-time validation failure; no bytes were written.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// An accessor was called against a differently-typed wire value.
    #[error("type mismatch: expected {expected}, actual {actual}")]
    TypeMismatch {
        /// Type the accessor requested.
        expected: DataType,
        /// Type actually present on the wire.
        actual: DataType,
    },

    /// A container accessor was called against a primitive-typed wire
    /// value.
    #[error("expected a container type, actual {0}")]
    NotAContainer(DataType),

    /// An accessor was called for an optional field whose presence flag
    /// is not set.
    #[error("field not set: {0}")]
    FieldNotSet(&'static str),

    /// An accessor was called on a structurally-present entry that
    /// explicitly carries no value.
    #[error("blank value: {0}")]
    BlankValue(&'static str),

    /// A type tag outside the known OMM set was encountered.
    #[error("unknown data type tag: {0}")]
    UnknownType(u8),

    /// A decode-side view was used before any buffer was bound to it.
    #[error("no encoded data is bound to this view")]
    NotBound,

    /// Clone was attempted on an object with no backing wire buffer.
    #[error("{0}")]
    CloneFailed(String),
}

/// Result type alias for ommwire operations.
pub type Result<T> = std::result::Result<T, OmmError>;
