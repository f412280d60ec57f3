//! Field dictionary lookup interface.
//!
//! The codec never needs a dictionary to decode (entries are
//! self-describing); rendering uses one, when supplied, to resolve numeric
//! field ids into names and degrades to id-only output without it.
//! Dictionary file loading and parsing live outside this crate.

use std::collections::HashMap;

use ommwire_core::DataType;

/// Metadata for a single field id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Acronym, e.g. `BID`.
    pub name: String,
    /// Expected wire type for the field.
    pub data_type: DataType,
}

/// Read-only field-id metadata lookup.
///
/// Passed as an explicit borrowed reference where needed; there is no
/// process-global dictionary.
pub trait FieldDictionary {
    /// Returns metadata for `field_id`, or `None` when unknown.
    fn field_info(&self, field_id: i16) -> Option<&FieldInfo>;
}

/// HashMap-backed dictionary, sufficient for tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct SimpleDictionary {
    fields: HashMap<i16, FieldInfo>,
}

impl SimpleDictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a field definition, replacing any previous one.
    pub fn insert(&mut self, field_id: i16, name: impl Into<String>, data_type: DataType) {
        self.fields.insert(
            field_id,
            FieldInfo {
                name: name.into(),
                data_type,
            },
        );
    }

    /// Number of registered fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when no fields are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldDictionary for SimpleDictionary {
    fn field_info(&self, field_id: i16) -> Option<&FieldInfo> {
        self.fields.get(&field_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_hits_and_misses() {
        let mut dict = SimpleDictionary::new();
        dict.insert(22, "BID", DataType::Real);
        dict.insert(25, "ASK", DataType::Real);

        let info = dict.field_info(22).unwrap();
        assert_eq!(info.name, "BID");
        assert_eq!(info.data_type, DataType::Real);
        assert!(dict.field_info(9999).is_none());
        assert_eq!(dict.len(), 2);
    }
}
