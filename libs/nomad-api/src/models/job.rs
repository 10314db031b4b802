//! Partially typed Nomad job document
//!
//! A document is decoded into a generic map of raw field values first; the
//! known fields are then removed from that map and decoded into typed slots.
//! Encoding merges both back together, so every field the deployer does not
//! know about is written back exactly as it was read.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::{self, DeserializeOwned};
use serde::ser;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::{to_raw_value, RawValue};

use super::DocumentError;

pub const META_FIELD: &str = "Meta";
pub const VERSION_FIELD: &str = "VERSION";
pub const MODIFY_INDEX_FIELD: &str = "JobModifyIndex";

/// Undecoded field values keyed by field name
pub type RawFields = BTreeMap<String, Box<RawValue>>;

/// A typed field taken out of a raw JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Slot<T> {
    /// The key does not appear in the object
    #[default]
    Absent,
    /// The key appears with a JSON `null`
    Null,
    /// The key appears with a value
    Value(T),
}

impl<T> Slot<T> {
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Slot::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_value_mut(&mut self) -> Option<&mut T> {
        match self {
            Slot::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }
}

impl<T: DeserializeOwned> Slot<T> {
    /// Remove `field` from `fields` and decode it into a slot
    fn take(fields: &mut RawFields, field: &'static str) -> Result<Self, DocumentError> {
        let Some(raw) = fields.remove(field) else {
            return Ok(Slot::Absent);
        };

        let value: Option<T> = serde_json::from_str(raw.get())
            .map_err(|source| DocumentError::FieldShape { field, source })?;

        Ok(value.map_or(Slot::Null, Slot::Value))
    }
}

impl<T: Serialize> Slot<T> {
    /// Write the slot back into `fields`. Absent slots stay absent.
    fn put(&self, fields: &mut RawFields, field: &'static str) -> Result<(), DocumentError> {
        let raw = match self {
            Slot::Absent => return Ok(()),
            Slot::Null => to_raw_value(&()),
            Slot::Value(value) => to_raw_value(value),
        }
        .map_err(DocumentError::Encode)?;

        fields.insert(field.to_string(), raw);
        Ok(())
    }
}

/// The job's `Meta` object
#[derive(Debug, Clone, Default)]
pub struct JobMeta {
    version: Slot<String>,
    other: RawFields,
}

impl JobMeta {
    fn from_fields(mut fields: RawFields) -> Result<Self, DocumentError> {
        let version = Slot::take(&mut fields, VERSION_FIELD)?;
        Ok(Self {
            version,
            other: fields,
        })
    }

    fn to_fields(&self) -> Result<RawFields, DocumentError> {
        let mut fields = self.other.clone();
        self.version.put(&mut fields, VERSION_FIELD)?;
        Ok(fields)
    }

    pub fn version(&self) -> &Slot<String> {
        &self.version
    }

    /// Meta keys other than the version marker
    pub fn unknown_fields(&self) -> &RawFields {
        &self.other
    }
}

impl<'de> Deserialize<'de> for JobMeta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = RawFields::deserialize(deserializer)?;
        Self::from_fields(fields).map_err(de::Error::custom)
    }
}

impl Serialize for JobMeta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_fields()
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }
}

/// A Nomad job definition, as returned by `GET /v1/job/:job_id`
#[derive(Debug, Clone, Default)]
pub struct JobDocument {
    meta: Slot<JobMeta>,
    modify_index: Slot<u64>,
    other: RawFields,
}

impl JobDocument {
    /// Decode a job document. Fails on malformed JSON, on anything but a JSON
    /// object, and on known fields that do not have their declared shape.
    pub fn decode(bytes: &[u8]) -> Result<Self, DocumentError> {
        let fields: RawFields = serde_json::from_slice(bytes).map_err(DocumentError::Malformed)?;
        Self::from_fields(fields)
    }

    /// Encode the document, merging typed fields with the untouched remainder
    pub fn encode(&self) -> Result<Vec<u8>, DocumentError> {
        let fields = self.to_fields()?;
        serde_json::to_vec(&fields).map_err(DocumentError::Encode)
    }

    fn from_fields(mut fields: RawFields) -> Result<Self, DocumentError> {
        let meta = Slot::take(&mut fields, META_FIELD)?;
        let modify_index = Slot::take(&mut fields, MODIFY_INDEX_FIELD)?;

        Ok(Self {
            meta,
            modify_index,
            other: fields,
        })
    }

    fn to_fields(&self) -> Result<RawFields, DocumentError> {
        let mut fields = self.other.clone();
        self.meta.put(&mut fields, META_FIELD)?;
        self.modify_index.put(&mut fields, MODIFY_INDEX_FIELD)?;
        Ok(fields)
    }

    /// The `Meta.VERSION` marker, if the job carries one
    pub fn version(&self) -> Option<&str> {
        self.meta
            .as_value()
            .and_then(|meta| meta.version.as_value())
            .map(String::as_str)
    }

    /// Overwrite `Meta.VERSION`.
    ///
    /// The marker must already be present in the document; this never adds
    /// a marker to a job that did not carry one.
    pub fn set_version(&mut self, value: impl Into<String>) -> Result<(), DocumentError> {
        let meta = self
            .meta
            .as_value_mut()
            .ok_or(DocumentError::AbsentField(VERSION_FIELD))?;

        if meta.version.is_absent() {
            return Err(DocumentError::AbsentField(VERSION_FIELD));
        }

        meta.version = Slot::Value(value.into());
        Ok(())
    }

    /// The `JobModifyIndex` observed when the document was decoded
    pub fn modify_index(&self) -> Option<u64> {
        self.modify_index.as_value().copied()
    }

    pub fn meta(&self) -> &Slot<JobMeta> {
        &self.meta
    }

    /// Top-level fields the deployer does not interpret
    pub fn unknown_fields(&self) -> &RawFields {
        &self.other
    }

    /// Names of every top-level field this document will encode
    pub fn field_names(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self.other.keys().map(String::as_str).collect();
        if !self.meta.is_absent() {
            names.insert(META_FIELD);
        }
        if !self.modify_index.is_absent() {
            names.insert(MODIFY_INDEX_FIELD);
        }
        names
    }
}

impl<'de> Deserialize<'de> for JobDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = RawFields::deserialize(deserializer)?;
        Self::from_fields(fields).map_err(de::Error::custom)
    }
}

impl Serialize for JobDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_fields()
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }
}
