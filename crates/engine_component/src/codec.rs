//! Versioned binary records for persisting component fields.
//!
//! Records use MessagePack via `rmp-serde`. Each [`ComponentRecord`] names
//! the component type and the format version it was written with, so a
//! reader can reject data written by a newer build.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::error::CodecError;

/// Encode a value to MessagePack bytes.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialisation fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    rmp_serde::to_vec_named(value).map_err(CodecError::Encode)
}

/// Decode a value from MessagePack bytes.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if deserialisation fails.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    rmp_serde::from_slice(bytes).map_err(CodecError::Decode)
}

/// The persisted fields of one component instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// [`Component::type_name`] of the writer.
    pub type_name: String,
    /// [`Component::type_version`] of the writer.
    pub version: u32,
    /// MessagePack-encoded fields.
    pub data: Vec<u8>,
}

impl ComponentRecord {
    /// Write `fields` as a record for component type `C`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if the fields cannot be serialised.
    pub fn write<C: Component, S: Serialize>(fields: &S) -> Result<Self, CodecError> {
        Ok(Self {
            type_name: C::type_name().to_string(),
            version: C::type_version(),
            data: encode(fields)?,
        })
    }

    /// Read the fields back as component type `C`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TypeMismatch`] if the record belongs to another
    /// type, [`CodecError::UnsupportedVersion`] if it was written by a newer
    /// version, or [`CodecError::Decode`] if the payload is malformed.
    pub fn read<C: Component, S: DeserializeOwned>(&self) -> Result<S, CodecError> {
        if self.type_name != C::type_name() {
            return Err(CodecError::TypeMismatch {
                expected: C::type_name().to_string(),
                found: self.type_name.clone(),
            });
        }
        if self.version > C::type_version() {
            return Err(CodecError::UnsupportedVersion {
                type_name: self.type_name.clone(),
                found: self.version,
                supported: C::type_version(),
            });
        }
        decode(&self.data)
    }

    /// Serialise the whole record, header included.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if serialisation fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        encode(self)
    }

    /// Parse a record previously produced by [`ComponentRecord::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if the bytes are not a record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        decode(bytes)
    }
}
