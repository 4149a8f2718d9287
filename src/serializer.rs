//! Pluggable deep-copy strategy for reference-typed payloads.
//!
//! The default deep-copy strategy used by [`crate::Queue`] is `T::clone`,
//! which is correct value semantics for owned payloads. A [`Serializer`] is
//! an opt-in alternative for payloads that alias shared state through a
//! `Clone` impl that doesn't actually deep-copy (e.g. `Arc<Mutex<..>>`
//! fields) — the serializer's round-trip guarantees the consumer can't
//! observe a producer's later mutation, and vice versa.

use crate::error::QueueError;

/// Byte-oriented deep-copy strategy for a payload type.
pub trait Serializer<T>: Send + Sync {
    /// Encode a value to bytes.
    fn serialize(&self, value: &T) -> Result<Vec<u8>, QueueError>;

    /// Decode a value from bytes previously produced by [`Self::serialize`].
    fn deserialize(&self, bytes: &[u8]) -> Result<T, QueueError>;

    /// Round-trip `value` through [`Self::serialize`]/[`Self::deserialize`]
    /// to produce an aliasing-free deep copy.
    fn deep_copy(&self, value: &T) -> Result<T, QueueError> {
        let bytes = self.serialize(value)?;
        self.deserialize(&bytes)
    }
}

/// A [`Serializer`] backed by `serde_json`.
///
/// Requires the `json-serializer` feature.
#[cfg(feature = "json-serializer")]
pub struct JsonSerializer;

#[cfg(feature = "json-serializer")]
impl<T> Serializer<T> for JsonSerializer
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    fn serialize(&self, value: &T) -> Result<Vec<u8>, QueueError> {
        serde_json::to_vec(value).map_err(|e| QueueError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<T, QueueError> {
        serde_json::from_slice(bytes).map_err(|e| QueueError::Serialization(e.to_string()))
    }
}
