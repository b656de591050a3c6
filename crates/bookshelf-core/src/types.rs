//! Shared resource plumbing.
//!
//! Every record kind served by the API implements [`Resource`], which ties
//! the record type to its collection name and to the label used in
//! response messages.

use std::fmt;

use bson::oid::ObjectId;
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::Serialize;

/// A record kind stored in its own collection.
pub trait Resource: DeserializeOwned + Serialize + Send + Sync + 'static {
    /// Collection holding records of this kind.
    const COLLECTION: &'static str;

    /// Capitalised singular name, e.g. `"Book"`.
    const LABEL: &'static str;
}

/// Parse a client-supplied identifier into a store key.
///
/// Returns `None` unless the input is a 24-character hex ObjectId.
pub fn parse_record_id(raw: &str) -> Option<ObjectId> {
    ObjectId::parse_str(raw).ok()
}

/// Deserialize an optional integer stored as any BSON number.
///
/// Documents written by other drivers may hold counts as `Int32`, `Int64`
/// or an integral `Double` (`3.0`). A double with a fractional part is
/// rejected.
pub fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientInt)
}

struct LenientInt;

impl<'de> Visitor<'de> for LenientInt {
    type Value = Option<i64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or an integral floating point number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(Some)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
            Ok(Some(v as i64))
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}
