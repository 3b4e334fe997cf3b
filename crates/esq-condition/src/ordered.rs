//! Order-preserving map deserialization.
//!
//! JSON objects in a condition carry meaning in their key order (field
//! declaration order decides clause and sort order), so they are read into a
//! `Vec` of pairs instead of a hash map.

use std::{fmt, marker::PhantomData};

use serde::{
    Deserialize, Deserializer,
    de::{Error, MapAccess, Visitor},
};

/// Visitor collecting map entries in document order.
struct OrderedVisitor<V> {
    /// Marker for the value type.
    marker: PhantomData<V>,
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
    type Value = Vec<(String, V)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map keyed by field name")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, V)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            if entries.iter().any(|(existing, _)| *existing == key) {
                return Err(A::Error::custom(format!("duplicate field: {key}")));
            }
            entries.push((key, value));
        }
        Ok(entries)
    }
}

/// Deserializes a map into entries, keeping key order and rejecting duplicates.
pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    deserializer.deserialize_map(OrderedVisitor {
        marker: PhantomData,
    })
}
