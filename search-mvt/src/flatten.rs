//! Flattening of search hits into single-level property bags.

use geojson::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

/// Property key holding the hit's index name.
pub const INDEX_KEY: &str = "_index";
/// Property key holding the hit's document id.
pub const ID_KEY: &str = "_id";

/// A document returned by the search backend.
///
/// `fields` holds backend-computed values, each usually wrapped in a single-element array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<JsonObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<JsonObject>,
}

impl Hit {
    /// A hit with neither `_source` nor `fields` carries no document at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.fields.is_none()
    }
}

/// Dotted-path keys mapped to scalar or array values.
///
/// Inserting an existing key replaces its value and returns the previous one,
/// so the last write always wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatProperties(JsonObject);

impl FlatProperties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        let previous = self.0.insert(key, value);
        if previous.is_some() {
            trace!("Flattened key was overwritten by a later value");
        }
        previous
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_inner(self) -> JsonObject {
        self.0
    }
}

impl From<FlatProperties> for JsonObject {
    fn from(props: FlatProperties) -> Self {
        props.0
    }
}

/// Flattens `hit` into dotted-path properties.
///
/// The value found at `geometry_field` is moved over untouched, everything else in `_source`
/// is flattened down to its scalar and array leaves. Values from `fields` are unwrapped from
/// their single-element arrays and override `_source` values. Finally `_index` and `_id`
/// override whatever is stored under the same keys; when the hit has no such metadata, the
/// key is cleared instead.
///
/// An absent hit, or a hit with neither `_source` nor `fields`, produces no properties at all.
#[must_use]
pub fn flatten_hit(geometry_field: &str, hit: Option<Hit>) -> FlatProperties {
    let mut flat = FlatProperties::new();
    let Some(hit) = hit.filter(|hit| !hit.is_empty()) else {
        return flat;
    };

    flatten_source(&mut flat, "", hit.source.unwrap_or_default(), geometry_field);
    if let Some(fields) = hit.fields {
        flatten_fields(&mut flat, fields);
    }

    // metadata keys never come from the document, even when the hit lacks them
    for (key, value) in [(INDEX_KEY, hit.index), (ID_KEY, hit.id)] {
        match value {
            Some(value) => flat.insert(key, Value::String(value)),
            None => flat.remove(key),
        };
    }
    flat
}

fn flatten_source(flat: &mut FlatProperties, path: &str, properties: JsonObject, geometry_field: &str) {
    for (key, value) in properties {
        let new_key = if path.is_empty() {
            key
        } else {
            format!("{path}.{key}")
        };
        match value {
            value if new_key == geometry_field => {
                flat.insert(new_key, value);
            }
            Value::Object(nested) => flatten_source(flat, &new_key, nested, geometry_field),
            value => {
                flat.insert(new_key, value);
            }
        }
    }
}

fn flatten_fields(flat: &mut FlatProperties, fields: JsonObject) {
    for (key, value) in fields {
        match value {
            Value::Array(values) => match values.into_iter().next() {
                Some(first) => {
                    flat.insert(key, first);
                }
                None => {
                    flat.remove(&key);
                }
            },
            value => {
                flat.insert(key, value);
            }
        }
    }
}
