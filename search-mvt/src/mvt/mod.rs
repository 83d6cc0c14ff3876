//! Serialization of tile features into a Mapbox Vector Tile layer.

mod commands;
mod geometry_encoding;

use geojson::Feature;
use geojson::feature::Id;
use geozero::mvt::{TagsBuilder, TileValue, tile};
use serde_json::Value;

pub use self::geometry_encoding::encode_geometry;

/// Collects features of one layer, deduplicating property keys and values.
pub struct LayerBuilder {
    name: String,
    tag_builder: TagsBuilder<String>,
    features: Vec<tile::Feature>,
    extent: u32,
}

impl LayerBuilder {
    #[must_use]
    pub fn new(name: String, extent: u32) -> Self {
        Self {
            name,
            tag_builder: TagsBuilder::new(),
            features: Vec::new(),
            extent,
        }
    }

    /// Adds a feature whose geometry is in tile units.
    /// Features without an encodable geometry are skipped.
    pub fn add_feature(&mut self, feature: &Feature) {
        let Some((geom_type, geometry)) = feature
            .geometry
            .as_ref()
            .and_then(|geometry| encode_geometry(&geometry.value))
        else {
            return;
        };

        let mut tags = Vec::new();
        if let Some(properties) = &feature.properties {
            for (key, value) in properties.iter() {
                let Some(value) = tile_value_from_json(value) else {
                    continue;
                };
                let (key_idx, val_idx) = self.tag_builder.insert(key.clone(), value);
                tags.push(key_idx);
                tags.push(val_idx);
            }
        }

        self.features.push(tile::Feature {
            id: feature_id(feature.id.as_ref()),
            tags,
            r#type: Some(geom_type as i32),
            geometry,
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[must_use]
    pub fn build(self) -> tile::Layer {
        let (keys, values) = self.tag_builder.into_tags();
        let values = values.into_iter().map(Into::into).collect();
        tile::Layer {
            name: self.name,
            features: self.features,
            version: 2,
            extent: Some(self.extent),
            keys,
            values,
        }
    }
}

/// Only non-negative integer ids fit the MVT id field.
fn feature_id(id: Option<&Id>) -> Option<u64> {
    match id? {
        Id::Number(n) => n.as_u64(),
        Id::String(_) => None,
    }
}

/// Converts a property value. `null` has no MVT counterpart and yields `None`.
fn tile_value_from_json(value: &Value) -> Option<TileValue> {
    Some(match value {
        Value::Null => return None,
        Value::String(s) => TileValue::Str(s.clone()),
        Value::Bool(b) => TileValue::Bool(*b),
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                TileValue::Uint(v)
            } else if let Some(v) = n.as_i64() {
                TileValue::Sint(v)
            } else {
                let v = n.as_f64()?;
                if v.fract() != 0.0 || !v.is_finite() {
                    TileValue::Double(v)
                } else if v < 0.0 {
                    TileValue::Sint(v as i64)
                } else {
                    TileValue::Uint(v as u64)
                }
            }
        }
        Value::Array(_) | Value::Object(_) => TileValue::Str(value.to_string()),
    })
}
