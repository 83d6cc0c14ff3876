//! Conversion of search hits into `GeoJSON` features.

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::flatten::{Hit, ID_KEY, INDEX_KEY, flatten_hit};
use crate::{MvtError, MvtResult};

/// How the backend indexes the geometry field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoFieldType {
    GeoPoint,
    GeoShape,
}

/// Flattens every hit and turns its geometry field into one feature per geometry.
///
/// The geometry value is removed from the properties. A hit whose geometry cannot be read is
/// logged and skipped. Feature ids are `{_index}:{_id}:{n}`, since `_id` alone is not unique
/// across indices.
#[must_use]
pub fn hits_to_feature_collection<I>(
    hits: I,
    geometry_field: &str,
    geo_field_type: GeoFieldType,
) -> FeatureCollection
where
    I: IntoIterator<Item = Hit>,
{
    let mut features = Vec::new();
    for hit in hits {
        let mut properties = flatten_hit(geometry_field, Some(hit));
        let value = properties.remove(geometry_field).unwrap_or(Value::Null);

        let mut geometries = Vec::new();
        let converted = match geo_field_type {
            GeoFieldType::GeoPoint => geo_point_to_geometry(geometry_field, value, &mut geometries),
            GeoFieldType::GeoShape => geo_shape_to_geometry(geometry_field, value, &mut geometries),
        };
        if let Err(e) = converted {
            warn!("Skipping hit {:?}: {e}", properties.get(ID_KEY));
            continue;
        }

        let prefix = format!(
            "{}:{}",
            string_property(properties.get(INDEX_KEY)),
            string_property(properties.get(ID_KEY))
        );
        let properties = properties.into_inner();
        for (idx, geometry) in geometries.into_iter().enumerate() {
            features.push(Feature {
                bbox: None,
                geometry: Some(geometry),
                id: Some(Id::String(format!("{prefix}:{idx}"))),
                properties: Some(properties.clone()),
                foreign_members: None,
            });
        }
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn string_property(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// Reads a `geo_point` value: `{lat, lon}`, `"lat,lon"`, `[lon, lat]`, or an array of those.
pub fn geo_point_to_geometry(field: &str, value: Value, out: &mut Vec<Geometry>) -> MvtResult<()> {
    match value {
        Value::Null => Ok(()),
        Value::Array(items) => {
            if let [Value::Number(lon), Value::Number(lat)] = items.as_slice() {
                out.push(point(number(field, lon)?, number(field, lat)?));
                return Ok(());
            }
            items
                .into_iter()
                .try_for_each(|item| geo_point_to_geometry(field, item, out))
        }
        Value::String(s) => {
            let Some((lat, lon)) = s.split_once(',') else {
                return Err(invalid(field, format!("unsupported point string {s:?}")));
            };
            let parse = |v: &str| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|e| invalid(field, format!("{v:?} is not a number: {e}")))
            };
            out.push(point(parse(lon)?, parse(lat)?));
            Ok(())
        }
        Value::Object(obj) => {
            if obj.contains_key("type") {
                return geo_shape_to_geometry(field, Value::Object(obj), out);
            }
            match (obj.get("lon"), obj.get("lat")) {
                (Some(Value::Number(lon)), Some(Value::Number(lat))) => {
                    out.push(point(number(field, lon)?, number(field, lat)?));
                    Ok(())
                }
                _ => Err(invalid(field, "point object needs numeric lat and lon")),
            }
        }
        other => Err(invalid(field, format!("unsupported point value {other}"))),
    }
}

/// Reads a `geo_shape` value in `GeoJSON` form, with `envelope` support, or an array of those.
pub fn geo_shape_to_geometry(field: &str, value: Value, out: &mut Vec<Geometry>) -> MvtResult<()> {
    let mut obj = match value {
        Value::Null => return Ok(()),
        Value::Array(items) => {
            return items
                .into_iter()
                .try_for_each(|item| geo_shape_to_geometry(field, item, out));
        }
        Value::Object(obj) => obj,
        other => return Err(invalid(field, format!("unsupported shape value {other}"))),
    };

    let shape_type = match obj.get("type") {
        Some(Value::String(t)) => t.to_ascii_lowercase(),
        _ => return Err(invalid(field, "shape has no type")),
    };

    if shape_type == "geometrycollection" {
        let geometries = obj.remove("geometries").unwrap_or(Value::Null);
        return match geometries {
            Value::Array(items) => items
                .into_iter()
                .try_for_each(|item| geo_shape_to_geometry(field, item, out)),
            _ => Err(invalid(field, "geometrycollection has no geometries")),
        };
    }

    let coordinates = obj.remove("coordinates").unwrap_or(Value::Null);
    let value = match shape_type.as_str() {
        "point" => GeoValue::Point(coords(field, coordinates)?),
        "multipoint" => GeoValue::MultiPoint(coords(field, coordinates)?),
        "linestring" => GeoValue::LineString(coords(field, coordinates)?),
        "multilinestring" => GeoValue::MultiLineString(coords(field, coordinates)?),
        "polygon" => GeoValue::Polygon(coords(field, coordinates)?),
        "multipolygon" => GeoValue::MultiPolygon(coords(field, coordinates)?),
        "envelope" => envelope_to_polygon(field, coords(field, coordinates)?)?,
        other => return Err(invalid(field, format!("unsupported shape type {other:?}"))),
    };
    out.push(Geometry::new(value));
    Ok(())
}

/// `[[min_lon, max_lat], [max_lon, min_lat]]` as a closed rectangle.
fn envelope_to_polygon(field: &str, corners: Vec<Vec<f64>>) -> MvtResult<GeoValue> {
    let [top_left, bottom_right] = corners.as_slice() else {
        return Err(invalid(field, "envelope needs exactly 2 corners"));
    };
    let (&[left, top], &[right, bottom]) = (top_left.as_slice(), bottom_right.as_slice()) else {
        return Err(invalid(field, "envelope corners need 2 coordinates"));
    };
    Ok(GeoValue::Polygon(vec![vec![
        vec![left, top],
        vec![left, bottom],
        vec![right, bottom],
        vec![right, top],
        vec![left, top],
    ]]))
}

fn coords<T: DeserializeOwned>(field: &str, coordinates: Value) -> MvtResult<T> {
    serde_json::from_value(coordinates).map_err(|e| invalid(field, format!("bad coordinates: {e}")))
}

fn number(field: &str, n: &serde_json::Number) -> MvtResult<f64> {
    n.as_f64()
        .ok_or_else(|| invalid(field, format!("{n} is not a float")))
}

fn point(lon: f64, lat: f64) -> Geometry {
    Geometry::new(GeoValue::Point(vec![lon, lat]))
}

fn invalid(field: &str, reason: impl Into<String>) -> MvtError {
    MvtError::InvalidHitGeometry {
        field: field.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use tracing_test::traced_test;

    use super::*;

    fn points(value: Value) -> Vec<GeoValue> {
        let mut out = Vec::new();
        geo_point_to_geometry("loc", value, &mut out).unwrap();
        out.into_iter().map(|g| g.value).collect()
    }

    fn shapes(value: Value) -> MvtResult<Vec<GeoValue>> {
        let mut out = Vec::new();
        geo_shape_to_geometry("shape", value, &mut out)?;
        Ok(out.into_iter().map(|g| g.value).collect())
    }

    #[rstest]
    #[case(json!({"lat": 10.5, "lon": -3}))]
    #[case(json!("10.5, -3"))]
    #[case(json!([-3, 10.5]))]
    #[case(json!({"type": "Point", "coordinates": [-3, 10.5]}))]
    fn test_geo_point_formats(#[case] value: Value) {
        assert_eq!(points(value), vec![GeoValue::Point(vec![-3.0, 10.5])]);
    }

    #[test]
    fn test_geo_point_array_of_points() {
        let value = json!([{"lat": 1, "lon": 2}, "3,4", [5, 6]]);
        assert_eq!(
            points(value),
            vec![
                GeoValue::Point(vec![2.0, 1.0]),
                GeoValue::Point(vec![4.0, 3.0]),
                GeoValue::Point(vec![5.0, 6.0]),
            ]
        );
    }

    #[test]
    fn test_geo_point_null() {
        assert!(points(Value::Null).is_empty());
    }

    #[test]
    fn test_geo_point_geohash_is_rejected() {
        let mut out = Vec::new();
        let err = geo_point_to_geometry("loc", json!("u4pruydqqvj"), &mut out);
        assert!(matches!(err, Err(MvtError::InvalidHitGeometry { .. })));
    }

    #[test]
    fn test_geo_shape_case_insensitive() {
        let value = json!({"type": "linestring", "coordinates": [[0, 0], [1, 1]]});
        assert_eq!(
            shapes(value).unwrap(),
            vec![GeoValue::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]])]
        );
    }

    #[test]
    fn test_geo_shape_envelope() {
        let value = json!({"type": "envelope", "coordinates": [[-10, 20], [30, -5]]});
        assert_eq!(
            shapes(value).unwrap(),
            vec![GeoValue::Polygon(vec![vec![
                vec![-10.0, 20.0],
                vec![-10.0, -5.0],
                vec![30.0, -5.0],
                vec![30.0, 20.0],
                vec![-10.0, 20.0],
            ]])]
        );
    }

    #[test]
    fn test_geo_shape_collection_is_expanded() {
        let value = json!({
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Point", "coordinates": [1, 2]},
                {"type": "MultiPoint", "coordinates": [[3, 4], [5, 6]]}
            ]
        });
        let out = shapes(value).unwrap();
        assert_eq!(out.len(), 2);
        assert!(matches!(out[1], GeoValue::MultiPoint(_)));
    }

    #[rstest]
    #[case(json!({"type": "circle", "coordinates": [1, 2], "radius": "1km"}))]
    #[case(json!("POINT (1 2)"))]
    #[case(json!({"coordinates": [1, 2]}))]
    #[case(json!({"type": "polygon", "coordinates": "oops"}))]
    fn test_geo_shape_rejected(#[case] value: Value) {
        assert!(shapes(value).is_err());
    }

    #[test]
    #[traced_test]
    fn test_hits_to_feature_collection() {
        let hits: Vec<Hit> = serde_json::from_value(json!([
            {
                "_index": "poi",
                "_id": "1",
                "_source": {"name": "a", "loc": [[1, 2], [3, 4]]}
            },
            {
                "_index": "poi",
                "_id": "2",
                "_source": {"name": "b", "loc": "not a point"}
            },
            {
                "_index": "poi",
                "_id": "3",
                "_source": {"name": "c"}
            }
        ]))
        .unwrap();

        let fc = hits_to_feature_collection(hits, "loc", GeoFieldType::GeoPoint);
        assert_eq!(fc.features.len(), 2);
        let ids: Vec<_> = fc.features.iter().map(|f| f.id.clone()).collect();
        assert_eq!(
            ids,
            vec![
                Some(Id::String("poi:1:0".to_string())),
                Some(Id::String("poi:1:1".to_string())),
            ]
        );
        let props = fc.features[0].properties.as_ref().unwrap();
        assert!(!props.contains_key("loc"));
        assert_eq!(props.get("name"), Some(&json!("a")));
        assert!(logs_contain("Skipping hit"));
    }
}
