//! Label points for line and polygon features.
//!
//! Renderers place labels and icons on points, so every line and polygon feature gets a
//! companion point feature carrying the same id and properties.

use geo::{Area as _, Centroid as _, Contains as _, InteriorPoint as _};
use geo::{Coord, Haversine, InterpolateLine as _, Length as _, LineString, Point, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoValue};
use serde_json::Value;

/// Property set to `true` on every synthesized centroid feature.
pub const CENTROID_FEATURE_PROPERTY: &str = "__is_centroid_feature__";

/// Computes one centroid feature per line or polygon feature of `collection`.
///
/// Lines use the point half-way along their great-circle length, polygons use their centre of mass, or an
/// interior point if the centre of mass falls outside the shape. Multi-geometries use their
/// longest line or largest polygon. Points and geometry collections get no centroid.
#[must_use]
pub fn centroid_features(collection: &FeatureCollection) -> Vec<Feature> {
    collection
        .features
        .iter()
        .filter_map(|feature| {
            let geometry = feature.geometry.as_ref()?;
            let centroid = geometry_centroid(&geometry.value)?;
            Some(centroid_feature(feature, centroid))
        })
        .collect()
}

/// Appends [`centroid_features`] to `collection` and hands it back.
#[must_use]
pub fn with_centroids(mut collection: FeatureCollection) -> FeatureCollection {
    let centroids = centroid_features(&collection);
    collection.features.extend(centroids);
    collection
}

fn geometry_centroid(value: &GeoValue) -> Option<Point<f64>> {
    match value {
        GeoValue::LineString(positions) => line_midpoint(&line_string(positions)),
        GeoValue::MultiLineString(lines) => lines
            .iter()
            .map(|positions| line_string(positions))
            .max_by(|a, b| Haversine.length(a).total_cmp(&Haversine.length(b)))
            .and_then(|longest| line_midpoint(&longest)),
        GeoValue::Polygon(rings) => polygon_centroid(&polygon(rings)?),
        GeoValue::MultiPolygon(polygons) => polygons
            .iter()
            .filter_map(|rings| polygon(rings))
            .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
            .and_then(|largest| polygon_centroid(&largest)),
        GeoValue::Point(_) | GeoValue::MultiPoint(_) | GeoValue::GeometryCollection(_) => None,
    }
}

fn centroid_feature(source: &Feature, centroid: Point<f64>) -> Feature {
    let mut properties = source.properties.clone().unwrap_or_default();
    properties.insert(CENTROID_FEATURE_PROPERTY.to_string(), Value::Bool(true));
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(GeoValue::Point(vec![centroid.x(), centroid.y()]))),
        id: source.id.clone(),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn polygon_centroid(polygon: &Polygon<f64>) -> Option<Point<f64>> {
    match polygon.centroid() {
        Some(center) if polygon.contains(&center) => Some(center),
        _ => polygon.interior_point(),
    }
}

fn line_midpoint(line: &LineString<f64>) -> Option<Point<f64>> {
    Haversine.point_at_ratio_from_start(line, 0.5)
}

fn line_string(positions: &[Vec<f64>]) -> LineString<f64> {
    positions
        .iter()
        .filter(|position| position.len() >= 2)
        .map(|position| Coord {
            x: position[0],
            y: position[1],
        })
        .collect()
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let (exterior, interiors) = rings.split_first()?;
    Some(Polygon::new(
        line_string(exterior),
        interiors.iter().map(|ring| line_string(ring)).collect(),
    ))
}
