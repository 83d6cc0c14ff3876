//! Spatial filters and clamped geometry for a tile's bounding box.

use search_mvt_tile_utils::{GeoBounds, LonLat, MapExtent, clamp_lat, clamp_to_ring, wrap_lon};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A geo-extent filter ready to be embedded into a backend query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtentFilter {
    pub query: Value,
}

/// Builds a `geo_bounding_box` filter for `extent` on every field in `geo_field_names`.
///
/// Latitudes are clamped to the valid range. Longitudes are normalized into `-180..180`, so a
/// box crossing the antimeridian ends up with a western edge greater than its eastern edge.
/// An extent that spans 360° or more covers every longitude.
/// Several fields are combined with a `bool.should` requiring one match.
#[must_use]
pub fn create_extent_filter(extent: &MapExtent, geo_field_names: &[&str]) -> ExtentFilter {
    let top = clamp_lat(extent.max_lat);
    let bottom = clamp_lat(extent.min_lat);
    let (west, east) = if extent.max_lon - extent.min_lon >= 360.0 {
        (-180.0, 180.0)
    } else {
        (wrap_lon(extent.min_lon), wrap_lon(extent.max_lon))
    };
    let bbox = GeoBounds::new(LonLat::new(west, top), LonLat::new(east, bottom));

    let mut filters: Vec<Value> = geo_field_names
        .iter()
        .map(|field| json!({ "geo_bounding_box": { *field: bbox } }))
        .collect();

    let query = if filters.len() == 1 {
        filters.remove(0)
    } else {
        json!({ "bool": { "should": filters, "minimum_should_match": 1 } })
    };
    ExtentFilter { query }
}

/// The backend filter restricting results to `tile_bounds` on `geometry_field`.
#[must_use]
pub fn tile_spatial_filter(geometry_field: &str, tile_bounds: &GeoBounds) -> Value {
    create_extent_filter(&MapExtent::from(tile_bounds), &[geometry_field]).query
}

/// Intersection of `data_bounds` and `tile_bounds` as a `GeoJSON` polygon.
///
/// Search backends may return a bounding box reaching outside the tile that matched it, so the
/// box is clamped to the tile first. See [`clamp_to_ring`] for the dateline handling. Disjoint
/// boxes are not rejected and produce a degenerate polygon.
#[must_use]
pub fn clamp_to_polygon(data_bounds: &GeoBounds, tile_bounds: &GeoBounds) -> geojson::Value {
    let ring = clamp_to_ring(data_bounds, tile_bounds)
        .iter()
        .map(|position| position.to_vec())
        .collect();
    geojson::Value::Polygon(vec![ring])
}
