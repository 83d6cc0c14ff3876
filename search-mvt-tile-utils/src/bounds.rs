//! Lon/lat rectangles in the `top_left` / `bottom_right` form used by search backends.

use serde::{Deserialize, Serialize};

use crate::{tile_to_lat, tile_to_lon};

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    #[must_use]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A rectangle given by its north-west and south-east corners.
///
/// No ordering is enforced: callers are expected to put the north-west corner into
/// `top_left`. A box straddling the antimeridian has `top_left.lon > bottom_right.lon`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoBounds {
    pub top_left: LonLat,
    pub bottom_right: LonLat,
}

impl GeoBounds {
    #[must_use]
    pub fn new(top_left: LonLat, bottom_right: LonLat) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// Bounds of the slippy-map tile `z/x/y`.
    ///
    /// ```
    /// # use search_mvt_tile_utils::GeoBounds;
    /// let bounds = GeoBounds::from_tile(1, 1, 0);
    /// assert_eq!(bounds.top_left.lon, 0.0);
    /// assert_eq!(bounds.bottom_right.lon, 180.0);
    /// ```
    #[must_use]
    pub fn from_tile(z: u8, x: u32, y: u32) -> Self {
        let (x, y) = (f64::from(x), f64::from(y));
        Self {
            top_left: LonLat::new(tile_to_lon(x, z), tile_to_lat(y, z)),
            bottom_right: LonLat::new(tile_to_lon(x + 1.0, z), tile_to_lat(y + 1.0, z)),
        }
    }
}

/// The `min`/`max` form of a rectangle expected by extent filters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapExtent {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl From<&GeoBounds> for MapExtent {
    /// The north-west corner supplies `min_lon` and `max_lat`,
    /// the south-east corner supplies `max_lon` and `min_lat`.
    fn from(bounds: &GeoBounds) -> Self {
        Self {
            min_lon: bounds.top_left.lon,
            min_lat: bounds.bottom_right.lat,
            max_lon: bounds.bottom_right.lon,
            max_lat: bounds.top_left.lat,
        }
    }
}

/// Intersects `data` with `tile` and returns the closed ring
/// `(min_lon,min_lat) → (min_lon,max_lat) → (max_lon,max_lat) → (max_lon,min_lat) → (min_lon,min_lat)`.
///
/// Longitudes are clamped first; only then, if the clamped `min_lon` exceeds `max_lon`,
/// `min_lon` is shifted by -360 so a box straddling the antimeridian stays west-to-east.
/// The result is not validated: disjoint inputs produce an inverted ring.
#[must_use]
pub fn clamp_to_ring(data: &GeoBounds, tile: &GeoBounds) -> [[f64; 2]; 5] {
    let mut min_lon = data.top_left.lon.max(tile.top_left.lon);
    let max_lon = data.bottom_right.lon.min(tile.bottom_right.lon);
    if min_lon > max_lon {
        min_lon -= 360.0;
    }
    let min_lat = data.bottom_right.lat.max(tile.bottom_right.lat);
    let max_lat = data.top_left.lat.min(tile.top_left.lat);

    [
        [min_lon, min_lat],
        [min_lon, max_lat],
        [max_lon, max_lat],
        [max_lon, min_lat],
        [min_lon, min_lat],
    ]
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::MAX_MERCATOR_LAT;

    fn bounds(west: f64, north: f64, east: f64, south: f64) -> GeoBounds {
        GeoBounds::new(LonLat::new(west, north), LonLat::new(east, south))
    }

    #[test]
    fn test_from_tile_world() {
        let b = GeoBounds::from_tile(0, 0, 0);
        assert_relative_eq!(b.top_left.lon, -180.0);
        assert_relative_eq!(b.bottom_right.lon, 180.0);
        assert_relative_eq!(b.top_left.lat, MAX_MERCATOR_LAT, epsilon = 1e-9);
        assert_relative_eq!(b.bottom_right.lat, -MAX_MERCATOR_LAT, epsilon = 1e-9);
    }

    #[test]
    fn test_from_tile_quadrant() {
        let b = GeoBounds::from_tile(1, 0, 1);
        assert_relative_eq!(b.top_left.lon, -180.0);
        assert_relative_eq!(b.top_left.lat, 0.0, epsilon = 1e-9);
        assert_relative_eq!(b.bottom_right.lon, 0.0);
        assert_relative_eq!(b.bottom_right.lat, -MAX_MERCATOR_LAT, epsilon = 1e-9);
    }

    #[test]
    fn test_extent_remap() {
        let extent = MapExtent::from(&bounds(-10.0, 40.0, 20.0, -5.0));
        assert_eq!(
            extent,
            MapExtent {
                min_lon: -10.0,
                min_lat: -5.0,
                max_lon: 20.0,
                max_lat: 40.0,
            }
        );
    }

    #[test]
    fn test_clamp_identical_boxes() {
        let b = bounds(-10.0, 40.0, 20.0, -5.0);
        assert_eq!(
            clamp_to_ring(&b, &b),
            [
                [-10.0, -5.0],
                [-10.0, 40.0],
                [20.0, 40.0],
                [20.0, -5.0],
                [-10.0, -5.0],
            ]
        );
    }

    #[test]
    fn test_clamp_data_larger_than_tile() {
        let data = bounds(-50.0, 60.0, 50.0, -60.0);
        let tile = bounds(0.0, 45.0, 45.0, 0.0);
        assert_eq!(clamp_to_ring(&data, &tile), clamp_to_ring(&tile, &tile));
    }

    #[test]
    fn test_clamp_dateline() {
        let data = bounds(170.0, 10.0, -170.0, -10.0);
        let tile = bounds(160.0, 20.0, 180.0, -20.0);
        let ring = clamp_to_ring(&data, &tile);
        let (min_lon, max_lon) = (ring[0][0], ring[2][0]);
        assert_relative_eq!(min_lon, -190.0);
        assert_relative_eq!(max_lon, -170.0);
        assert!(min_lon < max_lon);
    }

    #[test]
    fn test_clamp_disjoint_is_not_rejected() {
        let data = bounds(0.0, 10.0, 10.0, 0.0);
        let tile = bounds(20.0, 40.0, 30.0, 30.0);
        let ring = clamp_to_ring(&data, &tile);
        // longitudes get "unwrapped", latitudes stay inverted
        assert_relative_eq!(ring[0][0], -340.0);
        assert_relative_eq!(ring[0][1], 30.0);
        assert_relative_eq!(ring[1][1], 10.0);
        assert_eq!(ring[0], ring[4]);
    }

    #[test]
    fn test_serde_shape() {
        let b: GeoBounds = serde_json::from_str(
            r#"{"top_left":{"lat":10.5,"lon":-20.0},"bottom_right":{"lat":-1.0,"lon":3.0}}"#,
        )
        .unwrap();
        assert_eq!(b, bounds(-20.0, 10.5, 3.0, -1.0));
    }
}
