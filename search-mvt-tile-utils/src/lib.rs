//! Tile and bounding-box math shared by the `search-mvt` tile generator.
//!
//! Coordinates are WGS84 degrees unless stated otherwise. Tiles follow the
//! slippy-map convention: the origin tile `0/0/0` covers the whole world and
//! `y` grows southwards.

use std::f64::consts::PI;
use std::fmt::{Display, Formatter};

mod bounds;
pub use bounds::{GeoBounds, LonLat, MapExtent, clamp_to_ring};

/// Deepest zoom level a tile pyramid may be built for.
pub const MAX_ZOOM: u8 = 24;

/// Latitude limit of the web-mercator square, in degrees.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    /// Checks provided coordinates for validity
    /// before constructing [`TileCoord`] instance.
    ///
    /// Check [`Self::new_unchecked`] if you are sure that your inputs are possible.
    #[must_use]
    pub fn new_checked(z: u8, x: u32, y: u32) -> Option<Self> {
        is_valid_tile(z, x, y).then_some(Self { z, x, y })
    }

    /// Constructs [`TileCoord`] instance from arguments without checking that the tiles can exist.
    ///
    /// Check [`Self::new_checked`] if you are unsure if your inputs are possible.
    #[must_use]
    pub fn new_unchecked(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }
}

impl Display for TileCoord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            write!(f, "{}/{}/{}", self.z, self.x, self.y)
        } else {
            write!(f, "{},{},{}", self.z, self.x, self.y)
        }
    }
}

/// Checks that `x` and `y` are within the `2^z` grid and `z` is not deeper than [`MAX_ZOOM`].
#[must_use]
pub fn is_valid_tile(z: u8, x: u32, y: u32) -> bool {
    if z > MAX_ZOOM {
        return false;
    }
    let side = 1_u32 << z;
    x < side && y < side
}

/// Number of tiles along one side of the grid at zoom `z`. Does not overflow for any `z`.
fn tile_count(z: u8) -> f64 {
    2_f64.powi(i32::from(z))
}

/// Western edge longitude of tile column `x` at zoom `z`.
#[must_use]
pub fn tile_to_lon(x: f64, z: u8) -> f64 {
    x / tile_count(z) * 360.0 - 180.0
}

/// Northern edge latitude of tile row `y` at zoom `z`.
#[must_use]
pub fn tile_to_lat(y: f64, z: u8) -> f64 {
    let n = PI - 2.0 * PI * y / tile_count(z);
    n.sinh().atan().to_degrees()
}

/// Normalizes a longitude into `-180.0..180.0`.
#[must_use]
pub fn wrap_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Clamps a latitude into `-90.0..=90.0`.
#[must_use]
pub fn clamp_lat(lat: f64) -> f64 {
    lat.clamp(-90.0, 90.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_tile_coord_display() {
        let xyz = TileCoord::new_unchecked(3, 5, 6);
        assert_eq!(xyz.to_string(), "3,5,6");
        assert_eq!(format!("{xyz:#}"), "3/5/6");
    }

    #[rstest]
    #[case(0, 0, 0, true)]
    #[case(0, 1, 0, false)]
    #[case(1, 1, 1, true)]
    #[case(2, 4, 0, false)]
    #[case(24, (1 << 24) - 1, 0, true)]
    #[case(25, 0, 0, false)]
    fn test_valid_tile(#[case] z: u8, #[case] x: u32, #[case] y: u32, #[case] expected: bool) {
        assert_eq!(is_valid_tile(z, x, y), expected);
        assert_eq!(TileCoord::new_checked(z, x, y).is_some(), expected);
    }

    #[test]
    fn test_tile_edges() {
        assert_relative_eq!(tile_to_lon(0.0, 0), -180.0);
        assert_relative_eq!(tile_to_lon(1.0, 0), 180.0);
        assert_relative_eq!(tile_to_lon(1.0, 1), 0.0);
        assert_relative_eq!(tile_to_lat(0.0, 0), MAX_MERCATOR_LAT, epsilon = 1e-9);
        assert_relative_eq!(tile_to_lat(1.0, 0), -MAX_MERCATOR_LAT, epsilon = 1e-9);
        assert_relative_eq!(tile_to_lat(1.0, 1), 0.0, epsilon = 1e-9);
    }

    #[rstest]
    #[case(32)]
    #[case(u8::MAX)]
    fn test_tile_edges_past_shift_width(#[case] z: u8) {
        assert_relative_eq!(tile_to_lon(0.0, z), -180.0);
        assert_relative_eq!(tile_to_lat(0.0, z), MAX_MERCATOR_LAT, epsilon = 1e-9);
        let bounds = GeoBounds::from_tile(z, 0, 0);
        assert!(bounds.bottom_right.lon.is_finite());
        assert!(bounds.bottom_right.lat.is_finite());
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(179.0, 179.0)]
    #[case(180.0, -180.0)]
    #[case(190.0, -170.0)]
    #[case(-190.0, 170.0)]
    #[case(-540.0, -180.0)]
    fn test_wrap_lon(#[case] lon: f64, #[case] expected: f64) {
        assert_relative_eq!(wrap_lon(lon), expected);
    }

    #[test]
    fn test_clamp_lat() {
        assert_relative_eq!(clamp_lat(91.0), 90.0);
        assert_relative_eq!(clamp_lat(-100.0), -90.0);
        assert_relative_eq!(clamp_lat(45.5), 45.5);
    }
}
