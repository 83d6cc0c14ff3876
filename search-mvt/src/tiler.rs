//! Per-call tile pyramid over a feature collection.
//!
//! Features are projected, simplified and wrapped across the antimeridian once, then split
//! into quadrants down to [`TilingOptions::index_max_zoom`]. Deeper tiles are cut on demand
//! from the nearest ancestor that still holds its source features.

use std::fmt::{Debug, Formatter};

use geojson::{Feature, FeatureCollection, Value};
use geojson_vt_rs::GeoJSONVT;
use search_mvt_tile_utils::is_valid_tile;
use tracing::debug;

use crate::{MvtError, MvtResult, TilingOptions};

/// Tiles of one feature collection, backed by a `geojson-vt-rs` index.
pub struct TileIndex {
    inner: GeoJSONVT,
    max_zoom: u8,
}

impl Debug for TileIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileIndex")
            .field("max_zoom", &self.max_zoom)
            .finish_non_exhaustive()
    }
}

impl TileIndex {
    /// Builds the index for `collection`. Features without a geometry are left out.
    ///
    /// Fails if `options` are invalid or a feature has a position with fewer than two coordinates.
    pub fn new(mut collection: FeatureCollection, options: &TilingOptions) -> MvtResult<Self> {
        options.validate()?;

        collection.features.retain(|feature| feature.geometry.is_some());
        for geometry in collection.features.iter().filter_map(|f| f.geometry.as_ref()) {
            check_positions(&geometry.value)?;
        }

        let inner = GeoJSONVT::new(&collection, &options.vt_options());
        debug!(
            "Indexed {} features down to zoom {}",
            collection.features.len(),
            options.index_max_zoom
        );
        Ok(Self {
            inner,
            max_zoom: options.max_zoom,
        })
    }

    /// Returns the features of tile `z/x/y`, with geometries in integer tile units.
    /// `x` wraps around the antimeridian.
    ///
    /// `None` means the tile holds no features or lies outside the pyramid.
    pub fn get_tile(&mut self, z: u8, x: u32, y: u32) -> Option<Vec<Feature>> {
        if z > self.max_zoom {
            return None;
        }
        let x = x % (1_u32 << z);
        if !is_valid_tile(z, x, y) {
            return None;
        }

        let features = &self.inner.get_tile(z, x, y).features.features;
        (!features.is_empty()).then(|| features.clone())
    }
}

fn check_positions(value: &Value) -> MvtResult<()> {
    match value {
        Value::Point(position) => check_position(position),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            positions.iter().try_for_each(|p| check_position(p))
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            lines.iter().flatten().try_for_each(|p| check_position(p))
        }
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .flatten()
            .flatten()
            .try_for_each(|p| check_position(p)),
        Value::GeometryCollection(geometries) => geometries
            .iter()
            .try_for_each(|geometry| check_positions(&geometry.value)),
    }
}

fn check_position(position: &[f64]) -> MvtResult<()> {
    if position.len() < 2 {
        return Err(MvtError::InvalidPosition(position.len()));
    }
    Ok(())
}
