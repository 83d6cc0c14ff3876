use geojson_vt_rs::{Options, TileOptions};
use search_mvt_tile_utils::MAX_ZOOM;
use serde::{Deserialize, Serialize};

use crate::{MvtError, MvtResult};

/// Tiling and encoding settings.
///
/// Every field has a default, so partial configs deserialize fine:
///
/// ```
/// let options: search_mvt::TilingOptions = serde_json::from_str(r#"{"buffer": 128}"#).unwrap();
/// assert_eq!(options.buffer, 128);
/// assert_eq!(options.extent, 4096);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilingOptions {
    /// Deepest zoom level tiles are generated for; geometry is not simplified there [DEFAULT: 24]
    pub max_zoom: u8,
    /// Simplification tolerance, in tile units [DEFAULT: 3.0]
    pub tolerance: f64,
    /// Tile coordinate range [DEFAULT: 4096]
    pub extent: u16,
    /// Extra margin around each tile, in tile units [DEFAULT: 64]
    pub buffer: u16,
    /// Deepest zoom level built when the index is created [DEFAULT: 5]
    pub index_max_zoom: u8,
    /// Tiles with no more points than this are not split when the index is created [DEFAULT: 100000]
    pub index_max_points: u32,
}

const MAX_ZOOM_DEFAULT: u8 = MAX_ZOOM;
const TOLERANCE_DEFAULT: f64 = 3.0;
const EXTENT_DEFAULT: u16 = 4096;
const BUFFER_DEFAULT: u16 = 64;
const INDEX_MAX_ZOOM_DEFAULT: u8 = 5;
const INDEX_MAX_POINTS_DEFAULT: u32 = 100_000;

impl Default for TilingOptions {
    fn default() -> Self {
        Self {
            max_zoom: MAX_ZOOM_DEFAULT,
            tolerance: TOLERANCE_DEFAULT,
            extent: EXTENT_DEFAULT,
            buffer: BUFFER_DEFAULT,
            index_max_zoom: INDEX_MAX_ZOOM_DEFAULT,
            index_max_points: INDEX_MAX_POINTS_DEFAULT,
        }
    }
}

impl TilingOptions {
    /// Validate if all settings are valid
    pub fn validate(&self) -> MvtResult<()> {
        if self.max_zoom > MAX_ZOOM {
            return Err(MvtError::InvalidOptions(format!(
                "max_zoom must be at most {MAX_ZOOM}, got {}",
                self.max_zoom
            )));
        }
        if self.index_max_zoom > self.max_zoom {
            return Err(MvtError::InvalidOptions(format!(
                "index_max_zoom ({}) must not exceed max_zoom ({})",
                self.index_max_zoom, self.max_zoom
            )));
        }
        if self.extent == 0 {
            return Err(MvtError::InvalidOptions(
                "extent must be greater than 0".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(MvtError::InvalidOptions(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    /// Index settings for these options. Line metrics and id generation are never enabled.
    pub(crate) fn vt_options(&self) -> Options {
        Options {
            max_zoom: self.max_zoom,
            index_max_zoom: self.index_max_zoom,
            index_max_points: self.index_max_points,
            generate_id: false,
            tile: TileOptions {
                tolerance: self.tolerance,
                extent: self.extent,
                buffer: self.buffer,
                line_metrics: false,
            },
        }
    }
}
