use geojson::FeatureCollection;
use geozero::mvt::{Message as _, Tile as MvtTile};
use search_mvt_tile_utils::TileCoord;
use tracing::debug;

use crate::mvt::LayerBuilder;
use crate::tiler::TileIndex;
use crate::{MvtResult, TilingOptions, with_centroids};

/// Encodes feature collections into single-layer vector tiles.
///
/// The encoder only holds validated [`TilingOptions`]; every call builds its own tile index,
/// so one encoder can be shared between requests.
#[derive(Clone, Debug, Default)]
pub struct TileEncoder {
    options: TilingOptions,
}

impl TileEncoder {
    pub fn new(options: TilingOptions) -> MvtResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    #[must_use]
    pub fn options(&self) -> &TilingOptions {
        &self.options
    }

    /// Encodes tile `z/x/y` of `collection` as one layer named `layer_name`.
    ///
    /// The collection is consumed as is; call [`with_centroids`] first to add label points.
    /// Returns `Ok(None)` when the tile holds no features, or `z`/`y` lie outside the pyramid.
    pub fn encode(
        &self,
        collection: FeatureCollection,
        layer_name: &str,
        z: u8,
        x: u32,
        y: u32,
    ) -> MvtResult<Option<Vec<u8>>> {
        let coord = TileCoord::new_unchecked(z, x, y);
        let mut index = TileIndex::new(collection, &self.options)?;
        let Some(features) = index.get_tile(z, x, y) else {
            debug!("No tile at {coord:#}");
            return Ok(None);
        };

        let mut layer =
            LayerBuilder::new(layer_name.to_string(), u32::from(self.options.extent));
        for feature in &features {
            layer.add_feature(feature);
        }
        let bytes = MvtTile {
            layers: vec![layer.build()],
        }
        .encode_to_vec();

        debug!(
            "Encoded {} features into {} bytes for tile {coord:#}",
            features.len(),
            bytes.len()
        );
        Ok(Some(bytes))
    }
}

/// Adds centroid features to `collection` and encodes tile `z/x/y` with the default options.
///
/// ```
/// use geojson::{Feature, FeatureCollection, Geometry, Value};
///
/// let collection = FeatureCollection {
///     bbox: None,
///     features: vec![Feature {
///         geometry: Some(Geometry::new(Value::Point(vec![0.0, 0.0]))),
///         ..Default::default()
///     }],
///     foreign_members: None,
/// };
/// let tile = search_mvt::encode_tile(collection, "hits", 0, 0, 0).unwrap();
/// assert!(tile.is_some());
/// ```
pub fn encode_tile(
    collection: FeatureCollection,
    layer_name: &str,
    z: u8,
    x: u32,
    y: u32,
) -> MvtResult<Option<Vec<u8>>> {
    TileEncoder::default().encode(with_centroids(collection), layer_name, z, x, y)
}
