//! Turns search-backend hits into Mapbox Vector Tiles.
//!
//! A tile request typically goes through these steps:
//!
//! 1. [`tile_spatial_filter`] builds the backend filter selecting the hits of a tile;
//! 2. [`hits_to_feature_collection`] flattens the returned hits with [`flatten_hit`] and turns
//!    their geometry values into `GeoJSON` features;
//! 3. [`with_centroids`] adds a label point for every line and polygon;
//! 4. [`TileEncoder::encode`] indexes the features and serializes the requested tile.
//!
//! [`encode_tile`] runs the last two steps with the default [`TilingOptions`].
//! Bounding boxes returned by the backend can be cut to a tile with [`clamp_to_polygon`].

#![forbid(unsafe_code)]

mod bounds;
mod centroids;
mod config;
mod encoder;
mod error;
mod features;
mod flatten;
pub mod mvt;
pub mod tiler;

pub use bounds::{ExtentFilter, clamp_to_polygon, create_extent_filter, tile_spatial_filter};
pub use centroids::{CENTROID_FEATURE_PROPERTY, centroid_features, with_centroids};
pub use config::TilingOptions;
pub use encoder::{TileEncoder, encode_tile};
pub use error::{MvtError, MvtResult};
pub use features::{
    GeoFieldType, geo_point_to_geometry, geo_shape_to_geometry, hits_to_feature_collection,
};
pub use flatten::{FlatProperties, Hit, ID_KEY, INDEX_KEY, flatten_hit};
pub use search_mvt_tile_utils::{GeoBounds, LonLat, MapExtent};
