/// Errors that can occur while turning hits into vector tiles.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum MvtError {
    /// Tiling options that cannot produce a tile pyramid.
    #[error("Invalid tiling options: {0}")]
    InvalidOptions(String),

    /// A `GeoJSON` position needs at least a longitude and a latitude.
    #[error("GeoJSON position must have at least 2 coordinates, got {0}")]
    InvalidPosition(usize),

    /// A hit's geometry value could not be read as a point or a shape.
    #[error("Unable to convert {field} value to a geometry: {reason}")]
    InvalidHitGeometry {
        /// The geometry field the value was read from.
        field: String,
        /// What was wrong with the value.
        reason: String,
    },
}

/// A convenience [`Result`] for `search-mvt` operations.
pub type MvtResult<T> = Result<T, MvtError>;
