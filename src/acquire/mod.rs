//! Tile acquisition: extent gridding, fetching with bounded retries, and
//! mosaic assembly.
pub mod fetch;
pub mod grid;
pub mod merge;

pub use fetch::{DirectoryFetcher, FetchError, TileFetcher, TileOutcome};
pub use grid::{split_extent, TileDescriptor};
pub use merge::merge_tiles;
