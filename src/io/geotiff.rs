//! GeoTIFF tile reader built on the pure-Rust `tiff` decoder.
//!
//! Reads a single elevation band plus the embedded georeferencing tags
//! (ModelTiepoint/ModelPixelScale) and the GDAL no-data tag. Whatever
//! sentinel the file declares is normalized to the crate-wide NaN sentinel
//! so downstream stages never see provider-specific magic numbers.
use ndarray::Array2;
use std::path::Path;
use thiserror::Error;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tracing::debug;

use crate::raster::{GeoTransform, Raster};
use crate::types::Crs;

/// ModelPixelScaleTag, ModelTiepointTag, GDAL_NODATA.
const TAG_PIXEL_SCALE: u16 = 33550;
const TAG_TIEPOINT: u16 = 33922;
const TAG_GDAL_NODATA: u16 = 42113;

/// No-data fallback when the file carries no GDAL_NODATA tag (SRTM voids).
const SRTM_VOID: f64 = -32768.0;

#[derive(Debug, Error)]
pub enum GeoTiffError {
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing georeference tags (ModelTiepoint/ModelPixelScale): {path}")]
    MissingGeoreference { path: String },
    #[error("dimension mismatch: expected {expected} samples, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Read a single-band elevation GeoTIFF into a [`Raster`].
///
/// Provider tiles are delivered in geographic coordinates, so the result
/// carries `Crs::Geographic`.
pub fn read_geotiff<P: AsRef<Path>>(path: P) -> Result<Raster, GeoTiffError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let mut decoder = Decoder::new(file)?;

    // Continent-scale merged tiles can be large; raise the decoder limits.
    let mut limits = Limits::default();
    limits.decoding_buffer_size = 1024 * 1024 * 1024;
    limits.intermediate_buffer_size = 1024 * 1024 * 1024;
    limits.ifd_value_size = 1024 * 1024 * 1024;
    decoder = decoder.with_limits(limits);

    let (width, height) = decoder.dimensions()?;
    let transform = read_geotransform(&mut decoder, path)?;
    let file_nodata = read_nodata(&mut decoder);
    let samples = decode_samples(&mut decoder)?;

    let expected = width as usize * height as usize;
    if samples.len() != expected {
        return Err(GeoTiffError::DimensionMismatch {
            expected,
            actual: samples.len(),
        });
    }

    // Normalize the file's sentinel to NaN up front; an unmanaged provider
    // sentinel leaking into elevation math was a documented corruption bug.
    let normalized: Vec<f64> = samples
        .into_iter()
        .map(|v| {
            if v.is_nan() || v == file_nodata {
                f64::NAN
            } else {
                v
            }
        })
        .collect();

    let data = Array2::from_shape_vec((height as usize, width as usize), normalized)
        .map_err(|_| GeoTiffError::DimensionMismatch {
            expected,
            actual: 0,
        })?;

    debug!(
        "read {}x{} geotiff from {:?} (file nodata {})",
        width, height, path, file_nodata
    );

    Ok(Raster::new(data, transform, Crs::Geographic))
}

fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    path: &Path,
) -> Result<GeoTransform, GeoTiffError> {
    let tiepoint = decoder.get_tag_f64_vec(Tag::Unknown(TAG_TIEPOINT));
    let scale = decoder.get_tag_f64_vec(Tag::Unknown(TAG_PIXEL_SCALE));

    if let (Ok(tiepoint), Ok(scale)) = (tiepoint, scale) {
        if tiepoint.len() >= 6 && scale.len() >= 2 {
            // Tiepoint is [i, j, k, x, y, z]: pixel (i, j) anchored at geo (x, y).
            let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
            let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
            return Ok(GeoTransform::north_up(origin_x, origin_y, scale[0], scale[1]));
        }
    }

    Err(GeoTiffError::MissingGeoreference {
        path: path.display().to_string(),
    })
}

fn read_nodata<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> f64 {
    decoder
        .get_tag_ascii_string(Tag::Unknown(TAG_GDAL_NODATA))
        .ok()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(SRTM_VOID)
}

fn decode_samples<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<Vec<f64>, GeoTiffError> {
    match decoder.read_image()? {
        DecodingResult::F64(data) => Ok(data),
        DecodingResult::F32(data) => Ok(data.into_iter().map(f64::from).collect()),
        DecodingResult::I16(data) => Ok(data.into_iter().map(f64::from).collect()),
        DecodingResult::I32(data) => Ok(data.into_iter().map(f64::from).collect()),
        DecodingResult::U16(data) => Ok(data.into_iter().map(f64::from).collect()),
        DecodingResult::U32(data) => Ok(data.into_iter().map(f64::from).collect()),
        DecodingResult::U8(data) => Ok(data.into_iter().map(f64::from).collect()),
        DecodingResult::I8(data) => Ok(data.into_iter().map(f64::from).collect()),
        DecodingResult::U64(data) => Ok(data.into_iter().map(|v| v as f64).collect()),
        DecodingResult::I64(data) => Ok(data.into_iter().map(|v| v as f64).collect()),
    }
}
