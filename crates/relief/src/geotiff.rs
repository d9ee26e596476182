//! GeoTIFF decoding into an [`ElevationRaster`].
//!
//! Only the first image of the file is read. Samples of any integer or float
//! type are widened to `f32`. Multi-band images decode to an interleaved
//! buffer longer than `width * height` and are rejected as malformed.

use std::io::Cursor;

use relief_mesh::ElevationRaster;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::error::Result;

/// Decode a GeoTIFF held in memory.
pub fn decode_geotiff(bytes: &[u8]) -> Result<ElevationRaster> {
    let mut decoder = Decoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions()?;
    let no_data = read_no_data(&mut decoder)?;

    let samples = widen_samples(decoder.read_image()?);

    tracing::debug!(width, height, samples = samples.len(), ?no_data, "decoded tiff");

    Ok(ElevationRaster::new(width, height, samples)?.with_no_data(no_data))
}

/// Read the `GDAL_NODATA` tag (42113), if present and numeric.
fn read_no_data<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Result<Option<f32>> {
    let Some(value) = decoder.find_tag(Tag::GdalNodata)? else {
        return Ok(None);
    };
    let text = value.into_string()?;
    Ok(parse_no_data(&text))
}

/// Parse the tag text; GDAL writes it NUL-terminated and sometimes padded.
fn parse_no_data(text: &str) -> Option<f32> {
    let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    match trimmed.parse::<f32>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(text = trimmed, "ignoring unparseable no-data value");
            None
        }
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn widen_samples(result: DecodingResult) -> Vec<f32> {
    match result {
        DecodingResult::U8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
    }
}
