//! Raster sources: where the GeoTIFF bytes come from.
//!
//! A [`RasterSource`] resolves a locator string to a decoded
//! [`ElevationRaster`]. Sources return `impl Future` and never spawn tasks of
//! their own.

use std::future::Future;

use relief_mesh::ElevationRaster;

use crate::error::{Error, Result};
use crate::geotiff::decode_geotiff;

/// Something that can fetch and decode an elevation raster.
pub trait RasterSource: Send + Sync {
    /// Fetch and decode the raster addressed by `locator`.
    fn load(&self, locator: &str) -> impl Future<Output = Result<ElevationRaster>> + Send;
}

/// Fetches rasters over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpRasterSource {
    http: reqwest::Client,
}

impl HttpRasterSource {
    /// Create a source with a default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source around an existing HTTP client.
    #[must_use]
    pub fn with_http(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "fetching raster");

        let response = self.http.get(url).send().await.map_err(|e| Error::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let data = response.bytes().await.map_err(|e| Error::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(data.to_vec())
    }
}

impl RasterSource for HttpRasterSource {
    async fn load(&self, locator: &str) -> Result<ElevationRaster> {
        let data = self.fetch_bytes(locator).await?;
        tracing::debug!(url = locator, bytes = data.len(), "fetched raster");
        decode_geotiff(&data)
    }
}

/// Reads rasters from the local filesystem.
///
/// The read runs on Tokio's blocking pool, so it must be awaited inside a
/// Tokio runtime.
#[cfg(not(target_family = "wasm"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRasterSource;

#[cfg(not(target_family = "wasm"))]
impl RasterSource for FileRasterSource {
    async fn load(&self, locator: &str) -> Result<ElevationRaster> {
        let data = tokio::fs::read(locator).await.map_err(|e| Error::Io {
            path: locator.to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = locator, bytes = data.len(), "read raster");
        decode_geotiff(&data)
    }
}

/// Where a locator points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorKind {
    Http,
    File,
}

impl LocatorKind {
    /// Classify a locator by its scheme. The locator must already be trimmed.
    #[must_use]
    pub fn of(locator: &str) -> Self {
        let lower = locator.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Http
        } else {
            Self::File
        }
    }
}

/// Dispatches to HTTP or the filesystem based on the locator.
#[derive(Debug, Clone, Default)]
pub struct AnySource {
    http: HttpRasterSource,
}

impl AnySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RasterSource for AnySource {
    async fn load(&self, locator: &str) -> Result<ElevationRaster> {
        // Launch parameters often carry stray whitespace.
        let locator = locator.trim();
        match LocatorKind::of(locator) {
            LocatorKind::Http => self.http.load(locator).await,
            #[cfg(not(target_family = "wasm"))]
            LocatorKind::File => FileRasterSource.load(locator).await,
            #[cfg(target_family = "wasm")]
            LocatorKind::File => Err(Error::Io {
                path: locator.to_string(),
                message: "local files are not available in the browser".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_kind() {
        assert_eq!(LocatorKind::of("https://example.com/se.tif"), LocatorKind::Http);
        assert_eq!(LocatorKind::of("HTTP://example.com/se.tif"), LocatorKind::Http);
        assert_eq!(LocatorKind::of("assets/se.tif"), LocatorKind::File);
        assert_eq!(LocatorKind::of("/tmp/se.tif"), LocatorKind::File);
        assert_eq!(LocatorKind::of("http.tif"), LocatorKind::File);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = FileRasterSource
            .load("/nonexistent/relief-test/missing.tif")
            .await;
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[tokio::test]
    async fn test_any_source_trims_locator_and_decodes_tiff() {
        use tiff::encoder::{TiffEncoder, colortype};

        let path = std::env::temp_dir().join(format!("relief-source-{}.tif", std::process::id()));
        {
            let file = std::fs::File::create(&path).unwrap();
            let mut writer = std::io::BufWriter::new(file);
            TiffEncoder::new(&mut writer)
                .unwrap()
                .write_image::<colortype::Gray32Float>(2, 1, &[1.0, 2.0])
                .unwrap();
        }

        let padded = format!("  {}\n", path.to_str().unwrap());
        let raster = AnySource::new().load(&padded).await;
        std::fs::remove_file(&path).unwrap();

        assert_eq!(raster.unwrap().samples(), &[1.0, 2.0]);
    }
}
