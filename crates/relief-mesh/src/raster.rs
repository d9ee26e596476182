//! Elevation raster validation and cell addressing.

use crate::error::{MeshError, MeshResult};

/// A decoded single-band elevation raster.
///
/// Samples are stored row-major with the origin at the top-left corner, so
/// cell `(i, j)` (column `i`, row `j`) lives at `i + j * width`.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationRaster {
    width: u32,
    height: u32,
    samples: Vec<f32>,
    no_data: Option<f32>,
}

impl ElevationRaster {
    /// Create a raster, checking that the buffer covers exactly `width * height` cells.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::EmptyRaster`] if either dimension is zero, and
    /// [`MeshError::MalformedRaster`] if the sample count does not match.
    pub fn new(width: u32, height: u32, samples: Vec<f32>) -> MeshResult<Self> {
        if width == 0 || height == 0 {
            return Err(MeshError::EmptyRaster { width, height });
        }

        let expected = usize::try_from(u64::from(width) * u64::from(height)).ok();
        if expected != Some(samples.len()) {
            return Err(MeshError::MalformedRaster {
                width,
                height,
                sample_count: samples.len(),
            });
        }

        Ok(Self {
            width,
            height,
            samples,
            no_data: None,
        })
    }

    /// Mark a sentinel value as "no data".
    #[must_use]
    pub fn with_no_data(mut self, no_data: Option<f32>) -> Self {
        self.no_data = no_data;
        self
    }

    /// Raster width in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Raster height in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The sentinel value marking missing samples, if the source declared one.
    #[must_use]
    pub fn no_data(&self) -> Option<f32> {
        self.no_data
    }

    /// All samples in row-major order.
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: construction rejects empty rasters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Row-major index of cell `(i, j)`.
    #[must_use]
    pub fn index(&self, i: u32, j: u32) -> usize {
        cell_index(i, j, self.width)
    }

    /// Sample at column `i`, row `j`, or `None` outside the raster.
    #[must_use]
    pub fn cell_at(&self, i: u32, j: u32) -> Option<f32> {
        if i >= self.width || j >= self.height {
            return None;
        }
        Some(self.samples[self.index(i, j)])
    }

    /// Whether `value` is the declared no-data sentinel.
    #[must_use]
    pub fn is_no_data(&self, value: f32) -> bool {
        self.no_data
            .is_some_and(|nd| value == nd || (nd.is_nan() && value.is_nan()))
    }
}

/// Row-major index shared by the raster, the classification and the mesh.
#[inline]
#[must_use]
pub fn cell_index(i: u32, j: u32, width: u32) -> usize {
    i as usize + j as usize * width as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_matching_buffer() {
        let raster = ElevationRaster::new(3, 2, vec![0.0; 6]).unwrap();
        assert_eq!(raster.width(), 3);
        assert_eq!(raster.height(), 2);
        assert_eq!(raster.len(), 6);
        assert!(raster.no_data().is_none());
    }

    #[test]
    fn test_new_rejects_short_buffer() {
        let result = ElevationRaster::new(3, 2, vec![0.0; 5]);
        assert!(matches!(
            result,
            Err(MeshError::MalformedRaster {
                width: 3,
                height: 2,
                sample_count: 5
            })
        ));
    }

    #[test]
    fn test_new_rejects_interleaved_bands() {
        // Three bands interleaved per pixel is three times too long.
        let result = ElevationRaster::new(2, 2, vec![0.0; 12]);
        assert!(matches!(result, Err(MeshError::MalformedRaster { .. })));
    }

    #[test]
    fn test_new_rejects_zero_dimension() {
        let result = ElevationRaster::new(0, 4, Vec::new());
        assert!(matches!(result, Err(MeshError::EmptyRaster { .. })));
    }

    #[test]
    fn test_cell_at_is_row_major() {
        let raster = ElevationRaster::new(3, 2, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(raster.cell_at(0, 0), Some(0.0));
        assert_eq!(raster.cell_at(2, 0), Some(2.0));
        assert_eq!(raster.cell_at(0, 1), Some(3.0));
        assert_eq!(raster.cell_at(2, 1), Some(5.0));
        assert_eq!(raster.cell_at(3, 0), None);
        assert_eq!(raster.cell_at(0, 2), None);
    }

    #[test]
    fn test_no_data_sentinel() {
        let raster = ElevationRaster::new(1, 1, vec![-9999.0])
            .unwrap()
            .with_no_data(Some(-9999.0));
        assert!(raster.is_no_data(-9999.0));
        assert!(!raster.is_no_data(0.0));
    }

    #[test]
    fn test_nan_no_data_matches_nan() {
        let raster = ElevationRaster::new(1, 1, vec![f32::NAN])
            .unwrap()
            .with_no_data(Some(f32::NAN));
        assert!(raster.is_no_data(f32::NAN));
        assert!(!raster.is_no_data(1.0));
    }
}
