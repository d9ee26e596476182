//! Heightmap sampling: one classification pass shared by the mesh and the mask.
//!
//! Each raster sample is scaled into a vertical displacement. Cells whose
//! scaled value sits above a small negative threshold carry no visible relief
//! and are classified as *baseline*: they are flattened onto the reference
//! plane and rendered transparent.

use crate::error::{MeshError, MeshResult};
use crate::raster::ElevationRaster;

/// Default elevation scale. Negative so that higher ground moves along -Z.
pub const DEFAULT_SCALE: f32 = -0.01;

/// Default baseline threshold applied to the scaled elevation.
pub const DEFAULT_THRESHOLD: f32 = -0.025;

/// What to do with samples that do not produce a finite displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonFinitePolicy {
    /// Treat the cell as baseline: flat and transparent.
    #[default]
    Flatten,
    /// Fail classification with [`MeshError::NonFiniteSample`].
    Reject,
}

/// Tuning constants for classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifyParams {
    /// Multiplier from raster units to displacement.
    pub scale: f32,
    /// Scaled values strictly above this are baseline. Must be negative.
    pub threshold: f32,
    /// Handling of NaN and infinite displacements.
    pub non_finite: NonFinitePolicy,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            threshold: DEFAULT_THRESHOLD,
            non_finite: NonFinitePolicy::default(),
        }
    }
}

impl ClassifyParams {
    fn validate(&self) -> MeshResult<()> {
        if !self.scale.is_finite() {
            return Err(MeshError::InvalidParams {
                detail: format!("scale must be finite, got {}", self.scale),
            });
        }
        if !self.threshold.is_finite() {
            return Err(MeshError::InvalidParams {
                detail: format!("threshold must be finite, got {}", self.threshold),
            });
        }
        // A relief cell must end up strictly below the baseline plane.
        if self.threshold >= 0.0 {
            return Err(MeshError::InvalidParams {
                detail: format!("threshold must be negative, got {}", self.threshold),
            });
        }
        Ok(())
    }
}

/// Per-cell classification result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedCell {
    /// Effective displacement; exactly `0.0` for baseline cells.
    pub displacement: f32,
    /// Whether the cell lies on the baseline plane.
    pub is_baseline: bool,
}

impl ClassifiedCell {
    const BASELINE: Self = Self {
        displacement: 0.0,
        is_baseline: true,
    };

    /// Classify a single sample.
    #[must_use]
    pub fn from_sample(sample: f32, scale: f32, threshold: f32) -> Self {
        let displacement = sample * scale;
        if displacement > threshold {
            Self::BASELINE
        } else {
            Self {
                displacement,
                is_baseline: false,
            }
        }
    }
}

/// Classified cells for a whole raster, in raster (row-major) order.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    width: u32,
    height: u32,
    cells: Vec<ClassifiedCell>,
}

impl Classification {
    /// Grid width in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[ClassifiedCell] {
        &self.cells
    }

    /// Cell at column `i`, row `j`.
    #[must_use]
    pub fn cell_at(&self, i: u32, j: u32) -> Option<ClassifiedCell> {
        if i >= self.width || j >= self.height {
            return None;
        }
        Some(self.cells[crate::raster::cell_index(i, j, self.width)])
    }

    /// Number of cells with visible relief.
    #[must_use]
    pub fn relief_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_baseline).count()
    }
}

/// Classify every cell of `raster`.
///
/// # Errors
///
/// Returns [`MeshError::InvalidParams`] for non-finite parameters or a
/// threshold that is not negative and, under
/// [`NonFinitePolicy::Reject`], [`MeshError::NonFiniteSample`] for the first
/// sample whose displacement is NaN or infinite.
pub fn classify(raster: &ElevationRaster, params: &ClassifyParams) -> MeshResult<Classification> {
    params.validate()?;

    let mut cells = Vec::with_capacity(raster.len());
    for (index, &sample) in raster.samples().iter().enumerate() {
        // No-data cells are holes in the source, not elevations.
        if raster.is_no_data(sample) {
            cells.push(ClassifiedCell::BASELINE);
            continue;
        }

        let scaled = sample * params.scale;
        if !scaled.is_finite() {
            match params.non_finite {
                NonFinitePolicy::Flatten => {
                    cells.push(ClassifiedCell::BASELINE);
                    continue;
                }
                NonFinitePolicy::Reject => {
                    return Err(MeshError::NonFiniteSample {
                        index,
                        value: sample,
                    });
                }
            }
        }

        cells.push(ClassifiedCell::from_sample(
            sample,
            params.scale,
            params.threshold,
        ));
    }

    Ok(Classification {
        width: raster.width(),
        height: raster.height(),
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(width: u32, height: u32, samples: &[f32]) -> ElevationRaster {
        ElevationRaster::new(width, height, samples.to_vec()).unwrap()
    }

    #[test]
    fn test_zero_and_negative_samples_are_baseline() {
        let classes = classify(&raster(2, 2, &[0.0, -5.0, -5.0, 0.0]), &ClassifyParams::default())
            .unwrap();
        assert!(classes.cells().iter().all(|c| c.is_baseline));
        assert!(classes.cells().iter().all(|c| c.displacement == 0.0));
        assert_eq!(classes.relief_count(), 0);
    }

    #[test]
    fn test_high_sample_has_relief() {
        let classes = classify(&raster(1, 1, &[50.0]), &ClassifyParams::default()).unwrap();
        let cell = classes.cells()[0];
        assert!(!cell.is_baseline);
        assert_eq!(cell.displacement, -0.5);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // Exactly at the threshold keeps its relief.
        let cell = ClassifiedCell::from_sample(1.0, -1.0, -1.0);
        assert!(!cell.is_baseline);
        assert_eq!(cell.displacement, -1.0);

        let cell = ClassifiedCell::from_sample(0.5, -1.0, -1.0);
        assert!(cell.is_baseline);
        assert_eq!(cell.displacement, 0.0);
    }

    #[test]
    fn test_small_elevation_is_clamped() {
        // 2 * -0.01 = -0.02, above -0.025.
        let classes = classify(&raster(1, 1, &[2.0]), &ClassifyParams::default()).unwrap();
        assert!(classes.cells()[0].is_baseline);
        assert_eq!(classes.cells()[0].displacement, 0.0);
    }

    #[test]
    fn test_nan_is_flattened_by_default() {
        let classes = classify(
            &raster(3, 1, &[f32::NAN, f32::INFINITY, 100.0]),
            &ClassifyParams::default(),
        )
        .unwrap();
        assert!(classes.cells()[0].is_baseline);
        assert!(classes.cells()[1].is_baseline);
        assert!(!classes.cells()[2].is_baseline);
    }

    #[test]
    fn test_nan_is_rejected_on_request() {
        let params = ClassifyParams {
            non_finite: NonFinitePolicy::Reject,
            ..ClassifyParams::default()
        };
        let result = classify(&raster(2, 1, &[100.0, f32::NAN]), &params);
        assert!(matches!(
            result,
            Err(MeshError::NonFiniteSample { index: 1, .. })
        ));
    }

    #[test]
    fn test_overflowing_scale_follows_policy() {
        let params = ClassifyParams {
            scale: -f32::MAX,
            threshold: -0.025,
            non_finite: NonFinitePolicy::Reject,
        };
        let result = classify(&raster(1, 1, &[10.0]), &params);
        assert!(matches!(result, Err(MeshError::NonFiniteSample { .. })));
    }

    #[test]
    fn test_no_data_is_baseline() {
        let source = raster(2, 1, &[-9999.0, 100.0]).with_no_data(Some(-9999.0));
        let params = ClassifyParams {
            scale: 0.01,
            non_finite: NonFinitePolicy::Reject,
            ..ClassifyParams::default()
        };
        // With a positive scale -9999 would otherwise be deep relief.
        let classes = classify(&source, &params).unwrap();
        assert!(classes.cells()[0].is_baseline);
        assert!(classes.cells()[1].is_baseline);
    }

    #[test]
    fn test_invalid_params() {
        let params = ClassifyParams {
            scale: f32::NAN,
            ..ClassifyParams::default()
        };
        let result = classify(&raster(1, 1, &[0.0]), &params);
        assert!(matches!(result, Err(MeshError::InvalidParams { .. })));
    }

    #[test]
    fn test_non_negative_threshold_is_rejected() {
        for threshold in [0.0, -0.0, 0.5] {
            let params = ClassifyParams {
                threshold,
                ..ClassifyParams::default()
            };
            let result = classify(&raster(2, 1, &[0.0, 50.0]), &params);
            assert!(
                matches!(result, Err(MeshError::InvalidParams { .. })),
                "threshold {threshold}"
            );
        }
    }

    #[test]
    fn test_cell_at_matches_raster_order() {
        let classes = classify(&raster(2, 2, &[0.0, 100.0, 0.0, 0.0]), &ClassifyParams::default())
            .unwrap();
        assert!(classes.cell_at(0, 0).unwrap().is_baseline);
        assert!(!classes.cell_at(1, 0).unwrap().is_baseline);
        assert!(classes.cell_at(2, 0).is_none());
    }
}
