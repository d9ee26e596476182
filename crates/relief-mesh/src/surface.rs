//! Surface composition: geometry, mask and fixed material parameters.

use crate::classify::{ClassifyParams, classify};
use crate::error::{MeshError, MeshResult};
use crate::mask::{AlphaMask, build_alpha_mask};
use crate::mesh::{MeshGeometry, build_mesh};
use crate::raster::ElevationRaster;

/// CSS `royalblue`.
pub const ROYAL_BLUE: [u8; 3] = [65, 105, 225];

/// Fixed material attributes of the terrain surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMaterial {
    /// sRGB base color.
    pub base_color: [u8; 3],
    pub double_sided: bool,
    /// Whether the alpha mask drives per-fragment transparency.
    pub transparent: bool,
    /// Reflectivity in `[0, 1]`.
    pub reflectivity: f32,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            base_color: ROYAL_BLUE,
            double_sided: true,
            transparent: true,
            reflectivity: 1.0,
        }
    }
}

/// A renderable terrain surface. Immutable once composed.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    geometry: MeshGeometry,
    mask: AlphaMask,
    material: SurfaceMaterial,
}

impl Surface {
    /// Bind `mask` to `geometry` with the default material.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::DimensionMismatch`] if the mask was built for a
    /// different grid than the mesh.
    pub fn compose(geometry: MeshGeometry, mask: AlphaMask) -> MeshResult<Self> {
        let expected = (geometry.grid_width, geometry.grid_height);
        let actual = (mask.width, mask.height);
        if expected != actual {
            return Err(MeshError::DimensionMismatch {
                context: "alpha mask",
                expected,
                actual,
            });
        }

        Ok(Self {
            geometry,
            mask,
            material: SurfaceMaterial::default(),
        })
    }

    #[must_use]
    pub fn geometry(&self) -> &MeshGeometry {
        &self.geometry
    }

    #[must_use]
    pub fn mask(&self) -> &AlphaMask {
        &self.mask
    }

    #[must_use]
    pub fn material(&self) -> &SurfaceMaterial {
        &self.material
    }
}

/// Run the whole construction: classify once, build mesh and mask from the
/// same classification, compose.
pub fn build_surface(raster: &ElevationRaster, params: &ClassifyParams) -> MeshResult<Surface> {
    let classes = classify(raster, params)?;
    let geometry = build_mesh(&classes);
    let mask = build_alpha_mask(&classes);
    Surface::compose(geometry, mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::OPAQUE;

    #[test]
    fn test_default_material() {
        let material = SurfaceMaterial::default();
        assert_eq!(material.base_color, ROYAL_BLUE);
        assert!(material.double_sided);
        assert!(material.transparent);
        assert_eq!(material.reflectivity, 1.0);
    }

    #[test]
    fn test_build_surface_aligns_mesh_and_mask() {
        let raster = ElevationRaster::new(2, 2, vec![50.0, 0.0, 0.0, 0.0]).unwrap();
        let surface = build_surface(&raster, &ClassifyParams::default()).unwrap();

        assert_eq!(surface.geometry().position_at(0, 0).unwrap().z, -0.5);
        assert_eq!(surface.mask().texel_at(0, 1), Some(OPAQUE));
        assert_eq!(surface.mask().opaque_count(), 1);
    }

    #[test]
    fn test_compose_rejects_mismatched_mask() {
        let a = ElevationRaster::new(2, 2, vec![0.0; 4]).unwrap();
        let b = ElevationRaster::new(2, 1, vec![0.0; 2]).unwrap();
        let params = ClassifyParams::default();
        let geometry = build_mesh(&classify(&a, &params).unwrap());
        let mask = build_alpha_mask(&classify(&b, &params).unwrap());

        let result = Surface::compose(geometry, mask);
        assert!(matches!(result, Err(MeshError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_build_surface_propagates_classification_errors() {
        let raster = ElevationRaster::new(1, 1, vec![0.0]).unwrap();
        let params = ClassifyParams {
            threshold: f32::INFINITY,
            ..ClassifyParams::default()
        };
        assert!(build_surface(&raster, &params).is_err());
    }
}
