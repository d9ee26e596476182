//! Conversion of a terrain [`Surface`] into Bevy assets.
//!
//! The alpha mask becomes the alpha channel of an RGBA base-color texture.
//! Its color channels are white so the material's base color shows through
//! unchanged while the mask decides which fragments are visible.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use relief_mesh::mask::CHANNELS;
use relief_mesh::{AlphaMask, BoundingSphere, MeshGeometry, Surface, SurfaceMaterial};

/// Component marking the entity that renders the terrain surface.
#[derive(Component)]
pub struct TerrainSurfaceMarker {
    /// Grid size in vertices.
    pub grid: UVec2,
    /// Bound of the mesh in its local space.
    pub bounds: BoundingSphere,
}

/// Convert terrain geometry to a Bevy mesh.
pub fn convert_geometry(geometry: &MeshGeometry) -> Mesh {
    let positions: Vec<[f32; 3]> = geometry.positions.iter().map(|p| p.to_array()).collect();
    let normals: Vec<[f32; 3]> = geometry.normals.iter().map(|n| n.to_array()).collect();
    let uvs: Vec<[f32; 2]> = geometry.uvs.iter().map(|uv| uv.to_array()).collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(geometry.indices.clone()));

    mesh
}

/// Expand the RGB mask into white RGBA texels carrying the mask as alpha.
pub fn mask_to_rgba(mask: &AlphaMask) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(mask.texels.len() / CHANNELS * 4);
    for texel in mask.texels.chunks_exact(CHANNELS) {
        rgba.extend_from_slice(&[255, 255, 255, texel[0]]);
    }
    rgba
}

/// Create the mask texture.
///
/// Stored linear so the mask value maps straight to opacity.
pub fn convert_mask(mask: &AlphaMask) -> Image {
    Image::new(
        Extent3d {
            width: mask.width,
            height: mask.height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        mask_to_rgba(mask),
        TextureFormat::Rgba8Unorm,
        RenderAssetUsages::default(),
    )
}

/// Build the PBR material for the surface.
pub fn convert_material(material: &SurfaceMaterial, mask: Handle<Image>) -> StandardMaterial {
    let [r, g, b] = material.base_color;
    StandardMaterial {
        base_color: Color::srgb_u8(r, g, b),
        base_color_texture: Some(mask),
        alpha_mode: if material.transparent {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        },
        double_sided: material.double_sided,
        cull_mode: if material.double_sided {
            None
        } else {
            Some(bevy::render::render_resource::Face::Back)
        },
        reflectance: material.reflectivity,
        ..Default::default()
    }
}

/// Spawn the surface into the world.
pub fn spawn_surface(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    images: &mut Assets<Image>,
    surface: &Surface,
) -> Entity {
    let geometry = surface.geometry();
    let mesh_handle = meshes.add(convert_geometry(geometry));
    let mask_handle = images.add(convert_mask(surface.mask()));
    let material = materials.add(convert_material(surface.material(), mask_handle));

    commands
        .spawn((
            Mesh3d(mesh_handle),
            MeshMaterial3d(material),
            Transform::default(),
            TerrainSurfaceMarker {
                grid: UVec2::new(geometry.grid_width, geometry.grid_height),
                bounds: geometry.bounding_sphere,
            },
        ))
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_mesh::{ClassifyParams, ElevationRaster, build_surface};

    fn surface() -> Surface {
        let raster = ElevationRaster::new(2, 2, vec![50.0, 0.0, 0.0, 0.0]).unwrap();
        build_surface(&raster, &ClassifyParams::default()).unwrap()
    }

    #[test]
    fn test_mask_to_rgba_moves_mask_into_alpha() {
        let rgba = mask_to_rgba(surface().mask());
        assert_eq!(rgba.len(), 16);
        // Raster (0, 0) lands on texture row 1, texel index 2.
        assert_eq!(&rgba[8..12], &[255, 255, 255, 255]);
        assert_eq!(&rgba[0..4], &[255, 255, 255, 0]);
    }

    #[test]
    fn test_convert_geometry_counts() {
        let surface = surface();
        let mesh = convert_geometry(surface.geometry());
        assert_eq!(mesh.count_vertices(), 4);
        assert_eq!(mesh.indices().map(Indices::len), Some(6));
    }

    #[test]
    fn test_convert_material_is_transparent_and_double_sided() {
        let material = convert_material(&SurfaceMaterial::default(), Handle::default());
        assert!(matches!(material.alpha_mode, AlphaMode::Blend));
        assert!(material.double_sided);
        assert!(material.cull_mode.is_none());
        assert_eq!(material.reflectance, 1.0);
    }
}
