//! Grid mesh construction.
//!
//! The grid has one vertex per raster cell, laid out in raster order. Rows run
//! top to bottom, so raster row `j` sits at `y = height - 1 - j` and the
//! top-left cell keeps its top-left position. Each vertex is pushed along Z by
//! its classified displacement. The finished mesh is mirrored across the YZ
//! plane to convert the raster's handedness into the renderer's.

use glam::{Vec2, Vec3};

use crate::classify::Classification;
use crate::raster::cell_index;

/// Smallest sphere-ish bound used for culling by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Bound a point set: centered on its axis-aligned box, radius reaching the
    /// farthest point.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(first) = points.first() else {
            return Self {
                center: Vec3::ZERO,
                radius: 0.0,
            };
        };

        let (min, max) = points
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        let center = (min + max) * 0.5;
        let radius_sq = points
            .iter()
            .map(|p| center.distance_squared(*p))
            .fold(0.0_f32, f32::max);

        Self {
            center,
            radius: radius_sq.sqrt(),
        }
    }

    /// Whether `point` lies inside the sphere (with a little slack for rounding).
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        self.center.distance(point) <= self.radius * (1.0 + 1e-5) + 1e-5
    }
}

/// A displaced terrain grid ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGeometry {
    /// Vertices per row.
    pub grid_width: u32,
    /// Number of rows.
    pub grid_height: u32,
    /// Vertex positions in raster order.
    pub positions: Vec<Vec3>,
    /// Unit vertex normals.
    pub normals: Vec<Vec3>,
    /// Texture coordinates into the alpha mask.
    pub uvs: Vec<Vec2>,
    /// Triangle list.
    pub indices: Vec<u32>,
    pub bounding_sphere: BoundingSphere,
}

impl MeshGeometry {
    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position of the vertex for raster cell `(i, j)`.
    #[must_use]
    pub fn position_at(&self, i: u32, j: u32) -> Option<Vec3> {
        if i >= self.grid_width || j >= self.grid_height {
            return None;
        }
        Some(self.positions[cell_index(i, j, self.grid_width)])
    }

    /// Mirror across the YZ plane (scale `(-1, 1, 1)`).
    ///
    /// Triangle winding is reversed so faces keep pointing the same way
    /// relative to their normals.
    pub fn mirror_x(&mut self) {
        for p in &mut self.positions {
            p.x = -p.x;
        }
        for n in &mut self.normals {
            n.x = -n.x;
        }
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        self.bounding_sphere.center.x = -self.bounding_sphere.center.x;
    }
}

/// Build the terrain mesh from a classification.
///
/// Baseline cells sit at `z = 0`; every other cell takes its displacement.
/// Normals and the bounding sphere are computed from the displaced grid, then
/// the whole mesh is mirrored.
#[must_use]
pub fn build_mesh(classes: &Classification) -> MeshGeometry {
    let width = classes.width();
    let height = classes.height();

    let mut positions = grid_layout(width, height);
    for (position, cell) in positions.iter_mut().zip(classes.cells()) {
        position.z = cell.displacement;
    }

    let indices = grid_indices(width, height);
    let normals = compute_vertex_normals(&positions, &indices);
    let bounding_sphere = BoundingSphere::from_points(&positions);

    let mut mesh = MeshGeometry {
        grid_width: width,
        grid_height: height,
        positions,
        normals,
        uvs: grid_uvs(width, height),
        indices,
        bounding_sphere,
    };
    mesh.mirror_x();
    mesh
}

/// Flat grid positions before displacement and mirroring.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn grid_layout(width: u32, height: u32) -> Vec<Vec3> {
    let mut positions = Vec::with_capacity(width as usize * height as usize);
    for j in 0..height {
        let y = (height - 1 - j) as f32;
        for i in 0..width {
            positions.push(Vec3::new(i as f32, y, 0.0));
        }
    }
    positions
}

/// Texture coordinates for the grid.
///
/// `v` runs bottom to top, so raster row `j` samples texture row
/// `height - 1 - j`, the row the alpha mask writes it to.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn grid_uvs(width: u32, height: u32) -> Vec<Vec2> {
    let segments_x = width.saturating_sub(1).max(1) as f32;
    let segments_y = height.saturating_sub(1).max(1) as f32;

    let mut uvs = Vec::with_capacity(width as usize * height as usize);
    for j in 0..height {
        let v = 1.0 - j as f32 / segments_y;
        for i in 0..width {
            uvs.push(Vec2::new(i as f32 / segments_x, v));
        }
    }
    uvs
}

/// Two triangles per grid cell, wound counter-clockwise seen from +Z.
///
/// A grid with a single row or column has no cells and yields no indices.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn grid_indices(width: u32, height: u32) -> Vec<u32> {
    let cells_x = width.saturating_sub(1);
    let cells_y = height.saturating_sub(1);

    let mut indices = Vec::with_capacity(cells_x as usize * cells_y as usize * 6);
    for j in 0..cells_y {
        for i in 0..cells_x {
            let a = cell_index(i, j, width) as u32;
            let b = cell_index(i, j + 1, width) as u32;
            let c = cell_index(i + 1, j + 1, width) as u32;
            let d = cell_index(i + 1, j, width) as u32;

            indices.extend([a, b, d, b, c, d]);
        }
    }
    indices
}

/// Area-weighted vertex normals.
///
/// Vertices that belong to no triangle get `+Z`.
#[must_use]
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        // Unnormalized cross product weights each face by its area.
        let face = (positions[c] - positions[b]).cross(positions[a] - positions[b]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    for n in &mut normals {
        *n = n.try_normalize().unwrap_or(Vec3::Z);
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ClassifyParams, classify};
    use crate::raster::ElevationRaster;

    fn mesh_for(width: u32, height: u32, samples: &[f32]) -> MeshGeometry {
        let raster = ElevationRaster::new(width, height, samples.to_vec()).unwrap();
        build_mesh(&classify(&raster, &ClassifyParams::default()).unwrap())
    }

    #[test]
    fn test_grid_layout_spans_raster() {
        let layout = grid_layout(3, 2);
        assert_eq!(layout.len(), 6);
        // Row 0 is the top row.
        assert_eq!(layout[0], Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(layout[2], Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(layout[3], Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(layout[5], Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_grid_indices_single_cell() {
        // a=0 (0,0), b=2 (0,1), c=3 (1,1), d=1 (1,0).
        assert_eq!(grid_indices(2, 2), vec![0, 2, 1, 2, 3, 1]);
    }

    #[test]
    fn test_grid_indices_face_count() {
        assert_eq!(grid_indices(4, 3).len(), 3 * 2 * 6);
        assert!(grid_indices(1, 5).is_empty());
        assert!(grid_indices(5, 1).is_empty());
    }

    #[test]
    fn test_flat_grid_normals_face_up() {
        let layout = grid_layout(3, 3);
        let normals = compute_vertex_normals(&layout, &grid_indices(3, 3));
        for n in normals {
            assert!((n - Vec3::Z).length() < 1e-6, "normal {n}");
        }
    }

    #[test]
    fn test_grid_uvs_flip_rows() {
        let uvs = grid_uvs(2, 3);
        assert_eq!(uvs[0], Vec2::new(0.0, 1.0));
        assert_eq!(uvs[1], Vec2::new(1.0, 1.0));
        assert_eq!(uvs[4], Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_single_cell_mesh() {
        let mesh = mesh_for(1, 1, &[100.0]);
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.normals, vec![Vec3::Z]);
        assert_eq!(mesh.uvs, vec![Vec2::new(0.0, 1.0)]);
        assert_eq!(mesh.bounding_sphere.radius, 0.0);
        assert_eq!(mesh.positions[0].z, -1.0);
    }

    #[test]
    fn test_flat_example_mesh() {
        let mesh = mesh_for(2, 2, &[0.0, -5.0, -5.0, 0.0]);
        assert!(mesh.positions.iter().all(|p| p.z == 0.0));
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_relief_vertex_is_displaced() {
        let mesh = mesh_for(2, 2, &[0.0, 50.0, 0.0, 0.0]);
        let p = mesh.position_at(1, 0).unwrap();
        assert_eq!(p.z, -0.5);
        // Mirrored column 1 of the top row.
        assert_eq!(p.x, -1.0);
        assert_eq!(p.y, 1.0);
    }

    #[test]
    fn test_mirror_negates_x_only() {
        let classes = classify(
            &ElevationRaster::new(3, 2, vec![0.0, 100.0, 250.0, 30.0, 0.0, 75.0]).unwrap(),
            &ClassifyParams::default(),
        )
        .unwrap();
        let mesh = build_mesh(&classes);
        let layout = grid_layout(3, 2);

        for (idx, (p, flat)) in mesh.positions.iter().zip(&layout).enumerate() {
            assert_eq!(p.x, -flat.x);
            assert_eq!(p.y, flat.y);
            assert_eq!(p.z, classes.cells()[idx].displacement);
        }
    }

    #[test]
    fn test_mirror_keeps_normals_consistent() {
        // Normals mirrored after the fact equal normals recomputed on the
        // mirrored, rewound mesh.
        let mesh = mesh_for(3, 3, &[0.0, 10.0, 0.0, 40.0, 90.0, 20.0, 0.0, 30.0, 0.0]);
        let recomputed = compute_vertex_normals(&mesh.positions, &mesh.indices);
        for (a, b) in mesh.normals.iter().zip(&recomputed) {
            assert!((*a - *b).length() < 1e-5, "{a} vs {b}");
        }
    }

    #[test]
    fn test_bounding_sphere_contains_all_vertices() {
        let mesh = mesh_for(3, 3, &[0.0, 10.0, 0.0, 40.0, 90.0, 20.0, 0.0, 30.0, 0.0]);
        for p in &mesh.positions {
            assert!(mesh.bounding_sphere.contains(*p));
        }
        assert!(mesh.bounding_sphere.center.x <= 0.0);
    }

    #[test]
    fn test_bounding_sphere_of_empty_set() {
        let sphere = BoundingSphere::from_points(&[]);
        assert_eq!(sphere.radius, 0.0);
        assert_eq!(sphere.center, Vec3::ZERO);
    }
}
