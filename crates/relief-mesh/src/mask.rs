//! Transparency mask generation.
//!
//! The mask is an RGB texture with one texel per raster cell: black where the
//! cell is baseline, white where it carries relief. Texture rows count from
//! the bottom while raster rows count from the top, so raster row `j` is
//! written to texel row [`texture_row_from_mesh_row`]`(j)`.

use crate::classify::Classification;
use crate::raster::cell_index;

/// Bytes per texel.
pub const CHANNELS: usize = 3;

/// Texel value for baseline (fully transparent) cells.
pub const TRANSPARENT: [u8; CHANNELS] = [0, 0, 0];

/// Texel value for relief (fully opaque) cells.
pub const OPAQUE: [u8; CHANNELS] = [255, 255, 255];

/// Texture row holding mesh/raster row `j` of a grid `height` rows tall.
#[inline]
#[must_use]
pub fn texture_row_from_mesh_row(j: u32, height: u32) -> u32 {
    height - 1 - j
}

/// Texel for a cell with the given classification.
#[inline]
#[must_use]
pub fn opaque_if(has_relief: bool) -> [u8; CHANNELS] {
    if has_relief { OPAQUE } else { TRANSPARENT }
}

/// RGB opacity mask aligned with the terrain mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB texels, bottom row first.
    pub texels: Vec<u8>,
}

impl AlphaMask {
    /// Texel at column `i` of texture row `row`.
    #[must_use]
    pub fn texel_at(&self, i: u32, row: u32) -> Option<[u8; CHANNELS]> {
        if i >= self.width || row >= self.height {
            return None;
        }
        let offset = cell_index(i, row, self.width) * CHANNELS;
        let mut texel = [0; CHANNELS];
        texel.copy_from_slice(&self.texels[offset..offset + CHANNELS]);
        Some(texel)
    }

    /// Number of opaque texels.
    #[must_use]
    pub fn opaque_count(&self) -> usize {
        self.texels
            .chunks_exact(CHANNELS)
            .filter(|t| *t == OPAQUE)
            .count()
    }
}

/// Build the mask from the baseline flags of `classes`.
#[must_use]
pub fn build_alpha_mask(classes: &Classification) -> AlphaMask {
    let width = classes.width();
    let height = classes.height();
    let mut texels = vec![0; width as usize * height as usize * CHANNELS];

    for j in 0..height {
        let row = texture_row_from_mesh_row(j, height);
        for i in 0..width {
            let cell = classes.cells()[cell_index(i, j, width)];
            let offset = cell_index(i, row, width) * CHANNELS;
            texels[offset..offset + CHANNELS].copy_from_slice(&opaque_if(!cell.is_baseline));
        }
    }

    AlphaMask {
        width,
        height,
        texels,
    }
}
