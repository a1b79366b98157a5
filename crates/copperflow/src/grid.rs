//! Adaptive spatial grid driven by the density field.
//!
//! The board is partitioned row by row into variable-size cells. Dense field
//! regions get small cells (many candidate spots for small parts), sparse
//! regions get large cells that can hold big packages. Rows are flush: every
//! cell in a row shares the height chosen at the row start, so the grid
//! tiles the board exactly before padding is carved out.

use copperflow_core::geometry::{Bounds, Point, Size};

use crate::field::NoiseField;

/// Cells thinner than this do not advance the sweep meaningfully and end
/// the row instead.
const MIN_ADVANCE: f32 = 1e-4;

/// Floor applied to padded cell dimensions.
const MIN_CELL_SIZE: f32 = 0.1;

/// One grid cell: its padded rectangle plus the density sampled at the
/// cell center, used later as the placement-acceptance reference.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub bounds: Bounds,
    pub density: f32,
}

/// Maps a density value to a tier index: high density selects the smallest
/// tier (index `n - 1`... 0 ordering is largest first).
pub fn tier_for_density(density: f32, tier_count: usize) -> usize {
    let raw = ((1.0 - density) * (tier_count - 1) as f32).round();
    (raw.max(0.0) as usize).min(tier_count - 1)
}

/// Classifies a cell width into a tier band.
///
/// Band boundaries sit slightly below the tier sizes (1.0mm of tolerance for
/// the two largest tiers, 0.5mm below) so that boundary clipping and cell
/// padding do not push a cell out of its intended band.
pub fn band_index(width: f32, tier_sizes: &[f32]) -> usize {
    for (i, &tier) in tier_sizes[..tier_sizes.len() - 1].iter().enumerate() {
        let tolerance = if i <= 1 { 1.0 } else { 0.5 };
        if width >= tier - tolerance {
            return i;
        }
    }
    tier_sizes.len() - 1
}

/// Builds the adaptive grid for a density field.
///
/// Row-major sweep: the sample at the row start picks the row height tier;
/// each cell's width tier is picked from the sample at the cell's own
/// origin, and the cell's representative density is re-sampled at its
/// center. Cells clip at the board boundary, then shrink by `padding` per
/// side (floored at 0.1mm) to leave breathing room between neighbors.
pub fn build(field: &NoiseField, tier_sizes: &[f32], padding: f32) -> Vec<GridCell> {
    let width = field.width() as f32;
    let height = field.height() as f32;
    let mut cells = Vec::new();

    let mut y = 0.0f32;
    while y < height {
        let mut x = 0.0f32;
        let mut row_height = None;

        while x < width {
            let origin_density = field.sample(x, y);
            let tier = tier_for_density(origin_density, tier_sizes.len());
            let cell_size = tier_sizes[tier];

            let cell_width = cell_size.min(width - x);
            if cell_width < MIN_ADVANCE {
                break;
            }
            // The first cell of the row fixes the height for the whole row.
            let cell_height = *row_height.get_or_insert_with(|| cell_size.min(height - y));

            let density = field.sample(x + cell_width / 2.0, y + cell_height / 2.0);

            // The floor can exceed what padding left over in sliver cells;
            // keep the padded rectangle inside its unpadded cell either way.
            let padded_w = (cell_width - 2.0 * padding)
                .max(MIN_CELL_SIZE)
                .min(cell_width);
            let padded_h = (cell_height - 2.0 * padding)
                .max(MIN_CELL_SIZE)
                .min(cell_height);
            let padded = Bounds::from_top_left(
                Point::new(
                    (x + padding).min(x + cell_width - padded_w),
                    (y + padding).min(y + cell_height - padded_h),
                ),
                Size::new(padded_w, padded_h),
            );
            cells.push(GridCell {
                bounds: padded,
                density,
            });

            x += cell_width;
        }

        match row_height {
            Some(advance) if advance >= MIN_ADVANCE => y += advance,
            _ => break,
        }
    }

    cells
}
