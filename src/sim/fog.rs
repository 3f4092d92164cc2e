//! Persistent erodable fog mask
//!
//! Coverage lives on a downsampled grid (`cell_size` frame pixels per cell)
//! so erosion and the per-tick coverage mean stay cheap at camera frame rate.
//! The renderer upsamples through [`FogView`] when compositing.
//!
//! Cell `(i, j)` has its centre at cell-space coordinate `(i, j)`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Brush weight as a function of distance from the brush centre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Falloff {
    /// Full strength over the whole disc
    Hard,
    /// `1 - d/r`
    Linear,
    /// `1 - (d/r)^2`, flat near the centre and soft at the rim
    #[default]
    Quadratic,
}

impl Falloff {
    /// Weight at distance `d` for a brush of radius `r`; 0 outside the disc
    #[inline]
    pub fn weight(&self, d: f32, r: f32) -> f32 {
        if d > r {
            return 0.0;
        }
        let t = d / r;
        match self {
            Falloff::Hard => 1.0,
            Falloff::Linear => 1.0 - t,
            Falloff::Quadratic => 1.0 - t * t,
        }
    }
}

/// Fog coverage grid; 1.0 = fully fogged, 0.0 = clear
#[derive(Debug, Clone)]
pub struct FogMask {
    columns: usize,
    rows: usize,
    cell_size: u32,
    frame_size: Vec2,
    falloff: Falloff,
    coverage: Vec<f32>,
}

impl FogMask {
    /// Mask for a `frame_width` x `frame_height` camera frame, fully fogged
    pub fn new(frame_width: u32, frame_height: u32, cell_size: u32, falloff: Falloff) -> Self {
        let cell_size = cell_size.max(1);
        let columns = frame_width.div_ceil(cell_size).max(1) as usize;
        let rows = frame_height.div_ceil(cell_size).max(1) as usize;
        Self {
            columns,
            rows,
            cell_size,
            frame_size: Vec2::new(frame_width as f32, frame_height as f32),
            falloff,
            coverage: vec![1.0; columns * rows],
        }
    }

    /// Mask addressed directly in cells (one pixel per cell)
    pub fn with_cells(columns: u32, rows: u32, falloff: Falloff) -> Self {
        Self::new(columns, rows, 1, falloff)
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn frame_size(&self) -> Vec2 {
        self.frame_size
    }

    pub fn falloff(&self) -> Falloff {
        self.falloff
    }

    /// Coverage of one cell, `None` outside the grid
    pub fn get(&self, column: usize, row: usize) -> Option<f32> {
        (column < self.columns && row < self.rows).then(|| self.coverage[row * self.columns + column])
    }

    /// Refill every cell
    pub fn reset(&mut self) {
        self.coverage.fill(1.0);
    }

    /// Map a frame-pixel position to cell space
    pub fn frame_to_cell(&self, p: Vec2) -> Vec2 {
        p / self.cell_size as f32 - Vec2::splat(0.5)
    }

    /// Convert a length in frame pixels to cells
    pub fn pixels_to_cells(&self, length: f32) -> f32 {
        length / self.cell_size as f32
    }

    /// Remove up to `strength` coverage from every cell within `radius` of
    /// `position` (cell space), weighted by the mask's falloff.
    ///
    /// Discs partly or wholly outside the grid are clipped. Coverage never
    /// increases and never drops below 0.
    pub fn erode(&mut self, position: Vec2, radius: f32, strength: f32) {
        if !position.is_finite() || !(radius > 0.0) || !(strength > 0.0) {
            return;
        }

        let max_col = self.columns as f32 - 1.0;
        let max_row = self.rows as f32 - 1.0;
        let lo = (position - Vec2::splat(radius)).ceil();
        let hi = (position + Vec2::splat(radius)).floor();
        if hi.x < 0.0 || hi.y < 0.0 || lo.x > max_col || lo.y > max_row {
            return;
        }

        let col_start = lo.x.max(0.0) as usize;
        let col_end = hi.x.min(max_col) as usize;
        let row_start = lo.y.max(0.0) as usize;
        let row_end = hi.y.min(max_row) as usize;

        for row in row_start..=row_end {
            let line = &mut self.coverage[row * self.columns..(row + 1) * self.columns];
            for (col, cell) in line.iter_mut().enumerate().take(col_end + 1).skip(col_start) {
                let d = position.distance(Vec2::new(col as f32, row as f32));
                let w = self.falloff.weight(d, radius);
                if w > 0.0 {
                    *cell = (*cell - strength * w).max(0.0);
                }
            }
        }
    }

    /// Mean coverage over the whole grid, in [0, 1]
    pub fn coverage_fraction(&self) -> f32 {
        let sum: f64 = self.coverage.iter().map(|&c| f64::from(c)).sum();
        (sum / self.coverage.len() as f64) as f32
    }

    /// Read-only view for compositing
    pub fn view(&self) -> FogView<'_> {
        FogView { mask: self }
    }

    /// Owned copy of the grid for handing across a boundary
    pub fn snapshot(&self) -> FogSnapshot {
        FogSnapshot {
            columns: self.columns,
            rows: self.rows,
            cell_size: self.cell_size,
            coverage: self.coverage.clone(),
        }
    }
}

/// Borrowed, read-only access to a [`FogMask`]
#[derive(Debug, Clone, Copy)]
pub struct FogView<'a> {
    mask: &'a FogMask,
}

impl<'a> FogView<'a> {
    pub fn columns(&self) -> usize {
        self.mask.columns
    }

    pub fn rows(&self) -> usize {
        self.mask.rows
    }

    pub fn cell_size(&self) -> u32 {
        self.mask.cell_size
    }

    pub fn coverage_fraction(&self) -> f32 {
        self.mask.coverage_fraction()
    }

    /// Row-major coverage cells
    pub fn cells(&self) -> &'a [f32] {
        &self.mask.coverage
    }

    /// Raw bytes of the cell grid (row-major `f32`), ready for an R32Float texture upload
    pub fn as_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(&self.mask.coverage[..])
    }

    /// Coverage at a frame pixel, bilinearly interpolated between cell centres
    pub fn alpha_at_pixel(&self, x: f32, y: f32) -> f32 {
        let m = self.mask;
        let c = m.frame_to_cell(Vec2::new(x, y) + Vec2::splat(0.5));
        let cx = c.x.clamp(0.0, (m.columns - 1) as f32);
        let cy = c.y.clamp(0.0, (m.rows - 1) as f32);

        let x0 = cx.floor() as usize;
        let y0 = cy.floor() as usize;
        let x1 = (x0 + 1).min(m.columns - 1);
        let y1 = (y0 + 1).min(m.rows - 1);
        let tx = cx - x0 as f32;
        let ty = cy - y0 as f32;

        let at = |col: usize, row: usize| m.coverage[row * m.columns + col];
        let top = at(x0, y0) + (at(x1, y0) - at(x0, y0)) * tx;
        let bottom = at(x0, y1) + (at(x1, y1) - at(x0, y1)) * tx;
        top + (bottom - top) * ty
    }

    /// Full-resolution alpha plane, scaled so a fully fogged pixel is `max_alpha`
    pub fn upsample_alpha(&self, max_alpha: f32) -> Vec<u8> {
        let width = self.mask.frame_size.x as usize;
        let height = self.mask.frame_size.y as usize;
        let scale = max_alpha.clamp(0.0, 1.0) * 255.0;

        let mut out = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let a = self.alpha_at_pixel(x as f32, y as f32);
                out.push((a * scale).round() as u8);
            }
        }
        out
    }
}

/// Owned copy of the coverage grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogSnapshot {
    pub columns: usize,
    pub rows: usize,
    pub cell_size: u32,
    pub coverage: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_mask_is_fully_fogged() {
        let mask = FogMask::new(640, 360, 8, Falloff::Quadratic);
        assert_eq!(mask.columns(), 80);
        assert_eq!(mask.rows(), 45);
        assert_eq!(mask.coverage_fraction(), 1.0);
    }

    #[test]
    fn test_grid_rounds_up_partial_cells() {
        let mask = FogMask::new(681, 341, 8, Falloff::Hard);
        assert_eq!(mask.columns(), 86);
        assert_eq!(mask.rows(), 43);
    }

    #[test]
    fn test_hard_disc_scenario() {
        let mut mask = FogMask::with_cells(100, 100, Falloff::Hard);
        mask.erode(Vec2::new(50.0, 50.0), 10.0, 1.0);

        let mut cleared = 0;
        for row in 0..100 {
            for col in 0..100 {
                let d = Vec2::new(col as f32, row as f32).distance(Vec2::new(50.0, 50.0));
                let c = mask.get(col, row).unwrap();
                if d <= 10.0 {
                    assert_eq!(c, 0.0, "cell ({col}, {row}) inside the disc");
                    cleared += 1;
                } else {
                    assert_eq!(c, 1.0, "cell ({col}, {row}) outside the disc");
                }
            }
        }
        assert_eq!(cleared, 317);

        let expected = 1.0 - std::f32::consts::PI * 100.0 / 10_000.0;
        assert!((mask.coverage_fraction() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_soft_brush_falls_off() {
        let mut mask = FogMask::with_cells(50, 50, Falloff::Quadratic);
        mask.erode(Vec2::new(25.0, 25.0), 10.0, 0.5);

        let centre = mask.get(25, 25).unwrap();
        let mid = mask.get(30, 25).unwrap();
        let rim = mask.get(35, 25).unwrap();
        assert!((centre - 0.5).abs() < 1e-6);
        assert!((mid - 0.625).abs() < 1e-6);
        assert_eq!(rim, 1.0);
        assert!(centre < mid && mid < rim);
    }

    #[test]
    fn test_linear_falloff_weights() {
        assert_eq!(Falloff::Linear.weight(0.0, 10.0), 1.0);
        assert_eq!(Falloff::Linear.weight(5.0, 10.0), 0.5);
        assert_eq!(Falloff::Linear.weight(11.0, 10.0), 0.0);
        assert_eq!(Falloff::Hard.weight(10.0, 10.0), 1.0);
    }

    #[test]
    fn test_erode_clamps_at_zero() {
        let mut mask = FogMask::with_cells(10, 10, Falloff::Hard);
        for _ in 0..5 {
            mask.erode(Vec2::new(5.0, 5.0), 2.0, 0.3);
        }
        assert_eq!(mask.get(5, 5), Some(0.0));
    }

    #[test]
    fn test_out_of_bounds_is_clipped() {
        let mut mask = FogMask::with_cells(20, 20, Falloff::Hard);

        // Partly outside: only the in-grid quarter is touched
        mask.erode(Vec2::new(0.0, 0.0), 3.0, 1.0);
        assert_eq!(mask.get(0, 0), Some(0.0));
        assert_eq!(mask.get(3, 0), Some(0.0));
        assert_eq!(mask.get(4, 0), Some(1.0));

        // Wholly outside: nothing changes
        let before = mask.coverage_fraction();
        mask.erode(Vec2::new(-50.0, 10.0), 5.0, 1.0);
        mask.erode(Vec2::new(10.0, 500.0), 5.0, 1.0);
        assert_eq!(mask.coverage_fraction(), before);
    }

    #[test]
    fn test_degenerate_brush_is_noop() {
        let mut mask = FogMask::with_cells(20, 20, Falloff::Hard);
        mask.erode(Vec2::new(f32::NAN, 5.0), 5.0, 1.0);
        mask.erode(Vec2::new(5.0, 5.0), 0.0, 1.0);
        mask.erode(Vec2::new(5.0, 5.0), 5.0, -1.0);
        assert_eq!(mask.coverage_fraction(), 1.0);
    }

    #[test]
    fn test_reset_refills() {
        let mut mask = FogMask::with_cells(30, 30, Falloff::Linear);
        mask.erode(Vec2::new(15.0, 15.0), 20.0, 1.0);
        assert!(mask.coverage_fraction() < 1.0);
        mask.reset();
        assert_eq!(mask.coverage_fraction(), 1.0);
    }

    #[test]
    fn test_frame_to_cell_maps_pixel_centres() {
        let mask = FogMask::new(640, 360, 8, Falloff::Hard);
        // Centre pixel of cell (2, 1)
        assert_eq!(mask.frame_to_cell(Vec2::new(20.0, 12.0)), Vec2::new(2.0, 1.0));
        assert_eq!(mask.pixels_to_cells(80.0), 10.0);
    }

    #[test]
    fn test_view_upsamples() {
        let mut mask = FogMask::new(16, 8, 8, Falloff::Hard);
        // Clear the left cell only
        mask.erode(Vec2::new(0.0, 0.0), 0.5, 1.0);
        let view = mask.view();
        assert_eq!(view.cells(), &[0.0, 1.0]);

        // Pixels inside each cell's inner half take that cell's value
        assert_eq!(view.alpha_at_pixel(0.0, 0.0), 0.0);
        assert_eq!(view.alpha_at_pixel(15.0, 7.0), 1.0);
        // Between the two centres it blends
        let mid = view.alpha_at_pixel(7.5, 4.0);
        assert!(mid > 0.0 && mid < 1.0);

        let plane = view.upsample_alpha(1.0);
        assert_eq!(plane.len(), 16 * 8);
        assert_eq!(plane[0], 0);
        assert_eq!(plane[15], 255);

        assert_eq!(view.as_bytes().len(), 2 * std::mem::size_of::<f32>());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut mask = FogMask::with_cells(4, 4, Falloff::Hard);
        let snap = mask.snapshot();
        mask.erode(Vec2::new(1.0, 1.0), 1.0, 1.0);
        assert!(snap.coverage.iter().all(|&c| c == 1.0));
        assert_eq!(snap.columns, 4);
    }

    fn falloff_strategy() -> impl Strategy<Value = Falloff> {
        prop_oneof![
            Just(Falloff::Hard),
            Just(Falloff::Linear),
            Just(Falloff::Quadratic)
        ]
    }

    proptest! {
        /// Erosion never raises a cell and keeps every cell in [0, 1]
        #[test]
        fn prop_erosion_monotonic_and_bounded(
            falloff in falloff_strategy(),
            strokes in proptest::collection::vec(
                (-20.0f32..60.0, -20.0f32..60.0, 0.0f32..25.0, -0.5f32..1.5),
                1..40,
            )
        ) {
            let mut mask = FogMask::with_cells(40, 30, falloff);
            let mut before = mask.snapshot().coverage;
            for (x, y, radius, strength) in strokes {
                mask.erode(Vec2::new(x, y), radius, strength);
                let after = mask.snapshot().coverage;
                for (b, a) in before.iter().zip(&after) {
                    prop_assert!(a <= b);
                    prop_assert!((0.0..=1.0).contains(a));
                }
                before = after;
            }
            let fraction = mask.coverage_fraction();
            prop_assert!((0.0..=1.0).contains(&fraction));

            mask.reset();
            prop_assert_eq!(mask.coverage_fraction(), 1.0);
        }
    }
}
