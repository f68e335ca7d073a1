//! Shape-accurate collision masks
//!
//! The agent sprite is not rectangular, so pass/fail near a pipe edge depends
//! on a per-row bitmask rather than a bounding box. Pipe segments stay plain
//! axis-aligned rectangles and are tested as bit windows against the mask.

use std::sync::OnceLock;

use crate::consts::{BIRD_HEIGHT, BIRD_WIDTH};

/// A per-pixel collision mask: one `u128` row per sprite row, bit `i` set
/// when column `i` is solid. Widths up to 128 columns are supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteMask {
    width: u32,
    height: u32,
    rows: Vec<u128>,
}

impl SpriteMask {
    pub fn from_rows(width: u32, rows: Vec<u128>) -> Self {
        assert!(width <= 128, "mask wider than 128 columns");
        let height = rows.len() as u32;
        Self { width, height, rows }
    }

    /// A fully solid rectangle.
    pub fn rect(width: u32, height: u32) -> Self {
        let row = Self::window(0, width);
        Self::from_rows(width, vec![row; height as usize])
    }

    /// An elliptical silhouette inscribed in `width` x `height`, sampled at
    /// pixel centers.
    pub fn ellipse(width: u32, height: u32) -> Self {
        let rx = width as f32 / 2.0;
        let ry = height as f32 / 2.0;
        let rows = (0..height)
            .map(|y| {
                let fy = (y as f32 + 0.5 - ry) / ry;
                let mut row = 0u128;
                for x in 0..width {
                    let fx = (x as f32 + 0.5 - rx) / rx;
                    if fx * fx + fy * fy <= 1.0 {
                        row |= 1 << x;
                    }
                }
                row
            })
            .collect();
        Self::from_rows(width, rows)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn solid_at(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.rows[y as usize] & (1 << x) != 0
    }

    /// Bits set for columns `[from, to)`, clamped to the supported width.
    fn window(from: u32, to: u32) -> u128 {
        debug_assert!(from <= to && to <= 128);
        if from >= to {
            return 0;
        }
        let upper = if to == 128 { u128::MAX } else { (1 << to) - 1 };
        let lower = (1u128 << from) - 1;
        upper & !lower
    }

    /// True if any solid pixel of this mask lies inside a rectangle whose
    /// top-left corner sits at `(dx, dy)` relative to the mask's own
    /// top-left. A rectangle that only touches an edge does not overlap.
    pub fn overlaps_rect(&self, dx: i32, dy: i32, rect_w: u32, rect_h: u32) -> bool {
        let x0 = dx.clamp(0, self.width as i32) as u32;
        let x1 = dx
            .saturating_add(rect_w as i32)
            .clamp(0, self.width as i32) as u32;
        if x0 >= x1 {
            return false;
        }
        let y0 = dy.clamp(0, self.height as i32) as u32;
        let y1 = dy
            .saturating_add(rect_h as i32)
            .clamp(0, self.height as i32) as u32;
        let window = Self::window(x0, x1);
        (y0..y1).any(|y| self.rows[y as usize] & window != 0)
    }
}

/// The shared bird silhouette, derived once.
pub fn bird_mask() -> &'static SpriteMask {
    static BIRD_MASK: OnceLock<SpriteMask> = OnceLock::new();
    BIRD_MASK.get_or_init(|| SpriteMask::ellipse(BIRD_WIDTH, BIRD_HEIGHT))
}
