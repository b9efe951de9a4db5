//! Screen rectangles.

use serde::{Deserialize, Serialize};

/// An axis-aligned screen rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0, 0, 1920, 1080)
    }
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Centre point as floating-point coordinates.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Split into a left part covering `ratio` of the width and the rest.
    pub fn split_horizontal(&self, ratio: f64) -> (Rect, Rect) {
        let left = (self.width as f64 * ratio.clamp(0.0, 1.0)).round() as u32;
        (
            Rect::new(self.x, self.y, left, self.height),
            Rect::new(self.x + left as i32, self.y, self.width - left, self.height),
        )
    }

    /// Split into a top part covering `ratio` of the height and the rest.
    pub fn split_vertical(&self, ratio: f64) -> (Rect, Rect) {
        let top = (self.height as f64 * ratio.clamp(0.0, 1.0)).round() as u32;
        (
            Rect::new(self.x, self.y, self.width, top),
            Rect::new(self.x, self.y + top as i32, self.width, self.height - top),
        )
    }

    /// Cut into `n` stacked rows of (nearly) equal height.
    ///
    /// The last row absorbs the rounding remainder.
    pub fn rows(&self, n: usize) -> Vec<Rect> {
        if n == 0 {
            return Vec::new();
        }
        let step = self.height / n as u32;
        (0..n)
            .map(|i| {
                let y = self.y + (step * i as u32) as i32;
                let h = if i + 1 == n {
                    self.height - step * i as u32
                } else {
                    step
                };
                Rect::new(self.x, y, self.width, h)
            })
            .collect()
    }

    /// Cut into `n` side-by-side columns of (nearly) equal width.
    pub fn columns(&self, n: usize) -> Vec<Rect> {
        if n == 0 {
            return Vec::new();
        }
        let step = self.width / n as u32;
        (0..n)
            .map(|i| {
                let x = self.x + (step * i as u32) as i32;
                let w = if i + 1 == n {
                    self.width - step * i as u32
                } else {
                    step
                };
                Rect::new(x, self.y, w, self.height)
            })
            .collect()
    }
}
