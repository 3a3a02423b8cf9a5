use std::collections::VecDeque;

use crate::foundation::core::Point;
use crate::mask::buffer::AlphaMask;

pub const MIN_BRUSH_RADIUS: f32 = 1.0;
pub const MAX_BRUSH_RADIUS: f32 = 400.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushMode {
    #[default]
    Erase,
    Restore,
}

/// Pointer-armed painting state: `Idle -> Painting` on down, back to `Idle` on up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BrushState {
    Idle,
    Painting { last: Point },
}

/// Stateful brush mask editor with bounded undo/redo via buffer snapshots.
///
/// Coordinates are raster pixels of the layer being edited.
#[derive(Debug)]
pub struct BrushEditor {
    mask: AlphaMask,
    mode: BrushMode,
    radius: f32,
    hardness: f32,
    state: BrushState,
    undo: VecDeque<Vec<u8>>,
    redo: Vec<Vec<u8>>,
    depth: usize,
}

impl BrushEditor {
    pub fn new(mask: AlphaMask, undo_depth: usize) -> Self {
        Self {
            mask,
            mode: BrushMode::Erase,
            radius: 24.0,
            hardness: 0.7,
            state: BrushState::Idle,
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth: undo_depth.max(1),
        }
    }

    pub fn mask(&self) -> &AlphaMask {
        &self.mask
    }

    pub fn into_mask(self) -> AlphaMask {
        self.mask
    }

    pub fn state(&self) -> BrushState {
        self.state
    }

    pub fn mode(&self) -> BrushMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: BrushMode) {
        self.mode = mode;
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        if radius.is_finite() {
            self.radius = radius.clamp(MIN_BRUSH_RADIUS, MAX_BRUSH_RADIUS);
        }
    }

    /// Fraction of the radius painted at full strength; the rest feathers out.
    pub fn set_hardness(&mut self, hardness: f32) {
        if hardness.is_finite() {
            self.hardness = hardness.clamp(0.0, 1.0);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Start a stroke: snapshot for undo, then stamp the first dab.
    pub fn pointer_down(&mut self, p: Point) {
        if let BrushState::Painting { .. } = self.state {
            self.pointer_up();
        }
        self.push_undo();
        self.redo.clear();
        self.stamp(p);
        self.state = BrushState::Painting { last: p };
    }

    /// Extend the current stroke. Returns `false` when no stroke is active.
    pub fn pointer_move(&mut self, p: Point) -> bool {
        let BrushState::Painting { last } = self.state else {
            return false;
        };
        self.stamp_segment(last, p);
        self.state = BrushState::Painting { last: p };
        true
    }

    pub fn pointer_up(&mut self) {
        self.state = BrushState::Idle;
    }

    pub fn undo(&mut self) -> bool {
        if self.state != BrushState::Idle {
            return false;
        }
        let Some(prev) = self.undo.pop_back() else {
            return false;
        };
        self.redo.push(self.mask.data().to_vec());
        self.mask.data_mut().copy_from_slice(&prev);
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.state != BrushState::Idle {
            return false;
        }
        let Some(next) = self.redo.pop() else {
            return false;
        };
        self.undo.push_back(self.mask.data().to_vec());
        self.mask.data_mut().copy_from_slice(&next);
        true
    }

    fn push_undo(&mut self) {
        if self.undo.len() == self.depth {
            self.undo.pop_front();
        }
        self.undo.push_back(self.mask.data().to_vec());
    }

    fn stamp_segment(&mut self, a: Point, b: Point) {
        let dist = (b - a).hypot();
        let step = f64::from(self.radius * 0.25).max(0.5);
        let n = (dist / step).ceil().max(1.0) as usize;
        for i in 1..=n {
            let t = i as f64 / n as f64;
            self.stamp(a.lerp(b, t));
        }
    }

    fn stamp(&mut self, c: Point) {
        let (w, h) = self.mask.dimensions();
        if w == 0 || h == 0 {
            return;
        }
        let r = f64::from(self.radius);
        let inner = (r * f64::from(self.hardness)).min(r - 1.0).max(0.0);

        let x0 = (c.x - r).floor().max(0.0) as u32;
        let y0 = (c.y - r).floor().max(0.0) as u32;
        let x1 = ((c.x + r).ceil().max(0.0) as u32).min(w - 1);
        let y1 = ((c.y + r).ceil().max(0.0) as u32).min(h - 1);
        if c.x + r < 0.0 || c.y + r < 0.0 || x0 > x1 || y0 > y1 {
            return;
        }

        let mode = self.mode;
        let data = self.mask.data_mut();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = (Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5) - c).hypot();
                let f = if d <= inner {
                    1.0
                } else if d < r {
                    (r - d) / (r - inner)
                } else {
                    continue;
                };
                let idx = y as usize * w as usize + x as usize;
                let a = &mut data[idx];
                match mode {
                    BrushMode::Erase => {
                        let cap = (255.0 * (1.0 - f)).round() as u8;
                        *a = (*a).min(cap);
                    }
                    BrushMode::Restore => {
                        let floor = (255.0 * f).round() as u8;
                        *a = (*a).max(floor);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/brush.rs"]
mod tests;
