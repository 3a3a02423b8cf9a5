use std::collections::HashMap;

use crate::foundation::core::{Canvas, LayerId, Point, Vec2};
use crate::foundation::error::LaminaResult;
use crate::layer::LayerStore;

/// Host-assigned identity of one pointer (mouse, pen or touch contact).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointerId(pub u64);

/// Gesture state: `Idle -> Dragging` on the first pointer, `-> Pinching` on a second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging {
        layer: LayerId,
        pointer: PointerId,
        last: Point,
    },
    Pinching {
        layer: LayerId,
        pointers: [PointerId; 2],
        start_distance: f64,
        start_mid: Point,
        start_scale: f64,
        start_offset: Vec2,
    },
}

/// Maps pointer events onto translate/scale of one target layer.
#[derive(Debug)]
pub struct GestureController {
    pointers: HashMap<PointerId, Point>,
    state: GestureState,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureController {
    pub fn new() -> Self {
        Self {
            pointers: HashMap::new(),
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Layer currently being manipulated, if any.
    pub fn target(&self) -> Option<LayerId> {
        match self.state {
            GestureState::Idle => None,
            GestureState::Dragging { layer, .. } | GestureState::Pinching { layer, .. } => {
                Some(layer)
            }
        }
    }

    /// Returns the layer that became the gesture target, if any.
    pub fn pointer_down(
        &mut self,
        id: PointerId,
        p: Point,
        store: &mut LayerStore,
        canvas: Canvas,
    ) -> LaminaResult<Option<LayerId>> {
        match self.state {
            GestureState::Idle => {
                let Some(layer) = store.hit_test(p, canvas) else {
                    return Ok(None);
                };
                store.select(layer)?;
                self.pointers.insert(id, p);
                self.state = GestureState::Dragging {
                    layer,
                    pointer: id,
                    last: p,
                };
                tracing::debug!(%layer, "gesture: dragging");
                Ok(Some(layer))
            }
            GestureState::Dragging { layer, pointer, .. } if pointer != id => {
                let Some(&first) = self.pointers.get(&pointer) else {
                    return Ok(None);
                };
                self.pointers.insert(id, p);
                let g = store.get(layer)?.props.geometry;
                self.state = GestureState::Pinching {
                    layer,
                    pointers: [pointer, id],
                    start_distance: (p - first).hypot().max(1.0),
                    start_mid: first.midpoint(p),
                    start_scale: g.scale,
                    start_offset: Vec2::new(g.x, g.y),
                };
                tracing::debug!(%layer, "gesture: pinching");
                Ok(Some(layer))
            }
            // Extra pointers beyond two are ignored.
            _ => Ok(None),
        }
    }

    /// Returns `true` when the target layer's geometry changed.
    pub fn pointer_move(
        &mut self,
        id: PointerId,
        p: Point,
        store: &mut LayerStore,
    ) -> LaminaResult<bool> {
        if !self.pointers.contains_key(&id) {
            return Ok(false);
        }
        self.pointers.insert(id, p);

        match self.state {
            GestureState::Idle => Ok(false),
            GestureState::Dragging {
                layer,
                pointer,
                last,
            } => {
                if pointer != id {
                    return Ok(false);
                }
                let g = &mut store.get_mut(layer)?.props.geometry;
                let d = p - last;
                g.set_position(g.x + d.x, g.y + d.y);
                self.state = GestureState::Dragging {
                    layer,
                    pointer,
                    last: p,
                };
                Ok(true)
            }
            GestureState::Pinching {
                layer,
                pointers,
                start_distance,
                start_mid,
                start_scale,
                start_offset,
            } => {
                let (Some(&a), Some(&b)) =
                    (self.pointers.get(&pointers[0]), self.pointers.get(&pointers[1]))
                else {
                    return Ok(false);
                };
                let g = &mut store.get_mut(layer)?.props.geometry;
                g.set_scale(start_scale * (a - b).hypot() / start_distance);
                let shift = a.midpoint(b) - start_mid;
                g.set_position(start_offset.x + shift.x, start_offset.y + shift.y);
                Ok(true)
            }
        }
    }

    pub fn pointer_up(&mut self, id: PointerId) {
        if self.pointers.remove(&id).is_none() {
            return;
        }
        self.state = match self.state {
            GestureState::Pinching {
                layer, pointers, ..
            } => {
                let remaining = if pointers[0] == id {
                    pointers[1]
                } else {
                    pointers[0]
                };
                match self.pointers.get(&remaining) {
                    Some(&last) => {
                        tracing::debug!(%layer, "gesture: back to dragging");
                        GestureState::Dragging {
                            layer,
                            pointer: remaining,
                            last,
                        }
                    }
                    None => GestureState::Idle,
                }
            }
            GestureState::Dragging { pointer, .. } if pointer == id => GestureState::Idle,
            other => other,
        };
        if self.state == GestureState::Idle {
            self.pointers.clear();
        }
    }

    /// Drop every pointer, e.g. when the host loses focus.
    pub fn cancel(&mut self) {
        self.pointers.clear();
        self.state = GestureState::Idle;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interact/gesture.rs"]
mod tests;
