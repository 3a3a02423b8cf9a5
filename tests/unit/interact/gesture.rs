use image::{Rgba, RgbaImage};

use super::*;
use crate::layer::{MAX_SCALE, MIN_SCALE};

fn canvas() -> Canvas {
    Canvas {
        width: 400,
        height: 400,
    }
}

/// One 100x100 layer at scale 1, centered.
fn setup() -> (LayerStore, LayerId) {
    let mut store = LayerStore::new(8);
    let id = store
        .add_image(
            RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255])),
            canvas(),
        )
        .unwrap();
    store.set_scale(id, 1.0).unwrap();
    (store, id)
}

const A: PointerId = PointerId(1);
const B: PointerId = PointerId(2);
const C: PointerId = PointerId(3);

#[test]
fn drag_translates_target() {
    let (mut store, id) = setup();
    let mut g = GestureController::new();
    let hit = g
        .pointer_down(A, Point::new(200.0, 200.0), &mut store, canvas())
        .unwrap();
    assert_eq!(hit, Some(id));
    assert!(matches!(g.state(), GestureState::Dragging { .. }));

    assert!(g.pointer_move(A, Point::new(230.0, 190.0), &mut store).unwrap());
    assert!(g.pointer_move(A, Point::new(240.0, 195.0), &mut store).unwrap());
    let geo = store.get(id).unwrap().props.geometry;
    assert_eq!((geo.x, geo.y), (40.0, -5.0));

    g.pointer_up(A);
    assert_eq!(g.state(), GestureState::Idle);
    assert_eq!(g.target(), None);
}

#[test]
fn miss_stays_idle() {
    let (mut store, _) = setup();
    let mut g = GestureController::new();
    let hit = g
        .pointer_down(A, Point::new(5.0, 5.0), &mut store, canvas())
        .unwrap();
    assert_eq!(hit, None);
    assert_eq!(g.state(), GestureState::Idle);
    assert!(!g.pointer_move(A, Point::new(9.0, 9.0), &mut store).unwrap());
}

#[test]
fn pinch_scales_and_follows_midpoint() {
    let (mut store, id) = setup();
    let mut g = GestureController::new();
    g.pointer_down(A, Point::new(180.0, 200.0), &mut store, canvas())
        .unwrap();
    g.pointer_down(B, Point::new(220.0, 200.0), &mut store, canvas())
        .unwrap();
    assert!(matches!(g.state(), GestureState::Pinching { .. }));

    g.pointer_move(A, Point::new(170.0, 210.0), &mut store)
        .unwrap();
    g.pointer_move(B, Point::new(250.0, 210.0), &mut store)
        .unwrap();
    let geo = store.get(id).unwrap().props.geometry;
    assert!((geo.scale - 2.0).abs() < 1e-9);
    assert!((geo.x - 10.0).abs() < 1e-9);
    assert!((geo.y - 10.0).abs() < 1e-9);
}

#[test]
fn pinch_scale_is_clamped() {
    let (mut store, id) = setup();
    let mut g = GestureController::new();
    g.pointer_down(A, Point::new(199.0, 200.0), &mut store, canvas())
        .unwrap();
    g.pointer_down(B, Point::new(201.0, 200.0), &mut store, canvas())
        .unwrap();
    g.pointer_move(B, Point::new(5000.0, 200.0), &mut store)
        .unwrap();
    assert_eq!(store.get(id).unwrap().props.geometry.scale, MAX_SCALE);

    g.pointer_move(B, Point::new(199.0, 200.0), &mut store)
        .unwrap();
    assert_eq!(store.get(id).unwrap().props.geometry.scale, MIN_SCALE);
}

#[test]
fn releasing_one_pinch_pointer_falls_back_to_drag() {
    let (mut store, id) = setup();
    let mut g = GestureController::new();
    g.pointer_down(A, Point::new(190.0, 200.0), &mut store, canvas())
        .unwrap();
    g.pointer_down(B, Point::new(210.0, 200.0), &mut store, canvas())
        .unwrap();
    g.pointer_up(A);
    match g.state() {
        GestureState::Dragging { layer, pointer, .. } => {
            assert_eq!(layer, id);
            assert_eq!(pointer, B);
        }
        other => panic!("unexpected state {other:?}"),
    }

    let before = store.get(id).unwrap().props.geometry;
    g.pointer_move(B, Point::new(215.0, 200.0), &mut store)
        .unwrap();
    let after = store.get(id).unwrap().props.geometry;
    assert!((after.x - before.x - 5.0).abs() < 1e-9);

    g.pointer_up(B);
    assert_eq!(g.state(), GestureState::Idle);
}

#[test]
fn third_pointer_is_ignored() {
    let (mut store, _) = setup();
    let mut g = GestureController::new();
    g.pointer_down(A, Point::new(190.0, 200.0), &mut store, canvas())
        .unwrap();
    g.pointer_down(B, Point::new(210.0, 200.0), &mut store, canvas())
        .unwrap();
    let hit = g
        .pointer_down(C, Point::new(200.0, 210.0), &mut store, canvas())
        .unwrap();
    assert_eq!(hit, None);
    assert!(!g.pointer_move(C, Point::new(0.0, 0.0), &mut store).unwrap());
    g.pointer_up(C);
    assert!(matches!(g.state(), GestureState::Pinching { .. }));
}

#[test]
fn cancel_resets_everything() {
    let (mut store, _) = setup();
    let mut g = GestureController::new();
    g.pointer_down(A, Point::new(200.0, 200.0), &mut store, canvas())
        .unwrap();
    g.cancel();
    assert_eq!(g.state(), GestureState::Idle);
    assert!(!g.pointer_move(A, Point::new(1.0, 1.0), &mut store).unwrap());
}
