use super::*;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn primaries_have_expected_hues() {
    assert!(approx(rgb_to_hsv(255, 0, 0).h, 0.0));
    assert!(approx(rgb_to_hsv(0, 255, 0).h, 120.0));
    assert!(approx(rgb_to_hsv(0, 0, 255).h, 240.0));
    assert!(approx(rgb_to_hsv(255, 0, 255).h, 300.0));
}

#[test]
fn gray_has_no_saturation() {
    let hsv = rgb_to_hsv(90, 90, 90);
    assert_eq!(hsv.s, 0.0);
    assert!(approx(hsv.v, 90.0 / 255.0));
    assert_eq!(rgb_to_hsv(0, 0, 0).s, 0.0);
}

#[test]
fn hue_distance_wraps() {
    assert!(approx(hue_distance(350.0, 10.0), 20.0));
    assert!(approx(hue_distance(10.0, 350.0), 20.0));
    assert!(approx(hue_distance(0.0, 180.0), 180.0));
}

#[test]
fn luma_weights_sum_to_one() {
    assert!(approx(luma(255.0, 255.0, 255.0), 255.0));
}
