use super::*;

#[test]
fn fnv_is_order_sensitive_and_stable() {
    let mut a = Fnv1a64::new_default();
    a.write_u8(1);
    a.write_u64(2);
    let mut b = Fnv1a64::new_default();
    b.write_u64(2);
    b.write_u8(1);
    assert_ne!(a.finish(), b.finish());

    let mut c = Fnv1a64::new_default();
    c.write_u8(1);
    c.write_u64(2);
    assert_eq!(a.finish(), c.finish());
}

#[test]
fn fnv_empty_is_offset_basis() {
    assert_eq!(Fnv1a64::new_default().finish(), Fnv1a64::OFFSET_BASIS);
}

#[test]
fn splitmix_signed_unit_in_range_and_deterministic() {
    let mut a = SplitMix64::new(7);
    let mut b = SplitMix64::new(7);
    for _ in 0..1000 {
        let v = a.next_signed_unit();
        assert!((-1.0..1.0).contains(&v));
        assert_eq!(v, b.next_signed_unit());
    }
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(0, 200), 0);
}

#[test]
fn smoothstep_edges() {
    assert_eq!(smoothstep(0.2, 0.4, 0.1), 0.0);
    assert_eq!(smoothstep(0.2, 0.4, 0.5), 1.0);
    assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
}
