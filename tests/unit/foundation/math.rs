use super::*;

#[test]
fn fnv_hash_is_incremental() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"scenecut");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"scene");
    b.write_bytes(b"cut");
    assert_eq!(a.finish(), b.finish());
    assert_ne!(a.finish(), Fnv1a64::new_default().finish());
}

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn unit_to_u8_clamps() {
    assert_eq!(unit_to_u8(-1.0), 0);
    assert_eq!(unit_to_u8(0.5), 128);
    assert_eq!(unit_to_u8(7.0), 255);
}

#[test]
fn degrees_normalize_into_half_open_range() {
    assert_eq!(normalize_degrees(0.0), 0.0);
    assert_eq!(normalize_degrees(360.0), 0.0);
    assert_eq!(normalize_degrees(-90.0), 270.0);
    assert_eq!(normalize_degrees(725.0), 5.0);
    assert_eq!(normalize_degrees(f64::NAN), 0.0);
    assert!(normalize_degrees(-1e-20) < 360.0);
}
