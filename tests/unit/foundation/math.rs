use super::*;

#[test]
fn fnv_hash_depends_on_every_byte() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"photogrid");
    let mut b = Fnv1a64::new_default();
    b.write_u8(b'p');
    b.write_bytes(b"hotogrid");
    assert_eq!(a.finish(), b.finish());

    let mut c = Fnv1a64::new_default();
    c.write_f64(1.0);
    let mut d = Fnv1a64::new_default();
    d.write_f64(1.0 + f64::EPSILON);
    assert_ne!(c.finish(), d.finish());
}

#[test]
fn premultiply_then_unpremultiply_keeps_opaque_and_clears_transparent() {
    let mut px = vec![200u8, 100, 50, 255, 10, 20, 30, 0, 255, 128, 0, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[200, 100, 50, 255]);
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(&px[8..12], &[128, 64, 0, 128]);

    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[200, 100, 50, 255]);
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(&px[8..12], &[255, 128, 0, 128]);
}
