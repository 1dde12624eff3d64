use byteshape::LeafKind;
use byteshape_derive::Leaf;

#[derive(Clone, Copy, Debug, PartialEq, Leaf)]
struct Vec3F {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Leaf)]
struct Vec3I {
    x: i32,
    y: i32,
    z: i32,
}

#[test]
fn width_is_sum_of_fields() {
    assert_eq!(Vec3F::WIDTH, 12);
    assert_eq!(Vec3I::WIDTH, 12);
}

#[test]
fn round_trips_through_bytes() {
    let v = Vec3F {
        x: 1.5,
        y: -2.25,
        z: 100.0,
    };
    let mut buf = [0u8; 12];
    v.write_ne_bytes(&mut buf);
    assert_eq!(Vec3F::from_ne_bytes(&buf), v);
}

#[test]
fn s7_user_defined_leaf_pair_round_trips() {
    use byteshape::shape::{Leaf, Pair, Shape};
    use byteshape::static_codec::StaticCodec;

    type S = Pair<Leaf<Vec3F>, Leaf<Vec3I>>;
    let value: <S as Shape>::Value = (
        Vec3F {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        },
        Vec3I { x: 4, y: 5, z: 6 },
    );
    assert_eq!(<S as Shape>::PACKED_BYTES, 24);
    let mut buf = [0u8; 24];
    S::pack_into_at(&value, &mut buf, 0);
    let back = S::unpack_from_at(&buf, 0);
    assert_eq!(back, value);
}
