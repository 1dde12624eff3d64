//! Worked examples of `byteshape`'s two codecs, one per scenario named in
//! the core crate's design notes. Each module is a minimal, runnable
//! illustration rather than a test suite — see `byteshape`'s own
//! `#[cfg(test)]` modules for the properties these shapes are expected to
//! satisfy.

pub mod flat_primitives {
    //! Flat primitives packed with the compile-time codec.
    use byteshape::shape::{FixedArray, Leaf, Shape};
    use byteshape::static_codec::StaticCodec;

    pub type Record = (
        Leaf<u16>,
        Leaf<u32>,
        Leaf<u64>,
        Leaf<f32>,
        Leaf<f64>,
        FixedArray<Leaf<i32>, 3>,
    );

    pub fn roundtrip() -> <Record as Shape>::Value {
        let value: <Record as Shape>::Value = (42, 254, 1337, 3.14, 9.81, [1, 2, 3]);
        let packed = byteshape::static_codec::pack::<Record>(&value);
        assert_eq!(packed.len(), 38);
        byteshape::static_codec::unpack::<Record>(&packed)
    }
}

pub mod nested_offsets {
    //! The compile-time offset table for a small heterogeneous tuple.
    use byteshape::offset::prefix_sum_offsets;

    pub fn offsets() -> [usize; 5] {
        prefix_sum_offsets([1usize, 4, 4, 12, 8])
    }
}

pub mod dynamic_inventory {
    //! A warehouse-style inventory record mixing a fixed header with a
    //! runtime-length line-item list, packed with the run-time codec.
    use byteshape::runtime::RuntimeCodec;
    use byteshape::shape::{DynSeq, Leaf, Pair};

    pub type LineItem = Pair<Leaf<i32>, Leaf<i16>>; // (sku, quantity)
    pub type Inventory = (Leaf<i32>, DynSeq<LineItem>); // (warehouse id, items)

    pub fn roundtrip() -> <Inventory as RuntimeCodec>::Value {
        let value: <Inventory as RuntimeCodec>::Value =
            (7, vec![(100, 4), (101, 12), (102, 1)]);
        let packed = byteshape::runtime::pack::<Inventory>(&value);
        byteshape::runtime::unpack::<Inventory>(&packed).expect("well-formed buffer")
    }
}

pub mod user_leaf {
    //! A user-defined 12-byte leaf record registered via the derive macro.
    use byteshape::shape::{Pair, Shape};
    use byteshape::static_codec::StaticCodec;
    use byteshape_derive::Leaf;

    #[derive(Clone, Copy, Debug, PartialEq, Leaf)]
    pub struct Vec3F {
        pub x: f32,
        pub y: f32,
        pub z: f32,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Leaf)]
    pub struct Vec3I {
        pub x: i32,
        pub y: i32,
        pub z: i32,
    }

    pub type Shapes = Pair<byteshape::shape::Leaf<Vec3F>, byteshape::shape::Leaf<Vec3I>>;

    pub fn roundtrip() -> <Shapes as Shape>::Value {
        let value: <Shapes as Shape>::Value = (
            Vec3F {
                x: 1.0,
                y: 2.0,
                z: 3.0,
            },
            Vec3I { x: 4, y: 5, z: 6 },
        );
        let mut buf = [0u8; 24];
        Shapes::pack_into_at(&value, &mut buf, 0);
        Shapes::unpack_from_at(&buf, 0)
    }
}
