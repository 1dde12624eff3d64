//! The shape grammar: `Leaf | FixedArray(Shape, N) | Pair(Shape, Shape) |
//! Tuple(Shape*) | DynSeq(Shape)`.
//!
//! [`Shape`] answers the three questions of spec §4.B — `PACKED_BYTES`,
//! `LEAF_COUNT`, `MEMCPY_COUNT` — purely from the type, for every *fully
//! static* member of the grammar (everything but [`DynSeq`], which only the
//! run-time codec in [`crate::runtime`] understands).
//!
//! `Tuple(S1..Sk)` is represented directly as a native Rust tuple of shapes
//! — `(Leaf<i32>, Leaf<i16>, FixedArray<Leaf<u8>, 4>)` reads exactly like
//! the spec's own `Tuple(i32, i16, FixedArray<u8,4>)` — rather than via a
//! bespoke list type, since Rust's own tuples already are the compile-time,
//! fixed-arity heterogeneous list the spec asks for.

use std::marker::PhantomData;

use crate::leaf::LeafKind;

/// A shape whose layout is fully known at compile time.
///
/// Implemented for [`Leaf`], [`FixedArray`], [`Pair`], and native Rust
/// tuples of shapes (arity 1 to 8). Not implemented for [`DynSeq`] — see
/// `spec.md` §4.B's table, which marks every `DynSeq` column "run-time
/// only".
pub trait Shape {
    /// The Rust type a value of this shape is represented by at runtime.
    type Value;

    /// `packed_bytes(S)` — exact wire length in bytes.
    const PACKED_BYTES: usize;

    /// `leaf_count(S)` — number of scalar slots reached by a full recursive walk.
    const LEAF_COUNT: usize;

    /// `memcpy_count(S)` — the same as `LEAF_COUNT`, except a `FixedArray`
    /// of a single leaf counts as one slot, not `N`.
    const MEMCPY_COUNT: usize;

    /// Whether this shape is itself a single [`Leaf`] — used by
    /// `FixedArray`'s `MEMCPY_COUNT` to decide between "one bulk slot" and
    /// "N compound slots". This is a pure slot-counting fact and is
    /// unaffected by whether the leaf's bytes can actually be bulk-copied
    /// (see [`Shape::IS_MEMCPY_SAFE`] for that).
    const IS_LEAF: bool = false;

    /// Whether `crate::static_codec`'s `FixedArray` pack/unpack may treat a
    /// contiguous run of this shape's values as raw bytes
    /// (`ptr::copy_nonoverlapping`) rather than visiting each element.
    /// `true` only for [`Leaf<T>`] where `T::TRIVIALLY_TRANSMUTABLE` holds —
    /// a `Leaf` wrapping a derived record or enum is `IS_LEAF` but not
    /// necessarily `IS_MEMCPY_SAFE`.
    const IS_MEMCPY_SAFE: bool = false;
}

/// A scalar leaf of kind `T`.
pub struct Leaf<T: LeafKind>(PhantomData<T>);

impl<T: LeafKind> Shape for Leaf<T> {
    type Value = T;
    const PACKED_BYTES: usize = T::WIDTH;
    const LEAF_COUNT: usize = 1;
    const MEMCPY_COUNT: usize = 1;
    const IS_LEAF: bool = true;
    const IS_MEMCPY_SAFE: bool = T::TRIVIALLY_TRANSMUTABLE;
}

/// `N` copies of shape `S`, arity known at compile time.
pub struct FixedArray<S, const N: usize>(PhantomData<S>);

impl<S: Shape, const N: usize> Shape for FixedArray<S, N> {
    type Value = [S::Value; N];
    const PACKED_BYTES: usize = N * S::PACKED_BYTES;
    const LEAF_COUNT: usize = N * S::LEAF_COUNT;
    const MEMCPY_COUNT: usize = if S::IS_LEAF { 1 } else { N * S::MEMCPY_COUNT };
}

/// An ordered pair of two (possibly different) shapes.
pub struct Pair<A, B>(PhantomData<(A, B)>);

impl<A: Shape, B: Shape> Shape for Pair<A, B> {
    type Value = (A::Value, B::Value);
    const PACKED_BYTES: usize = A::PACKED_BYTES + B::PACKED_BYTES;
    const LEAF_COUNT: usize = A::LEAF_COUNT + B::LEAF_COUNT;
    const MEMCPY_COUNT: usize = A::MEMCPY_COUNT + B::MEMCPY_COUNT;
}

/// A sequence whose length is known only at runtime. Only the run-time
/// codec (`crate::runtime`) can pack/unpack this; it carries no [`Shape`]
/// impl since `packed_bytes`/`leaf_count`/`memcpy_count` are undefined for
/// it at compile time (spec §4.B, §3).
pub struct DynSeq<S>(PhantomData<S>);

macro_rules! impl_tuple_shape {
    ($($t:ident),+) => {
        impl<$($t: Shape),+> Shape for ($($t,)+) {
            type Value = ($($t::Value,)+);
            const PACKED_BYTES: usize = 0 $(+ <$t as Shape>::PACKED_BYTES)+;
            const LEAF_COUNT: usize = 0 $(+ <$t as Shape>::LEAF_COUNT)+;
            const MEMCPY_COUNT: usize = 0 $(+ <$t as Shape>::MEMCPY_COUNT)+;
        }
    };
}

impl_tuple_shape!(S0);
impl_tuple_shape!(S0, S1);
impl_tuple_shape!(S0, S1, S2);
impl_tuple_shape!(S0, S1, S2, S3);
impl_tuple_shape!(S0, S1, S2, S3, S4);
impl_tuple_shape!(S0, S1, S2, S3, S4, S5);
impl_tuple_shape!(S0, S1, S2, S3, S4, S5, S6);
impl_tuple_shape!(S0, S1, S2, S3, S4, S5, S6, S7);
