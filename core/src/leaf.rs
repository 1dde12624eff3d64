//! Leaf types: the scalar numeric/enumeration building blocks of a shape.
//!
//! A leaf is "a fixed-width numeric or enumeration type with a fixed byte
//! width" (spec §3). Every in-box numeric primitive implements
//! [`LeafKind`]; user enums and user records implement it too, either by
//! hand or via `#[derive(byteshape_derive::Leaf)]` for records (see the
//! `derive` crate).

/// A scalar value with a statically known, host-native byte representation.
///
/// # Safety
///
/// Implementers must guarantee that `WIDTH == std::mem::size_of::<Self>()`
/// and that `from_ne_bytes` applied to the bytes produced by
/// `write_ne_bytes` reconstructs a value indistinguishable from the
/// original (bit for bit, for everything but the sign of NaN payloads).
/// For `#[repr(int)]` enums this additionally requires that every bit
/// pattern the codec can hand back from the wire is a valid discriminant —
/// the core does not validate enum discriminants on decode (spec §7 names
/// no such error).
pub unsafe trait LeafKind: Copy + Sized + 'static {
    /// Number of bytes this leaf occupies in its wire (and in-memory) form.
    const WIDTH: usize;

    /// Whether a contiguous run of `Self` can be bulk-copied as raw bytes
    /// via `ptr::copy_nonoverlapping` (`crate::static_codec`'s `FixedArray`
    /// fast path) instead of going through `write_ne_bytes`/`from_ne_bytes`
    /// one element at a time.
    ///
    /// Only `true` for the built-in numeric primitives, where `WIDTH ==
    /// size_of::<Self>()` by construction and there is no padding or field
    /// reordering between the in-memory and wire representations. A
    /// composite leaf (a `#[repr(int)]` enum, or a
    /// `#[derive(byteshape_derive::Leaf)]` record) packs its wire form
    /// field by field and has no such guarantee — `WIDTH` there is the sum
    /// of the fields' own widths, which need not equal
    /// `size_of::<Self>()` once Rust's layout is free to insert padding or
    /// reorder fields. Leaving this `false` by default means every leaf
    /// type is correct out of the box; only the numeric impls opt into the
    /// faster path.
    const TRIVIALLY_TRANSMUTABLE: bool = false;

    /// Write `self`'s native-endian representation into `out`.
    ///
    /// `out.len()` is always exactly `Self::WIDTH`.
    fn write_ne_bytes(&self, out: &mut [u8]);

    /// Reconstruct a value from its native-endian representation.
    ///
    /// `bytes.len()` is always exactly `Self::WIDTH`.
    fn from_ne_bytes(bytes: &[u8]) -> Self;
}

macro_rules! impl_leaf_numeric {
    ($($t:ty),* $(,)?) => {
        $(
            // SAFETY: `WIDTH` matches `size_of::<$t>()`, and `$t::to_ne_bytes`/
            // `$t::from_ne_bytes` are exact inverses of each other.
            unsafe impl LeafKind for $t {
                const WIDTH: usize = std::mem::size_of::<$t>();
                const TRIVIALLY_TRANSMUTABLE: bool = true;

                fn write_ne_bytes(&self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_ne_bytes());
                }

                fn from_ne_bytes(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_ne_bytes(buf)
                }
            }
        )*
    };
}

impl_leaf_numeric!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

/// Registers a `#[repr(int)]` enum as a [`LeafKind`] whose wire form is its
/// underlying integer representation.
///
/// This is the hand-written equivalent of `#[derive(byteshape_derive::Leaf)]`
/// for enums (the derive macro only covers struct records, per §4.B of the
/// spec this realizes — enum discriminant extraction needs a `match`, which
/// the derive macro would have to regenerate per-variant, so it is left to
/// this macro or a manual impl).
///
/// # Safety
///
/// The caller must guarantee every `$repr` bit pattern the codec can ever
/// hand back corresponds to a valid discriminant of `$ty` — out-of-range
/// bytes on decode are undefined behavior, exactly as for a raw
/// `std::mem::transmute` from `$repr` to `$ty`.
#[macro_export]
macro_rules! impl_leaf_enum {
    ($ty:ty, $repr:ty) => {
        // SAFETY: forwarded to the macro's own safety contract.
        unsafe impl $crate::leaf::LeafKind for $ty {
            const WIDTH: usize = std::mem::size_of::<$repr>();

            fn write_ne_bytes(&self, out: &mut [u8]) {
                (*self as $repr).write_ne_bytes(out)
            }

            fn from_ne_bytes(bytes: &[u8]) -> Self {
                let repr = <$repr as $crate::leaf::LeafKind>::from_ne_bytes(bytes);
                unsafe { std::mem::transmute::<$repr, $ty>(repr) }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_size_of() {
        assert_eq!(i8::WIDTH, 1);
        assert_eq!(u16::WIDTH, 2);
        assert_eq!(i32::WIDTH, 4);
        assert_eq!(u64::WIDTH, 8);
        assert_eq!(f32::WIDTH, 4);
        assert_eq!(f64::WIDTH, 8);
    }

    #[test]
    fn round_trips_through_bytes() {
        let mut buf = [0u8; 8];
        42i64.write_ne_bytes(&mut buf);
        assert_eq!(i64::from_ne_bytes(&buf), 42);

        let mut buf = [0u8; 4];
        std::f32::consts::PI.write_ne_bytes(&mut buf);
        assert_eq!(f32::from_ne_bytes(&buf), std::f32::consts::PI);
    }

    #[repr(i32)]
    #[derive(Copy, Clone, Debug, PartialEq)]
    enum Color {
        Red = 0,
        Green = 1,
        Blue = 2,
    }
    impl_leaf_enum!(Color, i32);

    #[test]
    fn enum_leaf_round_trips() {
        let mut buf = [0u8; 4];
        Color::Blue.write_ne_bytes(&mut buf);
        assert_eq!(Color::from_ne_bytes(&buf), Color::Blue);
        assert_eq!(Color::WIDTH, 4);
    }

    #[test]
    fn only_numeric_primitives_are_trivially_transmutable() {
        assert!(i32::TRIVIALLY_TRANSMUTABLE);
        assert!(f64::TRIVIALLY_TRANSMUTABLE);
        // impl_leaf_enum does not opt in: its WIDTH is the repr's width,
        // not necessarily size_of::<Self>().
        assert!(!Color::TRIVIALLY_TRANSMUTABLE);
    }
}
