//! Component E: the run-time codec.
//!
//! Unlike the compile-time codec (`crate::static_codec`), sizes here are
//! only known once values are in hand, so encoding builds a `Vec<u8>` by
//! appending rather than writing into pre-offset slots, and decoding walks
//! the buffer with a cursor that advances as each piece is consumed —
//! the same shape as the teacher's own streaming `Cursor`-based reads in
//! `impl/src/generator.rs`, generalized from one generated struct to the
//! whole shape grammar.
//!
//! This is also the only codec that understands [`crate::shape::DynSeq`];
//! a `DynSeq<S>` is written as a 4-byte little-endian element count
//! followed by that many packed `S` values.
//!
//! # `FixedArray` gets a length header too
//!
//! `FixedArray<S, N>`'s arity `N` is already known at compile time, so a
//! length prefix looks redundant — but the run-time codec supports shapes
//! that embed a `DynSeq` *inside* a `FixedArray` (e.g. `FixedArray<DynSeq<S>,
//! 3>`, three independently-sized runtime sequences back to back), and a
//! single decode routine has to walk both the "N is load-bearing" case and
//! the "N is already known" case the same way to stay uniform. Writing the
//! same 4-byte header for both means `FixedArray`'s decoder is one routine
//! rather than two, at the cost of 4 redundant bytes on the wire — decided
//! in favor of decoder uniformity (see `SPEC_FULL.md` §6, resolving the
//! spec's open question about this). A mismatched header on decode is
//! reported as [`DecodeError::CapacityMismatch`] rather than silently
//! trusted, since for `FixedArray` the expected count is always known.

use crate::error::DecodeError;
use crate::leaf::LeafKind;
use crate::shape::{DynSeq, FixedArray, Leaf, Pair};

const LEN_HEADER_BYTES: usize = 4;

fn write_len_header(out: &mut Vec<u8>, len: usize) {
    out.extend_from_slice(&(len as u32).to_le_bytes());
}

fn read_len_header(buf: &[u8], cursor: &mut usize) -> Result<usize, DecodeError> {
    if buf.len() < *cursor + LEN_HEADER_BYTES {
        return Err(DecodeError::UnexpectedEof {
            needed: LEN_HEADER_BYTES,
            available: buf.len() - *cursor,
        });
    }
    let mut bytes = [0u8; LEN_HEADER_BYTES];
    bytes.copy_from_slice(&buf[*cursor..*cursor + LEN_HEADER_BYTES]);
    *cursor += LEN_HEADER_BYTES;
    Ok(u32::from_le_bytes(bytes) as usize)
}

/// The run-time codec's per-shape dispatch: encode by appending to a
/// growing buffer, decode by consuming from a cursor advancing over a
/// borrowed buffer.
pub trait RuntimeCodec {
    /// The Rust type a value of this shape is represented by at runtime.
    type Value;

    /// Exact number of bytes `value` will occupy once packed — the
    /// run-time analogue of `Shape::PACKED_BYTES`, except computed from a
    /// concrete value rather than the type alone, since `DynSeq` lengths
    /// aren't known otherwise.
    fn bytes_count(value: &Self::Value) -> usize;

    /// Append `value`'s packed representation to `out`.
    fn pack(value: &Self::Value, out: &mut Vec<u8>);

    /// Consume a packed representation from `buf` starting at `*cursor`,
    /// advancing `*cursor` past what was read.
    fn unpack(buf: &[u8], cursor: &mut usize) -> Result<Self::Value, DecodeError>;
}

impl<T: LeafKind> RuntimeCodec for Leaf<T> {
    type Value = T;

    fn bytes_count(_value: &T) -> usize {
        T::WIDTH
    }

    fn pack(value: &T, out: &mut Vec<u8>) {
        let start = out.len();
        out.resize(start + T::WIDTH, 0);
        value.write_ne_bytes(&mut out[start..]);
    }

    fn unpack(buf: &[u8], cursor: &mut usize) -> Result<T, DecodeError> {
        if buf.len() < *cursor + T::WIDTH {
            return Err(DecodeError::UnexpectedEof {
                needed: T::WIDTH,
                available: buf.len() - *cursor,
            });
        }
        let value = T::from_ne_bytes(&buf[*cursor..*cursor + T::WIDTH]);
        *cursor += T::WIDTH;
        Ok(value)
    }
}

impl<S: RuntimeCodec, const N: usize> RuntimeCodec for FixedArray<S, N> {
    type Value = [S::Value; N];

    fn bytes_count(value: &[S::Value; N]) -> usize {
        LEN_HEADER_BYTES + value.iter().map(S::bytes_count).sum::<usize>()
    }

    fn pack(value: &[S::Value; N], out: &mut Vec<u8>) {
        write_len_header(out, N);
        for elem in value {
            S::pack(elem, out);
        }
    }

    fn unpack(buf: &[u8], cursor: &mut usize) -> Result<[S::Value; N], DecodeError> {
        let found = read_len_header(buf, cursor)?;
        if found != N {
            return Err(DecodeError::CapacityMismatch { expected: N, found });
        }
        let mut values = Vec::with_capacity(N);
        for _ in 0..N {
            values.push(S::unpack(buf, cursor)?);
        }
        Ok(values
            .try_into()
            .unwrap_or_else(|_| unreachable!("exactly N elements were pushed")))
    }
}

impl<A: RuntimeCodec, B: RuntimeCodec> RuntimeCodec for Pair<A, B> {
    type Value = (A::Value, B::Value);

    fn bytes_count(value: &(A::Value, B::Value)) -> usize {
        A::bytes_count(&value.0) + B::bytes_count(&value.1)
    }

    fn pack(value: &(A::Value, B::Value), out: &mut Vec<u8>) {
        A::pack(&value.0, out);
        B::pack(&value.1, out);
    }

    fn unpack(buf: &[u8], cursor: &mut usize) -> Result<(A::Value, B::Value), DecodeError> {
        let a = A::unpack(buf, cursor)?;
        let b = B::unpack(buf, cursor)?;
        Ok((a, b))
    }
}

impl<S: RuntimeCodec> RuntimeCodec for DynSeq<S> {
    type Value = Vec<S::Value>;

    fn bytes_count(value: &Vec<S::Value>) -> usize {
        LEN_HEADER_BYTES + value.iter().map(S::bytes_count).sum::<usize>()
    }

    fn pack(value: &Vec<S::Value>, out: &mut Vec<u8>) {
        write_len_header(out, value.len());
        for elem in value {
            S::pack(elem, out);
        }
    }

    fn unpack(buf: &[u8], cursor: &mut usize) -> Result<Vec<S::Value>, DecodeError> {
        let len = read_len_header(buf, cursor)?;
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(S::unpack(buf, cursor)?);
        }
        Ok(values)
    }
}

impl<S0: RuntimeCodec> RuntimeCodec for (S0,) {
    type Value = (S0::Value,);

    fn bytes_count(value: &Self::Value) -> usize {
        S0::bytes_count(&value.0)
    }
    fn pack(value: &Self::Value, out: &mut Vec<u8>) {
        S0::pack(&value.0, out);
    }
    fn unpack(buf: &[u8], cursor: &mut usize) -> Result<Self::Value, DecodeError> {
        Ok((S0::unpack(buf, cursor)?,))
    }
}

impl<S0: RuntimeCodec, S1: RuntimeCodec> RuntimeCodec for (S0, S1) {
    type Value = (S0::Value, S1::Value);

    fn bytes_count(value: &Self::Value) -> usize {
        S0::bytes_count(&value.0) + S1::bytes_count(&value.1)
    }
    fn pack(value: &Self::Value, out: &mut Vec<u8>) {
        S0::pack(&value.0, out);
        S1::pack(&value.1, out);
    }
    fn unpack(buf: &[u8], cursor: &mut usize) -> Result<Self::Value, DecodeError> {
        Ok((S0::unpack(buf, cursor)?, S1::unpack(buf, cursor)?))
    }
}

impl<S0: RuntimeCodec, S1: RuntimeCodec, S2: RuntimeCodec> RuntimeCodec for (S0, S1, S2) {
    type Value = (S0::Value, S1::Value, S2::Value);

    fn bytes_count(value: &Self::Value) -> usize {
        S0::bytes_count(&value.0) + S1::bytes_count(&value.1) + S2::bytes_count(&value.2)
    }
    fn pack(value: &Self::Value, out: &mut Vec<u8>) {
        S0::pack(&value.0, out);
        S1::pack(&value.1, out);
        S2::pack(&value.2, out);
    }
    fn unpack(buf: &[u8], cursor: &mut usize) -> Result<Self::Value, DecodeError> {
        Ok((
            S0::unpack(buf, cursor)?,
            S1::unpack(buf, cursor)?,
            S2::unpack(buf, cursor)?,
        ))
    }
}

impl<S0: RuntimeCodec, S1: RuntimeCodec, S2: RuntimeCodec, S3: RuntimeCodec> RuntimeCodec
    for (S0, S1, S2, S3)
{
    type Value = (S0::Value, S1::Value, S2::Value, S3::Value);

    fn bytes_count(value: &Self::Value) -> usize {
        S0::bytes_count(&value.0)
            + S1::bytes_count(&value.1)
            + S2::bytes_count(&value.2)
            + S3::bytes_count(&value.3)
    }
    fn pack(value: &Self::Value, out: &mut Vec<u8>) {
        S0::pack(&value.0, out);
        S1::pack(&value.1, out);
        S2::pack(&value.2, out);
        S3::pack(&value.3, out);
    }
    fn unpack(buf: &[u8], cursor: &mut usize) -> Result<Self::Value, DecodeError> {
        Ok((
            S0::unpack(buf, cursor)?,
            S1::unpack(buf, cursor)?,
            S2::unpack(buf, cursor)?,
            S3::unpack(buf, cursor)?,
        ))
    }
}

impl<
        S0: RuntimeCodec,
        S1: RuntimeCodec,
        S2: RuntimeCodec,
        S3: RuntimeCodec,
        S4: RuntimeCodec,
    > RuntimeCodec for (S0, S1, S2, S3, S4)
{
    type Value = (S0::Value, S1::Value, S2::Value, S3::Value, S4::Value);

    fn bytes_count(value: &Self::Value) -> usize {
        S0::bytes_count(&value.0)
            + S1::bytes_count(&value.1)
            + S2::bytes_count(&value.2)
            + S3::bytes_count(&value.3)
            + S4::bytes_count(&value.4)
    }
    fn pack(value: &Self::Value, out: &mut Vec<u8>) {
        S0::pack(&value.0, out);
        S1::pack(&value.1, out);
        S2::pack(&value.2, out);
        S3::pack(&value.3, out);
        S4::pack(&value.4, out);
    }
    fn unpack(buf: &[u8], cursor: &mut usize) -> Result<Self::Value, DecodeError> {
        Ok((
            S0::unpack(buf, cursor)?,
            S1::unpack(buf, cursor)?,
            S2::unpack(buf, cursor)?,
            S3::unpack(buf, cursor)?,
            S4::unpack(buf, cursor)?,
        ))
    }
}

impl<
        S0: RuntimeCodec,
        S1: RuntimeCodec,
        S2: RuntimeCodec,
        S3: RuntimeCodec,
        S4: RuntimeCodec,
        S5: RuntimeCodec,
    > RuntimeCodec for (S0, S1, S2, S3, S4, S5)
{
    type Value = (
        S0::Value,
        S1::Value,
        S2::Value,
        S3::Value,
        S4::Value,
        S5::Value,
    );

    fn bytes_count(value: &Self::Value) -> usize {
        S0::bytes_count(&value.0)
            + S1::bytes_count(&value.1)
            + S2::bytes_count(&value.2)
            + S3::bytes_count(&value.3)
            + S4::bytes_count(&value.4)
            + S5::bytes_count(&value.5)
    }
    fn pack(value: &Self::Value, out: &mut Vec<u8>) {
        S0::pack(&value.0, out);
        S1::pack(&value.1, out);
        S2::pack(&value.2, out);
        S3::pack(&value.3, out);
        S4::pack(&value.4, out);
        S5::pack(&value.5, out);
    }
    fn unpack(buf: &[u8], cursor: &mut usize) -> Result<Self::Value, DecodeError> {
        Ok((
            S0::unpack(buf, cursor)?,
            S1::unpack(buf, cursor)?,
            S2::unpack(buf, cursor)?,
            S3::unpack(buf, cursor)?,
            S4::unpack(buf, cursor)?,
            S5::unpack(buf, cursor)?,
        ))
    }
}

impl<
        S0: RuntimeCodec,
        S1: RuntimeCodec,
        S2: RuntimeCodec,
        S3: RuntimeCodec,
        S4: RuntimeCodec,
        S5: RuntimeCodec,
        S6: RuntimeCodec,
    > RuntimeCodec for (S0, S1, S2, S3, S4, S5, S6)
{
    type Value = (
        S0::Value,
        S1::Value,
        S2::Value,
        S3::Value,
        S4::Value,
        S5::Value,
        S6::Value,
    );

    fn bytes_count(value: &Self::Value) -> usize {
        S0::bytes_count(&value.0)
            + S1::bytes_count(&value.1)
            + S2::bytes_count(&value.2)
            + S3::bytes_count(&value.3)
            + S4::bytes_count(&value.4)
            + S5::bytes_count(&value.5)
            + S6::bytes_count(&value.6)
    }
    fn pack(value: &Self::Value, out: &mut Vec<u8>) {
        S0::pack(&value.0, out);
        S1::pack(&value.1, out);
        S2::pack(&value.2, out);
        S3::pack(&value.3, out);
        S4::pack(&value.4, out);
        S5::pack(&value.5, out);
        S6::pack(&value.6, out);
    }
    fn unpack(buf: &[u8], cursor: &mut usize) -> Result<Self::Value, DecodeError> {
        Ok((
            S0::unpack(buf, cursor)?,
            S1::unpack(buf, cursor)?,
            S2::unpack(buf, cursor)?,
            S3::unpack(buf, cursor)?,
            S4::unpack(buf, cursor)?,
            S5::unpack(buf, cursor)?,
            S6::unpack(buf, cursor)?,
        ))
    }
}

impl<
        S0: RuntimeCodec,
        S1: RuntimeCodec,
        S2: RuntimeCodec,
        S3: RuntimeCodec,
        S4: RuntimeCodec,
        S5: RuntimeCodec,
        S6: RuntimeCodec,
        S7: RuntimeCodec,
    > RuntimeCodec for (S0, S1, S2, S3, S4, S5, S6, S7)
{
    type Value = (
        S0::Value,
        S1::Value,
        S2::Value,
        S3::Value,
        S4::Value,
        S5::Value,
        S6::Value,
        S7::Value,
    );

    fn bytes_count(value: &Self::Value) -> usize {
        S0::bytes_count(&value.0)
            + S1::bytes_count(&value.1)
            + S2::bytes_count(&value.2)
            + S3::bytes_count(&value.3)
            + S4::bytes_count(&value.4)
            + S5::bytes_count(&value.5)
            + S6::bytes_count(&value.6)
            + S7::bytes_count(&value.7)
    }
    fn pack(value: &Self::Value, out: &mut Vec<u8>) {
        S0::pack(&value.0, out);
        S1::pack(&value.1, out);
        S2::pack(&value.2, out);
        S3::pack(&value.3, out);
        S4::pack(&value.4, out);
        S5::pack(&value.5, out);
        S6::pack(&value.6, out);
        S7::pack(&value.7, out);
    }
    fn unpack(buf: &[u8], cursor: &mut usize) -> Result<Self::Value, DecodeError> {
        Ok((
            S0::unpack(buf, cursor)?,
            S1::unpack(buf, cursor)?,
            S2::unpack(buf, cursor)?,
            S3::unpack(buf, cursor)?,
            S4::unpack(buf, cursor)?,
            S5::unpack(buf, cursor)?,
            S6::unpack(buf, cursor)?,
            S7::unpack(buf, cursor)?,
        ))
    }
}

/// Packs `value` into a freshly allocated buffer, growing exactly to
/// `S::bytes_count(value)`.
pub fn pack<S: RuntimeCodec>(value: &S::Value) -> Vec<u8> {
    let mut out = Vec::with_capacity(S::bytes_count(value));
    S::pack(value, &mut out);
    out
}

/// Unpacks a complete value of shape `S` from the start of `buf`.
pub fn unpack<S: RuntimeCodec>(buf: &[u8]) -> Result<S::Value, DecodeError> {
    let mut cursor = 0;
    S::unpack(buf, &mut cursor)
}

/// Packs `value` and writes it directly to `w` — the run-time codec's
/// analogue of the teacher's `write_to` (`impl/src/generator.rs`).
pub fn pack_to<S: RuntimeCodec, W: std::io::Write>(
    value: &S::Value,
    w: &mut W,
) -> std::io::Result<()> {
    w.write_all(&pack::<S>(value))
}

/// Reads all remaining bytes from `r` and unpacks a value of shape `S` from
/// them — the run-time codec's analogue of the teacher's `read_from`.
///
/// Unlike the teacher's fixed-size `read_from`, a run-time shape's length
/// isn't known up front (a `DynSeq` can appear anywhere in it), so this
/// reads the reader to exhaustion first rather than reading exactly
/// `SIZE` bytes.
pub fn unpack_from_reader<S: RuntimeCodec, R: std::io::Read>(
    r: &mut R,
) -> std::io::Result<S::Value> {
    let mut buf = Vec::new();
    r.read_to_end(&mut buf)?;
    unpack::<S>(&buf).map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s4_flat_sizing() {
        // S4: Tuple(i16, Pair<i32,i32>, FixedArray<i8,5>) -> bytes_count 19
        // plus the length header this codec always writes for FixedArray.
        type S = (Leaf<i16>, Pair<Leaf<i32>, Leaf<i32>>, FixedArray<Leaf<i8>, 5>);
        let value: <S as RuntimeCodec>::Value = (1, (2, 3), [1, 2, 3, 4, 5]);
        let expected = 2 + 8 + (LEN_HEADER_BYTES + 5);
        assert_eq!(S::bytes_count(&value), expected);

        let packed = pack::<S>(&value);
        assert_eq!(packed.len(), expected);
        let back = unpack::<S>(&packed).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn s5_container_sizing() {
        // S5: bytes_count(FixedArray<u8,3>, DynSeq<i16>x4, DynSeq<i32>x3,
        // DynSeq<i64>x4, DynSeq<f32>x3) = (3+4*2+3*4+4*8+3*4) + 5*H
        // = 67 + 20 = 87, H = 4.
        type S = (
            FixedArray<Leaf<u8>, 3>,
            DynSeq<Leaf<i16>>,
            DynSeq<Leaf<i32>>,
            DynSeq<Leaf<i64>>,
            DynSeq<Leaf<f32>>,
        );
        let value: <S as RuntimeCodec>::Value = (
            [1, 2, 3],
            vec![1, 2, 3, 4],
            vec![1, 2, 3],
            vec![1, 2, 3, 4],
            vec![1.0, 2.0, 3.0],
        );
        let packed = pack::<S>(&value);
        assert_eq!(packed.len(), 87);
        let back = unpack::<S>(&packed).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn s6_nested_round_trip() {
        // S6: Pair(FixedArray<i32,3>[1,2,3], DynSeq<i32>[4,5,6,7]) joined
        // with Tuple(DynSeq<DynSeq<i32>>[[8,9],[9,10,11],[11,12]],
        // DynSeq<i32>[13,14,15], i32 16).
        type S = (
            Pair<FixedArray<Leaf<i32>, 3>, DynSeq<Leaf<i32>>>,
            (DynSeq<DynSeq<Leaf<i32>>>, DynSeq<Leaf<i32>>, Leaf<i32>),
        );
        let value: <S as RuntimeCodec>::Value = (
            ([1, 2, 3], vec![4, 5, 6, 7]),
            (
                vec![vec![8, 9], vec![9, 10, 11], vec![11, 12]],
                vec![13, 14, 15],
                16,
            ),
        );
        let packed = pack::<S>(&value);
        assert_eq!(packed.len(), S::bytes_count(&value));
        let back = unpack::<S>(&packed).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn fixed_array_capacity_mismatch_is_reported() {
        type S = FixedArray<Leaf<i32>, 3>;
        let value: <S as RuntimeCodec>::Value = [1, 2, 3];
        let mut packed = pack::<S>(&value);
        packed[0] = 99; // corrupt the length header's low byte
        let err = unpack::<S>(&packed).unwrap_err();
        assert_eq!(
            err,
            DecodeError::CapacityMismatch {
                expected: 3,
                found: 99
            }
        );
    }

    #[test]
    fn unexpected_eof_is_reported() {
        type S = Leaf<i64>;
        let err = unpack::<S>(&[0u8; 3]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedEof {
                needed: 8,
                available: 3
            }
        );
    }

    #[test]
    fn pack_to_and_unpack_from_reader_round_trip() {
        type S = (Leaf<i32>, DynSeq<Leaf<i16>>);
        let value: <S as RuntimeCodec>::Value = (7, vec![1, 2, 3, 4]);

        let mut written = Vec::new();
        pack_to::<S, _>(&value, &mut written).unwrap();
        assert_eq!(written, pack::<S>(&value));

        let back = unpack_from_reader::<S, _>(&mut &written[..]).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn unpack_from_reader_surfaces_decode_errors_as_invalid_data() {
        type S = FixedArray<Leaf<i32>, 3>;
        let mut packed = pack::<S>(&[1, 2, 3]);
        packed[0] = 99;
        let err = unpack_from_reader::<S, _>(&mut &packed[..]).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
