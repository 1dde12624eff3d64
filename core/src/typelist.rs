//! Compile-time type lists and the combinators over them.
//!
//! A [`TypeList`] is a heterogeneous, compile-time cons-list of *types*
//! (`TNil`, `TCons<H, T>`). `Tuple` shapes (see [`crate::shape`]) are built
//! directly out of this list, so it doubles as the structural foundation for
//! `Pair`/`Tuple` nesting, not just a standalone utility.
//!
//! The operations mirror those asked for by the spec this crate implements:
//! `count`, `join`, `first_n`, `nth`, `repeat`, `flatten`.

use std::marker::PhantomData;

/// The empty type list.
pub struct TNil;

/// A type list with head `H` and tail `T`.
pub struct TCons<H, T>(PhantomData<(H, T)>);

/// A compile-time ordered sequence of types.
///
/// `COUNT` is the only value a `TypeList` needs to expose about itself;
/// every other operation (`Join`, `FirstN`, `Flatten`) is a distinct trait
/// so that a list can acquire new capabilities (e.g. `Flatten`) without
/// every list needing to implement it eagerly.
pub trait TypeList {
    /// Number of elements in the list.
    const COUNT: usize;
}

impl TypeList for TNil {
    const COUNT: usize = 0;
}

impl<H, T: TypeList> TypeList for TCons<H, T> {
    const COUNT: usize = 1 + T::COUNT;
}

/// `join(L1, L2)` — concatenation of two type lists.
pub trait Join<Other: TypeList>: TypeList {
    type Output: TypeList;
}

impl<Other: TypeList> Join<Other> for TNil {
    type Output = Other;
}

impl<H, T, Other> Join<Other> for TCons<H, T>
where
    T: TypeList + Join<Other>,
    Other: TypeList,
{
    type Output = TCons<H, <T as Join<Other>>::Output>;
}

/// Concatenate two lists at the type level. Shorthand for `<A as Join<B>>::Output`.
pub type Joined<A, B> = <A as Join<B>>::Output;

/// `first_n(i, L)` — the prefix of length `I` of a list, expressed as a
/// distinct zero-sized counter type per index so the recursion bottoms out
/// at the type level rather than needing `generic_const_exprs`.
pub trait FirstN<I>: TypeList {
    type Output: TypeList;
}

/// Zero, the base case for `FirstN`/`Repeat`'s Peano-style counters.
pub struct PZero;

/// The successor of `N`, i.e. `N + 1`.
pub struct PSucc<N>(PhantomData<N>);

/// A compile-time natural number. `Repeat`/`FirstN` are indexed by this
/// instead of a bare `usize` const generic, which would need nightly
/// `generic_const_exprs` to recurse on.
pub trait Peano {
    const VALUE: usize;
}

impl Peano for PZero {
    const VALUE: usize = 0;
}

impl<N: Peano> Peano for PSucc<N> {
    const VALUE: usize = 1 + N::VALUE;
}

impl<L: TypeList> FirstN<PZero> for L {
    type Output = TNil;
}

impl<H, T: TypeList, N: Peano> FirstN<PSucc<N>> for TCons<H, T>
where
    T: FirstN<N>,
{
    type Output = TCons<H, <T as FirstN<N>>::Output>;
}

/// `first_n(count(L), L) = L`, `first_n(0, L) = TNil` — exercised in tests
/// rather than encoded as a trait bound, since stating it generically would
/// require the unstable ability to compare `N::VALUE` against `L::COUNT`.
pub type FirstNOutput<L, N> = <L as FirstN<N>>::Output;

/// `nth(i, L)` — the type at index `I` of a list, indexed by the same
/// [`Peano`]-style counters as [`FirstN`]/[`Repeat`].
pub trait Nth<I> {
    type Output;
}

impl<H, T> Nth<PZero> for TCons<H, T> {
    type Output = H;
}

impl<H, T, N: Peano> Nth<PSucc<N>> for TCons<H, T>
where
    T: Nth<N>,
{
    type Output = <T as Nth<N>>::Output;
}

/// Shorthand for `<L as Nth<N>>::Output`.
pub type NthOutput<L, N> = <L as Nth<N>>::Output;

/// `repeat(T, N)` — a list of `N` copies of `T`, indexed by a [`Peano`]
/// count so the recursion happens entirely at the type level.
pub trait RepeatBy<T> {
    type Output: TypeList;
}

impl<T> RepeatBy<T> for PZero {
    type Output = TNil;
}

impl<T, N: RepeatBy<T>> RepeatBy<T> for PSucc<N> {
    type Output = TCons<T, N::Output>;
}

/// Shorthand for `<N as RepeatBy<T>>::Output`.
pub type Repeat<T, N> = <N as RepeatBy<T>>::Output;

/// `flatten(L)` — recursive flattening where nested lists are spliced in.
/// Non-list elements are wrapped into singleton lists first, per the spec.
///
/// Stable Rust has no negative reasoning ("is `H` a `TypeList` or not"), so
/// unlike the flatten this mirrors in the original template-metaprogramming
/// source (which pattern-matches on whether a parameter is itself
/// `List<...>` via partial specialization), each element of a list passed
/// to `Flatten` must say up front which case it is, by being wrapped in
/// [`Single`] (a plain leaf) or [`Nested`] (another list to splice in).
pub trait Flatten {
    type Output: TypeList;
}

impl Flatten for TNil {
    type Output = TNil;
}

/// One element of a list being flattened: either a plain type, to become a
/// singleton, or a nested list, to be spliced in. See [`Flatten`].
pub trait FlattenElem {
    type Output: TypeList;
}

/// Wraps a plain (non-list) type as a flatten input; flattens to `[T]`.
pub struct Single<T>(PhantomData<T>);

/// Wraps a nested [`TypeList`] as a flatten input; flattens to `L`'s own flattening.
pub struct Nested<L>(PhantomData<L>);

impl<T> FlattenElem for Single<T> {
    type Output = TCons<T, TNil>;
}

impl<L: TypeList + Flatten> FlattenElem for Nested<L> {
    type Output = <L as Flatten>::Output;
}

impl<H, T> Flatten for TCons<H, T>
where
    H: FlattenElem,
    T: TypeList + Flatten,
    <H as FlattenElem>::Output: Join<<T as Flatten>::Output>,
{
    type Output = Joined<<H as FlattenElem>::Output, <T as Flatten>::Output>;
}
