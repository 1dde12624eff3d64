// MIT License
//
// Copyright (c) 2019 Lukas Lueg (lukas.lueg@gmail.com)
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! `#[derive(Leaf)]` turns a plain record struct into a scalar
//! [`byteshape::LeafKind`](../byteshape/leaf/trait.LeafKind.html), so it can
//! stand in wherever the shape grammar expects a leaf (a field of a
//! [`Pair`](../byteshape/shape/struct.Pair.html), an element of a
//! [`FixedArray`](../byteshape/shape/struct.FixedArray.html), and so on).
//!
//! Every field's type must itself implement `LeafKind` (the built-in
//! numeric types all do). The generated wire layout packs fields in
//! declaration order with no padding — it has nothing to do with the
//! struct's actual in-memory layout, so `#[repr(C)]`/`#[repr(Rust)]` makes
//! no difference to the result, only to how `syn` parses field order (which
//! is source order either way).
//!
//! ```ignore
//! #[derive(Clone, Copy, byteshape_derive::Leaf)]
//! struct Vec3 {
//!     x: f32,
//!     y: f32,
//!     z: f32,
//! }
//! ```
//!
//! generates a 12-byte `LeafKind` impl: `x` at offset 0, `y` at offset 4,
//! `z` at offset 8.

extern crate proc_macro;

use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// See the crate documentation.
#[proc_macro_derive(Leaf)]
pub fn derive_leaf(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let ident = &input.ident;
    let fields = match input.data {
        Data::Struct(ref data) => match data.fields {
            Fields::Named(ref named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Leaf can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Leaf can only be derived for structs",
            ))
        }
    };

    if fields.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "Leaf cannot be derived for a struct with no fields",
        ));
    }

    let field_idents: Vec<_> = fields.iter().map(|f| f.ident.clone().unwrap()).collect();
    let field_tys: Vec<_> = fields.iter().map(|f| f.ty.clone()).collect();

    let width = quote! { 0usize #( + <#field_tys as byteshape::LeafKind>::WIDTH )* };

    let mut write_stmts = proc_macro2::TokenStream::new();
    let mut read_stmts = proc_macro2::TokenStream::new();
    let mut offset = quote! { 0usize };
    for (ident, ty) in field_idents.iter().zip(field_tys.iter()) {
        write_stmts.extend(quote! {
            byteshape::LeafKind::write_ne_bytes(
                &self.#ident,
                &mut out[(#offset)..(#offset) + <#ty as byteshape::LeafKind>::WIDTH],
            );
        });
        read_stmts.extend(quote! {
            #ident: <#ty as byteshape::LeafKind>::from_ne_bytes(
                &bytes[(#offset)..(#offset) + <#ty as byteshape::LeafKind>::WIDTH],
            ),
        });
        offset = quote! { (#offset) + <#ty as byteshape::LeafKind>::WIDTH };
    }

    Ok(quote! {
        // SAFETY: `WIDTH` is the sum of every field's own `LeafKind::WIDTH`,
        // laid out contiguously with no padding by `write_ne_bytes`/
        // `from_ne_bytes` below, which are exact inverses of each other
        // field by field.
        unsafe impl byteshape::LeafKind for #ident {
            const WIDTH: usize = #width;

            fn write_ne_bytes(&self, out: &mut [u8]) {
                #write_stmts
            }

            fn from_ne_bytes(bytes: &[u8]) -> Self {
                #ident {
                    #read_stmts
                }
            }
        }
    })
}
