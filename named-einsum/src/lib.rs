#![cfg_attr(
    all(doc, not(doctest)),
    feature(prelude_import, custom_inner_attributes, proc_macro_hygiene)
)]
#![cfg_attr(all(doc, not(doctest)), katexit::katexit)]
//! Readable einsum with named axes
//!
//! Introduction
//! -------------
//! einsum writes a tensor contraction as a string of positional subscripts.
//! The multiplication of two matrices $A, B$
//! $$
//! c_{ik} = \sum_{j \in J} a_{ij} b_{jk}
//! $$
//! is written as `ij,jk->ik`, where each index must be a single character,
//! and the meaning of each character is left to the reader.
//! This becomes hard to read as the number of tensors and indices grows.
//! For example, a mass matrix of a finite element method
//! $$
//! m_{e, \alpha \beta \gamma \delta}
//!   = \sum_{x, y} \phi_{\alpha x} \phi_{\beta y} \phi_{\gamma x} \phi_{\delta y} w_x w_y J_{exy}
//! $$
//! is `AB,CD,EB,FD,B,D,GBD->GACEF` in positional subscripts.
//!
//! This crate accepts the same contraction with names:
//!
//! ```text
//! phi_ix[basis_ix, quad_x], phi_iy[basis_iy, quad_y],
//! phi_jx[basis_jx, quad_x], phi_jy[basis_jy, quad_y],
//! weight_x[quad_x], weight_y[quad_y],
//! jacobian_det[element, quad_x, quad_y]
//! -> mass[element, basis_ix, basis_iy, basis_jx, basis_jy]
//! ```
//!
//! and translates it into positional subscripts for an existing einsum implementation.
//!
//! Notation
//! ---------
//! - A variable is an optional name followed by its axes in brackets, `A[i, j]`.
//!   An input without a name is called `input_{n}`, and an output without a name `output`.
//! - Axis names are case-insensitive.
//!   An axis appearing in several inputs is summed up unless it appears in the output.
//! - `...` stands for any number of axes, matched from the right as numpy broadcasting.
//! - `i * j` is a product axis, i.e. a single axis of size $n_i n_j$ in row-major order,
//!   which is split into `i` and `j` before the contraction,
//!   and merged after the contraction if it appears in the output.
//! - The output may be omitted after `->`, which reduces every axis into a scalar.
//! - `//` starts a comment until the end of line.
//!
//! ```
//! use named_einsum::translate;
//!
//! assert_eq!(translate("A[i, j], B[j, k] -> C[i, k]").unwrap(), "AB,BC->AC");
//! assert_eq!(translate("T[i, j, k], W[i * j, r] -> Y[k, r]").unwrap(), "ABC,ABD->CD");
//! assert_eq!(translate("[..., i, j] -> [..., j, i]").unwrap(), "...AB->...BA");
//! ```
//!
//! Evaluation
//! -----------
//! The contraction itself is delegated to a primitive implementing [Contract].
//! This crate ships a reference implementation with naive loops, [backend::Naive],
//! which is used by [einsum]:
//!
//! ```
//! use named_einsum::einsum;
//! use ndarray::array;
//!
//! let x = array![[1.0, 2.0], [3.0, 4.0]];
//! let y = array![1.0, 10.0];
//! let z = einsum("x[batch, feature], y[feature] -> z[batch]", &[&x, &y]).unwrap();
//! assert_eq!(z, array![21.0, 43.0].into_dyn());
//! ```
//!
//! Use [Einsum] to choose another primitive, to skip the shape validation, or to share a
//! [cache::TranslationCache] of compiled notations.
//!

pub mod axis;
pub mod backend;
pub mod cache;
pub mod contract;
pub mod error;
pub mod expression;
pub mod parser;
pub mod shape;
pub mod symbols;

pub use contract::{contract, contract_unchecked, Contract, Einsum, EinsumConfig, Operand};
pub use error::{Error, Result};
pub use expression::{parse, translate, ParsedExpression};

use ndarray::{ArrayD, LinalgScalar};

/// Evaluate named einsum notation with the [naive loops](backend::Naive)
pub fn einsum<A: LinalgScalar>(notation: &str, operands: &[&dyn Operand<A>]) -> Result<ArrayD<A>> {
    contract(&backend::Naive, notation, operands)
}
