//! Contraction primitives shipped with this crate
//!
//! Any [Contract](crate::contract::Contract) implementation can be used instead,
//! e.g. a binding to an optimized einsum of another array library.

pub mod naive;

pub use naive::Naive;
