//! Execute named einsum with a contraction primitive
//!
//! The contraction itself is delegated to an einsum implementation taking
//! positional subscripts, e.g. `ij,jk->ik`, wrapped as a [Contract].
//! This module drives it:
//!
//! 1. translate the notation into positional subscripts (cached),
//! 2. validate the shapes of operands and split their product axes,
//! 3. call the primitive,
//! 4. merge the product axes of its result.
//!

use crate::{
    cache::TranslationCache,
    error::Result,
    expression::ParsedExpression,
    shape,
};
use ndarray::{ArrayBase, ArrayD, ArrayViewD, CowArray, Data, Dimension, IxDyn};
use std::sync::Arc;

/// Contraction primitive taking positional subscripts, e.g. `AB,BC->AC`
///
/// Any function or closure of the same signature is a primitive:
///
/// ```
/// use named_einsum::contract::contract;
/// use ndarray::{array, ArrayD, ArrayViewD};
///
/// fn trace(subscripts: &str, operands: &[ArrayViewD<f64>]) -> anyhow::Result<ArrayD<f64>> {
///     assert_eq!(subscripts, "AA->");
///     let a = &operands[0];
///     Ok(ndarray::arr0((0..a.shape()[0]).map(|i| a[[i, i]]).sum()).into_dyn())
/// }
///
/// let a = array![[1.0, 2.0], [3.0, 4.0]];
/// let tr = contract(&trace, "X[i, i] ->", &[&a]).unwrap();
/// assert_eq!(tr.iter().next(), Some(&5.0));
/// ```
pub trait Contract<A> {
    fn contract(&self, subscripts: &str, operands: &[ArrayViewD<'_, A>]) -> anyhow::Result<ArrayD<A>>;
}

impl<A, F> Contract<A> for F
where
    F: Fn(&str, &[ArrayViewD<'_, A>]) -> anyhow::Result<ArrayD<A>>,
{
    fn contract(&self, subscripts: &str, operands: &[ArrayViewD<'_, A>]) -> anyhow::Result<ArrayD<A>> {
        self(subscripts, operands)
    }
}

/// Tensor passed to einsum, i.e. any [ndarray::ArrayBase]
pub trait Operand<A> {
    fn view_dyn(&self) -> ArrayViewD<'_, A>;
}

impl<A, S, D> Operand<A> for ArrayBase<S, D>
where
    S: Data<Elem = A>,
    D: Dimension,
{
    fn view_dyn(&self) -> ArrayViewD<'_, A> {
        self.view().into_dyn()
    }
}

impl<A, T: Operand<A> + ?Sized> Operand<A> for &T {
    fn view_dyn(&self) -> ArrayViewD<'_, A> {
        (**self).view_dyn()
    }
}

/// Configuration of [Einsum]
#[derive(Debug, Clone)]
pub struct EinsumConfig {
    /// Whether to validate shapes and split/merge product axes
    pub validate_shapes: bool,
    /// Cache of translations
    pub cache: Arc<TranslationCache>,
}

impl Default for EinsumConfig {
    fn default() -> Self {
        Self {
            validate_shapes: true,
            cache: TranslationCache::global(),
        }
    }
}

impl EinsumConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables shape validation.
    ///
    /// See [contract_unchecked] for what is lost without it.
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_shapes = enabled;
        self
    }

    /// Use `cache` instead of the process-wide one.
    pub fn with_cache(mut self, cache: Arc<TranslationCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Creates a config skipping validation.
    pub fn fast() -> Self {
        Self::default().with_validation(false)
    }
}

/// Validate operands against the notation, and reshape them for the contraction primitive
///
/// Product axes are split into their sub-axes. The operands are never modified;
/// the result borrows them when the new shape is a view, and copies otherwise.
pub fn validate_and_reshape<'a, A: Clone>(
    parsed: &ParsedExpression,
    operands: &'a [ArrayViewD<'a, A>],
) -> Result<Vec<CowArray<'a, A, IxDyn>>> {
    let shapes: Vec<&[usize]> = operands.iter().map(|op| op.shape()).collect();
    let plan = shape::materialize(parsed, &shapes)?;
    operands
        .iter()
        .zip(plan.input_shapes())
        .map(|(op, shape)| -> Result<CowArray<'a, A, IxDyn>> { Ok(op.to_shape(shape.clone())?) })
        .collect()
}

fn reshape_output<A: Clone>(raw: ArrayD<A>, shape: Vec<usize>) -> Result<ArrayD<A>> {
    if raw.shape() == shape.as_slice() {
        return Ok(raw);
    }
    let raw = if raw.is_standard_layout() {
        raw
    } else {
        raw.as_standard_layout().into_owned()
    };
    Ok(raw.into_shape(shape)?)
}

fn execute<A, P>(
    primitive: &P,
    config: &EinsumConfig,
    notation: &str,
    operands: &[&dyn Operand<A>],
) -> Result<ArrayD<A>>
where
    A: Clone,
    P: Contract<A> + ?Sized,
{
    let parsed = config.cache.get_or_compile(notation)?;
    let subscripts = parsed.subscripts();
    let views: Vec<ArrayViewD<A>> = operands.iter().map(|op| op.view_dyn()).collect();
    if !config.validate_shapes {
        tracing::trace!(%subscripts, "contraction without validation");
        return Ok(primitive.contract(&subscripts, &views)?);
    }

    let reshaped = validate_and_reshape(&parsed, &views)?;
    let inputs: Vec<ArrayViewD<A>> = reshaped.iter().map(|op| op.view()).collect();
    tracing::trace!(%subscripts, "contraction");
    let raw = primitive.contract(&subscripts, &inputs)?;
    let shape = shape::output_shape(&parsed, raw.shape())?;
    reshape_output(raw, shape)
}

/// Named einsum bound to a contraction primitive
///
/// ```
/// use named_einsum::{backend::Naive, contract::Einsum};
/// use ndarray::array;
///
/// let einsum = Einsum::new(Naive);
/// let a = array![[1.0, 2.0], [3.0, 4.0]];
/// let b = array![1.0, 1.0];
/// let c = einsum.contract("A[i, j], b[j] -> c[i]", &[&a, &b]).unwrap();
/// assert_eq!(c, array![3.0, 7.0].into_dyn());
/// ```
#[derive(Debug, Clone)]
pub struct Einsum<P> {
    primitive: P,
    config: EinsumConfig,
}

impl<P> Einsum<P> {
    pub fn new(primitive: P) -> Self {
        Self::with_config(primitive, EinsumConfig::default())
    }

    pub fn with_config(primitive: P, config: EinsumConfig) -> Self {
        Einsum { primitive, config }
    }

    pub fn config(&self) -> &EinsumConfig {
        &self.config
    }

    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    /// Compiled expression of `notation`, through the cache of this instance
    pub fn translate(&self, notation: &str) -> Result<Arc<ParsedExpression>> {
        self.config.cache.get_or_compile(notation)
    }

    /// Evaluate `notation` for `operands`
    pub fn contract<A: Clone>(&self, notation: &str, operands: &[&dyn Operand<A>]) -> Result<ArrayD<A>>
    where
        P: Contract<A>,
    {
        execute(&self.primitive, &self.config, notation, operands)
    }

    /// Evaluate `notation` without validation, see [contract_unchecked]
    pub fn contract_unchecked<A: Clone>(
        &self,
        notation: &str,
        operands: &[&dyn Operand<A>],
    ) -> Result<ArrayD<A>>
    where
        P: Contract<A>,
    {
        let config = self.config.clone().with_validation(false);
        execute(&self.primitive, &config, notation, operands)
    }
}

/// Evaluate `notation` for `operands` with `primitive`
pub fn contract<A, P>(primitive: &P, notation: &str, operands: &[&dyn Operand<A>]) -> Result<ArrayD<A>>
where
    A: Clone,
    P: Contract<A> + ?Sized,
{
    execute(primitive, &EinsumConfig::default(), notation, operands)
}

/// Evaluate `notation` for `operands` with `primitive`, skipping shape validation
///
/// This is for callers who have already checked their shapes.
/// The axis-consistency guarantees of [contract] do not hold:
/// axis sizes are not checked across operands, ellipses are left to the primitive,
/// product axes of inputs are not split, and product axes of the output are not merged.
/// The result is returned exactly as the primitive computed it.
pub fn contract_unchecked<A, P>(
    primitive: &P,
    notation: &str,
    operands: &[&dyn Operand<A>],
) -> Result<ArrayD<A>>
where
    A: Clone,
    P: Contract<A> + ?Sized,
{
    execute(primitive, &EinsumConfig::fast(), notation, operands)
}
