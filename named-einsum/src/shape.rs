//! Shape validation and materialization
//!
//! Named einsum allows axes which the positional subscripts cannot express
//! directly, i.e. ellipses resolved against the rank of actual tensors, and
//! product axes which must be split before the contraction and merged
//! after it. This module computes these shapes from the shapes of actual
//! tensors, and checks that every axis name has a single size.
//!

use crate::{
    axis::{Axis, Variable},
    error::{Error, Result},
    expression::ParsedExpression,
    symbols::ELLIPSIS,
};
use indexmap::{map::Entry, IndexMap};

/// Name of the `offset`-th dimension absorbed by the ellipsis of `owner`
///
/// These names contain `...` and thus never collide with names in the notation.
pub fn ellipsis_axis_name(owner: &str, offset: usize) -> String {
    format!("{}{}{}", owner, ELLIPSIS, offset)
}

/// Replace the ellipsis of `variable` by named axes so that it fits into `rank` dimensions
///
/// `width` is the number of dimensions each declared axis occupies.
fn expand_ellipsis(
    variable: &Variable,
    rank: usize,
    owner: &str,
    width: impl Fn(&Axis) -> usize,
) -> Result<Vec<Axis>> {
    let num_ellipses = variable.num_ellipses();
    if num_ellipses > 1 {
        return Err(Error::AmbiguousEllipses {
            variable: variable.name.clone(),
        });
    }
    let declared: usize = variable.axes.iter().map(&width).sum();
    if (num_ellipses == 0 && declared != rank) || declared > rank {
        return Err(Error::InconsistentShapeDefinition {
            variable: variable.name.clone(),
            declared,
            found: rank,
        });
    }
    let mut axes = Vec::with_capacity(rank);
    for axis in &variable.axes {
        match axis {
            Axis::Ellipsis => {
                axes.extend(
                    (0..rank - declared).map(|offset| Axis::Named(ellipsis_axis_name(owner, offset))),
                );
            }
            axis => axes.push(axis.clone()),
        }
    }
    Ok(axes)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AxisSize {
    size: usize,
    /// Tensor fixing this size first
    tensor: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Resolved,
    Pending,
}

/// Running table of the size of each axis name
#[derive(Debug, Clone, Default)]
struct SizeTable(IndexMap<String, AxisSize>);

impl SizeTable {
    /// First occurrence fixes the size, later ones must agree with it
    fn record(&mut self, axis: &str, size: usize, tensor: &str) -> Result<()> {
        match self.0.entry(axis.to_string()) {
            Entry::Occupied(entry) => {
                let known = entry.get();
                if known.size != size {
                    return Err(Error::InconsistentAxisSize {
                        axis: axis.to_string(),
                        expected: known.size,
                        found: size,
                        tensors: vec![known.tensor.clone(), tensor.to_string()],
                    });
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(AxisSize {
                    size,
                    tensor: tensor.to_string(),
                });
            }
        }
        Ok(())
    }

    fn get(&self, axis: &str) -> Option<usize> {
        self.0.get(axis).map(|known| known.size)
    }

    /// Check a product axis against the dimension `size`,
    /// inferring the size of its sub-axis if only one is unknown
    fn resolve_product(&mut self, names: &[String], size: usize, tensor: &str) -> Result<Progress> {
        let mut known = 1;
        let mut unknown = Vec::new();
        for name in names {
            match self.get(name) {
                Some(n) => known *= n,
                None => unknown.push(name),
            }
        }
        let inconsistent = || Error::InconsistentAxisSize {
            axis: names.join("*"),
            expected: known,
            found: size,
            tensors: vec![tensor.to_string()],
        };
        match unknown.as_slice() {
            [] => {
                if known != size {
                    return Err(inconsistent());
                }
                Ok(Progress::Resolved)
            }
            [name] if known != 0 => {
                if size % known != 0 {
                    return Err(inconsistent());
                }
                self.record(name, size / known, tensor)?;
                Ok(Progress::Resolved)
            }
            _ => Ok(Progress::Pending),
        }
    }
}

/// Shapes of the input tensors resolved against the notation
///
/// ```
/// use std::str::FromStr;
/// use named_einsum::{expression::ParsedExpression, shape::materialize};
///
/// let parsed = ParsedExpression::from_str("T[i, j, k], W[i*j, r] -> Y[k, r]").unwrap();
/// let plan = materialize(&parsed, &[&[11, 17, 7], &[187, 5]]).unwrap();
/// assert_eq!(plan.input_shape(1), &[11, 17, 5]);
/// assert_eq!(plan.axis_size("r"), Some(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapePlan {
    axis_sizes: IndexMap<String, usize>,
    resolved_axes: Vec<Vec<Axis>>,
    input_shapes: Vec<Vec<usize>>,
}

impl ShapePlan {
    /// Size of every axis name, including the dimensions absorbed by ellipses
    pub fn axis_sizes(&self) -> &IndexMap<String, usize> {
        &self.axis_sizes
    }

    pub fn axis_size(&self, name: &str) -> Option<usize> {
        self.axis_sizes.get(name).copied()
    }

    /// Axes of the `n`-th input, one for each dimension of the given tensor
    pub fn resolved_axes(&self, n: usize) -> &[Axis] {
        &self.resolved_axes[n]
    }

    /// Shape of the `n`-th input passed to the contraction primitive, i.e. product axes split
    pub fn input_shape(&self, n: usize) -> &[usize] {
        &self.input_shapes[n]
    }

    pub fn input_shapes(&self) -> &[Vec<usize>] {
        &self.input_shapes
    }
}

/// Validate the shapes of input tensors, and compute the shapes with product axes split
pub fn materialize(parsed: &ParsedExpression, shapes: &[&[usize]]) -> Result<ShapePlan> {
    if shapes.len() != parsed.num_inputs() {
        return Err(Error::OperandCountMismatch {
            expected: parsed.num_inputs(),
            found: shapes.len(),
        });
    }

    let resolved_axes = parsed
        .inputs
        .iter()
        .zip(shapes)
        .enumerate()
        .map(|(n, (variable, shape))| {
            expand_ellipsis(variable, shape.len(), &n.to_string(), |axis| {
                usize::from(!axis.is_ellipsis())
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut table = SizeTable::default();
    let mut products = Vec::new();
    for ((variable, axes), shape) in parsed.inputs.iter().zip(&resolved_axes).zip(shapes) {
        for (axis, &size) in axes.iter().zip(shape.iter()) {
            match axis {
                Axis::Named(name) => table.record(name, size, &variable.name)?,
                Axis::Product(names) => products.push((names, size, variable.name.as_str())),
                Axis::Ellipsis => unreachable!("ellipsis has been expanded"),
            }
        }
    }

    // A product axis may depend on the sizes inferred from another product axis
    while !products.is_empty() {
        let mut pending = Vec::new();
        for (names, size, tensor) in products.iter().copied() {
            if table.resolve_product(names, size, tensor)? == Progress::Pending {
                pending.push((names, size, tensor));
            }
        }
        if pending.len() == products.len() {
            let (names, _, _) = pending[0];
            return Err(Error::UnresolvedAxisSize {
                axis: names.join("*"),
            });
        }
        products = pending;
    }

    let input_shapes: Vec<Vec<usize>> = resolved_axes
        .iter()
        .zip(shapes)
        .map(|(axes, shape)| {
            axes.iter()
                .zip(shape.iter())
                .flat_map(|(axis, &size)| match axis {
                    Axis::Product(names) => names
                        .iter()
                        .map(|name| table.get(name).expect("product axes are resolved"))
                        .collect::<Vec<_>>(),
                    _ => vec![size],
                })
                .collect()
        })
        .collect();

    let axis_sizes: IndexMap<String, usize> = table
        .0
        .into_iter()
        .map(|(name, known)| (name, known.size))
        .collect();

    tracing::trace!(?axis_sizes, ?input_shapes, "shape plan materialized");
    Ok(ShapePlan {
        axis_sizes,
        resolved_axes,
        input_shapes,
    })
}

/// Logical shape of the output from the shape of the primitive's result
///
/// The result of the contraction primitive has product axes of the output split,
/// and they are merged into a single dimension here.
///
/// ```
/// use std::str::FromStr;
/// use named_einsum::{expression::ParsedExpression, shape::output_shape};
///
/// let parsed = ParsedExpression::from_str("C[i, l], D[j, l] -> KRP[i*j, l]").unwrap();
/// assert_eq!(output_shape(&parsed, &[3, 3, 3]).unwrap(), vec![9, 3]);
/// ```
pub fn output_shape(parsed: &ParsedExpression, raw_shape: &[usize]) -> Result<Vec<usize>> {
    let output = match &parsed.output {
        Some(output) => output,
        None => return Ok(Vec::new()),
    };
    let axes = expand_ellipsis(output, raw_shape.len(), &output.name, Axis::width)?;
    let mut dims = raw_shape.iter();
    Ok(axes
        .iter()
        .map(|axis| dims.by_ref().take(axis.width()).product::<usize>())
        .collect())
}
