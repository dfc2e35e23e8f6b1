//! Contraction with naive loops
//!
//! The positional subscripts, e.g. `AB,BC->AC`, are interpreted at runtime,
//! and the contraction is computed by looping over every index:
//!
//! ```text
//! for a in 0..n_a {
//!     for c in 0..n_c {
//!         for b in 0..n_b {
//!             out[(a, c)] += arg0[(a, b)] * arg1[(b, c)];
//!         }
//!     }
//! }
//! ```
//!
//! This requires $O(N^k)$ operations where $k$ is the number of distinct indices,
//! and is intended as a reference implementation rather than a fast one.

use crate::contract::Contract;
use anyhow::{bail, ensure, Result};
use ndarray::{ArrayD, ArrayViewD, IxDyn, LinalgScalar};
use nom::{
    branch::*, bytes::complete::*, character::complete::*, combinator::*, multi::*, sequence::*,
    IResult, Parser,
};
use std::collections::{btree_map::Entry, BTreeMap, BTreeSet};

/// Each subscript label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Single index, e.g. `A` or `b`
    Index(char),
    /// Ellipsis `...` representing broadcast
    Ellipsis,
}

/// Each subscript appearing in einsum, e.g. `AB`
pub type Subscript = Vec<Label>;

/// Einsum subscripts, e.g. `AB,BC->AC`
#[derive(Debug, PartialEq, Eq)]
pub struct RawSubscripts {
    /// Input subscript, `AB` and `BC`
    pub inputs: Vec<Subscript>,
    /// Output subscript. This may be empty for "implicit mode".
    pub output: Option<Subscript>,
}

/// index = `A` | ... | `Z` | `a` | ... | `z`
pub fn index(input: &str) -> IResult<&str, char> {
    satisfy(|c| c.is_ascii_alphabetic()).parse(input)
}

/// ellipsis = `...`
pub fn ellipsis(input: &str) -> IResult<&str, Label> {
    tag("...").map(|_| Label::Ellipsis).parse(input)
}

/// subscript = { [index] | [ellipsis] };
pub fn subscript(input: &str) -> IResult<&str, Subscript> {
    many0(alt((
        index.map(|c| Some(Label::Index(c))),
        ellipsis.map(Some),
        multispace1.map(|_| None),
    )))
    .map(|labels| labels.into_iter().flatten().collect())
    .parse(input)
}

/// subscripts = [subscript] {`,` [subscript]} \[ `->` [subscript] \]
pub fn subscripts(input: &str) -> IResult<&str, RawSubscripts> {
    let (input, _head) = multispace0(input)?;
    let (input, inputs) = separated_list1(char(','), subscript)(input)?;
    let (input, output) = opt(tuple((multispace0, tag("->"), multispace0, subscript))
        .map(|(_space_pre, _arrow, _space_post, output)| output))(input)?;
    Ok((input, RawSubscripts { inputs, output }))
}

impl std::str::FromStr for RawSubscripts {
    type Err = anyhow::Error;
    fn from_str(input: &str) -> Result<Self> {
        use nom::Finish;
        if let Ok((_, ss)) = all_consuming(subscripts)(input).finish() {
            Ok(ss)
        } else {
            bail!("Invalid subscripts: {}", input);
        }
    }
}

/// Dimension of the contraction, i.e. a loop variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Dim {
    /// Dimensions hidden in ellipses, counted from the beginning of the broadcast shape
    Broadcast(usize),
    Index(char),
}

/// Dimensions of an operand, one for each axis
fn operand_dims(subscript: &Subscript, ndim: usize, broadcast_ndim: usize) -> Vec<Dim> {
    let named = subscript.iter().filter(|l| **l != Label::Ellipsis).count();
    let hidden = ndim - named;
    let mut dims = Vec::with_capacity(ndim);
    for label in subscript {
        match label {
            Label::Index(c) => dims.push(Dim::Index(*c)),
            Label::Ellipsis => {
                dims.extend((broadcast_ndim - hidden..broadcast_ndim).map(Dim::Broadcast))
            }
        }
    }
    dims
}

fn ellipsis_ndim(subscript: &Subscript, ndim: usize, position: usize) -> Result<usize> {
    let ellipses = subscript.iter().filter(|l| **l == Label::Ellipsis).count();
    let named = subscript.len() - ellipses;
    match ellipses {
        0 => {
            ensure!(
                named == ndim,
                "Operand {} has {} axes, but subscripts have {} indices",
                position,
                ndim,
                named
            );
            Ok(0)
        }
        1 => {
            ensure!(
                named <= ndim,
                "Operand {} has {} axes, but subscripts have {} indices",
                position,
                ndim,
                named
            );
            Ok(ndim - named)
        }
        _ => bail!("Multiple ellipses in the subscript of operand {}", position),
    }
}

/// Evaluate positional subscripts with naive loops
///
/// Supports repeated indices in an operand (diagonals), ellipses broadcasting
/// as numpy does, and implicit output (`AB,BC` means `AB,BC->AC`).
///
/// ```
/// use named_einsum::backend::naive::naive;
/// use ndarray::array;
///
/// let a = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
/// let b = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
/// let c = naive("AB,BC->AC", &[a.view(), b.view()]).unwrap();
/// assert_eq!(c, array![[7.0, 10.0], [15.0, 22.0]].into_dyn());
/// ```
pub fn naive<A: LinalgScalar>(subscripts: &str, operands: &[ArrayViewD<'_, A>]) -> Result<ArrayD<A>> {
    let raw: RawSubscripts = subscripts.parse()?;
    if raw.inputs.len() != operands.len() {
        bail!(
            "Argument number mismatch: subscripts ({}), args ({})",
            raw.inputs.len(),
            operands.len()
        );
    }

    let mut broadcast_ndim = 0;
    for (n, (subscript, op)) in raw.inputs.iter().zip(operands).enumerate() {
        broadcast_ndim = broadcast_ndim.max(ellipsis_ndim(subscript, op.ndim(), n)?);
    }
    let dims: Vec<Vec<Dim>> = raw
        .inputs
        .iter()
        .zip(operands)
        .map(|(subscript, op)| operand_dims(subscript, op.ndim(), broadcast_ndim))
        .collect();

    // Size of each dimension. Broadcast dimensions of size 1 stretch.
    let mut sizes: BTreeMap<Dim, usize> = BTreeMap::new();
    for (n, (dims, op)) in dims.iter().zip(operands).enumerate() {
        for (&dim, &size) in dims.iter().zip(op.shape()) {
            match sizes.entry(dim) {
                Entry::Vacant(entry) => {
                    entry.insert(size);
                }
                Entry::Occupied(mut entry) => {
                    let known = *entry.get();
                    match dim {
                        Dim::Broadcast(_) if known == 1 => {
                            entry.insert(size);
                        }
                        Dim::Broadcast(_) if size == 1 => {}
                        _ => ensure!(
                            known == size,
                            "Size mismatch of {:?} in operand {}: {} and {}",
                            dim,
                            n,
                            known,
                            size
                        ),
                    }
                }
            }
        }
    }

    let output: Vec<Dim> = match &raw.output {
        Some(output) => {
            let mut out = Vec::new();
            for label in output {
                match label {
                    Label::Index(c) => {
                        ensure!(
                            sizes.contains_key(&Dim::Index(*c)),
                            "Output index {} does not appear in inputs",
                            c
                        );
                        out.push(Dim::Index(*c));
                    }
                    Label::Ellipsis => out.extend((0..broadcast_ndim).map(Dim::Broadcast)),
                }
            }
            out
        }
        None => {
            // implicit mode: broadcast dimensions, and indices appearing once in alphabetical order
            let mut count: BTreeMap<char, usize> = BTreeMap::new();
            for dim in dims.iter().flatten() {
                if let Dim::Index(c) = dim {
                    *count.entry(*c).or_insert(0) += 1;
                }
            }
            (0..broadcast_ndim)
                .map(Dim::Broadcast)
                .chain(
                    count
                        .into_iter()
                        .filter_map(|(c, n)| if n == 1 { Some(Dim::Index(c)) } else { None }),
                )
                .collect()
        }
    };
    let output_set: BTreeSet<Dim> = output.iter().copied().collect();

    // Output dimensions first, and then dimensions to be contracted
    let mut loops: Vec<Dim> = output.clone();
    for &dim in dims.iter().flatten() {
        if !output_set.contains(&dim) && !loops.contains(&dim) {
            loops.push(dim);
        }
    }
    let extents: Vec<usize> = loops.iter().map(|dim| sizes[dim]).collect();
    let position: BTreeMap<Dim, usize> = loops.iter().enumerate().map(|(n, d)| (*d, n)).collect();
    let out_pos: Vec<usize> = output.iter().map(|dim| position[dim]).collect();
    let arg_pos: Vec<Vec<usize>> = dims
        .iter()
        .map(|dims| dims.iter().map(|dim| position[dim]).collect())
        .collect();

    let out_shape: Vec<usize> = output.iter().map(|dim| sizes[dim]).collect();
    let mut out = ArrayD::<A>::zeros(IxDyn(&out_shape));
    tracing::trace!(subscripts, ?loops, ?extents, "naive contraction");
    if extents.iter().any(|&n| n == 0) {
        return Ok(out);
    }

    let mut values = vec![0_usize; loops.len()];
    let mut out_index = vec![0_usize; out_pos.len()];
    let mut arg_index: Vec<Vec<usize>> = arg_pos.iter().map(|pos| vec![0; pos.len()]).collect();
    'contraction: loop {
        let mut prod = A::one();
        for (((op, pos), index), shape) in operands
            .iter()
            .zip(&arg_pos)
            .zip(arg_index.iter_mut())
            .zip(operands.iter().map(|op| op.shape()))
        {
            for ((i, &p), &n) in index.iter_mut().zip(pos).zip(shape) {
                // broadcast dimension of size 1
                *i = if n == 1 { 0 } else { values[p] };
            }
            prod = prod * op[&index[..]];
        }
        for (i, &p) in out_index.iter_mut().zip(&out_pos) {
            *i = values[p];
        }
        let elem = &mut out[&out_index[..]];
        *elem = *elem + prod;

        // next index
        let mut k = values.len();
        loop {
            if k == 0 {
                break 'contraction;
            }
            k -= 1;
            values[k] += 1;
            if values[k] < extents[k] {
                break;
            }
            values[k] = 0;
        }
    }
    Ok(out)
}

/// Contraction primitive with [naive] loops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Naive;

impl<A: LinalgScalar> Contract<A> for Naive {
    fn contract(&self, subscripts: &str, operands: &[ArrayViewD<'_, A>]) -> Result<ArrayD<A>> {
        naive(subscripts, operands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array, Array2, Array3};

    #[test]
    fn test_subscript() {
        use nom::Finish;
        let (res, out) = subscript("A...b").finish().unwrap();
        assert_eq!(
            out,
            vec![Label::Index('A'), Label::Ellipsis, Label::Index('b')]
        );
        assert_eq!(res, "");
    }

    #[test]
    fn test_subscripts() {
        let raw: RawSubscripts = "AB,BC->AC".parse().unwrap();
        assert_eq!(raw.inputs.len(), 2);
        assert_eq!(raw.output, Some(vec![Label::Index('A'), Label::Index('C')]));

        // implicit mode
        let raw: RawSubscripts = "AB,BC".parse().unwrap();
        assert_eq!(raw.output, None);

        // scalar
        let raw: RawSubscripts = "A->".parse().unwrap();
        assert_eq!(raw.output, Some(vec![]));

        assert!("A,B->C!".parse::<RawSubscripts>().is_err());
    }

    #[test]
    fn matmul() -> Result<()> {
        let a = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        let b = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        let c = naive("AB,BC->AC", &[a.view(), b.view()])?;
        assert_eq!(c, array![[7.0, 10.0], [15.0, 22.0]].into_dyn());
        // implicit
        let c = naive("AB,BC", &[a.view(), b.view()])?;
        assert_eq!(c, array![[7.0, 10.0], [15.0, 22.0]].into_dyn());
        Ok(())
    }

    #[test]
    fn diag_and_trace() -> Result<()> {
        let a = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        assert_eq!(naive("AA->A", &[a.view()])?, array![1.0, 4.0].into_dyn());
        assert_eq!(naive("AA->", &[a.view()])?.sum(), 5.0);
        Ok(())
    }

    #[test]
    fn transpose() -> Result<()> {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]].into_dyn();
        assert_eq!(naive("AB->BA", &[a.view()])?, a.t().to_owned());
        // implicit mode sorts the output, upper case first
        assert_eq!(naive("bA", &[a.view()])?, a.t().to_owned());
        Ok(())
    }

    #[test]
    fn ellipsis_broadcast() -> Result<()> {
        let a = Array3::<f64>::ones((4, 2, 3)).into_dyn();
        let b = Array2::<f64>::ones((3, 5)).into_dyn();
        // batched matmul against a shared matrix
        let c = naive("...AB,BC->...AC", &[a.view(), b.view()])?;
        assert_eq!(c.shape(), &[4, 2, 5]);
        assert!(c.iter().all(|&x| x == 3.0));

        // size 1 stretches
        let x = Array::from_shape_vec((1, 3), vec![1.0, 2.0, 3.0])?.into_dyn();
        let y = Array::from_shape_vec((2, 1), vec![10.0, 20.0])?.into_dyn();
        let z = naive("...,...->...", &[x.view(), y.view()])?;
        assert_eq!(
            z,
            array![[10.0, 20.0, 30.0], [20.0, 40.0, 60.0]].into_dyn()
        );
        Ok(())
    }

    #[test]
    fn errors() {
        let a = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        let b = array![1.0, 2.0, 3.0].into_dyn();
        assert!(naive("AB,B->A", &[a.view()]).is_err());
        assert!(naive("AB,B->A", &[a.view(), b.view()]).is_err());
        assert!(naive("ABC->A", &[a.view()]).is_err());
        assert!(naive("AB->C", &[a.view()]).is_err());
    }

    #[test]
    fn empty() -> Result<()> {
        let a = Array2::<f64>::zeros((0, 3)).into_dyn();
        let c = naive("AB->B", &[a.view()])?;
        assert_eq!(c, array![0.0, 0.0, 0.0].into_dyn());
        Ok(())
    }
}
