//! Axes and variables of named einsum

use crate::symbols::ELLIPSIS;
use indexmap::IndexMap;
use std::fmt;

/// An axis declared in a variable, e.g. `i`, `i*j` or `...`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Single dimension identified by a lowercase name
    Named(String),
    /// Single dimension standing for the flattened sub-axes, e.g. `i*j`
    Product(Vec<String>),
    /// Zero or more unnamed dimensions, resolved against actual tensors
    Ellipsis,
}

impl Axis {
    /// Names referred by this axis
    ///
    /// ```
    /// use named_einsum::axis::Axis;
    ///
    /// assert_eq!(Axis::Named("i".into()).axis_names(), vec!["i"]);
    /// assert_eq!(Axis::Product(vec!["i".into(), "j".into()]).axis_names(), vec!["i", "j"]);
    /// assert!(Axis::Ellipsis.axis_names().is_empty());
    /// ```
    pub fn axis_names(&self) -> Vec<&str> {
        match self {
            Axis::Named(name) => vec![name.as_str()],
            Axis::Product(names) => names.iter().map(String::as_str).collect(),
            Axis::Ellipsis => Vec::new(),
        }
    }

    /// Number of positional subscripts this axis renders into
    ///
    /// Ellipsis renders into an unknown number of dimensions and returns zero.
    pub fn width(&self) -> usize {
        match self {
            Axis::Named(_) => 1,
            Axis::Product(names) => names.len(),
            Axis::Ellipsis => 0,
        }
    }

    pub fn is_ellipsis(&self) -> bool {
        matches!(self, Axis::Ellipsis)
    }

    /// Positional subscript representation, e.g. `AB` for `i*j` when `i -> A`, `j -> B`
    ///
    /// Every name must be registered in `mapping`.
    pub fn subscript(&self, mapping: &IndexMap<String, char>) -> String {
        match self {
            Axis::Named(name) => mapping[name.as_str()].to_string(),
            Axis::Product(names) => names.iter().map(|name| mapping[name.as_str()]).collect(),
            Axis::Ellipsis => ELLIPSIS.to_string(),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Named(name) => write!(f, "{}", name),
            Axis::Product(names) => write!(f, "{}", names.join("*")),
            Axis::Ellipsis => write!(f, "{}", ELLIPSIS),
        }
    }
}

/// A tensor in the notation, e.g. `A[i, j*k, ...]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub name: String,
    pub axes: Vec<Axis>,
}

impl Variable {
    pub fn new(name: impl Into<String>, axes: Vec<Axis>) -> Self {
        Variable {
            name: name.into(),
            axes,
        }
    }

    /// All axis names in declaration order, product axes expanded
    pub fn axis_names(&self) -> Vec<&str> {
        self.axes.iter().flat_map(|axis| axis.axis_names()).collect()
    }

    /// Axes as seen by the contraction primitive, i.e. products split into named axes
    ///
    /// ```
    /// use named_einsum::axis::{Axis, Variable};
    ///
    /// let v = Variable::new("W", vec![
    ///     Axis::Product(vec!["i".into(), "j".into()]),
    ///     Axis::Ellipsis,
    /// ]);
    /// assert_eq!(v.flattened_axes(), vec![
    ///     Axis::Named("i".into()),
    ///     Axis::Named("j".into()),
    ///     Axis::Ellipsis,
    /// ]);
    /// ```
    pub fn flattened_axes(&self) -> Vec<Axis> {
        self.axes
            .iter()
            .flat_map(|axis| match axis {
                Axis::Product(names) => names.iter().cloned().map(Axis::Named).collect(),
                axis => vec![axis.clone()],
            })
            .collect()
    }

    pub fn num_ellipses(&self) -> usize {
        self.axes.iter().filter(|axis| axis.is_ellipsis()).count()
    }

    pub fn has_ellipsis(&self) -> bool {
        self.num_ellipses() > 0
    }

    /// Positional subscripts of this variable, e.g. `A...B`
    pub fn subscript(&self, mapping: &IndexMap<String, char>) -> String {
        self.axes.iter().map(|axis| axis.subscript(mapping)).collect()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axes: Vec<String> = self.axes.iter().map(ToString::to_string).collect();
        write!(f, "{}[{}]", self.name, axes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Axis {
        Axis::Named(name.to_string())
    }

    fn product(names: &[&str]) -> Axis {
        Axis::Product(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn variable_axis_names() {
        let v = Variable::new("T", vec![named("k"), product(&["i", "j"]), Axis::Ellipsis]);
        assert_eq!(v.axis_names(), vec!["k", "i", "j"]);
        assert_eq!(v.num_ellipses(), 1);
    }

    #[test]
    fn subscript() {
        let mapping: IndexMap<String, char> = [("i", 'A'), ("j", 'B'), ("k", 'C')]
            .into_iter()
            .map(|(name, c)| (name.to_string(), c))
            .collect();
        let v = Variable::new("T", vec![product(&["i", "j"]), Axis::Ellipsis, named("k")]);
        assert_eq!(v.subscript(&mapping), "AB...C");
    }

    #[test]
    fn display() {
        let v = Variable::new("T", vec![product(&["i", "j"]), Axis::Ellipsis, named("k")]);
        assert_eq!(v.to_string(), "T[i*j, ..., k]");
    }
}
