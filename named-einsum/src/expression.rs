//! Compiled named einsum, e.g. `A[i, j], B[j, k] -> C[i, k]` into `AB,BC->AC`
use crate::{
    axis::Variable,
    error::{Error, Result},
    parser::{self, RawExpression},
    symbols::{SymbolTable, ARROW},
};
use indexmap::{IndexMap, IndexSet};
use std::{fmt, str::FromStr};

/// Default name of the output variable when it is omitted
pub const DEFAULT_OUTPUT_NAME: &str = "output";

/// Default name of the `n`-th input variable when it is omitted
pub fn default_input_name(n: usize) -> String {
    format!("input_{}", n)
}

/// Named einsum with subscript symbols assigned to every axis name
///
/// This is a pure function of the notation text,
/// and does not hold any information of actual tensors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedExpression {
    /// Input variables in declaration order
    pub inputs: Vec<Variable>,
    /// Output variable. `None` means reducing every axis into a scalar.
    pub output: Option<Variable>,
    /// Axis names appearing in inputs
    pub input_axes: IndexSet<String>,
    /// Axis names appearing in the output
    pub output_axes: IndexSet<String>,
    /// Subscript symbol of each axis name, in first-occurrence order
    pub axis_mapping: IndexMap<String, char>,
}

impl ParsedExpression {
    /// Assign subscript symbols to the axes of parsed notation
    ///
    /// ```
    /// use named_einsum::{parser, expression::ParsedExpression};
    ///
    /// let raw = parser::parse("A[x, y], B[y, z] -> C[x, z]").unwrap();
    /// let parsed = ParsedExpression::compile(raw).unwrap();
    /// assert_eq!(parsed.symbol("x"), Some('A'));
    /// assert_eq!(parsed.symbol("y"), Some('B'));
    /// assert_eq!(parsed.symbol("z"), Some('C'));
    /// ```
    pub fn compile(raw: RawExpression) -> Result<Self> {
        let inputs: Vec<Variable> = raw
            .inputs
            .into_iter()
            .enumerate()
            .map(|(n, v)| {
                Variable::new(v.name.unwrap_or_else(|| default_input_name(n)), v.axes)
            })
            .collect();
        let output = raw.output.map(|v| {
            Variable::new(
                v.name.unwrap_or_else(|| DEFAULT_OUTPUT_NAME.to_string()),
                v.axes,
            )
        });

        let mut symbols = SymbolTable::init();
        let mut axis_mapping = IndexMap::new();
        let mut input_axes = IndexSet::new();
        for input in &inputs {
            for name in input.axis_names() {
                if !axis_mapping.contains_key(name) {
                    let symbol = symbols.issue(name)?;
                    axis_mapping.insert(name.to_string(), symbol);
                }
                input_axes.insert(name.to_string());
            }
        }

        let mut output_axes = IndexSet::new();
        if let Some(output) = &output {
            for name in output.axis_names() {
                if !input_axes.contains(name) {
                    return Err(Error::AxisNotFound {
                        axis: name.to_string(),
                    });
                }
                output_axes.insert(name.to_string());
            }
        }

        Ok(ParsedExpression {
            inputs,
            output,
            input_axes,
            output_axes,
            axis_mapping,
        })
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Subscript symbol assigned to the axis `name`
    pub fn symbol(&self, name: &str) -> Option<char> {
        self.axis_mapping.get(name).copied()
    }

    /// Axes summed up by the contraction, i.e. input axes not appearing in the output
    ///
    /// ```
    /// use std::str::FromStr;
    /// use named_einsum::expression::ParsedExpression;
    ///
    /// // Matrix multiplication
    /// let parsed = ParsedExpression::from_str("A[i, j], B[j, k] -> C[i, k]").unwrap();
    /// assert_eq!(parsed.contraction_axes(), vec!["j"]);
    ///
    /// // Reduce all
    /// let parsed = ParsedExpression::from_str("A[i, j] ->").unwrap();
    /// assert_eq!(parsed.contraction_axes(), vec!["i", "j"]);
    /// ```
    pub fn contraction_axes(&self) -> Vec<&str> {
        self.input_axes
            .iter()
            .filter(|name| !self.output_axes.contains(*name))
            .map(String::as_str)
            .collect()
    }

    /// Positional subscripts for the contraction primitive, e.g. `AB,BC->AC`
    pub fn subscripts(&self) -> String {
        let inputs: Vec<String> = self
            .inputs
            .iter()
            .map(|input| input.subscript(&self.axis_mapping))
            .collect();
        let output = self
            .output
            .as_ref()
            .map(|output| output.subscript(&self.axis_mapping))
            .unwrap_or_default();
        format!("{}{}{}", inputs.join(","), ARROW, output)
    }
}

impl FromStr for ParsedExpression {
    type Err = Error;
    fn from_str(input: &str) -> Result<Self> {
        let raw = parser::parse(input)?;
        let parsed = Self::compile(raw)?;
        tracing::debug!(
            notation = input,
            subscripts = %parsed.subscripts(),
            "named einsum compiled"
        );
        Ok(parsed)
    }
}

impl fmt::Display for ParsedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.subscripts())
    }
}

/// Parse named einsum notation and assign subscript symbols
pub fn parse(input: &str) -> Result<ParsedExpression> {
    ParsedExpression::from_str(input)
}

/// Translate named einsum notation into positional subscripts
///
/// ```
/// use named_einsum::translate;
///
/// assert_eq!(translate("A[i, j], b[j] -> [i]").unwrap(), "AB,B->A");
/// assert_eq!(translate("[a] ->").unwrap(), "A->");
/// ```
pub fn translate(input: &str) -> Result<String> {
    Ok(parse(input)?.subscripts())
}
