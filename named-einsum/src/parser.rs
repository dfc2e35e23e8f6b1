//! Parse named einsum notation
//!
//! These parsers are implemented using [nom](https://github.com/Geal/nom),
//! and corresponding EBNF-like schema are written in each document page.
//!

use crate::{
    axis::Axis,
    error::{Error, Result},
    symbols::{ARROW, ELLIPSIS},
};
use nom::{
    branch::*, bytes::complete::*, character::complete::*, combinator::*, multi::*, sequence::*,
    IResult, Parser,
};

/// Variable as written, before default names are given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVariable {
    /// `A` in `A[i, j]`, may be omitted as `[i, j]`
    pub name: Option<String>,
    pub axes: Vec<Axis>,
}

/// Named einsum as written, e.g. `A[i, j], B[j, k] -> C[i, k]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExpression {
    pub inputs: Vec<RawVariable>,
    /// Absent for `A[i] ->`, i.e. reduce into a scalar
    pub output: Option<RawVariable>,
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: Parser<&'a str, O, nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

/// name = (`A`-`Z` | `a`-`z` | `_`) { `A`-`Z` | `a`-`z` | `0`-`9` | `_` }
pub fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

/// axis = `...` | [name] { `*` [name] }
///
/// Axis names are case-insensitive and normalized into lower case.
pub fn axis(input: &str) -> IResult<&str, Axis> {
    alt((
        tag(ELLIPSIS).map(|_| Axis::Ellipsis),
        separated_list1(ws(char('*')), name).map(|names| {
            let mut names: Vec<String> = names.into_iter().map(str::to_lowercase).collect();
            if names.len() == 1 {
                Axis::Named(names.remove(0))
            } else {
                Axis::Product(names)
            }
        }),
    ))
    .parse(input)
}

/// axes = `[` \[ [axis] { `,` [axis] } \] `]`
pub fn axes(input: &str) -> IResult<&str, Vec<Axis>> {
    preceded(
        char('['),
        cut(delimited(
            multispace0,
            separated_list0(ws(char(',')), axis),
            pair(multispace0, char(']')),
        )),
    )
    .parse(input)
}

/// variable = \[ [name] \] [axes] | [name]
pub fn variable(input: &str) -> IResult<&str, RawVariable> {
    alt((
        pair(opt(name), preceded(multispace0, axes)).map(|(name, axes)| RawVariable {
            name: name.map(str::to_string),
            axes,
        }),
        name.map(|name| RawVariable {
            name: Some(name.to_string()),
            axes: Vec::new(),
        }),
    ))
    .parse(input)
}

/// einsum = [variable] { `,` [variable] } `->` \[ [variable] \]
pub fn einsum(input: &str) -> IResult<&str, RawExpression> {
    let (input, _head) = multispace0(input)?;
    let (input, inputs) = separated_list1(ws(char(',')), variable)(input)?;
    let (input, _arrow) = ws(tag(ARROW))(input)?;
    let (input, output) = opt(variable)(input)?;
    let (input, _tail) = multispace0(input)?;
    Ok((input, RawExpression { inputs, output }))
}

/// Blank out `//` comments, keeping the byte offsets of the other text
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for line in input.split_inclusive('\n') {
        let body = line.trim_end_matches(|c| c == '\n' || c == '\r');
        match body.find("//") {
            Some(start) => {
                out.push_str(&body[..start]);
                out.extend(std::iter::repeat(' ').take(body.len() - start));
                out.push_str(&line[body.len()..]);
            }
            None => out.push_str(line),
        }
    }
    out
}

/// Parse a named einsum notation text
///
/// ```
/// use named_einsum::{axis::Axis, parser::parse};
///
/// let raw = parse("A[i, j*k] -> [...]").unwrap();
/// assert_eq!(raw.inputs[0].name.as_deref(), Some("A"));
/// assert_eq!(raw.inputs[0].axes[1], Axis::Product(vec!["j".into(), "k".into()]));
/// assert_eq!(raw.output.unwrap().axes, vec![Axis::Ellipsis]);
/// ```
pub fn parse(input: &str) -> Result<RawExpression> {
    use nom::Finish;
    let stripped = strip_comments(input);
    let result = match all_consuming(einsum)(stripped.as_str()).finish() {
        Ok((_, raw)) => Ok(raw),
        Err(err) => {
            let position = stripped.len() - err.input.len();
            let fragment = err.input.lines().next().unwrap_or_default().trim_end();
            Err(Error::Parse {
                position,
                fragment: if fragment.is_empty() {
                    "<end of input>".to_string()
                } else {
                    fragment.to_string()
                },
            })
        }
    };
    result
}
